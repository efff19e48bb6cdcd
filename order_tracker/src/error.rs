use error_stack::{AttachmentKind, FrameKind, Report};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type TrackerResult<T> = error_stack::Result<T, Error>;

#[derive(Error, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Error {
    #[error("Parse error")]
    ParseError,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Order book error")]
    OrderbookError,

    #[error("Quote error")]
    QuoteError,

    #[error("Initiate failed: {0}")]
    InitiateError(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Module stopped: {0}")]
    ModuleStopped(String),
}

pub trait ReportDisplayExt {
    fn format(&self) -> String;
}

impl ReportDisplayExt for Report<Error> {
    /// Current context followed by every printable attachment, on one line.
    fn format(&self) -> String {
        let mut output = self.current_context().to_string();

        for frame in self.frames() {
            if let FrameKind::Attachment(AttachmentKind::Printable(attachment)) = frame.kind() {
                output.push_str(&format!(": {attachment}"));
            }
        }

        output
    }
}
