use error_stack::report;
use serde::{Deserialize, Serialize};

use crate::error::{Error, ModelResult};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
/// Envelope wrapping every order book, quote and relay response
pub struct ApiResponse<T> {
    pub status: ResponseStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Unwraps the envelope. A response marked as an error, or an `Ok`
    /// response without a result, is reported as `OrderbookError`.
    pub fn into_result(self) -> ModelResult<T> {
        match (self.status, self.result) {
            (ResponseStatus::Ok, Some(result)) => Ok(result),
            (ResponseStatus::Ok, None) => Err(report!(Error::OrderbookError(
                "Response marked Ok without a result".to_string()
            ))),
            (ResponseStatus::Error, _) => Err(report!(Error::OrderbookError(
                self.error.unwrap_or_else(|| "Unknown error".to_string())
            ))),
        }
    }
}
