use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ModelResult<T> = error_stack::Result<T, Error>;

#[derive(Error, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Error {
    #[error("Parse error")]
    ParseError,

    #[error("Reqwest error: {0}")]
    ReqwestError(String),

    #[error("Chain error: {0}")]
    ChainError(String),

    #[error("Order book error: {0}")]
    OrderbookError(String),

    #[error("Serde deserialize error: {0}")]
    SerdeDeserialize(String),
}
