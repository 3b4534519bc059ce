use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    NotFound,
    Internal,
    Upstream,
    Unknown,
}

impl ErrorCode {
    /// Maps the server's numeric `code` onto a category.
    pub fn from_status(status: i64) -> Self {
        match status {
            400 => ErrorCode::Validation,
            404 => ErrorCode::NotFound,
            500 => ErrorCode::Internal,
            502 => ErrorCode::Upstream,
            _ => ErrorCode::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code:?} ({status}): {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub status: i64,
    pub message: String,
}

impl ApiError {
    /// Status of errors raised by this client rather than reported by the server.
    pub const LOCAL_STATUS: i64 = -1;

    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status: Self::LOCAL_STATUS,
            message: message.into(),
        }
    }

    /// Whether the server itself answered with this error's code.
    pub fn is_from_server(&self) -> bool {
        self.status != Self::LOCAL_STATUS
    }

    pub fn from_status(status: i64, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::from_status(status),
            status,
            message: message.into(),
        }
    }
}
