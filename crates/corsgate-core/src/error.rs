//! Shared error type across corsgate crates.

use thiserror::Error;

/// Stable error categories (used in logs and by tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Config file could not be read or parsed.
    BadConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Policy contains a token that cannot be written as an HTTP header.
    InvalidPolicy,
    /// Internal error.
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::BadConfig => "BAD_CONFIG",
            ErrorKind::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorKind::InvalidPolicy => "INVALID_POLICY",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, CorsGateError>;

/// Unified error type used by core and gateway.
///
/// Only construction and configuration can fail. Per-request evaluation is
/// infallible.
#[derive(Debug, Error)]
pub enum CorsGateError {
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("invalid method: {0:?}")]
    InvalidMethod(String),
    #[error("invalid header name: {0:?}")]
    InvalidHeaderName(String),
    #[error("invalid {field} header value: {value:?}")]
    InvalidHeaderValue { field: &'static str, value: String },
    #[error("internal: {0}")]
    Internal(String),
}

impl CorsGateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CorsGateError::BadConfig(_) => ErrorKind::BadConfig,
            CorsGateError::UnsupportedVersion => ErrorKind::UnsupportedVersion,
            CorsGateError::InvalidMethod(_)
            | CorsGateError::InvalidHeaderName(_)
            | CorsGateError::InvalidHeaderValue { .. } => ErrorKind::InvalidPolicy,
            CorsGateError::Internal(_) => ErrorKind::Internal,
        }
    }
}
