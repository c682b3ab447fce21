//! Error types shared by the mock backend services
//!
//! `StoreError` covers failures of the key-value store itself, while
//! `ApiError` is the taxonomy every backend operation rejects with.

use serde::Serialize;
use thiserror::Error;

/// Errors raised by a key-value store backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying file I/O failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted storage could not be parsed
    #[error("Storage is corrupt: {0}")]
    Corrupt(String),

    /// Writing the value would exceed the store quota
    #[error("Storage quota exceeded while writing '{key}' (limit {limit} bytes)")]
    QuotaExceeded { key: String, limit: usize },

    /// Remote backend failure (redis)
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Stable, machine-readable error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Conflict,
    Auth,
    NotFound,
    Transient,
    Storage,
}

impl ErrorKind {
    /// Code as it appears in serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Auth => "auth",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Transient => "transient",
            ErrorKind::Storage => "storage",
        }
    }
}

/// Error type returned by every mock backend operation
///
/// The `Display` output of the domain variants is the bare message, which is
/// what a caller shows to the user.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Input had the wrong shape
    #[error("{0}")]
    Validation(String),

    /// The resource already exists (duplicate email)
    #[error("{0}")]
    Conflict(String),

    /// Credentials did not match
    #[error("{0}")]
    Auth(String),

    /// The addressed resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Simulated flaky network, safe to retry
    #[error("{0}")]
    Transient(String),

    /// The key-value store failed
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// A record could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// Structured code for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Conflict(_) => ErrorKind::Conflict,
            ApiError::Auth(_) => ErrorKind::Auth,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Transient(_) => ErrorKind::Transient,
            ApiError::Storage(_) | ApiError::Serialization(_) => ErrorKind::Storage,
        }
    }

    /// Whether the caller may retry the same call
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Transient(_))
    }
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Type alias for mock backend results
pub type ApiResult<T> = Result<T, ApiError>;
