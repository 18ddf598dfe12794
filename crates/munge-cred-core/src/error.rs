//! Error types for the core data model.

use thiserror::Error;

/// Errors raised while validating a credential request, before any
/// authority is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Requested TTL is below the `-1` maximum sentinel.
    #[error("invalid time-to-live: {0}")]
    InvalidTtl(i64),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
