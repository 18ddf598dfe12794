//! Error types for setting up an authority.
//!
//! Authority primitives report [`munge_cred_core::AuthorityStatus`] codes;
//! these errors only cover construction (keys, configuration).

use thiserror::Error;

/// Errors that can occur while building an authority.
#[derive(Debug, Error)]
pub enum AuthorityError {
    /// Key material has an unusable length.
    #[error("invalid key length: {len} bytes (expected {min}..={max})")]
    InvalidKeyLength { len: usize, min: usize, max: usize },

    /// Configuration values are inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error (reading a key file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for authority setup.
pub type Result<T> = std::result::Result<T, AuthorityError>;
