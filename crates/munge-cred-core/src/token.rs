//! Opaque encoded credentials.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal tag that opens every token.
pub const TOKEN_PREFIX: &str = "MUNGE:";

/// Literal tag that closes every token.
pub const TOKEN_SUFFIX: &str = ":";

/// An encoded credential as returned by an authority.
///
/// The contents are opaque: callers transmit a token over any text-safe
/// channel (headers, environment variables, files) and hand it back to an
/// authority for decoding, but never parse or mutate it.
///
/// `Debug` prints a short fingerprint rather than the token so credentials
/// do not leak into logs. `Display` prints the full token for transmission.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Wrap an encoded credential string.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The encoded credential.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the encoded credential.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Check whether the token carries the MUNGE type tag.
    pub fn has_type_tag(&self) -> bool {
        self.0.starts_with(TOKEN_PREFIX)
    }

    /// Length of the encoded credential in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the token is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short blake3 fingerprint for logging.
    pub fn fingerprint(&self) -> String {
        let hash = blake3::hash(self.0.as_bytes());
        hex::encode(&hash.as_bytes()[..8])
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.fingerprint())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Token {
    fn from(encoded: String) -> Self {
        Self(encoded)
    }
}

impl From<&str> for Token {
    fn from(encoded: &str) -> Self {
        Self(encoded.to_owned())
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}
