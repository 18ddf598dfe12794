//! Time-to-live requests.
//!
//! A credential's TTL is a signed number of seconds with two reserved values:
//! [`TTL_DEFAULT`] asks the authority for its configured default and
//! [`TTL_MAXIMUM`] asks for its configured maximum. Anything below
//! `TTL_MAXIMUM` is rejected here and never reaches the authority.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Use the authority's default TTL.
pub const TTL_DEFAULT: i64 = 0;

/// Use the authority's maximum TTL.
pub const TTL_MAXIMUM: i64 = -1;

/// A validated TTL request passed to an authority context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TtlRequest {
    /// An explicit number of seconds (always positive).
    Literal(u32),
    /// The authority's configured maximum.
    Maximum,
}

impl TtlRequest {
    /// Resolve a raw TTL into a request.
    ///
    /// Returns `Ok(None)` for [`TTL_DEFAULT`]: the context is left untouched
    /// and the authority applies its default. Seconds beyond `u32::MAX`
    /// saturate; authorities clamp to their own maximum anyway.
    pub fn from_seconds(ttl: i64) -> Result<Option<Self>> {
        match ttl {
            TTL_DEFAULT => Ok(None),
            TTL_MAXIMUM => Ok(Some(Self::Maximum)),
            t if t < TTL_MAXIMUM => Err(CoreError::InvalidTtl(t)),
            t => Ok(Some(Self::Literal(u32::try_from(t).unwrap_or(u32::MAX)))),
        }
    }

    /// The raw value as understood by the MUNGE option API.
    pub fn as_raw(self) -> i64 {
        match self {
            Self::Literal(seconds) => i64::from(seconds),
            Self::Maximum => TTL_MAXIMUM,
        }
    }
}
