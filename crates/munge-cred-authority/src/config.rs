//! Configuration for the in-memory authority.

use serde::{Deserialize, Serialize};

use crate::error::{AuthorityError, Result};

/// Default TTL applied when a request leaves it unset, in seconds.
pub const DEFAULT_TTL: u32 = 300;

/// Maximum TTL a credential may carry, in seconds.
pub const MAX_TTL: u32 = 3600;

/// Largest payload accepted for encoding, in bytes.
pub const MAX_PAYLOAD_LEN: usize = 1024 * 1024;

/// Configuration for [`crate::MemoryAuthority`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// TTL used when a request does not set one.
    pub default_ttl: u32,
    /// TTL used for the maximum sentinel; larger literal requests are
    /// clamped to it.
    pub max_ttl: u32,
    /// Tolerated clock difference between encoder and decoder, in seconds.
    pub clock_skew: u32,
    /// Whether a token may only be decoded once.
    pub replay_detection: bool,
    /// Largest payload accepted for encoding.
    pub max_payload_len: usize,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            max_ttl: MAX_TTL,
            clock_skew: 0,
            replay_detection: true,
            max_payload_len: MAX_PAYLOAD_LEN,
        }
    }
}

impl AuthorityConfig {
    /// Check that the TTL limits are consistent.
    pub fn validate(&self) -> Result<()> {
        if self.max_ttl == 0 {
            return Err(AuthorityError::InvalidConfig("max_ttl must be positive".into()));
        }
        if self.default_ttl == 0 || self.default_ttl > self.max_ttl {
            return Err(AuthorityError::InvalidConfig(format!(
                "default_ttl {} must be within 1..={}",
                self.default_ttl, self.max_ttl
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        AuthorityConfig::default().validate().unwrap();
    }

    #[test]
    fn test_default_above_max_is_rejected() {
        let config = AuthorityConfig {
            default_ttl: 7200,
            ..AuthorityConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AuthorityError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_max_is_rejected() {
        let config = AuthorityConfig {
            max_ttl: 0,
            ..AuthorityConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AuthorityConfig =
            serde_json::from_str(r#"{"max_ttl": 86400, "clock_skew": 5}"#).unwrap();
        assert_eq!(config.max_ttl, 86400);
        assert_eq!(config.clock_skew, 5);
        assert_eq!(config.default_ttl, DEFAULT_TTL);
        assert!(config.replay_detection);
    }
}
