//! Service configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default deadline for async operations.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// Configuration for [`CredentialService`](crate::CredentialService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Deadline for `encode_async` / `decode_async`. `None` waits forever.
    ///
    /// Blocking calls are never bounded.
    pub deadline: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            deadline: Some(DEFAULT_DEADLINE),
        }
    }
}

impl ServiceConfig {
    /// Configuration with the given async deadline.
    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    /// Configuration whose async operations never time out.
    pub fn without_deadline() -> Self {
        Self { deadline: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_deadline() {
        assert_eq!(ServiceConfig::default().deadline, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: ServiceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ServiceConfig::default());

        let config: ServiceConfig = serde_json::from_str(r#"{"deadline":null}"#).unwrap();
        assert_eq!(config, ServiceConfig::without_deadline());
    }
}
