//! Error types for credential encode and decode.

use munge_cred_core::{AuthorityStatus, CoreError};
use thiserror::Error;

/// Errors that can occur during credential operations.
///
/// Callers match on the variant, never on the message. Each credential
/// verdict the authority can return has its own variant; everything else
/// the authority reports lands in [`MungeError::DecodeFailed`] with the raw
/// status preserved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MungeError {
    /// Requested TTL is below the maximum sentinel (-1).
    #[error("invalid time-to-live: {0}")]
    InvalidTtl(i64),

    /// The authority rejected a context option (TTL or restriction).
    #[error("failed to configure credential encode: {status}")]
    EncodeConfigError { status: AuthorityStatus },

    /// The authority failed to mint a token.
    #[error("credential encode failed: {status}")]
    EncodeFailed { status: AuthorityStatus },

    /// Token failed authentication.
    #[error("invalid credential")]
    CredInvalid,

    /// Token TTL window has closed.
    #[error("expired credential")]
    CredExpired,

    /// Token was encoded in the future relative to the decoding host.
    #[error("rewound credential")]
    CredRewound,

    /// Token was already decoded.
    #[error("replayed credential")]
    CredReplayed,

    /// Decoder does not satisfy the token's uid/gid restriction.
    #[error("unauthorized credential decode")]
    CredUnauthorized,

    /// Any other decode failure reported by the authority.
    #[error("credential decode failed: {message} (status {})", .status.code())]
    DecodeFailed {
        status: AuthorityStatus,
        message: String,
    },

    /// The token decoded but its TTL could not be read back.
    #[error("failed to read credential time-to-live: {status}")]
    TtlReadError { status: AuthorityStatus },
}

/// Which layer an error originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorLayer {
    /// Rejected before the authority was contacted.
    Validation,
    /// The authority judged the credential itself.
    Credential,
    /// Transport, configuration, or unexpected authority failures.
    Authority,
}

impl MungeError {
    /// Map a non-success decode status to its error kind.
    ///
    /// `message` is only consulted for statuses without a dedicated variant.
    pub fn from_decode_status(
        status: AuthorityStatus,
        message: impl FnOnce() -> String,
    ) -> Self {
        match status {
            AuthorityStatus::CredInvalid => Self::CredInvalid,
            AuthorityStatus::CredExpired => Self::CredExpired,
            AuthorityStatus::CredRewound => Self::CredRewound,
            AuthorityStatus::CredReplayed => Self::CredReplayed,
            AuthorityStatus::CredUnauthorized => Self::CredUnauthorized,
            AuthorityStatus::Success
            | AuthorityStatus::Snafu
            | AuthorityStatus::BadArg
            | AuthorityStatus::BadLength
            | AuthorityStatus::Overflow
            | AuthorityStatus::NoMemory
            | AuthorityStatus::Socket
            | AuthorityStatus::Timeout
            | AuthorityStatus::BadCred
            | AuthorityStatus::BadVersion
            | AuthorityStatus::BadCipher
            | AuthorityStatus::BadMac
            | AuthorityStatus::BadZip
            | AuthorityStatus::BadRealm
            | AuthorityStatus::DeadlineExceeded
            | AuthorityStatus::Other(_) => Self::DecodeFailed {
                status,
                message: message(),
            },
        }
    }

    /// The layer this error belongs to.
    pub fn layer(&self) -> ErrorLayer {
        match self {
            Self::InvalidTtl(_) => ErrorLayer::Validation,
            Self::CredInvalid
            | Self::CredExpired
            | Self::CredRewound
            | Self::CredReplayed
            | Self::CredUnauthorized
            | Self::DecodeFailed { .. } => ErrorLayer::Credential,
            Self::EncodeConfigError { .. } | Self::EncodeFailed { .. } | Self::TtlReadError { .. } => {
                ErrorLayer::Authority
            }
        }
    }

    /// The authority status behind this error, if any.
    pub fn status(&self) -> Option<AuthorityStatus> {
        match self {
            Self::InvalidTtl(_) => None,
            Self::CredInvalid => Some(AuthorityStatus::CredInvalid),
            Self::CredExpired => Some(AuthorityStatus::CredExpired),
            Self::CredRewound => Some(AuthorityStatus::CredRewound),
            Self::CredReplayed => Some(AuthorityStatus::CredReplayed),
            Self::CredUnauthorized => Some(AuthorityStatus::CredUnauthorized),
            Self::EncodeConfigError { status }
            | Self::EncodeFailed { status }
            | Self::DecodeFailed { status, .. }
            | Self::TtlReadError { status } => Some(*status),
        }
    }

    /// Whether the call timed out, on either side of the socket.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self.status(),
            Some(AuthorityStatus::Timeout | AuthorityStatus::DeadlineExceeded)
        )
    }

    /// Whether the caller's own deadline tripped.
    pub fn is_deadline_exceeded(&self) -> bool {
        self.status() == Some(AuthorityStatus::DeadlineExceeded)
    }
}

impl From<CoreError> for MungeError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidTtl(ttl) => Self::InvalidTtl(ttl),
        }
    }
}

/// Result type for credential operations.
pub type Result<T> = std::result::Result<T, MungeError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn unused() -> String {
        panic!("message requested for a dedicated variant")
    }

    #[test]
    fn test_credential_verdicts_have_own_variants() {
        let cases = [
            (AuthorityStatus::CredInvalid, MungeError::CredInvalid),
            (AuthorityStatus::CredExpired, MungeError::CredExpired),
            (AuthorityStatus::CredRewound, MungeError::CredRewound),
            (AuthorityStatus::CredReplayed, MungeError::CredReplayed),
            (AuthorityStatus::CredUnauthorized, MungeError::CredUnauthorized),
        ];
        for (status, expected) in cases {
            let err = MungeError::from_decode_status(status, unused);
            assert_eq!(err, expected);
            assert_eq!(err.status(), Some(status));
            assert_eq!(err.layer(), ErrorLayer::Credential);
        }
    }

    #[test]
    fn test_other_statuses_fall_back() {
        for status in AuthorityStatus::KNOWN
            .into_iter()
            .filter(|s| !s.is_credential_verdict())
            .chain([AuthorityStatus::Other(42)])
        {
            let err = MungeError::from_decode_status(status, || status.message().to_owned());
            match &err {
                MungeError::DecodeFailed { status: got, message } => {
                    assert_eq!(*got, status);
                    assert_eq!(message, status.message());
                }
                other => panic!("{:?} mapped to {:?}", status, other),
            }
        }
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let err = MungeError::from_decode_status(AuthorityStatus::from_code(99), || "?".into());
        assert_eq!(err.status().map(|s| s.code()), Some(99));
        assert_eq!(err.to_string(), "credential decode failed: ? (status 99)");
    }

    #[test]
    fn test_layers() {
        assert_eq!(MungeError::InvalidTtl(-2).layer(), ErrorLayer::Validation);
        assert_eq!(MungeError::InvalidTtl(-2).status(), None);
        assert_eq!(
            MungeError::EncodeFailed {
                status: AuthorityStatus::Socket
            }
            .layer(),
            ErrorLayer::Authority
        );
        assert_eq!(
            MungeError::TtlReadError {
                status: AuthorityStatus::Snafu
            }
            .layer(),
            ErrorLayer::Authority
        );
    }

    #[test]
    fn test_from_core_error() {
        let err: MungeError = CoreError::InvalidTtl(-7).into();
        assert_eq!(err, MungeError::InvalidTtl(-7));
        assert_eq!(err.to_string(), "invalid time-to-live: -7");
    }

    #[test]
    fn test_timeout_detection() {
        let err = MungeError::EncodeFailed {
            status: AuthorityStatus::Timeout,
        };
        assert!(err.is_timeout());
        assert!(!err.is_deadline_exceeded());
        assert!(!MungeError::CredExpired.is_timeout());
    }

    #[test]
    fn test_deadline_is_not_a_socket_timeout() {
        let err = MungeError::EncodeFailed {
            status: AuthorityStatus::DeadlineExceeded,
        };
        assert!(err.is_timeout());
        assert!(err.is_deadline_exceeded());
        assert_eq!(err.to_string(), "credential encode failed: Deadline exceeded (-1)");

        let err = MungeError::from_decode_status(AuthorityStatus::DeadlineExceeded, || {
            "Deadline exceeded".into()
        });
        assert!(err.is_deadline_exceeded());
        assert_eq!(err.layer(), ErrorLayer::Credential);
    }
}
