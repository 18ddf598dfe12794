//! Status codes reported by the credential authority.
//!
//! The numeric values follow MUNGE's `munge_err_t` so that a native binding
//! can pass codes through unchanged. Codes outside the known table are kept
//! verbatim in [`AuthorityStatus::Other`]. The one client-side status,
//! [`AuthorityStatus::DeadlineExceeded`], uses a negative code that MUNGE
//! never returns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A status code returned by an authority primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorityStatus {
    /// The operation succeeded.
    Success,
    /// Internal error.
    Snafu,
    /// Invalid argument.
    BadArg,
    /// Exceeded maximum message length.
    BadLength,
    /// Buffer overflow.
    Overflow,
    /// Out of memory.
    NoMemory,
    /// Socket communication error.
    Socket,
    /// Socket timeout reported by the authority.
    Timeout,
    /// Invalid credential format.
    BadCred,
    /// Invalid credential version.
    BadVersion,
    /// Invalid cipher type.
    BadCipher,
    /// Invalid MAC type.
    BadMac,
    /// Invalid compression type.
    BadZip,
    /// Unrecognized security realm.
    BadRealm,
    /// Signature or structure of the credential is invalid.
    CredInvalid,
    /// The credential's TTL window has passed.
    CredExpired,
    /// The credential was issued in the future.
    CredRewound,
    /// The credential was already decoded.
    CredReplayed,
    /// The decoding party may not decode this credential.
    CredUnauthorized,
    /// The caller's deadline passed before the authority answered.
    DeadlineExceeded,
    /// A code not in the known table.
    Other(i32),
}

impl AuthorityStatus {
    /// Code of [`AuthorityStatus::DeadlineExceeded`].
    pub const DEADLINE_EXCEEDED_CODE: i32 = -1;

    /// Every status an authority can report, in code order.
    pub const KNOWN: [Self; 19] = [
        Self::Success,
        Self::Snafu,
        Self::BadArg,
        Self::BadLength,
        Self::Overflow,
        Self::NoMemory,
        Self::Socket,
        Self::Timeout,
        Self::BadCred,
        Self::BadVersion,
        Self::BadCipher,
        Self::BadMac,
        Self::BadZip,
        Self::BadRealm,
        Self::CredInvalid,
        Self::CredExpired,
        Self::CredRewound,
        Self::CredReplayed,
        Self::CredUnauthorized,
    ];

    /// Parse a raw status code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::Snafu,
            2 => Self::BadArg,
            3 => Self::BadLength,
            4 => Self::Overflow,
            5 => Self::NoMemory,
            6 => Self::Socket,
            7 => Self::Timeout,
            8 => Self::BadCred,
            9 => Self::BadVersion,
            10 => Self::BadCipher,
            11 => Self::BadMac,
            12 => Self::BadZip,
            13 => Self::BadRealm,
            14 => Self::CredInvalid,
            15 => Self::CredExpired,
            16 => Self::CredRewound,
            17 => Self::CredReplayed,
            18 => Self::CredUnauthorized,
            Self::DEADLINE_EXCEEDED_CODE => Self::DeadlineExceeded,
            other => Self::Other(other),
        }
    }

    /// The raw status code.
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Snafu => 1,
            Self::BadArg => 2,
            Self::BadLength => 3,
            Self::Overflow => 4,
            Self::NoMemory => 5,
            Self::Socket => 6,
            Self::Timeout => 7,
            Self::BadCred => 8,
            Self::BadVersion => 9,
            Self::BadCipher => 10,
            Self::BadMac => 11,
            Self::BadZip => 12,
            Self::BadRealm => 13,
            Self::CredInvalid => 14,
            Self::CredExpired => 15,
            Self::CredRewound => 16,
            Self::CredReplayed => 17,
            Self::CredUnauthorized => 18,
            Self::DeadlineExceeded => Self::DEADLINE_EXCEEDED_CODE,
            Self::Other(code) => code,
        }
    }

    /// The canonical human-readable message for this status.
    pub fn message(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Snafu => "Internal error",
            Self::BadArg => "Invalid argument",
            Self::BadLength => "Exceeded maximum message length",
            Self::Overflow => "Buffer overflow",
            Self::NoMemory => "Out of memory",
            Self::Socket => "Socket communication error",
            Self::Timeout => "Socket timeout",
            Self::BadCred => "Invalid credential format",
            Self::BadVersion => "Invalid credential version",
            Self::BadCipher => "Invalid cipher type",
            Self::BadMac => "Invalid MAC type",
            Self::BadZip => "Invalid compression type",
            Self::BadRealm => "Unrecognized security realm",
            Self::CredInvalid => "Invalid credential",
            Self::CredExpired => "Expired credential",
            Self::CredRewound => "Rewound credential",
            Self::CredReplayed => "Replayed credential",
            Self::CredUnauthorized => "Unauthorized credential decode",
            Self::DeadlineExceeded => "Deadline exceeded",
            Self::Other(_) => "Unknown status code",
        }
    }

    /// Check whether this is the success status.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Check whether this status judges the credential itself
    /// (invalid, expired, rewound, replayed, unauthorized).
    pub fn is_credential_verdict(self) -> bool {
        matches!(
            self,
            Self::CredInvalid
                | Self::CredExpired
                | Self::CredRewound
                | Self::CredReplayed
                | Self::CredUnauthorized
        )
    }
}

impl From<i32> for AuthorityStatus {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl fmt::Display for AuthorityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_table_is_in_code_order() {
        for (i, status) in AuthorityStatus::KNOWN.iter().enumerate() {
            assert_eq!(status.code(), i as i32);
            assert_eq!(AuthorityStatus::from_code(i as i32), *status);
        }
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let status = AuthorityStatus::from_code(42);
        assert_eq!(status, AuthorityStatus::Other(42));
        assert_eq!(status.code(), 42);
        assert_eq!(status.message(), "Unknown status code");
    }

    #[test]
    fn test_deadline_is_distinct_from_socket_timeout() {
        let status = AuthorityStatus::from_code(-1);
        assert_eq!(status, AuthorityStatus::DeadlineExceeded);
        assert_ne!(status.code(), AuthorityStatus::Timeout.code());
        assert_eq!(status.message(), "Deadline exceeded");
        assert!(!AuthorityStatus::KNOWN.contains(&status));
        assert!(!status.is_credential_verdict());
    }

    #[test]
    fn test_credential_verdicts() {
        let verdicts: Vec<_> = AuthorityStatus::KNOWN
            .iter()
            .filter(|s| s.is_credential_verdict())
            .collect();
        assert_eq!(verdicts.len(), 5);
        assert!(!AuthorityStatus::BadCred.is_credential_verdict());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            AuthorityStatus::CredExpired.to_string(),
            "Expired credential (15)"
        );
    }

    #[test]
    fn test_serde_json() {
        let json = serde_json::to_string(&AuthorityStatus::Other(99)).unwrap();
        let back: AuthorityStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AuthorityStatus::Other(99));
    }

    proptest! {
        #[test]
        fn code_roundtrips(code in any::<i32>()) {
            prop_assert_eq!(AuthorityStatus::from_code(code).code(), code);
        }
    }
}
