//! Status-mapping vectors.
//!
//! One vector per MUNGE status code, pinning its numeric code, canonical
//! message, and the error kind a failed decode with that status must
//! produce. Any authority implementation can be checked against them.

use munge_cred::{CredentialService, MungeError};
use munge_cred_core::AuthorityStatus;

use crate::fixtures::{scripted_service, ScriptedAuthority, SCRIPTED_TOKEN};

/// The error kind a decode status maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeKind {
    CredInvalid,
    CredExpired,
    CredRewound,
    CredReplayed,
    CredUnauthorized,
    DecodeFailed,
}

impl DecodeKind {
    /// Classify a decode error. `None` for errors decode never returns.
    pub fn of(err: &MungeError) -> Option<Self> {
        match err {
            MungeError::CredInvalid => Some(Self::CredInvalid),
            MungeError::CredExpired => Some(Self::CredExpired),
            MungeError::CredRewound => Some(Self::CredRewound),
            MungeError::CredReplayed => Some(Self::CredReplayed),
            MungeError::CredUnauthorized => Some(Self::CredUnauthorized),
            MungeError::DecodeFailed { .. } => Some(Self::DecodeFailed),
            MungeError::InvalidTtl(_)
            | MungeError::EncodeConfigError { .. }
            | MungeError::EncodeFailed { .. }
            | MungeError::TtlReadError { .. } => None,
        }
    }
}

/// A status-mapping vector.
#[derive(Debug, Clone)]
pub struct StatusVector {
    /// The status under test.
    pub status: AuthorityStatus,
    /// Its MUNGE error code.
    pub code: i32,
    /// Its canonical message.
    pub message: &'static str,
    /// What a decode failing with this status must return.
    pub expected: DecodeKind,
}

const fn vector(
    status: AuthorityStatus,
    code: i32,
    message: &'static str,
    expected: DecodeKind,
) -> StatusVector {
    StatusVector {
        status,
        code,
        message,
        expected,
    }
}

/// Every failure status, the client-side deadline, plus two codes the
/// table does not know.
pub fn status_vectors() -> Vec<StatusVector> {
    use AuthorityStatus as S;
    use DecodeKind as K;

    vec![
        vector(S::Snafu, 1, "Internal error", K::DecodeFailed),
        vector(S::BadArg, 2, "Invalid argument", K::DecodeFailed),
        vector(S::BadLength, 3, "Exceeded maximum message length", K::DecodeFailed),
        vector(S::Overflow, 4, "Buffer overflow", K::DecodeFailed),
        vector(S::NoMemory, 5, "Out of memory", K::DecodeFailed),
        vector(S::Socket, 6, "Socket communication error", K::DecodeFailed),
        vector(S::Timeout, 7, "Socket timeout", K::DecodeFailed),
        vector(S::BadCred, 8, "Invalid credential format", K::DecodeFailed),
        vector(S::BadVersion, 9, "Invalid credential version", K::DecodeFailed),
        vector(S::BadCipher, 10, "Invalid cipher type", K::DecodeFailed),
        vector(S::BadMac, 11, "Invalid MAC type", K::DecodeFailed),
        vector(S::BadZip, 12, "Invalid compression type", K::DecodeFailed),
        vector(S::BadRealm, 13, "Unrecognized security realm", K::DecodeFailed),
        vector(S::CredInvalid, 14, "Invalid credential", K::CredInvalid),
        vector(S::CredExpired, 15, "Expired credential", K::CredExpired),
        vector(S::CredRewound, 16, "Rewound credential", K::CredRewound),
        vector(S::CredReplayed, 17, "Replayed credential", K::CredReplayed),
        vector(S::CredUnauthorized, 18, "Unauthorized credential decode", K::CredUnauthorized),
        vector(S::DeadlineExceeded, -1, "Deadline exceeded", K::DecodeFailed),
        vector(S::Other(19), 19, "Unknown status code", K::DecodeFailed),
        vector(S::Other(-3), -3, "Unknown status code", K::DecodeFailed),
    ]
}

/// Decode through a scripted authority failing with the vector's status.
pub fn decode_with(vector: &StatusVector) -> MungeError {
    let service: CredentialService<ScriptedAuthority> =
        scripted_service(ScriptedAuthority::new().fail_decode(vector.status), None);
    match service.decode(SCRIPTED_TOKEN) {
        Ok(credential) => panic!(
            "{:?}: decode succeeded with {:?}",
            vector.status, credential
        ),
        Err(err) => err,
    }
}

/// Check every vector. Returns the failures, one line each.
pub fn verify_status_vectors() -> Result<(), Vec<String>> {
    let mut failures = Vec::new();

    for vector in status_vectors() {
        if vector.status.code() != vector.code {
            failures.push(format!(
                "{:?}: code {} != {}",
                vector.status,
                vector.status.code(),
                vector.code
            ));
        }
        if AuthorityStatus::from_code(vector.code) != vector.status {
            failures.push(format!("code {} does not round-trip", vector.code));
        }
        if vector.status.message() != vector.message {
            failures.push(format!(
                "{:?}: message {:?} != {:?}",
                vector.status,
                vector.status.message(),
                vector.message
            ));
        }

        let err = decode_with(&vector);
        if DecodeKind::of(&err) != Some(vector.expected) {
            failures.push(format!(
                "{:?}: mapped to {:?}, expected {:?}",
                vector.status, err, vector.expected
            ));
        }
        if err.status() != Some(vector.status) {
            failures.push(format!("{:?}: status lost in {:?}", vector.status, err));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_pass() {
        if let Err(failures) = verify_status_vectors() {
            panic!("status vectors failed:\n{}", failures.join("\n"));
        }
    }

    #[test]
    fn test_every_known_failure_has_a_vector() {
        let vectors = status_vectors();
        for status in AuthorityStatus::KNOWN.into_iter().filter(|s| !s.is_success()) {
            assert!(
                vectors.iter().any(|v| v.status == status),
                "no vector for {:?}",
                status
            );
        }
    }

    #[test]
    fn test_fallback_carries_authority_message() {
        let vector = vector(
            AuthorityStatus::Socket,
            6,
            "Socket communication error",
            DecodeKind::DecodeFailed,
        );
        match decode_with(&vector) {
            MungeError::DecodeFailed { message, .. } => {
                assert_eq!(message, "scripted: Socket communication error");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
