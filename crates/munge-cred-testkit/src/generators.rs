//! Proptest generators for property-based testing.

use proptest::prelude::*;

use munge_cred::{Credential, CredentialOption};
use munge_cred_core::{AuthorityStatus, Identity, TTL_DEFAULT, TTL_MAXIMUM};

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a TTL request accepted by encode: the two sentinels or a
/// literal number of seconds.
pub fn valid_ttl() -> impl Strategy<Value = i64> {
    prop_oneof![
        Just(TTL_DEFAULT),
        Just(TTL_MAXIMUM),
        Just(1i64),
        Just(60i64),
        1i64..=3600,
    ]
}

/// Generate a TTL below the maximum sentinel.
pub fn invalid_ttl() -> impl Strategy<Value = i64> {
    i64::MIN..=-2i64
}

/// Generate an identity.
pub fn identity() -> impl Strategy<Value = Identity> {
    (any::<u32>(), any::<u32>()).prop_map(|(uid, gid)| Identity::new(uid, gid))
}

/// Generate any authority status, known or not.
pub fn status() -> impl Strategy<Value = AuthorityStatus> {
    prop_oneof![
        prop::sample::select(AuthorityStatus::KNOWN.to_vec()),
        any::<i32>().prop_map(AuthorityStatus::from_code),
    ]
}

/// Generate a status the authority can return from a failed decode.
pub fn failure_status() -> impl Strategy<Value = AuthorityStatus> {
    status().prop_filter("success is not a failure", |s| !s.is_success())
}

/// Generate a single credential option.
pub fn option(max_payload: usize) -> impl Strategy<Value = CredentialOption> {
    prop_oneof![
        payload(max_payload).prop_map(|p| CredentialOption::Payload(p.into())),
        valid_ttl().prop_map(CredentialOption::Ttl),
        any::<u32>().prop_map(CredentialOption::UidRestriction),
        any::<u32>().prop_map(CredentialOption::GidRestriction),
    ]
}

/// Generate an unrestricted request credential with a valid TTL.
pub fn request(max_payload: usize) -> impl Strategy<Value = Credential> {
    (payload(max_payload), valid_ttl()).prop_map(|(payload, ttl)| {
        Credential::builder().payload(payload).ttl(ttl).build()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn valid_ttls_are_accepted(ttl in valid_ttl()) {
            prop_assert!(munge_cred_core::TtlRequest::from_seconds(ttl).is_ok());
        }

        #[test]
        fn invalid_ttls_are_rejected(ttl in invalid_ttl()) {
            prop_assert!(munge_cred_core::TtlRequest::from_seconds(ttl).is_err());
        }

        #[test]
        fn failure_statuses_are_not_success(status in failure_status()) {
            prop_assert_ne!(status.code(), 0);
        }

        #[test]
        fn options_apply_in_order(options in prop::collection::vec(option(16), 0..8)) {
            let credential = Credential::new(options.clone());
            let last_ttl = options.iter().rev().find_map(|o| match o {
                CredentialOption::Ttl(ttl) => Some(*ttl),
                _ => None,
            });
            prop_assert_eq!(credential.ttl(), last_ttl.unwrap_or(TTL_DEFAULT));
        }
    }
}
