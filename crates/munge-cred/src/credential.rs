//! Credential: a request to encode, or the result of a decode.
//!
//! Requests are built by applying [`CredentialOption`]s in order; a later
//! option overrides an earlier one touching the same field. Identity is never
//! an option: it is filled in only by [`CredentialService::decode`], from
//! what the authority reports, and no public constructor accepts one.
//!
//! [`CredentialService::decode`]: crate::CredentialService::decode

use bytes::Bytes;
use std::fmt;

use munge_cred_core::{Identity, Result, TtlRequest, TTL_DEFAULT};

/// A single request option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialOption {
    /// Opaque payload sealed inside the token. Empty means no payload.
    Payload(Bytes),
    /// Requested TTL in seconds (`0` default, `-1` maximum).
    Ttl(i64),
    /// Only this uid may decode the token.
    UidRestriction(u32),
    /// Only members of this gid may decode the token.
    GidRestriction(u32),
}

impl CredentialOption {
    /// Apply this option to a credential.
    pub fn apply(self, credential: &mut Credential) {
        match self {
            Self::Payload(payload) if payload.is_empty() => credential.payload = None,
            Self::Payload(payload) => credential.payload = Some(payload),
            Self::Ttl(ttl) => credential.ttl = ttl,
            Self::UidRestriction(uid) => credential.uid_restriction = Some(uid),
            Self::GidRestriction(gid) => credential.gid_restriction = Some(gid),
        }
    }
}

/// Set the payload.
pub fn with_payload(payload: impl Into<Bytes>) -> CredentialOption {
    CredentialOption::Payload(payload.into())
}

/// Set the payload from a borrowed slice, copying it.
pub fn with_payload_slice(payload: &[u8]) -> CredentialOption {
    CredentialOption::Payload(Bytes::copy_from_slice(payload))
}

/// Set the requested TTL. Range checks happen at encode time.
pub fn with_ttl(ttl: i64) -> CredentialOption {
    CredentialOption::Ttl(ttl)
}

/// Restrict decoding to a single uid.
pub fn with_uid_restriction(uid: u32) -> CredentialOption {
    CredentialOption::UidRestriction(uid)
}

/// Restrict decoding to a single gid.
pub fn with_gid_restriction(gid: u32) -> CredentialOption {
    CredentialOption::GidRestriction(gid)
}

/// A MUNGE credential.
///
/// As a request it carries a payload, a TTL and optional decode
/// restrictions. As a decode result it additionally carries the identity of
/// the encoding process and the TTL actually embedded in the token, and is
/// never mutated afterwards.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    identity: Identity,
    payload: Option<Bytes>,
    ttl: i64,
    uid_restriction: Option<u32>,
    gid_restriction: Option<u32>,
}

impl Credential {
    /// Create a credential request from options, applied in order.
    pub fn new(options: impl IntoIterator<Item = CredentialOption>) -> Self {
        let mut credential = Self {
            ttl: TTL_DEFAULT,
            ..Self::default()
        };
        for option in options {
            option.apply(&mut credential);
        }
        credential
    }

    /// Start a chained builder.
    pub fn builder() -> CredentialBuilder {
        CredentialBuilder::new()
    }

    /// Assemble a decoded credential once the authority has validated a
    /// token and every field has been read back.
    pub(crate) fn from_authority(identity: Identity, payload: Bytes, ttl: i64) -> Self {
        Self {
            identity,
            payload: (!payload.is_empty()).then_some(payload),
            ttl,
            uid_restriction: None,
            gid_restriction: None,
        }
    }

    /// The identity asserted by the authority (zero on requests).
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// The uid of the process that encoded the credential.
    pub fn uid(&self) -> u32 {
        self.identity.uid
    }

    /// The uid in decimal.
    pub fn uid_string(&self) -> String {
        self.identity.uid.to_string()
    }

    /// The gid of the process that encoded the credential.
    pub fn gid(&self) -> u32 {
        self.identity.gid
    }

    /// The gid in decimal.
    pub fn gid_string(&self) -> String {
        self.identity.gid.to_string()
    }

    /// The payload, empty if none was set.
    pub fn payload(&self) -> &[u8] {
        self.payload.as_deref().unwrap_or_default()
    }

    /// The payload as shared bytes, if one was set.
    pub fn payload_bytes(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    /// Check whether a non-empty payload is set.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// The TTL in seconds.
    ///
    /// On requests this is the raw requested value, sentinels included. On
    /// decoded credentials it is the token's configured TTL.
    pub fn ttl(&self) -> i64 {
        self.ttl
    }

    /// Validate the requested TTL.
    ///
    /// `Ok(None)` means the authority default applies.
    pub fn ttl_request(&self) -> Result<Option<TtlRequest>> {
        TtlRequest::from_seconds(self.ttl)
    }

    /// The uid restriction requested for decoding, if any.
    pub fn uid_restriction(&self) -> Option<u32> {
        self.uid_restriction
    }

    /// The gid restriction requested for decoding, if any.
    pub fn gid_restriction(&self) -> Option<u32> {
        self.gid_restriction
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("identity", &self.identity)
            .field("payload_len", &self.payload().len())
            .field("ttl", &self.ttl)
            .field("uid_restriction", &self.uid_restriction)
            .field("gid_restriction", &self.gid_restriction)
            .finish()
    }
}

/// Chained builder over [`CredentialOption`]s.
#[derive(Debug, Clone, Default)]
pub struct CredentialBuilder {
    options: Vec<CredentialOption>,
}

impl CredentialBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the payload.
    pub fn payload(self, payload: impl Into<Bytes>) -> Self {
        self.option(with_payload(payload))
    }

    /// Set the payload from a borrowed slice.
    pub fn payload_slice(self, payload: &[u8]) -> Self {
        self.option(with_payload_slice(payload))
    }

    /// Set the requested TTL.
    pub fn ttl(self, ttl: i64) -> Self {
        self.option(with_ttl(ttl))
    }

    /// Restrict decoding to a uid.
    pub fn uid_restriction(self, uid: u32) -> Self {
        self.option(with_uid_restriction(uid))
    }

    /// Restrict decoding to a gid.
    pub fn gid_restriction(self, gid: u32) -> Self {
        self.option(with_gid_restriction(gid))
    }

    /// Append an arbitrary option.
    pub fn option(mut self, option: CredentialOption) -> Self {
        self.options.push(option);
        self
    }

    /// Build the request.
    pub fn build(self) -> Credential {
        Credential::new(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use munge_cred_core::CoreError;

    #[test]
    fn test_new_without_options() {
        let cred = Credential::new(Vec::<CredentialOption>::new());
        assert_eq!(cred.identity(), Identity::UNSET);
        assert_eq!(cred.ttl(), 0);
        assert!(!cred.has_payload());
        assert!(cred.payload().is_empty());
        assert_eq!(cred.ttl_request(), Ok(None));
    }

    #[test]
    fn test_later_option_wins() {
        let cred = Credential::new([
            with_ttl(60),
            with_payload("first"),
            with_ttl(800),
            with_payload("second"),
        ]);
        assert_eq!(cred.ttl(), 800);
        assert_eq!(cred.payload(), b"second");
    }

    #[test]
    fn test_empty_payload_is_unset() {
        let cred = Credential::new([with_payload(Vec::<u8>::new())]);
        assert!(!cred.has_payload());

        let cred = Credential::new([with_payload("data"), with_payload(Bytes::new())]);
        assert!(!cred.has_payload());
        assert!(cred.payload().is_empty());
    }

    #[test]
    fn test_payload_with_embedded_nul() {
        let cred = Credential::new([with_payload(&b"a\0b\0"[..])]);
        assert_eq!(cred.payload(), b"a\0b\0");
        assert_eq!(cred.payload().len(), 4);
    }

    #[test]
    fn test_ttl_is_not_validated_by_options() {
        let cred = Credential::new([with_ttl(-5)]);
        assert_eq!(cred.ttl(), -5);
        assert_eq!(cred.ttl_request(), Err(CoreError::InvalidTtl(-5)));
    }

    #[test]
    fn test_restrictions() {
        let cred = Credential::new([with_uid_restriction(1000), with_gid_restriction(100)]);
        assert_eq!(cred.uid_restriction(), Some(1000));
        assert_eq!(cred.gid_restriction(), Some(100));
    }

    #[test]
    fn test_builder_matches_options() {
        let built = Credential::builder()
            .payload("Hello World")
            .ttl(800)
            .uid_restriction(7)
            .build();
        let composed = Credential::new([
            with_payload("Hello World"),
            with_ttl(800),
            with_uid_restriction(7),
        ]);
        assert_eq!(built, composed);
    }

    #[test]
    fn test_from_authority_accessors() {
        let cred = Credential::from_authority(
            Identity::new(1000, 100),
            Bytes::from_static(b"Hello World"),
            800,
        );
        assert_eq!(cred.uid(), 1000);
        assert_eq!(cred.gid(), 100);
        assert_eq!(cred.uid_string(), "1000");
        assert_eq!(cred.gid_string(), "100");
        assert_eq!(cred.payload(), b"Hello World");
        assert_eq!(cred.ttl(), 800);
    }

    #[test]
    fn test_from_authority_empty_payload() {
        let cred = Credential::from_authority(Identity::new(1, 1), Bytes::new(), 300);
        assert!(!cred.has_payload());
        assert_eq!(cred.payload(), b"");
    }

    #[test]
    fn test_payload_from_borrowed_slice() {
        let runtime = String::from("built at runtime").into_bytes();
        let cred = Credential::new([with_payload_slice(&runtime)]);
        drop(runtime);
        assert_eq!(cred.payload(), b"built at runtime");

        let empty = Credential::builder().payload_slice(&[]).build();
        assert!(!empty.has_payload());
    }

    #[test]
    fn test_debug_hides_payload() {
        let cred = Credential::new([with_payload("top secret")]);
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("top secret"));
        assert!(debug.contains("payload_len: 10"));
    }
}
