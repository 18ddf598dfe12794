//! In-memory implementation of the Authority trait.
//!
//! Behaves like a MUNGE daemon reachable without a socket: it seals
//! credentials with a shared key, stamps them with the identity of the
//! connected process, and enforces TTL windows, clock skew, decode
//! restrictions, and single use on decode.
//!
//! Handles created with [`MemoryAuthority::connect_as`] share key, clock and
//! replay cache, which stands in for several processes talking to the same
//! daemon.

use std::sync::Arc;

use bytes::Bytes;
use munge_cred_core::{AuthorityStatus, Identity, TtlRequest};
use zeroize::Zeroizing;

use crate::clock::{Clock, SystemClock};
use crate::config::AuthorityConfig;
use crate::envelope::{self, CredentialBody};
use crate::error::Result;
use crate::key::{AuthorityKey, SealingKey};
use crate::process::current_identity;
use crate::replay::ReplayCache;
use crate::traits::{Authority, AuthorityContext, StatusResult};

/// In-memory authority.
///
/// Cheap to clone; clones share all state and the connected identity.
#[derive(Debug, Clone)]
pub struct MemoryAuthority {
    shared: Arc<Shared>,
    identity: Identity,
}

#[derive(Debug)]
struct Shared {
    key: SealingKey,
    config: AuthorityConfig,
    clock: Arc<dyn Clock>,
    replay: ReplayCache,
}

impl MemoryAuthority {
    /// Create an authority using the system clock, connected as the
    /// current process.
    pub fn new(key: &AuthorityKey, config: AuthorityConfig) -> Result<Self> {
        Self::with_clock(key, config, Arc::new(SystemClock))
    }

    /// Create an authority with an explicit clock.
    pub fn with_clock(
        key: &AuthorityKey,
        config: AuthorityConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared {
                key: key.sealing_key(),
                config,
                clock,
                replay: ReplayCache::new(),
            }),
            identity: current_identity(),
        })
    }

    /// Create an authority with a random key and default configuration.
    pub fn generate() -> Self {
        Self {
            shared: Arc::new(Shared {
                key: AuthorityKey::generate().sealing_key(),
                config: AuthorityConfig::default(),
                clock: Arc::new(SystemClock),
                replay: ReplayCache::new(),
            }),
            identity: current_identity(),
        }
    }

    /// A handle to the same authority for a different connected process.
    pub fn connect_as(&self, identity: Identity) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            identity,
        }
    }

    /// The identity of the connected process.
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// The authority configuration.
    pub fn config(&self) -> &AuthorityConfig {
        &self.shared.config
    }

    /// Number of live replay-cache entries.
    pub fn replay_entries(&self) -> usize {
        self.shared.replay.len()
    }

    /// Turn a TTL request into the effective TTL.
    fn resolve_ttl(&self, request: Option<TtlRequest>) -> u32 {
        let config = &self.shared.config;
        match request {
            None => config.default_ttl,
            Some(TtlRequest::Maximum) => config.max_ttl,
            Some(TtlRequest::Literal(seconds)) => seconds.min(config.max_ttl),
        }
    }
}

impl Authority for MemoryAuthority {
    type Context = MemoryContext;

    fn create_context(&self) -> StatusResult<MemoryContext> {
        Ok(MemoryContext::default())
    }

    fn encode(&self, ctx: &mut MemoryContext) -> StatusResult<()> {
        let config = &self.shared.config;
        if ctx.payload.len() > config.max_payload_len {
            return Err(AuthorityStatus::BadLength);
        }

        let body = CredentialBody {
            encode_time: self.shared.clock.now(),
            ttl: self.resolve_ttl(ctx.ttl),
            uid: self.identity.uid,
            gid: self.identity.gid,
            uid_restriction: ctx.uid_restriction,
            gid_restriction: ctx.gid_restriction,
            payload: Bytes::copy_from_slice(&ctx.payload),
        };
        let token = envelope::seal(&self.shared.key, &body)?;

        tracing::debug!(
            identity = %self.identity,
            ttl = body.ttl,
            payload_len = body.payload.len(),
            "encoded credential"
        );

        ctx.token = Some(Zeroizing::new(token));
        Ok(())
    }

    fn decode(&self, ctx: &mut MemoryContext) -> StatusResult<()> {
        let token = ctx.token.as_deref().ok_or(AuthorityStatus::BadArg)?;
        let opened = envelope::open(&self.shared.key, token)?;
        let body = opened.body;

        let now = self.shared.clock.now();
        let skew = i64::from(self.shared.config.clock_skew);

        if now + skew < body.encode_time {
            tracing::warn!(encode_time = body.encode_time, now, "rewound credential");
            return Err(AuthorityStatus::CredRewound);
        }
        if now > body.expires_at() + skew {
            return Err(AuthorityStatus::CredExpired);
        }
        if body.uid_restriction.is_some_and(|uid| uid != self.identity.uid)
            || body.gid_restriction.is_some_and(|gid| gid != self.identity.gid)
        {
            tracing::warn!(decoder = %self.identity, "unauthorized credential decode");
            return Err(AuthorityStatus::CredUnauthorized);
        }
        if self.shared.config.replay_detection
            && !self
                .shared
                .replay
                .insert(opened.digest, body.expires_at() + skew, now)
        {
            tracing::warn!(decoder = %self.identity, "replayed credential");
            return Err(AuthorityStatus::CredReplayed);
        }

        tracing::debug!(
            encoder = body.uid,
            decoder = %self.identity,
            ttl = body.ttl,
            "decoded credential"
        );

        ctx.payload = Zeroizing::new(body.payload.to_vec());
        ctx.ttl = Some(TtlRequest::Literal(body.ttl));
        ctx.decoded = Some(Identity::new(body.uid, body.gid));
        Ok(())
    }
}

/// Context for [`MemoryAuthority`].
///
/// Payload and token buffers are zeroized when replaced or dropped.
#[derive(Debug, Default)]
pub struct MemoryContext {
    payload: Zeroizing<Vec<u8>>,
    ttl: Option<TtlRequest>,
    uid_restriction: Option<u32>,
    gid_restriction: Option<u32>,
    token: Option<Zeroizing<String>>,
    decoded: Option<Identity>,
}

impl AuthorityContext for MemoryContext {
    fn set_payload(&mut self, payload: &[u8]) {
        self.payload = Zeroizing::new(payload.to_vec());
    }

    fn set_ttl(&mut self, ttl: TtlRequest) -> StatusResult<()> {
        self.ttl = Some(ttl);
        Ok(())
    }

    fn set_uid_restriction(&mut self, uid: u32) -> StatusResult<()> {
        self.uid_restriction = Some(uid);
        Ok(())
    }

    fn set_gid_restriction(&mut self, gid: u32) -> StatusResult<()> {
        self.gid_restriction = Some(gid);
        Ok(())
    }

    fn set_token(&mut self, token: &str) -> StatusResult<()> {
        self.token = Some(Zeroizing::new(token.to_owned()));
        Ok(())
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref().map(String::as_str)
    }

    fn identity(&self) -> Identity {
        self.decoded.unwrap_or(Identity::UNSET)
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn ttl(&self) -> StatusResult<i64> {
        Ok(self.ttl.map_or(0, TtlRequest::as_raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const START: i64 = 1_700_000_000;

    fn authority_with_clock(config: AuthorityConfig) -> (MemoryAuthority, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(START));
        let authority =
            MemoryAuthority::with_clock(&AuthorityKey::generate(), config, clock.clone()).unwrap();
        (authority, clock)
    }

    fn encode(authority: &MemoryAuthority, payload: &[u8], ttl: Option<TtlRequest>) -> String {
        let mut ctx = authority.create_context().unwrap();
        ctx.set_payload(payload);
        if let Some(ttl) = ttl {
            ctx.set_ttl(ttl).unwrap();
        }
        authority.encode(&mut ctx).unwrap();
        ctx.token().unwrap().to_owned()
    }

    fn decode(authority: &MemoryAuthority, token: &str) -> StatusResult<MemoryContext> {
        let mut ctx = authority.create_context()?;
        ctx.set_token(token)?;
        authority.decode(&mut ctx)?;
        Ok(ctx)
    }

    #[test]
    fn test_roundtrip() {
        let authority = MemoryAuthority::generate();
        let token = encode(&authority, b"Hello World", Some(TtlRequest::Literal(800)));

        let ctx = decode(&authority, &token).unwrap();
        assert_eq!(ctx.payload(), b"Hello World");
        assert_eq!(ctx.ttl(), Ok(800));
        assert_eq!(ctx.identity(), current_identity());
    }

    #[test]
    fn test_default_and_maximum_ttl() {
        let authority = MemoryAuthority::generate();

        let token = encode(&authority, b"", None);
        assert_eq!(decode(&authority, &token).unwrap().ttl(), Ok(300));

        let token = encode(&authority, b"", Some(TtlRequest::Maximum));
        assert_eq!(decode(&authority, &token).unwrap().ttl(), Ok(3600));
    }

    #[test]
    fn test_literal_ttl_is_clamped() {
        let authority = MemoryAuthority::generate();
        let token = encode(&authority, b"", Some(TtlRequest::Literal(u32::MAX)));
        assert_eq!(decode(&authority, &token).unwrap().ttl(), Ok(3600));
    }

    #[test]
    fn test_identity_comes_from_connection() {
        let authority = MemoryAuthority::generate();
        let alice = authority.connect_as(Identity::new(1001, 1001));

        let token = encode(&alice, b"", None);
        let ctx = decode(&authority, &token).unwrap();
        assert_eq!(ctx.identity(), Identity::new(1001, 1001));
    }

    #[test]
    fn test_expired() {
        let (authority, clock) = authority_with_clock(AuthorityConfig::default());
        let token = encode(&authority, b"", Some(TtlRequest::Literal(1)));

        clock.advance(2);
        assert_eq!(decode(&authority, &token).unwrap_err(), AuthorityStatus::CredExpired);
    }

    #[test]
    fn test_last_second_of_window_is_valid() {
        let (authority, clock) = authority_with_clock(AuthorityConfig::default());
        let token = encode(&authority, b"", Some(TtlRequest::Literal(10)));

        clock.advance(10);
        assert!(decode(&authority, &token).is_ok());
    }

    #[test]
    fn test_clock_skew_extends_window() {
        let config = AuthorityConfig {
            clock_skew: 5,
            ..AuthorityConfig::default()
        };
        let (authority, clock) = authority_with_clock(config);
        let token = encode(&authority, b"", Some(TtlRequest::Literal(1)));

        clock.advance(6);
        assert!(decode(&authority, &token).is_ok());
    }

    #[test]
    fn test_rewound() {
        let (authority, clock) = authority_with_clock(AuthorityConfig::default());
        let token = encode(&authority, b"", None);

        clock.advance(-60);
        assert_eq!(decode(&authority, &token).unwrap_err(), AuthorityStatus::CredRewound);
    }

    #[test]
    fn test_replayed() {
        let authority = MemoryAuthority::generate();
        let token = encode(&authority, b"once", None);

        assert!(decode(&authority, &token).is_ok());
        assert_eq!(decode(&authority, &token).unwrap_err(), AuthorityStatus::CredReplayed);
        assert_eq!(authority.replay_entries(), 1);
    }

    #[test]
    fn test_reframed_token_is_replayed() {
        let authority = MemoryAuthority::generate();
        let token = encode(&authority, b"once", None);
        assert!(decode(&authority, &token).is_ok());

        let reordered = crate::envelope::tests::reorder_envelope(&token);
        assert_ne!(reordered, token);
        assert_eq!(decode(&authority, &reordered).unwrap_err(), AuthorityStatus::CredReplayed);
        assert_eq!(authority.replay_entries(), 1);
    }

    #[test]
    fn test_replay_detection_can_be_disabled() {
        let config = AuthorityConfig {
            replay_detection: false,
            ..AuthorityConfig::default()
        };
        let authority = MemoryAuthority::new(&AuthorityKey::generate(), config).unwrap();
        let token = encode(&authority, b"", None);

        assert!(decode(&authority, &token).is_ok());
        assert!(decode(&authority, &token).is_ok());
    }

    #[test]
    fn test_uid_restriction() {
        let authority = MemoryAuthority::generate();
        let alice = authority.connect_as(Identity::new(1001, 100));
        let bob = authority.connect_as(Identity::new(1002, 100));

        let mut ctx = authority.create_context().unwrap();
        ctx.set_uid_restriction(1001).unwrap();
        authority.encode(&mut ctx).unwrap();
        let token = ctx.token().unwrap().to_owned();

        assert_eq!(decode(&bob, &token).unwrap_err(), AuthorityStatus::CredUnauthorized);
        assert!(decode(&alice, &token).is_ok());
    }

    #[test]
    fn test_gid_restriction() {
        let authority = MemoryAuthority::generate();
        let staff = authority.connect_as(Identity::new(1001, 50));
        let guest = authority.connect_as(Identity::new(1002, 60));

        let mut ctx = authority.create_context().unwrap();
        ctx.set_gid_restriction(50).unwrap();
        authority.encode(&mut ctx).unwrap();
        let token = ctx.token().unwrap().to_owned();

        assert_eq!(decode(&guest, &token).unwrap_err(), AuthorityStatus::CredUnauthorized);
        assert!(decode(&staff, &token).is_ok());
    }

    #[test]
    fn test_foreign_key_is_invalid() {
        let token = encode(&MemoryAuthority::generate(), b"", None);
        assert_eq!(
            decode(&MemoryAuthority::generate(), &token).unwrap_err(),
            AuthorityStatus::CredInvalid
        );
    }

    #[test]
    fn test_shared_key_across_authorities() {
        let key = AuthorityKey::generate();
        let node_a = MemoryAuthority::new(&key, AuthorityConfig::default()).unwrap();
        let node_b = MemoryAuthority::new(&key, AuthorityConfig::default()).unwrap();

        let token = encode(&node_a, b"cluster", None);
        assert_eq!(decode(&node_b, &token).unwrap().payload(), b"cluster");
    }

    #[test]
    fn test_decode_without_token() {
        let authority = MemoryAuthority::generate();
        let mut ctx = authority.create_context().unwrap();
        assert_eq!(authority.decode(&mut ctx).unwrap_err(), AuthorityStatus::BadArg);
    }

    #[test]
    fn test_oversized_payload() {
        let config = AuthorityConfig {
            max_payload_len: 4,
            ..AuthorityConfig::default()
        };
        let authority = MemoryAuthority::new(&AuthorityKey::generate(), config).unwrap();
        let mut ctx = authority.create_context().unwrap();
        ctx.set_payload(b"12345");
        assert_eq!(authority.encode(&mut ctx).unwrap_err(), AuthorityStatus::BadLength);
        assert!(ctx.token().is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AuthorityConfig {
            default_ttl: 0,
            ..AuthorityConfig::default()
        };
        assert!(MemoryAuthority::new(&AuthorityKey::generate(), config).is_err());
    }

    #[test]
    fn test_embedded_nul_payload() {
        let authority = MemoryAuthority::generate();
        let token = encode(&authority, b"\0\0abc\0", None);
        assert_eq!(decode(&authority, &token).unwrap().payload(), b"\0\0abc\0");
    }
}
