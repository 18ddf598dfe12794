//! Test fixtures and helpers.
//!
//! [`TestFixture`] wires a memory authority to a manual clock so tests can
//! move time around. [`ScriptedAuthority`] returns whatever statuses a test
//! asks for and counts how contexts are used.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use munge_cred::{CredentialService, ServiceConfig};
use munge_cred_authority::{
    Authority, AuthorityConfig, AuthorityContext, AuthorityKey, ManualClock, MemoryAuthority,
    StatusResult,
};
use munge_cred_core::{AuthorityStatus, Identity, TtlRequest};

/// Start time of every fixture clock (2023-11-14T22:13:20Z).
pub const FIXTURE_START: i64 = 1_700_000_000;

/// A memory authority on a manual clock, plus a service over it.
pub struct TestFixture {
    pub clock: Arc<ManualClock>,
    pub authority: MemoryAuthority,
    pub service: CredentialService<MemoryAuthority>,
}

impl TestFixture {
    /// Create a fixture with a random key and default authority config.
    pub fn new() -> Self {
        Self::with_config(AuthorityConfig::default())
    }

    /// Create a fixture with an explicit authority config.
    pub fn with_config(config: AuthorityConfig) -> Self {
        Self::with_key(&AuthorityKey::generate(), config)
    }

    /// Create a fixture over existing key material.
    pub fn with_key(key: &AuthorityKey, config: AuthorityConfig) -> Self {
        let clock = Arc::new(ManualClock::new(FIXTURE_START));
        let authority = MemoryAuthority::with_clock(key, config, clock.clone())
            .expect("fixture authority config is valid");
        let service = CredentialService::new(authority.clone());
        Self {
            clock,
            authority,
            service,
        }
    }

    /// A service for another process talking to the same authority.
    pub fn service_as(&self, identity: Identity) -> CredentialService<MemoryAuthority> {
        CredentialService::new(self.authority.connect_as(identity))
    }

    /// Move the authority clock by `secs` (may be negative).
    pub fn advance(&self, secs: i64) {
        self.clock.advance(secs);
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Services for `count` distinct identities sharing one authority.
///
/// Party `i` runs as uid `1000 + i`, gid `100 + i`.
pub fn multi_party_services(
    fixture: &TestFixture,
    count: u32,
) -> Vec<CredentialService<MemoryAuthority>> {
    (0..count)
        .map(|i| fixture.service_as(Identity::new(1000 + i, 100 + i)))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripted authority
// ─────────────────────────────────────────────────────────────────────────────

/// Token a scripted encode produces unless told otherwise.
pub const SCRIPTED_TOKEN: &str = "MUNGE:c2NyaXB0ZWQ=:";

#[derive(Debug, Clone)]
struct Script {
    create: Option<AuthorityStatus>,
    config: Option<AuthorityStatus>,
    encode: Option<AuthorityStatus>,
    decode: Option<AuthorityStatus>,
    ttl_read: Option<AuthorityStatus>,
    token: Option<String>,
    identity: Identity,
    payload: Vec<u8>,
    ttl: i64,
    delay: Option<Duration>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            create: None,
            config: None,
            encode: None,
            decode: None,
            ttl_read: None,
            token: Some(SCRIPTED_TOKEN.to_owned()),
            identity: Identity::new(1000, 1000),
            payload: Vec::new(),
            ttl: 300,
            delay: None,
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    created: AtomicUsize,
    released: AtomicUsize,
    encodes: AtomicUsize,
    decodes: AtomicUsize,
    last_ttl: Mutex<Option<TtlRequest>>,
}

/// An authority that follows a fixed script.
///
/// Every primitive succeeds unless a failure status was scripted for it.
/// A successful decode reports the scripted identity, payload and TTL
/// whatever token it was given.
#[derive(Debug, Default)]
pub struct ScriptedAuthority {
    script: Script,
    counters: Arc<Counters>,
}

impl ScriptedAuthority {
    /// An authority where everything succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `create_context` with `status`.
    pub fn fail_create(mut self, status: AuthorityStatus) -> Self {
        self.script.create = Some(status);
        self
    }

    /// Fail every context option setter with `status`.
    pub fn fail_config(mut self, status: AuthorityStatus) -> Self {
        self.script.config = Some(status);
        self
    }

    /// Fail `encode` with `status`.
    pub fn fail_encode(mut self, status: AuthorityStatus) -> Self {
        self.script.encode = Some(status);
        self
    }

    /// Fail `decode` with `status`.
    pub fn fail_decode(mut self, status: AuthorityStatus) -> Self {
        self.script.decode = Some(status);
        self
    }

    /// Fail the TTL read-back after a successful decode.
    pub fn fail_ttl_read(mut self, status: AuthorityStatus) -> Self {
        self.script.ttl_read = Some(status);
        self
    }

    /// Report success from `encode` without producing a token.
    pub fn without_token(mut self) -> Self {
        self.script.token = None;
        self
    }

    /// What a successful decode reports.
    pub fn decodes_to(mut self, identity: Identity, payload: &[u8], ttl: i64) -> Self {
        self.script.identity = identity;
        self.script.payload = payload.to_vec();
        self.script.ttl = ttl;
        self
    }

    /// Block every encode and decode for `delay`.
    pub fn stall(mut self, delay: Duration) -> Self {
        self.script.delay = Some(delay);
        self
    }

    /// Contexts created so far.
    pub fn contexts_created(&self) -> usize {
        self.counters.created.load(Ordering::SeqCst)
    }

    /// Contexts dropped so far.
    pub fn contexts_released(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }

    /// Number of `encode` invocations.
    pub fn encode_calls(&self) -> usize {
        self.counters.encodes.load(Ordering::SeqCst)
    }

    /// Number of `decode` invocations.
    pub fn decode_calls(&self) -> usize {
        self.counters.decodes.load(Ordering::SeqCst)
    }

    /// The TTL request attached to the most recent context, if any.
    pub fn last_ttl_request(&self) -> Option<TtlRequest> {
        *self
            .counters
            .last_ttl
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn pause(&self) {
        if let Some(delay) = self.script.delay {
            std::thread::sleep(delay);
        }
    }
}

impl Authority for ScriptedAuthority {
    type Context = ScriptedContext;

    fn create_context(&self) -> StatusResult<ScriptedContext> {
        if let Some(status) = self.script.create {
            return Err(status);
        }
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedContext {
            script: self.script.clone(),
            counters: Arc::clone(&self.counters),
            payload: Vec::new(),
            token: None,
            identity: Identity::UNSET,
            decoded: false,
        })
    }

    fn encode(&self, ctx: &mut ScriptedContext) -> StatusResult<()> {
        self.counters.encodes.fetch_add(1, Ordering::SeqCst);
        self.pause();
        if let Some(status) = self.script.encode {
            return Err(status);
        }
        ctx.token = self.script.token.clone();
        Ok(())
    }

    fn decode(&self, ctx: &mut ScriptedContext) -> StatusResult<()> {
        self.counters.decodes.fetch_add(1, Ordering::SeqCst);
        self.pause();
        if ctx.token.is_none() {
            return Err(AuthorityStatus::BadArg);
        }
        if let Some(status) = self.script.decode {
            return Err(status);
        }
        ctx.identity = self.script.identity;
        ctx.payload = self.script.payload.clone();
        ctx.decoded = true;
        Ok(())
    }

    fn status_message(&self, status: AuthorityStatus) -> String {
        format!("scripted: {}", status.message())
    }
}

/// Context for [`ScriptedAuthority`]. Counts itself released on drop.
#[derive(Debug)]
pub struct ScriptedContext {
    script: Script,
    counters: Arc<Counters>,
    payload: Vec<u8>,
    token: Option<String>,
    identity: Identity,
    decoded: bool,
}

impl ScriptedContext {
    fn configure(&self) -> StatusResult<()> {
        match self.script.config {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }
}

impl AuthorityContext for ScriptedContext {
    fn set_payload(&mut self, payload: &[u8]) {
        self.payload = payload.to_vec();
    }

    fn set_ttl(&mut self, ttl: TtlRequest) -> StatusResult<()> {
        *self
            .counters
            .last_ttl
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(ttl);
        self.configure()
    }

    fn set_uid_restriction(&mut self, _uid: u32) -> StatusResult<()> {
        self.configure()
    }

    fn set_gid_restriction(&mut self, _gid: u32) -> StatusResult<()> {
        self.configure()
    }

    fn set_token(&mut self, token: &str) -> StatusResult<()> {
        self.token = Some(token.to_owned());
        Ok(())
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn identity(&self) -> Identity {
        self.identity
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn ttl(&self) -> StatusResult<i64> {
        if let Some(status) = self.script.ttl_read {
            return Err(status);
        }
        Ok(if self.decoded { self.script.ttl } else { 0 })
    }
}

impl Drop for ScriptedContext {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// A service over a scripted authority with the given async deadline.
pub fn scripted_service(
    authority: ScriptedAuthority,
    deadline: Option<Duration>,
) -> CredentialService<ScriptedAuthority> {
    CredentialService::with_config(authority, ServiceConfig { deadline })
}
