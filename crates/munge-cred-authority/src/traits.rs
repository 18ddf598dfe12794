//! Authority trait: the primitive contract with the trusted authority.
//!
//! A client talks to an authority exclusively through a per-call context:
//! configure it, run `encode` or `decode` against it, read results back, and
//! drop it. Dropping the context is the release step; implementations must
//! free every authority-side resource in `Drop`.

use munge_cred_core::{AuthorityStatus, Identity, TtlRequest};

/// Result of an authority primitive.
///
/// The error side is never [`AuthorityStatus::Success`].
pub type StatusResult<T> = std::result::Result<T, AuthorityStatus>;

/// A scoped, single-use authority context.
///
/// A context holds both the inputs of a call (payload, TTL, restrictions,
/// token to decode) and its outputs (token, identity, payload, TTL). It is
/// owned by exactly one invocation and is never shared.
pub trait AuthorityContext {
    // ─────────────────────────────────────────────────────────────────────────
    // Inputs
    // ─────────────────────────────────────────────────────────────────────────

    /// Attach an opaque payload to encode. Length-delimited: embedded NUL
    /// bytes are preserved.
    fn set_payload(&mut self, payload: &[u8]);

    /// Request a TTL for the credential being encoded.
    fn set_ttl(&mut self, ttl: TtlRequest) -> StatusResult<()>;

    /// Restrict decoding to a uid.
    fn set_uid_restriction(&mut self, uid: u32) -> StatusResult<()>;

    /// Restrict decoding to a gid.
    fn set_gid_restriction(&mut self, gid: u32) -> StatusResult<()>;

    /// Attach a token to decode.
    fn set_token(&mut self, token: &str) -> StatusResult<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Outputs
    // ─────────────────────────────────────────────────────────────────────────

    /// The token produced by a successful encode.
    fn token(&self) -> Option<&str>;

    /// The identity embedded in a successfully decoded token.
    fn identity(&self) -> Identity;

    /// The payload embedded in a successfully decoded token.
    fn payload(&self) -> &[u8];

    /// The TTL in effect for this context. After a decode this is the TTL
    /// configured in the token, in seconds.
    fn ttl(&self) -> StatusResult<i64>;
}

/// The trusted authority that mints and verifies credentials.
///
/// Implementations must be thread-safe: concurrent callers each create
/// their own context and block independently.
pub trait Authority: Send + Sync {
    /// The per-call context type.
    type Context: AuthorityContext;

    /// Acquire a fresh context.
    fn create_context(&self) -> StatusResult<Self::Context>;

    /// Encode the credential described by `ctx`.
    ///
    /// On success the token is available from [`AuthorityContext::token`].
    /// The identity embedded in the token is that of the calling process;
    /// nothing in the context can influence it.
    fn encode(&self, ctx: &mut Self::Context) -> StatusResult<()>;

    /// Validate and decode the token attached to `ctx`.
    fn decode(&self, ctx: &mut Self::Context) -> StatusResult<()>;

    /// Human-readable description of a status.
    fn status_message(&self, status: AuthorityStatus) -> String {
        status.message().to_owned()
    }
}
