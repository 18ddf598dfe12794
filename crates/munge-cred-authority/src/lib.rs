//! # munge-cred authority
//!
//! The trusted credential authority behind munge-cred, reduced to the
//! primitive contract the client needs: create a context, configure it,
//! encode or decode, read results back.
//!
//! ## Overview
//!
//! The [`Authority`] trait keeps the client independent of how credentials
//! are actually minted. Two implementations ship here:
//!
//! - [`MemoryAuthority`] - An in-process authority with the same status
//!   semantics as the MUNGE daemon (sealed tokens, TTL windows, clock
//!   checks, decode restrictions, replay detection). Used for tests and for
//!   single-host embedding.
//! - `LibMungeAuthority` - A binding to the system `libmunge`, enabled with
//!   the `libmunge` feature.
//!
//! ## Key Types
//!
//! - [`Authority`] / [`AuthorityContext`] - The primitive contract
//! - [`AuthorityKey`] - Shared key material for the memory authority
//! - [`AuthorityConfig`] - TTL limits, clock skew, replay detection
//! - [`Clock`] - Time source ([`SystemClock`], [`ManualClock`])
//!
//! ## Usage
//!
//! ```rust
//! use munge_cred_authority::{Authority, AuthorityContext, MemoryAuthority};
//! use munge_cred_core::TtlRequest;
//!
//! let authority = MemoryAuthority::generate();
//!
//! let mut ctx = authority.create_context().unwrap();
//! ctx.set_payload(b"Hello World");
//! ctx.set_ttl(TtlRequest::Literal(800)).unwrap();
//! authority.encode(&mut ctx).unwrap();
//! let token = ctx.token().unwrap().to_owned();
//!
//! let mut ctx = authority.create_context().unwrap();
//! ctx.set_token(&token).unwrap();
//! authority.decode(&mut ctx).unwrap();
//! assert_eq!(ctx.payload(), b"Hello World");
//! assert_eq!(ctx.ttl(), Ok(800));
//! ```
//!
//! ## Design Notes
//!
//! - **Status codes, not errors**: primitives return
//!   `Result<_, AuthorityStatus>`; the status code is the contract
//! - **Scoped contexts**: every context releases its resources (and zeroizes
//!   its buffers) when dropped
//! - **No retries**: an authority never re-submits a token on its own

pub mod clock;
pub mod config;
pub mod envelope;
pub mod error;
pub mod key;
#[cfg(feature = "libmunge")]
pub mod libmunge;
pub mod memory;
pub mod process;
pub mod replay;
pub mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AuthorityConfig;
pub use error::{AuthorityError, Result};
pub use key::{AuthorityKey, SealingKey};
#[cfg(feature = "libmunge")]
pub use libmunge::{LibMungeAuthority, LibMungeContext};
pub use memory::{MemoryAuthority, MemoryContext};
pub use process::current_identity;
pub use replay::ReplayCache;
pub use traits::{Authority, AuthorityContext, StatusResult};
