//! # munge-cred
//!
//! A client for MUNGE credentials: authenticated, time-limited identity
//! tokens minted by a trusted local authority.
//!
//! ## Overview
//!
//! A process *encodes* a [`Credential`] (optional payload, requested TTL,
//! optional decode restrictions) into an opaque token. Any holder of the
//! token can later *decode* it and learn, with the authority's guarantee,
//! the uid/gid of the process that encoded it along with the payload.
//!
//! - **Identity** is asserted by the authority, never by the caller
//! - **TTL** `0` asks for the authority default, `-1` for its maximum
//! - **Failures** are typed: expired, rewound, replayed, unauthorized and
//!   invalid credentials each have their own [`MungeError`] variant
//!
//! ## Usage
//!
//! ```rust
//! use munge_cred::{with_payload, with_ttl, Credential, CredentialService};
//! use munge_cred::authority::MemoryAuthority;
//!
//! let service = CredentialService::new(MemoryAuthority::generate());
//!
//! let request = Credential::new([with_payload("Hello World"), with_ttl(800)]);
//! let token = service.encode(&request).unwrap();
//! assert!(token.as_str().starts_with("MUNGE:"));
//!
//! let credential = service.decode(&token).unwrap();
//! assert_eq!(credential.payload(), b"Hello World");
//! assert_eq!(credential.ttl(), 800);
//! ```
//!
//! With the `libmunge` feature, [`encode`], [`encode_default`] and
//! [`decode`] talk to the local `munged` directly.
//!
//! ## Re-exports
//!
//! - `munge_cred::core` - Data model (identities, TTL requests, status codes)
//! - `munge_cred::authority` - Authority trait and implementations

pub mod config;
pub mod credential;
pub mod error;
pub mod service;
#[cfg(feature = "libmunge")]
pub mod system;

// Re-export component crates
pub use munge_cred_authority as authority;
pub use munge_cred_core as core;

// Re-export main types for convenience
pub use config::{ServiceConfig, DEFAULT_DEADLINE};
pub use credential::{
    with_gid_restriction, with_payload, with_payload_slice, with_ttl, with_uid_restriction,
    Credential, CredentialBuilder, CredentialOption,
};
pub use error::{ErrorLayer, MungeError, Result};
pub use service::CredentialService;
#[cfg(feature = "libmunge")]
pub use system::{decode, encode, encode_default, system_service};

// Re-export commonly used core types
pub use munge_cred_core::{AuthorityStatus, Identity, Token, TTL_DEFAULT, TTL_MAXIMUM};
