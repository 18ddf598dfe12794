//! # munge-cred core
//!
//! Pure data model shared by munge-cred authorities and clients: identities,
//! TTL requests, opaque tokens, and the authority's status codes.
//!
//! This crate contains no I/O and never talks to an authority. It only
//! describes what an authority can be asked and what it can answer.
//!
//! ## Key Types
//!
//! - [`Identity`] - The uid/gid pair asserted by the authority
//! - [`TtlRequest`] - A validated time-to-live request
//! - [`AuthorityStatus`] - The closed set of authority status codes
//! - [`Token`] - An opaque encoded credential
//!
//! ## Usage
//!
//! ```rust
//! use munge_cred_core::{AuthorityStatus, TtlRequest, TTL_MAXIMUM};
//!
//! assert_eq!(TtlRequest::from_seconds(800), Ok(Some(TtlRequest::Literal(800))));
//! assert_eq!(TtlRequest::from_seconds(TTL_MAXIMUM), Ok(Some(TtlRequest::Maximum)));
//! assert!(TtlRequest::from_seconds(-2).is_err());
//!
//! assert_eq!(AuthorityStatus::from_code(15), AuthorityStatus::CredExpired);
//! ```

pub mod error;
pub mod identity;
pub mod status;
pub mod token;
pub mod ttl;

pub use error::{CoreError, Result};
pub use identity::Identity;
pub use status::AuthorityStatus;
pub use token::{Token, TOKEN_PREFIX, TOKEN_SUFFIX};
pub use ttl::{TtlRequest, TTL_DEFAULT, TTL_MAXIMUM};
