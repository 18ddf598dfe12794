//! # munge-cred testkit
//!
//! Testing utilities for munge-cred.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A memory authority on a manual clock, and a scripted
//!   authority that returns chosen statuses and counts context usage
//! - **Generators**: Proptest strategies for payloads, TTLs and statuses
//! - **Status vectors**: The status-code to error-kind table, checkable
//!   against the service
//!
//! ## Test Fixtures
//!
//! ```rust
//! use munge_cred::{with_ttl, Credential, MungeError};
//! use munge_cred_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let token = fixture.service.encode(&Credential::new([with_ttl(1)])).unwrap();
//!
//! fixture.advance(2);
//! assert_eq!(fixture.service.decode(token).unwrap_err(), MungeError::CredExpired);
//! ```
//!
//! ## Scripted Authority
//!
//! ```rust
//! use munge_cred::{AuthorityStatus, MungeError};
//! use munge_cred_testkit::fixtures::{scripted_service, ScriptedAuthority, SCRIPTED_TOKEN};
//!
//! let service = scripted_service(
//!     ScriptedAuthority::new().fail_decode(AuthorityStatus::CredRewound),
//!     None,
//! );
//! assert_eq!(service.decode(SCRIPTED_TOKEN).unwrap_err(), MungeError::CredRewound);
//! assert_eq!(service.authority().contexts_released(), 1);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{
    multi_party_services, scripted_service, ScriptedAuthority, ScriptedContext, TestFixture,
    FIXTURE_START, SCRIPTED_TOKEN,
};
pub use generators::{payload, request, status, valid_ttl};
pub use vectors::{status_vectors, verify_status_vectors, DecodeKind, StatusVector};
