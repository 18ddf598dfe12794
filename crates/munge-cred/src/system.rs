//! Package-level operations against the local `munged`.
//!
//! Each call opens its own libmunge context; there is no shared state.

use munge_cred_authority::LibMungeAuthority;
use munge_cred_core::Token;

use crate::credential::Credential;
use crate::error::Result;
use crate::service::CredentialService;

/// A service bound to the daemon at libmunge's default socket.
pub fn system_service() -> CredentialService<LibMungeAuthority> {
    CredentialService::new(LibMungeAuthority::new())
}

/// Encode a credential with the local daemon.
pub fn encode(credential: &Credential) -> Result<Token> {
    system_service().encode(credential)
}

/// Encode a credential with no options.
pub fn encode_default() -> Result<Token> {
    system_service().encode_default()
}

/// Decode a token with the local daemon.
pub fn decode(token: impl AsRef<str>) -> Result<Credential> {
    system_service().decode(token)
}
