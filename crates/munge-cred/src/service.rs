//! The credential service: encode and decode against an authority.
//!
//! Every call creates its own authority context and drops it before
//! returning, on success and on every error path. Nothing is cached
//! between calls and nothing is retried.

use std::sync::Arc;

use bytes::Bytes;
use munge_cred_authority::{Authority, AuthorityContext, StatusResult};
use munge_cred_core::{AuthorityStatus, Token, TtlRequest};
use zeroize::Zeroize;

use crate::config::ServiceConfig;
use crate::credential::Credential;
use crate::error::{MungeError, Result};

/// Encodes and decodes credentials through an [`Authority`].
///
/// Cheap to clone; clones share the authority.
#[derive(Debug)]
pub struct CredentialService<A: Authority> {
    authority: Arc<A>,
    config: ServiceConfig,
}

impl<A: Authority> Clone for CredentialService<A> {
    fn clone(&self) -> Self {
        Self {
            authority: Arc::clone(&self.authority),
            config: self.config.clone(),
        }
    }
}

impl<A: Authority> CredentialService<A> {
    /// Create a service with the default configuration.
    pub fn new(authority: A) -> Self {
        Self::with_config(authority, ServiceConfig::default())
    }

    /// Create a service with an explicit configuration.
    pub fn with_config(authority: A, config: ServiceConfig) -> Self {
        Self::from_shared(Arc::new(authority), config)
    }

    /// Create a service over an authority shared with other owners.
    pub fn from_shared(authority: Arc<A>, config: ServiceConfig) -> Self {
        Self { authority, config }
    }

    /// The underlying authority.
    pub fn authority(&self) -> &A {
        &self.authority
    }

    /// The service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Encode
    // ─────────────────────────────────────────────────────────────────────────

    /// Encode a credential into a token.
    ///
    /// The TTL is validated before the authority is contacted. The identity
    /// carried by `credential` is never sent; the token always asserts the
    /// identity the authority sees for this process.
    pub fn encode(&self, credential: &Credential) -> Result<Token> {
        let ttl = TtlRequest::from_seconds(credential.ttl())?;

        tracing::debug!(
            payload_len = credential.payload().len(),
            ttl = credential.ttl(),
            "encoding credential"
        );

        let mut ctx = self
            .authority
            .create_context()
            .map_err(|status| MungeError::EncodeFailed { status })?;

        if credential.has_payload() {
            ctx.set_payload(credential.payload());
        }
        if let Some(ttl) = ttl {
            ctx.set_ttl(ttl).map_err(encode_config_error)?;
        }
        if let Some(uid) = credential.uid_restriction() {
            ctx.set_uid_restriction(uid).map_err(encode_config_error)?;
        }
        if let Some(gid) = credential.gid_restriction() {
            ctx.set_gid_restriction(gid).map_err(encode_config_error)?;
        }

        if let Err(status) = self.authority.encode(&mut ctx) {
            tracing::warn!(%status, "credential encode failed");
            return Err(MungeError::EncodeFailed { status });
        }

        let token = ctx.token().map(Token::from).ok_or_else(|| {
            tracing::warn!("authority reported success without a token");
            MungeError::EncodeFailed {
                status: AuthorityStatus::Snafu,
            }
        })?;

        tracing::debug!(?token, "encoded credential");
        Ok(token)
    }

    /// Encode a credential with no payload and the authority's default TTL.
    pub fn encode_default(&self) -> Result<Token> {
        self.encode(&Credential::default())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Decode
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate and decode a token.
    ///
    /// On success the returned credential carries the encoder's identity,
    /// the payload, and the TTL configured in the token. On failure no part
    /// of the credential is returned.
    pub fn decode(&self, token: impl AsRef<str>) -> Result<Credential> {
        let token = token.as_ref();
        tracing::debug!(token_len = token.len(), "decoding credential");

        let mut ctx = self
            .authority
            .create_context()
            .map_err(|status| self.decode_error(status))?;
        ctx.set_token(token)
            .map_err(|status| self.decode_error(status))?;

        if let Err(status) = self.authority.decode(&mut ctx) {
            let err = self.decode_error(status);
            tracing::warn!(%status, error = %err, "credential decode failed");
            return Err(err);
        }

        let identity = ctx.identity();
        let mut payload = ctx.payload().to_vec();
        let ttl = match ctx.ttl() {
            Ok(ttl) if ttl >= 0 => ttl,
            Ok(ttl) => {
                payload.zeroize();
                tracing::warn!(ttl, "authority returned a TTL sentinel on decode");
                return Err(MungeError::TtlReadError {
                    status: AuthorityStatus::Snafu,
                });
            }
            Err(status) => {
                payload.zeroize();
                tracing::warn!(%status, "failed to read decoded TTL");
                return Err(MungeError::TtlReadError { status });
            }
        };

        tracing::debug!(
            %identity,
            payload_len = payload.len(),
            ttl,
            "decoded credential"
        );
        Ok(Credential::from_authority(identity, Bytes::from(payload), ttl))
    }

    fn decode_error(&self, status: AuthorityStatus) -> MungeError {
        MungeError::from_decode_status(status, || self.authority.status_message(status))
    }
}

fn encode_config_error(status: AuthorityStatus) -> MungeError {
    MungeError::EncodeConfigError { status }
}

// ─────────────────────────────────────────────────────────────────────────────
// Async
// ─────────────────────────────────────────────────────────────────────────────

impl<A: Authority + 'static> CredentialService<A> {
    /// Encode on the blocking pool, bounded by the configured deadline.
    ///
    /// A deadline trip returns `EncodeFailed` with a `DeadlineExceeded`
    /// status. The abandoned call still runs to completion in the background
    /// and releases its context; it is not retried.
    pub async fn encode_async(&self, credential: Credential) -> Result<Token> {
        TtlRequest::from_seconds(credential.ttl())?;

        match self.run_blocking(move |service| service.encode(&credential)).await {
            Ok(result) => result,
            Err(status) => Err(MungeError::EncodeFailed { status }),
        }
    }

    /// Decode on the blocking pool, bounded by the configured deadline.
    ///
    /// A deadline trip returns `DecodeFailed` with a `DeadlineExceeded`
    /// status.
    pub async fn decode_async(&self, token: impl AsRef<str>) -> Result<Credential> {
        let token = token.as_ref().to_owned();

        match self.run_blocking(move |service| service.decode(&token)).await {
            Ok(result) => result,
            Err(status) => Err(MungeError::DecodeFailed {
                status,
                message: self.authority.status_message(status),
            }),
        }
    }

    /// Run `op` on the blocking pool. The outer error is the status that
    /// stands in for a call that never finished.
    async fn run_blocking<T, F>(&self, op: F) -> StatusResult<Result<T>>
    where
        T: Send + 'static,
        F: FnOnce(&Self) -> Result<T> + Send + 'static,
    {
        let service = self.clone();
        let task = tokio::task::spawn_blocking(move || op(&service));

        let joined = match self.config.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::warn!(?deadline, "authority call exceeded deadline");
                    return Err(AuthorityStatus::DeadlineExceeded);
                }
            },
            None => task.await,
        };

        joined.map_err(|err| {
            tracing::warn!(%err, "authority call aborted");
            AuthorityStatus::Snafu
        })
    }
}
