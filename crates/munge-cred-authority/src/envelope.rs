//! Sealed token envelope used by the in-memory authority.
//!
//! Token format: `MUNGE:` || base64(CBOR envelope) || `:`.
//!
//! The envelope carries a format version, a random 96-bit nonce, and the
//! ChaCha20-Poly1305 ciphertext of the CBOR-encoded [`CredentialBody`]. The
//! version byte is bound as associated data, so any tampering with the
//! envelope surfaces as an authentication failure.
//!
//! The CBOR framing itself is not authenticated and can be re-encoded in
//! several equivalent ways, so replay digests cover only the AEAD inputs.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use chacha20poly1305::aead::{Aead, Payload};
use chacha20poly1305::Nonce;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use munge_cred_core::{AuthorityStatus, TOKEN_PREFIX, TOKEN_SUFFIX};

use crate::key::SealingKey;
use crate::traits::StatusResult;

/// Current envelope format version.
pub const ENVELOPE_VERSION: u8 = 1;

/// Everything the authority asserts about a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialBody {
    /// Unix time (seconds) at which the credential was encoded.
    pub encode_time: i64,
    /// Effective TTL in seconds.
    pub ttl: u32,
    /// Uid of the encoding process.
    pub uid: u32,
    /// Gid of the encoding process.
    pub gid: u32,
    /// Only this uid may decode.
    pub uid_restriction: Option<u32>,
    /// Only this gid may decode.
    pub gid_restriction: Option<u32>,
    /// Opaque application payload.
    pub payload: Bytes,
}

impl CredentialBody {
    /// Unix time at which the TTL window closes.
    pub fn expires_at(&self) -> i64 {
        self.encode_time + i64::from(self.ttl)
    }
}

#[derive(Serialize, Deserialize)]
struct SealedEnvelope {
    version: u8,
    nonce: [u8; 12],
    ciphertext: Bytes,
}

impl SealedEnvelope {
    /// Digest of `version || nonce || ciphertext`, independent of how the
    /// envelope happens to be framed.
    fn digest(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[self.version]);
        hasher.update(&self.nonce);
        hasher.update(&self.ciphertext);
        *hasher.finalize().as_bytes()
    }
}

/// A successfully opened token.
#[derive(Debug)]
pub struct OpenedCredential {
    /// The authenticated credential body.
    pub body: CredentialBody,
    /// Blake3 digest of the authenticated envelope fields, for replay
    /// detection.
    pub digest: [u8; 32],
}

/// Seal a credential body into a token.
pub fn seal(key: &SealingKey, body: &CredentialBody) -> StatusResult<String> {
    let mut plaintext = Vec::new();
    ciborium::into_writer(body, &mut plaintext).map_err(|_| AuthorityStatus::Snafu)?;

    let mut nonce = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut nonce);

    let sealed = key.cipher().encrypt(
        Nonce::from_slice(&nonce),
        Payload {
            msg: &plaintext,
            aad: &[ENVELOPE_VERSION],
        },
    );
    plaintext.zeroize();
    let ciphertext = sealed.map_err(|_| AuthorityStatus::Snafu)?;

    let envelope = SealedEnvelope {
        version: ENVELOPE_VERSION,
        nonce,
        ciphertext: Bytes::from(ciphertext),
    };
    let mut raw = Vec::new();
    ciborium::into_writer(&envelope, &mut raw).map_err(|_| AuthorityStatus::Snafu)?;

    Ok(format!("{}{}{}", TOKEN_PREFIX, BASE64.encode(&raw), TOKEN_SUFFIX))
}

/// Open a token and authenticate its body.
///
/// Surrounding whitespace is ignored. Returns `BadCred` for anything that is
/// not a well-formed envelope, `BadVersion` for an unknown envelope version,
/// and `CredInvalid` when authentication fails.
pub fn open(key: &SealingKey, token: &str) -> StatusResult<OpenedCredential> {
    let armored = token
        .trim()
        .strip_prefix(TOKEN_PREFIX)
        .and_then(|t| t.strip_suffix(TOKEN_SUFFIX))
        .ok_or(AuthorityStatus::BadCred)?;

    let raw = BASE64
        .decode(armored)
        .map_err(|_| AuthorityStatus::BadCred)?;
    let envelope: SealedEnvelope =
        ciborium::from_reader(&raw[..]).map_err(|_| AuthorityStatus::BadCred)?;

    if envelope.version != ENVELOPE_VERSION {
        return Err(AuthorityStatus::BadVersion);
    }

    let plaintext = key
        .cipher()
        .decrypt(
            Nonce::from_slice(&envelope.nonce),
            Payload {
                msg: &envelope.ciphertext,
                aad: &[envelope.version],
            },
        )
        .map(Zeroizing::new)
        .map_err(|_| AuthorityStatus::CredInvalid)?;

    let body = ciborium::from_reader(&plaintext[..]).map_err(|_| AuthorityStatus::CredInvalid)?;

    Ok(OpenedCredential {
        body,
        digest: envelope.digest(),
    })
}
