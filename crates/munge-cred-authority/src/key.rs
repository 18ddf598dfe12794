//! Shared key material for the in-memory authority.
//!
//! Every party that must decode a credential holds the same key, the way
//! every `munged` in a cluster shares `/etc/munge/munge.key`. The raw key is
//! never used directly; a sealing key is derived from it with blake3.

use chacha20poly1305::{aead::KeyInit, ChaCha20Poly1305, Key};
use rand::RngCore;
use std::fmt;
use std::path::Path;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{AuthorityError, Result};

/// Smallest accepted key, in bytes.
pub const MIN_KEY_LEN: usize = 32;

/// Largest accepted key, in bytes.
pub const MAX_KEY_LEN: usize = 1024;

/// Size of a freshly generated key, in bytes.
pub const GENERATED_KEY_LEN: usize = 128;

const SEALING_CONTEXT: &str = "munge-cred v1 credential sealing";

/// Raw key material shared by all parties of a trust domain.
///
/// Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct AuthorityKey(Vec<u8>);

impl AuthorityKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; GENERATED_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let mut bytes = bytes.into();
        if !(MIN_KEY_LEN..=MAX_KEY_LEN).contains(&bytes.len()) {
            let len = bytes.len();
            bytes.zeroize();
            return Err(AuthorityError::InvalidKeyLength {
                len,
                min: MIN_KEY_LEN,
                max: MAX_KEY_LEN,
            });
        }
        Ok(Self(bytes))
    }

    /// Load a key file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), len = bytes.len(), "loaded key file");
        Self::from_bytes(bytes)
    }

    /// Length of the key material in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: empty keys are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Derive the credential sealing key.
    pub fn sealing_key(&self) -> SealingKey {
        SealingKey(blake3::derive_key(SEALING_CONTEXT, &self.0))
    }
}

impl fmt::Debug for AuthorityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthorityKey({} bytes)", self.0.len())
    }
}

/// A 256-bit ChaCha20-Poly1305 key derived from an [`AuthorityKey`].
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SealingKey([u8; 32]);

impl SealingKey {
    /// Build the AEAD cipher for this key.
    pub fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.0))
    }
}

impl fmt::Debug for SealingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SealingKey(..)")
    }
}
