//! [`CryptoKey`]: the 32-byte key derived from a user secret.
//!
//! Every driver and the message verifier start from `SHA-256(secret)`. The raw
//! secret is validated, hashed and then dropped; only the digest is retained,
//! inside a buffer that is overwritten with zeroes on drop.

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::EncryptionError;

/// Byte length of a derived key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Minimum accepted length of a user secret, in bytes.
pub const MIN_KEY_LEN: usize = 16;

/// Fixed-size key buffer holding `SHA-256(secret)`.
#[derive(Clone)]
pub struct CryptoKey(Zeroizing<[u8; KEY_LEN]>);

impl CryptoKey {
    /// Validate `secret` and derive its key.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::MissingKey`] for an empty secret and
    /// [`EncryptionError::InsecureKey`] for one shorter than [`MIN_KEY_LEN`].
    pub fn derive(secret: &str) -> Result<Self, EncryptionError> {
        validate_secret(secret)?;
        let mut buf = Zeroizing::new([0u8; KEY_LEN]);
        buf.copy_from_slice(&Sha256::digest(secret.as_bytes()));
        Ok(Self(buf))
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for CryptoKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.write_str("CryptoKey([REDACTED])")
    }
}

/// Validate a single user secret.
pub(crate) fn validate_secret(secret: &str) -> Result<(), EncryptionError> {
    if secret.is_empty() {
        return Err(EncryptionError::MissingKey);
    }
    if secret.len() < MIN_KEY_LEN {
        return Err(EncryptionError::InsecureKey);
    }
    Ok(())
}

/// Validate and derive an ordered, non-empty key ring.
pub(crate) fn derive_ring<S: AsRef<str>>(secrets: &[S]) -> Result<Vec<CryptoKey>, EncryptionError> {
    if secrets.is_empty() {
        return Err(EncryptionError::MissingKey);
    }
    secrets
        .iter()
        .map(|secret| CryptoKey::derive(secret.as_ref()))
        .collect()
}
