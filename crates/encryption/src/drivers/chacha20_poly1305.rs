//! ChaCha20-Poly1305 driver.
//!
//! Same framing and purpose binding as [`Aes256Gcm`](super::Aes256Gcm), with
//! ChaCha20-Poly1305 as the cipher and `SHA-256(secret)` as the key.

use serde_json::Value;
use tracing::debug;

use crate::error::EncryptionError;
use crate::message::EncryptOptions;

use super::aead::AeadDriver;
use super::{DriverConfig, EncryptionDriver};

/// ChaCha20-Poly1305 with purpose as associated data.
#[derive(Debug, Clone)]
pub struct ChaCha20Poly1305 {
    inner: AeadDriver<chacha20poly1305::ChaCha20Poly1305>,
}

impl ChaCha20Poly1305 {
    /// Build the driver.
    ///
    /// # Errors
    ///
    /// Returns a key error for an invalid ring and
    /// [`EncryptionError::MissingId`] if no id is configured.
    pub fn new(config: &DriverConfig) -> Result<Self, EncryptionError> {
        let inner = AeadDriver::new(config)?;
        debug!(driver = "chacha20_poly1305", id = %inner.id(), keys = inner.key_count(), "encryption driver created");
        Ok(Self { inner })
    }

    /// The configured id.
    pub fn id(&self) -> &str {
        self.inner.id()
    }
}

impl EncryptionDriver for ChaCha20Poly1305 {
    fn encrypt_value(
        &self,
        payload: &Value,
        options: &EncryptOptions,
    ) -> Result<String, EncryptionError> {
        self.inner.encrypt(payload, options)
    }

    fn decrypt_value(&self, token: &str, purpose: Option<&str>) -> Option<Value> {
        self.inner.decrypt(token, purpose)
    }
}
