//! AES-256-GCM driver.
//!
//! Uses `SHA-256(secret)` directly as the AES key. Framing and purpose
//! binding are described in the AEAD section of the [drivers](super) docs.

use serde_json::Value;
use tracing::debug;

use crate::error::EncryptionError;
use crate::message::EncryptOptions;

use super::aead::AeadDriver;
use super::{DriverConfig, EncryptionDriver};

/// AES-256-GCM with purpose as associated data.
#[derive(Debug, Clone)]
pub struct Aes256Gcm {
    inner: AeadDriver<aes_gcm::Aes256Gcm>,
}

impl Aes256Gcm {
    /// Build the driver.
    ///
    /// # Errors
    ///
    /// Returns a key error for an invalid ring and
    /// [`EncryptionError::MissingId`] if no id is configured.
    pub fn new(config: &DriverConfig) -> Result<Self, EncryptionError> {
        let inner = AeadDriver::new(config)?;
        debug!(driver = "aes_256_gcm", id = %inner.id(), keys = inner.key_count(), "encryption driver created");
        Ok(Self { inner })
    }

    /// The configured id.
    pub fn id(&self) -> &str {
        self.inner.id()
    }
}

impl EncryptionDriver for Aes256Gcm {
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
