//! AES-256-CBC + HMAC without an id field.
//!
//! Reads and writes tokens produced before ids were introduced:
//!
//! ```text
//! base64url(ciphertext).base64url(iv).hmac
//! ```
//!
//! The key is `SHA-256(secret)`, used directly for both AES and HMAC. The IV
//! is 16 random characters from the base64url alphabet, used as raw ASCII
//! bytes. Purpose and expiry travel inside the encrypted envelope.

use serde_json::Value;
use tracing::debug;

use crate::base64;
use crate::crypto::cipher::{cbc_decrypt, cbc_encrypt, random_bytes};
use crate::error::EncryptionError;
use crate::hmac::Hmac;
use crate::message::{EncryptOptions, MessageBuilder};
use crate::SEPARATOR;

use super::base::{split_token, BaseDriver};
use super::{DriverConfig, EncryptionDriver};

/// Compatibility driver for id-less tokens.
#[derive(Debug, Clone)]
pub struct Legacy {
    base: BaseDriver,
}

impl Legacy {
    /// Build the driver. `config.id` is ignored.
    ///
    /// # Errors
    ///
    /// Returns a key error if the ring is empty or any secret is invalid.
    pub fn new(config: &DriverConfig) -> Result<Self, EncryptionError> {
        let base = BaseDriver::new(config)?;
        debug!(driver = "legacy", keys = base.keys().len(), "encryption driver created");
        Ok(Self { base })
    }
}

/// 12 random bytes encode to exactly 16 base64url characters.
fn random_iv() -> Vec<u8> {
    base64::url_encode(random_bytes::<12>()).into_bytes()
}

impl EncryptionDriver for Legacy {
    fn encrypt_value(
        &self,
        payload: &Value,
        options: &EncryptOptions,
    ) -> Result<String, EncryptionError> {
        let key = self.base.first_key();
        let iv = random_iv();

        let plaintext =
            MessageBuilder::build(payload, options.expires_in.as_ref(), options.purpose_str())?;
        let ciphertext = cbc_encrypt(key.as_bytes(), &iv, plaintext.as_bytes())?;

        // The HMAC covers both the ciphertext and the IV.
        let result = format!(
            "{}{SEPARATOR}{}",
            base64::url_encode(&ciphertext),
            base64::url_encode(&iv)
        );
        let hmac = Hmac::new(key.as_bytes()).generate(&result);
        Ok(self.base.compute_returns(&[&result, &hmac]))
    }

    fn decrypt_value(&self, token: &str, purpose: Option<&str>) -> Option<Value> {
        let [encrypted_encoded, iv_encoded, hash] = split_token::<3>(token)?;

        let encrypted = base64::url_decode(encrypted_encoded)?;
        let iv = base64::url_decode(iv_encoded)?;

        let signed = format!("{encrypted_encoded}{SEPARATOR}{iv_encoded}");
        self.base.keys().iter().find_map(|key| {
            if !Hmac::new(key.as_bytes()).compare(&signed, hash) {
                return None;
            }
            let plaintext = cbc_decrypt(key.as_bytes(), &iv, &encrypted).ok()?;
            MessageBuilder::verify(&plaintext, purpose)
        })
    }
}
