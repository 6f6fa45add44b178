//! AES-256-CBC + HMAC-SHA256, encrypt-then-MAC, with an id field.
//!
//! ```text
//! id.base64url(ciphertext).base64url(iv).hmac
//! ```
//!
//! A fresh 16-byte IV is drawn per call. Encryption and authentication keys
//! come from HKDF over `SHA-256(secret)`, salted with the IV and bound to the
//! driver id (see [`derive_cbc_keys`]). The HMAC covers
//! `base64url(ciphertext).base64url(iv)` and is checked before any decryption,
//! so forged ciphertext never reaches the cipher.

use serde_json::Value;
use tracing::debug;

use crate::base64;
use crate::crypto::cipher::{cbc_decrypt, cbc_encrypt, random_bytes, CBC_IV_LEN};
use crate::crypto::derive_cbc_keys;
use crate::error::EncryptionError;
use crate::hmac::Hmac;
use crate::message::{EncryptOptions, MessageBuilder};
use crate::SEPARATOR;

use super::base::{required_id, split_token, BaseDriver};
use super::{DriverConfig, EncryptionDriver};

/// AES-256-CBC driver with id-bound HKDF keys.
#[derive(Debug, Clone)]
pub struct Aes256Cbc {
    id: String,
    base: BaseDriver,
}

impl Aes256Cbc {
    /// Build the driver.
    ///
    /// # Errors
    ///
    /// Returns a key error for an invalid ring and
    /// [`EncryptionError::MissingId`] if no id is configured.
    pub fn new(config: &DriverConfig) -> Result<Self, EncryptionError> {
        let base = BaseDriver::new(config)?;
        let id = required_id(config)?;
        debug!(driver = "aes_256_cbc", id = %id, keys = base.keys().len(), "encryption driver created");
        Ok(Self { id, base })
    }

    /// The configured id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl EncryptionDriver for Aes256Cbc {
    fn encrypt_value(
        &self,
        payload: &Value,
        options: &EncryptOptions,
    ) -> Result<String, EncryptionError> {
        let iv: [u8; CBC_IV_LEN] = random_bytes();
        let keys = derive_cbc_keys(self.base.first_key().as_bytes(), &iv, &self.id)?;

        let plaintext =
            MessageBuilder::build(payload, options.expires_in.as_ref(), options.purpose_str())?;
        let ciphertext = cbc_encrypt(&keys.encryption[..], &iv, plaintext.as_bytes())?;

        let mac_payload = format!(
            "{}{SEPARATOR}{}",
            base64::url_encode(&ciphertext),
            base64::url_encode(iv)
        );
        let hmac = Hmac::new(&keys.authentication[..]).generate(&mac_payload);
        Ok(self.base.compute_returns(&[&self.id, &mac_payload, &hmac]))
    }

    fn decrypt_value(&self, token: &str, purpose: Option<&str>) -> Option<Value> {
        let [id, cipher_encoded, iv_encoded, mac_encoded] = split_token::<4>(token)?;
        if id != self.id {
            return None;
        }

        let ciphertext = base64::url_decode(cipher_encoded)?;
        let iv = base64::url_decode(iv_encoded)?;

        let mac_payload = format!("{cipher_encoded}{SEPARATOR}{iv_encoded}");
        self.base.keys().iter().find_map(|master| {
            let keys = derive_cbc_keys(master.as_bytes(), &iv, &self.id).ok()?;
            if !Hmac::new(&keys.authentication[..]).compare(&mac_payload, mac_encoded) {
                return None;
            }
            let plaintext = cbc_decrypt(&keys.encryption[..], &iv, &ciphertext).ok()?;
            MessageBuilder::verify(&plaintext, purpose)
        })
    }
}
