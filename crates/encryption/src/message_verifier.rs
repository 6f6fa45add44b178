//! Signing without encryption.
//!
//! A signed token is `base64url(envelope) "." hmac`. The payload is readable
//! by anyone; the HMAC only guarantees it was produced by a holder of one of
//! the ring's keys and has not been altered.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::base64;
use crate::error::EncryptionError;
use crate::hmac::Hmac;
use crate::key::{derive_ring, CryptoKey};
use crate::message::{to_payload, EncryptOptions, MessageBuilder};
use crate::SEPARATOR;

/// Signs payloads with the newest key and verifies them against every key.
#[derive(Debug, Clone)]
pub struct MessageVerifier {
    keys: Vec<CryptoKey>,
}

impl MessageVerifier {
    /// Build a verifier over an ordered ring of secrets.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::MissingKey`] or [`EncryptionError::InsecureKey`]
    /// if the ring is empty or any secret is invalid.
    pub fn new<S: AsRef<str>>(secrets: &[S]) -> Result<Self, EncryptionError> {
        Ok(Self::from_keys(derive_ring(secrets)?))
    }

    pub(crate) fn from_keys(keys: Vec<CryptoKey>) -> Self {
        Self { keys }
    }

    /// Sign any serializable payload.
    pub fn sign<T: Serialize + ?Sized>(
        &self,
        payload: &T,
        options: &EncryptOptions,
    ) -> Result<String, EncryptionError> {
        self.sign_value(&to_payload(payload)?, options)
    }

    /// Sign a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::InvalidPayload`] if `payload` is `null`.
    pub fn sign_value(
        &self,
        payload: &Value,
        options: &EncryptOptions,
    ) -> Result<String, EncryptionError> {
        let key = self.keys.first().ok_or(EncryptionError::MissingKey)?;
        let envelope =
            MessageBuilder::build(payload, options.expires_in.as_ref(), options.purpose_str())?;
        let encoded = base64::url_encode(envelope);
        let hmac = Hmac::new(key.as_bytes()).generate(&encoded);
        Ok(format!("{encoded}{SEPARATOR}{hmac}"))
    }

    /// Verify and decode a signed token into `T`.
    pub fn unsign<T: DeserializeOwned>(&self, token: &str, purpose: Option<&str>) -> Option<T> {
        self.unsign_value(token, purpose)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Verify a signed token and return its payload, or `None` if it was
    /// tampered with, signed by an unknown key, expired, or scoped to another
    /// purpose.
    pub fn unsign_value(&self, token: &str, purpose: Option<&str>) -> Option<Value> {
        let mut parts = token.split(SEPARATOR);
        let (Some(encoded), Some(hmac), None) = (parts.next(), parts.next(), parts.next()) else {
            return None;
        };
        if encoded.is_empty() || hmac.is_empty() {
            return None;
        }

        let decoded = base64::url_decode(encoded)?;

        let signed_by_ring = self
            .keys
            .iter()
            .any(|key| Hmac::new(key.as_bytes()).compare(encoded, hmac));
        if !signed_by_ring {
            return None;
        }

        MessageBuilder::verify(&decoded, purpose)
    }
}
