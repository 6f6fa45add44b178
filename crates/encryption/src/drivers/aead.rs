//! Framing shared by the AEAD drivers.
//!
//! ```text
//! id.base64url(ciphertext).base64url(nonce).base64url(tag)
//! ```
//!
//! The nonce is 12 random bytes and the tag 16 bytes. A non-empty purpose is
//! passed as associated data and is not stored in the envelope, so a purpose
//! mismatch fails the tag check itself. Expiry stays inside the envelope.

use std::fmt;
use std::marker::PhantomData;

use aes_gcm::aead::{AeadInPlace, KeyInit};
use serde_json::Value;

use crate::base64;
use crate::crypto::cipher::{aead_open, aead_seal, random_bytes, AEAD_NONCE_LEN};
use crate::error::EncryptionError;
use crate::message::{normalize_purpose, EncryptOptions, MessageBuilder};

use super::base::{required_id, split_token, BaseDriver};
use super::DriverConfig;

/// Id, key ring and cipher choice for one AEAD driver.
pub(crate) struct AeadDriver<A> {
    id: String,
    base: BaseDriver,
    cipher: PhantomData<fn() -> A>,
}

impl<A> AeadDriver<A>
where
    A: AeadInPlace + KeyInit,
{
    pub(crate) fn new(config: &DriverConfig) -> Result<Self, EncryptionError> {
        let base = BaseDriver::new(config)?;
        let id = required_id(config)?;
        Ok(Self {
            id,
            base,
            cipher: PhantomData,
        })
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn key_count(&self) -> usize {
        self.base.keys().len()
    }

    pub(crate) fn encrypt(
        &self,
        payload: &Value,
        options: &EncryptOptions,
    ) -> Result<String, EncryptionError> {
        let nonce: [u8; AEAD_NONCE_LEN] = random_bytes();
        let aad = options.purpose_str().unwrap_or_default();

        let plaintext = MessageBuilder::build(payload, options.expires_in.as_ref(), None)?;
        let sealed = aead_seal::<A>(
            self.base.first_key().as_bytes(),
            &nonce,
            aad.as_bytes(),
            plaintext.as_bytes(),
        )?;

        Ok(self.base.compute_returns(&[
            &self.id,
            &base64::url_encode(&sealed.ciphertext),
            &base64::url_encode(nonce),
            &base64::url_encode(&sealed.tag),
        ]))
    }

    pub(crate) fn decrypt(&self, token: &str, purpose: Option<&str>) -> Option<Value> {
        let [id, cipher_encoded, nonce_encoded, tag_encoded] = split_token::<4>(token)?;
        if id != self.id {
            return None;
        }

        let ciphertext = base64::url_decode(cipher_encoded)?;
        let nonce = base64::url_decode(nonce_encoded)?;
        let tag = base64::url_decode(tag_encoded)?;
        let aad = normalize_purpose(purpose).unwrap_or_default();

        self.base.keys().iter().find_map(|key| {
            let plaintext =
                aead_open::<A>(key.as_bytes(), &nonce, aad.as_bytes(), &ciphertext, &tag).ok()?;
            MessageBuilder::verify(&plaintext, None)
        })
    }
}

impl<A> fmt::Debug for AeadDriver<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AeadDriver")
            .field("id", &self.id)
            .field("base", &self.base)
            .finish()
    }
}

impl<A> Clone for AeadDriver<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            base: self.base.clone(),
            cipher: PhantomData,
        }
    }
}
