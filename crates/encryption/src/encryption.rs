//! [`Encryption`]: key rotation over any driver.
//!
//! One driver instance is built per key, in ring order. New tokens always
//! come from the first instance; decryption asks each instance in turn and
//! returns the first success. Rotating a secret means putting the new one at
//! the front and keeping the old one at the tail until its tokens expire.

use serde_json::Value;
use tracing::{debug, trace};

use crate::drivers::{Driver, DriverConfig, DriverKind, EncryptionDriver};
use crate::error::EncryptionError;
use crate::message::EncryptOptions;
use crate::message_verifier::MessageVerifier;

/// A key ring of driver instances plus a message verifier over the same keys.
#[derive(Debug)]
pub struct Encryption<D = Driver> {
    // One per key, newest first. Never empty.
    drivers: Vec<D>,
    verifier: MessageVerifier,
}

impl<D: EncryptionDriver> Encryption<D> {
    /// Build one driver per key with `factory`.
    ///
    /// # Errors
    ///
    /// Returns the first key error from the ring, or the first error returned
    /// by `factory`.
    pub fn new<S, F>(factory: F, keys: &[S]) -> Result<Self, EncryptionError>
    where
        S: AsRef<str>,
        F: Fn(&str) -> Result<D, EncryptionError>,
    {
        let verifier = MessageVerifier::new(keys)?;
        let drivers = keys
            .iter()
            .map(|key| factory(key.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(keys = drivers.len(), "encryption key ring created");
        Ok(Self { drivers, verifier })
    }

    /// Verifier for signed, unencrypted tokens over the same key ring.
    pub fn message_verifier(&self) -> &MessageVerifier {
        &self.verifier
    }

    /// Driver instances, newest key first.
    pub fn drivers(&self) -> &[D] {
        &self.drivers
    }
}

impl Encryption<Driver> {
    /// Build a ring of built-in drivers of one kind.
    pub fn with_driver<S: AsRef<str>>(
        kind: DriverKind,
        id: Option<&str>,
        keys: &[S],
    ) -> Result<Self, EncryptionError> {
        Self::new(
            |key| {
                let config = DriverConfig {
                    id: id.map(str::to_owned),
                    keys: vec![key.to_owned()],
                };
                Driver::new(kind, &config)
            },
            keys,
        )
    }
}

impl<D: EncryptionDriver> EncryptionDriver for Encryption<D> {
    fn encrypt_value(
        &self,
        payload: &Value,
        options: &EncryptOptions,
    ) -> Result<String, EncryptionError> {
        self.drivers
            .first()
            .ok_or(EncryptionError::MissingKey)?
            .encrypt_value(payload, options)
    }

    fn decrypt_value(&self, token: &str, purpose: Option<&str>) -> Option<Value> {
        let result = self
            .drivers
            .iter()
            .find_map(|driver| driver.decrypt_value(token, purpose));
        if result.is_none() {
            trace!(keys = self.drivers.len(), "token rejected by every key");
        }
        result
    }
}
