//! [`BaseDriver`]: key ring and framing helpers shared by every driver.

use crate::error::EncryptionError;
use crate::key::{derive_ring, CryptoKey};

use super::DriverConfig;
use crate::SEPARATOR;

/// Validated, derived key ring plus token join/split helpers.
#[derive(Debug, Clone)]
pub struct BaseDriver {
    // Never empty; `new` rejects an empty ring.
    keys: Vec<CryptoKey>,
}

impl BaseDriver {
    /// Validate every secret in `config` and derive its key, in order.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::MissingKey`] for an empty ring or empty
    /// secret, [`EncryptionError::InsecureKey`] for a short secret.
    pub fn new(config: &DriverConfig) -> Result<Self, EncryptionError> {
        Ok(Self {
            keys: derive_ring(&config.keys)?,
        })
    }

    /// All keys, newest first.
    pub fn keys(&self) -> &[CryptoKey] {
        &self.keys
    }

    /// The key new tokens are produced with.
    pub fn first_key(&self) -> &CryptoKey {
        &self.keys[0]
    }

    /// Join token fields with the separator.
    pub fn compute_returns(&self, values: &[&str]) -> String {
        values.join(SEPARATOR)
    }
}

/// Extract the id a driver requires.
pub(crate) fn required_id(config: &DriverConfig) -> Result<String, EncryptionError> {
    match config.id.as_deref() {
        None | Some("") => Err(EncryptionError::MissingId),
        Some(id) if id.contains(SEPARATOR) => Err(EncryptionError::InvalidId(id.to_owned())),
        Some(id) => Ok(id.to_owned()),
    }
}

/// Split a token into exactly `N` non-empty fields.
pub(crate) fn split_token<const N: usize>(token: &str) -> Option<[&str; N]> {
    let mut fields = [""; N];
    let mut parts = token.split(SEPARATOR);
    for field in &mut fields {
        *field = parts.next().filter(|part| !part.is_empty())?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(fields)
}
