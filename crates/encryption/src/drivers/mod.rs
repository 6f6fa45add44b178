//! Encryption drivers.
//!
//! Each driver owns one cryptographic construction and its exact token
//! framing. The framings differ on purpose and must not be unified:
//!
//! ```text
//! legacy             <ciphertext>.<iv>.<hmac>
//! aes_256_cbc        <id>.<ciphertext>.<iv>.<hmac>
//! aes_256_gcm        <id>.<ciphertext>.<iv>.<tag>
//! chacha20_poly1305  <id>.<ciphertext>.<iv>.<tag>
//! ```
//!
//! All binary fields are base64url without padding.
//!
//! # Decrypt contract
//!
//! `decrypt_value` is total: a wrong field count, wrong id, undecodable field,
//! HMAC or tag mismatch, cipher fault, purpose mismatch or passed deadline all
//! return `None`. Nothing distinguishes one cause from another.

pub mod aes_256_cbc;
pub mod aes_256_gcm;
pub mod base;
pub mod chacha20_poly1305;
pub mod legacy;

mod aead;

use std::fmt;
use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::EncryptionError;
use crate::message::{to_payload, EncryptOptions};

pub use aes_256_cbc::Aes256Cbc;
pub use aes_256_gcm::Aes256Gcm;
pub use base::BaseDriver;
pub use chacha20_poly1305::ChaCha20Poly1305;
pub use legacy::Legacy;

/// The capability every driver, and every wrapper around drivers, exposes.
pub trait EncryptionDriver: Send + Sync {
    /// Encrypt a JSON payload. Two calls with the same input produce
    /// different tokens.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::InvalidPayload`] for a `null` payload.
    fn encrypt_value(
        &self,
        payload: &Value,
        options: &EncryptOptions,
    ) -> Result<String, EncryptionError>;

    /// Decrypt a token, or `None` if it is invalid for any reason.
    fn decrypt_value(&self, token: &str, purpose: Option<&str>) -> Option<Value>;
}

/// Typed encrypt/decrypt for any [`EncryptionDriver`].
pub trait EncryptionDriverExt: EncryptionDriver {
    /// Serialize and encrypt `payload`.
    fn encrypt<T: Serialize + ?Sized>(
        &self,
        payload: &T,
        options: &EncryptOptions,
    ) -> Result<String, EncryptionError> {
        self.encrypt_value(&to_payload(payload)?, options)
    }

    /// Decrypt `token` and deserialize the payload into `T`. A payload that
    /// does not fit `T` is treated like any other invalid token.
    fn decrypt<T: DeserializeOwned>(&self, token: &str, purpose: Option<&str>) -> Option<T> {
        self.decrypt_value(token, purpose)
            .and_then(|value| serde_json::from_value(value).ok())
    }
}

impl<D: EncryptionDriver + ?Sized> EncryptionDriverExt for D {}

/// The available constructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriverKind {
    /// AES-256-CBC + HMAC without an id field; reads and writes pre-id tokens.
    #[serde(rename = "legacy")]
    Legacy,
    /// AES-256-CBC + HMAC with HKDF-derived, id-bound keys.
    #[serde(rename = "aes_256_cbc")]
    Aes256Cbc,
    /// AES-256-GCM with purpose as associated data.
    #[serde(rename = "aes_256_gcm")]
    Aes256Gcm,
    /// ChaCha20-Poly1305 with purpose as associated data.
    #[serde(rename = "chacha20_poly1305")]
    ChaCha20Poly1305,
}

impl DriverKind {
    /// The configuration name of this driver.
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverKind::Legacy => "legacy",
            DriverKind::Aes256Cbc => "aes_256_cbc",
            DriverKind::Aes256Gcm => "aes_256_gcm",
            DriverKind::ChaCha20Poly1305 => "chacha20_poly1305",
        }
    }

    /// Whether tokens of this driver carry an id field.
    pub fn requires_id(&self) -> bool {
        !matches!(self, DriverKind::Legacy)
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriverKind {
    type Err = EncryptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" => Ok(DriverKind::Legacy),
            "aes_256_cbc" => Ok(DriverKind::Aes256Cbc),
            "aes_256_gcm" => Ok(DriverKind::Aes256Gcm),
            "chacha20_poly1305" => Ok(DriverKind::ChaCha20Poly1305),
            other => Err(EncryptionError::UnknownDriver(other.to_owned())),
        }
    }
}

/// Construction input shared by every driver.
#[derive(Clone, Default)]
pub struct DriverConfig {
    /// Driver id, required by every driver except [`Legacy`].
    pub id: Option<String>,
    /// Ordered secrets; the first encrypts, all decrypt.
    pub keys: Vec<String>,
}

impl DriverConfig {
    /// Config with the given keys and no id.
    pub fn new<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            id: None,
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Set the driver id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl fmt::Debug for DriverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverConfig")
            .field("id", &self.id)
            .field("keys", &format_args!("[REDACTED; {}]", self.keys.len()))
            .finish()
    }
}

/// Closed set of drivers behind one interface.
#[derive(Debug)]
pub enum Driver {
    /// See [`Legacy`].
    Legacy(Legacy),
    /// See [`Aes256Cbc`].
    Aes256Cbc(Aes256Cbc),
    /// See [`Aes256Gcm`].
    Aes256Gcm(Aes256Gcm),
    /// See [`ChaCha20Poly1305`].
    ChaCha20Poly1305(ChaCha20Poly1305),
}

impl Driver {
    /// Construct the driver of the given kind.
    ///
    /// # Errors
    ///
    /// Returns a key or id error if `config` is invalid for `kind`.
    pub fn new(kind: DriverKind, config: &DriverConfig) -> Result<Self, EncryptionError> {
        Ok(match kind {
            DriverKind::Legacy => Driver::Legacy(Legacy::new(config)?),
            DriverKind::Aes256Cbc => Driver::Aes256Cbc(Aes256Cbc::new(config)?),
            DriverKind::Aes256Gcm => Driver::Aes256Gcm(Aes256Gcm::new(config)?),
            DriverKind::ChaCha20Poly1305 => {
                Driver::ChaCha20Poly1305(ChaCha20Poly1305::new(config)?)
            }
        })
    }

    /// Which construction this driver uses.
    pub fn kind(&self) -> DriverKind {
        match self {
            Driver::Legacy(_) => DriverKind::Legacy,
            Driver::Aes256Cbc(_) => DriverKind::Aes256Cbc,
            Driver::Aes256Gcm(_) => DriverKind::Aes256Gcm,
            Driver::ChaCha20Poly1305(_) => DriverKind::ChaCha20Poly1305,
        }
    }

    fn inner(&self) -> &dyn EncryptionDriver {
        match self {
            Driver::Legacy(d) => d,
            Driver::Aes256Cbc(d) => d,
            Driver::Aes256Gcm(d) => d,
            Driver::ChaCha20Poly1305(d) => d,
        }
    }
}

impl EncryptionDriver for Driver {
    fn encrypt_value(
        &self,
        payload: &Value,
        options: &EncryptOptions,
    ) -> Result<String, EncryptionError> {
        self.inner().encrypt_value(payload, options)
    }

    fn decrypt_value(&self, token: &str, purpose: Option<&str>) -> Option<Value> {
        self.inner().decrypt_value(token, purpose)
    }
}
