//! Error types for configuration and programmer mistakes.
//!
//! Only construction and encryption paths return these. Decryption and
//! unsigning never surface an error: every failure collapses to `None`, so
//! callers cannot tell a forged token from an expired one.

use thiserror::Error;

use crate::crypto::CipherError;

/// Errors raised while configuring drivers or producing tokens.
#[derive(Debug, Error)]
pub enum EncryptionError {
    /// No key was supplied, or one of the supplied keys is empty.
    #[error("Missing key. The key is required to encrypt values")]
    MissingKey,

    /// A supplied key is shorter than [`MIN_KEY_LEN`](crate::MIN_KEY_LEN) bytes.
    #[error("The value of your key should be at least 16 characters long")]
    InsecureKey,

    /// The driver requires an id and none (or an empty one) was given.
    #[error("Missing id. The id is required to encrypt values")]
    MissingId,

    /// The id contains the token separator and would corrupt the framing.
    #[error("invalid id {0:?}: the id must not contain '.'")]
    InvalidId(String),

    /// The payload is absent (`null`) or cannot be serialized.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The expiry string does not follow the duration grammar.
    #[error("invalid expiry {0:?}")]
    InvalidExpiry(String),

    /// `use_driver(None)` was called without a configured default.
    #[error("Cannot create encryption instance. No default encryption is defined in the config")]
    NoDefaultDriver,

    /// The requested driver name is not registered.
    #[error("unknown encryption driver: {0}")]
    UnknownDriver(String),

    /// A cipher primitive failed while producing a token.
    #[error("cipher failure: {0}")]
    Cipher(#[from] CipherError),

    /// The configuration could not be loaded or failed validation.
    #[error("invalid encryption config: {0}")]
    Config(String),
}

impl From<config::ConfigError> for EncryptionError {
    fn from(err: config::ConfigError) -> Self {
        EncryptionError::Config(err.to_string())
    }
}

impl EncryptionError {
    /// Returns `true` for errors that come from key or id validation.
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            EncryptionError::MissingKey
                | EncryptionError::InsecureKey
                | EncryptionError::MissingId
                | EncryptionError::InvalidId(_)
        )
    }
}
