//! Authenticated encryption and message signing with key rotation.
//!
//! Values are wrapped in a JSON envelope that carries an optional purpose and
//! expiry, then either encrypted by a driver or signed by a
//! [`MessageVerifier`]. Every token is URL-safe text. Decryption and
//! unsigning are total: any failure yields `None`.
//!
//! ```no_run
//! use encryption::prelude::*;
//!
//! # fn main() -> Result<(), encryption::EncryptionError> {
//! let ring = Encryption::with_driver(
//!     DriverKind::Aes256Gcm,
//!     Some("app"),
//!     &["newest-secret-value", "older-secret-value"],
//! )?;
//! let token = ring.encrypt(&"hello", &EncryptOptions::new().purpose("greeting"))?;
//! assert_eq!(ring.decrypt::<String>(&token, Some("greeting")).as_deref(), Some("hello"));
//! # Ok(())
//! # }
//! ```

pub mod base64;
pub mod config;
pub mod crypto;
pub mod drivers;
pub mod encryption;
pub mod error;
pub mod hmac;
pub mod key;
pub mod manager;
pub mod message;
pub mod message_verifier;
pub mod safe_equal;

/// Field separator of every token format.
pub const SEPARATOR: &str = ".";

pub use crate::config::{DriverEntry, EncryptionConfig};
pub use crate::drivers::{
    Driver, DriverConfig, DriverKind, EncryptionDriver, EncryptionDriverExt,
};
pub use crate::encryption::Encryption;
pub use crate::error::EncryptionError;
pub use crate::key::{CryptoKey, MIN_KEY_LEN};
pub use crate::manager::EncryptionManager;
pub use crate::message::{EncryptOptions, Expiry};
pub use crate::message_verifier::MessageVerifier;
pub use crate::safe_equal::safe_equal;

/// Common imports.
pub mod prelude {
    pub use crate::drivers::{DriverKind, EncryptionDriver, EncryptionDriverExt};
    pub use crate::encryption::Encryption;
    pub use crate::manager::EncryptionManager;
    pub use crate::message::EncryptOptions;
    pub use crate::message_verifier::MessageVerifier;
}
