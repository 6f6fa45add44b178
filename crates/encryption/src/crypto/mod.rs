//! Raw cipher primitives used by the drivers.
//!
//! This module knows nothing about token framing, ids or envelopes. It
//! provides AES-256-CBC, the detached-tag AEAD transforms (AES-256-GCM and
//! ChaCha20-Poly1305) and the HKDF split used by the CBC driver.
//!
//! Every function returns a [`CipherError`]; drivers fold those into `None`
//! on the decrypt path so no library fault reaches a caller.

pub mod cipher;
pub mod kdf;

pub use cipher::{CipherError, Sealed, AEAD_NONCE_LEN, CBC_IV_LEN, TAG_LEN};
pub use kdf::{derive_cbc_keys, DerivedKeys};
