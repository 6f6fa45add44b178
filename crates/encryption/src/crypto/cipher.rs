//! AES-256-CBC and detached-tag AEAD encryption.
//!
//! **CBC is unauthenticated on its own.** Callers must verify an HMAC over the
//! ciphertext and IV before calling [`cbc_decrypt`], otherwise the padding
//! check becomes an oracle.
//!
//! The AEAD helpers are generic over any RustCrypto cipher implementing
//! [`AeadInPlace`]; both `aes-gcm` and `chacha20poly1305` share the same
//! `aead` release, so one pair of functions serves both drivers.

use aes_gcm::aead::{
    generic_array::typenum::Unsigned, AeadCore, AeadInPlace, KeyInit, Nonce, Tag,
};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;

/// Byte length of an AES-CBC IV.
pub const CBC_IV_LEN: usize = 16;

/// Byte length of an AEAD nonce (96 bits) for both GCM and ChaCha20-Poly1305.
pub const AEAD_NONCE_LEN: usize = 12;

/// Byte length of an AEAD authentication tag.
pub const TAG_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is the wrong length for the cipher.
    #[error("invalid key length")]
    InvalidKeyLength,

    /// The IV or nonce is the wrong length for the cipher.
    #[error("invalid iv length")]
    InvalidIvLength,

    /// The authentication tag is the wrong length.
    #[error("invalid tag length")]
    InvalidTagLength,

    /// AEAD encryption or tag verification failed.
    #[error("aead operation failed")]
    AeadFailure,

    /// CBC plaintext padding was malformed.
    #[error("invalid padding")]
    Padding,

    /// HKDF could not expand to the requested length.
    #[error("key derivation failed")]
    KeyDerivation,
}

/// Ciphertext and its detached authentication tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    /// Encrypted bytes, same length as the plaintext.
    pub ciphertext: Vec<u8>,
    /// Authentication tag, [`TAG_LEN`] bytes.
    pub tag: Vec<u8>,
}

/// Fill an array from the OS CSPRNG.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Encrypt with AES-256-CBC and PKCS#7 padding.
pub fn cbc_encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
    let encryptor = Aes256CbcEnc::new_from_slices(key, iv).map_err(|_| cbc_init_error(key))?;
    Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt AES-256-CBC ciphertext and strip PKCS#7 padding.
pub fn cbc_decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
    let decryptor = Aes256CbcDec::new_from_slices(key, iv).map_err(|_| cbc_init_error(key))?;
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::Padding)
}

fn cbc_init_error(key: &[u8]) -> CipherError {
    if key.len() == 32 {
        CipherError::InvalidIvLength
    } else {
        CipherError::InvalidKeyLength
    }
}

/// Encrypt `plaintext` and return the ciphertext with a detached tag.
pub fn aead_seal<A>(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Sealed, CipherError>
where
    A: AeadInPlace + KeyInit,
{
    let cipher = A::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength)?;
    let nonce = nonce_from_slice::<A>(nonce)?;

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(nonce, aad, &mut buffer)
        .map_err(|_| CipherError::AeadFailure)?;

    Ok(Sealed {
        ciphertext: buffer,
        tag: tag.to_vec(),
    })
}

/// Verify the tag and decrypt. Any mismatch in key, nonce, AAD, ciphertext or
/// tag yields [`CipherError::AeadFailure`].
pub fn aead_open<A>(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, CipherError>
where
    A: AeadInPlace + KeyInit,
{
    let cipher = A::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength)?;
    let nonce = nonce_from_slice::<A>(nonce)?;
    if tag.len() != <A as AeadCore>::TagSize::USIZE {
        return Err(CipherError::InvalidTagLength);
    }
    let tag = Tag::<A>::from_slice(tag);

    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(nonce, aad, &mut buffer, tag)
        .map_err(|_| CipherError::AeadFailure)?;
    Ok(buffer)
}

// `from_slice` panics on a length mismatch, so check first.
fn nonce_from_slice<A: AeadCore>(nonce: &[u8]) -> Result<&Nonce<A>, CipherError> {
    if nonce.len() != A::NonceSize::USIZE {
        return Err(CipherError::InvalidIvLength);
    }
    Ok(Nonce::<A>::from_slice(nonce))
}
