//! HKDF split used by the AES-256-CBC driver.
//!
//! `HKDF-SHA256(ikm = SHA-256(secret), salt = iv, info = id)` expands to 64
//! bytes: the first 32 encrypt, the last 32 authenticate. The authentication
//! key therefore differs per message and per driver id.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::cipher::CipherError;

/// Per-message encryption and authentication keys.
pub struct DerivedKeys {
    /// AES-256 key.
    pub encryption: Zeroizing<[u8; 32]>,
    /// HMAC-SHA256 key.
    pub authentication: Zeroizing<[u8; 32]>,
}

impl std::fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKeys([REDACTED])")
    }
}

/// Derive the CBC driver's key pair from a master key, the message IV and
/// the driver id.
pub fn derive_cbc_keys(master_key: &[u8], iv: &[u8], id: &str) -> Result<DerivedKeys, CipherError> {
    let hk = Hkdf::<Sha256>::new(Some(iv), master_key);
    let mut okm = Zeroizing::new([0u8; 64]);
    hk.expand(id.as_bytes(), &mut okm[..])
        .map_err(|_| CipherError::KeyDerivation)?;

    let mut encryption = Zeroizing::new([0u8; 32]);
    let mut authentication = Zeroizing::new([0u8; 32]);
    encryption.copy_from_slice(&okm[..32]);
    authentication.copy_from_slice(&okm[32..]);

    Ok(DerivedKeys {
        encryption,
        authentication,
    })
}
