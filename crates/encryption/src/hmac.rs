//! SHA-256 HMAC used to detect tampering of token fields.

use hmac::{Hmac as HmacImpl, Mac};
use sha2::Sha256;

use crate::base64;
use crate::safe_equal::safe_equal;

type HmacSha256 = HmacImpl<Sha256>;

/// Keyed SHA-256 HMAC producing base64url digests.
pub struct Hmac<'k> {
    key: &'k [u8],
}

impl<'k> Hmac<'k> {
    /// Bind a signer to `key`.
    pub fn new(key: &'k [u8]) -> Self {
        Self { key }
    }

    /// Compute the base64url HMAC of `value`.
    pub fn generate(&self, value: &str) -> String {
        let Ok(mut mac) = HmacSha256::new_from_slice(self.key) else {
            unreachable!("HMAC-SHA256 accepts keys of any length");
        };
        mac.update(value.as_bytes());
        base64::url_encode(mac.finalize().into_bytes())
    }

    /// Check `existing_hmac` against a freshly computed HMAC of `value` in
    /// constant time.
    pub fn compare(&self, value: &str, existing_hmac: &str) -> bool {
        safe_equal(self.generate(value), existing_hmac)
    }
}

impl std::fmt::Debug for Hmac<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Hmac([REDACTED])")
    }
}
