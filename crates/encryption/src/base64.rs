//! URL-safe base64 without padding.
//!
//! Encoding never emits `=`. Decoding accepts padded or unpadded input and
//! returns `None` for anything outside the URL-safe alphabet, so callers can
//! treat an undecodable token field like any other invalid token.

use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD},
        DecodePaddingMode,
    },
    Engine as _,
};

/// Decoder that tolerates both padded and unpadded input.
const URL_SAFE_LENIENT_PAD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode bytes as base64url with the trailing padding stripped.
pub fn url_encode(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode a base64url string. Returns `None` on any decoding error.
pub fn url_decode(encoded: &str) -> Option<Vec<u8>> {
    URL_SAFE_LENIENT_PAD.decode(encoded).ok()
}

/// Decode a base64url string into UTF-8 text.
pub fn url_decode_utf8(encoded: &str) -> Option<String> {
    url_decode(encoded).and_then(|bytes| String::from_utf8(bytes).ok())
}
