//! Constant-time byte comparison.
//!
//! A length mismatch returns `false` immediately; lengths are not secret here
//! (every compared value is a fixed-size digest or a public token field).
//! Equal-length inputs are compared with [`subtle::ConstantTimeEq`], which
//! touches every byte regardless of where the first difference sits.

use subtle::ConstantTimeEq;

/// Compare two byte strings without leaking the position of the first
/// mismatching byte.
pub fn safe_equal(a: impl AsRef<[u8]>, b: impl AsRef<[u8]>) -> bool {
    let a = a.as_ref();
    let b = b.as_ref();
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
