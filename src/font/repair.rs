//! Binary signature repair for trial-renderer compatibility.
//!
//! Some variable fonts carry a `00 01 00 0x` sfnt version where the fourth
//! byte is non-zero — a subtable-version tag that strict renderers reject
//! even though the table data itself is fine. Rewriting the four bytes to
//! the classic `'true'` TrueType signature makes the same data acceptable.
//!
//! This is a deliberate, narrow binary patch. It touches exactly four bytes
//! and nothing else, and it is the only place in the codebase that edits
//! font data in place.

/// The classic Apple TrueType sfnt signature, `"true"` in ASCII.
pub const TRUETYPE_SIGNATURE: [u8; 4] = *b"true";

/// Rewrites a rejected `00 01 00 0x` (x ≠ 0) signature to [`TRUETYPE_SIGNATURE`].
///
/// The standard `00 01 00 00` version is left alone, as is anything shorter
/// than four bytes or starting differently (WOFF containers, CFF `OTTO`).
/// Returns whether the buffer was patched.
pub fn repair_signature_if_needed(data: &mut [u8]) -> bool {
    if data.len() >= 4 && data[0] == 0x00 && data[1] == 0x01 && data[2] == 0x00 && data[3] != 0x00 {
        data[..4].copy_from_slice(&TRUETYPE_SIGNATURE);
        return true;
    }
    false
}
