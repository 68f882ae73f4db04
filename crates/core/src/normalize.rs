//! Holder-name canonicalization.
//!
//! The destination store identifies groups by a canonical name. Legacy
//! configurations are much looser: mixed case, spaces, dotted names. This
//! module maps a raw name onto the canonical form used as the identity key.

/// Canonicalize a raw holder or group name.
///
/// Trims surrounding whitespace, maps `:`, space, and `.` to `-`, and
/// lowercases the result. Any other character passes through unchanged.
/// Total and idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    raw.trim().replace([':', ' ', '.'], "-").to_lowercase()
}
