//! Cache Key Module
//!
//! Derives stable, fixed-length keys from free-text item descriptions.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::error::CacheError;

/// Separator placed between normalized fields before hashing.
const FIELD_DELIMITER: char = '|';

/// Length of a hex-encoded SHA-256 digest.
pub const KEY_LENGTH: usize = 64;

// == Cache Key ==
/// Opaque identifier of a cached entry.
///
/// Always 64 lowercase hex characters, so it is safe to use as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    // == Derive ==
    /// Derives a key from a brand, model and option string.
    ///
    /// Each field is trimmed and lowercased, absent fields count as empty,
    /// and the fields are joined with `|` before hashing. Inputs that differ
    /// only in case or surrounding whitespace map to the same key.
    pub fn derive(brand: Option<&str>, model: Option<&str>, options: Option<&str>) -> Self {
        Self(sha256_hex(normalize(brand, model, options).as_bytes()))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Builds the digest input from the normalized fields.
///
/// Trimming, lowercasing and hashing are infallible on `&str`, so every
/// input takes this path.
fn normalize(brand: Option<&str>, model: Option<&str>, options: Option<&str>) -> String {
    let mut joined = String::new();
    for (i, field) in [brand, model, options].iter().enumerate() {
        if i > 0 {
            joined.push(FIELD_DELIMITER);
        }
        joined.push_str(&field.unwrap_or_default().trim().to_lowercase());
    }
    joined
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CacheKey {
    type Err = CacheError;

    /// Parses a previously derived key.
    ///
    /// Accepts exactly 64 hex characters; uppercase input is lowered.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == KEY_LENGTH && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(CacheError::InvalidKey(s.to_string()))
        }
    }
}

// == Public Helper ==
/// Derives the cache key for an item description.
///
/// Convenience wrapper over [`CacheKey::derive`] for callers holding plain
/// string slices.
pub fn derive_key(brand: &str, model: &str, options: &str) -> CacheKey {
    CacheKey::derive(Some(brand), Some(model), Some(options))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_fixed_length_hex() {
        let key = derive_key("Rohde & Schwarz", "SMA100B", "B711/B86/B93/B35");
        assert_eq!(key.as_str().len(), KEY_LENGTH);
        assert!(key.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_ignores_case_and_whitespace() {
        let a = derive_key("Acme", " x1 ", "A/B");
        let b = derive_key("acme", "x1", "a/b");
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_distinguishes_fields() {
        // The delimiter keeps field boundaries significant
        let a = derive_key("ab", "c", "");
        let b = derive_key("a", "bc", "");
        assert_ne!(a, b);
    }

    #[test]
    fn test_absent_fields_equal_empty() {
        let a = CacheKey::derive(Some("Keysight"), None, None);
        let b = derive_key("Keysight", "", "  ");
        assert_eq!(a, b);
    }

    #[test]
    fn test_known_digest() {
        // sha256("acme|x1|a/b")
        let key = derive_key("acme", "x1", "a/b");
        assert_eq!(key.as_str(), sha256_hex(b"acme|x1|a/b"));
    }

    #[test]
    fn test_nul_bytes_are_normalized_like_any_text() {
        let a = derive_key("A\0", " B ", "");
        let b = derive_key("a\0", "b", "");
        assert_eq!(a, b);

        // Field boundaries still count when a field carries a NUL
        let c = derive_key("a\0b", "", "");
        assert_ne!(b, c);
        assert_eq!(b.as_str(), sha256_hex("a\0|b|".as_bytes()));
    }

    #[test]
    fn test_parse_roundtrip() {
        let key = derive_key("Anritsu", "MS2090A", "0031/0090");
        let parsed: CacheKey = key.to_string().parse().unwrap();
        assert_eq!(parsed, key);

        let upper: CacheKey = key.as_str().to_uppercase().parse().unwrap();
        assert_eq!(upper, key);
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!("invalid_key_12345".parse::<CacheKey>().is_err());
        assert!("../etc/passwd".parse::<CacheKey>().is_err());
        assert!("".parse::<CacheKey>().is_err());
        let almost = "g".repeat(KEY_LENGTH);
        assert!(almost.parse::<CacheKey>().is_err());
    }
}
