//! # Content Digest — SHA-256 over Canonical Bytes
//!
//! Defines `ContentDigest` for the structured-data digest paths of the
//! stack: fallback proof synthesis and record integrity checks.
//!
//! ## Security Invariant
//!
//! `ContentDigest` can only be computed from `CanonicalBytes`, ensuring that
//! all digests over structured data are produced through the sorted-key
//! canonicalization pipeline. This is enforced by the signature of
//! [`sha256_digest()`]. Raw-byte seed hashing (feature derivation from a
//! subject identifier) deliberately does not go through this type — it
//! hashes an opaque identifier, not structured data.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// A SHA-256 content digest over canonical bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(pub [u8; 32]);

impl ContentDigest {
    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
///
/// The signature accepts only `&CanonicalBytes`, not raw `&[u8]`. This
/// compile-time constraint prevents any code path from computing a
/// structured-data digest over non-canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest(bytes)
}

/// Compute a SHA-256 hex string from canonical bytes.
///
/// Convenience wrapper around [`sha256_digest()`] for contexts that need
/// the digest as a hex string (fallback proof tokens, verification keys).
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_deterministic() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1, "b": 2})).unwrap();
        assert_eq!(sha256_digest(&cb), sha256_digest(&cb));
    }

    #[test]
    fn hex_format() {
        let cb = CanonicalBytes::new(&serde_json::json!({"key": "value"})).unwrap();
        let hex = sha256_hex(&cb);
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn display_carries_algorithm_prefix() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        let s = sha256_digest(&cb).to_string();
        assert!(s.starts_with("sha256:"));
        assert_eq!(s.len(), 7 + 64);
    }

    #[test]
    fn different_inputs_different_digests() {
        let a = CanonicalBytes::new(&serde_json::json!({"score": 7525})).unwrap();
        let b = CanonicalBytes::new(&serde_json::json!({"score": 7526})).unwrap();
        assert_ne!(sha256_digest(&a), sha256_digest(&b));
    }

    #[test]
    fn known_vector_empty_object() {
        // SHA256("{}") — stable cross-implementation reference value.
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        assert_eq!(
            sha256_digest(&cb).to_hex(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }
}
