//! # Ed25519 Signing and Verification
//!
//! Provides Ed25519 key generation, signing, and verification for oracle
//! attestations.
//!
//! ## Security Invariant
//!
//! - Private keys are never serialized or logged. `Ed25519KeyPair` does
//!   not implement `Serialize`, and its `Debug` impl redacts the key.
//!   Persistence goes through the key store in this crate, nowhere else.
//! - Signing input is the attestation binding message — a fixed-order byte
//!   concatenation produced by `veris-oracle`, never ad-hoc JSON.
//!
//! ## Serde
//!
//! - Public keys serialize/deserialize as hex-encoded strings.
//! - Signatures serialize/deserialize as hex-encoded strings.

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use veris_core::error::CryptoError;

/// An Ed25519 public key (32 bytes) for signature verification.
///
/// Serializes as a hex-encoded string for JSON interoperability.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes). Serializes as a hex-encoded string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// An Ed25519 key pair for signing operations.
///
/// Does not implement `Serialize` — private keys must not be accidentally
/// serialized into logs, responses, or artifacts.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey impls
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// Create a public key from raw 32 bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the public key as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }

    /// Parse a public key from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let hex = hex.trim().to_lowercase();
        if hex.len() != 64 {
            return Err(CryptoError::KeyError(format!(
                "public key hex must be 64 chars, got {}",
                hex.len()
            )));
        }
        let bytes = hex_to_bytes(&hex).map_err(CryptoError::KeyError)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Convert to an `ed25519_dalek::VerifyingKey` for verification.
    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature impls
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// Create a signature from raw 64 bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Render the signature as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }

    /// Parse a signature from a 128-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let hex = hex.trim().to_lowercase();
        if hex.len() != 128 {
            return Err(CryptoError::VerificationFailed(format!(
                "signature hex must be 128 chars, got {}",
                hex.len()
            )));
        }
        let bytes = hex_to_bytes(&hex).map_err(CryptoError::VerificationFailed)?;
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair impls
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a new random Ed25519 key pair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        let signing_key = ed25519_dalek::SigningKey::generate(&mut csprng);
        Self { signing_key }
    }

    /// Create a key pair from a raw 32-byte private key seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key from this key pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        let vk = self.signing_key.verifying_key();
        Ed25519PublicKey(vk.to_bytes())
    }

    /// Sign a binding message.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        let sig = self.signing_key.sign(message);
        Ed25519Signature(sig.to_bytes())
    }

    /// The raw seed, for persistence by the key store only.
    pub(crate) fn seed_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify an Ed25519 signature over a binding message.
///
/// Returns `Ok(())` if valid, `Err(CryptoError::VerificationFailed)`
/// otherwise.
pub fn verify(
    message: &[u8],
    signature: &Ed25519Signature,
    verifying_key: &ed25519_dalek::VerifyingKey,
) -> Result<(), CryptoError> {
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key
        .verify(message, &sig)
        .map_err(|e| CryptoError::VerificationFailed(format!("Ed25519 verification failed: {e}")))
}

/// Convenience verification using `Ed25519PublicKey` instead of a dalek key.
pub fn verify_with_public_key(
    message: &[u8],
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    let vk = public_key.to_verifying_key()?;
    verify(message, signature, &vk)
}

// ---------------------------------------------------------------------------
// Hex utilities (no external hex crate dependency)
// ---------------------------------------------------------------------------

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_prefix(bytes: &[u8]) -> String {
    bytes_to_hex(&bytes[..4])
}

pub(crate) fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 {
        return Err("hex string must have even length".to_string());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| format!("invalid hex at position {i}: {e}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypair_generation() {
        let kp = Ed25519KeyPair::generate();
        assert_eq!(kp.public_key().as_bytes().len(), 32);
    }

    #[test]
    fn sign_and_verify() {
        let kp = Ed25519KeyPair::generate();
        let message = b"policy|txhash|subject|score";
        let sig = kp.sign(message);
        let vk = kp.public_key().to_verifying_key().unwrap();
        verify(message, &sig, &vk).expect("valid signature should verify");
    }

    #[test]
    fn verify_wrong_key_fails() {
        let kp1 = Ed25519KeyPair::generate();
        let kp2 = Ed25519KeyPair::generate();
        let sig = kp1.sign(b"message");
        let wrong_vk = kp2.public_key().to_verifying_key().unwrap();
        assert!(verify(b"message", &sig, &wrong_vk).is_err());
    }

    #[test]
    fn verify_wrong_message_fails() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(b"original");
        let vk = kp.public_key().to_verifying_key().unwrap();
        assert!(verify(b"tampered", &sig, &vk).is_err());
    }

    #[test]
    fn deterministic_from_seed() {
        let seed = [42u8; 32];
        let kp1 = Ed25519KeyPair::from_seed(&seed);
        let kp2 = Ed25519KeyPair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.sign(b"x"), kp2.sign(b"x"));
    }

    #[test]
    fn public_key_hex_roundtrip() {
        let pk = Ed25519KeyPair::generate().public_key();
        let hex = pk.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(Ed25519PublicKey::from_hex(&hex).unwrap(), pk);
    }

    #[test]
    fn signature_hex_roundtrip() {
        let sig = Ed25519KeyPair::generate().sign(b"datum");
        let hex = sig.to_hex();
        assert_eq!(hex.len(), 128);
        assert_eq!(Ed25519Signature::from_hex(&hex).unwrap(), sig);
    }

    #[test]
    fn public_key_serde_json_roundtrip() {
        let pk = Ed25519KeyPair::generate().public_key();
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json.len(), 64 + 2); // 64 hex chars + 2 quotes
        let back: Ed25519PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pk);
    }

    #[test]
    fn invalid_hex_rejected() {
        assert!(Ed25519PublicKey::from_hex("not-hex").is_err());
        assert!(Ed25519PublicKey::from_hex("aabb").is_err());
        assert!(Ed25519Signature::from_hex(&"zz".repeat(64)).is_err());
    }

    #[test]
    fn debug_does_not_leak_private_key() {
        let kp = Ed25519KeyPair::generate();
        assert_eq!(format!("{kp:?}"), "Ed25519KeyPair(<private>)");
    }
}
