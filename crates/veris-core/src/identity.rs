//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers flowing through the attestation
//! pipeline. These prevent accidental identifier confusion — you cannot
//! pass a `TransactionHash` where a `SubjectId` is expected, and a policy
//! identifier can never be spliced into a subject position of the binding
//! message by mistake.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::VerisError;
use crate::temporal::Timestamp;

/// The policy identifier the deployed oracle signs under when no override
/// is configured.
pub const DEFAULT_POLICY_ID: &str = "c965889476530cae6fc1b22b4f3c1571fb5d29c09d99529ae5f3046c";

/// The network tag recorded on ledger entries when no override is configured.
pub const DEFAULT_NETWORK_TAG: &str = "testnet";

/// An opaque subject identifier (wallet/account address).
///
/// Externally supplied and immutable. Used both as the deterministic seed
/// for feature derivation and as the ledger lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId(String);

impl SubjectId {
    /// Validate and wrap a subject identifier.
    ///
    /// # Errors
    ///
    /// Rejects empty identifiers and identifiers containing whitespace —
    /// both would corrupt the concatenated binding message.
    pub fn new(addr: impl Into<String>) -> Result<Self, VerisError> {
        let addr = addr.into();
        if addr.is_empty() {
            return Err(VerisError::Validation(
                "subject identifier must not be empty".to_string(),
            ));
        }
        if addr.chars().any(char::is_whitespace) {
            return Err(VerisError::Validation(format!(
                "subject identifier must not contain whitespace: {addr:?}"
            )));
        }
        Ok(Self(addr))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A transaction hash binding an attestation to one submission context.
///
/// Always a 64-character lowercase hex string. Assumed unique per
/// submission; the ledger keys its records by this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHash(String);

impl TransactionHash {
    /// Validate and wrap a transaction hash.
    ///
    /// # Errors
    ///
    /// Rejects strings that are not exactly 64 lowercase hex characters.
    pub fn new(hex: impl Into<String>) -> Result<Self, VerisError> {
        let hex = hex.into();
        if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
        {
            return Err(VerisError::Validation(format!(
                "transaction hash must be 64 lowercase hex chars, got {:?} ({} chars)",
                hex,
                hex.len()
            )));
        }
        Ok(Self(hex))
    }

    /// Derive a fresh transaction hash for a new submission.
    ///
    /// Hashes the subject, the current timestamp, and a random nonce so two
    /// submissions for the same subject in the same second still receive
    /// distinct hashes.
    pub fn generate(subject: &SubjectId) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(subject.as_str().as_bytes());
        hasher.update(Timestamp::now().epoch_secs().to_be_bytes());
        hasher.update(Uuid::new_v4().as_bytes());
        let digest = hasher.finalize();
        Self(digest.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Access the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The policy/domain identifier under which the oracle signs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyId(String);

impl PolicyId {
    /// Wrap a policy identifier. Policy identifiers are opaque to the
    /// pipeline; only emptiness is rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, VerisError> {
        let id = id.into();
        if id.is_empty() {
            return Err(VerisError::Validation(
                "policy identifier must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PolicyId {
    fn default() -> Self {
        Self(DEFAULT_POLICY_ID.to_string())
    }
}

impl std::fmt::Display for PolicyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Version tag of the model that produced a score.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelVersion(pub String);

impl std::fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Network tag recorded on every ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkTag(pub String);

impl Default for NetworkTag {
    fn default() -> Self {
        Self(DEFAULT_NETWORK_TAG.to_string())
    }
}

impl std::fmt::Display for NetworkTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_id_accepts_addresses() {
        let s = SubjectId::new("addr_test1abc").unwrap();
        assert_eq!(s.as_str(), "addr_test1abc");
        assert_eq!(s.to_string(), "addr_test1abc");
    }

    #[test]
    fn subject_id_rejects_empty_and_whitespace() {
        assert!(SubjectId::new("").is_err());
        assert!(SubjectId::new("addr test").is_err());
        assert!(SubjectId::new("addr\n1").is_err());
    }

    #[test]
    fn transaction_hash_validates_shape() {
        let hex = "ab".repeat(32);
        assert!(TransactionHash::new(hex).is_ok());
        assert!(TransactionHash::new("ab".repeat(31)).is_err());
        assert!(TransactionHash::new("AB".repeat(32)).is_err());
        assert!(TransactionHash::new("zz".repeat(32)).is_err());
    }

    #[test]
    fn generated_hashes_are_unique_and_well_formed() {
        let subject = SubjectId::new("addr_test1abc").unwrap();
        let a = TransactionHash::generate(&subject);
        let b = TransactionHash::generate(&subject);
        assert_ne!(a, b);
        // Round-trips through the validating constructor.
        assert!(TransactionHash::new(a.as_str()).is_ok());
    }

    #[test]
    fn policy_id_default_is_deployed_policy() {
        assert_eq!(PolicyId::default().as_str(), DEFAULT_POLICY_ID);
        assert!(PolicyId::new("").is_err());
    }

    #[test]
    fn newtypes_serialize_as_plain_strings() {
        let s = SubjectId::new("addr_test1abc").unwrap();
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"addr_test1abc\"");
        let n = NetworkTag::default();
        assert_eq!(serde_json::to_string(&n).unwrap(), "\"testnet\"");
    }
}
