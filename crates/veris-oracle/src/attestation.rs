//! # Attestation Signing — Fixed Binding-Message Layout
//!
//! An attestation binds `(policy_id, transaction_hash, subject, score)`
//! under the oracle's signature. The binding message is a fixed-order byte
//! concatenation:
//!
//! ```text
//! policy_id_utf8 ‖ transaction_hash_utf8 ‖ subject_utf8 ‖ score_be3
//! ```
//!
//! where `score_be3` is the score's centipoint value as a 3-byte big-endian
//! integer. The layout is a wire contract: independent verifiers must
//! reproduce these exact bytes, and the message length is always
//! `len(policy_id) + len(transaction_hash) + len(subject) + 3`.
//!
//! Changing any bound field changes the message, so signature verification
//! fails on any tampered attestation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use veris_core::error::CryptoError;
use veris_core::{PolicyId, Score, SubjectId, TransactionHash};
use veris_crypto::{verify_with_public_key, Ed25519Signature, KeyManager, KeyStoreError};

use crate::datum::ScoreDatum;

/// Error raised while producing an attestation.
///
/// Every variant is fatal to the request: there is no mock-signature
/// fallback, because the signature *is* the attested fact.
#[derive(Error, Debug)]
pub enum SignError {
    /// The oracle key pair could not be materialized.
    #[error("oracle key unavailable: {0}")]
    KeyStore(#[from] KeyStoreError),

    /// The datum advertises a different oracle key than this signer holds.
    #[error("datum advertises public key {datum_key}, signer holds {signer_key}")]
    PublicKeyMismatch {
        /// Key embedded in the datum.
        datum_key: String,
        /// Key the signer would sign with.
        signer_key: String,
    },
}

/// Build the canonical binding message for an attestation.
///
/// This is the exact byte sequence the oracle signs and verifiers check.
pub fn binding_message(
    policy_id: &PolicyId,
    transaction_hash: &TransactionHash,
    subject: &SubjectId,
    score: &Score,
) -> Vec<u8> {
    let mut message = Vec::with_capacity(
        policy_id.as_str().len() + transaction_hash.as_str().len() + subject.as_str().len() + 3,
    );
    message.extend_from_slice(policy_id.as_str().as_bytes());
    message.extend_from_slice(transaction_hash.as_str().as_bytes());
    message.extend_from_slice(subject.as_str().as_bytes());
    message.extend_from_slice(&score.to_be3());
    message
}

/// A signed attestation: the datum plus the binding context and signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attestation {
    /// The scored-subject record.
    pub datum: ScoreDatum,
    /// Policy identifier the signature binds to.
    pub policy_id: PolicyId,
    /// Transaction hash the signature binds to.
    pub transaction_hash: TransactionHash,
    /// Ed25519 signature over the binding message.
    pub signature: Ed25519Signature,
}

impl Attestation {
    /// Recompute the binding message and verify the signature against the
    /// datum's advertised oracle public key.
    pub fn verify(&self) -> Result<(), CryptoError> {
        let message = binding_message(
            &self.policy_id,
            &self.transaction_hash,
            &self.datum.subject,
            &self.datum.score,
        );
        verify_with_public_key(&message, &self.signature, &self.datum.oracle_public_key)
    }
}

/// The oracle attestation signer.
///
/// Owns the policy identifier and a handle to the durable key manager.
/// Key material is materialized lazily on the first signature.
#[derive(Debug, Clone)]
pub struct OracleSigner {
    policy_id: PolicyId,
    keys: KeyManager,
}

impl OracleSigner {
    /// Create a signer over the given key manager and policy.
    pub fn new(keys: KeyManager, policy_id: PolicyId) -> Self {
        Self { policy_id, keys }
    }

    /// The policy identifier this signer binds attestations to.
    pub fn policy_id(&self) -> &PolicyId {
        &self.policy_id
    }

    /// The oracle's public key, materializing the key pair on first use.
    pub fn public_key(&self) -> Result<veris_crypto::Ed25519PublicKey, SignError> {
        Ok(self.keys.public_key()?)
    }

    /// Sign a pre-built datum, binding it to a transaction hash.
    ///
    /// # Errors
    ///
    /// Fails if the key pair cannot be materialized, or if the datum
    /// advertises a public key other than the one this signer holds — a
    /// signature the datum's own key cannot verify would be worse than no
    /// signature at all.
    pub fn sign(
        &self,
        datum: ScoreDatum,
        transaction_hash: TransactionHash,
    ) -> Result<Attestation, SignError> {
        let keypair = self.keys.keypair()?;
        if datum.oracle_public_key != keypair.public_key() {
            return Err(SignError::PublicKeyMismatch {
                datum_key: datum.oracle_public_key.to_hex(),
                signer_key: keypair.public_key().to_hex(),
            });
        }

        let message = binding_message(
            &self.policy_id,
            &transaction_hash,
            &datum.subject,
            &datum.score,
        );
        let signature = keypair.sign(&message);
        tracing::debug!(
            subject = %datum.subject,
            transaction_hash = %transaction_hash,
            score = %datum.score,
            "signed attestation"
        );

        Ok(Attestation {
            datum,
            policy_id: self.policy_id.clone(),
            transaction_hash,
            signature,
        })
    }
}
