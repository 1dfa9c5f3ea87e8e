//! # Circuit Inputs
//!
//! Builds the public/private input split for the score-computation circuit.
//! Every value is an integer (centipoints, micro-units, hash-derived
//! values), so the inputs survive the float-rejecting canonical pipeline
//! and two processes canonicalize them to identical bytes.
//!
//! The response "commitment" is a plain additive checksum of the encrypted
//! response values. It is NOT a hiding or binding commitment scheme — it is
//! a placeholder carried for wire compatibility, and nothing in this stack
//! treats it as a security property.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use veris_core::{Score, SubjectId};
use veris_scoring::{FeatureVector, ModelArtifacts};

/// Error raised while constructing circuit inputs.
#[derive(Error, Debug)]
pub enum ProofInputsError {
    /// The response vector is empty — there is nothing to prove over.
    #[error("cannot build proof inputs from an empty response vector")]
    EmptyResponses,

    /// A response is outside the 1..=5 survey scale.
    #[error("response at index {index} is {value}, outside the 1..=5 scale")]
    ResponseOutOfRange {
        /// Position of the offending response.
        index: usize,
        /// The offending value.
        value: u8,
    },
}

/// The revealed half of the circuit inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicInputs {
    /// Truncated hash of the subject identifier (first 8 digest bytes,
    /// big-endian).
    pub subject_hash: u64,
    /// The score the circuit is expected to reproduce, in centipoints.
    pub expected_score_centi: u32,
    /// Additive checksum of the encrypted responses (placeholder
    /// commitment).
    pub response_commitment: u64,
}

/// The hidden half of the circuit inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateInputs {
    /// Deterministically encrypted survey responses.
    pub encrypted_responses: Vec<u64>,
    /// Derived feature values in micro-units.
    pub feature_micros: Vec<i64>,
    /// Model weights in micro-units.
    pub weight_micros: Vec<i64>,
    /// Model bias in micro-units.
    pub bias_micros: i64,
}

/// Complete circuit inputs: the public/private split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofInputs {
    /// Inputs revealed to verifiers.
    pub public_inputs: PublicInputs,
    /// Inputs that stay with the prover.
    pub private_inputs: PrivateInputs,
}

impl ProofInputs {
    /// Build circuit inputs from a submission's responses, derived
    /// features, expected score, and the model parameters.
    ///
    /// # Errors
    ///
    /// Rejects empty response vectors and out-of-scale responses. (A
    /// zero-length subject hash cannot occur: `SubjectId` rejects empty
    /// identifiers at construction.)
    pub fn build(
        subject: &SubjectId,
        responses: &[u8],
        features: &FeatureVector,
        expected_score: Score,
        model: &ModelArtifacts,
    ) -> Result<Self, ProofInputsError> {
        if responses.is_empty() {
            return Err(ProofInputsError::EmptyResponses);
        }
        if let Some((index, &value)) = responses
            .iter()
            .enumerate()
            .find(|(_, &r)| !(1..=5).contains(&r))
        {
            return Err(ProofInputsError::ResponseOutOfRange { index, value });
        }

        let encrypted_responses = encrypt_responses(responses);
        let response_commitment = encrypted_responses.iter().sum();

        Ok(Self {
            public_inputs: PublicInputs {
                subject_hash: subject_hash(subject),
                expected_score_centi: expected_score.centi(),
                response_commitment,
            },
            private_inputs: PrivateInputs {
                encrypted_responses,
                feature_micros: features.to_micros(),
                weight_micros: model.weight_micros(),
                bias_micros: model.bias_micros(),
            },
        })
    }
}

/// Truncated subject hash for the public inputs: the first 8 bytes of
/// SHA-256 of the identifier, read big-endian. Matches parsing the first
/// 16 hex characters of the digest as an integer.
pub fn subject_hash(subject: &SubjectId) -> u64 {
    let digest = Sha256::digest(subject.as_str().as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Deterministic per-index response encryption.
///
/// Each response is mapped through `SHA-256("{value}_{index}_{count}")`,
/// taking the first 8 hex characters as an integer modulo 1000. This is a
/// development-grade scrambling, not encryption in the cryptographic
/// sense; the circuit contract only requires that it be deterministic and
/// position-sensitive.
pub fn encrypt_responses(responses: &[u8]) -> Vec<u64> {
    let count = responses.len();
    responses
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let digest = Sha256::digest(format!("{r}_{i}_{count}").as_bytes());
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(&digest[..4]);
            u64::from(u32::from_be_bytes(bytes)) % 1000
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use veris_core::ModelVersion;
    use veris_scoring::{Feature, ModelArtifacts};

    fn model() -> ModelArtifacts {
        ModelArtifacts::new(
            vec!["tx_count".to_string(), "tx_freq_daily".to_string()],
            vec![259.5, 0.245],
            vec![144.3, 0.144],
            vec![0.42, 0.05],
            55.2,
            ModelVersion("v1.0".to_string()),
        )
        .unwrap()
    }

    fn features() -> FeatureVector {
        FeatureVector(vec![
            Feature {
                name: "tx_count".to_string(),
                value: 42.0,
            },
            Feature {
                name: "tx_freq_daily".to_string(),
                value: 0.25,
            },
        ])
    }

    fn subject() -> SubjectId {
        SubjectId::new("addr_test1abc").unwrap()
    }

    #[test]
    fn build_is_deterministic() {
        let responses = vec![3u8; 20];
        let a = ProofInputs::build(&subject(), &responses, &features(), Score::from_raw(75.25), &model())
            .unwrap();
        let b = ProofInputs::build(&subject(), &responses, &features(), Score::from_raw(75.25), &model())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_responses_rejected() {
        assert!(matches!(
            ProofInputs::build(&subject(), &[], &features(), Score::from_raw(50.0), &model()),
            Err(ProofInputsError::EmptyResponses)
        ));
    }

    #[test]
    fn out_of_scale_response_rejected() {
        let err = ProofInputs::build(
            &subject(),
            &[3, 3, 6],
            &features(),
            Score::from_raw(50.0),
            &model(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ProofInputsError::ResponseOutOfRange { index: 2, value: 6 }
        ));
    }

    #[test]
    fn encryption_is_position_sensitive() {
        // The same response value encrypts differently at different indexes.
        let encrypted = encrypt_responses(&[3, 3, 3]);
        assert_eq!(encrypted.len(), 3);
        assert!(encrypted.iter().all(|&e| e < 1000));
        assert!(
            encrypted[0] != encrypted[1] || encrypted[1] != encrypted[2],
            "position-insensitive encryption: {encrypted:?}"
        );
    }

    #[test]
    fn encryption_depends_on_vector_length() {
        let short = encrypt_responses(&[3, 3]);
        let long = encrypt_responses(&[3, 3, 3]);
        assert_ne!(short[0], long[0]);
    }

    #[test]
    fn commitment_is_sum_of_encrypted_values() {
        let responses = vec![1, 2, 3, 4, 5];
        let inputs = ProofInputs::build(
            &subject(),
            &responses,
            &features(),
            Score::from_raw(50.0),
            &model(),
        )
        .unwrap();
        let expected: u64 = inputs.private_inputs.encrypted_responses.iter().sum();
        assert_eq!(inputs.public_inputs.response_commitment, expected);
    }

    #[test]
    fn subject_hash_is_stable_and_nonzero_width() {
        let a = subject_hash(&subject());
        let b = subject_hash(&subject());
        assert_eq!(a, b);
        assert_ne!(a, subject_hash(&SubjectId::new("addr_test1xyz").unwrap()));
    }

    #[test]
    fn inputs_survive_canonicalization() {
        // All-integer inputs must pass the float-rejecting canonical path.
        let inputs = ProofInputs::build(
            &subject(),
            &[3u8; 20],
            &features(),
            Score::from_raw(75.25),
            &model(),
        )
        .unwrap();
        assert!(veris_core::CanonicalBytes::new(&inputs).is_ok());
    }
}
