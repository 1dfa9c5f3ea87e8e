//! # Score Datum
//!
//! The scored-subject record the oracle signs over. Immutable once signed:
//! every field that appears here is part of the attested state of record.

use serde::{Deserialize, Serialize};
use veris_core::{ModelVersion, Score, SubjectId, Timestamp};
use veris_crypto::Ed25519PublicKey;
use veris_scoring::FeatureVector;

/// A scored subject, ready for attestation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDatum {
    /// The subject this score belongs to.
    pub subject: SubjectId,
    /// The bounded two-decimal score.
    pub score: Score,
    /// When the score was computed.
    pub timestamp: Timestamp,
    /// Version of the model that produced the score.
    pub model_version: ModelVersion,
    /// The oracle's advertised public key — verifiers check the attestation
    /// signature against this.
    pub oracle_public_key: Ed25519PublicKey,
    /// The derived feature vector the model consumed.
    pub feature_vector: FeatureVector,
}

#[cfg(test)]
mod tests {
    use super::*;
    use veris_crypto::Ed25519KeyPair;
    use veris_scoring::Feature;

    #[test]
    fn serde_roundtrip() {
        let datum = ScoreDatum {
            subject: SubjectId::new("addr_test1abc").unwrap(),
            score: Score::from_raw(62.5),
            timestamp: Timestamp::from_epoch_secs(1_700_000_000).unwrap(),
            model_version: ModelVersion("v1.0".to_string()),
            oracle_public_key: Ed25519KeyPair::generate().public_key(),
            feature_vector: FeatureVector(vec![Feature {
                name: "tx_count".to_string(),
                value: 42.0,
            }]),
        };
        let json = serde_json::to_string(&datum).unwrap();
        let back: ScoreDatum = serde_json::from_str(&json).unwrap();
        assert_eq!(back, datum);
    }
}
