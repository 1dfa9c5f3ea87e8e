//! # Transaction Record
//!
//! The durable unit of the ledger: everything a later auditor needs to
//! re-check one submission. Keyed by transaction hash; never mutated after
//! write.

use serde::{Deserialize, Serialize};
use veris_core::{NetworkTag, Score, SubjectId, Timestamp, TransactionHash};
use veris_zkp::ProofBundle;

/// One recorded submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// The scored subject.
    pub subject: SubjectId,
    /// The attested score.
    pub score: Score,
    /// Unique key of this record.
    pub transaction_hash: TransactionHash,
    /// When the submission completed.
    pub timestamp: Timestamp,
    /// The raw survey responses as submitted.
    pub raw_responses: Vec<u8>,
    /// The proof bundle, if the proof stage ran.
    pub proof_bundle: Option<ProofBundle>,
    /// Which network this submission targeted.
    pub network: NetworkTag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip_without_proof() {
        let record = TransactionRecord {
            subject: SubjectId::new("addr_test1abc").unwrap(),
            score: Score::from_raw(62.5),
            transaction_hash: TransactionHash::new("ab".repeat(32)).unwrap(),
            timestamp: Timestamp::from_epoch_secs(1_700_000_000).unwrap(),
            raw_responses: vec![3; 20],
            proof_bundle: None,
            network: NetworkTag::default(),
        };
        let json = serde_json::to_string_pretty(&record).unwrap();
        let back: TransactionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
