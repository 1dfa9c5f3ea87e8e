//! # Attestation Pipeline
//!
//! Wires the scoring engine, oracle signer, proof orchestrator, and ledger
//! into one request-scoped flow, and exposes the lookup and
//! submission-verification queries over the same components.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use veris_core::{NetworkTag, PolicyId, Score, SubjectId, Timestamp, TransactionHash, VerisError};
use veris_crypto::{Ed25519PublicKey, KeyManager};
use veris_ledger::{LedgerError, LedgerStore, TransactionRecord};
use veris_oracle::{Attestation, OracleSigner, ScoreDatum, SignError};
use veris_scoring::{ModelInfo, ScoringEngine, ScoringError};
use veris_zkp::{
    FallbackError, OrchestratorConfig, ProofBundle, ProofInputs, ProofInputsError,
    ProofOrchestrator, ProofServiceClient, ProofServiceConfig, ProofServiceStats, ProofTier,
};

/// Number of survey questions the default deployment expects.
pub const DEFAULT_QUESTION_COUNT: usize = 20;

/// Error raised by the pipeline.
///
/// The variants map one-to-one onto the error taxonomy: validation and
/// configuration reject precisely, external-dependency trouble never
/// appears here (the proof tier absorbs it), and everything else is fatal
/// to the single request that hit it.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The submission failed boundary validation. No side effects occurred.
    #[error("invalid submission: {0}")]
    Validation(String),

    /// The pipeline itself is misconfigured.
    #[error("pipeline configuration error: {0}")]
    Config(String),

    /// Scoring failed — fatal, never mocked.
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// Signing failed — fatal, never mocked.
    #[error(transparent)]
    Signing(#[from] SignError),

    /// Circuit-input construction failed.
    #[error("proof input construction failed: {0}")]
    ProofInputs(#[from] ProofInputsError),

    /// Even the local fallback proof could not be built.
    #[error("fallback proof synthesis failed: {0}")]
    Proof(#[from] FallbackError),

    /// The ledger write failed — fatal; an unpersisted attestation is a
    /// lost audit trail.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<VerisError> for PipelineError {
    fn from(e: VerisError) -> Self {
        Self::Validation(e.to_string())
    }
}

/// Static configuration assembling one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the model artifacts.
    pub model_dir: PathBuf,
    /// Directory holding (or receiving) the oracle key pair.
    pub key_dir: PathBuf,
    /// Directory holding the ledger records.
    pub ledger_dir: PathBuf,
    /// Policy identifier attestations bind to.
    pub policy_id: PolicyId,
    /// Network tag stamped on ledger records.
    pub network: NetworkTag,
    /// Required survey response count.
    pub question_count: usize,
    /// Proof service endpoint, if one is deployed.
    pub proof_service: Option<ProofServiceConfig>,
    /// Proof orchestrator behavior switches.
    pub orchestrator: OrchestratorConfig,
}

impl PipelineConfig {
    /// Configuration with defaults for everything but the three data
    /// directories.
    pub fn new(
        model_dir: impl Into<PathBuf>,
        key_dir: impl Into<PathBuf>,
        ledger_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            model_dir: model_dir.into(),
            key_dir: key_dir.into(),
            ledger_dir: ledger_dir.into(),
            policy_id: PolicyId::default(),
            network: NetworkTag::default(),
            question_count: DEFAULT_QUESTION_COUNT,
            proof_service: None,
            orchestrator: OrchestratorConfig::default(),
        }
    }
}

/// One inbound submission, as handed over by the front door.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRequest {
    /// The subject's wallet/account address.
    pub subject_id: String,
    /// Survey responses on the 1..=5 scale.
    pub raw_responses: Vec<u8>,
    /// Opaque caller metadata; carried, never interpreted.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// The composite result of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    /// The signed attestation.
    pub attestation: Attestation,
    /// The proof bundle, with its tier tag.
    pub proof_bundle: ProofBundle,
    /// The persisted ledger record.
    pub record: TransactionRecord,
    /// Where the durable unit was written.
    pub record_path: PathBuf,
}

/// Result of a submission-verification query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionStatus {
    /// The queried subject.
    pub subject: SubjectId,
    /// Whether a recorded submission was found.
    pub verified: bool,
    /// The recorded score, if found.
    pub score: Option<Score>,
    /// The recording transaction, if found.
    pub transaction_hash: Option<TransactionHash>,
    /// Which proof tier backed the record, if any proof ran.
    pub proof_tier: Option<ProofTier>,
}

/// The assembled oracle pipeline.
pub struct AttestationPipeline {
    engine: ScoringEngine,
    signer: OracleSigner,
    prover: ProofOrchestrator,
    ledger: LedgerStore,
    network: NetworkTag,
    question_count: usize,
}

impl AttestationPipeline {
    /// Assemble a pipeline from configuration.
    ///
    /// Missing model artifacts or an unopenable ledger directory are fatal
    /// here — a pipeline that cannot score or persist must refuse to
    /// start, not limp along on mocks. Key material is validated lazily on
    /// the first signature, matching its load-or-generate lifecycle.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        if config.question_count == 0 {
            return Err(PipelineError::Config(
                "question_count must be positive".to_string(),
            ));
        }
        let engine = ScoringEngine::load(&config.model_dir)?;
        let signer = OracleSigner::new(KeyManager::new(&config.key_dir), config.policy_id);
        let client = config
            .proof_service
            .map(ProofServiceClient::new)
            .transpose()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        let prover = ProofOrchestrator::new(client, config.orchestrator);
        let ledger = LedgerStore::open(&config.ledger_dir)?;

        Ok(Self {
            engine,
            signer,
            prover,
            ledger,
            network: config.network,
            question_count: config.question_count,
        })
    }

    /// Run one submission through the full pipeline.
    pub async fn submit(
        &self,
        request: SubmissionRequest,
    ) -> Result<SubmissionOutcome, PipelineError> {
        let subject = self.validate(&request)?;
        tracing::info!(subject = %subject, "processing submission");

        // Attested facts: score and signature. Hard errors from here on.
        let (features, score) = self.engine.score_subject(&subject)?;
        let transaction_hash = TransactionHash::generate(&subject);
        let datum = ScoreDatum {
            subject: subject.clone(),
            score,
            timestamp: Timestamp::now(),
            model_version: self.engine.artifacts().version().clone(),
            oracle_public_key: self.signer.public_key()?,
            feature_vector: features.clone(),
        };
        let attestation = self.signer.sign(datum, transaction_hash)?;

        // Proof stage: degrades inside the orchestrator, never aborts the
        // request unless even local synthesis fails.
        let inputs = ProofInputs::build(
            &subject,
            &request.raw_responses,
            &features,
            score,
            self.engine.artifacts(),
        )?;
        let proof_bundle = self.prover.generate(&inputs).await?;
        if proof_bundle.tier == ProofTier::Fallback {
            tracing::warn!(subject = %subject, "submission completed with fallback-tier proof");
        }

        // Persistence: the audit trail. A failed append fails the request.
        let record = TransactionRecord {
            subject: subject.clone(),
            score,
            transaction_hash: attestation.transaction_hash.clone(),
            timestamp: attestation.datum.timestamp,
            raw_responses: request.raw_responses,
            proof_bundle: Some(proof_bundle.clone()),
            network: self.network.clone(),
        };
        let record_path = self.ledger.append(&record)?;

        tracing::info!(
            subject = %subject,
            score = %score,
            transaction_hash = %attestation.transaction_hash,
            proof_tier = %proof_bundle.tier,
            "submission complete"
        );
        Ok(SubmissionOutcome {
            attestation,
            proof_bundle,
            record,
            record_path,
        })
    }

    /// Look up the most recent recorded submission for a subject.
    pub fn lookup(&self, subject: &SubjectId) -> Result<Option<TransactionRecord>, PipelineError> {
        Ok(self.ledger.find_by_subject(subject)?)
    }

    /// Report whether a subject has a verified recorded submission.
    pub fn verify_submission(&self, subject: &SubjectId) -> Result<SubmissionStatus, PipelineError> {
        let record = self.ledger.find_by_subject(subject)?;
        Ok(match record {
            Some(record) => SubmissionStatus {
                subject: subject.clone(),
                verified: true,
                score: Some(record.score),
                transaction_hash: Some(record.transaction_hash),
                proof_tier: record.proof_bundle.map(|b| b.tier),
            },
            None => SubmissionStatus {
                subject: subject.clone(),
                verified: false,
                score: None,
                transaction_hash: None,
                proof_tier: None,
            },
        })
    }

    /// Verify a proof bundle through the orchestrator's tiers.
    pub async fn verify_proof(
        &self,
        bundle: &ProofBundle,
        public_inputs: &veris_zkp::PublicInputs,
    ) -> bool {
        self.prover.verify(bundle, public_inputs).await
    }

    /// The oracle's advertised public key.
    pub fn oracle_public_key(&self) -> Result<Ed25519PublicKey, PipelineError> {
        Ok(self.signer.public_key()?)
    }

    /// Metadata about the loaded scoring model.
    pub fn model_info(&self) -> ModelInfo {
        self.engine.model_info()
    }

    /// Proof service diagnostics.
    pub fn proof_stats(&self) -> ProofServiceStats {
        self.prover.stats()
    }

    /// The ledger this pipeline persists into.
    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    fn validate(&self, request: &SubmissionRequest) -> Result<SubjectId, PipelineError> {
        let subject = SubjectId::new(request.subject_id.clone())?;
        if request.raw_responses.len() != self.question_count {
            return Err(PipelineError::Validation(format!(
                "survey must contain exactly {} responses, got {}",
                self.question_count,
                request.raw_responses.len()
            )));
        }
        if let Some((index, &value)) = request
            .raw_responses
            .iter()
            .enumerate()
            .find(|(_, &r)| !(1..=5).contains(&r))
        {
            return Err(PipelineError::Validation(format!(
                "response at index {index} is {value}, outside the 1..=5 scale"
            )));
        }
        Ok(subject)
    }
}

impl std::fmt::Debug for AttestationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttestationPipeline")
            .field("network", &self.network)
            .field("question_count", &self.question_count)
            .field("ledger_root", &self.ledger.root())
            .finish()
    }
}
