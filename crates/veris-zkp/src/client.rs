//! # Proof Service Client
//!
//! Typed HTTP client for the external proof-generation service. The
//! service is a black box behind two endpoints and a health probe:
//!
//! | Method | Path              | Operation                          |
//! |--------|-------------------|------------------------------------|
//! | POST   | `/generate_proof` | Generate a proof for circuit inputs |
//! | POST   | `/verify_proof`   | Verify a proof against public inputs |
//! | GET    | `/health`         | Availability probe                  |
//!
//! Every call carries its own bounded timeout (generation is allowed far
//! longer than verification), and no caller lock is ever held across a
//! request.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::inputs::{ProofInputs, PublicInputs};

/// Environment variable naming the proof service endpoint.
pub const PROOF_SERVICE_URL_VAR: &str = "VERIS_PROOF_SERVICE_URL";

/// Default generation timeout in seconds.
pub const DEFAULT_GENERATE_TIMEOUT_SECS: u64 = 30;
/// Default verification timeout in seconds.
pub const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 10;
/// Default probe timeout in seconds.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;

/// Circuit the oracle pipeline proves against.
pub const SCORE_CIRCUIT_NAME: &str = "compute_private_score";

/// Error raised by proof-service calls.
#[derive(Error, Debug)]
pub enum ProofServiceError {
    /// Transport-level failure: connection refused, DNS, timeout.
    #[error("proof service transport error at {endpoint}: {source}")]
    Http {
        /// Which endpoint failed.
        endpoint: String,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The service responded with a non-success status.
    #[error("proof service error at {endpoint}: status {status}: {body}")]
    Api {
        /// Which endpoint failed.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The service responded with a body this client cannot parse.
    #[error("proof service returned malformed response at {endpoint}: {source}")]
    Deserialization {
        /// Which endpoint failed.
        endpoint: String,
        /// Underlying parse error.
        #[source]
        source: reqwest::Error,
    },

    /// Client construction or configuration failure.
    #[error("proof service configuration error: {0}")]
    Config(String),
}

impl ProofServiceError {
    /// True for transport-level failures — the cases where the orchestrator
    /// may fall through to structural verification.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http { .. })
    }
}

/// Configuration for the proof service channel.
#[derive(Debug, Clone)]
pub struct ProofServiceConfig {
    /// Base URL of the proof service.
    pub base_url: Url,
    /// Bound on proof generation calls, in seconds.
    pub generate_timeout_secs: u64,
    /// Bound on verification calls, in seconds.
    pub verify_timeout_secs: u64,
    /// Bound on the health probe, in seconds.
    pub probe_timeout_secs: u64,
}

impl ProofServiceConfig {
    /// Configuration with default timeouts for the given endpoint.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            generate_timeout_secs: DEFAULT_GENERATE_TIMEOUT_SECS,
            verify_timeout_secs: DEFAULT_VERIFY_TIMEOUT_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
        }
    }

    /// Load configuration from the environment.
    ///
    /// Returns `Ok(None)` when `VERIS_PROOF_SERVICE_URL` is unset — the
    /// service is simply not configured, which is a supported deployment
    /// shape, not an error.
    pub fn from_env() -> Result<Option<Self>, ProofServiceError> {
        let Ok(raw) = std::env::var(PROOF_SERVICE_URL_VAR) else {
            return Ok(None);
        };
        let base_url = Url::parse(&raw)
            .map_err(|e| ProofServiceError::Config(format!("invalid {PROOF_SERVICE_URL_VAR}: {e}")))?;
        Ok(Some(Self::new(base_url)))
    }
}

// -- Wire types matching the proof service contract ---------------------------

/// Request to `POST /generate_proof`.
#[derive(Debug, Serialize)]
pub struct GenerateProofRequest<'a> {
    /// Name of the circuit to prove.
    pub circuit_name: &'a str,
    /// The public/private input split.
    pub inputs: &'a ProofInputs,
    /// Timeout hint for the prover, in seconds.
    pub timeout_s: u64,
}

/// Successful response from `POST /generate_proof`.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedProof {
    /// Opaque proof token.
    pub proof_token: String,
    /// Public inputs echoed by the prover.
    pub public_inputs: PublicInputs,
    /// Verification key for the proof.
    pub verification_key: String,
    /// Prover-reported generation time in seconds, if reported.
    #[serde(default)]
    pub generation_time: Option<f64>,
    /// Circuit size class, if reported.
    #[serde(default)]
    pub circuit_size: Option<String>,
}

/// Request to `POST /verify_proof`.
#[derive(Debug, Serialize)]
pub struct VerifyProofRequest<'a> {
    /// The proof token to verify.
    pub proof: &'a str,
    /// Public inputs the proof must commit to.
    pub public_inputs: &'a PublicInputs,
    /// Verification key from the bundle.
    pub verification_key: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyProofResponse {
    #[serde(default)]
    is_valid: bool,
}

// -- Client -------------------------------------------------------------------

/// HTTP client for the proof service.
#[derive(Debug, Clone)]
pub struct ProofServiceClient {
    http: reqwest::Client,
    config: ProofServiceConfig,
}

impl ProofServiceClient {
    /// Build a client from configuration.
    pub fn new(config: ProofServiceConfig) -> Result<Self, ProofServiceError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ProofServiceError::Config(format!("client init failed: {e}")))?;
        Ok(Self { http, config })
    }

    /// The configured endpoint.
    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// The channel configuration.
    pub fn config(&self) -> &ProofServiceConfig {
        &self.config
    }

    /// Submit circuit inputs for proof generation.
    ///
    /// Bounded by the generation timeout; expiry surfaces as a transport
    /// error.
    pub async fn generate_proof(
        &self,
        inputs: &ProofInputs,
    ) -> Result<GeneratedProof, ProofServiceError> {
        let endpoint = "POST /generate_proof";
        let url = format!("{}generate_proof", self.config.base_url);
        let request = GenerateProofRequest {
            circuit_name: SCORE_CIRCUIT_NAME,
            inputs,
            timeout_s: self.config.generate_timeout_secs,
        };

        let resp = self
            .http
            .post(&url)
            .timeout(Duration::from_secs(self.config.generate_timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProofServiceError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProofServiceError::Api {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| ProofServiceError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })
    }

    /// Verify a proof against its public inputs.
    ///
    /// Bounded by the verification timeout. A non-success status is an
    /// `Api` error — the service answered and declined, which is not the
    /// same as the service being unreachable.
    pub async fn verify_proof(
        &self,
        proof: &str,
        public_inputs: &PublicInputs,
        verification_key: &str,
    ) -> Result<bool, ProofServiceError> {
        let endpoint = "POST /verify_proof";
        let url = format!("{}verify_proof", self.config.base_url);
        let request = VerifyProofRequest {
            proof,
            public_inputs,
            verification_key,
        };

        let resp = self
            .http
            .post(&url)
            .timeout(Duration::from_secs(self.config.verify_timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProofServiceError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProofServiceError::Api {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        let parsed: VerifyProofResponse =
            resp.json().await.map_err(|e| ProofServiceError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            })?;
        Ok(parsed.is_valid)
    }

    /// Probe service availability with a short-bounded health check.
    pub async fn probe(&self) -> bool {
        let url = format!("{}health", self.config.base_url);
        match self
            .http
            .get(&url)
            .timeout(Duration::from_secs(self.config.probe_timeout_secs))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "proof service probe failed");
                false
            }
        }
    }
}
