//! # Proof Orchestrator — Tier Selection and Verification
//!
//! Owns the generate/verify flow across the two proof tiers:
//!
//! - **Generation** asks the real tier first (when the availability probe
//!   says the service is up), degrading to the fallback tier on any
//!   failure: unreachable service, non-success status, timeout, or a
//!   malformed response. The result is always a structurally uniform
//!   `ProofBundle`.
//! - **Verification** asks the real tier first. A service that answers
//!   with a non-success status has *declined* — that verifies as `false`.
//!   Only a transport failure falls through to the structural check, and
//!   only when `allow_insecure_fallback_verify` is set.
//! - **Availability** is probed at most once per refresh interval, so a
//!   known-down service does not cost a failed round-trip on every
//!   submission.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use veris_core::Timestamp;

use crate::bundle::{ProofBundle, ProofTier};
use crate::client::{ProofServiceClient, SCORE_CIRCUIT_NAME};
use crate::fallback::{FallbackError, FallbackProver};
use crate::inputs::{ProofInputs, PublicInputs};

/// Default interval between availability probes.
pub const DEFAULT_PROBE_REFRESH: Duration = Duration::from_secs(60);

/// Orchestrator behavior switches.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Permit the structural fallback-verification path when the real
    /// verification channel is unreachable.
    ///
    /// The structural check confirms token shape, not computation. It is
    /// enabled by default for compatibility with deployments that predate
    /// the flag, and logged loudly whenever it runs; disable it anywhere
    /// a `false` verdict is cheaper than a hollow `true`.
    pub allow_insecure_fallback_verify: bool,
    /// How long a probe verdict stays cached before re-probing.
    pub probe_refresh: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            allow_insecure_fallback_verify: true,
            probe_refresh: DEFAULT_PROBE_REFRESH,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ProbeVerdict {
    available: bool,
    checked_at: Instant,
}

/// Service metadata for diagnostics.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ProofServiceStats {
    /// Whether an external service endpoint is configured at all.
    pub service_configured: bool,
    /// Whether the most recent probe (if any) found the service up.
    pub service_available: bool,
    /// The configured endpoint.
    pub endpoint: Option<String>,
    /// Generation timeout bound in seconds.
    pub generate_timeout_secs: Option<u64>,
    /// Verification timeout bound in seconds.
    pub verify_timeout_secs: Option<u64>,
    /// Circuit the pipeline proves against.
    pub circuit_name: String,
}

/// The tiered proof orchestrator.
#[derive(Debug)]
pub struct ProofOrchestrator {
    client: Option<ProofServiceClient>,
    fallback: FallbackProver,
    config: OrchestratorConfig,
    probe_cache: Mutex<Option<ProbeVerdict>>,
}

impl ProofOrchestrator {
    /// Orchestrator over an optional remote tier.
    ///
    /// `None` means no proof service is configured: every generation goes
    /// straight to the fallback tier without probing anything.
    pub fn new(client: Option<ProofServiceClient>, config: OrchestratorConfig) -> Self {
        Self {
            client,
            fallback: FallbackProver,
            config,
            probe_cache: Mutex::new(None),
        }
    }

    /// Orchestrator with no remote tier and default configuration.
    pub fn local_only() -> Self {
        Self::new(None, OrchestratorConfig::default())
    }

    /// Generate a proof bundle for the given inputs.
    ///
    /// Never fails on service trouble — the fallback tier absorbs it. The
    /// only error is a failure of the purely local fallback synthesis,
    /// which indicates malformed inputs, not an environmental condition.
    pub async fn generate(&self, inputs: &ProofInputs) -> Result<ProofBundle, FallbackError> {
        if self.is_available().await {
            // is_available is false whenever no client is configured.
            if let Some(client) = &self.client {
                let started = Instant::now();
                match client.generate_proof(inputs).await {
                    Ok(proof) => {
                        let elapsed_ms = started.elapsed().as_millis() as u64;
                        tracing::info!(elapsed_ms, "proof generated by external service");
                        return Ok(ProofBundle {
                            proof_token: proof.proof_token,
                            public_inputs: proof.public_inputs,
                            verification_key: proof.verification_key,
                            generation_time_ms: proof
                                .generation_time
                                .map(|s| (s * 1000.0) as u64)
                                .unwrap_or(elapsed_ms),
                            circuit_size: proof
                                .circuit_size
                                .unwrap_or_else(|| "medium".to_string()),
                            timestamp: Timestamp::now(),
                            tier: ProofTier::Real,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "proof generation degraded to fallback tier");
                    }
                }
            }
        } else {
            tracing::debug!("proof service unavailable, synthesizing fallback proof");
        }
        self.fallback.synthesize(inputs)
    }

    /// Verify a proof bundle against public inputs.
    ///
    /// Real verification first; a declining service (non-success status,
    /// malformed body) is `false`; a transport failure falls through to the
    /// structural check when configuration allows it.
    pub async fn verify(&self, bundle: &ProofBundle, public_inputs: &PublicInputs) -> bool {
        if let Some(client) = &self.client {
            match client
                .verify_proof(&bundle.proof_token, public_inputs, &bundle.verification_key)
                .await
            {
                Ok(is_valid) => return is_valid,
                Err(e) if e.is_transport() => {
                    tracing::warn!(error = %e, "verification channel down, trying structural check");
                }
                Err(e) => {
                    tracing::error!(error = %e, "proof service rejected verification request");
                    return false;
                }
            }
        }
        self.verify_structurally(bundle, public_inputs)
    }

    fn verify_structurally(&self, bundle: &ProofBundle, public_inputs: &PublicInputs) -> bool {
        if !self.config.allow_insecure_fallback_verify {
            tracing::warn!("structural fallback verification disabled by configuration");
            return false;
        }
        let verdict = self.fallback.verify_structurally(bundle, public_inputs);
        tracing::warn!(
            verdict,
            "INSECURE structural verification used: confirms shape, not computation"
        );
        verdict
    }

    /// Whether the real tier should be attempted right now.
    ///
    /// Cached: the service is probed at most once per refresh interval.
    /// The cache lock is never held across the probe's network round-trip.
    pub async fn is_available(&self) -> bool {
        let Some(client) = &self.client else {
            return false;
        };

        if let Some(verdict) = *self.probe_cache.lock() {
            if verdict.checked_at.elapsed() < self.config.probe_refresh {
                return verdict.available;
            }
        }

        let available = client.probe().await;
        *self.probe_cache.lock() = Some(ProbeVerdict {
            available,
            checked_at: Instant::now(),
        });
        if !available {
            tracing::warn!(
                endpoint = %client.base_url(),
                refresh_secs = self.config.probe_refresh.as_secs(),
                "proof service probe failed; fallback tier selected until next refresh"
            );
        }
        available
    }

    /// Service metadata for diagnostics.
    pub fn stats(&self) -> ProofServiceStats {
        let cached = self.probe_cache.lock().as_ref().map(|v| v.available);
        ProofServiceStats {
            service_configured: self.client.is_some(),
            service_available: cached.unwrap_or(false),
            endpoint: self.client.as_ref().map(|c| c.base_url().to_string()),
            generate_timeout_secs: self
                .client
                .as_ref()
                .map(|c| c.config().generate_timeout_secs),
            verify_timeout_secs: self.client.as_ref().map(|c| c.config().verify_timeout_secs),
            circuit_name: SCORE_CIRCUIT_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veris_core::{ModelVersion, Score, SubjectId};
    use veris_scoring::{Feature, FeatureVector, ModelArtifacts};

    fn inputs() -> ProofInputs {
        let model = ModelArtifacts::new(
            vec!["tx_count".to_string()],
            vec![259.5],
            vec![144.3],
            vec![0.42],
            55.2,
            ModelVersion("v1.0".to_string()),
        )
        .unwrap();
        let features = FeatureVector(vec![Feature {
            name: "tx_count".to_string(),
            value: 42.0,
        }]);
        ProofInputs::build(
            &SubjectId::new("addr_test1abc").unwrap(),
            &[3u8; 20],
            &features,
            Score::from_raw(75.25),
            &model,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn no_service_configured_means_fallback_tier() {
        let orchestrator = ProofOrchestrator::local_only();
        assert!(!orchestrator.is_available().await);

        let bundle = orchestrator.generate(&inputs()).await.unwrap();
        assert_eq!(bundle.tier, ProofTier::Fallback);
        assert!(bundle.has_fallback_token());
    }

    #[tokio::test]
    async fn local_verification_honors_insecure_flag() {
        let permissive = ProofOrchestrator::local_only();
        let bundle = permissive.generate(&inputs()).await.unwrap();
        assert!(permissive.verify(&bundle, &inputs().public_inputs).await);

        let strict = ProofOrchestrator::new(
            None,
            OrchestratorConfig {
                allow_insecure_fallback_verify: false,
                ..OrchestratorConfig::default()
            },
        );
        assert!(!strict.verify(&bundle, &inputs().public_inputs).await);
    }

    #[tokio::test]
    async fn stats_reflect_missing_service() {
        let orchestrator = ProofOrchestrator::local_only();
        let stats = orchestrator.stats();
        assert!(!stats.service_configured);
        assert!(!stats.service_available);
        assert_eq!(stats.endpoint, None);
        assert_eq!(stats.circuit_name, SCORE_CIRCUIT_NAME);
    }
}
