//! # Fallback Prover — Deterministic Local Synthesis
//!
//! When the external proof service is unreachable, times out, or
//! misbehaves, the orchestrator degrades to this tier: a bundle synthesized
//! from the SHA-256 of the canonicalized circuit inputs. Identical inputs
//! always synthesize identical bundles, in any process, so a degraded
//! submission remains reproducible and auditable.
//!
//! A fallback bundle proves nothing. It preserves the pipeline's shape —
//! the tier tag and token prefix make the degradation explicit.

use thiserror::Error;
use veris_core::error::CanonicalizationError;
use veris_core::{sha256_hex, CanonicalBytes, Timestamp};

use crate::bundle::{ProofBundle, ProofTier, FALLBACK_PROOF_PREFIX, FALLBACK_VK_PREFIX};
use crate::inputs::{ProofInputs, PublicInputs};

/// Circuit size class reported on fallback bundles, mirroring what the
/// real service reports for this circuit.
const FALLBACK_CIRCUIT_SIZE: &str = "medium";

/// Error raised by fallback synthesis.
///
/// Synthesis is pure local computation over all-integer inputs; failure
/// indicates a programming error upstream, not an environmental condition.
#[derive(Error, Debug)]
pub enum FallbackError {
    /// The circuit inputs could not be canonicalized.
    #[error("cannot canonicalize proof inputs: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// The deterministic local proof tier.
#[derive(Debug, Clone, Default)]
pub struct FallbackProver;

impl FallbackProver {
    /// Synthesize a fallback bundle from the canonicalized inputs.
    pub fn synthesize(&self, inputs: &ProofInputs) -> Result<ProofBundle, FallbackError> {
        let canonical = CanonicalBytes::new(inputs)?;
        let input_hash = sha256_hex(&canonical);

        Ok(ProofBundle {
            proof_token: format!("{FALLBACK_PROOF_PREFIX}{}", &input_hash[..32]),
            public_inputs: inputs.public_inputs.clone(),
            verification_key: format!("{FALLBACK_VK_PREFIX}{}", &input_hash[..16]),
            generation_time_ms: 0,
            circuit_size: FALLBACK_CIRCUIT_SIZE.to_string(),
            timestamp: Timestamp::now(),
            tier: ProofTier::Fallback,
        })
    }

    /// Structural verification for fallback bundles: the token carries the
    /// fallback prefix and the bundle's public inputs match the ones being
    /// verified against.
    ///
    /// This check is intentionally weak — it confirms shape, not
    /// computation. The orchestrator only reaches it when the real
    /// verification channel is down, and only when explicitly allowed by
    /// configuration.
    pub fn verify_structurally(&self, bundle: &ProofBundle, public_inputs: &PublicInputs) -> bool {
        bundle.has_fallback_token() && &bundle.public_inputs == public_inputs
    }
}
