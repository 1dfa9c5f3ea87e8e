//! # Proof Bundle
//!
//! The uniform result of proof generation, whichever tier produced it.
//! Fallback bundles carry the exact field set of real bundles — downstream
//! consumers cannot distinguish tiers by structure, only by the explicit
//! `tier` tag (and, when inspecting the wire, the fallback token prefix).

use serde::{Deserialize, Serialize};
use veris_core::Timestamp;

use crate::inputs::PublicInputs;

/// Prefix carried by fallback-tier proof tokens.
///
/// The tier tag is the authoritative signal; the prefix exists so external
/// consumers that only see the token can still recognize a synthetic proof.
pub const FALLBACK_PROOF_PREFIX: &str = "fallback_proof_";

/// Prefix carried by fallback-tier verification keys.
pub const FALLBACK_VK_PREFIX: &str = "fallback_vk_";

/// Which path produced a proof bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofTier {
    /// The external proof service computed the proof.
    Real,
    /// The proof was synthesized locally from a hash of the inputs.
    Fallback,
}

impl std::fmt::Display for ProofTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real => f.write_str("real"),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

/// A generated proof with its public context. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofBundle {
    /// Opaque proof token from the proving tier.
    pub proof_token: String,
    /// The public inputs the proof commits to.
    pub public_inputs: PublicInputs,
    /// Verification key for the proof.
    pub verification_key: String,
    /// Wall-clock generation time in milliseconds.
    pub generation_time_ms: u64,
    /// Circuit size class reported by the prover.
    pub circuit_size: String,
    /// When the bundle was produced.
    pub timestamp: Timestamp,
    /// Which tier produced it.
    pub tier: ProofTier,
}

impl ProofBundle {
    /// True if the proof token carries the fallback prefix.
    ///
    /// Prefer the `tier` tag; this exists for consumers holding only the
    /// token string.
    pub fn has_fallback_token(&self) -> bool {
        self.proof_token.starts_with(FALLBACK_PROOF_PREFIX)
    }
}
