//! # veris-zkp — Tiered Proof Orchestration
//!
//! Produces a `ProofBundle` for every attestation, through one of two
//! tiers:
//!
//! - **Real** — an external proof service, reached over HTTP with bounded
//!   timeouts (`client.rs`). The service is a black box behind a
//!   request/response contract.
//! - **Fallback** — a deterministic local synthesis from the SHA-256 of the
//!   canonicalized circuit inputs (`fallback.rs`). Used whenever the real
//!   tier is unavailable, times out, or misbehaves.
//!
//! Both tiers produce structurally identical bundles; consumers distinguish
//! them only by the machine-readable tier tag (and, on the wire, by the
//! fallback token prefix).
//!
//! The orchestrator (`orchestrator.rs`) owns tier selection, the cached
//! availability probe, and verification — including the intentionally weak
//! structural fallback-verification path, which is gated behind an explicit
//! configuration flag.

pub mod bundle;
pub mod client;
pub mod fallback;
pub mod inputs;
pub mod orchestrator;

pub use bundle::{ProofBundle, ProofTier, FALLBACK_PROOF_PREFIX, FALLBACK_VK_PREFIX};
pub use client::{ProofServiceClient, ProofServiceConfig, ProofServiceError, SCORE_CIRCUIT_NAME};
pub use fallback::{FallbackError, FallbackProver};
pub use inputs::{PrivateInputs, ProofInputs, ProofInputsError, PublicInputs};
pub use orchestrator::{OrchestratorConfig, ProofOrchestrator, ProofServiceStats};
