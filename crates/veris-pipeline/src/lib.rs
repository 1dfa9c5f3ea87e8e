//! # veris-pipeline — The Request-Scoped Attestation Flow
//!
//! Sequences the whole oracle pipeline for one submission:
//!
//! ```text
//! validate → derive features → score → sign → prove (tiered) → persist
//! ```
//!
//! ## Partial-failure policy
//!
//! - **Scoring, signing, persistence**: hard errors. These produce the
//!   attested facts of record — none of them may be silently mocked.
//! - **Proof generation**: degrades to the deterministic fallback tier
//!   without failing the request. The response says which tier ran; the
//!   degradation is otherwise transparent.
//!
//! Validation failures reject the request before any side effect.

pub mod pipeline;

pub use pipeline::{
    AttestationPipeline, PipelineConfig, PipelineError, SubmissionOutcome, SubmissionRequest,
    SubmissionStatus, DEFAULT_QUESTION_COUNT,
};
