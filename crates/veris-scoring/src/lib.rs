//! # veris-scoring — Feature Derivation and Linear-Model Scoring
//!
//! The scoring engine turns a subject identifier into a bounded score in
//! two pure steps:
//!
//! 1. **Feature derivation** (`features.rs`): a cryptographic hash of the
//!    identifier, reduced into per-feature ranges by modulo arithmetic.
//!    No live data source, no randomness — the same subject always yields
//!    the same features.
//! 2. **Scoring** (`model.rs`): z-score normalization with precomputed
//!    scaler parameters, a trained linear model's dot product plus bias,
//!    then clamp to `[0, 100]` and round to two decimals.
//!
//! Model artifacts (scaler parameters, weights/bias, the ordered
//! feature-name list) are read-only inputs produced by the training
//! pipeline. Missing or inconsistent artifacts are a fatal configuration
//! error — the engine refuses to construct rather than substituting a
//! mock model.

pub mod features;
pub mod model;

pub use features::{ActivityProfile, Feature, FeatureVector};
pub use model::{ModelArtifacts, ModelInfo, ScoringEngine, ScoringError};
