//! # Model Artifacts and the Scoring Engine
//!
//! The trained model arrives as three read-only JSON artifacts in a model
//! directory:
//!
//! - `feature_columns.json` — the ordered feature-name list;
//! - `scaler.json` — per-feature mean and scale for z-score normalization;
//! - `model.json` — linear weights, bias, and the model version tag.
//!
//! Loading validates cross-artifact consistency (one mean, scale, and
//! weight per feature column, no zero scales). Any missing or inconsistent
//! artifact is a configuration error: the engine refuses to construct.
//! There is no mock-model path — a score is an attested fact of record.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use veris_core::{ModelVersion, Score, SubjectId};

use crate::features::{ActivityProfile, Feature, FeatureVector};

/// File name of the ordered feature-column artifact.
pub const FEATURE_COLUMNS_FILE: &str = "feature_columns.json";
/// File name of the scaler-parameter artifact.
pub const SCALER_FILE: &str = "scaler.json";
/// File name of the weight/bias artifact.
pub const MODEL_FILE: &str = "model.json";

/// Error raised by artifact loading and scoring.
#[derive(Error, Debug)]
pub enum ScoringError {
    /// A required model artifact does not exist.
    #[error("missing model artifact: {0} (train and export the model first)")]
    MissingArtifact(PathBuf),

    /// An artifact exists but cannot be parsed.
    #[error("malformed model artifact {path}: {reason}")]
    MalformedArtifact {
        /// Path of the unparseable artifact.
        path: PathBuf,
        /// Parse failure detail.
        reason: String,
    },

    /// Artifacts disagree with each other.
    #[error("inconsistent model artifacts: {0}")]
    InconsistentArtifacts(String),

    /// A feature vector does not match the model's column list.
    #[error("feature vector mismatch: {0}")]
    FeatureMismatch(String),

    /// The model references a feature this engine cannot derive.
    #[error("model references underivable feature: {0:?}")]
    UnknownFeature(String),
}

#[derive(Debug, Deserialize)]
struct ScalerArtifact {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ModelArtifact {
    weights: Vec<f64>,
    bias: f64,
    model_version: String,
}

/// The immutable parameters of a trained linear scoring model.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    feature_names: Vec<String>,
    means: Vec<f64>,
    scales: Vec<f64>,
    weights: Vec<f64>,
    bias: f64,
    version: ModelVersion,
}

impl ModelArtifacts {
    /// Assemble artifacts from in-memory parameters, validating arity.
    pub fn new(
        feature_names: Vec<String>,
        means: Vec<f64>,
        scales: Vec<f64>,
        weights: Vec<f64>,
        bias: f64,
        version: ModelVersion,
    ) -> Result<Self, ScoringError> {
        let n = feature_names.len();
        if n == 0 {
            return Err(ScoringError::InconsistentArtifacts(
                "feature column list is empty".to_string(),
            ));
        }
        if means.len() != n || scales.len() != n || weights.len() != n {
            return Err(ScoringError::InconsistentArtifacts(format!(
                "{n} feature columns but {} means, {} scales, {} weights",
                means.len(),
                scales.len(),
                weights.len()
            )));
        }
        if let Some(i) = scales.iter().position(|s| *s == 0.0 || !s.is_finite()) {
            return Err(ScoringError::InconsistentArtifacts(format!(
                "scale for {:?} is {} (must be finite and nonzero)",
                feature_names[i], scales[i]
            )));
        }
        Ok(Self {
            feature_names,
            means,
            scales,
            weights,
            bias,
            version,
        })
    }

    /// Load artifacts from a model directory.
    ///
    /// # Errors
    ///
    /// Missing files, unparseable JSON, and cross-artifact arity mismatches
    /// are all fatal configuration errors.
    pub fn load(model_dir: impl AsRef<Path>) -> Result<Self, ScoringError> {
        let dir = model_dir.as_ref();
        let columns: Vec<String> = read_artifact(&dir.join(FEATURE_COLUMNS_FILE))?;
        let scaler: ScalerArtifact = read_artifact(&dir.join(SCALER_FILE))?;
        let model: ModelArtifact = read_artifact(&dir.join(MODEL_FILE))?;

        let artifacts = Self::new(
            columns,
            scaler.mean,
            scaler.scale,
            model.weights,
            model.bias,
            ModelVersion(model.model_version),
        )?;
        tracing::info!(
            model_dir = %dir.display(),
            version = %artifacts.version,
            n_features = artifacts.feature_names.len(),
            "loaded model artifacts"
        );
        Ok(artifacts)
    }

    /// The ordered feature-column list.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// The model version tag.
    pub fn version(&self) -> &ModelVersion {
        &self.version
    }

    /// Micro-unit integer projections of the weights, for circuit inputs.
    pub fn weight_micros(&self) -> Vec<i64> {
        self.weights
            .iter()
            .map(|w| (w * 1_000_000.0).round() as i64)
            .collect()
    }

    /// Micro-unit integer projection of the bias, for circuit inputs.
    pub fn bias_micros(&self) -> i64 {
        (self.bias * 1_000_000.0).round() as i64
    }
}

/// Metadata describing the loaded model.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ModelInfo {
    /// Model version tag.
    pub model_version: ModelVersion,
    /// Ordered feature columns the model consumes.
    pub features_used: Vec<String>,
    /// Model family label.
    pub model_type: String,
}

/// The scoring engine: pure feature derivation plus linear-model scoring.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    artifacts: ModelArtifacts,
}

impl ScoringEngine {
    /// Construct the engine over already-validated artifacts.
    ///
    /// Fails if the model references a feature the derivation step cannot
    /// produce — that is a configuration error, caught at startup rather
    /// than on the first request.
    pub fn new(artifacts: ModelArtifacts) -> Result<Self, ScoringError> {
        for name in &artifacts.feature_names {
            if !crate::features::DERIVABLE_FEATURES.contains(&name.as_str()) {
                return Err(ScoringError::UnknownFeature(name.clone()));
            }
        }
        Ok(Self { artifacts })
    }

    /// Load artifacts from a model directory and construct the engine.
    pub fn load(model_dir: impl AsRef<Path>) -> Result<Self, ScoringError> {
        Self::new(ModelArtifacts::load(model_dir)?)
    }

    /// Derive the model-ordered feature vector for a subject.
    ///
    /// Pure and deterministic: identical subjects always yield identical
    /// vectors.
    pub fn derive_features(&self, subject: &SubjectId) -> FeatureVector {
        let profile = ActivityProfile::derive(subject);
        FeatureVector(
            self.artifacts
                .feature_names
                .iter()
                .map(|name| Feature {
                    name: name.clone(),
                    // Underivable names were rejected in the constructor.
                    value: profile.get(name).unwrap_or_default(),
                })
                .collect(),
        )
    }

    /// Score a feature vector: z-score scale, dot product plus bias, clamp
    /// to `[0, 100]`, round to two decimals.
    ///
    /// # Errors
    ///
    /// Rejects vectors whose arity or column names do not match the model.
    pub fn score(&self, features: &FeatureVector) -> Result<Score, ScoringError> {
        let a = &self.artifacts;
        if features.len() != a.feature_names.len() {
            return Err(ScoringError::FeatureMismatch(format!(
                "expected {} features, got {}",
                a.feature_names.len(),
                features.len()
            )));
        }
        let mut raw = a.bias;
        for (i, feature) in features.0.iter().enumerate() {
            if feature.name != a.feature_names[i] {
                return Err(ScoringError::FeatureMismatch(format!(
                    "feature {i} is {:?}, model expects {:?}",
                    feature.name, a.feature_names[i]
                )));
            }
            let scaled = (feature.value - a.means[i]) / a.scales[i];
            raw += scaled * a.weights[i];
        }
        Ok(Score::from_raw(raw))
    }

    /// Derive features and score in one step.
    pub fn score_subject(&self, subject: &SubjectId) -> Result<(FeatureVector, Score), ScoringError> {
        let features = self.derive_features(subject);
        let score = self.score(&features)?;
        Ok((features, score))
    }

    /// The loaded model artifacts.
    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    /// Metadata about the loaded model.
    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_version: self.artifacts.version.clone(),
            features_used: self.artifacts.feature_names.clone(),
            model_type: "linear-ridge".to_string(),
        }
    }
}

fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ScoringError> {
    if !path.exists() {
        return Err(ScoringError::MissingArtifact(path.to_path_buf()));
    }
    let content =
        std::fs::read_to_string(path).map_err(|e| ScoringError::MalformedArtifact {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    serde_json::from_str(&content).map_err(|e| ScoringError::MalformedArtifact {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
