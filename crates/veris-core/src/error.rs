//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared across the veris workspace. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Configuration errors fail loudly with full context; they are never
//!   substituted with mock data.
//! - Validation errors carry the violating field and the expected shape so
//!   callers receive a precise classification.
//! - Cryptographic errors never include key material in their messages.

use thiserror::Error;

/// Top-level error type for the veris stack.
#[derive(Error, Debug)]
pub enum VerisError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A request or identifier failed boundary validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required artifact (model file, key file) is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Scores and circuit values must be strings or integers.
    #[error("float values are not permitted in canonical representations; use string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),
}
