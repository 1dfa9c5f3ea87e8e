//! # veris-oracle — Attestation Signing
//!
//! Turns a scored subject into a signed, verifiable attestation bound to a
//! transaction context.
//!
//! - **`datum.rs`** — `ScoreDatum`, the immutable scored-subject record the
//!   oracle signs over.
//! - **`attestation.rs`** — the fixed binding-message wire layout, the
//!   `OracleSigner`, and `Attestation` verification.
//!
//! Signing failures are fatal by design: an oracle cannot mock its own
//! signature, so there is no fallback path anywhere in this crate.

pub mod attestation;
pub mod datum;

pub use attestation::{binding_message, Attestation, OracleSigner, SignError};
pub use datum::ScoreDatum;
