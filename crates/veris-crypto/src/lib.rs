//! # veris-crypto — Signing Primitives and the Oracle Key Store
//!
//! Two concerns live here:
//!
//! - **Ed25519 primitives** (`ed25519.rs`): key pairs, public keys,
//!   signatures, and verification. Private keys are never serialized or
//!   logged.
//! - **Key store** (`keystore.rs`): the `KeyManager` that owns the
//!   process-wide oracle key pair — loaded from durable storage on first
//!   use, generated and persisted exactly once if absent, never rotated
//!   automatically.
//!
//! ## Crate Policy
//!
//! - Depends only on `veris-core` internally.
//! - No `unsafe` code.
//! - Signing failures are surfaced, never silently substituted.

pub mod ed25519;
pub mod keystore;

pub use ed25519::{verify, verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use keystore::{KeyManager, KeyStoreError};
