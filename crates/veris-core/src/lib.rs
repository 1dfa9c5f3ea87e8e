//! # veris-core — Foundational Types for the Veris Oracle Stack
//!
//! This crate is the bedrock of the veris workspace. It defines the
//! type-system primitives that the attestation pipeline builds on.
//! Every other crate in the workspace depends on `veris-core`; it depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `SubjectId`,
//!    `TransactionHash`, `PolicyId`, `ModelVersion`, `NetworkTag` — all
//!    newtypes with validated constructors. No bare strings for identifiers.
//!
//! 2. **`CanonicalBytes` newtype.** All digest computation over structured
//!    data flows through `CanonicalBytes::new()`. No raw
//!    `serde_json::to_vec()` for digests, so identical proof inputs always
//!    hash to identical fallback proofs.
//!
//! 3. **Fixed-point scores.** `Score` holds centipoints (`0..=10_000`),
//!    never a float, so the two-decimal contract and the 3-byte wire
//!    encoding are exact by construction.
//!
//! 4. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `veris-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize` unless they carry secrets.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod score;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::VerisError;
pub use identity::{ModelVersion, NetworkTag, PolicyId, SubjectId, TransactionHash};
pub use score::Score;
pub use temporal::Timestamp;
