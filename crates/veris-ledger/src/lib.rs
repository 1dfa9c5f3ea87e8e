//! # veris-ledger — Append-Only Submission Ledger
//!
//! One durable JSON unit per transaction hash, in a flat directory. The
//! store supports exactly two operations: append and lookup. There is no
//! update and no delete — an attestation, once recorded, stands.
//!
//! - **Atomic visibility**: records are written to a temporary file and
//!   renamed into place, so a reader never observes a partial record.
//! - **Write-once**: appending a transaction hash that already exists is
//!   rejected, not overwritten.
//! - **Best-effort lookup**: `find_by_subject` scans the directory without
//!   taking the write lock; it may miss a record committed mid-scan, which
//!   the lookup contract permits.

pub mod record;
pub mod store;

pub use record::TransactionRecord;
pub use store::{LedgerError, LedgerStore};
