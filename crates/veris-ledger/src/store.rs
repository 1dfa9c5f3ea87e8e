//! # Ledger Store — Filesystem-Backed, Write-Once
//!
//! Each record lives at `{root}/{transaction_hash}.json`. Appends are
//! serialized behind a single write lock and made visible atomically via
//! temp-file-then-rename; scans run lock-free and tolerate foreign files
//! in the directory by skipping them with a warning.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use veris_core::{SubjectId, TransactionHash};

use crate::record::TransactionRecord;

/// Error raised by ledger operations.
///
/// Persistence failures are fatal to the request that triggered them: an
/// unpersisted attestation is a lost audit trail.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A record with this transaction hash already exists.
    /// The ledger is write-once; duplicates are rejected, not overwritten.
    #[error("transaction {0} is already recorded")]
    DuplicateTransaction(TransactionHash),

    /// A record failed to serialize.
    #[error("cannot serialize record for {transaction_hash}: {reason}")]
    Serialization {
        /// The record's key.
        transaction_hash: TransactionHash,
        /// Serializer failure detail.
        reason: String,
    },

    /// A directly-addressed record exists but cannot be parsed.
    #[error("malformed ledger record {path}: {reason}")]
    Malformed {
        /// Path of the unparseable record.
        path: PathBuf,
        /// Parse failure detail.
        reason: String,
    },

    /// Filesystem failure.
    #[error("ledger io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The append-only submission ledger.
///
/// Cheap to clone; clones share the write lock.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    root: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl LedgerStore {
    /// Open (creating if needed) a ledger rooted at the given directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// The ledger's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The path a record for this hash lives at.
    pub fn record_path(&self, transaction_hash: &TransactionHash) -> PathBuf {
        self.root.join(format!("{transaction_hash}.json"))
    }

    /// Append a record, keyed by its transaction hash.
    ///
    /// The record is fully written to a temporary file and renamed into
    /// place, so concurrent scans either see the whole record or none of
    /// it. Returns the path of the durable unit.
    ///
    /// # Errors
    ///
    /// `DuplicateTransaction` if the hash is already recorded; `Io` on any
    /// filesystem failure — both fatal to the submitting request.
    pub fn append(&self, record: &TransactionRecord) -> Result<PathBuf, LedgerError> {
        let final_path = self.record_path(&record.transaction_hash);
        let json = serde_json::to_string_pretty(record).map_err(|e| {
            LedgerError::Serialization {
                transaction_hash: record.transaction_hash.clone(),
                reason: e.to_string(),
            }
        })?;

        let _guard = self.write_lock.lock();
        if final_path.exists() {
            return Err(LedgerError::DuplicateTransaction(
                record.transaction_hash.clone(),
            ));
        }

        let tmp_path = self
            .root
            .join(format!(".{}.json.tmp", record.transaction_hash));
        std::fs::write(&tmp_path, json)?;
        if let Err(e) = std::fs::rename(&tmp_path, &final_path) {
            // Leave no half-visible state behind.
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        tracing::info!(
            transaction_hash = %record.transaction_hash,
            subject = %record.subject,
            path = %final_path.display(),
            "ledger record appended"
        );
        Ok(final_path)
    }

    /// Look up a record by its transaction hash.
    pub fn find_by_hash(
        &self,
        transaction_hash: &TransactionHash,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        let path = self.record_path(transaction_hash);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        let record = serde_json::from_str(&content).map_err(|e| LedgerError::Malformed {
            path,
            reason: e.to_string(),
        })?;
        Ok(Some(record))
    }

    /// Look up the most recent record for a subject.
    ///
    /// Full directory scan. When several records share the subject, the
    /// one with the latest timestamp wins (ties broken by transaction hash
    /// for determinism). Unparseable or foreign files are skipped with a
    /// warning — one corrupt unit must not take down lookup for everyone.
    pub fn find_by_subject(
        &self,
        subject: &SubjectId,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|r| &r.subject == subject)
            .max_by(|a, b| {
                a.timestamp
                    .cmp(&b.timestamp)
                    .then_with(|| a.transaction_hash.as_str().cmp(b.transaction_hash.as_str()))
            }))
    }

    /// All parseable records, in no particular order.
    pub fn records(&self) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.scan()
    }

    /// Number of durable units currently visible.
    pub fn len(&self) -> Result<usize, LedgerError> {
        Ok(self.record_files()?.len())
    }

    /// True if no records are visible.
    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.record_files()?.is_empty())
    }

    fn record_files(&self) -> Result<Vec<PathBuf>, LedgerError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            // Skip in-flight temp files and anything else that is not a
            // record unit.
            if name.starts_with('.') || !name.ends_with(".json") {
                continue;
            }
            files.push(path);
        }
        Ok(files)
    }

    fn scan(&self) -> Result<Vec<TransactionRecord>, LedgerError> {
        let mut records = Vec::new();
        for path in self.record_files()? {
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable ledger file");
                    continue;
                }
            };
            match serde_json::from_str::<TransactionRecord>(&content) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping malformed ledger file");
                }
            }
        }
        Ok(records)
    }
}
