//! # Oracle Key Store — Durable, Init-Once Key Material
//!
//! The `KeyManager` owns the process-wide oracle signing key pair:
//!
//! - **Load-if-present**: on first access, reads the signing and
//!   verification key files from the key directory.
//! - **Generate-and-persist**: if neither file exists, generates a fresh
//!   pair and writes the signing key *before* the verification key.
//! - **Partial writes are corruption**: one file present without the other,
//!   or a verification key that does not match the signing key, is a
//!   `Corrupted` error requiring manual recovery. The store never silently
//!   regenerates — a regenerated pair would orphan every attestation made
//!   under the already-advertised public key.
//! - **Init-once**: the loaded pair is cached behind a mutex, so concurrent
//!   first use cannot mint two competing key pairs.
//!
//! ## State machine
//!
//! `Uninitialized → KeyLoaded` — there is no unload, and no automatic
//! rotation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ed25519::{bytes_to_hex, hex_to_bytes, Ed25519KeyPair, Ed25519PublicKey};

/// File name of the persisted signing key.
pub const SIGNING_KEY_FILE: &str = "oracle.skey";
/// File name of the persisted verification key.
pub const VERIFICATION_KEY_FILE: &str = "oracle.vkey";

const SIGNING_KEY_TYPE: &str = "OracleSigningKeyEd25519";
const VERIFICATION_KEY_TYPE: &str = "OracleVerificationKeyEd25519";

/// Error raised by key store operations.
///
/// Every variant is fatal to the attestation that triggered it — an oracle
/// cannot mock its own signature.
#[derive(Error, Debug)]
pub enum KeyStoreError {
    /// Key material is in a partially-written or inconsistent state.
    /// Requires manual recovery; never auto-repaired.
    #[error("corrupted key material in {dir}: {reason}")]
    Corrupted {
        /// Key directory that failed the consistency check.
        dir: PathBuf,
        /// What was inconsistent.
        reason: String,
    },

    /// A key file exists but cannot be parsed.
    #[error("malformed key file {path}: {reason}")]
    Malformed {
        /// Path of the unparseable file.
        path: PathBuf,
        /// Parse failure detail.
        reason: String,
    },

    /// Filesystem failure while reading or writing key files.
    #[error("key store io error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON envelope for persisted key files.
///
/// The same envelope shape carries both halves; `key_type` distinguishes
/// them so a verification key pasted over a signing key is caught as
/// malformed rather than loaded as a seed.
#[derive(Debug, Serialize, Deserialize)]
struct KeyEnvelope {
    #[serde(rename = "type")]
    key_type: String,
    description: String,
    hex: String,
}

/// Durable manager for the oracle's long-lived signing key pair.
///
/// Cheap to clone; clones share the cached key pair.
#[derive(Clone)]
pub struct KeyManager {
    dir: PathBuf,
    cached: Arc<Mutex<Option<Arc<Ed25519KeyPair>>>>,
}

impl KeyManager {
    /// Create a key manager rooted at the given key directory.
    ///
    /// No filesystem access happens until [`KeyManager::keypair()`] is
    /// first called.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cached: Arc::new(Mutex::new(None)),
        }
    }

    /// The key directory this manager persists into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Return the process-wide key pair, materializing it on first use.
    ///
    /// The mutex is held for the whole load-or-generate sequence, so two
    /// threads racing on first use observe exactly one generation.
    pub fn keypair(&self) -> Result<Arc<Ed25519KeyPair>, KeyStoreError> {
        let mut guard = self.cached.lock();
        if let Some(kp) = guard.as_ref() {
            return Ok(Arc::clone(kp));
        }
        let kp = Arc::new(self.load_or_generate()?);
        *guard = Some(Arc::clone(&kp));
        Ok(kp)
    }

    /// The oracle's public key, materializing the pair on first use.
    pub fn public_key(&self) -> Result<Ed25519PublicKey, KeyStoreError> {
        Ok(self.keypair()?.public_key())
    }

    fn load_or_generate(&self) -> Result<Ed25519KeyPair, KeyStoreError> {
        let skey_path = self.dir.join(SIGNING_KEY_FILE);
        let vkey_path = self.dir.join(VERIFICATION_KEY_FILE);

        match (skey_path.exists(), vkey_path.exists()) {
            (true, true) => self.load(&skey_path, &vkey_path),
            (false, false) => self.generate_and_persist(&skey_path, &vkey_path),
            (true, false) => Err(KeyStoreError::Corrupted {
                dir: self.dir.clone(),
                reason: format!(
                    "signing key present but {VERIFICATION_KEY_FILE} missing; \
                     restore the verification key or move the pair aside"
                ),
            }),
            (false, true) => Err(KeyStoreError::Corrupted {
                dir: self.dir.clone(),
                reason: format!(
                    "verification key present but {SIGNING_KEY_FILE} missing; \
                     the advertised public key has no usable signing half"
                ),
            }),
        }
    }

    fn load(&self, skey_path: &Path, vkey_path: &Path) -> Result<Ed25519KeyPair, KeyStoreError> {
        let seed = read_envelope(skey_path, SIGNING_KEY_TYPE, 32)?;
        let mut seed_arr = [0u8; 32];
        seed_arr.copy_from_slice(&seed);
        let keypair = Ed25519KeyPair::from_seed(&seed_arr);

        let advertised = read_envelope(vkey_path, VERIFICATION_KEY_TYPE, 32)?;
        if advertised != keypair.public_key().as_bytes() {
            return Err(KeyStoreError::Corrupted {
                dir: self.dir.clone(),
                reason: "verification key does not match the signing key".to_string(),
            });
        }

        tracing::debug!(dir = %self.dir.display(), "loaded oracle key pair");
        Ok(keypair)
    }

    fn generate_and_persist(
        &self,
        skey_path: &Path,
        vkey_path: &Path,
    ) -> Result<Ed25519KeyPair, KeyStoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let keypair = Ed25519KeyPair::generate();

        // Signing key first: if the process dies between the two writes the
        // store reads as corrupted, not as a half-advertised key pair.
        write_envelope(
            skey_path,
            KeyEnvelope {
                key_type: SIGNING_KEY_TYPE.to_string(),
                description: "Oracle attestation signing key".to_string(),
                hex: bytes_to_hex(&keypair.seed_bytes()),
            },
        )?;
        write_envelope(
            vkey_path,
            KeyEnvelope {
                key_type: VERIFICATION_KEY_TYPE.to_string(),
                description: "Oracle attestation verification key".to_string(),
                hex: keypair.public_key().to_hex(),
            },
        )?;

        tracing::info!(
            dir = %self.dir.display(),
            public_key = %keypair.public_key(),
            "generated and persisted new oracle key pair"
        );
        Ok(keypair)
    }
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("dir", &self.dir)
            .field("loaded", &self.cached.lock().is_some())
            .finish()
    }
}

fn read_envelope(
    path: &Path,
    expected_type: &str,
    expected_len: usize,
) -> Result<Vec<u8>, KeyStoreError> {
    let content = std::fs::read_to_string(path)?;
    let envelope: KeyEnvelope =
        serde_json::from_str(&content).map_err(|e| KeyStoreError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    if envelope.key_type != expected_type {
        return Err(KeyStoreError::Malformed {
            path: path.to_path_buf(),
            reason: format!(
                "expected key type {expected_type:?}, got {:?}",
                envelope.key_type
            ),
        });
    }
    let bytes = hex_to_bytes(envelope.hex.trim()).map_err(|reason| KeyStoreError::Malformed {
        path: path.to_path_buf(),
        reason,
    })?;
    if bytes.len() != expected_len {
        return Err(KeyStoreError::Malformed {
            path: path.to_path_buf(),
            reason: format!("expected {expected_len} key bytes, got {}", bytes.len()),
        });
    }
    Ok(bytes)
}

fn write_envelope(path: &Path, envelope: KeyEnvelope) -> Result<(), KeyStoreError> {
    let json = serde_json::to_string_pretty(&envelope).map_err(|e| KeyStoreError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_and_persists_on_first_use() {
        let dir = tempfile::tempdir().unwrap();
        let manager = KeyManager::new(dir.path());
        let kp = manager.keypair().unwrap();

        assert!(dir.path().join(SIGNING_KEY_FILE).exists());
        assert!(dir.path().join(VERIFICATION_KEY_FILE).exists());

        // A fresh manager over the same directory loads the same pair.
        let reloaded = KeyManager::new(dir.path()).keypair().unwrap();
        assert_eq!(reloaded.public_key(), kp.public_key());
    }

    #[test]
    fn cached_after_first_access() {
        let dir = tempfile::tempdir().unwrap();
        let manager = KeyManager::new(dir.path());
        let a = manager.keypair().unwrap();

        // Removing the files after load does not disturb the cached pair.
        std::fs::remove_file(dir.path().join(SIGNING_KEY_FILE)).unwrap();
        let b = manager.keypair().unwrap();
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn missing_verification_key_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        KeyManager::new(dir.path()).keypair().unwrap();
        std::fs::remove_file(dir.path().join(VERIFICATION_KEY_FILE)).unwrap();

        let err = KeyManager::new(dir.path()).keypair().unwrap_err();
        assert!(matches!(err, KeyStoreError::Corrupted { .. }), "{err}");
    }

    #[test]
    fn orphaned_verification_key_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        KeyManager::new(dir.path()).keypair().unwrap();
        std::fs::remove_file(dir.path().join(SIGNING_KEY_FILE)).unwrap();

        let err = KeyManager::new(dir.path()).keypair().unwrap_err();
        assert!(matches!(err, KeyStoreError::Corrupted { .. }), "{err}");
    }

    #[test]
    fn mismatched_pair_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        KeyManager::new(dir.path()).keypair().unwrap();

        // Overwrite the verification key with one from a different pair.
        let stranger = Ed25519KeyPair::generate();
        write_envelope(
            &dir.path().join(VERIFICATION_KEY_FILE),
            KeyEnvelope {
                key_type: VERIFICATION_KEY_TYPE.to_string(),
                description: "stranger".to_string(),
                hex: stranger.public_key().to_hex(),
            },
        )
        .unwrap();

        let err = KeyManager::new(dir.path()).keypair().unwrap_err();
        assert!(matches!(err, KeyStoreError::Corrupted { .. }), "{err}");
    }

    #[test]
    fn malformed_envelope_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SIGNING_KEY_FILE), "not json").unwrap();
        std::fs::write(dir.path().join(VERIFICATION_KEY_FILE), "not json").unwrap();

        let err = KeyManager::new(dir.path()).keypair().unwrap_err();
        assert!(matches!(err, KeyStoreError::Malformed { .. }), "{err}");
    }

    #[test]
    fn wrong_envelope_type_rejected() {
        let dir = tempfile::tempdir().unwrap();
        KeyManager::new(dir.path()).keypair().unwrap();

        // Copy the vkey envelope over the skey file.
        let vkey = std::fs::read(dir.path().join(VERIFICATION_KEY_FILE)).unwrap();
        std::fs::write(dir.path().join(SIGNING_KEY_FILE), vkey).unwrap();

        let err = KeyManager::new(dir.path()).keypair().unwrap_err();
        assert!(matches!(err, KeyStoreError::Malformed { .. }), "{err}");
    }

    #[test]
    fn concurrent_first_use_yields_one_pair() {
        let dir = tempfile::tempdir().unwrap();
        let manager = KeyManager::new(dir.path());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = manager.clone();
                std::thread::spawn(move || m.keypair().unwrap().public_key())
            })
            .collect();
        let keys: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(keys.windows(2).all(|w| w[0] == w[1]));
    }
}
