//! Source units and content fingerprints

use crate::error::{GoalError, GoalResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// Staleness check value for a source file's content
///
/// Hash of the full contents (first 16 bytes of SHA-256, hex) plus length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Hex content hash (32 chars)
    pub hash: String,
    /// Content length in bytes
    pub len: u64,
}

impl Fingerprint {
    /// Fingerprint a byte buffer
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let result = hasher.finalize();

        Self {
            hash: hex::encode(&result[..16]),
            len: bytes.len() as u64,
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hash, self.len)
    }
}

/// A single file's identity and contents, immutable for one resolution
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Stable cache key (canonical path for files)
    pub key: String,
    /// Raw source bytes
    pub bytes: Arc<[u8]>,
    /// Fingerprint of `bytes`
    pub fingerprint: Fingerprint,
}

impl SourceUnit {
    /// Build a unit from in-memory bytes
    pub fn new(key: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        let fingerprint = Fingerprint::of_bytes(&bytes);
        Self {
            key: key.into(),
            bytes,
            fingerprint,
        }
    }

    /// Read a unit from disk, keyed by its canonical path
    pub async fn load(path: &Path) -> GoalResult<Self> {
        let canonical = canonical_key_path(path).await?;
        let bytes = fs::read(&canonical)
            .await
            .map_err(|e| GoalError::io(format!("reading source {}", canonical.display()), e))?;

        Ok(Self::new(canonical.to_string_lossy().into_owned(), bytes))
    }
}

/// Canonical form of a path used as a cache key
pub async fn canonical_key_path(path: &Path) -> GoalResult<PathBuf> {
    match fs::canonicalize(path).await {
        Ok(p) => Ok(p),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(GoalError::PathNotFound(path.to_path_buf()))
        }
        Err(e) => Err(GoalError::io(
            format!("resolving path {}", path.display()),
            e,
        )),
    }
}
