//! On-disk goal cache
//!
//! One JSON file per key, named by the SHA-256 of the key. Writes go to a
//! temp file in the same directory and are renamed into place, so a reader
//! sees either the previous record or the new one. Anything unreadable is a
//! miss, never an error.

use crate::cache::record::{self, CacheRecord, RECORD_VERSION};
use crate::error::{GoalError, GoalResult};
use crate::goal::Goal;
use crate::source::Fingerprint;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::fs;
use tracing::{debug, warn};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistent key to goal store
pub struct GoalCache {
    dir: PathBuf,
    /// Serialises stores for the same key
    key_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl GoalCache {
    /// Open a cache rooted at `dir`; the directory is created on first store
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record file for a key
    pub fn record_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        self.dir
            .join(format!("{}.json", hex::encode(hasher.finalize())))
    }

    /// Read the record for `key`, if a readable one exists
    pub async fn lookup(&self, key: &str) -> Option<CacheRecord> {
        let path = self.record_path(key);

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cache record for {}", key);
                return None;
            }
            Err(e) => {
                warn!("Ignoring unreadable cache record {}: {}", path.display(), e);
                return None;
            }
        };

        let record: CacheRecord = match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => {
                warn!("Ignoring corrupt cache record {}: {}", path.display(), e);
                return None;
            }
        };

        if record.version != RECORD_VERSION {
            debug!(
                "Ignoring cache record {} with version {} (expected {})",
                path.display(),
                record.version,
                RECORD_VERSION
            );
            return None;
        }

        if record.key != key {
            warn!(
                "Ignoring cache record {}: stored for {}, not {}",
                path.display(),
                record.key,
                key
            );
            return None;
        }

        Some(record)
    }

    /// Whether `record` is still valid for the current fingerprint
    pub fn validate(&self, record: &CacheRecord, current: &Fingerprint) -> bool {
        record::validate(record, current)
    }

    /// Insert or overwrite the record for `key`
    pub async fn store(
        &self,
        key: &str,
        goal: Goal,
        fingerprint: Fingerprint,
    ) -> GoalResult<CacheRecord> {
        let lock = self.key_lock(key);
        let result = {
            let _guard = lock.lock().await;
            self.write_record(CacheRecord::new(key, goal, fingerprint)).await
        };
        self.release_key_lock(key, lock);

        let record = result?;
        debug!("Cached {} as {} ({})", key, goal, record.fingerprint);
        Ok(record)
    }

    async fn write_record(&self, record: CacheRecord) -> GoalResult<CacheRecord> {
        let path = self.record_path(&record.key);

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| GoalError::io(format!("creating cache directory {}", self.dir.display()), e))?;

        let content = serde_json::to_string_pretty(&record)?;
        write_atomic(&self.temp_path(&path), &path, &content).await?;
        Ok(record)
    }

    /// Delete the record for `key`; returns whether one existed
    pub async fn remove(&self, key: &str) -> GoalResult<bool> {
        let lock = self.key_lock(key);
        let result = {
            let _guard = lock.lock().await;
            let path = self.record_path(key);
            match fs::remove_file(&path).await {
                Ok(()) => {
                    debug!("Removed cache record for {}", key);
                    Ok(true)
                }
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
                Err(e) => Err(GoalError::io(
                    format!("removing cache record {}", path.display()),
                    e,
                )),
            }
        };
        self.release_key_lock(key, lock);
        result
    }

    /// Remove every record; returns how many were removed
    pub async fn clear(&self) -> GoalResult<usize> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(GoalError::io("reading cache directory", e)),
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| GoalError::io("reading cache entry", e))?
        {
            let path = entry.path();
            let ext = path.extension().and_then(|ext| ext.to_str());
            if matches!(ext, Some("json") | Some("tmp")) {
                fs::remove_file(&path)
                    .await
                    .map_err(|e| GoalError::io(format!("removing cache record {}", path.display()), e))?;
                if ext == Some("json") {
                    removed += 1;
                }
            }
        }

        debug!("Cleared {} cache record(s)", removed);
        Ok(removed)
    }

    /// All readable records, newest first
    pub async fn list(&self) -> GoalResult<Vec<CacheRecord>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(GoalError::io("reading cache directory", e)),
        };

        let mut records = vec![];
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| GoalError::io("reading cache entry", e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let content = fs::read_to_string(&path).await.ok();
                if let Some(content) = content {
                    match serde_json::from_str::<CacheRecord>(&content) {
                        Ok(record) if record.version == RECORD_VERSION => records.push(record),
                        _ => debug!("Skipping unreadable cache record {}", path.display()),
                    }
                }
            }
        }

        records.sort_by(|a, b| b.stored_at.cmp(&a.stored_at));
        Ok(records)
    }

    fn key_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .key_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(key.to_string()).or_default())
    }

    /// Forget the lock for `key` once no other task holds a handle to it
    fn release_key_lock(&self, key: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self
            .key_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // one handle in the map, one here
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
        drop(lock);
    }

    fn temp_path(&self, path: &Path) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        path.with_extension(format!("{}.{}.tmp", std::process::id(), n))
    }
}

/// Write `content` to `temp`, then rename it over `path`
///
/// The temp file is removed whenever the record does not end up at `path`.
async fn write_atomic(temp: &Path, path: &Path, content: &str) -> GoalResult<()> {
    if let Err(e) = fs::write(temp, content).await {
        let _ = fs::remove_file(temp).await;
        return Err(GoalError::CacheWrite {
            path: temp.to_path_buf(),
            reason: e.to_string(),
        });
    }

    if let Err(e) = fs::rename(temp, path).await {
        let _ = fs::remove_file(temp).await;
        return Err(GoalError::CacheWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        });
    }

    Ok(())
}
