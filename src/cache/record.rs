//! Persisted goal decisions

use crate::goal::Goal;
use crate::source::Fingerprint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// On-disk record layout version; records with another version are misses
pub const RECORD_VERSION: u32 = 1;

/// A previously resolved goal for one source key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Record layout version
    pub version: u32,

    /// Source key the decision belongs to
    pub key: String,

    /// Goal the source resolved to
    pub goal: Goal,

    /// Fingerprint of the source at resolution time
    pub fingerprint: Fingerprint,

    /// When the record was written
    pub stored_at: DateTime<Utc>,
}

impl CacheRecord {
    /// Create a record stamped with the current time
    pub fn new(key: impl Into<String>, goal: Goal, fingerprint: Fingerprint) -> Self {
        Self {
            version: RECORD_VERSION,
            key: key.into(),
            goal,
            fingerprint,
            stored_at: Utc::now(),
        }
    }
}

/// Whether `record` still describes a source with fingerprint `current`
pub fn validate(record: &CacheRecord, current: &Fingerprint) -> bool {
    record.fingerprint == *current
}
