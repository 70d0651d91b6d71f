//! Persistent goal cache
//!
//! Remembers which goal a source key resolved to, together with the
//! fingerprint of the content it was resolved from. The cache only speeds
//! resolution up; it never decides a goal on its own.
//!
//! # Record States
//!
//! | State | Lookup result | Driver action |
//! |-------|---------------|---------------|
//! | Miss | `None` (absent, corrupt, other version) | full ambiguous resolution |
//! | Stale | record, fingerprint differs | full ambiguous resolution, overwrite |
//! | Hit | record, fingerprint matches | cached goal tried first |

pub mod record;
pub mod store;

pub use record::{validate, CacheRecord, RECORD_VERSION};
pub use store::GoalCache;
