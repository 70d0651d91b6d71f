//! End-to-end goal resolution for files
//!
//! Ties the pieces together: load the source, look for a declared goal,
//! consult the cache, resolve, then persist the outcome. Failures are never
//! cached, and a record is dropped when its key fails to resolve.

use crate::cache::GoalCache;
use crate::config::{Config, ConfigManager};
use crate::error::{GoalError, GoalResult};
use crate::goal::{Goal, GoalSource};
use crate::grammar::{EcmaProbe, GrammarAttempt, TimeLimited};
use crate::manifest::ManifestLookup;
use crate::resolver::GoalResolver;
use crate::source::SourceUnit;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// What the cache contributed to a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Cache turned off
    Disabled,
    /// No usable record
    Miss,
    /// Record found for different content
    Stale,
    /// Record found for this content; its goal was tried first
    Hit,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Miss => write!(f, "miss"),
            Self::Stale => write!(f, "stale"),
            Self::Hit => write!(f, "hit"),
        }
    }
}

/// Result of resolving one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Cache key (canonical path)
    pub key: String,
    /// Resolved goal
    pub goal: Goal,
    /// Goals attempted, in order
    pub attempts: Vec<Goal>,
    /// What the resolution started from
    pub source: GoalSource,
    /// Cache state before resolution
    pub cache: CacheStatus,
}

/// Runs resolutions for files
pub struct Driver {
    resolver: GoalResolver,
    grammar: Arc<dyn GrammarAttempt>,
    cache: Option<Arc<GoalCache>>,
    manifest: ManifestLookup,
    jobs: usize,
}

impl Driver {
    /// Create a driver with no cache and no manifest lookup
    pub fn new(resolver: GoalResolver, grammar: Arc<dyn GrammarAttempt>) -> Self {
        Self {
            resolver,
            grammar,
            cache: None,
            manifest: ManifestLookup::disabled(),
            jobs: 0,
        }
    }

    /// Build a driver from configuration
    pub fn from_config(config: &Config, cache_dir: Option<&Path>) -> GoalResult<Self> {
        let resolver = GoalResolver::new(config.resolver.goal_order()?);
        debug!("Primary goal: {}", resolver.order().first());

        let grammar: Arc<dyn GrammarAttempt> = if config.resolver.parse_timeout_ms > 0 {
            let timed = TimeLimited::new(
                EcmaProbe,
                Duration::from_millis(config.resolver.parse_timeout_ms),
            );
            debug!("Parse attempts limited to {} ms", timed.limit().as_millis());
            Arc::new(timed)
        } else {
            Arc::new(EcmaProbe)
        };

        let mut driver = Self::new(resolver, grammar)
            .with_manifest(ManifestLookup::new(&config.manifest))
            .with_jobs(config.resolver.jobs);

        if config.cache.enabled {
            let dir = ConfigManager::cache_dir(config, cache_dir);
            debug!("Using goal cache at {}", dir.display());
            driver = driver.with_cache(Arc::new(GoalCache::new(dir)));
        }

        Ok(driver)
    }

    pub fn with_cache(mut self, cache: Arc<GoalCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn with_manifest(mut self, manifest: ManifestLookup) -> Self {
        self.manifest = manifest;
        self
    }

    /// Limit parallel resolutions in `resolve_all` (0 = available parallelism)
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Replace the resolver, e.g. to change the attempt order
    pub fn with_resolver(mut self, resolver: GoalResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Resolve a single file
    ///
    /// `forced` acts as a declared goal and takes precedence over the
    /// manifest.
    pub async fn resolve_path(&self, path: &Path, forced: Option<Goal>) -> GoalResult<Outcome> {
        let unit = SourceUnit::load(path).await?;

        let declared = match forced {
            Some(goal) => Some(goal),
            None => self.manifest.declared_goal(Path::new(&unit.key)).await?,
        };
        let (hint, cache_status) = self.cached_hint(&unit).await;

        let source = match (declared, hint) {
            (Some(goal), _) => GoalSource::Declared(goal),
            (None, Some(goal)) => GoalSource::Cached(goal),
            (None, None) => GoalSource::Ambiguous,
        };
        debug!(
            "Resolving {} ({}, cache {})",
            unit.key,
            source.kind(),
            cache_status
        );

        let resolver = self.resolver.clone();
        let grammar = Arc::clone(&self.grammar);
        let task_unit = unit.clone();
        let result = tokio::task::spawn_blocking(move || {
            resolver.resolve(grammar.as_ref(), &task_unit, source)
        })
        .await
        .map_err(|e| GoalError::Internal(format!("resolution task failed: {e}")))?;

        match result {
            Ok(resolution) => {
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache
                        .store(&unit.key, resolution.goal, unit.fingerprint.clone())
                        .await
                    {
                        warn!("Failed to cache goal for {}: {}", unit.key, e);
                    }
                }

                info!("{}: {}", unit.key, resolution.goal);
                Ok(Outcome {
                    key: unit.key,
                    goal: resolution.goal,
                    attempts: resolution.attempts,
                    source: resolution.source,
                    cache: cache_status,
                })
            }
            Err(e) => {
                if e.is_syntax() && matches!(cache_status, CacheStatus::Hit | CacheStatus::Stale)
                {
                    self.drop_record(&unit.key).await;
                }
                Err(e)
            }
        }
    }

    /// Resolve many files in parallel; results keep input order
    pub async fn resolve_all(
        self: &Arc<Self>,
        paths: Vec<PathBuf>,
        forced: Option<Goal>,
    ) -> Vec<(PathBuf, GoalResult<Outcome>)> {
        let jobs = if self.jobs == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.jobs
        };
        let semaphore = Arc::new(Semaphore::new(jobs));

        let mut set = JoinSet::new();
        for (index, path) in paths.iter().cloned().enumerate() {
            let driver = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (index, driver.resolve_path(&path, forced).await)
            });
        }

        let mut results: Vec<Option<GoalResult<Outcome>>> = paths.iter().map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => warn!("Resolution task failed: {}", e),
            }
        }

        paths
            .into_iter()
            .zip(results)
            .map(|(path, result)| {
                let result = result.unwrap_or_else(|| {
                    Err(GoalError::Internal(format!(
                        "resolution of {} did not complete",
                        path.display()
                    )))
                });
                (path, result)
            })
            .collect()
    }

    async fn cached_hint(&self, unit: &SourceUnit) -> (Option<Goal>, CacheStatus) {
        let Some(cache) = &self.cache else {
            return (None, CacheStatus::Disabled);
        };

        match cache.lookup(&unit.key).await {
            None => (None, CacheStatus::Miss),
            Some(record) if cache.validate(&record, &unit.fingerprint) => {
                debug!("Cache hit for {}: {}", unit.key, record.goal);
                (Some(record.goal), CacheStatus::Hit)
            }
            Some(record) => {
                debug!(
                    "Cache record for {} is stale ({} != {})",
                    unit.key, record.fingerprint, unit.fingerprint
                );
                (None, CacheStatus::Stale)
            }
        }
    }

    async fn drop_record(&self, key: &str) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.remove(key).await {
                warn!("Failed to drop cache record for {}: {}", key, e);
            }
        }
    }
}
