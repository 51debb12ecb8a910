//! Source resolver
//!
//! Turns declared sources into read-only snapshots. Remote sources are
//! fetched in parallel (rayon) into the snapshot cache; results keep the
//! declared order and nothing downstream starts until every source resolved.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;

use crate::domain::entities::{Source, SourceKind, SourceSnapshot};
use crate::domain::ports::source_fetcher::SourceFetcher;
use crate::domain::value_objects::RefreshPolicy;
use crate::error::{RuleforgeError, RuleforgeResult, Warning, WarningKind};
use crate::infrastructure::fs::expand_home;
use crate::infrastructure::repositories::{cache_key, load_manifest, SnapshotCache};

/// Snapshots in declared order plus the warnings resolution produced
#[derive(Debug, Default)]
pub struct ResolvedSources {
    pub snapshots: Vec<SourceSnapshot>,
    pub warnings: Vec<Warning>,
}

pub struct SourceResolver<F> {
    project_root: PathBuf,
    cache_dir: PathBuf,
    refresh: RefreshPolicy,
    stale_after: Duration,
    fetcher: F,
}

/// Per-source outcome of the parallel phase
struct Resolved {
    snapshot: SourceSnapshot,
    /// Cache key to pin when this run fetched the snapshot
    fetched_key: Option<String>,
    warnings: Vec<Warning>,
}

impl<F: SourceFetcher> SourceResolver<F> {
    pub fn new(project_root: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>, fetcher: F) -> Self {
        Self {
            project_root: project_root.into(),
            cache_dir: cache_dir.into(),
            refresh: RefreshPolicy::default(),
            stale_after: Duration::hours(24),
            fetcher,
        }
    }

    pub fn with_refresh(mut self, refresh: RefreshPolicy, stale_after_hours: u64) -> Self {
        self.refresh = refresh;
        // Clamped to keep the duration representable
        self.stale_after = Duration::hours(stale_after_hours.min(1_000_000) as i64);
        self
    }

    pub fn resolve(&self, sources: &[Source], now: DateTime<Utc>) -> RuleforgeResult<ResolvedSources> {
        let has_remote = sources.iter().any(|s| s.kind == SourceKind::Remote);
        let mut cache = has_remote.then(|| SnapshotCache::open(&self.cache_dir));

        let results: Vec<RuleforgeResult<Resolved>> = sources
            .par_iter()
            .map(|source| match source.kind {
                SourceKind::Local => self.resolve_local(source),
                SourceKind::Remote => match &cache {
                    Some(cache) => self.resolve_remote(source, cache, now),
                    None => Err(RuleforgeError::source(source.display_name(), "snapshot cache unavailable")),
                },
            })
            .collect();

        let mut resolved = ResolvedSources::default();
        let mut first_error = None;
        let mut pinned = false;

        for result in results {
            match result {
                Ok(r) => {
                    if let (Some(key), Some(cache)) = (&r.fetched_key, cache.as_mut()) {
                        cache.record(key, r.snapshot.fetched_at().unwrap_or(now));
                        pinned = true;
                    }
                    resolved.warnings.extend(r.warnings);
                    resolved.snapshots.push(r.snapshot);
                }
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        // Pin whatever was fetched, even when another source failed
        if let (true, Some(cache)) = (pinned, &cache) {
            if let Err(e) = cache.save() {
                log::warn!("{}", e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(resolved),
        }
    }

    fn resolve_local(&self, source: &Source) -> RuleforgeResult<Resolved> {
        let expanded = expand_home(Path::new(&source.locator));
        let root = if expanded.is_absolute() {
            expanded
        } else {
            self.project_root.join(expanded)
        };

        if !root.is_dir() {
            return Err(RuleforgeError::source(
                source.display_name(),
                format!("{} is not a directory", root.display()),
            ));
        }
        log::info!("using local source {}", root.display());

        let (snapshot, warnings) = snapshot_at(source, &root)?;
        Ok(Resolved {
            snapshot,
            fetched_key: None,
            warnings,
        })
    }

    fn resolve_remote(
        &self,
        source: &Source,
        cache: &SnapshotCache,
        now: DateTime<Utc>,
    ) -> RuleforgeResult<Resolved> {
        let name = source.display_name();
        let key = cache_key(&source.locator, source.git_ref.as_deref());
        let cached = cache.lookup(&key);

        let needs_fetch = match self.refresh {
            RefreshPolicy::Always => true,
            RefreshPolicy::Never => false,
            RefreshPolicy::Stale => cached.map_or(true, |c| now - c.fetched_at >= self.stale_after),
        };

        let mut warnings = Vec::new();
        let (root, fetched_at, fetched_key) = if needs_fetch {
            log::info!("fetching {}", source.locator);
            match self.fetch_into_cache(source, &key, cache) {
                Ok(root) => (root, now, Some(key)),
                Err(e) => match cached {
                    // A forced refresh must not silently run on old content
                    Some(c) if self.refresh != RefreshPolicy::Always => {
                        log::warn!("fetch of {} failed, using cached snapshot: {}", name, e);
                        warnings.push(Warning::new(
                            WarningKind::StaleSource,
                            &source.locator,
                            format!("fetch failed, using snapshot from {}: {}", c.fetched_at, e),
                        ));
                        (c.path.clone(), c.fetched_at, None)
                    }
                    _ => return Err(e),
                },
            }
        } else {
            match cached {
                Some(c) => {
                    log::info!("using cached snapshot of {} from {}", name, c.fetched_at);
                    (c.path.clone(), c.fetched_at, None)
                }
                None => {
                    return Err(RuleforgeError::source(
                        name,
                        "not in the snapshot cache and refresh is 'never'",
                    ))
                }
            }
        };

        let (snapshot, manifest_warnings) = snapshot_at(source, &root)?;
        warnings.extend(manifest_warnings);
        Ok(Resolved {
            snapshot: snapshot.with_fetched_at(fetched_at),
            fetched_key,
            warnings,
        })
    }

    /// Clone into a scratch sibling, then rename into the snapshot slot
    fn fetch_into_cache(&self, source: &Source, key: &str, cache: &SnapshotCache) -> RuleforgeResult<PathBuf> {
        let name = source.display_name();
        let scratch = cache.scratch_dir().map_err(|e| RuleforgeError::source(name, e))?;
        let clone_dir = scratch.path().join("clone");

        self.fetcher
            .fetch(&source.locator, source.git_ref.as_deref(), &clone_dir)
            .map_err(|e| RuleforgeError::source(name, e))?;

        cache
            .install(key, &clone_dir)
            .map_err(|e| RuleforgeError::source(name, e))
    }
}

fn snapshot_at(source: &Source, root: &Path) -> RuleforgeResult<(SourceSnapshot, Vec<Warning>)> {
    let (manifest, warnings) =
        load_manifest(root).map_err(|e| RuleforgeError::source(source.display_name(), e))?;
    Ok((SourceSnapshot::new(source.clone(), root, manifest), warnings))
}
