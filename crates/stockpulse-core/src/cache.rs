//! On-disk cache of the discovered instrument universe.
//!
//! The cache is advisory: a missing, stale, undersized or corrupt file is
//! discarded and reported as a miss so the caller can rediscover.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::fetcher::QuoteFetcher;
use crate::universe::{CodeSource, Universe, UniverseEntry};
use crate::CacheError;

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_MIN_ENTRIES: usize = 1_000;
pub const CACHE_FILE_NAME: &str = "universe.json";

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    saved_at: String,
    entries: Vec<UniverseEntry>,
}

/// File-backed universe cache with a freshness window and a size guard.
#[derive(Debug, Clone)]
pub struct UniverseCache {
    path: PathBuf,
    ttl: Duration,
    min_entries: usize,
}

impl UniverseCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: DEFAULT_TTL,
            min_entries: DEFAULT_MIN_ENTRIES,
        }
    }

    /// Cache stored as `universe.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(CACHE_FILE_NAME))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_min_entries(mut self, min_entries: usize) -> Self {
        self.min_entries = min_entries;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    /// Save `universe` only when it meets the minimum size.
    ///
    /// Returns whether the file was written; an existing cache is left as is
    /// when the universe is too small.
    pub fn save_if_complete(&self, universe: &Universe) -> Result<bool, CacheError> {
        if universe.len() < self.min_entries {
            tracing::warn!(
                entries = universe.len(),
                min = self.min_entries,
                "universe below minimum size; not caching"
            );
            return Ok(false);
        }
        self.save(universe)?;
        Ok(true)
    }

    /// Load a fresh universe, or `Ok(None)` when there is nothing usable.
    pub fn load(&self) -> Result<Option<Universe>, CacheError> {
        self.load_at(OffsetDateTime::now_utc())
    }

    pub fn load_at(&self, now: OffsetDateTime) -> Result<Option<Universe>, CacheError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        let file: CacheFile = match serde_json::from_str(&raw) {
            Ok(file) => file,
            Err(error) => {
                tracing::info!(path = %self.path.display(), %error, "discarding unreadable universe cache");
                return Ok(None);
            }
        };

        let Ok(saved_at) = OffsetDateTime::parse(&file.saved_at, &Rfc3339) else {
            tracing::info!(path = %self.path.display(), saved_at = %file.saved_at, "discarding universe cache with bad timestamp");
            return Ok(None);
        };

        let age = now - saved_at;
        if age.is_negative() || age > self.ttl {
            tracing::info!(path = %self.path.display(), age_secs = age.whole_seconds(), "discarding stale universe cache");
            return Ok(None);
        }

        if file.entries.len() < self.min_entries {
            tracing::info!(
                path = %self.path.display(),
                entries = file.entries.len(),
                min = self.min_entries,
                "discarding undersized universe cache"
            );
            return Ok(None);
        }

        Ok(Some(Universe::new(file.entries)))
    }

    /// Write `universe` atomically (temp file + rename).
    pub fn save(&self, universe: &Universe) -> Result<(), CacheError> {
        self.save_at(universe, OffsetDateTime::now_utc())
    }

    pub fn save_at(&self, universe: &Universe, now: OffsetDateTime) -> Result<(), CacheError> {
        let saved_at = now
            .format(&Rfc3339)
            .map_err(|error| CacheError::Timestamp(error.to_string()))?;
        let file = CacheFile {
            saved_at,
            entries: universe.entries().to_vec(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(&file)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Remove the cache file if present.
    pub fn clear(&self) -> Result<(), CacheError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

/// Cached universe when usable, otherwise a fresh discovery that is written back.
///
/// Cache read/write failures are logged; discovery still proceeds.
pub async fn load_or_discover(
    cache: &UniverseCache,
    fetcher: &QuoteFetcher,
    sources: &[CodeSource],
) -> Universe {
    match cache.load() {
        Ok(Some(universe)) => return universe,
        Ok(None) => {}
        Err(error) => {
            tracing::warn!(path = %cache.path().display(), %error, "universe cache unreadable");
        }
    }

    let universe = fetcher.discover_universe(sources).await;
    if let Err(error) = cache.save_if_complete(&universe) {
        tracing::warn!(path = %cache.path().display(), %error, "failed to persist universe cache");
    }
    universe
}
