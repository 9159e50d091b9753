//! Bounded cache of parsed LUTs with LRU eviction.
//!
//! Parsing a .cube file is the most expensive per-request step and the
//! same few LUTs are requested again and again, so parsed tables are kept
//! behind `Arc`s keyed by absolute path.
//!
//! Hits take the shared lock only: recency is an atomic stamp drawn from
//! a monotonic clock. Misses parse outside any lock and then take the
//! exclusive lock to insert, evicting the entry with the oldest stamp.
//! Two threads missing on the same key may both parse; the second insert
//! finds the key present and keeps the first copy.
//!
//! ```rust,ignore
//! use grade_lut::LutCache;
//!
//! let cache = LutCache::new(32);
//! let lut = cache.get_or_load("luts/warm.cube")?;
//! assert_eq!(cache.stats().misses, 1);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, trace};

use crate::{Interpolation, Lut3D, LutResult, cube};

/// Default number of parsed LUTs kept resident.
pub const DEFAULT_CAPACITY: usize = 32;

struct CacheEntry {
    lut: Arc<Lut3D>,
    last_used: AtomicU64,
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from memory.
    pub hits: u64,
    /// Lookups that parsed the file.
    pub misses: u64,
    /// Entries dropped to respect the capacity.
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate as percentage.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Thread-safe LRU cache of parsed LUTs.
pub struct LutCache {
    capacity: usize,
    interpolation: Interpolation,
    entries: RwLock<HashMap<PathBuf, CacheEntry>>,
    clock: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl LutCache {
    /// Creates a cache holding at most `capacity` LUTs (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            interpolation: Interpolation::default(),
            entries: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Interpolation assigned to every LUT parsed by this cache.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Maximum number of resident LUTs.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resident LUTs.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `path` is resident. Does not touch recency.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        let key = cache_key(path.as_ref());
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key)
    }

    /// Snapshot of hit/miss/eviction counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Drops every entry. Counters are kept.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Returns the parsed LUT for `path`, parsing the .cube file on a miss.
    pub fn get_or_load(&self, path: impl AsRef<Path>) -> LutResult<Arc<Lut3D>> {
        let interpolation = self.interpolation;
        self.get_or_load_with(path, |p| {
            cube::read_3d(p).map(|lut| lut.with_interpolation(interpolation))
        })
    }

    /// Like [`get_or_load`](Self::get_or_load) with a custom loader.
    pub fn get_or_load_with<F>(&self, path: impl AsRef<Path>, load: F) -> LutResult<Arc<Lut3D>>
    where
        F: FnOnce(&Path) -> LutResult<Lut3D>,
    {
        let path = path.as_ref();
        let key = cache_key(path);

        if let Some(lut) = self.lookup(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(path = %key.display(), "LUT cache hit");
            return Ok(lut);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(path = %key.display(), "LUT cache miss, parsing");
        let lut = Arc::new(load(path)?);
        Ok(self.insert(key, lut))
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn lookup(&self, key: &Path) -> Option<Arc<Lut3D>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).map(|entry| {
            entry.last_used.store(self.tick(), Ordering::Relaxed);
            Arc::clone(&entry.lut)
        })
    }

    fn insert(&self, key: PathBuf, lut: Arc<Lut3D>) -> Arc<Lut3D> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        // Another thread won the race for this key.
        if let Some(entry) = entries.get(&key) {
            entry.last_used.store(self.tick(), Ordering::Relaxed);
            return Arc::clone(&entry.lut);
        }

        while entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.last_used.load(Ordering::Relaxed))
                .map(|(k, _)| k.clone());
            let Some(oldest) = oldest else { break };
            entries.remove(&oldest);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(path = %oldest.display(), "evicted LUT");
        }

        entries.insert(
            key,
            CacheEntry {
                lut: Arc::clone(&lut),
                last_used: AtomicU64::new(self.tick()),
            },
        );
        lut
    }
}

impl Default for LutCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for LutCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LutCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}

fn cache_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
