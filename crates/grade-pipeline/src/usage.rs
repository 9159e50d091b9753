//! Per-LUT usage counters.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Counts successful primary-LUT applications by lowercased file name.
///
/// Diagnostics only; nothing in the pipeline reads it back.
#[derive(Debug, Default)]
pub struct UsageHistory {
    counts: Mutex<HashMap<String, u64>>,
}

fn key_for(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| path.to_string_lossy().to_lowercase())
}

impl UsageHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one use of the LUT at `path`; returns the new count.
    pub fn record(&self, path: impl AsRef<Path>) -> u64 {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        let count = counts.entry(key_for(path.as_ref())).or_insert(0);
        *count += 1;
        *count
    }

    /// Uses recorded for a LUT file name or path.
    pub fn count(&self, name: impl AsRef<Path>) -> u64 {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        counts.get(&key_for(name.as_ref())).copied().unwrap_or(0)
    }

    /// Sum over all LUTs.
    pub fn total(&self) -> u64 {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        counts.values().sum()
    }

    /// Sorted copy of all counters.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        counts.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    /// Most used LUTs, highest count first, ties by name.
    pub fn top(&self, n: usize) -> Vec<(String, u64)> {
        let mut all: Vec<_> = self.snapshot().into_iter().collect();
        all.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        all.truncate(n);
        all
    }
}
