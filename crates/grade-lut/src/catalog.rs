//! Filename index over a directory tree of LUT files.
//!
//! The catalog maps a lowercased file name to every path carrying that
//! name. It is built once by walking a root directory and stays
//! immutable until [`LutCatalog::build_index`] is called again.
//!
//! # Example
//!
//! ```rust,ignore
//! use grade_lut::LutCatalog;
//!
//! let catalog = LutCatalog::open("luts");
//! let hit = catalog.resolve("Kodak_Portra.cube")?;
//! println!("{} via {:?}", hit.path.display(), hit.matched);
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::cube;
use crate::fuzzy;
use crate::{LutError, LutResult};

/// How a name was turned into a path.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchKind {
    /// The argument was an existing file and was used as-is.
    Path,
    /// Case-insensitive exact file name match.
    Exact,
    /// Approximate match against an indexed key.
    Fuzzy {
        /// Indexed key that was chosen.
        key: String,
        /// Similarity score in [cutoff, 1].
        score: f64,
    },
}

/// Outcome of [`LutCatalog::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLut {
    /// Filesystem path of the LUT file.
    pub path: PathBuf,
    /// Resolution route.
    pub matched: MatchKind,
}

/// Index of LUT files keyed by lowercased file name.
#[derive(Debug, Clone)]
pub struct LutCatalog {
    root: PathBuf,
    extension: String,
    cutoff: f64,
    index: BTreeMap<String, Vec<PathBuf>>,
}

impl LutCatalog {
    /// Creates an empty catalog for `root`; call [`build_index`](Self::build_index) to fill it.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: cube::EXTENSION.to_string(),
            cutoff: fuzzy::DEFAULT_CUTOFF,
            index: BTreeMap::new(),
        }
    }

    /// Creates a catalog and indexes `root` immediately.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let mut catalog = Self::new(root);
        catalog.build_index();
        catalog
    }

    /// Overrides the recognized file extension (without the dot).
    pub fn with_extension(mut self, ext: &str) -> Self {
        self.extension = ext.trim_start_matches('.').to_ascii_lowercase();
        self
    }

    /// Overrides the fuzzy acceptance floor.
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fuzzy acceptance floor.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Rebuilds the index from scratch by walking the root recursively.
    ///
    /// A missing root leaves the catalog empty and logs a warning.
    /// Returns the number of files indexed.
    pub fn build_index(&mut self) -> usize {
        self.index.clear();

        if !self.root.is_dir() {
            warn!(root = %self.root.display(), "LUT directory does not exist");
            return 0;
        }

        info!(root = %self.root.display(), "Indexing LUT directory");
        let mut count = 0;
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    None
                }
            });

        for entry in walker {
            if !entry.file_type().is_file() || !self.has_lut_extension(entry.path()) {
                continue;
            }
            let key = entry.file_name().to_string_lossy().to_lowercase();
            self.index.entry(key).or_default().push(entry.into_path());
            count += 1;
        }

        info!(files = count, names = self.index.len(), "LUT index built");
        count
    }

    fn has_lut_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }

    /// Resolves a LUT name or path to a file.
    ///
    /// Order: existing path as-is, exact lowercased file name, then the
    /// best fuzzy match scoring at least the cutoff.
    pub fn resolve(&self, name_or_path: &str) -> LutResult<ResolvedLut> {
        let as_path = Path::new(name_or_path);
        if as_path.is_file() {
            return Ok(ResolvedLut {
                path: as_path.to_path_buf(),
                matched: MatchKind::Path,
            });
        }

        let lookup = as_path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| name_or_path.trim().to_lowercase());

        if let Some(path) = self.index.get(&lookup).and_then(|paths| paths.first()) {
            debug!(name = %lookup, path = %path.display(), "exact LUT match");
            return Ok(ResolvedLut {
                path: path.clone(),
                matched: MatchKind::Exact,
            });
        }

        let hit = fuzzy::best_match(&lookup, self.index.keys().map(String::as_str), self.cutoff);
        match hit {
            Some((key, score)) => {
                let path = self.index[key][0].clone();
                warn!(requested = %name_or_path, matched = %key, score, "fuzzy LUT match");
                Ok(ResolvedLut {
                    path,
                    matched: MatchKind::Fuzzy {
                        key: key.to_string(),
                        score,
                    },
                })
            }
            None => Err(LutError::NotFound(name_or_path.to_string())),
        }
    }

    /// All indexed (lowercased) file names, sorted.
    pub fn list_names(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }

    /// Every indexed path, grouped by name in sorted order.
    pub fn list_paths(&self) -> Vec<PathBuf> {
        self.index.values().flatten().cloned().collect()
    }

    /// Paths registered under a name, first-indexed first.
    pub fn paths_for(&self, name: &str) -> &[PathBuf] {
        self.index
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
