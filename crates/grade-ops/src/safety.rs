//! Name-based LUT safety filter.
//!
//! LUTs built for log or camera-gamut footage blow out contrast on an
//! already graded photo. For [`ImageClass::Standard`] sources every
//! candidate whose name mentions such a profile is dropped; log sources
//! accept everything. Names are compared after lowercasing and removing
//! separators, so `F-Log`, `f_log` and `FLog` all match `flog`.

use tracing::debug;

use crate::analyze::ImageClass;

/// Substrings marking a LUT as log/raw/camera-gamut only.
pub const LOG_KEYWORDS: &[&str] = &[
    "flog",
    "slog",
    "vlog",
    "clog",
    "log2",
    "log3",
    "gamut",
    "hlg",
    "cinema",
    "eterna-bb",
    "f-gamut",
    "blackmagic",
    "arri",
];

/// Name tokens that mark a LUT as expecting flat input.
pub const FLAT_INPUT_MARKERS: &[&str] = &["log", "logc", "raw", "flat"];

/// Lowercases and strips `-`, `_`, spaces and dots.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' ' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// First denylisted keyword found in `name`, if any.
pub fn log_keyword(name: &str) -> Option<&'static str> {
    let normalized = normalize_name(name);
    LOG_KEYWORDS
        .iter()
        .copied()
        .find(|k| normalized.contains(&normalize_name(k)))
}

/// Whether `name` may be applied to an image of class `class`.
pub fn is_safe(name: &str, class: ImageClass) -> bool {
    match class {
        ImageClass::Log => true,
        ImageClass::Standard => log_keyword(name).is_none(),
    }
}

/// Candidates that are safe for `class`, in input order.
///
/// Never modifies `candidates`; may return an empty list.
pub fn filter<S: AsRef<str> + Clone>(candidates: &[S], class: ImageClass) -> Vec<S> {
    partition(candidates, class).0
}

/// Splits candidates into `(safe, rejected)`, both in input order.
pub fn partition<S: AsRef<str> + Clone>(candidates: &[S], class: ImageClass) -> (Vec<S>, Vec<S>) {
    if class == ImageClass::Log {
        return (candidates.to_vec(), Vec::new());
    }
    let (safe, rejected): (Vec<S>, Vec<S>) = candidates
        .iter()
        .cloned()
        .partition(|c| is_safe(c.as_ref(), class));
    if !rejected.is_empty() {
        debug!(kept = safe.len(), rejected = rejected.len(), "safety filter");
    }
    (safe, rejected)
}

/// True for LUT names that expect flat input.
///
/// The name is split on non-alphanumeric characters and each token is
/// matched whole, ignoring trailing digits: `log`, `logc`, `raw`, `flat`,
/// or a one-letter vendor prefix plus `log` (`FLog`, `S-Log3` as `log3`).
/// `Analog` or `Straw` do not match.
pub fn requires_log_simulation(name: &str) -> bool {
    name.split(|c: char| !c.is_alphanumeric()).any(|token| {
        let token = token.to_lowercase();
        let stem = token.trim_end_matches(|c: char| c.is_ascii_digit());
        FLAT_INPUT_MARKERS.contains(&stem) || (stem.len() == 4 && stem.ends_with("log"))
    })
}
