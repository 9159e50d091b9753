//! Approximate name matching.
//!
//! Similarity is the gestalt (Ratcliff/Obershelp) ratio: twice the number
//! of characters in recursively found longest common blocks, divided by
//! the total length of both strings. 1.0 means identical, 0.0 nothing in
//! common.

/// Default acceptance floor for fuzzy resolution.
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// Similarity ratio between two strings in [0, 1].
///
/// ```rust
/// use grade_lut::fuzzy::similarity;
///
/// assert_eq!(similarity("abcd", "abcd"), 1.0);
/// assert_eq!(similarity("abcd", "wxyz"), 0.0);
/// assert!((similarity("abcd", "bcde") - 0.75).abs() < 1e-9);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_chars(&a, &b) as f64 / total as f64
}

/// Best candidate scoring at least `cutoff`, with its score.
///
/// Equal scores go to the lexicographically largest candidate, so the
/// answer does not depend on iteration order (hash-map keys included).
pub fn best_match<'a, I>(query: &str, candidates: I, cutoff: f64) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, f64)> = None;
    for candidate in candidates {
        let score = similarity(query, candidate);
        if score < cutoff {
            continue;
        }
        if best.is_none_or(|(name, s)| score > s || (score == s && candidate > name)) {
            best = Some((candidate, score));
        }
    }
    best
}

/// Total length of the matching blocks between `a` and `b`.
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }

    total
}

/// Longest common block in `a[alo..ahi]` x `b[blo..bhi]`.
///
/// Returns `(i, j, len)`; on ties the block starting earliest in `a`
/// (then in `b`) wins.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // run[j + 1] = length of the match ending at a[i-1], b[j]
    let mut run = vec![0usize; bhi - blo + 1];

    for i in alo..ahi {
        let mut next = vec![0usize; bhi - blo + 1];
        for j in blo..bhi {
            if a[i] != b[j] {
                continue;
            }
            let k = run[j - blo] + 1;
            next[j - blo + 1] = k;
            if k > best_k {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_k = k;
            }
        }
        run = next;
    }

    (best_i, best_j, best_k)
}
