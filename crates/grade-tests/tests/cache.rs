//! Bounded LRU behaviour of the parsed-LUT cache.

use std::path::PathBuf;
use std::sync::Arc;

use grade_lut::LutCache;
use grade_tests::*;

fn forty_luts(ws: &Workspace) -> Vec<PathBuf> {
    (0..40)
        .map(|i| ws.add_lut(&format!("lut_{i:02}.cube"), &identity_lut(2)))
        .collect()
}

#[test]
fn never_exceeds_capacity() {
    let ws = Workspace::new();
    let paths = forty_luts(&ws);
    let cache = LutCache::new(32);

    for path in &paths {
        cache.get_or_load(path).unwrap();
        assert!(cache.len() <= 32);
    }
    assert_eq!(cache.len(), 32);
    assert_eq!(cache.stats().evictions, 8);
}

#[test]
fn thirty_third_load_evicts_least_recent() {
    let ws = Workspace::new();
    let paths = forty_luts(&ws);
    let cache = LutCache::new(32);

    for path in &paths[..32] {
        cache.get_or_load(path).unwrap();
    }
    // Touch the first entry so the second becomes least recently used.
    cache.get_or_load(&paths[0]).unwrap();
    assert_eq!(cache.stats().hits, 1);

    cache.get_or_load(&paths[32]).unwrap();
    assert!(cache.contains(&paths[0]));
    assert!(!cache.contains(&paths[1]));

    let misses = cache.stats().misses;
    cache.get_or_load(&paths[1]).unwrap();
    assert_eq!(cache.stats().misses, misses + 1, "evicted path must be parsed again");
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn hit_returns_same_object() {
    let ws = Workspace::new();
    let path = ws.add_lut("warm.cube", &warm_lut(9));
    let cache = LutCache::new(4);

    let first = cache.get_or_load(&path).unwrap();
    let second = cache.get_or_load(&path).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.apply([0.3, 0.6, 0.9]), second.apply([0.3, 0.6, 0.9]));
}

#[test]
fn parse_failure_is_not_cached() {
    let ws = Workspace::new();
    let path = ws.add_raw_lut("bad.cube", "LUT_3D_SIZE 3\n0 0 0\n");
    let cache = LutCache::new(4);

    assert!(cache.get_or_load(&path).unwrap_err().is_corrupt());
    assert!(cache.is_empty());
    assert!(cache.get_or_load(&path).is_err());
    assert_eq!(cache.stats().misses, 2);
}

#[test]
fn concurrent_readers_share_entries() {
    let ws = Workspace::new();
    let paths = forty_luts(&ws);
    let cache = LutCache::new(8);

    std::thread::scope(|s| {
        for t in 0..4 {
            let cache = &cache;
            let paths = &paths;
            s.spawn(move || {
                for i in 0..200 {
                    let path = &paths[(i * 7 + t) % 12];
                    let lut = cache.get_or_load(path).unwrap();
                    assert_eq!(lut.size, 2);
                }
            });
        }
    });
    assert!(cache.len() <= 8);
}
