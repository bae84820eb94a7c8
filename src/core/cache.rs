use dashmap::DashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    pub rejected_count: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

/// Thread-safe cache of combined pair similarities, shared across scoring
/// workers and across detection calls.
///
/// Keys are order-independent over the two normalized texts, so
/// `(a, b)` and `(b, a)` hit the same entry. Concurrent writes of the same
/// key race benignly: pair scores are deterministic, so whichever write wins
/// stores the same value.
#[derive(Debug)]
pub struct PairCache {
    entries: DashMap<u64, f64>,
    max_entries: usize,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
    rejected_count: AtomicU64,
}

impl PairCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
            rejected_count: AtomicU64::new(0),
        }
    }

    /// Order-independent key for a pair of normalized texts
    pub fn pair_key(text1: &str, text2: &str) -> u64 {
        let (lo, hi) = if text1 <= text2 {
            (text1, text2)
        } else {
            (text2, text1)
        };
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        lo.hash(&mut hasher);
        hi.hash(&mut hasher);
        hasher.finish()
    }

    pub fn get(&self, key: u64) -> Option<f64> {
        match self.entries.get(&key) {
            Some(entry) => {
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                Some(*entry)
            }
            None => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert a pair score. Once the entry bound is reached new keys are
    /// dropped; recomputing a dropped pair is idempotent.
    pub fn insert(&self, key: u64, score: f64) {
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            self.rejected_count.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.entries.insert(key, score);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            rejected_count: self.rejected_count.load(Ordering::Relaxed),
        }
    }
}
