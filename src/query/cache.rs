//! Query cache
//!
//! Remembers the selection of recent criteria so repeated selects skip the
//! index fold. The owner clears it on every mutation.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

use lru::LruCache;
use parking_lot::Mutex;

use super::{Criteria, Selection};

/// LRU cache from criteria to selection
pub struct QueryCache {
    /// None when caching is disabled (capacity 0)
    cache: Option<Mutex<LruCache<Criteria, Selection>>>,
    hit_count: AtomicUsize,
    miss_count: AtomicUsize,
}

/// Cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hit_count: usize,
    pub miss_count: usize,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

impl QueryCache {
    /// Create a cache holding up to `capacity` selections
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            hit_count: AtomicUsize::new(0),
            miss_count: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, criteria: &Criteria) -> Option<Selection> {
        let cache = self.cache.as_ref()?;
        match cache.lock().get(criteria) {
            Some(selection) => {
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                Some(selection.clone())
            }
            None => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn put(&self, criteria: Criteria, selection: Selection) {
        if let Some(cache) = &self.cache {
            cache.lock().put(criteria, selection);
        }
    }

    /// Forget every cached selection
    pub fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        let (size, capacity) = match &self.cache {
            Some(cache) => {
                let cache = cache.lock();
                (cache.len(), cache.cap().get())
            }
            None => (0, 0),
        };
        CacheStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            size,
            capacity,
        }
    }
}
