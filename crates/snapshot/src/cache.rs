// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracked memoization (spec §4.3): a bounded LRU cache that registers
//! itself in a registry the supervisor owns, so every cache can be
//! flushed together between attempts and before validators run.
//!
//! The registry is an explicit object held by the supervisor, not
//! module-global state — `CacheRegistry::new` has no hidden process-wide
//! singleton behind it.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{Arc, Mutex};

/// A bounded least-recently-used cache.
pub struct TrackedCache<K, V> {
    capacity: usize,
    entries: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K: Eq + Hash + Clone, V> TrackedCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn get_or_insert_with(&mut self, key: K, f: impl FnOnce() -> V) -> &V {
        if self.entries.contains_key(&key) {
            self.touch(&key);
        } else {
            if self.entries.len() >= self.capacity {
                if let Some(oldest) = self.order.pop_front() {
                    self.entries.remove(&oldest);
                }
            }
            self.entries.insert(key.clone(), f());
            self.order.push_back(key.clone());
        }
        // Present unconditionally: inserted above on the miss path, found
        // on the hit path.
        self.entries.get(&key).unwrap_or_else(|| unreachable!("key was just inserted"))
    }

    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Anything a [`CacheRegistry`] can flush without knowing its key/value
/// types.
pub trait Flushable: Send + Sync {
    fn clear(&self);
    fn len(&self) -> usize;
}

/// A [`TrackedCache`] shared between its owner (a handler or job) and the
/// registry that flushes it, via `Arc<Mutex<_>>` rather than process-wide
/// `static` state.
pub struct SharedCache<K, V> {
    inner: Arc<Mutex<TrackedCache<K, V>>>,
}

impl<K, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> SharedCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TrackedCache::new(capacity))),
        }
    }

    pub fn get_or_insert_with(&self, key: K, f: impl FnOnce() -> V) -> V {
        let mut cache = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.get_or_insert_with(key, f).clone()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .map(|c| c.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash + Clone + Send, V: Clone + Send> Flushable for SharedCache<K, V> {
    fn clear(&self) {
        let mut cache = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.clear();
    }

    fn len(&self) -> usize {
        SharedCache::len(self)
    }
}

/// Process-wide-in-spirit, but owned-by-the-supervisor-in-practice
/// registry of every `SharedCache` that needs flushing together.
#[derive(Default)]
pub struct CacheRegistry {
    caches: Vec<Box<dyn Flushable>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, cache: impl Flushable + 'static) {
        self.caches.push(Box::new(cache));
    }

    /// Empties every registered cache. O(n) in registered caches (spec §9).
    pub fn clear_all(&self) {
        for cache in &self.caches {
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
