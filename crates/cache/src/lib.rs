//! # Cache
//!
//! A fixed-capacity value cache with a pluggable eviction policy, used by the
//! engine as a read-path shortcut in front of the memtable and on-disk
//! levels.
//!
//! This mirrors the reference implementation's `caches::FixedSizeCache<Key,
//! Value, Policy>` template, made a runtime choice between policies (a
//! [`CachePolicy`] trait object) instead of a compile-time template
//! parameter, since Rust generics would otherwise force the engine to pick
//! one policy at compile time.
//!
//! ## Example
//! ```rust
//! use cache::{FixedSizeCache, LruPolicy};
//!
//! let mut cache = FixedSizeCache::new(2, Box::new(LruPolicy::new())).unwrap();
//! cache.put(1, b"a".to_vec());
//! cache.put(2, b"b".to_vec());
//! let _ = cache.get(&1); // touches 1, making 2 the eviction candidate
//! cache.put(3, b"c".to_vec()); // evicts 2
//! assert!(cache.cached(&1));
//! assert!(!cache.cached(&2));
//! assert!(cache.cached(&3));
//! ```

use std::collections::{HashMap, VecDeque};
use thiserror::Error;

/// Errors raised synchronously by [`FixedSizeCache`] construction and
/// lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    /// Raised by [`FixedSizeCache::new`] when constructed with capacity 0.
    #[error("cache capacity must be greater than 0")]
    InvalidCapacity,
    /// Raised by [`FixedSizeCache::get`] when the key is not cached.
    #[error("key not found in cache")]
    NotFound,
}

/// Capability interface implemented by each eviction policy.
///
/// A policy tracks only *which key to evict next* — it never stores values;
/// [`FixedSizeCache`] owns the key-value map and calls into the policy on
/// every insert/touch/erase.
pub trait CachePolicy<K> {
    /// Records that `key` was just inserted.
    fn insert(&mut self, key: K);
    /// Records that `key` was just accessed (hit on `get` or overwritten by
    /// `put`).
    fn touch(&mut self, key: &K);
    /// Removes all bookkeeping for `key` (on explicit remove or eviction).
    fn erase(&mut self, key: &K);
    /// Returns the key the policy would evict next, if any are tracked.
    fn repl_candidate(&self) -> Option<K>;
}

/// Evicts the oldest **inserted** entry, ignoring touches.
#[derive(Debug, Default)]
pub struct FifoPolicy<K> {
    queue: VecDeque<K>,
}

impl<K> FifoPolicy<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<K: Clone + PartialEq> CachePolicy<K> for FifoPolicy<K> {
    fn insert(&mut self, key: K) {
        self.queue.push_back(key);
    }

    fn touch(&mut self, _key: &K) {}

    fn erase(&mut self, key: &K) {
        if let Some(pos) = self.queue.iter().position(|k| k == key) {
            self.queue.remove(pos);
        }
    }

    fn repl_candidate(&self) -> Option<K> {
        self.queue.front().cloned()
    }
}

/// Evicts the least-recently-touched entry. Both inserts and successful
/// `get`/overwrite touches move a key to the most-recently-used end.
#[derive(Debug, Default)]
pub struct LruPolicy<K> {
    /// Most-recently-used at the back, least-recently-used at the front.
    order: VecDeque<K>,
}

impl<K> LruPolicy<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }
}

impl<K: Clone + PartialEq> CachePolicy<K> for LruPolicy<K> {
    fn insert(&mut self, key: K) {
        self.order.push_back(key);
    }

    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            let k = self.order.remove(pos).unwrap();
            self.order.push_back(k);
        }
    }

    fn erase(&mut self, key: &K) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
    }

    fn repl_candidate(&self) -> Option<K> {
        self.order.front().cloned()
    }
}

/// Evicts the least-frequently-touched entry. Ties broken by insertion
/// order (the first key to reach the minimum count is returned).
#[derive(Debug, Default)]
pub struct LfuPolicy<K> {
    counts: Vec<(K, u64)>,
}

impl<K> LfuPolicy<K> {
    #[must_use]
    pub fn new() -> Self {
        Self { counts: Vec::new() }
    }
}

impl<K: Clone + PartialEq> CachePolicy<K> for LfuPolicy<K> {
    fn insert(&mut self, key: K) {
        self.counts.push((key, 1));
    }

    fn touch(&mut self, key: &K) {
        if let Some(entry) = self.counts.iter_mut().find(|(k, _)| k == key) {
            entry.1 += 1;
        }
    }

    fn erase(&mut self, key: &K) {
        if let Some(pos) = self.counts.iter().position(|(k, _)| k == key) {
            self.counts.remove(pos);
        }
    }

    fn repl_candidate(&self) -> Option<K> {
        self.counts
            .iter()
            .min_by_key(|(_, count)| *count)
            .map(|(k, _)| k.clone())
    }
}

/// Tracks insertion order only; never evicts proactively. `repl_candidate`
/// returns the oldest tracked key so `FixedSizeCache` still has *something*
/// to evict if capacity is exceeded, but no touch-based reordering happens.
#[derive(Debug, Default)]
pub struct NoOpPolicy<K> {
    keys: Vec<K>,
}

impl<K> NoOpPolicy<K> {
    #[must_use]
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }
}

impl<K: Clone + PartialEq> CachePolicy<K> for NoOpPolicy<K> {
    fn insert(&mut self, key: K) {
        self.keys.push(key);
    }

    fn touch(&mut self, _key: &K) {}

    fn erase(&mut self, key: &K) {
        if let Some(pos) = self.keys.iter().position(|k| k == key) {
            self.keys.remove(pos);
        }
    }

    fn repl_candidate(&self) -> Option<K> {
        self.keys.first().cloned()
    }
}

/// A fixed-capacity mapping from key to value, with eviction delegated to a
/// pluggable [`CachePolicy`].
pub struct FixedSizeCache<K> {
    map: HashMap<K, Vec<u8>>,
    policy: Box<dyn CachePolicy<K> + Send>,
    capacity: usize,
}

impl<K: std::hash::Hash + Eq + Clone> FixedSizeCache<K> {
    /// Creates a cache bounded to `capacity` entries, evicting via `policy`
    /// once full.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidCapacity`] if `capacity == 0`.
    pub fn new(
        capacity: usize,
        policy: Box<dyn CachePolicy<K> + Send>,
    ) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity);
        }
        Ok(Self {
            map: HashMap::with_capacity(capacity),
            policy,
            capacity,
        })
    }

    /// Inserts or overwrites `key`. If inserting a new key would exceed
    /// capacity, evicts the policy's replacement candidate first.
    pub fn put(&mut self, key: K, value: Vec<u8>) {
        if self.map.contains_key(&key) {
            self.policy.touch(&key);
            self.map.insert(key, value);
            return;
        }

        if self.map.len() >= self.capacity {
            if let Some(victim) = self.policy.repl_candidate() {
                self.map.remove(&victim);
                self.policy.erase(&victim);
            }
        }

        self.policy.insert(key.clone());
        self.map.insert(key, value);
    }

    /// Returns the cached value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotFound`] if `key` is not cached.
    pub fn get(&mut self, key: &K) -> Result<Vec<u8>, CacheError> {
        if let Some(value) = self.map.get(key) {
            let value = value.clone();
            self.policy.touch(key);
            Ok(value)
        } else {
            Err(CacheError::NotFound)
        }
    }

    /// Returns `true` if `key` is currently cached, without affecting the
    /// policy's recency/frequency bookkeeping.
    #[must_use]
    pub fn cached(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Removes `key` if present. Returns `true` if it was cached.
    pub fn remove(&mut self, key: &K) -> bool {
        if self.map.remove(key).is_some() {
            self.policy.erase(key);
            true
        } else {
            false
        }
    }

    /// Number of entries currently cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests;
