//! # Memtable
//!
//! An in-memory, ordered write buffer for the RiptideKV storage engine,
//! implemented as a skip list over `i64` keys.
//!
//! The memtable is the first point of contact for every write. `Put`/`Del`
//! land here; once its projected on-disk size exceeds the configured limit
//! it is handed off (by the engine, not this crate) to become the immutable
//! memtable and is serialized to a level-0 SSTable by `sstable::SSTableWriter`.
//!
//! ## Key properties
//! - **Sorted order**: [`Memtable::iter`] always yields ascending key order,
//!   which is what the SSTable writer needs to emit a sorted index/data area.
//! - **Tombstones are just values**: a `Put` of [`config::TOMBSTONE`] is how
//!   the engine represents a delete; this crate does not special-case it.
//! - **Projected size tracking**: [`Memtable::approx_size`] mirrors exactly
//!   what the file this memtable would become weighs, so the engine can
//!   decide when to rotate without a dry-run serialization pass.
//!
//! ## Example
//! ```rust
//! use memtable::Memtable;
//!
//! let mut m = Memtable::new();
//! m.put(1, b"hello".to_vec());
//! assert_eq!(m.get(1), Some(b"hello".as_slice()));
//! assert_eq!(m.get(2), None);
//! ```

use config::SSTABLE_HEADER_SIZE;
use rand::Rng;

/// Highest possible skip-list level (level 0 is the base, fully-linked
/// level). 32 levels comfortably covers any memtable that fits under the
/// 2 MiB size cap.
const MAX_HEIGHT: usize = 32;

/// Promotion probability per level, matching the reference implementation's
/// `rand() & 1` coin flip.
const PROMOTION_P: f64 = 0.5;

/// One node in the skip list arena.
///
/// Unlike the reference C++ implementation, which links a fresh `Node` per
/// level (each level its own linked list, connected vertically by `down_`
/// pointers), this keeps one node per key with a `forward` pointer per level
/// it participates in — the standard Pugh skip-list layout and the shape
/// most idiomatic Rust skip lists (e.g. `crossbeam-skiplist`) use. Externally
/// this is unobservable: `put`/`get` behave identically either way, and a
/// single node per key means an overwrite never has to walk multiple levels
/// to update every copy of the value.
struct Node {
    key: i64,
    value: Vec<u8>,
    /// `forward[i]` is the index of the next node at level `i`, or `None`.
    forward: Vec<Option<usize>>,
}

/// An ordered, in-memory write buffer backed by a skip list over `i64` keys.
///
/// Tracks `min_key`/`max_key` and a *projected serialized size* so the
/// engine can decide when this memtable has outgrown the configured limit
/// without actually serializing it.
pub struct Memtable {
    arena: Vec<Node>,
    /// `head[i]` is the index of the first node at level `i`, or `None`.
    head: Vec<Option<usize>>,
    len: usize,
    min_key: Option<i64>,
    max_key: Option<i64>,
    approx_size: usize,
}

impl Memtable {
    /// Creates a new, empty memtable. `approx_size` starts at
    /// [`SSTABLE_HEADER_SIZE`] — the fixed cost of the header and bloom
    /// filter every SSTable carries regardless of how many keys it holds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            head: vec![None],
            len: 0,
            min_key: None,
            max_key: None,
            approx_size: SSTABLE_HEADER_SIZE,
        }
    }

    /// Inserts or overwrites `key` with `value`.
    ///
    /// Updates `min_key`/`max_key` and `approx_size` (`+len(value)+1+12` for
    /// a new key, `+delta(len(value))` for an overwrite — the `+1` accounts
    /// for the data area's trailing `\0` terminator, the `+12` for the
    /// key+offset index entry). A new key is then probabilistically
    /// promoted upward with `p = 0.5` per level, growing the skip list's
    /// height when promotion runs past the current top.
    pub fn put(&mut self, key: i64, value: Vec<u8>) {
        self.min_key = Some(self.min_key.map_or(key, |m| m.min(key)));
        self.max_key = Some(self.max_key.map_or(key, |m| m.max(key)));

        let mut update = vec![None; self.head.len()];
        let mut cur: Option<usize> = None;
        for level in (0..self.head.len()).rev() {
            let mut node = cur.map_or(self.head[level], |n| self.arena[n].forward[level]);
            loop {
                match node {
                    Some(idx) if self.arena[idx].key < key => {
                        cur = Some(idx);
                        node = self.arena[idx].forward[level];
                    }
                    _ => break,
                }
            }
            update[level] = cur;
        }

        let next_at_base = cur.map_or(self.head[0], |n| self.arena[n].forward[0]);
        if let Some(idx) = next_at_base {
            if self.arena[idx].key == key {
                self.approx_size = self
                    .approx_size
                    .saturating_sub(self.arena[idx].value.len())
                    .saturating_add(value.len());
                self.arena[idx].value = value;
                return;
            }
        }

        self.approx_size = self
            .approx_size
            .saturating_add(value.len())
            .saturating_add(1 + 12);
        self.len += 1;

        let height = self.random_height();
        if height > self.head.len() {
            self.head.resize(height, None);
        }

        let node_idx = self.arena.len();
        self.arena.push(Node {
            key,
            value,
            forward: vec![None; height],
        });

        for level in 0..height {
            let prev = update.get(level).copied().flatten();
            let forward = prev.map_or(self.head[level], |p| self.arena[p].forward[level]);
            self.arena[node_idx].forward[level] = forward;
            match prev {
                Some(p) => self.arena[p].forward[level] = Some(node_idx),
                None => self.head[level] = Some(node_idx),
            }
        }
    }

    /// Returns the value for `key`, or `None` if absent.
    ///
    /// Tombstones are returned as a normal value ([`config::TOMBSTONE`]) —
    /// the engine, not this crate, interprets that sentinel as "deleted".
    #[must_use]
    pub fn get(&self, key: i64) -> Option<&[u8]> {
        let mut cur: Option<usize> = None;
        for level in (0..self.head.len()).rev() {
            let mut node = cur.map_or(self.head[level], |n| self.arena[n].forward[level]);
            loop {
                match node {
                    Some(idx) if self.arena[idx].key < key => {
                        cur = Some(idx);
                        node = self.arena[idx].forward[level];
                    }
                    _ => break,
                }
            }
        }
        let next = cur.map_or(self.head[0], |n| self.arena[n].forward[0]);
        next.and_then(|idx| {
            if self.arena[idx].key == key {
                Some(self.arena[idx].value.as_slice())
            } else {
                None
            }
        })
    }

    /// Returns `true` if `key` is present (including tombstones).
    #[must_use]
    pub fn contains_key(&self, key: i64) -> bool {
        self.get(key).is_some()
    }

    /// Returns the base-level entries in ascending key order. Used by the
    /// SSTable writer to emit the header, bloom filter, index, and data
    /// areas in one pass.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &[u8])> {
        let mut cur = self.head[0];
        std::iter::from_fn(move || {
            let idx = cur?;
            cur = self.arena[idx].forward[0];
            Some((self.arena[idx].key, self.arena[idx].value.as_slice()))
        })
    }

    /// Number of distinct keys stored (including tombstones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if no keys have been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The projected byte size this memtable would occupy once serialized
    /// to an SSTable. Compared against [`config::MEMTABLE_SIZE_LIMIT`] by
    /// the engine to decide when to rotate.
    #[must_use]
    pub fn approx_size(&self) -> usize {
        self.approx_size
    }

    /// Smallest key inserted so far, or `None` if empty.
    #[must_use]
    pub fn min_key(&self) -> Option<i64> {
        self.min_key
    }

    /// Largest key inserted so far, or `None` if empty.
    #[must_use]
    pub fn max_key(&self) -> Option<i64> {
        self.max_key
    }

    fn random_height(&self) -> usize {
        let mut height = 1;
        let mut rng = rand::thread_rng();
        while height < MAX_HEIGHT && rng.gen_bool(PROMOTION_P) {
            height += 1;
        }
        height
    }
}

impl Default for Memtable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
