//! # Config
//!
//! Compile-time constants and runtime knobs for the RiptideKV LSM storage
//! engine.
//!
//! Every size and threshold named in the on-disk file format (the memtable
//! byte cap, the fixed SSTable header cost, the bloom filter width, the
//! per-level file cap, and the tombstone sentinel) lives here so the
//! `memtable`, `sstable`, `cache`, and `engine` crates share one definition
//! instead of repeating magic numbers.

/// Memtable projected-size cap, in bytes, that triggers a minor compaction
/// (memtable -> immutable memtable -> level 0 flush).
///
/// `2^21` bytes (2 MiB).
pub const MEMTABLE_SIZE_LIMIT: usize = 1 << 21;

/// Fixed byte cost of an SSTable's header-plus-bloom-filter prefix:
/// `time_stamp(8) + pair_count(8) + min_key(8) + max_key(8) + bloom(10240)`.
pub const SSTABLE_HEADER_SIZE: usize = 10272;

/// Number of bits in each SSTable's bloom filter (10240 bytes).
pub const BLOOM_FILTER_BITS: usize = 81920;

/// Number of bytes in a serialized bloom filter (`BLOOM_FILTER_BITS / 8`).
pub const BLOOM_FILTER_BYTES: usize = BLOOM_FILTER_BITS / 8;

/// Byte size of one index entry: `key: i64 (8) + offset: u32 (4)`.
pub const INDEX_ENTRY_SIZE: usize = 12;

/// Seed passed to MurmurHash3 when hashing a key for bloom-filter placement.
pub const BLOOM_HASH_SEED: u32 = 1;

/// The distinguished tombstone value. A `Put` of this exact byte string is
/// indistinguishable, on disk, from a `Del` — this is how deletes are
/// represented without a dedicated wire flag.
pub const TOMBSTONE: &[u8] = b"~DELETED~";

/// Default capacity of the value cache (number of entries).
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Default number of worker threads in the background task pool.
pub const DEFAULT_THREAD_POOL_SIZE: usize = 4;

/// Per-level file-count cap: `cap(L) = 2^(L+1)`.
///
/// Level 0 may hold up to 2 tables before it is fully emptied by major
/// compaction; level 1 up to 4; level 2 up to 8; and so on.
#[must_use]
pub fn level_cap(level: usize) -> usize {
    1usize << (level + 1)
}

/// Eviction policy selectable for the value cache.
///
/// Mirrors the reference implementation's compile-time `FIFO`/`LRU`/`LFU`
/// selection, made a runtime choice instead (see `cache::CachePolicy`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicyKind {
    /// Evict the oldest inserted entry.
    Fifo,
    /// Evict the least recently touched entry.
    #[default]
    Lru,
    /// Evict the least frequently touched entry.
    Lfu,
    /// Never evict proactively; only reacts to explicit removes.
    NoOp,
}

/// Runtime-tunable knobs layered over the compile-time constants above.
///
/// An `EngineConfig` is consumed by `Engine::new`/`Engine::open`; its
/// `Default` impl reproduces the reference implementation's fixed constants.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root directory under which `level0/`, `level1/`, ... are created.
    pub dir: std::path::PathBuf,
    /// Memtable projected-size cap in bytes. See [`MEMTABLE_SIZE_LIMIT`].
    pub memtable_size_limit: usize,
    /// Value cache capacity (number of entries). See [`DEFAULT_CACHE_CAPACITY`].
    pub cache_capacity: usize,
    /// Value cache eviction policy.
    pub cache_policy: CachePolicyKind,
    /// Background task pool size. See [`DEFAULT_THREAD_POOL_SIZE`].
    pub thread_pool_size: usize,
}

impl EngineConfig {
    /// Builds a config rooted at `dir` with every other knob defaulted.
    pub fn new<P: Into<std::path::PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default_without_dir()
        }
    }

    fn default_without_dir() -> Self {
        Self {
            dir: std::path::PathBuf::new(),
            memtable_size_limit: MEMTABLE_SIZE_LIMIT,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_policy: CachePolicyKind::default(),
            thread_pool_size: DEFAULT_THREAD_POOL_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_cap_matches_spec_formula() {
        assert_eq!(level_cap(0), 2);
        assert_eq!(level_cap(1), 4);
        assert_eq!(level_cap(2), 8);
        assert_eq!(level_cap(3), 16);
    }

    #[test]
    fn header_size_matches_layout() {
        assert_eq!(SSTABLE_HEADER_SIZE, 8 + 8 + 8 + 8 + BLOOM_FILTER_BYTES);
    }

    #[test]
    fn tombstone_is_not_empty() {
        assert!(!TOMBSTONE.is_empty());
    }
}
