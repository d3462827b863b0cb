//! # Engine - RiptideKV Storage Engine
//!
//! The central orchestrator that ties [`memtable`], [`sstable`], [`cache`]
//! and [`threadpool`] together into a complete LSM-tree key-value store over
//! `i64` keys and opaque byte-string values.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   |
//!   v
//! ┌───────────────────────────────────────────────┐
//! │                   ENGINE                      │
//! │                                               │
//! │ write.rs → Memtable insert                    │
//! │              |                                │
//! │              |  (projected size over limit?)  │
//! │              |            yes                 │
//! │              v                                │
//! │       rotate to immutable → background        │
//! │       minor compaction → level0 SSTable        │
//! │              |                                │
//! │              v                                │
//! │   compaction.rs → recursive major compaction   │
//! │                                               │
//! │ read.rs → cache → memtable → immutable →      │
//! │           level0, level1, ... (oldest to       │
//! │           newest file within a level, level    │
//! │           by level)                            │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Module responsibilities
//!
//! | Module         | Purpose                                                |
//! |----------------|---------------------------------------------------------|
//! | [`lib.rs`]     | `Engine`, `new`/`open` construction, level bookkeeping  |
//! | [`write`]      | `put`, `del`, and their `_task` thread-pool adapters    |
//! | [`read`]       | `get` and its `_task` adapter                           |
//! | [`compaction`] | minor compaction (flush) and recursive major compaction |
//!
//! ## Concurrency
//!
//! A [`parking_lot`]-free design built from the standard library: a
//! read/write lock guards the memtable and immutable-memtable slot (shared
//! on `get`, exclusive on `put`/`del`); a separate mutex/condvar "monitor"
//! lets a `put` that must wait for a pending flush to drain release the
//! read/write lock while it waits, and lets `get` wait out an in-progress
//! compaction before it falls through to the on-disk levels. Per-level
//! SSTable descriptor sets live behind their own read/write lock so
//! background compaction can add new descriptors (then remove the old ones)
//! without blocking concurrent readers for the duration of a whole pass —
//! only for the instant each add/remove happens.
//!
//! There is no write-ahead log and no persisted manifest: [`Engine::open`]
//! reconstructs level state by scanning `level0/`, `level1/`, ... under the
//! root directory and re-deriving each file's metadata from its own header.

mod compaction;
mod read;
mod write;

#[cfg(test)]
#[path = "tests/helpers.rs"]
mod test_helpers;

use anyhow::{Context, Result};
use cache::{CachePolicy, FifoPolicy, FixedSizeCache, LfuPolicy, LruPolicy, NoOpPolicy};
use config::{CachePolicyKind, EngineConfig};
use memtable::Memtable;
use sstable::SSTableReader;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, RwLock};
use threadpool::ThreadPool;

/// One on-disk level's bookkeeping: its live table descriptors (kept sorted
/// ascending by `(time_stamp, min_key)`) and the highest `SSTable{N}.sst`
/// file number issued in that level so far.
#[derive(Default)]
pub(crate) struct LevelState {
    pub(crate) tables: Vec<Arc<SSTableReader>>,
    pub(crate) next_file_num: u64,
}

/// The memtable and its pending-flush immutable sibling, guarded together by
/// one read/write lock since `put` must see both to decide whether a
/// rotation is already in flight.
pub(crate) struct MemState {
    pub(crate) mem: Memtable,
    pub(crate) immutable: Option<Memtable>,
}

/// The engine's background-activity monitor state, guarding whether a
/// compaction (minor, or the major compaction it cascades into) is
/// currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Normal,
    Compact,
}

pub(crate) struct EngineInner {
    pub(crate) dir: PathBuf,
    pub(crate) config: EngineConfig,
    pub(crate) mem_state: RwLock<MemState>,
    pub(crate) levels: RwLock<Vec<LevelState>>,
    pub(crate) monitor: Mutex<Mode>,
    pub(crate) cond: Condvar,
    pub(crate) cache: Mutex<FixedSizeCache<i64>>,
    pub(crate) pool: ThreadPool,
}

/// A handle to a running LSM-tree storage engine.
///
/// Cheaply `Clone`-able (an `Arc` around the shared state) so it can be
/// handed to background compaction threads and thread-pool tasks alike.
#[derive(Clone)]
pub struct Engine {
    pub(crate) inner: Arc<EngineInner>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mem_state = self.inner.mem_state.read().unwrap();
        let levels = self.inner.levels.read().unwrap();
        f.debug_struct("Engine")
            .field("dir", &self.inner.dir)
            .field("memtable_entries", &mem_state.mem.len())
            .field("has_immutable", &mem_state.immutable.is_some())
            .field(
                "level_table_counts",
                &levels.iter().map(|l| l.tables.len()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Engine {
    /// Opens a fresh engine rooted at `dir`, discarding any SSTables already
    /// present under it.
    ///
    /// Mirrors the reference implementation's constructor, which always
    /// calls `Reset()` on startup. Use [`Engine::open`] to recover an
    /// existing on-disk store instead.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` cannot be created or an existing level
    /// directory cannot be cleared.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::new_with_config(EngineConfig::new(dir.as_ref().to_path_buf()))
    }

    /// Opens an engine rooted at `dir`, reconstructing level state from
    /// whatever `level0/`, `level1/`, ... subdirectories and `SSTable*.sst`
    /// files are already there. The in-memory memtable always starts empty
    /// (there is no write-ahead log to replay).
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` cannot be created or an existing SSTable
    /// fails to open.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::open_with_config(EngineConfig::new(dir.as_ref().to_path_buf()))
    }

    /// Opens a fresh engine with a fully explicit [`EngineConfig`], overriding
    /// cache capacity, cache eviction policy, and thread-pool size without
    /// touching the wire-format constants (which stay fixed in [`config`]).
    ///
    /// # Errors
    ///
    /// Returns an error if `config.dir` cannot be created or an existing
    /// level directory cannot be cleared.
    pub fn new_with_config(config: EngineConfig) -> Result<Self> {
        fs::create_dir_all(&config.dir)
            .with_context(|| format!("creating engine directory {}", config.dir.display()))?;
        reset_dir(&config.dir)?;
        Self::build(config, Vec::new())
    }

    /// Recovers an engine from `config.dir` with a fully explicit
    /// [`EngineConfig`], reconstructing level state from whatever is already
    /// on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.dir` cannot be created or an existing
    /// SSTable fails to open.
    pub fn open_with_config(config: EngineConfig) -> Result<Self> {
        fs::create_dir_all(&config.dir)
            .with_context(|| format!("creating engine directory {}", config.dir.display()))?;
        let levels = scan_levels(&config.dir)?;
        Self::build(config, levels)
    }

    /// Test-only alias for [`Engine::new_with_config`], kept for the small
    /// `memtable_size_limit` configs exercising rotation/compaction in this
    /// crate's test suite without writing megabytes of data.
    #[cfg(test)]
    pub(crate) fn with_config(config: EngineConfig) -> Result<Self> {
        Self::new_with_config(config)
    }

    fn build(config: EngineConfig, levels: Vec<LevelState>) -> Result<Self> {
        let dir = config.dir.clone();
        let cache_policy = build_cache_policy(config.cache_policy);
        let cache = FixedSizeCache::new(config.cache_capacity, cache_policy)
            .map_err(|e| anyhow::anyhow!("invalid cache configuration: {e}"))?;
        let pool = ThreadPool::new(config.thread_pool_size);

        let inner = EngineInner {
            dir,
            config,
            mem_state: RwLock::new(MemState {
                mem: Memtable::new(),
                immutable: None,
            }),
            levels: RwLock::new(levels),
            monitor: Mutex::new(Mode::Normal),
            cond: Condvar::new(),
            cache: Mutex::new(cache),
            pool,
        };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Removes every level directory (and the SSTables in it) under the
    /// engine's root. In-memory state — the memtable, the immutable slot,
    /// and the cache — is left untouched; only the persisted levels are
    /// cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if a level directory or one of its files cannot be
    /// removed.
    pub fn reset(&self) -> Result<()> {
        reset_dir(&self.inner.dir)?;
        let mut levels = self.inner.levels.write().unwrap();
        levels.clear();
        Ok(())
    }

}

pub(crate) fn level_dir(root: &Path, level: usize) -> PathBuf {
    root.join(format!("level{level}"))
}

/// On drop, flushes whatever is left in the memtable straight to level 0 —
/// synchronously, since there is no one left to hand a background task to —
/// and runs a final major-compaction check so a long-lived engine does not
/// leak an over-full level 0 when the process exits.
impl Drop for EngineInner {
    fn drop(&mut self) {
        let mut mode = self.monitor.lock().unwrap();
        while *mode != Mode::Normal {
            mode = self.cond.wait(mode).unwrap();
        }
        *mode = Mode::Compact;
        drop(mode);

        let mem = {
            let mut state = self.mem_state.write().unwrap();
            if state.mem.is_empty() {
                None
            } else {
                Some(std::mem::replace(&mut state.mem, Memtable::new()))
            }
        };
        if let Some(mem) = &mem {
            match flush_memtable_to_level0(self, mem) {
                Ok(()) => {
                    if let Err(e) = compaction::major_compaction(self, 1) {
                        log::error!("final major compaction on shutdown failed: {e:#}");
                    }
                }
                Err(e) => log::error!("final flush on shutdown failed: {e:#}"),
            }
        }

        *self.monitor.lock().unwrap() = Mode::Normal;
        self.cond.notify_all();
    }
}

fn build_cache_policy(
    kind: CachePolicyKind,
) -> Box<dyn CachePolicy<i64> + Send> {
    match kind {
        CachePolicyKind::Fifo => Box::new(FifoPolicy::new()),
        CachePolicyKind::Lru => Box::new(LruPolicy::new()),
        CachePolicyKind::Lfu => Box::new(LfuPolicy::new()),
        CachePolicyKind::NoOp => Box::new(NoOpPolicy::new()),
    }
}

fn reset_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        for file in fs::read_dir(&path)? {
            let file = file?;
            fs::remove_file(file.path())?;
        }
        fs::remove_dir(&path)?;
    }
    Ok(())
}

fn scan_levels(dir: &Path) -> Result<Vec<LevelState>> {
    let mut level_dirs: Vec<(usize, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(idx) = level_index(&path) {
            level_dirs.push((idx, path));
        }
    }
    level_dirs.sort_by_key(|(idx, _)| *idx);

    let mut levels: Vec<LevelState> = Vec::new();
    for (idx, level_dir) in level_dirs {
        while levels.len() <= idx {
            levels.push(LevelState::default());
        }
        let mut files: Vec<(u64, PathBuf)> = fs::read_dir(&level_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter_map(|p| sstable_file_num(&p).map(|n| (n, p)))
            .collect();
        files.sort_by_key(|(n, _)| *n);

        let mut max_num = 0u64;
        for (num, path) in &files {
            let reader = SSTableReader::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            levels[idx].tables.push(Arc::new(reader));
            max_num = max_num.max(*num);
        }
        levels[idx].tables.sort();
        levels[idx].next_file_num = max_num;
    }
    Ok(levels)
}

fn level_index(path: &Path) -> Option<usize> {
    let name = path.file_name()?.to_str()?;
    name.strip_prefix("level")?.parse().ok()
}

fn sstable_file_num(path: &Path) -> Option<u64> {
    if path.extension().and_then(|e| e.to_str()) != Some("sst") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix("SSTable")?.parse().ok()
}

pub(crate) fn flush_memtable_to_level0(inner: &EngineInner, mem: &Memtable) -> Result<()> {
    let level0_dir = inner.dir.join("level0");
    fs::create_dir_all(&level0_dir)?;

    let file_num = {
        let mut levels = inner.levels.write().unwrap();
        if levels.is_empty() {
            levels.push(LevelState::default());
        }
        levels[0].next_file_num += 1;
        levels[0].next_file_num
    };
    let path = level0_dir.join(format!("SSTable{file_num}.sst"));
    let time_stamp = file_num;
    sstable::SSTableWriter::write_memtable(&path, time_stamp, mem)
        .with_context(|| format!("writing {}", path.display()))?;
    let reader = Arc::new(SSTableReader::open(&path)?);

    let mut levels = inner.levels.write().unwrap();
    levels[0].tables.push(reader);
    levels[0].tables.sort();
    Ok(())
}
