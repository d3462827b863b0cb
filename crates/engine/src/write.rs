//! Write path: `put`, `del`, and their thread-pool-dispatched `_task`
//! adapters.
//!
//! `put` holds the memtable/immutable read/write lock exclusively for its
//! whole body. If the insert would push the memtable's projected size over
//! [`config::MEMTABLE_SIZE_LIMIT`] it rotates the memtable into the
//! immutable slot and spawns a detached background thread to flush it —
//! unless a previous rotation is still pending, in which case it drops the
//! write lock and waits on the monitor condvar until that flush completes,
//! then retries.

use anyhow::Result;
use memtable::Memtable;
use threadpool::TaskHandle;

use crate::Engine;

impl Engine {
    /// Inserts `key` with `value`.
    ///
    /// If `to_cache` is `true`, the value is also written through to the
    /// value cache. A `put` of [`config::TOMBSTONE`] is indistinguishable
    /// from a [`Engine::del`] — that is how deletes are represented. Returns
    /// an error only if a background flush this call had to wait on poisoned
    /// a lock; the insert itself never performs I/O.
    pub fn put(&self, key: i64, value: Vec<u8>, to_cache: bool) -> Result<()> {
        loop {
            let mut state = self.inner.mem_state.write().unwrap();
            let would_overflow = projected_overflow(
                &state.mem,
                key,
                value.len(),
                self.inner.config.memtable_size_limit,
            );

            if would_overflow && state.immutable.is_some() {
                drop(state);
                self.wait_for_normal();
                continue;
            }

            if would_overflow {
                let old = std::mem::replace(&mut state.mem, Memtable::new());
                state.immutable = Some(old);
                let engine = self.clone();
                std::thread::spawn(move || engine.run_minor_compaction());
            }

            state.mem.put(key, value.clone());
            break;
        }

        if to_cache {
            self.inner.cache.lock().unwrap().put(key, value);
        }
        Ok(())
    }

    /// Deletes `key` by writing the tombstone sentinel in its place.
    ///
    /// Equivalent to `put(key, config::TOMBSTONE.to_vec(), false)`, plus an
    /// optional cache eviction. Always returns `Ok(true)` — there is no
    /// distinction between deleting a present key and a key that was never
    /// there; both end up represented as a tombstone.
    pub fn del(&self, key: i64, to_cache: bool) -> Result<bool> {
        self.put(key, config::TOMBSTONE.to_vec(), false)?;
        if to_cache {
            self.inner.cache.lock().unwrap().remove(&key);
        }
        Ok(true)
    }

    /// Dispatches [`Engine::put`] onto the engine's background thread pool.
    pub fn put_task(&self, key: i64, value: Vec<u8>, to_cache: bool) -> TaskHandle<Result<()>> {
        let engine = self.clone();
        self.inner.pool.enqueue(move || engine.put(key, value, to_cache))
    }

    /// Dispatches [`Engine::del`] onto the engine's background thread pool.
    pub fn del_task(&self, key: i64, to_cache: bool) -> TaskHandle<Result<bool>> {
        let engine = self.clone();
        self.inner.pool.enqueue(move || engine.del(key, to_cache))
    }

    pub(crate) fn wait_for_normal(&self) {
        let mut mode = self.inner.monitor.lock().unwrap();
        while *mode != crate::Mode::Normal {
            mode = self.inner.cond.wait(mode).unwrap();
        }
    }
}

/// Whether inserting `value_len` bytes at `key` would push `mem`'s projected
/// size over `limit`, mirroring the reference implementation's manual
/// byte-accounting: a new key costs `len(value) + 1 + 12` (the data area's
/// `'\0'` terminator plus the index entry), an overwrite costs the signed
/// delta against the existing value's length.
fn projected_overflow(mem: &Memtable, key: i64, value_len: usize, limit: usize) -> bool {
    let delta: i64 = match mem.get(key) {
        Some(existing) => value_len as i64 - existing.len() as i64,
        None => value_len as i64 + 1 + config::INDEX_ENTRY_SIZE as i64,
    };
    let projected = mem.approx_size() as i64 + delta;
    projected > limit as i64
}

#[cfg(test)]
#[path = "tests/write_tests.rs"]
mod write_tests;
