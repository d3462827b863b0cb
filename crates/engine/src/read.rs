//! Read path: `get` and its thread-pool-dispatched `_task` adapter.
//!
//! Checks, in order: the value cache, the live memtable, the immutable
//! memtable (if a flush is in flight), and finally the on-disk levels from
//! level 0 upward, oldest file to newest within a level. The first hit wins;
//! a tombstone hit at any layer is reported as absent rather than falling
//! through to an older value, since a later write (even a delete) always
//! shadows an earlier one.
//!
//! If the immutable slot is occupied, a lookup that misses it waits on the
//! monitor until the in-progress compaction finishes before scanning the
//! on-disk levels — otherwise it could race a level being rewritten out from
//! under it.

use anyhow::Result;
use threadpool::TaskHandle;

use crate::Engine;

impl Engine {
    /// Looks up `key`. Returns the stored value, or an empty `Vec` if the
    /// key is absent or has been deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if an on-disk SSTable fails to read (corruption,
    /// I/O failure) while scanning the levels — absence itself is never an
    /// error.
    pub fn get(&self, key: i64) -> Result<Vec<u8>> {
        if let Ok(value) = self.inner.cache.lock().unwrap().get(&key) {
            return Ok(filter_tombstone(value));
        }

        let state = self.inner.mem_state.read().unwrap();
        if let Some(value) = state.mem.get(key) {
            return Ok(filter_tombstone(value.to_vec()));
        }
        if let Some(immutable) = &state.immutable {
            if let Some(value) = immutable.get(key) {
                return Ok(filter_tombstone(value.to_vec()));
            }
        }
        let compaction_in_flight = state.immutable.is_some();
        drop(state);

        if compaction_in_flight {
            self.wait_for_normal();
        }

        let levels = self.inner.levels.read().unwrap();
        for level in levels.iter() {
            for table in &level.tables {
                if let Some(value) = table.get_value(key)? {
                    return Ok(filter_tombstone(value));
                }
            }
        }

        Ok(Vec::new())
    }

    /// Dispatches [`Engine::get`] onto the engine's background thread pool.
    pub fn get_task(&self, key: i64) -> TaskHandle<Result<Vec<u8>>> {
        let engine = self.clone();
        self.inner.pool.enqueue(move || engine.get(key))
    }
}

fn filter_tombstone(value: Vec<u8>) -> Vec<u8> {
    if value == config::TOMBSTONE {
        Vec::new()
    } else {
        value
    }
}

#[cfg(test)]
#[path = "tests/read_tests.rs"]
mod read_tests;
