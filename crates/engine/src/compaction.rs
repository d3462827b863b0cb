//! Minor compaction (memtable flush) and recursive major compaction.
//!
//! Minor compaction runs in a detached background thread spawned by
//! [`crate::write`] whenever a `put` rotates the memtable into the immutable
//! slot: it writes the immutable memtable to a new level-0 SSTable, then
//! checks whether level 0 has outgrown [`config::level_cap`] and cascades
//! into [`major_compaction`] if so.
//!
//! Major compaction for `level` merges the oldest over-cap tables from
//! `level - 1` with whatever tables in `level` overlap their key range, via
//! [`sstable::merge_sources`] (newest source wins on collision), chunking
//! the merged run back into one or more level-`level` SSTables no larger
//! than [`config::MEMTABLE_SIZE_LIMIT`] each. New descriptors are installed
//! before the old ones are dropped, so a concurrent reader never sees a
//! level with neither the old nor the new tables present. It then recurses
//! into `level + 1`, cascading for as many levels as remain over cap.

use anyhow::{Context, Result};
use sstable::{merge_sources, SSTableReader, SSTableWriter};
use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use crate::{flush_memtable_to_level0, level_dir, Engine, EngineInner, LevelState, Mode};

impl Engine {
    /// Entry point for the detached background thread spawned on memtable
    /// rotation: flush the immutable memtable to level 0, cascade into major
    /// compaction, then clear the immutable slot and wake one waiter.
    pub(crate) fn run_minor_compaction(&self) {
        *self.inner.monitor.lock().unwrap() = Mode::Compact;

        let flush_result = {
            let state = self.inner.mem_state.read().unwrap();
            match &state.immutable {
                Some(immutable) => flush_memtable_to_level0(&self.inner, immutable),
                None => Ok(()),
            }
        };

        match flush_result {
            Ok(()) => {
                if let Err(e) = major_compaction(&self.inner, 1) {
                    log::error!("major compaction on level 1 failed: {e:#}");
                }
            }
            Err(e) => log::error!("minor compaction flush failed: {e:#}"),
        }

        self.inner.mem_state.write().unwrap().immutable = None;
        *self.inner.monitor.lock().unwrap() = Mode::Normal;
        self.inner.cond.notify_one();
    }
}

/// Merges `level - 1` into `level` if `level - 1` has more tables than
/// [`config::level_cap`] allows, then recurses into `level + 1`.
pub(crate) fn major_compaction(inner: &EngineInner, level: usize) -> Result<()> {
    let prev_count = {
        let levels = inner.levels.read().unwrap();
        levels.get(level - 1).map_or(0, |l| l.tables.len())
    };
    if prev_count <= config::level_cap(level - 1) {
        return Ok(());
    }

    {
        let mut levels = inner.levels.write().unwrap();
        while levels.len() <= level {
            levels.push(LevelState::default());
        }
    }
    fs::create_dir_all(level_dir(&inner.dir, level))
        .with_context(|| format!("creating {}", level_dir(&inner.dir, level).display()))?;

    let is_final_level = {
        let levels = inner.levels.read().unwrap();
        level == levels.len() - 1
    };

    let compact_count = if level == 1 {
        prev_count
    } else {
        prev_count - config::level_cap(level - 1)
    };

    let selected_prev: Vec<Arc<SSTableReader>> = {
        let levels = inner.levels.read().unwrap();
        let mut prev_tables = levels[level - 1].tables.clone();
        prev_tables.sort();
        prev_tables.into_iter().take(compact_count).collect()
    };

    let temp_min = selected_prev.iter().map(|t| t.min_key()).min().unwrap();
    let temp_max = selected_prev.iter().map(|t| t.max_key()).max().unwrap();
    let max_ts = selected_prev.iter().map(|t| t.time_stamp()).max().unwrap();

    let selected_level: Vec<Arc<SSTableReader>> = {
        let levels = inner.levels.read().unwrap();
        levels[level]
            .tables
            .iter()
            .filter(|t| t.overlaps(temp_min, temp_max))
            .cloned()
            .collect()
    };

    let mut all: Vec<Arc<SSTableReader>> = selected_prev
        .iter()
        .cloned()
        .chain(selected_level.iter().cloned())
        .collect();
    all.sort();

    let sources: Vec<BTreeMap<i64, Vec<u8>>> = all
        .iter()
        .map(|t| {
            t.traverse()
                .with_context(|| format!("traversing {}", t.path().display()))
        })
        .collect::<Result<_>>()?;
    let merged = merge_sources(&sources);

    let mut new_descriptors = Vec::new();
    let mut chunk: Vec<(i64, Vec<u8>)> = Vec::new();
    let mut size = config::SSTABLE_HEADER_SIZE;
    for (key, value) in merged {
        if is_final_level && value == config::TOMBSTONE {
            continue;
        }
        let entry_cost = value.len() + 1 + config::INDEX_ENTRY_SIZE;
        if !chunk.is_empty() && size + entry_cost > config::MEMTABLE_SIZE_LIMIT {
            new_descriptors.push(write_level_chunk(inner, level, max_ts, &chunk)?);
            chunk.clear();
            size = config::SSTABLE_HEADER_SIZE;
        }
        size += entry_cost;
        chunk.push((key, value));
    }
    if !chunk.is_empty() {
        new_descriptors.push(write_level_chunk(inner, level, max_ts, &chunk)?);
    }

    // Add the new descriptors before removing the merged-away ones so a
    // concurrent reader scanning this level always sees a superset of the
    // live keys, never a gap.
    {
        let mut levels = inner.levels.write().unwrap();
        levels[level].tables.extend(new_descriptors);
        levels[level].tables.sort();
    }
    {
        let mut levels = inner.levels.write().unwrap();
        let prev_paths: Vec<_> = selected_prev.iter().map(|t| t.path().to_path_buf()).collect();
        levels[level - 1]
            .tables
            .retain(|t| !prev_paths.contains(&t.path().to_path_buf()));
        let level_paths: Vec<_> = selected_level.iter().map(|t| t.path().to_path_buf()).collect();
        levels[level]
            .tables
            .retain(|t| !level_paths.contains(&t.path().to_path_buf()));
    }
    for table in selected_prev.iter().chain(selected_level.iter()) {
        if let Err(e) = fs::remove_file(table.path()) {
            log::warn!("failed to remove compacted file {}: {e}", table.path().display());
        }
    }

    major_compaction(inner, level + 1)
}

fn write_level_chunk(
    inner: &EngineInner,
    level: usize,
    time_stamp: u64,
    entries: &[(i64, Vec<u8>)],
) -> Result<Arc<SSTableReader>> {
    let file_num = {
        let mut levels = inner.levels.write().unwrap();
        levels[level].next_file_num += 1;
        levels[level].next_file_num
    };
    let path = level_dir(&inner.dir, level).join(format!("SSTable{file_num}.sst"));
    SSTableWriter::write(&path, time_stamp, entries)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(Arc::new(SSTableReader::open(&path)?))
}

#[cfg(test)]
#[path = "tests/compaction_tests.rs"]
mod compaction_tests;
