//! Writes an ordered sequence of `(key, value)` pairs to a new SSTable file
//! in the exact layout described in [`crate::format`].
//!
//! Used both for minor compaction (serializing an immutable memtable to
//! level 0) and for major compaction (serializing a merged run to level
//! *L*). Both callers are responsible for handing entries already in
//! ascending key order and already split to fit the memtable size cap — this
//! writer does not chunk or sort.

use anyhow::{Context, Result};
use bloom::BloomFilter;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::format::{data_area_start, write_index_entry, Header};

/// Stateless writer for the SSTable file format.
pub struct SSTableWriter;

impl SSTableWriter {
    /// Writes `entries` (already sorted ascending by key, already
    /// deduplicated) to `path` as a new SSTable file with the given
    /// `time_stamp`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written — this is
    /// treated as fatal by the caller, matching the spec's "store fails ...
    /// fatal and surfaced upward" error design.
    pub fn write<P: AsRef<Path>>(
        path: P,
        time_stamp: u64,
        entries: &[(i64, Vec<u8>)],
    ) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("creating SSTable file {}", path.display()))?;
        let mut out = BufWriter::new(file);

        let min_key = entries.first().map(|(k, _)| *k).unwrap_or(0);
        let max_key = entries.last().map(|(k, _)| *k).unwrap_or(0);

        let header = Header {
            time_stamp,
            pair_count: entries.len() as u64,
            min_key,
            max_key,
        };
        header
            .write_to(&mut out)
            .with_context(|| format!("writing header to {}", path.display()))?;

        let mut filter = BloomFilter::new();
        for (key, _) in entries {
            filter.insert_key(*key);
        }
        out.write_all(filter.as_bytes())
            .with_context(|| format!("writing bloom filter to {}", path.display()))?;

        let data_start = data_area_start(entries.len() as u64);
        let mut offset = data_start;
        for (key, value) in entries {
            write_index_entry(&mut out, *key, offset as u32)
                .with_context(|| format!("writing index entry to {}", path.display()))?;
            offset += value.len() as u64 + 1;
        }

        for (_, value) in entries {
            out.write_all(value)
                .with_context(|| format!("writing value to {}", path.display()))?;
            out.write_all(&[0u8])
                .with_context(|| format!("writing value terminator to {}", path.display()))?;
        }

        out.flush()
            .with_context(|| format!("flushing SSTable file {}", path.display()))?;
        Ok(())
    }

    /// Writes a [`memtable::Memtable`] to `path` as a new level-0 SSTable.
    /// This is the `store(counter, dir)` operation from the spec.
    pub fn write_memtable<P: AsRef<Path>>(
        path: P,
        time_stamp: u64,
        memtable: &memtable::Memtable,
    ) -> Result<()> {
        let entries: Vec<(i64, Vec<u8>)> = memtable.iter().map(|(k, v)| (k, v.to_vec())).collect();
        Self::write(path, time_stamp, &entries)
    }
}

#[cfg(test)]
#[path = "tests/writer_tests.rs"]
mod writer_tests;
