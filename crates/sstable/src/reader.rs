//! The in-memory descriptor for one on-disk SSTable file.
//!
//! Opening a file reads the header, bloom filter, and full index into
//! memory; the data area is left on disk and read per-value. The in-memory
//! footprint of a descriptor is dominated by the 10 KiB bloom filter plus
//! 12 bytes per indexed key — this is what lets the engine hold one
//! descriptor per on-disk file cheaply, across every level, without loading
//! the values themselves.

use anyhow::{Context, Result};
use bloom::BloomFilter;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::format::{read_index, Header};

/// The in-memory descriptor for one SSTable file: its header fields, bloom
/// filter, and key-to-offset index, plus a handle back to the data area on
/// disk.
///
/// A persistent file handle is kept open (behind a `Mutex`, so `get_value`
/// can be called through a shared `&self`) rather than reopened per lookup.
pub struct SSTableReader {
    path: PathBuf,
    time_stamp: u64,
    pair_count: u64,
    min_key: i64,
    max_key: i64,
    bloom: BloomFilter,
    /// key -> byte offset of its value in the data area, ascending by key.
    index: BTreeMap<i64, u32>,
    file: Mutex<BufReader<File>>,
    file_len: u64,
}

impl SSTableReader {
    /// Opens `path`, reading the header, bloom filter, and index into
    /// memory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .with_context(|| format!("opening SSTable file {}", path.display()))?;
        let file_len = file
            .metadata()
            .with_context(|| format!("statting SSTable file {}", path.display()))?
            .len();
        let mut reader = BufReader::new(file);

        let header = Header::read_from(&mut reader)
            .with_context(|| format!("reading header from {}", path.display()))?;

        let mut bloom_bytes = vec![0u8; config::BLOOM_FILTER_BYTES];
        reader
            .read_exact(&mut bloom_bytes)
            .with_context(|| format!("reading bloom filter from {}", path.display()))?;
        let bloom = BloomFilter::from_bytes(bloom_bytes);

        let index_entries = read_index(&mut reader, header.pair_count)
            .with_context(|| format!("reading index from {}", path.display()))?;
        let index: BTreeMap<i64, u32> = index_entries.into_iter().collect();

        Ok(Self {
            path,
            time_stamp: header.time_stamp,
            pair_count: header.pair_count,
            min_key: header.min_key,
            max_key: header.max_key,
            bloom,
            index,
            file: Mutex::new(reader),
            file_len,
        })
    }

    /// Path this descriptor was opened from. Used by compaction to delete
    /// the underlying file once it has been merged away.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn time_stamp(&self) -> u64 {
        self.time_stamp
    }

    #[must_use]
    pub fn pair_count(&self) -> u64 {
        self.pair_count
    }

    #[must_use]
    pub fn min_key(&self) -> i64 {
        self.min_key
    }

    #[must_use]
    pub fn max_key(&self) -> i64 {
        self.max_key
    }

    /// `true` if `[min_key, max_key]` overlaps `[lo, hi]`.
    #[must_use]
    pub fn overlaps(&self, lo: i64, hi: i64) -> bool {
        self.min_key <= hi && self.max_key >= lo
    }

    /// Returns the value for `key`, or `None` if definitely absent (out of
    /// key range, a bloom-filter miss, or not in the index).
    pub fn get_value(&self, key: i64) -> Result<Option<Vec<u8>>> {
        if key < self.min_key || key > self.max_key {
            return Ok(None);
        }
        if !self.bloom.may_contain_key(key) {
            return Ok(None);
        }
        let Some(&offset) = self.index.get(&key) else {
            return Ok(None);
        };

        let len = self.value_len_at(key, offset);
        let mut buf = vec![0u8; len as usize];
        {
            let mut file = self.file.lock().unwrap();
            file.seek(SeekFrom::Start(offset as u64))
                .with_context(|| format!("seeking in {}", self.path.display()))?;
            file.read_exact(&mut buf)
                .with_context(|| format!("reading value from {}", self.path.display()))?;
        }
        // strip trailing '\0' terminator
        buf.pop();
        Ok(Some(buf))
    }

    /// Streams the entire file into an ordered `key -> value` mapping.
    pub fn traverse(&self) -> Result<BTreeMap<i64, Vec<u8>>> {
        let mut out = BTreeMap::new();
        let mut file = self.file.lock().unwrap();
        for (&key, &offset) in &self.index {
            let len = self.value_len_at(key, offset);
            let mut buf = vec![0u8; len as usize];
            file.seek(SeekFrom::Start(offset as u64))
                .with_context(|| format!("seeking in {}", self.path.display()))?;
            file.read_exact(&mut buf)
                .with_context(|| format!("reading value from {}", self.path.display()))?;
            buf.pop();
            out.insert(key, buf);
        }
        Ok(out)
    }

    /// Value length including the trailing `\0`: the gap to the next key's
    /// offset, or to end-of-file for the last key.
    fn value_len_at(&self, key: i64, offset: u32) -> u32 {
        let next_offset = self
            .index
            .range((std::ops::Bound::Excluded(key), std::ops::Bound::Unbounded))
            .next()
            .map(|(_, &o)| o as u64)
            .unwrap_or(self.file_len);
        (next_offset - offset as u64) as u32
    }
}

/// Descriptors order primarily by `time_stamp` ascending, secondarily by
/// `min_key` ascending — used both to scan one level's tables on the read
/// path and to seed the compaction merge heap.
impl PartialEq for SSTableReader {
    fn eq(&self, other: &Self) -> bool {
        self.time_stamp == other.time_stamp && self.min_key == other.min_key
    }
}
impl Eq for SSTableReader {}

impl PartialOrd for SSTableReader {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SSTableReader {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.time_stamp
            .cmp(&other.time_stamp)
            .then_with(|| self.min_key.cmp(&other.min_key))
    }
}

#[cfg(test)]
#[path = "tests/reader_tests.rs"]
mod reader_tests;
