//! SSTable binary layout constants and header read/write helpers.
//!
//! ```text
//! [time_stamp: u64][pair_count: u64][min_key: i64][max_key: i64]
//! [bloom_filter: 10240 bytes]                          <- fixed header, H bytes
//! [index: pair_count * (key: i64, offset: u32)]        <- sorted by key ascending
//! [data: pair_count * (value bytes, '\0')]             <- same key order as index
//! ```
//!
//! All integer fields are written in the host's native byte order — this
//! format is intentionally not portable across machines of differing
//! endianness, matching the reference implementation's raw
//! `fstream::write((char *)&field, sizeof(field))` calls.

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use config::{BLOOM_FILTER_BYTES, INDEX_ENTRY_SIZE, SSTABLE_HEADER_SIZE};
use std::io::{self, Read, Write};

/// The fixed prefix every SSTable starts with: timestamp, pair count,
/// min/max key, and the bloom filter. Equal to [`SSTABLE_HEADER_SIZE`].
pub const HEADER_SIZE: usize = SSTABLE_HEADER_SIZE;

/// Fixed metadata fields preceding the bloom filter, index, and data areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub time_stamp: u64,
    pub pair_count: u64,
    pub min_key: i64,
    pub max_key: i64,
}

impl Header {
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_u64::<NativeEndian>(self.time_stamp)?;
        w.write_u64::<NativeEndian>(self.pair_count)?;
        w.write_i64::<NativeEndian>(self.min_key)?;
        w.write_i64::<NativeEndian>(self.max_key)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let time_stamp = r.read_u64::<NativeEndian>()?;
        let pair_count = r.read_u64::<NativeEndian>()?;
        let min_key = r.read_i64::<NativeEndian>()?;
        let max_key = r.read_i64::<NativeEndian>()?;
        Ok(Self {
            time_stamp,
            pair_count,
            min_key,
            max_key,
        })
    }
}

/// Reads the `pair_count`-entry index area (each `key: i64, offset: u32`)
/// into `(key, offset)` pairs in on-disk (ascending key) order.
pub fn read_index<R: Read>(r: &mut R, pair_count: u64) -> io::Result<Vec<(i64, u32)>> {
    let mut entries = Vec::with_capacity(pair_count as usize);
    for _ in 0..pair_count {
        let key = r.read_i64::<NativeEndian>()?;
        let offset = r.read_u32::<NativeEndian>()?;
        entries.push((key, offset));
    }
    Ok(entries)
}

/// Writes one index entry (`key: i64, offset: u32`).
pub fn write_index_entry<W: Write>(w: &mut W, key: i64, offset: u32) -> io::Result<()> {
    w.write_i64::<NativeEndian>(key)?;
    w.write_u32::<NativeEndian>(offset)?;
    Ok(())
}

/// Byte offset of the data area's first value, given `pair_count`:
/// `H + 12 * pair_count`.
#[must_use]
pub fn data_area_start(pair_count: u64) -> u64 {
    HEADER_SIZE as u64 + pair_count * INDEX_ENTRY_SIZE as u64
}

/// Size in bytes of the serialized bloom filter.
#[must_use]
pub fn bloom_filter_size() -> usize {
    BLOOM_FILTER_BYTES
}
