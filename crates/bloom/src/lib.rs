//! # Bloom
//!
//! MurmurHash3 x64-128 plus a fixed-width (81920-bit) bloom filter, used by
//! every SSTable to short-circuit point lookups for keys it definitely does
//! not contain.
//!
//! ## Usage in RiptideKV
//!
//! Each SSTable embeds one [`BloomFilter`] built from the four 32-bit words
//! of `MurmurHash3_x64_128(key_bytes, seed=1)`, each reduced modulo
//! [`config::BLOOM_FILTER_BITS`] to a bit position. A lookup that finds any
//! of its four bits unset can skip the SSTable's index and data entirely;
//! false positives are expected and harmless (the index lookup that follows
//! is authoritative).
//!
//! ## Example
//!
//! ```rust
//! use bloom::BloomFilter;
//!
//! let mut bf = BloomFilter::new();
//! bf.insert_key(42);
//! assert!(bf.may_contain_key(42));
//! ```

use config::{BLOOM_FILTER_BITS, BLOOM_FILTER_BYTES, BLOOM_HASH_SEED};

/// A fixed-size (81920-bit / 10240-byte) bloom filter with four hash
/// positions per key, matching the on-disk SSTable layout exactly.
///
/// Unlike a general-purpose bloom filter sized from an expected item count
/// and a target false-positive rate, this filter's width is fixed by the
/// file format — every SSTable carries the same 10 KiB filter regardless of
/// how many keys it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    bits: Vec<u8>,
}

impl BloomFilter {
    /// Creates an empty filter of the fixed width.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bits: vec![0u8; BLOOM_FILTER_BYTES],
        }
    }

    /// Rebuilds a filter from its serialized bytes (read from an SSTable
    /// header). `bytes.len()` must equal [`BLOOM_FILTER_BYTES`].
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        debug_assert_eq!(bytes.len(), BLOOM_FILTER_BYTES);
        Self { bits: bytes }
    }

    /// Returns the raw bit vector for serialization into an SSTable header.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Sets this key's four bit positions.
    pub fn insert_key(&mut self, key: i64) {
        for bit in hash_positions(key) {
            self.set_bit(bit);
        }
    }

    /// Returns `false` if `key` is definitely absent (at least one of its
    /// four bits is unset); `true` means "maybe present".
    #[must_use]
    pub fn may_contain_key(&self, key: i64) -> bool {
        hash_positions(key).into_iter().all(|bit| self.get_bit(bit))
    }

    fn set_bit(&mut self, idx: usize) {
        self.bits[idx / 8] |= 1 << (idx % 8);
    }

    fn get_bit(&self, idx: usize) -> bool {
        (self.bits[idx / 8] >> (idx % 8)) & 1 == 1
    }
}

impl Default for BloomFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the four bloom-filter bit positions for `key`.
///
/// The reference implementation hashes the raw in-memory `int64_t` byte
/// pattern (host-endian, 8 bytes) with `MurmurHash3_x64_128(&key, 8, seed=1)`
/// and takes each of the resulting four 32-bit words modulo 81920. We hash
/// the big-endian byte pattern instead of host-endian so the bit positions
/// (and therefore the on-disk filter, and test vectors derived from it) do
/// not depend on the build host's endianness.
fn hash_positions(key: i64) -> [usize; 4] {
    let bytes = key.to_be_bytes();
    let words = murmurhash3_x64_128(&bytes, BLOOM_HASH_SEED);
    words.map(|w| (w as usize) % BLOOM_FILTER_BITS)
}

/// MurmurHash3 x64-128, returned as four 32-bit words (matching the
/// reference C++ `unsigned int hash[4]` output layout) rather than the more
/// common two-`u64` layout, so bit-position derivation lines up exactly with
/// the original algorithm.
///
/// Public domain algorithm by Austin Appleby
/// (<https://github.com/aappleby/smhasher>), transcribed directly rather than
/// reimplemented from a description, since the bit layout must match exactly
/// for bloom-filter interop with any other implementation of this format.
#[must_use]
pub fn murmurhash3_x64_128(data: &[u8], seed: u32) -> [u32; 4] {
    let len = data.len();
    let n_blocks = len / 16;

    let c1: u64 = 0x87c3_7b91_1142_53d5;
    let c2: u64 = 0x4cf5_ad43_2745_937f;

    let mut h1: u64 = seed as u64;
    let mut h2: u64 = seed as u64;

    for i in 0..n_blocks {
        let block = &data[i * 16..i * 16 + 16];
        let mut k1 = u64::from_le_bytes(block[0..8].try_into().unwrap());
        let mut k2 = u64::from_le_bytes(block[8..16].try_into().unwrap());

        k1 = k1.wrapping_mul(c1);
        k1 = k1.rotate_left(31);
        k1 = k1.wrapping_mul(c2);
        h1 ^= k1;

        h1 = h1.rotate_left(27);
        h1 = h1.wrapping_add(h2);
        h1 = h1.wrapping_mul(5).wrapping_add(0x52dc_e729);

        k2 = k2.wrapping_mul(c2);
        k2 = k2.rotate_left(33);
        k2 = k2.wrapping_mul(c1);
        h2 ^= k2;

        h2 = h2.rotate_left(31);
        h2 = h2.wrapping_add(h1);
        h2 = h2.wrapping_mul(5).wrapping_add(0x3849_5ab5);
    }

    let tail = &data[n_blocks * 16..];
    let mut k1: u64 = 0;
    let mut k2: u64 = 0;

    if tail.len() > 8 {
        for (i, &b) in tail[8..].iter().enumerate().rev() {
            k2 ^= (b as u64) << (8 * i);
        }
        k2 = k2.wrapping_mul(c2);
        k2 = k2.rotate_left(33);
        k2 = k2.wrapping_mul(c1);
        h2 ^= k2;
    }
    if !tail.is_empty() {
        let head_len = tail.len().min(8);
        for (i, &b) in tail[..head_len].iter().enumerate().rev() {
            k1 ^= (b as u64) << (8 * i);
        }
        k1 = k1.wrapping_mul(c1);
        k1 = k1.rotate_left(31);
        k1 = k1.wrapping_mul(c2);
        h1 ^= k1;
    }

    h1 ^= len as u64;
    h2 ^= len as u64;

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    h1 = fmix64(h1);
    h2 = fmix64(h2);

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    [
        (h1 & 0xffff_ffff) as u32,
        (h1 >> 32) as u32,
        (h2 & 0xffff_ffff) as u32,
        (h2 >> 32) as u32,
    ]
}

/// MurmurHash3's 64-bit finalization mix (avalanches all bits).
fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

#[cfg(test)]
mod tests;
