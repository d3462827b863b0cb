use super::*;
use config::{BLOOM_FILTER_BITS, BLOOM_FILTER_BYTES};

#[test]
fn new_filter_is_fixed_width_and_empty() {
    let bf = BloomFilter::new();
    assert_eq!(bf.as_bytes().len(), BLOOM_FILTER_BYTES);
    for key in [0_i64, 1, -1, i64::MIN, i64::MAX] {
        // an empty filter must never claim to contain anything
        assert!(!bf.may_contain_key(key) || bf.as_bytes().iter().all(|&b| b == 0));
    }
}

#[test]
fn inserted_key_is_always_reported_present() {
    let mut bf = BloomFilter::new();
    let keys = [0_i64, 1, -1, 42, -42, i64::MIN, i64::MAX, 123_456_789];
    for &k in &keys {
        bf.insert_key(k);
    }
    for &k in &keys {
        assert!(bf.may_contain_key(k), "key {k} should be present");
    }
}

#[test]
fn absent_keys_are_usually_reported_absent() {
    let mut bf = BloomFilter::new();
    for k in 0..200_i64 {
        bf.insert_key(k * 2);
    }
    // odd keys were never inserted; with 81920 bits and 200 entries the
    // false-positive rate is negligible, so almost none should pass.
    let false_positives = (0..200_i64)
        .map(|k| k * 2 + 1)
        .filter(|&k| bf.may_contain_key(k))
        .count();
    assert!(false_positives < 10, "unexpectedly high false-positive rate: {false_positives}");
}

#[test]
fn round_trips_through_bytes() {
    let mut bf = BloomFilter::new();
    for k in [1_i64, 2, 3, 100, -100] {
        bf.insert_key(k);
    }
    let bytes = bf.as_bytes().to_vec();
    let restored = BloomFilter::from_bytes(bytes);
    for k in [1_i64, 2, 3, 100, -100] {
        assert!(restored.may_contain_key(k));
    }
}

#[test]
fn hash_positions_are_within_range() {
    for key in [0_i64, 1, -1, i64::MIN, i64::MAX, 999_999] {
        for bit in hash_positions(key) {
            assert!(bit < BLOOM_FILTER_BITS);
        }
    }
}

#[test]
fn murmurhash3_is_deterministic() {
    let a = murmurhash3_x64_128(b"hello world", 1);
    let b = murmurhash3_x64_128(b"hello world", 1);
    assert_eq!(a, b);
}

#[test]
fn murmurhash3_differs_by_seed() {
    let a = murmurhash3_x64_128(b"hello world", 1);
    let b = murmurhash3_x64_128(b"hello world", 2);
    assert_ne!(a, b);
}

#[test]
fn murmurhash3_empty_input() {
    // must not panic on a zero-length tail
    let _ = murmurhash3_x64_128(b"", 1);
}

#[test]
fn murmurhash3_handles_all_tail_lengths() {
    let base = b"0123456789abcdef0123456789abcdef";
    for len in 0..=base.len() {
        let _ = murmurhash3_x64_128(&base[..len], 1);
    }
}
