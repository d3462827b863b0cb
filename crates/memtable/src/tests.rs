use super::*;
use config::SSTABLE_HEADER_SIZE;

#[test]
fn put_and_get_single_key() {
    let mut m = Memtable::new();
    m.put(1, b"v1".to_vec());
    assert_eq!(m.len(), 1);
    assert_eq!(m.get(1), Some(b"v1".as_slice()));
}

#[test]
fn get_missing_key_returns_none() {
    let m = Memtable::new();
    assert_eq!(m.get(42), None);
}

#[test]
fn put_overwrites_existing_key() {
    let mut m = Memtable::new();
    m.put(7, b"a".to_vec());
    m.put(7, b"bbbb".to_vec());
    assert_eq!(m.get(7), Some(b"bbbb".as_slice()));
    assert_eq!(m.len(), 1);
}

#[test]
fn iter_yields_ascending_key_order() {
    let mut m = Memtable::new();
    for k in [5, 1, 9, -3, 0, 2] {
        m.put(k, format!("v{k}").into_bytes());
    }
    let keys: Vec<i64> = m.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec![-3, 0, 1, 2, 5, 9]);
}

#[test]
fn min_max_key_track_inserted_range() {
    let mut m = Memtable::new();
    assert_eq!(m.min_key(), None);
    assert_eq!(m.max_key(), None);
    m.put(10, b"x".to_vec());
    m.put(-5, b"y".to_vec());
    m.put(3, b"z".to_vec());
    assert_eq!(m.min_key(), Some(-5));
    assert_eq!(m.max_key(), Some(10));
}

#[test]
fn approx_size_starts_at_header_size() {
    let m = Memtable::new();
    assert_eq!(m.approx_size(), SSTABLE_HEADER_SIZE);
}

#[test]
fn approx_size_grows_by_value_len_plus_overhead_on_insert() {
    let mut m = Memtable::new();
    m.put(1, b"hello".to_vec());
    assert_eq!(m.approx_size(), SSTABLE_HEADER_SIZE + 5 + 1 + 12);
}

#[test]
fn approx_size_adjusts_by_delta_on_overwrite() {
    let mut m = Memtable::new();
    m.put(1, b"ab".to_vec());
    let after_insert = m.approx_size();
    m.put(1, b"abcdef".to_vec());
    assert_eq!(m.approx_size(), after_insert + 4);
    m.put(1, b"a".to_vec());
    assert_eq!(m.approx_size(), after_insert - 5);
}

#[test]
fn contains_key_reflects_presence() {
    let mut m = Memtable::new();
    assert!(!m.contains_key(1));
    m.put(1, b"v".to_vec());
    assert!(m.contains_key(1));
}

#[test]
fn is_empty_and_len_track_distinct_keys() {
    let mut m = Memtable::new();
    assert!(m.is_empty());
    m.put(1, b"a".to_vec());
    m.put(1, b"b".to_vec());
    m.put(2, b"c".to_vec());
    assert!(!m.is_empty());
    assert_eq!(m.len(), 2);
}

#[test]
fn handles_many_insertions_across_levels() {
    let mut m = Memtable::new();
    for k in 0..2000_i64 {
        m.put(k, vec![b's'; (k as usize % 16) + 1]);
    }
    assert_eq!(m.len(), 2000);
    for k in 0..2000_i64 {
        assert_eq!(m.get(k), Some(vec![b's'; (k as usize % 16) + 1].as_slice()));
    }
    let keys: Vec<i64> = m.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, (0..2000_i64).collect::<Vec<_>>());
}

#[test]
fn tombstone_value_is_stored_like_any_other_value() {
    let mut m = Memtable::new();
    m.put(5, config::TOMBSTONE.to_vec());
    assert_eq!(m.get(5), Some(config::TOMBSTONE));
}

#[test]
fn negative_and_extreme_keys() {
    let mut m = Memtable::new();
    m.put(i64::MIN, b"min".to_vec());
    m.put(i64::MAX, b"max".to_vec());
    m.put(0, b"zero".to_vec());
    assert_eq!(m.get(i64::MIN), Some(b"min".as_slice()));
    assert_eq!(m.get(i64::MAX), Some(b"max".as_slice()));
    assert_eq!(m.get(0), Some(b"zero".as_slice()));
}
