use super::*;

#[test]
fn new_rejects_zero_capacity() {
    let err = FixedSizeCache::<i64>::new(0, Box::new(LruPolicy::new())).unwrap_err();
    assert_eq!(err, CacheError::InvalidCapacity);
}

#[test]
fn get_missing_key_is_not_found() {
    let mut cache = FixedSizeCache::new(2, Box::new(LruPolicy::new())).unwrap();
    assert_eq!(cache.get(&1_i64).unwrap_err(), CacheError::NotFound);
}

#[test]
fn put_then_get_round_trips() {
    let mut cache = FixedSizeCache::new(2, Box::new(LruPolicy::new())).unwrap();
    cache.put(1_i64, b"a".to_vec());
    assert_eq!(cache.get(&1).unwrap(), b"a".to_vec());
    assert!(cache.cached(&1));
}

#[test]
fn remove_evicts_explicit_key() {
    let mut cache = FixedSizeCache::new(2, Box::new(LruPolicy::new())).unwrap();
    cache.put(1_i64, b"a".to_vec());
    assert!(cache.remove(&1));
    assert!(!cache.cached(&1));
    assert!(!cache.remove(&1));
}

// S7 — LRU: Put(1,10), Put(2,20), Get(1), Put(3,30) => 1 and 3 cached, 2 evicted.
#[test]
fn lru_evicts_least_recently_touched() {
    let mut cache = FixedSizeCache::new(2, Box::new(LruPolicy::new())).unwrap();
    cache.put(1_i64, b"10".to_vec());
    cache.put(2_i64, b"20".to_vec());
    let _ = cache.get(&1);
    cache.put(3_i64, b"30".to_vec());

    assert!(cache.cached(&1));
    assert!(!cache.cached(&2));
    assert!(cache.cached(&3));
}

// S7 — FIFO under the same trace: 1 (oldest inserted) is evicted, touches ignored.
#[test]
fn fifo_evicts_oldest_insertion_regardless_of_touches() {
    let mut cache = FixedSizeCache::new(2, Box::new(FifoPolicy::new())).unwrap();
    cache.put(1_i64, b"10".to_vec());
    cache.put(2_i64, b"20".to_vec());
    let _ = cache.get(&1);
    cache.put(3_i64, b"30".to_vec());

    assert!(!cache.cached(&1));
    assert!(cache.cached(&2));
    assert!(cache.cached(&3));
}

// S7 — LFU: Get(1) twice, Get(2) once, then Put(3,30) evicts 2 (lower frequency).
#[test]
fn lfu_evicts_least_frequently_touched() {
    let mut cache = FixedSizeCache::new(2, Box::new(LfuPolicy::new())).unwrap();
    cache.put(1_i64, b"10".to_vec());
    cache.put(2_i64, b"20".to_vec());
    let _ = cache.get(&1);
    let _ = cache.get(&1);
    let _ = cache.get(&2);
    cache.put(3_i64, b"30".to_vec());

    assert!(cache.cached(&1));
    assert!(!cache.cached(&2));
    assert!(cache.cached(&3));
}

#[test]
fn noop_policy_never_proactively_evicts_within_capacity() {
    let mut cache = FixedSizeCache::new(3, Box::new(NoOpPolicy::new())).unwrap();
    cache.put(1_i64, b"a".to_vec());
    cache.put(2_i64, b"b".to_vec());
    cache.put(3_i64, b"c".to_vec());
    assert!(cache.cached(&1));
    assert!(cache.cached(&2));
    assert!(cache.cached(&3));
}

#[test]
fn overwriting_existing_key_does_not_evict() {
    let mut cache = FixedSizeCache::new(2, Box::new(FifoPolicy::new())).unwrap();
    cache.put(1_i64, b"a".to_vec());
    cache.put(2_i64, b"b".to_vec());
    cache.put(1_i64, b"updated".to_vec());
    assert_eq!(cache.get(&1).unwrap(), b"updated".to_vec());
    assert!(cache.cached(&2));
    assert_eq!(cache.len(), 2);
}

#[test]
fn len_and_is_empty() {
    let mut cache = FixedSizeCache::new(2, Box::new(LruPolicy::new())).unwrap();
    assert!(cache.is_empty());
    cache.put(1_i64, b"a".to_vec());
    assert_eq!(cache.len(), 1);
    assert!(!cache.is_empty());
}
