use crate::*;
use tempfile::tempdir;

fn write_sample(path: &std::path::Path) {
    let entries = vec![
        (-10_i64, b"neg ten".to_vec()),
        (0, b"zero".to_vec()),
        (5, b"five".to_vec()),
        (100, b"one hundred".to_vec()),
    ];
    SSTableWriter::write(path, 3, &entries).unwrap();
}

#[test]
fn get_value_out_of_range_returns_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("SSTable1.sst");
    write_sample(&path);
    let reader = SSTableReader::open(&path).unwrap();
    assert_eq!(reader.get_value(-11).unwrap(), None);
    assert_eq!(reader.get_value(101).unwrap(), None);
}

#[test]
fn get_value_in_range_but_absent_returns_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("SSTable1.sst");
    write_sample(&path);
    let reader = SSTableReader::open(&path).unwrap();
    assert_eq!(reader.get_value(1).unwrap(), None);
}

#[test]
fn get_value_present_returns_value() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("SSTable1.sst");
    write_sample(&path);
    let reader = SSTableReader::open(&path).unwrap();
    assert_eq!(reader.get_value(0).unwrap(), Some(b"zero".to_vec()));
    assert_eq!(reader.get_value(100).unwrap(), Some(b"one hundred".to_vec()));
}

#[test]
fn traverse_recovers_all_pairs_in_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("SSTable1.sst");
    write_sample(&path);
    let reader = SSTableReader::open(&path).unwrap();
    let all = reader.traverse().unwrap();
    let keys: Vec<i64> = all.keys().copied().collect();
    assert_eq!(keys, vec![-10, 0, 5, 100]);
    assert_eq!(all[&-10], b"neg ten".to_vec());
    assert_eq!(all[&100], b"one hundred".to_vec());
}

#[test]
fn overlaps_matches_key_range() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("SSTable1.sst");
    write_sample(&path);
    let reader = SSTableReader::open(&path).unwrap();
    assert!(reader.overlaps(-20, -10));
    assert!(reader.overlaps(50, 200));
    assert!(!reader.overlaps(200, 300));
    assert!(!reader.overlaps(-100, -11));
}

#[test]
fn ordering_is_timestamp_then_min_key() {
    let dir = tempdir().unwrap();
    let p1 = dir.path().join("SSTable1.sst");
    let p2 = dir.path().join("SSTable2.sst");
    let p3 = dir.path().join("SSTable3.sst");
    SSTableWriter::write(&p1, 5, &[(10_i64, b"a".to_vec())]).unwrap();
    SSTableWriter::write(&p2, 5, &[(1_i64, b"b".to_vec())]).unwrap();
    SSTableWriter::write(&p3, 2, &[(50_i64, b"c".to_vec())]).unwrap();

    let r1 = SSTableReader::open(&p1).unwrap();
    let r2 = SSTableReader::open(&p2).unwrap();
    let r3 = SSTableReader::open(&p3).unwrap();

    // r3 has the oldest timestamp, so it sorts first regardless of key range.
    assert!(r3 < r1);
    assert!(r3 < r2);
    // r1 and r2 share timestamp 5; min_key breaks the tie.
    assert!(r2 < r1);
}

#[test]
fn bloom_filter_never_false_negatives_for_contained_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("SSTable1.sst");
    let entries: Vec<(i64, Vec<u8>)> = (0..500).map(|k| (k, vec![b'v'])).collect();
    SSTableWriter::write(&path, 1, &entries).unwrap();
    let reader = SSTableReader::open(&path).unwrap();
    for k in 0..500 {
        assert_eq!(reader.get_value(k).unwrap(), Some(vec![b'v']));
    }
}
