use crate::*;
use memtable::Memtable;
use tempfile::tempdir;

#[test]
fn writes_readable_round_trip_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("SSTable1.sst");

    let entries = vec![
        (1_i64, b"a".to_vec()),
        (2, b"bb".to_vec()),
        (5, b"ccccc".to_vec()),
    ];
    SSTableWriter::write(&path, 1, &entries).unwrap();

    let reader = SSTableReader::open(&path).unwrap();
    assert_eq!(reader.time_stamp(), 1);
    assert_eq!(reader.pair_count(), 3);
    assert_eq!(reader.min_key(), 1);
    assert_eq!(reader.max_key(), 5);
    assert_eq!(reader.get_value(1).unwrap(), Some(b"a".to_vec()));
    assert_eq!(reader.get_value(2).unwrap(), Some(b"bb".to_vec()));
    assert_eq!(reader.get_value(5).unwrap(), Some(b"ccccc".to_vec()));
    assert_eq!(reader.get_value(3).unwrap(), None);
}

#[test]
fn writes_memtable_directly() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("SSTable1.sst");

    let mut mem = Memtable::new();
    mem.put(10, b"ten".to_vec());
    mem.put(-5, b"neg".to_vec());
    mem.put(0, config::TOMBSTONE.to_vec());

    SSTableWriter::write_memtable(&path, 7, &mem).unwrap();

    let reader = SSTableReader::open(&path).unwrap();
    assert_eq!(reader.pair_count(), 3);
    assert_eq!(reader.get_value(10).unwrap(), Some(b"ten".to_vec()));
    assert_eq!(reader.get_value(-5).unwrap(), Some(b"neg".to_vec()));
    assert_eq!(reader.get_value(0).unwrap(), Some(config::TOMBSTONE.to_vec()));
}

#[test]
fn single_byte_and_empty_values_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("SSTable1.sst");
    let entries = vec![(1_i64, Vec::new()), (2, vec![b'x'])];
    SSTableWriter::write(&path, 1, &entries).unwrap();

    let reader = SSTableReader::open(&path).unwrap();
    assert_eq!(reader.get_value(1).unwrap(), Some(Vec::new()));
    assert_eq!(reader.get_value(2).unwrap(), Some(vec![b'x']));
}

#[test]
fn header_size_matches_spec_constant() {
    assert_eq!(HEADER_SIZE, config::SSTABLE_HEADER_SIZE);
}

#[test]
fn data_area_start_accounts_for_index() {
    assert_eq!(data_area_start(0), HEADER_SIZE as u64);
    assert_eq!(data_area_start(10), HEADER_SIZE as u64 + 120);
}

#[test]
fn single_entry_min_equals_max() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("SSTable1.sst");
    SSTableWriter::write(&path, 1, &[(42_i64, b"v".to_vec())]).unwrap();
    let reader = SSTableReader::open(&path).unwrap();
    assert_eq!(reader.min_key(), 42);
    assert_eq!(reader.max_key(), 42);
}
