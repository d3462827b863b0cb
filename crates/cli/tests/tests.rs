#[cfg(test)]
mod load_test {
    use memtable::Memtable;

    #[test]
    fn write_load_test() {
        let mut mem = Memtable::new();

        for i in 0..1_000_000i64 {
            let key = i % 10_000;
            let val = vec![b'x'; 100];
            mem.put(key, val);
        }

        assert!(mem.len() <= 10_000);
    }

    #[test]
    fn delete_heavy_workload() {
        let mut mem = Memtable::new();

        for _ in 0..100_000 {
            mem.put(0, b"v".to_vec());
            mem.put(0, config::TOMBSTONE.to_vec());
        }

        assert_eq!(mem.get(0), Some(config::TOMBSTONE));
        assert_eq!(mem.len(), 1);
    }
}
