//! The cross-table merge primitive used by major compaction.
//!
//! Given `sources` — one fully-materialized `key -> value` mapping per input
//! table, ordered **ascending by timestamp** (so the last element is the
//! newest) — produces the merged, deduplicated run in ascending key order.
//! On a key collision across sources, the newest source (highest index)
//! wins, matching the spec's "newer timestamp wins" rule.
//!
//! This is driven by a min-heap of `(key, source_index)` candidates, one per
//! source at a time: pop every entry sharing the smallest key, keep only the
//! one from the highest-indexed source, advance every popped source's
//! cursor past that key, and push each source's next candidate back onto the
//! heap. This reaches the same externally observable result as the spec's
//! frontier/displacement bookkeeping (same tie-break rule, same output
//! order) with a simpler implementation.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

/// Merges `sources` (ascending-timestamp order; later index = newer) into a
/// single ascending-key run with newest-wins deduplication.
#[must_use]
pub fn merge_sources(sources: &[BTreeMap<i64, Vec<u8>>]) -> Vec<(i64, Vec<u8>)> {
    let mut cursors: Vec<_> = sources.iter().map(|m| m.iter().peekable()).collect();
    let mut heap: BinaryHeap<Reverse<(i64, usize)>> = BinaryHeap::new();

    for (idx, cursor) in cursors.iter_mut().enumerate() {
        if let Some((&key, _)) = cursor.peek() {
            heap.push(Reverse((key, idx)));
        }
    }

    let mut out = Vec::new();
    while let Some(&Reverse((key, _))) = heap.peek() {
        // Every source currently parked at `key` has exactly one entry in
        // the heap (its current peek); drain them all before deciding a
        // winner and advancing.
        let mut contributors = Vec::new();
        while let Some(&Reverse((k, idx))) = heap.peek() {
            if k != key {
                break;
            }
            heap.pop();
            contributors.push(idx);
        }

        let winner = *contributors.iter().max().unwrap();
        for idx in contributors {
            cursors[idx].next();
            if let Some((&next_key, _)) = cursors[idx].peek() {
                heap.push(Reverse((next_key, idx)));
            }
        }

        out.push((key, sources[winner][&key].clone()));
    }

    out
}

#[cfg(test)]
#[path = "tests/merge_tests.rs"]
mod merge_tests;
