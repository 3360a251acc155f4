//! Frequency/ranking reducer: count derived keys and order by descending count.

use crate::key_extractor::StatKey;
use crate::record::Record;
use ahash::AHashMap;

/// Count every key `key` extracts from `records`.
/// Sorted by descending count; ties keep first-encounter order.
pub fn rank(records: &[Record], key: &StatKey) -> Vec<(String, u64)> {
    let mut index: AHashMap<String, usize> = AHashMap::new();
    let mut counts: Vec<(String, u64)> = Vec::new();
    for rec in records {
        for k in key.keys(rec) {
            match index.get(&k) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(k.clone(), counts.len());
                    counts.push((k, 1));
                }
            }
        }
    }
    // stable
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

