use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::data::model::{Partition, Record};
use crate::data::schema::Column;

/// Key values shared by two partitions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionOverlap {
    pub first: Partition,
    pub second: Partition,
    /// Distinct values present in both.
    pub shared: usize,
    pub first_distinct: usize,
    pub second_distinct: usize,
}

impl PartitionOverlap {
    /// Share of the second partition's distinct values already present in the
    /// first one; 0 when the second has none.
    pub fn second_leak_fraction(&self) -> f64 {
        if self.second_distinct == 0 {
            0.0
        } else {
            self.shared as f64 / self.second_distinct as f64
        }
    }

    pub fn label(&self) -> String {
        format!("{}∩{}", self.first.title(), self.second.title())
    }
}

/// Distinct non-missing values of `key` within one partition.
pub fn distinct_values(table: &[Record], key: Column, partition: Partition) -> HashSet<&str> {
    table
        .iter()
        .filter(|r| r.partition == partition)
        .filter_map(|r| r.value(key))
        .collect()
}

/// Number of distinct `key` values present in both partitions. Values are
/// compared exactly, without trimming or case folding. For `a == b` this is
/// the distinct count of `a`.
pub fn overlap_between(table: &[Record], key: Column, a: Partition, b: Partition) -> usize {
    let left = distinct_values(table, key, a);
    if a == b {
        return left.len();
    }
    let right = distinct_values(table, key, b);
    left.intersection(&right).count()
}

/// Overlap for every unordered pair of partitions present in `table`, in
/// train/test, train/validation, test/validation order.
pub fn partition_overlap(table: &[Record], key: Column) -> Vec<PartitionOverlap> {
    let sets: Vec<(Partition, HashSet<&str>)> = Partition::ALL
        .into_iter()
        .filter(|p| table.iter().any(|r| r.partition == *p))
        .map(|p| (p, distinct_values(table, key, p)))
        .collect();

    let mut pairs = Vec::new();
    for (i, (first, first_set)) in sets.iter().enumerate() {
        for (second, second_set) in &sets[i + 1..] {
            pairs.push(PartitionOverlap {
                first: *first,
                second: *second,
                shared: first_set.intersection(second_set).count(),
                first_distinct: first_set.len(),
                second_distinct: second_set.len(),
            });
        }
    }
    pairs
}

/// Distinct `key` values found in more than one partition.
pub fn leaked_values(table: &[Record], key: Column) -> usize {
    let mut seen: HashMap<&str, Partition> = HashMap::new();
    let mut leaked: HashSet<&str> = HashSet::new();
    for record in table {
        let Some(value) = record.value(key) else {
            continue;
        };
        match seen.get(value) {
            Some(&p) if p != record.partition => {
                leaked.insert(value);
            }
            Some(_) => {}
            None => {
                seen.insert(value, record.partition);
            }
        }
    }
    leaked.len()
}
