use serde::Serialize;

use super::Tally;
use crate::data::filter::AllowList;
use crate::data::model::Record;
use crate::data::schema::Column;

/// What a percentage is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Denominator {
    /// Every row passed in, including rows with missing or non-allowed values.
    AllRows,
    /// Only rows whose value passed the allow-list.
    AllowListed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

/// Counts per category value, most frequent first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub denominator: Denominator,
    /// Number of rows the percentages are relative to.
    pub total: usize,
    pub entries: Vec<CategoryCount>,
}

impl Distribution {
    pub(crate) fn from_labels<'a, I>(
        rows: usize,
        labels: I,
        allow: &AllowList,
        denominator: Denominator,
    ) -> Distribution
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut tally = Tally::default();
        for label in labels {
            if allow.allows(label) {
                tally.add(label);
            }
        }

        let total = match denominator {
            Denominator::AllRows => rows,
            Denominator::AllowListed => tally.total(),
        };
        if total == 0 {
            return Distribution {
                denominator,
                total,
                entries: Vec::new(),
            };
        }

        let entries = tally
            .into_sorted()
            .into_iter()
            .map(|(label, count)| CategoryCount {
                label: label.to_string(),
                count,
                percent: count as f64 / total as f64 * 100.0,
            })
            .collect();

        Distribution {
            denominator,
            total,
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn most_common(&self) -> Option<&CategoryCount> {
        self.entries.first()
    }

    /// At most `n` leading entries.
    pub fn top(&self, n: usize) -> &[CategoryCount] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn count(&self, label: &str) -> usize {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.count)
            .unwrap_or(0)
    }

    /// Sum of listed counts.
    pub fn counted(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn percent_sum(&self) -> f64 {
        self.entries.iter().map(|e| e.percent).sum()
    }

    /// Largest count divided by each entry's count, in entry order.
    pub fn imbalance_ratios(&self) -> Vec<(String, f64)> {
        let Some(max) = self.most_common().map(|e| e.count as f64) else {
            return Vec::new();
        };
        self.entries
            .iter()
            .map(|e| (e.label.clone(), max / e.count as f64))
            .collect()
    }
}

/// Count and percentage of each allowed value of `column`.
///
/// Missing values are never a category. With `Denominator::AllRows` the
/// percentages are relative to `table.len()`; with `AllowListed` they are
/// relative to the rows that were counted.
pub fn category_distribution(
    table: &[Record],
    column: Column,
    allow: &AllowList,
    denominator: Denominator,
) -> Distribution {
    Distribution::from_labels(
        table.len(),
        table.iter().filter_map(|r| r.value(column)),
        allow,
        denominator,
    )
}
