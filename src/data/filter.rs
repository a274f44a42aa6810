use serde::Serialize;

use super::model::Record;
use super::schema::Column;

// ---------------------------------------------------------------------------
// Allow-list: which category values a category-scoped aggregation keeps
// ---------------------------------------------------------------------------

/// Category selection for a column. `Any` keeps every present value;
/// `Only` keeps the listed values, in the listed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowList {
    Any,
    Only(Vec<String>),
}

impl AllowList {
    pub fn only<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AllowList::Only(labels.into_iter().map(Into::into).collect())
    }

    /// Whether a present value passes. Comparison is exact.
    pub fn allows(&self, value: &str) -> bool {
        match self {
            AllowList::Any => true,
            AllowList::Only(labels) => labels.iter().any(|l| l == value),
        }
    }

    /// The explicit labels, if any.
    pub fn labels(&self) -> Option<&[String]> {
        match self {
            AllowList::Any => None,
            AllowList::Only(labels) => Some(labels),
        }
    }
}

/// Return indices of records whose `column` value is present and allowed.
///
/// A record passes when:
/// * the value is missing → fails
/// * the allow-list is `Any` → passes
/// * the value is in the explicit list → passes
pub fn filtered_indices(records: &[Record], column: Column, allow: &AllowList) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.value(column).is_some_and(|v| allow.allows(v)))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Partition;

    fn rec(gene_type: Option<&str>) -> Record {
        Record {
            gene_type: gene_type.map(str::to_string),
            ..Record::empty(Partition::Train)
        }
    }

    #[test]
    fn only_keeps_listed_values() {
        let rows = vec![rec(Some("PSEUDO")), rec(Some("weird")), rec(None), rec(Some("tRNA"))];
        let allow = AllowList::only(["PSEUDO", "tRNA"]);
        assert_eq!(filtered_indices(&rows, Column::GeneType, &allow), vec![0, 3]);
    }

    #[test]
    fn any_still_drops_missing() {
        let rows = vec![rec(Some("PSEUDO")), rec(None)];
        assert_eq!(filtered_indices(&rows, Column::GeneType, &AllowList::Any), vec![0]);
    }

    #[test]
    fn comparison_is_case_sensitive() {
        assert!(!AllowList::only(["ncRNA"]).allows("NCRNA"));
    }
}
