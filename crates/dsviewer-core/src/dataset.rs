use std::fmt;

use crate::record::Record;

/// Identifies one split of one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetRef {
    pub name: String,
    pub split: String,
}

impl DatasetRef {
    pub fn new(name: impl Into<String>, split: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            split: split.into(),
        }
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.split)
    }
}

/// A loaded split: an indexable collection of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub reference: DatasetRef,
    records: Vec<Record>,
    /// Number of rows the source reports, which may exceed `records.len()`
    /// when loading was capped.
    total_rows: usize,
}

impl Dataset {
    pub fn new(reference: DatasetRef, records: Vec<Record>) -> Self {
        let total_rows = records.len();
        Self {
            reference,
            records,
            total_rows,
        }
    }

    /// Mark the dataset as a truncated view of a larger split.
    pub fn with_total_rows(mut self, total_rows: usize) -> Self {
        self.total_rows = total_rows.max(self.records.len());
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Every record's `context`, joined with single spaces. Records without a
    /// context contribute nothing.
    pub fn joined_contexts(&self) -> String {
        self.records
            .iter()
            .filter_map(Record::context)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: serde_json::Value) -> Record {
        Record::from_value(v).unwrap()
    }

    #[test]
    fn joined_contexts_skips_missing() {
        let ds = Dataset::new(
            DatasetRef::new("d", "train"),
            vec![
                rec(json!({"context": "one"})),
                rec(json!({"question": "no context"})),
                rec(json!({"context": "two"})),
            ],
        );
        assert_eq!(ds.joined_contexts(), "one two");
    }

    #[test]
    fn total_rows_never_below_len() {
        let ds = Dataset::new(
            DatasetRef::new("d", "train"),
            vec![rec(json!({})), rec(json!({}))],
        );
        assert_eq!(ds.total_rows(), 2);
        let ds = ds.with_total_rows(10);
        assert_eq!(ds.total_rows(), 10);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.with_total_rows(1).total_rows(), 2);
    }

    #[test]
    fn display_ref() {
        assert_eq!(DatasetRef::new("squad", "train").to_string(), "squad[train]");
    }
}
