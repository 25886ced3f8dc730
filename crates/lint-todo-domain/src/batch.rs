//! Identity-deduplicated sets of todo records.

use std::collections::BTreeMap;

use lint_todo_types::TodoRecord;

use crate::fingerprint::todo_key;

/// An insertion-ordered set of records keyed by [`todo_key`].
///
/// Inserting a record whose identity is already present keeps the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoBatch {
    records: Vec<TodoRecord>,
    index: BTreeMap<String, usize>,
}

impl TodoBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when an equivalent record was already present.
    pub fn insert(&mut self, record: TodoRecord) -> bool {
        let key = todo_key(&record);
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.records.len());
        self.records.push(record);
        true
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&TodoRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TodoRecord> {
        self.records.iter()
    }

    /// Set union; records already present in `self` win.
    pub fn union(mut self, other: &TodoBatch) -> TodoBatch {
        for record in other {
            self.insert(record.clone());
        }
        self
    }
}

impl FromIterator<TodoRecord> for TodoBatch {
    fn from_iter<I: IntoIterator<Item = TodoRecord>>(iter: I) -> Self {
        let mut batch = TodoBatch::new();
        for record in iter {
            batch.insert(record);
        }
        batch
    }
}

impl IntoIterator for TodoBatch {
    type Item = TodoRecord;
    type IntoIter = std::vec::IntoIter<TodoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a TodoBatch {
    type Item = &'a TodoRecord;
    type IntoIter = std::slice::Iter<'a, TodoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// The ledger's classification of one file's candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoBatches {
    /// Persisted records no live error reproduces any more.
    pub remove: TodoBatch,
    /// Persisted records still reproduced; carry the candidate's origin.
    pub stable: TodoBatch,
    /// Reproduced records whose error date has passed.
    pub expired: TodoBatch,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lint_todo_types::Range;

    fn record(rule: &str, line: u32) -> TodoRecord {
        TodoRecord {
            engine: "stylelint".to_string(),
            file_path: "a.css".to_string(),
            rule_id: rule.to_string(),
            range: Range::normalized(line, 1, None, None),
            source: String::new(),
            created_date: None,
            warn_date: None,
            error_date: None,
            origin: Some(line as usize),
            decay: None,
        }
    }

    #[test]
    fn insert_deduplicates_by_identity_keeping_first() {
        let mut batch = TodoBatch::new();
        assert!(batch.insert(record("a", 1)));

        let mut twin = record("a", 1);
        twin.origin = Some(42);
        assert!(!batch.insert(twin));

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.iter().next().and_then(|r| r.origin), Some(1));
    }

    #[test]
    fn preserves_insertion_order() {
        let batch: TodoBatch = vec![record("b", 2), record("a", 1), record("c", 3)]
            .into_iter()
            .collect();
        let rules: Vec<_> = batch.iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(rules, vec!["b", "a", "c"]);
    }

    #[test]
    fn union_keeps_left_side() {
        let left: TodoBatch = vec![record("a", 1)].into_iter().collect();
        let mut dup = record("a", 1);
        dup.origin = None;
        let right: TodoBatch = vec![dup, record("b", 2)].into_iter().collect();

        let merged = left.union(&right);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.iter().next().and_then(|r| r.origin), Some(1));
    }
}
