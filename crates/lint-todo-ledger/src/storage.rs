//! The `.lint-todo` storage file.
//!
//! One JSON object per line, each an `add` or `remove` operation carrying a
//! full record. Live records are the fold of the operations in file order.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use lint_todo_domain::{LedgerError, todo_key};
use lint_todo_types::TodoRecord;

pub const STORAGE_FILE: &str = ".lint-todo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLine {
    pub op: Op,
    #[serde(flatten)]
    pub record: TodoRecord,
}

impl StorageLine {
    pub fn add(record: TodoRecord) -> Self {
        Self {
            op: Op::Add,
            record,
        }
    }

    pub fn remove(record: TodoRecord) -> Self {
        Self {
            op: Op::Remove,
            record,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn in_dir(base_dir: &Path) -> Self {
        Self {
            path: base_dir.join(STORAGE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// All operations in file order; a missing file reads as empty.
    pub fn read_lines(&self) -> Result<Vec<StorageLine>, LedgerError> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(&self.path).map_err(|source| LedgerError::Io {
            action: "read todo storage",
            path: self.path.clone(),
            source,
        })?;

        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|e| LedgerError::Corrupt {
                    path: self.path.clone(),
                    line: i + 1,
                    message: e.to_string(),
                })
            })
            .collect()
    }

    pub fn append(&self, lines: &[StorageLine]) -> Result<(), LedgerError> {
        if lines.is_empty() {
            return Ok(());
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error("open todo storage", source))?;
        file.write_all(encode(lines)?.as_bytes())
            .map_err(|source| self.io_error("write todo storage", source))
    }

    pub fn rewrite(&self, lines: &[StorageLine]) -> Result<(), LedgerError> {
        std::fs::write(&self.path, encode(lines)?)
            .map_err(|source| self.io_error("write todo storage", source))
    }

    fn io_error(&self, action: &'static str, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            action,
            path: self.path.clone(),
            source,
        }
    }
}

fn encode(lines: &[StorageLine]) -> Result<String, LedgerError> {
    let mut out = String::new();
    for line in lines {
        let json = serde_json::to_string(line).map_err(|e| LedgerError::Encode {
            message: e.to_string(),
        })?;
        out.push_str(&json);
        out.push('\n');
    }
    Ok(out)
}

/// Folds operations into the live record set, in first-added order.
///
/// Adding a record that is already live keeps the existing one.
pub fn live_records(lines: &[StorageLine]) -> Vec<TodoRecord> {
    LiveSet::fold(lines).records()
}

/// Live records keyed by [`todo_key`], remembering when each was added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveSet {
    next: u64,
    by_key: BTreeMap<String, (u64, TodoRecord)>,
}

impl LiveSet {
    pub fn fold<'a>(lines: impl IntoIterator<Item = &'a StorageLine>) -> Self {
        let mut live = Self::default();
        for line in lines {
            live.apply(line);
        }
        live
    }

    pub fn apply(&mut self, line: &StorageLine) {
        let key = todo_key(&line.record);
        match line.op {
            Op::Add => {
                if !self.by_key.contains_key(&key) {
                    // Only the persisted shape is kept.
                    let record = TodoRecord {
                        origin: None,
                        decay: None,
                        ..line.record.clone()
                    };
                    self.by_key.insert(key, (self.next, record));
                    self.next += 1;
                }
            }
            Op::Remove => {
                self.by_key.remove(&key);
            }
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Records in first-added order.
    pub fn records(&self) -> Vec<TodoRecord> {
        self.records_where(|_| true)
    }

    /// Records matching `keep`, in first-added order.
    pub fn records_where(&self, mut keep: impl FnMut(&TodoRecord) -> bool) -> Vec<TodoRecord> {
        let mut ordered: Vec<&(u64, TodoRecord)> =
            self.by_key.values().filter(|(_, r)| keep(r)).collect();
        ordered.sort_by_key(|(seq, _)| *seq);
        ordered.into_iter().map(|(_, record)| record.clone()).collect()
    }
}
