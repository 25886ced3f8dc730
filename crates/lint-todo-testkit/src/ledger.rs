//! In-memory ledger with scriptable configuration, severities and expiry.

use std::collections::{BTreeMap, BTreeSet};

use lint_todo_domain::{
    CODE_TODO, ConfigValidation, LedgerError, TodoBatch, TodoBatches, TodoLedger, WriteSummary,
    WriteTodoOptions, todo_key,
};
use lint_todo_types::{DaysToDecay, TodoConfig, TodoRecord};

/// Every trait call is appended to [`MemoryLedger::calls`].
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    pub records: Vec<TodoRecord>,
    pub validation: ConfigValidation,
    pub todo_config: TodoConfig,
    /// Severity code returned per rule id; unlisted rules are todos.
    pub severity_by_rule: BTreeMap<String, i32>,
    /// Rule ids whose matched records are reported as expired.
    pub expired_rules: BTreeSet<String>,
    /// Storage is reported as present once anything was written, or when set.
    pub storage: bool,
    pub calls: Vec<&'static str>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            validation: ConfigValidation::valid(),
            todo_config: TodoConfig::default(),
            severity_by_rule: BTreeMap::new(),
            expired_rules: BTreeSet::new(),
            storage: false,
            calls: Vec::new(),
        }
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger whose storage already holds `records`.
    pub fn with_records(records: impl IntoIterator<Item = TodoRecord>) -> Self {
        Self {
            records: records.into_iter().collect(),
            storage: true,
            ..Self::default()
        }
    }

    pub fn invalid(message: &str) -> Self {
        Self {
            validation: ConfigValidation::invalid(message),
            ..Self::default()
        }
    }

    pub fn severity(mut self, rule: &str, code: i32) -> Self {
        self.severity_by_rule.insert(rule.to_string(), code);
        self
    }

    pub fn expire(mut self, rule: &str) -> Self {
        self.expired_rules.insert(rule.to_string());
        self
    }

    /// True when any mutating call was made.
    pub fn was_written(&self) -> bool {
        self.calls
            .iter()
            .any(|c| matches!(*c, "write_todos" | "apply_changes" | "compact"))
    }
}

impl TodoLedger for MemoryLedger {
    fn validate_config(&self) -> ConfigValidation {
        self.validation.clone()
    }

    fn todo_config(&self, _engine: &str, overrides: &DaysToDecay) -> Result<TodoConfig, LedgerError> {
        let mut config = self.todo_config.clone();
        if !overrides.is_empty() {
            let base = config.days_to_decay.unwrap_or_default();
            let days = DaysToDecay {
                warn: overrides.warn.or(base.warn),
                error: overrides.error.or(base.error),
            };
            if let (Some(warn), Some(error)) = (days.warn, days.error)
                && warn >= error
            {
                return Err(LedgerError::InvalidDecay { warn, error });
            }
            config.days_to_decay = Some(days);
        }
        Ok(config)
    }

    fn storage_exists(&self) -> bool {
        self.storage
    }

    fn write_todos(
        &mut self,
        candidates: &TodoBatch,
        options: &WriteTodoOptions,
    ) -> Result<WriteSummary, LedgerError> {
        self.calls.push("write_todos");
        let live: BTreeSet<String> = self.records.iter().map(todo_key).collect();

        let before = self.records.len();
        self.records.retain(|r| {
            !(options.covers(r) && options.should_remove(r) && !candidates.contains_key(&todo_key(r)))
        });
        let removed = before - self.records.len();

        let mut added = 0;
        for candidate in candidates {
            if !live.contains(&todo_key(candidate)) {
                let mut record = candidate.clone();
                record.origin = None;
                self.records.push(record);
                added += 1;
            }
        }

        self.storage = true;
        Ok(WriteSummary { added, removed })
    }

    fn generate_batches(
        &self,
        candidates: &TodoBatch,
        options: &WriteTodoOptions,
    ) -> Result<TodoBatches, LedgerError> {
        let mut batches = TodoBatches::default();
        for record in self.records.iter().filter(|r| options.covers(r)) {
            match candidates.get(&todo_key(record)) {
                Some(candidate) => {
                    let mut matched = record.clone();
                    matched.origin = candidate.origin;
                    if self.expired_rules.contains(&record.rule_id) {
                        batches.expired.insert(matched);
                    } else {
                        batches.stable.insert(matched);
                    }
                }
                None if options.should_remove(record) => {
                    batches.remove.insert(record.clone());
                }
                None => {}
            }
        }
        Ok(batches)
    }

    fn apply_changes(&mut self, add: &TodoBatch, remove: &TodoBatch) -> Result<(), LedgerError> {
        self.calls.push("apply_changes");
        self.records.retain(|r| !remove.contains_key(&todo_key(r)));
        self.records.extend(add.iter().cloned());
        self.storage = true;
        Ok(())
    }

    fn compact(&mut self) -> Result<usize, LedgerError> {
        self.calls.push("compact");
        Ok(0)
    }

    fn severity_code(&self, record: &TodoRecord) -> i32 {
        self.severity_by_rule
            .get(&record.rule_id)
            .copied()
            .unwrap_or(CODE_TODO)
    }
}
