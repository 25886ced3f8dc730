use std::cell::RefCell;
use std::path::{Path, PathBuf};

use chrono::{Days, Local, NaiveDate};
use tracing::debug;

use lint_todo_domain::{
    CODE_ERROR, CODE_TODO, CODE_WARNING, ConfigValidation, LedgerError, TodoBatch, TodoBatches,
    TodoLedger, WriteSummary, WriteTodoOptions, todo_key,
};
use lint_todo_types::{DaysToDecay, TodoConfig, TodoRecord};

use crate::config;
use crate::storage::{LiveSet, Storage, StorageLine};

/// Todo ledger persisted in `<base_dir>/.lint-todo`.
///
/// Records are matched by exact identity only. Decay dates are assigned when
/// a record is first written, relative to the ledger's notion of today.
///
/// The storage log is read and folded once; later appends update the
/// folded set in place.
#[derive(Debug, Clone)]
pub struct FileLedger {
    base_dir: PathBuf,
    storage: Storage,
    today: NaiveDate,
    live: RefCell<Option<LiveSet>>,
}

impl FileLedger {
    pub fn open(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            storage: Storage::in_dir(&base_dir),
            base_dir,
            today: Local::now().date_naive(),
            live: RefCell::new(None),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn storage_path(&self) -> &Path {
        self.storage.path()
    }

    pub fn live_records(&self) -> Result<Vec<TodoRecord>, LedgerError> {
        self.with_live(LiveSet::records)
    }

    fn with_live<R>(&self, f: impl FnOnce(&LiveSet) -> R) -> Result<R, LedgerError> {
        let mut cache = self.live.borrow_mut();
        let live = match cache.take() {
            Some(live) => live,
            None => LiveSet::fold(&self.storage.read_lines()?),
        };
        let out = f(&live);
        *cache = Some(live);
        Ok(out)
    }

    fn append(&mut self, lines: &[StorageLine]) -> Result<(), LedgerError> {
        self.storage.append(lines)?;
        if let Some(live) = self.live.get_mut() {
            for line in lines {
                live.apply(line);
            }
        }
        Ok(())
    }

    fn is_expired(&self, record: &TodoRecord) -> bool {
        record.error_date.is_some_and(|d| self.today >= d)
    }

    /// Stamps creation and decay dates on a record that has none yet.
    fn dated(&self, record: &TodoRecord, todo_config: Option<&TodoConfig>) -> TodoRecord {
        let mut record = record.clone();
        if record.created_date.is_some() {
            return record;
        }
        let decay = record
            .decay
            .or_else(|| todo_config.and_then(|c| c.decay_for_rule(&record.rule_id)))
            .unwrap_or_default();
        record.created_date = Some(self.today);
        record.warn_date = self.after(decay.warn);
        record.error_date = self.after(decay.error);
        record
    }

    fn after(&self, days: Option<u32>) -> Option<NaiveDate> {
        days.and_then(|n| self.today.checked_add_days(Days::new(u64::from(n))))
    }
}

impl TodoLedger for FileLedger {
    fn validate_config(&self) -> ConfigValidation {
        config::validate_sources(&self.base_dir)
    }

    fn todo_config(
        &self,
        engine: &str,
        overrides: &DaysToDecay,
    ) -> Result<TodoConfig, LedgerError> {
        config::load_todo_config(&self.base_dir, engine, overrides)
    }

    fn storage_exists(&self) -> bool {
        self.storage.exists()
    }

    fn write_todos(
        &mut self,
        candidates: &TodoBatch,
        options: &WriteTodoOptions,
    ) -> Result<WriteSummary, LedgerError> {
        let (fresh, stale) = self.with_live(|live| {
            let fresh: Vec<TodoRecord> = candidates
                .iter()
                .filter(|c| !live.contains_key(&todo_key(c)))
                .cloned()
                .collect();
            let stale = live.records_where(|r| {
                options.covers(r)
                    && options.should_remove(r)
                    && !candidates.contains_key(&todo_key(r))
            });
            (fresh, stale)
        })?;

        let mut lines: Vec<StorageLine> = fresh
            .iter()
            .map(|c| StorageLine::add(self.dated(c, Some(&options.todo_config))))
            .collect();
        let added = lines.len();
        lines.extend(stale.into_iter().map(StorageLine::remove));
        let removed = lines.len() - added;

        self.append(&lines)?;
        debug!(
            "Wrote todos for '{}': {} added, {} removed",
            options.file_path, added, removed
        );
        Ok(WriteSummary { added, removed })
    }

    fn generate_batches(
        &self,
        candidates: &TodoBatch,
        options: &WriteTodoOptions,
    ) -> Result<TodoBatches, LedgerError> {
        let mut batches = TodoBatches::default();

        for record in self.with_live(|live| live.records_where(|r| options.covers(r)))? {
            match candidates.get(&todo_key(&record)) {
                Some(candidate) => {
                    let mut matched = record;
                    matched.origin = candidate.origin;
                    matched.decay = candidate.decay;
                    if self.is_expired(&matched) {
                        batches.expired.insert(matched);
                    } else {
                        batches.stable.insert(matched);
                    }
                }
                None if options.should_remove(&record) => {
                    batches.remove.insert(record);
                }
                None => {}
            }
        }

        Ok(batches)
    }

    fn apply_changes(&mut self, add: &TodoBatch, remove: &TodoBatch) -> Result<(), LedgerError> {
        let lines: Vec<StorageLine> = add
            .iter()
            .map(|r| StorageLine::add(self.dated(r, None)))
            .chain(remove.iter().cloned().map(StorageLine::remove))
            .collect();
        debug!(
            "Applying todo changes: {} added, {} removed",
            add.len(),
            remove.len()
        );
        self.append(&lines)
    }

    fn compact(&mut self) -> Result<usize, LedgerError> {
        let lines = self.storage.read_lines()?;
        if lines.is_empty() {
            return Ok(0);
        }
        let live = LiveSet::fold(&lines);
        let dropped = lines.len() - live.len();
        let rewritten: Vec<StorageLine> =
            live.records().into_iter().map(StorageLine::add).collect();
        self.storage.rewrite(&rewritten)?;
        *self.live.get_mut() = Some(LiveSet::fold(&rewritten));
        debug!("Compacted todo storage: {} entries dropped", dropped);
        Ok(dropped)
    }

    fn severity_code(&self, record: &TodoRecord) -> i32 {
        if self.is_expired(record) {
            CODE_ERROR
        } else if record.warn_date.is_some_and(|d| self.today >= d) {
            CODE_WARNING
        } else {
            CODE_TODO
        }
    }
}
