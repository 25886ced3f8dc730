//! Port for the persisted todo ledger.
//!
//! The ledger owns storage, matching and decay-date computation. The
//! reconciliation driver only talks to it through [`TodoLedger`].

use std::path::PathBuf;

use lint_todo_types::{DaysToDecay, TodoConfig, TodoRecord};

use crate::batch::{TodoBatch, TodoBatches};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{message}")]
    InvalidConfig { message: String },

    #[error(
        "The provided todo configuration contains invalid values. The `warn` value ({warn}) must be less than the `error` value ({error})."
    )]
    InvalidDecay { warn: u32, error: u32 },

    #[error("{action} '{}': {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("corrupt todo storage '{}' at line {line}: {message}", .path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("encode todo record: {message}")]
    Encode { message: String },
}

/// Outcome of checking the ledger's configuration sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidation {
    pub is_valid: bool,
    pub message: Option<String>,
}

impl ConfigValidation {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }
}

/// Scope of a write or batch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTodoOptions {
    /// Engine whose records may be removed.
    pub engine: String,
    /// Relative file the request is scoped to; empty means every file.
    pub file_path: String,
    pub todo_config: TodoConfig,
}

impl WriteTodoOptions {
    /// Only records of the requesting engine are ever removed.
    pub fn should_remove(&self, record: &TodoRecord) -> bool {
        record.engine == self.engine
    }

    pub fn covers(&self, record: &TodoRecord) -> bool {
        self.file_path.is_empty() || record.file_path == self.file_path
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub added: usize,
    pub removed: usize,
}

pub trait TodoLedger {
    /// Checks that configuration lives in exactly one source.
    fn validate_config(&self) -> ConfigValidation;

    /// Effective decay configuration for `engine`, with overrides applied
    /// and `warn < error` enforced.
    fn todo_config(&self, engine: &str, overrides: &DaysToDecay)
    -> Result<TodoConfig, LedgerError>;

    fn storage_exists(&self) -> bool;

    /// Adds unmatched candidates and removes persisted records (of the
    /// requesting engine, in scope) that no candidate reproduces.
    fn write_todos(
        &mut self,
        candidates: &TodoBatch,
        options: &WriteTodoOptions,
    ) -> Result<WriteSummary, LedgerError>;

    fn generate_batches(
        &self,
        candidates: &TodoBatch,
        options: &WriteTodoOptions,
    ) -> Result<TodoBatches, LedgerError>;

    fn apply_changes(&mut self, add: &TodoBatch, remove: &TodoBatch) -> Result<(), LedgerError>;

    /// Drops superseded storage entries; returns how many were dropped.
    fn compact(&mut self) -> Result<usize, LedgerError>;

    /// Raw severity code for a record, see [`crate::severity_from_code`].
    fn severity_code(&self, record: &TodoRecord) -> i32;
}
