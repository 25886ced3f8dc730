//! File-backed implementation of the [`lint_todo_domain::TodoLedger`] port.
//!
//! Storage is a JSON-lines operation log at `<base_dir>/.lint-todo`; decay
//! configuration comes from `.lint-todorc.toml` or `package.json`.

pub mod config;
mod file_ledger;
pub mod storage;

pub use config::{PACKAGE_JSON, PACKAGE_KEY, RC_FILE, load_todo_config, validate_sources};
pub use file_ledger::FileLedger;
pub use storage::{LiveSet, Op, STORAGE_FILE, StorageLine};
