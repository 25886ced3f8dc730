//! Domain logic: severity mapping, todo candidates, diagnostic mutation.
//!
//! This crate is designed to be I/O-free and highly testable. Persistence is
//! reached through the [`TodoLedger`] port, implemented elsewhere.

pub mod batch;
pub mod candidates;
pub mod fingerprint;
pub mod ledger;
pub mod mutate;
pub mod severity;

pub use batch::{TodoBatch, TodoBatches};
pub use candidates::{CandidateContext, build_candidates, relative_path, source_for_range};
pub use fingerprint::todo_key;
pub use ledger::{ConfigValidation, LedgerError, TodoLedger, WriteSummary, WriteTodoOptions};
pub use mutate::{
    AppliedChanges, Demotion, FileChanges, Violation, find_result_index, invalid_todo_violation,
    update_errored_state,
};
pub use severity::{
    CODE_ERROR, CODE_OFF, CODE_TODO, CODE_WARNING, UnknownSeverity, severity_from_code,
};
