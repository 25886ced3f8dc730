//! Shared test utilities for the lint-todo workspace.
//!
//! This crate provides:
//! - **arb**: Proptest strategies for lint results and decay windows
//! - **fixtures**: Sample stylelint results and records
//! - **ledger**: An in-memory, scriptable [`lint_todo_domain::TodoLedger`]
//! - **schema**: JSON schema validation of persisted records

pub mod arb;
pub mod fixtures;
pub mod ledger;
pub mod schema;

pub use arb::{arb_days_to_decay, arb_diagnostic, arb_lint_result, arb_results};
pub use fixtures::{sample_records, sample_results};
pub use ledger::MemoryLedger;
pub use schema::{SchemaValidationError, validate_record_json};
