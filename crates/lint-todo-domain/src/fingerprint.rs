//! Stable identity for todo records.
//!
//! The identity covers what a record is about (engine, file, rule, range),
//! not when it was created or what it decays to, so a freshly built
//! candidate and its persisted twin share a key.

use lint_todo_types::TodoRecord;
use sha2::{Digest, Sha256};

/// Computes the identity key of a record.
///
/// SHA-256 over engine, file path, rule id and the four range numbers, each
/// field terminated by a NUL byte, truncated to 16 hex characters (8 bytes).
pub fn todo_key(record: &TodoRecord) -> String {
    let r = &record.range;
    let mut hasher = Sha256::new();
    for field in [
        record.engine.as_str(),
        record.file_path.as_str(),
        record.rule_id.as_str(),
    ] {
        hasher.update(field.as_bytes());
        hasher.update([0u8]);
    }
    for n in [r.start.line, r.start.column, r.end.line, r.end.column] {
        hasher.update(n.to_string().as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(&hasher.finalize()[..8])
}
