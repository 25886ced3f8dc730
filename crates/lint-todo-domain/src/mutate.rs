//! In-place changes to the diagnostic list.
//!
//! A reconciliation step never touches the result list directly. It records
//! what should happen in a [`FileChanges`] and the caller merges it with
//! [`FileChanges::apply`] once the step is done.

use std::path::Path;

use lint_todo_types::{Diagnostic, INVALID_TODO_RULE_ID, LintResult, Severity, TodoRecord};

use crate::candidates::relative_path;

/// Set the severity of the diagnostic at `origin` in the result for `file_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demotion {
    pub file_path: String,
    pub origin: usize,
    pub severity: Severity,
}

/// Append `diagnostic` to the result for `file_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub file_path: String,
    pub diagnostic: Diagnostic,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChanges {
    pub demotions: Vec<Demotion>,
    pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedChanges {
    pub demoted: usize,
    /// Demotions whose file or diagnostic no longer exists.
    pub skipped: usize,
    pub violations: usize,
    /// Results created to hold a violation.
    pub created_results: usize,
}

impl FileChanges {
    pub fn is_empty(&self) -> bool {
        self.demotions.is_empty() && self.violations.is_empty()
    }

    /// Queues a severity change for the diagnostic a stable record came from.
    ///
    /// Records without an origin are ignored.
    pub fn demote(&mut self, record: &TodoRecord, severity: Severity) {
        if let Some(origin) = record.origin {
            self.demotions.push(Demotion {
                file_path: record.file_path.clone(),
                origin,
                severity,
            });
        }
    }

    /// Queues an invalid-todo violation for a record with no live error.
    pub fn violate(&mut self, record: &TodoRecord) {
        self.violations.push(Violation {
            file_path: record.file_path.clone(),
            diagnostic: invalid_todo_violation(record),
        });
    }

    /// Merges the queued changes into `results`.
    ///
    /// Demotions are applied before violations are appended, so origins
    /// always refer to the diagnostics the candidates were built from.
    pub fn apply(self, results: &mut Vec<LintResult>, base_dir: &Path) -> AppliedChanges {
        let mut applied = AppliedChanges::default();

        for demotion in self.demotions {
            let warning = find_result_index(results, base_dir, &demotion.file_path)
                .and_then(|i| results[i].warnings.get_mut(demotion.origin));
            match warning {
                Some(warning) => {
                    warning.severity = demotion.severity;
                    applied.demoted += 1;
                }
                None => applied.skipped += 1,
            }
        }

        for violation in self.violations {
            let index = match find_result_index(results, base_dir, &violation.file_path) {
                Some(i) => i,
                None => {
                    let source = base_dir.join(&violation.file_path);
                    results.push(LintResult::for_source(source.to_string_lossy()));
                    applied.created_results += 1;
                    results.len() - 1
                }
            };
            results[index].warnings.push(violation.diagnostic);
            applied.violations += 1;
        }

        applied
    }
}

/// The synthetic error reported for a todo whose error no longer reproduces.
pub fn invalid_todo_violation(record: &TodoRecord) -> Diagnostic {
    Diagnostic {
        line: 0,
        column: 0,
        end_line: None,
        end_column: None,
        rule: Some(INVALID_TODO_RULE_ID.to_string()),
        severity: Severity::Error,
        text: format!(
            "Todo violation passes `{}` rule. Please run with `CLEAN_TODO=1` env var to remove this todo from the todo list.",
            record.rule_id
        ),
    }
}

/// First result whose source, relative to `base_dir`, equals `file_path`.
pub fn find_result_index(results: &[LintResult], base_dir: &Path, file_path: &str) -> Option<usize> {
    results
        .iter()
        .position(|r| relative_path(base_dir, r.source.as_deref().unwrap_or("")) == file_path)
}

/// Re-derives every result's `errored` flag; returns their logical OR.
pub fn update_errored_state(results: &mut [LintResult]) -> bool {
    let mut errored = false;
    for result in results.iter_mut() {
        result.errored = result.has_live_errors();
        errored |= result.errored;
    }
    errored
}
