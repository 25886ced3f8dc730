//! Common test fixtures for lint-todo.

use lint_todo_types::{
    Deprecation, Diagnostic, ENGINE_STYLELINT, InvalidOptionWarning, LintResult, Range, Severity,
    TodoRecord,
};

pub fn diagnostic(line: u32, column: u32, rule: &str, severity: Severity) -> Diagnostic {
    Diagnostic {
        line,
        column,
        end_line: None,
        end_column: None,
        rule: Some(rule.to_string()),
        severity,
        text: format!("Unexpected violation ({rule})"),
    }
}

/// Sample stylelint results.
pub mod sample_results {
    use super::*;

    /// One file with two live errors and one warning.
    pub fn two_errors(base_dir: &str) -> Vec<LintResult> {
        vec![LintResult {
            warnings: vec![
                diagnostic(1, 5, "color-no-hex", Severity::Error),
                diagnostic(4, 1, "block-no-empty", Severity::Error),
                diagnostic(6, 3, "selector-max-id", Severity::Warning),
            ],
            errored: true,
            ..LintResult::for_source(format!("{base_dir}/src/a.css"))
        }]
    }

    /// Two files, one of them clean.
    pub fn with_clean_file(base_dir: &str) -> Vec<LintResult> {
        let mut results = two_errors(base_dir);
        results.push(LintResult::for_source(format!("{base_dir}/src/clean.css")));
        results
    }

    /// No diagnostics at all.
    pub fn clean(base_dir: &str) -> Vec<LintResult> {
        vec![LintResult::for_source(format!("{base_dir}/src/a.css"))]
    }

    /// Results carrying notices but no diagnostics.
    pub fn with_notices(base_dir: &str) -> Vec<LintResult> {
        vec![LintResult {
            deprecations: vec![Deprecation {
                text: "'function-calc-no-invalid' has been deprecated".to_string(),
                reference: Some("https://stylelint.io/migration".to_string()),
            }],
            invalid_option_warnings: vec![InvalidOptionWarning {
                text: "Invalid option value \"always\" for rule \"color-hex-case\"".to_string(),
            }],
            ..LintResult::for_source(format!("{base_dir}/src/a.css"))
        }]
    }
}

/// Sample ledger records.
pub mod sample_records {
    use super::*;

    pub fn record(file_path: &str, rule: &str, line: u32, column: u32) -> TodoRecord {
        TodoRecord {
            engine: ENGINE_STYLELINT.to_string(),
            file_path: file_path.to_string(),
            rule_id: rule.to_string(),
            range: Range::normalized(line, column, None, None),
            source: String::new(),
            created_date: None,
            warn_date: None,
            error_date: None,
            origin: None,
            decay: None,
        }
    }

    /// A record of another engine sharing the ledger.
    pub fn foreign(file_path: &str) -> TodoRecord {
        TodoRecord {
            engine: "ember-template-lint".to_string(),
            ..record(file_path, "no-bare-strings", 2, 4)
        }
    }
}
