//! Proptest strategies for generating lint results.
//!
//! # Bounds
//!
//! - Max results per run: 5
//! - Max diagnostics per result: 12
//! - Lines below 60, columns below 120

use lint_todo_types::{DaysToDecay, Diagnostic, LintResult, Severity};
use proptest::prelude::*;

pub const MAX_RESULTS: usize = 5;
pub const MAX_DIAGNOSTICS: usize = 12;

/// Base directory every generated source lives under.
pub const BASE_DIR: &str = "/repo";

const RULES: &[&str] = &[
    "color-no-hex",
    "block-no-empty",
    "declaration-block-no-duplicate-properties",
    "font-family-no-missing-generic-family-keyword",
    "selector-max-id",
];

/// Severities a linter emits directly.
pub fn arb_linter_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![3 => Just(Severity::Error), 1 => Just(Severity::Warning)]
}

pub fn arb_rule() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        9 => prop::sample::select(RULES).prop_map(|r| Some(r.to_string())),
        1 => Just(None),
    ]
}

pub fn arb_diagnostic() -> impl Strategy<Value = Diagnostic> {
    (
        0u32..60,
        0u32..120,
        prop::option::of(0u32..4),
        arb_rule(),
        arb_linter_severity(),
        prop::string::string_regex("[A-Za-z][A-Za-z ]{0,40}").expect("valid regex"),
    )
        .prop_map(|(line, column, span, rule, severity, text)| Diagnostic {
            line,
            column,
            end_line: span.filter(|_| line > 0).map(|s| line + s),
            end_column: span.filter(|_| line > 0).map(|s| column + s),
            rule,
            severity,
            text,
        })
}

/// A result for `<BASE_DIR>/<name>.css`.
pub fn arb_lint_result(name: String) -> impl Strategy<Value = LintResult> {
    prop::collection::vec(arb_diagnostic(), 0..MAX_DIAGNOSTICS).prop_map(move |warnings| {
        LintResult {
            errored: warnings.iter().any(|w| w.severity == Severity::Error),
            warnings,
            ..LintResult::for_source(format!("{BASE_DIR}/{name}.css"))
        }
    })
}

/// Results with distinct source paths.
pub fn arb_results() -> impl Strategy<Value = Vec<LintResult>> {
    (0..=MAX_RESULTS).prop_flat_map(|n| {
        (0..n)
            .map(|i| arb_lint_result(format!("file{i}")))
            .collect::<Vec<_>>()
    })
}

/// Decay windows with `warn < error` whenever both are set.
pub fn arb_days_to_decay() -> impl Strategy<Value = DaysToDecay> {
    (prop::option::of(1u32..30), prop::option::of(1u32..30)).prop_map(|(warn, extra)| {
        DaysToDecay {
            warn,
            error: extra.map(|e| warn.unwrap_or(0) + e),
        }
    })
}
