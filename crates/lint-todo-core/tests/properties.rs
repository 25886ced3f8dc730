//! Property-based tests for the reconciliation driver.

use proptest::prelude::*;

use lint_todo_core::{FormatterOptions, run_formatter};
use lint_todo_testkit::MemoryLedger;
use lint_todo_testkit::arb::{BASE_DIR, arb_days_to_decay, arb_results};
use lint_todo_types::{LintResult, Severity};

fn errors(results: &[LintResult]) -> usize {
    results
        .iter()
        .flat_map(|r| &r.warnings)
        .filter(|d| d.severity == Severity::Error)
        .count()
}

fn update_options() -> FormatterOptions {
    FormatterOptions {
        update_todo: true,
        ..FormatterOptions::new(BASE_DIR)
    }
}

proptest! {
    #[test]
    fn every_error_is_demoted_or_kept(results in arb_results()) {
        let before = errors(&results);
        let mut ledger = MemoryLedger::new();

        let run = run_formatter(results, &mut ledger, &update_options(), |_| None).unwrap();

        prop_assert_eq!(run.tally.demoted + errors(&run.results), before);
        prop_assert_eq!(run.tally.skipped, 0);
        prop_assert_eq!(run.errored, errors(&run.results) > 0);
        prop_assert_eq!(ledger.records.len(), run.tally.added);
    }

    #[test]
    fn second_update_adds_and_removes_nothing(results in arb_results()) {
        let mut ledger = MemoryLedger::new();
        run_formatter(results.clone(), &mut ledger, &update_options(), |_| None).unwrap();
        let records = ledger.records.clone();

        let run = run_formatter(results, &mut ledger, &update_options(), |_| None).unwrap();

        prop_assert_eq!(run.tally.added, 0);
        prop_assert_eq!(run.tally.removed, 0);
        prop_assert_eq!(ledger.records, records);
    }

    #[test]
    fn plain_run_never_prints_summary(results in arb_results()) {
        let mut ledger = MemoryLedger::new();
        run_formatter(results.clone(), &mut ledger, &update_options(), |_| None).unwrap();

        let run = run_formatter(results, &mut ledger, &FormatterOptions::new(BASE_DIR), |_| None)
            .unwrap();

        prop_assert!(!run.output.contains("todos created"));
        prop_assert_eq!(run.tally.removed, 0);
    }

    #[test]
    fn results_are_never_dropped(results in arb_results()) {
        let len = results.len();
        let mut ledger = MemoryLedger::new();

        let run = run_formatter(results, &mut ledger, &update_options(), |_| None).unwrap();

        prop_assert_eq!(run.results.len(), len);
    }

    #[test]
    fn without_storage_results_pass_through(results in arb_results()) {
        let mut ledger = MemoryLedger::new();

        let run = run_formatter(results.clone(), &mut ledger, &FormatterOptions::new(BASE_DIR), |_| None)
            .unwrap();

        prop_assert_eq!(&run.results, &results);
        prop_assert!(ledger.calls.is_empty());
    }

    #[test]
    fn summary_reports_the_decay_window(results in arb_results(), days in arb_days_to_decay()) {
        let mut ledger = MemoryLedger::new();
        let options = FormatterOptions {
            decay_overrides: days,
            ..update_options()
        };

        let run = run_formatter(results, &mut ledger, &options, |_| None).unwrap();

        let summary = run.output.lines().last().unwrap_or_default();
        prop_assert!(summary.starts_with("✔ "));
        prop_assert_eq!(summary.contains("warn after"), days.warn.is_some());
        prop_assert_eq!(summary.contains("error after"), days.error.is_some());
    }
}
