//! Reconciliation driver: validates, walks results file by file against the
//! ledger, then renders.

use std::path::PathBuf;

use tracing::{debug, info};

use lint_todo_domain::{
    AppliedChanges, CandidateContext, FileChanges, LedgerError, TodoBatch, TodoLedger,
    UnknownSeverity, WriteSummary, WriteTodoOptions, build_candidates, relative_path,
    severity_from_code, update_errored_state,
};
use lint_todo_types::{DaysToDecay, ENGINE_STYLELINT, LintResult, Severity, TodoConfig};

use crate::formats::{AlternateFormat, UnknownFormat, render_alternate};
use crate::render::{PrintOptions, Presentation, TodoInfo, print_results};

pub const DECAY_OVERRIDE_WITHOUT_UPDATE: &str = "Using `TODO_DAYS_TO_WARN` or `TODO_DAYS_TO_ERROR` is only valid when the `UPDATE_TODO` environment variable is being used.";

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("{0}")]
    InvalidConfig(String),

    #[error("{}", DECAY_OVERRIDE_WITHOUT_UPDATE)]
    DecayOverrideWithoutUpdate,

    #[error(transparent)]
    UnknownFormat(#[from] UnknownFormat),

    #[error(transparent)]
    UnknownSeverity(#[from] UnknownSeverity),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("render {format} output: {source}")]
    Render {
        format: AlternateFormat,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterOptions {
    pub base_dir: PathBuf,
    pub engine: String,
    pub update_todo: bool,
    pub include_todo: bool,
    pub should_clean: bool,
    pub compact_only: bool,
    pub format_todo_as: Option<String>,
    /// `TODO_DAYS_TO_WARN` / `TODO_DAYS_TO_ERROR`.
    pub decay_overrides: DaysToDecay,
    pub presentation: Presentation,
}

impl FormatterOptions {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            presentation: Presentation::plain(base_dir.clone()),
            base_dir,
            engine: ENGINE_STYLELINT.to_string(),
            update_todo: false,
            include_todo: false,
            should_clean: true,
            compact_only: false,
            format_todo_as: None,
            decay_overrides: DaysToDecay::default(),
        }
    }
}

/// Cumulative counts for one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoTally {
    pub added: usize,
    pub removed: usize,
    pub demoted: usize,
    pub violations: usize,
    pub skipped: usize,
}

impl TodoTally {
    fn record_write(&mut self, summary: WriteSummary) {
        self.added += summary.added;
        self.removed += summary.removed;
    }

    fn record_applied(&mut self, applied: AppliedChanges) {
        self.demoted += applied.demoted;
        self.violations += applied.violations;
        self.skipped += applied.skipped;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterRun {
    pub output: String,
    /// True when any live error remains after reconciliation.
    pub errored: bool,
    pub tally: TodoTally,
    pub results: Vec<LintResult>,
}

/// Reconciles `results` against `ledger` and renders the report.
///
/// `read_source` maps a result's source path to the file text used for
/// candidate content snippets.
pub fn run_formatter<L, F>(
    mut results: Vec<LintResult>,
    ledger: &mut L,
    options: &FormatterOptions,
    mut read_source: F,
) -> Result<FormatterRun, FormatError>
where
    L: TodoLedger,
    F: FnMut(&str) -> Option<String>,
{
    let validation = ledger.validate_config();
    if !validation.is_valid {
        return Err(FormatError::InvalidConfig(
            validation.message.unwrap_or_default(),
        ));
    }

    let format = options
        .format_todo_as
        .as_deref()
        .map(str::parse::<AlternateFormat>)
        .transpose()?;

    if !options.decay_overrides.is_empty() && !options.update_todo {
        return Err(FormatError::DecayOverrideWithoutUpdate);
    }

    let todo_config = ledger.todo_config(&options.engine, &options.decay_overrides)?;

    if options.compact_only {
        let compacted = ledger.compact()?;
        info!("Compacted {} todo storage entries", compacted);
        return Ok(FormatterRun {
            output: format!("Removed {compacted} todos in .lint-todo storage file"),
            errored: false,
            tally: TodoTally::default(),
            results,
        });
    }

    let mut tally = TodoTally::default();
    let input_len = results.len();
    for index in 0..input_len {
        let changes = reconcile_file(
            &results[index],
            ledger,
            options,
            &todo_config,
            &mut read_source,
            &mut tally,
        )?;
        if !changes.is_empty() {
            tally.record_applied(changes.apply(&mut results, &options.base_dir));
        }
    }

    let errored = update_errored_state(&mut results);
    debug!(
        "Reconciled {} results: {:?}, errored={}",
        input_len, tally, errored
    );

    let output = match format {
        Some(format) => render_alternate(format, &results, &options.presentation.cwd)
            .map_err(|source| FormatError::Render { format, source })?,
        None => print_results(
            &results,
            &PrintOptions {
                include_todo: options.include_todo,
                update_todo: options.update_todo,
                todo_info: Some(TodoInfo {
                    added: tally.added,
                    removed: tally.removed,
                    days_to_decay: todo_config.days_to_decay,
                }),
            },
            &options.presentation,
        ),
    };

    Ok(FormatterRun {
        output,
        errored,
        tally,
        results,
    })
}

/// One file step: write candidates, fetch batches, and return what should
/// change in the result list.
fn reconcile_file<L, F>(
    result: &LintResult,
    ledger: &mut L,
    options: &FormatterOptions,
    todo_config: &TodoConfig,
    read_source: &mut F,
    tally: &mut TodoTally,
) -> Result<FileChanges, FormatError>
where
    L: TodoLedger,
    F: FnMut(&str) -> Option<String>,
{
    let mut changes = FileChanges::default();
    let Some(source) = result.source.as_deref().filter(|s| !s.is_empty()) else {
        debug!("Skipping result without a source path");
        return Ok(changes);
    };

    let ctx = CandidateContext {
        base_dir: &options.base_dir,
        todo_config: Some(todo_config),
        engine: Some(options.engine.as_str()),
    };
    let candidates = build_candidates(std::slice::from_ref(result), &ctx, &mut *read_source);
    let write_options = WriteTodoOptions {
        engine: options.engine.clone(),
        file_path: relative_path(&options.base_dir, source),
        todo_config: todo_config.clone(),
    };

    if options.update_todo {
        tally.record_write(ledger.write_todos(&candidates, &write_options)?);
    }

    if !ledger.storage_exists() {
        return Ok(changes);
    }

    let batches = ledger.generate_batches(&candidates, &write_options)?;
    debug!(
        "'{}': {} stable, {} remove, {} expired",
        write_options.file_path,
        batches.stable.len(),
        batches.remove.len(),
        batches.expired.len()
    );

    if !batches.remove.is_empty() || !batches.expired.is_empty() {
        if options.should_clean {
            let stale: TodoBatch = batches.remove.union(&batches.expired);
            ledger.apply_changes(&TodoBatch::new(), &stale)?;
            tally.removed += stale.len();
        } else {
            for record in &batches.remove {
                changes.violate(record);
            }
        }
    }

    for record in &batches.stable {
        let severity = severity_from_code(ledger.severity_code(record))?;
        if severity != Severity::Error {
            changes.demote(record, severity);
        }
    }

    Ok(changes)
}
