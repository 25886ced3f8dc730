//! Builds candidate ledger records from live errors.

use std::path::{Component, Path};

use lint_todo_types::{ENGINE_STYLELINT, LintResult, Range, Severity, TodoConfig, TodoRecord};

use crate::batch::TodoBatch;

/// Inputs shared by every candidate of one build.
#[derive(Debug, Clone, Copy)]
pub struct CandidateContext<'a> {
    pub base_dir: &'a Path,
    pub todo_config: Option<&'a TodoConfig>,
    /// Defaults to [`ENGINE_STYLELINT`].
    pub engine: Option<&'a str>,
}

impl<'a> CandidateContext<'a> {
    pub fn new(base_dir: &'a Path) -> Self {
        Self {
            base_dir,
            todo_config: None,
            engine: None,
        }
    }
}

/// Builds one candidate per diagnostic still at `error` severity.
///
/// `read_source` receives a result's source path and returns the file text
/// used for the content snippet; returning `None` leaves the snippet empty.
/// Results are never modified.
pub fn build_candidates<F>(
    results: &[LintResult],
    ctx: &CandidateContext<'_>,
    mut read_source: F,
) -> TodoBatch
where
    F: FnMut(&str) -> Option<String>,
{
    let engine = ctx.engine.unwrap_or(ENGINE_STYLELINT);
    let mut batch = TodoBatch::new();

    for result in results.iter().filter(|r| !r.warnings.is_empty()) {
        let source_path = result.source.as_deref().unwrap_or("");
        let file_path = relative_path(ctx.base_dir, source_path);
        let mut contents: Option<Option<String>> = None;

        for (index, warning) in result.warnings.iter().enumerate() {
            if warning.severity != Severity::Error {
                continue;
            }

            let range = warning.range();
            let rule_id = warning.rule.clone().unwrap_or_default();
            let source = contents
                .get_or_insert_with(|| read_source(source_path))
                .as_deref()
                .map(|t| source_for_range(t, &range))
                .unwrap_or_default();

            batch.insert(TodoRecord {
                engine: engine.to_string(),
                file_path: file_path.clone(),
                decay: ctx.todo_config.and_then(|c| c.decay_for_rule(&rule_id)),
                rule_id,
                range,
                source,
                created_date: None,
                warn_date: None,
                error_date: None,
                origin: Some(index),
            });
        }
    }

    batch
}

/// The whole source lines covered by `range`, joined with `\n`.
pub fn source_for_range(source: &str, range: &Range) -> String {
    if range.start.line == 0 {
        return String::new();
    }
    let first = (range.start.line - 1) as usize;
    let last = range.end.line.max(range.start.line) as usize;

    source
        .lines()
        .skip(first)
        .take(last - first)
        .collect::<Vec<_>>()
        .join("\n")
}

/// `source` relative to `base_dir` with forward slashes.
///
/// Absolute sources outside the base directory climb out of it with `..`.
pub fn relative_path(base_dir: &Path, source: &str) -> String {
    let path = Path::new(source);
    let parts: Vec<String> = if path.is_absolute() && base_dir.is_absolute() {
        let base: Vec<Component> = base_dir.components().collect();
        let target: Vec<Component> = path.components().collect();
        let common = base
            .iter()
            .zip(&target)
            .take_while(|(a, b)| a == b)
            .count();
        base[common..]
            .iter()
            .filter(|c| matches!(c, Component::Normal(_)))
            .map(|_| "..".to_string())
            .chain(target[common..].iter().filter_map(component_name))
            .collect()
    } else {
        let rel = path.strip_prefix(base_dir).unwrap_or(path);
        rel.components().filter_map(|c| component_name(&c)).collect()
    };
    parts.join("/")
}

fn component_name(c: &Component<'_>) -> Option<String> {
    match c {
        Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
        Component::ParentDir => Some("..".to_string()),
        _ => None,
    }
}
