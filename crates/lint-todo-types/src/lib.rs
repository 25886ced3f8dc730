//! Data types (lint results + todo records + decay config) for lint-todo.
//!
//! This crate is intentionally "dumb": pure DTOs with serde + schemars.
//! The result shapes mirror stylelint's JSON formatter output so a results
//! file can be piped straight in.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ── Frozen Vocabulary ──────────────────────────────────────────
/// Engine id written into every record produced by this tool.
pub const ENGINE_STYLELINT: &str = "stylelint";

/// Rule id of the synthetic diagnostic emitted for a todo whose error no
/// longer reproduces.
pub const INVALID_TODO_RULE_ID: &str = "invalid-todo-violation-rule";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Todo,
    Off,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Todo => "todo",
            Severity::Off => "off",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Builds a range, defaulting a missing end to the start position.
    pub fn normalized(
        line: u32,
        column: u32,
        end_line: Option<u32>,
        end_column: Option<u32>,
    ) -> Self {
        Self {
            start: Position { line, column },
            end: Position {
                line: end_line.unwrap_or(line),
                column: end_column.unwrap_or(column),
            },
        }
    }
}

/// One issue reported by the linter.
///
/// A `line` of `0` means the diagnostic has no position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    pub severity: Severity,
    #[serde(default)]
    pub text: String,
}

impl Diagnostic {
    pub fn has_position(&self) -> bool {
        self.line > 0
    }

    pub fn range(&self) -> Range {
        Range::normalized(self.line, self.column, self.end_line, self.end_column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Deprecation {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InvalidOptionWarning {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParseError {
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    pub stylelint_type: String,
    pub text: String,
}

/// All diagnostics for one source file in one lint run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LintResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub warnings: Vec<Diagnostic>,
    #[serde(default)]
    pub deprecations: Vec<Deprecation>,
    #[serde(default)]
    pub invalid_option_warnings: Vec<InvalidOptionWarning>,
    #[serde(default)]
    pub parse_errors: Vec<ParseError>,
    #[serde(default)]
    pub errored: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignored: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl LintResult {
    pub fn for_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }

    /// True when any diagnostic is still at `error` severity.
    pub fn has_live_errors(&self) -> bool {
        self.warnings.iter().any(|w| w.severity == Severity::Error)
    }
}

/// Day counts after which a todo escalates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct DaysToDecay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warn: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<u32>,
}

impl DaysToDecay {
    pub fn is_empty(&self) -> bool {
        self.warn.is_none() && self.error.is_none()
    }
}

/// Per-engine decay configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TodoConfig {
    #[serde(
        default,
        alias = "daysToDecay",
        skip_serializing_if = "Option::is_none"
    )]
    pub days_to_decay: Option<DaysToDecay>,
    #[serde(
        default,
        alias = "daysToDecayByRule",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub days_to_decay_by_rule: BTreeMap<String, DaysToDecay>,
}

impl TodoConfig {
    /// Resolves the decay window for a rule: per-rule override, else the default.
    pub fn decay_for_rule(&self, rule_id: &str) -> Option<DaysToDecay> {
        self.days_to_decay_by_rule
            .get(rule_id)
            .copied()
            .or(self.days_to_decay)
    }
}

/// A ledger record, either persisted or a candidate built from a live error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoRecord {
    pub engine: String,
    /// Path relative to the ledger's base directory, forward slashes.
    pub file_path: String,
    pub rule_id: String,
    pub range: Range,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warn_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_date: Option<NaiveDate>,
    /// Index of the originating diagnostic inside its result. Never persisted.
    #[serde(skip)]
    pub origin: Option<usize>,
    /// Decay window resolved when the candidate was built. Never persisted.
    #[serde(skip)]
    pub decay: Option<DaysToDecay>,
}
