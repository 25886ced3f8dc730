//! Run settings resolved from environment variables and CLI flags.
//!
//! Resolution is a pure function over a variable lookup so it can be tested
//! without touching the process environment.

use std::path::PathBuf;

use anyhow::{Context, Result};

use lint_todo_core::{FormatterOptions, Presentation};
use lint_todo_types::{DaysToDecay, ENGINE_STYLELINT};

pub const UPDATE_TODO: &str = "UPDATE_TODO";
pub const INCLUDE_TODO: &str = "INCLUDE_TODO";
pub const TODO_DAYS_TO_WARN: &str = "TODO_DAYS_TO_WARN";
pub const TODO_DAYS_TO_ERROR: &str = "TODO_DAYS_TO_ERROR";
pub const NO_CLEAN_TODO: &str = "NO_CLEAN_TODO";
pub const COMPACT_TODO: &str = "COMPACT_TODO";
pub const FORMAT_TODO_AS: &str = "FORMAT_TODO_AS";
pub const STYLELINT_TODO_DIR: &str = "STYLELINT_TODO_DIR";
pub const NO_COLOR: &str = "NO_COLOR";
pub const COLUMNS: &str = "COLUMNS";

const CI_MARKERS: &[&str] = &["CONTINUOUS_INTEGRATION", "BUILD_NUMBER", "RUN_ID"];
const DEFAULT_COLUMNS: usize = 80;

/// Flags and terminal facts that are not environment variables.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub fix: bool,
    pub format: Option<String>,
    pub base_dir: Option<PathBuf>,
    pub cwd: PathBuf,
    pub stdout_is_tty: bool,
    /// Width reported by the terminal stdout is attached to.
    pub terminal_columns: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_dir: PathBuf,
    pub update_todo: bool,
    pub include_todo: bool,
    pub should_clean: bool,
    pub compact_only: bool,
    pub format_todo_as: Option<String>,
    pub decay_overrides: DaysToDecay,
    pub presentation: Presentation,
}

impl Settings {
    pub fn resolve<F>(lookup: F, invocation: Invocation) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |name: &str| lookup(name).is_some_and(|v| !v.is_empty());
        let is_one = |name: &str| lookup(name).as_deref() == Some("1");

        let decay_overrides = DaysToDecay {
            warn: parse_days(&lookup, TODO_DAYS_TO_WARN)?,
            error: parse_days(&lookup, TODO_DAYS_TO_ERROR)?,
        };

        let base_dir = invocation
            .base_dir
            .or_else(|| lookup(STYLELINT_TODO_DIR).filter(|v| !v.is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| invocation.cwd.clone());

        let columns = invocation.stdout_is_tty.then(|| {
            lookup(COLUMNS)
                .and_then(|v| v.trim().parse().ok())
                .or(invocation.terminal_columns)
                .unwrap_or(DEFAULT_COLUMNS)
        });

        Ok(Self {
            base_dir,
            update_todo: is_one(UPDATE_TODO),
            include_todo: is_one(INCLUDE_TODO),
            should_clean: invocation.fix || (!set(NO_CLEAN_TODO) && !is_ci(&lookup)),
            compact_only: set(COMPACT_TODO),
            format_todo_as: invocation
                .format
                .or_else(|| lookup(FORMAT_TODO_AS).filter(|v| !v.is_empty())),
            decay_overrides,
            presentation: Presentation {
                color: invocation.stdout_is_tty && !set(NO_COLOR),
                columns,
                cwd: invocation.cwd,
            },
        })
    }

    pub fn formatter_options(&self) -> FormatterOptions {
        FormatterOptions {
            base_dir: self.base_dir.clone(),
            engine: ENGINE_STYLELINT.to_string(),
            update_todo: self.update_todo,
            include_todo: self.include_todo,
            should_clean: self.should_clean,
            compact_only: self.compact_only,
            format_todo_as: self.format_todo_as.clone(),
            decay_overrides: self.decay_overrides,
            presentation: self.presentation.clone(),
        }
    }
}

fn is_ci<F>(lookup: &F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(ci) = lookup("CI") {
        return ci != "false" && ci != "0";
    }
    CI_MARKERS.iter().any(|name| lookup(name).is_some())
}

fn parse_days<F>(lookup: &F, name: &str) -> Result<Option<u32>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).filter(|v| !v.trim().is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map(Some)
            .with_context(|| format!("{name} must be a whole number of days, got '{raw}'")),
    }
}
