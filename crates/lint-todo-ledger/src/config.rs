//! Decay configuration loading.
//!
//! Configuration lives either in `.lint-todorc.toml` or under the
//! `lintTodo` key of `package.json`, never both. Accepted shapes:
//! - shorthand `{ warn, error }` applying to every engine
//! - per-engine sections `{ <engine> = { days_to_decay, days_to_decay_by_rule } }`
//! - a bare `{ days_to_decay, days_to_decay_by_rule }` applying to every engine

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use lint_todo_domain::{ConfigValidation, LedgerError};
use lint_todo_types::{DaysToDecay, TodoConfig};

pub const RC_FILE: &str = ".lint-todorc.toml";
pub const PACKAGE_JSON: &str = "package.json";
pub const PACKAGE_KEY: &str = "lintTodo";

const BOTH_SOURCES: &str = "You cannot have todo configurations in both package.json and .lint-todorc.toml. Please move the configuration from the package.json to the .lint-todorc.toml";

/// Checks that configuration is defined in at most one place.
pub fn validate_sources(base_dir: &Path) -> ConfigValidation {
    let has_rc = base_dir.join(RC_FILE).is_file();
    // An unreadable package.json is reported when the config is loaded.
    let has_package = matches!(read_package_section(base_dir), Ok(Some(_)));

    if has_rc && has_package {
        ConfigValidation::invalid(BOTH_SOURCES)
    } else {
        ConfigValidation::valid()
    }
}

/// Loads the effective configuration for `engine`.
///
/// `overrides` replace the engine default side by side; `warn < error` is
/// enforced afterwards for the default window and every per-rule window.
pub fn load_todo_config(
    base_dir: &Path,
    engine: &str,
    overrides: &DaysToDecay,
) -> Result<TodoConfig, LedgerError> {
    let mut config = match load_raw(base_dir)? {
        Some((path, raw)) => {
            debug!("Loading todo config from '{}'", path.display());
            section_for_engine(raw, engine).map_err(|e| invalid_config(&path, e))?
        }
        None => TodoConfig::default(),
    };

    apply_overrides(&mut config, overrides);
    validate_decay(&config)?;
    Ok(config)
}

fn load_raw(base_dir: &Path) -> Result<Option<(PathBuf, Value)>, LedgerError> {
    let rc = base_dir.join(RC_FILE);
    if rc.is_file() {
        let text = read(&rc)?;
        let value: Value = toml::from_str(&text).map_err(|e| invalid_config(&rc, e))?;
        return Ok(Some((rc, value)));
    }

    Ok(read_package_section(base_dir)?.map(|v| (base_dir.join(PACKAGE_JSON), v)))
}

fn read_package_section(base_dir: &Path) -> Result<Option<Value>, LedgerError> {
    let path = base_dir.join(PACKAGE_JSON);
    if !path.is_file() {
        return Ok(None);
    }
    let text = read(&path)?;
    let mut value: Value = serde_json::from_str(&text).map_err(|e| invalid_config(&path, e))?;
    Ok(value.get_mut(PACKAGE_KEY).map(Value::take))
}

fn section_for_engine(raw: Value, engine: &str) -> Result<TodoConfig, serde_json::Error> {
    if let Some(section) = raw.get(engine) {
        return serde_json::from_value(section.clone());
    }
    if raw.get("warn").is_some() || raw.get("error").is_some() {
        let days: DaysToDecay = serde_json::from_value(raw)?;
        return Ok(TodoConfig {
            days_to_decay: Some(days),
            ..TodoConfig::default()
        });
    }
    serde_json::from_value(raw)
}

fn apply_overrides(config: &mut TodoConfig, overrides: &DaysToDecay) {
    if overrides.is_empty() {
        return;
    }
    let base = config.days_to_decay.unwrap_or_default();
    config.days_to_decay = Some(DaysToDecay {
        warn: overrides.warn.or(base.warn),
        error: overrides.error.or(base.error),
    });
}

fn validate_decay(config: &TodoConfig) -> Result<(), LedgerError> {
    let windows = config
        .days_to_decay
        .iter()
        .chain(config.days_to_decay_by_rule.values());
    for days in windows {
        if let (Some(warn), Some(error)) = (days.warn, days.error)
            && warn >= error
        {
            return Err(LedgerError::InvalidDecay { warn, error });
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<String, LedgerError> {
    std::fs::read_to_string(path).map_err(|source| LedgerError::Io {
        action: "read config",
        path: path.to_path_buf(),
        source,
    })
}

fn invalid_config(path: &Path, err: impl std::fmt::Display) -> LedgerError {
    LedgerError::InvalidConfig {
        message: format!("invalid todo configuration in '{}': {err}", path.display()),
    }
}
