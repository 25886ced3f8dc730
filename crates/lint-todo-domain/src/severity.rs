//! Maps a ledger severity code onto [`Severity`].

use lint_todo_types::Severity;

/// The record has not decayed yet.
pub const CODE_TODO: i32 = -1;
/// The record never decays.
pub const CODE_OFF: i32 = 0;
/// The warn date has been reached.
pub const CODE_WARNING: i32 = 1;
/// The error date has been reached, or no decay window applies.
pub const CODE_ERROR: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Unknown severity code: {0}")]
pub struct UnknownSeverity(pub i32);

/// Total over the four legal codes; anything else is an error, never a default.
pub fn severity_from_code(code: i32) -> Result<Severity, UnknownSeverity> {
    match code {
        CODE_TODO => Ok(Severity::Todo),
        CODE_OFF => Ok(Severity::Off),
        CODE_WARNING => Ok(Severity::Warning),
        CODE_ERROR => Ok(Severity::Error),
        other => Err(UnknownSeverity(other)),
    }
}
