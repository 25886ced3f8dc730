//! Core engine: reconciles lint results with the todo ledger and renders
//! the report.

mod formats;
mod reconcile;
mod render;
mod sarif;
mod style;

pub use formats::{AlternateFormat, UnknownFormat, render_alternate};
pub use reconcile::{
    DECAY_OVERRIDE_WITHOUT_UPDATE, FormatError, FormatterOptions, FormatterRun, TodoTally,
    run_formatter,
};
pub use render::{PrintOptions, Presentation, TodoInfo, format_todo_summary, pluralize, print_results};
pub use sarif::{SarifReport, render_sarif, render_sarif_json};
pub use style::Style;
