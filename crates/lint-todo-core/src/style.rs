//! ANSI styling for the table report.

use lint_todo_types::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    enabled: bool,
}

impl Style {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn red(&self, s: &str) -> String {
        self.paint(31, 39, s)
    }

    pub fn green(&self, s: &str) -> String {
        self.paint(32, 39, s)
    }

    pub fn yellow(&self, s: &str) -> String {
        self.paint(33, 39, s)
    }

    pub fn cyan(&self, s: &str) -> String {
        self.paint(36, 39, s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(2, 22, s)
    }

    pub fn underline(&self, s: &str) -> String {
        self.paint(4, 24, s)
    }

    /// Colored severity symbol for a table row.
    pub fn symbol(&self, severity: Severity) -> String {
        let sym = symbol(severity);
        match severity {
            Severity::Error => self.red(sym),
            Severity::Warning => self.yellow(sym),
            Severity::Todo => self.cyan(sym),
            Severity::Off => self.green(sym),
        }
    }

    fn paint(&self, open: u8, close: u8, s: &str) -> String {
        if self.enabled && !s.is_empty() {
            format!("\x1b[{open}m{s}\x1b[{close}m")
        } else {
            s.to_string()
        }
    }
}

pub fn symbol(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "✖",
        Severity::Warning => "⚠",
        Severity::Todo => "ℹ",
        Severity::Off => "⏾",
    }
}
