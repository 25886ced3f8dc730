//! Alternate output formats selected with `FORMAT_TODO_AS`.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use lint_todo_domain::relative_path;
use lint_todo_types::{LintResult, Severity};

use crate::render::pluralize;
use crate::sarif::render_sarif_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternateFormat {
    Sarif,
    Json,
    Compact,
    Unix,
    Github,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("You must use a valid FORMAT_TODO_AS: {0}")]
pub struct UnknownFormat(pub String);

impl AlternateFormat {
    pub const ALL: [AlternateFormat; 5] = [
        AlternateFormat::Sarif,
        AlternateFormat::Json,
        AlternateFormat::Compact,
        AlternateFormat::Unix,
        AlternateFormat::Github,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AlternateFormat::Sarif => "sarif",
            AlternateFormat::Json => "json",
            AlternateFormat::Compact => "compact",
            AlternateFormat::Unix => "unix",
            AlternateFormat::Github => "github",
        }
    }
}

impl fmt::Display for AlternateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlternateFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// Renders `results` in `format`. `todo` diagnostics are never included.
pub fn render_alternate(
    format: AlternateFormat,
    results: &[LintResult],
    cwd: &Path,
) -> Result<String, serde_json::Error> {
    let results = without_todos(results);
    match format {
        AlternateFormat::Sarif => render_sarif_json(&results, cwd),
        AlternateFormat::Json => serde_json::to_string(&results),
        AlternateFormat::Compact => Ok(render_compact(&results)),
        AlternateFormat::Unix => Ok(render_unix(&results)),
        AlternateFormat::Github => Ok(render_github(&results, cwd)),
    }
}

fn without_todos(results: &[LintResult]) -> Vec<LintResult> {
    results
        .iter()
        .cloned()
        .map(|mut r| {
            r.warnings.retain(|w| w.severity != Severity::Todo);
            r
        })
        .collect()
}

fn source(result: &LintResult) -> &str {
    result.source.as_deref().unwrap_or("")
}

fn render_compact(results: &[LintResult]) -> String {
    let lines: Vec<String> = results
        .iter()
        .flat_map(|r| {
            r.warnings.iter().map(move |w| {
                format!(
                    "{}: line {}, col {}, {} - {}",
                    source(r),
                    w.line,
                    w.column,
                    w.severity,
                    w.text
                )
            })
        })
        .collect();
    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    }
}

fn render_unix(results: &[LintResult]) -> String {
    let mut out = String::new();
    let mut total = 0;
    for r in results {
        for w in &r.warnings {
            out.push_str(&format!(
                "{}:{}:{}: {} [{}]\n",
                source(r),
                w.line,
                w.column,
                w.text,
                w.severity
            ));
            total += 1;
        }
    }
    if total > 0 {
        out.push_str(&format!("\n{total} {}\n", pluralize("problem", total)));
    }
    out
}

fn render_github(results: &[LintResult], cwd: &Path) -> String {
    let mut out = String::new();
    for r in results {
        let path = relative_path(cwd, source(r));
        for w in &r.warnings {
            let level = match w.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Todo | Severity::Off => "notice",
            };
            let mut props = format!("file={path},line={},col={}", w.line, w.column);
            if let Some(end_line) = w.end_line {
                props.push_str(&format!(",endLine={end_line}"));
            }
            if let Some(end_column) = w.end_column {
                props.push_str(&format!(",endColumn={end_column}"));
            }
            out.push_str(&format!(
                "::{level} {props},title=Stylelint problem::{} [{}]\n",
                w.text,
                w.rule.as_deref().unwrap_or("")
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lint_todo_types::Diagnostic;

    fn sample() -> Vec<LintResult> {
        let diag = |line, severity, rule: &str| Diagnostic {
            line,
            column: 2,
            end_line: Some(line),
            end_column: Some(9),
            rule: Some(rule.to_string()),
            severity,
            text: format!("{rule} failed"),
        };
        vec![LintResult {
            warnings: vec![
                diag(1, Severity::Error, "color-no-hex"),
                diag(2, Severity::Todo, "block-no-empty"),
                diag(3, Severity::Warning, "font-family-no-missing-generic-family-keyword"),
            ],
            ..LintResult::for_source("/repo/a.css")
        }]
    }

    #[test]
    fn parses_known_names_only() {
        for format in AlternateFormat::ALL {
            assert_eq!(format.as_str().parse::<AlternateFormat>(), Ok(format));
        }
        let err = "stylish".parse::<AlternateFormat>().unwrap_err();
        assert_eq!(err.to_string(), "You must use a valid FORMAT_TODO_AS: stylish");
    }

    #[test]
    fn todos_are_excluded() {
        for format in AlternateFormat::ALL {
            let out = render_alternate(format, &sample(), Path::new("/repo")).unwrap();
            assert!(!out.contains("block-no-empty"), "{format} leaked a todo");
        }
    }

    #[test]
    fn unix_format() {
        let out = render_alternate(AlternateFormat::Unix, &sample(), Path::new("/repo")).unwrap();
        insta::assert_snapshot!(out, @r"
        /repo/a.css:1:2: color-no-hex failed [error]
        /repo/a.css:3:2: font-family-no-missing-generic-family-keyword failed [warning]

        2 problems
        ");
    }

    #[test]
    fn compact_format() {
        let out = render_alternate(AlternateFormat::Compact, &sample(), Path::new("/repo")).unwrap();
        assert_eq!(
            out.lines().next(),
            Some("/repo/a.css: line 1, col 2, error - color-no-hex failed")
        );
    }

    #[test]
    fn github_format() {
        let out = render_alternate(AlternateFormat::Github, &sample(), Path::new("/repo")).unwrap();
        assert_eq!(
            out.lines().next(),
            Some("::error file=a.css,line=1,col=2,endLine=1,endColumn=9,title=Stylelint problem::color-no-hex failed [color-no-hex]")
        );
    }

    #[test]
    fn json_format_round_trips() {
        let out = render_alternate(AlternateFormat::Json, &sample(), Path::new("/repo")).unwrap();
        let back: Vec<LintResult> = serde_json::from_str(&out).unwrap();
        assert_eq!(back[0].warnings.len(), 2);
    }
}
