//! Table report: per-file aligned rows, tally line and todo summary.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use lint_todo_domain::relative_path;
use lint_todo_types::{DaysToDecay, Diagnostic, LintResult, Severity};

use crate::style::{Style, symbol};

/// Columns the table may not use on either side of the message.
const MARGIN_WIDTHS: usize = 9;
const MIN_TERMINAL_COLUMNS: usize = 80;

/// Where and how the report is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub color: bool,
    /// Terminal width; `None` when output is not a terminal.
    pub columns: Option<usize>,
    /// Paths are displayed relative to this directory.
    pub cwd: PathBuf,
}

impl Presentation {
    /// Plain, unwrapped output.
    pub fn plain(cwd: impl Into<PathBuf>) -> Self {
        Self {
            color: false,
            columns: None,
            cwd: cwd.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoInfo {
    pub added: usize,
    pub removed: usize,
    pub days_to_decay: Option<DaysToDecay>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintOptions {
    pub include_todo: bool,
    pub update_todo: bool,
    pub todo_info: Option<TodoInfo>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Counts {
    errors: usize,
    warnings: usize,
    todos: usize,
}

pub fn print_results(
    results: &[LintResult],
    options: &PrintOptions,
    presentation: &Presentation,
) -> String {
    let style = Style::new(presentation.color);
    let mut output = invalid_options(results, &style);
    output.push_str(&deprecations(results, &style));

    let mut counts = Counts::default();
    for result in results.iter().filter(|r| !r.ignored) {
        let diagnostics = with_parse_errors(result);

        for d in &diagnostics {
            match d.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Todo if options.include_todo => counts.todos += 1,
                Severity::Todo | Severity::Off => {}
            }
        }

        let visible: Vec<&Diagnostic> = diagnostics
            .iter()
            .filter(|d| match d.severity {
                Severity::Off => false,
                Severity::Todo => options.include_todo,
                Severity::Error | Severity::Warning => true,
            })
            .collect();

        output.push_str(&format_table(
            &visible,
            result.source.as_deref().unwrap_or(""),
            presentation,
            &style,
        ));
    }

    let mut output = output.trim().to_string();
    if !output.is_empty() {
        output = format!("\n{output}\n\n");

        let problems = counts.errors + counts.warnings;
        let total = problems + counts.todos;
        if total > 0 {
            let mut tally = format!(
                "{problems} {} ({} {}, {} {}",
                pluralize("problem", problems),
                counts.errors,
                pluralize("error", counts.errors),
                counts.warnings,
                pluralize("warning", counts.warnings),
            );
            if options.include_todo {
                tally.push_str(&format!(
                    ", {} {}",
                    counts.todos,
                    pluralize("todo", counts.todos)
                ));
            }
            tally.push(')');
            output.push_str(&tally);
            output.push_str("\n\n");
        }
    }

    if options.update_todo
        && let Some(info) = &options.todo_info
    {
        output.push_str(&format_todo_summary(info));
    }

    output
}

/// `✔ <added> todos created, <removed> todos removed` plus the decay window.
pub fn format_todo_summary(info: &TodoInfo) -> String {
    let mut summary = format!(
        "✔ {} todos created, {} todos removed",
        info.added, info.removed
    );

    let days = info.days_to_decay.unwrap_or_default();
    let mut parts = Vec::new();
    if let Some(warn) = days.warn.filter(|&n| n > 0) {
        parts.push(format!("warn after {warn}"));
    }
    if let Some(error) = days.error.filter(|&n| n > 0) {
        parts.push(format!("error after {error}"));
    }
    if !parts.is_empty() {
        summary.push_str(&format!(" ({} days)", parts.join(", ")));
    }

    summary
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

fn invalid_options(results: &[LintResult], style: &Style) -> String {
    let mut seen = BTreeSet::new();
    let mut out = String::from("\n");
    for w in results.iter().flat_map(|r| &r.invalid_option_warnings) {
        if seen.insert(w.text.as_str()) {
            out.push_str(&style.red("Invalid Option: "));
            out.push_str(&w.text);
            out.push('\n');
        }
    }
    out
}

fn deprecations(results: &[LintResult], style: &Style) -> String {
    let all: Vec<_> = results.iter().flat_map(|r| &r.deprecations).collect();
    if all.is_empty() {
        return String::new();
    }

    let mut seen = BTreeSet::new();
    let mut out = String::from("\n");
    for d in all {
        if !seen.insert(d.text.as_str()) {
            continue;
        }
        out.push_str(&style.yellow("Deprecation Warning: "));
        out.push_str(&d.text);
        if let Some(reference) = &d.reference {
            out.push_str(&style.dim(" See: "));
            out.push_str(&style.dim(&style.underline(reference)));
        }
        out.push('\n');
    }
    out
}

/// The result's diagnostics followed by its parse errors as `error` rows.
fn with_parse_errors(result: &LintResult) -> Vec<Diagnostic> {
    let mut diagnostics = result.warnings.clone();
    diagnostics.extend(result.parse_errors.iter().map(|e| Diagnostic {
        line: e.line,
        column: e.column,
        end_line: None,
        end_column: None,
        rule: Some(e.stylelint_type.clone()),
        severity: Severity::Error,
        text: format!("{} ({})", e.text, e.stylelint_type),
    }));
    diagnostics
}

fn display_source(source: &str, cwd: &Path, style: &Style) -> String {
    if source.starts_with('<') {
        return style.underline(source);
    }
    relative_path(cwd, source)
}

fn clean_message(d: &Diagnostic) -> String {
    static CONTROL: OnceLock<Option<Regex>> = OnceLock::new();
    let control = CONTROL.get_or_init(|| Regex::new(r"[\x01-\x1A]+").ok());

    let mut text = match control {
        Some(re) => re.replace_all(&d.text, " ").into_owned(),
        None => d.text.clone(),
    };
    if text.ends_with('.') {
        text.pop();
    }
    let suffix = format!(" ({})", d.rule.as_deref().unwrap_or(""));
    if let Some(idx) = text.rfind(&suffix)
        && idx + suffix.len() == text.len()
    {
        text.truncate(idx);
    }
    text
}

struct Row {
    line: String,
    column: String,
    severity: Severity,
    message: String,
    rule: String,
}

fn format_table(
    messages: &[&Diagnostic],
    source: &str,
    presentation: &Presentation,
    style: &Style,
) -> String {
    if messages.is_empty() {
        return String::new();
    }

    let mut ordered = messages.to_vec();
    ordered.sort_by_key(|d| (d.has_position(), d.line, d.column));

    let mut out = String::from("\n");
    if !source.is_empty() {
        out.push_str(&display_source(source, &presentation.cwd, style));
        out.push('\n');
    }

    let rows: Vec<Row> = ordered
        .iter()
        .map(|d| Row {
            line: if d.line > 0 { d.line.to_string() } else { String::new() },
            column: if d.column > 0 { d.column.to_string() } else { String::new() },
            severity: d.severity,
            message: clean_message(d),
            rule: d.rule.clone().unwrap_or_default(),
        })
        .collect();

    let mut widths = [1usize; 5];
    for row in &rows {
        let cells = [
            row.line.as_str(),
            row.column.as_str(),
            symbol(row.severity),
            row.message.as_str(),
            row.rule.as_str(),
        ];
        for (w, cell) in widths.iter_mut().zip(cells) {
            *w = (*w).max(width(cell));
        }
    }
    let message_width = message_width(&widths, presentation.columns);
    // Left padding of every column before the message, plus their widths.
    let message_indent = widths[0] + widths[1] + widths[2] + 6;

    for row in &rows {
        let position = if !row.line.is_empty() && !row.column.is_empty() {
            let joined = format!("{}:{}", row.line, row.column);
            let pad = widths[0] + widths[1] + 1 - width(&joined);
            let (left, right) = pad_split(pad, width(&row.line), widths[0]);
            format!(
                "{}{}{}",
                " ".repeat(left),
                style.dim(&joined),
                " ".repeat(right)
            )
        } else {
            format!(
                "{:>w0$} {:<w1$}",
                row.line,
                row.column,
                w0 = widths[0],
                w1 = widths[1]
            )
        };

        let chunks = wrap(&row.message, message_width);
        let sym_pad = widths[2].saturating_sub(1);
        let sym = format!(
            "{}{}{}",
            " ".repeat(sym_pad / 2),
            style.symbol(row.severity),
            " ".repeat(sym_pad - sym_pad / 2)
        );

        let first = chunks.first().map(String::as_str).unwrap_or("");
        let line = format!(
            " {position}  {sym}  {first}{}  {}",
            " ".repeat(message_width.saturating_sub(width(first))),
            style.dim(&row.rule)
        );
        out.push_str(line.trim_end());
        out.push('\n');

        for chunk in chunks.iter().skip(1) {
            out.push_str(&" ".repeat(message_indent));
            out.push_str(chunk.trim_end());
            out.push('\n');
        }
    }

    out
}

/// Splits the padding around `line:column` so the colon stays where the
/// column boundary is.
fn pad_split(total: usize, line_width: usize, line_column_width: usize) -> (usize, usize) {
    let left = line_column_width.saturating_sub(line_width).min(total);
    (left, total - left)
}

fn message_width(widths: &[usize; 5], columns: Option<usize>) -> usize {
    let width = widths[3];
    let Some(columns) = columns else {
        return width;
    };

    let available = columns.max(MIN_TERMINAL_COLUMNS);
    let full: usize = widths.iter().sum();
    if available > full + MARGIN_WIDTHS {
        return width;
    }
    available
        .saturating_sub(full - width + MARGIN_WIDTHS)
        .max(1)
}

/// Greedy word wrap; words longer than `max` are split.
fn wrap(text: &str, max: usize) -> Vec<String> {
    if width(text) <= max || max <= 1 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split(' ').filter(|w| !w.is_empty()) {
        let mut word = word.to_string();
        while width(&word) > max {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(split_at_width(&word, max));
            lines.push(std::mem::replace(&mut word, rest));
        }
        if word.is_empty() {
            continue;
        }
        if current.is_empty() {
            current = word;
        } else if width(&current) + 1 + width(&word) <= max {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Byte index where the display width of `s` would first exceed `max`.
/// Always advances by at least one character.
fn split_at_width(s: &str, max: usize) -> usize {
    let mut used = 0;
    for (idx, ch) in s.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > max && idx > 0 {
            return idx;
        }
        used += w;
    }
    s.len()
}

/// Terminal columns `s` occupies.
fn width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lint_todo_types::{Deprecation, InvalidOptionWarning, ParseError};

    fn diag(line: u32, column: u32, rule: &str, severity: Severity, text: &str) -> Diagnostic {
        Diagnostic {
            line,
            column,
            end_line: None,
            end_column: None,
            rule: Some(rule.to_string()),
            severity,
            text: text.to_string(),
        }
    }

    fn result(source: &str, warnings: Vec<Diagnostic>) -> LintResult {
        LintResult {
            warnings,
            ..LintResult::for_source(source)
        }
    }

    fn plain() -> Presentation {
        Presentation::plain("/repo")
    }

    #[test]
    fn pluralizes_only_exact_one() {
        assert_eq!(pluralize("error", 0), "errors");
        assert_eq!(pluralize("error", 1), "error");
        assert_eq!(pluralize("error", 2), "errors");
    }

    #[test]
    fn summary_omits_unset_decay() {
        let info = TodoInfo {
            added: 3,
            removed: 1,
            days_to_decay: None,
        };
        assert_eq!(format_todo_summary(&info), "✔ 3 todos created, 1 todos removed");

        let info = TodoInfo {
            days_to_decay: Some(DaysToDecay {
                warn: None,
                error: Some(10),
            }),
            ..info
        };
        assert_eq!(
            format_todo_summary(&info),
            "✔ 3 todos created, 1 todos removed (error after 10 days)"
        );

        let info = TodoInfo {
            days_to_decay: Some(DaysToDecay {
                warn: Some(5),
                error: Some(10),
            }),
            ..info
        };
        assert_eq!(
            format_todo_summary(&info),
            "✔ 3 todos created, 1 todos removed (warn after 5, error after 10 days)"
        );
    }

    #[test]
    fn empty_results_print_nothing() {
        let out = print_results(&[result("/repo/a.css", vec![])], &PrintOptions::default(), &plain());
        assert_eq!(out, "");
    }

    #[test]
    fn renders_table_with_tally() {
        let results = vec![result(
            "/repo/src/a.css",
            vec![
                diag(12, 3, "color-no-hex", Severity::Error, "Unexpected hex color \"#fff\" (color-no-hex)"),
                diag(2, 10, "block-no-empty", Severity::Warning, "Unexpected empty block (block-no-empty)"),
            ],
        )];

        let out = print_results(&results, &PrintOptions::default(), &plain());
        assert!(out.starts_with("\nsrc/a.css\n"));
        assert!(out.ends_with("warning)\n\n"));
        insta::assert_snapshot!(out.trim(), @r##"
        src/a.css
          2:10  ⚠  Unexpected empty block       block-no-empty
         12:3   ✖  Unexpected hex color "#fff"  color-no-hex

        2 problems (1 error, 1 warning)
        "##);
    }

    #[test]
    fn todos_hidden_unless_included() {
        let results = vec![result(
            "/repo/a.css",
            vec![
                diag(1, 1, "a", Severity::Todo, "Deferred"),
                diag(2, 1, "b", Severity::Off, "Never decays"),
            ],
        )];

        let hidden = print_results(&results, &PrintOptions::default(), &plain());
        assert_eq!(hidden, "");

        let options = PrintOptions {
            include_todo: true,
            ..PrintOptions::default()
        };
        let shown = print_results(&results, &options, &plain());
        assert!(shown.contains("ℹ  Deferred"));
        assert!(!shown.contains("Never decays"));
        assert!(shown.ends_with("0 problems (0 errors, 0 warnings, 1 todo)\n\n"));
    }

    #[test]
    fn positionless_rows_sort_first() {
        let results = vec![result(
            "/repo/a.css",
            vec![
                diag(3, 1, "a", Severity::Error, "Later"),
                diag(0, 0, "invalid-todo-violation-rule", Severity::Error, "Todo violation"),
            ],
        )];
        let out = print_results(&results, &PrintOptions::default(), &plain());
        let rows: Vec<&str> = out.lines().filter(|l| l.contains('✖')).collect();
        assert!(rows[0].contains("Todo violation"));
        assert!(rows[1].contains("3:1"));
    }

    #[test]
    fn parse_errors_are_counted_once() {
        let mut r = result("/repo/a.css", vec![]);
        r.parse_errors.push(ParseError {
            line: 4,
            column: 2,
            stylelint_type: "parseError".to_string(),
            text: "Unclosed block".to_string(),
        });
        let out = print_results(&[r], &PrintOptions::default(), &plain());
        assert!(out.contains("4:2  ✖  Unclosed block  parseError"));
        assert!(out.contains("1 problem (1 error, 0 warnings)"));
    }

    #[test]
    fn notices_are_deduplicated() {
        let mut a = result("/repo/a.css", vec![]);
        let mut b = result("/repo/b.css", vec![]);
        for r in [&mut a, &mut b] {
            r.invalid_option_warnings.push(InvalidOptionWarning {
                text: "Invalid option \"x\"".to_string(),
            });
            r.deprecations.push(Deprecation {
                text: "Rule is deprecated".to_string(),
                reference: Some("https://stylelint.io".to_string()),
            });
        }

        let out = print_results(&[a, b], &PrintOptions::default(), &plain());
        assert_eq!(out.matches("Invalid Option:").count(), 1);
        assert_eq!(out.matches("Deprecation Warning:").count(), 1);
        assert!(out.contains("Deprecation Warning: Rule is deprecated See: https://stylelint.io"));
        // No diagnostics, so no tally.
        assert!(!out.contains("problem"));
    }

    #[test]
    fn ignored_results_render_nothing() {
        let mut r = result("/repo/a.css", vec![diag(1, 1, "a", Severity::Error, "x")]);
        r.ignored = true;
        assert_eq!(print_results(&[r], &PrintOptions::default(), &plain()), "");
    }

    #[test]
    fn update_mode_appends_summary() {
        let options = PrintOptions {
            update_todo: true,
            todo_info: Some(TodoInfo {
                added: 2,
                ..TodoInfo::default()
            }),
            ..PrintOptions::default()
        };
        let out = print_results(&[], &options, &plain());
        assert_eq!(out, "✔ 2 todos created, 0 todos removed");
    }

    #[test]
    fn message_cleanup() {
        let d = diag(1, 1, "color-no-hex", Severity::Error, "Bad\tcolor\n\"#fff\" (color-no-hex)");
        assert_eq!(clean_message(&d), "Bad color \"#fff\"");

        let d = diag(1, 1, "x", Severity::Error, "Ends with a period.");
        assert_eq!(clean_message(&d), "Ends with a period");
    }

    #[test]
    fn wraps_only_on_narrow_terminal() {
        let long = "word ".repeat(30);
        let results = vec![result(
            "/repo/a.css",
            vec![diag(1, 1, "some-rule", Severity::Error, long.trim())],
        )];

        let unwrapped = print_results(&results, &PrintOptions::default(), &plain());
        assert_eq!(unwrapped.lines().filter(|l| l.contains("word")).count(), 1);

        let tty = Presentation {
            columns: Some(80),
            ..plain()
        };
        let wrapped = print_results(&results, &PrintOptions::default(), &tty);
        let lines: Vec<&str> = wrapped.lines().filter(|l| l.contains("word")).collect();
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| width(l) <= 80));
        // Continuation lines start where the message column starts.
        let column = |l: &str| l.find("word").map(|i| width(&l[..i]));
        let start = column(lines[0]);
        assert!(start.is_some());
        assert!(lines[1..].iter().all(|l| column(l) == start));
    }

    #[test]
    fn wide_characters_wrap_by_display_width() {
        let long = "漢".repeat(45);
        let results = vec![result(
            "/repo/a.css",
            vec![diag(1, 1, "some-rule", Severity::Error, &long)],
        )];
        let tty = Presentation {
            columns: Some(80),
            ..plain()
        };

        let out = print_results(&results, &PrintOptions::default(), &tty);
        let rows: Vec<&str> = out.lines().filter(|l| l.contains('漢')).collect();
        assert!(rows.len() > 1);
        assert!(rows.iter().all(|l| width(l) <= 80), "{rows:?}");
        assert_eq!(rows.iter().map(|l| l.matches('漢').count()).sum::<usize>(), 45);
    }

    #[test]
    fn split_respects_display_width() {
        assert_eq!(split_at_width("漢字ab", 3), "漢".len());
        assert_eq!(split_at_width("abcd", 2), 2);
        assert_eq!(split_at_width("漢", 1), "漢".len());
    }

    #[test]
    fn message_width_rules() {
        let widths = [2, 2, 1, 20, 10];
        assert_eq!(message_width(&widths, None), 20);
        assert_eq!(message_width(&widths, Some(40)), 20);
        let wide = [2, 2, 1, 100, 10];
        assert_eq!(message_width(&wide, Some(100)), 100 - (115 - 100 + 9));
    }

    #[test]
    fn colors_only_when_enabled() {
        let results = vec![result("/repo/a.css", vec![diag(1, 2, "r", Severity::Error, "x")])];
        let colored = Presentation {
            color: true,
            ..plain()
        };
        let out = print_results(&results, &PrintOptions::default(), &colored);
        assert!(out.contains("\x1b[31m✖\x1b[39m"));
        assert!(out.contains("\x1b[2m1:2\x1b[22m"));

        let out = print_results(&results, &PrintOptions::default(), &plain());
        assert!(!out.contains('\x1b'));
    }
}
