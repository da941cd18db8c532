//! Output formatting and reporting
//!
//! Renders lint results as human-readable text with code frames, as JSON, or
//! as GitHub Actions annotations, and renders fixes as unified diffs.

use colored::{ColoredString, Colorize};
use curly_core::{Diagnostic, Severity};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use unicode_width::UnicodeWidthStr;

use crate::OutputFormat;

/// Diagnostics of one file, with the text they refer to when it is not the
/// file on disk
#[derive(Debug)]
pub struct FileReport {
    pub file_path: PathBuf,
    pub source: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    fn source(&self) -> Option<String> {
        self.source
            .clone()
            .or_else(|| fs::read_to_string(&self.file_path).ok())
    }
}

/// Summary statistics for linting results
#[derive(Debug, Clone, Default)]
pub struct LintSummary {
    pub files_checked: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub hints: usize,
    pub fixes_applied: usize,
    pub files_fixed: usize,
    /// Files that could not be processed
    pub failures: usize,
}

impl LintSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&mut self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => self.errors += 1,
                Severity::Warning => self.warnings += 1,
                Severity::Info => self.info += 1,
                Severity::Hint => self.hints += 1,
            }
        }
    }

    pub fn total_issues(&self) -> usize {
        self.errors + self.warnings + self.info + self.hints
    }

    pub fn has_issues(&self) -> bool {
        self.total_issues() > 0
    }
}

/// Output formatter for different formats
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format and print linting results
    ///
    /// With `dry_run` the fix counts describe fixes that were shown, not
    /// written.
    pub fn print_results(
        &self,
        reports: &[FileReport],
        summary: &LintSummary,
        dry_run: bool,
    ) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Human => {
                print!("{}", render_human(reports));
                print!("{}", render_summary(summary, dry_run));
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&render_json(reports, summary))?
                );
            }
            OutputFormat::Github => {
                for diagnostic in reports.iter().flat_map(|r| &r.diagnostics) {
                    println!("{}", render_github(diagnostic));
                }
            }
        }
        Ok(())
    }
}

fn severity_color(severity: Severity, text: &str) -> ColoredString {
    match severity {
        Severity::Error => text.red(),
        Severity::Warning => text.yellow(),
        Severity::Info => text.blue(),
        Severity::Hint => text.dimmed(),
    }
}

/// All diagnostics of all files, each with its code frame
pub fn render_human(reports: &[FileReport]) -> String {
    let mut output = String::new();
    for report in reports.iter().filter(|r| !r.diagnostics.is_empty()) {
        let source = report.source();
        for diagnostic in &report.diagnostics {
            output.push_str(&render_diagnostic(diagnostic, source.as_deref()));
            output.push('\n');
        }
    }
    output
}

/// Header line plus a code frame when the source is available
pub fn render_diagnostic(diagnostic: &Diagnostic, source: Option<&str>) -> String {
    let severity = format!("{:?}", diagnostic.severity).to_lowercase();
    let mut output = format!(
        "{}{}: {}\n",
        severity_color(diagnostic.severity, &severity).bold(),
        format!("[{}]", diagnostic.rule_id).dimmed(),
        diagnostic.message.bold()
    );
    output.push_str(&format!(
        "  {}[{}:{}:{}]\n",
        "┌─".blue(),
        diagnostic.location.file.display(),
        diagnostic.location.line,
        diagnostic.location.column
    ));
    if let Some(frame) = source.and_then(|s| render_code_frame(diagnostic, s)) {
        output.push_str(&frame);
    }
    output
}

/// Lines around the diagnostic with carets under the reported text
fn render_code_frame(diagnostic: &Diagnostic, source: &str) -> Option<String> {
    let lines: Vec<&str> = source.lines().collect();
    let error_line = diagnostic.location.line;
    if error_line == 0 || error_line > lines.len() {
        return None;
    }

    let start_line = error_line.saturating_sub(2).max(1);
    let end_line = (error_line + 2).min(lines.len());
    let gutter_width = end_line.to_string().len();

    let mut frame = format!("  {}\n", "│".blue());
    for line_num in start_line..=end_line {
        let content = lines[line_num - 1];
        let number = format!("{line_num:>gutter_width$}");
        let marker = if line_num == error_line {
            severity_color(diagnostic.severity, ">")
        } else {
            " ".normal()
        };
        frame.push_str(&format!("{} {} {}", marker, number.dimmed(), "│".dimmed()));
        if !content.is_empty() {
            frame.push(' ');
            frame.push_str(content);
        }
        frame.push('\n');
        if line_num != error_line {
            continue;
        }

        // Columns count characters; carets follow display width
        let before: String = content
            .chars()
            .take(diagnostic.location.column.saturating_sub(1))
            .collect();
        let rest = &content[before.len()..];
        let reported: String = rest
            .char_indices()
            .take_while(|(i, _)| *i < diagnostic.location.length)
            .map(|(_, c)| c)
            .collect();
        let carets = "^".repeat(reported.width().max(1));
        frame.push_str(&format!(
            "  {} {} {}{}\n",
            " ".repeat(gutter_width),
            "│".dimmed(),
            " ".repeat(before.width()),
            severity_color(diagnostic.severity, &carets)
        ));
    }
    Some(frame)
}

fn render_summary(summary: &LintSummary, dry_run: bool) -> String {
    let mut output = String::new();
    if !summary.has_issues() && summary.failures == 0 {
        output.push_str(&format!("{}\n", "No issues found".green()));
    }

    output.push_str(&format!("\n{}\n", "Summary:".bold()));
    output.push_str(&format!("  Files checked: {}\n", summary.files_checked));
    if summary.errors > 0 {
        output.push_str(&format!("  Errors: {}\n", summary.errors.to_string().red()));
    }
    if summary.warnings > 0 {
        output.push_str(&format!(
            "  Warnings: {}\n",
            summary.warnings.to_string().yellow()
        ));
    }
    if summary.info + summary.hints > 0 {
        output.push_str(&format!(
            "  Info: {}\n",
            (summary.info + summary.hints).to_string().blue()
        ));
    }
    if summary.failures > 0 {
        output.push_str(&format!(
            "  Failed files: {}\n",
            summary.failures.to_string().red()
        ));
    }
    if summary.fixes_applied > 0 {
        let verb = if dry_run { "Fixes available" } else { "Fixes applied" };
        output.push_str(&format!(
            "  {}: {} in {} file{}\n",
            verb,
            summary.fixes_applied.to_string().green(),
            summary.files_fixed,
            if summary.files_fixed == 1 { "" } else { "s" }
        ));
    }
    output
}

/// JSON document with every diagnostic and the summary
pub fn render_json(reports: &[FileReport], summary: &LintSummary) -> serde_json::Value {
    let issues: Vec<&Diagnostic> = reports.iter().flat_map(|r| &r.diagnostics).collect();
    serde_json::json!({
        "files_checked": summary.files_checked,
        "issues": issues,
        "summary": {
            "errors": summary.errors,
            "warnings": summary.warnings,
            "info": summary.info,
            "hints": summary.hints,
            "total": summary.total_issues(),
            "fixes_applied": summary.fixes_applied,
            "failures": summary.failures
        }
    })
}

/// GitHub Actions workflow command for one diagnostic
pub fn render_github(diagnostic: &Diagnostic) -> String {
    let level = match diagnostic.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info | Severity::Hint => "notice",
    };
    let location = &diagnostic.location;
    let mut properties = format!(
        "file={},line={},col={}",
        location.file.display(),
        location.line,
        location.column
    );
    if let (Some(end_line), Some(end_column)) = (location.end_line, location.end_column) {
        properties.push_str(&format!(",endLine={end_line},endColumn={end_column}"));
    }
    format!(
        "::{} {}::{} ({})",
        level, properties, diagnostic.message, diagnostic.rule_id
    )
}

/// Unified diff between the original and the fixed text of a file
pub fn render_diff(original: &str, modified: &str, file_path: &Path) -> String {
    let diff = TextDiff::from_lines(original, modified);
    let mut output = String::new();

    output.push_str(&format!("{}\n", format!("--- {}", file_path.display()).bold()));
    output.push_str(&format!(
        "{}\n",
        format!("+++ {} (fixed)", file_path.display()).bold()
    ));

    for group in diff.grouped_ops(3) {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old_start = first.old_range().start;
        let new_start = first.new_range().start;
        let old_len = last.old_range().end - old_start;
        let new_len = last.new_range().end - new_start;
        let header = format!(
            "@@ -{},{} +{},{} @@",
            old_start + 1,
            old_len,
            new_start + 1,
            new_len
        );
        output.push_str(&format!("{}\n", header.cyan()));

        for op in &group {
            for change in diff.iter_changes(op) {
                let text = change.value().trim_end_matches(['\r', '\n']);
                let line = match change.tag() {
                    ChangeTag::Delete => format!("-{text}").red().to_string(),
                    ChangeTag::Insert => format!("+{text}").green().to_string(),
                    ChangeTag::Equal => format!(" {text}"),
                };
                output.push_str(&line);
                output.push('\n');
            }
        }
    }

    output
}

/// Utility functions for output formatting
pub mod utils {
    /// Format duration in human-readable format
    pub fn format_duration(duration: std::time::Duration) -> String {
        let total_ms = duration.as_millis();

        if total_ms < 1000 {
            format!("{total_ms}ms")
        } else if total_ms < 60_000 {
            format!("{:.1}s", total_ms as f64 / 1000.0)
        } else {
            let minutes = total_ms / 60_000;
            let seconds = (total_ms % 60_000) as f64 / 1000.0;
            format!("{minutes}m {seconds:.1}s")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curly_core::Location;
    use insta::assert_snapshot;
    use std::time::Duration;

    fn diagnostic(line: usize, column: usize, offset: usize, length: usize) -> Diagnostic {
        colored::control::set_override(false);
        Diagnostic::new(
            "SA1505",
            Severity::Warning,
            "An opening brace should not be followed by a blank line",
            Location::new(PathBuf::from("A.cs"), line, column, offset, length).with_end(4, 1),
        )
    }

    #[test]
    fn test_render_diagnostic_with_frame() {
        let source = "class A\n{\n\n    int x;\n}\n";
        let rendered = render_diagnostic(&diagnostic(3, 1, 10, 1), Some(source));
        assert_snapshot!(rendered, @r"
        warning[SA1505]: An opening brace should not be followed by a blank line
          ┌─[A.cs:3:1]
          │
          1 │ class A
          2 │ {
        > 3 │
            │ ^
          4 │     int x;
          5 │ }
        ");
    }

    #[test]
    fn test_carets_follow_display_width() {
        colored::control::set_override(false);
        let source = "// 日本 x\n";
        let diagnostic = Diagnostic::new(
            "SA1512",
            Severity::Warning,
            "m",
            Location::new(PathBuf::from("A.cs"), 1, 4, 3, 6),
        );
        let rendered = render_diagnostic(&diagnostic, Some(source));
        let caret_line = rendered.lines().last().unwrap();
        assert_eq!(caret_line, "    │    ^^^^");
    }

    #[test]
    fn test_render_without_source() {
        let rendered = render_diagnostic(&diagnostic(3, 1, 10, 1), None);
        assert_eq!(rendered.lines().count(), 2);
    }

    #[test]
    fn test_render_github() {
        let rendered = render_github(&diagnostic(3, 1, 10, 1));
        assert_eq!(
            rendered,
            "::warning file=A.cs,line=3,col=1,endLine=4,endColumn=1::An opening brace should not be followed by a blank line (SA1505)"
        );
    }

    #[test]
    fn test_render_json() {
        let reports = vec![FileReport {
            file_path: PathBuf::from("A.cs"),
            source: None,
            diagnostics: vec![diagnostic(3, 1, 10, 1)],
        }];
        let mut summary = LintSummary::new();
        summary.files_checked = 1;
        summary.count(&reports[0].diagnostics);

        let json = render_json(&reports, &summary);
        assert_eq!(json["files_checked"], 1);
        assert_eq!(json["summary"]["warnings"], 1);
        assert_eq!(json["issues"][0]["ruleId"], "SA1505");
        assert_eq!(json["issues"][0]["location"]["line"], 3);
    }

    #[test]
    fn test_render_diff() {
        colored::control::set_override(false);
        let diff = render_diff(
            "class A\n{\n\n    int x;\n}\n",
            "class A\n{\n    int x;\n}\n",
            Path::new("A.cs"),
        );
        assert_snapshot!(diff, @r"
        --- A.cs
        +++ A.cs (fixed)
        @@ -1,5 +1,4 @@
         class A
         {
        -
             int x;
         }
        ");
    }

    #[test]
    fn test_summary_counts() {
        colored::control::set_override(false);
        let mut summary = LintSummary::new();
        summary.files_checked = 2;
        summary.warnings = 3;
        summary.fixes_applied = 2;
        summary.files_fixed = 1;

        let rendered = render_summary(&summary, false);
        assert!(rendered.contains("Files checked: 2"));
        assert!(rendered.contains("Warnings: 3"));
        assert!(rendered.contains("Fixes applied: 2 in 1 file\n"));
        assert!(render_summary(&summary, true).contains("Fixes available"));
        assert!(render_summary(&LintSummary::new(), false).contains("No issues found"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(utils::format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(utils::format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(utils::format_duration(Duration::from_secs(90)), "1m 30.0s");
    }
}
