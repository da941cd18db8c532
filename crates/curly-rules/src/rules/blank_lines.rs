//! Blank lines and file boundaries
//!
//! - SA1507: more than one blank line in a row
//! - SA1517: blank lines at the start of the file
//! - SA1518: line endings at the end of the file

use curly_core::{
    CsSyntaxNode, Diagnostic, EditSet, NewlineAtEndOfFile, TextRange, TokenExt,
    TriviaEdit, TriviaKind, TriviaStream,
};

use super::lines_range;
use crate::catalog::RuleId;
use crate::context::RuleContext;
use crate::deference::Situation;
use crate::fix::helpers::delete_reported_blank_lines;
use crate::fix::{FixContext, FixError};

/// SA1507
///
/// The first blank line of a run is legal; the diagnostic spans the rest.
pub fn check_multiple_blank_lines(ctx: &RuleContext<'_>, _root: &CsSyntaxNode) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for gap in ctx.gaps() {
        let lines = gap.lines();
        let mut i = 0;
        while i < lines.len() {
            let run = curly_core::trivia::blank_line_run_length(&lines, i);
            if run == 0 {
                i += 1;
                continue;
            }
            let last = i + run - 1;
            let at_start = gap.at_file_start() && i == 0;
            let at_end = gap.at_file_end() && last + 2 == lines.len();
            let deferred = (at_start && ctx.defers(RuleId::SA1507, Situation::BlankRunAtFileStart))
                || (at_end && ctx.defers(RuleId::SA1507, Situation::BlankRunAtFileEnd));
            if run >= 2 && !deferred {
                diagnostics.push(ctx.report(RuleId::SA1507, lines_range(&lines, &(i + 1..=last))));
            }
            i += run;
        }
    }
    diagnostics
}

/// SA1517
pub fn check_blank_lines_at_file_start(ctx: &RuleContext<'_>, _root: &CsSyntaxNode) -> Vec<Diagnostic> {
    let Some(first) = ctx.significant_tokens().next() else {
        return Vec::new();
    };
    if first.is_eof() {
        return Vec::new();
    }
    let lines = TriviaStream::between(None, &first).lines();
    let run = curly_core::trivia::blank_line_run_length(&lines, 0);
    if run == 0 {
        return Vec::new();
    }
    vec![ctx.report(RuleId::SA1517, lines_range(&lines, &(0..=run - 1)))]
}

/// Line breaks and whitespace that end the file
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileTail {
    /// Whitespace and line breaks after the last content
    range: TextRange,
    /// Line breaks in the tail, plus one when the last content is a
    /// directive or disabled text carrying its own line break
    breaks: usize,
    carried_break: bool,
    /// Whitespace follows the last line break
    trailing_whitespace: bool,
}

impl FileTail {
    /// `None` for a file holding nothing but whitespace
    fn of(root: &CsSyntaxNode) -> Option<Self> {
        let eof = root.last_token().filter(|t| t.is_eof())?;
        let gap = TriviaStream::before(&eof);
        let items = gap.items();
        let content = items
            .iter()
            .rposition(|i| !matches!(i.kind, TriviaKind::Whitespace | TriviaKind::EndOfLine));
        if gap.at_file_start() && content.is_none() {
            return None;
        }
        let (start, carried_break) = match content {
            Some(index) => (items[index].range().end(), items[index].kind.ends_line()),
            None => (gap.range().start(), false),
        };
        let tail = &items[content.map_or(0, |i| i + 1)..];
        let breaks = tail
            .iter()
            .filter(|i| i.kind == TriviaKind::EndOfLine)
            .count()
            + usize::from(carried_break);
        let trailing_whitespace =
            breaks > 0 && tail.last().is_some_and(|i| i.kind == TriviaKind::Whitespace);
        Some(Self {
            range: TextRange::new(start, eof.text_range().start()),
            breaks,
            carried_break,
            trailing_whitespace,
        })
    }

    fn violates(&self, policy: NewlineAtEndOfFile) -> bool {
        match policy {
            NewlineAtEndOfFile::Allow => {
                self.breaks >= 2 || (self.breaks == 1 && self.trailing_whitespace)
            }
            NewlineAtEndOfFile::Require => self.breaks != 1 || self.trailing_whitespace,
            NewlineAtEndOfFile::Omit => self.breaks >= 1,
        }
    }
}

fn end_of_file_message(policy: NewlineAtEndOfFile) -> &'static str {
    match policy {
        NewlineAtEndOfFile::Allow => "Code should not contain blank lines at the end of the file",
        NewlineAtEndOfFile::Require => "File is required to end with a single newline character",
        NewlineAtEndOfFile::Omit => "File may not end with a newline character",
    }
}

/// SA1518
pub fn check_end_of_file(ctx: &RuleContext<'_>, root: &CsSyntaxNode) -> Vec<Diagnostic> {
    let policy = ctx.settings.newline_at_end_of_file;
    let Some(tail) = FileTail::of(root) else {
        return Vec::new();
    };
    if !tail.violates(policy) {
        return Vec::new();
    }
    vec![ctx.report_with_args(
        RuleId::SA1518,
        tail.range,
        vec![end_of_file_message(policy).to_string()],
    )]
}

/// Fix for SA1507 and SA1517
pub fn fix_blank_run(fx: &FixContext<'_>, diagnostic: &Diagnostic) -> Result<EditSet, FixError> {
    let rule = diagnostic
        .rule_id
        .parse::<RuleId>()
        .map_err(|e| FixError::NoFixAvailable { rule_id: e.0 })?;
    delete_reported_blank_lines(fx, rule, diagnostic)
}

/// Fix for SA1518: rewrite the tail to what the policy wants
pub fn fix_end_of_file(fx: &FixContext<'_>, _diagnostic: &Diagnostic) -> Result<EditSet, FixError> {
    let policy = fx.settings.newline_at_end_of_file;
    let tail = FileTail::of(&fx.tree.root())
        .ok_or_else(|| FixError::inapplicable(RuleId::SA1518, "file has no content"))?;
    let replacement = match policy {
        NewlineAtEndOfFile::Omit if tail.carried_break => {
            return Err(FixError::inapplicable(
                RuleId::SA1518,
                "the file ends with a directive, whose line break cannot be removed",
            ));
        }
        NewlineAtEndOfFile::Omit => "",
        NewlineAtEndOfFile::Allow if tail.breaks == 0 => "",
        _ if tail.carried_break => "",
        _ => fx.tree.line_ending(),
    };
    if fx.tree.text()[std::ops::Range::<usize>::from(tail.range)] == *replacement {
        return Ok(EditSet::new());
    }
    Ok(EditSet::single(TriviaEdit::replace(tail.range, replacement)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RuleSet;
    use crate::test_utils::{fix, fix_with_settings, lint, lint_with, lint_with_settings};
    use curly_core::LayoutSettings;

    fn settings(policy: NewlineAtEndOfFile) -> LayoutSettings {
        LayoutSettings {
            newline_at_end_of_file: policy,
            ..Default::default()
        }
    }

    fn end_of_file(source: &str, policy: NewlineAtEndOfFile) -> Vec<String> {
        lint_with_settings(source, &RuleSet::only(&[RuleId::SA1518]), &settings(policy))
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn test_three_blank_lines_report_once() {
        let source = "class A\n{\n    int x;\n\n\n\n    int y;\n}\n";
        let diagnostics = lint(source, &[RuleId::SA1507]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].location.line, 5);
        assert_eq!(&source[diagnostics[0].span()], "\n\n");
        assert_eq!(
            fix(source, &[RuleId::SA1507]),
            "class A\n{\n    int x;\n\n    int y;\n}\n"
        );
    }

    #[test]
    fn test_single_blank_line_is_legal() {
        let source = "class A\n{\n    int x;\n\n    int y;\n}\n";
        assert!(lint(source, &[RuleId::SA1507]).is_empty());
    }

    #[test]
    fn test_blank_lines_in_disabled_region_do_not_count() {
        let source = "class A\n{\n#if NEVER\n\n\n\n#endif\n    int x;\n}\n";
        assert!(lint(source, &[RuleId::SA1507]).is_empty());
    }

    #[test]
    fn test_file_start_defers_to_sa1517() {
        let source = "\n\n\nclass A\n{\n}\n";
        let diagnostics = lint(source, &[RuleId::SA1507, RuleId::SA1517]);
        let rules: Vec<_> = diagnostics.iter().map(|d| d.rule_id.as_str()).collect();
        assert_eq!(rules, vec!["SA1517"]);
        assert_eq!(diagnostics[0].span(), 0..3);

        let alone = lint_with(source, &RuleSet::only(&[RuleId::SA1507]));
        assert_eq!(alone.len(), 1);
        assert_eq!(alone[0].span(), 1..3);

        assert_eq!(fix(source, &[RuleId::SA1517]), "class A\n{\n}\n");
    }

    #[test]
    fn test_file_end_defers_to_sa1518() {
        let source = "class A\n{\n}\n\n\n\n";
        let diagnostics = lint(source, &[RuleId::SA1507, RuleId::SA1518]);
        let rules: Vec<_> = diagnostics.iter().map(|d| d.rule_id.as_str()).collect();
        assert_eq!(rules, vec!["SA1518"]);
        assert_eq!(fix(source, &[RuleId::SA1518]), "class A\n{\n}\n");
    }

    #[test]
    fn test_end_of_file_require() {
        let policy = NewlineAtEndOfFile::Require;
        assert_eq!(
            end_of_file("class A\n{\n}", policy),
            vec!["File is required to end with a single newline character"]
        );
        assert!(end_of_file("class A\n{\n}\n", policy).is_empty());
        assert_eq!(end_of_file("class A\n{\n}\n\n", policy).len(), 1);
        assert_ne!(
            end_of_file("class A\n{\n}\n\n", policy),
            end_of_file("class A\n{\n}\n\n", NewlineAtEndOfFile::Omit)
        );
        assert_eq!(
            fix_with_settings("class A\n{\n}", &[RuleId::SA1518], &settings(policy)),
            "class A\n{\n}\n"
        );
    }

    #[test]
    fn test_end_of_file_allow() {
        let policy = NewlineAtEndOfFile::Allow;
        assert!(end_of_file("class A\n{\n}", policy).is_empty());
        assert!(end_of_file("class A\n{\n}\n", policy).is_empty());
        assert_eq!(
            end_of_file("class A\n{\n}\n\n", policy),
            vec!["Code should not contain blank lines at the end of the file"]
        );
        assert_eq!(end_of_file("class A\n{\n}\n  ", policy).len(), 1);
    }

    #[test]
    fn test_end_of_file_omit() {
        let policy = NewlineAtEndOfFile::Omit;
        assert!(end_of_file("class A\n{\n}", policy).is_empty());
        assert_eq!(
            end_of_file("class A\n{\n}\n", policy),
            vec!["File may not end with a newline character"]
        );
        assert_eq!(
            fix_with_settings("class A\n{\n}\r\n\r\n", &[RuleId::SA1518], &settings(policy)),
            "class A\n{\n}"
        );
    }

    #[test]
    fn test_end_of_file_after_directive() {
        let source = "class A\n{\n}\n#region R\n#endregion\n";
        assert!(end_of_file(source, NewlineAtEndOfFile::Require).is_empty());
        assert!(end_of_file(source, NewlineAtEndOfFile::Allow).is_empty());
        assert_eq!(end_of_file(source, NewlineAtEndOfFile::Omit).len(), 1);
    }

    #[test]
    fn test_whitespace_only_file_is_skipped() {
        for policy in [NewlineAtEndOfFile::Allow, NewlineAtEndOfFile::Require, NewlineAtEndOfFile::Omit] {
            assert!(end_of_file("", policy).is_empty());
            assert!(end_of_file("\n\n", policy).is_empty());
        }
        assert!(lint("\n\n", &[RuleId::SA1517]).is_empty());
    }
}
