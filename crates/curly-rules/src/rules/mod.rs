//! Layout rule evaluators
//!
//! Each submodule groups the rules that look at the same construct. A rule
//! exposes a `check_*` function that turns one subscribed node into
//! diagnostics and, when it can be repaired with trivia edits alone, a
//! `fix_*` function.

pub mod accessors;
pub mod blank_lines;
pub mod brace_blank_lines;
pub mod braces;
pub mod comments;
pub mod documentation;
pub mod omission;
pub mod separation;

use std::ops::RangeInclusive;

use curly_core::{CsSyntaxKind, GapLine, TextRange};

use crate::catalog::RuleId;
use crate::locator::{
    BRACE_OWNERS, DOCUMENTED_ELEMENTS, ELEMENT_CONTAINERS, ELEMENTS_WITH_BODY,
    OMITTABLE_BRACE_CONSTRUCTS,
};
use crate::registry::{RuleRegistration, Subscription};

/// Registrations of every built-in rule
pub fn builtin_rules() -> Vec<RuleRegistration> {
    use RuleId::*;
    use Subscription::{Nodes, Tree};

    vec![
        RuleRegistration {
            id: SA1500,
            subscription: Nodes(BRACE_OWNERS),
            check: braces::check_brace_placement,
            fix: Some(braces::fix_brace_placement),
        },
        RuleRegistration {
            id: SA1501,
            subscription: Nodes(&[CsSyntaxKind::Block, CsSyntaxKind::SwitchStmt]),
            check: braces::check_single_line_statement,
            fix: Some(braces::fix_single_line_body),
        },
        RuleRegistration {
            id: SA1502,
            subscription: Nodes(ELEMENTS_WITH_BODY),
            check: braces::check_single_line_element,
            fix: Some(braces::fix_single_line_body),
        },
        RuleRegistration {
            id: SA1503,
            subscription: Nodes(OMITTABLE_BRACE_CONSTRUCTS),
            check: omission::check_omitted_braces,
            fix: None,
        },
        RuleRegistration {
            id: SA1504,
            subscription: Nodes(&[CsSyntaxKind::AccessorList]),
            check: accessors::check_accessor_consistency,
            fix: Some(accessors::fix_accessor_consistency),
        },
        RuleRegistration {
            id: SA1505,
            subscription: Tree,
            check: brace_blank_lines::check_blank_after_open_brace,
            fix: Some(brace_blank_lines::fix_blank_run),
        },
        RuleRegistration {
            id: SA1506,
            subscription: Nodes(DOCUMENTED_ELEMENTS),
            check: documentation::check_blank_after_header,
            fix: Some(documentation::fix_blank_after_header),
        },
        RuleRegistration {
            id: SA1507,
            subscription: Tree,
            check: blank_lines::check_multiple_blank_lines,
            fix: Some(blank_lines::fix_blank_run),
        },
        RuleRegistration {
            id: SA1508,
            subscription: Tree,
            check: brace_blank_lines::check_blank_before_close_brace,
            fix: Some(brace_blank_lines::fix_blank_run),
        },
        RuleRegistration {
            id: SA1509,
            subscription: Tree,
            check: brace_blank_lines::check_blank_before_open_brace,
            fix: Some(brace_blank_lines::fix_blank_run),
        },
        RuleRegistration {
            id: SA1510,
            subscription: Tree,
            check: brace_blank_lines::check_blank_before_chained_block,
            fix: Some(brace_blank_lines::fix_blank_run),
        },
        RuleRegistration {
            id: SA1511,
            subscription: Tree,
            check: brace_blank_lines::check_blank_before_do_while,
            fix: Some(brace_blank_lines::fix_blank_run),
        },
        RuleRegistration {
            id: SA1512,
            subscription: Tree,
            check: comments::check_blank_after_comment,
            fix: Some(comments::fix_blank_after_comment),
        },
        RuleRegistration {
            id: SA1513,
            subscription: Tree,
            check: separation::check_blank_after_close_brace,
            fix: Some(separation::fix_blank_after_close_brace),
        },
        RuleRegistration {
            id: SA1514,
            subscription: Nodes(DOCUMENTED_ELEMENTS),
            check: documentation::check_blank_before_header,
            fix: Some(documentation::fix_blank_before_header),
        },
        RuleRegistration {
            id: SA1515,
            subscription: Tree,
            check: comments::check_blank_before_comment,
            fix: Some(comments::fix_blank_before_comment),
        },
        RuleRegistration {
            id: SA1516,
            subscription: Nodes(ELEMENT_CONTAINERS),
            check: separation::check_element_separation,
            fix: Some(separation::fix_element_separation),
        },
        RuleRegistration {
            id: SA1517,
            subscription: Tree,
            check: blank_lines::check_blank_lines_at_file_start,
            fix: Some(blank_lines::fix_blank_run),
        },
        RuleRegistration {
            id: SA1518,
            subscription: Tree,
            check: blank_lines::check_end_of_file,
            fix: Some(blank_lines::fix_end_of_file),
        },
        RuleRegistration {
            id: SA1519,
            subscription: Nodes(OMITTABLE_BRACE_CONSTRUCTS),
            check: omission::check_multi_line_child,
            fix: None,
        },
        RuleRegistration {
            id: SA1520,
            subscription: Nodes(&[CsSyntaxKind::IfStmt]),
            check: omission::check_consistent_braces,
            fix: None,
        },
    ]
}

/// Blank lines directly after the first line of a gap
pub(crate) fn blank_run_after_first(lines: &[GapLine]) -> Option<RangeInclusive<usize>> {
    let run = curly_core::trivia::blank_line_run_length(lines, 1);
    (run > 0).then(|| 1..=run)
}

/// Blank lines directly before the last line of a gap
pub(crate) fn blank_run_before_last(lines: &[GapLine]) -> Option<RangeInclusive<usize>> {
    let last = lines.len().checked_sub(2)?;
    let first = lines[..=last]
        .iter()
        .rposition(|line| !line.is_blank())
        .map_or(0, |i| i + 1);
    (first <= last).then_some(first..=last)
}

/// Byte range covering lines `run`
pub(crate) fn lines_range(lines: &[GapLine], run: &RangeInclusive<usize>) -> TextRange {
    TextRange::new(lines[*run.start()].start, lines[*run.end()].end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use curly_core::{SyntaxTree, TokenExt, TriviaStream};

    fn lines_before_last_token(source: &str) -> Vec<GapLine> {
        let tree = SyntaxTree::parse(source);
        let eof = tree
            .root()
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.is_eof())
            .unwrap();
        let close = eof.prev_significant().unwrap();
        TriviaStream::before(&close).lines()
    }

    #[test]
    fn test_blank_runs() {
        let lines = lines_before_last_token("class A\n{\n    int x;\n\n\n}");
        assert_eq!(blank_run_before_last(&lines), Some(1..=2));
        assert_eq!(blank_run_after_first(&lines), Some(1..=2));

        let lines = lines_before_last_token("class A\n{\n    int x;\n}");
        assert_eq!(blank_run_before_last(&lines), None);
        assert_eq!(blank_run_after_first(&lines), None);
    }
}
