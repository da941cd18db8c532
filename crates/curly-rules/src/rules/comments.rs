//! Blank lines around single-line comments
//!
//! - SA1512: an own-line comment is followed by a blank line
//! - SA1515: an own-line comment is not preceded by a blank line
//!
//! Commented-out code (`////`) is left alone by both rules.

use curly_core::{
    CsSyntaxKind, CsSyntaxNode, CsSyntaxToken, Diagnostic, EditSet, GapLine, LineKind,
    TriviaKind, TriviaStream,
};

use super::separation::missing_separation;
use crate::catalog::RuleId;
use crate::context::RuleContext;
use crate::deference::Situation;
use crate::fix::helpers::{delete_blank_lines, enclosing_gap, insert_blank_line_at, trivia_token_at};
use crate::fix::{FixContext, FixError};
use crate::locator::element_starting_at;

/// The single-line comment that starts an own-line comment line
fn own_line_comment(stream: &TriviaStream, line: &GapLine) -> Option<CsSyntaxToken> {
    if line.after_token || line.kind != LineKind::Comment {
        return None;
    }
    let item = stream.items()[line.items.clone()]
        .iter()
        .find(|item| item.kind != TriviaKind::Whitespace)?;
    (item.kind == TriviaKind::SingleLineComment
        && !curly_core::trivia::is_commented_out_code(&item.token))
    .then(|| item.token.clone())
}

/// Comment lines of the whole file, with the gap and line index they sit at
fn comment_lines(ctx: &RuleContext<'_>) -> Vec<(TriviaStream, Vec<GapLine>, usize, CsSyntaxToken)> {
    let mut found = Vec::new();
    for gap in ctx.gaps() {
        if !gap.has_comment() {
            continue;
        }
        let lines = gap.lines();
        let comments: Vec<_> = lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| own_line_comment(&gap, line).map(|token| (i, token)))
            .collect();
        for (i, token) in comments {
            found.push((gap.clone(), lines.clone(), i, token));
        }
    }
    found
}

/// Comment lines at the top of the file, before any code
fn is_file_header(stream: &TriviaStream, lines: &[GapLine], index: usize) -> bool {
    stream.at_file_start() && lines[..index].iter().all(|l| l.kind == LineKind::Comment)
}

/// SA1512
pub fn check_blank_after_comment(ctx: &RuleContext<'_>, _root: &CsSyntaxNode) -> Vec<Diagnostic> {
    comment_lines(ctx)
        .into_iter()
        .filter(|(stream, lines, i, _)| {
            lines.get(i + 1).is_some_and(GapLine::is_blank) && !is_file_header(stream, lines, *i)
        })
        .map(|(_, _, _, comment)| ctx.report(RuleId::SA1512, comment.text_range()))
        .collect()
}

/// Tokens after which a comment is first in its scope
fn opens_scope(token: &CsSyntaxToken) -> bool {
    match token.kind() {
        CsSyntaxKind::LBrace | CsSyntaxKind::LParen | CsSyntaxKind::LBracket => true,
        CsSyntaxKind::Colon => token.parent().is_some_and(|p| {
            matches!(
                p.kind(),
                CsSyntaxKind::CaseSwitchLabel | CsSyntaxKind::DefaultSwitchLabel
            )
        }),
        _ => false,
    }
}

/// The line before comment line `index` lets the comment stand without a
/// blank line above it
fn preceded_acceptably(stream: &TriviaStream, lines: &[GapLine], index: usize) -> bool {
    let Some(prev) = index.checked_sub(1).map(|i| &lines[i]) else {
        return true;
    };
    if prev.is_blank() {
        return true;
    }
    match prev.kind {
        LineKind::Comment | LineKind::Disabled => true,
        LineKind::Directive => stream.items()[prev.items.clone()]
            .iter()
            .filter_map(|item| item.directive())
            .any(|d| d.opens_section() || d.terminates_section()),
        LineKind::Blank => prev.after_token && stream.prev().is_some_and(opens_scope),
    }
}

/// SA1515
pub fn check_blank_before_comment(ctx: &RuleContext<'_>, _root: &CsSyntaxNode) -> Vec<Diagnostic> {
    comment_lines(ctx)
        .into_iter()
        .filter(|(stream, lines, i, _)| !preceded_acceptably(stream, lines, *i))
        .filter(|(stream, _, _, _)| {
            let leads_unseparated = element_starting_at(stream.next())
                .is_some_and(|element| missing_separation(ctx, &element));
            !(leads_unseparated
                && ctx.defers(RuleId::SA1515, Situation::CommentLeadsSeparatedElement))
        })
        .map(|(_, _, _, comment)| ctx.report(RuleId::SA1515, comment.text_range()))
        .collect()
}

/// The reported comment with its gap lines and line index
fn reported_comment_line(
    fx: &FixContext<'_>,
    rule: RuleId,
    diagnostic: &Diagnostic,
) -> Result<(Vec<GapLine>, usize), FixError> {
    let missing = || FixError::inapplicable(rule, "reported comment no longer exists");
    let comment = trivia_token_at(&fx.tree.root(), diagnostic.location.offset)
        .filter(|t| t.kind() == CsSyntaxKind::CommentLine)
        .ok_or_else(missing)?;
    let gap = enclosing_gap(&comment).ok_or_else(missing)?;
    let lines = gap.lines();
    let start = comment.text_range().start();
    let index = lines
        .iter()
        .position(|line| line.start <= start && start < line.end)
        .ok_or_else(missing)?;
    Ok((lines, index))
}

/// Fix for SA1512: delete the blank lines below the comment
pub fn fix_blank_after_comment(fx: &FixContext<'_>, diagnostic: &Diagnostic) -> Result<EditSet, FixError> {
    let (lines, index) = reported_comment_line(fx, RuleId::SA1512, diagnostic)?;
    let run = curly_core::trivia::blank_line_run_length(&lines, index + 1);
    if run == 0 {
        return Ok(EditSet::new());
    }
    let range = super::lines_range(&lines, &(index + 1..=index + run));
    delete_blank_lines(fx, RuleId::SA1512, range)
}

/// Fix for SA1515: insert a blank line above the comment
pub fn fix_blank_before_comment(fx: &FixContext<'_>, diagnostic: &Diagnostic) -> Result<EditSet, FixError> {
    let (lines, index) = reported_comment_line(fx, RuleId::SA1515, diagnostic)?;
    Ok(insert_blank_line_at(fx, lines[index].start))
}
