//! Blank lines around documentation headers
//!
//! - SA1514: a header is preceded by a blank line
//! - SA1506: a header is not followed by a blank line

use curly_core::{CsSyntaxNode, Diagnostic, EditSet, LineKind, TextRange};

use super::lines_range;
use super::separation::missing_separation;
use crate::catalog::RuleId;
use crate::context::RuleContext;
use crate::deference::Situation;
use crate::fix::helpers::{
    delete_reported_blank_lines, enclosing_gap, insert_blank_line_at, trivia_token_at,
};
use crate::fix::{FixContext, FixError};
use crate::locator::DocHeader;

/// SA1506
pub fn check_blank_after_header(ctx: &RuleContext<'_>, element: &CsSyntaxNode) -> Vec<Diagnostic> {
    let Some(header) = DocHeader::of(element) else {
        return Vec::new();
    };
    let run = curly_core::trivia::blank_line_run_length(&header.lines, header.last + 1);
    if run == 0 {
        return Vec::new();
    }
    let blank = header.last + 1..=header.last + run;
    vec![ctx.report(RuleId::SA1506, lines_range(&header.lines, &blank))]
}

/// Fix for SA1506
pub fn fix_blank_after_header(fx: &FixContext<'_>, diagnostic: &Diagnostic) -> Result<EditSet, FixError> {
    delete_reported_blank_lines(fx, RuleId::SA1506, diagnostic)
}

/// Range of the header's first line, from its first comment
fn first_line_content(header: &DocHeader) -> Option<TextRange> {
    let line = &header.lines[header.first];
    let first = header.stream.items()[line.items.clone()]
        .iter()
        .find(|item| item.kind.is_comment())?;
    Some(TextRange::new(first.range().start(), line.content_end))
}

/// SA1514
pub fn check_blank_before_header(ctx: &RuleContext<'_>, element: &CsSyntaxNode) -> Vec<Diagnostic> {
    let Some(header) = DocHeader::of(element) else {
        return Vec::new();
    };
    let Some(above) = header.first.checked_sub(1).map(|i| &header.lines[i]) else {
        return Vec::new();
    };
    if above.is_blank() || above.kind == LineKind::Directive || header.is_first_in_scope() {
        return Vec::new();
    }
    if missing_separation(ctx, element)
        && ctx.defers(RuleId::SA1514, Situation::ElementMustBeSeparated)
    {
        return Vec::new();
    }
    first_line_content(&header)
        .map(|range| ctx.report(RuleId::SA1514, range))
        .into_iter()
        .collect()
}

/// Fix for SA1514: insert a blank line above the header
pub fn fix_blank_before_header(fx: &FixContext<'_>, diagnostic: &Diagnostic) -> Result<EditSet, FixError> {
    let missing = || FixError::inapplicable(RuleId::SA1514, "documentation header is gone");
    let comment = trivia_token_at(&fx.tree.root(), diagnostic.location.offset)
        .filter(|t| t.kind().is_comment())
        .ok_or_else(missing)?;
    let gap = enclosing_gap(&comment).ok_or_else(missing)?;
    let start = comment.text_range().start();
    let line = gap
        .lines()
        .into_iter()
        .find(|line| line.start <= start && start < line.end)
        .ok_or_else(missing)?;
    Ok(insert_blank_line_at(fx, line.start))
}
