//! Building blocks shared by the rule fixes
//!
//! Fixes never create or move significant tokens. They split a line by
//! replacing the whitespace before a token with a line break plus
//! indentation, delete whole blank lines, or insert a line break at the start
//! of a line.

use curly_core::{
    CsSyntaxKind, CsSyntaxNode, CsSyntaxToken, Diagnostic, EditSet, TextRange, TextSize,
    TokenExt, TriviaEdit, TriviaKind, TriviaStream,
};

use super::{FixContext, FixError};
use crate::catalog::RuleId;
use crate::locator::construct_of;

/// Significant token starting at `offset`
pub fn significant_token_at(root: &CsSyntaxNode, offset: usize) -> Option<CsSyntaxToken> {
    let offset = TextSize::try_from(offset).ok()?;
    root.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| !t.kind().is_trivia() && t.text_range().start() == offset)
}

/// Trivia token starting at `offset`
pub fn trivia_token_at(root: &CsSyntaxNode, offset: usize) -> Option<CsSyntaxToken> {
    let offset = TextSize::try_from(offset).ok()?;
    root.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind().is_trivia() && t.text_range().start() == offset)
}

/// The significant token a diagnostic of `rule` points at
pub fn reported_token(
    fx: &FixContext<'_>,
    rule: RuleId,
    diagnostic: &Diagnostic,
) -> Result<CsSyntaxToken, FixError> {
    significant_token_at(&fx.tree.root(), diagnostic.location.offset)
        .ok_or_else(|| FixError::inapplicable(rule, "reported token no longer exists"))
}

/// Gap that contains a trivia token
pub fn enclosing_gap(trivia: &CsSyntaxToken) -> Option<TriviaStream> {
    let next = std::iter::successors(trivia.next_token(), |t| t.next_token())
        .find(|t| !t.kind().is_trivia())?;
    Some(TriviaStream::before(&next))
}

/// Indentation width of a 0-based line
///
/// Tabs advance to the next multiple of the configured tab size.
pub fn line_indent(fx: &FixContext<'_>, line: usize) -> usize {
    let tab_size = fx.settings.tab_size.max(1);
    let mut column = 0;
    for ch in fx.tree.line_text(line).chars() {
        match ch {
            ' ' => column += 1,
            '\t' => column = (column / tab_size + 1) * tab_size,
            _ => break,
        }
    }
    column
}

pub fn token_line_indent(fx: &FixContext<'_>, token: &CsSyntaxToken) -> usize {
    line_indent(fx, fx.tree.token_start_line(token))
}

/// Indentation a brace pair should sit at
///
/// An opening brace on its own line keeps its line's indentation; otherwise
/// the pair aligns with the first line of the construct owning it.
pub fn brace_level(fx: &FixContext<'_>, open: &CsSyntaxToken) -> usize {
    if curly_core::trivia::is_own_line(open) {
        return token_line_indent(fx, open);
    }
    let start = construct_of(open)
        .and_then(|node| node.first_token())
        .unwrap_or_else(|| open.clone());
    token_line_indent(fx, &start)
}

/// Move `token` to a new line indented by `indent` columns
///
/// Only whitespace directly before `token` is replaced. Returns `None` when
/// `token` already starts its line.
pub fn line_break_before(
    fx: &FixContext<'_>,
    token: &CsSyntaxToken,
    indent: usize,
) -> Option<TriviaEdit> {
    if token.is_eof() {
        return None;
    }
    let prev = token.prev_significant()?;
    if !fx.tree.same_line(&prev, token) {
        return None;
    }
    let gap = TriviaStream::between(Some(&prev), token);
    let split = gap
        .items()
        .iter()
        .rev()
        .find(|item| item.kind != TriviaKind::Whitespace)
        .map_or(prev.text_range().end(), |item| item.range().end());
    Some(TriviaEdit::replace(
        TextRange::new(split, token.text_range().start()),
        format!(
            "{}{}",
            fx.tree.line_ending(),
            fx.settings.indent_text(indent)
        ),
    ))
}

/// Add `edit` unless an identical edit is already in `edits`
pub fn push_unique(edits: &mut EditSet, edit: TriviaEdit) {
    if !edits.iter().any(|e| *e == edit) {
        edits.push(edit);
    }
}

/// Delete the blank lines covered by `range`
///
/// The range must hold nothing but whitespace and end with a line break, so
/// comments and directives are never touched.
pub fn delete_blank_lines(
    fx: &FixContext<'_>,
    rule: RuleId,
    range: TextRange,
) -> Result<EditSet, FixError> {
    let text = fx
        .tree
        .text()
        .get(std::ops::Range::<usize>::from(range))
        .ok_or_else(|| FixError::inapplicable(rule, "range lies outside the file"))?;
    let ends_line = text.ends_with(['\n', '\r', '\u{85}', '\u{2028}', '\u{2029}']);
    if text.is_empty() || !ends_line || !text.chars().all(char::is_whitespace) {
        return Err(FixError::inapplicable(rule, "range is not made of blank lines"));
    }
    Ok(EditSet::single(TriviaEdit::delete(range)))
}

/// Blank lines reported by a diagnostic whose span is the run itself
pub fn delete_reported_blank_lines(
    fx: &FixContext<'_>,
    rule: RuleId,
    diagnostic: &Diagnostic,
) -> Result<EditSet, FixError> {
    let span = diagnostic.span();
    let range = TextRange::new(
        TextSize::try_from(span.start).map_err(|_| FixError::inapplicable(rule, "bad span"))?,
        TextSize::try_from(span.end).map_err(|_| FixError::inapplicable(rule, "bad span"))?,
    );
    delete_blank_lines(fx, rule, range)
}

/// Insert a line break at `offset`, the start of a line
pub fn insert_blank_line_at(fx: &FixContext<'_>, offset: TextSize) -> EditSet {
    EditSet::single(TriviaEdit::insert(offset, fx.tree.line_ending()))
}

/// Make sure a blank line separates `token` from the previous token
///
/// When the two share a line, `token` moves two lines down at the previous
/// line's indentation; otherwise a line break is inserted at the start of
/// the first line after the previous token.
pub fn separate_from_previous(
    fx: &FixContext<'_>,
    rule: RuleId,
    token: &CsSyntaxToken,
) -> Result<EditSet, FixError> {
    let gap = TriviaStream::before(token);
    let Some(prev) = gap.prev() else {
        return Err(FixError::inapplicable(rule, "nothing precedes the token"));
    };
    if gap.has_blank_line() {
        return Ok(EditSet::new());
    }
    let lines = gap.lines();
    if lines.len() >= 2 {
        return Ok(insert_blank_line_at(fx, lines[1].start));
    }
    let indent = token_line_indent(fx, prev);
    let edit = line_break_before(fx, token, indent)
        .ok_or_else(|| FixError::inapplicable(rule, "token already starts its line"))?;
    let TriviaEdit { range, replacement } = edit;
    Ok(EditSet::single(TriviaEdit::replace(
        range,
        format!("{}{}", fx.tree.line_ending(), replacement),
    )))
}

/// Whether a token may stay on a brace's line after it
pub fn may_share_line_with_brace(kind: CsSyntaxKind) -> bool {
    matches!(
        kind,
        CsSyntaxKind::RParen
            | CsSyntaxKind::Comma
            | CsSyntaxKind::Semicolon
            | CsSyntaxKind::Dot
            | CsSyntaxKind::Eof
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use curly_core::{LayoutSettings, SyntaxTree, apply_edits};

    fn token(tree: &SyntaxTree, text: &str) -> CsSyntaxToken {
        tree.root()
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.text() == text && !t.kind().is_trivia())
            .unwrap()
    }

    #[test]
    fn test_line_indent_expands_tabs() {
        let tree = SyntaxTree::parse("class A\n{\n \tint x;\n}\n");
        let settings = LayoutSettings::default();
        let fx = FixContext::new(&tree, &settings);
        assert_eq!(line_indent(&fx, 2), 4);
        assert_eq!(line_indent(&fx, 0), 0);
    }

    #[test]
    fn test_line_break_before_strips_whitespace() {
        let tree = SyntaxTree::parse("class A {   \n}\n");
        let settings = LayoutSettings::default();
        let fx = FixContext::new(&tree, &settings);
        let open = token(&tree, "{");

        let edit = line_break_before(&fx, &open, 0).unwrap();
        assert_eq!(edit.range, TextRange::new(7.into(), 8.into()));
        let fixed = apply_edits(&tree, &EditSet::single(edit)).unwrap();
        assert_eq!(fixed.text(), "class A\n{   \n}\n");

        let close = token(&tree, "}");
        assert!(line_break_before(&fx, &close, 0).is_none());
    }

    #[test]
    fn test_line_break_keeps_block_comment() {
        let tree = SyntaxTree::parse("class A /* c */ { }\n");
        let settings = LayoutSettings::default();
        let fx = FixContext::new(&tree, &settings);
        let edit = line_break_before(&fx, &token(&tree, "{"), 0).unwrap();
        let fixed = apply_edits(&tree, &EditSet::single(edit)).unwrap();
        assert_eq!(fixed.text(), "class A /* c */\n{ }\n");
    }

    #[test]
    fn test_brace_level_follows_construct() {
        let source = "class A\n{\n    void M()\n    {\n        if (x) {\n        }\n    }\n}\n";
        let tree = SyntaxTree::parse(source);
        let settings = LayoutSettings::default();
        let fx = FixContext::new(&tree, &settings);
        let braces: Vec<_> = tree
            .root()
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == CsSyntaxKind::LBrace)
            .collect();
        assert_eq!(brace_level(&fx, &braces[1]), 4);
        assert_eq!(brace_level(&fx, &braces[2]), 8);
    }

    #[test]
    fn test_delete_blank_lines_rejects_comments() {
        let tree = SyntaxTree::parse("class A\n{\n// c\n\n}\n");
        let settings = LayoutSettings::default();
        let fx = FixContext::new(&tree, &settings);
        let comment = TextRange::new(10.into(), 15.into());
        assert!(delete_blank_lines(&fx, RuleId::SA1508, comment).is_err());
        let blank = TextRange::new(15.into(), 16.into());
        assert!(delete_blank_lines(&fx, RuleId::SA1508, blank).is_ok());
    }

    #[test]
    fn test_separate_from_previous_on_shared_line() {
        let tree = SyntaxTree::parse("class A\n{\n    void M() { } void N() { }\n}\n");
        let settings = LayoutSettings::default();
        let fx = FixContext::new(&tree, &settings);
        let second = tree
            .root()
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.text() == "void")
            .nth(1)
            .unwrap();
        let edits = separate_from_previous(&fx, RuleId::SA1516, &second).unwrap();
        let fixed = apply_edits(&tree, &edits).unwrap();
        assert_eq!(
            fixed.text(),
            "class A\n{\n    void M() { }\n\n    void N() { }\n}\n"
        );
    }
}
