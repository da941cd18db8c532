//! Trivia edits and their application to a syntax tree
//!
//! An [`EditSet`] holds replacements whose ranges lie in the gaps between
//! significant tokens. [`apply_edits`] relexes every edited stretch of a gap
//! as trivia and splices the new trivia tokens into the green tree. Untouched
//! subtrees are shared with the original tree and significant tokens are never
//! created, removed or reordered.
//!
//! Directives and disabled text act as anchors inside a gap: they are kept
//! verbatim and only the whitespace, line breaks and comments between them
//! are relexed.

use std::ops::Range;

use rowan::{GreenToken, NodeOrToken, TextRange, TextSize};
use thiserror::Error;

use crate::SyntaxTree;
use crate::cst::{
    CsSyntaxElement, CsSyntaxKind, CsSyntaxNode, CsSyntaxToken, TokenExt, lex_trivia_fragment,
    lex_with_trivia,
};

/// One replacement inside an inter-token gap
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriviaEdit {
    pub range: TextRange,
    pub replacement: String,
}

impl TriviaEdit {
    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self {
            range: TextRange::empty(offset),
            replacement: text.into(),
        }
    }

    pub fn replace(range: TextRange, text: impl Into<String>) -> Self {
        Self {
            range,
            replacement: text.into(),
        }
    }

    pub fn delete(range: TextRange) -> Self {
        Self::replace(range, String::new())
    }

    /// Ranges overlap or share an endpoint
    pub fn touches(&self, other: &TriviaEdit) -> bool {
        self.range.start() <= other.range.end() && other.range.start() <= self.range.end()
    }
}

/// Edits produced for one fix, or merged from several fixes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSet {
    edits: Vec<TriviaEdit>,
}

impl EditSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(edit: TriviaEdit) -> Self {
        Self { edits: vec![edit] }
    }

    pub fn push(&mut self, edit: TriviaEdit) {
        self.edits.push(edit);
    }

    pub fn insert(&mut self, offset: TextSize, text: impl Into<String>) {
        self.push(TriviaEdit::insert(offset, text));
    }

    pub fn replace(&mut self, range: TextRange, text: impl Into<String>) {
        self.push(TriviaEdit::replace(range, text));
    }

    pub fn delete(&mut self, range: TextRange) {
        self.push(TriviaEdit::delete(range));
    }

    pub fn extend(&mut self, other: EditSet) {
        self.edits.extend(other.edits);
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn edits(&self) -> &[TriviaEdit] {
        &self.edits
    }

    pub fn iter(&self) -> impl Iterator<Item = &TriviaEdit> {
        self.edits.iter()
    }

    /// Any edit of `self` touches an edit of `other`
    pub fn conflicts_with(&self, other: &EditSet) -> bool {
        self.edits
            .iter()
            .any(|a| other.edits.iter().any(|b| a != b && a.touches(b)))
    }

    /// Smallest range covering every edit
    pub fn covering_range(&self) -> Option<TextRange> {
        self.edits
            .iter()
            .map(|e| e.range)
            .reduce(|a, b| a.cover(b))
    }

    /// Apply the edits to plain text, ignoring tree structure
    pub fn apply_to_text(&self, text: &str) -> String {
        let mut edits: Vec<_> = self.edits.iter().collect();
        edits.sort_by_key(|e| (e.range.start(), e.range.end()));
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for edit in edits {
            let start = usize::from(edit.range.start());
            if start < cursor {
                continue;
            }
            out.push_str(&text[cursor..start]);
            out.push_str(&edit.replacement);
            cursor = usize::from(edit.range.end());
        }
        out.push_str(&text[cursor.min(text.len())..]);
        out
    }
}

impl FromIterator<TriviaEdit> for EditSet {
    fn from_iter<T: IntoIterator<Item = TriviaEdit>>(iter: T) -> Self {
        Self {
            edits: iter.into_iter().collect(),
        }
    }
}

/// Why an edit set cannot be applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("edit {range:?} lies outside the tree (length {len:?})")]
    OutsideTree { range: TextRange, len: TextSize },

    #[error("edit {range:?} intersects a significant token")]
    IntersectsToken { range: TextRange },

    #[error("edits {first:?} and {second:?} overlap")]
    Overlapping { first: TextRange, second: TextRange },

    #[error("edit {range:?} cuts into disabled text")]
    DisabledText { range: TextRange },

    #[error("replacement for {range:?} does not lex as trivia")]
    NonTriviaReplacement { range: TextRange },

    #[error("edit {range:?} moves a directive off the start of its line")]
    BrokenDirectiveLine { range: TextRange },

    #[error("edit {range:?} lets a line comment swallow the next token")]
    SwallowedToken { range: TextRange },

    #[error("edit {range:?} glues two tokens together")]
    MergedTokens { range: TextRange },

    #[error("trivia of gap {range:?} are not siblings")]
    SplitGap { range: TextRange },

    #[error("edits raise the syntax error count from {before} to {after}")]
    IntroducedErrors { before: usize, after: usize },
}

/// Apply `edits` to `tree`, producing a new tree
///
/// Edits are validated against the gaps they fall into and applied from the
/// end of the file backwards, so offsets of pending edits stay valid.
pub fn apply_edits(tree: &SyntaxTree, edits: &EditSet) -> Result<SyntaxTree, EditError> {
    if edits.is_empty() {
        return Ok(tree.clone());
    }

    let len = TextSize::of(tree.text());
    let mut sorted: Vec<&TriviaEdit> = edits.iter().collect();
    sorted.sort_by_key(|e| (e.range.start(), e.range.end()));

    for edit in &sorted {
        if edit.range.end() > len {
            return Err(EditError::OutsideTree {
                range: edit.range,
                len,
            });
        }
    }
    for pair in sorted.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.range.end() > b.range.start() || (a.range.is_empty() && a.range == b.range) {
            return Err(EditError::Overlapping {
                first: a.range,
                second: b.range,
            });
        }
    }

    let significant = significant_tokens(&tree.root());
    let mut groups: Vec<(usize, Vec<&TriviaEdit>)> = Vec::new();
    for edit in sorted {
        let index = gap_index(&significant, edit.range)?;
        match groups.last_mut() {
            Some((last, group)) if *last == index => group.push(edit),
            _ => groups.push((index, vec![edit])),
        }
    }

    let mut green = tree.green().clone();
    for (index, group) in groups.into_iter().rev() {
        let root = CsSyntaxNode::new_root(green.clone());
        let tokens = significant_tokens(&root);
        let next = tokens
            .get(index)
            .cloned()
            .ok_or(EditError::IntersectsToken {
                range: group[0].range,
            })?;
        let prev = index.checked_sub(1).and_then(|i| tokens.get(i).cloned());
        green = rewrite_gap(tree.text(), prev.as_ref(), &next, &group)?;
    }

    let edited = tree.rebuild(green);
    if edited.error_count() > tree.error_count() {
        return Err(EditError::IntroducedErrors {
            before: tree.error_count(),
            after: edited.error_count(),
        });
    }
    tracing::debug!("Applied {} trivia edits", edits.len());
    Ok(edited)
}

fn significant_tokens(root: &CsSyntaxNode) -> Vec<CsSyntaxToken> {
    root.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| !t.kind().is_trivia())
        .collect()
}

/// Index of the significant token whose preceding gap contains `range`
fn gap_index(significant: &[CsSyntaxToken], range: TextRange) -> Result<usize, EditError> {
    let index = significant.partition_point(|t| t.text_range().start() < range.end());
    let gap_start = index
        .checked_sub(1)
        .and_then(|i| significant.get(i))
        .map_or(TextSize::from(0), |t| t.text_range().end());
    if index >= significant.len() || gap_start > range.start() {
        return Err(EditError::IntersectsToken { range });
    }
    Ok(index)
}

/// Kind and text of a trivia token in a rebuilt gap
type Piece = (CsSyntaxKind, String);

fn is_anchor(kind: CsSyntaxKind) -> bool {
    matches!(kind, CsSyntaxKind::Directive | CsSyntaxKind::DisabledText)
}

fn rewrite_gap(
    text: &str,
    prev: Option<&CsSyntaxToken>,
    next: &CsSyntaxToken,
    edits: &[&TriviaEdit],
) -> Result<rowan::GreenNode, EditError> {
    let gap_start = prev.map_or(TextSize::from(0), |t| t.text_range().end());
    let gap_end = next.text_range().start();
    let gap_range = TextRange::new(gap_start, gap_end);
    let old = next.gap_before();

    for edit in edits {
        for token in old.iter().filter(|t| is_anchor(t.kind())) {
            let anchor = token.text_range();
            let cuts = if edit.range.is_empty() {
                anchor.start() < edit.range.start() && edit.range.start() < anchor.end()
            } else {
                edit.range.start() < anchor.end() && anchor.start() < edit.range.end()
            };
            if cuts {
                return Err(if token.kind() == CsSyntaxKind::DisabledText {
                    EditError::DisabledText { range: edit.range }
                } else {
                    EditError::BrokenDirectiveLine { range: edit.range }
                });
            }
        }
    }

    // Segments are the runs of non-anchor trivia between anchors.
    let mut pieces: Vec<Piece> = Vec::new();
    let mut segment: Vec<&CsSyntaxToken> = Vec::new();
    let mut segment_start = gap_start;
    let mut after_anchor = false;
    let mut remaining: &[&TriviaEdit] = edits;
    for token in old.iter().map(Some).chain(std::iter::once(None)) {
        if let Some(t) = token
            && !is_anchor(t.kind())
        {
            segment.push(t);
            continue;
        }
        let anchor = token;
        let segment_end = anchor.map_or(gap_end, |t| t.text_range().start());
        let taken = remaining
            .iter()
            .take_while(|e| e.range.end() <= segment_end)
            .count();
        let (mine, rest) = remaining.split_at(taken);
        remaining = rest;
        if mine.is_empty() {
            pieces.extend(segment.iter().map(|t| (t.kind(), t.text().to_string())));
        } else {
            let range = TextRange::new(segment_start, segment_end);
            let at_line_start = after_anchor || prev.is_none();
            pieces.extend(relex_segment(text, range, at_line_start, mine)?);
        }
        segment.clear();
        if let Some(a) = anchor {
            pieces.push((a.kind(), a.text().to_string()));
            segment_start = a.text_range().end();
            after_anchor = true;
        }
    }

    check_pieces(&pieces, prev, next, gap_range)?;

    let new_tokens: Vec<NodeOrToken<rowan::GreenNode, GreenToken>> = pieces
        .iter()
        .map(|(kind, text)| NodeOrToken::Token(GreenToken::new((*kind).into(), text)))
        .collect();

    if let (Some(first), Some(last)) = (old.first(), old.last()) {
        let parent = first.parent().ok_or(EditError::SplitGap { range: gap_range })?;
        if old.iter().any(|t| t.parent().as_ref() != Some(&parent)) {
            return Err(EditError::SplitGap { range: gap_range });
        }
        let replaced = parent
            .green()
            .splice_children(first.index()..last.index() + 1, new_tokens);
        Ok(parent.replace_with(replaced))
    } else {
        let (parent, index) =
            empty_gap_position(prev, next).ok_or(EditError::SplitGap { range: gap_range })?;
        let replaced = parent.green().splice_children(index..index, new_tokens);
        Ok(parent.replace_with(replaced))
    }
}

fn relex_segment(
    text: &str,
    range: TextRange,
    at_line_start: bool,
    edits: &[&TriviaEdit],
) -> Result<Vec<Piece>, EditError> {
    let Range { start, end } = Range::<usize>::from(range);
    let mut new_text = String::with_capacity(end - start);
    let mut cursor = start;
    for edit in edits {
        let edit_start = usize::from(edit.range.start());
        new_text.push_str(&text[cursor..edit_start]);
        new_text.push_str(&edit.replacement);
        cursor = usize::from(edit.range.end());
    }
    new_text.push_str(&text[cursor..end]);

    let covering = edits
        .iter()
        .map(|e| e.range)
        .reduce(|a, b| a.cover(b))
        .unwrap_or(range);
    let tokens = lex_trivia_fragment(&new_text, at_line_start)
        .filter(|tokens| tokens.iter().all(|t| !is_anchor(t.kind)))
        .ok_or(EditError::NonTriviaReplacement { range: covering })?;
    Ok(tokens.into_iter().map(|t| (t.kind, t.text)).collect())
}

fn check_pieces(
    pieces: &[Piece],
    prev: Option<&CsSyntaxToken>,
    next: &CsSyntaxToken,
    gap: TextRange,
) -> Result<(), EditError> {
    for (i, (kind, _)) in pieces.iter().enumerate() {
        match kind {
            CsSyntaxKind::Directive => {
                let before = pieces[..i]
                    .iter()
                    .rev()
                    .find(|(k, _)| *k != CsSyntaxKind::Whitespace);
                let at_line_start = match before {
                    Some((k, _)) => matches!(
                        k,
                        CsSyntaxKind::Newline | CsSyntaxKind::Directive | CsSyntaxKind::DisabledText
                    ),
                    None => prev.is_none(),
                };
                if !at_line_start {
                    return Err(EditError::BrokenDirectiveLine { range: gap });
                }
            }
            CsSyntaxKind::DisabledText => {
                let follows_directive = i > 0
                    && matches!(
                        pieces[i - 1].0,
                        CsSyntaxKind::Directive | CsSyntaxKind::DisabledText
                    );
                if !follows_directive {
                    return Err(EditError::DisabledText { range: gap });
                }
            }
            CsSyntaxKind::CommentLine | CsSyntaxKind::DocComment => {
                let line_ends = match pieces.get(i + 1) {
                    Some((k, _)) => *k == CsSyntaxKind::Newline,
                    None => next.kind() == CsSyntaxKind::Eof,
                };
                if !line_ends {
                    return Err(EditError::SwallowedToken { range: gap });
                }
            }
            _ => {}
        }
    }

    let glued = match (pieces.first(), pieces.last()) {
        (Some((_, first)), Some((_, last))) => {
            prev.is_some_and(|p| glues(p.text(), first))
                || (next.kind() != CsSyntaxKind::Eof && glues(last, next.text()))
        }
        _ => prev.is_some_and(|p| next.kind() != CsSyntaxKind::Eof && glues(p.text(), next.text())),
    };
    if glued {
        return Err(EditError::MergedTokens { range: gap });
    }
    Ok(())
}

/// `left` followed directly by `right` no longer lexes with a boundary
/// between them
fn glues(left: &str, right: &str) -> bool {
    let combined = format!("{left}{right}");
    let (tokens, _) = lex_with_trivia(&combined);
    !tokens.iter().any(|t| t.span.start == left.len())
}

/// Parent node and child index where trivia of an empty gap belong
///
/// Gap trivia are children of the deepest node containing both neighbours,
/// placed right before the child that holds `next`.
fn empty_gap_position(
    prev: Option<&CsSyntaxToken>,
    next: &CsSyntaxToken,
) -> Option<(CsSyntaxNode, usize)> {
    let parent = match prev {
        Some(prev) => {
            let prev_ancestors: Vec<CsSyntaxNode> = prev.parent_ancestors().collect();
            next.parent_ancestors()
                .find(|n| prev_ancestors.contains(n))?
        }
        None => next.parent_ancestors().last()?,
    };
    let mut element: CsSyntaxElement = NodeOrToken::Token(next.clone());
    loop {
        let up = element.parent()?;
        if up == parent {
            return Some((parent, element.index()));
        }
        element = NodeOrToken::Node(up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(tree: &SyntaxTree, text: &str) -> CsSyntaxToken {
        tree.root()
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.text() == text && !t.kind().is_trivia())
            .unwrap()
    }

    fn kinds(tree: &SyntaxTree) -> Vec<CsSyntaxKind> {
        tree.root()
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .map(|t| t.kind())
            .filter(|k| !k.is_trivia())
            .collect()
    }

    fn offset(n: u32) -> TextSize {
        TextSize::from(n)
    }

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(offset(start), offset(end))
    }

    #[test]
    fn test_edited_tree_keeps_syntax_errors() {
        let tree = SyntaxTree::parse("class A { void M( }\n");
        assert!(tree.has_errors());
        let open = token(&tree, "{");
        let edits = EditSet::single(TriviaEdit::insert(open.text_range().end(), "\n"));
        let fixed = apply_edits(&tree, &edits).unwrap();
        assert_eq!(fixed.text(), "class A {\n void M( }\n");
        assert_eq!(fixed.error_count(), tree.error_count());
    }

    #[test]
    fn test_insert_line_break_between_braces() {
        let tree = SyntaxTree::parse("class A { }\n");
        let open = token(&tree, "{");
        let edits = EditSet::single(TriviaEdit::replace(
            TextRange::new(open.text_range().end(), token(&tree, "}").text_range().start()),
            "\n",
        ));
        let fixed = apply_edits(&tree, &edits).unwrap();
        assert_eq!(fixed.text(), "class A {\n}\n");
        assert_eq!(kinds(&fixed), kinds(&tree));
        let open = token(&fixed, "{");
        assert_eq!(
            open.gap_after().iter().map(|t| t.kind()).collect::<Vec<_>>(),
            vec![CsSyntaxKind::Newline]
        );
    }

    #[test]
    fn test_delete_blank_lines() {
        let source = "a();\n\n\nb();\n";
        let tree = SyntaxTree::parse(source);
        let fixed = apply_edits(&tree, &EditSet::single(TriviaEdit::delete(range(5, 7)))).unwrap();
        assert_eq!(fixed.text(), "a();\nb();\n");
        assert_eq!(fixed.root().text().to_string(), fixed.text());
    }

    #[test]
    fn test_insert_into_empty_gap() {
        let tree = SyntaxTree::parse("class A{}");
        let brace = token(&tree, "{").text_range().start();
        let fixed = apply_edits(&tree, &EditSet::single(TriviaEdit::insert(brace, "\n"))).unwrap();
        assert_eq!(fixed.text(), "class A\n{}");
        assert_eq!(kinds(&fixed), kinds(&tree));
        let reparsed = SyntaxTree::parse(fixed.text());
        assert_eq!(kinds(&reparsed), kinds(&fixed));
    }

    #[test]
    fn test_insert_at_file_start_and_end() {
        let tree = SyntaxTree::parse("class A { }");
        let mut edits = EditSet::new();
        edits.insert(offset(0), "// header\n");
        edits.insert(TextSize::of(tree.text()), "\n");
        let fixed = apply_edits(&tree, &edits).unwrap();
        assert_eq!(fixed.text(), "// header\nclass A { }\n");
    }

    #[test]
    fn test_edits_in_several_gaps() {
        let tree = SyntaxTree::parse("a();\n\n\nb();\n\n\nc();\n");
        let mut edits = EditSet::new();
        edits.delete(range(5, 6));
        edits.delete(range(12, 13));
        let fixed = apply_edits(&tree, &edits).unwrap();
        assert_eq!(fixed.text(), "a();\n\nb();\n\nc();\n");
    }

    #[test]
    fn test_directives_are_preserved() {
        let source = "class A\n{\n\n#region R\n\n    int x;\n#endregion\n}\n";
        let tree = SyntaxTree::parse(source);
        let open = token(&tree, "{").text_range().end();
        let blank = TextRange::new(open + offset(1), open + offset(2));
        let fixed = apply_edits(&tree, &EditSet::single(TriviaEdit::delete(blank))).unwrap();
        assert_eq!(fixed.text(), "class A\n{\n#region R\n\n    int x;\n#endregion\n}\n");
    }

    #[test]
    fn test_rejects_edit_inside_token() {
        let tree = SyntaxTree::parse("class A { }");
        let result = apply_edits(&tree, &EditSet::single(TriviaEdit::delete(range(1, 3))));
        assert!(matches!(result, Err(EditError::IntersectsToken { .. })));
    }

    #[test]
    fn test_rejects_edit_outside_tree() {
        let tree = SyntaxTree::parse("a;");
        let result = apply_edits(&tree, &EditSet::single(TriviaEdit::insert(offset(10), " ")));
        assert!(matches!(result, Err(EditError::OutsideTree { .. })));
    }

    #[test]
    fn test_rejects_overlapping_edits() {
        let tree = SyntaxTree::parse("a;\n\n\nb;");
        let mut edits = EditSet::new();
        edits.delete(range(3, 5));
        edits.delete(range(4, 6));
        assert!(matches!(
            apply_edits(&tree, &edits),
            Err(EditError::Overlapping { .. })
        ));
    }

    #[test]
    fn test_rejects_non_trivia_replacement() {
        let tree = SyntaxTree::parse("a; b;");
        let result = apply_edits(&tree, &EditSet::single(TriviaEdit::replace(range(2, 3), " x ")));
        assert!(matches!(result, Err(EditError::NonTriviaReplacement { .. })));
    }

    #[test]
    fn test_rejects_merged_tokens() {
        let tree = SyntaxTree::parse("int x;");
        let result = apply_edits(&tree, &EditSet::single(TriviaEdit::delete(range(3, 4))));
        assert!(matches!(result, Err(EditError::MergedTokens { .. })));

        let tree = SyntaxTree::parse("a = b + +c;");
        let result = apply_edits(&tree, &EditSet::single(TriviaEdit::delete(range(7, 8))));
        assert!(matches!(result, Err(EditError::MergedTokens { .. })));
    }

    #[test]
    fn test_rejects_swallowed_token() {
        let tree = SyntaxTree::parse("a; // note\nb;");
        let result = apply_edits(&tree, &EditSet::single(TriviaEdit::delete(range(10, 11))));
        assert!(matches!(result, Err(EditError::SwallowedToken { .. })));
    }

    #[test]
    fn test_rejects_directive_moved_off_line_start() {
        let tree = SyntaxTree::parse("{\n#region R\n}");
        let result = apply_edits(&tree, &EditSet::single(TriviaEdit::delete(range(1, 2))));
        assert!(matches!(result, Err(EditError::BrokenDirectiveLine { .. })));
    }

    #[test]
    fn test_rejects_cut_into_disabled_text() {
        let source = "a;\n#if NEVER\nold();\n\n#endif\nb;";
        let tree = SyntaxTree::parse(source);
        let start = source.find("old").unwrap() as u32;
        let result = apply_edits(
            &tree,
            &EditSet::single(TriviaEdit::delete(range(start + 6, start + 7))),
        );
        assert!(matches!(result, Err(EditError::DisabledText { .. })));
    }

    #[test]
    fn test_untouched_subtrees_are_shared() {
        let tree = SyntaxTree::parse("class A\n{\n    void M() { }\n}\n\n\nclass B { }\n");
        let fixed = apply_edits(&tree, &EditSet::single(TriviaEdit::delete(range(29, 30)))).unwrap();
        let first_old = tree.root().first_child().unwrap();
        let first_new = fixed.root().first_child().unwrap();
        assert_eq!(first_old.green(), first_new.green());
    }

    #[test]
    fn test_edit_set_helpers() {
        let a = EditSet::single(TriviaEdit::insert(offset(4), "\n"));
        let b = EditSet::single(TriviaEdit::delete(range(4, 6)));
        let c = EditSet::single(TriviaEdit::delete(range(8, 9)));
        assert!(a.conflicts_with(&b));
        assert!(!a.conflicts_with(&c));
        assert!(!a.conflicts_with(&a.clone()));
        assert_eq!(b.apply_to_text("abcdefgh"), "abcdgh");
    }
}
