//! Trivia classification and gap scanning
//!
//! A [`TriviaStream`] is the ordered trivia between two adjacent significant
//! tokens: the first token's trailing trivia followed by the second token's
//! leading trivia. [`TriviaStream::lines`] splits it into [`GapLine`]s. Line
//! breaks carried by directives and disabled text count as line ends, so a
//! directive is never mistaken for a blank line and disabled regions never
//! yield blank lines.

use std::ops::Range;

use rowan::{TextRange, TextSize};

use crate::cst::{CsSyntaxKind, CsSyntaxToken, Directive, TokenExt};

/// Kind of a single trivia item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaKind {
    Whitespace,
    EndOfLine,
    SingleLineComment,
    MultiLineComment,
    DocComment,
    MultiLineDocComment,
    Directive,
    DisabledText,
}

impl TriviaKind {
    pub fn of(kind: CsSyntaxKind) -> Option<Self> {
        Some(match kind {
            CsSyntaxKind::Whitespace => Self::Whitespace,
            CsSyntaxKind::Newline => Self::EndOfLine,
            CsSyntaxKind::CommentLine => Self::SingleLineComment,
            CsSyntaxKind::CommentBlock => Self::MultiLineComment,
            CsSyntaxKind::DocComment => Self::DocComment,
            CsSyntaxKind::DocCommentBlock => Self::MultiLineDocComment,
            CsSyntaxKind::Directive => Self::Directive,
            CsSyntaxKind::DisabledText => Self::DisabledText,
            _ => return None,
        })
    }

    pub fn is_comment(self) -> bool {
        matches!(
            self,
            Self::SingleLineComment
                | Self::MultiLineComment
                | Self::DocComment
                | Self::MultiLineDocComment
        )
    }

    pub fn is_doc_comment(self) -> bool {
        matches!(self, Self::DocComment | Self::MultiLineDocComment)
    }

    /// Items that end their line themselves
    pub fn ends_line(self) -> bool {
        matches!(self, Self::EndOfLine | Self::Directive | Self::DisabledText)
    }
}

/// One trivia token with its classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriviaItem {
    pub kind: TriviaKind,
    pub token: CsSyntaxToken,
}

impl TriviaItem {
    pub fn text(&self) -> &str {
        self.token.text()
    }

    pub fn range(&self) -> TextRange {
        self.token.text_range()
    }

    /// Structured form of a directive item
    pub fn directive(&self) -> Option<Directive> {
        (self.kind == TriviaKind::Directive).then(|| Directive::parse(self.text()))
    }
}

/// What a line inside a gap holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Only whitespace
    Blank,
    /// Comments, possibly with whitespace
    Comment,
    Directive,
    Disabled,
}

/// A line, or part of a line, inside a gap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapLine {
    /// Indices into [`TriviaStream::items`]
    pub items: Range<usize>,
    pub kind: LineKind,
    /// Start of the segment
    pub start: TextSize,
    /// End of the segment including its line break
    pub end: TextSize,
    /// End of the segment excluding its line break
    pub content_end: TextSize,
    /// Ends with a line break (possibly one carried by a directive)
    pub terminated: bool,
    /// Rest of the previous token's line
    pub after_token: bool,
}

impl GapLine {
    /// A whole line holding nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.kind == LineKind::Blank && self.terminated && !self.after_token
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.start, self.end)
    }
}

/// The trivia between two adjacent significant tokens
#[derive(Debug, Clone)]
pub struct TriviaStream {
    prev: Option<CsSyntaxToken>,
    next: CsSyntaxToken,
    items: Vec<TriviaItem>,
}

impl TriviaStream {
    /// Gap ending at `next`; `prev` is `None` at file start
    pub fn between(prev: Option<&CsSyntaxToken>, next: &CsSyntaxToken) -> Self {
        let items = next
            .gap_before()
            .into_iter()
            .filter_map(|token| TriviaKind::of(token.kind()).map(|kind| TriviaItem { kind, token }))
            .collect();
        Self {
            prev: prev.cloned(),
            next: next.clone(),
            items,
        }
    }

    /// Gap before a significant token
    pub fn before(token: &CsSyntaxToken) -> Self {
        Self::between(token.prev_significant().as_ref(), token)
    }

    /// Gap after a significant token, `None` at end of file
    pub fn after(token: &CsSyntaxToken) -> Option<Self> {
        let next = token.next_significant()?;
        Some(Self::between(Some(token), &next))
    }

    pub fn prev(&self) -> Option<&CsSyntaxToken> {
        self.prev.as_ref()
    }

    pub fn next(&self) -> &CsSyntaxToken {
        &self.next
    }

    pub fn items(&self) -> &[TriviaItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn at_file_start(&self) -> bool {
        self.prev.is_none()
    }

    pub fn at_file_end(&self) -> bool {
        self.next.is_eof()
    }

    /// Byte range of the whole gap
    pub fn range(&self) -> TextRange {
        let start = self
            .prev
            .as_ref()
            .map_or(TextSize::from(0), |t| t.text_range().end());
        TextRange::new(start, self.next.text_range().start())
    }

    /// Split the gap into lines
    ///
    /// The last entry is always the unterminated prefix of `next`'s line,
    /// possibly empty. When the gap follows a token, the first entry is the
    /// rest of that token's line and is never blank.
    pub fn lines(&self) -> Vec<GapLine> {
        let gap = self.range();
        let mut lines = Vec::new();
        let mut first = 0;
        let mut start = gap.start();
        let mut has_comment = false;

        for (i, item) in self.items.iter().enumerate() {
            match item.kind {
                kind if kind.is_comment() => has_comment = true,
                TriviaKind::Whitespace => {}
                kind => {
                    let (line_kind, content_end) = match kind {
                        TriviaKind::Directive => {
                            (LineKind::Directive, content_end_of(item))
                        }
                        TriviaKind::DisabledText => (LineKind::Disabled, content_end_of(item)),
                        _ if has_comment => (LineKind::Comment, item.range().start()),
                        _ => (LineKind::Blank, item.range().start()),
                    };
                    let end = item.range().end();
                    lines.push(GapLine {
                        items: first..i + 1,
                        kind: line_kind,
                        start,
                        end,
                        content_end,
                        terminated: content_end != end,
                        after_token: lines.is_empty() && self.prev.is_some(),
                    });
                    first = i + 1;
                    start = end;
                    has_comment = false;
                }
            }
        }

        let end = gap.end();
        lines.push(GapLine {
            items: first..self.items.len(),
            kind: if has_comment {
                LineKind::Comment
            } else {
                LineKind::Blank
            },
            start,
            end,
            content_end: end,
            terminated: false,
            after_token: lines.is_empty() && self.prev.is_some(),
        });
        lines
    }

    pub fn line_break_count(&self) -> usize {
        self.lines().iter().filter(|line| line.terminated).count()
    }

    pub fn has_blank_line(&self) -> bool {
        self.lines().iter().any(GapLine::is_blank)
    }

    pub fn has_directive(&self) -> bool {
        self.items.iter().any(|i| i.kind == TriviaKind::Directive)
    }

    pub fn has_comment(&self) -> bool {
        self.items.iter().any(|i| i.kind.is_comment())
    }

    /// Index of the first item that is not whitespace or a line break
    pub fn first_significant_index(&self) -> Option<usize> {
        first_significant_index(&self.items)
    }

    /// First non-whitespace content of the gap is a directive
    pub fn starts_with_directive(&self) -> bool {
        self.first_significant_index()
            .is_some_and(|i| self.items[i].kind == TriviaKind::Directive)
    }

    /// Number of consecutive blank lines starting at line `from_index`
    pub fn blank_line_run_length(&self, from_index: usize) -> usize {
        blank_line_run_length(&self.lines(), from_index)
    }
}

fn content_end_of(item: &TriviaItem) -> TextSize {
    let text = item.text();
    let content = text.trim_end_matches(crate::cst::is_newline_char);
    item.range().start() + TextSize::of(content)
}

/// Number of consecutive blank lines in `lines` starting at `from_index`
pub fn blank_line_run_length(lines: &[GapLine], from_index: usize) -> usize {
    lines
        .iter()
        .skip(from_index)
        .take_while(|line| line.is_blank())
        .count()
}

/// Index of the first item that is neither whitespace nor a line break
pub fn first_significant_index(items: &[TriviaItem]) -> Option<usize> {
    items
        .iter()
        .position(|i| !matches!(i.kind, TriviaKind::Whitespace | TriviaKind::EndOfLine))
}

/// Nothing but whitespace precedes `token` on its line
pub fn is_own_line(token: &CsSyntaxToken) -> bool {
    let mut prev = token.prev_token();
    while let Some(t) = prev {
        match t.kind() {
            CsSyntaxKind::Whitespace => prev = t.prev_token(),
            CsSyntaxKind::Newline | CsSyntaxKind::Directive | CsSyntaxKind::DisabledText => {
                return true;
            }
            _ => return false,
        }
    }
    true
}

/// Nothing but whitespace follows `token` on its line
pub fn ends_line(token: &CsSyntaxToken) -> bool {
    let mut next = token.next_token();
    while let Some(t) = next {
        match t.kind() {
            CsSyntaxKind::Whitespace => next = t.next_token(),
            CsSyntaxKind::Newline | CsSyntaxKind::Directive | CsSyntaxKind::Eof => return true,
            _ => return false,
        }
    }
    true
}

/// A `////` comment, conventionally commented-out code
pub fn is_commented_out_code(token: &CsSyntaxToken) -> bool {
    token.kind() == CsSyntaxKind::CommentLine && token.text().starts_with("////")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxTree;

    fn stream_before(source: &str, text: &str) -> TriviaStream {
        let tree = SyntaxTree::parse(source);
        let token = tree
            .root()
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.text() == text && !t.kind().is_trivia())
            .unwrap();
        TriviaStream::before(&token)
    }

    #[test]
    fn test_lines_after_token() {
        let stream = stream_before("a; // x\n\n  \n// y\nb;", "b");
        let lines = stream.lines();
        let kinds: Vec<_> = lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LineKind::Comment,
                LineKind::Blank,
                LineKind::Blank,
                LineKind::Comment,
                LineKind::Blank
            ]
        );
        assert!(lines[0].after_token);
        assert!(!lines[0].is_blank());
        assert!(lines[1].is_blank() && lines[2].is_blank());
        assert!(!lines[4].terminated);
        assert_eq!(stream.blank_line_run_length(1), 2);
        assert_eq!(stream.line_break_count(), 4);
    }

    #[test]
    fn test_first_segment_after_token_is_never_blank() {
        let stream = stream_before("a;   \nb;", "b");
        let lines = stream.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].kind, LineKind::Blank);
        assert!(!lines[0].is_blank());
        assert!(!stream.has_blank_line());
    }

    #[test]
    fn test_file_start_begins_with_a_real_line() {
        let stream = stream_before("\n\nclass A { }", "class");
        assert!(stream.at_file_start());
        assert_eq!(stream.blank_line_run_length(0), 2);
    }

    #[test]
    fn test_directive_counts_as_content() {
        let stream = stream_before("a;\n#region R\n\nb;", "b");
        let lines = stream.lines();
        assert_eq!(lines[1].kind, LineKind::Directive);
        assert!(lines[1].terminated);
        assert!(lines[2].is_blank());
        assert!(stream.starts_with_directive());
        assert_eq!(
            stream.items()[stream.first_significant_index().unwrap()]
                .directive()
                .unwrap()
                .kind,
            crate::cst::DirectiveKind::Region
        );
    }

    #[test]
    fn test_disabled_region_never_yields_blank_lines() {
        let stream = stream_before("a;\n#if NOPE\n\n\n\n#endif\nb;", "b");
        assert!(!stream.has_blank_line());
        assert!(stream.lines().iter().any(|l| l.kind == LineKind::Disabled));
    }

    #[test]
    fn test_own_line_and_commented_out_code() {
        let tree = SyntaxTree::parse("a; // trailing\n    //// old();\nb;");
        let comments: Vec<_> = tree
            .root()
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == CsSyntaxKind::CommentLine)
            .collect();
        assert!(!is_own_line(&comments[0]));
        assert!(ends_line(&comments[0]));
        assert!(is_own_line(&comments[1]));
        assert!(!is_commented_out_code(&comments[0]));
        assert!(is_commented_out_code(&comments[1]));
    }

    #[test]
    fn test_crlf_line_ranges() {
        let stream = stream_before("a;\r\n\r\nb;", "b");
        let lines = stream.lines();
        assert_eq!(u32::from(lines[1].start), 4);
        assert_eq!(u32::from(lines[1].end), 6);
        assert_eq!(u32::from(lines[1].content_end), 4);
    }
}
