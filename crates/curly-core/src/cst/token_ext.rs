//! Token-level navigation over the CST
//!
//! Trivia split between two significant tokens:
//! - **Trailing trivia** of a token: same-line trivia after it, up to and
//!   including the first line break. Directives never trail a token.
//! - **Leading trivia** of a token: the rest of the gap before it.

use super::{CsSyntaxKind, CsSyntaxToken};

/// Navigation helpers on [`CsSyntaxToken`]
pub trait TokenExt {
    /// Next token that is not trivia
    fn next_significant(&self) -> Option<CsSyntaxToken>;

    /// Previous token that is not trivia
    fn prev_significant(&self) -> Option<CsSyntaxToken>;

    /// All trivia tokens between this token and the next significant one
    fn gap_after(&self) -> Vec<CsSyntaxToken>;

    /// All trivia tokens between the previous significant token and this one
    fn gap_before(&self) -> Vec<CsSyntaxToken>;

    fn trailing_trivia(&self) -> Vec<CsSyntaxToken>;

    fn leading_trivia(&self) -> Vec<CsSyntaxToken>;

    /// Whether the token is the zero-width end-of-file marker
    fn is_eof(&self) -> bool;
}

impl TokenExt for CsSyntaxToken {
    fn next_significant(&self) -> Option<CsSyntaxToken> {
        let mut token = self.next_token();
        while let Some(t) = token {
            if !t.kind().is_trivia() {
                return Some(t);
            }
            token = t.next_token();
        }
        None
    }

    fn prev_significant(&self) -> Option<CsSyntaxToken> {
        let mut token = self.prev_token();
        while let Some(t) = token {
            if !t.kind().is_trivia() {
                return Some(t);
            }
            token = t.prev_token();
        }
        None
    }

    fn gap_after(&self) -> Vec<CsSyntaxToken> {
        std::iter::successors(self.next_token(), |t| t.next_token())
            .take_while(|t| t.kind().is_trivia())
            .collect()
    }

    fn gap_before(&self) -> Vec<CsSyntaxToken> {
        let mut gap: Vec<_> = std::iter::successors(self.prev_token(), |t| t.prev_token())
            .take_while(|t| t.kind().is_trivia())
            .collect();
        gap.reverse();
        gap
    }

    fn trailing_trivia(&self) -> Vec<CsSyntaxToken> {
        if self.kind().is_trivia() {
            return Vec::new();
        }
        trailing_part(&self.gap_after()).to_vec()
    }

    fn leading_trivia(&self) -> Vec<CsSyntaxToken> {
        let gap = self.gap_before();
        let has_prev = gap
            .first()
            .map_or_else(|| self.prev_token(), |t| t.prev_token())
            .is_some();
        if !has_prev {
            return gap;
        }
        let skip = trailing_part(&gap).len();
        gap[skip..].to_vec()
    }

    fn is_eof(&self) -> bool {
        self.kind() == CsSyntaxKind::Eof
    }
}

fn trailing_part(gap: &[CsSyntaxToken]) -> &[CsSyntaxToken] {
    let mut end = 0;
    for token in gap {
        match token.kind() {
            CsSyntaxKind::Directive | CsSyntaxKind::DisabledText => break,
            CsSyntaxKind::Newline => {
                end += 1;
                break;
            }
            _ => end += 1,
        }
    }
    &gap[..end]
}
