//! Rowan language implementation for C#
//!
//! Connects [`CsSyntaxKind`] to rowan's generic tree types.

use rowan::Language;

use super::CsSyntaxKind;

/// Zero-sized marker implementing `rowan::Language`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CsLanguage;

impl Language for CsLanguage {
    type Kind = CsSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        CsSyntaxKind::from_raw(raw.0)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Red tree node
pub type CsSyntaxNode = rowan::SyntaxNode<CsLanguage>;
/// Red tree token
pub type CsSyntaxToken = rowan::SyntaxToken<CsLanguage>;
/// Node or token
pub type CsSyntaxElement = rowan::SyntaxElement<CsLanguage>;
/// Iterator over a node's children
pub type CsSyntaxNodeChildren = rowan::SyntaxNodeChildren<CsLanguage>;
