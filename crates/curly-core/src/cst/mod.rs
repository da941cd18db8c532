//! Concrete Syntax Tree (CST) for C#
//!
//! A lossless syntax tree built with Rowan. Every byte of the source,
//! including whitespace, comments, preprocessor directives and excluded
//! `#if` sections, is kept in the tree so that `root.text() == source`
//! holds for any input, valid or not.
//!
//! ## Trivia placement
//!
//! Trivia never start or end a node (the root excepted). All trivia between
//! two significant tokens are contiguous siblings under one parent, which
//! keeps the separating "gap" of any token pair addressable as a single run
//! of green children. The layout rules and the trivia edit engine both rely
//! on this.
//!
//! ## Example
//!
//! ```rust,ignore
//! use curly_core::cst::{CsSyntaxKind, TokenExt, parse_csharp};
//!
//! let (root, _lexer_errors, _errors) = parse_csharp("class A // note\n{\n}\n");
//! let open = root
//!     .descendants_with_tokens()
//!     .filter_map(|e| e.into_token())
//!     .find(|t| t.kind() == CsSyntaxKind::LBrace)
//!     .unwrap();
//! assert_eq!(open.prev_significant().unwrap().text(), "A");
//! ```

mod builder;
mod language;
mod lexer;
mod parser;
mod syntax_kind;
mod token_ext;

pub mod preprocessor;

pub use builder::CstBuilder;
pub use language::{CsLanguage, CsSyntaxElement, CsSyntaxNode, CsSyntaxNodeChildren, CsSyntaxToken};
pub use lexer::{
    CstLexResult, CstSpan, CstToken, LexerError, lex_trivia_fragment, lex_with_symbols,
    lex_with_trivia,
};
pub(crate) use lexer::is_newline_char;
pub use parser::{ParseError, parse_csharp, parse_with_symbols};
pub use preprocessor::{Directive, DirectiveKind};
pub use syntax_kind::CsSyntaxKind;
pub use token_ext::TokenExt;
