//! Parsed source file: green tree plus line table
//!
//! [`SyntaxTree`] owns the immutable green tree, which is `Send + Sync`, so a
//! tree can move between threads. Red nodes are created on demand through
//! [`SyntaxTree::root`].

use std::sync::Arc;

use rowan::{GreenNode, TextRange};

use crate::cst::{CsSyntaxNode, CsSyntaxToken, LexerError, ParseError, parse_with_symbols};
use crate::diagnostics::SourceMap;

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    green: GreenNode,
    text: Arc<str>,
    source_map: Arc<SourceMap>,
    symbols: Arc<[String]>,
    lexer_errors: Vec<LexerError>,
    parse_errors: Vec<ParseError>,
}

impl SyntaxTree {
    pub fn parse(source: &str) -> Self {
        Self::parse_with_symbols(source, &[])
    }

    /// Parse with preprocessor symbols defined for `#if` evaluation
    pub fn parse_with_symbols(source: &str, symbols: &[String]) -> Self {
        let (root, lexer_errors, parse_errors) = parse_with_symbols(source, symbols);
        Self {
            green: root.green().into_owned(),
            text: Arc::from(source),
            source_map: Arc::new(SourceMap::new(source)),
            symbols: Arc::from(symbols),
            lexer_errors,
            parse_errors,
        }
    }

    /// Wrap a green tree produced by editing this tree
    ///
    /// The edited green tree is kept as is. Errors are collected again from
    /// its text with the same preprocessor symbols.
    pub fn rebuild(&self, green: GreenNode) -> Self {
        let text = CsSyntaxNode::new_root(green.clone()).text().to_string();
        let (_, lexer_errors, parse_errors) = parse_with_symbols(&text, &self.symbols);
        Self {
            source_map: Arc::new(SourceMap::new(&text)),
            text: Arc::from(text),
            green,
            symbols: Arc::clone(&self.symbols),
            lexer_errors,
            parse_errors,
        }
    }

    pub fn root(&self) -> CsSyntaxNode {
        CsSyntaxNode::new_root(self.green.clone())
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    pub fn lexer_errors(&self) -> &[LexerError] {
        &self.lexer_errors
    }

    pub fn parse_errors(&self) -> &[ParseError] {
        &self.parse_errors
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.lexer_errors.len() + self.parse_errors.len()
    }

    /// 0-based line containing `offset`
    pub fn line_of(&self, offset: usize) -> usize {
        self.source_map.line_of(offset)
    }

    pub fn start_line(&self, range: TextRange) -> usize {
        self.line_of(range.start().into())
    }

    /// Line of the last character covered by `range`
    pub fn end_line(&self, range: TextRange) -> usize {
        let end: usize = range.end().into();
        let start: usize = range.start().into();
        self.line_of(if end > start { end - 1 } else { end })
    }

    pub fn token_start_line(&self, token: &CsSyntaxToken) -> usize {
        self.start_line(token.text_range())
    }

    pub fn token_end_line(&self, token: &CsSyntaxToken) -> usize {
        self.end_line(token.text_range())
    }

    pub fn node_start_line(&self, node: &CsSyntaxNode) -> usize {
        self.start_line(node.text_range())
    }

    pub fn node_end_line(&self, node: &CsSyntaxNode) -> usize {
        self.end_line(node.text_range())
    }

    /// Node spans more than one line
    pub fn is_multi_line(&self, node: &CsSyntaxNode) -> bool {
        self.node_start_line(node) != self.node_end_line(node)
    }

    /// Significant tokens `a` and `b` start and end on one line
    pub fn same_line(&self, a: &CsSyntaxToken, b: &CsSyntaxToken) -> bool {
        self.token_end_line(a) == self.token_start_line(b)
    }

    /// Text of the 0-based `line` without its line break
    pub fn line_text(&self, line: usize) -> &str {
        let Some(start) = self.source_map.line_start(line) else {
            return "";
        };
        let end = self
            .source_map
            .line_start(line + 1)
            .unwrap_or(self.text.len());
        self.text[start..end].trim_end_matches(crate::cst::is_newline_char)
    }

    /// First line break used in the file, `\n` when there is none
    pub fn line_ending(&self) -> &str {
        let Some(start) = self.source_map.line_start(1) else {
            return "\n";
        };
        let line = &self.text[..start];
        let content = line.trim_end_matches(crate::cst::is_newline_char);
        &line[content.len()..]
    }
}
