//! Lossless lexer for C# source text
//!
//! Every character of the input ends up in exactly one token, so the
//! concatenation of token texts reproduces the source. Trivia (whitespace,
//! line breaks, comments, directive lines and disabled text) are regular
//! tokens of trivia kinds; the parser decides where they land in the tree.

use std::ops::Range;

use super::CsSyntaxKind;
use super::preprocessor::{ConditionalState, Directive, DirectiveKind};

/// Simple span representing a range in the source
pub type CstSpan = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: CsSyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: CsSyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the CST lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

/// Lex input with no externally defined preprocessor symbols
pub fn lex_with_trivia(input: &str) -> CstLexResult {
    lex_with_symbols(input, &[])
}

/// Lex input, treating `symbols` as defined for `#if` evaluation
pub fn lex_with_symbols(input: &str, symbols: &[String]) -> CstLexResult {
    let mut lexer = Lexer::new(input, ConditionalState::new(symbols.iter().cloned()));
    lexer.run();
    if lexer.conditions.depth() > 0 {
        let end = input.len();
        lexer
            .errors
            .push(LexerError::new("unterminated #if section", end..end));
    }
    lexer.push(CsSyntaxKind::Eof, input.len());
    (lexer.tokens, lexer.errors)
}

/// Lex a fragment that must consist of trivia only
///
/// `at_line_start` tells whether the fragment begins at the start of a line,
/// which decides whether a leading `#` opens a directive. Returns `None` when
/// the fragment contains anything other than whitespace, line breaks,
/// comments or directives, or when a block comment is unterminated.
pub fn lex_trivia_fragment(text: &str, at_line_start: bool) -> Option<Vec<CstToken>> {
    let mut lexer = Lexer::new(text, ConditionalState::default());
    lexer.line_start = at_line_start;
    lexer.trivia_only = true;
    lexer.run();
    let valid = lexer.errors.is_empty() && lexer.tokens.iter().all(|t| t.kind.is_trivia());
    valid.then_some(lexer.tokens)
}

pub(crate) fn is_newline_char(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

fn is_whitespace_char(c: char) -> bool {
    !is_newline_char(c) && (c.is_whitespace() || c == '\u{FEFF}')
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<CstToken>,
    errors: Vec<LexerError>,
    /// Only whitespace seen since the last line break
    line_start: bool,
    conditions: ConditionalState,
    trivia_only: bool,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str, conditions: ConditionalState) -> Self {
        Self {
            input,
            pos: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
            line_start: true,
            conditions,
            trivia_only: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn push(&mut self, kind: CsSyntaxKind, end: usize) {
        let start = self.pos;
        self.tokens
            .push(CstToken::new(kind, &self.input[start..end], start..end));
        self.pos = end;
    }

    fn error(&mut self, message: &str, span: CstSpan) {
        self.errors.push(LexerError::new(message, span));
    }

    fn run(&mut self) {
        while self.pos < self.input.len() {
            if !self.conditions.is_active() {
                self.lex_disabled_section();
                continue;
            }
            self.lex_token();
        }
    }

    fn lex_token(&mut self) {
        let Some(c) = self.peek() else { return };

        if is_newline_char(c) {
            let end = self.newline_end(self.pos);
            self.push(CsSyntaxKind::Newline, end);
            self.line_start = true;
            return;
        }
        if is_whitespace_char(c) {
            let end = self.scan_while(self.pos, is_whitespace_char);
            self.push(CsSyntaxKind::Whitespace, end);
            return;
        }
        if c == '#' && self.line_start {
            self.lex_directive();
            return;
        }

        self.line_start = false;
        let rest = self.rest();
        if rest.starts_with("//") {
            let end = self.scan_while(self.pos, |c| !is_newline_char(c));
            let text = &self.input[self.pos..end];
            let kind = if text.starts_with("///") && !text.starts_with("////") {
                CsSyntaxKind::DocComment
            } else {
                CsSyntaxKind::CommentLine
            };
            self.push(kind, end);
            return;
        }
        if rest.starts_with("/*") {
            let kind = if rest.starts_with("/**") && !rest.starts_with("/**/") {
                CsSyntaxKind::DocCommentBlock
            } else {
                CsSyntaxKind::CommentBlock
            };
            let end = match rest[2..].find("*/") {
                Some(idx) => self.pos + 2 + idx + 2,
                None => {
                    self.error("unterminated block comment", self.pos..self.input.len());
                    self.input.len()
                }
            };
            self.push(kind, end);
            return;
        }

        if self.trivia_only {
            // Anything else makes the fragment invalid; consume it as one token.
            let end = self.pos + c.len_utf8();
            self.push(CsSyntaxKind::ErrorToken, end);
            return;
        }

        if let Some((kind, end)) = self.lex_string_like() {
            self.push(kind, end);
            return;
        }
        if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()))
        {
            let (kind, end) = self.lex_number();
            self.push(kind, end);
            return;
        }
        if is_ident_start(c) || (c == '@' && self.peek_at(1).is_some_and(is_ident_start)) {
            let word_start = if c == '@' { self.pos + 1 } else { self.pos };
            let end = self.scan_while(word_start, is_ident_continue);
            let word = &self.input[self.pos..end];
            let kind = if c == '@' {
                CsSyntaxKind::Ident
            } else {
                CsSyntaxKind::reserved_keyword(word).unwrap_or(CsSyntaxKind::Ident)
            };
            self.push(kind, end);
            return;
        }

        match self.lex_punct() {
            Some((kind, len)) => {
                let end = self.pos + len;
                self.push(kind, end);
            }
            None => {
                let end = self.pos + c.len_utf8();
                self.error(&format!("unexpected character '{c}'"), self.pos..end);
                self.push(CsSyntaxKind::ErrorToken, end);
            }
        }
    }

    fn scan_while(&self, from: usize, pred: impl Fn(char) -> bool) -> usize {
        let mut end = from;
        for c in self.input[from..].chars() {
            if !pred(c) {
                break;
            }
            end += c.len_utf8();
        }
        end
    }

    /// End offset of the line break starting at `at`
    fn newline_end(&self, at: usize) -> usize {
        let rest = &self.input[at..];
        if rest.starts_with("\r\n") {
            at + 2
        } else {
            rest.chars().next().map_or(at, |c| at + c.len_utf8())
        }
    }

    /// End of the current line, line break included
    fn line_end_inclusive(&self, from: usize) -> usize {
        let content_end = self.scan_while(from, |c| !is_newline_char(c));
        self.newline_end(content_end)
    }

    fn lex_directive(&mut self) {
        let end = self.line_end_inclusive(self.pos);
        let start = self.pos;
        let directive = Directive::parse(&self.input[start..end]);
        self.push(CsSyntaxKind::Directive, end);
        self.line_start = true;

        if self.trivia_only {
            return;
        }
        if directive.kind == DirectiveKind::Unknown {
            self.error("unknown preprocessor directive", start..end);
        }
        if self.conditions.apply(&directive).is_err() {
            self.error("unexpected conditional directive", start..end);
        }
    }

    /// Consume lines of an inactive section until the next conditional directive
    fn lex_disabled_section(&mut self) {
        let mut scan = self.pos;
        while scan < self.input.len() {
            let indent_end = self.scan_while(scan, is_whitespace_char);
            let line_end = self.line_end_inclusive(scan);
            if self.input[indent_end..].starts_with('#') {
                let directive = Directive::parse(&self.input[indent_end..line_end]);
                if directive.is_conditional() {
                    if scan > self.pos {
                        self.push(CsSyntaxKind::DisabledText, scan);
                    }
                    if indent_end > scan {
                        self.push(CsSyntaxKind::Whitespace, indent_end);
                    }
                    self.line_start = true;
                    self.lex_directive();
                    return;
                }
            }
            scan = line_end;
        }
        if scan > self.pos {
            self.push(CsSyntaxKind::DisabledText, scan);
        }
    }

    /// Strings, verbatim strings, raw strings, interpolated strings and chars
    fn lex_string_like(&mut self) -> Option<(CsSyntaxKind, usize)> {
        let rest = self.rest();
        let prefix_len = rest
            .bytes()
            .take_while(|&b| b == b'$' || b == b'@')
            .count();
        let prefix = &rest[..prefix_len];
        let dollars = prefix.bytes().filter(|&b| b == b'$').count();
        let verbatim = prefix.contains('@');
        let after_prefix = self.pos + prefix_len;

        if rest.starts_with('\'') {
            return Some((CsSyntaxKind::CharLiteral, self.scan_char_literal(self.pos)));
        }
        if !self.input[after_prefix..].starts_with('"') {
            return None;
        }
        if prefix.len() > 2 && dollars != prefix.len() {
            return None;
        }
        if verbatim && prefix.matches('@').count() > 1 {
            return None;
        }

        let quotes = self.input[after_prefix..]
            .bytes()
            .take_while(|&b| b == b'"')
            .count();
        let kind = if dollars > 0 {
            CsSyntaxKind::InterpolatedString
        } else {
            CsSyntaxKind::StringLiteral
        };

        let end = if quotes >= 3 && !verbatim {
            self.scan_raw_string(after_prefix, quotes)
        } else if verbatim {
            self.scan_verbatim_string(after_prefix + 1, dollars > 0)
        } else {
            self.scan_regular_string(after_prefix + 1, dollars > 0)
        };
        Some((kind, self.scan_utf8_suffix(end)))
    }

    fn scan_utf8_suffix(&self, end: usize) -> usize {
        let rest = &self.input[end..];
        if (rest.starts_with("u8") || rest.starts_with("U8"))
            && !rest[2..].chars().next().is_some_and(is_ident_continue)
        {
            end + 2
        } else {
            end
        }
    }

    fn scan_char_literal(&mut self, start: usize) -> usize {
        let mut chars = self.input[start + 1..].char_indices();
        while let Some((idx, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '\'' => return start + 1 + idx + 1,
                c if is_newline_char(c) => {
                    let end = start + 1 + idx;
                    self.error("unterminated character literal", start..end);
                    return end;
                }
                _ => {}
            }
        }
        self.error("unterminated character literal", start..self.input.len());
        self.input.len()
    }

    /// Body of a `"..."` string starting after the opening quote
    fn scan_regular_string(&mut self, body: usize, interpolated: bool) -> usize {
        let mut pos = body;
        while let Some(c) = self.input[pos..].chars().next() {
            match c {
                '\\' => {
                    pos += 1;
                    if let Some(n) = self.input[pos..].chars().next() {
                        pos += n.len_utf8();
                    }
                }
                '"' => return pos + 1,
                '{' if interpolated => {
                    if self.input[pos..].starts_with("{{") {
                        pos += 2;
                    } else {
                        pos = self.scan_interpolation_hole(pos + 1);
                    }
                }
                c if is_newline_char(c) => {
                    self.error("unterminated string literal", body - 1..pos);
                    return pos;
                }
                c => pos += c.len_utf8(),
            }
        }
        self.error("unterminated string literal", body - 1..self.input.len());
        self.input.len()
    }

    /// Body of an `@"..."` string starting after the opening quote
    fn scan_verbatim_string(&mut self, body: usize, interpolated: bool) -> usize {
        let mut pos = body;
        while let Some(c) = self.input[pos..].chars().next() {
            match c {
                '"' if self.input[pos..].starts_with("\"\"") => pos += 2,
                '"' => return pos + 1,
                '{' if interpolated => {
                    if self.input[pos..].starts_with("{{") {
                        pos += 2;
                    } else {
                        pos = self.scan_interpolation_hole(pos + 1);
                    }
                }
                c => pos += c.len_utf8(),
            }
        }
        self.error("unterminated verbatim string literal", body..self.input.len());
        self.input.len()
    }

    /// Raw string opened by `quotes` quote characters at `open`
    fn scan_raw_string(&mut self, open: usize, quotes: usize) -> usize {
        let body = open + quotes;
        let closing = "\"".repeat(quotes);
        match self.input[body..].find(&closing) {
            Some(idx) => {
                // Extra quotes directly after the closing run belong to it.
                let end = body + idx;
                self.scan_while(end, |c| c == '"')
            }
            None => {
                self.error("unterminated raw string literal", open..self.input.len());
                self.input.len()
            }
        }
    }

    /// Skip an interpolation hole starting after its `{`; returns the offset
    /// after the matching `}`
    fn scan_interpolation_hole(&mut self, start: usize) -> usize {
        let mut depth = 0usize;
        let mut pos = start;
        while let Some(c) = self.input[pos..].chars().next() {
            match c {
                '{' => {
                    depth += 1;
                    pos += 1;
                }
                '}' if depth == 0 => return pos + 1,
                '}' => {
                    depth -= 1;
                    pos += 1;
                }
                '"' | '\'' | '$' | '@' => {
                    let saved = self.pos;
                    self.pos = pos;
                    let nested = self.lex_string_like();
                    self.pos = saved;
                    match nested {
                        Some((_, end)) if end > pos => pos = end,
                        _ => pos += 1,
                    }
                }
                '/' if self.input[pos..].starts_with("/*") => {
                    pos = match self.input[pos + 2..].find("*/") {
                        Some(idx) => pos + 2 + idx + 2,
                        None => self.input.len(),
                    };
                }
                c => pos += c.len_utf8(),
            }
        }
        self.error("unterminated interpolation", start..self.input.len());
        self.input.len()
    }

    fn lex_number(&self) -> (CsSyntaxKind, usize) {
        let bytes = self.input.as_bytes();
        let mut pos = self.pos;
        let rest = self.rest();
        let mut real = false;

        let is_digit_or_sep = |b: u8| b.is_ascii_digit() || b == b'_';

        if rest.starts_with("0x") || rest.starts_with("0X") {
            pos += 2;
            while pos < bytes.len() && (bytes[pos].is_ascii_hexdigit() || bytes[pos] == b'_') {
                pos += 1;
            }
        } else if rest.starts_with("0b") || rest.starts_with("0B") {
            pos += 2;
            while pos < bytes.len() && matches!(bytes[pos], b'0' | b'1' | b'_') {
                pos += 1;
            }
        } else {
            while pos < bytes.len() && is_digit_or_sep(bytes[pos]) {
                pos += 1;
            }
            if pos + 1 < bytes.len() && bytes[pos] == b'.' && bytes[pos + 1].is_ascii_digit() {
                real = true;
                pos += 1;
                while pos < bytes.len() && is_digit_or_sep(bytes[pos]) {
                    pos += 1;
                }
            }
            if pos < bytes.len() && matches!(bytes[pos], b'e' | b'E') {
                let mut exp = pos + 1;
                if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
                    exp += 1;
                }
                if exp < bytes.len() && bytes[exp].is_ascii_digit() {
                    real = true;
                    pos = exp;
                    while pos < bytes.len() && is_digit_or_sep(bytes[pos]) {
                        pos += 1;
                    }
                }
            }
        }

        if pos < bytes.len() && matches!(bytes[pos], b'f' | b'F' | b'd' | b'D' | b'm' | b'M') {
            real = true;
            pos += 1;
        } else {
            let mut suffix = 0;
            while suffix < 2
                && pos < bytes.len()
                && matches!(bytes[pos], b'u' | b'U' | b'l' | b'L')
            {
                pos += 1;
                suffix += 1;
            }
        }

        let kind = if real {
            CsSyntaxKind::RealLiteral
        } else {
            CsSyntaxKind::IntLiteral
        };
        (kind, pos)
    }

    fn lex_punct(&self) -> Option<(CsSyntaxKind, usize)> {
        use CsSyntaxKind::*;
        const THREE: &[(&str, CsSyntaxKind)] = &[("??=", QuestionQuestionEq), ("<<=", ShlEq)];
        const TWO: &[(&str, CsSyntaxKind)] = &[
            ("..", DotDot),
            ("::", ColonColon),
            ("??", QuestionQuestion),
            ("==", EqEq),
            ("=>", FatArrow),
            ("!=", BangEq),
            ("<=", LtEq),
            ("<<", Shl),
            (">=", GtEq),
            ("++", PlusPlus),
            ("+=", PlusEq),
            ("--", MinusMinus),
            ("-=", MinusEq),
            ("->", Arrow),
            ("*=", StarEq),
            ("/=", SlashEq),
            ("%=", PercentEq),
            ("&&", AmpAmp),
            ("&=", AmpEq),
            ("||", PipePipe),
            ("|=", PipeEq),
            ("^=", CaretEq),
        ];

        let rest = self.rest();
        for (text, kind) in THREE.iter().chain(TWO) {
            if rest.starts_with(text) {
                return Some((*kind, text.len()));
            }
        }

        let kind = match rest.chars().next()? {
            '{' => LBrace,
            '}' => RBrace,
            '(' => LParen,
            ')' => RParen,
            '[' => LBracket,
            ']' => RBracket,
            ';' => Semicolon,
            ',' => Comma,
            '.' => Dot,
            ':' => Colon,
            '?' => Question,
            '=' => Eq,
            '!' => Bang,
            '<' => Lt,
            '>' => Gt,
            '+' => Plus,
            '-' => Minus,
            '*' => Star,
            '/' => Slash,
            '%' => Percent,
            '&' => Amp,
            '|' => Pipe,
            '^' => Caret,
            '~' => Tilde,
            _ => return None,
        };
        Some((kind, 1))
    }
}
