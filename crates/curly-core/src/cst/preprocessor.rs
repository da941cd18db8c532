//! Preprocessor directives: structured form and conditional evaluation
//!
//! Directive lines are kept as trivia. The lexer uses this module to decide
//! which conditional sections are active; inactive sections become
//! `DisabledText` trivia.

use std::collections::HashSet;

/// Kind of a preprocessor directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    If,
    Elif,
    Else,
    Endif,
    Define,
    Undef,
    Region,
    EndRegion,
    Pragma,
    Nullable,
    Error,
    Warning,
    Line,
    Unknown,
}

/// Structured form of a directive line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    /// Text following the directive name, trimmed, trailing `//` comment removed
    pub argument: String,
}

impl Directive {
    /// Parse the text of a directive token (`#if DEBUG\n`, `#  region Foo`, ...)
    pub fn parse(text: &str) -> Self {
        let body = text.trim_start().strip_prefix('#').unwrap_or(text).trim_start();
        let body = body.trim_end_matches(['\r', '\n', '\u{85}', '\u{2028}', '\u{2029}']);
        let name_len = body
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(body.len());
        let (name, rest) = body.split_at(name_len);

        let kind = match name {
            "if" => DirectiveKind::If,
            "elif" => DirectiveKind::Elif,
            "else" => DirectiveKind::Else,
            "endif" => DirectiveKind::Endif,
            "define" => DirectiveKind::Define,
            "undef" => DirectiveKind::Undef,
            "region" => DirectiveKind::Region,
            "endregion" => DirectiveKind::EndRegion,
            "pragma" => DirectiveKind::Pragma,
            "nullable" => DirectiveKind::Nullable,
            "error" => DirectiveKind::Error,
            "warning" => DirectiveKind::Warning,
            "line" => DirectiveKind::Line,
            _ => DirectiveKind::Unknown,
        };

        // Region names and diagnostics messages keep `//` verbatim.
        let argument = match kind {
            DirectiveKind::Region
            | DirectiveKind::EndRegion
            | DirectiveKind::Error
            | DirectiveKind::Warning => rest.trim(),
            _ => rest.split("//").next().unwrap_or("").trim(),
        };

        Self {
            kind,
            argument: argument.to_string(),
        }
    }

    /// `#if`, `#elif`, `#else`, `#endif`
    pub fn is_conditional(&self) -> bool {
        matches!(
            self.kind,
            DirectiveKind::If | DirectiveKind::Elif | DirectiveKind::Else | DirectiveKind::Endif
        )
    }

    /// Directives that open or continue a section: `#if`, `#elif`, `#else`, `#region`
    pub fn opens_section(&self) -> bool {
        matches!(
            self.kind,
            DirectiveKind::If | DirectiveKind::Elif | DirectiveKind::Else | DirectiveKind::Region
        )
    }

    /// Directives that end a section of code: `#endregion`, `#endif`, `#else`, `#elif`
    pub fn terminates_section(&self) -> bool {
        matches!(
            self.kind,
            DirectiveKind::EndRegion
                | DirectiveKind::Endif
                | DirectiveKind::Else
                | DirectiveKind::Elif
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    active: bool,
    branch_taken: bool,
    parent_active: bool,
}

/// Tracks `#if` nesting and defined symbols while lexing
#[derive(Debug, Clone, Default)]
pub struct ConditionalState {
    frames: Vec<Frame>,
    symbols: HashSet<String>,
}

/// Problems found while tracking conditional sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalError {
    UnexpectedDirective(DirectiveKind),
}

impl ConditionalState {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            frames: Vec::new(),
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether code at the current position is compiled
    pub fn is_active(&self) -> bool {
        self.frames.last().is_none_or(|frame| frame.active)
    }

    /// Number of `#if` sections still open
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_defined(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    /// Update the state for a directive encountered by the lexer
    pub fn apply(&mut self, directive: &Directive) -> Result<(), ConditionalError> {
        match directive.kind {
            DirectiveKind::If => {
                let parent_active = self.is_active();
                let value = parent_active && self.evaluate(&directive.argument);
                self.frames.push(Frame {
                    active: value,
                    branch_taken: value,
                    parent_active,
                });
            }
            DirectiveKind::Elif => {
                let Some(frame) = self.frames.last().copied() else {
                    return Err(ConditionalError::UnexpectedDirective(directive.kind));
                };
                let value = frame.parent_active
                    && !frame.branch_taken
                    && self.evaluate(&directive.argument);
                if let Some(top) = self.frames.last_mut() {
                    top.active = value;
                    top.branch_taken |= value;
                }
            }
            DirectiveKind::Else => {
                let Some(top) = self.frames.last_mut() else {
                    return Err(ConditionalError::UnexpectedDirective(directive.kind));
                };
                top.active = top.parent_active && !top.branch_taken;
                top.branch_taken = true;
            }
            DirectiveKind::Endif => {
                if self.frames.pop().is_none() {
                    return Err(ConditionalError::UnexpectedDirective(directive.kind));
                }
            }
            DirectiveKind::Define if self.is_active() => {
                if let Some(symbol) = directive.argument.split_whitespace().next() {
                    self.symbols.insert(symbol.to_string());
                }
            }
            DirectiveKind::Undef if self.is_active() => {
                if let Some(symbol) = directive.argument.split_whitespace().next() {
                    self.symbols.remove(symbol);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Evaluate a conditional expression; malformed expressions are false
    pub fn evaluate(&self, expression: &str) -> bool {
        let tokens = tokenize_condition(expression);
        let mut parser = ConditionParser {
            tokens: &tokens,
            pos: 0,
            state: self,
        };
        let value = parser.parse_or();
        match value {
            Some(value) if parser.pos == tokens.len() => value,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CondToken {
    Symbol(String),
    True,
    False,
    Not,
    And,
    Or,
    EqEq,
    NotEq,
    LParen,
    RParen,
    Invalid,
}

fn tokenize_condition(text: &str) -> Vec<CondToken> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '(' => CondToken::LParen,
            ')' => CondToken::RParen,
            '!' if chars.peek().is_some_and(|&(_, n)| n == '=') => {
                chars.next();
                CondToken::NotEq
            }
            '!' => CondToken::Not,
            '=' if chars.peek().is_some_and(|&(_, n)| n == '=') => {
                chars.next();
                CondToken::EqEq
            }
            '&' if chars.peek().is_some_and(|&(_, n)| n == '&') => {
                chars.next();
                CondToken::And
            }
            '|' if chars.peek().is_some_and(|&(_, n)| n == '|') => {
                chars.next();
                CondToken::Or
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut end = start + c.len_utf8();
                while let Some(&(idx, n)) = chars.peek() {
                    if n.is_alphanumeric() || n == '_' {
                        end = idx + n.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                match &text[start..end] {
                    "true" => CondToken::True,
                    "false" => CondToken::False,
                    word => CondToken::Symbol(word.to_string()),
                }
            }
            _ => CondToken::Invalid,
        };
        tokens.push(token);
    }

    tokens
}

struct ConditionParser<'a> {
    tokens: &'a [CondToken],
    pos: usize,
    state: &'a ConditionalState,
}

impl ConditionParser<'_> {
    fn peek(&self) -> Option<&CondToken> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, token: &CondToken) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Option<bool> {
        let mut value = self.parse_and()?;
        while self.eat(&CondToken::Or) {
            let rhs = self.parse_and()?;
            value = value || rhs;
        }
        Some(value)
    }

    fn parse_and(&mut self) -> Option<bool> {
        let mut value = self.parse_equality()?;
        while self.eat(&CondToken::And) {
            let rhs = self.parse_equality()?;
            value = value && rhs;
        }
        Some(value)
    }

    fn parse_equality(&mut self) -> Option<bool> {
        let mut value = self.parse_unary()?;
        loop {
            if self.eat(&CondToken::EqEq) {
                value = value == self.parse_unary()?;
            } else if self.eat(&CondToken::NotEq) {
                value = value != self.parse_unary()?;
            } else {
                return Some(value);
            }
        }
    }

    fn parse_unary(&mut self) -> Option<bool> {
        if self.eat(&CondToken::Not) {
            return self.parse_unary().map(|value| !value);
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Option<bool> {
        let token = self.peek()?.clone();
        self.pos += 1;
        match token {
            CondToken::True => Some(true),
            CondToken::False => Some(false),
            CondToken::Symbol(name) => Some(self.state.is_defined(&name)),
            CondToken::LParen => {
                let value = self.parse_or()?;
                self.eat(&CondToken::RParen).then_some(value)
            }
            _ => None,
        }
    }
}
