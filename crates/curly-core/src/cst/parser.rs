//! Error-tolerant recursive-descent parser for C#
//!
//! Builds a lossless CST from the lexer's token stream. Trivia are emitted
//! lazily: pending trivia are flushed right before a node starts, before a
//! checkpoint is taken and before a token is added, never when a node
//! finishes. All trivia separating two significant tokens therefore end up as
//! contiguous siblings under a single parent, and every node other than the
//! root starts and ends with a significant token.

use rowan::Checkpoint;

use super::lexer::{CstSpan, LexerError};
use super::{CstBuilder, CstToken, CsSyntaxKind, CsSyntaxNode};
use CsSyntaxKind::*;

/// A parse error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: CstSpan,
}

/// Parse C# source into a CST
///
/// ```rust,ignore
/// use curly_core::cst::parse_csharp;
///
/// let source = "class A\n{\n}\n";
/// let (root, lexer_errors, errors) = parse_csharp(source);
/// assert!(lexer_errors.is_empty() && errors.is_empty());
/// assert_eq!(root.text().to_string(), source);
/// ```
pub fn parse_csharp(source: &str) -> (CsSyntaxNode, Vec<LexerError>, Vec<ParseError>) {
    parse_with_symbols(source, &[])
}

/// Parse C# source with preprocessor symbols defined
pub fn parse_with_symbols(
    source: &str,
    symbols: &[String],
) -> (CsSyntaxNode, Vec<LexerError>, Vec<ParseError>) {
    let (tokens, lexer_errors) = super::lex_with_symbols(source, symbols);
    let mut parser = Parser::new(&tokens);
    parser.parse_compilation_unit();
    let errors = std::mem::take(&mut parser.errors);
    (parser.builder.finish(), lexer_errors, errors)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    CompilationUnit,
    Namespace,
    Type,
}

struct Parser<'a> {
    tokens: &'a [CstToken],
    /// Indices of significant tokens in `tokens`
    sig: Vec<usize>,
    /// Position in `sig`
    pos: usize,
    /// Next raw token not yet handed to the builder
    emitted: usize,
    builder: CstBuilder,
    errors: Vec<ParseError>,
    last_kind: CsSyntaxKind,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [CstToken]) -> Self {
        let sig = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_trivia())
            .map(|(i, _)| i)
            .collect();
        Self {
            tokens,
            sig,
            pos: 0,
            emitted: 0,
            builder: CstBuilder::new(),
            errors: Vec::new(),
            last_kind: Eof,
        }
    }

    // ------------------------------------------------------------------
    // Token access
    // ------------------------------------------------------------------

    fn kind_at(&self, i: usize) -> CsSyntaxKind {
        self.sig.get(i).map_or(Eof, |&raw| self.tokens[raw].kind)
    }

    fn text_at(&self, i: usize) -> &'a str {
        let tokens = self.tokens;
        self.sig.get(i).map_or("", |&raw| tokens[raw].text.as_str())
    }

    fn nth(&self, n: usize) -> CsSyntaxKind {
        self.kind_at(self.pos + n)
    }

    fn current(&self) -> CsSyntaxKind {
        self.nth(0)
    }

    fn at(&self, kind: CsSyntaxKind) -> bool {
        self.current() == kind
    }

    fn at_word(&self, word: &str) -> bool {
        self.nth_word(0, word)
    }

    fn nth_word(&self, n: usize, word: &str) -> bool {
        self.nth(n) == Ident && self.text_at(self.pos + n) == word
    }

    fn word_at(&self, i: usize, word: &str) -> bool {
        self.kind_at(i) == Ident && self.text_at(i) == word
    }

    /// Tokens `i` and `i + 1` touch with no trivia between them
    fn adjacent(&self, i: usize) -> bool {
        match (self.sig.get(i), self.sig.get(i + 1)) {
            (Some(&a), Some(&b)) => b == a + 1,
            _ => false,
        }
    }

    fn current_span(&self) -> CstSpan {
        self.sig
            .get(self.pos)
            .map_or(0..0, |&raw| self.tokens[raw].span.clone())
    }

    // ------------------------------------------------------------------
    // Tree building
    // ------------------------------------------------------------------

    fn flush_trivia(&mut self) {
        let until = self.sig.get(self.pos).copied().unwrap_or(self.tokens.len());
        while self.emitted < until {
            let token = &self.tokens[self.emitted];
            self.builder.token(token.kind, &token.text);
            self.emitted += 1;
        }
    }

    fn start(&mut self, kind: CsSyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind);
    }

    fn start_at(&mut self, checkpoint: Checkpoint, kind: CsSyntaxKind) {
        self.builder.start_node_at(checkpoint, kind);
    }

    fn finish(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    fn bump(&mut self) {
        let kind = self.current();
        self.bump_remap(kind);
    }

    fn bump_remap(&mut self, kind: CsSyntaxKind) {
        if self.at(Eof) {
            return;
        }
        self.flush_trivia();
        let raw = self.sig[self.pos];
        self.builder.token(kind, &self.tokens[raw].text);
        self.emitted = raw + 1;
        self.pos += 1;
        self.last_kind = kind;
    }

    fn eat(&mut self, kind: CsSyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str, kind: CsSyntaxKind) -> bool {
        if self.at_word(word) {
            self.bump_remap(kind);
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: CsSyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(format!("expected {kind}"));
        false
    }

    fn expect_word(&mut self, word: &str, kind: CsSyntaxKind) -> bool {
        if self.eat_word(word, kind) {
            return true;
        }
        self.error(format!("expected '{word}'"));
        false
    }

    fn error(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.errors.push(ParseError {
            message: message.into(),
            span,
        });
    }

    fn error_and_bump(&mut self, message: &str) {
        self.error(message);
        self.start(Error);
        self.bump();
        self.finish();
    }

    // ------------------------------------------------------------------
    // Lookahead scanners (no tree output)
    // ------------------------------------------------------------------

    /// Index after a type starting at `i`
    fn scan_type(&self, i: usize) -> Option<usize> {
        let mut i = match self.kind_at(i) {
            LParen => {
                let mut j = i + 1;
                loop {
                    j = self.scan_type(j)?;
                    if self.kind_at(j) == Ident {
                        j += 1;
                    }
                    match self.kind_at(j) {
                        Comma => j += 1,
                        RParen => break j + 1,
                        _ => return None,
                    }
                }
            }
            kind if kind.is_predefined_type() => i + 1,
            Ident => self.scan_name(i)?,
            _ => return None,
        };
        loop {
            match self.kind_at(i) {
                Question | Star => i += 1,
                LBracket => {
                    let mut j = i + 1;
                    while self.kind_at(j) == Comma {
                        j += 1;
                    }
                    if self.kind_at(j) != RBracket {
                        break;
                    }
                    i = j + 1;
                }
                _ => break,
            }
        }
        Some(i)
    }

    fn scan_name(&self, i: usize) -> Option<usize> {
        if self.kind_at(i) != Ident {
            return None;
        }
        let mut i = i + 1;
        loop {
            if self.kind_at(i) == Lt
                && let Some(j) = self.scan_type_args(i)
            {
                i = j;
            }
            if matches!(self.kind_at(i), Dot | ColonColon) && self.kind_at(i + 1) == Ident {
                i += 2;
                continue;
            }
            return Some(i);
        }
    }

    fn scan_type_args(&self, i: usize) -> Option<usize> {
        if self.kind_at(i) != Lt {
            return None;
        }
        let mut j = i + 1;
        loop {
            match self.kind_at(j) {
                Comma => j += 1,
                Gt => return Some(j + 1),
                _ => {
                    j = self.scan_type(j)?;
                    match self.kind_at(j) {
                        Comma => j += 1,
                        Gt => return Some(j + 1),
                        _ => return None,
                    }
                }
            }
        }
    }

    /// `<...>` after a name in expression context is a type argument list
    fn generic_args_follow(&self, i: usize) -> bool {
        self.scan_type_args(i).is_some_and(|j| {
            matches!(
                self.kind_at(j),
                LParen
                    | RParen
                    | RBracket
                    | RBrace
                    | Colon
                    | Semicolon
                    | Comma
                    | Dot
                    | Question
                    | EqEq
                    | BangEq
                    | Pipe
                    | Caret
                    | AmpAmp
                    | PipePipe
                    | Amp
                    | LBracket
                    | Eof
            )
        })
    }

    fn skip_local_modifiers(&self, mut i: usize) -> usize {
        loop {
            match self.kind_at(i) {
                RefKw | ReadonlyKw | ConstKw | StaticKw | UnsafeKw | ExternKw => i += 1,
                Ident
                    if matches!(self.text_at(i), "scoped" | "async")
                        && (matches!(self.kind_at(i + 1), Ident | RefKw)
                            || self.kind_at(i + 1).is_predefined_type()) =>
                {
                    i += 1
                }
                _ => return i,
            }
        }
    }

    fn looks_like_local_decl(&self, i: usize) -> bool {
        let i = self.skip_local_modifiers(i);
        if self.word_at(i, "await") || self.word_at(i, "yield") {
            return false;
        }
        match self.scan_type(i) {
            Some(j) => {
                self.kind_at(j) == Ident && matches!(self.kind_at(j + 1), Eq | Semicolon | Comma)
            }
            None => false,
        }
    }

    fn looks_like_local_function(&self, i: usize) -> bool {
        let i = self.skip_local_modifiers(i);
        if self.word_at(i, "await") || self.word_at(i, "yield") {
            return false;
        }
        match self.scan_type(i) {
            Some(j) => self.kind_at(j) == Ident && matches!(self.kind_at(j + 1), LParen | Lt),
            None => false,
        }
    }

    fn matching_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut i = open;
        loop {
            match self.kind_at(i) {
                LParen => depth += 1,
                RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                Eof => return None,
                _ => {}
            }
            i += 1;
        }
    }

    fn looks_like_lambda(&self, i: usize) -> bool {
        let mut i = i;
        if self.kind_at(i) == StaticKw {
            i += 1;
        }
        if self.word_at(i, "async") && matches!(self.kind_at(i + 1), Ident | LParen) {
            if self.kind_at(i + 1) == Ident && self.kind_at(i + 2) == FatArrow {
                return true;
            }
            if self.kind_at(i + 1) == LParen
                && self
                    .matching_paren(i + 1)
                    .is_some_and(|close| self.kind_at(close + 1) == FatArrow)
            {
                return true;
            }
        }
        match self.kind_at(i) {
            Ident => self.kind_at(i + 1) == FatArrow,
            LParen => self
                .matching_paren(i)
                .is_some_and(|close| self.kind_at(close + 1) == FatArrow),
            _ => false,
        }
    }

    fn can_start_cast_operand(kind: CsSyntaxKind) -> bool {
        matches!(
            kind,
            Ident
                | IntLiteral
                | RealLiteral
                | CharLiteral
                | StringLiteral
                | InterpolatedString
                | LParen
                | ThisKw
                | BaseKw
                | NewKw
                | Bang
                | Tilde
                | TypeofKw
                | SizeofKw
                | DefaultKw
                | CheckedKw
                | UncheckedKw
                | TrueKw
                | FalseKw
                | NullKw
                | DelegateKw
                | StackallocKw
        ) || kind.is_predefined_type()
    }

    fn looks_like_cast(&self, i: usize) -> bool {
        let Some(j) = self.scan_type(i + 1) else {
            return false;
        };
        if self.kind_at(j) != RParen {
            return false;
        }
        let next = self.kind_at(j + 1);
        if self.kind_at(i + 1).is_predefined_type() && j == i + 2 {
            return Self::can_start_cast_operand(next) || matches!(next, Minus | Plus);
        }
        Self::can_start_cast_operand(next)
    }

    fn at_query_start(&self) -> bool {
        if !self.at_word("from") {
            return false;
        }
        if self.nth(1) == Ident && self.nth(2) == InKw {
            return true;
        }
        self.scan_type(self.pos + 1)
            .is_some_and(|j| self.kind_at(j) == Ident && self.kind_at(j + 1) == InKw)
    }

    fn can_start_expression(kind: CsSyntaxKind) -> bool {
        !matches!(
            kind,
            RParen | RBracket | RBrace | Semicolon | Comma | Colon | Eof | FatArrow | Eq
        )
    }

    // ------------------------------------------------------------------
    // Compilation unit and declarations
    // ------------------------------------------------------------------

    fn parse_compilation_unit(&mut self) {
        // Leading trivia of the file belong inside the root.
        self.builder.start_node(CompilationUnit);
        self.parse_members_until_eof(Container::CompilationUnit);
        self.flush_trivia();
        if let Some(&raw) = self.sig.get(self.pos) {
            self.builder.token(Eof, &self.tokens[raw].text);
            self.emitted = raw + 1;
        }
        self.flush_remaining();
        self.finish();
    }

    fn flush_remaining(&mut self) {
        while self.emitted < self.tokens.len() {
            let token = &self.tokens[self.emitted];
            self.builder.token(token.kind, &token.text);
            self.emitted += 1;
        }
    }

    fn parse_members_until_eof(&mut self, container: Container) {
        while !self.at(Eof) {
            if self.at(RBrace) {
                self.error_and_bump("unexpected '}'");
                continue;
            }
            let before = self.pos;
            self.parse_member(container);
            if self.pos == before {
                self.error_and_bump("expected declaration");
            }
        }
    }

    fn parse_members_until_brace(&mut self, container: Container) {
        while !self.at(RBrace) && !self.at(Eof) {
            let before = self.pos;
            self.parse_member(container);
            if self.pos == before {
                self.error_and_bump("expected member declaration");
            }
        }
    }

    fn at_contextual_modifier(&self) -> bool {
        let word = self.text_at(self.pos);
        if self.current() != Ident
            || !matches!(word, "partial" | "async" | "required" | "file" | "scoped")
        {
            return false;
        }
        let next = self.nth(1);
        next == Ident || next.is_keyword()
    }

    fn parse_member(&mut self, container: Container) {
        let top_level = container != Container::Type;

        if top_level
            && self.at(LBracket)
            && (self.nth_word(1, "assembly") || self.nth_word(1, "module"))
            && self.nth(2) == Colon
        {
            self.parse_attribute_list();
            return;
        }
        if top_level && self.at(ExternKw) && self.nth_word(1, "alias") {
            self.start(ExternAliasDirective);
            self.bump();
            self.bump_remap(AliasKw);
            self.expect(Ident);
            self.expect(Semicolon);
            self.finish();
            return;
        }

        let checkpoint = self.checkpoint();
        let start_pos = self.pos;
        while self.at(LBracket) {
            self.parse_attribute_list();
        }
        if self.at_word("global") && self.nth(1) == UsingKw {
            self.bump_remap(GlobalKw);
        }
        loop {
            if self.at(NewKw) && container != Container::Type {
                break;
            }
            if self.current().is_modifier() && self.current() != RefKw {
                self.bump();
            } else if self.at(RefKw) && self.nth(1) != LParen {
                self.bump();
            } else if self.at_contextual_modifier() {
                match self.text_at(self.pos) {
                    "partial" => self.bump_remap(PartialKw),
                    "async" => self.bump_remap(AsyncKw),
                    _ => self.bump(),
                }
            } else {
                break;
            }
        }

        match self.current() {
            UsingKw if top_level => {
                self.start_at(checkpoint, UsingDirective);
                self.bump();
                self.eat(StaticKw);
                if self.at(Ident) && self.nth(1) == Eq {
                    self.bump();
                    self.bump();
                }
                self.parse_type();
                self.expect(Semicolon);
                self.finish();
            }
            NamespaceKw => self.parse_namespace(checkpoint),
            ClassKw => self.parse_type_declaration(checkpoint, ClassDecl),
            StructKw => self.parse_type_declaration(checkpoint, StructDecl),
            InterfaceKw => self.parse_type_declaration(checkpoint, InterfaceDecl),
            Ident
                if self.at_word("record")
                    && matches!(self.nth(1), Ident | ClassKw | StructKw) =>
            {
                self.parse_type_declaration(checkpoint, RecordDecl)
            }
            EnumKw => self.parse_enum(checkpoint),
            DelegateKw if self.nth(1) != LParen && self.nth(1) != LBrace => {
                self.start_at(checkpoint, DelegateDecl);
                self.bump();
                self.parse_type();
                self.expect(Ident);
                if self.at(Lt) {
                    self.parse_type_parameter_list();
                }
                self.parse_parameter_list();
                self.parse_constraint_clauses();
                self.expect(Semicolon);
                self.finish();
            }
            EventKw => self.parse_event(checkpoint),
            Tilde => {
                self.start_at(checkpoint, DestructorDecl);
                self.bump();
                self.expect(Ident);
                self.parse_parameter_list();
                self.parse_member_body();
                self.finish();
            }
            ImplicitKw | ExplicitKw => {
                self.start_at(checkpoint, ConversionOperatorDecl);
                self.bump();
                self.expect(OperatorKw);
                self.eat(CheckedKw);
                self.parse_type();
                self.parse_parameter_list();
                self.parse_member_body();
                self.finish();
            }
            Ident if self.nth(1) == LParen && container == Container::Type => {
                self.start_at(checkpoint, ConstructorDecl);
                self.bump();
                self.parse_parameter_list();
                if self.at(Colon) {
                    self.start(ConstructorInitializer);
                    self.bump();
                    if matches!(self.current(), BaseKw | ThisKw) {
                        self.bump();
                    } else {
                        self.error("expected 'base' or 'this'");
                    }
                    self.parse_argument_list();
                    self.finish();
                }
                self.parse_member_body();
                self.finish();
            }
            _ if container == Container::CompilationUnit
                && self.pos == start_pos
                && (self.at_word("await")
                    || self.at_word("yield")
                    || self.looks_like_local_decl(self.pos)) =>
            {
                self.start_at(checkpoint, GlobalStatement);
                self.parse_statement();
                self.finish();
            }
            _ => {
                if let Some(after_type) = self.scan_type(self.pos) {
                    self.parse_typed_member(checkpoint, after_type, container);
                } else if container == Container::CompilationUnit
                    && Self::can_start_statement(self.current())
                    && self.pos == start_pos
                {
                    self.start_at(checkpoint, GlobalStatement);
                    self.parse_statement();
                    self.finish();
                } else {
                    self.start_at(checkpoint, Error);
                    if self.pos == start_pos {
                        self.error("expected declaration");
                        self.bump();
                    } else {
                        self.error("incomplete member");
                    }
                    self.finish();
                }
            }
        }
    }

    fn can_start_statement(kind: CsSyntaxKind) -> bool {
        !matches!(kind, RBrace | RParen | RBracket | Eof | Comma | Colon)
    }

    /// Member that starts with a type: method, property, indexer, field, operator
    fn parse_typed_member(&mut self, checkpoint: Checkpoint, after_type: usize, container: Container) {
        match self.kind_at(after_type) {
            OperatorKw => {
                self.start_at(checkpoint, OperatorDecl);
                self.parse_type();
                self.bump();
                self.eat(CheckedKw);
                self.parse_operator_token();
                self.parse_parameter_list();
                self.parse_member_body();
                self.finish();
            }
            ThisKw => {
                self.start_at(checkpoint, IndexerDecl);
                self.parse_type();
                self.bump();
                self.parse_indexer_rest();
                self.finish();
            }
            Ident => {
                let (name_end, indexer) = self.scan_member_name(after_type);
                let kind = if indexer {
                    IndexerDecl
                } else {
                    match self.kind_at(name_end) {
                        LParen | Lt => MethodDecl,
                        LBrace | FatArrow => PropertyDecl,
                        _ => FieldDecl,
                    }
                };
                self.start_at(checkpoint, kind);
                match kind {
                    MethodDecl => {
                        self.parse_type();
                        self.parse_member_name();
                        if self.at(Lt) {
                            self.parse_type_parameter_list();
                        }
                        self.parse_parameter_list();
                        self.parse_constraint_clauses();
                        self.parse_member_body();
                    }
                    PropertyDecl => {
                        self.parse_type();
                        self.parse_member_name();
                        if self.at(LBrace) {
                            self.parse_accessor_list();
                            if self.at(Eq) {
                                self.parse_equals_value();
                                self.expect(Semicolon);
                            }
                        } else {
                            self.parse_arrow_clause();
                            self.expect(Semicolon);
                        }
                    }
                    IndexerDecl => {
                        self.parse_type();
                        self.parse_member_name();
                        self.expect(ThisKw);
                        self.parse_indexer_rest();
                    }
                    _ => {
                        self.parse_variable_declaration();
                        self.expect(Semicolon);
                    }
                }
                self.finish();
            }
            _ => {
                let kind = if container == Container::CompilationUnit {
                    GlobalStatement
                } else {
                    Error
                };
                self.start_at(checkpoint, kind);
                if kind == GlobalStatement {
                    self.parse_statement();
                } else {
                    self.error("expected member name");
                    self.parse_type();
                }
                self.finish();
            }
        }
    }

    /// Returns the index after a (possibly qualified) member name and whether
    /// it ends in `.this`
    fn scan_member_name(&self, i: usize) -> (usize, bool) {
        let mut i = i;
        loop {
            if self.kind_at(i) != Ident {
                return (i, false);
            }
            i += 1;
            if self.kind_at(i) == Lt
                && let Some(j) = self.scan_type_args(i)
            {
                if self.kind_at(j) != Dot {
                    return (i, false);
                }
                i = j;
            }
            if self.kind_at(i) == Dot {
                match self.kind_at(i + 1) {
                    Ident => {
                        i += 1;
                        continue;
                    }
                    ThisKw => return (i + 2, true),
                    _ => return (i, false),
                }
            }
            return (i, false);
        }
    }

    /// Member name, stopping before type parameters and before `this`
    fn parse_member_name(&mut self) {
        loop {
            if !self.expect(Ident) {
                return;
            }
            if self.at(Lt)
                && let Some(j) = self.scan_type_args(self.pos)
                && self.kind_at(j) == Dot
            {
                self.parse_type_argument_list();
            }
            if self.at(Dot) && self.nth(1) == Ident {
                self.bump();
                continue;
            }
            if self.at(Dot) && self.nth(1) == ThisKw {
                self.bump();
            }
            return;
        }
    }

    fn parse_operator_token(&mut self) {
        // `>>` and `>>>` are lexed as separate `>` tokens.
        if self.at(Gt) {
            self.bump();
            while self.at(Gt) && self.adjacent(self.pos - 1) {
                self.bump();
            }
            return;
        }
        if self.current().is_punct() || matches!(self.current(), TrueKw | FalseKw) {
            self.bump();
        } else {
            self.error("expected overloadable operator");
        }
    }

    fn parse_indexer_rest(&mut self) {
        self.start(BracketedParameterList);
        self.expect(LBracket);
        while !self.at(RBracket) && !self.at(Eof) {
            self.parse_parameter();
            if !self.eat(Comma) {
                break;
            }
        }
        self.expect(RBracket);
        self.finish();
        if self.at(LBrace) {
            self.parse_accessor_list();
        } else {
            self.parse_arrow_clause();
            self.expect(Semicolon);
        }
    }

    fn parse_member_body(&mut self) {
        match self.current() {
            LBrace => self.parse_block(),
            FatArrow => {
                self.parse_arrow_clause();
                self.expect(Semicolon);
            }
            _ => {
                self.expect(Semicolon);
            }
        }
    }

    fn parse_arrow_clause(&mut self) {
        self.start(ArrowExpressionClause);
        self.expect(FatArrow);
        self.parse_expr();
        self.finish();
    }

    fn parse_equals_value(&mut self) {
        self.start(EqualsValueClause);
        self.bump();
        if self.at(LBrace) {
            self.parse_initializer();
        } else {
            self.parse_expr();
        }
        self.finish();
    }

    fn parse_namespace(&mut self, checkpoint: Checkpoint) {
        let file_scoped = {
            let name_end = self.scan_name(self.pos + 1).unwrap_or(self.pos + 1);
            self.kind_at(name_end) == Semicolon
        };
        if file_scoped {
            self.start_at(checkpoint, FileScopedNamespaceDecl);
            self.bump();
            self.parse_type();
            self.expect(Semicolon);
            self.parse_members_until_eof(Container::Namespace);
            self.finish();
            return;
        }

        self.start_at(checkpoint, NamespaceDecl);
        self.bump();
        self.parse_type();
        if self.expect(LBrace) {
            self.parse_members_until_brace(Container::Namespace);
            self.expect(RBrace);
            self.eat(Semicolon);
        }
        self.finish();
    }

    fn parse_type_declaration(&mut self, checkpoint: Checkpoint, kind: CsSyntaxKind) {
        self.start_at(checkpoint, kind);
        if kind == RecordDecl {
            self.bump_remap(RecordKw);
            if matches!(self.current(), ClassKw | StructKw) {
                self.bump();
            }
        } else {
            self.bump();
        }
        self.expect(Ident);
        if self.at(Lt) {
            self.parse_type_parameter_list();
        }
        if self.at(LParen) {
            self.parse_parameter_list();
        }
        if self.at(Colon) {
            self.start(BaseList);
            self.bump();
            loop {
                self.parse_type();
                if self.at(LParen) {
                    self.parse_argument_list();
                }
                if !self.eat(Comma) {
                    break;
                }
            }
            self.finish();
        }
        self.parse_constraint_clauses();
        if self.at(LBrace) {
            self.bump();
            self.parse_members_until_brace(Container::Type);
            self.expect(RBrace);
            self.eat(Semicolon);
        } else {
            self.expect(Semicolon);
        }
        self.finish();
    }

    fn parse_enum(&mut self, checkpoint: Checkpoint) {
        self.start_at(checkpoint, EnumDecl);
        self.bump();
        self.expect(Ident);
        if self.at(Colon) {
            self.start(BaseList);
            self.bump();
            self.parse_type();
            self.finish();
        }
        if self.expect(LBrace) {
            while !self.at(RBrace) && !self.at(Eof) {
                self.start(EnumMemberDecl);
                while self.at(LBracket) {
                    self.parse_attribute_list();
                }
                self.expect(Ident);
                if self.at(Eq) {
                    self.parse_equals_value();
                }
                self.finish();
                if !self.eat(Comma) {
                    break;
                }
            }
            self.expect(RBrace);
            self.eat(Semicolon);
        }
        self.finish();
    }

    fn parse_event(&mut self, checkpoint: Checkpoint) {
        let after_type = self.scan_type(self.pos + 1).unwrap_or(self.pos + 1);
        let (name_end, _) = self.scan_member_name(after_type);
        if self.kind_at(name_end) == LBrace {
            self.start_at(checkpoint, EventDecl);
            self.bump();
            self.parse_type();
            self.parse_member_name();
            self.parse_accessor_list();
        } else {
            self.start_at(checkpoint, EventFieldDecl);
            self.bump();
            self.parse_variable_declaration();
            self.expect(Semicolon);
        }
        self.finish();
    }

    fn parse_accessor_list(&mut self) {
        self.start(AccessorList);
        self.expect(LBrace);
        while !self.at(RBrace) && !self.at(Eof) {
            let before = self.pos;
            self.parse_accessor();
            if self.pos == before {
                self.error_and_bump("expected accessor");
            }
        }
        self.expect(RBrace);
        self.finish();
    }

    fn parse_accessor(&mut self) {
        let keyword = |word: &str| match word {
            "get" => Some(GetKw),
            "set" => Some(SetKw),
            "init" => Some(InitKw),
            "add" => Some(AddKw),
            "remove" => Some(RemoveKw),
            _ => None,
        };

        let checkpoint = self.checkpoint();
        let start_pos = self.pos;
        while self.at(LBracket) {
            self.parse_attribute_list();
        }
        while self.current().is_access_modifier() || self.at(ReadonlyKw) {
            self.bump();
        }
        let kind = if self.at(Ident) {
            keyword(self.text_at(self.pos))
        } else {
            None
        };
        let Some(kind) = kind else {
            if self.pos != start_pos {
                self.start_at(checkpoint, Error);
                self.error("expected accessor keyword");
                self.finish();
            }
            return;
        };

        self.start_at(checkpoint, AccessorDecl);
        self.bump_remap(kind);
        match self.current() {
            LBrace => self.parse_block(),
            FatArrow => {
                self.parse_arrow_clause();
                self.expect(Semicolon);
            }
            _ => {
                self.expect(Semicolon);
            }
        }
        self.finish();
    }

    fn parse_attribute_list(&mut self) {
        self.start(AttributeList);
        self.bump();
        let mut depth = 1usize;
        while !self.at(Eof) {
            match self.current() {
                LBracket | LParen => depth += 1,
                RBracket | RParen => depth -= 1,
                _ => {}
            }
            self.bump();
            if depth == 0 {
                break;
            }
        }
        self.finish();
    }

    fn parse_type_parameter_list(&mut self) {
        self.start(TypeParameterList);
        self.bump();
        while !self.at(Gt) && !self.at(Eof) {
            while self.at(LBracket) {
                self.parse_attribute_list();
            }
            if matches!(self.current(), InKw | OutKw) {
                self.bump();
            }
            self.expect(Ident);
            if !self.eat(Comma) {
                break;
            }
        }
        self.expect(Gt);
        self.finish();
    }

    fn parse_constraint_clauses(&mut self) {
        while self.at_word("where") && self.nth(1) == Ident && self.nth(2) == Colon {
            self.start(TypeParameterConstraintClause);
            self.bump_remap(WhereKw);
            self.bump();
            self.bump();
            loop {
                match self.current() {
                    ClassKw | StructKw => {
                        self.bump();
                        self.eat(Question);
                    }
                    NewKw => {
                        self.bump();
                        self.expect(LParen);
                        self.expect(RParen);
                    }
                    DefaultKw => self.bump(),
                    _ => self.parse_type(),
                }
                if !self.eat(Comma) {
                    break;
                }
            }
            self.finish();
        }
    }

    fn parse_parameter_list(&mut self) {
        self.start(ParameterList);
        if self.expect(LParen) {
            while !self.at(RParen) && !self.at(Eof) {
                let before = self.pos;
                self.parse_parameter();
                if self.pos == before || !self.eat(Comma) {
                    break;
                }
            }
            self.expect(RParen);
        }
        self.finish();
    }

    fn parse_parameter(&mut self) {
        self.start(Parameter);
        while self.at(LBracket) {
            self.parse_attribute_list();
        }
        loop {
            match self.current() {
                RefKw | OutKw | InKw | ParamsKw | ThisKw | ReadonlyKw => self.bump(),
                Ident if self.at_word("scoped") && self.nth(1) != Comma && self.nth(1) != RParen => {
                    self.bump()
                }
                _ => break,
            }
        }
        if self.at(Ident) && matches!(self.nth(1), Comma | RParen | Eq) {
            // Implicitly typed lambda parameter
            self.bump();
        } else if self.scan_type(self.pos).is_some() {
            self.parse_type();
            self.eat(Ident);
        } else {
            self.error("expected parameter");
        }
        if self.at(Eq) {
            self.parse_equals_value();
        }
        self.finish();
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn parse_type(&mut self) {
        self.start(Type);
        match self.current() {
            LParen => {
                self.bump();
                loop {
                    self.parse_type();
                    self.eat(Ident);
                    if !self.eat(Comma) {
                        break;
                    }
                }
                self.expect(RParen);
            }
            kind if kind.is_predefined_type() => self.bump(),
            Ident => loop {
                self.bump();
                if self.at(Lt) && self.scan_type_args(self.pos).is_some() {
                    self.parse_type_argument_list();
                }
                if matches!(self.current(), Dot | ColonColon) && self.nth(1) == Ident {
                    self.bump();
                    continue;
                }
                break;
            },
            _ => self.error("expected type"),
        }
        loop {
            match self.current() {
                Question | Star => self.bump(),
                LBracket if matches!(self.nth(1), Comma | RBracket) => {
                    self.bump();
                    while self.eat(Comma) {}
                    self.expect(RBracket);
                }
                _ => break,
            }
        }
        self.finish();
    }

    fn parse_type_argument_list(&mut self) {
        self.start(TypeArgumentList);
        self.bump();
        while !self.at(Gt) && !self.at(Eof) {
            if self.eat(Comma) {
                continue;
            }
            let before = self.pos;
            self.parse_type();
            if self.pos == before || !self.eat(Comma) {
                break;
            }
        }
        self.expect(Gt);
        self.finish();
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_block(&mut self) {
        self.start(Block);
        self.expect(LBrace);
        while !self.at(RBrace) && !self.at(Eof) {
            let before = self.pos;
            self.parse_statement();
            if self.pos == before {
                self.error_and_bump("expected statement");
            }
        }
        self.expect(RBrace);
        self.finish();
    }

    /// Child statement of `if`, loops and friends
    fn parse_embedded_statement(&mut self) {
        if matches!(self.current(), RBrace | Eof) {
            self.error("expected statement");
            return;
        }
        self.parse_statement();
    }

    fn parse_statement(&mut self) {
        match self.current() {
            LBrace => self.parse_block(),
            Semicolon => {
                self.start(EmptyStmt);
                self.bump();
                self.finish();
            }
            IfKw => self.parse_if(),
            WhileKw => {
                self.start(WhileStmt);
                self.bump();
                self.parse_parenthesized_condition();
                self.parse_embedded_statement();
                self.finish();
            }
            DoKw => {
                self.start(DoStmt);
                self.bump();
                self.parse_embedded_statement();
                self.expect(WhileKw);
                self.parse_parenthesized_condition();
                self.expect(Semicolon);
                self.finish();
            }
            ForKw => self.parse_for(),
            ForeachKw => self.parse_foreach(false),
            SwitchKw => self.parse_switch_statement(),
            TryKw => self.parse_try(),
            LockKw => {
                self.start(LockStmt);
                self.bump();
                self.parse_parenthesized_condition();
                self.parse_embedded_statement();
                self.finish();
            }
            FixedKw => {
                self.start(FixedStmt);
                self.bump();
                self.expect(LParen);
                self.parse_variable_declaration();
                self.expect(RParen);
                self.parse_embedded_statement();
                self.finish();
            }
            UsingKw => self.parse_using(false),
            CheckedKw | UncheckedKw if self.nth(1) == LBrace => {
                self.start(CheckedStmt);
                self.bump();
                self.parse_block();
                self.finish();
            }
            UnsafeKw if self.nth(1) == LBrace => {
                self.start(UnsafeStmt);
                self.bump();
                self.parse_block();
                self.finish();
            }
            ReturnKw | ThrowKw => {
                let kind = if self.at(ReturnKw) { ReturnStmt } else { ThrowStmt };
                self.start(kind);
                self.bump();
                if !self.at(Semicolon) {
                    self.parse_expr();
                }
                self.expect(Semicolon);
                self.finish();
            }
            BreakKw | ContinueKw => {
                let kind = if self.at(BreakKw) { BreakStmt } else { ContinueStmt };
                self.start(kind);
                self.bump();
                self.expect(Semicolon);
                self.finish();
            }
            GotoKw => {
                self.start(GotoStmt);
                self.bump();
                match self.current() {
                    CaseKw => {
                        self.bump();
                        self.parse_expr();
                    }
                    DefaultKw => self.bump(),
                    _ => {
                        self.expect(Ident);
                    }
                }
                self.expect(Semicolon);
                self.finish();
            }
            Ident if self.at_word("yield") && matches!(self.nth(1), ReturnKw | BreakKw) => {
                self.start(YieldStmt);
                self.bump_remap(YieldKw);
                if self.eat(ReturnKw) {
                    self.parse_expr();
                } else {
                    self.bump();
                }
                self.expect(Semicolon);
                self.finish();
            }
            Ident if self.at_word("await") && self.nth(1) == ForeachKw => self.parse_foreach(true),
            Ident if self.at_word("await") && self.nth(1) == UsingKw => self.parse_using(true),
            Ident if self.nth(1) == Colon => {
                self.start(LabeledStmt);
                self.bump();
                self.bump();
                self.parse_embedded_statement();
                self.finish();
            }
            _ if self.looks_like_local_function(self.pos) => self.parse_local_function(),
            _ if self.looks_like_local_decl(self.pos) => {
                self.start(LocalDeclStmt);
                self.parse_local_modifiers();
                self.parse_variable_declaration();
                self.expect(Semicolon);
                self.finish();
            }
            _ => {
                self.start(ExprStmt);
                self.parse_expr();
                self.expect(Semicolon);
                self.finish();
            }
        }
    }

    fn parse_local_modifiers(&mut self) {
        let end = self.skip_local_modifiers(self.pos);
        while self.pos < end {
            if self.at_word("async") {
                self.bump_remap(AsyncKw);
            } else {
                self.bump();
            }
        }
    }

    fn parse_parenthesized_condition(&mut self) {
        self.expect(LParen);
        self.parse_expr();
        self.expect(RParen);
    }

    fn parse_if(&mut self) {
        self.start(IfStmt);
        self.bump();
        self.parse_parenthesized_condition();
        self.parse_embedded_statement();
        if self.at(ElseKw) {
            self.start(ElseClause);
            self.bump();
            self.parse_embedded_statement();
            self.finish();
        }
        self.finish();
    }

    fn parse_for(&mut self) {
        self.start(ForStmt);
        self.bump();
        self.expect(LParen);
        if self.looks_like_local_decl(self.pos) {
            self.parse_variable_declaration();
        } else {
            self.parse_expression_list(Semicolon);
        }
        self.expect(Semicolon);
        if !self.at(Semicolon) {
            self.parse_expr();
        }
        self.expect(Semicolon);
        self.parse_expression_list(RParen);
        self.expect(RParen);
        self.parse_embedded_statement();
        self.finish();
    }

    fn parse_expression_list(&mut self, terminator: CsSyntaxKind) {
        while !self.at(terminator) && !self.at(Eof) {
            let before = self.pos;
            self.parse_expr();
            if self.pos == before || !self.eat(Comma) {
                break;
            }
        }
    }

    fn parse_foreach(&mut self, awaited: bool) {
        self.start(ForEachStmt);
        if awaited {
            self.bump_remap(AwaitKw);
        }
        self.bump();
        self.expect(LParen);
        self.start(ForEachVariable);
        if self.at(LParen) {
            self.parse_primary();
        } else {
            self.parse_type();
            if self.at(LParen) {
                self.parse_primary();
            } else {
                self.expect(Ident);
            }
        }
        self.finish();
        self.expect(InKw);
        self.parse_expr();
        self.expect(RParen);
        self.parse_embedded_statement();
        self.finish();
    }

    fn parse_using(&mut self, awaited: bool) {
        let offset = usize::from(awaited);
        if self.nth(1 + offset) != LParen {
            self.start(LocalDeclStmt);
            if awaited {
                self.bump_remap(AwaitKw);
            }
            self.bump();
            self.parse_local_modifiers();
            self.parse_variable_declaration();
            self.expect(Semicolon);
            self.finish();
            return;
        }

        self.start(UsingStmt);
        if awaited {
            self.bump_remap(AwaitKw);
        }
        self.bump();
        self.expect(LParen);
        if self.looks_like_local_decl(self.pos) {
            self.parse_variable_declaration();
        } else {
            self.parse_expr();
        }
        self.expect(RParen);
        self.parse_embedded_statement();
        self.finish();
    }

    fn parse_switch_statement(&mut self) {
        self.start(SwitchStmt);
        self.bump();
        self.parse_expr();
        if self.expect(LBrace) {
            while !self.at(RBrace) && !self.at(Eof) {
                let before = self.pos;
                self.parse_switch_section();
                if self.pos == before {
                    self.error_and_bump("expected switch section");
                }
            }
            self.expect(RBrace);
        }
        self.finish();
    }

    fn at_switch_label(&self) -> bool {
        self.at(CaseKw) || (self.at(DefaultKw) && self.nth(1) == Colon)
    }

    fn parse_switch_section(&mut self) {
        if !self.at_switch_label() {
            return;
        }
        self.start(SwitchSection);
        while self.at_switch_label() {
            if self.at(CaseKw) {
                self.start(CaseSwitchLabel);
                self.bump();
                self.parse_pattern();
                if self.at_word("when") {
                    self.bump_remap(WhenKw);
                    self.parse_expr();
                }
                self.expect(Colon);
                self.finish();
            } else {
                self.start(DefaultSwitchLabel);
                self.bump();
                self.bump();
                self.finish();
            }
        }
        while !self.at(RBrace) && !self.at(Eof) && !self.at_switch_label() {
            let before = self.pos;
            self.parse_statement();
            if self.pos == before {
                self.error_and_bump("expected statement");
            }
        }
        self.finish();
    }

    fn parse_try(&mut self) {
        self.start(TryStmt);
        self.bump();
        self.parse_block();
        while self.at(CatchKw) {
            self.start(CatchClause);
            self.bump();
            if self.at(LParen) {
                self.start(CatchDeclaration);
                self.bump();
                self.parse_type();
                self.eat(Ident);
                self.expect(RParen);
                self.finish();
            }
            if self.at_word("when") {
                self.start(CatchFilterClause);
                self.bump_remap(WhenKw);
                self.parse_parenthesized_condition();
                self.finish();
            }
            self.parse_block();
            self.finish();
        }
        if self.at(FinallyKw) {
            self.start(FinallyClause);
            self.bump();
            self.parse_block();
            self.finish();
        }
        self.finish();
    }

    fn parse_local_function(&mut self) {
        self.start(LocalFunctionStmt);
        self.parse_local_modifiers();
        self.parse_type();
        self.expect(Ident);
        if self.at(Lt) {
            self.parse_type_parameter_list();
        }
        self.parse_parameter_list();
        self.parse_constraint_clauses();
        self.parse_member_body();
        self.finish();
    }

    fn parse_variable_declaration(&mut self) {
        self.start(VariableDeclaration);
        self.parse_type();
        loop {
            self.start(VariableDeclarator);
            self.expect(Ident);
            if self.at(LBracket) {
                self.parse_bracketed_argument_list();
            }
            if self.at(Eq) {
                self.parse_equals_value();
            }
            self.finish();
            if !self.eat(Comma) {
                break;
            }
        }
        self.finish();
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expr(&mut self) {
        if self.looks_like_lambda(self.pos) {
            self.parse_lambda();
            return;
        }
        let checkpoint = self.checkpoint();
        self.parse_conditional();
        if let Some(width) = self.assignment_operator() {
            self.start_at(checkpoint, AssignmentExpr);
            for _ in 0..width {
                self.bump();
            }
            if self.at(LBrace) {
                self.parse_initializer();
            } else {
                self.parse_expr();
            }
            self.finish();
        }
    }

    fn assignment_operator(&self) -> Option<usize> {
        match self.current() {
            Eq | PlusEq | MinusEq | StarEq | SlashEq | PercentEq | AmpEq | PipeEq | CaretEq
            | ShlEq | QuestionQuestionEq => Some(1),
            Gt if self.nth(1) == GtEq && self.adjacent(self.pos) => Some(2),
            _ => None,
        }
    }

    fn parse_conditional(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_binary(0);
        if self.at(Question) {
            self.start_at(checkpoint, ConditionalExpr);
            self.bump();
            self.parse_expr();
            self.expect(Colon);
            self.parse_expr();
            self.finish();
        }
    }

    /// Binding power and token width of the binary operator at the cursor
    fn binary_operator(&self) -> Option<(u8, usize)> {
        let prec = match self.current() {
            QuestionQuestion => 1,
            PipePipe => 2,
            AmpAmp => 3,
            Pipe => 4,
            Caret => 5,
            Amp => 6,
            EqEq | BangEq => 7,
            Lt | LtEq | GtEq | IsKw | AsKw => 8,
            Gt => {
                if self.nth(1) == Gt && self.adjacent(self.pos) {
                    if self.nth(2) == GtEq && self.adjacent(self.pos + 1) {
                        return None;
                    }
                    return Some((9, 2));
                }
                if self.nth(1) == GtEq && self.adjacent(self.pos) {
                    return None;
                }
                8
            }
            Shl => 9,
            Plus | Minus => 10,
            Star | Slash | Percent => 11,
            DotDot => 12,
            _ => return None,
        };
        Some((prec, 1))
    }

    fn parse_binary(&mut self, min_prec: u8) {
        let checkpoint = self.checkpoint();
        self.parse_unary();
        while let Some((prec, width)) = self.binary_operator() {
            if prec < min_prec {
                break;
            }
            match self.current() {
                IsKw => {
                    self.start_at(checkpoint, IsPatternExpr);
                    self.bump();
                    self.parse_pattern();
                    self.finish();
                }
                AsKw => {
                    self.start_at(checkpoint, BinaryExpr);
                    self.bump();
                    self.parse_type();
                    self.finish();
                }
                DotDot => {
                    self.start_at(checkpoint, BinaryExpr);
                    self.bump();
                    if Self::can_start_expression(self.current()) {
                        self.parse_binary(prec + 1);
                    }
                    self.finish();
                }
                kind => {
                    self.start_at(checkpoint, BinaryExpr);
                    for _ in 0..width {
                        self.bump();
                    }
                    // `??` is right associative.
                    let next_min = if kind == QuestionQuestion { prec } else { prec + 1 };
                    self.parse_binary(next_min);
                    self.finish();
                }
            }
        }
    }

    fn parse_unary(&mut self) {
        match self.current() {
            Plus | Minus | Bang | Tilde | PlusPlus | MinusMinus | Amp | Star | Caret | RefKw => {
                self.start(PrefixUnaryExpr);
                self.bump();
                self.parse_unary();
                self.finish();
            }
            DotDot => {
                self.start(PrefixUnaryExpr);
                self.bump();
                if Self::can_start_expression(self.current()) {
                    self.parse_unary();
                }
                self.finish();
            }
            ThrowKw => {
                self.start(ThrowExpr);
                self.bump();
                self.parse_expr();
                self.finish();
            }
            Ident
                if self.at_word("await")
                    && Self::can_start_expression(self.nth(1))
                    && !matches!(self.nth(1), Dot | LParen | Question | QuestionQuestion) =>
            {
                self.start(AwaitExpr);
                self.bump_remap(AwaitKw);
                self.parse_unary();
                self.finish();
            }
            LParen if self.looks_like_cast(self.pos) => {
                self.start(CastExpr);
                self.bump();
                self.parse_type();
                self.expect(RParen);
                self.parse_unary();
                self.finish();
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_primary();
        loop {
            match self.current() {
                Dot | Arrow | ColonColon => {
                    self.start_at(checkpoint, MemberAccessExpr);
                    self.bump();
                    self.parse_simple_name();
                    self.finish();
                }
                Question if matches!(self.nth(1), Dot | LBracket) && self.adjacent(self.pos) => {
                    self.start_at(checkpoint, ConditionalAccessExpr);
                    self.bump();
                    if self.eat(Dot) {
                        self.parse_simple_name();
                    } else {
                        self.parse_bracketed_argument_list();
                    }
                    self.finish();
                }
                LParen => {
                    self.start_at(checkpoint, InvocationExpr);
                    self.parse_argument_list();
                    self.finish();
                }
                LBracket => {
                    self.start_at(checkpoint, ElementAccessExpr);
                    self.parse_bracketed_argument_list();
                    self.finish();
                }
                PlusPlus | MinusMinus => {
                    self.start_at(checkpoint, PostfixUnaryExpr);
                    self.bump();
                    self.finish();
                }
                Bang if matches!(
                    self.nth(1),
                    Dot | RParen
                        | Semicolon
                        | Comma
                        | LBracket
                        | RBracket
                        | RBrace
                        | Question
                        | QuestionQuestion
                        | LParen
                ) =>
                {
                    self.start_at(checkpoint, PostfixUnaryExpr);
                    self.bump();
                    self.finish();
                }
                SwitchKw if self.nth(1) == LBrace => {
                    self.start_at(checkpoint, SwitchExpr);
                    self.bump();
                    self.parse_switch_expression_body();
                    self.finish();
                }
                Ident if self.at_word("with") && self.nth(1) == LBrace => {
                    self.start_at(checkpoint, WithExpr);
                    self.bump_remap(WithKw);
                    self.parse_initializer();
                    self.finish();
                }
                _ => break,
            }
        }
    }

    fn parse_simple_name(&mut self) {
        self.start(NameExpr);
        if self.at(Ident) || self.current().is_keyword() {
            let kind = if self.at(Ident) { Ident } else { self.current() };
            self.bump_remap(kind);
            if self.at(Lt) && self.generic_args_follow(self.pos) {
                self.parse_type_argument_list();
            }
        } else {
            self.error("expected name");
        }
        self.finish();
    }

    fn parse_primary(&mut self) {
        match self.current() {
            IntLiteral | RealLiteral | CharLiteral | StringLiteral | InterpolatedString
            | TrueKw | FalseKw | NullKw => {
                self.start(LiteralExpr);
                self.bump();
                self.finish();
            }
            Ident if self.at_query_start() => self.parse_query(),
            Ident => {
                self.start(NameExpr);
                self.bump();
                if self.at(Lt) && self.generic_args_follow(self.pos) {
                    self.parse_type_argument_list();
                }
                self.finish();
            }
            ThisKw | BaseKw => {
                self.start(NameExpr);
                self.bump();
                self.finish();
            }
            kind if kind.is_predefined_type() => {
                self.start(NameExpr);
                self.bump();
                self.finish();
            }
            LParen => self.parse_parenthesized(),
            NewKw => self.parse_new(),
            TypeofKw | SizeofKw | DefaultKw | CheckedKw | UncheckedKw => {
                let keyword = self.current();
                self.start(KeywordExpr);
                self.bump();
                if self.at(LParen) {
                    self.bump();
                    if matches!(keyword, CheckedKw | UncheckedKw) {
                        self.parse_expr();
                    } else {
                        self.parse_type();
                    }
                    self.expect(RParen);
                }
                self.finish();
            }
            DelegateKw => {
                self.start(AnonymousMethodExpr);
                self.bump();
                if self.at(LParen) {
                    self.parse_parameter_list();
                }
                self.parse_block();
                self.finish();
            }
            StackallocKw => {
                self.start(StackallocExpr);
                self.bump();
                if self.at(LBracket) {
                    self.bump();
                    self.expect(RBracket);
                } else {
                    self.parse_type();
                    if self.at(LBracket) {
                        self.bump();
                        if !self.at(RBracket) {
                            self.parse_expr();
                        }
                        self.expect(RBracket);
                    }
                }
                if self.at(LBrace) {
                    self.parse_initializer();
                }
                self.finish();
            }
            LBracket => {
                self.start(CollectionExpr);
                self.bump();
                self.parse_expression_list(RBracket);
                self.expect(RBracket);
                self.finish();
            }
            LBrace => self.parse_initializer(),
            RParen | RBracket | RBrace | Semicolon | Comma | Colon | Eof => {
                self.error("expected expression");
            }
            _ => self.error_and_bump("expected expression"),
        }
    }

    fn parse_parenthesized(&mut self) {
        let checkpoint = self.checkpoint();
        self.bump();
        self.parse_tuple_element();
        let mut tuple = false;
        while self.eat(Comma) {
            tuple = true;
            self.parse_tuple_element();
        }
        self.expect(RParen);
        self.start_at(checkpoint, if tuple { TupleExpr } else { ParenExpr });
        self.finish();
    }

    fn parse_tuple_element(&mut self) {
        if self.at(Ident) && self.nth(1) == Colon {
            self.start(Argument);
            self.bump();
            self.bump();
            self.parse_expr();
            self.finish();
            return;
        }
        if let Some(j) = self.scan_type(self.pos)
            && self.kind_at(j) == Ident
            && matches!(self.kind_at(j + 1), Comma | RParen)
        {
            self.start(Argument);
            self.parse_type();
            self.bump();
            self.finish();
            return;
        }
        self.parse_expr();
    }

    fn parse_new(&mut self) {
        match self.nth(1) {
            LBrace => {
                self.start(AnonymousObjectCreationExpr);
                self.bump();
                self.bump();
                while !self.at(RBrace) && !self.at(Eof) {
                    let before = self.pos;
                    self.parse_expr();
                    if self.pos == before || !self.eat(Comma) {
                        break;
                    }
                }
                self.expect(RBrace);
                self.finish();
            }
            LBracket => {
                self.start(ImplicitArrayCreationExpr);
                self.bump();
                self.bump();
                while self.eat(Comma) {}
                self.expect(RBracket);
                if self.at(LBrace) {
                    self.parse_initializer();
                } else {
                    self.error("expected array initializer");
                }
                self.finish();
            }
            LParen => {
                self.start(ObjectCreationExpr);
                self.bump();
                self.parse_argument_list();
                if self.at(LBrace) {
                    self.parse_initializer();
                }
                self.finish();
            }
            _ => {
                let checkpoint = self.checkpoint();
                self.bump();
                self.parse_type();
                let array = self.last_kind == RBracket || self.at(LBracket);
                while self.at(LBracket) {
                    if matches!(self.nth(1), Comma | RBracket) {
                        self.bump();
                        while self.eat(Comma) {}
                        self.expect(RBracket);
                    } else {
                        self.parse_bracketed_argument_list();
                    }
                }
                if !array && self.at(LParen) {
                    self.parse_argument_list();
                }
                if self.at(LBrace) {
                    self.parse_initializer();
                }
                self.start_at(
                    checkpoint,
                    if array { ArrayCreationExpr } else { ObjectCreationExpr },
                );
                self.finish();
            }
        }
    }

    /// `{ ... }` object, collection or array initializer
    fn parse_initializer(&mut self) {
        self.start(InitializerExpr);
        self.expect(LBrace);
        while !self.at(RBrace) && !self.at(Eof) {
            let before = self.pos;
            if self.at(LBrace) {
                self.parse_initializer();
            } else {
                self.parse_expr();
            }
            if self.pos == before {
                self.error_and_bump("expected initializer element");
                continue;
            }
            if !self.eat(Comma) {
                break;
            }
        }
        self.expect(RBrace);
        self.finish();
    }

    fn parse_lambda(&mut self) {
        self.start(LambdaExpr);
        self.eat(StaticKw);
        if self.at_word("async") && self.nth(1) != FatArrow {
            self.bump_remap(AsyncKw);
        }
        if self.at(Ident) {
            self.start(Parameter);
            self.bump();
            self.finish();
        } else {
            self.parse_parameter_list();
        }
        self.expect(FatArrow);
        if self.at(LBrace) {
            self.parse_block();
        } else {
            self.parse_expr();
        }
        self.finish();
    }

    fn parse_argument_list(&mut self) {
        self.start(ArgumentList);
        self.expect(LParen);
        while !self.at(RParen) && !self.at(Eof) {
            let before = self.pos;
            self.parse_argument();
            if self.pos == before || !self.eat(Comma) {
                break;
            }
        }
        self.expect(RParen);
        self.finish();
    }

    fn parse_bracketed_argument_list(&mut self) {
        self.start(BracketedArgumentList);
        self.expect(LBracket);
        while !self.at(RBracket) && !self.at(Eof) {
            let before = self.pos;
            self.parse_argument();
            if self.pos == before || !self.eat(Comma) {
                break;
            }
        }
        self.expect(RBracket);
        self.finish();
    }

    fn parse_argument(&mut self) {
        self.start(Argument);
        if self.at(Ident) && self.nth(1) == Colon {
            self.bump();
            self.bump();
        }
        if matches!(self.current(), RefKw | OutKw | InKw) {
            self.bump();
            // `out var x`, `out int x`
            if let Some(j) = self.scan_type(self.pos)
                && self.kind_at(j) == Ident
                && matches!(self.kind_at(j + 1), Comma | RParen)
            {
                self.parse_type();
                self.bump();
                self.finish();
                return;
            }
        }
        self.parse_expr();
        self.finish();
    }

    /// Patterns are kept as a balanced run of tokens
    fn parse_pattern(&mut self) {
        self.start(Pattern);
        let mut depth = 0usize;
        let start = self.pos;
        while !self.at(Eof) {
            let kind = self.current();
            if depth == 0 {
                let stop = matches!(
                    kind,
                    Colon
                        | FatArrow
                        | RParen
                        | RBracket
                        | RBrace
                        | Semicolon
                        | Comma
                        | Question
                        | AmpAmp
                        | PipePipe
                        | QuestionQuestion
                        | Eq
                ) || self.at_word("when");
                if stop && self.pos > start {
                    break;
                }
                if stop && matches!(kind, RParen | RBracket | RBrace | Semicolon | Comma) {
                    break;
                }
            }
            match kind {
                LParen | LBracket | LBrace => depth += 1,
                RParen | RBracket | RBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.bump();
        }
        self.finish();
    }

    fn parse_switch_expression_body(&mut self) {
        self.expect(LBrace);
        while !self.at(RBrace) && !self.at(Eof) {
            let before = self.pos;
            self.start(SwitchExprArm);
            self.parse_pattern();
            if self.at_word("when") {
                self.bump_remap(WhenKw);
                self.parse_expr();
            }
            self.expect(FatArrow);
            self.parse_expr();
            self.finish();
            if self.pos == before {
                self.error_and_bump("expected switch expression arm");
                continue;
            }
            if !self.eat(Comma) {
                break;
            }
        }
        self.expect(RBrace);
    }

    // ------------------------------------------------------------------
    // Query expressions
    // ------------------------------------------------------------------

    fn parse_query(&mut self) {
        self.start(QueryExpr);
        self.parse_from_clause();
        self.parse_query_body();
        self.finish();
    }

    fn parse_from_clause(&mut self) {
        self.start(FromClause);
        self.bump_remap(FromKw);
        if !(self.at(Ident) && self.nth(1) == InKw) {
            self.parse_type();
        }
        self.expect(Ident);
        self.expect(InKw);
        self.parse_expr();
        self.finish();
    }

    fn parse_query_body(&mut self) {
        loop {
            if self.at_word("from") {
                self.parse_from_clause();
            } else if self.at_word("let") {
                self.start(LetClause);
                self.bump_remap(LetKw);
                self.expect(Ident);
                self.expect(Eq);
                self.parse_expr();
                self.finish();
            } else if self.at_word("where") {
                self.start(WhereClause);
                self.bump_remap(WhereKw);
                self.parse_expr();
                self.finish();
            } else if self.at_word("join") {
                self.start(JoinClause);
                self.bump_remap(JoinKw);
                if !(self.at(Ident) && self.nth(1) == InKw) {
                    self.parse_type();
                }
                self.expect(Ident);
                self.expect(InKw);
                self.parse_expr();
                self.expect_word("on", OnKw);
                self.parse_expr();
                self.expect_word("equals", EqualsKw);
                self.parse_expr();
                if self.eat_word("into", IntoKw) {
                    self.expect(Ident);
                }
                self.finish();
            } else if self.at_word("orderby") {
                self.start(OrderByClause);
                self.bump_remap(OrderbyKw);
                loop {
                    self.parse_expr();
                    if !self.eat_word("ascending", AscendingKw) {
                        self.eat_word("descending", DescendingKw);
                    }
                    if !self.eat(Comma) {
                        break;
                    }
                }
                self.finish();
            } else {
                break;
            }
        }

        if self.at_word("select") {
            self.start(SelectClause);
            self.bump_remap(SelectKw);
            self.parse_expr();
            self.finish();
        } else if self.at_word("group") {
            self.start(GroupClause);
            self.bump_remap(GroupKw);
            self.parse_expr();
            self.expect_word("by", ByKw);
            self.parse_expr();
            self.finish();
        } else {
            self.error("expected 'select' or 'group'");
        }

        if self.at_word("into") {
            self.start(QueryContinuation);
            self.bump_remap(IntoKw);
            self.expect(Ident);
            self.parse_query_body();
            self.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> CsSyntaxNode {
        let (root, lexer_errors, errors) = parse_csharp(source);
        assert!(lexer_errors.is_empty(), "lexer errors: {lexer_errors:?}");
        assert!(errors.is_empty(), "parse errors: {errors:?}");
        assert_eq!(root.text().to_string(), source);
        root
    }

    fn count(root: &CsSyntaxNode, kind: CsSyntaxKind) -> usize {
        root.descendants().filter(|n| n.kind() == kind).count()
    }

    #[test]
    fn test_class_with_members() {
        let root = parse_ok(
            "using System;\n\nnamespace Demo\n{\n    public class Widget : IWidget\n    {\n        private int count = 0;\n\n        public int Count { get; set; }\n\n        public Widget(int c) : base()\n        {\n            count = c;\n        }\n\n        public int Twice() => count * 2;\n    }\n}\n",
        );
        assert_eq!(count(&root, UsingDirective), 1);
        assert_eq!(count(&root, NamespaceDecl), 1);
        assert_eq!(count(&root, ClassDecl), 1);
        assert_eq!(count(&root, FieldDecl), 1);
        assert_eq!(count(&root, PropertyDecl), 1);
        assert_eq!(count(&root, ConstructorDecl), 1);
        assert_eq!(count(&root, MethodDecl), 1);
        assert_eq!(count(&root, AccessorDecl), 2);
    }

    #[test]
    fn test_statements() {
        let root = parse_ok(
            "class A\n{\n    void M()\n    {\n        if (x) y(); else if (z) { w(); } else v();\n        while (a) b();\n        do { } while (c);\n        for (int i = 0; i < 10; i++) { }\n        foreach (var item in items) Use(item);\n        lock (gate) { }\n        using (var s = Open()) { }\n        try { } catch (Exception e) when (e != null) { } finally { }\n        switch (k) { case 1: case 2 when k > 0: break; default: return; }\n    }\n}\n",
        );
        assert_eq!(count(&root, IfStmt), 2);
        assert_eq!(count(&root, ElseClause), 2);
        assert_eq!(count(&root, WhileStmt), 1);
        assert_eq!(count(&root, DoStmt), 1);
        assert_eq!(count(&root, ForStmt), 1);
        assert_eq!(count(&root, ForEachStmt), 1);
        assert_eq!(count(&root, LockStmt), 1);
        assert_eq!(count(&root, UsingStmt), 1);
        assert_eq!(count(&root, CatchClause), 1);
        assert_eq!(count(&root, FinallyClause), 1);
        assert_eq!(count(&root, SwitchSection), 2);
        assert_eq!(count(&root, CaseSwitchLabel), 2);
    }

    #[test]
    fn test_expressions() {
        let root = parse_ok(
            "class A\n{\n    void M()\n    {\n        var list = new List<int> { 1, 2 };\n        var anon = new { Name = \"x\", Id = 1 };\n        var arr = new[] { 1, 2 };\n        int[] raw = { 1, 2 };\n        Func<int, int> f = x => x + 1;\n        Action g = async () => { await Task.Delay(1); };\n        var r = a?.B ?? c is null ? (int)d : e switch { 1 => 2, _ => 3 };\n        var q = from p in people where p.Age > 1 orderby p.Name select p;\n        var s = $\"{value}\";\n    }\n}\n",
        );
        assert_eq!(count(&root, InitializerExpr), 3);
        assert_eq!(count(&root, AnonymousObjectCreationExpr), 1);
        assert_eq!(count(&root, ImplicitArrayCreationExpr), 1);
        assert_eq!(count(&root, LambdaExpr), 2);
        assert_eq!(count(&root, SwitchExpr), 1);
        assert_eq!(count(&root, CastExpr), 1);
        assert_eq!(count(&root, QueryExpr), 1);
        assert_eq!(count(&root, WhereClause), 1);
        assert_eq!(count(&root, SelectClause), 1);
    }

    #[test]
    fn test_trivia_of_a_gap_share_one_parent() {
        let root = parse_ok("class A\n{\n    // note\n\n    int x;\n}\n");
        let tokens: Vec<_> = root
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .collect();
        let brace = tokens.iter().position(|t| t.kind() == LBrace).unwrap();
        let int_kw = tokens.iter().position(|t| t.kind() == IntKw).unwrap();
        let parent = tokens[brace + 1].parent().unwrap();
        for token in &tokens[brace + 1..int_kw] {
            assert!(token.kind().is_trivia());
            assert_eq!(token.parent().unwrap(), parent);
        }
    }

    #[test]
    fn test_non_root_nodes_start_with_significant_tokens() {
        let root = parse_ok("/// doc\nclass A\n{\n    /// doc\n    void M() { }\n}\n");
        for node in root.descendants().skip(1) {
            let first = node.first_token().unwrap();
            let last = node.last_token().unwrap();
            assert!(!first.kind().is_trivia(), "{:?} starts with trivia", node.kind());
            assert!(!last.kind().is_trivia(), "{:?} ends with trivia", node.kind());
        }
    }

    #[test]
    fn test_contextual_keywords_are_promoted() {
        let root = parse_ok(
            "class A\n{\n    int P { get => 1; set { } }\n    event E X { add { } remove { } }\n}\n",
        );
        let kinds: Vec<_> = root
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .map(|t| t.kind())
            .filter(|k| k.is_accessor_keyword())
            .collect();
        assert_eq!(kinds, vec![GetKw, SetKw, AddKw, RemoveKw]);
        assert_eq!(count(&root, EventDecl), 1);
    }

    #[test]
    fn test_file_scoped_namespace_owns_members() {
        let root = parse_ok("namespace A.B;\n\nclass C\n{\n}\n");
        let ns = root
            .descendants()
            .find(|n| n.kind() == FileScopedNamespaceDecl)
            .unwrap();
        assert!(ns.children().any(|n| n.kind() == ClassDecl));
    }

    #[test]
    fn test_records_enums_and_generics() {
        let root = parse_ok(
            "public record Point(int X, int Y);\npublic enum Color : byte\n{\n    Red = 1,\n    Green,\n}\npublic interface IRepo<T> where T : class, new()\n{\n    T Get<TKey>(TKey key);\n    T this[int index] { get; }\n}\n",
        );
        assert_eq!(count(&root, RecordDecl), 1);
        assert_eq!(count(&root, EnumMemberDecl), 2);
        assert_eq!(count(&root, TypeParameterConstraintClause), 1);
        assert_eq!(count(&root, IndexerDecl), 1);
        assert_eq!(count(&root, MethodDecl), 1);
    }

    #[test]
    fn test_error_recovery_keeps_text() {
        for source in [
            "class A { void M( { } }",
            "namespace { ",
            "}}} class",
            "class A { int x = ; }",
            "if (",
            "class A { void M() { var x = new { ",
        ] {
            let (root, _, _) = parse_csharp(source);
            assert_eq!(root.text().to_string(), source);
        }
    }

    #[test]
    fn test_disabled_text_round_trips() {
        let source = "class A\n{\n#if NEVER\n    void Broken( {\n#endif\n}\n";
        let root = parse_ok(source);
        assert!(
            root.descendants_with_tokens()
                .filter_map(|e| e.into_token())
                .any(|t| t.kind() == DisabledText)
        );
    }
}
