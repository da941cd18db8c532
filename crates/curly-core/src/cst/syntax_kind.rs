//! Syntax kind enumeration for the C# CST
//!
//! This module defines all node and token types of the syntax tree:
//! - Trivia (whitespace, line breaks, comments, directives, disabled text)
//! - Literals and identifiers
//! - Punctuation and operators
//! - Reserved keywords and the contextual keywords the parser promotes
//! - Structural nodes (declarations, statements, expressions)

use std::fmt;

/// Syntax kind for C# language elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum CsSyntaxKind {
    // ==================
    // Trivia
    // ==================
    /// Spaces, tabs and other non-breaking whitespace
    Whitespace = 0,
    /// A single line break (`\n`, `\r\n`, `\r`, `\u{85}`, `\u{2028}`, `\u{2029}`)
    Newline,
    /// `// ...` (excluding the line break)
    CommentLine,
    /// `/* ... */`
    CommentBlock,
    /// `/// ...` (but not `////`)
    DocComment,
    /// `/** ... */`
    DocCommentBlock,
    /// A whole preprocessor directive line, including its line break
    Directive,
    /// Lines skipped by an inactive conditional section
    DisabledText,

    // ==================
    // Special tokens
    // ==================
    /// End of file marker (empty text)
    Eof,
    /// Unrecognised character
    ErrorToken,
    /// Identifier (including `@`-escaped identifiers and contextual keywords)
    Ident,

    // ==================
    // Literals
    // ==================
    IntLiteral,
    RealLiteral,
    CharLiteral,
    StringLiteral,
    /// `$"..."` and its verbatim/raw variants, holes included
    InterpolatedString,

    // ==================
    // Punctuation and operators
    // ==================
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    DotDot,
    Colon,
    ColonColon,
    Question,
    QuestionQuestion,
    QuestionQuestionEq,
    Eq,
    EqEq,
    FatArrow,
    Bang,
    BangEq,
    Lt,
    LtEq,
    Shl,
    ShlEq,
    /// `>` is always lexed alone; `>>` is two `Gt` tokens
    Gt,
    GtEq,
    Plus,
    PlusPlus,
    PlusEq,
    Minus,
    MinusMinus,
    MinusEq,
    Arrow,
    Star,
    StarEq,
    Slash,
    SlashEq,
    Percent,
    PercentEq,
    Amp,
    AmpAmp,
    AmpEq,
    Pipe,
    PipePipe,
    PipeEq,
    Caret,
    CaretEq,
    Tilde,

    // ==================
    // Reserved keywords
    // ==================
    AbstractKw,
    AsKw,
    BaseKw,
    BoolKw,
    BreakKw,
    ByteKw,
    CaseKw,
    CatchKw,
    CharKw,
    CheckedKw,
    ClassKw,
    ConstKw,
    ContinueKw,
    DecimalKw,
    DefaultKw,
    DelegateKw,
    DoKw,
    DoubleKw,
    ElseKw,
    EnumKw,
    EventKw,
    ExplicitKw,
    ExternKw,
    FalseKw,
    FinallyKw,
    FixedKw,
    FloatKw,
    ForKw,
    ForeachKw,
    GotoKw,
    IfKw,
    ImplicitKw,
    InKw,
    IntKw,
    InterfaceKw,
    InternalKw,
    IsKw,
    LockKw,
    LongKw,
    NamespaceKw,
    NewKw,
    NullKw,
    ObjectKw,
    OperatorKw,
    OutKw,
    OverrideKw,
    ParamsKw,
    PrivateKw,
    ProtectedKw,
    PublicKw,
    ReadonlyKw,
    RefKw,
    ReturnKw,
    SbyteKw,
    SealedKw,
    ShortKw,
    SizeofKw,
    StackallocKw,
    StaticKw,
    StringKw,
    StructKw,
    SwitchKw,
    ThisKw,
    ThrowKw,
    TrueKw,
    TryKw,
    TypeofKw,
    UintKw,
    UlongKw,
    UncheckedKw,
    UnsafeKw,
    UshortKw,
    UsingKw,
    VirtualKw,
    VoidKw,
    VolatileKw,
    WhileKw,

    // ==================
    // Contextual keywords (promoted from identifiers by the parser)
    // ==================
    GetKw,
    SetKw,
    InitKw,
    AddKw,
    RemoveKw,
    WhereKw,
    FromKw,
    SelectKw,
    GroupKw,
    ByKw,
    OrderbyKw,
    LetKw,
    JoinKw,
    OnKw,
    EqualsKw,
    IntoKw,
    AscendingKw,
    DescendingKw,
    WhenKw,
    YieldKw,
    AwaitKw,
    AsyncKw,
    PartialKw,
    RecordKw,
    GlobalKw,
    AliasKw,
    WithKw,

    // ==================
    // Declarations
    // ==================
    CompilationUnit,
    ExternAliasDirective,
    UsingDirective,
    NamespaceDecl,
    FileScopedNamespaceDecl,
    ClassDecl,
    StructDecl,
    InterfaceDecl,
    RecordDecl,
    EnumDecl,
    EnumMemberDecl,
    DelegateDecl,
    AttributeList,
    BaseList,
    TypeParameterList,
    TypeParameterConstraintClause,
    ParameterList,
    BracketedParameterList,
    Parameter,
    FieldDecl,
    EventFieldDecl,
    EventDecl,
    PropertyDecl,
    IndexerDecl,
    MethodDecl,
    ConstructorDecl,
    ConstructorInitializer,
    DestructorDecl,
    OperatorDecl,
    ConversionOperatorDecl,
    AccessorList,
    AccessorDecl,
    ArrowExpressionClause,
    EqualsValueClause,
    VariableDeclaration,
    VariableDeclarator,
    Type,
    TypeArgumentList,
    GlobalStatement,

    // ==================
    // Statements
    // ==================
    Block,
    EmptyStmt,
    LocalDeclStmt,
    LocalFunctionStmt,
    ExprStmt,
    IfStmt,
    ElseClause,
    WhileStmt,
    DoStmt,
    ForStmt,
    ForEachStmt,
    ForEachVariable,
    SwitchStmt,
    SwitchSection,
    CaseSwitchLabel,
    DefaultSwitchLabel,
    BreakStmt,
    ContinueStmt,
    ReturnStmt,
    ThrowStmt,
    GotoStmt,
    YieldStmt,
    TryStmt,
    CatchClause,
    CatchDeclaration,
    CatchFilterClause,
    FinallyClause,
    CheckedStmt,
    UnsafeStmt,
    LockStmt,
    UsingStmt,
    FixedStmt,
    LabeledStmt,

    // ==================
    // Expressions
    // ==================
    LiteralExpr,
    NameExpr,
    ParenExpr,
    TupleExpr,
    CastExpr,
    MemberAccessExpr,
    ConditionalAccessExpr,
    InvocationExpr,
    ArgumentList,
    Argument,
    ElementAccessExpr,
    BracketedArgumentList,
    PostfixUnaryExpr,
    PrefixUnaryExpr,
    BinaryExpr,
    AssignmentExpr,
    ConditionalExpr,
    IsPatternExpr,
    LambdaExpr,
    AnonymousMethodExpr,
    ObjectCreationExpr,
    ArrayCreationExpr,
    ImplicitArrayCreationExpr,
    AnonymousObjectCreationExpr,
    InitializerExpr,
    KeywordExpr,
    AwaitExpr,
    ThrowExpr,
    SwitchExpr,
    SwitchExprArm,
    WithExpr,
    CollectionExpr,
    StackallocExpr,
    Pattern,
    QueryExpr,
    FromClause,
    LetClause,
    WhereClause,
    JoinClause,
    OrderByClause,
    SelectClause,
    GroupClause,
    QueryContinuation,

    /// Unparseable input wrapped for recovery
    Error,

    /// Sentinel; never produced
    Tombstone,
}

impl CsSyntaxKind {
    /// Check if this is a trivia kind
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace
                | Self::Newline
                | Self::CommentLine
                | Self::CommentBlock
                | Self::DocComment
                | Self::DocCommentBlock
                | Self::Directive
                | Self::DisabledText
        )
    }

    /// Comments of any flavour, documentation comments included
    pub const fn is_comment(self) -> bool {
        matches!(
            self,
            Self::CommentLine | Self::CommentBlock | Self::DocComment | Self::DocCommentBlock
        )
    }

    pub const fn is_doc_comment(self) -> bool {
        matches!(self, Self::DocComment | Self::DocCommentBlock)
    }

    /// Reserved or promoted contextual keyword
    pub const fn is_keyword(self) -> bool {
        (self as u16) >= (Self::AbstractKw as u16) && (self as u16) <= (Self::WithKw as u16)
    }

    pub const fn is_contextual_keyword(self) -> bool {
        (self as u16) >= (Self::GetKw as u16) && (self as u16) <= (Self::WithKw as u16)
    }

    pub const fn is_punct(self) -> bool {
        (self as u16) >= (Self::LBrace as u16) && (self as u16) <= (Self::Tilde as u16)
    }

    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::IntLiteral
                | Self::RealLiteral
                | Self::CharLiteral
                | Self::StringLiteral
                | Self::InterpolatedString
                | Self::TrueKw
                | Self::FalseKw
                | Self::NullKw
        )
    }

    /// Check if this is a structural node
    pub const fn is_node(self) -> bool {
        (self as u16) >= (Self::CompilationUnit as u16) && (self as u16) <= (Self::Error as u16)
    }

    /// Identifier-like tokens that need separating whitespace from each other
    pub const fn is_word(self) -> bool {
        matches!(
            self,
            Self::Ident | Self::IntLiteral | Self::RealLiteral
        ) || self.is_keyword()
    }

    pub const fn is_predefined_type(self) -> bool {
        matches!(
            self,
            Self::BoolKw
                | Self::ByteKw
                | Self::CharKw
                | Self::DecimalKw
                | Self::DoubleKw
                | Self::FloatKw
                | Self::IntKw
                | Self::LongKw
                | Self::ObjectKw
                | Self::SbyteKw
                | Self::ShortKw
                | Self::StringKw
                | Self::UintKw
                | Self::UlongKw
                | Self::UshortKw
                | Self::VoidKw
        )
    }

    pub const fn is_access_modifier(self) -> bool {
        matches!(
            self,
            Self::PublicKw | Self::PrivateKw | Self::ProtectedKw | Self::InternalKw
        )
    }

    /// Reserved modifiers that may precede a member declaration
    pub const fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::PublicKw
                | Self::PrivateKw
                | Self::ProtectedKw
                | Self::InternalKw
                | Self::StaticKw
                | Self::AbstractKw
                | Self::SealedKw
                | Self::VirtualKw
                | Self::OverrideKw
                | Self::ReadonlyKw
                | Self::UnsafeKw
                | Self::ExternKw
                | Self::NewKw
                | Self::VolatileKw
                | Self::ConstKw
                | Self::PartialKw
                | Self::AsyncKw
                | Self::RefKw
        )
    }

    pub const fn is_accessor_keyword(self) -> bool {
        matches!(
            self,
            Self::GetKw | Self::SetKw | Self::InitKw | Self::AddKw | Self::RemoveKw
        )
    }

    pub const fn is_query_keyword(self) -> bool {
        matches!(
            self,
            Self::FromKw
                | Self::WhereKw
                | Self::SelectKw
                | Self::GroupKw
                | Self::ByKw
                | Self::OrderbyKw
                | Self::LetKw
                | Self::JoinKw
                | Self::OnKw
                | Self::EqualsKw
                | Self::IntoKw
                | Self::AscendingKw
                | Self::DescendingKw
        )
    }

    /// Type-like declarations with a brace-delimited body
    pub const fn is_type_declaration(self) -> bool {
        matches!(
            self,
            Self::ClassDecl
                | Self::StructDecl
                | Self::InterfaceDecl
                | Self::RecordDecl
                | Self::EnumDecl
        )
    }

    pub const fn is_statement(self) -> bool {
        matches!(
            self,
            Self::Block
                | Self::EmptyStmt
                | Self::LocalDeclStmt
                | Self::LocalFunctionStmt
                | Self::ExprStmt
                | Self::IfStmt
                | Self::WhileStmt
                | Self::DoStmt
                | Self::ForStmt
                | Self::ForEachStmt
                | Self::SwitchStmt
                | Self::BreakStmt
                | Self::ContinueStmt
                | Self::ReturnStmt
                | Self::ThrowStmt
                | Self::GotoStmt
                | Self::YieldStmt
                | Self::TryStmt
                | Self::CheckedStmt
                | Self::UnsafeStmt
                | Self::LockStmt
                | Self::UsingStmt
                | Self::FixedStmt
                | Self::LabeledStmt
        )
    }

    /// Declarations that may appear as members of a namespace or type
    pub const fn is_member_declaration(self) -> bool {
        matches!(
            self,
            Self::NamespaceDecl
                | Self::FileScopedNamespaceDecl
                | Self::ClassDecl
                | Self::StructDecl
                | Self::InterfaceDecl
                | Self::RecordDecl
                | Self::EnumDecl
                | Self::DelegateDecl
                | Self::FieldDecl
                | Self::EventFieldDecl
                | Self::EventDecl
                | Self::PropertyDecl
                | Self::IndexerDecl
                | Self::MethodDecl
                | Self::ConstructorDecl
                | Self::DestructorDecl
                | Self::OperatorDecl
                | Self::ConversionOperatorDecl
        )
    }

    /// Source text of a keyword kind
    pub const fn keyword_text(self) -> Option<&'static str> {
        let text = match self {
            Self::AbstractKw => "abstract",
            Self::AsKw => "as",
            Self::BaseKw => "base",
            Self::BoolKw => "bool",
            Self::BreakKw => "break",
            Self::ByteKw => "byte",
            Self::CaseKw => "case",
            Self::CatchKw => "catch",
            Self::CharKw => "char",
            Self::CheckedKw => "checked",
            Self::ClassKw => "class",
            Self::ConstKw => "const",
            Self::ContinueKw => "continue",
            Self::DecimalKw => "decimal",
            Self::DefaultKw => "default",
            Self::DelegateKw => "delegate",
            Self::DoKw => "do",
            Self::DoubleKw => "double",
            Self::ElseKw => "else",
            Self::EnumKw => "enum",
            Self::EventKw => "event",
            Self::ExplicitKw => "explicit",
            Self::ExternKw => "extern",
            Self::FalseKw => "false",
            Self::FinallyKw => "finally",
            Self::FixedKw => "fixed",
            Self::FloatKw => "float",
            Self::ForKw => "for",
            Self::ForeachKw => "foreach",
            Self::GotoKw => "goto",
            Self::IfKw => "if",
            Self::ImplicitKw => "implicit",
            Self::InKw => "in",
            Self::IntKw => "int",
            Self::InterfaceKw => "interface",
            Self::InternalKw => "internal",
            Self::IsKw => "is",
            Self::LockKw => "lock",
            Self::LongKw => "long",
            Self::NamespaceKw => "namespace",
            Self::NewKw => "new",
            Self::NullKw => "null",
            Self::ObjectKw => "object",
            Self::OperatorKw => "operator",
            Self::OutKw => "out",
            Self::OverrideKw => "override",
            Self::ParamsKw => "params",
            Self::PrivateKw => "private",
            Self::ProtectedKw => "protected",
            Self::PublicKw => "public",
            Self::ReadonlyKw => "readonly",
            Self::RefKw => "ref",
            Self::ReturnKw => "return",
            Self::SbyteKw => "sbyte",
            Self::SealedKw => "sealed",
            Self::ShortKw => "short",
            Self::SizeofKw => "sizeof",
            Self::StackallocKw => "stackalloc",
            Self::StaticKw => "static",
            Self::StringKw => "string",
            Self::StructKw => "struct",
            Self::SwitchKw => "switch",
            Self::ThisKw => "this",
            Self::ThrowKw => "throw",
            Self::TrueKw => "true",
            Self::TryKw => "try",
            Self::TypeofKw => "typeof",
            Self::UintKw => "uint",
            Self::UlongKw => "ulong",
            Self::UncheckedKw => "unchecked",
            Self::UnsafeKw => "unsafe",
            Self::UshortKw => "ushort",
            Self::UsingKw => "using",
            Self::VirtualKw => "virtual",
            Self::VoidKw => "void",
            Self::VolatileKw => "volatile",
            Self::WhileKw => "while",
            Self::GetKw => "get",
            Self::SetKw => "set",
            Self::InitKw => "init",
            Self::AddKw => "add",
            Self::RemoveKw => "remove",
            Self::WhereKw => "where",
            Self::FromKw => "from",
            Self::SelectKw => "select",
            Self::GroupKw => "group",
            Self::ByKw => "by",
            Self::OrderbyKw => "orderby",
            Self::LetKw => "let",
            Self::JoinKw => "join",
            Self::OnKw => "on",
            Self::EqualsKw => "equals",
            Self::IntoKw => "into",
            Self::AscendingKw => "ascending",
            Self::DescendingKw => "descending",
            Self::WhenKw => "when",
            Self::YieldKw => "yield",
            Self::AwaitKw => "await",
            Self::AsyncKw => "async",
            Self::PartialKw => "partial",
            Self::RecordKw => "record",
            Self::GlobalKw => "global",
            Self::AliasKw => "alias",
            Self::WithKw => "with",
            _ => return None,
        };
        Some(text)
    }

    /// Map a word to its reserved keyword kind
    pub fn reserved_keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "abstract" => Self::AbstractKw,
            "as" => Self::AsKw,
            "base" => Self::BaseKw,
            "bool" => Self::BoolKw,
            "break" => Self::BreakKw,
            "byte" => Self::ByteKw,
            "case" => Self::CaseKw,
            "catch" => Self::CatchKw,
            "char" => Self::CharKw,
            "checked" => Self::CheckedKw,
            "class" => Self::ClassKw,
            "const" => Self::ConstKw,
            "continue" => Self::ContinueKw,
            "decimal" => Self::DecimalKw,
            "default" => Self::DefaultKw,
            "delegate" => Self::DelegateKw,
            "do" => Self::DoKw,
            "double" => Self::DoubleKw,
            "else" => Self::ElseKw,
            "enum" => Self::EnumKw,
            "event" => Self::EventKw,
            "explicit" => Self::ExplicitKw,
            "extern" => Self::ExternKw,
            "false" => Self::FalseKw,
            "finally" => Self::FinallyKw,
            "fixed" => Self::FixedKw,
            "float" => Self::FloatKw,
            "for" => Self::ForKw,
            "foreach" => Self::ForeachKw,
            "goto" => Self::GotoKw,
            "if" => Self::IfKw,
            "implicit" => Self::ImplicitKw,
            "in" => Self::InKw,
            "int" => Self::IntKw,
            "interface" => Self::InterfaceKw,
            "internal" => Self::InternalKw,
            "is" => Self::IsKw,
            "lock" => Self::LockKw,
            "long" => Self::LongKw,
            "namespace" => Self::NamespaceKw,
            "new" => Self::NewKw,
            "null" => Self::NullKw,
            "object" => Self::ObjectKw,
            "operator" => Self::OperatorKw,
            "out" => Self::OutKw,
            "override" => Self::OverrideKw,
            "params" => Self::ParamsKw,
            "private" => Self::PrivateKw,
            "protected" => Self::ProtectedKw,
            "public" => Self::PublicKw,
            "readonly" => Self::ReadonlyKw,
            "ref" => Self::RefKw,
            "return" => Self::ReturnKw,
            "sbyte" => Self::SbyteKw,
            "sealed" => Self::SealedKw,
            "short" => Self::ShortKw,
            "sizeof" => Self::SizeofKw,
            "stackalloc" => Self::StackallocKw,
            "static" => Self::StaticKw,
            "string" => Self::StringKw,
            "struct" => Self::StructKw,
            "switch" => Self::SwitchKw,
            "this" => Self::ThisKw,
            "throw" => Self::ThrowKw,
            "true" => Self::TrueKw,
            "try" => Self::TryKw,
            "typeof" => Self::TypeofKw,
            "uint" => Self::UintKw,
            "ulong" => Self::UlongKw,
            "unchecked" => Self::UncheckedKw,
            "unsafe" => Self::UnsafeKw,
            "ushort" => Self::UshortKw,
            "using" => Self::UsingKw,
            "virtual" => Self::VirtualKw,
            "void" => Self::VoidKw,
            "volatile" => Self::VolatileKw,
            "while" => Self::WhileKw,
            _ => return None,
        };
        Some(kind)
    }

    /// Every kind, indexed by its raw value
    #[rustfmt::skip]
    pub const ALL: &'static [CsSyntaxKind] = {
        use CsSyntaxKind::*;
        &[
            Whitespace, Newline, CommentLine, CommentBlock, DocComment, DocCommentBlock, Directive,
            DisabledText, Eof, ErrorToken, Ident, IntLiteral, RealLiteral, CharLiteral, StringLiteral,
            InterpolatedString, LBrace, RBrace, LParen, RParen, LBracket, RBracket, Semicolon, Comma,
            Dot, DotDot, Colon, ColonColon, Question, QuestionQuestion, QuestionQuestionEq, Eq, EqEq,
            FatArrow, Bang, BangEq, Lt, LtEq, Shl, ShlEq, Gt, GtEq, Plus, PlusPlus, PlusEq, Minus,
            MinusMinus, MinusEq, Arrow, Star, StarEq, Slash, SlashEq, Percent, PercentEq, Amp, AmpAmp,
            AmpEq, Pipe, PipePipe, PipeEq, Caret, CaretEq, Tilde, AbstractKw, AsKw, BaseKw, BoolKw,
            BreakKw, ByteKw, CaseKw, CatchKw, CharKw, CheckedKw, ClassKw, ConstKw, ContinueKw,
            DecimalKw, DefaultKw, DelegateKw, DoKw, DoubleKw, ElseKw, EnumKw, EventKw, ExplicitKw,
            ExternKw, FalseKw, FinallyKw, FixedKw, FloatKw, ForKw, ForeachKw, GotoKw, IfKw, ImplicitKw,
            InKw, IntKw, InterfaceKw, InternalKw, IsKw, LockKw, LongKw, NamespaceKw, NewKw, NullKw,
            ObjectKw, OperatorKw, OutKw, OverrideKw, ParamsKw, PrivateKw, ProtectedKw, PublicKw,
            ReadonlyKw, RefKw, ReturnKw, SbyteKw, SealedKw, ShortKw, SizeofKw, StackallocKw, StaticKw,
            StringKw, StructKw, SwitchKw, ThisKw, ThrowKw, TrueKw, TryKw, TypeofKw, UintKw, UlongKw,
            UncheckedKw, UnsafeKw, UshortKw, UsingKw, VirtualKw, VoidKw, VolatileKw, WhileKw, GetKw,
            SetKw, InitKw, AddKw, RemoveKw, WhereKw, FromKw, SelectKw, GroupKw, ByKw, OrderbyKw, LetKw,
            JoinKw, OnKw, EqualsKw, IntoKw, AscendingKw, DescendingKw, WhenKw, YieldKw, AwaitKw,
            AsyncKw, PartialKw, RecordKw, GlobalKw, AliasKw, WithKw, CompilationUnit,
            ExternAliasDirective, UsingDirective, NamespaceDecl, FileScopedNamespaceDecl, ClassDecl,
            StructDecl, InterfaceDecl, RecordDecl, EnumDecl, EnumMemberDecl, DelegateDecl,
            AttributeList, BaseList, TypeParameterList, TypeParameterConstraintClause, ParameterList,
            BracketedParameterList, Parameter, FieldDecl, EventFieldDecl, EventDecl, PropertyDecl,
            IndexerDecl, MethodDecl, ConstructorDecl, ConstructorInitializer, DestructorDecl,
            OperatorDecl, ConversionOperatorDecl, AccessorList, AccessorDecl, ArrowExpressionClause,
            EqualsValueClause, VariableDeclaration, VariableDeclarator, Type, TypeArgumentList,
            GlobalStatement, Block, EmptyStmt, LocalDeclStmt, LocalFunctionStmt, ExprStmt, IfStmt,
            ElseClause, WhileStmt, DoStmt, ForStmt, ForEachStmt, ForEachVariable, SwitchStmt,
            SwitchSection, CaseSwitchLabel, DefaultSwitchLabel, BreakStmt, ContinueStmt, ReturnStmt,
            ThrowStmt, GotoStmt, YieldStmt, TryStmt, CatchClause, CatchDeclaration, CatchFilterClause,
            FinallyClause, CheckedStmt, UnsafeStmt, LockStmt, UsingStmt, FixedStmt, LabeledStmt,
            LiteralExpr, NameExpr, ParenExpr, TupleExpr, CastExpr, MemberAccessExpr,
            ConditionalAccessExpr, InvocationExpr, ArgumentList, Argument, ElementAccessExpr,
            BracketedArgumentList, PostfixUnaryExpr, PrefixUnaryExpr, BinaryExpr, AssignmentExpr,
            ConditionalExpr, IsPatternExpr, LambdaExpr, AnonymousMethodExpr, ObjectCreationExpr,
            ArrayCreationExpr, ImplicitArrayCreationExpr, AnonymousObjectCreationExpr, InitializerExpr,
            KeywordExpr, AwaitExpr, ThrowExpr, SwitchExpr, SwitchExprArm, WithExpr, CollectionExpr,
            StackallocExpr, Pattern, QueryExpr, FromClause, LetClause, WhereClause, JoinClause,
            OrderByClause, SelectClause, GroupClause, QueryContinuation, Error, Tombstone,
        ]
    };

    /// Convert a raw rowan kind back into a syntax kind
    ///
    /// Values no kind maps to come back as [`CsSyntaxKind::Error`].
    pub fn from_raw(raw: u16) -> Self {
        Self::ALL
            .get(usize::from(raw))
            .copied()
            .unwrap_or(Self::Error)
    }
}

impl fmt::Display for CsSyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.keyword_text() {
            Some(text) => f.write_str(text),
            None => write!(f, "{self:?}"),
        }
    }
}

impl From<CsSyntaxKind> for rowan::SyntaxKind {
    fn from(kind: CsSyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivia_classification() {
        assert!(CsSyntaxKind::Whitespace.is_trivia());
        assert!(CsSyntaxKind::Directive.is_trivia());
        assert!(CsSyntaxKind::DisabledText.is_trivia());
        assert!(!CsSyntaxKind::LBrace.is_trivia());
        assert!(!CsSyntaxKind::Eof.is_trivia());
    }

    #[test]
    fn test_keyword_round_trip() {
        for word in ["if", "else", "while", "namespace", "stackalloc"] {
            let kind = CsSyntaxKind::reserved_keyword(word).unwrap();
            assert!(kind.is_keyword());
            assert_eq!(kind.keyword_text(), Some(word));
        }
        assert_eq!(CsSyntaxKind::reserved_keyword("get"), None);
        assert!(CsSyntaxKind::GetKw.is_contextual_keyword());
    }

    #[test]
    fn test_raw_conversion() {
        for kind in [
            CsSyntaxKind::Whitespace,
            CsSyntaxKind::RBrace,
            CsSyntaxKind::WithKw,
            CsSyntaxKind::QueryContinuation,
            CsSyntaxKind::Error,
        ] {
            let raw: rowan::SyntaxKind = kind.into();
            assert_eq!(CsSyntaxKind::from_raw(raw.0), kind);
        }
        assert_eq!(CsSyntaxKind::from_raw(u16::MAX), CsSyntaxKind::Error);
    }

    #[test]
    fn test_kind_table_matches_discriminants() {
        for (index, kind) in CsSyntaxKind::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, index, "{kind:?} is out of place");
        }
        assert_eq!(CsSyntaxKind::ALL.last(), Some(&CsSyntaxKind::Tombstone));
    }

    #[test]
    fn test_node_classification() {
        assert!(CsSyntaxKind::Block.is_node());
        assert!(CsSyntaxKind::Block.is_statement());
        assert!(CsSyntaxKind::ClassDecl.is_type_declaration());
        assert!(!CsSyntaxKind::Ident.is_node());
    }
}
