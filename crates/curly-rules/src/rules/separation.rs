//! Blank lines between elements
//!
//! - SA1513: a closing brace is followed by a blank line unless the next
//!   token continues the same construct
//! - SA1516: adjacent elements are separated by a blank line

use curly_core::{
    CsSyntaxKind, CsSyntaxNode, CsSyntaxToken, Diagnostic, EditSet, LineKind, SyntaxTree,
    TokenExt, TriviaStream,
};
use rowan::NodeOrToken;

use crate::catalog::RuleId;
use crate::context::RuleContext;
use crate::deference::Situation;
use crate::fix::helpers::{reported_token, separate_from_previous, significant_token_at};
use crate::fix::{FixContext, FixError};
use crate::locator::{ELEMENT_CONTAINERS, is_element, node_starting_at};

/// Parents of a `;` that ends the construct a closing brace belongs to
const TERMINATED_BY_SEMICOLON: &[CsSyntaxKind] = &[
    CsSyntaxKind::LocalDeclStmt,
    CsSyntaxKind::FieldDecl,
    CsSyntaxKind::EventFieldDecl,
    CsSyntaxKind::PropertyDecl,
    CsSyntaxKind::IndexerDecl,
    CsSyntaxKind::ReturnStmt,
    CsSyntaxKind::ThrowStmt,
    CsSyntaxKind::YieldStmt,
    CsSyntaxKind::ExprStmt,
    CsSyntaxKind::NamespaceDecl,
    CsSyntaxKind::MethodDecl,
    CsSyntaxKind::LocalFunctionStmt,
    CsSyntaxKind::AccessorDecl,
    CsSyntaxKind::OperatorDecl,
    CsSyntaxKind::ConversionOperatorDecl,
    CsSyntaxKind::ConstructorDecl,
    CsSyntaxKind::DestructorDecl,
];

/// `next` carries on the construct that the closing brace sits in
fn continues_construct(next: &CsSyntaxToken) -> bool {
    use CsSyntaxKind::*;

    let parent_kind = next.parent().map(|p| p.kind());
    match next.kind() {
        Eof | RBrace | Dot | Question | ElseKw | CatchKw | FinallyKw | Comma | RParen
        | RBracket | Colon => true,
        WhileKw => parent_kind == Some(DoStmt),
        Semicolon => parent_kind
            .is_some_and(|k| k.is_type_declaration() || TERMINATED_BY_SEMICOLON.contains(&k)),
        kind if kind.is_accessor_keyword() || kind.is_query_keyword() => true,
        kind if kind.is_access_modifier() || kind == ReadonlyKw || kind == LBracket => {
            node_starting_at(next, |k| k == AccessorDecl).is_some()
        }
        // Operator of an expression the braced operand belongs to, like `??`
        _ => matches!(parent_kind, Some(BinaryExpr | IsPatternExpr | AssignmentExpr)),
    }
}

/// The first line after the brace closes a region or conditional section
fn followed_by_section_end(gap: &TriviaStream) -> bool {
    let lines = gap.lines();
    lines.get(1).is_some_and(|line| {
        line.kind == LineKind::Directive
            && gap.items()[line.items.clone()]
                .iter()
                .filter_map(|item| item.directive())
                .any(|d| d.terminates_section())
    })
}

fn check_close_brace(
    ctx: &RuleContext<'_>,
    open: &CsSyntaxToken,
    close: &CsSyntaxToken,
) -> Option<Diagnostic> {
    let gap = TriviaStream::after(close)?;
    let next = gap.next();
    if ctx.tree.same_line(open, close)
        || gap.has_blank_line()
        || followed_by_section_end(&gap)
        || continues_construct(next)
    {
        return None;
    }
    if ctx.tree.same_line(close, next)
        && ctx.defers(RuleId::SA1513, Situation::TokenFollowsCloseBraceOnLine)
    {
        return None;
    }
    Some(ctx.report(RuleId::SA1513, gap.range()))
}

/// SA1513
pub fn check_blank_after_close_brace(ctx: &RuleContext<'_>, _root: &CsSyntaxNode) -> Vec<Diagnostic> {
    let mut open_braces = Vec::new();
    let mut diagnostics = Vec::new();
    for token in ctx.significant_tokens() {
        match token.kind() {
            CsSyntaxKind::LBrace => open_braces.push(token),
            CsSyntaxKind::RBrace => {
                if let Some(open) = open_braces.pop() {
                    diagnostics.extend(check_close_brace(ctx, &open, &token));
                }
            }
            _ => {}
        }
    }
    diagnostics
}

/// Fix for SA1513: separate the token after the brace
pub fn fix_blank_after_close_brace(
    fx: &FixContext<'_>,
    diagnostic: &Diagnostic,
) -> Result<EditSet, FixError> {
    let next = significant_token_at(&fx.tree.root(), diagnostic.span().end)
        .ok_or_else(|| FixError::inapplicable(RuleId::SA1513, "token after the brace is gone"))?;
    separate_from_previous(fx, RuleId::SA1513, &next)
}

/// What the previous child of a container was
enum Previous {
    /// Start of the container, or something that is not an element
    Nothing,
    /// The `;` of a file-scoped namespace
    Header,
    Element(CsSyntaxNode),
}

/// Pairs of adjacent elements that may sit without a blank line between
fn may_be_adjacent(tree: &SyntaxTree, prev: &CsSyntaxNode, element: &CsSyntaxNode) -> bool {
    use CsSyntaxKind::*;

    let single_line = || !tree.is_multi_line(prev) && !tree.is_multi_line(element);
    match (prev.kind(), element.kind()) {
        (UsingDirective, UsingDirective) | (ExternAliasDirective, ExternAliasDirective) => true,
        (FieldDecl, FieldDecl) | (EventFieldDecl, EventFieldDecl) | (AccessorDecl, AccessorDecl) => {
            single_line()
        }
        _ => false,
    }
}

/// Elements of `container` that lack a blank line before them
fn unseparated_elements(tree: &SyntaxTree, container: &CsSyntaxNode) -> Vec<CsSyntaxNode> {
    let mut previous = Previous::Nothing;
    let mut found = Vec::new();
    for child in container.children_with_tokens() {
        match child {
            NodeOrToken::Token(token) if token.kind().is_trivia() => {}
            NodeOrToken::Token(token) => {
                previous = if token.kind() == CsSyntaxKind::Semicolon
                    && container.kind() == CsSyntaxKind::FileScopedNamespaceDecl
                {
                    Previous::Header
                } else {
                    Previous::Nothing
                };
            }
            NodeOrToken::Node(node) if is_element(node.kind()) => {
                let needs_blank = match &previous {
                    Previous::Nothing => false,
                    Previous::Header => true,
                    Previous::Element(prev) => !may_be_adjacent(tree, prev, &node),
                };
                let separated = node
                    .first_token()
                    .is_some_and(|first| TriviaStream::before(&first).has_blank_line());
                if needs_blank && !separated {
                    found.push(node.clone());
                }
                previous = Previous::Element(node);
            }
            NodeOrToken::Node(_) => previous = Previous::Nothing,
        }
    }
    found
}

/// `element` should be, but is not, separated from what precedes it
pub(crate) fn missing_separation(ctx: &RuleContext<'_>, element: &CsSyntaxNode) -> bool {
    element
        .parent()
        .filter(|container| ELEMENT_CONTAINERS.contains(&container.kind()))
        .is_some_and(|container| {
            ctx.unseparated_in(&container, |c| unseparated_elements(ctx.tree, c))
                .contains(element)
        })
}

/// SA1516
pub fn check_element_separation(ctx: &RuleContext<'_>, container: &CsSyntaxNode) -> Vec<Diagnostic> {
    ctx.unseparated_in(container, |c| unseparated_elements(ctx.tree, c))
        .iter()
        .filter_map(|element| element.first_token())
        .filter(|first| !first.is_eof())
        .map(|first| ctx.report(RuleId::SA1516, first.text_range()))
        .collect()
}

/// Fix for SA1516: insert a blank line above the element
pub fn fix_element_separation(fx: &FixContext<'_>, diagnostic: &Diagnostic) -> Result<EditSet, FixError> {
    let first = reported_token(fx, RuleId::SA1516, diagnostic)?;
    separate_from_previous(fx, RuleId::SA1516, &first)
}
