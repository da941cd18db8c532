//! Brace placement rules
//!
//! - SA1500: a brace of a multi-line construct shares its line with other
//!   code.
//! - SA1501: a statement block is written on a single line.
//! - SA1502: an element body is written on a single line.

use curly_core::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken, Diagnostic, EditSet, TokenExt};

use crate::catalog::RuleId;
use crate::context::RuleContext;
use crate::deference::Situation;
use crate::fix::helpers::{
    brace_level, line_break_before, may_share_line_with_brace, push_unique, reported_token,
};
use crate::fix::{FixContext, FixError};
use crate::locator::{
    BraceConstruct, accessor_keyword, body_braces, brace_construct, brace_pair,
    has_accessor_bodies, is_accessor_body, is_lambda_body, is_member_body, is_statement_block,
};

/// Which sides of a brace share its line with other code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SharedSides {
    pub before: bool,
    pub after: bool,
}

impl SharedSides {
    pub fn of(tree: &curly_core::SyntaxTree, brace: &CsSyntaxToken) -> Self {
        let before = brace
            .prev_significant()
            .is_some_and(|prev| tree.same_line(&prev, brace));
        let after = brace.next_significant().is_some_and(|next| {
            !may_share_line_with_brace(next.kind()) && tree.same_line(brace, &next)
        });
        Self { before, after }
    }

    pub fn any(self) -> bool {
        self.before || self.after
    }
}

/// Situation under which SA1500 leaves a single-line pair to another rule
fn single_line_situation(owner: &CsSyntaxNode, construct: BraceConstruct) -> Option<Situation> {
    match construct {
        BraceConstruct::Namespace | BraceConstruct::Type => Some(Situation::SingleLineElementBody),
        BraceConstruct::AccessorList => Some(Situation::SingleLineElementBody),
        BraceConstruct::Switch => Some(Situation::SingleLineStatementBlock),
        BraceConstruct::Block if is_member_body(owner) => Some(Situation::SingleLineElementBody),
        BraceConstruct::Block if is_statement_block(owner) => {
            Some(Situation::SingleLineStatementBlock)
        }
        _ => None,
    }
}

/// Single-line pairs that are acceptable as written
fn single_line_exempt(owner: &CsSyntaxNode, construct: BraceConstruct) -> bool {
    match construct {
        BraceConstruct::Initializer | BraceConstruct::AnonymousObject => true,
        BraceConstruct::AccessorList => !has_accessor_bodies(owner),
        BraceConstruct::Block => is_lambda_body(owner),
        _ => false,
    }
}

/// Accessor body whose opening brace sits on the accessor keyword's line
fn is_single_line_accessor_body(ctx: &RuleContext<'_>, block: &CsSyntaxNode, open: &CsSyntaxToken) -> bool {
    is_accessor_body(block)
        && block
            .parent()
            .and_then(|accessor| accessor_keyword(&accessor))
            .is_some_and(|keyword| ctx.tree.same_line(&keyword, open))
}

/// SA1500
pub fn check_brace_placement(ctx: &RuleContext<'_>, node: &CsSyntaxNode) -> Vec<Diagnostic> {
    let Some(construct) = brace_construct(node) else {
        return Vec::new();
    };
    let Some((open, close)) = brace_pair(node) else {
        return Vec::new();
    };
    let tree = ctx.tree;
    let open_sides = SharedSides::of(tree, &open);
    let close_sides = SharedSides::of(tree, &close);

    if !tree.same_line(&open, &close) {
        let mut diagnostics = Vec::new();
        if open_sides.any() {
            diagnostics.push(ctx.report(RuleId::SA1500, open.text_range()));
        }
        if close_sides.any() {
            diagnostics.push(ctx.report(RuleId::SA1500, close.text_range()));
        }
        return diagnostics;
    }

    if single_line_exempt(node, construct) {
        return Vec::new();
    }
    if construct == BraceConstruct::Block
        && is_single_line_accessor_body(ctx, node, &open)
        && ctx.defers(RuleId::SA1500, Situation::SingleLineAccessorBody)
    {
        return Vec::new();
    }
    if let Some(situation) = single_line_situation(node, construct)
        && ctx.defers(RuleId::SA1500, situation)
    {
        return Vec::new();
    }

    if open_sides.any() {
        vec![ctx.report(RuleId::SA1500, open.text_range())]
    } else if close_sides.any() {
        vec![ctx.report(RuleId::SA1500, close.text_range())]
    } else {
        Vec::new()
    }
}

/// SA1501
pub fn check_single_line_statement(ctx: &RuleContext<'_>, node: &CsSyntaxNode) -> Vec<Diagnostic> {
    let is_statement = match node.kind() {
        CsSyntaxKind::Block => is_statement_block(node),
        CsSyntaxKind::SwitchStmt => true,
        _ => false,
    };
    if !is_statement {
        return Vec::new();
    }
    match brace_pair(node) {
        Some((open, close)) if ctx.tree.same_line(&open, &close) => {
            vec![ctx.report(RuleId::SA1501, open.text_range())]
        }
        _ => Vec::new(),
    }
}

/// SA1502
pub fn check_single_line_element(ctx: &RuleContext<'_>, node: &CsSyntaxNode) -> Vec<Diagnostic> {
    if matches!(
        node.kind(),
        CsSyntaxKind::PropertyDecl | CsSyntaxKind::IndexerDecl | CsSyntaxKind::EventDecl
    ) {
        let has_bodies = node
            .children()
            .find(|c| c.kind() == CsSyntaxKind::AccessorList)
            .is_some_and(|list| has_accessor_bodies(&list));
        if !has_bodies {
            return Vec::new();
        }
    }
    match body_braces(node) {
        Some((open, close)) if ctx.tree.same_line(&open, &close) => {
            vec![ctx.report(RuleId::SA1502, open.text_range())]
        }
        _ => Vec::new(),
    }
}

/// Line breaks that put one brace on its own line
///
/// `level` is the indentation of the brace pair. Code after an opening
/// brace goes one level deeper unless it is the matching closing brace.
pub(crate) fn place_brace(
    fx: &FixContext<'_>,
    edits: &mut EditSet,
    brace: &CsSyntaxToken,
    level: usize,
) {
    let sides = SharedSides::of(fx.tree, brace);
    if sides.before
        && let Some(edit) = line_break_before(fx, brace, level)
    {
        push_unique(edits, edit);
    }
    if sides.after
        && let Some(next) = brace.next_significant()
    {
        let indent = if brace.kind() == CsSyntaxKind::LBrace && next.kind() != CsSyntaxKind::RBrace {
            level + fx.settings.indentation_size
        } else {
            level
        };
        if let Some(edit) = line_break_before(fx, &next, indent) {
            push_unique(edits, edit);
        }
    }
}

/// Spread a single-line brace pair over several lines
pub(crate) fn expand_braces(
    fx: &FixContext<'_>,
    open: &CsSyntaxToken,
    close: &CsSyntaxToken,
) -> EditSet {
    let level = brace_level(fx, open);
    let mut edits = EditSet::new();
    place_brace(fx, &mut edits, open, level);
    place_brace(fx, &mut edits, close, level);
    edits
}

/// Fix for SA1500
pub fn fix_brace_placement(fx: &FixContext<'_>, diagnostic: &Diagnostic) -> Result<EditSet, FixError> {
    let brace = reported_token(fx, RuleId::SA1500, diagnostic)?;
    let (open, _) = brace
        .parent()
        .and_then(|owner| brace_pair(&owner))
        .ok_or_else(|| FixError::inapplicable(RuleId::SA1500, "brace pair is incomplete"))?;
    let level = brace_level(fx, &open);
    let mut edits = EditSet::new();
    place_brace(fx, &mut edits, &brace, level);
    Ok(edits)
}

/// Fix for SA1501 and SA1502
pub fn fix_single_line_body(fx: &FixContext<'_>, diagnostic: &Diagnostic) -> Result<EditSet, FixError> {
    let rule = diagnostic
        .rule_id
        .parse::<RuleId>()
        .unwrap_or(RuleId::SA1501);
    let open = reported_token(fx, rule, diagnostic)?;
    let (open, close) = open
        .parent()
        .and_then(|owner| brace_pair(&owner))
        .filter(|(o, _)| *o == open)
        .ok_or_else(|| FixError::inapplicable(rule, "brace pair is incomplete"))?;
    Ok(expand_braces(fx, &open, &close))
}
