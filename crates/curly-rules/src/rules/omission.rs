//! Brace omission rules
//!
//! - SA1503: the child statement of an omittable-brace construct is not
//!   braced.
//! - SA1519: an unbraced child statement spans several lines.
//! - SA1520: an `if` chain mixes braced and unbraced clauses.
//!
//! None of these can be fixed with trivia edits: the repair inserts braces.

use curly_core::{CsSyntaxKind, CsSyntaxNode, Diagnostic};

use crate::catalog::RuleId;
use crate::context::RuleContext;
use crate::deference::Situation;
use crate::locator::{IfChain, embedded_statement, is_braced};

/// Child statements of a construct, with whether they come from an `if`
/// chain that has some braced clause
fn child_statements(ctx: &RuleContext<'_>, node: &CsSyntaxNode) -> Vec<(CsSyntaxNode, bool)> {
    if node.kind() == CsSyntaxKind::IfStmt {
        return IfChain::of(node)
            .map(|chain| {
                let any_braced = chain.any_braced;
                chain
                    .clauses
                    .into_iter()
                    .map(|clause| (clause, any_braced))
                    .collect()
            })
            .unwrap_or_default();
    }
    let Some(child) = embedded_statement(node) else {
        return Vec::new();
    };
    if is_consecutive_using(ctx, node, &child) {
        return Vec::new();
    }
    vec![(child, false)]
}

/// `using (a) using (b) ...` reads as one statement when configured
fn is_consecutive_using(ctx: &RuleContext<'_>, node: &CsSyntaxNode, child: &CsSyntaxNode) -> bool {
    ctx.settings.allow_consecutive_usings
        && node.kind() == CsSyntaxKind::UsingStmt
        && child.kind() == CsSyntaxKind::UsingStmt
}

/// SA1503
pub fn check_omitted_braces(ctx: &RuleContext<'_>, node: &CsSyntaxNode) -> Vec<Diagnostic> {
    child_statements(ctx, node)
        .into_iter()
        .filter(|(child, _)| !is_braced(child))
        .filter(|(child, in_braced_chain)| {
            if *in_braced_chain && ctx.defers(RuleId::SA1503, Situation::ChainWithBracedClause) {
                return false;
            }
            !(ctx.tree.is_multi_line(child)
                && ctx.defers(RuleId::SA1503, Situation::MultiLineChildStatement))
        })
        .map(|(child, _)| ctx.report(RuleId::SA1503, child.text_range()))
        .collect()
}

/// SA1519
pub fn check_multi_line_child(ctx: &RuleContext<'_>, node: &CsSyntaxNode) -> Vec<Diagnostic> {
    child_statements(ctx, node)
        .into_iter()
        .filter(|(child, _)| !is_braced(child) && ctx.tree.is_multi_line(child))
        .map(|(child, _)| ctx.report(RuleId::SA1519, child.text_range()))
        .collect()
}

/// SA1520
pub fn check_consistent_braces(ctx: &RuleContext<'_>, node: &CsSyntaxNode) -> Vec<Diagnostic> {
    let Some(chain) = IfChain::of(node) else {
        return Vec::new();
    };
    if !chain.is_inconsistent() {
        return Vec::new();
    }
    chain
        .clauses
        .iter()
        .filter(|clause| !is_braced(clause))
        .filter(|clause| {
            !(ctx.tree.is_multi_line(clause)
                && ctx.defers(RuleId::SA1520, Situation::MultiLineChildStatement))
        })
        .map(|clause| ctx.report(RuleId::SA1520, clause.text_range()))
        .collect()
}
