//! Blank lines next to braces and chained clauses
//!
//! - SA1505: blank line after an opening brace
//! - SA1508: blank line before a closing brace
//! - SA1509: blank line before an opening brace
//! - SA1510: blank line before `else`, `catch` or `finally`
//! - SA1511: blank line before the `while` of a `do` statement
//!
//! Each diagnostic spans the offending blank lines, which the fix deletes.

use curly_core::{
    CsSyntaxKind, CsSyntaxNode, CsSyntaxToken, Diagnostic, EditSet, TriviaStream,
};

use super::{blank_run_after_first, blank_run_before_last, lines_range};
use crate::catalog::RuleId;
use crate::context::RuleContext;
use crate::fix::helpers::delete_reported_blank_lines;
use crate::fix::{FixContext, FixError};

fn blank_lines_before(ctx: &RuleContext<'_>, rule: RuleId, token: &CsSyntaxToken) -> Option<Diagnostic> {
    let gap = TriviaStream::before(token);
    if gap.at_file_start() {
        return None;
    }
    let lines = gap.lines();
    let run = blank_run_before_last(&lines)?;
    let args = match rule {
        RuleId::SA1510 => vec![token.text().to_string()],
        _ => Vec::new(),
    };
    Some(ctx.report_with_args(rule, lines_range(&lines, &run), args))
}

/// SA1505
pub fn check_blank_after_open_brace(ctx: &RuleContext<'_>, _root: &CsSyntaxNode) -> Vec<Diagnostic> {
    ctx.tokens_of_kind(CsSyntaxKind::LBrace)
        .filter_map(|brace| {
            let lines = TriviaStream::after(&brace)?.lines();
            let run = blank_run_after_first(&lines)?;
            Some(ctx.report(RuleId::SA1505, lines_range(&lines, &run)))
        })
        .collect()
}

/// SA1508
pub fn check_blank_before_close_brace(ctx: &RuleContext<'_>, _root: &CsSyntaxNode) -> Vec<Diagnostic> {
    ctx.tokens_of_kind(CsSyntaxKind::RBrace)
        .filter_map(|brace| blank_lines_before(ctx, RuleId::SA1508, &brace))
        .collect()
}

/// SA1509
pub fn check_blank_before_open_brace(ctx: &RuleContext<'_>, _root: &CsSyntaxNode) -> Vec<Diagnostic> {
    ctx.tokens_of_kind(CsSyntaxKind::LBrace)
        .filter_map(|brace| blank_lines_before(ctx, RuleId::SA1509, &brace))
        .collect()
}

/// SA1510
pub fn check_blank_before_chained_block(ctx: &RuleContext<'_>, _root: &CsSyntaxNode) -> Vec<Diagnostic> {
    ctx.significant_tokens()
        .filter(|t| {
            matches!(
                t.kind(),
                CsSyntaxKind::ElseKw | CsSyntaxKind::CatchKw | CsSyntaxKind::FinallyKw
            )
        })
        .filter_map(|keyword| blank_lines_before(ctx, RuleId::SA1510, &keyword))
        .collect()
}

/// SA1511
pub fn check_blank_before_do_while(ctx: &RuleContext<'_>, _root: &CsSyntaxNode) -> Vec<Diagnostic> {
    ctx.tokens_of_kind(CsSyntaxKind::WhileKw)
        .filter(|t| t.parent().is_some_and(|p| p.kind() == CsSyntaxKind::DoStmt))
        .filter_map(|keyword| blank_lines_before(ctx, RuleId::SA1511, &keyword))
        .collect()
}

/// Fix for SA1505, SA1508, SA1509, SA1510 and SA1511
pub fn fix_blank_run(fx: &FixContext<'_>, diagnostic: &Diagnostic) -> Result<EditSet, FixError> {
    let rule = diagnostic
        .rule_id
        .parse::<RuleId>()
        .map_err(|e| FixError::NoFixAvailable { rule_id: e.0 })?;
    delete_reported_blank_lines(fx, rule, diagnostic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fix, lint};

    #[test]
    fn test_blank_after_open_brace() {
        let source = "class A\n{\n\n    int x;\n}\n";
        let diagnostics = lint(source, &[RuleId::SA1505]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].location.line, 3);
        assert_eq!(diagnostics[0].message, "An opening brace should not be followed by a blank line");
        assert_eq!(fix(source, &[RuleId::SA1505]), "class A\n{\n    int x;\n}\n");
    }

    #[test]
    fn test_blank_after_brace_with_trailing_comment() {
        let source = "class A\n{ // c\n\n    int x;\n}\n";
        assert_eq!(lint(source, &[RuleId::SA1505]).len(), 1);
    }

    #[test]
    fn test_blank_before_close_brace() {
        let source = "class A\n{\n    int x;\n\n\n}\n";
        let diagnostics = lint(source, &[RuleId::SA1508]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].span(), 21..23);
        assert_eq!(fix(source, &[RuleId::SA1508]), "class A\n{\n    int x;\n}\n");
    }

    #[test]
    fn test_comment_between_blank_and_brace() {
        let source = "class A\n{\n    int x;\n\n    // done\n}\n";
        assert!(lint(source, &[RuleId::SA1508]).is_empty());
    }

    #[test]
    fn test_blank_before_open_brace() {
        let source = "class A\n\n{\n}\n";
        assert_eq!(fix(source, &[RuleId::SA1509]), "class A\n{\n}\n");
    }

    #[test]
    fn test_blank_before_chained_clauses() {
        let source = "class A\n{\n    void M()\n    {\n        try\n        {\n        }\n\n        catch\n        {\n        }\n\n        finally\n        {\n        }\n    }\n}\n";
        let diagnostics = lint(source, &[RuleId::SA1510]);
        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "'catch' statement should not be preceded by a blank line",
                "'finally' statement should not be preceded by a blank line",
            ]
        );
    }

    #[test]
    fn test_blank_before_do_while() {
        let source = "class A\n{\n    void M()\n    {\n        do\n        {\n        }\n\n        while (x);\n\n        while (y)\n        {\n        }\n    }\n}\n";
        let diagnostics = lint(source, &[RuleId::SA1511]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].location.line, 8);
    }
}
