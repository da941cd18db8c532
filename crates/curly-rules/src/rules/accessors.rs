//! SA1504: accessor bodies of one property, indexer or event are either all
//! single-line or all multi-line.

use curly_core::{CsSyntaxKind, CsSyntaxNode, Diagnostic, EditSet};

use super::braces::expand_braces;
use crate::catalog::RuleId;
use crate::context::RuleContext;
use crate::fix::helpers::reported_token;
use crate::fix::{FixContext, FixError};
use crate::locator::{accessor_keyword, accessors, brace_pair, child_node};

pub fn check_accessor_consistency(ctx: &RuleContext<'_>, node: &CsSyntaxNode) -> Vec<Diagnostic> {
    let bodies: Vec<_> = accessors(node)
        .filter_map(|accessor| {
            let (open, close) = brace_pair(&child_node(&accessor, CsSyntaxKind::Block)?)?;
            Some((accessor, ctx.tree.same_line(&open, &close)))
        })
        .collect();
    if bodies.len() < 2 {
        return Vec::new();
    }
    let single = bodies.iter().filter(|(_, single)| *single).count();
    if single == 0 || single == bodies.len() {
        return Vec::new();
    }

    bodies
        .iter()
        .filter(|(_, single)| *single)
        .filter_map(|(accessor, _)| accessor_keyword(accessor))
        .map(|keyword| ctx.report(RuleId::SA1504, keyword.text_range()))
        .collect()
}

/// Expand the reported single-line accessor
pub fn fix_accessor_consistency(
    fx: &FixContext<'_>,
    diagnostic: &Diagnostic,
) -> Result<EditSet, FixError> {
    let keyword = reported_token(fx, RuleId::SA1504, diagnostic)?;
    let (open, close) = keyword
        .parent()
        .and_then(|accessor| child_node(&accessor, CsSyntaxKind::Block))
        .and_then(|block| brace_pair(&block))
        .ok_or_else(|| FixError::inapplicable(RuleId::SA1504, "accessor has no body"))?;
    Ok(expand_braces(fx, &open, &close))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fix, lint};

    const MIXED: &str = "class A\n{\n    int P\n    {\n        get { return p; }\n\n        set\n        {\n            p = value;\n        }\n    }\n}\n";

    #[test]
    fn test_mixed_accessors() {
        let diagnostics = lint(MIXED, &[RuleId::SA1504]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!((diagnostics[0].location.line, diagnostics[0].location.column), (5, 9));
    }

    #[test]
    fn test_consistent_accessors() {
        let single = "class A\n{\n    int P\n    {\n        get { return p; }\n        set { p = value; }\n    }\n}\n";
        assert!(lint(single, &[RuleId::SA1504]).is_empty());

        let auto = "class A\n{\n    int P { get; set; }\n}\n";
        assert!(lint(auto, &[RuleId::SA1504]).is_empty());
    }

    #[test]
    fn test_fix_expands_single_line_accessor() {
        assert_eq!(
            fix(MIXED, &[RuleId::SA1504]),
            "class A\n{\n    int P\n    {\n        get\n        {\n            return p;\n        }\n\n        set\n        {\n            p = value;\n        }\n    }\n}\n"
        );
    }
}
