//! Fix computation
//!
//! A fix is computed from one diagnostic and the tree it was reported
//! against. Fixes only produce trivia edits; rules that would need new tokens
//! (inserting braces) have no fix function and answer
//! [`FixError::NoFixAvailable`].

mod batch;
pub mod helpers;

pub use batch::{BatchOutcome, FixConflict, merge_fixes};

use curly_core::{Diagnostic, EditSet, LayoutSettings, Location, SyntaxTree};
use serde::Serialize;
use thiserror::Error;

use crate::catalog::{RuleId, lookup};
use crate::registry::RuleRegistry;

/// What a fix function may read
pub struct FixContext<'a> {
    pub tree: &'a SyntaxTree,
    pub settings: &'a LayoutSettings,
}

impl<'a> FixContext<'a> {
    pub fn new(tree: &'a SyntaxTree, settings: &'a LayoutSettings) -> Self {
        Self { tree, settings }
    }
}

/// Why no fix could be produced for a diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixError {
    #[error("No fix available for {rule_id}")]
    NoFixAvailable { rule_id: String },

    #[error("Fix for {rule_id} is not applicable: {reason}")]
    Inapplicable { rule_id: String, reason: String },
}

impl FixError {
    pub fn inapplicable(rule: RuleId, reason: impl Into<String>) -> Self {
        Self::Inapplicable {
            rule_id: rule.to_string(),
            reason: reason.into(),
        }
    }
}

/// Trivia edits repairing one diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fix {
    pub rule_id: String,
    pub description: String,
    pub location: Location,
    #[serde(skip)]
    pub edits: EditSet,
}

/// Compute the fix for `diagnostic` against the tree it was reported on
pub fn compute_fix(fx: &FixContext<'_>, diagnostic: &Diagnostic) -> Result<Fix, FixError> {
    let no_fix = || FixError::NoFixAvailable {
        rule_id: diagnostic.rule_id.clone(),
    };
    let descriptor = lookup(&diagnostic.rule_id).ok_or_else(no_fix)?;
    let registration = RuleRegistry::builtin()
        .get(descriptor.rule)
        .ok_or_else(no_fix)?;
    let fix_fn = registration.fix.ok_or_else(no_fix)?;

    let edits = fix_fn(fx, diagnostic)?;
    if edits.is_empty() {
        return Err(FixError::inapplicable(
            descriptor.rule,
            "the layout is already correct",
        ));
    }
    Ok(Fix {
        rule_id: diagnostic.rule_id.clone(),
        description: format!("Fix {}: {}", descriptor.id, descriptor.title),
        location: diagnostic.location.clone(),
        edits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::lint;
    use curly_core::apply_edits;

    #[test]
    fn test_unfixable_rule_reports_no_fix() {
        let source = "class A\n{\n    void M()\n    {\n        if (x) Run();\n    }\n}\n";
        let diagnostics = lint(source, &[RuleId::SA1503]);
        assert_eq!(diagnostics.len(), 1);

        let tree = SyntaxTree::parse(source);
        let settings = LayoutSettings::default();
        let fx = FixContext::new(&tree, &settings);
        assert_eq!(
            compute_fix(&fx, &diagnostics[0]),
            Err(FixError::NoFixAvailable {
                rule_id: "SA1503".to_string()
            })
        );
    }

    #[test]
    fn test_fix_edits_apply_to_tree() {
        let source = "class A\n{\n\n    int x;\n}\n";
        let diagnostics = lint(source, &[RuleId::SA1505]);
        assert_eq!(diagnostics.len(), 1);

        let tree = SyntaxTree::parse(source);
        let settings = LayoutSettings::default();
        let fx = FixContext::new(&tree, &settings);
        let fix = compute_fix(&fx, &diagnostics[0]).unwrap();
        assert_eq!(fix.rule_id, "SA1505");

        let fixed = apply_edits(&tree, &fix.edits).unwrap();
        assert_eq!(fixed.text(), "class A\n{\n    int x;\n}\n");
    }
}
