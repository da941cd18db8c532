//! Shared helpers for the curly-rules integration tests

#![allow(dead_code)]

use std::path::Path;

use curly_core::{CsSyntaxKind, Diagnostic, LayoutSettings, SyntaxTree};
use curly_rules::{CancellationToken, FixOutcome, LintEngine, RuleId, RuleSet};

pub fn engine(rules: &[RuleId]) -> LintEngine {
    LintEngine::default().with_rules(RuleSet::only(rules))
}

pub fn lint(source: &str, rules: &[RuleId]) -> Vec<Diagnostic> {
    engine(rules)
        .lint_source(source, Path::new("Test.cs"), &CancellationToken::new())
        .unwrap()
}

pub fn lint_all(source: &str) -> Vec<Diagnostic> {
    LintEngine::default()
        .lint_source(source, Path::new("Test.cs"), &CancellationToken::new())
        .unwrap()
}

pub fn fix(source: &str, rules: &[RuleId]) -> FixOutcome {
    engine(rules)
        .fix_source(source, Path::new("Test.cs"), &CancellationToken::new())
        .unwrap()
}

pub fn fix_with_settings(source: &str, rules: &[RuleId], settings: LayoutSettings) -> FixOutcome {
    engine(rules)
        .with_settings(settings)
        .fix_source(source, Path::new("Test.cs"), &CancellationToken::new())
        .unwrap()
}

pub fn rule_ids(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.rule_id.as_str()).collect()
}

pub fn fires(diagnostics: &[Diagnostic], rule: RuleId) -> bool {
    diagnostics.iter().any(|d| d.rule_id == rule.as_str())
}

/// Wrap statements in a method of a class
pub fn method(body: &str) -> String {
    format!("class A\n{{\n    void M()\n    {{\n{body}    }}\n}}\n")
}

pub fn significant_kinds(source: &str) -> Vec<CsSyntaxKind> {
    SyntaxTree::parse(source)
        .root()
        .descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .map(|t| t.kind())
        .filter(|k| !k.is_trivia())
        .collect()
}
