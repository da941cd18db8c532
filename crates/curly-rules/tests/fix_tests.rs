//! Fixes settle, are idempotent and never change the token sequence

mod common;

use common::{fires, fix, lint, method, significant_kinds};
use curly_rules::{RuleId, all_rules};

fn fixable_cases() -> Vec<(RuleId, String)> {
    vec![
        (RuleId::SA1500, "class A {\n}\n".to_string()),
        (RuleId::SA1500, method("        Run(); }\n    void N()\n    {\n")),
        (RuleId::SA1501, method("        if (x) { return; }\n")),
        (RuleId::SA1502, "class A\n{\n    void M() { Run(); }\n}\n".to_string()),
        (
            RuleId::SA1504,
            "class A\n{\n    int P\n    {\n        get { return p; }\n\n        set\n        {\n            p = value;\n        }\n    }\n}\n".to_string(),
        ),
        (RuleId::SA1505, "class A\n{\n\n    int x;\n}\n".to_string()),
        (
            RuleId::SA1506,
            "class A\n{\n    /// <summary>x</summary>\n\n    int x;\n}\n".to_string(),
        ),
        (RuleId::SA1507, "class A\n{\n    int x;\n\n\n\n    int y;\n}\n".to_string()),
        (RuleId::SA1508, "class A\n{\n    int x;\n\n}\n".to_string()),
        (RuleId::SA1509, "class A\n\n{\n}\n".to_string()),
        (
            RuleId::SA1510,
            method("        try\n        {\n        }\n\n        catch\n        {\n        }\n"),
        ),
        (
            RuleId::SA1511,
            method("        do\n        {\n        }\n\n        while (x);\n"),
        ),
        (RuleId::SA1512, method("        // comment\n\n        Run();\n")),
        (
            RuleId::SA1513,
            method("        if (x)\n        {\n        }\n        Run();\n"),
        ),
        (
            RuleId::SA1514,
            "class A\n{\n    int x;\n\n    int y;\n    /// <summary>z</summary>\n    int z;\n}\n".to_string(),
        ),
        (RuleId::SA1515, method("        Run();\n        // next\n        Stop();\n")),
        (
            RuleId::SA1516,
            "class A\n{\n    void M()\n    {\n    }\n    void N()\n    {\n    }\n}\n".to_string(),
        ),
        (RuleId::SA1517, "\n\nclass A\n{\n}\n".to_string()),
        (RuleId::SA1518, "class A\n{\n}\n\n".to_string()),
    ]
}

#[test]
fn test_every_fixable_rule_has_a_case() {
    let cases = fixable_cases();
    for descriptor in all_rules().filter(|d| d.fixable) {
        assert!(
            cases.iter().any(|(rule, _)| *rule == descriptor.rule),
            "no fix case for {}",
            descriptor.id
        );
    }
}

#[test]
fn test_fix_removes_the_diagnostic() {
    for (rule, source) in fixable_cases() {
        assert!(fires(&lint(&source, &[rule]), rule), "{rule} should fire on {source:?}");
        let outcome = fix(&source, &[rule]);
        assert!(outcome.changed(), "{rule} fix changed nothing");
        assert!(
            !fires(&lint(&outcome.source, &[rule]), rule),
            "{rule} still fires after fixing:\n{}",
            outcome.source
        );
        assert!(outcome.remaining.is_empty());
    }
}

#[test]
fn test_fix_is_idempotent() {
    for (rule, source) in fixable_cases() {
        let once = fix(&source, &[rule]).source;
        let twice = fix(&once, &[rule]);
        assert!(!twice.changed(), "{rule} changed already fixed text");
        assert_eq!(twice.source, once);
    }
}

#[test]
fn test_fix_keeps_token_sequence() {
    for (rule, source) in fixable_cases() {
        let fixed = fix(&source, &[rule]).source;
        assert_eq!(significant_kinds(&source), significant_kinds(&fixed), "{rule}");
    }
}

#[test]
fn test_unfixable_rules_leave_text_alone() {
    let source = method(
        "        if (x)\n        {\n            Run();\n        }\n        else Stop();\n        while (y)\n            Step(\n                1);\n        for (;;) Step();\n",
    );
    let rules = [RuleId::SA1503, RuleId::SA1519, RuleId::SA1520];
    let outcome = fix(&source, &rules);
    assert!(!outcome.changed());
    assert_eq!(outcome.source, source);
    assert_eq!(outcome.remaining.len(), 3);
}

#[test]
fn test_all_rules_settle_on_messy_file() {
    let source = "class A {\n\n    int x;\n    void M() { Run(); }\n    void N()\n    {\n        if (x) { return; }\n        Run();\n\n\n    }\n}\n\n";
    let all: Vec<RuleId> = RuleId::ALL.to_vec();
    let first = fix(source, &all);
    assert!(first.changed());
    assert!(
        first.remaining.iter().all(|d| !d.fixable),
        "fixable diagnostics left: {:?}",
        first.remaining
    );
    assert_eq!(significant_kinds(source), significant_kinds(&first.source));

    let second = fix(&first.source, &all);
    assert_eq!(second.source, first.source);
}

#[test]
fn test_conflicting_fixes_retry_in_next_pass() {
    let source = "class A\n{\n    int x;\n\n\n}\n";
    let outcome = fix(source, &[RuleId::SA1507, RuleId::SA1508]);
    assert_eq!(outcome.source, "class A\n{\n    int x;\n}\n");
    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].rule_id, "SA1507");
    assert_eq!(outcome.conflicts[0].conflicts_with, "SA1508");
    assert!(outcome.remaining.is_empty());
}

#[test]
fn test_crlf_line_endings_are_kept() {
    let source = "class A\r\n{\r\n    void M() { Run(); }\r\n}\r\n";
    let fixed = fix(source, &[RuleId::SA1502]).source;
    assert_eq!(
        fixed,
        "class A\r\n{\r\n    void M()\r\n    {\r\n        Run();\r\n    }\r\n}\r\n"
    );
}

#[test]
fn test_nested_single_line_constructs_indent_by_depth() {
    let fixed = fix("class A { void M() { Run(); } }\n", &[RuleId::SA1502]);
    assert_eq!(
        fixed.source,
        "class A\n{\n    void M()\n    {\n        Run();\n    }\n}\n"
    );
    assert!(fixed.passes >= 2);
}

#[test]
fn test_nested_switch_on_one_line_indents_by_depth() {
    let source = "class A { void M() { switch (x) { case 1: { Run(); break; } default: break; } } }\n";
    let all: Vec<RuleId> = RuleId::ALL.to_vec();
    let fixed = fix(source, &all);
    assert!(
        fixed.remaining.iter().all(|d| !d.fixable),
        "fixable diagnostics left: {:?}",
        fixed.remaining
    );
    assert_eq!(significant_kinds(source), significant_kinds(&fixed.source));

    let indent_of = |needle: &str| {
        let line = fixed
            .source
            .lines()
            .find(|l| l.trim_start().starts_with(needle))
            .unwrap_or_else(|| panic!("no line starts with {needle:?} in:\n{}", fixed.source));
        line.len() - line.trim_start().len()
    };
    assert_eq!(indent_of("void M()"), 4);
    assert_eq!(indent_of("switch (x)"), 8);
    assert!(indent_of("case 1:") > indent_of("switch (x)"));
    assert!(indent_of("Run();") > indent_of("case 1:"));
    assert_eq!(indent_of("default:"), indent_of("case 1:"));

    assert_eq!(fix(&fixed.source, &all).source, fixed.source);
}
