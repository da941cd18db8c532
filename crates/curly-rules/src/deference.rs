//! Deference between overlapping rules
//!
//! Several rules can describe the same layout problem. Each entry says that a
//! rule stays silent in a given situation when another, more specific rule is
//! enabled and reports it instead. When the more specific rule is disabled
//! the deferring rule fires as usual.

use serde::Serialize;

use crate::catalog::RuleId;
use crate::registry::RuleSet;

/// A construct that more than one rule could report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Situation {
    SingleLineStatementBlock,
    SingleLineElementBody,
    SingleLineAccessorBody,
    ChainWithBracedClause,
    MultiLineChildStatement,
    BlankRunAtFileStart,
    BlankRunAtFileEnd,
    TokenFollowsCloseBraceOnLine,
    ElementMustBeSeparated,
    CommentLeadsSeparatedElement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deference {
    pub rule: RuleId,
    pub situation: Situation,
    pub defers_to: RuleId,
}

const fn entry(rule: RuleId, situation: Situation, defers_to: RuleId) -> Deference {
    Deference {
        rule,
        situation,
        defers_to,
    }
}

pub static DEFERENCES: [Deference; 11] = [
    entry(RuleId::SA1500, Situation::SingleLineStatementBlock, RuleId::SA1501),
    entry(RuleId::SA1500, Situation::SingleLineElementBody, RuleId::SA1502),
    entry(RuleId::SA1500, Situation::SingleLineAccessorBody, RuleId::SA1504),
    entry(RuleId::SA1503, Situation::ChainWithBracedClause, RuleId::SA1520),
    entry(RuleId::SA1503, Situation::MultiLineChildStatement, RuleId::SA1519),
    entry(RuleId::SA1520, Situation::MultiLineChildStatement, RuleId::SA1519),
    entry(RuleId::SA1507, Situation::BlankRunAtFileStart, RuleId::SA1517),
    entry(RuleId::SA1507, Situation::BlankRunAtFileEnd, RuleId::SA1518),
    entry(RuleId::SA1513, Situation::TokenFollowsCloseBraceOnLine, RuleId::SA1500),
    entry(RuleId::SA1514, Situation::ElementMustBeSeparated, RuleId::SA1516),
    entry(RuleId::SA1515, Situation::CommentLeadsSeparatedElement, RuleId::SA1516),
];

/// Rule that `rule` defers to in `situation`, if any
pub fn defers_to(rule: RuleId, situation: Situation) -> Option<RuleId> {
    DEFERENCES
        .iter()
        .find(|d| d.rule == rule && d.situation == situation)
        .map(|d| d.defers_to)
}

/// `rule` stays silent because the rule it defers to is enabled
pub fn should_defer(rule: RuleId, situation: Situation, enabled: &RuleSet) -> bool {
    defers_to(rule, situation).is_some_and(|target| enabled.is_enabled(target))
}

/// Deference entries of one rule
pub fn deferences_of(rule: RuleId) -> impl Iterator<Item = &'static Deference> {
    DEFERENCES.iter().filter(move |d| d.rule == rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_unique_per_rule_and_situation() {
        for (i, a) in DEFERENCES.iter().enumerate() {
            for b in &DEFERENCES[i + 1..] {
                assert!(
                    !(a.rule == b.rule && a.situation == b.situation),
                    "Duplicate entry for {} {:?}",
                    a.rule,
                    a.situation
                );
            }
            assert_ne!(a.rule, a.defers_to, "A rule should not defer to itself");
        }
    }

    #[test]
    fn test_deference_follows_enablement() {
        let all = RuleSet::all();
        assert!(should_defer(RuleId::SA1503, Situation::ChainWithBracedClause, &all));

        let without_target = RuleSet::all().without(RuleId::SA1520);
        assert!(!should_defer(
            RuleId::SA1503,
            Situation::ChainWithBracedClause,
            &without_target
        ));
    }

    #[test]
    fn test_unknown_situation_never_defers() {
        let all = RuleSet::all();
        assert_eq!(defers_to(RuleId::SA1516, Situation::ElementMustBeSeparated), None);
        assert!(!should_defer(RuleId::SA1505, Situation::BlankRunAtFileStart, &all));
        assert_eq!(deferences_of(RuleId::SA1500).count(), 3);
    }

    #[test]
    fn test_table_listing() {
        let listing: Vec<String> = DEFERENCES
            .iter()
            .map(|d| format!("{} -> {} {:?}", d.rule, d.defers_to, d.situation))
            .collect();
        insta::assert_snapshot!(listing.join("\n"), @r"
        SA1500 -> SA1501 SingleLineStatementBlock
        SA1500 -> SA1502 SingleLineElementBody
        SA1500 -> SA1504 SingleLineAccessorBody
        SA1503 -> SA1520 ChainWithBracedClause
        SA1503 -> SA1519 MultiLineChildStatement
        SA1520 -> SA1519 MultiLineChildStatement
        SA1507 -> SA1517 BlankRunAtFileStart
        SA1507 -> SA1518 BlankRunAtFileEnd
        SA1513 -> SA1500 TokenFollowsCloseBraceOnLine
        SA1514 -> SA1516 ElementMustBeSeparated
        SA1515 -> SA1516 CommentLeadsSeparatedElement
        ");
    }
}
