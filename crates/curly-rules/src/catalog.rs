//! Rule catalog
//!
//! The stable table of layout rules. Identifiers never change; titles and
//! message formats are what users see in reports. Message formats use
//! positional placeholders (`{0}`, `{1}`, ...).

use std::fmt;
use std::str::FromStr;

use curly_core::Severity;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Identifier of a layout rule
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleId {
    SA1500,
    SA1501,
    SA1502,
    SA1503,
    SA1504,
    SA1505,
    SA1506,
    SA1507,
    SA1508,
    SA1509,
    SA1510,
    SA1511,
    SA1512,
    SA1513,
    SA1514,
    SA1515,
    SA1516,
    SA1517,
    SA1518,
    SA1519,
    SA1520,
}

impl RuleId {
    pub const ALL: [RuleId; 21] = [
        RuleId::SA1500,
        RuleId::SA1501,
        RuleId::SA1502,
        RuleId::SA1503,
        RuleId::SA1504,
        RuleId::SA1505,
        RuleId::SA1506,
        RuleId::SA1507,
        RuleId::SA1508,
        RuleId::SA1509,
        RuleId::SA1510,
        RuleId::SA1511,
        RuleId::SA1512,
        RuleId::SA1513,
        RuleId::SA1514,
        RuleId::SA1515,
        RuleId::SA1516,
        RuleId::SA1517,
        RuleId::SA1518,
        RuleId::SA1519,
        RuleId::SA1520,
    ];

    pub fn as_str(self) -> &'static str {
        self.descriptor().id
    }

    pub fn descriptor(self) -> &'static RuleDescriptor {
        &DESCRIPTORS[self as usize]
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an identifier that is not in the catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown rule '{0}'")]
pub struct UnknownRule(pub String);

impl FromStr for RuleId {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(s)
            .map(|d| d.rule)
            .ok_or_else(|| UnknownRule(s.to_string()))
    }
}

/// Static metadata of one rule
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDescriptor {
    #[serde(skip)]
    pub rule: RuleId,
    pub id: &'static str,
    pub title: &'static str,
    pub message_format: &'static str,
    pub description: &'static str,
    pub default_severity: Severity,
    pub enabled_by_default: bool,
    pub fixable: bool,
    /// Path of the rule's page under the documentation root
    pub help_path: &'static str,
}

impl RuleDescriptor {
    /// Substitute positional arguments into the message format
    pub fn format_message(&self, args: &[String]) -> String {
        format_message(self.message_format, args)
    }
}

/// Replace `{0}`, `{1}`, ... with the matching argument
pub fn format_message(format: &str, args: &[String]) -> String {
    let mut message = format.to_string();
    for (i, arg) in args.iter().enumerate() {
        message = message.replace(&format!("{{{i}}}"), arg);
    }
    message
}

macro_rules! rule {
    ($rule:ident, $title:expr, $message:expr, $fixable:expr, $description:expr) => {
        RuleDescriptor {
            rule: RuleId::$rule,
            id: stringify!($rule),
            title: $title,
            message_format: $message,
            description: $description,
            default_severity: Severity::Warning,
            enabled_by_default: true,
            fixable: $fixable,
            help_path: concat!("rules/", stringify!($rule), ".md"),
        }
    };
}

/// Descriptors in [`RuleId`] order
static DESCRIPTORS: [RuleDescriptor; 21] = [
    rule!(
        SA1500,
        "Braces for multi-line statements should not share line",
        "Braces for multi-line statements should not share line",
        true,
        "An opening or closing brace shares its line with other code. Each brace of a multi-line \
         construct belongs on its own line."
    ),
    rule!(
        SA1501,
        "Statement should not be on a single line",
        "Statement should not be on a single line",
        true,
        "A statement block is written on a single line. Blocks outside lambda and anonymous \
         method bodies span several lines."
    ),
    rule!(
        SA1502,
        "Element should not be on a single line",
        "Element should not be on a single line",
        true,
        "The body of a namespace, type, method, local function or property with accessor \
         bodies is written on a single line."
    ),
    rule!(
        SA1503,
        "Braces should not be omitted",
        "Braces should not be omitted",
        false,
        "The child statement of an if, else, while, do, for, foreach, lock, fixed or using \
         statement is not wrapped in braces."
    ),
    rule!(
        SA1504,
        "All accessors should be single-line or multi-line",
        "All accessors should be single-line or multi-line",
        true,
        "Within one property, indexer or event, some accessor bodies are written on a single \
         line and others span several lines."
    ),
    rule!(
        SA1505,
        "Opening braces should not be followed by blank line",
        "An opening brace should not be followed by a blank line",
        true,
        "The line directly after an opening brace is blank."
    ),
    rule!(
        SA1506,
        "Element documentation headers should not be followed by blank line",
        "Element documentation headers should not be followed by blank line",
        true,
        "A blank line separates a documentation header from the element it documents."
    ),
    rule!(
        SA1507,
        "Code should not contain multiple blank lines in a row",
        "Code should not contain multiple blank lines in a row",
        true,
        "Two or more consecutive blank lines. A single blank line is enough to separate code."
    ),
    rule!(
        SA1508,
        "Closing braces should not be preceded by blank line",
        "A closing brace should not be preceded by a blank line",
        true,
        "The line directly before a closing brace is blank."
    ),
    rule!(
        SA1509,
        "Opening braces should not be preceded by blank line",
        "Opening braces should not be preceded by blank line",
        true,
        "The line directly before an opening brace is blank."
    ),
    rule!(
        SA1510,
        "Chained statement blocks should not be preceded by blank line",
        "'{0}' statement should not be preceded by a blank line",
        true,
        "An else, catch or finally clause is separated from the preceding block by a blank line."
    ),
    rule!(
        SA1511,
        "While-do footer should not be preceded by blank line",
        "While-do footer should not be preceded by blank line",
        true,
        "The while footer of a do statement is separated from the loop body by a blank line."
    ),
    rule!(
        SA1512,
        "Single-line comments should not be followed by blank line",
        "Single-line comments should not be followed by blank line",
        true,
        "A single-line comment on its own line is followed by a blank line. Comments describe \
         the code below them; commented-out code (////) and file headers are exempt."
    ),
    rule!(
        SA1513,
        "Closing brace should be followed by blank line",
        "Closing brace should be followed by blank line",
        true,
        "A closing brace is directly followed by more code on the next line. Continuations \
         such as else, catch, finally, a closing parenthesis or a semicolon are exempt."
    ),
    rule!(
        SA1514,
        "Element documentation header should be preceded by blank line",
        "Element documentation header should be preceded by blank line",
        true,
        "A documentation header directly follows other code. Headers of elements that are \
         first in their scope are exempt."
    ),
    rule!(
        SA1515,
        "Single-line comment should be preceded by blank line",
        "Single-line comment should be preceded by blank line",
        true,
        "A single-line comment on its own line directly follows code. Comments that are first \
         in their scope or follow another comment are exempt."
    ),
    rule!(
        SA1516,
        "Elements should be separated by blank line",
        "Elements should be separated by blank line",
        true,
        "Adjacent elements are not separated by a blank line. Consecutive using directives, \
         extern aliases, single-line fields and single-line accessors are exempt."
    ),
    rule!(
        SA1517,
        "Code should not contain blank lines at start of file",
        "Code should not contain blank lines at start of file",
        true,
        "The file starts with one or more blank lines."
    ),
    rule!(
        SA1518,
        "Use line endings correctly at end of file",
        "{0}",
        true,
        "The end of the file does not follow the configured newlineAtEndOfFile policy."
    ),
    rule!(
        SA1519,
        "Braces should not be omitted from multi-line child statement",
        "Braces should not be omitted from multi-line child statement",
        false,
        "A child statement that spans several lines is not wrapped in braces."
    ),
    rule!(
        SA1520,
        "Use braces consistently",
        "Use braces consistently",
        false,
        "Some clauses of an if / else if / else chain are wrapped in braces and others are not."
    ),
];

static INDEX: Lazy<IndexMap<&'static str, &'static RuleDescriptor>> =
    Lazy::new(|| DESCRIPTORS.iter().map(|d| (d.id, d)).collect());

/// Descriptor for a rule id string, case-insensitive
pub fn lookup(id: &str) -> Option<&'static RuleDescriptor> {
    INDEX
        .get(id)
        .or_else(|| INDEX.get(id.to_ascii_uppercase().as_str()))
        .copied()
}

/// Every descriptor in id order
pub fn all_rules() -> impl Iterator<Item = &'static RuleDescriptor> {
    INDEX.values().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptors_follow_id_order() {
        for (i, rule) in RuleId::ALL.iter().enumerate() {
            assert_eq!(DESCRIPTORS[i].rule, *rule);
            assert_eq!(rule.as_str(), format!("SA{}", 1500 + i));
        }
        assert_eq!(all_rules().count(), 21);
    }

    #[test]
    fn test_lookup_and_parse() {
        assert_eq!("SA1513".parse::<RuleId>(), Ok(RuleId::SA1513));
        assert_eq!("sa1507".parse::<RuleId>(), Ok(RuleId::SA1507));
        assert!("SA1600".parse::<RuleId>().is_err());
        assert_eq!(lookup("SA1518").unwrap().help_path, "rules/SA1518.md");
    }

    #[test]
    fn test_brace_insertion_rules_are_not_fixable() {
        let unfixable: Vec<_> = all_rules().filter(|d| !d.fixable).map(|d| d.id).collect();
        assert_eq!(unfixable, ["SA1503", "SA1519", "SA1520"]);
    }

    #[test]
    fn test_format_message() {
        let rule = RuleId::SA1510.descriptor();
        assert_eq!(
            rule.format_message(&["else".to_string()]),
            "'else' statement should not be preceded by a blank line"
        );
        assert_eq!(format_message("{0} and {1}", &["a".into(), "b".into()]), "a and b");
    }

    #[test]
    fn test_defaults() {
        for rule in all_rules() {
            assert_eq!(rule.default_severity, Severity::Warning);
            assert!(rule.enabled_by_default);
        }
    }
}
