use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A finding reported by a layout rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Rule identifier, e.g. `SA1500`
    pub rule_id: String,
    pub severity: Severity,
    /// Message with positional arguments already substituted
    pub message: String,
    /// Arguments substituted into the rule's message format
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub message_args: Vec<String>,
    pub location: Location,
    /// Whether the rule offers a trivia fix for this finding
    #[serde(default)]
    pub fixable: bool,
}

/// Severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Hint,
    Warning,
    Error,
}

/// Location information for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub file: PathBuf,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters)
    pub column: usize,
    pub end_line: Option<usize>,
    pub end_column: Option<usize>,
    /// Byte offset in the file
    pub offset: usize,
    /// Length of the span in bytes
    pub length: usize,
}

impl Diagnostic {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            message_args: Vec::new(),
            location,
            fixable: false,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.message_args = args;
        self
    }

    pub fn with_fixable(mut self, fixable: bool) -> Self {
        self.fixable = fixable;
        self
    }

    /// Byte range covered by this diagnostic
    pub fn span(&self) -> std::ops::Range<usize> {
        self.location.offset..self.location.offset + self.location.length
    }
}

impl Default for Location {
    fn default() -> Self {
        Self {
            file: PathBuf::new(),
            line: 0,
            column: 0,
            end_line: None,
            end_column: None,
            offset: 0,
            length: 0,
        }
    }
}

impl Location {
    pub fn new(file: PathBuf, line: usize, column: usize, offset: usize, length: usize) -> Self {
        Self {
            file,
            line,
            column,
            end_line: None,
            end_column: None,
            offset,
            length,
        }
    }

    /// Create a location with end position
    pub fn with_end(mut self, end_line: usize, end_column: usize) -> Self {
        self.end_line = Some(end_line);
        self.end_column = Some(end_column);
        self
    }
}

/// Sort by file, then position, then rule id
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| {
        a.location
            .file
            .cmp(&b.location.file)
            .then_with(|| a.location.offset.cmp(&b.location.offset))
            .then_with(|| a.rule_id.cmp(&b.rule_id))
    });
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering_and_display() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert_eq!(Severity::Warning.to_string(), "warning");
    }

    #[test]
    fn test_sort_diagnostics() {
        let at = |file: &str, offset| Location::new(PathBuf::from(file), 1, 1, offset, 0);
        let mut diagnostics = vec![
            Diagnostic::new("SA1513", Severity::Warning, "m", at("b.cs", 0)),
            Diagnostic::new("SA1508", Severity::Warning, "m", at("a.cs", 9)),
            Diagnostic::new("SA1500", Severity::Warning, "m", at("a.cs", 9)),
        ];
        sort_diagnostics(&mut diagnostics);
        let ids: Vec<_> = diagnostics.iter().map(|d| d.rule_id.as_str()).collect();
        assert_eq!(ids, ["SA1500", "SA1508", "SA1513"]);
    }

    #[test]
    fn test_json_shape() {
        let diagnostic = Diagnostic::new(
            "SA1507",
            Severity::Warning,
            "Code should not contain multiple blank lines in a row",
            Location::new(PathBuf::from("a.cs"), 3, 1, 10, 2),
        )
        .with_fixable(true);
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["ruleId"], "SA1507");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["location"]["line"], 3);
        assert_eq!(json["fixable"], true);
        assert!(json.get("messageArgs").is_none());
    }
}
