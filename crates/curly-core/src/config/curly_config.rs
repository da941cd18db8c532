//! Configuration file structure
//!
//! ```jsonc
//! {
//!   "$schema": "./curly.schema.json",
//!   "linter": {
//!     "enabled": true,
//!     "rules": { "SA1513": "off", "SA1500": "error" }
//!   },
//!   "layout": {
//!     "newlineAtEndOfFile": "require",
//!     "allowConsecutiveUsings": true
//!   },
//!   "indentation": { "indentationSize": 4, "tabSize": 4, "useTabs": false },
//!   "preprocessor": { "symbols": ["DEBUG"] },
//!   "files": { "include": ["**/*.cs"], "exclude": ["**/obj/**"] }
//! }
//! ```

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::diagnostics::Severity;
use crate::error::CurlyError;
use crate::result::Result;

/// Root of a configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurlyConfiguration {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    #[schemars(description = "JSON schema reference for editor support")]
    pub schema: Option<String>,

    /// Stop configuration discovery at this file
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Mark this file as the root configuration")]
    pub root: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub linter: Option<LinterConfiguration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutConfiguration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub indentation: Option<IndentationConfiguration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocessor: Option<PreprocessorConfiguration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<FilesConfiguration>,
}

/// Linter configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinterConfiguration {
    #[schemars(description = "Enable or disable the linter")]
    pub enabled: Option<bool>,

    /// Per-rule severity keyed by rule id
    #[schemars(description = "Rule severity overrides keyed by rule id, e.g. \"SA1500\": \"error\"")]
    pub rules: Option<IndexMap<String, RuleSeverity>>,
}

/// Rule severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    /// Disable the rule
    Off,
    Info,
    Warn,
    Error,
}

impl RuleSeverity {
    /// Diagnostic severity, `None` when the rule is off
    pub fn to_severity(self) -> Option<Severity> {
        match self {
            RuleSeverity::Off => None,
            RuleSeverity::Info => Some(Severity::Info),
            RuleSeverity::Warn => Some(Severity::Warning),
            RuleSeverity::Error => Some(Severity::Error),
        }
    }
}

/// End-of-file line ending policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NewlineAtEndOfFile {
    /// A single trailing newline is optional, trailing blank lines are not
    #[default]
    Allow,
    /// Exactly one trailing newline
    Require,
    /// No trailing newline
    Omit,
}

/// Layout rule options
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfiguration {
    #[schemars(description = "End-of-file policy: 'allow', 'require' or 'omit'")]
    pub newline_at_end_of_file: Option<NewlineAtEndOfFile>,

    #[schemars(description = "Allow a using statement as the unbraced child of another using")]
    pub allow_consecutive_usings: Option<bool>,
}

/// Indentation used when fixes break lines
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndentationConfiguration {
    #[schemars(description = "Columns per indentation level")]
    pub indentation_size: Option<usize>,

    #[schemars(description = "Columns a tab advances to")]
    pub tab_size: Option<usize>,

    #[schemars(description = "Indent with tabs instead of spaces")]
    pub use_tabs: Option<bool>,
}

/// Preprocessor settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreprocessorConfiguration {
    #[schemars(description = "Symbols treated as defined when evaluating #if")]
    pub symbols: Option<Vec<String>>,
}

/// Files configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilesConfiguration {
    #[schemars(description = "Glob patterns for files to include")]
    pub include: Option<Vec<String>>,

    #[schemars(description = "Glob patterns for files to exclude")]
    pub exclude: Option<Vec<String>>,
}

impl CurlyConfiguration {
    /// Load configuration from a file
    ///
    /// `.json` and `.jsonc` files are read as JSON with comments and trailing
    /// commas, `.toml` files as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| CurlyError::io_error(path, e))?;
        let ext = path.extension().and_then(|e| e.to_str());
        let parsed = match ext {
            Some("json") | Some("jsonc") => Self::from_jsonc(&content),
            Some("toml") => Self::from_toml(&content),
            _ => Err(CurlyError::config_error(
                "Unsupported file extension (expected .json, .jsonc or .toml)",
            )),
        };
        parsed.map_err(|e| {
            CurlyError::config_error(format!(
                "Failed to load config from '{}': {}",
                path.display(),
                e
            ))
        })
    }

    pub fn from_jsonc(content: &str) -> Result<Self> {
        json5::from_str(content).map_err(|e| CurlyError::config_error(e.to_string()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CurlyError::config_error(e.to_string()))
    }

    /// Configuration with every option spelled out at its default
    pub fn template() -> Self {
        Self {
            schema: None,
            root: Some(true),
            linter: Some(LinterConfiguration {
                enabled: Some(true),
                rules: Some(IndexMap::new()),
            }),
            layout: Some(LayoutConfiguration {
                newline_at_end_of_file: Some(NewlineAtEndOfFile::Allow),
                allow_consecutive_usings: Some(true),
            }),
            indentation: Some(IndentationConfiguration {
                indentation_size: Some(4),
                tab_size: Some(4),
                use_tabs: Some(false),
            }),
            preprocessor: Some(PreprocessorConfiguration {
                symbols: Some(Vec::new()),
            }),
            files: Some(FilesConfiguration {
                include: Some(vec!["**/*.cs".to_string()]),
                exclude: Some(vec!["**/bin/**".to_string(), "**/obj/**".to_string()]),
            }),
        }
    }

    /// Severity override configured for `rule_id`
    pub fn rule_severity(&self, rule_id: &str) -> Option<RuleSeverity> {
        self.linter
            .as_ref()?
            .rules
            .as_ref()?
            .get(rule_id)
            .copied()
    }

    pub fn linter_enabled(&self) -> bool {
        self.linter
            .as_ref()
            .and_then(|l| l.enabled)
            .unwrap_or(true)
    }
}

/// JSON schema of the configuration file
pub fn json_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(CurlyConfiguration);
    serde_json::to_value(schema).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_severity_serialization() {
        assert_eq!(serde_json::to_string(&RuleSeverity::Error).unwrap(), r#""error""#);
        assert_eq!(serde_json::to_string(&RuleSeverity::Off).unwrap(), r#""off""#);
        assert_eq!(RuleSeverity::Warn.to_severity(), Some(Severity::Warning));
        assert_eq!(RuleSeverity::Off.to_severity(), None);
    }

    #[test]
    fn test_jsonc_with_comments_and_trailing_commas() {
        let config = CurlyConfiguration::from_jsonc(
            r#"{
                // layout options
                "layout": { "newlineAtEndOfFile": "omit", },
                "linter": { "rules": { "SA1513": "off", "SA1500": "error", }, },
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.layout.unwrap().newline_at_end_of_file,
            Some(NewlineAtEndOfFile::Omit)
        );
        let rules = config.linter.unwrap().rules.unwrap();
        assert_eq!(rules.keys().collect::<Vec<_>>(), ["SA1513", "SA1500"]);
    }

    #[test]
    fn test_toml() {
        let config = CurlyConfiguration::from_toml(
            "[indentation]\nuseTabs = true\ntabSize = 8\n\n[preprocessor]\nsymbols = [\"DEBUG\"]\n",
        )
        .unwrap();
        let indentation = config.indentation.unwrap();
        assert_eq!(indentation.use_tabs, Some(true));
        assert_eq!(indentation.tab_size, Some(8));
        assert_eq!(config.preprocessor.unwrap().symbols.unwrap(), ["DEBUG"]);
    }

    #[test]
    fn test_unknown_severity_is_rejected() {
        let result = CurlyConfiguration::from_jsonc(r#"{"linter": {"rules": {"SA1500": "loud"}}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_template_round_trips_through_json() {
        let template = CurlyConfiguration::template();
        let json = serde_json::to_string_pretty(&template).unwrap();
        assert_eq!(CurlyConfiguration::from_jsonc(&json).unwrap(), template);
    }

    #[test]
    fn test_schema_mentions_sections() {
        let schema = json_schema().to_string();
        for key in ["linter", "layout", "indentation", "newlineAtEndOfFile"] {
            assert!(schema.contains(key), "schema lacks {key}");
        }
    }

    #[test]
    fn test_template_json() {
        let json = serde_json::to_string_pretty(&CurlyConfiguration::template()).unwrap();
        insta::assert_snapshot!(json, @r#"
        {
          "root": true,
          "linter": {
            "enabled": true,
            "rules": {}
          },
          "layout": {
            "newlineAtEndOfFile": "allow",
            "allowConsecutiveUsings": true
          },
          "indentation": {
            "indentationSize": 4,
            "tabSize": 4,
            "useTabs": false
          },
          "preprocessor": {
            "symbols": []
          },
          "files": {
            "include": [
              "**/*.cs"
            ],
            "exclude": [
              "**/bin/**",
              "**/obj/**"
            ]
          }
        }
        "#);
    }
}
