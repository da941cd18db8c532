//! Configuration system for curly
//!
//! - JSON (with comments and trailing commas) and TOML configuration files
//! - Auto-discovery by walking up from the start directory
//! - JSON Schema generation via schemars
//!
//! ## Configuration Files
//!
//! Looked up in this order in every directory: `.curlyrc.json`,
//! `.curlyrc.jsonc`, `.curlyrc.toml`, `curly.json`.

mod curly_config;
mod loader;
mod settings;

pub use curly_config::{
    CurlyConfiguration, FilesConfiguration, IndentationConfiguration, LayoutConfiguration,
    LinterConfiguration, NewlineAtEndOfFile, PreprocessorConfiguration, RuleSeverity, json_schema,
};
pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
pub use settings::LayoutSettings;
