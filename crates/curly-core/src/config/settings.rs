//! Resolved settings consumed by rules and fixes

use super::{CurlyConfiguration, NewlineAtEndOfFile};

/// Layout options with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSettings {
    pub newline_at_end_of_file: NewlineAtEndOfFile,
    pub allow_consecutive_usings: bool,
    pub indentation_size: usize,
    pub tab_size: usize,
    pub use_tabs: bool,
    pub symbols: Vec<String>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            newline_at_end_of_file: NewlineAtEndOfFile::Allow,
            allow_consecutive_usings: true,
            indentation_size: 4,
            tab_size: 4,
            use_tabs: false,
            symbols: Vec::new(),
        }
    }
}

impl LayoutSettings {
    pub fn from_config(config: &CurlyConfiguration) -> Self {
        let defaults = Self::default();
        let layout = config.layout.clone().unwrap_or_default();
        let indentation = config.indentation.clone().unwrap_or_default();
        Self {
            newline_at_end_of_file: layout
                .newline_at_end_of_file
                .unwrap_or(defaults.newline_at_end_of_file),
            allow_consecutive_usings: layout
                .allow_consecutive_usings
                .unwrap_or(defaults.allow_consecutive_usings),
            indentation_size: indentation
                .indentation_size
                .unwrap_or(defaults.indentation_size),
            tab_size: indentation.tab_size.unwrap_or(defaults.tab_size).max(1),
            use_tabs: indentation.use_tabs.unwrap_or(defaults.use_tabs),
            symbols: config
                .preprocessor
                .as_ref()
                .and_then(|p| p.symbols.clone())
                .unwrap_or_default(),
        }
    }

    /// Whitespace for an indentation of `columns`
    pub fn indent_text(&self, columns: usize) -> String {
        if self.use_tabs {
            let tabs = columns / self.tab_size;
            let spaces = columns % self.tab_size;
            format!("{}{}", "\t".repeat(tabs), " ".repeat(spaces))
        } else {
            " ".repeat(columns)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IndentationConfiguration, LayoutConfiguration};

    #[test]
    fn test_defaults() {
        let settings = LayoutSettings::from_config(&CurlyConfiguration::default());
        assert_eq!(settings, LayoutSettings::default());
        assert!(settings.allow_consecutive_usings);
    }

    #[test]
    fn test_overrides() {
        let config = CurlyConfiguration {
            layout: Some(LayoutConfiguration {
                newline_at_end_of_file: Some(NewlineAtEndOfFile::Require),
                allow_consecutive_usings: Some(false),
            }),
            indentation: Some(IndentationConfiguration {
                indentation_size: Some(2),
                tab_size: Some(0),
                use_tabs: None,
            }),
            ..Default::default()
        };
        let settings = LayoutSettings::from_config(&config);
        assert_eq!(settings.newline_at_end_of_file, NewlineAtEndOfFile::Require);
        assert!(!settings.allow_consecutive_usings);
        assert_eq!(settings.indentation_size, 2);
        assert_eq!(settings.tab_size, 1);
    }

    #[test]
    fn test_indent_text() {
        let mut settings = LayoutSettings::default();
        assert_eq!(settings.indent_text(8), "        ");
        settings.use_tabs = true;
        assert_eq!(settings.indent_text(10), "\t\t  ");
    }
}
