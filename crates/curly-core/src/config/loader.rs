//! Configuration file discovery and loading

use super::CurlyConfiguration;
use crate::error::CurlyError;
use crate::result::Result;
use std::path::{Path, PathBuf};

/// Config file names in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".curlyrc.json",
    ".curlyrc.jsonc",
    ".curlyrc.toml",
    "curly.json",
];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Find a config file by walking up from `start_path`
    ///
    /// Checks [`CONFIG_FILE_NAMES`] in each directory and stops at the first
    /// match or at the filesystem root.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| CurlyError::config_error(format!("Invalid path: {e}")))?;
        if current.is_file()
            && let Some(parent) = current.parent()
        {
            current = parent.to_path_buf();
        }

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    pub fn load_from_file(path: &Path) -> Result<CurlyConfiguration> {
        CurlyConfiguration::load(path)
    }

    /// Load config from `custom_path`, or discover one from `start_dir`
    ///
    /// Returns the default configuration when discovery finds nothing. An
    /// explicit path that does not exist is an error.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<CurlyConfiguration> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(CurlyError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(CurlyConfiguration::default())
            }
        }
    }
}
