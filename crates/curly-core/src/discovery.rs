//! Source file discovery
//!
//! Walks directories and filters C# files through the `files.include` and
//! `files.exclude` glob lists of the configuration.

use crate::config::CurlyConfiguration;
use crate::{CurlyError, Result};
use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const DEFAULT_INCLUDE: &str = "**/*.cs";
const DEFAULT_EXCLUDE: &[&str] = &["**/bin/**", "**/obj/**"];

fn get_include_patterns(config: &CurlyConfiguration) -> Vec<String> {
    config
        .files
        .as_ref()
        .and_then(|f| f.include.clone())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| vec![DEFAULT_INCLUDE.to_string()])
}

fn get_exclude_patterns(config: &CurlyConfiguration) -> Vec<String> {
    config
        .files
        .as_ref()
        .and_then(|f| f.exclude.clone())
        .unwrap_or_else(|| DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect())
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| {
                CurlyError::config_error(format!("Invalid glob pattern '{p}': {e}"))
            })
        })
        .collect()
}

/// Trait for file discovery functionality
pub trait FileDiscovery {
    /// Discover source files under the discovery root
    fn discover_files(&self, config: &CurlyConfiguration) -> Result<Vec<PathBuf>>;

    /// Check if a file should be included based on configuration
    fn should_include(&self, path: &Path, config: &CurlyConfiguration) -> bool;
}

/// Walks a root directory with `walkdir`
#[derive(Debug, Clone)]
pub struct DefaultFileDiscovery {
    pub root_dir: PathBuf,
}

impl DefaultFileDiscovery {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Resolve command-line paths to source files
    ///
    /// Files named explicitly are kept even when they do not match the include
    /// patterns; directories are walked and filtered.
    pub fn discover_paths(
        paths: &[PathBuf],
        config: &CurlyConfiguration,
    ) -> Result<Vec<PathBuf>> {
        let mut files = BTreeSet::new();
        for path in paths {
            if path.is_file() {
                files.insert(path.clone());
            } else if path.is_dir() {
                files.extend(Self::new(path).discover_files(config)?);
            } else {
                return Err(CurlyError::io_error(
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
                ));
            }
        }
        Ok(files.into_iter().collect())
    }

    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root_dir).unwrap_or(path)
    }

    fn matches_any(&self, path: &Path, patterns: &[Pattern]) -> bool {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        let relative = self.relative(path).to_string_lossy().replace('\\', "/");
        patterns
            .iter()
            .any(|p| p.matches_with(&relative, options) || p.matches_with(&format!("/{relative}"), options))
    }
}

impl FileDiscovery for DefaultFileDiscovery {
    fn discover_files(&self, config: &CurlyConfiguration) -> Result<Vec<PathBuf>> {
        info!("Discovering C# files in {}", self.root_dir.display());

        let include = compile(&get_include_patterns(config))?;
        let exclude = compile(&get_exclude_patterns(config))?;

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root_dir).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if self.matches_any(path, &include) && !self.matches_any(path, &exclude) {
                files.push(path.to_path_buf());
            }
        }
        files.sort();

        info!("Discovered {} C# files", files.len());
        debug!("Files: {:?}", files);
        Ok(files)
    }

    fn should_include(&self, path: &Path, config: &CurlyConfiguration) -> bool {
        let (Ok(include), Ok(exclude)) = (
            compile(&get_include_patterns(config)),
            compile(&get_exclude_patterns(config)),
        ) else {
            return false;
        };
        self.matches_any(path, &include) && !self.matches_any(path, &exclude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilesConfiguration;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "class A { }\n").unwrap();
    }

    fn names(files: &[PathBuf], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_default_patterns_skip_build_output() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "src/A.cs");
        touch(temp_dir.path(), "src/B.txt");
        touch(temp_dir.path(), "obj/Debug/Gen.cs");
        touch(temp_dir.path(), "Program.cs");

        let discovery = DefaultFileDiscovery::new(temp_dir.path());
        let files = discovery.discover_files(&CurlyConfiguration::default()).unwrap();
        assert_eq!(names(&files, temp_dir.path()), ["Program.cs", "src/A.cs"]);
    }

    #[test]
    fn test_custom_exclude() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "src/A.cs");
        touch(temp_dir.path(), "tests/ATests.cs");

        let config = CurlyConfiguration {
            files: Some(FilesConfiguration {
                include: None,
                exclude: Some(vec!["tests/**".to_string()]),
            }),
            ..Default::default()
        };
        let discovery = DefaultFileDiscovery::new(temp_dir.path());
        let files = discovery.discover_files(&config).unwrap();
        assert_eq!(names(&files, temp_dir.path()), ["src/A.cs"]);
        assert!(!discovery.should_include(&temp_dir.path().join("tests/ATests.cs"), &config));
    }

    #[test]
    fn test_explicit_file_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "script.csx");
        let explicit = temp_dir.path().join("script.csx");
        let files = DefaultFileDiscovery::discover_paths(
            std::slice::from_ref(&explicit),
            &CurlyConfiguration::default(),
        )
        .unwrap();
        assert_eq!(files, vec![explicit]);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let result = DefaultFileDiscovery::discover_paths(
            &[PathBuf::from("does/not/exist")],
            &CurlyConfiguration::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_pattern() {
        let config = CurlyConfiguration {
            files: Some(FilesConfiguration {
                include: Some(vec!["[".to_string()]),
                exclude: None,
            }),
            ..Default::default()
        };
        let temp_dir = TempDir::new().unwrap();
        assert!(
            DefaultFileDiscovery::new(temp_dir.path())
                .discover_files(&config)
                .is_err()
        );
    }
}
