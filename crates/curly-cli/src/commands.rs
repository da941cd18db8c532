//! CLI command implementations

use anyhow::{Context, bail};
use curly_core::config::json_schema;
use curly_core::{ConfigLoader, CurlyConfiguration, DefaultFileDiscovery, Severity};
use curly_rules::{
    CancellationToken, LintEngine, RuleId, RuleSet, all_rules, deferences_of, lookup,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::output::{self, FileReport, LintSummary, OutputFormatter};
use crate::{ConfigFormat, OutputFormat};

/// Options of the lint command
#[derive(Debug)]
pub struct LintOptions {
    pub paths: Vec<PathBuf>,
    pub format: OutputFormat,
    pub fix: bool,
    pub diff: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub error_on_warnings: bool,
    pub threads: Option<usize>,
    pub config_path: Option<PathBuf>,
}

/// Directory configuration discovery starts from
fn discovery_start(paths: &[PathBuf]) -> &Path {
    match paths.first() {
        Some(path) if path.is_dir() => path,
        Some(path) => match path.parent() {
            Some(parent) if parent.is_dir() => parent,
            _ => Path::new("."),
        },
        None => Path::new("."),
    }
}

fn load_config(config_path: Option<&Path>, paths: &[PathBuf]) -> anyhow::Result<CurlyConfiguration> {
    let config = ConfigLoader::load(config_path, Some(discovery_start(paths)))
        .context("failed to load configuration")?;
    debug!("Loaded configuration");
    Ok(config)
}

/// Lint command implementation
pub fn lint_command(options: LintOptions) -> anyhow::Result<ExitCode> {
    debug!("Running lint command on paths: {:?}", options.paths);

    let mut config = load_config(options.config_path.as_deref(), &options.paths)?;

    // Apply CLI overrides to configuration
    if !options.include.is_empty() {
        config.files.get_or_insert_with(Default::default).include = Some(options.include.clone());
    }
    if !options.exclude.is_empty() {
        config.files.get_or_insert_with(Default::default).exclude = Some(options.exclude.clone());
    }

    let start_time = Instant::now();
    let files = DefaultFileDiscovery::discover_paths(&options.paths, &config)?;
    if files.is_empty() {
        println!("No C# files found in specified paths.");
        return Ok(ExitCode::SUCCESS);
    }
    debug!("Found {} C# files to lint", files.len());

    let mut engine = LintEngine::new(&config);
    if let Some(threads) = options.threads {
        engine = engine.with_threads(threads);
    }
    let fixing = options.fix || options.diff;
    let results = engine.lint_files(&files, fixing, &CancellationToken::new());

    let mut summary = LintSummary::new();
    summary.files_checked = results.len();
    let mut reports = Vec::with_capacity(results.len());

    for result in results {
        if let Some(error) = result.error {
            error!("Error processing {}: {}", result.file_path.display(), error);
            eprintln!("{}: {}", result.file_path.display(), error);
            summary.failures += 1;
            continue;
        }
        summary.count(&result.diagnostics);

        if let Some(fixed) = &result.fixed_source {
            if options.diff {
                let original = fs::read_to_string(&result.file_path)
                    .with_context(|| format!("failed to read {}", result.file_path.display()))?;
                print!("{}", output::render_diff(&original, fixed, &result.file_path));
            } else {
                fs::write(&result.file_path, fixed)
                    .with_context(|| format!("failed to write {}", result.file_path.display()))?;
                info!(
                    "Applied {} fixes to {}",
                    result.fixes_applied,
                    result.file_path.display()
                );
            }
            summary.fixes_applied += result.fixes_applied;
            summary.files_fixed += 1;
        }

        reports.push(FileReport {
            file_path: result.file_path,
            source: result.fixed_source,
            diagnostics: result.diagnostics,
        });
    }

    let formatter = OutputFormatter::new(options.format);
    formatter.print_results(&reports, &summary, options.diff)?;

    debug!(
        "Completed in {}",
        output::utils::format_duration(start_time.elapsed())
    );

    let failed = summary.failures > 0
        || summary.errors > 0
        || (options.error_on_warnings && summary.warnings > 0);
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn severity_label(severity: Option<Severity>) -> &'static str {
    match severity {
        Some(Severity::Error) => "error",
        Some(Severity::Warning) => "warn",
        Some(Severity::Info) | Some(Severity::Hint) => "info",
        None => "off",
    }
}

/// Rules list command implementation
pub fn rules_list_command(detailed: bool, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    debug!("Listing available rules");

    let config = load_config(config_path.as_deref(), &[])?;
    let enabled = RuleSet::from_config(&config);

    println!("Available Rules:");
    println!("================");

    let mut count = 0;
    for rule in all_rules() {
        count += 1;
        let severity = severity_label(enabled.severity(rule.rule));
        if detailed {
            println!("\n{}", rule.id);
            println!("  Title: {}", rule.title);
            println!("  Description: {}", rule.description);
            println!("  Status: {severity}");
            if rule.fixable {
                println!("  Autofix: available");
            }
        } else {
            let marker = if rule.fixable { " (fixable)" } else { "" };
            println!("  {} [{}] - {}{}", rule.id, severity, rule.title, marker);
        }
    }

    println!("\nTotal: {count} rules");
    Ok(())
}

/// Rules explain command implementation
pub fn rules_explain_command(rule_id: &str) -> anyhow::Result<ExitCode> {
    debug!("Explaining rule: {}", rule_id);

    let Some(rule) = lookup(&rule_id.to_uppercase()) else {
        println!("Rule '{rule_id}' not found.");
        println!();
        println!("Use 'curly rules' to list all available rules.");
        return Ok(ExitCode::FAILURE);
    };

    println!("Rule: {}", rule.id);
    println!("{}", "=".repeat(rule.id.len() + 6));
    println!();
    println!("{}", rule.title);
    println!();
    println!("Description: {}", rule.description);
    println!("Message: {}", rule.message_format);
    println!(
        "Default severity: {}",
        severity_label(Some(rule.default_severity))
    );
    println!(
        "Autofix: {}",
        if rule.fixable { "available" } else { "not available" }
    );
    println!("Documentation: {}", rule.help_path);

    let deferences: Vec<_> = deferences_of(rule.rule).collect();
    if !deferences.is_empty() {
        println!();
        println!("Stays silent when the more specific rule is enabled:");
        for deference in deferences {
            println!(
                "  {} ({})",
                deference.defers_to,
                situation_text(&serde_json::to_value(deference.situation)?)
            );
        }
    }

    let deferred_by: Vec<RuleId> = curly_rules::DEFERENCES
        .iter()
        .filter(|d| d.defers_to == rule.rule)
        .map(|d| d.rule)
        .collect();
    if !deferred_by.is_empty() {
        let ids: Vec<&str> = deferred_by.iter().map(|r| r.as_str()).collect();
        println!();
        println!("Takes precedence over: {}", ids.join(", "));
    }

    Ok(ExitCode::SUCCESS)
}

/// `single-line-statement-block` as `single line statement block`
fn situation_text(value: &serde_json::Value) -> String {
    value.as_str().unwrap_or_default().replace('-', " ")
}

/// Config init command implementation
pub fn config_init_command(format: ConfigFormat, force: bool) -> anyhow::Result<()> {
    debug!("Initializing configuration file with format: {:?}", format);

    let template = CurlyConfiguration::template();
    let (filename, content) = match format {
        ConfigFormat::Json => (
            ".curlyrc.json",
            serde_json::to_string_pretty(&template).context("failed to serialize configuration")?,
        ),
        ConfigFormat::Toml => (
            ".curlyrc.toml",
            toml::to_string_pretty(&template).context("failed to serialize configuration")?,
        ),
    };

    let config_path = PathBuf::from(filename);
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    fs::write(&config_path, format!("{content}\n"))
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    println!("Created configuration file: {}", config_path.display());
    Ok(())
}

/// Config show command implementation
pub fn config_show_command(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config_path.as_deref(), &[])?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Config schema command implementation
pub fn config_schema_command() -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&json_schema())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_start_for_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("A.cs");
        fs::write(&file, "class A\n{\n}\n").unwrap();
        assert_eq!(discovery_start(&[file]), dir.path());
        assert_eq!(discovery_start(&[dir.path().to_path_buf()]), dir.path());
        assert_eq!(discovery_start(&[]), Path::new("."));
        assert_eq!(discovery_start(&[PathBuf::from("Missing.cs")]), Path::new("."));
    }

    #[test]
    fn test_situation_text() {
        let value = serde_json::to_value(curly_rules::Situation::BlankRunAtFileEnd).unwrap();
        assert_eq!(situation_text(&value), "blank run at file end");
    }

    #[test]
    fn test_severity_label() {
        assert_eq!(severity_label(None), "off");
        assert_eq!(severity_label(Some(Severity::Warning)), "warn");
    }
}
