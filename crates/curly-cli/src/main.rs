//! Curly CLI
//!
//! Command-line interface for the curly C# layout linter

mod commands;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use curly_core::init_tracing;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "curly")]
#[command(about = "curly: brace and blank-line layout linter for C#")]
#[command(version = curly_core::VERSION)]
#[command(
    long_about = "curly checks where braces and blank lines go in C# source files.\n\
It reports the SA1500 to SA1520 layout rules and can fix most of them without\n\
touching anything but whitespace and line breaks.\n\
\n\
Examples:\n  \
curly lint                    # Lint current directory\n  \
curly lint --fix src/         # Lint and fix files in src/\n  \
curly lint --diff Program.cs  # Show fixes without writing them\n  \
curly rules --detailed        # List all rules\n  \
curly explain SA1513          # Describe one rule\n  \
curly config init             # Write a configuration file"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (.curlyrc.json/.curlyrc.toml)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Number of threads to use for parallel processing
    #[arg(
        short = 'j',
        long,
        global = true,
        help = "Number of threads (default: number of CPU cores)"
    )]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint C# files for brace and blank-line layout
    #[command(alias = "check")]
    Lint {
        /// Files or directories to lint
        #[arg(help = "Files or directories to process (default: current directory)")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(
            short,
            long,
            default_value = "human",
            help = "Output format for diagnostics"
        )]
        format: OutputFormat,

        /// Write fixes to files
        #[arg(long, help = "Apply fixes and write the files")]
        fix: bool,

        /// Show fixes as a diff without writing them
        #[arg(
            long,
            help = "Show proposed fixes as a unified diff (dry run)",
            conflicts_with = "fix"
        )]
        diff: bool,

        /// Include patterns (glob syntax)
        #[arg(
            long,
            help = "Include files matching pattern (can be used multiple times)"
        )]
        include: Vec<String>,

        /// Exclude patterns (glob syntax)
        #[arg(
            long,
            help = "Exclude files matching pattern (can be used multiple times)"
        )]
        exclude: Vec<String>,

        /// Exit with non-zero code on warnings too
        #[arg(long, help = "Exit with non-zero code when warnings are reported")]
        error_on_warnings: bool,
    },

    /// List the layout rules
    Rules {
        /// Show detailed rule information
        #[arg(long, help = "Show detailed information for each rule")]
        detailed: bool,
    },

    /// Show detailed information about one rule
    Explain {
        /// Rule ID to explain
        #[arg(help = "Rule ID, e.g. SA1513")]
        rule_id: String,
    },

    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    #[command(alias = "ver")]
    Version {
        /// Show detailed version information
        #[arg(long, help = "Show detailed version and build information")]
        detailed: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Initialize a new configuration file
    Init {
        /// Configuration file format
        #[arg(long, default_value = "json", help = "Configuration file format")]
        format: ConfigFormat,

        /// Overwrite existing configuration file
        #[arg(long, help = "Overwrite existing configuration file")]
        force: bool,
    },

    /// Show the configuration in effect
    Show,

    /// Print the JSON schema of the configuration file
    Schema,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output with colors and context
    Human,
    /// JSON format for programmatic consumption
    Json,
    /// GitHub Actions format
    Github,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ConfigFormat {
    /// JSON configuration format
    Json,
    /// TOML configuration format
    Toml,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Colors only on a terminal, and never when NO_COLOR is set
    let use_colors =
        !cli.no_color && std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
    colored::control::set_override(use_colors);

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "curly=error",
        1 => "curly=warn",
        2 => "curly=info",
        3 => "curly=debug",
        _ => "curly=trace",
    };
    if std::env::var_os("RUST_LOG").is_none() {
        // SAFETY: no other threads exist yet
        unsafe {
            std::env::set_var("RUST_LOG", log_level);
        }
    }
    init_tracing();

    match run_command(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("curly failed: {:#}", e);
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Some(Commands::Lint {
            paths,
            format,
            fix,
            diff,
            include,
            exclude,
            error_on_warnings,
        }) => {
            let paths = if paths.is_empty() {
                vec![PathBuf::from(".")]
            } else {
                paths
            };
            commands::lint_command(commands::LintOptions {
                paths,
                format,
                fix,
                diff,
                include,
                exclude,
                error_on_warnings,
                threads: cli.threads,
                config_path: cli.config,
            })
        }

        Some(Commands::Rules { detailed }) => {
            commands::rules_list_command(detailed, cli.config)?;
            Ok(ExitCode::SUCCESS)
        }

        Some(Commands::Explain { rule_id }) => commands::rules_explain_command(&rule_id),

        Some(Commands::Config { action }) => {
            match action {
                ConfigAction::Init { format, force } => {
                    commands::config_init_command(format, force)?
                }
                ConfigAction::Show => commands::config_show_command(cli.config)?,
                ConfigAction::Schema => commands::config_schema_command()?,
            }
            Ok(ExitCode::SUCCESS)
        }

        Some(Commands::Version { detailed }) => {
            if detailed {
                println!("curly {}", curly_core::VERSION);
                println!("Build information:");
                println!("  Target: {}", std::env::consts::ARCH);
                println!("  OS: {}", std::env::consts::OS);
                println!("  Rules: {}", curly_rules::all_rules().count());
            } else {
                println!("{}", curly_core::VERSION);
            }
            Ok(ExitCode::SUCCESS)
        }

        None => {
            // No subcommand provided, show help
            let mut cmd = Cli::command();
            cmd.print_help()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
