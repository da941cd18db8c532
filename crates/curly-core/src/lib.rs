//! Curly Core
//!
//! Foundations of the curly layout linter for C# sources: a lossless
//! Rowan-based syntax tree, the trivia model the layout rules read, trivia
//! edits that fixes produce, configuration loading and file discovery.

pub mod config;
pub mod cst; // Concrete Syntax Tree (lossless, Rowan-based)
pub mod diagnostics;
pub mod discovery;
pub mod edit;
pub mod error;
pub mod result;
pub mod tree;
pub mod trivia;

// Re-export commonly used types
pub use config::{
    ConfigLoader, CurlyConfiguration, FilesConfiguration, LayoutSettings, LinterConfiguration,
    NewlineAtEndOfFile, RuleSeverity,
};
pub use cst::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken, TokenExt};
pub use diagnostics::{Diagnostic, Location, Severity, SourceMap, sort_diagnostics};
pub use discovery::{DefaultFileDiscovery, FileDiscovery};
pub use edit::{EditError, EditSet, TriviaEdit, apply_edits};
pub use error::{CurlyError, ErrorKind};
pub use result::Result;
pub use tree::SyntaxTree;
pub use trivia::{GapLine, LineKind, TriviaItem, TriviaKind, TriviaStream};

pub use rowan::{TextRange, TextSize};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    init_tracing_with_default("curly=info");
}

/// Initialize tracing with a fallback filter used when `RUST_LOG` is unset
pub fn init_tracing_with_default(default_filter: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
