//! Curly Rules
//!
//! The brace and blank-line layout rules (SA1500 to SA1520), the table that
//! decides which rule stays silent when a more specific one is enabled, the
//! trivia-only fixes and the engine that runs them over one or many files.

pub mod catalog;
pub mod context;
pub mod deference;
pub mod engine;
pub mod fix;
pub mod locator;
pub mod registry;
pub mod rules;

// Re-export commonly used types
pub use catalog::{RuleDescriptor, RuleId, UnknownRule, all_rules, lookup};
pub use context::RuleContext;
pub use deference::{DEFERENCES, Deference, Situation, deferences_of, defers_to, should_defer};
pub use engine::{CancellationToken, FileResult, FixOutcome, LintEngine, MAX_FIX_PASSES};
pub use fix::{BatchOutcome, Fix, FixConflict, FixContext, FixError, compute_fix, merge_fixes};
pub use registry::{RuleRegistration, RuleRegistry, RuleSet, Subscription};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
