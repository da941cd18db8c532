//! Diagnostics produced by layout rules
//!
//! - [`Diagnostic`]: one finding of one rule
//! - [`Location`]: file, 1-based line/column and byte span
//! - [`SourceMap`]: byte offset to line/column conversion

mod source_map;
mod types;

pub use source_map::SourceMap;
pub use types::{Diagnostic, Location, Severity, sort_diagnostics};
