//! Lint engine
//!
//! Drives the registered rules over a syntax tree, runs fix passes until the
//! layout settles, and lints many files in parallel on the global rayon pool.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};
use std::time::{Duration, Instant};

use curly_core::{
    CsSyntaxNode, CurlyConfiguration, CurlyError, Diagnostic, EditSet, LayoutSettings, Result,
    SyntaxTree, apply_edits, sort_diagnostics,
};
use dashmap::DashMap;
use rayon::prelude::*;
use tracing::{Level, debug, error, info, span, warn};

use crate::context::RuleContext;
use crate::fix::{Fix, FixConflict, FixContext, compute_fix, merge_fixes};
use crate::registry::{RuleRegistration, RuleRegistry, RuleSet};

/// Upper bound on fix passes over one file
pub const MAX_FIX_PASSES: usize = 10;

static THREAD_POOL_INIT: Once = Once::new();

fn init_global_thread_pool(threads: usize) {
    THREAD_POOL_INIT.call_once(|| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("curly-worker-{index}"))
            .build_global()
            .unwrap_or_else(|e| {
                warn!(
                    "Could not configure global thread pool (may already be initialized): {}",
                    e
                );
            });
        info!("Configured global rayon thread pool with {} threads", threads);
    });
}

/// Cooperative cancellation shared between a caller and running passes
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of fixing one source text
#[derive(Debug, Clone)]
pub struct FixOutcome {
    /// Text after every applied fix
    pub source: String,
    pub applied: Vec<Fix>,
    /// Fixes dropped because their edits collided, over all passes; each was
    /// retried in the pass after
    pub conflicts: Vec<FixConflict>,
    /// Diagnostics still present in the fixed text
    pub remaining: Vec<Diagnostic>,
    pub passes: usize,
}

impl FixOutcome {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Result of processing one file
#[derive(Debug)]
pub struct FileResult {
    pub file_path: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
    pub execution_time: Duration,
    pub error: Option<CurlyError>,
    /// New file contents when fixing changed something
    pub fixed_source: Option<String>,
    pub fixes_applied: usize,
}

impl FileResult {
    fn failed(file_path: &Path, error: CurlyError, started: Instant) -> Self {
        if error.is_recoverable() {
            error!("Skipping {}: {}", file_path.display(), error);
        } else {
            debug!("Stopped before {}: {}", file_path.display(), error);
        }
        Self {
            file_path: file_path.to_path_buf(),
            diagnostics: Vec::new(),
            execution_time: started.elapsed(),
            error: Some(error),
            fixed_source: None,
            fixes_applied: 0,
        }
    }
}

/// Runs the enabled rules with one set of layout settings
#[derive(Debug, Clone, Default)]
pub struct LintEngine {
    rules: RuleSet,
    settings: LayoutSettings,
    threads: Option<usize>,
}

impl LintEngine {
    pub fn new(config: &CurlyConfiguration) -> Self {
        Self {
            rules: RuleSet::from_config(config),
            settings: LayoutSettings::from_config(config),
            threads: None,
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_settings(mut self, settings: LayoutSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Worker threads for multi-file runs; the global pool is sized once
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Parse with the configured preprocessor symbols
    pub fn parse(&self, source: &str) -> SyntaxTree {
        SyntaxTree::parse_with_symbols(source, &self.settings.symbols)
    }

    fn dispatch(
        &self,
        ctx: &RuleContext<'_>,
        rules: &[&RuleRegistration],
        node: &CsSyntaxNode,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for rule in rules.iter().filter(|r| r.subscription.accepts(node.kind())) {
            diagnostics.extend((rule.check)(ctx, node));
        }
    }

    /// Evaluate every enabled rule over `tree`
    ///
    /// Cancellation is checked between top-level nodes.
    pub fn lint_tree(
        &self,
        tree: &SyntaxTree,
        file: &Path,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>> {
        if tree.has_errors() {
            debug!(
                "{} has {} lexer and {} parse errors; rules skip what they cannot locate",
                file.display(),
                tree.lexer_errors().len(),
                tree.parse_errors().len()
            );
        }

        let rules: Vec<&RuleRegistration> =
            RuleRegistry::builtin().enabled(&self.rules).collect();
        let ctx = RuleContext::new(tree, file, &self.settings, &self.rules);
        let root = tree.root();
        let mut diagnostics = Vec::new();

        self.dispatch(&ctx, &rules, &root, &mut diagnostics);
        for child in root.children() {
            if cancel.is_cancelled() {
                return Err(CurlyError::Cancelled);
            }
            for node in child.descendants() {
                self.dispatch(&ctx, &rules, &node, &mut diagnostics);
            }
        }

        sort_diagnostics(&mut diagnostics);
        diagnostics.dedup_by(|a, b| {
            a.rule_id == b.rule_id
                && a.location.offset == b.location.offset
                && a.location.length == b.location.length
        });
        Ok(diagnostics)
    }

    pub fn lint_source(
        &self,
        source: &str,
        file: &Path,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>> {
        self.lint_tree(&self.parse(source), file, cancel)
    }

    /// Apply a merged batch, falling back to the fixes that apply on their own
    fn apply_batch(&self, tree: &SyntaxTree, edits: &EditSet, fixes: Vec<Fix>) -> (SyntaxTree, Vec<Fix>) {
        match apply_edits(tree, edits) {
            Ok(fixed) => return (fixed, fixes),
            Err(e) => warn!("Batch of {} fixes rejected: {}", fixes.len(), e),
        }

        let valid: Vec<Fix> = fixes
            .into_iter()
            .filter(|fix| match apply_edits(tree, &fix.edits) {
                Ok(_) => true,
                Err(e) => {
                    warn!("Dropping fix for {} at line {}: {}", fix.rule_id, fix.location.line, e);
                    false
                }
            })
            .collect();
        let merged: EditSet = valid.iter().flat_map(|f| f.edits.iter().cloned()).collect();
        if let Ok(fixed) = apply_edits(tree, &merged) {
            return (fixed, valid);
        }

        // Fall back to a single fix; the rest get another pass
        let Some(first) = valid.into_iter().next() else {
            return (tree.clone(), Vec::new());
        };
        match apply_edits(tree, &first.edits) {
            Ok(fixed) => (fixed, vec![first]),
            Err(_) => (tree.clone(), Vec::new()),
        }
    }

    /// Fix what can be fixed in `source`
    ///
    /// Each pass lints the current tree, computes fixes, merges the ones that
    /// do not collide and applies them. Passes stop once nothing changes or
    /// after [`MAX_FIX_PASSES`].
    pub fn fix_source(
        &self,
        source: &str,
        file: &Path,
        cancel: &CancellationToken,
    ) -> Result<FixOutcome> {
        let mut tree = self.parse(source);
        let mut applied = Vec::new();
        let mut conflicts = Vec::new();
        let mut passes = 0;

        let remaining = loop {
            let diagnostics = self.lint_tree(&tree, file, cancel)?;
            if passes == MAX_FIX_PASSES {
                warn!("{}: fixes did not settle after {} passes", file.display(), passes);
                break diagnostics;
            }

            let fx = FixContext::new(&tree, &self.settings);
            let fixes: Vec<Fix> = diagnostics
                .iter()
                .filter(|d| d.fixable)
                .filter_map(|d| match compute_fix(&fx, d) {
                    Ok(fix) => Some(fix),
                    Err(e) => {
                        debug!("{}", e);
                        None
                    }
                })
                .collect();
            if fixes.is_empty() {
                break diagnostics;
            }

            let batch = merge_fixes(fixes, &tree);
            passes += 1;
            debug!(
                "{}: pass {} applies {} fixes, {} conflicts",
                file.display(),
                passes,
                batch.applied.len(),
                batch.conflicts.len()
            );
            conflicts.extend(batch.conflicts);
            let (fixed, fixed_by) = self.apply_batch(&tree, &batch.edits, batch.applied);
            if fixed_by.is_empty() {
                break diagnostics;
            }
            applied.extend(fixed_by);
            tree = fixed;
        };

        Ok(FixOutcome {
            source: tree.text().to_string(),
            applied,
            conflicts,
            remaining,
            passes,
        })
    }

    fn process_file(&self, file_path: &Path, fix: bool, cancel: &CancellationToken) -> FileResult {
        let started = Instant::now();
        let span = span!(Level::DEBUG, "process_file", file = %file_path.display());
        let _enter = span.enter();

        if cancel.is_cancelled() {
            return FileResult::failed(file_path, CurlyError::Cancelled, started);
        }

        let source = match fs::read_to_string(file_path) {
            Ok(source) => source,
            Err(io_error) => {
                let error = CurlyError::io_error(file_path, io_error);
                return FileResult::failed(file_path, error, started);
            }
        };

        let (diagnostics, fixed_source, fixes_applied) = if fix {
            match self.fix_source(&source, file_path, cancel) {
                Ok(outcome) => {
                    let fixed = outcome.changed().then(|| outcome.source.clone());
                    (outcome.remaining, fixed, outcome.applied.len())
                }
                Err(e) => return FileResult::failed(file_path, e, started),
            }
        } else {
            match self.lint_source(&source, file_path, cancel) {
                Ok(diagnostics) => (diagnostics, None, 0),
                Err(e) => return FileResult::failed(file_path, e, started),
            }
        };

        let execution_time = started.elapsed();
        debug!(
            "Completed {} in {:?}: {} diagnostics",
            file_path.display(),
            execution_time,
            diagnostics.len()
        );
        FileResult {
            file_path: file_path.to_path_buf(),
            diagnostics,
            execution_time,
            error: None,
            fixed_source,
            fixes_applied,
        }
    }

    /// Lint, and optionally fix, many files in parallel
    ///
    /// Results come back sorted by path. Fixed text is returned, not written.
    pub fn lint_files(
        &self,
        files: &[PathBuf],
        fix: bool,
        cancel: &CancellationToken,
    ) -> Vec<FileResult> {
        if let Some(threads) = self.threads {
            init_global_thread_pool(threads);
        }
        let started = Instant::now();
        let results: DashMap<PathBuf, FileResult> = DashMap::new();

        files.par_iter().for_each(|path| {
            results.insert(path.clone(), self.process_file(path, fix, cancel));
        });

        let mut results: Vec<FileResult> = results.into_iter().map(|(_, r)| r).collect();
        results.sort_by(|a, b| a.file_path.cmp(&b.file_path));
        info!(
            "Processed {} files in {:?}",
            results.len(),
            started.elapsed()
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RuleId;

    fn engine(rules: &[RuleId]) -> LintEngine {
        LintEngine::default().with_rules(RuleSet::only(rules))
    }

    #[test]
    fn test_lint_source_sorted() {
        let source = "class A\n{\n\n    int x;\n\n\n}\n";
        let diagnostics = engine(&[RuleId::SA1505, RuleId::SA1507, RuleId::SA1508])
            .lint_source(source, Path::new("A.cs"), &CancellationToken::new())
            .unwrap();
        let found: Vec<_> = diagnostics
            .iter()
            .map(|d| (d.location.line, d.rule_id.as_str()))
            .collect();
        assert_eq!(found, vec![(3, "SA1505"), (5, "SA1508"), (6, "SA1507")]);
    }

    #[test]
    fn test_cancelled_pass() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = LintEngine::default().lint_source("class A\n{\n}\n", Path::new("A.cs"), &cancel);
        assert!(matches!(result, Err(CurlyError::Cancelled)));
    }

    #[test]
    fn test_fix_source_runs_until_settled() {
        let source = "class A\n{\n\n    void M() { Run(); }\n    void N()\n    {\n    }\n\n\n}\n";
        let outcome = LintEngine::default()
            .fix_source(source, Path::new("A.cs"), &CancellationToken::new())
            .unwrap();
        assert!(outcome.changed());
        assert!(outcome.passes >= 1);
        assert_eq!(
            outcome.source,
            "class A\n{\n    void M()\n    {\n        Run();\n    }\n\n    void N()\n    {\n    }\n}\n"
        );
        assert!(outcome.remaining.is_empty());
    }

    #[test]
    fn test_unfixable_diagnostics_remain() {
        let source = "class A\n{\n    void M()\n    {\n        if (x) Run();\n    }\n}\n";
        let outcome = LintEngine::default()
            .fix_source(source, Path::new("A.cs"), &CancellationToken::new())
            .unwrap();
        assert!(!outcome.changed());
        assert_eq!(outcome.source, source);
        let rules: Vec<_> = outcome.remaining.iter().map(|d| d.rule_id.as_str()).collect();
        assert_eq!(rules, vec!["SA1503"]);
    }

    #[test]
    fn test_lint_files_reports_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("A.cs");
        fs::write(&good, "class A\n{\n}\n\n").unwrap();
        let missing = dir.path().join("B.cs");

        let results = LintEngine::default().lint_files(
            &[missing.clone(), good.clone()],
            false,
            &CancellationToken::new(),
        );
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].file_path, good);
        assert_eq!(results[0].diagnostics.len(), 1);
        let error = results[1].error.as_ref().unwrap();
        assert!(error.is_recoverable());
        assert!(error.to_string().contains("B.cs"));
    }
}
