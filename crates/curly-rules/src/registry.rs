//! Rule registration and per-pass enablement

use curly_core::{CsSyntaxKind, CsSyntaxNode, CurlyConfiguration, Diagnostic, EditSet, Severity};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use tracing::warn;

use crate::catalog::{RuleId, lookup};
use crate::context::RuleContext;
use crate::fix::{FixContext, FixError};
use crate::rules;

/// Evaluates one rule on the node it subscribed to
pub type CheckFn = fn(&RuleContext<'_>, &CsSyntaxNode) -> Vec<Diagnostic>;

/// Computes the trivia edits repairing one diagnostic of the rule
pub type FixFn = fn(&FixContext<'_>, &Diagnostic) -> Result<EditSet, FixError>;

/// What a rule is handed during a pass
#[derive(Debug, Clone, Copy)]
pub enum Subscription {
    /// Called once with the root
    Tree,
    /// Called for every node of one of these kinds
    Nodes(&'static [CsSyntaxKind]),
}

impl Subscription {
    pub fn accepts(&self, kind: CsSyntaxKind) -> bool {
        match self {
            Subscription::Tree => kind == CsSyntaxKind::CompilationUnit,
            Subscription::Nodes(kinds) => kinds.contains(&kind),
        }
    }
}

#[derive(Clone, Copy)]
pub struct RuleRegistration {
    pub id: RuleId,
    pub subscription: Subscription,
    pub check: CheckFn,
    pub fix: Option<FixFn>,
}

impl std::fmt::Debug for RuleRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistration")
            .field("id", &self.id)
            .field("subscription", &self.subscription)
            .field("fixable", &self.fix.is_some())
            .finish()
    }
}

/// All rules known to the engine, in id order
#[derive(Debug)]
pub struct RuleRegistry {
    rules: Vec<RuleRegistration>,
}

static BUILTIN: Lazy<RuleRegistry> = Lazy::new(|| {
    let mut rules = rules::builtin_rules();
    rules.sort_by_key(|r| r.id);
    RuleRegistry { rules }
});

impl RuleRegistry {
    pub fn builtin() -> &'static RuleRegistry {
        &BUILTIN
    }

    pub fn get(&self, id: RuleId) -> Option<&RuleRegistration> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleRegistration> {
        self.rules.iter()
    }

    /// Registrations of the rules enabled in `set`
    pub fn enabled<'a>(&'a self, set: &'a RuleSet) -> impl Iterator<Item = &'a RuleRegistration> {
        self.rules.iter().filter(move |r| set.is_enabled(r.id))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Rules enabled for a pass and the severity each one reports with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    severities: IndexMap<RuleId, Severity>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::all()
    }
}

impl RuleSet {
    /// Every rule that is enabled by default, at its default severity
    pub fn all() -> Self {
        Self {
            severities: RuleId::ALL
                .iter()
                .map(|id| id.descriptor())
                .filter(|d| d.enabled_by_default)
                .map(|d| (d.rule, d.default_severity))
                .collect(),
        }
    }

    pub fn none() -> Self {
        Self {
            severities: IndexMap::new(),
        }
    }

    pub fn only(ids: &[RuleId]) -> Self {
        Self {
            severities: ids
                .iter()
                .map(|id| (*id, id.descriptor().default_severity))
                .collect(),
        }
    }

    /// Apply `linter.enabled` and `linter.rules` on top of the defaults
    pub fn from_config(config: &CurlyConfiguration) -> Self {
        let Some(linter) = &config.linter else {
            return Self::all();
        };
        if linter.enabled == Some(false) {
            return Self::none();
        }
        let mut set = Self::all();
        for (key, level) in linter.rules.iter().flatten() {
            let Some(descriptor) = lookup(key) else {
                warn!("Ignoring configuration for unknown rule '{}'", key);
                continue;
            };
            match level.to_severity() {
                Some(severity) => {
                    set.severities.insert(descriptor.rule, severity);
                }
                None => {
                    set.severities.shift_remove(&descriptor.rule);
                }
            }
        }
        set.severities.sort_keys();
        set
    }

    pub fn with(mut self, id: RuleId) -> Self {
        self.severities
            .entry(id)
            .or_insert(id.descriptor().default_severity);
        self
    }

    pub fn without(mut self, id: RuleId) -> Self {
        self.severities.shift_remove(&id);
        self
    }

    pub fn is_enabled(&self, id: RuleId) -> bool {
        self.severities.contains_key(&id)
    }

    pub fn severity(&self, id: RuleId) -> Option<Severity> {
        self.severities.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.severities.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.severities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.severities.is_empty()
    }
}
