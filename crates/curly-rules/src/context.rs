//! Per-file evaluation context handed to every rule

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use curly_core::{
    CsSyntaxKind, CsSyntaxNode, CsSyntaxToken, Diagnostic, LayoutSettings, Severity, SyntaxTree,
    TextRange, TriviaStream,
};

use crate::catalog::RuleId;
use crate::deference::{Situation, should_defer};
use crate::registry::RuleSet;

pub struct RuleContext<'a> {
    pub tree: &'a SyntaxTree,
    pub file: &'a Path,
    pub settings: &'a LayoutSettings,
    pub rules: &'a RuleSet,
    root: CsSyntaxNode,
    unseparated: RefCell<HashMap<CsSyntaxNode, Rc<[CsSyntaxNode]>>>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        tree: &'a SyntaxTree,
        file: &'a Path,
        settings: &'a LayoutSettings,
        rules: &'a RuleSet,
    ) -> Self {
        Self {
            tree,
            file,
            settings,
            rules,
            root: tree.root(),
            unseparated: RefCell::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &CsSyntaxNode {
        &self.root
    }

    pub fn is_enabled(&self, id: RuleId) -> bool {
        self.rules.is_enabled(id)
    }

    /// `rule` stays silent in `situation` because a more specific rule is on
    pub fn defers(&self, rule: RuleId, situation: Situation) -> bool {
        should_defer(rule, situation, self.rules)
    }

    /// Diagnostic of `id` covering `range`
    pub fn report(&self, id: RuleId, range: TextRange) -> Diagnostic {
        self.report_with_args(id, range, Vec::new())
    }

    pub fn report_with_args(&self, id: RuleId, range: TextRange, args: Vec<String>) -> Diagnostic {
        let descriptor = id.descriptor();
        let severity: Severity = self
            .rules
            .severity(id)
            .unwrap_or(descriptor.default_severity);
        let span = usize::from(range.start())..usize::from(range.end());
        let location =
            self.tree
                .source_map()
                .span_to_location(&span, self.tree.text(), self.file);
        Diagnostic::new(
            descriptor.id,
            severity,
            descriptor.format_message(&args),
            location,
        )
        .with_args(args)
        .with_fixable(descriptor.fixable)
    }

    /// Significant tokens in source order, the end-of-file token included
    pub fn significant_tokens(&self) -> impl Iterator<Item = CsSyntaxToken> {
        self.root
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| !t.kind().is_trivia())
    }

    pub fn tokens_of_kind(&self, kind: CsSyntaxKind) -> impl Iterator<Item = CsSyntaxToken> {
        self.significant_tokens().filter(move |t| t.kind() == kind)
    }

    /// Elements of `container` lacking a separating blank line
    ///
    /// `compute` runs once per container; later calls reuse its answer.
    pub fn unseparated_in(
        &self,
        container: &CsSyntaxNode,
        compute: impl FnOnce(&CsSyntaxNode) -> Vec<CsSyntaxNode>,
    ) -> Rc<[CsSyntaxNode]> {
        if let Some(found) = self.unseparated.borrow().get(container) {
            return Rc::clone(found);
        }
        let found: Rc<[CsSyntaxNode]> = compute(container).into();
        self.unseparated
            .borrow_mut()
            .insert(container.clone(), Rc::clone(&found));
        found
    }

    /// Every gap of the file, from the one before the first token to the
    /// one before end of file
    pub fn gaps(&self) -> Vec<TriviaStream> {
        let mut gaps = Vec::new();
        let mut prev: Option<CsSyntaxToken> = None;
        for token in self.significant_tokens() {
            gaps.push(TriviaStream::between(prev.as_ref(), &token));
            prev = Some(token);
        }
        gaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_report_uses_configured_severity() {
        let tree = SyntaxTree::parse("class A\n{\n\n}\n");
        let settings = LayoutSettings::default();
        let rules = RuleSet::all();
        let file = PathBuf::from("A.cs");
        let ctx = RuleContext::new(&tree, &file, &settings, &rules);

        let diagnostic = ctx.report(RuleId::SA1508, TextRange::new(10.into(), 11.into()));
        assert_eq!(diagnostic.rule_id, "SA1508");
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.location.line, 3);
        assert_eq!(diagnostic.location.column, 1);
        assert!(diagnostic.fixable);
    }

    #[test]
    fn test_gaps_cover_file_start_and_end() {
        let tree = SyntaxTree::parse("\nclass A { }\n");
        let settings = LayoutSettings::default();
        let rules = RuleSet::all();
        let file = PathBuf::from("A.cs");
        let ctx = RuleContext::new(&tree, &file, &settings, &rules);

        let gaps = ctx.gaps();
        assert_eq!(gaps.len(), 5);
        assert!(gaps[0].at_file_start());
        assert!(gaps[4].at_file_end());
        assert_eq!(ctx.tokens_of_kind(CsSyntaxKind::LBrace).count(), 1);
    }

    #[test]
    fn test_unseparated_elements_computed_once_per_container() {
        let tree = SyntaxTree::parse("class A\n{\n    int x;\n}\nclass B\n{\n}\n");
        let settings = LayoutSettings::default();
        let rules = RuleSet::all();
        let file = PathBuf::from("A.cs");
        let ctx = RuleContext::new(&tree, &file, &settings, &rules);

        let classes: Vec<CsSyntaxNode> = ctx
            .root()
            .descendants()
            .filter(|n| n.kind() == CsSyntaxKind::ClassDecl)
            .collect();
        let calls = std::cell::Cell::new(0);
        let count = |c: &CsSyntaxNode| -> Vec<CsSyntaxNode> {
            calls.set(calls.get() + 1);
            c.children().collect()
        };
        let first = ctx.unseparated_in(&classes[0], count);
        let again = ctx.unseparated_in(&classes[0], count);
        assert_eq!(first, again);
        assert_eq!(calls.get(), 1);
        ctx.unseparated_in(&classes[1], count);
        assert_eq!(calls.get(), 2);
    }
}
