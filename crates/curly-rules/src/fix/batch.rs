//! Merging the fixes of one pass into a single edit set

use curly_core::{EditSet, Location, SyntaxTree, TriviaEdit};
use serde::Serialize;
use tracing::debug;

use super::Fix;

/// A fix dropped because its edits collide with an earlier fix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixConflict {
    pub rule_id: String,
    pub location: Location,
    /// Rule of the fix that was kept
    pub conflicts_with: String,
}

/// Edits accepted for one pass
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub edits: EditSet,
    pub applied: Vec<Fix>,
    pub conflicts: Vec<FixConflict>,
}

/// Merge fixes in source order
///
/// Identical edits from different fixes are applied once. A fix with an
/// edit that overlaps or touches an already accepted, different edit is
/// dropped and recorded as a conflict; a later pass may retry it.
///
/// Fixes take their indentation from the lines of `tree`, so a fix whose new
/// edits land on a line another accepted fix already rewrites is dropped as
/// well. The outer construct is fixed first and the inner one is recomputed
/// against the rewritten lines in the next pass.
pub fn merge_fixes(mut fixes: Vec<Fix>, tree: &SyntaxTree) -> BatchOutcome {
    fixes.sort_by(|a, b| {
        let start = |f: &Fix| f.edits.covering_range().map(|r| r.start());
        start(a)
            .cmp(&start(b))
            .then_with(|| a.rule_id.cmp(&b.rule_id))
    });

    let mut outcome = BatchOutcome::default();
    let mut owners: Vec<(TriviaEdit, String)> = Vec::new();
    let mut owned_lines: Vec<((usize, usize), String)> = Vec::new();

    for fix in fixes {
        let mut fresh = Vec::new();
        let mut collision = None;
        for edit in fix.edits.iter() {
            if let Some((_, owner)) = owners
                .iter()
                .find(|(accepted, _)| accepted != edit && accepted.touches(edit))
            {
                collision = Some(owner.clone());
                break;
            }
            if !owners.iter().any(|(accepted, _)| accepted == edit) && !fresh.contains(edit) {
                fresh.push(edit.clone());
            }
        }
        if collision.is_none() {
            collision = fresh.iter().find_map(|edit| {
                let (first, last) = edit_lines(tree, edit);
                owned_lines
                    .iter()
                    .find(|((start, end), _)| first <= *end && *start <= last)
                    .map(|(_, owner)| owner.clone())
            });
        }

        if let Some(owner) = collision {
            debug!(
                "Dropping {} fix at {}:{}, it collides with {}",
                fix.rule_id, fix.location.line, fix.location.column, owner
            );
            outcome.conflicts.push(FixConflict {
                rule_id: fix.rule_id.clone(),
                location: fix.location.clone(),
                conflicts_with: owner,
            });
            continue;
        }

        for edit in fresh {
            owned_lines.push((edit_lines(tree, &edit), fix.rule_id.clone()));
            outcome.edits.push(edit.clone());
            owners.push((edit, fix.rule_id.clone()));
        }
        outcome.applied.push(fix);
    }
    outcome
}

/// First and last 0-based line an edit rewrites
fn edit_lines(tree: &SyntaxTree, edit: &TriviaEdit) -> (usize, usize) {
    (tree.start_line(edit.range), tree.end_line(edit.range))
}
