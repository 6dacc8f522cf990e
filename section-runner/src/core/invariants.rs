//! Structural invariants of a section tree.

use std::collections::HashSet;

use crate::core::path::section_path;
use crate::core::state::SectionState;
use crate::tree::{SectionId, SectionTree};

/// Check structural invariants:
/// - Sibling names are unique
/// - Only the root may be in state `Root`; the root never becomes a leaf
/// - A node with children is a `Branch` or `TestedBranch`
/// - A `TestedBranch` has no `Unknown` descendant
/// - Every child points back at its parent
pub fn validate_invariants(tree: &SectionTree) -> Vec<String> {
    let mut errors = Vec::new();
    let root = tree.root();

    match tree.state(root) {
        SectionState::Root | SectionState::Branch | SectionState::TestedBranch => {}
        other => errors.push(format!("root is in state {}", other)),
    }

    for id in tree.ids() {
        validate_node(tree, id, &mut errors);
    }
    errors
}

fn validate_node(tree: &SectionTree, id: SectionId, errors: &mut Vec<String>) {
    let label = || section_path(tree, id).unwrap_or_else(|| format!("#{}", id.index()));
    let node = tree.node(id);

    if id != tree.root() && node.state() == SectionState::Root {
        errors.push(format!("{}: non-root section in state root", label()));
    }

    if !node.children().is_empty()
        && !matches!(
            node.state(),
            SectionState::Branch | SectionState::TestedBranch
        )
    {
        errors.push(format!(
            "{}: has children but state is {}",
            label(),
            node.state()
        ));
    }

    if node.state() == SectionState::TestedBranch && tree.has_untested_work(id) {
        errors.push(format!("{}: tested branch has untested descendants", label()));
    }

    let mut seen = HashSet::new();
    for child in node.children() {
        let child_node = tree.node(*child);
        if !seen.insert(child_node.name()) {
            errors.push(format!(
                "{}: duplicate child section '{}'",
                label(),
                child_node.name()
            ));
        }
        if child_node.parent() != Some(id) {
            errors.push(format!(
                "{}: child '{}' does not point back at its parent",
                label(),
                child_node.name()
            ));
        }
    }
}
