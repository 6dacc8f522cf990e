//! Deterministic lookup of the next section a pass will reach.

use crate::core::state::SectionState;
use crate::tree::{SectionId, SectionTree};

/// Find the first `Unknown` section via depth-first traversal in discovery order.
///
/// Returns `None` if no section is left to explore. Terminal subtrees are not
/// descended since the routine skips them.
pub fn leftmost_untested(tree: &SectionTree, from: SectionId) -> Option<SectionId> {
    let state = tree.state(from);
    if state == SectionState::Unknown {
        return Some(from);
    }
    if state.is_tested() {
        return None;
    }

    for child in tree.children(from) {
        if let Some(found) = leftmost_untested(tree, *child) {
            return Some(found);
        }
    }

    None
}
