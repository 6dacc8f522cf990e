//! Enter/Leave traversal protocol for a single pass.
//!
//! A cursor lives for exactly one invocation of the test routine. All
//! progress that must survive to the next pass is written into the tree.

use crate::core::state::SectionState;
use crate::core::types::Admission;
use crate::tree::{SectionId, SectionTree};

/// Position of one pass inside the section tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassCursor {
    current: SectionId,
    tested_leaf: Option<SectionId>,
}

impl PassCursor {
    /// Start a pass at the root of `tree`.
    pub fn new(tree: &SectionTree) -> Self {
        Self {
            current: tree.root(),
            tested_leaf: None,
        }
    }

    /// Node whose body is currently executing.
    pub fn current(&self) -> SectionId {
        self.current
    }

    /// Leaf completed during this pass, if any.
    pub fn tested_leaf(&self) -> Option<SectionId> {
        self.tested_leaf
    }

    /// Resolve `name` under the current node and decide whether to run it.
    ///
    /// The section is discovered even when skipped. Once a leaf has been
    /// completed in this pass no further section is admitted, so each pass
    /// finishes at most one new leaf.
    pub fn enter(&mut self, tree: &mut SectionTree, name: &str) -> Admission {
        let (node, _) = tree.find_or_add_child(self.current, name);
        if self.tested_leaf.is_some() || !tree.should_run(node) {
            return Admission::Skip;
        }
        self.current = node;
        Admission::Execute(node)
    }

    /// Close the current section and ascend to its parent.
    ///
    /// Returns the section that was left, or `None` when the cursor is
    /// already at the root (an unmatched leave, which changes nothing).
    pub fn leave(&mut self, tree: &mut SectionTree) -> Option<SectionId> {
        let node = self.current;
        let parent = tree.parent(node)?;

        if tree.state(node) == SectionState::Branch {
            tree.mark_branch_tested_if_complete(node);
        } else if tree.mark_leaf_tested(node) {
            self.tested_leaf = Some(node);
        }

        self.current = parent;
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enter_ok(cursor: &mut PassCursor, tree: &mut SectionTree, name: &str) -> SectionId {
        match cursor.enter(tree, name) {
            Admission::Execute(id) => id,
            Admission::Skip => panic!("expected '{name}' to execute"),
        }
    }

    /// Two top-level siblings take one pass each.
    #[test]
    fn siblings_are_explored_one_per_pass() {
        let mut tree = SectionTree::new("case");
        let root = tree.root();

        let mut pass1 = PassCursor::new(&tree);
        let a = enter_ok(&mut pass1, &mut tree, "A");
        assert_eq!(pass1.leave(&mut tree), Some(a));
        assert_eq!(pass1.enter(&mut tree, "B"), Admission::Skip);
        assert_eq!(pass1.current(), root);
        assert_eq!(pass1.tested_leaf(), Some(a));

        let b = tree.children(root)[1];
        assert_eq!(tree.state(root), SectionState::Branch);
        assert_eq!(tree.state(a), SectionState::TestedLeaf);
        assert_eq!(tree.state(b), SectionState::Unknown);
        assert!(tree.has_untested_work(root));

        let mut pass2 = PassCursor::new(&tree);
        assert_eq!(pass2.enter(&mut tree, "A"), Admission::Skip);
        assert_eq!(enter_ok(&mut pass2, &mut tree, "B"), b);
        pass2.leave(&mut tree);
        tree.mark_branch_tested_if_complete(root);

        assert_eq!(tree.state(b), SectionState::TestedLeaf);
        assert_eq!(tree.state(root), SectionState::TestedBranch);
        assert!(!tree.has_untested_work(root));
    }

    /// A branch with a single nested leaf completes in one pass.
    #[test]
    fn nested_leaf_completes_branch_on_leave() {
        let mut tree = SectionTree::new("case");
        let mut cursor = PassCursor::new(&tree);

        let a = enter_ok(&mut cursor, &mut tree, "A");
        assert_eq!(tree.state(a), SectionState::Unknown);
        let a1 = enter_ok(&mut cursor, &mut tree, "A1");
        assert_eq!(tree.state(a), SectionState::Branch);

        cursor.leave(&mut tree);
        assert_eq!(tree.state(a1), SectionState::TestedLeaf);
        cursor.leave(&mut tree);
        assert_eq!(tree.state(a), SectionState::TestedBranch);
        assert!(!tree.has_untested_work(tree.root()));
    }

    /// A pass that aborts before leaving keeps the nodes it entered open.
    #[test]
    fn aborted_pass_leaves_sections_retryable() {
        let mut tree = SectionTree::new("case");
        let (a, a1) = {
            let mut cursor = PassCursor::new(&tree);
            let a = enter_ok(&mut cursor, &mut tree, "A");
            let a1 = enter_ok(&mut cursor, &mut tree, "A1");
            (a, a1)
        };

        assert_eq!(tree.state(a1), SectionState::Unknown);
        assert_eq!(tree.state(a), SectionState::Branch);

        let mut retry = PassCursor::new(&tree);
        assert_eq!(enter_ok(&mut retry, &mut tree, "A"), a);
        assert_eq!(enter_ok(&mut retry, &mut tree, "A1"), a1);
        retry.leave(&mut tree);
        retry.leave(&mut tree);
        assert_eq!(tree.state(a), SectionState::TestedBranch);
    }

    #[test]
    fn skipped_enter_does_not_move_cursor() {
        let mut tree = SectionTree::new("case");
        let mut cursor = PassCursor::new(&tree);
        let a = enter_ok(&mut cursor, &mut tree, "A");
        cursor.leave(&mut tree);
        assert_eq!(tree.state(a), SectionState::TestedLeaf);

        let mut next = PassCursor::new(&tree);
        assert_eq!(next.enter(&mut tree, "A"), Admission::Skip);
        assert_eq!(next.current(), tree.root());
        assert_eq!(next.tested_leaf(), None);
    }

    #[test]
    fn leave_at_root_is_a_no_op() {
        let mut tree = SectionTree::new("case");
        let mut cursor = PassCursor::new(&tree);
        assert_eq!(cursor.leave(&mut tree), None);
        assert_eq!(tree.state(tree.root()), SectionState::Root);
        assert_eq!(cursor.current(), tree.root());
    }

    /// A section declared repeatedly in one scope resolves to the same node.
    #[test]
    fn repeated_declaration_reuses_node() {
        let mut tree = SectionTree::new("case");
        let mut cursor = PassCursor::new(&tree);
        let first = enter_ok(&mut cursor, &mut tree, "loop");
        cursor.leave(&mut tree);
        for _ in 0..3 {
            assert_eq!(cursor.enter(&mut tree, "loop"), Admission::Skip);
        }
        assert_eq!(tree.children(tree.root()), &[first]);
        assert!(!tree.has_untested_work(tree.root()));
    }

    /// A branch left while a sibling subtree is still unknown stays a branch.
    #[test]
    fn branch_with_unknown_child_is_revisited() {
        let mut tree = SectionTree::new("case");
        let mut cursor = PassCursor::new(&tree);
        let a = enter_ok(&mut cursor, &mut tree, "A");
        enter_ok(&mut cursor, &mut tree, "A1");
        cursor.leave(&mut tree);
        assert_eq!(cursor.enter(&mut tree, "A2"), Admission::Skip);
        cursor.leave(&mut tree);
        assert_eq!(tree.state(a), SectionState::Branch);

        let mut next = PassCursor::new(&tree);
        assert_eq!(enter_ok(&mut next, &mut tree, "A"), a);
        assert_eq!(next.enter(&mut tree, "A1"), Admission::Skip);
        enter_ok(&mut next, &mut tree, "A2");
        next.leave(&mut tree);
        next.leave(&mut tree);
        assert_eq!(tree.state(a), SectionState::TestedBranch);
    }
}
