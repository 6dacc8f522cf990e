//! Section tree: an arena of named nodes addressed by stable indices.
//!
//! The root owns every node. Parent links are plain indices and never keep a
//! node alive on their own; dropping the tree releases the whole arena.

use serde::{Deserialize, Serialize};

use crate::core::state::SectionState;

/// Stable handle to a node inside one [`SectionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(usize);

impl SectionId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionNode {
    name: String,
    state: SectionState,
    parent: Option<SectionId>,
    children: Vec<SectionId>,
}

impl SectionNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SectionState {
        self.state
    }

    pub fn parent(&self) -> Option<SectionId> {
        self.parent
    }

    /// Children in first-discovery order.
    pub fn children(&self) -> &[SectionId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub struct SectionTree {
    nodes: Vec<SectionNode>,
}

impl SectionTree {
    /// Create a tree holding only a `Root` node named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            nodes: vec![SectionNode {
                name: name.into(),
                state: SectionState::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> SectionId {
        SectionId(0)
    }

    pub fn node(&self, id: SectionId) -> &SectionNode {
        &self.nodes[id.0]
    }

    pub fn state(&self, id: SectionId) -> SectionState {
        self.nodes[id.0].state
    }

    pub fn parent(&self, id: SectionId) -> Option<SectionId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: SectionId) -> &[SectionId] {
        &self.nodes[id.0].children
    }

    /// Number of nodes, root included.
    pub fn section_count(&self) -> usize {
        self.nodes.len()
    }

    /// All node ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = SectionId> + '_ {
        (0..self.nodes.len()).map(SectionId)
    }

    /// Look up `name` among the children of `parent`, creating it if absent.
    ///
    /// Returns the node and whether it was created by this call. Creating a
    /// child promotes an unclassified parent to `Branch`.
    pub fn find_or_add_child(&mut self, parent: SectionId, name: &str) -> (SectionId, bool) {
        if let Some(existing) = self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].name == name)
        {
            return (existing, false);
        }

        let id = SectionId(self.nodes.len());
        self.nodes.push(SectionNode {
            name: name.to_string(),
            state: SectionState::Unknown,
            parent: Some(parent),
            children: Vec::new(),
        });

        let parent_node = &mut self.nodes[parent.0];
        parent_node.children.push(id);
        if parent_node.state.is_unclassified() {
            self.promote(parent, SectionState::Branch);
        }
        (id, true)
    }

    /// True if the node's body may execute in the current pass.
    pub fn should_run(&self, id: SectionId) -> bool {
        self.state(id).is_admissible()
    }

    /// Record `id` as a completed leaf.
    ///
    /// Returns `false` without changing anything when the node has already
    /// been classified (it gained children, or was already tested).
    pub fn mark_leaf_tested(&mut self, id: SectionId) -> bool {
        if !self.state(id).is_unclassified() {
            return false;
        }
        self.promote(id, SectionState::TestedLeaf);
        true
    }

    /// Promote a `Branch` to `TestedBranch` once no descendant is `Unknown`.
    pub fn mark_branch_tested_if_complete(&mut self, id: SectionId) {
        if self.state(id) == SectionState::Branch && !self.has_untested_work(id) {
            self.promote(id, SectionState::TestedBranch);
        }
    }

    /// True if `id` or any of its descendants is still `Unknown`.
    pub fn has_untested_work(&self, id: SectionId) -> bool {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let node = &self.nodes[next.0];
            if node.state == SectionState::Unknown {
                return true;
            }
            stack.extend(node.children.iter().copied());
        }
        false
    }

    /// True once no section anywhere in the tree remains unexplored.
    pub fn is_complete(&self) -> bool {
        !self.has_untested_work(self.root())
    }

    /// Owned nested copy of the tree, suitable for reports and assertions.
    pub fn snapshot(&self) -> SectionSnapshot {
        self.snapshot_from(self.root())
    }

    fn snapshot_from(&self, id: SectionId) -> SectionSnapshot {
        let node = &self.nodes[id.0];
        SectionSnapshot {
            name: node.name.clone(),
            state: node.state,
            children: node
                .children
                .iter()
                .map(|child| self.snapshot_from(*child))
                .collect(),
        }
    }

    fn promote(&mut self, id: SectionId, next: SectionState) {
        let node = &mut self.nodes[id.0];
        debug_assert!(
            node.state.can_advance_to(next),
            "illegal section transition {} -> {}",
            node.state,
            next
        );
        node.state = next;
    }
}

/// Nested, owned view of a section tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSnapshot {
    pub name: String,
    pub state: SectionState,
    pub children: Vec<SectionSnapshot>,
}

impl SectionSnapshot {
    /// Find a direct child by name.
    pub fn child(&self, name: &str) -> Option<&SectionSnapshot> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Walk a `/`-separated path of child names below this node.
    pub fn descend(&self, path: &str) -> Option<&SectionSnapshot> {
        path.split('/')
            .try_fold(self, |node, segment| node.child(segment))
    }
}
