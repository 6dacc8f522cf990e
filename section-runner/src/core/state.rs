//! Progress states for section nodes.
//!
//! States only move forward. The two comparisons the traversal needs are
//! exposed as named predicates so callers never rely on discriminant order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Progress state of a single section node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionState {
    /// Initial state of the tree root.
    Root,
    /// Declared but not yet executed to completion.
    Unknown,
    /// Has at least one nested section.
    Branch,
    /// A branch whose descendants are all tested.
    TestedBranch,
    /// Executed as a leaf; never runs again.
    TestedLeaf,
}

impl SectionState {
    /// True if a node in this state may have its body executed in a pass.
    pub fn is_admissible(self) -> bool {
        match self {
            SectionState::Root | SectionState::Unknown | SectionState::Branch => true,
            SectionState::TestedBranch | SectionState::TestedLeaf => false,
        }
    }

    /// True if the node has not yet been classified as a branch or a tested leaf.
    ///
    /// Only these states may gain `Branch` on child discovery or be recorded
    /// as a tested leaf.
    pub fn is_unclassified(self) -> bool {
        match self {
            SectionState::Root | SectionState::Unknown => true,
            SectionState::Branch | SectionState::TestedBranch | SectionState::TestedLeaf => false,
        }
    }

    /// True if the node is in a terminal state.
    pub fn is_tested(self) -> bool {
        !self.is_admissible()
    }

    /// True if `next` is reachable from `self` through legal promotions
    /// (including staying put).
    pub fn can_advance_to(self, next: SectionState) -> bool {
        use SectionState as S;

        match (self, next) {
            (from, to) if from == to => true,
            (S::Root, S::Branch | S::TestedBranch | S::TestedLeaf) => true,
            (S::Unknown, S::Branch | S::TestedBranch | S::TestedLeaf) => true,
            (S::Branch, S::TestedBranch) => true,
            _ => false,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SectionState::Root => "root",
            SectionState::Unknown => "unknown",
            SectionState::Branch => "branch",
            SectionState::TestedBranch => "tested_branch",
            SectionState::TestedLeaf => "tested_leaf",
        }
    }
}

impl fmt::Display for SectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
