//! Per-invocation context handed to a test routine.
//!
//! A [`Pass`] borrows the section tree for the duration of one invocation and
//! drives the Enter/Leave protocol on the routine's behalf.

use anyhow::Result;
use tracing::{debug, trace};

use crate::core::cursor::PassCursor;
use crate::core::path::section_path;
use crate::core::types::Admission;
use crate::tree::{SectionId, SectionTree};

/// What a pass changed in the tree, reported when the pass ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    /// Leaf completed during the pass.
    pub tested_leaf: Option<SectionId>,
    /// Innermost section the routine was executing when it aborted.
    pub aborted_in: Option<SectionId>,
}

pub struct Pass<'t> {
    tree: &'t mut SectionTree,
    cursor: PassCursor,
    index: u32,
}

impl<'t> Pass<'t> {
    /// Start pass number `index` (1-indexed) at the root of `tree`.
    pub fn new(tree: &'t mut SectionTree, index: u32) -> Self {
        let cursor = PassCursor::new(tree);
        Self {
            tree,
            cursor,
            index,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn tree(&self) -> &SectionTree {
        self.tree
    }

    /// Section whose body is currently executing (the root between sections).
    pub fn current(&self) -> SectionId {
        self.cursor.current()
    }

    /// Path of the section currently executing.
    pub fn current_path(&self) -> String {
        self.path_of(self.cursor.current())
    }

    /// Cross into section `name`. An `Execute` admission must be paired with
    /// exactly one [`Pass::leave`].
    pub fn enter(&mut self, name: &str) -> Admission {
        let admission = self.cursor.enter(self.tree, name);
        trace!(
            pass = self.index,
            section = name,
            execute = admission.should_execute(),
            "enter section"
        );
        admission
    }

    /// Leave the section entered last.
    pub fn leave(&mut self) -> Option<SectionId> {
        let left = self.cursor.leave(self.tree);
        if let Some(id) = left {
            trace!(
                pass = self.index,
                section = self.tree.node(id).name(),
                state = %self.tree.state(id),
                "leave section"
            );
        }
        left
    }

    /// Run `body` as section `name` if the tree admits it in this pass.
    ///
    /// Returns `Ok(false)` when skipped. An error from `body` is returned
    /// without leaving the section, so the section stays open for a later
    /// pass.
    pub fn section<F>(&mut self, name: &str, body: F) -> Result<bool>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if !self.enter(name).should_execute() {
            return Ok(false);
        }
        body(self)?;
        self.leave();
        Ok(true)
    }

    /// Finish a pass whose routine returned normally.
    pub fn complete(mut self) -> PassSummary {
        let root = self.tree.root();
        if self.cursor.current() != root {
            debug!(
                pass = self.index,
                section = %self.current_path(),
                "pass returned with unbalanced sections"
            );
        }
        self.tree.mark_branch_tested_if_complete(root);
        PassSummary {
            tested_leaf: self.cursor.tested_leaf(),
            aborted_in: None,
        }
    }

    /// Finish a pass whose routine aborted.
    pub fn abort(self) -> PassSummary {
        PassSummary {
            tested_leaf: self.cursor.tested_leaf(),
            aborted_in: Some(self.cursor.current()),
        }
    }

    fn path_of(&self, id: SectionId) -> String {
        section_path(self.tree, id).unwrap_or_else(|| format!("#{}", id.index()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::SectionState;
    use anyhow::bail;

    #[test]
    fn section_runs_body_and_leaves() {
        let mut tree = SectionTree::new("case");
        let mut pass = Pass::new(&mut tree, 1);
        let mut ran = false;
        let executed = pass
            .section("A", |_| {
                ran = true;
                Ok(())
            })
            .expect("section");
        assert!(executed);
        assert!(ran);
        let summary = pass.complete();

        let a = tree.children(tree.root())[0];
        assert_eq!(summary.tested_leaf, Some(a));
        assert_eq!(tree.state(a), SectionState::TestedLeaf);
        assert_eq!(tree.state(tree.root()), SectionState::TestedBranch);
    }

    #[test]
    fn nested_sections_report_current_path() {
        let mut tree = SectionTree::new("case");
        let mut pass = Pass::new(&mut tree, 1);
        let mut seen = String::new();
        pass.section("A", |p| {
            p.section("A1", |p| {
                seen = p.current_path();
                assert_eq!(p.tree().section_count(), 3);
                Ok(())
            })?;
            Ok(())
        })
        .expect("sections");
        assert_eq!(seen, "case/A/A1");
        assert_eq!(pass.current_path(), "case");
    }

    #[test]
    fn failing_body_keeps_section_open() {
        let mut tree = SectionTree::new("case");
        let mut pass = Pass::new(&mut tree, 1);
        let err = pass
            .section("A", |p| {
                p.section("A1", |_| bail!("boom"))?;
                Ok(())
            })
            .expect_err("body fails");
        assert_eq!(err.to_string(), "boom");
        assert_eq!(pass.current_path(), "case/A/A1");
        let summary = pass.abort();

        let a = tree.children(tree.root())[0];
        let a1 = tree.children(a)[0];
        assert_eq!(summary.aborted_in, Some(a1));
        assert_eq!(summary.tested_leaf, None);
        assert_eq!(tree.state(a), SectionState::Branch);
        assert_eq!(tree.state(a1), SectionState::Unknown);
        assert_eq!(tree.state(tree.root()), SectionState::Branch);
    }

    #[test]
    fn skipped_section_does_not_run_body() {
        let mut tree = SectionTree::new("case");
        {
            let mut pass = Pass::new(&mut tree, 1);
            pass.section("A", |_| Ok(())).expect("A");
            let executed = pass
                .section("B", |_| panic!("B must not run in the first pass"))
                .expect("B");
            assert!(!executed);
            pass.complete();
        }
        assert!(tree.has_untested_work(tree.root()));
    }

    #[test]
    fn pass_without_sections_leaves_root_untouched() {
        let mut tree = SectionTree::new("case");
        let summary = Pass::new(&mut tree, 1).complete();
        assert_eq!(summary.tested_leaf, None);
        assert_eq!(tree.state(tree.root()), SectionState::Root);
        assert!(tree.is_complete());
    }
}
