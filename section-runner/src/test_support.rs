//! Test-only helpers for constructing section trees and scripts.

use std::fs;
use std::path::{Path, PathBuf};

use crate::tree::SectionTree;

/// Build a tree named `case` from `/`-separated leaf paths.
///
/// Each entry flags whether its leaf is already tested. Branches whose
/// descendants are all tested are promoted, as the driver would have done.
pub fn tree_with_leaves(leaves: &[(&str, bool)]) -> SectionTree {
    let mut tree = SectionTree::new("case");
    for (path, tested) in leaves {
        let mut node = tree.root();
        for segment in path.split('/') {
            node = tree.find_or_add_child(node, segment).0;
        }
        if *tested {
            tree.mark_leaf_tested(node);
        }
    }

    let ids: Vec<_> = tree.ids().collect();
    for id in ids.into_iter().rev() {
        tree.mark_branch_tested_if_complete(id);
    }
    tree
}

/// Temporary directory holding script and config files for a test.
pub struct ScriptDir {
    dir: tempfile::TempDir,
}

impl ScriptDir {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `name` inside the directory and return its path.
    pub fn write(&self, name: &str, contents: &str) -> anyhow::Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}
