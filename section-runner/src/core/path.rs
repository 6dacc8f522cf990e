//! Helpers for rendering deterministic section paths.

use crate::tree::{SectionId, SectionTree};

/// Return the `/`-separated name path to `target`, rooted at the tree root.
pub fn section_path(tree: &SectionTree, target: SectionId) -> Option<String> {
    let mut path = Vec::new();
    if section_path_inner(tree, tree.root(), target, &mut path) {
        return Some(path.join("/"));
    }
    None
}

fn section_path_inner<'a>(
    tree: &'a SectionTree,
    node: SectionId,
    target: SectionId,
    path: &mut Vec<&'a str>,
) -> bool {
    path.push(tree.node(node).name());
    if node == target {
        return true;
    }
    for child in tree.children(node) {
        if section_path_inner(tree, *child, target, path) {
            return true;
        }
    }
    path.pop();
    false
}
