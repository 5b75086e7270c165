//! Tree browsing contract: expansion state keyed by stable node paths, click
//! intents, and the plain-text rendering the CLI uses.

use std::collections::HashMap;

use crate::library::{FileTree, NodeId, NodeKind, TreeNode};

/// Shown instead of a tree when the listing is empty.
pub const EMPTY_MESSAGE: &str = "No audio files found";

/// What interacting with a file node should do.
///
/// Clicking the file that is already playing toggles playback instead of
/// re-selecting it, so playback can resume without losing position; any
/// other file is selected unconditionally.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeEvent {
    Select(crate::library::AudioFile),
    ToggleCurrent,
    Delete(String),
}

/// Expand/collapse state.
///
/// Keyed by each node's stable path string, not by `NodeId`, so the state
/// survives the wholesale tree rebuilds that follow every listing change.
/// Folder levels shallower than `expand_depth` start expanded.
#[derive(Debug, Clone)]
pub struct TreeViewState {
    expand_depth: usize,
    overrides: HashMap<String, bool>,
}

impl TreeViewState {
    pub fn new(expand_depth: usize) -> Self {
        Self {
            expand_depth,
            overrides: HashMap::new(),
        }
    }

    pub fn is_expanded(&self, depth: usize, path: &str) -> bool {
        match self.overrides.get(path) {
            Some(&expanded) => expanded,
            None => depth < self.expand_depth,
        }
    }

    pub fn toggle(&mut self, depth: usize, path: &str) {
        let next = !self.is_expanded(depth, path);
        self.overrides.insert(path.to_string(), next);
    }
}

/// Map a click on `node` to its intent, given the currently playing path.
/// Folder nodes produce no event here; they only expand or collapse.
pub fn click_file(node: &TreeNode, currently_playing: Option<&str>) -> Option<TreeEvent> {
    let file = node.file.as_ref()?;
    if currently_playing == Some(file.path.as_str()) {
        Some(TreeEvent::ToggleCurrent)
    } else {
        Some(TreeEvent::Select(file.clone()))
    }
}

/// Delete intent for a file node. Folders cannot be deleted.
pub fn delete_file(node: &TreeNode) -> Option<TreeEvent> {
    node.file
        .as_ref()
        .map(|f| TreeEvent::Delete(f.name.clone()))
}

/// Render the tree as indented text lines, honoring expansion state. An
/// empty tree renders the empty-state message rather than nothing.
pub fn render(tree: &FileTree, state: &TreeViewState) -> Vec<String> {
    if tree.is_empty() {
        return vec![EMPTY_MESSAGE.to_string()];
    }

    let mut lines = Vec::new();
    render_level(tree, state, &tree.root().children, 0, &mut lines);
    lines
}

fn render_level(
    tree: &FileTree,
    state: &TreeViewState,
    children: &[NodeId],
    depth: usize,
    lines: &mut Vec<String>,
) {
    for &id in children {
        let node = tree.node(id);
        let indent = "  ".repeat(depth);
        match node.kind {
            NodeKind::Folder => {
                let expanded = state.is_expanded(depth, &node.path);
                let marker = if expanded { "v" } else { ">" };
                lines.push(format!("{indent}{marker} {}/", node.name));
                if expanded {
                    render_level(tree, state, &node.children, depth + 1, lines);
                }
            }
            NodeKind::File => lines.push(format!("{indent}  {}", node.name)),
        }
    }
}
