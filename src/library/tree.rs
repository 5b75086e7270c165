use super::model::AudioFile;

/// Index of a node in the [`FileTree`] arena. Ids are only meaningful within
/// the tree that produced them and do not survive a rebuild; the stable
/// identity of a node is its `path` string.
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Folder,
    File,
}

/// One node of the derived hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// Single path segment (folder or file name), taken literally.
    pub name: String,
    /// Full slash-joined path from the root; empty for the root itself.
    pub path: String,
    pub kind: NodeKind,
    /// Child ids in first-insertion order. Always empty for files.
    pub children: Vec<NodeId>,
    /// The backing record, present exactly on file nodes.
    pub file: Option<AudioFile>,
}

/// Hierarchical view of a flat listing, stored as a flat arena.
///
/// The tree is rebuilt wholesale whenever the underlying listing changes;
/// nodes are never patched in place, so holding on to a `NodeId` across a
/// rebuild is a bug on the caller's side.
#[derive(Debug, Clone, PartialEq)]
pub struct FileTree {
    nodes: Vec<TreeNode>,
}

impl Default for FileTree {
    fn default() -> Self {
        Self::build(&[])
    }
}

impl FileTree {
    pub const ROOT: NodeId = 0;

    /// Build the hierarchy for `files` by splitting each `name` on `/`.
    ///
    /// Deterministic for a fixed input order: folders are created on first
    /// traversal and children keep first-insertion order. A later record
    /// whose full name is already present is ignored (first occurrence wins).
    /// Segments are not sanitized; empty segments produce nodes literally
    /// named `""`.
    pub fn build(files: &[AudioFile]) -> Self {
        let mut nodes = vec![TreeNode {
            name: "root".to_string(),
            path: String::new(),
            kind: NodeKind::Folder,
            children: Vec::new(),
            file: None,
        }];

        for file in files {
            let segments: Vec<&str> = file.name.split('/').collect();
            let last = segments.len() - 1;
            let mut current = Self::ROOT;

            for (depth, segment) in segments.iter().enumerate() {
                let kind = if depth == last {
                    NodeKind::File
                } else {
                    NodeKind::Folder
                };

                // Reuse requires the same name *and* kind: a file sharing its
                // name with a folder at the same level stays a separate node.
                let found = nodes[current]
                    .children
                    .iter()
                    .copied()
                    .find(|&id| nodes[id].name == *segment && nodes[id].kind == kind);

                let id = match found {
                    Some(id) => id,
                    None => {
                        let path = if nodes[current].path.is_empty() {
                            (*segment).to_string()
                        } else {
                            format!("{}/{}", nodes[current].path, segment)
                        };
                        let id = nodes.len();
                        nodes.push(TreeNode {
                            name: (*segment).to_string(),
                            path,
                            kind,
                            children: Vec::new(),
                            file: (kind == NodeKind::File).then(|| file.clone()),
                        });
                        nodes[current].children.push(id);
                        id
                    }
                };

                if kind == NodeKind::Folder {
                    current = id;
                }
            }
        }

        Self { nodes }
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the listing produced no nodes below the root.
    pub fn is_empty(&self) -> bool {
        self.nodes[Self::ROOT].children.is_empty()
    }

    /// First node with the given full path, if any. When a file and a folder
    /// share a path the first-inserted one wins.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.path == path)
    }

    /// Every file node, in first-insertion order.
    pub fn files(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter().filter(|n| n.kind == NodeKind::File)
    }
}
