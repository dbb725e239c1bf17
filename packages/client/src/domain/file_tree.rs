//! Flat path map → hierarchical tree.
//!
//! The tree is rebuilt from scratch on every read and never patched in place.
//! Siblings are always ordered folders first, then by name.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::room::{FileKind, FileMap, PATH_SEPARATOR};

/// A node of the derived file tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTreeNode {
    /// Full path of the node
    pub id: String,
    /// Last path segment
    pub name: String,
    pub kind: FileKind,
    children: Vec<FileTreeNode>,
}

impl FileTreeNode {
    /// Children in display order.
    pub fn children(&self) -> &[FileTreeNode] {
        &self.children
    }

    /// Look up a direct child by segment name.
    pub fn child(&self, name: &str) -> Option<&FileTreeNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Root of the derived tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    roots: Vec<FileTreeNode>,
}

impl FileTree {
    pub fn roots(&self) -> &[FileTreeNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Find a node by its full path.
    pub fn find(&self, path: &str) -> Option<&FileTreeNode> {
        let mut segments = split_path(path);
        let first = segments.next()?;
        let mut node = self.roots.iter().find(|n| n.name == first)?;
        for segment in segments {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// Depth-first walk in display order, yielding `(depth, node)`.
    pub fn walk(&self) -> Vec<(usize, &FileTreeNode)> {
        fn visit<'a>(
            node: &'a FileTreeNode,
            depth: usize,
            out: &mut Vec<(usize, &'a FileTreeNode)>,
        ) {
            out.push((depth, node));
            for child in &node.children {
                visit(child, depth + 1, out);
            }
        }

        let mut out = Vec::new();
        for root in &self.roots {
            visit(root, 0, &mut out);
        }
        out
    }
}

/// Mutable node used only while building.
struct Draft {
    id: String,
    kind: FileKind,
    declared: bool,
    children: BTreeMap<String, Draft>,
}

impl Draft {
    fn folder(id: String) -> Self {
        Self {
            id,
            kind: FileKind::Folder,
            declared: false,
            children: BTreeMap::new(),
        }
    }

    fn finish(self, name: String) -> FileTreeNode {
        let mut children: Vec<FileTreeNode> = self
            .children
            .into_iter()
            .map(|(name, draft)| draft.finish(name))
            .collect();
        children.sort_by(sibling_order);
        FileTreeNode {
            id: self.id,
            name,
            kind: self.kind,
            children,
        }
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split(PATH_SEPARATOR).filter(|segment| !segment.is_empty())
}

/// Folders before files, then lexicographic by name.
fn sibling_order(a: &FileTreeNode, b: &FileTreeNode) -> Ordering {
    b.kind
        .is_folder()
        .cmp(&a.kind.is_folder())
        .then_with(|| a.name.cmp(&b.name))
}

/// Build the hierarchical tree for a flat file map.
///
/// Missing intermediate folders are synthesized; the terminal segment of every path
/// takes the record's declared kind. Empty segments are skipped.
pub fn build_tree(files: &FileMap) -> FileTree {
    let mut roots: BTreeMap<String, Draft> = BTreeMap::new();

    for (path, record) in files {
        let segments: Vec<&str> = split_path(path).collect();
        let Some(last) = segments.len().checked_sub(1) else {
            continue;
        };

        let mut level = &mut roots;
        for (index, segment) in segments.iter().enumerate() {
            let id = segments[..=index].join("/");
            let node = level
                .entry(segment.to_string())
                .or_insert_with(|| Draft::folder(id));
            if index == last && !node.declared {
                node.kind = record.kind;
                node.declared = true;
            }
            level = &mut node.children;
        }
    }

    let mut nodes: Vec<FileTreeNode> = roots
        .into_iter()
        .map(|(name, draft)| draft.finish(name))
        .collect();
    nodes.sort_by(sibling_order);
    FileTree { roots: nodes }
}
