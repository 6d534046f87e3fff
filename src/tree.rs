//! Tree construction and rendering
//!
//! Converts a flat file selection into a hierarchy of [`TreeNode`]s and
//! renders it as an indented, sorted textual tree. Trees are built fresh per
//! render and never shared.

use std::collections::HashMap;
use std::path::Path;

use crate::repo::FileRecord;

/// Node in the directory tree. Files and directories share the type,
/// distinguished by `is_dir`.
#[derive(Debug)]
pub struct TreeNode {
    pub name: String,
    pub is_dir: bool,
    pub is_python: bool,
    /// Keyed by child name; re-sorted at render time.
    pub children: HashMap<String, TreeNode>,
}

impl TreeNode {
    fn new(name: String, is_dir: bool) -> Self {
        let is_python = name.ends_with(".py");
        Self {
            name,
            is_dir,
            is_python,
            children: HashMap::new(),
        }
    }
}

/// Build a tree from a flat file selection. Intermediate directory nodes are
/// created along each record's relative path; the final segment becomes a
/// file leaf.
pub fn build_tree(root: &Path, files: &[FileRecord]) -> TreeNode {
    let root_name = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    let mut root_node = TreeNode::new(root_name, true);

    for record in files {
        let segments: Vec<String> = record
            .relative_path
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect();
        let Some((file_name, dirs)) = segments.split_last() else {
            continue;
        };

        let mut current = &mut root_node;
        for part in dirs {
            current = current
                .children
                .entry(part.clone())
                .or_insert_with(|| TreeNode::new(part.clone(), true));
        }
        current
            .children
            .insert(file_name.clone(), TreeNode::new(file_name.clone(), false));
    }

    root_node
}

/// Render a tree as text. Directories sort before files, case-insensitively
/// within each group, and carry a trailing `/`. The root is a bare first
/// line; every other node gets a box-drawing connector.
pub fn render_tree(node: &TreeNode) -> String {
    let mut out = String::new();
    render_node(node, "", true, &mut out);
    out
}

fn render_node(node: &TreeNode, prefix: &str, is_last: bool, out: &mut String) {
    let mut children: Vec<&TreeNode> = node.children.values().collect();
    children.sort_by_key(|child| (!child.is_dir, child.name.to_lowercase()));

    if !prefix.is_empty() {
        out.push_str(prefix);
        out.push_str(if is_last { "└── " } else { "├── " });
    }
    out.push_str(&node.name);
    if node.is_dir {
        out.push('/');
    }
    out.push('\n');

    let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
    let last_index = children.len().saturating_sub(1);
    for (index, child) in children.into_iter().enumerate() {
        render_node(child, &child_prefix, index == last_index, out);
    }
}
