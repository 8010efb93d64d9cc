//! Element Tree
//!
//! Transient arena tree rebuilt from a [`PathMap`](crate::map::PathMap) and
//! consumed by the serializer. Node 0 is the root element.

mod builder;

pub use builder::build;

use std::cmp::Ordering;

use crate::path;

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Attribute captured from an `@name` key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeAttribute {
    pub name: String,
    pub value: String,
    /// Originating key
    pub path: String,
    pub position: Option<u64>,
}

/// An element node in the arena
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Index-stripped name, possibly `prefix:local`
    pub name: String,
    pub value: Option<String>,
    pub attributes: Vec<TreeAttribute>,
    pub children: Vec<NodeId>,
    /// Indexed path identifying this node
    pub path: String,
    /// Document position recorded by the parser, if any
    pub position: Option<u64>,
}

impl TreeNode {
    fn new(name: &str, path: String, position: Option<u64>) -> Self {
        TreeNode {
            name: name.to_string(),
            value: None,
            attributes: Vec::new(),
            children: Vec::new(),
            path,
            position,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<TreeNode>,
    namespaces: Vec<(String, String)>,
}

impl Tree {
    pub const ROOT: NodeId = 0;

    pub fn root(&self) -> &TreeNode {
        &self.nodes[Self::ROOT as usize]
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Namespace declarations to re-emit on the root element
    pub fn namespaces(&self) -> &[(String, String)] {
        &self.namespaces
    }

    /// Children of `id` in emission order
    pub fn sorted_children(&self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.get(id) else {
            return Vec::new();
        };
        let mut children = node.children.clone();
        children.sort_by(|&a, &b| match (self.get(a), self.get(b)) {
            (Some(a), Some(b)) => sibling_order(a.position, &a.path, b.position, &b.path),
            _ => a.cmp(&b),
        });
        children
    }

    fn push(&mut self, parent: NodeId, node: TreeNode) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        if let Some(p) = self.nodes.get_mut(parent as usize) {
            p.children.push(id);
        }
        id
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id as usize)
    }
}

/// Sibling ordering: recorded document positions first, in position order,
/// then unpositioned paths by the fallback path comparator.
pub fn sibling_order(a_pos: Option<u64>, a_path: &str, b_pos: Option<u64>, b_path: &str) -> Ordering {
    match (a_pos, b_pos) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a_path.cmp(b_path)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => path::compare_paths(a_path, b_path),
    }
}
