//! Index-addressed tree snapshots.
//!
//! Tree generators keep their nodes in an arena and refer to them by
//! [`NodeId`]. A [`TreeShape`] copies the live part of that arena so a step
//! can carry the structure it produced without sharing anything mutable.

use serde::{Deserialize, Serialize};

/// Arena index of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position of this node in its arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of a tree snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeNode {
    pub id: NodeId,
    pub value: i64,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub height: u32,
}

/// Snapshot of a binary tree, nodes sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeShape {
    pub root: Option<NodeId>,
    pub nodes: Vec<ShapeNode>,
}

impl TreeShape {
    /// Build a snapshot; nodes are sorted by id so lookups can bisect.
    pub fn new(root: Option<NodeId>, mut nodes: Vec<ShapeNode>) -> Self {
        nodes.sort_by_key(|n| n.id);
        Self { root, nodes }
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&ShapeNode> {
        self.nodes
            .binary_search_by_key(&id, |n| n.id)
            .ok()
            .map(|i| &self.nodes[i])
    }

    /// Value stored at the root.
    pub fn root_value(&self) -> Option<i64> {
        self.root.and_then(|id| self.node(id)).map(|n| n.value)
    }

    /// Find the node holding `value`, following BST order from the root.
    pub fn find(&self, value: i64) -> Option<NodeId> {
        let mut cursor = self.root;
        while let Some(node) = cursor.and_then(|id| self.node(id)) {
            if value == node.value {
                return Some(node.id);
            }
            cursor = if value < node.value { node.left } else { node.right };
        }
        None
    }

    /// Values in in-order sequence.
    pub fn in_order(&self) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = Vec::new();
        let mut cursor = self.root;

        loop {
            while let Some(node) = cursor.and_then(|id| self.node(id)) {
                stack.push(node);
                cursor = node.left;
            }
            match stack.pop() {
                Some(node) => {
                    out.push(node.value);
                    cursor = node.right;
                }
                None => break,
            }
        }
        out
    }

    /// Height of the tree (0 when empty).
    pub fn height(&self) -> u32 {
        self.root
            .and_then(|id| self.node(id))
            .map_or(0, |n| n.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: u32, value: i64) -> ShapeNode {
        ShapeNode {
            id: NodeId(id),
            value,
            left: None,
            right: None,
            height: 1,
        }
    }

    fn small_tree() -> TreeShape {
        // 20 at the root, 10 and 30 below it; ids deliberately out of order
        let root = ShapeNode {
            id: NodeId(2),
            value: 20,
            left: Some(NodeId(0)),
            right: Some(NodeId(1)),
            height: 2,
        };
        TreeShape::new(Some(NodeId(2)), vec![root, leaf(1, 30), leaf(0, 10)])
    }

    #[test]
    fn nodes_are_sorted_by_id() {
        let tree = small_tree();
        let ids: Vec<_> = tree.nodes.iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn in_order_walk() {
        assert_eq!(small_tree().in_order(), vec![10, 20, 30]);
    }

    #[test]
    fn find_follows_order() {
        let tree = small_tree();
        assert_eq!(tree.find(30), Some(NodeId(1)));
        assert_eq!(tree.find(25), None);
        assert_eq!(tree.root_value(), Some(20));
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn empty_tree() {
        let tree = TreeShape::default();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert!(tree.in_order().is_empty());
    }
}
