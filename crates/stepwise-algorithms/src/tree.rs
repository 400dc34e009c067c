//! Index-addressed binary search tree arena shared by the BST and AVL
//! generators.
//!
//! Nodes live in a dense `Vec` and link to each other by [`NodeId`]; removed
//! slots go on a free list and are reused by later inserts. Snapshots copy
//! ids, never references.

use std::cmp::Ordering;

use stepwise_trace::{LogBuilder, NodeId, Payload, ShapeNode, Step, Tag, Target, TreeShape};

#[derive(Debug, Clone)]
struct TreeNode {
    value: i64,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
    height: u32,
}

/// Where a descent from the root ended.
pub(crate) enum Descent {
    Found(NodeId),
    Vacant {
        parent: Option<NodeId>,
        left: bool,
    },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Arena {
    nodes: Vec<TreeNode>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    len: usize,
}

impl Arena {
    pub(crate) fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn value(&self, id: NodeId) -> i64 {
        self.nodes[id.index()].value
    }

    pub(crate) fn left(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].left
    }

    pub(crate) fn right(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].right
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    fn height_of(&self, id: Option<NodeId>) -> u32 {
        id.map_or(0, |id| self.nodes[id.index()].height)
    }

    /// Left subtree height minus right subtree height.
    pub(crate) fn balance(&self, id: NodeId) -> i64 {
        i64::from(self.height_of(self.left(id))) - i64::from(self.height_of(self.right(id)))
    }

    pub(crate) fn update_height(&mut self, id: NodeId) {
        let height = 1 + self
            .height_of(self.left(id))
            .max(self.height_of(self.right(id)));
        self.nodes[id.index()].height = height;
    }

    fn refresh_upwards(&mut self, mut cursor: Option<NodeId>) {
        while let Some(id) = cursor {
            self.update_height(id);
            cursor = self.parent(id);
        }
    }

    fn alloc(&mut self, value: i64, parent: Option<NodeId>) -> NodeId {
        let node = TreeNode {
            value,
            left: None,
            right: None,
            parent,
            height: 1,
        };
        self.len += 1;
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId((self.nodes.len() - 1) as u32)
            }
        }
    }

    /// Point whatever linked to `old` (its parent or the root) at `new`.
    fn set_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let node = &mut self.nodes[p.index()];
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    node.right = new;
                }
            }
        }
        if let Some(n) = new {
            self.nodes[n.index()].parent = parent;
        }
    }

    /// Remove a node with at most one child, splicing the child into its place.
    ///
    /// Returns the removed node's parent, the first node whose height may change.
    fn unlink(&mut self, id: NodeId) -> Option<NodeId> {
        let child = self.left(id).or(self.right(id));
        let parent = self.parent(id);
        self.set_child(parent, id, child);
        self.free.push(id);
        self.len -= 1;
        self.refresh_upwards(parent);
        parent
    }

    /// Rotate left around `x`; returns the new subtree root.
    ///
    /// Heights are recomputed for `x` first, then for the new root above it.
    pub(crate) fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.right(x) else {
            return x;
        };
        let inner = self.left(y);
        let parent = self.parent(x);

        self.nodes[x.index()].right = inner;
        if let Some(b) = inner {
            self.nodes[b.index()].parent = Some(x);
        }
        self.set_child(parent, x, Some(y));
        self.nodes[y.index()].left = Some(x);
        self.nodes[x.index()].parent = Some(y);

        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Rotate right around `x`; returns the new subtree root.
    pub(crate) fn rotate_right(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.left(x) else {
            return x;
        };
        let inner = self.right(y);
        let parent = self.parent(x);

        self.nodes[x.index()].left = inner;
        if let Some(b) = inner {
            self.nodes[b.index()].parent = Some(x);
        }
        self.set_child(parent, x, Some(y));
        self.nodes[y.index()].right = Some(x);
        self.nodes[x.index()].parent = Some(y);

        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Copy the live part of the arena.
    pub(crate) fn shape(&self) -> TreeShape {
        let mut nodes = Vec::with_capacity(self.len);
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index()];
            nodes.push(ShapeNode {
                id,
                value: node.value,
                left: node.left,
                right: node.right,
                height: node.height,
            });
            stack.extend(node.left);
            stack.extend(node.right);
        }
        TreeShape::new(self.root, nodes)
    }

    pub(crate) fn find(&self, value: i64) -> Option<NodeId> {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            cursor = match value.cmp(&self.value(id)) {
                Ordering::Equal => return Some(id),
                Ordering::Less => self.left(id),
                Ordering::Greater => self.right(id),
            };
        }
        None
    }

    /// Walk from the root toward `value`, one compare step per node visited.
    pub(crate) fn descend(&self, value: i64, log: &mut LogBuilder) -> Descent {
        let mut parent = None;
        let mut left = false;
        let mut cursor = self.root;

        while let Some(id) = cursor {
            let current = self.value(id);
            let (next, direction) = match value.cmp(&current) {
                Ordering::Equal => {
                    log.push(Step::compare(
                        [Target::Node(id)],
                        format!("Compare {value} with {current}: equal"),
                    ));
                    return Descent::Found(id);
                }
                Ordering::Less => (self.left(id), "go left"),
                Ordering::Greater => (self.right(id), "go right"),
            };
            log.push(Step::compare(
                [Target::Node(id)],
                format!("Compare {value} with {current}: {direction}"),
            ));
            parent = Some(id);
            left = value < current;
            cursor = next;
        }
        Descent::Vacant { parent, left }
    }

    /// Insert `value` at the vacant spot the descent finds.
    ///
    /// Records the descent and a set step carrying the new shape. A duplicate
    /// is refused with a reason and leaves the tree unchanged.
    pub(crate) fn insert_traced(
        &mut self,
        value: i64,
        log: &mut LogBuilder,
    ) -> Result<NodeId, String> {
        let (parent, left) = match self.descend(value, log) {
            Descent::Found(_) => return Err(format!("{value} is already in the tree")),
            Descent::Vacant { parent, left } => (parent, left),
        };

        let id = self.alloc(value, parent);
        let description = match parent {
            None => {
                self.root = Some(id);
                format!("Insert {value} as the root")
            }
            Some(p) => {
                let side = if left {
                    self.nodes[p.index()].left = Some(id);
                    "left"
                } else {
                    self.nodes[p.index()].right = Some(id);
                    "right"
                };
                format!("Insert {value} as the {side} child of {}", self.value(p))
            }
        };
        self.refresh_upwards(parent);

        log.push(
            Step::set([Target::Node(id)], description).with_payload(Payload::Tree(self.shape())),
        );
        Ok(id)
    }

    /// Look `value` up, ending with a found highlight or a not-found note.
    pub(crate) fn search_traced(&self, value: i64, log: &mut LogBuilder) -> Option<NodeId> {
        match self.descend(value, log) {
            Descent::Found(id) => {
                log.push(
                    Step::highlight([Target::Node(id)], format!("Found {value}"))
                        .with_tag(Tag::Found),
                );
                Some(id)
            }
            Descent::Vacant { .. } => {
                log.push(Step::note(format!("{value} not found")));
                None
            }
        }
    }

    /// Delete `value`.
    ///
    /// With two children the in-order successor is located step by step,
    /// its value copied up, and its old node spliced out. Returns the parent of
    /// the node physically removed, where rebalancing has to start.
    pub(crate) fn delete_traced(
        &mut self,
        value: i64,
        log: &mut LogBuilder,
    ) -> Result<Option<NodeId>, String> {
        if self.root.is_none() {
            return Err("the tree is empty".to_string());
        }
        let id = match self.descend(value, log) {
            Descent::Found(id) => id,
            Descent::Vacant { .. } => return Err(format!("{value} is not in the tree")),
        };
        log.push(
            Step::highlight([Target::Node(id)], format!("Delete {value}")).with_tag(Tag::Deleting),
        );

        let (Some(_), Some(right)) = (self.left(id), self.right(id)) else {
            let start = self.unlink(id);
            log.push(
                Step::set([Target::Node(id)], format!("Remove {value}"))
                    .with_tag(Tag::Deleting)
                    .with_payload(Payload::Tree(self.shape())),
            );
            return Ok(start);
        };

        let mut successor = right;
        log.push(Step::highlight(
            [Target::Node(right)],
            format!("Find the in-order successor: step right to {}", self.value(right)),
        ));
        while let Some(next) = self.left(successor) {
            successor = next;
            log.push(Step::highlight(
                [Target::Node(next)],
                format!("Step left to {}", self.value(next)),
            ));
        }

        let replacement = self.value(successor);
        log.push(Step::highlight(
            [Target::Node(successor)],
            format!("In-order successor is {replacement}"),
        ));

        self.nodes[id.index()].value = replacement;
        log.push(
            Step::set(
                [Target::Node(id)],
                format!("Replace {value} with successor {replacement}"),
            )
            .with_payload(Payload::Tree(self.shape())),
        );

        let start = self.unlink(successor);
        log.push(
            Step::set(
                [Target::Node(successor)],
                format!("Remove the old {replacement} node"),
            )
            .with_tag(Tag::Deleting)
            .with_payload(Payload::Tree(self.shape())),
        );
        Ok(start)
    }
}
