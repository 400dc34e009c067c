//! AVL tree.
//!
//! Inserts and deletes run the BST steps, then walk from the changed node
//! back to the root. At each ancestor the height is recomputed before its
//! balance is checked; a node with |balance| > 1 is highlighted and fixed
//! with one (LL, RR) or two (LR, RL) rotations. Every rotation recomputes the
//! lowered node's height and then the new subtree root's, so the next
//! ancestor up always sees correct heights.

use stepwise_trace::{
    AlgorithmFamily, Baseline, LogBuilder, NodeId, Payload, Step, Target, TreeShape,
};

use crate::tree::Arena;
use crate::Run;

/// Self-balancing binary search tree over distinct `i64` keys.
#[derive(Debug, Clone, Default)]
pub struct Avl {
    arena: Arena,
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Left,
    Right,
}

impl Avl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `values` in order into an empty tree; duplicates are skipped.
    pub fn build(values: &[i64]) -> Run<Avl> {
        let mut tree = Avl::new();
        let mut log = tree.builder();
        for &value in values {
            match tree.arena.insert_traced(value, &mut log) {
                Ok(id) => {
                    let parent = tree.arena.parent(id);
                    tree.rebalance(parent, &mut log);
                }
                Err(reason) => log.push(Step::note(format!("Skip {value}: {reason}"))),
            }
        }
        Run {
            log: log.finish(),
            output: tree,
        }
    }

    pub fn insert(&self, value: i64) -> Run<Avl> {
        let mut tree = self.clone();
        let mut log = tree.builder();
        match tree.arena.insert_traced(value, &mut log) {
            Ok(id) => {
                let parent = tree.arena.parent(id);
                tree.rebalance(parent, &mut log);
                Run {
                    log: log.finish(),
                    output: tree,
                }
            }
            Err(reason) => self.failed(log, reason),
        }
    }

    pub fn delete(&self, value: i64) -> Run<Avl> {
        let mut tree = self.clone();
        let mut log = tree.builder();
        match tree.arena.delete_traced(value, &mut log) {
            Ok(start) => {
                tree.rebalance(start, &mut log);
                Run {
                    log: log.finish(),
                    output: tree,
                }
            }
            Err(reason) => self.failed(log, reason),
        }
    }

    pub fn search(&self, value: i64) -> Run<Option<NodeId>> {
        let mut log = self.builder();
        let found = self.arena.search_traced(value, &mut log);
        Run {
            log: log.finish(),
            output: found,
        }
    }

    pub fn shape(&self) -> TreeShape {
        self.arena.shape()
    }

    pub fn values(&self) -> Vec<i64> {
        self.shape().in_order()
    }

    pub fn contains(&self, value: i64) -> bool {
        self.arena.find(value).is_some()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    pub fn root_value(&self) -> Option<i64> {
        self.arena.root().map(|id| self.arena.value(id))
    }

    /// Every node's balance factor is in {-1, 0, 1}.
    pub fn is_balanced(&self) -> bool {
        let shape = self.shape();
        shape.nodes.iter().all(|node| {
            let height = |id: Option<NodeId>| {
                id.and_then(|id| shape.node(id)).map_or(0, |n| i64::from(n.height))
            };
            (height(node.left) - height(node.right)).abs() <= 1
        })
    }

    fn builder(&self) -> LogBuilder {
        LogBuilder::new(
            AlgorithmFamily::Avl,
            Baseline::Tree {
                shape: self.shape(),
            },
        )
    }

    fn failed(&self, log: LogBuilder, reason: String) -> Run<Avl> {
        tracing::debug!(%reason, "avl operation failed");
        Run {
            log: log.fail(reason),
            output: self.clone(),
        }
    }

    /// Walk from `start` to the root fixing every unbalanced ancestor.
    fn rebalance(&mut self, start: Option<NodeId>, log: &mut LogBuilder) {
        let mut cursor = start;
        while let Some(id) = cursor {
            self.arena.update_height(id);
            let balance = self.arena.balance(id);
            let subtree_root = if balance.abs() > 1 {
                self.fix(id, balance, log)
            } else {
                id
            };
            cursor = self.arena.parent(subtree_root);
        }
    }

    /// Rotate the subtree rooted at unbalanced node `id`; returns its new root.
    fn fix(&mut self, id: NodeId, balance: i64, log: &mut LogBuilder) -> NodeId {
        let left_heavy = balance > 0;
        let child = if left_heavy {
            self.arena.left(id)
        } else {
            self.arena.right(id)
        };
        let Some(child) = child else {
            return id;
        };

        let child_balance = self.arena.balance(child);
        let (case, inner) = match (left_heavy, child_balance) {
            (true, b) if b >= 0 => ("LL", None),
            (true, _) => ("LR", Some(Direction::Left)),
            (false, b) if b <= 0 => ("RR", None),
            (false, _) => ("RL", Some(Direction::Right)),
        };

        let value = self.arena.value(id);
        log.push(Step::highlight(
            [Target::Node(id)],
            format!("{value} is unbalanced (balance {balance}): {case} case"),
        ));

        if let Some(direction) = inner {
            self.rotate(child, direction, log);
        }
        let outer = if left_heavy {
            Direction::Right
        } else {
            Direction::Left
        };
        self.rotate(id, outer, log)
    }

    fn rotate(&mut self, pivot: NodeId, direction: Direction, log: &mut LogBuilder) -> NodeId {
        let value = self.arena.value(pivot);
        let (root, name) = match direction {
            Direction::Left => (self.arena.rotate_left(pivot), "left"),
            Direction::Right => (self.arena.rotate_right(pivot), "right"),
        };
        log.push(
            Step::set(
                [Target::Node(pivot), Target::Node(root)],
                format!("Rotate {name} at {value}"),
            )
            .with_payload(Payload::Tree(self.arena.shape())),
        );
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stepwise_trace::{OperationLog, StepKind};

    fn rotations(log: &OperationLog) -> usize {
        log.steps()
            .iter()
            .filter(|s| s.kind == StepKind::Set && s.description.starts_with("Rotate"))
            .count()
    }

    #[test]
    fn ascending_inserts_rotate_once() {
        let run = Avl::build(&[10, 20, 30]);
        assert_eq!(rotations(&run.log), 1);
        assert_eq!(run.output.root_value(), Some(20));
        assert!(run.output.is_balanced());
    }

    #[test]
    fn unbalanced_node_is_highlighted_before_rotation() {
        let run = Avl::build(&[10, 20, 30]);
        let steps = run.log.steps();
        let rotation = steps
            .iter()
            .position(|s| s.description.starts_with("Rotate"))
            .unwrap();
        let flagged = &steps[rotation - 1];
        assert_eq!(flagged.kind, StepKind::Highlight);
        assert!(flagged.description.contains("RR case"));
    }

    #[test]
    fn each_case_is_handled() {
        for (values, case, expected) in [
            (vec![30, 20, 10], "LL case", 1),
            (vec![10, 20, 30], "RR case", 1),
            (vec![30, 10, 20], "LR case", 2),
            (vec![10, 30, 20], "RL case", 2),
        ] {
            let run = Avl::build(&values);
            assert!(
                run.log.steps().iter().any(|s| s.description.contains(case)),
                "{case}"
            );
            assert_eq!(rotations(&run.log), expected, "{case}");
            assert_eq!(run.output.root_value(), Some(20), "{case}");
        }
    }

    #[test]
    fn delete_rebalances() {
        let tree = Avl::build(&[20, 10, 30, 40]).output;
        let run = tree.delete(10);
        assert_eq!(rotations(&run.log), 1);
        assert_eq!(run.output.root_value(), Some(30));
        assert!(run.output.is_balanced());
    }

    #[test]
    fn failed_operations_leave_tree_alone() {
        let tree = Avl::build(&[1, 2, 3]).output;
        assert!(tree.insert(2).log.is_failed());
        assert!(tree.delete(7).log.is_failed());
        assert_eq!(tree.delete(7).output.values(), vec![1, 2, 3]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(i64),
        Delete(i64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0i64..60).prop_map(Op::Insert),
            (0i64..60).prop_map(Op::Delete),
        ]
    }

    proptest! {
        #[test]
        fn stays_balanced(ops in prop::collection::vec(op(), 0..80)) {
            let mut tree = Avl::new();
            let mut model = std::collections::BTreeSet::new();
            for op in ops {
                tree = match op {
                    Op::Insert(v) => { model.insert(v); tree.insert(v).output }
                    Op::Delete(v) => { model.remove(&v); tree.delete(v).output }
                };
                prop_assert!(tree.is_balanced());
            }
            prop_assert_eq!(tree.values(), model.into_iter().collect::<Vec<_>>());
        }

        #[test]
        fn logs_are_deterministic(values in prop::collection::vec(0i64..100, 0..30)) {
            prop_assert_eq!(Avl::build(&values).log, Avl::build(&values).log);
        }
    }
}
