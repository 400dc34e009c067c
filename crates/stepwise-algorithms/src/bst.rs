//! Unbalanced binary search tree.

use stepwise_trace::{AlgorithmFamily, Baseline, LogBuilder, NodeId, Step, TreeShape};

use crate::tree::Arena;
use crate::Run;

/// Binary search tree over distinct `i64` keys.
#[derive(Debug, Clone, Default)]
pub struct Bst {
    arena: Arena,
}

impl Bst {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `values` in order into an empty tree; duplicates are skipped.
    pub fn build(values: &[i64]) -> Run<Bst> {
        let mut tree = Bst::new();
        let mut log = tree.builder();
        for &value in values {
            if let Err(reason) = tree.arena.insert_traced(value, &mut log) {
                log.push(Step::note(format!("Skip {value}: {reason}")));
            }
        }
        Run {
            log: log.finish(),
            output: tree,
        }
    }

    /// Insert one value. A duplicate produces a failed log.
    pub fn insert(&self, value: i64) -> Run<Bst> {
        let mut tree = self.clone();
        let mut log = tree.builder();
        match tree.arena.insert_traced(value, &mut log) {
            Ok(_) => Run {
                log: log.finish(),
                output: tree,
            },
            Err(reason) => self.failed(log, reason),
        }
    }

    /// Delete one value. A missing key produces a failed log.
    pub fn delete(&self, value: i64) -> Run<Bst> {
        let mut tree = self.clone();
        let mut log = tree.builder();
        match tree.arena.delete_traced(value, &mut log) {
            Ok(_) => Run {
                log: log.finish(),
                output: tree,
            },
            Err(reason) => self.failed(log, reason),
        }
    }

    /// Search for `value`, returning the node that holds it.
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

    /// Keys in ascending order.
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

    fn builder(&self) -> LogBuilder {
        LogBuilder::new(
            AlgorithmFamily::Bst,
            Baseline::Tree {
                shape: self.shape(),
            },
        )
    }

    fn failed(&self, log: LogBuilder, reason: String) -> Run<Bst> {
        tracing::debug!(%reason, "bst operation failed");
        Run {
            log: log.fail(reason),
            output: self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_trace::{StepKind, Tag, Target};

    fn sample() -> Bst {
        Bst::build(&[50, 30, 70, 20, 40]).output
    }

    #[test]
    fn build_keeps_bst_order() {
        let tree = sample();
        assert_eq!(tree.values(), vec![20, 30, 40, 50, 70]);
        assert_eq!(tree.root_value(), Some(50));
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn search_walks_the_path() {
        let tree = sample();
        let run = tree.search(40);
        let node = tree.shape().find(40).unwrap();

        assert_eq!(run.output, Some(node));
        let steps = run.log.steps();
        let last = steps.last().unwrap();
        assert_eq!(last.tag, Tag::Found);
        assert_eq!(last.targets, vec![Target::Node(node)]);

        let compares: Vec<_> = steps[..steps.len() - 1]
            .iter()
            .filter(|s| s.kind == StepKind::Compare)
            .collect();
        assert_eq!(compares.len(), 3);
        assert!(compares[0].description.contains("with 50"));
        assert!(compares[1].description.contains("with 30"));
        assert!(compares[2].description.contains("with 40"));
    }

    #[test]
    fn search_miss_is_not_a_failure() {
        let run = sample().search(45);
        assert_eq!(run.output, None);
        assert!(!run.log.is_failed());
    }

    #[test]
    fn insert_duplicate_fails_without_change() {
        let tree = sample();
        let run = tree.insert(30);
        assert!(run.log.is_failed());
        assert_eq!(run.log.len(), 1);
        assert_eq!(run.output.values(), tree.values());
    }

    #[test]
    fn insert_records_set_with_shape() {
        let run = sample().insert(60);
        let last = run.log.last().unwrap();
        assert_eq!(last.kind, StepKind::Set);
        assert!(run.output.contains(60));
        // 50 -> 70 -> vacant left of 70
        assert_eq!(run.log.count(StepKind::Compare), 2);
    }

    #[test]
    fn delete_leaf_and_single_child() {
        let tree = sample().delete(20).output;
        assert_eq!(tree.values(), vec![30, 40, 50, 70]);

        let tree = tree.delete(30).output;
        assert_eq!(tree.values(), vec![40, 50, 70]);
    }

    #[test]
    fn delete_two_children_locates_successor_first() {
        let tree = Bst::build(&[50, 30, 70, 60, 80, 65]).output;
        let run = tree.delete(50);
        let steps = run.log.steps();

        let successor_found = steps
            .iter()
            .position(|s| s.description.contains("In-order successor is 60"))
            .unwrap();
        let replaced = steps
            .iter()
            .position(|s| s.description.contains("Replace 50 with successor 60"))
            .unwrap();
        assert!(successor_found < replaced);

        assert_eq!(run.output.values(), vec![30, 60, 65, 70, 80]);
        assert_eq!(run.output.root_value(), Some(60));
    }

    #[test]
    fn delete_missing_key_fails() {
        let tree = sample();
        let run = tree.delete(99);
        assert!(run.log.is_failed());
        assert_eq!(run.output.len(), 5);

        let run = Bst::new().delete(1);
        assert!(run.log.is_failed());
    }

    #[test]
    fn operations_are_deterministic() {
        let tree = sample();
        assert_eq!(tree.insert(45).log, tree.insert(45).log);
        assert_eq!(tree.delete(30).log, tree.delete(30).log);
        assert_eq!(tree.search(70).log, tree.search(70).log);
    }
}
