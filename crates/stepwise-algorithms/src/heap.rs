//! Array-backed binary heap.
//!
//! The heap order (parent outranks its children) holds after every complete
//! operation; the individual sift steps in between may show it broken.

use serde::{Deserialize, Serialize};
use stepwise_trace::{AlgorithmFamily, Baseline, LogBuilder, Payload, Step, Tag, Target};

use crate::{Removal, Run};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeapOrder {
    /// Parent >= children
    #[default]
    Max,
    /// Parent <= children
    Min,
}

impl HeapOrder {
    /// Whether `a` belongs above `b`.
    pub fn outranks(self, a: i64, b: i64) -> bool {
        match self {
            HeapOrder::Max => a > b,
            HeapOrder::Min => a < b,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heap {
    order: HeapOrder,
    items: Vec<i64>,
}

impl Heap {
    pub fn new(order: HeapOrder) -> Self {
        Self {
            order,
            items: Vec::new(),
        }
    }

    /// Heapify `values` bottom-up.
    pub fn build(order: HeapOrder, values: &[i64]) -> Run<Heap> {
        let mut heap = Heap {
            order,
            items: values.to_vec(),
        };
        let mut log = heap.builder();
        for start in (0..heap.items.len() / 2).rev() {
            heap.sift_down(start, &mut log);
        }
        Run {
            log: log.finish(),
            output: heap,
        }
    }

    /// Append `value` and sift it up.
    pub fn insert(&self, value: i64) -> Run<Heap> {
        let mut heap = self.clone();
        let mut log = heap.builder();

        let index = heap.items.len();
        heap.items.push(value);
        log.push(
            Step::set(
                [Target::Element(index)],
                format!("Append {value} at index {index}"),
            )
            .with_payload(Payload::Value(value)),
        );
        heap.sift_up(index, &mut log);

        Run {
            log: log.finish(),
            output: heap,
        }
    }

    /// Remove the root. Extracting from an empty heap produces a failed log.
    pub fn extract(&self) -> Run<Removal<Heap>> {
        let mut heap = self.clone();
        let mut log = heap.builder();

        let Some(&root) = heap.items.first() else {
            tracing::debug!("extract from empty heap");
            return Run {
                log: log.fail("Cannot extract from an empty heap"),
                output: Removal {
                    structure: heap,
                    value: None,
                },
            };
        };

        log.push(
            Step::highlight([Target::Element(0)], format!("Remove root {root}"))
                .with_tag(Tag::Deleting),
        );
        let last = heap.items.len() - 1;
        if last > 0 {
            let moved = heap.items[last];
            heap.items.swap(0, last);
            log.push(Step::swap(
                0,
                last,
                format!("Swap root {root} with last element {moved}"),
            ));
        }
        heap.items.pop();
        log.push(
            Step::set([Target::Element(last)], format!("Detach {root}"))
                .with_tag(Tag::Deleting),
        );
        heap.sift_down(0, &mut log);

        Run {
            log: log.finish(),
            output: Removal {
                structure: heap,
                value: Some(root),
            },
        }
    }

    pub fn peek(&self) -> Option<i64> {
        self.items.first().copied()
    }

    pub fn order(&self) -> HeapOrder {
        self.order
    }

    pub fn items(&self) -> &[i64] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check the heap order over the whole array.
    pub fn is_valid(&self) -> bool {
        is_heap(self.order, &self.items)
    }

    fn builder(&self) -> LogBuilder {
        LogBuilder::new(
            AlgorithmFamily::Heap,
            Baseline::Array {
                values: self.items.clone(),
            },
        )
    }

    /// One compare per hop toward the root.
    fn sift_up(&mut self, mut index: usize, log: &mut LogBuilder) {
        while index > 0 {
            let parent = (index - 1) / 2;
            let (value, above) = (self.items[index], self.items[parent]);
            log.push(Step::compare(
                [Target::Element(index), Target::Element(parent)],
                format!("Compare {value} with parent {above}"),
            ));
            if !self.order.outranks(value, above) {
                break;
            }
            self.items.swap(index, parent);
            log.push(Step::swap(index, parent, format!("Swap {value} up past {above}")));
            index = parent;
        }
    }

    /// One compare per hop toward the leaves, covering the node and its children.
    fn sift_down(&mut self, mut index: usize, log: &mut LogBuilder) {
        let len = self.items.len();
        loop {
            let left = 2 * index + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut targets = vec![Target::Element(index), Target::Element(left)];
            if right < len {
                targets.push(Target::Element(right));
            }

            let best = if right < len && self.order.outranks(self.items[right], self.items[left]) {
                right
            } else {
                left
            };
            let (value, child) = (self.items[index], self.items[best]);
            log.push(Step::compare(
                targets,
                format!("Compare {value} with its children"),
            ));
            if !self.order.outranks(child, value) {
                break;
            }
            self.items.swap(index, best);
            log.push(Step::swap(index, best, format!("Swap {value} down past {child}")));
            index = best;
        }
    }
}

/// Check the heap order property of an array.
pub fn is_heap(order: HeapOrder, items: &[i64]) -> bool {
    (1..items.len()).all(|i| !order.outranks(items[i], items[(i - 1) / 2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stepwise_trace::StepKind;

    #[test]
    fn extract_max_sifts_down() {
        let heap = Heap::build(HeapOrder::Max, &[90, 80, 70, 60, 50, 40, 30]).output;
        let run = heap.extract();

        assert_eq!(run.output.value, Some(90));
        assert_eq!(run.output.structure.peek(), Some(80));
        assert!(run.output.structure.is_valid());
        assert_eq!(run.output.structure.len(), 6);
    }

    #[test]
    fn build_of_heap_input_moves_nothing() {
        let run = Heap::build(HeapOrder::Max, &[90, 80, 70, 60, 50, 40, 30]);
        assert_eq!(run.log.count(StepKind::Swap), 0);
        assert_eq!(run.log.count(StepKind::Compare), 3);
    }

    #[test]
    fn insert_compares_once_per_hop() {
        let heap = Heap::build(HeapOrder::Min, &[1, 5, 3, 7, 9]).output;
        let run = heap.insert(2);
        // index 5 -> parent 2 (3) swap -> parent 0 (1) stop
        assert_eq!(run.log.count(StepKind::Compare), 2);
        assert_eq!(run.log.count(StepKind::Swap), 1);
        assert_eq!(run.log.steps()[0].kind, StepKind::Set);
        assert!(run.output.is_valid());
    }

    #[test]
    fn extract_from_empty_fails() {
        let run = Heap::new(HeapOrder::Max).extract();
        assert!(run.log.is_failed());
        assert_eq!(run.log.len(), 1);
        assert_eq!(run.output.value, None);
        assert!(run.output.structure.is_empty());
    }

    #[test]
    fn extract_last_element() {
        let heap = Heap::new(HeapOrder::Max).insert(4).output;
        let run = heap.extract();
        assert_eq!(run.output.value, Some(4));
        assert!(run.output.structure.is_empty());
        assert_eq!(run.log.count(StepKind::Swap), 0);
    }

    proptest! {
        #[test]
        fn order_holds_after_each_operation(
            seed in prop::collection::vec(-100i64..100, 0..20),
            ops in prop::collection::vec(prop::option::of(-100i64..100), 0..40),
            max in any::<bool>(),
        ) {
            let order = if max { HeapOrder::Max } else { HeapOrder::Min };
            let mut heap = Heap::build(order, &seed).output;
            prop_assert!(heap.is_valid());
            for op in ops {
                heap = match op {
                    Some(v) => heap.insert(v).output,
                    None => heap.extract().output.structure,
                };
                prop_assert!(heap.is_valid());
            }
        }

        #[test]
        fn extract_returns_extreme(values in prop::collection::vec(-100i64..100, 1..30)) {
            let heap = Heap::build(HeapOrder::Max, &values).output;
            prop_assert_eq!(heap.extract().output.value, values.iter().copied().max());
        }
    }
}
