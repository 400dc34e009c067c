//! Stack and queue.
//!
//! Both are shown as arrays: index 0 is the bottom of the stack and the
//! front of the queue.

use std::collections::VecDeque;

use stepwise_trace::{AlgorithmFamily, Baseline, LogBuilder, Payload, Step, Tag, Target};

use crate::{Removal, Run};

fn builder(family: AlgorithmFamily, values: Vec<i64>) -> LogBuilder {
    LogBuilder::new(family, Baseline::Array { values })
}

fn append(log: &mut LogBuilder, index: usize, value: i64, description: String) {
    log.push(
        Step::set([Target::Element(index)], description).with_payload(Payload::Value(value)),
    );
}

fn detach(log: &mut LogBuilder, index: usize, value: i64, description: String) {
    log.push(
        Step::highlight([Target::Element(index)], format!("Take {value}"))
            .with_tag(Tag::Deleting),
    );
    log.push(Step::set([Target::Element(index)], description).with_tag(Tag::Deleting));
}

/// Last-in, first-out stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    items: Vec<i64>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: &[i64]) -> Self {
        Self {
            items: values.to_vec(),
        }
    }

    pub fn push(&self, value: i64) -> Run<Stack> {
        let mut stack = self.clone();
        let mut log = builder(AlgorithmFamily::Stack, self.items.clone());
        let index = stack.items.len();
        stack.items.push(value);
        append(&mut log, index, value, format!("Push {value}"));
        Run {
            log: log.finish(),
            output: stack,
        }
    }

    /// Pop the top. Popping an empty stack produces a failed log.
    pub fn pop(&self) -> Run<Removal<Stack>> {
        let mut stack = self.clone();
        let mut log = builder(AlgorithmFamily::Stack, self.items.clone());
        let Some(value) = stack.items.pop() else {
            return Run {
                log: log.fail("Cannot pop from an empty stack"),
                output: Removal {
                    structure: stack,
                    value: None,
                },
            };
        };
        detach(&mut log, stack.items.len(), value, format!("Pop {value}"));
        Run {
            log: log.finish(),
            output: Removal {
                structure: stack,
                value: Some(value),
            },
        }
    }

    /// Show the top without removing it.
    pub fn peek(&self) -> Run<Option<i64>> {
        let log = builder(AlgorithmFamily::Stack, self.items.clone());
        peek_at(log, self.items.len().checked_sub(1), self.items.last().copied(), "stack")
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
}

/// First-in, first-out queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Queue {
    items: VecDeque<i64>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: &[i64]) -> Self {
        Self {
            items: values.iter().copied().collect(),
        }
    }

    fn snapshot(&self) -> Vec<i64> {
        self.items.iter().copied().collect()
    }

    pub fn enqueue(&self, value: i64) -> Run<Queue> {
        let mut queue = self.clone();
        let mut log = builder(AlgorithmFamily::Queue, self.snapshot());
        let index = queue.items.len();
        queue.items.push_back(value);
        append(&mut log, index, value, format!("Enqueue {value} at the rear"));
        Run {
            log: log.finish(),
            output: queue,
        }
    }

    /// Remove the front. Dequeuing an empty queue produces a failed log.
    pub fn dequeue(&self) -> Run<Removal<Queue>> {
        let mut queue = self.clone();
        let mut log = builder(AlgorithmFamily::Queue, self.snapshot());
        let Some(value) = queue.items.pop_front() else {
            return Run {
                log: log.fail("Cannot dequeue from an empty queue"),
                output: Removal {
                    structure: queue,
                    value: None,
                },
            };
        };
        detach(&mut log, 0, value, format!("Dequeue {value} from the front"));
        Run {
            log: log.finish(),
            output: Removal {
                structure: queue,
                value: Some(value),
            },
        }
    }

    /// Show the front without removing it.
    pub fn peek(&self) -> Run<Option<i64>> {
        let log = builder(AlgorithmFamily::Queue, self.snapshot());
        let front = self.items.front().copied();
        peek_at(log, front.map(|_| 0), front, "queue")
    }

    pub fn items(&self) -> Vec<i64> {
        self.snapshot()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn peek_at(
    mut log: LogBuilder,
    index: Option<usize>,
    value: Option<i64>,
    name: &str,
) -> Run<Option<i64>> {
    match (index, value) {
        (Some(index), Some(value)) => {
            log.push(
                Step::highlight([Target::Element(index)], format!("Peek: {value}"))
                    .with_tag(Tag::Found),
            );
            Run {
                log: log.finish(),
                output: Some(value),
            }
        }
        _ => Run {
            log: log.fail(format!("Cannot peek at an empty {name}")),
            output: None,
        },
    }
}
