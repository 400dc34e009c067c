//! Single entry point for running any catalog operation.
//!
//! A [`Request`] names a family and an action. [`Structures`] holds the
//! current snapshot of every stateful structure; running a request never
//! mutates it, it returns the log together with the next snapshot.

use serde::{Deserialize, Serialize};
use stepwise_trace::{AlgorithmFamily, Baseline, LogBuilder, OperationLog, Step};

use crate::avl::Avl;
use crate::bst::Bst;
use crate::graph::{EdgeSpec, Graph};
use crate::heap::{Heap, HeapOrder};
use crate::linear::{Queue, Stack};
use crate::search::{search, SearchMethod};
use crate::sorting::{sort, SortAlgorithm};
use crate::Run;

/// A single operation, as accepted over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Request {
    Sort {
        algorithm: SortAlgorithm,
        values: Vec<i64>,
    },
    Search {
        method: SearchMethod,
        values: Vec<i64>,
        key: i64,
    },
    Bst {
        action: TreeAction,
    },
    Avl {
        action: TreeAction,
    },
    Heap {
        action: HeapAction,
    },
    Stack {
        action: StackAction,
    },
    Queue {
        action: QueueAction,
    },
    Graph {
        action: GraphAction,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TreeAction {
    Insert { value: i64 },
    Delete { value: i64 },
    Search { value: i64 },
    Build { values: Vec<i64> },
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HeapAction {
    Insert {
        value: i64,
    },
    Extract,
    Build {
        #[serde(default)]
        order: HeapOrder,
        values: Vec<i64>,
    },
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StackAction {
    Push { value: i64 },
    Pop,
    Peek,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum QueueAction {
    Enqueue { value: i64 },
    Dequeue,
    Peek,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GraphAction {
    Load {
        edges: Vec<EdgeSpec>,
    },
    Bfs {
        start: String,
        #[serde(default)]
        target: Option<String>,
    },
    Dfs {
        start: String,
        #[serde(default)]
        target: Option<String>,
    },
    Dijkstra {
        start: String,
        #[serde(default)]
        target: Option<String>,
    },
}

impl Request {
    pub fn family(&self) -> AlgorithmFamily {
        match self {
            Request::Sort { .. } => AlgorithmFamily::Sort,
            Request::Search { .. } => AlgorithmFamily::Search,
            Request::Bst { .. } => AlgorithmFamily::Bst,
            Request::Avl { .. } => AlgorithmFamily::Avl,
            Request::Heap { .. } => AlgorithmFamily::Heap,
            Request::Stack { .. } => AlgorithmFamily::Stack,
            Request::Queue { .. } => AlgorithmFamily::Queue,
            Request::Graph { .. } => AlgorithmFamily::Graph,
        }
    }
}

/// Current snapshots of the stateful structures.
#[derive(Debug, Clone)]
pub struct Structures {
    pub bst: Bst,
    pub avl: Avl,
    pub heap: Heap,
    pub stack: Stack,
    pub queue: Queue,
    pub graph: Graph,
}

impl Default for Structures {
    fn default() -> Self {
        Self {
            bst: Bst::new(),
            avl: Avl::new(),
            heap: Heap::new(HeapOrder::Max),
            stack: Stack::new(),
            queue: Queue::new(),
            graph: Graph::sample(),
        }
    }
}

impl Structures {
    /// Run `request` against these snapshots.
    pub fn run(&self, request: &Request) -> Run<Structures> {
        let mut next = self.clone();
        let log = match request {
            Request::Sort { algorithm, values } => sort(*algorithm, values).log,
            Request::Search {
                method,
                values,
                key,
            } => search(*method, values, *key).log,
            Request::Bst { action } => {
                let (log, tree) = match action {
                    TreeAction::Insert { value } => split(self.bst.insert(*value)),
                    TreeAction::Delete { value } => split(self.bst.delete(*value)),
                    TreeAction::Search { value } => (self.bst.search(*value).log, self.bst.clone()),
                    TreeAction::Build { values } => split(Bst::build(values)),
                    TreeAction::Clear => (cleared(AlgorithmFamily::Bst), Bst::new()),
                };
                next.bst = tree;
                log
            }
            Request::Avl { action } => {
                let (log, tree) = match action {
                    TreeAction::Insert { value } => split(self.avl.insert(*value)),
                    TreeAction::Delete { value } => split(self.avl.delete(*value)),
                    TreeAction::Search { value } => (self.avl.search(*value).log, self.avl.clone()),
                    TreeAction::Build { values } => split(Avl::build(values)),
                    TreeAction::Clear => (cleared(AlgorithmFamily::Avl), Avl::new()),
                };
                next.avl = tree;
                log
            }
            Request::Heap { action } => {
                let (log, heap) = match action {
                    HeapAction::Insert { value } => split(self.heap.insert(*value)),
                    HeapAction::Extract => {
                        let run = self.heap.extract();
                        (run.log, run.output.structure)
                    }
                    HeapAction::Build { order, values } => split(Heap::build(*order, values)),
                    HeapAction::Clear => {
                        let order = self.heap.order();
                        (cleared(AlgorithmFamily::Heap), Heap::new(order))
                    }
                };
                next.heap = heap;
                log
            }
            Request::Stack { action } => {
                let (log, stack) = match action {
                    StackAction::Push { value } => split(self.stack.push(*value)),
                    StackAction::Pop => {
                        let run = self.stack.pop();
                        (run.log, run.output.structure)
                    }
                    StackAction::Peek => (self.stack.peek().log, self.stack.clone()),
                    StackAction::Clear => (cleared(AlgorithmFamily::Stack), Stack::new()),
                };
                next.stack = stack;
                log
            }
            Request::Queue { action } => {
                let (log, queue) = match action {
                    QueueAction::Enqueue { value } => split(self.queue.enqueue(*value)),
                    QueueAction::Dequeue => {
                        let run = self.queue.dequeue();
                        (run.log, run.output.structure)
                    }
                    QueueAction::Peek => (self.queue.peek().log, self.queue.clone()),
                    QueueAction::Clear => (cleared(AlgorithmFamily::Queue), Queue::new()),
                };
                next.queue = queue;
                log
            }
            Request::Graph { action } => match action {
                GraphAction::Load { edges } => {
                    next.graph = Graph::from_edges(edges);
                    loaded(&next.graph)
                }
                GraphAction::Bfs { start, target } => {
                    self.graph.bfs(start, target.as_deref()).log
                }
                GraphAction::Dfs { start, target } => {
                    self.graph.dfs(start, target.as_deref()).log
                }
                GraphAction::Dijkstra { start, target } => {
                    self.graph.dijkstra(start, target.as_deref()).log
                }
            },
        };

        tracing::debug!(
            family = ?request.family(),
            steps = log.len(),
            failed = log.is_failed(),
            "operation recorded"
        );
        Run { log, output: next }
    }
}

fn split<T>(run: Run<T>) -> (OperationLog, T) {
    (run.log, run.output)
}

/// A one-step log over the emptied structure.
fn cleared(family: AlgorithmFamily) -> OperationLog {
    let baseline = match family {
        AlgorithmFamily::Bst | AlgorithmFamily::Avl => Baseline::Tree {
            shape: Default::default(),
        },
        _ => Baseline::Array { values: Vec::new() },
    };
    let mut log = LogBuilder::new(family, baseline);
    log.push(Step::note("Cleared"));
    log.finish()
}

fn loaded(graph: &Graph) -> OperationLog {
    let mut log = LogBuilder::new(
        AlgorithmFamily::Graph,
        Baseline::Graph {
            vertices: (0..graph.vertex_count() as u32)
                .filter_map(|v| graph.name(v).map(str::to_string))
                .collect(),
        },
    );
    log.push(Step::note(format!(
        "Loaded {} vertices and {} edges",
        graph.vertex_count(),
        graph.edges().len()
    )));
    log.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_trace::{StepKind, Tag};

    #[test]
    fn run_does_not_touch_the_input() {
        let structures = Structures::default();
        let run = structures.run(&Request::Heap {
            action: HeapAction::Insert { value: 5 },
        });
        assert!(structures.heap.is_empty());
        assert_eq!(run.output.heap.items(), &[5]);
    }

    #[test]
    fn failed_operation_keeps_snapshot() {
        let structures = Structures::default()
            .run(&Request::Stack {
                action: StackAction::Push { value: 1 },
            })
            .output;
        let run = structures.run(&Request::Queue {
            action: QueueAction::Dequeue,
        });
        assert!(run.log.is_failed());
        assert_eq!(run.output.stack.items(), &[1]);
        assert!(run.output.queue.is_empty());
    }

    #[test]
    fn sequential_requests_chain() {
        let mut structures = Structures::default();
        for value in [50, 30, 70, 20, 40] {
            structures = structures
                .run(&Request::Bst {
                    action: TreeAction::Insert { value },
                })
                .output;
        }
        let run = structures.run(&Request::Bst {
            action: TreeAction::Search { value: 40 },
        });
        assert_eq!(run.log.last().map(|s| s.tag), Some(Tag::Found));
        assert_eq!(structures.bst.len(), 5);
    }

    #[test]
    fn clear_empties_structure() {
        let structures = Structures::default()
            .run(&Request::Avl {
                action: TreeAction::Build {
                    values: vec![3, 1, 2],
                },
            })
            .output;
        assert_eq!(structures.avl.len(), 3);
        let run = structures.run(&Request::Avl {
            action: TreeAction::Clear,
        });
        assert!(run.output.avl.is_empty());
        assert_eq!(run.log.len(), 1);
        assert!(!run.log.is_failed());
    }

    #[test]
    fn graph_load_replaces_sample() {
        let run = Structures::default().run(&Request::Graph {
            action: GraphAction::Load {
                edges: vec![EdgeSpec::new("x", "y", 2)],
            },
        });
        assert_eq!(run.output.graph.vertex_count(), 2);
        assert_eq!(run.log.family(), AlgorithmFamily::Graph);
    }

    #[test]
    fn requests_parse_from_json() {
        let request: Request = serde_json::from_str(
            r#"{"family":"sort","algorithm":"bubble","values":[3,1,2]}"#,
        )
        .unwrap();
        let run = Structures::default().run(&request);
        assert_eq!(run.log.count(StepKind::Compare), 3);

        let request: Request = serde_json::from_str(
            r#"{"family":"graph","action":{"op":"bfs","start":"A"}}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            Request::Graph {
                action: GraphAction::Bfs {
                    start: "A".into(),
                    target: None
                }
            }
        );

        let request: Request =
            serde_json::from_str(r#"{"family":"heap","action":{"op":"build","values":[1,2]}}"#)
                .unwrap();
        assert_eq!(
            request,
            Request::Heap {
                action: HeapAction::Build {
                    order: HeapOrder::Max,
                    values: vec![1, 2]
                }
            }
        );
    }
}
