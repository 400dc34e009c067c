//! Stepwise Step Generators
//!
//! Each generator runs a textbook algorithm to completion on a private copy of
//! its input and returns an [`OperationLog`] describing every comparison and
//! data movement, together with the operation's result.
//!
//! Generators are pure: the same input always yields the same log, and the
//! structure passed in is never mutated. Stateful structures (trees, heaps,
//! stacks, queues) return the next snapshot alongside the log.
//!
//! Domain failures such as extracting from an empty heap are not errors. They
//! produce a failed log holding a single explanatory step.

pub mod avl;
pub mod bst;
pub mod graph;
pub mod heap;
pub mod linear;
pub mod operation;
pub mod search;
pub mod sorting;
mod tree;

pub use avl::Avl;
pub use bst::Bst;
pub use graph::{EdgeSpec, Graph, ShortestPaths, Traversal};
pub use heap::{is_heap, Heap, HeapOrder};
pub use linear::{Queue, Stack};
pub use operation::{
    GraphAction, HeapAction, QueueAction, Request, StackAction, Structures, TreeAction,
};
pub use search::{binary_search, linear_search, search, SearchMethod};
pub use sorting::{sort, SortAlgorithm};

use stepwise_trace::OperationLog;

/// A recorded run: the log plus whatever the operation produced.
#[derive(Debug, Clone)]
pub struct Run<T> {
    pub log: OperationLog,
    pub output: T,
}

/// Output of a removal: the structure afterwards and the removed value,
/// `None` when there was nothing to remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal<S> {
    pub structure: S,
    pub value: Option<i64>,
}
