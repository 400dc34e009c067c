//! Stepwise Operation Logs
//!
//! The data model shared by step generators and the playback engine.
//!
//! # Vocabulary
//!
//! Every algorithm, whatever its domain actions ("rotate left", "enqueue
//! neighbor", "sift down"), records its run as [`Step`]s drawn from a fixed
//! vocabulary: `compare`, `set`, `swap` and `highlight`. Each step names the
//! [`Target`]s it touches, the [`Tag`] it gives them, a free-text description,
//! and for `set` steps the [`Payload`] it writes.
//!
//! # Lifecycle
//!
//! A [`LogBuilder`] is append-only while the generator runs. Once finished the
//! [`OperationLog`] is immutable; its length is the upper bound of the playback
//! timeline and it is the only thing playback ever reads.

mod error;
mod log;
mod shape;
mod step;

pub use error::{StepDefect, TraceError};
pub use log::{AlgorithmFamily, Baseline, LogBuilder, OperationLog, Outcome};
pub use shape::{NodeId, ShapeNode, TreeShape};
pub use step::{Payload, Step, StepKind, Tag, Target};
