//! Error types for stepwise-trace.
//!
//! These are contract violations: a malformed step handed to a log, a log
//! whose outcome does not match its shape, or a projection request outside
//! the log. Ordinary domain failures (extracting from an empty heap, deleting
//! a missing key) are never errors; they are failed logs.

use thiserror::Error;

/// Why a single step is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepDefect {
    /// A swap must name exactly two targets.
    #[error("swap needs exactly two targets, got {0}")]
    SwapArity(usize),

    /// A swap may only exchange array elements.
    #[error("swap targets must be array elements")]
    SwapTarget,

    /// Compare, set and swap steps must touch something.
    #[error("{0} step has no targets")]
    NoTargets(&'static str),

    /// Only set steps carry a payload.
    #[error("{0} step carries a payload")]
    UnexpectedPayload(&'static str),

    /// Array slots hold values; a tree snapshot belongs on node targets.
    #[error("set step writes a tree snapshot to an array element")]
    TreeOnElement,
}

/// Errors raised at construction and projection boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// A step failed validation.
    #[error("invalid step at index {index}: {defect}")]
    InvalidStep {
        index: usize,
        #[source]
        defect: StepDefect,
    },

    /// A failed log must consist of exactly one descriptive step.
    #[error("failed log must hold exactly one step, got {steps}")]
    FailedLogShape { steps: usize },

    /// The requested cursor lies past the end of the log.
    #[error("cursor {cursor} out of range for log of length {len}")]
    CursorOutOfRange { cursor: usize, len: usize },

    /// Replaying a step touched an element the baseline does not have.
    #[error("step {step} touches element {element} but the array has {len} elements")]
    ElementOutOfBounds {
        step: usize,
        element: usize,
        len: usize,
    },
}
