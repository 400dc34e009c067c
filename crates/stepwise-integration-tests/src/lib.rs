//! Shared helpers for the cross-crate scenario tests.

use stepwise_playback::{project, VisualState};
use stepwise_trace::{OperationLog, StepKind, Tag, Target, TraceError};

/// Projection after every step, starting from the baseline.
pub fn frames(log: &OperationLog) -> Result<Vec<VisualState>, TraceError> {
    (0..=log.len()).map(|cursor| project(log, cursor)).collect()
}

/// Projection with every step applied.
pub fn final_state(log: &OperationLog) -> Result<VisualState, TraceError> {
    project(log, log.len())
}

/// Number of set steps describing a rotation.
pub fn rotations(log: &OperationLog) -> usize {
    log.steps()
        .iter()
        .filter(|s| s.kind == StepKind::Set && s.description.starts_with("Rotate"))
        .count()
}

/// Array elements `0..len` all carrying `tag`.
pub fn all_tagged(state: &VisualState, len: usize, tag: Tag) -> bool {
    (0..len).all(|i| state.tag_of(Target::Element(i)) == tag)
}
