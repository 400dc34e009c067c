//! Operation logs: the immutable record of one algorithm run.

use serde::{Deserialize, Serialize};

use crate::error::TraceError;
use crate::shape::TreeShape;
use crate::step::{Step, StepKind};

/// Which generator family produced a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmFamily {
    Sort,
    Search,
    Bst,
    Avl,
    Heap,
    Stack,
    Queue,
    Graph,
}

/// The structure a log replays against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Baseline {
    #[default]
    Empty,
    Array { values: Vec<i64> },
    Tree { shape: TreeShape },
    Graph { vertices: Vec<String> },
}

/// How the run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    /// The operation was invalid for the structure; nothing changed
    Failed { reason: String },
}

/// Ordered, immutable sequence of steps for a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LogParts")]
pub struct OperationLog {
    family: AlgorithmFamily,
    baseline: Baseline,
    steps: Vec<Step>,
    outcome: Outcome,
}

#[derive(Deserialize)]
struct LogParts {
    family: AlgorithmFamily,
    baseline: Baseline,
    steps: Vec<Step>,
    outcome: Outcome,
}

impl TryFrom<LogParts> for OperationLog {
    type Error = TraceError;

    fn try_from(parts: LogParts) -> Result<Self, Self::Error> {
        OperationLog::from_parts(parts.family, parts.baseline, parts.steps, parts.outcome)
    }
}

impl OperationLog {
    /// Assemble a log from parts produced outside a [`LogBuilder`].
    ///
    /// Every step is validated, and a failed log must hold exactly one step.
    pub fn from_parts(
        family: AlgorithmFamily,
        baseline: Baseline,
        steps: Vec<Step>,
        outcome: Outcome,
    ) -> Result<Self, TraceError> {
        for (index, step) in steps.iter().enumerate() {
            step.validate()
                .map_err(|defect| TraceError::InvalidStep { index, defect })?;
        }
        if matches!(outcome, Outcome::Failed { .. }) && steps.len() != 1 {
            return Err(TraceError::FailedLogShape { steps: steps.len() });
        }
        Ok(Self {
            family,
            baseline,
            steps,
            outcome,
        })
    }

    pub fn family(&self) -> AlgorithmFamily {
        self.family
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Number of steps; the upper bound of the playback timeline.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }

    /// Count steps of one kind.
    pub fn count(&self, kind: StepKind) -> usize {
        self.steps.iter().filter(|s| s.kind == kind).count()
    }
}

/// Append-only recorder used while an algorithm runs.
#[derive(Debug)]
pub struct LogBuilder {
    family: AlgorithmFamily,
    baseline: Baseline,
    steps: Vec<Step>,
}

impl LogBuilder {
    pub fn new(family: AlgorithmFamily, baseline: Baseline) -> Self {
        Self {
            family,
            baseline,
            steps: Vec::new(),
        }
    }

    /// Append a step.
    ///
    /// Generators build steps through the typed constructors, so a defect here
    /// is a bug in the generator.
    pub fn push(&mut self, step: Step) {
        debug_assert!(
            step.validate().is_ok(),
            "generator produced a malformed step: {step:?}"
        );
        self.steps.push(step);
    }

    /// Number of steps recorded so far.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Close the log as a completed run.
    pub fn finish(self) -> OperationLog {
        OperationLog {
            family: self.family,
            baseline: self.baseline,
            steps: self.steps,
            outcome: Outcome::Completed,
        }
    }

    /// Discard anything recorded and close the log as a failure.
    ///
    /// The failed log carries a single descriptive step and no structural change.
    pub fn fail(self, reason: impl Into<String>) -> OperationLog {
        let reason = reason.into();
        OperationLog {
            family: self.family,
            baseline: self.baseline,
            steps: vec![Step::note(reason.clone())],
            outcome: Outcome::Failed { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StepDefect;
    use crate::step::{Payload, Target};

    fn array_builder() -> LogBuilder {
        LogBuilder::new(AlgorithmFamily::Sort, Baseline::Array { values: vec![2, 1] })
    }

    #[test]
    fn builder_finishes_completed() {
        let mut builder = array_builder();
        builder.push(Step::compare([Target::Element(0), Target::Element(1)], "2 > 1"));
        builder.push(Step::swap(0, 1, "swap"));
        let log = builder.finish();

        assert_eq!(log.len(), 2);
        assert_eq!(log.count(StepKind::Compare), 1);
        assert_eq!(log.count(StepKind::Swap), 1);
        assert_eq!(log.outcome(), &Outcome::Completed);
    }

    #[test]
    fn failed_log_has_single_step() {
        let mut builder = array_builder();
        builder.push(Step::compare([Target::Element(0)], "partial"));
        let log = builder.fail("heap is empty");

        assert!(log.is_failed());
        assert_eq!(log.len(), 1);
        assert_eq!(log.steps()[0].description, "heap is empty");
    }

    #[test]
    fn from_parts_rejects_malformed_steps() {
        let bad = Step::compare(Vec::<Target>::new(), "nothing");
        let err = OperationLog::from_parts(
            AlgorithmFamily::Sort,
            Baseline::Empty,
            vec![Step::note("ok"), bad],
            Outcome::Completed,
        )
        .unwrap_err();

        assert!(matches!(err, TraceError::InvalidStep { index: 1, .. }));
    }

    #[test]
    fn from_parts_rejects_tree_written_to_array() {
        let bad = Step::set([Target::Element(0)], "bad")
            .with_payload(Payload::Tree(TreeShape::default()));
        let err = OperationLog::from_parts(
            AlgorithmFamily::Heap,
            Baseline::Array { values: vec![5] },
            vec![Step::highlight([Target::Element(0)], "look"), bad],
            Outcome::Completed,
        )
        .unwrap_err();

        assert_eq!(
            err,
            TraceError::InvalidStep {
                index: 1,
                defect: StepDefect::TreeOnElement,
            }
        );
    }

    #[test]
    fn from_parts_rejects_wide_failed_log() {
        let err = OperationLog::from_parts(
            AlgorithmFamily::Heap,
            Baseline::Empty,
            vec![Step::note("a"), Step::note("b")],
            Outcome::Failed { reason: "x".into() },
        )
        .unwrap_err();

        assert_eq!(err, TraceError::FailedLogShape { steps: 2 });
    }

    #[test]
    fn deserialization_validates() {
        let mut builder = array_builder();
        builder.push(Step::swap(0, 1, "swap"));
        let log = builder.finish();

        let json = serde_json::to_string(&log).unwrap();
        let parsed: OperationLog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, log);

        let broken = json.replace(
            r#""swap","targets":[{"element":0},{"element":1}]"#,
            r#""swap","targets":[{"element":0}]"#,
        );
        assert_ne!(broken, json);
        assert!(serde_json::from_str::<OperationLog>(&broken).is_err());
    }
}
