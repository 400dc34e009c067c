//! Steps: the atomic records of an operation log.

use serde::{Deserialize, Serialize};

use crate::error::StepDefect;
use crate::shape::{NodeId, TreeShape};

/// The fixed engine vocabulary every algorithm maps its actions onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Two or more items were compared
    Compare,
    /// A value or structure was written
    Set,
    /// Two array elements exchanged places
    Swap,
    /// Attention was drawn to items without changing them
    Highlight,
}

impl StepKind {
    /// Tag applied to a step's targets unless the generator picks another.
    pub fn default_tag(self) -> Tag {
        match self {
            StepKind::Compare => Tag::Comparing,
            StepKind::Set => Tag::Inserting,
            StepKind::Swap => Tag::Current,
            StepKind::Highlight => Tag::Current,
        }
    }

    fn name(self) -> &'static str {
        match self {
            StepKind::Compare => "compare",
            StepKind::Set => "set",
            StepKind::Swap => "swap",
            StepKind::Highlight => "highlight",
        }
    }
}

/// Identifier of something a step touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Slot of an array (sorts, searches, heap, stack, queue)
    Element(usize),
    /// Tree arena node
    Node(NodeId),
    /// Graph vertex
    Vertex(u32),
    /// Undirected graph edge, lower endpoint first
    Edge(u32, u32),
}

impl Target {
    /// Edge between two vertices, normalized so the lower id comes first.
    pub fn edge(a: u32, b: u32) -> Self {
        if a <= b {
            Target::Edge(a, b)
        } else {
            Target::Edge(b, a)
        }
    }
}

/// Display tag for a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    #[default]
    Default,
    Current,
    Comparing,
    Found,
    Inserting,
    Deleting,
    Sorted,
    Visited,
}

impl Tag {
    /// Sticky tags persist across later steps; the rest only last one step.
    ///
    /// `Default` is sticky so a step can explicitly clear an earlier mark.
    pub fn is_sticky(self) -> bool {
        matches!(self, Tag::Default | Tag::Found | Tag::Sorted | Tag::Visited)
    }
}

/// Data a set step writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Payload {
    /// Nothing written; on an array element this removes the slot
    #[default]
    Empty,
    /// A written array value or tentative vertex distance
    Value(i64),
    /// Tree structure after the change
    Tree(TreeShape),
}

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub kind: StepKind,
    pub targets: Vec<Target>,
    pub description: String,
    pub tag: Tag,
    #[serde(default)]
    pub payload: Payload,
}

impl Step {
    /// Create a step with the kind's default tag and no payload.
    pub fn new(
        kind: StepKind,
        targets: impl IntoIterator<Item = Target>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            targets: targets.into_iter().collect(),
            description: description.into(),
            tag: kind.default_tag(),
            payload: Payload::Empty,
        }
    }

    pub fn compare(
        targets: impl IntoIterator<Item = Target>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(StepKind::Compare, targets, description)
    }

    /// Swap two array elements.
    pub fn swap(a: usize, b: usize, description: impl Into<String>) -> Self {
        Self::new(
            StepKind::Swap,
            [Target::Element(a), Target::Element(b)],
            description,
        )
    }

    pub fn set(
        targets: impl IntoIterator<Item = Target>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(StepKind::Set, targets, description)
    }

    pub fn highlight(
        targets: impl IntoIterator<Item = Target>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(StepKind::Highlight, targets, description)
    }

    /// Highlight with no targets, used for summaries and failures.
    pub fn note(description: impl Into<String>) -> Self {
        Self::new(StepKind::Highlight, Vec::<Target>::new(), description)
    }

    /// Replace the tag applied to the targets.
    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = tag;
        self
    }

    /// Attach data written by a set step.
    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Check the step against the vocabulary's shape rules.
    pub fn validate(&self) -> Result<(), StepDefect> {
        let name = self.kind.name();

        if self.kind != StepKind::Set && self.payload != Payload::Empty {
            return Err(StepDefect::UnexpectedPayload(name));
        }

        match self.kind {
            StepKind::Swap => {
                if self.targets.len() != 2 {
                    return Err(StepDefect::SwapArity(self.targets.len()));
                }
                if !self.targets.iter().all(|t| matches!(t, Target::Element(_))) {
                    return Err(StepDefect::SwapTarget);
                }
            }
            StepKind::Compare | StepKind::Set => {
                if self.targets.is_empty() {
                    return Err(StepDefect::NoTargets(name));
                }
                let writes_tree = matches!(self.payload, Payload::Tree(_));
                if writes_tree && self.targets.iter().any(|t| matches!(t, Target::Element(_))) {
                    return Err(StepDefect::TreeOnElement);
                }
            }
            // A highlight with no targets is how failures and summaries are reported
            StepKind::Highlight => {}
        }

        Ok(())
    }
}
