//! Folding a log prefix into what should be on screen.
//!
//! [`project`] is pure: the visual state at cursor `n` depends only on the
//! baseline and `steps[..n]`, so seeking backwards is just projecting a
//! shorter prefix.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stepwise_trace::{
    Baseline, OperationLog, Payload, Step, StepDefect, StepKind, Tag, Target, TraceError,
    TreeShape,
};

/// The structure being drawn, rebuilt from the baseline and the prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Structure {
    Empty,
    Array {
        values: Vec<i64>,
    },
    Tree {
        shape: TreeShape,
    },
    Graph {
        vertices: Vec<String>,
        /// Tentative distance per vertex, when one has been recorded
        distances: Vec<Option<i64>>,
    },
}

/// A target with a non-default display tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedTarget {
    pub target: Target,
    pub tag: Tag,
}

/// Everything a renderer needs for one cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualState {
    pub cursor: usize,
    pub total: usize,
    pub structure: Structure,
    /// Sorted by target; untouched targets are omitted
    pub tags: Vec<TaggedTarget>,
    /// Description of the most recent step
    pub description: Option<String>,
}

impl VisualState {
    /// Display tag of `target`, `Default` if nothing marked it.
    pub fn tag_of(&self, target: Target) -> Tag {
        self.tags
            .binary_search_by(|t| t.target.cmp(&target))
            .map_or(Tag::Default, |i| self.tags[i].tag)
    }

    /// Targets currently carrying `tag`.
    pub fn tagged(&self, tag: Tag) -> impl Iterator<Item = Target> + '_ {
        self.tags.iter().filter(move |t| t.tag == tag).map(|t| t.target)
    }

    pub fn array(&self) -> Option<&[i64]> {
        match &self.structure {
            Structure::Array { values } => Some(values),
            _ => None,
        }
    }

    pub fn tree(&self) -> Option<&TreeShape> {
        match &self.structure {
            Structure::Tree { shape } => Some(shape),
            _ => None,
        }
    }

    pub fn distance(&self, vertex: u32) -> Option<i64> {
        match &self.structure {
            Structure::Graph { distances, .. } => {
                distances.get(vertex as usize).copied().flatten()
            }
            _ => None,
        }
    }
}

/// Project `log` at `cursor` (the number of steps applied).
pub fn project(log: &OperationLog, cursor: usize) -> Result<VisualState, TraceError> {
    if cursor > log.len() {
        return Err(TraceError::CursorOutOfRange {
            cursor,
            len: log.len(),
        });
    }

    let mut structure = match log.baseline() {
        Baseline::Empty => Structure::Empty,
        Baseline::Array { values } => Structure::Array {
            values: values.clone(),
        },
        Baseline::Tree { shape } => Structure::Tree {
            shape: shape.clone(),
        },
        Baseline::Graph { vertices } => Structure::Graph {
            vertices: vertices.clone(),
            distances: vec![None; vertices.len()],
        },
    };
    let mut sticky: BTreeMap<Target, Tag> = BTreeMap::new();

    let prefix = &log.steps()[..cursor];
    for (index, step) in prefix.iter().enumerate() {
        apply_structure(&mut structure, index, step)?;
        if step.tag.is_sticky() {
            for &target in &step.targets {
                if step.tag == Tag::Default {
                    sticky.remove(&target);
                } else {
                    sticky.insert(target, step.tag);
                }
            }
        }
    }

    let latest = prefix.last();
    if let Some(step) = latest.filter(|s| !s.tag.is_sticky()) {
        for &target in &step.targets {
            sticky.insert(target, step.tag);
        }
    }

    Ok(VisualState {
        cursor,
        total: log.len(),
        structure,
        tags: sticky
            .into_iter()
            .map(|(target, tag)| TaggedTarget { target, tag })
            .collect(),
        description: latest.map(|s| s.description.clone()),
    })
}

fn apply_structure(structure: &mut Structure, index: usize, step: &Step) -> Result<(), TraceError> {
    match (structure, step.kind) {
        (Structure::Array { values }, StepKind::Swap) => {
            if let &[Target::Element(a), Target::Element(b)] = &step.targets[..] {
                let len = values.len();
                for element in [a, b] {
                    if element >= len {
                        return Err(TraceError::ElementOutOfBounds {
                            step: index,
                            element,
                            len,
                        });
                    }
                }
                values.swap(a, b);
            }
        }
        (Structure::Array { values }, StepKind::Set) => {
            for &target in &step.targets {
                let Target::Element(element) = target else {
                    continue;
                };
                let len = values.len();
                match &step.payload {
                    Payload::Value(v) if element < len => values[element] = *v,
                    Payload::Value(v) if element == len => values.push(*v),
                    Payload::Empty if element < len => {
                        values.remove(element);
                    }
                    Payload::Tree(_) => {
                        return Err(TraceError::InvalidStep {
                            index,
                            defect: StepDefect::TreeOnElement,
                        })
                    }
                    _ => {
                        return Err(TraceError::ElementOutOfBounds {
                            step: index,
                            element,
                            len,
                        })
                    }
                }
            }
        }
        (structure, StepKind::Set) => match (&step.payload, structure) {
            (Payload::Tree(next), structure) => {
                *structure = Structure::Tree {
                    shape: next.clone(),
                };
            }
            (Payload::Value(v), Structure::Graph { distances, .. }) => {
                for &target in &step.targets {
                    if let Target::Vertex(vertex) = target {
                        if let Some(slot) = distances.get_mut(vertex as usize) {
                            *slot = Some(*v);
                        }
                    }
                }
            }
            _ => {}
        },
        _ => {}
    }
    Ok(())
}
