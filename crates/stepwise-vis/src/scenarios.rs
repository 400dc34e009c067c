//! Saved scenarios.
//!
//! A scenario is a named [`Request`]: the input of a run, never its log.
//! Running a scenario regenerates the log from scratch.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use stepwise_algorithms::{
    GraphAction, HeapAction, HeapOrder, Request, SearchMethod, SortAlgorithm, TreeAction,
};

use crate::error::{Error, Result};

/// Storage for named scenarios.
pub trait ScenarioStore: Send + Sync {
    /// Save `request` under `name`, replacing any previous scenario.
    fn save(&self, name: &str, request: Request) -> Result<()>;

    fn load(&self, name: &str) -> Result<Request>;

    /// Names in ascending order.
    fn list(&self) -> Result<Vec<String>>;

    fn delete(&self, name: &str) -> Result<()>;
}

/// In-memory scenario store.
#[derive(Debug, Default)]
pub struct MemoryScenarios {
    entries: Mutex<BTreeMap<String, Request>>,
}

impl MemoryScenarios {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with a few demonstration runs.
    pub fn with_samples() -> Self {
        let samples = [
            (
                "bubble-sort",
                Request::Sort {
                    algorithm: SortAlgorithm::Bubble,
                    values: vec![5, 1, 4, 2, 8],
                },
            ),
            (
                "binary-search",
                Request::Search {
                    method: SearchMethod::Binary,
                    values: vec![2, 5, 8, 12, 16, 23, 38, 56, 72, 91],
                    key: 23,
                },
            ),
            (
                "avl-build",
                Request::Avl {
                    action: TreeAction::Build {
                        values: vec![10, 20, 30, 40, 50, 25],
                    },
                },
            ),
            (
                "max-heap",
                Request::Heap {
                    action: HeapAction::Build {
                        order: HeapOrder::Max,
                        values: vec![3, 9, 2, 1, 4, 5],
                    },
                },
            ),
            (
                "dijkstra",
                Request::Graph {
                    action: GraphAction::Dijkstra {
                        start: "A".into(),
                        target: Some("F".into()),
                    },
                },
            ),
        ];

        Self {
            entries: Mutex::new(
                samples
                    .into_iter()
                    .map(|(name, request)| (name.to_string(), request))
                    .collect(),
            ),
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Request>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn check_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("scenario name is empty".into()));
    }
    Ok(name)
}

impl ScenarioStore for MemoryScenarios {
    fn save(&self, name: &str, request: Request) -> Result<()> {
        let name = check_name(name)?;
        self.entries().insert(name.to_string(), request);
        tracing::debug!(name, "scenario saved");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Request> {
        self.entries()
            .get(name.trim())
            .cloned()
            .ok_or_else(|| Error::ScenarioNotFound(name.to_string()))
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.entries().keys().cloned().collect())
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.entries()
            .remove(name.trim())
            .map(|_| ())
            .ok_or_else(|| Error::ScenarioNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_algorithms::{StackAction, Structures};

    #[test]
    fn save_load_delete() {
        let store = MemoryScenarios::new();
        let request = Request::Stack {
            action: StackAction::Push { value: 3 },
        };
        store.save("push", request.clone()).unwrap();
        assert_eq!(store.load("push").unwrap(), request);
        assert_eq!(store.list().unwrap(), vec!["push".to_string()]);

        store.delete("push").unwrap();
        assert!(matches!(store.load("push"), Err(Error::ScenarioNotFound(_))));
        assert!(matches!(store.delete("push"), Err(Error::ScenarioNotFound(_))));
    }

    #[test]
    fn empty_name_rejected() {
        let store = MemoryScenarios::new();
        let request = Request::Queue {
            action: stepwise_algorithms::QueueAction::Peek,
        };
        assert!(matches!(store.save("  ", request), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn samples_run_cleanly() {
        let store = MemoryScenarios::with_samples();
        let names = store.list().unwrap();
        assert_eq!(names.len(), 5);
        for name in names {
            let request = store.load(&name).unwrap();
            let run = Structures::default().run(&request);
            assert!(!run.log.is_failed(), "{name}");
            assert!(!run.log.is_empty(), "{name}");
        }
    }
}
