//! Weighted undirected graphs and their traversals.
//!
//! Each traversal keeps an explicit frontier and visited set. A vertex is
//! highlighted when it leaves the frontier and is marked visited; every
//! neighbor examined gets a compare step on the connecting edge.
//!
//! Dijkstra picks the next vertex by a linear scan of the frontier, so it runs
//! in O(V^2), not O((V + E) log V). Ties go to the vertex that entered the
//! frontier first.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use stepwise_trace::{AlgorithmFamily, Baseline, LogBuilder, Payload, Step, Tag, Target};

use crate::Run;

/// An edge as supplied by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    pub weight: u32,
}

impl EdgeSpec {
    pub fn new(from: impl Into<String>, to: impl Into<String>, weight: u32) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight,
        }
    }
}

/// Undirected weighted graph. Neighbor order follows edge insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    names: Vec<String>,
    adjacency: Vec<Vec<(u32, u32)>>,
}

/// Visit order of a BFS or DFS.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traversal {
    pub order: Vec<u32>,
    pub found: Option<u32>,
}

/// Result of Dijkstra's algorithm.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortestPaths {
    pub distances: Vec<Option<u64>>,
    pub previous: Vec<Option<u32>>,
    pub order: Vec<u32>,
    pub found: Option<u32>,
}

impl ShortestPaths {
    /// Vertices from the source to `target`, if it was reached.
    pub fn path_to(&self, target: u32) -> Option<Vec<u32>> {
        self.distances.get(target as usize).copied().flatten()?;
        let mut path = vec![target];
        let mut cursor = target;
        while let Some(prev) = self.previous[cursor as usize] {
            path.push(prev);
            cursor = prev;
        }
        path.reverse();
        Some(path)
    }
}

#[derive(Debug, Clone, Copy)]
enum Frontier {
    Queue,
    Stack,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges(edges: &[EdgeSpec]) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(&edge.from, &edge.to, edge.weight);
        }
        graph
    }

    /// The six-vertex fixture used throughout the catalog.
    pub fn sample() -> Self {
        Self::from_edges(&[
            EdgeSpec::new("A", "B", 4),
            EdgeSpec::new("A", "C", 2),
            EdgeSpec::new("A", "D", 3),
            EdgeSpec::new("B", "C", 1),
            EdgeSpec::new("B", "D", 5),
            EdgeSpec::new("C", "E", 3),
            EdgeSpec::new("D", "E", 2),
            EdgeSpec::new("E", "F", 1),
        ])
    }

    /// Add a vertex, or return the existing one with that name.
    pub fn add_vertex(&mut self, name: &str) -> u32 {
        if let Some(id) = self.vertex(name) {
            return id;
        }
        self.names.push(name.to_string());
        self.adjacency.push(Vec::new());
        (self.names.len() - 1) as u32
    }

    pub fn add_edge(&mut self, from: &str, to: &str, weight: u32) {
        let a = self.add_vertex(from);
        let b = self.add_vertex(to);
        self.adjacency[a as usize].push((b, weight));
        if a != b {
            self.adjacency[b as usize].push((a, weight));
        }
    }

    pub fn vertex(&self, name: &str) -> Option<u32> {
        self.names.iter().position(|n| n == name).map(|i| i as u32)
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    pub fn vertex_count(&self) -> usize {
        self.names.len()
    }

    pub fn edges(&self) -> Vec<EdgeSpec> {
        let mut out = Vec::new();
        for (a, neighbors) in self.adjacency.iter().enumerate() {
            for &(b, weight) in neighbors {
                if a as u32 <= b {
                    out.push(EdgeSpec::new(&self.names[a], &self.names[b as usize], weight));
                }
            }
        }
        out
    }

    /// Neighbors with edge weights, in insertion order.
    pub fn neighbors(&self, id: u32) -> &[(u32, u32)] {
        self.adjacency
            .get(id as usize)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn label(&self, id: u32) -> &str {
        self.name(id).unwrap_or("?")
    }

    fn builder(&self) -> LogBuilder {
        LogBuilder::new(
            AlgorithmFamily::Graph,
            Baseline::Graph {
                vertices: self.names.clone(),
            },
        )
    }

    /// Resolve start and optional target names, or explain which is unknown.
    fn endpoints(&self, start: &str, target: Option<&str>) -> Result<(u32, Option<u32>), String> {
        let start = self
            .vertex(start)
            .ok_or_else(|| format!("Unknown start vertex {start}"))?;
        let target = match target {
            Some(name) => Some(
                self.vertex(name)
                    .ok_or_else(|| format!("Unknown target vertex {name}"))?,
            ),
            None => None,
        };
        Ok((start, target))
    }

    pub fn bfs(&self, start: &str, target: Option<&str>) -> Run<Traversal> {
        self.traverse(Frontier::Queue, start, target)
    }

    pub fn dfs(&self, start: &str, target: Option<&str>) -> Run<Traversal> {
        self.traverse(Frontier::Stack, start, target)
    }

    fn traverse(&self, frontier: Frontier, start: &str, target: Option<&str>) -> Run<Traversal> {
        let mut log = self.builder();
        let (start, target) = match self.endpoints(start, target) {
            Ok(ends) => ends,
            Err(reason) => {
                return Run {
                    log: log.fail(reason),
                    output: Traversal::default(),
                }
            }
        };

        let n = self.vertex_count();
        let mut visited = vec![false; n];
        let mut discovered = vec![false; n];
        let mut pending = VecDeque::from([start]);
        let mut result = Traversal::default();
        discovered[start as usize] = true;

        let verb = match frontier {
            Frontier::Queue => "Dequeue",
            Frontier::Stack => "Pop",
        };

        loop {
            let next = match frontier {
                Frontier::Queue => pending.pop_front(),
                Frontier::Stack => pending.pop_back(),
            };
            let Some(u) = next else {
                break;
            };
            if visited[u as usize] {
                continue;
            }
            visited[u as usize] = true;
            result.order.push(u);
            log.push(
                Step::highlight(
                    [Target::Vertex(u)],
                    format!("{verb} {} and mark it visited", self.label(u)),
                )
                .with_tag(Tag::Visited),
            );

            if target == Some(u) {
                log.push(
                    Step::highlight([Target::Vertex(u)], format!("Found {}", self.label(u)))
                        .with_tag(Tag::Found),
                );
                result.found = Some(u);
                break;
            }

            let mut fresh = Vec::new();
            for &(v, _) in self.neighbors(u) {
                let note = match frontier {
                    Frontier::Queue if !discovered[v as usize] => "enqueue it",
                    Frontier::Stack if !visited[v as usize] => "push it",
                    _ => "already seen",
                };
                log.push(Step::compare(
                    [Target::edge(u, v), Target::Vertex(v)],
                    format!("Examine {}-{}: {note}", self.label(u), self.label(v)),
                ));
                match frontier {
                    Frontier::Queue if !discovered[v as usize] => {
                        discovered[v as usize] = true;
                        pending.push_back(v);
                    }
                    Frontier::Stack if !visited[v as usize] => fresh.push(v),
                    _ => {}
                }
            }
            // Reversed so the first neighbor ends on top of the stack
            pending.extend(fresh.into_iter().rev());
        }

        tracing::debug!(
            ?frontier,
            visited = result.order.len(),
            steps = log.len(),
            "traversal recorded"
        );
        Run {
            log: log.finish(),
            output: result,
        }
    }

    pub fn dijkstra(&self, start: &str, target: Option<&str>) -> Run<ShortestPaths> {
        let mut log = self.builder();
        let (start, target) = match self.endpoints(start, target) {
            Ok(ends) => ends,
            Err(reason) => {
                return Run {
                    log: log.fail(reason),
                    output: ShortestPaths::default(),
                }
            }
        };

        let n = self.vertex_count();
        let mut paths = ShortestPaths {
            distances: vec![None; n],
            previous: vec![None; n],
            order: Vec::new(),
            found: None,
        };
        let mut visited = vec![false; n];
        // Vertices in the order they first received a tentative distance
        let mut frontier = vec![start];
        paths.distances[start as usize] = Some(0);
        log.push(
            Step::set(
                [Target::Vertex(start)],
                format!("Distance to {} is 0", self.label(start)),
            )
            .with_payload(Payload::Value(0)),
        );

        loop {
            let mut best: Option<(u32, u64)> = None;
            for &v in &frontier {
                if visited[v as usize] {
                    continue;
                }
                if let Some(d) = paths.distances[v as usize] {
                    if best.map_or(true, |(_, bd)| d < bd) {
                        best = Some((v, d));
                    }
                }
            }
            let Some((u, du)) = best else {
                break;
            };

            visited[u as usize] = true;
            paths.order.push(u);
            log.push(
                Step::highlight(
                    [Target::Vertex(u)],
                    format!("Select {} (distance {du})", self.label(u)),
                )
                .with_tag(Tag::Visited),
            );

            if target == Some(u) {
                paths.found = Some(u);
                self.record_path(&paths, u, &mut log);
                break;
            }

            for &(v, weight) in self.neighbors(u) {
                let edge = Target::edge(u, v);
                if visited[v as usize] {
                    log.push(Step::compare(
                        [edge, Target::Vertex(v)],
                        format!("Examine {}-{}: already settled", self.label(u), self.label(v)),
                    ));
                    continue;
                }

                let candidate = du + u64::from(weight);
                let current = paths.distances[v as usize];
                let shown = current.map_or("inf".to_string(), |d| d.to_string());
                log.push(Step::compare(
                    [edge, Target::Vertex(v)],
                    format!(
                        "Examine {}-{}: {du} + {weight} = {candidate} vs {shown}",
                        self.label(u),
                        self.label(v)
                    ),
                ));

                if current.map_or(true, |d| candidate < d) {
                    if current.is_none() {
                        frontier.push(v);
                    }
                    paths.distances[v as usize] = Some(candidate);
                    paths.previous[v as usize] = Some(u);
                    log.push(
                        Step::set(
                            [Target::Vertex(v)],
                            format!(
                                "Distance to {} improves to {candidate} via {}",
                                self.label(v),
                                self.label(u)
                            ),
                        )
                        .with_payload(Payload::Value(i64::try_from(candidate).unwrap_or(i64::MAX))),
                    );
                }
            }
        }

        tracing::debug!(
            settled = paths.order.len(),
            steps = log.len(),
            "dijkstra recorded"
        );
        Run {
            log: log.finish(),
            output: paths,
        }
    }

    fn record_path(&self, paths: &ShortestPaths, target: u32, log: &mut LogBuilder) {
        let Some(path) = paths.path_to(target) else {
            return;
        };
        let mut targets: Vec<Target> = path.iter().map(|&v| Target::Vertex(v)).collect();
        targets.extend(path.windows(2).map(|w| Target::edge(w[0], w[1])));

        let names: Vec<&str> = path.iter().map(|&v| self.label(v)).collect();
        let distance = paths.distances[target as usize].unwrap_or_default();
        log.push(
            Step::highlight(
                targets,
                format!(
                    "Found {}: shortest path {} ({distance})",
                    self.label(target),
                    names.join(" -> ")
                ),
            )
            .with_tag(Tag::Found),
        );
    }
}
