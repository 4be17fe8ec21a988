//! Single-source shortest and longest (critical) paths on a DAG.
//!
//! # Overview
//!
//! Both analyses are the same relaxation pass over a topological order and
//! differ only in the comparison used to accept a candidate distance:
//!
//! | Mode       | Start            | Accept `dist[u] + w` when |
//! |------------|------------------|---------------------------|
//! | `Shortest` | `+∞`, source `0` | strictly less             |
//! | `Longest`  | `−∞`, source `0` | strictly greater          |
//!
//! "Unreached" is `None` rather than an extreme integer, so adding a large
//! weight to an unreached slot can never wrap. Relaxation runs in `i128`, so
//! a candidate the mode discards may leave the `i64` range harmlessly; only a
//! final distance outside `i64` fails with [`PathError::DistanceOverflow`].
//!
//! # Algorithm
//!
//! 1. Topologically order the graph (Kahn). No order means the graph is
//!    cyclic and the analysis refuses to run ([`PathError::CyclicGraph`]).
//! 2. Walk the order. Nodes still unreached are skipped; for every reached
//!    node `u` each outgoing edge `u → v` is relaxed, recording `u` as the
//!    parent of `v` whenever `v` improves.
//! 3. Paths are rebuilt by following parent pointers back to the source.
//!
//! # Critical Path
//!
//! In longest mode the endpoint of the critical path is the reached node
//! with the greatest distance; ties go to the lowest node id.

#![allow(clippy::module_name_repetitions)]

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::graph::store::Graph;
use crate::graph::topo::topological_order;
use crate::metrics::{MetricsSink, NullSink};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Direction of the relaxation comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMode {
    /// Minimise total weight.
    Shortest,
    /// Maximise total weight (critical path).
    Longest,
}

impl PathMode {
    /// Human label used in reports (`"Shortest"` / `"Longest"`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shortest => "Shortest",
            Self::Longest => "Longest",
        }
    }

    /// Return `true` if `candidate` should replace `current`.
    const fn improves(self, candidate: i128, current: Option<i128>) -> bool {
        match current {
            None => true,
            Some(current) => match self {
                Self::Shortest => candidate < current,
                Self::Longest => candidate > current,
            },
        }
    }
}

/// Why a path analysis could not run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The graph has no topological order.
    #[error("graph contains a cycle; DAG path analysis needs an acyclic graph")]
    CyclicGraph,

    #[error("source node {node} is out of range for a graph with {node_count} nodes")]
    SourceOutOfRange { node: usize, node_count: usize },

    /// A final distance does not fit in `i64`.
    #[error("distance to node {node} overflows a 64-bit integer")]
    DistanceOverflow { node: usize },
}

/// The longest path found from the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriticalPath {
    /// Last node of the path.
    pub endpoint: usize,
    /// Total weight of the path.
    pub length: i64,
    /// Nodes from the source to `endpoint`, inclusive.
    pub path: Vec<usize>,
}

/// Distances and parent pointers from one relaxation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAnalysis {
    mode: PathMode,
    source: usize,
    distances: Vec<Option<i64>>,
    parents: Vec<Option<usize>>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Shortest distances from `source`. See [`analyze_paths`].
///
/// # Errors
///
/// Same as [`analyze_paths`].
pub fn shortest_paths<M>(graph: &Graph, source: usize, metrics: &mut M) -> Result<PathAnalysis, PathError>
where
    M: MetricsSink + ?Sized,
{
    analyze_paths(graph, source, PathMode::Shortest, metrics)
}

/// Longest distances from `source`. See [`analyze_paths`].
///
/// # Errors
///
/// Same as [`analyze_paths`].
pub fn longest_paths<M>(graph: &Graph, source: usize, metrics: &mut M) -> Result<PathAnalysis, PathError>
where
    M: MetricsSink + ?Sized,
{
    analyze_paths(graph, source, PathMode::Longest, metrics)
}

/// Run one relaxation pass over `graph` from `source` in `mode`.
///
/// Records one visit per reached node processed, one edge traversal per
/// outgoing edge of those nodes, and one relaxation per improved distance.
/// The internal topological sort is not counted, but the timer covers it.
///
/// # Errors
///
/// - [`PathError::SourceOutOfRange`] if `source` is not a node.
/// - [`PathError::CyclicGraph`] if `graph` has no topological order.
/// - [`PathError::DistanceOverflow`] if a final distance does not fit in
///   `i64`.
#[instrument(skip(graph, metrics), fields(nodes = graph.node_count()))]
pub fn analyze_paths<M>(
    graph: &Graph,
    source: usize,
    mode: PathMode,
    metrics: &mut M,
) -> Result<PathAnalysis, PathError>
where
    M: MetricsSink + ?Sized,
{
    if source >= graph.node_count() {
        return Err(PathError::SourceOutOfRange {
            node: source,
            node_count: graph.node_count(),
        });
    }

    metrics.start_timer();
    let result = relax_in_order(graph, source, mode, metrics);
    metrics.stop_timer();

    match &result {
        Ok(analysis) => debug!(
            mode = mode.label(),
            reached = analysis.reached_nodes().count(),
            "path analysis finished"
        ),
        Err(e) => warn!(mode = mode.label(), error = %e, "path analysis failed"),
    }
    result
}

fn relax_in_order<M>(
    graph: &Graph,
    source: usize,
    mode: PathMode,
    metrics: &mut M,
) -> Result<PathAnalysis, PathError>
where
    M: MetricsSink + ?Sized,
{
    let order = topological_order(graph, &mut NullSink).ok_or(PathError::CyclicGraph)?;

    // Each path has at most N - 1 edges of at most 2^63 magnitude, so the
    // wide sums cannot themselves overflow.
    let mut wide: Vec<Option<i128>> = vec![None; graph.node_count()];
    let mut parents: Vec<Option<usize>> = vec![None; graph.node_count()];
    wide[source] = Some(0);

    for u in order {
        let Some(du) = wide[u] else {
            continue;
        };
        metrics.record_visit();

        for edge in graph.edges(u) {
            metrics.record_edge();
            let v = edge.to;
            let candidate = du + i128::from(edge.weight);
            if mode.improves(candidate, wide[v]) {
                wide[v] = Some(candidate);
                parents[v] = Some(u);
                metrics.record_relaxation();
            }
        }
    }

    let distances = narrow_distances(wide)?;
    Ok(PathAnalysis {
        mode,
        source,
        distances,
        parents,
    })
}

/// Convert settled distances back to `i64`, failing on the lowest node id
/// whose distance does not fit.
fn narrow_distances(wide: Vec<Option<i128>>) -> Result<Vec<Option<i64>>, PathError> {
    wide.into_iter()
        .enumerate()
        .map(|(node, d)| {
            d.map(i64::try_from)
                .transpose()
                .map_err(|_| PathError::DistanceOverflow { node })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

impl PathAnalysis {
    #[must_use]
    pub const fn mode(&self) -> PathMode {
        self.mode
    }

    #[must_use]
    pub const fn source(&self) -> usize {
        self.source
    }

    /// Best distance to `node`, or `None` if it was never reached.
    #[must_use]
    pub fn distance(&self, node: usize) -> Option<i64> {
        self.distances.get(node).copied().flatten()
    }

    /// Distances indexed by node id.
    #[must_use]
    pub fn distances(&self) -> &[Option<i64>] {
        &self.distances
    }

    /// Predecessor of `node` on its best path.
    ///
    /// `None` for the source and for unreached nodes.
    #[must_use]
    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parents.get(node).copied().flatten()
    }

    /// Ids of every node with a distance, ascending.
    pub fn reached_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.distances
            .iter()
            .enumerate()
            .filter_map(|(node, d)| d.map(|_| node))
    }

    /// Nodes on the best path from the source to `target`, source first.
    ///
    /// `None` if `target` was not reached.
    #[must_use]
    pub fn reconstruct_path(&self, target: usize) -> Option<Vec<usize>> {
        self.distance(target)?;

        let mut path = vec![target];
        let mut current = target;
        while let Some(prev) = self.parent(current) {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        Some(path)
    }

    /// The critical path: the reached node with the greatest distance and
    /// the path to it. Ties go to the lowest node id.
    ///
    /// Only defined for [`PathMode::Longest`]; shortest-mode results
    /// return `None`.
    #[must_use]
    pub fn critical_path(&self) -> Option<CriticalPath> {
        if self.mode != PathMode::Longest {
            return None;
        }

        let mut best: Option<(usize, i64)> = None;
        for (node, &distance) in self.distances.iter().enumerate() {
            let Some(distance) = distance else {
                continue;
            };
            if best.is_none_or(|(_, max)| distance > max) {
                best = Some((node, distance));
            }
        }

        let (endpoint, length) = best?;
        Some(CriticalPath {
            endpoint,
            length,
            path: self.reconstruct_path(endpoint)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
