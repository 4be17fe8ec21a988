//! Condensation of a graph by its strongly connected components.
//!
//! # Overview
//!
//! Each component from [`crate::graph::scc::find_sccs`] becomes one node of
//! the condensation; component `i` is the `i`-th entry of the partition
//! list. Every original edge `u → v` whose endpoints fall in different
//! components `cu ≠ cv` becomes a condensation edge `cu → cv`:
//!
//! - Intra-component edges (including self-loops) are dropped.
//! - Edges are deduplicated by the ordered pair `(cu, cv)`. The first edge
//!   seen, scanning nodes in id order and each adjacency list in insertion
//!   order, supplies the weight; later duplicates are dropped silently.
//!
//! The result is acyclic by construction: a cycle between components would
//! mean those components are mutually reachable and should have merged.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use crate::graph::scc::Component;
use crate::graph::store::{Edge, Graph};

/// A partition that does not assign every node to exactly one component.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionError {
    #[error("node {0} does not belong to any component")]
    MissingNode(usize),

    #[error("node {node} appears in both component {first} and component {second}")]
    DuplicateNode {
        node: usize,
        first: usize,
        second: usize,
    },

    #[error("component member {node} is out of range for a graph with {node_count} nodes")]
    MemberOutOfRange { node: usize, node_count: usize },
}

/// The condensation DAG plus the node → component mapping used to build it.
#[derive(Debug, Clone)]
pub struct Condensation {
    dag: Graph,
    component_of: Vec<usize>,
}

impl Condensation {
    /// Build the condensation of `graph` under the partition `components`.
    ///
    /// The condensation keeps the original weight model, and its source is
    /// the component holding the original source.
    ///
    /// # Errors
    ///
    /// Returns a [`PartitionError`] if some node is missing from the
    /// partition, listed twice, or out of range.
    #[instrument(skip(graph, components), fields(nodes = graph.node_count(), components = components.len()))]
    pub fn build(graph: &Graph, components: &[Component]) -> Result<Self, PartitionError> {
        let component_of = build_component_map(graph.node_count(), components).inspect_err(|e| {
            warn!(error = %e, "malformed SCC partition");
        })?;

        let mut adjacency: Vec<Vec<Edge>> = vec![Vec::new(); components.len()];
        let mut seen: HashSet<(usize, usize)> = HashSet::new();

        for edge in graph.all_edges() {
            let cu = component_of[edge.from];
            let cv = component_of[edge.to];
            if cu != cv && seen.insert((cu, cv)) {
                adjacency[cu].push(Edge {
                    from: cu,
                    to: cv,
                    weight: edge.weight,
                });
            }
        }

        let source = component_of.get(graph.source()).copied().unwrap_or(0);
        let dag = Graph::from_parts(true, source, graph.weight_model().to_string(), adjacency);

        debug!(
            condensed_nodes = dag.node_count(),
            condensed_edges = dag.edge_count(),
            "condensation built"
        );

        Ok(Self { dag, component_of })
    }

    /// The condensation DAG; node `i` is component `i`.
    #[must_use]
    pub const fn dag(&self) -> &Graph {
        &self.dag
    }

    #[must_use]
    pub fn into_dag(self) -> Graph {
        self.dag
    }

    /// Component index of an original node.
    #[must_use]
    pub fn component_of(&self, node: usize) -> Option<usize> {
        self.component_of.get(node).copied()
    }

    /// The full node → component mapping, indexed by original node id.
    #[must_use]
    pub fn mapping(&self) -> &[usize] {
        &self.component_of
    }

    /// Number of components (`K`).
    #[must_use]
    pub const fn component_count(&self) -> usize {
        self.dag.node_count()
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn build_component_map(
    node_count: usize,
    components: &[Component],
) -> Result<Vec<usize>, PartitionError> {
    let mut map: Vec<Option<usize>> = vec![None; node_count];

    for (idx, component) in components.iter().enumerate() {
        for &node in &component.members {
            let slot = map
                .get_mut(node)
                .ok_or(PartitionError::MemberOutOfRange { node, node_count })?;
            if let Some(first) = *slot {
                return Err(PartitionError::DuplicateNode {
                    node,
                    first,
                    second: idx,
                });
            }
            *slot = Some(idx);
        }
    }

    map.into_iter()
        .enumerate()
        .map(|(node, slot)| slot.ok_or(PartitionError::MissingNode(node)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
