//! Adjacency-list graph store.
//!
//! # Overview
//!
//! Nodes are the integers `0..N`. Each node owns an ordered list of outgoing
//! [`Edge`]s; the order is insertion order and every traversal in the crate
//! follows it, so results are reproducible for a given input.
//!
//! ## Edge Direction
//!
//! An edge `A → B` means "A must finish before B can start". Weights are
//! signed and are carried through untouched (cost, duration, ...).
//!
//! ## Parallel Edges
//!
//! Unlike the condensation, the store keeps every edge it is given,
//! including repeated `(from, to)` pairs and self-loops.
//!
//! ## Content Hash
//!
//! [`Graph::content_hash`] is a BLAKE3 digest of the node count, direction
//! flag, source and edge list. Reports carry it so two runs over the same
//! dataset can be matched up.

#![allow(clippy::module_name_repetitions)]

use std::ops::Range;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Edge / errors
// ---------------------------------------------------------------------------

/// A weighted directed edge `from → to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub weight: i64,
}

/// Errors raised while populating a [`Graph`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An edge endpoint is not in `0..node_count`.
    #[error("node {node} is out of range for a graph with {node_count} nodes")]
    NodeOutOfRange { node: usize, node_count: usize },

    /// The source node is not in `0..node_count`.
    #[error("source node {node} is out of range for a graph with {node_count} nodes")]
    SourceOutOfRange { node: usize, node_count: usize },
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// A directed, edge-weighted graph over nodes `0..N`.
///
/// Built once (via [`Graph::new`] + [`Graph::add_edge`], or
/// [`Graph::from_edges`]) and then only read by the analysis stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    node_count: usize,
    directed: bool,
    source: usize,
    weight_model: String,
    adjacency: Vec<Vec<Edge>>,
}

impl Graph {
    /// Create a graph with `node_count` nodes and no edges.
    ///
    /// The source defaults to node `0` and the weight model to `""`.
    #[must_use]
    pub fn new(node_count: usize, directed: bool) -> Self {
        Self {
            node_count,
            directed,
            source: 0,
            weight_model: String::new(),
            adjacency: vec![Vec::new(); node_count],
        }
    }

    /// Build a directed graph from `(from, to, weight)` triples.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeOutOfRange`] on the first edge with an
    /// endpoint outside `0..node_count`.
    pub fn from_edges(node_count: usize, edges: &[(usize, usize, i64)]) -> Result<Self, GraphError> {
        let mut graph = Self::new(node_count, true);
        for &(from, to, weight) in edges {
            graph.add_edge(from, to, weight)?;
        }
        Ok(graph)
    }

    /// Assemble a graph whose adjacency lists are already known to be in range.
    pub(crate) fn from_parts(
        directed: bool,
        source: usize,
        weight_model: String,
        adjacency: Vec<Vec<Edge>>,
    ) -> Self {
        debug_assert!(
            adjacency
                .iter()
                .flatten()
                .all(|e| e.from < adjacency.len() && e.to < adjacency.len())
        );
        Self {
            node_count: adjacency.len(),
            directed,
            source,
            weight_model,
            adjacency,
        }
    }

    /// Append `from → to` (with `weight`) to `from`'s adjacency list.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeOutOfRange`] if either endpoint is not in
    /// `0..node_count`. The graph is left unchanged in that case.
    pub fn add_edge(&mut self, from: usize, to: usize, weight: i64) -> Result<(), GraphError> {
        for node in [from, to] {
            if node >= self.node_count {
                return Err(GraphError::NodeOutOfRange {
                    node,
                    node_count: self.node_count,
                });
            }
        }
        self.adjacency[from].push(Edge { from, to, weight });
        Ok(())
    }

    /// Set the designated source node for path analysis.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::SourceOutOfRange`] if `source` is not a node.
    pub fn set_source(&mut self, source: usize) -> Result<(), GraphError> {
        if source >= self.node_count {
            return Err(GraphError::SourceOutOfRange {
                node: source,
                node_count: self.node_count,
            });
        }
        self.source = source;
        Ok(())
    }

    /// Set the free-form weight model tag (e.g. `"edge"`, `"duration"`).
    pub fn set_weight_model(&mut self, weight_model: impl Into<String>) {
        self.weight_model = weight_model.into();
    }

    /// Number of nodes `N`.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    /// Total number of edges, parallel edges included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.directed
    }

    #[must_use]
    pub const fn source(&self) -> usize {
        self.source
    }

    #[must_use]
    pub fn weight_model(&self) -> &str {
        &self.weight_model
    }

    /// Node ids `0..N`.
    #[must_use]
    pub const fn nodes(&self) -> Range<usize> {
        0..self.node_count
    }

    /// Outgoing edges of `node` in insertion order.
    ///
    /// `node` must be in `0..N`; out-of-range ids are a caller bug that
    /// [`Graph::add_edge`] and [`Graph::set_source`] already reject at the
    /// boundary. Such ids get an empty slice here so traversal hot loops
    /// stay infallible.
    #[must_use]
    pub fn edges(&self, node: usize) -> &[Edge] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every edge, grouped by source node, each group in insertion order.
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacency.iter().flatten()
    }

    /// Return `true` if any node has an edge to itself.
    #[must_use]
    pub fn has_self_loop(&self) -> bool {
        self.all_edges().any(|e| e.from == e.to)
    }

    /// BLAKE3 hash of the graph's structure, formatted as `blake3:<hex>`.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.node_count.to_le_bytes());
        hasher.update(&[u8::from(self.directed)]);
        hasher.update(&self.source.to_le_bytes());
        for edge in self.all_edges() {
            hasher.update(&edge.from.to_le_bytes());
            hasher.update(&edge.to.to_le_bytes());
            hasher.update(&edge.weight.to_le_bytes());
        }
        format!("blake3:{}", hasher.finalize())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
