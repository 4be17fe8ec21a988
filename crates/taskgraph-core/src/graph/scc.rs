//! Strongly connected components via Tarjan's low-link algorithm.
//!
//! # Algorithm
//!
//! Every node gets a discovery index on first visit and a low-link value
//! initialised to that index. Nodes on the current search path sit on an
//! explicit stack with an `on_stack` marker for O(1) membership checks.
//! For an edge `u → v`:
//!
//! - `v` undiscovered: descend; when `v` finishes, `low[u] = min(low[u], low[v])`.
//! - `v` discovered and on the stack: `low[u] = min(low[u], disc[v])`.
//! - `v` discovered and off the stack: ignored (its component is final).
//!
//! When `low[u] == disc[u]`, `u` roots a component: the stack is popped
//! down to and including `u`.
//!
//! The search runs from every undiscovered node in ascending id order, so
//! all nodes are covered regardless of reachability.
//!
//! # Work-stack
//!
//! The descent is driven by a `Vec<Frame>` of `(node, edge cursor)` pairs
//! rather than native recursion, so depth is bounded by heap memory instead
//! of the thread stack.
//!
//! # Output Order
//!
//! Components come out in the order their roots are popped, which is a
//! reverse topological order of the condensation. Members are listed in pop
//! order (the root last). Callers should not rely on either ordering.

#![allow(clippy::module_name_repetitions)]

use serde::Serialize;
use tracing::{debug, instrument};

use crate::graph::store::Graph;
use crate::metrics::MetricsSink;

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// One strongly connected component: nodes that are all mutually reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    /// Member node ids, in the order they were popped off the Tarjan stack.
    pub members: Vec<usize>,
}

impl Component {
    /// Return `true` if this component has more than one node (a dependency cycle).
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        self.members.len() > 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Count the components that contain more than one node.
#[must_use]
pub fn cyclic_component_count(components: &[Component]) -> usize {
    components.iter().filter(|c| c.is_cycle()).count()
}

// ---------------------------------------------------------------------------
// Tarjan
// ---------------------------------------------------------------------------

/// Partition `graph` into strongly connected components.
///
/// Records one visit per node entered and one edge traversal per adjacency
/// entry examined (edges into finished components included).
#[instrument(skip(graph, metrics), fields(nodes = graph.node_count()))]
pub fn find_sccs<M>(graph: &Graph, metrics: &mut M) -> Vec<Component>
where
    M: MetricsSink + ?Sized,
{
    metrics.start_timer();

    let mut state = TarjanState::new(graph.node_count());
    for root in graph.nodes() {
        if state.disc[root].is_none() {
            state.search_from(graph, root, metrics);
        }
    }

    metrics.stop_timer();

    debug!(
        components = state.components.len(),
        cyclic = cyclic_component_count(&state.components),
        "tarjan finished"
    );
    state.components
}

/// One suspended DFS call: the node and the index of its next edge.
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: usize,
    cursor: usize,
}

struct TarjanState {
    next_index: usize,
    disc: Vec<Option<usize>>,
    low: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    components: Vec<Component>,
}

impl TarjanState {
    fn new(node_count: usize) -> Self {
        Self {
            next_index: 0,
            disc: vec![None; node_count],
            low: vec![0; node_count],
            on_stack: vec![false; node_count],
            stack: Vec::new(),
            components: Vec::new(),
        }
    }

    fn enter<M: MetricsSink + ?Sized>(&mut self, node: usize, metrics: &mut M) {
        let index = self.next_index;
        self.next_index += 1;
        self.disc[node] = Some(index);
        self.low[node] = index;
        self.stack.push(node);
        self.on_stack[node] = true;
        metrics.record_visit();
    }

    fn search_from<M: MetricsSink + ?Sized>(&mut self, graph: &Graph, root: usize, metrics: &mut M) {
        self.enter(root, metrics);
        let mut frames = vec![Frame {
            node: root,
            cursor: 0,
        }];

        while let Some(frame) = frames.last_mut() {
            let u = frame.node;

            if let Some(edge) = graph.edges(u).get(frame.cursor) {
                frame.cursor += 1;
                metrics.record_edge();

                let v = edge.to;
                match self.disc[v] {
                    None => {
                        self.enter(v, metrics);
                        frames.push(Frame { node: v, cursor: 0 });
                    }
                    Some(index) if self.on_stack[v] => {
                        self.low[u] = self.low[u].min(index);
                    }
                    Some(_) => {}
                }
            } else {
                // All edges of `u` examined: finish it and propagate its
                // low-link to the caller frame.
                frames.pop();
                if self.disc[u] == Some(self.low[u]) {
                    self.pop_component(u);
                }
                if let Some(parent) = frames.last() {
                    self.low[parent.node] = self.low[parent.node].min(self.low[u]);
                }
            }
        }
    }

    fn pop_component(&mut self, root: usize) {
        let mut members = Vec::new();
        while let Some(node) = self.stack.pop() {
            self.on_stack[node] = false;
            members.push(node);
            if node == root {
                break;
            }
        }
        self.components.push(Component { members });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
