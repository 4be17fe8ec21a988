//! Topological ordering with Kahn's algorithm.
//!
//! # Algorithm
//!
//! 1. One pass over all edges computes every node's in-degree.
//! 2. All zero in-degree nodes seed a FIFO frontier in ascending id order.
//! 3. Dequeue a node, append it to the order, and decrement the in-degree
//!    of each successor; a successor is enqueued the moment it reaches zero.
//!
//! Beyond the initial seeding, queue order is arrival order, not id order.
//! Both rules are observable in the output and are kept stable.
//!
//! If fewer than `N` nodes were emitted the graph has a cycle and the result
//! is `None`; a partial order is never returned.

use std::collections::VecDeque;

use tracing::{debug, instrument};

use crate::graph::scc::Component;
use crate::graph::store::Graph;
use crate::metrics::MetricsSink;

/// Compute a topological order of `graph`, or `None` if it contains a cycle.
///
/// Records one visit per dequeued node and one edge traversal per outgoing
/// edge examined. The in-degree scan is not counted.
#[instrument(skip(graph, metrics), fields(nodes = graph.node_count()))]
pub fn topological_order<M>(graph: &Graph, metrics: &mut M) -> Option<Vec<usize>>
where
    M: MetricsSink + ?Sized,
{
    metrics.start_timer();

    let mut in_degree = vec![0usize; graph.node_count()];
    for edge in graph.all_edges() {
        in_degree[edge.to] += 1;
    }

    let mut frontier: VecDeque<usize> = graph.nodes().filter(|&v| in_degree[v] == 0).collect();
    let mut order: Vec<usize> = Vec::with_capacity(graph.node_count());

    while let Some(u) = frontier.pop_front() {
        order.push(u);
        metrics.record_visit();

        for edge in graph.edges(u) {
            metrics.record_edge();
            let v = edge.to;
            in_degree[v] -= 1;
            if in_degree[v] == 0 {
                frontier.push_back(v);
            }
        }
    }

    metrics.stop_timer();

    if order.len() == graph.node_count() {
        debug!(len = order.len(), "topological order found");
        Some(order)
    } else {
        debug!(
            ordered = order.len(),
            nodes = graph.node_count(),
            "graph contains a cycle; no topological order"
        );
        None
    }
}

/// Return `true` if `order` lists every node of `graph` exactly once and
/// places `u` before `v` for every edge `u → v`.
#[must_use]
pub fn is_topological_order(graph: &Graph, order: &[usize]) -> bool {
    if order.len() != graph.node_count() {
        return false;
    }

    let mut position: Vec<Option<usize>> = vec![None; graph.node_count()];
    for (pos, &node) in order.iter().enumerate() {
        let Some(slot) = position.get_mut(node) else {
            return false;
        };
        if slot.replace(pos).is_some() {
            return false;
        }
    }

    graph
        .all_edges()
        .all(|e| position[e.from] < position[e.to])
}

/// Expand an order over component ids into an order over original nodes.
///
/// For each component id in `component_order`, the component's members are
/// appended in their partition order. Returns `None` if the order names a
/// component that is not in `components`.
#[must_use]
pub fn expand_component_order(
    component_order: &[usize],
    components: &[Component],
) -> Option<Vec<usize>> {
    let total = components.iter().map(Component::len).sum();
    let mut tasks = Vec::with_capacity(total);
    for &id in component_order {
        tasks.extend_from_slice(&components.get(id)?.members);
    }
    Some(tasks)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
