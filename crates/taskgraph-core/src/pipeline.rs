//! End-to-end analysis of one dataset.
//!
//! # Stages
//!
//! 1. Tarjan SCC on the original graph.
//! 2. Condensation over the resulting partition.
//! 3. Kahn order of the condensation, expanded back to a task order.
//! 4. Shortest and longest paths from the graph's source, only when the
//!    original graph is itself acyclic (every component is a singleton and
//!    there are no self-loops). Otherwise `paths` is `None`.
//!
//! Each stage writes into its own fresh [`Counters`]; the report keeps a
//! [`StageMetrics`] snapshot per stage so a results log can be written
//! without re-running anything.

use serde::Serialize;
use tracing::{info, instrument};

use crate::graph::condense::{Condensation, PartitionError};
use crate::graph::paths::{CriticalPath, PathAnalysis, PathError, PathMode, analyze_paths};
use crate::graph::scc::{Component, cyclic_component_count, find_sccs};
use crate::graph::store::Graph;
use crate::graph::topo::{expand_component_order, topological_order};
use crate::metrics::{Counters, StageMetrics};

/// A stage failed on input that should have been valid for it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Partition(#[from] PartitionError),

    #[error(transparent)]
    Path(#[from] PathError),
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Everything computed for one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub node_count: usize,
    pub edge_count: usize,
    pub weight_model: String,
    pub content_hash: String,
    pub source: usize,
    pub scc: SccReport,
    pub condensation: CondensationReport,
    pub topo: TopoReport,
    /// `None` when the graph has cycles and path analysis was skipped.
    pub paths: Option<PathsReport>,
}

/// Output of the SCC stage.
#[derive(Debug, Clone, Serialize)]
pub struct SccReport {
    pub components: Vec<Component>,
    pub cyclic_components: usize,
    pub metrics: StageMetrics,
}

/// Shape of the condensation DAG.
#[derive(Debug, Clone, Serialize)]
pub struct CondensationReport {
    pub node_count: usize,
    pub edge_count: usize,
    /// Component index of every original node.
    pub component_of: Vec<usize>,
}

/// Output of Kahn's algorithm on the condensation.
#[derive(Debug, Clone, Serialize)]
pub struct TopoReport {
    /// Order over component ids; `None` if the condensation had a cycle.
    pub order: Option<Vec<usize>>,
    /// `order` expanded to original task ids.
    pub derived_task_order: Option<Vec<usize>>,
    pub metrics: StageMetrics,
}

/// Both path analyses from the graph's source.
#[derive(Debug, Clone, Serialize)]
pub struct PathsReport {
    pub shortest: PathReport,
    pub longest: PathReport,
}

/// One relaxation pass, flattened for output.
#[derive(Debug, Clone, Serialize)]
pub struct PathReport {
    pub mode: PathMode,
    pub source: usize,
    /// Distance per node; `None` = unreachable.
    pub distances: Vec<Option<i64>>,
    /// Reconstructed path per node; `None` = unreachable.
    pub paths: Vec<Option<Vec<usize>>>,
    /// Only present for [`PathMode::Longest`].
    pub critical_path: Option<CriticalPath>,
    pub metrics: StageMetrics,
}

impl PathReport {
    fn from_analysis(analysis: &PathAnalysis, metrics: StageMetrics) -> Self {
        let paths = (0..analysis.distances().len())
            .map(|node| analysis.reconstruct_path(node))
            .collect();
        Self {
            mode: analysis.mode(),
            source: analysis.source(),
            distances: analysis.distances().to_vec(),
            paths,
            critical_path: analysis.critical_path(),
            metrics,
        }
    }
}

impl AnalysisReport {
    /// Number of strongly connected components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.scc.components.len()
    }

    /// Return `true` if Kahn's algorithm produced an order for the condensation.
    #[must_use]
    pub const fn has_order(&self) -> bool {
        self.topo.order.is_some()
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Run every stage on `graph`.
///
/// # Errors
///
/// - [`PipelineError::Partition`] if the SCC partition is malformed (a bug
///   in the decomposer, never expected in practice).
/// - [`PipelineError::Path`] if path analysis runs and fails (source out of
///   range, or a distance overflow).
#[instrument(skip(graph), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn run_pipeline(graph: &Graph) -> Result<AnalysisReport, PipelineError> {
    // 1. SCCs
    let mut scc_metrics = Counters::new();
    let components = find_sccs(graph, &mut scc_metrics);

    // 2. Condensation
    let condensation = Condensation::build(graph, &components)?;

    // 3. Topological order of the condensation
    let mut topo_metrics = Counters::new();
    let order = topological_order(condensation.dag(), &mut topo_metrics);
    let derived_task_order = order
        .as_deref()
        .and_then(|order| expand_component_order(order, &components));

    // 4. Paths, only if the original graph is a DAG
    let acyclic = order.is_some()
        && components.len() == graph.node_count()
        && !graph.has_self_loop();
    let paths = if acyclic && graph.node_count() > 0 {
        Some(run_path_analyses(graph)?)
    } else {
        info!("skipping shortest/longest path analysis (graph has cycles or no nodes)");
        None
    };

    info!(
        components = components.len(),
        condensed_edges = condensation.dag().edge_count(),
        ordered = order.is_some(),
        paths = paths.is_some(),
        "pipeline finished"
    );

    Ok(AnalysisReport {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        weight_model: graph.weight_model().to_string(),
        content_hash: graph.content_hash(),
        source: graph.source(),
        scc: SccReport {
            cyclic_components: cyclic_component_count(&components),
            components,
            metrics: scc_metrics.snapshot(),
        },
        condensation: CondensationReport {
            node_count: condensation.component_count(),
            edge_count: condensation.dag().edge_count(),
            component_of: condensation.mapping().to_vec(),
        },
        topo: TopoReport {
            order,
            derived_task_order,
            metrics: topo_metrics.snapshot(),
        },
        paths,
    })
}

fn run_path_analyses(graph: &Graph) -> Result<PathsReport, PathError> {
    let source = graph.source();

    let mut sp_metrics = Counters::new();
    let shortest = analyze_paths(graph, source, PathMode::Shortest, &mut sp_metrics)?;

    let mut lp_metrics = Counters::new();
    let longest = analyze_paths(graph, source, PathMode::Longest, &mut lp_metrics)?;

    Ok(PathsReport {
        shortest: PathReport::from_analysis(&shortest, sp_metrics.snapshot()),
        longest: PathReport::from_analysis(&longest, lp_metrics.snapshot()),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(node_count: usize, edges: &[(usize, usize, i64)]) -> Graph {
        Graph::from_edges(node_count, edges).expect("graph")
    }

    #[test]
    fn acyclic_graph_gets_full_report() {
        let g = graph(4, &[(0, 1, 1), (0, 2, 5), (1, 3, 4), (2, 3, 2)]);
        let report = run_pipeline(&g).expect("pipeline");

        assert_eq!(report.component_count(), 4);
        assert_eq!(report.scc.cyclic_components, 0);
        assert_eq!(report.condensation.node_count, 4);
        assert_eq!(report.condensation.edge_count, 4);
        assert!(report.has_order());

        let paths = report.paths.expect("acyclic → paths");
        assert_eq!(paths.shortest.distances[3], Some(5));
        assert_eq!(paths.longest.distances[3], Some(7));
        assert_eq!(paths.shortest.critical_path, None);

        let critical = paths.longest.critical_path.expect("critical path");
        assert_eq!(critical.path, vec![0, 2, 3]);
        assert_eq!(critical.length, 7);
    }

    #[test]
    fn derived_task_order_is_a_valid_order_for_a_dag() {
        let g = graph(4, &[(0, 1, 1), (0, 2, 1), (1, 3, 1), (2, 3, 1)]);
        let report = run_pipeline(&g).expect("pipeline");
        let tasks = report.topo.derived_task_order.expect("order");
        assert!(crate::graph::topo::is_topological_order(&g, &tasks));
    }

    #[test]
    fn cyclic_graph_skips_paths_but_orders_components() {
        // {0,1,2} cycle → 3
        let g = graph(4, &[(0, 1, 1), (1, 2, 1), (2, 0, 1), (2, 3, 1)]);
        let report = run_pipeline(&g).expect("pipeline");

        assert_eq!(report.component_count(), 2);
        assert_eq!(report.scc.cyclic_components, 1);
        assert!(report.paths.is_none());

        let order = report.topo.order.expect("condensation is a DAG");
        assert_eq!(order.len(), 2);

        let mut tasks = report.topo.derived_task_order.expect("derived");
        assert_eq!(tasks.last(), Some(&3), "the tail runs after the cycle");
        tasks.sort_unstable();
        assert_eq!(tasks, vec![0, 1, 2, 3]);
    }

    #[test]
    fn self_loop_skips_paths_instead_of_failing() {
        let g = graph(2, &[(0, 1, 1), (1, 1, 1)]);
        let report = run_pipeline(&g).expect("pipeline");
        assert_eq!(report.component_count(), 2);
        assert!(report.paths.is_none());
    }

    #[test]
    fn empty_graph_reports_nothing_to_do() {
        let report = run_pipeline(&Graph::new(0, true)).expect("pipeline");
        assert_eq!(report.component_count(), 0);
        assert_eq!(report.topo.order, Some(vec![]));
        assert!(report.paths.is_none());
    }

    #[test]
    fn unreachable_nodes_have_no_path_in_report() {
        let mut g = graph(3, &[(0, 1, 2), (2, 1, 1)]);
        g.set_source(0).expect("source");
        let report = run_pipeline(&g).expect("pipeline");
        let paths = report.paths.expect("acyclic");
        assert_eq!(paths.shortest.distances[2], None);
        assert_eq!(paths.shortest.paths[2], None);
        assert_eq!(paths.shortest.paths[1], Some(vec![0, 1]));
    }

    #[test]
    fn stage_metrics_are_captured() {
        let g = graph(3, &[(0, 1, 1), (1, 2, 1)]);
        let report = run_pipeline(&g).expect("pipeline");

        assert_eq!(report.scc.metrics.visits, 3);
        assert_eq!(report.scc.metrics.edge_traversals, 2);
        assert_eq!(report.topo.metrics.visits, 3);
        let paths = report.paths.expect("acyclic");
        assert_eq!(paths.shortest.metrics.relaxations, 2);
        assert_eq!(paths.longest.metrics.relaxations, 2);
    }

    #[test]
    fn extreme_weights_that_settle_in_range_run_paths() {
        let g = graph(4, &[(0, 1, i64::MAX), (0, 2, i64::MIN), (1, 3, i64::MIN)]);
        let report = run_pipeline(&g).expect("distances fit");
        let paths = report.paths.expect("acyclic");
        assert_eq!(paths.shortest.distances[2], Some(i64::MIN));
        assert_eq!(paths.longest.distances[3], Some(-1));
    }

    #[test]
    fn overflow_propagates_as_pipeline_error() {
        let g = graph(3, &[(0, 1, i64::MAX), (1, 2, 1)]);
        let err = run_pipeline(&g).expect_err("overflow");
        assert_eq!(
            err,
            PipelineError::Path(PathError::DistanceOverflow { node: 2 })
        );
    }

    #[test]
    fn report_serializes_to_json() {
        let g = graph(2, &[(0, 1, 3)]);
        let report = run_pipeline(&g).expect("pipeline");
        let json = serde_json::to_value(&report).expect("serialize");

        assert_eq!(json["node_count"], 2);
        assert_eq!(json["paths"]["longest"]["mode"], "longest");
        assert_eq!(json["paths"]["shortest"]["distances"][1], 3);
        assert!(json["content_hash"].as_str().is_some_and(|h| h.starts_with("blake3:")));
    }
}
