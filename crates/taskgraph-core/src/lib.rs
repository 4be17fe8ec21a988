#![forbid(unsafe_code)]
//! taskgraph-core library.
//!
//! Analysis pipeline for weighted task-dependency graphs:
//!
//! ```text
//! Graph (adjacency lists, nodes 0..N)
//!        ↓  graph::scc::find_sccs()            Tarjan, explicit work-stack
//! Vec<Component>
//!        ↓  graph::condense::Condensation::build()
//! condensation DAG (one node per component)
//!        ↓  graph::topo::topological_order()   Kahn, FIFO frontier
//! component order  →  topo::expand_component_order() → task order
//!        ↓  (original graph acyclic only)
//! graph::paths::{shortest_paths, longest_paths}
//! ```
//!
//! [`pipeline::run_pipeline`] drives all stages for one dataset and
//! returns a serializable [`pipeline::AnalysisReport`].
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums per stage; `anyhow::Result` at I/O
//!   boundaries ([`dataset`]).
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Metrics**: every stage writes into a caller-owned [`metrics::MetricsSink`].

pub mod dataset;
pub mod graph;
pub mod metrics;
pub mod pipeline;

pub use graph::{Component, Condensation, Edge, Graph, GraphError, PathAnalysis, PathMode};
pub use metrics::{Counters, MetricsSink, NullSink, StageMetrics};
pub use pipeline::{AnalysisReport, PipelineError, run_pipeline};
