//! Task-dependency graph and the four analysis stages.
//!
//! # Overview
//!
//! An edge `A → B` means "A must complete before B". The raw graph may
//! contain cycles; the stages below find them, collapse them, and, when the
//! graph turns out to be acyclic, compute shortest and critical paths.
//!
//! ## Pipeline
//!
//! ```text
//! store::Graph (may contain cycles)
//!        ↓  scc::find_sccs()
//! Vec<Component> (partition of 0..N)
//!        ↓  condense::Condensation::build()
//! Condensation DAG (node i = component i)
//!        ↓  topo::topological_order()
//! Option<Vec<usize>>  (None = cycle)
//!        ↓  paths::{shortest_paths, longest_paths}  (acyclic graphs only)
//! PathAnalysis (distances, parents, critical path)
//! ```
//!
//! ## Typical Usage
//!
//! ```rust
//! use taskgraph_core::graph::{Graph, condense::Condensation, scc, topo};
//! use taskgraph_core::metrics::Counters;
//!
//! let graph = Graph::from_edges(3, &[(0, 1, 1), (1, 2, 1), (2, 0, 1)]).unwrap();
//! let mut counters = Counters::new();
//! let components = scc::find_sccs(&graph, &mut counters);
//! let condensation = Condensation::build(&graph, &components).unwrap();
//! let order = topo::topological_order(condensation.dag(), &mut Counters::new());
//!
//! assert_eq!(components.len(), 1);
//! assert_eq!(order, Some(vec![0]));
//! ```

pub mod condense;
pub mod paths;
pub mod scc;
pub mod store;
pub mod topo;

// Re-export primary types at module level for convenience.
pub use condense::{Condensation, PartitionError};
pub use paths::{CriticalPath, PathAnalysis, PathError, PathMode, longest_paths, shortest_paths};
pub use scc::{Component, find_sccs};
pub use store::{Edge, Graph, GraphError};
pub use topo::{expand_component_order, topological_order};
