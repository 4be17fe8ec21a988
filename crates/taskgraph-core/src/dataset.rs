//! JSON dataset ingestion.
//!
//! # Format
//!
//! ```json
//! {
//!   "directed": true,
//!   "n": 4,
//!   "edges": [{ "u": 0, "v": 1, "w": 3 }],
//!   "source": 0,
//!   "weight_model": "edge"
//! }
//! ```
//!
//! `directed` defaults to `true`, `edges` to empty, `source` to `0` and
//! `weight_model` to `""`. Undirected datasets are rejected. Every edge goes
//! through [`Graph::add_edge`], so out-of-range endpoints fail the load.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::graph::store::Graph;

#[derive(Debug, Deserialize)]
struct GraphFile {
    #[serde(default = "default_true")]
    directed: bool,
    n: usize,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
    #[serde(default)]
    source: usize,
    #[serde(default)]
    weight_model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EdgeRecord {
    u: usize,
    v: usize,
    w: i64,
}

/// Parse a dataset from its JSON text.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, the dataset is undirected,
/// or an edge endpoint or the source is out of range.
pub fn parse_graph(json: &str) -> Result<Graph> {
    let file: GraphFile = serde_json::from_str(json).context("parse dataset JSON")?;

    if !file.directed {
        bail!("undirected datasets are not supported");
    }

    let mut graph = Graph::new(file.n, true);
    for (idx, edge) in file.edges.iter().enumerate() {
        graph
            .add_edge(edge.u, edge.v, edge.w)
            .with_context(|| format!("edge #{idx} ({} -> {})", edge.u, edge.v))?;
    }
    if file.n > 0 || file.source > 0 {
        graph.set_source(file.source).context("dataset source")?;
    }
    graph.set_weight_model(file.weight_model.unwrap_or_default());

    Ok(graph)
}

/// Read and parse the dataset at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or [`parse_graph`] fails;
/// the path is attached as context.
#[instrument]
pub fn load_graph(path: &Path) -> Result<Graph> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let graph =
        parse_graph(&content).with_context(|| format!("Failed to load {}", path.display()))?;
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "dataset loaded"
    );
    Ok(graph)
}

/// Dataset name used in reports: the file stem (`data/small_1.json` → `small_1`).
#[must_use]
pub fn dataset_name(path: &Path) -> String {
    path.file_stem().map_or_else(
        || path.display().to_string(),
        |stem| stem.to_string_lossy().into_owned(),
    )
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let graph = parse_graph(
            r#"{
                "directed": true,
                "n": 3,
                "edges": [{"u": 0, "v": 1, "w": 3}, {"u": 1, "v": 2, "w": 2}],
                "source": 1,
                "weight_model": "edge"
            }"#,
        )
        .expect("valid dataset");

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.source(), 1);
        assert_eq!(graph.weight_model(), "edge");
        assert_eq!(graph.edges(0)[0].weight, 3);
    }

    #[test]
    fn optional_fields_default() {
        let graph = parse_graph(r#"{"n": 2, "weight_model": null}"#).expect("valid dataset");
        assert!(graph.is_directed());
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.source(), 0);
        assert_eq!(graph.weight_model(), "");
    }

    #[test]
    fn empty_graph_is_accepted() {
        let graph = parse_graph(r#"{"n": 0, "edges": []}"#).expect("valid dataset");
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn undirected_is_rejected() {
        let err = parse_graph(r#"{"directed": false, "n": 2}"#).expect_err("undirected");
        assert!(err.to_string().contains("undirected"));
    }

    #[test]
    fn out_of_range_edge_is_rejected() {
        let err = parse_graph(r#"{"n": 2, "edges": [{"u": 0, "v": 5, "w": 1}]}"#)
            .expect_err("bad edge");
        assert!(format!("{err:#}").contains("node 5 is out of range"));
    }

    #[test]
    fn out_of_range_source_is_rejected() {
        let err = parse_graph(r#"{"n": 2, "source": 2}"#).expect_err("bad source");
        assert!(format!("{err:#}").contains("source node 2"));
    }

    #[test]
    fn negative_index_is_a_parse_error() {
        assert!(parse_graph(r#"{"n": 2, "edges": [{"u": -1, "v": 0, "w": 1}]}"#).is_err());
    }

    #[test]
    fn load_attaches_path_context() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").expect("write");

        let err = load_graph(&path).expect_err("malformed");
        assert!(format!("{err:#}").contains("broken.json"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("chain.json");
        std::fs::write(&path, r#"{"n": 2, "edges": [{"u": 0, "v": 1, "w": 4}]}"#).expect("write");

        let graph = load_graph(&path).expect("valid");
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn dataset_name_is_file_stem() {
        assert_eq!(dataset_name(Path::new("data/small_1.json")), "small_1");
        assert_eq!(dataset_name(Path::new("large_3")), "large_3");
    }
}
