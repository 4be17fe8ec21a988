//! `tg analyze` — run the full pipeline on one dataset.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use taskgraph_core::dataset::{dataset_name, load_graph};
use taskgraph_core::pipeline::{AnalysisReport, PathReport};
use taskgraph_core::run_pipeline;
use tracing::info;

use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};

// ---------------------------------------------------------------------------
// Clap types
// ---------------------------------------------------------------------------

/// Arguments for `tg analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Dataset JSON file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Payload for `tg analyze`: the report tagged with its dataset name.
#[derive(Debug, Serialize)]
pub struct AnalyzeOutput {
    pub dataset: String,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Execute `tg analyze`.
pub fn run_analyze(args: &AnalyzeArgs, output: OutputMode) -> anyhow::Result<()> {
    let dataset = dataset_name(&args.file);

    let graph = match load_graph(&args.file) {
        Ok(graph) => graph,
        Err(e) => {
            render_error(
                output,
                &CliError::with_details(
                    format!("{e:#}"),
                    "check that the file exists and is a directed graph dataset",
                    "dataset_unreadable",
                ),
            )?;
            anyhow::bail!("could not load {}", args.file.display());
        }
    };

    let report = match run_pipeline(&graph) {
        Ok(report) => report,
        Err(e) => {
            render_error(
                output,
                &CliError::with_details(
                    e.to_string(),
                    "reduce edge weights so path lengths fit in 64 bits",
                    "analysis_failed",
                ),
            )?;
            return Err(anyhow::Error::new(e).context(format!("analysis of {dataset} failed")));
        }
    };

    info!(dataset = %dataset, components = report.component_count(), "dataset analysed");

    let payload = AnalyzeOutput { dataset, report };
    render_mode(output, &payload, render_text, render_pretty)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn join_ids(ids: &[usize], sep: &str) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

fn distance_label(distance: Option<i64>) -> String {
    distance.map_or_else(|| "unreachable".to_string(), |d| d.to_string())
}

/// Compact text: one `key=value` fact per line.
pub fn render_text(out: &AnalyzeOutput, w: &mut dyn Write) -> io::Result<()> {
    let r = &out.report;
    writeln!(
        w,
        "dataset={} nodes={} edges={} weight_model={}",
        out.dataset, r.node_count, r.edge_count, r.weight_model
    )?;
    writeln!(
        w,
        "sccs={} cyclic={}",
        r.component_count(),
        r.scc.cyclic_components
    )?;
    writeln!(
        w,
        "condensation nodes={} edges={}",
        r.condensation.node_count, r.condensation.edge_count
    )?;
    match (&r.topo.order, &r.topo.derived_task_order) {
        (Some(order), Some(tasks)) => {
            writeln!(w, "order={}", join_ids(order, ","))?;
            writeln!(w, "tasks={}", join_ids(tasks, ","))?;
        }
        _ => writeln!(w, "order=cycle")?,
    }

    let Some(paths) = &r.paths else {
        return writeln!(w, "paths=skipped");
    };
    for report in [&paths.shortest, &paths.longest] {
        let mode = report.mode.label().to_ascii_lowercase();
        for (node, distance) in report.distances.iter().enumerate() {
            writeln!(w, "{mode}[{node}]={}", distance_label(*distance))?;
        }
    }
    if let Some(critical) = &paths.longest.critical_path {
        writeln!(
            w,
            "critical length={} path={}",
            critical.length,
            join_ids(&critical.path, ",")
        )?;
    }
    Ok(())
}

/// Human report with one section per stage.
pub fn render_pretty(out: &AnalyzeOutput, w: &mut dyn Write) -> io::Result<()> {
    let r = &out.report;
    pretty_section(w, &format!("Dataset: {}", out.dataset))?;
    pretty_kv(w, "Nodes", r.node_count.to_string())?;
    pretty_kv(w, "Edges", r.edge_count.to_string())?;
    pretty_kv(w, "Weight model", &r.weight_model)?;
    pretty_kv(w, "Source", r.source.to_string())?;
    pretty_kv(w, "Hash", &r.content_hash)?;

    writeln!(w)?;
    pretty_section(w, "Strongly connected components")?;
    pretty_kv(w, "Count", r.component_count().to_string())?;
    for (id, component) in r.scc.components.iter().enumerate() {
        writeln!(
            w,
            "  SCC {id} (size {}): [{}]",
            component.len(),
            join_ids(&component.members, ", ")
        )?;
    }
    pretty_kv(w, "Metrics", r.scc.metrics.to_string())?;

    writeln!(w)?;
    pretty_section(w, "Condensation")?;
    pretty_kv(w, "Components", r.condensation.node_count.to_string())?;
    pretty_kv(w, "Edges", r.condensation.edge_count.to_string())?;

    writeln!(w)?;
    pretty_section(w, "Topological order")?;
    match &r.topo.order {
        Some(order) => pretty_kv(w, "Components", format!("[{}]", join_ids(order, ", ")))?,
        None => pretty_kv(w, "Components", "contains a cycle")?,
    }
    if let Some(tasks) = &r.topo.derived_task_order {
        pretty_kv(w, "Tasks", format!("[{}]", join_ids(tasks, ", ")))?;
    }
    pretty_kv(w, "Metrics", r.topo.metrics.to_string())?;

    writeln!(w)?;
    let Some(paths) = &r.paths else {
        return writeln!(w, "Skipping shortest/longest path analysis (graph has cycles)");
    };

    pretty_section(w, &format!("Shortest paths from {}", paths.shortest.source))?;
    render_path_table(&paths.shortest, w)?;

    writeln!(w)?;
    pretty_section(w, &format!("Longest paths from {}", paths.longest.source))?;
    if let Some(critical) = &paths.longest.critical_path {
        pretty_kv(w, "Critical path", join_ids(&critical.path, " -> "))?;
        pretty_kv(w, "Length", critical.length.to_string())?;
    }
    render_path_table(&paths.longest, w)
}

fn render_path_table(report: &PathReport, w: &mut dyn Write) -> io::Result<()> {
    for (node, distance) in report.distances.iter().enumerate() {
        let route = report.paths[node]
            .as_deref()
            .map(|path| format!("  ({})", join_ids(path, " -> ")))
            .unwrap_or_default();
        writeln!(w, "  {node:>4}: {}{route}", distance_label(*distance))?;
    }
    pretty_kv(w, "Metrics", report.metrics.to_string())
}
