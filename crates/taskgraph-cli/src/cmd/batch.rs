//! `tg batch` — analyse every configured dataset and log CSV results.
//!
//! Datasets come from `[batch] datasets` in `taskgraph.toml` (nine standard
//! `data/*.json` files by default). Missing files are warned about and
//! skipped; a dataset that fails to load or analyse is reported and the
//! batch moves on.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use taskgraph_core::dataset::{dataset_name, load_graph};
use taskgraph_core::run_pipeline;
use tracing::{info, warn};

use crate::config::BatchConfig;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use crate::results::ResultsLog;

/// Arguments for `tg batch`.
#[derive(Args, Debug, Default)]
pub struct BatchArgs {
    /// Directory for the CSV results (overrides `[batch] results_dir`).
    #[arg(long, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetStatus {
    Analysed,
    Missing,
    Failed,
}

/// Outcome for one configured dataset.
#[derive(Debug, Serialize)]
pub struct DatasetOutcome {
    pub dataset: String,
    pub path: PathBuf,
    pub status: DatasetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths_analysed: Option<bool>,
}

/// Report payload for `tg batch`.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub results_dir: PathBuf,
    pub processed: usize,
    pub datasets: Vec<DatasetOutcome>,
    pub files: Vec<PathBuf>,
}

/// Execute `tg batch`.
pub fn run_batch(
    args: &BatchArgs,
    config: &BatchConfig,
    output: OutputMode,
    working_dir: &Path,
) -> anyhow::Result<()> {
    let results_dir = working_dir.join(args.results_dir.as_ref().unwrap_or(&config.results_dir));
    let log = ResultsLog::create(&results_dir)?;

    let datasets: Vec<DatasetOutcome> = config
        .datasets
        .iter()
        .map(|path| process_dataset(&working_dir.join(path), &log))
        .collect::<anyhow::Result<_>>()?;

    let processed = datasets
        .iter()
        .filter(|d| d.status == DatasetStatus::Analysed)
        .count();
    info!(processed, configured = datasets.len(), "batch finished");

    let summary = BatchSummary {
        files: if processed > 0 { log.files().to_vec() } else { Vec::new() },
        results_dir,
        processed,
        datasets,
    };
    render_mode(output, &summary, render_text, render_pretty)
}

/// Analyse one dataset and append its rows. Only results-log I/O errors
/// abort the batch.
fn process_dataset(path: &Path, log: &ResultsLog) -> anyhow::Result<DatasetOutcome> {
    let dataset = dataset_name(path);
    let mut outcome = DatasetOutcome {
        dataset: dataset.clone(),
        path: path.to_path_buf(),
        status: DatasetStatus::Missing,
        error: None,
        components: None,
        paths_analysed: None,
    };

    if !path.exists() {
        warn!(path = %path.display(), "dataset file not found");
        return Ok(outcome);
    }

    let report =
        load_graph(path).and_then(|graph| run_pipeline(&graph).map_err(anyhow::Error::from));
    match report {
        Ok(report) => {
            log.record(&dataset, &report)?;
            outcome.status = DatasetStatus::Analysed;
            outcome.components = Some(report.component_count());
            outcome.paths_analysed = Some(report.paths.is_some());
        }
        Err(e) => {
            warn!(dataset = %dataset, error = %format!("{e:#}"), "dataset failed");
            outcome.status = DatasetStatus::Failed;
            outcome.error = Some(format!("{e:#}"));
        }
    }
    Ok(outcome)
}

fn render_text(summary: &BatchSummary, w: &mut dyn Write) -> io::Result<()> {
    for d in &summary.datasets {
        match d.status {
            DatasetStatus::Analysed => writeln!(
                w,
                "analysed {} sccs={} paths={}",
                d.dataset,
                d.components.unwrap_or_default(),
                if d.paths_analysed == Some(true) { "yes" } else { "skipped" }
            )?,
            DatasetStatus::Missing => writeln!(w, "missing {}", d.path.display())?,
            DatasetStatus::Failed => writeln!(
                w,
                "failed {} {}",
                d.dataset,
                d.error.as_deref().unwrap_or_default()
            )?,
        }
    }
    if summary.processed == 0 {
        return writeln!(w, "no datasets processed");
    }
    for file in &summary.files {
        writeln!(w, "wrote {}", file.display())?;
    }
    Ok(())
}

fn render_pretty(summary: &BatchSummary, w: &mut dyn Write) -> io::Result<()> {
    for d in &summary.datasets {
        match d.status {
            DatasetStatus::Analysed => pretty_kv(
                w,
                &d.dataset,
                format!(
                    "{} SCCs, paths {}",
                    d.components.unwrap_or_default(),
                    if d.paths_analysed == Some(true) { "analysed" } else { "skipped (cycles)" }
                ),
            )?,
            DatasetStatus::Missing => {
                writeln!(w, "WARNING: File not found - {}", d.path.display())?;
            }
            DatasetStatus::Failed => pretty_kv(
                w,
                &d.dataset,
                format!("failed: {}", d.error.as_deref().unwrap_or_default()),
            )?,
        }
    }

    writeln!(w)?;
    if summary.processed == 0 {
        return writeln!(w, "No datasets were processed. Please check file paths.");
    }
    pretty_section(w, "Results saved")?;
    for file in &summary.files {
        writeln!(w, "  {}", file.display())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAG: &str = r#"{"n": 3, "edges": [{"u": 0, "v": 1, "w": 3}, {"u": 1, "v": 2, "w": 2}]}"#;

    #[test]
    fn missing_dataset_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = ResultsLog::create(&dir.path().join("results")).expect("log");

        let outcome = process_dataset(&dir.path().join("nope.json"), &log).expect("no I/O error");
        assert_eq!(outcome.status, DatasetStatus::Missing);
        assert_eq!(outcome.dataset, "nope");
    }

    #[test]
    fn broken_dataset_is_reported_not_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = ResultsLog::create(&dir.path().join("results")).expect("log");
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"n": 1, "edges": [{"u": 0, "v": 9, "w": 1}]}"#).expect("write");

        let outcome = process_dataset(&path, &log).expect("no I/O error");
        assert_eq!(outcome.status, DatasetStatus::Failed);
        assert!(outcome.error.is_some_and(|e| e.contains("out of range")));
    }

    #[test]
    fn analysed_dataset_records_outcome() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = ResultsLog::create(&dir.path().join("results")).expect("log");
        let path = dir.path().join("small_2.json");
        std::fs::write(&path, DAG).expect("write");

        let outcome = process_dataset(&path, &log).expect("analysed");
        assert_eq!(outcome.status, DatasetStatus::Analysed);
        assert_eq!(outcome.components, Some(3));
        assert_eq!(outcome.paths_analysed, Some(true));
    }

    #[test]
    fn empty_summary_says_nothing_was_processed() {
        let summary = BatchSummary {
            results_dir: PathBuf::from("results"),
            processed: 0,
            datasets: Vec::new(),
            files: Vec::new(),
        };
        let mut buf = Vec::new();
        render_pretty(&summary, &mut buf).expect("render");
        assert!(String::from_utf8(buf).expect("utf8").contains("No datasets were processed"));
    }
}
