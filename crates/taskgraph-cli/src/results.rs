//! CSV results log written by `tg batch`.
//!
//! Three files live under the results directory, each truncated and given
//! its header when the log is created:
//!
//! | file                | one row per                |
//! |---------------------|----------------------------|
//! | `scc_results.csv`   | dataset (Tarjan)           |
//! | `topo_results.csv`  | dataset (Kahn on the DAG)  |
//! | `dagsp_results.csv` | dataset × path mode        |
//!
//! The topo row reports the condensation's node and edge counts. Path rows
//! are only written when the pipeline ran path analysis.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use taskgraph_core::pipeline::PathReport;
use taskgraph_core::{AnalysisReport, StageMetrics};
use tracing::debug;

pub const SCC_FILE: &str = "scc_results.csv";
pub const TOPO_FILE: &str = "topo_results.csv";
pub const DAGSP_FILE: &str = "dagsp_results.csv";

const SCC_HEADER: &str = "Dataset,Nodes,Edges,Algorithm,NumSCCs,Visits,EdgeTraversals,TimeMS";
const TOPO_HEADER: &str = "Dataset,Nodes,Edges,Algorithm,Success,Visits,EdgeTraversals,TimeMS";
const DAGSP_HEADER: &str =
    "Dataset,Nodes,Edges,PathType,Source,Visits,EdgeTraversals,Relaxations,TimeMS";

#[derive(Debug, Clone)]
pub struct ResultsLog {
    dir: PathBuf,
}

impl ResultsLog {
    /// Create `dir` if needed and start all three files with their headers.
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        let log = Self {
            dir: dir.to_path_buf(),
        };
        for (file, header) in [
            (SCC_FILE, SCC_HEADER),
            (TOPO_FILE, TOPO_HEADER),
            (DAGSP_FILE, DAGSP_HEADER),
        ] {
            let path = log.path(file);
            fs::write(&path, format!("{header}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        debug!(dir = %dir.display(), "results log initialised");
        Ok(log)
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// All three CSV paths, in the order they are listed to the user.
    pub fn files(&self) -> [PathBuf; 3] {
        [
            self.path(SCC_FILE),
            self.path(TOPO_FILE),
            self.path(DAGSP_FILE),
        ]
    }

    /// Append the rows for one analysed dataset.
    pub fn record(&self, dataset: &str, report: &AnalysisReport) -> Result<()> {
        self.append(SCC_FILE, &[scc_row(dataset, report)])?;
        self.append(TOPO_FILE, &[topo_row(dataset, report)])?;
        if let Some(paths) = &report.paths {
            self.append(
                DAGSP_FILE,
                &[
                    dagsp_row(dataset, report, &paths.shortest),
                    dagsp_row(dataset, report, &paths.longest),
                ],
            )?;
        }
        Ok(())
    }

    fn append(&self, file: &str, rows: &[String]) -> Result<()> {
        let path = self.path(file);
        let mut out = OpenOptions::new()
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        for row in rows {
            writeln!(out, "{row}").with_context(|| format!("Failed to write {}", path.display()))?;
        }
        Ok(())
    }
}

fn millis(metrics: &StageMetrics) -> String {
    format!("{:.3}", metrics.elapsed_millis())
}

fn scc_row(dataset: &str, report: &AnalysisReport) -> String {
    let m = &report.scc.metrics;
    format!(
        "{dataset},{},{},Tarjan,{},{},{},{}",
        report.node_count,
        report.edge_count,
        report.component_count(),
        m.visits,
        m.edge_traversals,
        millis(m)
    )
}

fn topo_row(dataset: &str, report: &AnalysisReport) -> String {
    let m = &report.topo.metrics;
    format!(
        "{dataset},{},{},Kahn,{},{},{},{}",
        report.condensation.node_count,
        report.condensation.edge_count,
        if report.has_order() { "Yes" } else { "No" },
        m.visits,
        m.edge_traversals,
        millis(m)
    )
}

fn dagsp_row(dataset: &str, report: &AnalysisReport, path: &PathReport) -> String {
    let m = &path.metrics;
    format!(
        "{dataset},{},{},{},{},{},{},{},{}",
        report.node_count,
        report.edge_count,
        path.mode.label(),
        path.source,
        m.visits,
        m.edge_traversals,
        m.relaxations,
        millis(m)
    )
}
