//! E2E CLI tests for `tg batch`: dataset discovery, CSV results, and the
//! summary in each output mode.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

const DAG: &str = r#"{"n": 3, "edges": [{"u": 0, "v": 1, "w": 3}, {"u": 1, "v": 2, "w": 2}]}"#;
const CYCLIC: &str =
    r#"{"n": 3, "edges": [{"u": 0, "v": 1, "w": 1}, {"u": 1, "v": 0, "w": 1}, {"u": 1, "v": 2, "w": 1}]}"#;

fn tg_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tg"));
    cmd.current_dir(dir);
    cmd.env("TASKGRAPH_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

/// Lay out `data/` with a DAG and a cyclic dataset, plus a config listing
/// them and one missing file.
fn setup_project(dir: &Path) {
    std::fs::create_dir_all(dir.join("data")).expect("mkdir data");
    std::fs::write(dir.join("data/dag.json"), DAG).expect("write dag");
    std::fs::write(dir.join("data/cyclic.json"), CYCLIC).expect("write cyclic");
    std::fs::write(
        dir.join("taskgraph.toml"),
        "[batch]\ndatasets = [\"data/cyclic.json\", \"data/missing.json\", \"data/dag.json\"]\n",
    )
    .expect("write config");
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
        .lines()
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn batch_writes_csv_rows_per_dataset() {
    let dir = TempDir::new().expect("tempdir");
    setup_project(dir.path());

    tg_cmd(dir.path()).args(["batch"]).assert().success();

    let results = dir.path().join("results");
    let scc = read_lines(&results.join("scc_results.csv"));
    assert_eq!(
        scc[0],
        "Dataset,Nodes,Edges,Algorithm,NumSCCs,Visits,EdgeTraversals,TimeMS"
    );
    assert_eq!(scc.len(), 3);
    assert!(scc[1].starts_with("cyclic,3,3,Tarjan,2,"));
    assert!(scc[2].starts_with("dag,3,2,Tarjan,3,"));

    let topo = read_lines(&results.join("topo_results.csv"));
    assert!(topo[1].starts_with("cyclic,2,1,Kahn,Yes,"));

    // Only the DAG gets path rows.
    let dagsp = read_lines(&results.join("dagsp_results.csv"));
    assert_eq!(dagsp.len(), 3);
    assert!(dagsp[1].starts_with("dag,3,2,Shortest,0,"));
    assert!(dagsp[2].starts_with("dag,3,2,Longest,0,"));
}

#[test]
fn batch_json_summary_lists_outcomes() {
    let dir = TempDir::new().expect("tempdir");
    setup_project(dir.path());

    let output = tg_cmd(dir.path())
        .args(["batch", "--json"])
        .output()
        .expect("batch should not crash");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["processed"], 2);
    let statuses: Vec<&str> = json["datasets"]
        .as_array()
        .expect("datasets array")
        .iter()
        .map(|d| d["status"].as_str().expect("status"))
        .collect();
    assert_eq!(statuses, vec!["analysed", "missing", "analysed"]);
    assert_eq!(json["files"].as_array().map(Vec::len), Some(3));
}

#[test]
fn batch_pretty_warns_about_missing_files() {
    let dir = TempDir::new().expect("tempdir");
    setup_project(dir.path());

    tg_cmd(dir.path())
        .args(["batch", "--format", "pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING: File not found"))
        .stdout(predicate::str::contains("missing.json"))
        .stdout(predicate::str::contains("scc_results.csv"));
}

#[test]
fn batch_without_datasets_says_so() {
    let dir = TempDir::new().expect("tempdir");

    tg_cmd(dir.path())
        .args(["batch", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no datasets processed"));
}

#[test]
fn results_dir_flag_overrides_config() {
    let dir = TempDir::new().expect("tempdir");
    setup_project(dir.path());

    tg_cmd(dir.path())
        .args(["batch", "--results-dir", "out/csv"])
        .assert()
        .success();

    assert!(dir.path().join("out/csv/scc_results.csv").exists());
    assert!(!dir.path().join("results").exists());
}

#[test]
fn broken_dataset_does_not_stop_the_batch() {
    let dir = TempDir::new().expect("tempdir");
    setup_project(dir.path());
    std::fs::write(dir.path().join("data/broken.json"), "{ nope").expect("write");
    std::fs::write(
        dir.path().join("alt.toml"),
        "[batch]\ndatasets = [\"data/broken.json\", \"data/dag.json\"]\n",
    )
    .expect("write config");

    let output = tg_cmd(dir.path())
        .args(["--config", "alt.toml", "batch", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["processed"], 1);
    assert_eq!(json["datasets"][0]["status"], "failed");
    assert!(json["datasets"][0]["error"].is_string());
}

#[test]
fn missing_explicit_config_fails() {
    let dir = TempDir::new().expect("tempdir");

    tg_cmd(dir.path())
        .args(["--config", "absent.toml", "batch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.toml"));
}
