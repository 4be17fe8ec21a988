use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory.
pub const CONFIG_FILE: &str = "taskgraph.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskgraphConfig {
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_datasets")]
    pub datasets: Vec<PathBuf>,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            datasets: default_datasets(),
            results_dir: default_results_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: Option<String>,
}

/// Load configuration.
///
/// An explicit path must exist. Without one, `taskgraph.toml` in
/// `working_dir` is used if present, otherwise defaults.
pub fn load_config(explicit: Option<&Path>, working_dir: &Path) -> Result<TaskgraphConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = working_dir.join(CONFIG_FILE);
            if !path.exists() {
                return Ok(TaskgraphConfig::default());
            }
            path
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<TaskgraphConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn default_datasets() -> Vec<PathBuf> {
    ["small", "medium", "large"]
        .iter()
        .flat_map(|size| (1..=3).map(move |i| PathBuf::from(format!("data/{size}_{i}.json"))))
        .collect()
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}
