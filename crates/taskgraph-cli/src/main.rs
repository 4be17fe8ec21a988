#![forbid(unsafe_code)]

mod cmd;
mod config;
mod output;
mod results;

use clap::{Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tg: dependency analysis for weighted task graphs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides FORMAT and the config file).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Config file (default: ./taskgraph.toml if present).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Analyse one dataset",
        long_about = "Find strongly connected components, condense them, order the \
                      condensation, and (for acyclic graphs) compute shortest and \
                      longest paths from the dataset's source.",
        after_help = "EXAMPLES:\n    # Human report\n    tg analyze data/small_2.json\n\n    # Machine-readable\n    tg analyze data/small_2.json --json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        about = "Analyse all configured datasets and write CSV results",
        after_help = "EXAMPLES:\n    # Default datasets, results in ./results\n    tg batch\n\n    # Custom results directory\n    tg batch --results-dir out"
    )]
    Batch(cmd::batch::BatchArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TASKGRAPH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "taskgraph=debug,info"
        } else {
            "taskgraph=info,warn"
        })
    });

    let format = env::var("TASKGRAPH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let working_dir = env::current_dir()?;
    let config = config::load_config(cli.config.as_deref(), &working_dir)?;
    let output = resolve_output_mode(cli.format, cli.json, config.output.format.as_deref());

    match cli.command {
        Commands::Analyze(ref args) => cmd::analyze::run_analyze(args, output),
        Commands::Batch(ref args) => {
            cmd::batch::run_batch(args, &config.batch, output, &working_dir)
        }
    }
}
