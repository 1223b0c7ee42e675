use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::Verbosity;

/// Run an actor-hierarchy workflow file to completion
#[derive(Parser)]
#[command(name = "workflow", version)]
pub struct Cli {
    /// Path to a workflow file (YAML, JSON, or XML)
    pub file: PathBuf,

    /// Directory workflow file references are resolved against
    #[arg(long, env = "WORKFLOW_BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    /// Directory containing an overlay manifest plus base/patch files to
    /// compose before running
    #[arg(long)]
    pub overlay_dir: Option<PathBuf>,

    /// Maximum automaton steps before giving up
    #[arg(long, default_value_t = 10_000)]
    pub max_iterations: usize,

    /// Bound on in-flight `execution: pool` actions
    #[arg(long, env = "WORKFLOW_MAX_CONCURRENCY")]
    pub max_concurrency: Option<usize>,

    #[command(flatten)]
    pub verbosity: Verbosity,
}
