//! Ambient engine configuration: the knobs `workflow-cli` exposes as
//! flags/env vars and that embedders can also set programmatically.

use std::path::PathBuf;

/// Tunables for an `ActorSystem` + `Interpreter` pair, independent of any
/// one loaded workflow.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bound on in-flight `execution: pool` actions across the whole
    /// actor system. Defaults to the available parallelism.
    pub max_concurrency: usize,
    /// Upper bound passed to `run_until_end`/sub-workflow `call`.
    pub max_iterations: usize,
    /// Directory workflow file references are resolved against when not
    /// found verbatim or under a resource root.
    pub workflow_base_dir: Option<PathBuf>,
    /// Directory holding bundled workflow resources, searched before
    /// `workflow_base_dir`.
    pub resource_root: Option<PathBuf>,
}

impl EngineConfig {
    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n;
        self
    }

    pub fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn workflow_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workflow_base_dir = Some(dir.into());
        self
    }

    pub fn resource_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_root = Some(dir.into());
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            max_iterations: 10_000,
            workflow_base_dir: None,
            resource_root: None,
        }
    }
}
