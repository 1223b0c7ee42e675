use thiserror::Error;

/// The sole error type of the interpreter, actor system and overlay
/// composer. Every fallible function in this crate returns `WorkflowResult`
/// so callers can match on *which* failure occurred — composing overlays,
/// stepping the automaton, and resolving actor paths.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("unknown actor: {0}")]
    UnknownActor(String),

    #[error("bad arguments: {0}")]
    BadArguments(String),

    #[error("orphan transition '{label}' in patch {patch_file}")]
    OrphanTransition { label: String, patch_file: String },

    #[error("duplicate transition label '{label}' in patch {patch_file}")]
    DuplicateLabel { label: String, patch_file: String },

    #[error("maximum iterations ({0}) exceeded without reaching an accepting state")]
    MaxIterationsExceeded(usize),

    #[error("no matching state transition for state '{state}'")]
    NoMatchingTransition { state: String },

    #[error("action interrupted")]
    Interrupted,

    #[error("no workflow loaded")]
    NoCodeLoaded,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("{0}")]
    Other(String),
}

impl WorkflowError {
    pub fn other(msg: impl Into<String>) -> Self {
        WorkflowError::Other(msg.into())
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_actor_message_contains_name() {
        let err = WorkflowError::UnknownActor("math".to_string());
        assert!(err.to_string().contains("math"));
    }

    #[test]
    fn orphan_transition_message_contains_label_and_file() {
        let err = WorkflowError::OrphanTransition {
            label: "step1".to_string(),
            patch_file: "patch.yaml".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("step1"));
        assert!(msg.contains("patch.yaml"));
    }

    #[test]
    fn io_error_converts_via_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: WorkflowError = io_err.into();
        assert!(matches!(err, WorkflowError::Io(_)));
    }

    #[test]
    fn yaml_error_converts_via_from() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [").unwrap_err();
        let err: WorkflowError = yaml_err.into();
        assert!(matches!(err, WorkflowError::Yaml(_)));
    }

    #[test]
    fn max_iterations_message_contains_bound() {
        let err = WorkflowError::MaxIterationsExceeded(10000);
        assert!(err.to_string().contains("10000"));
    }
}
