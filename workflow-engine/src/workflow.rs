//! The parsed Workflow Model: `Transition`, `Action`, `WorkflowModel`.

use serde::{Deserialize, Serialize};

use crate::action::Execution;
use crate::arguments::Arguments;
use crate::error::{WorkflowError, WorkflowResult};

/// One `actor`/`method`/`arguments`/`execution` action declared inside a
/// transition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Action {
    pub actor: String,
    pub method: String,
    #[serde(default)]
    pub arguments: Arguments,
    #[serde(default, deserialize_with = "deserialize_execution")]
    pub execution: Execution,
}

fn deserialize_execution<'de, D>(deserializer: D) -> Result<Execution, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(Execution::parse(raw.as_deref()))
}

/// A labeled transition: a (`from_pattern` -> `to_state`, actions) triple.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Transition {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    pub states: (String, String),
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Transition {
    pub fn from_pattern(&self) -> &str {
        &self.states.0
    }

    pub fn to_state(&self) -> &str {
        &self.states.1
    }
}

/// The parsed representation of a workflow file: name, optional
/// description, and the ordered list of transitions (aliased under either
/// the `steps` or `transitions` YAML/JSON key — see `parser`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowModel {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "steps")]
    pub transitions: Vec<Transition>,
}

impl WorkflowModel {
    /// Validates the invariants of spec.md §3: every transition has
    /// exactly two states (guaranteed by the `(String, String)` tuple
    /// type at parse time) and labels, when present, are unique.
    pub fn validate(&self) -> WorkflowResult<()> {
        let mut seen = std::collections::HashSet::new();
        for t in &self.transitions {
            if let Some(label) = &t.label {
                if !seen.insert(label.clone()) {
                    return Err(WorkflowError::DuplicateLabel {
                        label: label.clone(),
                        patch_file: self.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn transition_by_label(&self, label: &str) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|t| t.label.as_deref() == Some(label))
    }
}
