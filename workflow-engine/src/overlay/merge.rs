//! The label-keyed overlay merge algorithm of spec.md §4.3.

use serde::Deserialize;

use crate::action::Action;
use crate::arguments::Arguments;
use crate::error::{WorkflowError, WorkflowResult};
use crate::workflow::{Transition, WorkflowModel};

/// A single transition inside a patch file. Every field is optional: a
/// label-matching overwrite replaces only the fields the patch specifies,
/// leaving the base's values for the rest.
#[derive(Debug, Clone, Deserialize)]
pub struct PatchTransition {
    pub label: Option<String>,
    pub note: Option<String>,
    pub states: Option<(String, String)>,
    pub actions: Option<Vec<Action>>,
    /// Anchor for inserting a brand-new transition with no matching label.
    pub insert_after: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatchFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(alias = "transitions")]
    pub steps: Vec<PatchTransition>,
}

/// Applies every transition of `patch` onto `base`'s transition list,
/// returning the merged list. `patch_file` is used only for error
/// reporting.
pub fn apply_patch(
    base: &[Transition],
    patch: &PatchFile,
    patch_file: &str,
) -> WorkflowResult<Vec<Transition>> {
    let mut merged = base.to_vec();

    for p in &patch.steps {
        if let Some(label) = &p.label {
            if let Some(existing) = merged.iter_mut().find(|t| t.label.as_deref() == Some(label.as_str())) {
                if let Some(states) = &p.states {
                    existing.states = states.clone();
                }
                if let Some(actions) = &p.actions {
                    existing.actions = actions.clone();
                }
                if let Some(note) = &p.note {
                    existing.note = Some(note.clone());
                }
                continue;
            }
        }

        if let Some(anchor) = &p.insert_after {
            let idx = merged
                .iter()
                .position(|t| t.label.as_deref() == Some(anchor.as_str()));
            match idx {
                Some(idx) => {
                    merged.insert(idx + 1, patch_transition_to_new(p)?);
                    continue;
                }
                None => {
                    return Err(WorkflowError::OrphanTransition {
                        label: p.label.clone().unwrap_or_else(|| anchor.clone()),
                        patch_file: patch_file.to_string(),
                    });
                }
            }
        }

        return Err(WorkflowError::OrphanTransition {
            label: p.label.clone().unwrap_or_default(),
            patch_file: patch_file.to_string(),
        });
    }

    Ok(merged)
}

fn patch_transition_to_new(p: &PatchTransition) -> WorkflowResult<Transition> {
    let states = p.states.clone().ok_or_else(|| {
        WorkflowError::other(format!(
            "patch transition inserted after an anchor must specify 'states' (label: {:?})",
            p.label
        ))
    })?;
    Ok(Transition {
        label: p.label.clone(),
        note: p.note.clone(),
        states,
        actions: p.actions.clone().unwrap_or_default(),
    })
}

/// Applies `name_prefix`/`name_suffix` to the workflow's own name and to
/// every cross-workflow file reference discovered in actions' arguments
/// (strings recognized as workflow file names: `*.yaml`, `*.yml`,
/// `*.json`).
pub fn apply_name_transform(model: &mut WorkflowModel, prefix: Option<&str>, suffix: Option<&str>) {
    if prefix.is_none() && suffix.is_none() {
        return;
    }

    model.name = rename(&model.name, prefix, suffix);

    for t in &mut model.transitions {
        for a in &mut t.actions {
            rewrite_arguments(&mut a.arguments, prefix, suffix);
        }
    }
}

fn rename(base: &str, prefix: Option<&str>, suffix: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(p) = prefix {
        out.push_str(p);
    }
    out.push_str(base);
    if let Some(s) = suffix {
        out.push_str(s);
    }
    out
}

fn is_workflow_reference(s: &str) -> bool {
    s.ends_with(".yaml") || s.ends_with(".yml") || s.ends_with(".json")
}

fn rewrite_ref(s: &str, prefix: Option<&str>, suffix: Option<&str>) -> String {
    if !is_workflow_reference(s) {
        return s.to_string();
    }
    let (stem, ext) = s.rsplit_once('.').map(|(a, b)| (a, b)).unwrap_or((s, ""));
    format!("{}.{}", rename(stem, prefix, suffix), ext)
}

fn rewrite_arguments(args: &mut Arguments, prefix: Option<&str>, suffix: Option<&str>) {
    match args {
        Arguments::String(s) => *s = rewrite_ref(s, prefix, suffix),
        Arguments::List(items) => {
            for item in items.iter_mut() {
                if let Some(s) = item.as_str() {
                    *item = serde_json::Value::String(rewrite_ref(s, prefix, suffix));
                }
            }
        }
        Arguments::Map(map) => {
            for v in map.values_mut() {
                if let Some(s) = v.as_str() {
                    *v = serde_json::Value::String(rewrite_ref(s, prefix, suffix));
                }
            }
        }
        Arguments::Omitted => {}
    }
}
