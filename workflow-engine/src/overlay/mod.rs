//! The Overlay Composer (spec.md §4.3): merges base workflow files with
//! an ordered list of patches declared in a manifest, producing a set of
//! fully-composed `WorkflowModel`s keyed by their (possibly renamed) file
//! name.

pub mod lookup;
pub mod manifest;
pub mod merge;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{WorkflowError, WorkflowResult};
use crate::parser::parse_auto;
use crate::workflow::WorkflowModel;
use manifest::{Manifest, PatchEntry};
use merge::PatchFile;

const MANIFEST_CANDIDATES: &[&str] = &["manifest.yaml", "manifest.yml", "manifest.json"];

/// Reads `manifest.{yaml,yml,json}` plus every base/patch file it names
/// from `overlay_dir`, and returns the composed workflows keyed by their
/// final file name.
pub fn compose(overlay_dir: &Path) -> WorkflowResult<HashMap<String, WorkflowModel>> {
    let manifest_path = find_manifest(overlay_dir)?;
    let manifest_contents = fs::read_to_string(&manifest_path)?;
    let manifest: Manifest = serde_yaml::from_str(&manifest_contents)?;

    let mut models: HashMap<String, WorkflowModel> = HashMap::new();
    for base in &manifest.bases {
        let path = overlay_dir.join(base);
        let contents = fs::read_to_string(&path)?;
        let model = parse_auto(&contents, Some(Path::new(base)))?;
        models.insert(base.clone(), model);
    }

    for entry in &manifest.patches {
        apply_entry(overlay_dir, &manifest.bases, entry, &mut models)?;
    }

    Ok(models)
}

fn apply_entry(
    overlay_dir: &Path,
    bases: &[String],
    entry: &PatchEntry,
    models: &mut HashMap<String, WorkflowModel>,
) -> WorkflowResult<()> {
    let patch_file = entry.patch_file();
    let target = entry.target_file(bases).ok_or_else(|| {
        WorkflowError::OrphanTransition {
            label: String::new(),
            patch_file: patch_file.to_string(),
        }
    })?;
    let target = target.to_string();

    let patch_path = overlay_dir.join(patch_file);
    let patch_contents = fs::read_to_string(&patch_path)?;
    let patch: PatchFile = serde_yaml::from_str(&patch_contents)?;

    let model = models.get_mut(&target).ok_or_else(|| {
        WorkflowError::other(format!("overlay target '{target}' is not a declared base"))
    })?;

    model.transitions = merge::apply_patch(&model.transitions, &patch, patch_file)?;
    merge::apply_name_transform(model, entry.name_prefix(), entry.name_suffix());
    model.validate()?;

    if entry.name_prefix().is_some() || entry.name_suffix().is_some() {
        let renamed_key = rename_file_name(&target, entry.name_prefix(), entry.name_suffix());
        if renamed_key != target {
            let moved = models.remove(&target).expect("target present");
            models.insert(renamed_key, moved);
        }
    }

    Ok(())
}

fn rename_file_name(file: &str, prefix: Option<&str>, suffix: Option<&str>) -> String {
    let base = manifest::base_name(file);
    let ext = &file[base.len()..];
    let mut out = String::new();
    if let Some(p) = prefix {
        out.push_str(p);
    }
    out.push_str(base);
    if let Some(s) = suffix {
        out.push_str(s);
    }
    out.push_str(ext);
    out
}

fn find_manifest(overlay_dir: &Path) -> WorkflowResult<std::path::PathBuf> {
    for candidate in MANIFEST_CANDIDATES {
        let path = overlay_dir.join(candidate);
        if path.is_file() {
            return Ok(path);
        }
    }
    Err(WorkflowError::other(format!(
        "no manifest file found in {}",
        overlay_dir.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, contents: &str) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn compose_applies_simple_patch_to_matching_base() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "manifest.yaml",
            "bases:\n  - main.yaml\npatches:\n  - patch.yaml\n",
        );
        write(
            dir.path(),
            "main.yaml",
            "name: main\ntransitions:\n  - label: a\n    states: [\"0\", \"1\"]\n",
        );
        write(
            dir.path(),
            "patch.yaml",
            "steps:\n  - label: a\n    states: [\"0\", \"99\"]\n",
        );

        let composed = compose(dir.path()).unwrap();
        let main = composed.get("main.yaml").unwrap();
        assert_eq!(main.transitions[0].to_state(), "99");
    }

    #[test]
    fn compose_applies_targeted_patch_with_rename() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "manifest.yaml",
            "bases:\n  - main.yaml\npatches:\n  - target: main.yaml\n    patch: patch.yaml\n    name_prefix: \"team-\"\n",
        );
        write(
            dir.path(),
            "main.yaml",
            "name: main\ntransitions:\n  - label: a\n    states: [\"0\", \"1\"]\n",
        );
        write(
            dir.path(),
            "patch.yaml",
            "steps:\n  - label: a\n    states: [\"0\", \"2\"]\n",
        );

        let composed = compose(dir.path()).unwrap();
        assert!(composed.contains_key("team-main.yaml"));
        let model = &composed["team-main.yaml"];
        assert_eq!(model.name, "team-main");
        assert_eq!(model.transitions[0].to_state(), "2");
    }

    #[test]
    fn compose_errors_on_orphan_transition() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "manifest.yaml",
            "bases:\n  - main.yaml\npatches:\n  - patch.yaml\n",
        );
        write(
            dir.path(),
            "main.yaml",
            "name: main\ntransitions:\n  - label: a\n    states: [\"0\", \"1\"]\n",
        );
        write(
            dir.path(),
            "patch.yaml",
            "steps:\n  - label: ghost\n    states: [\"5\", \"6\"]\n",
        );

        let err = compose(dir.path()).unwrap_err();
        assert!(matches!(err, WorkflowError::OrphanTransition { .. }));
    }

    #[test]
    fn compose_missing_manifest_errors() {
        let dir = tempdir().unwrap();
        assert!(compose(dir.path()).is_err());
    }
}
