//! The overlay manifest: base workflow files plus an ordered list of
//! patch entries, per spec.md §4.3 / §6.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub bases: Vec<String>,
    pub patches: Vec<PatchEntry>,
}

/// A patch entry: either the simple form (patch applies to the
/// same-name base) or the targeted `{target, patch}` form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PatchEntry {
    Simple(String),
    Targeted {
        target: String,
        patch: String,
        #[serde(default)]
        name_prefix: Option<String>,
        #[serde(default)]
        name_suffix: Option<String>,
    },
}

impl PatchEntry {
    pub fn patch_file(&self) -> &str {
        match self {
            PatchEntry::Simple(p) => p,
            PatchEntry::Targeted { patch, .. } => patch,
        }
    }

    /// The base file this patch targets. For the simple form, that is the
    /// base file sharing the patch's own base name.
    pub fn target_file<'a>(&'a self, bases: &'a [String]) -> Option<&'a str> {
        match self {
            PatchEntry::Targeted { target, .. } => Some(target.as_str()),
            PatchEntry::Simple(patch) => {
                let patch_base = base_name(patch);
                bases
                    .iter()
                    .find(|b| base_name(b) == patch_base)
                    .map(String::as_str)
            }
        }
    }

    pub fn name_prefix(&self) -> Option<&str> {
        match self {
            PatchEntry::Targeted { name_prefix, .. } => name_prefix.as_deref(),
            PatchEntry::Simple(_) => None,
        }
    }

    pub fn name_suffix(&self) -> Option<&str> {
        match self {
            PatchEntry::Targeted { name_suffix, .. } => name_suffix.as_deref(),
            PatchEntry::Simple(_) => None,
        }
    }
}

/// Strips a known workflow extension from a file name, for base-name
/// comparisons (`wf.yaml` and `wf.json` share base name `wf`).
pub fn base_name(file: &str) -> &str {
    for ext in [".yaml", ".yml", ".json", ".xml"] {
        if let Some(stripped) = file.strip_suffix(ext) {
            return stripped;
        }
    }
    file
}
