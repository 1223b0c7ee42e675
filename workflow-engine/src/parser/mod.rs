//! Parsers: YAML / JSON / XML -> `WorkflowModel`, sharing the same
//! normalization rules (spec.md §4.2).

pub mod json;
pub mod xml;
pub mod yaml;

use std::path::Path;

use crate::error::WorkflowResult;
use crate::workflow::WorkflowModel;

/// Picks a parser by file extension, falling back to trying each format
/// in turn when the extension is absent or unrecognized.
pub fn parse_auto(contents: &str, path: Option<&Path>) -> WorkflowResult<WorkflowModel> {
    let ext = path
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("yaml") | Some("yml") => yaml::parse(contents),
        Some("json") => json::parse(contents),
        Some("xml") => xml::parse(contents),
        _ => yaml::parse(contents)
            .or_else(|_| json::parse(contents))
            .or_else(|_| xml::parse(contents)),
    }
}
