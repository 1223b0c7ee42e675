//! JSON parsing: identical shape to the YAML surface format.

use crate::error::WorkflowResult;
use crate::workflow::WorkflowModel;

pub fn parse(contents: &str) -> WorkflowResult<WorkflowModel> {
    let wf: WorkflowModel = serde_json::from_str(contents)?;
    wf.validate()?;
    Ok(wf)
}
