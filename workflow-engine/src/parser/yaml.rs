//! YAML parsing: the primary surface format.

use crate::error::WorkflowResult;
use crate::workflow::WorkflowModel;

pub fn parse(contents: &str) -> WorkflowResult<WorkflowModel> {
    let wf: WorkflowModel = serde_yaml::from_str(contents)?;
    wf.validate()?;
    Ok(wf)
}
