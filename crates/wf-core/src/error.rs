use thiserror::Error;

/// Errors at the workflow serialization boundary.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Invalid workflow JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Node id '{0}' appears more than once")]
    DuplicateNodeId(String),

    #[error("Edge '{edge}' references node '{node}', which does not exist")]
    DanglingEdge { edge: String, node: String },
}
