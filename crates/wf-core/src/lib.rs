pub mod changes;
pub mod error;
pub mod graph;
pub mod id;
pub mod model;
pub mod workflow;

pub use changes::{
    EdgeChange, NodeChange, NodeChangeSummary, apply_edge_changes, apply_node_changes,
};
pub use error::WorkflowError;
pub use graph::Graph;
pub use id::{EdgeId, NodeId, NodeIdGenerator};
pub use model::*;
pub use workflow::{DEFAULT_WORKFLOW_NAME, Workflow, export_file_name};
