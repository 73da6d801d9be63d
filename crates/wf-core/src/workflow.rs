//! The persisted workflow document: the sole serialization boundary.
//!
//! ```json
//! { "id": "<uuid>", "name": "...", "nodes": [...], "edges": [...],
//!   "createdAt": "<RFC 3339>", "updatedAt": "<RFC 3339>" }
//! ```

use crate::error::WorkflowError;
use crate::graph::{Graph, validate_parts};
use crate::model::{Edge, Node};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name given to a brand-new or cleared workflow.
pub const DEFAULT_WORKFLOW_NAME: &str = "New workflow";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Wrap `graph` as a new document with a fresh id and timestamps.
    pub fn new(name: impl Into<String>, graph: Graph) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            nodes: graph.nodes,
            edges: graph.edges,
            created_at: now,
            updated_at: now,
        }
    }

    /// Parse and structurally validate a workflow document.
    ///
    /// # Errors
    /// Malformed JSON, a payload of the wrong shape, duplicate node ids, or
    /// an edge whose endpoint does not exist.
    pub fn from_json(text: &str) -> Result<Self, WorkflowError> {
        let workflow: Workflow = serde_json::from_str(text)?;
        validate_parts(&workflow.nodes, &workflow.edges)?;
        Ok(workflow)
    }

    /// Pretty-printed JSON for export.
    pub fn to_json_pretty(&self) -> Result<String, WorkflowError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Suggested download file name: whitespace runs become `_`.
    pub fn file_name(&self) -> String {
        export_file_name(&self.name)
    }

    /// Split off the graph.
    pub fn into_graph(self) -> Graph {
        Graph {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}

/// `"My flow  v2"` → `"My_flow_v2.json"`.
pub fn export_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 5);
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out.push_str(".json");
    out
}
