//! Read-only snapshot of store state for the view.

use crate::tools::ToolKind;
use serde::Serialize;
use wf_core::{Edge, NodeId, NodeType, Position, Size};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub position: Position,
    /// Explicit size, or the default extent.
    pub size: Size,
    pub label: String,
    pub selected: bool,
    /// Named output anchors (`yes`/`no` on condition nodes).
    #[serde(skip_serializing_if = "no_handles")]
    pub source_handles: &'static [&'static str],
}

/// Everything the view needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderModel {
    pub workflow_name: String,
    /// Paint order: later nodes draw on top.
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<Edge>,
    pub selected_nodes: Vec<NodeId>,
    pub current_tool: ToolKind,
    pub connection_source_id: Option<NodeId>,
    pub can_undo: bool,
    pub can_redo: bool,
}

fn no_handles(handles: &&[&str]) -> bool {
    handles.is_empty()
}
