//! Core diagram data model.
//!
//! A diagram is a flat list of nodes (in paint order) plus a list of
//! directed edges between them. Node payloads are a tagged sum type keyed
//! by node type, so a node's type tag and its data can never disagree.

use crate::id::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Geometry ────────────────────────────────────────────────────────────

/// A point in canvas coordinates. Unbounded, may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn offset(self, by: Position) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }
}

/// Explicit node dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Extent assumed for any node that carries no explicit size.
pub const DEFAULT_NODE_SIZE: Size = Size::new(150.0, 80.0);

/// Initial size of a freshly created ellipse node.
pub const ELLIPSE_NODE_SIZE: Size = Size::new(120.0, 80.0);

// ─── Node types ──────────────────────────────────────────────────────────

/// The closed set of node type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Start,
    End,
    Task,
    Condition,
    Text,
    Ellipse,
}

impl NodeType {
    pub const ALL: [NodeType; 6] = [
        NodeType::Start,
        NodeType::End,
        NodeType::Task,
        NodeType::Condition,
        NodeType::Text,
        NodeType::Ellipse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Task => "task",
            Self::Condition => "condition",
            Self::Text => "text",
            Self::Ellipse => "ellipse",
        }
    }

    /// Size assigned when a node of this type is created.
    pub fn default_size(&self) -> Size {
        match self {
            Self::Ellipse => ELLIPSE_NODE_SIZE,
            _ => DEFAULT_NODE_SIZE,
        }
    }

    /// Named source handles, for types with more than one output anchor.
    pub fn source_handles(&self) -> &'static [&'static str] {
        match self {
            Self::Condition => &["yes", "no"],
            _ => &[],
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown node type `{s}`"))
    }
}

/// Progress of a task node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

// ─── Node payloads ───────────────────────────────────────────────────────

/// Payload shared by the plain node types.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BasicData {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskData {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConditionData {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Node payload, one variant per [`NodeType`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Start(BasicData),
    End(BasicData),
    Task(TaskData),
    Condition(ConditionData),
    Text(BasicData),
    Ellipse(BasicData),
}

/// A shallow partial update for [`NodeData`]. `Some` fields overwrite;
/// fields the node's variant does not have are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDataPatch {
    pub label: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub status: Option<TaskStatus>,
    pub condition: Option<String>,
}

impl NodeDataPatch {
    pub fn label(text: impl Into<String>) -> Self {
        Self {
            label: Some(text.into()),
            ..Default::default()
        }
    }
}

impl NodeData {
    /// Empty payload for a freshly created node of `node_type`.
    pub fn empty(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Start => Self::Start(BasicData::default()),
            NodeType::End => Self::End(BasicData::default()),
            NodeType::Task => Self::Task(TaskData::default()),
            NodeType::Condition => Self::Condition(ConditionData::default()),
            NodeType::Text => Self::Text(BasicData::default()),
            NodeType::Ellipse => Self::Ellipse(BasicData::default()),
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Start(_) => NodeType::Start,
            Self::End(_) => NodeType::End,
            Self::Task(_) => NodeType::Task,
            Self::Condition(_) => NodeType::Condition,
            Self::Text(_) => NodeType::Text,
            Self::Ellipse(_) => NodeType::Ellipse,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Start(d) | Self::End(d) | Self::Text(d) | Self::Ellipse(d) => &d.label,
            Self::Task(d) => &d.label,
            Self::Condition(d) => &d.label,
        }
    }

    pub fn set_label(&mut self, label: String) {
        match self {
            Self::Start(d) | Self::End(d) | Self::Text(d) | Self::Ellipse(d) => d.label = label,
            Self::Task(d) => d.label = label,
            Self::Condition(d) => d.label = label,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Start(d) | Self::End(d) | Self::Text(d) | Self::Ellipse(d) => {
                d.description.as_deref()
            }
            Self::Task(d) => d.description.as_deref(),
            Self::Condition(d) => d.description.as_deref(),
        }
    }

    fn description_mut(&mut self) -> &mut Option<String> {
        match self {
            Self::Start(d) | Self::End(d) | Self::Text(d) | Self::Ellipse(d) => &mut d.description,
            Self::Task(d) => &mut d.description,
            Self::Condition(d) => &mut d.description,
        }
    }

    pub fn as_task(&self) -> Option<&TaskData> {
        match self {
            Self::Task(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_condition(&self) -> Option<&ConditionData> {
        match self {
            Self::Condition(d) => Some(d),
            _ => None,
        }
    }

    /// Shallow-merge `patch` into this payload.
    pub fn apply_patch(&mut self, patch: &NodeDataPatch) {
        if let Some(label) = &patch.label {
            self.set_label(label.clone());
        }
        if let Some(description) = &patch.description {
            *self.description_mut() = Some(description.clone());
        }
        match self {
            Self::Task(d) => {
                if patch.assignee.is_some() {
                    d.assignee = patch.assignee.clone();
                }
                if patch.status.is_some() {
                    d.status = patch.status;
                }
            }
            Self::Condition(d) => {
                if patch.condition.is_some() {
                    d.condition = patch.condition.clone();
                }
            }
            _ => {}
        }
    }

    /// Decode the JSON `data` object of a node whose type tag is `node_type`.
    /// A missing (`null`) payload yields the empty payload for the type.
    pub fn from_json(
        node_type: NodeType,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::empty(node_type));
        }
        Ok(match node_type {
            NodeType::Start => Self::Start(serde_json::from_value(value)?),
            NodeType::End => Self::End(serde_json::from_value(value)?),
            NodeType::Task => Self::Task(serde_json::from_value(value)?),
            NodeType::Condition => Self::Condition(serde_json::from_value(value)?),
            NodeType::Text => Self::Text(serde_json::from_value(value)?),
            NodeType::Ellipse => Self::Ellipse(serde_json::from_value(value)?),
        })
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::Start(d) | Self::End(d) | Self::Text(d) | Self::Ellipse(d) => {
                serde_json::to_value(d)
            }
            Self::Task(d) => serde_json::to_value(d),
            Self::Condition(d) => serde_json::to_value(d),
        }
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A diagram vertex.
///
/// Serialized as `{id, type, position, style?, data, selected?}`; the
/// `type` tag is derived from `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
    /// Explicit size; `None` means [`DEFAULT_NODE_SIZE`] for layout math.
    pub size: Option<Size>,
    pub data: NodeData,
    /// Render hint mirroring the store's selection set.
    pub selected: bool,
}

impl Node {
    /// Create a node with the type's default payload and size.
    pub fn new(id: NodeId, node_type: NodeType, position: Position) -> Self {
        Self {
            id,
            position,
            size: Some(node_type.default_size()),
            data: NodeData::empty(node_type),
            selected: false,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.data.node_type()
    }

    pub fn label(&self) -> &str {
        self.data.label()
    }

    /// Size used for layout: the explicit size, or the default extent.
    pub fn extent(&self) -> Size {
        self.size.unwrap_or(DEFAULT_NODE_SIZE)
    }

    pub fn contains(&self, point: Position) -> bool {
        let Size { width, height } = self.extent();
        point.x >= self.position.x
            && point.x <= self.position.x + width
            && point.y >= self.position.y
            && point.y <= self.position.y + height
    }
}

/// Optional CSS-ish size block of a serialized node.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct RawStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<f64>,
}

/// Wire form of [`Node`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawNode {
    id: NodeId,
    #[serde(rename = "type")]
    node_type: NodeType,
    position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style: Option<RawStyle>,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    selected: bool,
}

impl TryFrom<RawNode> for Node {
    type Error = serde_json::Error;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        // A partial style block keeps the default for the missing side.
        let size = raw.style.and_then(|s| match (s.width, s.height) {
            (None, None) => None,
            (w, h) => Some(Size::new(
                w.unwrap_or(DEFAULT_NODE_SIZE.width),
                h.unwrap_or(DEFAULT_NODE_SIZE.height),
            )),
        });
        Ok(Node {
            id: raw.id,
            position: raw.position,
            size,
            data: NodeData::from_json(raw.node_type, raw.data)?,
            selected: raw.selected,
        })
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        RawNode {
            id: node.id,
            node_type: node.node_type(),
            position: node.position,
            style: node.size.map(|s| RawStyle {
                width: Some(s.width),
                height: Some(s.height),
            }),
            // Payload structs are plain string/enum records; encoding cannot fail.
            data: node.data.to_json().unwrap_or(serde_json::Value::Null),
            selected: node.selected,
        }
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// Rendering variant of an edge. Only one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Default,
}

/// A directed connection between two live nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: EdgeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

impl Edge {
    pub fn touches(&self, id: NodeId) -> bool {
        self.source == id || self.target == id
    }

    /// Whether this edge realizes exactly `connection` (same endpoints and handles).
    pub fn matches(&self, connection: &Connection) -> bool {
        self.source == connection.source
            && self.target == connection.target
            && self.source_handle == connection.source_handle
            && self.target_handle == connection.target_handle
    }
}

/// A requested connection, as produced by the view when the user drags
/// from one handle to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            target,
            source_handle: None,
            target_handle: None,
        }
    }

    #[must_use]
    pub fn with_handles(
        mut self,
        source_handle: Option<String>,
        target_handle: Option<String>,
    ) -> Self {
        self.source_handle = source_handle;
        self.target_handle = target_handle;
        self
    }

    /// Materialize as a default-styled edge with the given id.
    pub fn into_edge(self, id: EdgeId) -> Edge {
        Edge {
            id,
            source: self.source,
            target: self.target,
            source_handle: self.source_handle,
            target_handle: self.target_handle,
            kind: EdgeKind::Default,
            label: None,
            selected: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_node_gets_type_defaults() {
        let rect = Node::new(NodeId::intern("n_rect"), NodeType::Task, Position::new(1.0, 2.0));
        assert_eq!(rect.size, Some(Size::new(150.0, 80.0)));
        assert_eq!(rect.node_type(), NodeType::Task);
        assert_eq!(rect.label(), "");

        let oval = Node::new(NodeId::intern("n_oval"), NodeType::Ellipse, Position::default());
        assert_eq!(oval.size, Some(Size::new(120.0, 80.0)));
    }

    #[test]
    fn extent_falls_back_to_default() {
        let mut node = Node::new(NodeId::intern("n_ext"), NodeType::Ellipse, Position::default());
        node.size = None;
        assert_eq!(node.extent(), DEFAULT_NODE_SIZE);
    }

    #[test]
    fn patch_merges_only_matching_fields() {
        let mut task = NodeData::empty(NodeType::Task);
        task.apply_patch(&NodeDataPatch {
            label: Some("Review".into()),
            assignee: Some("sam".into()),
            status: Some(TaskStatus::InProgress),
            condition: Some("ignored".into()),
            ..Default::default()
        });
        let d = task.as_task().unwrap();
        assert_eq!(d.label, "Review");
        assert_eq!(d.assignee.as_deref(), Some("sam"));
        assert_eq!(d.status, Some(TaskStatus::InProgress));

        // Later patches leave untouched fields alone.
        task.apply_patch(&NodeDataPatch::label("Approve"));
        let d = task.as_task().unwrap();
        assert_eq!(d.label, "Approve");
        assert_eq!(d.assignee.as_deref(), Some("sam"));

        let mut text = NodeData::empty(NodeType::Text);
        text.apply_patch(&NodeDataPatch {
            status: Some(TaskStatus::Completed),
            description: Some("note".into()),
            ..Default::default()
        });
        assert_eq!(text, NodeData::Text(BasicData {
            label: String::new(),
            description: Some("note".into()),
        }));
    }

    #[test]
    fn node_type_parses_from_tag() {
        assert_eq!("condition".parse::<NodeType>(), Ok(NodeType::Condition));
        assert!("diamond".parse::<NodeType>().is_err());
    }

    #[test]
    fn data_decodes_by_type_tag() {
        let value = serde_json::json!({ "label": "x > 3?", "condition": "x > 3" });
        let data = NodeData::from_json(NodeType::Condition, value).unwrap();
        assert_eq!(data.as_condition().unwrap().condition.as_deref(), Some("x > 3"));
        assert_eq!(data.label(), "x > 3?");

        let empty = NodeData::from_json(NodeType::End, serde_json::Value::Null).unwrap();
        assert_eq!(empty, NodeData::empty(NodeType::End));
    }

    #[test]
    fn node_wire_shape() {
        let mut node = Node::new(NodeId::intern("node_5"), NodeType::Task, Position::new(-4.0, 8.5));
        node.data.set_label("Ship".into());
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "node_5",
                "type": "task",
                "position": { "x": -4.0, "y": 8.5 },
                "style": { "width": 150.0, "height": 80.0 },
                "data": { "label": "Ship" }
            })
        );
        let back: Node = serde_json::from_value(value).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn node_without_style_or_data_decodes() {
        let node: Node = serde_json::from_value(serde_json::json!({
            "id": "a",
            "type": "start",
            "position": { "x": 0, "y": 0 },
            "selected": true
        }))
        .unwrap();
        assert_eq!(node.size, None);
        assert!(node.selected);
        assert_eq!(node.data, NodeData::empty(NodeType::Start));
    }

    #[test]
    fn node_with_unknown_type_is_rejected() {
        let result: Result<Node, _> = serde_json::from_value(serde_json::json!({
            "id": "a",
            "type": "hexagon",
            "position": { "x": 0, "y": 0 }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn contains_uses_extent() {
        let node = Node::new(NodeId::intern("n_hit"), NodeType::Start, Position::new(10.0, 10.0));
        assert!(node.contains(Position::new(160.0, 90.0)));
        assert!(!node.contains(Position::new(161.0, 50.0)));
    }
}
