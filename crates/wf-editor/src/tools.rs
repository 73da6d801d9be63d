//! Tool modes and the connection draft.
//!
//! The active tool decides what a click on a node or on empty canvas
//! means. Only the connection tool carries transient state: the first
//! endpoint picked while drafting an edge.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use wf_core::{Connection, NodeId, NodeType};

/// The active tool determines how canvas clicks are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Text,
    Rectangle,
    Ellipse,
    Connection,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Select,
        ToolKind::Text,
        ToolKind::Rectangle,
        ToolKind::Ellipse,
        ToolKind::Connection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Text => "text",
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Connection => "connection",
        }
    }

    /// Node type produced by a shape tool. Rectangles are plain text boxes.
    pub fn node_type(&self) -> Option<NodeType> {
        match self {
            Self::Text | Self::Rectangle => Some(NodeType::Text),
            Self::Ellipse => Some(NodeType::Ellipse),
            Self::Select | Self::Connection => None,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown tool `{s}`"))
    }
}

// ─── Connection draft ────────────────────────────────────────────────────

/// Result of a node click while the connection tool is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftStep {
    /// First endpoint picked.
    Armed(NodeId),
    /// Second, different endpoint picked; the draft is cleared.
    Complete(Connection),
    /// Same node clicked again: nothing changes.
    Unchanged,
}

/// First endpoint of an edge being drafted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionDraft {
    source: Option<NodeId>,
}

impl ConnectionDraft {
    pub fn source(&self) -> Option<NodeId> {
        self.source
    }

    pub fn set_source(&mut self, source: Option<NodeId>) {
        self.source = source;
    }

    /// Drop the pending endpoint. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.source.take().is_some()
    }

    pub fn click_node(&mut self, id: NodeId) -> DraftStep {
        match self.source {
            None => {
                self.source = Some(id);
                DraftStep::Armed(id)
            }
            Some(source) if source == id => DraftStep::Unchanged,
            Some(source) => {
                self.source = None;
                DraftStep::Complete(Connection::new(source, id))
            }
        }
    }
}
