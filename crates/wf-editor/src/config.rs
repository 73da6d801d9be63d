//! Store configuration.

use serde::Deserialize;
use wf_core::{DEFAULT_WORKFLOW_NAME, Position};

/// Tunables for a [`DiagramStore`](crate::store::DiagramStore).
///
/// Deserializable so a host can pass overrides as JSON; missing fields keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Most recent snapshots kept; the oldest is evicted on overflow.
    pub max_history: usize,
    /// Displacement applied by paste and duplicate.
    pub paste_offset: Position,
    /// Name of a new or cleared workflow.
    pub default_workflow_name: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history: 50,
            paste_offset: Position::new(30.0, 30.0),
            default_workflow_name: DEFAULT_WORKFLOW_NAME.to_string(),
        }
    }
}
