//! WASM bridge for the workflow editor: exposes the diagram store to the
//! browser view.
//!
//! Compiled via `wasm-pack build --target web`. Structured values cross the
//! boundary as JSON strings in the same shapes the graph widget emits and
//! the persisted workflow format uses.

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wf_core::{Connection, EdgeChange, NodeChange, NodeDataPatch, NodeId, NodeType, Position};
use wf_editor::{Alignment, DiagramStore, EditorConfig, ShortcutAction, ShortcutMap, ToolKind};

/// The browser-facing editor handle. All interaction from the view goes
/// through this struct; it never hands out mutable state.
#[wasm_bindgen]
pub struct WorkflowCanvas {
    store: DiagramStore,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyOutcome<'a> {
    changed: bool,
    action: &'a str,
    tool: &'a str,
}

#[wasm_bindgen]
impl WorkflowCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook_setup();
        Self {
            store: DiagramStore::new(),
        }
    }

    /// Create a canvas from a JSON `EditorConfig`; fields left out keep
    /// their defaults, and invalid JSON falls back to the defaults.
    pub fn with_config(config_json: &str) -> WorkflowCanvas {
        console_error_panic_hook_setup();
        let config = match serde_json::from_str::<EditorConfig>(config_json) {
            Ok(config) => config,
            Err(e) => {
                report_error(&format!("Invalid editor config, using defaults: {e}"));
                EditorConfig::default()
            }
        };
        Self {
            store: DiagramStore::with_config(config),
        }
    }

    // ─── Render model ────────────────────────────────────────────────────

    /// Current render model as JSON.
    pub fn render_model(&self) -> String {
        serde_json::to_string(&self.store.render_model()).unwrap_or_else(|_| "{}".to_string())
    }

    // ─── Widget callbacks ────────────────────────────────────────────────

    /// Apply a JSON array of node changes. Returns `false` on bad JSON.
    pub fn on_nodes_change(&mut self, changes_json: &str) -> bool {
        match serde_json::from_str::<Vec<NodeChange>>(changes_json) {
            Ok(changes) => {
                self.store.on_nodes_change(&changes);
                true
            }
            Err(e) => {
                log::warn!("ignoring malformed node changes: {e}");
                false
            }
        }
    }

    /// Apply a JSON array of edge changes. Returns `false` on bad JSON.
    pub fn on_edges_change(&mut self, changes_json: &str) -> bool {
        match serde_json::from_str::<Vec<EdgeChange>>(changes_json) {
            Ok(changes) => {
                self.store.on_edges_change(&changes);
                true
            }
            Err(e) => {
                log::warn!("ignoring malformed edge changes: {e}");
                false
            }
        }
    }

    /// Connect two nodes. Returns the new edge id, or `undefined` when the
    /// connection is rejected.
    pub fn on_connect(
        &mut self,
        source: &str,
        target: &str,
        source_handle: Option<String>,
        target_handle: Option<String>,
    ) -> Option<String> {
        let connection = Connection::new(NodeId::intern(source), NodeId::intern(target))
            .with_handles(source_handle, target_handle);
        self.store.on_connect(connection).map(|id| id.to_string())
    }

    // ─── Node commands ───────────────────────────────────────────────────

    /// Add a node of `node_type` (e.g. `"task"`). Returns its id, or
    /// `undefined` for an unknown type.
    pub fn add_node(&mut self, node_type: &str, x: f64, y: f64) -> Option<String> {
        let node_type = match node_type.parse::<NodeType>() {
            Ok(t) => t,
            Err(e) => {
                log::warn!("add_node: {e}");
                return None;
            }
        };
        Some(
            self.store
                .add_node(node_type, Position::new(x, y))
                .id
                .to_string(),
        )
    }

    /// Add a text node at a canvas point (drop target). Returns its id.
    pub fn add_node_at_position(&mut self, x: f64, y: f64) -> String {
        self.store
            .add_node_at_position(Position::new(x, y), None)
            .id
            .to_string()
    }

    /// Merge a JSON `NodeDataPatch` into a node's data.
    pub fn update_node_data(&mut self, id: &str, patch_json: &str) -> bool {
        match serde_json::from_str::<NodeDataPatch>(patch_json) {
            Ok(patch) => self.store.update_node_data(NodeId::intern(id), &patch),
            Err(e) => {
                log::warn!("ignoring malformed data patch: {e}");
                false
            }
        }
    }

    pub fn update_node_text(&mut self, id: &str, text: &str) -> bool {
        self.store.update_node_text(NodeId::intern(id), text)
    }

    pub fn delete_node(&mut self, id: &str) -> bool {
        self.store.delete_node(NodeId::intern(id))
    }

    /// Returns the number of nodes deleted.
    pub fn delete_selected_nodes(&mut self) -> u32 {
        self.store.delete_selected_nodes() as u32
    }

    // ─── Selection & tools ───────────────────────────────────────────────

    /// Replace the selection with a JSON array of ids. Returns the
    /// resulting selection size, or `undefined` on bad JSON (selection kept).
    pub fn set_selected_nodes(&mut self, ids_json: &str) -> Option<u32> {
        match serde_json::from_str::<Vec<String>>(ids_json) {
            Ok(ids) => Some(
                self.store
                    .set_selected_nodes(ids.iter().map(|s| NodeId::intern(s)))
                    as u32,
            ),
            Err(e) => {
                log::warn!("ignoring malformed selection: {e}");
                None
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
    }

    /// Switch tools by name. Returns `false` for an unknown tool.
    pub fn set_current_tool(&mut self, name: &str) -> bool {
        match name.parse::<ToolKind>() {
            Ok(tool) => {
                self.store.set_current_tool(tool);
                true
            }
            Err(e) => {
                log::warn!("set_current_tool: {e}");
                false
            }
        }
    }

    pub fn current_tool(&self) -> String {
        self.store.current_tool().to_string()
    }

    pub fn set_connection_source_id(&mut self, id: Option<String>) -> bool {
        self.store
            .set_connection_source_id(id.as_deref().map(NodeId::intern))
    }

    pub fn click_node(&mut self, id: &str) -> bool {
        self.store.click_node(NodeId::intern(id))
    }

    pub fn click_canvas(&mut self) -> bool {
        self.store.click_canvas()
    }

    /// Topmost node id at a canvas point.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<String> {
        self.store
            .hit_test(Position::new(x, y))
            .map(|id| id.to_string())
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.store.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    // ─── Clipboard & alignment ───────────────────────────────────────────

    pub fn copy_selected_nodes(&mut self) -> u32 {
        self.store.copy_selected_nodes() as u32
    }

    /// Paste at the configured offset, or at `(dx, dy)` when both are
    /// given. Returns the pasted ids as a JSON array.
    pub fn paste_nodes(&mut self, dx: Option<f64>, dy: Option<f64>) -> String {
        let offset = dx.zip(dy).map(|(x, y)| Position::new(x, y));
        ids_json(&self.store.paste_nodes(offset))
    }

    /// Returns the duplicated ids as a JSON array.
    pub fn duplicate_selected_nodes(&mut self) -> String {
        ids_json(&self.store.duplicate_selected_nodes())
    }

    /// Align the selection: `left|center|right|top|middle|bottom`.
    pub fn align_nodes(&mut self, alignment: &str) -> bool {
        match serde_json::from_value::<Alignment>(serde_json::Value::from(alignment)) {
            Ok(alignment) => self.store.align_nodes(alignment),
            Err(e) => {
                log::warn!("align_nodes: {e}");
                false
            }
        }
    }

    // ─── Workflow document ───────────────────────────────────────────────

    pub fn workflow_name(&self) -> String {
        self.store.workflow_name().to_string()
    }

    pub fn set_workflow_name(&mut self, name: &str) {
        self.store.set_workflow_name(name);
    }

    pub fn clear_workflow(&mut self) {
        self.store.clear_workflow();
    }

    /// Pretty-printed workflow JSON for download. Empty on failure.
    pub fn save_workflow(&self) -> String {
        match self.store.save_workflow() {
            Ok(json) => json,
            Err(e) => {
                report_error(&format!("Failed to export workflow: {e}"));
                String::new()
            }
        }
    }

    /// File name for [`save_workflow`](Self::save_workflow)'s download.
    pub fn export_file_name(&self) -> String {
        self.store.export_file_name()
    }

    /// Replace the editor state with an imported file. Returns JSON:
    /// `{"ok":true}` or `{"ok":false,"error":"..."}`; on error the editor
    /// is unchanged.
    pub fn load_workflow(&mut self, text: &str) -> String {
        match self.store.load_workflow(text) {
            Ok(()) => r#"{"ok":true}"#.to_string(),
            Err(e) => {
                let message = e.to_string();
                report_error(&message);
                serde_json::json!({ "ok": false, "error": message }).to_string()
            }
        }
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keyboard event. Shortcuts are ignored while a text input
    /// has focus. Shape keys drop their node at `(center_x, center_y)`.
    ///
    /// Returns JSON: `{"changed":bool, "action":"<name>", "tool":"<tool>"}`.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        in_text_input: bool,
        center_x: f64,
        center_y: f64,
    ) -> String {
        let action = if in_text_input {
            None
        } else {
            ShortcutMap::resolve(key, ctrl, shift, alt, meta)
        };
        let (changed, name) = match action {
            Some(action) => (
                self.store
                    .run_shortcut(action, Position::new(center_x, center_y)),
                action_to_name(action),
            ),
            None => (false, "none"),
        };
        let outcome = KeyOutcome {
            changed,
            action: name,
            tool: self.store.current_tool().as_str(),
        };
        serde_json::to_string(&outcome)
            .unwrap_or_else(|_| r#"{"changed":false,"action":"none","tool":""}"#.to_string())
    }
}

impl Default for WorkflowCanvas {
    fn default() -> Self {
        Self::new()
    }
}

fn ids_json(ids: &[NodeId]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string())
}

fn action_to_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::Tool(ToolKind::Select) => "toolSelect",
        ShortcutAction::Tool(ToolKind::Connection) => "toolConnection",
        ShortcutAction::Tool(_) => "tool",
        ShortcutAction::PlaceShape(ToolKind::Text) => "addText",
        ShortcutAction::PlaceShape(ToolKind::Rectangle) => "addRectangle",
        ShortcutAction::PlaceShape(ToolKind::Ellipse) => "addEllipse",
        ShortcutAction::PlaceShape(_) => "addShape",
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::Delete => "delete",
        ShortcutAction::Copy => "copy",
        ShortcutAction::Paste => "paste",
        ShortcutAction::Duplicate => "duplicate",
        ShortcutAction::Deselect => "deselect",
    }
}

/// User-visible failure: browser console on wasm, log elsewhere.
fn report_error(message: &str) {
    log::warn!("{message}");
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&message.into());
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Workflow WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shortcuts_are_suppressed_in_text_inputs() {
        let mut canvas = WorkflowCanvas::new();
        let out = canvas.handle_key("t", false, false, false, false, true, 0.0, 0.0);
        assert_eq!(out, r#"{"changed":false,"action":"none","tool":"select"}"#);
        assert!(!canvas.can_undo());

        let out = canvas.handle_key("t", false, false, false, false, false, 100.0, 50.0);
        assert_eq!(out, r#"{"changed":true,"action":"addText","tool":"select"}"#);
        assert_eq!(canvas.hit_test(110.0, 60.0).as_deref(), Some("node_1"));
    }

    #[test]
    fn widget_json_round_trips_through_the_bridge() {
        let mut canvas = WorkflowCanvas::new();
        let a = canvas.add_node("start", 0.0, 0.0).unwrap();
        let b = canvas.add_node("end", 0.0, 200.0).unwrap();
        assert_eq!(canvas.add_node("hexagon", 0.0, 0.0), None);
        assert!(canvas.on_connect(&a, &b, None, None).is_some());

        assert!(canvas.on_nodes_change(
            r#"[{"type":"select","id":"node_2","selected":true}]"#
        ));
        assert!(!canvas.on_nodes_change("not json"));

        let model: serde_json::Value = serde_json::from_str(&canvas.render_model()).unwrap();
        assert_eq!(model["selectedNodes"], serde_json::json!(["node_2"]));
        assert_eq!(model["edges"][0]["source"], "node_1");
        assert_eq!(model["canUndo"], true);
    }

    #[test]
    fn load_failure_reports_and_keeps_state() {
        let mut canvas = WorkflowCanvas::new();
        canvas.add_node("task", 0.0, 0.0);
        let status: serde_json::Value =
            serde_json::from_str(&canvas.load_workflow("{ nope")).unwrap();
        assert_eq!(status["ok"], false);
        assert!(
            status["error"]
                .as_str()
                .unwrap()
                .starts_with("Invalid workflow JSON")
        );
        assert!(canvas.hit_test(10.0, 10.0).is_some());

        let saved = canvas.save_workflow();
        canvas.clear_workflow();
        assert_eq!(canvas.load_workflow(&saved), r#"{"ok":true}"#);
        assert_eq!(canvas.export_file_name(), "New_workflow.json");
    }

    #[test]
    fn malformed_selection_keeps_current_selection() {
        let mut canvas = WorkflowCanvas::new();
        canvas.add_node("task", 0.0, 0.0);
        canvas.add_node("task", 300.0, 0.0);
        assert_eq!(canvas.set_selected_nodes(r#"["node_2"]"#), Some(1));

        assert_eq!(canvas.set_selected_nodes("[node_1"), None);
        assert_eq!(canvas.set_selected_nodes(r#"{"ids":[]}"#), None);

        let model: serde_json::Value = serde_json::from_str(&canvas.render_model()).unwrap();
        assert_eq!(model["selectedNodes"], serde_json::json!(["node_2"]));
        assert_eq!(model["nodes"][1]["selected"], true);
        assert_eq!(model["nodes"][0]["selected"], false);
    }

    #[test]
    fn alignment_and_tools_parse_by_name() {
        let mut canvas = WorkflowCanvas::new();
        canvas.add_node("task", 0.0, 0.0);
        canvas.add_node("task", 300.0, 90.0);
        assert_eq!(canvas.set_selected_nodes(r#"["node_1","node_2"]"#), Some(2));
        assert!(canvas.align_nodes("top"));
        assert!(!canvas.align_nodes("diagonal"));
        assert!(canvas.set_current_tool("connection"));
        assert!(!canvas.set_current_tool("lasso"));
        assert_eq!(canvas.current_tool(), "connection");

        let pasted = {
            canvas.set_current_tool("select");
            canvas.copy_selected_nodes();
            canvas.paste_nodes(Some(5.0), Some(5.0))
        };
        assert_eq!(pasted, r#"["node_3","node_4"]"#);
    }

    #[test]
    fn config_json_overrides_defaults() {
        let mut canvas = WorkflowCanvas::with_config(r#"{"defaultWorkflowName":"Draft"}"#);
        assert_eq!(canvas.workflow_name(), "Draft");
        canvas.set_workflow_name("Final");
        canvas.clear_workflow();
        assert_eq!(canvas.workflow_name(), "Draft");
        let fallback = WorkflowCanvas::with_config("[");
        assert_eq!(fallback.workflow_name(), "New workflow");
    }
}
