//! The diagram store: one owned state object behind the whole command
//! surface the view calls into.
//!
//! Every structural command (connect, add, delete, paste, align) records
//! the pre-mutation graph in [`History`] before applying itself. Edits that
//! only touch labels, selection, or tool mode do not. Commands whose
//! precondition fails change nothing, record nothing, and report the
//! outcome through their return value.

use crate::align::{Alignment, align_nodes};
use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::hit::hit_test;
use crate::history::History;
use crate::render::{RenderModel, RenderNode};
use crate::shortcuts::ShortcutAction;
use crate::tools::{ConnectionDraft, DraftStep, ToolKind};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::HashSet;
use wf_core::{
    Connection, Edge, EdgeChange, EdgeId, Graph, Node, NodeChange, NodeChangeSummary, NodeDataPatch,
    NodeId, NodeIdGenerator, NodeType, Position, Workflow, WorkflowError, apply_edge_changes,
    apply_node_changes, export_file_name,
};

/// Identity of the document last loaded, kept across saves.
#[derive(Debug, Clone, PartialEq)]
struct DocumentOrigin {
    id: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DiagramStore {
    config: EditorConfig,
    name: String,
    description: Option<String>,
    graph: Graph,
    /// Authoritative selection; node `selected` flags mirror it.
    selected: Vec<NodeId>,
    tool: ToolKind,
    draft: ConnectionDraft,
    history: History,
    clipboard: Clipboard,
    ids: NodeIdGenerator,
    origin: Option<DocumentOrigin>,
}

impl Default for DiagramStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagramStore {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            name: config.default_workflow_name.clone(),
            description: None,
            graph: Graph::new(),
            selected: Vec::new(),
            tool: ToolKind::default(),
            draft: ConnectionDraft::default(),
            history: History::new(config.max_history),
            clipboard: Clipboard::new(),
            ids: NodeIdGenerator::new(),
            origin: None,
            config,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn nodes(&self) -> &[Node] {
        &self.graph.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.graph.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph.node(id)
    }

    pub fn selected_nodes(&self) -> &[NodeId] {
        &self.selected
    }

    pub fn current_tool(&self) -> ToolKind {
        self.tool
    }

    pub fn connection_source_id(&self) -> Option<NodeId> {
        self.draft.source()
    }

    pub fn workflow_name(&self) -> &str {
        &self.name
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Topmost node under `point`, for translating raw canvas clicks.
    pub fn hit_test(&self, point: Position) -> Option<NodeId> {
        hit_test(&self.graph, point)
    }

    // ─── Graph state ─────────────────────────────────────────────────────

    /// Fold a batch of widget node changes. Never recorded in history.
    pub fn on_nodes_change(&mut self, changes: &[NodeChange]) -> NodeChangeSummary {
        let summary = apply_node_changes(&mut self.graph, changes);
        if summary.selection_touched {
            self.selected = self.graph.flagged_selection();
        } else if !summary.removed.is_empty() {
            let graph = &self.graph;
            self.selected.retain(|id| graph.contains_node(*id));
        }
        self.drop_stale_draft();
        summary
    }

    /// Fold a batch of widget edge changes. Never recorded in history.
    pub fn on_edges_change(&mut self, changes: &[EdgeChange]) -> usize {
        apply_edge_changes(&mut self.graph, changes)
    }

    /// Append a default edge realizing `connection`.
    ///
    /// No-op (returns `None`) when an endpoint is not a live node or the
    /// exact same connection already exists.
    pub fn connect(&mut self, connection: Connection) -> Option<EdgeId> {
        if !self.graph.can_connect(&connection) {
            debug!(
                "connect {} -> {}: endpoint missing",
                connection.source, connection.target
            );
            return None;
        }
        if self.graph.has_connection(&connection) {
            debug!(
                "connect {} -> {}: already connected",
                connection.source, connection.target
            );
            return None;
        }
        self.save_to_history();
        let id = self.graph.fresh_edge_id();
        self.graph.edges.push(connection.into_edge(id));
        Some(id)
    }

    /// Widget callback for a completed handle-to-handle drag.
    pub fn on_connect(&mut self, connection: Connection) -> Option<EdgeId> {
        self.connect(connection)
    }

    /// Create a node with the type's default payload and size.
    pub fn add_node(&mut self, node_type: NodeType, position: Position) -> Node {
        self.save_to_history();
        let id = self.ids.next_free_id(|id| self.graph.contains_node(id));
        let node = Node::new(id, node_type, position);
        debug!("add {} node {}", node_type, node.id);
        self.graph.push_node(node.clone());
        node
    }

    /// Like [`add_node`](Self::add_node), defaulting to a text node.
    pub fn add_node_at_position(&mut self, position: Position, node_type: Option<NodeType>) -> Node {
        self.add_node(node_type.unwrap_or(NodeType::Text), position)
    }

    /// Shallow-merge `patch` into the node's payload. Not an undo step.
    pub fn update_node_data(&mut self, id: NodeId, patch: &NodeDataPatch) -> bool {
        match self.graph.node_mut(id) {
            Some(node) => {
                node.data.apply_patch(patch);
                true
            }
            None => {
                debug!("update_node_data: no node {id}");
                false
            }
        }
    }

    pub fn update_node_text(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        self.update_node_data(id, &NodeDataPatch::label(text))
    }

    /// Remove one node and its incident edges.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        if !self.graph.contains_node(id) {
            debug!("delete_node: no node {id}");
            return false;
        }
        self.remove(&HashSet::from([id]));
        true
    }

    /// Remove every selected node and its incident edges. Returns the count.
    pub fn delete_selected_nodes(&mut self) -> usize {
        if self.selected.is_empty() {
            debug!("delete_selected_nodes: empty selection");
            return 0;
        }
        let ids = self.selection_set();
        self.remove(&ids)
    }

    fn remove(&mut self, ids: &HashSet<NodeId>) -> usize {
        self.save_to_history();
        let (nodes, edges) = self.graph.remove_nodes(ids);
        debug!("removed {nodes} node(s), {edges} edge(s)");
        self.selected.retain(|id| !ids.contains(id));
        self.drop_stale_draft();
        nodes
    }

    // ─── Selection & tool mode ───────────────────────────────────────────

    /// Replace the selection. Ids that are not live nodes are dropped.
    /// Returns the resulting selection size.
    pub fn set_selected_nodes<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut seen = HashSet::new();
        self.selected = ids
            .into_iter()
            .filter(|id| self.graph.contains_node(*id) && seen.insert(*id))
            .collect();
        self.graph.flag_selection(&seen);
        self.selected.len()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.graph.flag_selection(&HashSet::new());
    }

    /// Switch tools. Always drops a pending connection endpoint.
    pub fn set_current_tool(&mut self, tool: ToolKind) {
        if self.draft.cancel() {
            debug!("tool switch to {tool} cancelled connection draft");
        }
        self.tool = tool;
    }

    /// Set or clear the first endpoint of a connection being drafted.
    /// Returns `false` (and changes nothing) for an id that is not live.
    pub fn set_connection_source_id(&mut self, id: Option<NodeId>) -> bool {
        if let Some(id) = id
            && !self.graph.contains_node(id)
        {
            debug!("set_connection_source_id: no node {id}");
            return false;
        }
        self.draft.set_source(id);
        true
    }

    /// A click on node `id`. With the connection tool this drives the
    /// draft protocol; with any other tool it selects just that node.
    /// Returns whether any state changed.
    pub fn click_node(&mut self, id: NodeId) -> bool {
        if !self.graph.contains_node(id) {
            debug!("click_node: no node {id}");
            return false;
        }
        if self.tool != ToolKind::Connection {
            self.set_selected_nodes([id]);
            return true;
        }
        match self.draft.click_node(id) {
            DraftStep::Armed(_) => true,
            DraftStep::Unchanged => false,
            DraftStep::Complete(connection) => {
                self.connect(connection);
                // The draft is cleared even if the edge already existed.
                true
            }
        }
    }

    /// A click on empty canvas: cancels a connection draft, otherwise
    /// clears the selection. Returns whether any state changed.
    pub fn click_canvas(&mut self) -> bool {
        if self.tool == ToolKind::Connection {
            return self.draft.cancel();
        }
        let had_selection = !self.selected.is_empty();
        self.clear_selection();
        had_selection
    }

    fn selection_set(&self) -> HashSet<NodeId> {
        self.selected.iter().copied().collect()
    }

    fn drop_stale_draft(&mut self) {
        if let Some(source) = self.draft.source()
            && !self.graph.contains_node(source)
        {
            self.draft.cancel();
        }
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Record the current graph as the state before the next mutation.
    pub fn save_to_history(&mut self) {
        self.history.save(self.graph.clone());
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.graph) {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => {
                debug!("undo: nothing to undo");
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => {
                debug!("redo: nothing to redo");
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn restore(&mut self, snapshot: Graph) {
        self.graph = snapshot;
        self.selected = self.graph.flagged_selection();
        self.drop_stale_draft();
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Copy the selected subgraph. Returns the number of nodes copied; an
    /// empty selection leaves the clipboard as it was.
    pub fn copy_selected_nodes(&mut self) -> usize {
        if self.selected.is_empty() {
            debug!("copy_selected_nodes: empty selection");
            return 0;
        }
        let ids = self.selection_set();
        self.clipboard.copy(&self.graph, &ids)
    }

    /// Paste the clipboard shifted by `offset` (the configured offset when
    /// `None`). The pasted nodes become the whole selection. Returns their
    /// ids; empty when the clipboard is empty.
    pub fn paste_nodes(&mut self, offset: Option<Position>) -> Vec<NodeId> {
        let offset = offset.unwrap_or(self.config.paste_offset);
        let Some(pasted) = self.clipboard.instantiate(&self.graph, &mut self.ids, offset) else {
            debug!("paste_nodes: clipboard empty");
            return Vec::new();
        };
        self.save_to_history();
        for node in &mut self.graph.nodes {
            node.selected = false;
        }
        let new_ids: Vec<NodeId> = pasted.nodes.iter().map(|n| n.id).collect();
        debug!(
            "pasted {} node(s), {} edge(s)",
            pasted.nodes.len(),
            pasted.edges.len()
        );
        self.graph.nodes.extend(pasted.nodes);
        self.graph.edges.extend(pasted.edges);
        self.selected = new_ids.clone();
        new_ids
    }

    /// Copy the selection, then paste it at the configured offset.
    pub fn duplicate_selected_nodes(&mut self) -> Vec<NodeId> {
        if self.copy_selected_nodes() == 0 {
            return Vec::new();
        }
        self.paste_nodes(None)
    }

    // ─── Alignment ───────────────────────────────────────────────────────

    /// Align the selection. Needs at least two selected nodes.
    pub fn align_nodes(&mut self, alignment: Alignment) -> bool {
        if self.selected.len() < 2 {
            debug!("align_nodes: fewer than two nodes selected");
            return false;
        }
        self.save_to_history();
        let ids = self.selection_set();
        align_nodes(&mut self.graph, &ids, alignment) > 0
    }

    // ─── Workflow document ───────────────────────────────────────────────

    pub fn set_workflow_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Suggested download name for the current workflow.
    pub fn export_file_name(&self) -> String {
        export_file_name(&self.name)
    }

    /// Reset to an empty, untitled workflow. The clipboard is kept.
    pub fn clear_workflow(&mut self) {
        self.graph = Graph::new();
        self.name = self.config.default_workflow_name.clone();
        self.description = None;
        self.selected.clear();
        self.draft.cancel();
        self.history.clear();
        self.ids.reset();
        self.origin = None;
    }

    /// Serialize the current state as a pretty-printed workflow document.
    /// A document that was loaded keeps its id and creation time.
    pub fn save_workflow(&self) -> Result<String, WorkflowError> {
        self.to_workflow().to_json_pretty()
    }

    pub fn to_workflow(&self) -> Workflow {
        let mut workflow = Workflow::new(self.name.clone(), self.graph.clone());
        workflow.description = self.description.clone();
        if let Some(origin) = &self.origin {
            workflow.id = origin.id.clone();
            workflow.created_at = origin.created_at;
        }
        workflow
    }

    /// Replace the whole state with a workflow document. On error the store
    /// is left exactly as it was.
    pub fn load_workflow(&mut self, text: &str) -> Result<(), WorkflowError> {
        let workflow = Workflow::from_json(text).inspect_err(|e| {
            warn!("rejected workflow import: {e}");
        })?;
        self.replace_workflow(workflow);
        Ok(())
    }

    fn replace_workflow(&mut self, workflow: Workflow) {
        self.origin = Some(DocumentOrigin {
            id: workflow.id.clone(),
            created_at: workflow.created_at,
        });
        self.name = workflow.name.clone();
        self.description = workflow.description.clone();
        self.graph = workflow.into_graph();
        self.selected = self.graph.flagged_selection();
        self.draft.cancel();
        self.history.clear();
        self.ids.resume_after(self.graph.node_ids());
        debug!(
            "loaded workflow '{}' ({} nodes, {} edges)",
            self.name,
            self.graph.nodes.len(),
            self.graph.edges.len()
        );
    }

    // ─── Shortcuts ───────────────────────────────────────────────────────

    /// Execute a resolved shortcut. `viewport_center` is where shape keys
    /// drop their node. Returns whether any state changed.
    pub fn run_shortcut(&mut self, action: ShortcutAction, viewport_center: Position) -> bool {
        match action {
            ShortcutAction::Tool(tool) => {
                let changed = tool != self.tool || self.draft.source().is_some();
                self.set_current_tool(tool);
                changed
            }
            ShortcutAction::PlaceShape(tool) => {
                let Some(node_type) = tool.node_type() else {
                    return false;
                };
                self.add_node_at_position(viewport_center, Some(node_type));
                self.set_current_tool(ToolKind::Select);
                true
            }
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Delete => self.delete_selected_nodes() > 0,
            ShortcutAction::Copy => self.copy_selected_nodes() > 0,
            ShortcutAction::Paste => !self.paste_nodes(None).is_empty(),
            ShortcutAction::Duplicate => !self.duplicate_selected_nodes().is_empty(),
            ShortcutAction::Deselect => {
                let changed = !self.selected.is_empty() || self.tool != ToolKind::Select;
                self.clear_selection();
                self.set_current_tool(ToolKind::Select);
                changed
            }
        }
    }

    // ─── Render model ────────────────────────────────────────────────────

    pub fn render_model(&self) -> RenderModel {
        RenderModel {
            workflow_name: self.name.clone(),
            nodes: self
                .graph
                .nodes
                .iter()
                .map(|n| RenderNode {
                    id: n.id,
                    node_type: n.node_type(),
                    position: n.position,
                    size: n.extent(),
                    label: n.label().to_string(),
                    selected: n.selected,
                    source_handles: n.node_type().source_handles(),
                })
                .collect(),
            edges: self.graph.edges.clone(),
            selected_nodes: self.selected.clone(),
            current_tool: self.tool,
            connection_source_id: self.draft.source(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }
}
