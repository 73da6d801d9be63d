//! Integration tests: snapshot history through the store (wf-editor).
//!
//! Every structural command must be undoable back to the exact prior graph
//! and redoable forward again.

use pretty_assertions::assert_eq;
use wf_core::{Connection, Graph, NodeDataPatch, NodeId, NodeType, Position};
use wf_editor::{Alignment, DiagramStore, EditorConfig};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn loaded_store() -> DiagramStore {
    let mut store = DiagramStore::new();
    store
        .load_workflow(include_str!("fixtures/approval.json"))
        .unwrap();
    store
}

/// Run a mixed sequence of structural commands, returning the graph as it
/// was before each one plus the final graph.
fn run_mixed_commands(store: &mut DiagramStore) -> Vec<Graph> {
    let mut states = vec![store.graph().clone()];

    store.add_node(NodeType::Task, Position::new(400.0, 0.0));
    states.push(store.graph().clone());

    let review = NodeId::intern("node_3");
    let added = NodeId::intern("node_6");
    store.connect(Connection::new(review, added));
    states.push(store.graph().clone());

    // Selection is not an undo step; the next snapshot carries it.
    store.set_selected_nodes([review, added]);
    *states.last_mut().unwrap() = store.graph().clone();
    store.align_nodes(Alignment::Top);
    states.push(store.graph().clone());

    store.duplicate_selected_nodes();
    states.push(store.graph().clone());

    store.delete_node(NodeId::intern("node_2"));
    states.push(store.graph().clone());

    states
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn single_command_undo_then_redo() {
    init_logger();
    let mut store = DiagramStore::new();
    let empty = store.graph().clone();
    store.add_node(NodeType::Start, Position::new(10.0, 10.0));
    let after = store.graph().clone();

    assert!(store.can_undo());
    assert!(store.undo());
    assert_eq!(store.graph(), &empty);
    assert!(!store.can_undo());
    assert!(store.can_redo());

    assert!(store.redo());
    assert_eq!(store.graph(), &after);
    assert!(!store.can_redo());
}

#[test]
fn undo_k_times_returns_to_start_and_redo_k_times_returns() {
    init_logger();
    let mut store = loaded_store();
    let states = run_mixed_commands(&mut store);
    let k = states.len() - 1;

    for i in (0..k).rev() {
        assert!(store.undo(), "undo #{i} should succeed");
        assert_eq!(store.graph(), &states[i]);
    }
    assert!(!store.undo());

    for i in 1..=k {
        assert!(store.redo(), "redo #{i} should succeed");
        assert_eq!(store.graph(), &states[i]);
    }
    assert!(!store.redo());
}

#[test]
fn new_command_after_undo_truncates_redo() {
    let mut store = DiagramStore::new();
    store.add_node(NodeType::Task, Position::default());
    store.add_node(NodeType::Task, Position::new(200.0, 0.0));
    store.undo();
    assert!(store.can_redo());

    store.add_node(NodeType::End, Position::new(0.0, 200.0));
    assert!(!store.can_redo());
    assert_eq!(store.nodes().len(), 2);
    assert_eq!(store.nodes()[1].node_type(), NodeType::End);
}

#[test]
fn restored_snapshot_is_independent_of_live_edits() {
    let mut store = DiagramStore::new();
    let id = store.add_node(NodeType::Task, Position::default()).id;
    store.add_node(NodeType::Task, Position::new(200.0, 0.0));
    store.undo();

    // Label edits are not undo steps, and must not leak into history.
    store.update_node_data(id, &NodeDataPatch::label("edited"));
    store.redo();
    store.undo();
    assert_eq!(store.node(id).unwrap().label(), "");
}

#[test]
fn undo_restores_selection_from_flags() {
    let mut store = loaded_store();
    assert_eq!(store.selected_nodes(), &[NodeId::intern("node_2")]);
    store.set_selected_nodes([NodeId::intern("node_3")]);
    store.delete_selected_nodes();
    assert!(store.selected_nodes().is_empty());

    store.undo();
    assert_eq!(store.selected_nodes(), &[NodeId::intern("node_3")]);
    assert!(store.node(NodeId::intern("node_3")).unwrap().selected);
}

// ─── History bound ──────────────────────────────────────────────────────

#[test]
fn history_is_bounded_to_fifty() {
    let mut store = DiagramStore::new();
    let mut before = Vec::new();
    for i in 0..60 {
        before.push(store.graph().clone());
        store.add_node(NodeType::Task, Position::new(i as f64 * 10.0, 0.0));
    }
    assert_eq!(store.history().len(), 50);
    // Oldest retained: the state before the 50th-from-last command.
    assert_eq!(&store.history().entries()[0], &before[10]);
}

#[test]
fn history_bound_follows_config() {
    let mut store = DiagramStore::with_config(EditorConfig {
        max_history: 3,
        ..EditorConfig::default()
    });
    for _ in 0..5 {
        store.add_node(NodeType::Task, Position::default());
    }
    assert_eq!(store.history().len(), 3);

    let mut undone = 0;
    while store.undo() {
        undone += 1;
    }
    assert!(store.history().len() <= 3);
    assert_eq!(undone, 2);
    assert_eq!(store.nodes().len(), 3);
}

#[test]
fn single_entry_history_undoes_last_command() {
    for max_history in [0, 1] {
        let mut store = DiagramStore::with_config(EditorConfig {
            max_history,
            ..EditorConfig::default()
        });
        store.add_node(NodeType::Task, Position::default());
        store.add_node(NodeType::End, Position::new(0.0, 200.0));

        assert!(store.undo());
        assert_eq!(store.nodes().len(), 1);
        assert!(!store.undo());
        assert!(store.redo());
        assert_eq!(store.nodes().len(), 2);
        assert!(!store.can_redo());
    }
}

// ─── What is not recorded ───────────────────────────────────────────────

#[test]
fn cosmetic_commands_are_not_recorded() {
    let mut store = loaded_store();
    assert!(!store.can_undo());

    store.set_selected_nodes([NodeId::intern("node_1")]);
    store.update_node_text(NodeId::intern("node_1"), "Start here");
    store.set_current_tool(wf_editor::ToolKind::Connection);
    store.on_nodes_change(&[wf_core::NodeChange::Position {
        id: NodeId::intern("node_1"),
        position: Some(Position::new(5.0, 5.0)),
        dragging: true,
    }]);

    assert!(!store.can_undo());
    assert!(store.history().is_empty());
}
