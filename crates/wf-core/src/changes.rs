//! Generic change records emitted by the canvas widget while the user drags,
//! resizes, selects, or deletes, and the folding of a batch of them into a
//! [`Graph`].
//!
//! The JSON shape matches what browser graph widgets emit: a `type` tag
//! (`position`, `dimensions`, `select`, `remove`, `add`, `replace`) with the
//! remaining fields camelCased. Changes naming an absent id are skipped.

use crate::graph::Graph;
use crate::id::{EdgeId, NodeId};
use crate::model::{Edge, Node, Position, Size};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeChange {
    /// Drag step. `position` is absent while the widget only reports state.
    Position {
        id: NodeId,
        #[serde(default)]
        position: Option<Position>,
        #[serde(default)]
        dragging: bool,
    },
    Dimensions {
        id: NodeId,
        #[serde(default, rename = "dimensions")]
        size: Option<Size>,
        #[serde(default)]
        resizing: bool,
    },
    Select {
        id: NodeId,
        selected: bool,
    },
    Remove {
        id: NodeId,
    },
    Add {
        #[serde(rename = "item")]
        node: Node,
        #[serde(default)]
        index: Option<usize>,
    },
    Replace {
        id: NodeId,
        #[serde(rename = "item")]
        node: Node,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EdgeChange {
    Select {
        id: EdgeId,
        selected: bool,
    },
    Remove {
        id: EdgeId,
    },
    Add {
        #[serde(rename = "item")]
        edge: Edge,
        #[serde(default)]
        index: Option<usize>,
    },
    Replace {
        id: EdgeId,
        #[serde(rename = "item")]
        edge: Edge,
    },
}

/// What a node change batch did, for the caller's selection bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeChangeSummary {
    /// Ids removed by the batch.
    pub removed: SmallVec<[NodeId; 4]>,
    /// Whether any node's `selected` flag may have been set by the batch.
    pub selection_touched: bool,
    /// Edges dropped because an endpoint was removed.
    pub pruned_edges: usize,
    /// Changes skipped because they named an absent or conflicting id.
    pub skipped: usize,
}

/// Fold `changes` into `graph`, in order, as one transition.
///
/// Removing a node also removes its incident edges so the graph never holds
/// a dangling edge, even for removals that originate in the view.
pub fn apply_node_changes(graph: &mut Graph, changes: &[NodeChange]) -> NodeChangeSummary {
    let mut summary = NodeChangeSummary::default();

    for change in changes {
        let applied = match change {
            NodeChange::Position { id, position, .. } => match graph.node_mut(*id) {
                Some(node) => {
                    if let Some(p) = position {
                        node.position = *p;
                    }
                    true
                }
                None => false,
            },
            NodeChange::Dimensions { id, size, .. } => match graph.node_mut(*id) {
                Some(node) => {
                    if let Some(s) = size {
                        node.size = Some(*s);
                    }
                    true
                }
                None => false,
            },
            NodeChange::Select { id, selected } => match graph.node_mut(*id) {
                Some(node) => {
                    node.selected = *selected;
                    summary.selection_touched = true;
                    true
                }
                None => false,
            },
            NodeChange::Remove { id } => {
                let before = graph.nodes.len();
                graph.nodes.retain(|n| n.id != *id);
                let removed = graph.nodes.len() < before;
                if removed {
                    summary.removed.push(*id);
                }
                removed
            }
            NodeChange::Add { node, index } => {
                if graph.contains_node(node.id) {
                    false
                } else {
                    let at = index.unwrap_or(graph.nodes.len()).min(graph.nodes.len());
                    summary.selection_touched |= node.selected;
                    graph.nodes.insert(at, node.clone());
                    true
                }
            }
            NodeChange::Replace { id, node } => {
                let clashes = node.id != *id && graph.contains_node(node.id);
                match graph.nodes.iter_mut().find(|n| n.id == *id) {
                    Some(slot) if !clashes => {
                        summary.selection_touched |= slot.selected != node.selected;
                        if node.id != *id {
                            summary.removed.push(*id);
                        }
                        *slot = node.clone();
                        true
                    }
                    _ => false,
                }
            }
        };
        if !applied {
            log::trace!("skipping node change {change:?}");
            summary.skipped += 1;
        }
    }

    if !summary.removed.is_empty() {
        summary.pruned_edges = graph.prune_dangling_edges();
    }
    summary
}

/// Fold edge `changes` into `graph`. Returns the number of applied changes.
///
/// Added or replacement edges must connect live nodes and must not reuse a
/// live edge id; otherwise they are skipped.
pub fn apply_edge_changes(graph: &mut Graph, changes: &[EdgeChange]) -> usize {
    let mut applied = 0;

    for change in changes {
        let ok = match change {
            EdgeChange::Select { id, selected } => {
                match graph.edges.iter_mut().find(|e| e.id == *id) {
                    Some(edge) => {
                        edge.selected = *selected;
                        true
                    }
                    None => false,
                }
            }
            EdgeChange::Remove { id } => {
                let before = graph.edges.len();
                graph.edges.retain(|e| e.id != *id);
                graph.edges.len() < before
            }
            EdgeChange::Add { edge, index } => {
                let valid = !graph.contains_edge(edge.id)
                    && graph.contains_node(edge.source)
                    && graph.contains_node(edge.target);
                if valid {
                    let at = index.unwrap_or(graph.edges.len()).min(graph.edges.len());
                    graph.edges.insert(at, edge.clone());
                }
                valid
            }
            EdgeChange::Replace { id, edge } => {
                let valid = (edge.id == *id || !graph.contains_edge(edge.id))
                    && graph.contains_node(edge.source)
                    && graph.contains_node(edge.target);
                match graph.edges.iter_mut().find(|e| e.id == *id) {
                    Some(slot) if valid => {
                        *slot = edge.clone();
                        true
                    }
                    _ => false,
                }
            }
        };
        if ok {
            applied += 1;
        } else {
            log::trace!("skipping edge change {change:?}");
        }
    }

    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Connection, NodeType};

    fn graph() -> Graph {
        let a = NodeId::intern("ch_a");
        let b = NodeId::intern("ch_b");
        Graph {
            nodes: vec![
                Node::new(a, NodeType::Start, Position::new(0.0, 0.0)),
                Node::new(b, NodeType::End, Position::new(0.0, 200.0)),
            ],
            edges: vec![Connection::new(a, b).into_edge(EdgeId::intern("ch_ab"))],
        }
    }

    #[test]
    fn position_and_dimension_changes_apply() {
        let mut g = graph();
        let a = NodeId::intern("ch_a");
        let summary = apply_node_changes(
            &mut g,
            &[
                NodeChange::Position {
                    id: a,
                    position: Some(Position::new(15.0, -30.0)),
                    dragging: true,
                },
                NodeChange::Dimensions {
                    id: a,
                    size: Some(Size::new(200.0, 90.0)),
                    resizing: false,
                },
            ],
        );
        let node = g.node(a).unwrap();
        assert_eq!(node.position, Position::new(15.0, -30.0));
        assert_eq!(node.size, Some(Size::new(200.0, 90.0)));
        assert!(!summary.selection_touched);
        assert_eq!(summary.skipped, 0);
    }

    #[test]
    fn remove_change_prunes_incident_edges() {
        let mut g = graph();
        let summary = apply_node_changes(
            &mut g,
            &[NodeChange::Remove {
                id: NodeId::intern("ch_b"),
            }],
        );
        assert_eq!(summary.removed.as_slice(), &[NodeId::intern("ch_b")]);
        assert_eq!(summary.pruned_edges, 1);
        assert!(g.edges.is_empty());
    }

    #[test]
    fn changes_for_absent_ids_are_skipped() {
        let mut g = graph();
        let before = g.clone();
        let summary = apply_node_changes(
            &mut g,
            &[NodeChange::Select {
                id: NodeId::intern("ch_ghost"),
                selected: true,
            }],
        );
        assert_eq!(summary.skipped, 1);
        assert_eq!(g, before);
    }

    #[test]
    fn deserializes_widget_json() {
        let changes: Vec<NodeChange> = serde_json::from_str(
            r#"[
                {"type": "position", "id": "ch_a", "position": {"x": 4, "y": 5}, "dragging": true},
                {"type": "dimensions", "id": "ch_a", "dimensions": {"width": 10, "height": 20}},
                {"type": "select", "id": "ch_b", "selected": true},
                {"type": "remove", "id": "ch_b"}
            ]"#,
        )
        .unwrap();
        assert_eq!(changes.len(), 4);
        assert!(matches!(
            changes[2],
            NodeChange::Select { selected: true, .. }
        ));
    }

    #[test]
    fn edge_add_requires_live_endpoints() {
        let mut g = graph();
        let dangling = Connection::new(NodeId::intern("ch_a"), NodeId::intern("ch_zz"))
            .into_edge(EdgeId::intern("ch_dangling"));
        let applied = apply_edge_changes(
            &mut g,
            &[
                EdgeChange::Add {
                    edge: dangling,
                    index: None,
                },
                EdgeChange::Select {
                    id: EdgeId::intern("ch_ab"),
                    selected: true,
                },
            ],
        );
        assert_eq!(applied, 1);
        assert_eq!(g.edges.len(), 1);
        assert!(g.edges[0].selected);

        apply_edge_changes(
            &mut g,
            &[EdgeChange::Remove {
                id: EdgeId::intern("ch_ab"),
            }],
        );
        assert!(g.edges.is_empty());
    }
}
