//! The canonical node/edge collections and their structural operations.
//!
//! Invariants kept by every method here:
//! - node ids are unique;
//! - every edge's `source` and `target` name a live node.

use crate::error::WorkflowError;
use crate::id::{EdgeId, NodeId};
use crate::model::{Connection, Edge, Node};
use std::collections::HashSet;

/// Nodes (in paint order) plus edges. Cloning is a deep copy.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.iter().any(|e| e.id == id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    /// Edges with `id` as either endpoint.
    pub fn edges_of(&self, id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(move |e| e.touches(id))
    }

    /// Append a node. The caller guarantees the id is fresh.
    pub fn push_node(&mut self, node: Node) {
        debug_assert!(!self.contains_node(node.id), "duplicate node id {}", node.id);
        self.nodes.push(node);
    }

    /// Remove every node in `ids` and, in the same step, every edge incident
    /// to a removed node. Returns `(nodes_removed, edges_removed)`.
    pub fn remove_nodes(&mut self, ids: &HashSet<NodeId>) -> (usize, usize) {
        let nodes_before = self.nodes.len();
        self.nodes.retain(|n| !ids.contains(&n.id));
        let edges_before = self.edges.len();
        self.edges
            .retain(|e| !ids.contains(&e.source) && !ids.contains(&e.target));
        (
            nodes_before - self.nodes.len(),
            edges_before - self.edges.len(),
        )
    }

    /// Drop edges whose endpoints are no longer live. Returns the count.
    pub fn prune_dangling_edges(&mut self) -> usize {
        let live: HashSet<NodeId> = self.node_ids().collect();
        let before = self.edges.len();
        self.edges
            .retain(|e| live.contains(&e.source) && live.contains(&e.target));
        before - self.edges.len()
    }

    /// Whether both endpoints of `connection` are live nodes.
    pub fn can_connect(&self, connection: &Connection) -> bool {
        self.contains_node(connection.source) && self.contains_node(connection.target)
    }

    /// Whether an edge already realizes `connection`.
    pub fn has_connection(&self, connection: &Connection) -> bool {
        self.edges.iter().any(|e| e.matches(connection))
    }

    /// An edge id not used by any live edge.
    pub fn fresh_edge_id(&self) -> EdgeId {
        loop {
            let id = EdgeId::generate();
            if !self.contains_edge(id) {
                return id;
            }
        }
    }

    /// Copy of the subgraph induced by `ids`: the matching nodes plus only the
    /// edges with *both* endpoints inside the set.
    pub fn induced_subgraph(&self, ids: &HashSet<NodeId>) -> Graph {
        Graph {
            nodes: self
                .nodes
                .iter()
                .filter(|n| ids.contains(&n.id))
                .cloned()
                .collect(),
            edges: self
                .edges
                .iter()
                .filter(|e| ids.contains(&e.source) && ids.contains(&e.target))
                .cloned()
                .collect(),
        }
    }

    /// Ids of nodes whose `selected` render flag is set, in paint order.
    pub fn flagged_selection(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.selected)
            .map(|n| n.id)
            .collect()
    }

    /// Set every node's `selected` flag to membership in `ids`.
    pub fn flag_selection(&mut self, ids: &HashSet<NodeId>) {
        for node in &mut self.nodes {
            node.selected = ids.contains(&node.id);
        }
    }

    /// Check the structural invariants. Used at the import boundary.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        validate_parts(&self.nodes, &self.edges)
    }
}

/// Unique node ids, and every edge endpoint names one of them.
pub fn validate_parts(nodes: &[Node], edges: &[Edge]) -> Result<(), WorkflowError> {
    let mut seen = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !seen.insert(node.id) {
            return Err(WorkflowError::DuplicateNodeId(node.id.to_string()));
        }
    }
    for edge in edges {
        for endpoint in [edge.source, edge.target] {
            if !seen.contains(&endpoint) {
                return Err(WorkflowError::DanglingEdge {
                    edge: edge.id.to_string(),
                    node: endpoint.to_string(),
                });
            }
        }
    }
    Ok(())
}
