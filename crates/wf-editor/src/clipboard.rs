//! Single-slot clipboard for subgraphs.
//!
//! A copy holds the selected nodes plus only the edges with both endpoints
//! in the selection. Pasting remaps every id so the pasted subgraph never
//! collides with the live graph, and keeps internal connectivity intact.

use std::collections::{HashMap, HashSet};
use wf_core::{Graph, NodeId, NodeIdGenerator, Position};

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    payload: Option<Graph>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing has been copied yet.
    pub fn is_empty(&self) -> bool {
        self.payload.as_ref().is_none_or(|g| g.nodes.is_empty())
    }

    pub fn payload(&self) -> Option<&Graph> {
        self.payload.as_ref()
    }

    /// Replace the slot with the subgraph of `graph` induced by `ids`.
    /// Returns the number of nodes copied; an empty induced set leaves the
    /// previous payload in place.
    pub fn copy(&mut self, graph: &Graph, ids: &HashSet<NodeId>) -> usize {
        let mut sub = graph.induced_subgraph(ids);
        if sub.nodes.is_empty() {
            return 0;
        }
        let count = sub.nodes.len();
        for node in &mut sub.nodes {
            node.selected = false;
        }
        for edge in &mut sub.edges {
            edge.selected = false;
        }
        self.payload = Some(sub);
        count
    }

    /// Build a paste-ready copy of the payload: fresh node ids from `ids`,
    /// fresh edge ids unique against `live`, positions shifted by `offset`,
    /// every node flagged selected. The payload itself is unchanged, so
    /// repeated pastes stack.
    pub fn instantiate(
        &self,
        live: &Graph,
        ids: &mut NodeIdGenerator,
        offset: Position,
    ) -> Option<Graph> {
        let payload = self.payload.as_ref().filter(|g| !g.nodes.is_empty())?;

        let mut remap: HashMap<NodeId, NodeId> = HashMap::with_capacity(payload.nodes.len());
        let mut out = Graph::new();
        for node in &payload.nodes {
            // A loaded document may already hold an id the generator has not
            // passed; skip over it.
            let fresh_id = ids.next_free_id(|id| live.contains_node(id));
            remap.insert(node.id, fresh_id);
            let mut copy = node.clone();
            copy.id = fresh_id;
            copy.position = node.position.offset(offset);
            copy.selected = true;
            out.nodes.push(copy);
        }

        for edge in &payload.edges {
            let (Some(&source), Some(&target)) = (remap.get(&edge.source), remap.get(&edge.target))
            else {
                continue;
            };
            let mut id = live.fresh_edge_id();
            while out.contains_edge(id) {
                id = live.fresh_edge_id();
            }
            let mut copy = edge.clone();
            copy.id = id;
            copy.source = source;
            copy.target = target;
            out.edges.push(copy);
        }

        Some(out)
    }
}
