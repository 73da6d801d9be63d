//! Axis alignment of a node selection.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use wf_core::{Graph, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

impl Alignment {
    fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Center | Self::Right)
    }
}

/// Align the nodes in `ids` along one axis. The reference line is computed
/// over the group's extents (nodes without a size count as 150×80); the
/// cross-axis coordinate and all other nodes are untouched.
///
/// Returns the number of nodes considered, or 0 if fewer than two of `ids`
/// are live, in which case nothing moves.
pub fn align_nodes(graph: &mut Graph, ids: &HashSet<NodeId>, alignment: Alignment) -> usize {
    let horizontal = alignment.is_horizontal();
    // (start, extent) along the alignment axis.
    let spans: Vec<(f64, f64)> = graph
        .nodes
        .iter()
        .filter(|n| ids.contains(&n.id))
        .map(|n| {
            let size = n.extent();
            if horizontal {
                (n.position.x, size.width)
            } else {
                (n.position.y, size.height)
            }
        })
        .collect();
    if spans.len() < 2 {
        return 0;
    }

    let min = spans.iter().map(|s| s.0).fold(f64::INFINITY, f64::min);
    let max = spans
        .iter()
        .map(|s| s.0 + s.1)
        .fold(f64::NEG_INFINITY, f64::max);

    for node in graph.nodes.iter_mut().filter(|n| ids.contains(&n.id)) {
        let size = node.extent();
        let (coord, extent) = if horizontal {
            (&mut node.position.x, size.width)
        } else {
            (&mut node.position.y, size.height)
        };
        *coord = match alignment {
            Alignment::Left | Alignment::Top => min,
            Alignment::Right | Alignment::Bottom => max - extent,
            Alignment::Center | Alignment::Middle => (min + max) / 2.0 - extent / 2.0,
        };
    }
    spans.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::{Node, NodeType, Position, Size};

    fn node(id: &str, x: f64, y: f64, size: Option<Size>) -> Node {
        let mut n = Node::new(NodeId::intern(id), NodeType::Task, Position::new(x, y));
        n.size = size;
        n
    }

    fn sample() -> (Graph, HashSet<NodeId>) {
        let graph = Graph {
            nodes: vec![
                node("al_a", 0.0, 10.0, Some(Size::new(150.0, 80.0))),
                node("al_b", 200.0, 50.0, Some(Size::new(100.0, 40.0))),
                node("al_c", 900.0, 900.0, None),
            ],
            edges: vec![],
        };
        let ids = HashSet::from([NodeId::intern("al_a"), NodeId::intern("al_b")]);
        (graph, ids)
    }

    fn xs(g: &Graph) -> Vec<f64> {
        g.nodes.iter().map(|n| n.position.x).collect()
    }

    fn ys(g: &Graph) -> Vec<f64> {
        g.nodes.iter().map(|n| n.position.y).collect()
    }

    #[test]
    fn right_uses_max_trailing_edge() {
        let (mut g, ids) = sample();
        assert_eq!(align_nodes(&mut g, &ids, Alignment::Right), 2);
        assert_eq!(xs(&g), vec![150.0, 200.0, 900.0]);
        assert_eq!(ys(&g), vec![10.0, 50.0, 900.0]);
    }

    #[test]
    fn left_and_center() {
        let (mut g, ids) = sample();
        align_nodes(&mut g, &ids, Alignment::Left);
        assert_eq!(xs(&g), vec![0.0, 0.0, 900.0]);

        let (mut g, ids) = sample();
        align_nodes(&mut g, &ids, Alignment::Center);
        // Span 0..300, midpoint 150.
        assert_eq!(xs(&g), vec![75.0, 100.0, 900.0]);
    }

    #[test]
    fn vertical_alignments() {
        let (mut g, ids) = sample();
        align_nodes(&mut g, &ids, Alignment::Top);
        assert_eq!(ys(&g), vec![10.0, 10.0, 900.0]);

        let (mut g, ids) = sample();
        align_nodes(&mut g, &ids, Alignment::Bottom);
        assert_eq!(ys(&g), vec![10.0, 50.0, 900.0]);

        let (mut g, ids) = sample();
        align_nodes(&mut g, &ids, Alignment::Middle);
        // Span 10..90, midpoint 50.
        assert_eq!(ys(&g), vec![10.0, 30.0, 900.0]);
        assert_eq!(xs(&g), vec![0.0, 200.0, 900.0]);
    }

    #[test]
    fn missing_size_defaults() {
        let mut g = Graph {
            nodes: vec![node("al_d", 0.0, 0.0, None), node("al_e", 400.0, 0.0, None)],
            edges: vec![],
        };
        let ids = HashSet::from([NodeId::intern("al_d"), NodeId::intern("al_e")]);
        align_nodes(&mut g, &ids, Alignment::Right);
        assert_eq!(xs(&g), vec![400.0, 400.0]);
    }

    #[test]
    fn single_node_is_a_noop() {
        let (mut g, _) = sample();
        let before = g.clone();
        let ids = HashSet::from([NodeId::intern("al_a"), NodeId::intern("al_ghost")]);
        assert_eq!(align_nodes(&mut g, &ids, Alignment::Left), 0);
        assert_eq!(g, before);
    }
}
