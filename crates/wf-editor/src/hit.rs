//! Hit testing: canvas point → node lookup.

use wf_core::{Graph, NodeId, Position};

/// Find the topmost node at `point`, walking paint order back to front
/// (last painted = topmost). `None` means empty canvas.
pub fn hit_test(graph: &Graph, point: Position) -> Option<NodeId> {
    graph
        .nodes
        .iter()
        .rev()
        .find(|n| n.contains(point))
        .map(|n| n.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::{Node, NodeType, Size};

    #[test]
    fn topmost_wins_on_overlap() {
        let mut under = Node::new(NodeId::intern("hit_a"), NodeType::Task, Position::new(0.0, 0.0));
        under.size = Some(Size::new(100.0, 100.0));
        let over = Node::new(NodeId::intern("hit_b"), NodeType::Ellipse, Position::new(50.0, 50.0));
        let graph = Graph {
            nodes: vec![under, over],
            edges: vec![],
        };

        assert_eq!(
            hit_test(&graph, Position::new(60.0, 60.0)),
            Some(NodeId::intern("hit_b"))
        );
        assert_eq!(
            hit_test(&graph, Position::new(10.0, 10.0)),
            Some(NodeId::intern("hit_a"))
        );
        assert_eq!(hit_test(&graph, Position::new(-1.0, 10.0)), None);
    }
}
