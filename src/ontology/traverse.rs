//! Depth-bounded breadth-first traversal of the ontology

use super::graph::OntologyGraph;
use super::node::OntologyNode;
use super::relationship::OntologyRelationship;
use std::collections::{HashMap, HashSet};

/// Adjacency for walking relationships: directed edges from their source,
/// bidirectional edges from both ends
struct RelationshipIndex<'a> {
    adjacent: HashMap<&'a str, Vec<&'a OntologyRelationship>>,
}

impl<'a> RelationshipIndex<'a> {
    fn build(graph: &'a OntologyGraph) -> Self {
        let mut adjacent: HashMap<&str, Vec<&OntologyRelationship>> = HashMap::new();
        for rel in graph.relationships() {
            adjacent.entry(rel.source.as_str()).or_default().push(rel);
            if rel.bidirectional && rel.target != rel.source {
                adjacent.entry(rel.target.as_str()).or_default().push(rel);
            }
        }
        Self { adjacent }
    }

    fn from(&self, node_id: &str) -> &[&'a OntologyRelationship] {
        self.adjacent.get(node_id).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Nodes reachable from `origin` within `max_depth` hops, nearest first.
///
/// The origin itself is not included. Unknown origins yield nothing.
pub fn find_related(graph: &OntologyGraph, origin: &str, max_depth: usize) -> Vec<OntologyNode> {
    if !graph.has_node(origin) {
        return Vec::new();
    }

    let index = RelationshipIndex::build(graph);
    let mut visited: HashSet<&str> = HashSet::new();
    let mut current_level: Vec<&str> = vec![origin];
    let mut related = Vec::new();
    visited.insert(origin);

    for _depth in 0..max_depth {
        if current_level.is_empty() {
            break;
        }

        let mut next_level = Vec::new();
        for node_id in &current_level {
            for &rel in index.from(node_id) {
                let Some(neighbor_id) = rel.neighbor_of(node_id) else {
                    continue;
                };
                if !visited.insert(neighbor_id) {
                    continue;
                }
                if let Some(neighbor) = graph.node(neighbor_id) {
                    related.push(neighbor.clone());
                    next_level.push(neighbor_id);
                }
            }
        }
        current_level = next_level;
    }

    related
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::node::NodeKind;

    fn chain() -> OntologyGraph {
        // a -> b -> c -> a (cycle), d <-> b
        let mut graph = OntologyGraph::new();
        for id in ["a", "b", "c", "d"] {
            graph.add_node(OntologyNode::new(id, id, NodeKind::Concept, "general"));
        }
        graph.add_relationship(OntologyRelationship::new("a", "b", "next"));
        graph.add_relationship(OntologyRelationship::new("b", "c", "next"));
        graph.add_relationship(OntologyRelationship::new("c", "a", "next"));
        graph.add_relationship(OntologyRelationship::new("d", "b", "peer").bidirectional());
        graph
    }

    fn ids(nodes: &[OntologyNode]) -> Vec<&str> {
        let mut ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn depth_zero_returns_nothing() {
        assert!(find_related(&chain(), "a", 0).is_empty());
    }

    #[test]
    fn depth_one_follows_outgoing_edges() {
        assert_eq!(ids(&find_related(&chain(), "a", 1)), vec!["b"]);
    }

    #[test]
    fn bidirectional_edges_walk_backwards() {
        assert_eq!(ids(&find_related(&chain(), "b", 1)), vec!["c", "d"]);
    }

    #[test]
    fn directed_edges_do_not_walk_backwards() {
        // c -> a exists, but a -> c does not
        assert_eq!(ids(&find_related(&chain(), "c", 1)), vec!["a"]);
    }

    #[test]
    fn cycles_terminate() {
        assert_eq!(ids(&find_related(&chain(), "a", 10)), vec!["b", "c", "d"]);
    }

    #[test]
    fn unknown_origin_is_empty() {
        assert!(find_related(&chain(), "zzz", 3).is_empty());
    }
}
