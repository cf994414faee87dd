//! OntologyGraph: nodes, relationships and patterns of the learned ontology

use super::node::{NodeKind, OntologyNode};
use super::pattern::SemanticPattern;
use super::relationship::{relationship_id, OntologyRelationship};
use std::collections::BTreeMap;

/// Ids of the seed nodes installed at initialization
pub mod foundation {
    pub const SATELLITE: &str = "space:satellite";
    pub const CONSTELLATION: &str = "space:constellation";
    pub const GEOGRAPHIC_LOCATION: &str = "geospatial:location";
    pub const TERRAIN: &str = "geospatial:terrain";
    pub const VESSEL: &str = "maritime:vessel";
    pub const PORT: &str = "maritime:port";
    pub const NETWORK_NODE: &str = "network:node";
    pub const NETWORK_LINK: &str = "network:link";
    pub const DIGITAL_TWIN: &str = "cyber:digital_twin";
}

/// Confidence of seed nodes
const FOUNDATION_CONFIDENCE: f64 = 0.9;

/// The knowledge graph. Ordered maps keep exports stable.
#[derive(Debug, Clone, Default)]
pub struct OntologyGraph {
    nodes: BTreeMap<String, OntologyNode>,
    relationships: BTreeMap<String, OntologyRelationship>,
    patterns: BTreeMap<String, SemanticPattern>,
}

impl OntologyGraph {
    /// An empty graph with no seed
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph holding the foundational ontology
    pub fn with_foundation() -> Self {
        use foundation::*;

        let mut graph = Self::new();
        let seeds = [
            (SATELLITE, "Satellite", NodeKind::Entity, "space"),
            (CONSTELLATION, "Constellation", NodeKind::Concept, "space"),
            (GEOGRAPHIC_LOCATION, "Geographic Location", NodeKind::Concept, "geospatial"),
            (TERRAIN, "Terrain", NodeKind::Attribute, "geospatial"),
            (VESSEL, "Vessel", NodeKind::Entity, "maritime"),
            (PORT, "Port", NodeKind::Concept, "maritime"),
            (NETWORK_NODE, "Network Node", NodeKind::Entity, "network"),
            (NETWORK_LINK, "Network Link", NodeKind::Relationship, "network"),
            (DIGITAL_TWIN, "Digital Twin", NodeKind::Entity, "cyber"),
        ];
        for (id, label, kind, domain) in seeds {
            graph.add_node(
                OntologyNode::new(id, label, kind, domain)
                    .with_confidence(FOUNDATION_CONFIDENCE)
                    .with_property("foundational", serde_json::Value::Bool(true)),
            );
        }

        graph.add_relationship(
            OntologyRelationship::new(SATELLITE, GEOGRAPHIC_LOCATION, "orbits_over")
                .with_weights(0.5, 0.7),
        );
        graph.add_relationship(
            OntologyRelationship::new(NETWORK_NODE, SATELLITE, "transmits_via")
                .bidirectional()
                .with_weights(0.5, 0.7),
        );
        graph.add_relationship(
            OntologyRelationship::new(SATELLITE, CONSTELLATION, "member_of").with_weights(0.8, 0.9),
        );
        graph.add_relationship(
            OntologyRelationship::new(VESSEL, PORT, "docks_at").with_weights(0.8, 0.9),
        );
        graph
    }

    /// Insert or replace a node
    pub fn add_node(&mut self, node: OntologyNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Insert or replace a relationship
    pub fn add_relationship(&mut self, relationship: OntologyRelationship) {
        self.relationships.insert(relationship.id.clone(), relationship);
    }

    pub fn node(&self, id: &str) -> Option<&OntologyNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut OntologyNode> {
        self.nodes.get_mut(id)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn relationship(&self, id: &str) -> Option<&OntologyRelationship> {
        self.relationships.get(id)
    }

    /// Find a relationship by endpoints and type
    pub fn find_relationship(
        &self,
        source: &str,
        relationship_type: &str,
        target: &str,
    ) -> Option<&OntologyRelationship> {
        self.relationships
            .get(&relationship_id(source, relationship_type, target))
    }

    pub(crate) fn relationship_mut(&mut self, id: &str) -> Option<&mut OntologyRelationship> {
        self.relationships.get_mut(id)
    }

    pub fn pattern(&self, id: &str) -> Option<&SemanticPattern> {
        self.patterns.get(id)
    }

    pub(crate) fn pattern_mut(&mut self, id: &str) -> Option<&mut SemanticPattern> {
        self.patterns.get_mut(id)
    }

    pub fn add_pattern(&mut self, pattern: SemanticPattern) {
        self.patterns.insert(pattern.id.clone(), pattern);
    }

    pub fn nodes(&self) -> impl Iterator<Item = &OntologyNode> {
        self.nodes.values()
    }

    pub fn relationships(&self) -> impl Iterator<Item = &OntologyRelationship> {
        self.relationships.values()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &SemanticPattern> {
        self.patterns.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}
