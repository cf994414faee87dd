//! Metrics and whole-graph export documents

use super::graph::OntologyGraph;
use super::node::OntologyNode;
use super::pattern::SemanticPattern;
use super::relationship::OntologyRelationship;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary figures for dashboards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OntologyMetrics {
    pub node_count: usize,
    pub relationship_count: usize,
    pub pattern_count: usize,
    /// Node count per owning domain
    pub domain_coverage: BTreeMap<String, usize>,
    pub average_confidence: f64,
    /// (queue length + pattern count) / node count
    pub growth_rate: f64,
    pub queue_length: usize,
    /// Entities learned from
    pub processed: u64,
    /// Entities dropped because they could not be learned from
    pub skipped: u64,
}

impl OntologyMetrics {
    pub(crate) fn compute(graph: &OntologyGraph, queue_length: usize, processed: u64, skipped: u64) -> Self {
        let node_count = graph.node_count();
        let mut domain_coverage = BTreeMap::new();
        let mut confidence_sum = 0.0;
        for node in graph.nodes() {
            *domain_coverage.entry(node.domain.clone()).or_insert(0) += 1;
            confidence_sum += node.confidence;
        }

        let (average_confidence, growth_rate) = if node_count == 0 {
            (0.0, 0.0)
        } else {
            (
                confidence_sum / node_count as f64,
                (queue_length + graph.pattern_count()) as f64 / node_count as f64,
            )
        };

        Self {
            node_count,
            relationship_count: graph.relationship_count(),
            pattern_count: graph.pattern_count(),
            domain_coverage,
            average_confidence,
            growth_rate,
            queue_length,
            processed,
            skipped,
        }
    }
}

/// A full snapshot of the ontology for an external store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntologyExport {
    pub nodes: Vec<OntologyNode>,
    pub relationships: Vec<OntologyRelationship>,
    pub patterns: Vec<SemanticPattern>,
    pub metrics: OntologyMetrics,
    pub exported_at: DateTime<Utc>,
}

impl OntologyExport {
    pub(crate) fn capture(graph: &OntologyGraph, metrics: OntologyMetrics) -> Self {
        Self {
            nodes: graph.nodes().cloned().collect(),
            relationships: graph.relationships().cloned().collect(),
            patterns: graph.patterns().cloned().collect(),
            metrics,
            exported_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
