//! Ontology node representation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Confidence of a node when first learned
pub const INITIAL_NODE_CONFIDENCE: f64 = 0.5;

/// What an ontology node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Concept,
    Entity,
    Relationship,
    Attribute,
}

/// Property bag attached to nodes
pub type Properties = HashMap<String, serde_json::Value>;

/// A node in the learned knowledge graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntologyNode {
    pub id: String,
    /// Human-readable label
    pub label: String,
    pub kind: NodeKind,
    /// Owning domain ("space", "maritime", ...) or "general"
    pub domain: String,
    pub properties: Properties,
    /// Confidence in [0, 1]; only ever raised by reinforcement
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Number of entities that reinforced this node
    pub usage_count: u64,
}

impl OntologyNode {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        kind: NodeKind,
        domain: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            domain: domain.into(),
            properties: HashMap::new(),
            confidence: INITIAL_NODE_CONFIDENCE,
            created_at: now,
            updated_at: now,
            usage_count: 0,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Count one more use and raise confidence by `step`, capped at 1.0
    pub fn reinforce(&mut self, step: f64) {
        self.usage_count += 1;
        self.confidence = (self.confidence + step.max(0.0)).min(1.0);
        self.updated_at = Utc::now();
    }
}

/// Stable id for a learned concept label
pub fn concept_id(label: &str) -> String {
    let slug: String = label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("concept:{}", slug)
}
