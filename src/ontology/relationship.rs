//! Relationships between ontology nodes, strengthened by evidence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Strength and confidence of a newly learned relationship
pub const INITIAL_RELATIONSHIP_WEIGHT: f64 = 0.5;

/// Increment applied to strength and confidence per reinforcement
pub const RELATIONSHIP_STEP: f64 = 0.05;

/// A typed, optionally bidirectional link between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntologyRelationship {
    pub id: String,
    pub source: String,
    pub target: String,
    /// e.g. "orbits_over", "navigates_at", "subclass_of"
    pub relationship_type: String,
    pub strength: f64,
    pub confidence: f64,
    /// Entity ids that supported this relationship, oldest first
    pub evidence: Vec<String>,
    pub bidirectional: bool,
    pub created_at: DateTime<Utc>,
    pub last_validated: DateTime<Utc>,
}

impl OntologyRelationship {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relationship_type: impl Into<String>,
    ) -> Self {
        let (source, target, relationship_type) = (source.into(), target.into(), relationship_type.into());
        let now = Utc::now();
        Self {
            id: relationship_id(&source, &relationship_type, &target),
            source,
            target,
            relationship_type,
            strength: INITIAL_RELATIONSHIP_WEIGHT,
            confidence: INITIAL_RELATIONSHIP_WEIGHT,
            evidence: Vec::new(),
            bidirectional: false,
            created_at: now,
            last_validated: now,
        }
    }

    pub fn bidirectional(mut self) -> Self {
        self.bidirectional = true;
        self
    }

    pub fn with_weights(mut self, strength: f64, confidence: f64) -> Self {
        self.strength = strength.clamp(0.0, 1.0);
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Strengthen with new evidence; keeps at most `max_evidence` entries.
    pub fn reinforce(&mut self, evidence: impl Into<String>, max_evidence: usize) {
        self.strength = (self.strength + RELATIONSHIP_STEP).min(1.0);
        self.confidence = (self.confidence + RELATIONSHIP_STEP).min(1.0);
        self.push_evidence(evidence.into(), max_evidence);
        self.last_validated = Utc::now();
    }

    pub(crate) fn push_evidence(&mut self, evidence: String, max_evidence: usize) {
        self.evidence.push(evidence);
        if self.evidence.len() > max_evidence {
            let excess = self.evidence.len() - max_evidence;
            self.evidence.drain(..excess);
        }
    }

    /// The node on the other end when walking from `from`, if this edge can be
    /// walked in that direction
    pub fn neighbor_of(&self, from: &str) -> Option<&str> {
        if self.source == from {
            Some(self.target.as_str())
        } else if self.bidirectional && self.target == from {
            Some(self.source.as_str())
        } else {
            None
        }
    }
}

/// Deterministic id for a (source, type, target) triple
pub fn relationship_id(source: &str, relationship_type: &str, target: &str) -> String {
    format!("{}|{}|{}", source, relationship_type, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reinforce_raises_both_weights_independently() {
        let mut rel = OntologyRelationship::new("a", "b", "orbits_over").with_weights(0.98, 0.5);
        rel.reinforce("e1", 10);

        assert_eq!(rel.strength, 1.0);
        assert!((rel.confidence - 0.55).abs() < 1e-9);
        assert_eq!(rel.evidence, vec!["e1".to_string()]);
    }

    #[test]
    fn evidence_is_bounded() {
        let mut rel = OntologyRelationship::new("a", "b", "navigates_at");
        for i in 0..5 {
            rel.reinforce(format!("e{}", i), 3);
        }
        assert_eq!(rel.evidence, vec!["e2", "e3", "e4"]);
    }

    #[test]
    fn neighbor_respects_direction() {
        let directed = OntologyRelationship::new("a", "b", "orbits_over");
        assert_eq!(directed.neighbor_of("a"), Some("b"));
        assert_eq!(directed.neighbor_of("b"), None);

        let both = OntologyRelationship::new("a", "b", "transmits_via").bidirectional();
        assert_eq!(both.neighbor_of("b"), Some("a"));
    }
}
