//! Recurring semantic patterns observed across entities

use crate::entity::Domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Confidence increment per repeat observation
pub const PATTERN_STEP: f64 = 0.05;

/// A natural-language regularity with supporting examples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticPattern {
    pub id: String,
    pub pattern: String,
    pub domains: Vec<Domain>,
    pub confidence: f64,
    /// Example entity ids, oldest first
    pub examples: Vec<String>,
    /// Number of observations
    pub frequency: u64,
    pub discovered_at: DateTime<Utc>,
}

impl SemanticPattern {
    /// A first observation of a pattern
    pub fn discovered(
        id: impl Into<String>,
        pattern: impl Into<String>,
        domains: Vec<Domain>,
        confidence: f64,
        example: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            pattern: pattern.into(),
            domains,
            confidence: confidence.clamp(0.0, 1.0),
            examples: vec![example.into()],
            frequency: 1,
            discovered_at: Utc::now(),
        }
    }

    /// Record a repeat observation
    pub fn observe(&mut self, example: impl Into<String>, max_examples: usize) {
        self.frequency += 1;
        self.confidence = (self.confidence + PATTERN_STEP).min(1.0);
        let example = example.into();
        if !self.examples.contains(&example) {
            self.examples.push(example);
            if self.examples.len() > max_examples {
                self.examples.remove(0);
            }
        }
    }
}
