//! Ontology: the shared knowledge graph learned from fused entities
//!
//! A foundational seed of domain concepts is installed at startup. The
//! learner grows it from queued entities: concepts from ontology paths,
//! cross-domain relationships from co-occurring representations, and
//! patterns from shared attributes.

mod export;
mod graph;
mod learner;
mod node;
mod pattern;
mod relationship;
mod traverse;

pub use export::{OntologyExport, OntologyMetrics};
pub use graph::{foundation, OntologyGraph};
pub use learner::{LearnError, LearnOutcome, LearnSummary, LearnerConfig, OntologyLearner};
pub use node::{concept_id, NodeKind, OntologyNode, Properties, INITIAL_NODE_CONFIDENCE};
pub use pattern::{SemanticPattern, PATTERN_STEP};
pub use relationship::{
    relationship_id, OntologyRelationship, INITIAL_RELATIONSHIP_WEIGHT, RELATIONSHIP_STEP,
};
pub use traverse::find_related;
