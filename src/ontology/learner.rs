//! OntologyLearner: incremental learning from the stream of fused entities
//!
//! Entities are queued by `learn_from_entity` and learned one per drain
//! tick. Learning an entity runs in three stages: concept extraction,
//! relationship discovery, pattern learning. A malformed entity is skipped
//! as a whole and never stalls the queue.

use super::export::{OntologyExport, OntologyMetrics};
use super::graph::{foundation, OntologyGraph};
use super::node::{concept_id, NodeKind, OntologyNode};
use super::pattern::SemanticPattern;
use super::relationship::OntologyRelationship;
use super::traverse::find_related;
use crate::entity::{Domain, FusedEntity};
use crate::events::{EventBus, FusionEvent};
use crate::schedule::BackgroundTask;
use crate::storage::SnapshotStore;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Confidence step unit for concept reinforcement
const CONCEPT_STEP: f64 = 0.05;

/// Links a learned concept to the seed node of its entity's primary domain
pub const GROUNDED_IN: &str = "grounded_in";

const CONSTELLATION_PATTERN_CONFIDENCE: f64 = 0.6;
const VESSEL_TYPE_PATTERN_CONFIDENCE: f64 = 0.5;

/// Learner tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// Queue drain cadence
    pub drain_interval_ms: u64,
    /// Export cadence for the snapshot store
    pub export_interval_ms: u64,
    /// Evidence entries kept per relationship
    pub max_evidence: usize,
    /// Example entity ids kept per pattern
    pub max_pattern_examples: usize,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            drain_interval_ms: 5_000,
            export_interval_ms: 60_000,
            max_evidence: 50,
            max_pattern_examples: 10,
        }
    }
}

impl LearnerConfig {
    pub fn drain_interval(&self) -> Duration {
        Duration::from_millis(self.drain_interval_ms)
    }

    pub fn export_interval(&self) -> Duration {
        Duration::from_millis(self.export_interval_ms)
    }
}

/// Why an entity could not be learned from
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LearnError {
    #[error("entity {0} has no domain representation")]
    NoRepresentation(String),
    #[error("entity {global_id} has an empty ontology path element at {index}")]
    EmptyPathElement { global_id: String, index: usize },
    #[error("entity {global_id} has a malformed representation: {reason}")]
    MalformedRepresentation { global_id: String, reason: String },
}

/// Structure created while learning one entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LearnSummary {
    pub nodes_created: usize,
    pub nodes_reinforced: usize,
    pub relationships_created: usize,
    pub relationships_reinforced: usize,
    pub patterns_created: usize,
    pub patterns_observed: usize,
}

impl LearnSummary {
    fn expanded(&self) -> bool {
        self.nodes_created + self.relationships_created + self.patterns_created > 0
    }
}

/// What happened to the entity taken off the queue
#[derive(Debug, Clone, PartialEq)]
pub enum LearnOutcome {
    Learned {
        global_id: String,
        summary: LearnSummary,
    },
    Skipped {
        global_id: String,
        error: LearnError,
    },
}

/// The single shared ontology and the queue feeding it
#[derive(Debug)]
pub struct OntologyLearner {
    graph: Mutex<OntologyGraph>,
    queue: Mutex<VecDeque<FusedEntity>>,
    config: LearnerConfig,
    events: EventBus,
    processed: AtomicU64,
    skipped: AtomicU64,
}

impl OntologyLearner {
    /// A learner over a freshly seeded foundational ontology
    pub fn new(config: LearnerConfig, events: EventBus) -> Self {
        Self {
            graph: Mutex::new(OntologyGraph::with_foundation()),
            queue: Mutex::new(VecDeque::new()),
            config,
            events,
            processed: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// Queue an entity; learning happens on a later drain tick
    pub fn learn_from_entity(&self, entity: FusedEntity) {
        self.lock_queue().push_back(entity);
    }

    pub fn queue_len(&self) -> usize {
        self.lock_queue().len()
    }

    /// Learn from the oldest queued entity. `None` when the queue is empty.
    pub fn process_next(&self) -> Option<LearnOutcome> {
        let entity = self.lock_queue().pop_front()?;
        let global_id = entity.global_id.clone();

        let result = {
            let mut graph = self.lock_graph();
            learn(&mut graph, &entity, &self.config)
        };

        match result {
            Ok(summary) => {
                self.processed.fetch_add(1, Ordering::Relaxed);
                if summary.expanded() {
                    self.events.publish(FusionEvent::OntologyExpanded {
                        source_entity: global_id.clone(),
                        nodes_created: summary.nodes_created,
                        relationships_created: summary.relationships_created,
                        patterns_created: summary.patterns_created,
                    });
                }
                Some(LearnOutcome::Learned { global_id, summary })
            }
            Err(error) => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(global_id = %global_id, error = %error, "entity skipped by ontology learner");
                Some(LearnOutcome::Skipped { global_id, error })
            }
        }
    }

    /// Process until the queue is empty; returns how many entities were taken
    pub fn drain(&self) -> usize {
        std::iter::from_fn(|| self.process_next()).count()
    }

    /// Nodes reachable from `node_id` within `max_depth` hops
    pub fn find_related_concepts(&self, node_id: &str, max_depth: usize) -> Vec<OntologyNode> {
        find_related(&self.lock_graph(), node_id, max_depth)
    }

    pub fn node(&self, id: &str) -> Option<OntologyNode> {
        self.lock_graph().node(id).cloned()
    }

    /// The node learned for a concept label, e.g. "tanker"
    pub fn concept(&self, label: &str) -> Option<OntologyNode> {
        self.node(&concept_id(label))
    }

    pub fn relationship(
        &self,
        source: &str,
        relationship_type: &str,
        target: &str,
    ) -> Option<OntologyRelationship> {
        self.lock_graph()
            .find_relationship(source, relationship_type, target)
            .cloned()
    }

    pub fn pattern(&self, id: &str) -> Option<SemanticPattern> {
        self.lock_graph().pattern(id).cloned()
    }

    pub fn get_metrics(&self) -> OntologyMetrics {
        let queue_length = self.queue_len();
        OntologyMetrics::compute(
            &self.lock_graph(),
            queue_length,
            self.processed.load(Ordering::Relaxed),
            self.skipped.load(Ordering::Relaxed),
        )
    }

    /// Snapshot nodes, relationships, patterns and metrics
    pub fn export(&self) -> OntologyExport {
        let metrics = self.get_metrics();
        OntologyExport::capture(&self.lock_graph(), metrics)
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        self.export().to_json()
    }

    /// Drain one entity every `interval` until stopped
    pub fn spawn(self: Arc<Self>, interval: Duration) -> BackgroundTask {
        BackgroundTask::spawn("ontology-drain", interval, move || {
            let learner = Arc::clone(&self);
            async move {
                learner.process_next();
            }
        })
    }

    /// Write an export into `store` every `interval` until stopped
    pub fn spawn_exporter(
        self: Arc<Self>,
        store: Arc<dyn SnapshotStore>,
        interval: Duration,
    ) -> BackgroundTask {
        BackgroundTask::spawn("ontology-export", interval, move || {
            let learner = Arc::clone(&self);
            let store = Arc::clone(&store);
            async move {
                let export = learner.export();
                if let Err(e) = store.save_export(&export) {
                    tracing::warn!(error = %e, "ontology export failed");
                }
            }
        })
    }

    fn lock_graph(&self) -> std::sync::MutexGuard<'_, OntologyGraph> {
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<FusedEntity>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Check everything learning relies on before touching the graph
fn check(entity: &FusedEntity) -> Result<(), LearnError> {
    if entity.representations.is_empty() {
        return Err(LearnError::NoRepresentation(entity.global_id.clone()));
    }
    if let Some(index) = entity.ontology_path.iter().position(|p| p.trim().is_empty()) {
        return Err(LearnError::EmptyPathElement {
            global_id: entity.global_id.clone(),
            index,
        });
    }
    for rep in &entity.representations {
        rep.validate().map_err(|reason| LearnError::MalformedRepresentation {
            global_id: entity.global_id.clone(),
            reason,
        })?;
    }
    Ok(())
}

/// Learn from one entity
fn learn(graph: &mut OntologyGraph, entity: &FusedEntity, config: &LearnerConfig) -> Result<LearnSummary, LearnError> {
    check(entity)?;

    let mut summary = LearnSummary::default();
    extract_concepts(graph, entity, config, &mut summary);
    discover_relationships(graph, entity, config, &mut summary);
    learn_patterns(graph, entity, config, &mut summary);
    Ok(summary)
}

/// One node per distinct path element and the entity type.
///
/// Later (more specific) path elements gain confidence faster. Consecutive
/// path elements are linked specific `subclass_of` general, and the most
/// specific concept is grounded in the primary domain's seed node.
fn extract_concepts(
    graph: &mut OntologyGraph,
    entity: &FusedEntity,
    config: &LearnerConfig,
    summary: &mut LearnSummary,
) {
    let domain = entity
        .primary_domain()
        .map(|d| d.as_str().to_string())
        .unwrap_or_else(|| "general".to_string());

    let mut seen = HashSet::new();
    let mut concepts: Vec<(String, f64)> = Vec::new();
    for (i, label) in entity.ontology_path.iter().enumerate() {
        let label = label.trim();
        if seen.insert(concept_id(label)) {
            concepts.push((label.to_string(), CONCEPT_STEP * (i + 1) as f64));
        }
    }
    let entity_type = entity.entity_type.trim();
    if !entity_type.is_empty() && seen.insert(concept_id(entity_type)) {
        concepts.push((entity_type.to_string(), CONCEPT_STEP));
    }

    let most_specific = entity
        .ontology_path
        .last()
        .map(|label| concept_id(label.trim()))
        .or_else(|| (!entity_type.is_empty()).then(|| concept_id(entity_type)));

    for (label, step) in concepts {
        let id = concept_id(&label);
        match graph.node_mut(&id) {
            Some(node) => {
                node.reinforce(step);
                summary.nodes_reinforced += 1;
            }
            None => {
                let mut node = OntologyNode::new(id, label, NodeKind::Concept, domain.clone())
                    .with_property("first_seen", serde_json::Value::String(entity.global_id.clone()));
                node.usage_count = 1;
                graph.add_node(node);
                summary.nodes_created += 1;
            }
        }
    }

    for pair in entity.ontology_path.windows(2) {
        let (general, specific) = (concept_id(pair[0].trim()), concept_id(pair[1].trim()));
        if general != specific {
            reinforce_relationship(graph, &specific, &general, "subclass_of", false, entity, config, summary);
        }
    }

    if let (Some(concept), Some(seed)) = (most_specific, entity.primary_domain().map(seed_node)) {
        reinforce_relationship(graph, &concept, seed, GROUNDED_IN, true, entity, config, summary);
    }
}

/// The foundational node a domain's learned concepts hang off
fn seed_node(domain: Domain) -> &'static str {
    match domain {
        Domain::Space => foundation::SATELLITE,
        Domain::Geospatial => foundation::GEOGRAPHIC_LOCATION,
        Domain::Maritime => foundation::VESSEL,
        Domain::Network => foundation::NETWORK_NODE,
        Domain::Cyber => foundation::DIGITAL_TWIN,
    }
}

/// Relationships implied by which domains co-occur on one entity
fn discover_relationships(
    graph: &mut OntologyGraph,
    entity: &FusedEntity,
    config: &LearnerConfig,
    summary: &mut LearnSummary,
) {
    use foundation::*;

    let has = |d| entity.has_domain(d);
    if has(Domain::Space) && has(Domain::Geospatial) {
        reinforce_relationship(graph, SATELLITE, GEOGRAPHIC_LOCATION, "orbits_over", false, entity, config, summary);
    }
    if has(Domain::Maritime) && has(Domain::Geospatial) {
        reinforce_relationship(graph, VESSEL, GEOGRAPHIC_LOCATION, "navigates_at", false, entity, config, summary);
    }
    if has(Domain::Network) && has(Domain::Space) {
        reinforce_relationship(graph, NETWORK_NODE, SATELLITE, "transmits_via", true, entity, config, summary);
    }
    if has(Domain::Network) && has(Domain::Maritime) {
        reinforce_relationship(graph, NETWORK_NODE, VESSEL, "transmits_via", true, entity, config, summary);
    }
}

#[allow(clippy::too_many_arguments)]
fn reinforce_relationship(
    graph: &mut OntologyGraph,
    source: &str,
    target: &str,
    relationship_type: &str,
    bidirectional: bool,
    entity: &FusedEntity,
    config: &LearnerConfig,
    summary: &mut LearnSummary,
) {
    let id = super::relationship::relationship_id(source, relationship_type, target);
    if let Some(rel) = graph.relationship_mut(&id) {
        rel.reinforce(entity.global_id.clone(), config.max_evidence);
        summary.relationships_reinforced += 1;
        return;
    }

    let mut rel = OntologyRelationship::new(source, target, relationship_type);
    if bidirectional {
        rel = rel.bidirectional();
    }
    rel.push_evidence(entity.global_id.clone(), config.max_evidence);
    graph.add_relationship(rel);
    summary.relationships_created += 1;
}

/// Domain regularities keyed on shared attributes
fn learn_patterns(
    graph: &mut OntologyGraph,
    entity: &FusedEntity,
    config: &LearnerConfig,
    summary: &mut LearnSummary,
) {
    if let Some(constellation) = entity.space().and_then(|s| s.constellation.as_deref()) {
        observe_pattern(
            graph,
            format!("constellation:{}", constellation.to_lowercase()),
            || {
                format!(
                    "Satellites in the {} constellation share operational characteristics",
                    constellation
                )
            },
            vec![Domain::Space],
            CONSTELLATION_PATTERN_CONFIDENCE,
            entity,
            config,
            summary,
        );
    }

    if let Some(vessel_type) = entity.maritime().and_then(|m| m.vessel_type.as_deref()) {
        observe_pattern(
            graph,
            format!("vessel_type:{}", vessel_type.to_lowercase()),
            || format!("Vessels of type {} follow similar operational patterns", vessel_type),
            vec![Domain::Maritime],
            VESSEL_TYPE_PATTERN_CONFIDENCE,
            entity,
            config,
            summary,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn observe_pattern(
    graph: &mut OntologyGraph,
    id: String,
    describe: impl FnOnce() -> String,
    domains: Vec<Domain>,
    initial_confidence: f64,
    entity: &FusedEntity,
    config: &LearnerConfig,
    summary: &mut LearnSummary,
) {
    if let Some(pattern) = graph.pattern_mut(&id) {
        pattern.observe(entity.global_id.clone(), config.max_pattern_examples);
        summary.patterns_observed += 1;
        return;
    }
    graph.add_pattern(SemanticPattern::discovered(
        id,
        describe(),
        domains,
        initial_confidence,
        entity.global_id.clone(),
    ));
    summary.patterns_created += 1;
}
