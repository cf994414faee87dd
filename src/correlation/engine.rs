//! CorrelationEngine: the entity registry of one world

use super::rules::{correlate_pair, CorrelationRule};
use crate::entity::{Domain, EntityPatch, FusedEntity};
use crate::error::{FusionError, FusionResult};
use crate::events::{EventBus, FusionEvent};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Confidence assigned on the first intra-world match
const BASE_CORRELATION_CONFIDENCE: f64 = 0.5;

/// Confidence added per matched entity
const PER_MATCH_CONFIDENCE: f64 = 0.1;

/// One entity judged correlated with another, and why
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatch {
    pub global_id: String,
    pub rule: CorrelationRule,
}

/// Result of correlating one entity against the registry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationOutcome {
    pub matches: Vec<CorrelationMatch>,
}

impl CorrelationOutcome {
    pub fn correlated_ids(&self) -> Vec<String> {
        self.matches.iter().map(|m| m.global_id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Confidence after `matches` intra-world matches, capped at 1.0
pub fn correlation_confidence(matches: usize) -> f64 {
    (BASE_CORRELATION_CONFIDENCE + PER_MATCH_CONFIDENCE * matches as f64).min(1.0)
}

/// Owns the entity registry for one bounded context ("world").
///
/// Capacity is not enforced here; the owning world admits entities.
#[derive(Debug)]
pub struct CorrelationEngine {
    world: String,
    correlation_radius_m: f64,
    entities: DashMap<String, FusedEntity>,
    events: EventBus,
}

impl CorrelationEngine {
    pub fn new(world: impl Into<String>, correlation_radius_m: f64, events: EventBus) -> Self {
        Self {
            world: world.into(),
            correlation_radius_m,
            entities: DashMap::new(),
            events,
        }
    }

    pub fn world(&self) -> &str {
        &self.world
    }

    pub fn correlation_radius_m(&self) -> f64 {
        self.correlation_radius_m
    }

    /// Add an entity and correlate it against every other registered entity.
    ///
    /// Fails without touching the registry if the entity is invalid or its
    /// global id is already present.
    pub fn register_entity(&self, entity: FusedEntity) -> FusionResult<CorrelationOutcome> {
        entity.validate()?;
        let global_id = entity.global_id.clone();

        match self.entities.entry(global_id.clone()) {
            Entry::Occupied(_) => {
                return Err(FusionError::DuplicateEntity {
                    world: self.world.clone(),
                    global_id,
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(entity);
            }
        }

        self.events.publish(FusionEvent::EntityRegistered {
            world: self.world.clone(),
            global_id: global_id.clone(),
        });
        Ok(self.correlate(&global_id))
    }

    /// Merge `patch` into an entity and re-run correlation.
    ///
    /// Returns `Ok(false)` without error when the entity is unknown: updates
    /// may race with registration, so absence is not a failure here.
    pub fn update_entity(&self, global_id: &str, patch: EntityPatch) -> FusionResult<bool> {
        patch.validate(global_id)?;
        {
            let Some(mut entity) = self.entities.get_mut(global_id) else {
                tracing::debug!(world = %self.world, global_id, "update for unknown entity ignored");
                return Ok(false);
            };
            entity.apply(patch);
        }

        self.events.publish(FusionEvent::EntityUpdated {
            world: self.world.clone(),
            global_id: global_id.to_string(),
        });
        self.correlate(global_id);
        Ok(true)
    }

    /// All registered entities correlated with `entity`. Pure read.
    pub fn find_correlated_entities(&self, entity: &FusedEntity) -> Vec<FusedEntity> {
        self.entities
            .iter()
            .filter(|other| other.key() != &entity.global_id)
            .filter(|other| correlate_pair(entity, other.value(), self.correlation_radius_m).is_some())
            .map(|other| other.value().clone())
            .collect()
    }

    /// Like `find_correlated_entities`, reporting the rule for each match
    pub fn find_correlations(&self, entity: &FusedEntity) -> CorrelationOutcome {
        let matches = self
            .entities
            .iter()
            .filter(|other| other.key() != &entity.global_id)
            .filter_map(|other| {
                correlate_pair(entity, other.value(), self.correlation_radius_m).map(|rule| {
                    CorrelationMatch {
                        global_id: other.key().clone(),
                        rule,
                    }
                })
            })
            .collect();
        CorrelationOutcome { matches }
    }

    /// All entities carrying a representation for `domain`
    pub fn get_entities_by_domain(&self, domain: Domain) -> Vec<FusedEntity> {
        self.entities
            .iter()
            .filter(|e| e.has_domain(domain))
            .map(|e| e.value().clone())
            .collect()
    }

    pub fn entity(&self, global_id: &str) -> Option<FusedEntity> {
        self.entities.get(global_id).map(|e| e.value().clone())
    }

    pub fn contains(&self, global_id: &str) -> bool {
        self.entities.contains_key(global_id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> Vec<FusedEntity> {
        self.entities.iter().map(|e| e.value().clone()).collect()
    }

    /// Explicitly remove an entity from the registry
    pub fn remove_entity(&self, global_id: &str) -> Option<FusedEntity> {
        self.entities.remove(global_id).map(|(_, entity)| entity)
    }

    /// Raise confidence on an entity after a match found outside this engine
    pub fn record_external_correlation(&self, global_id: &str, confidence: f64, rule: &str) {
        if let Some(mut entity) = self.entities.get_mut(global_id) {
            entity.record_correlation(confidence, rule);
        }
    }

    /// Correlate a registered entity and record matches on both sides
    fn correlate(&self, global_id: &str) -> CorrelationOutcome {
        let Some(snapshot) = self.entity(global_id) else {
            return CorrelationOutcome::default();
        };

        let outcome = self.find_correlations(&snapshot);
        if outcome.is_empty() {
            return outcome;
        }

        let confidence = correlation_confidence(outcome.matches.len());
        if let Some(mut entity) = self.entities.get_mut(global_id) {
            for m in &outcome.matches {
                entity.record_correlation(confidence, m.rule.id());
            }
        }
        for m in &outcome.matches {
            if let Some(mut other) = self.entities.get_mut(&m.global_id) {
                other.record_correlation(correlation_confidence(1), m.rule.id());
            }
        }

        tracing::debug!(
            world = %self.world,
            global_id,
            matches = outcome.matches.len(),
            "intra-world correlation"
        );

        let mut rules: Vec<String> = outcome.matches.iter().map(|m| m.rule.id().to_string()).collect();
        rules.sort();
        rules.dedup();
        self.events.publish(FusionEvent::CorrelationFound {
            world: self.world.clone(),
            global_id: global_id.to_string(),
            correlated_ids: outcome.correlated_ids(),
            rules,
        });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Coordinates, DomainRepresentation, GeospatialData, NetworkData};

    fn engine() -> CorrelationEngine {
        CorrelationEngine::new("test", 1_000.0, EventBus::default())
    }

    fn located(id: &str, lat: f64, lon: f64) -> FusedEntity {
        FusedEntity::with_id(id, "sensor").with_representation(DomainRepresentation::Geospatial(
            GeospatialData::at(Coordinates::new(lat, lon)),
        ))
    }

    #[test]
    fn register_correlates_with_existing_entities() {
        let engine = engine();
        engine.register_entity(located("a", 0.0, 0.0)).unwrap();
        let outcome = engine.register_entity(located("b", 0.001, 0.0)).unwrap();

        assert_eq!(outcome.correlated_ids(), vec!["a".to_string()]);
        let a = engine.entity("a").unwrap();
        let b = engine.entity("b").unwrap();
        assert_eq!(a.fusion_rules, vec!["geospatial.radius".to_string()]);
        assert!(b.correlation_confidence >= 0.6);
    }

    #[test]
    fn duplicate_registration_leaves_first_entity_untouched() {
        let engine = engine();
        engine.register_entity(located("a", 0.0, 0.0)).unwrap();
        let before = engine.entity("a").unwrap();

        let err = engine.register_entity(located("a", 45.0, 45.0)).unwrap_err();
        assert!(matches!(err, FusionError::DuplicateEntity { .. }));
        assert_eq!(engine.entity("a").unwrap(), before);
        assert_eq!(engine.entity_count(), 1);
    }

    #[test]
    fn invalid_entity_is_rejected() {
        let engine = engine();
        let err = engine.register_entity(FusedEntity::with_id("x", "ghost")).unwrap_err();
        assert!(matches!(err, FusionError::InvalidEntity { .. }));
        assert_eq!(engine.entity_count(), 0);
    }

    #[test]
    fn update_unknown_entity_is_noop() {
        let engine = engine();
        let updated = engine.update_entity("missing", EntityPatch::new()).unwrap();
        assert!(!updated);
        assert_eq!(engine.entity_count(), 0);
    }

    #[test]
    fn update_moves_entity_into_range_and_correlates() {
        let engine = engine();
        engine.register_entity(located("a", 0.0, 0.0)).unwrap();
        engine.register_entity(located("b", 10.0, 10.0)).unwrap();
        assert!(engine.entity("b").unwrap().fusion_rules.is_empty());

        let patch = EntityPatch::new().with_representation(DomainRepresentation::Geospatial(
            GeospatialData::at(Coordinates::new(0.0, 0.001)),
        ));
        assert!(engine.update_entity("b", patch).unwrap());

        let b = engine.entity("b").unwrap();
        assert_eq!(b.geospatial().unwrap().coordinates.lon, 0.001);
        assert_eq!(b.fusion_rules, vec!["geospatial.radius".to_string()]);
    }

    #[test]
    fn find_correlated_entities_excludes_self() {
        let engine = engine();
        engine.register_entity(located("a", 0.0, 0.0)).unwrap();
        let a = engine.entity("a").unwrap();
        assert!(engine.find_correlated_entities(&a).is_empty());
    }

    #[test]
    fn entities_by_domain() {
        let engine = engine();
        engine.register_entity(located("a", 0.0, 0.0)).unwrap();
        engine
            .register_entity(FusedEntity::with_id("n", "router").with_representation(
                DomainRepresentation::Network(NetworkData {
                    node_id: "n1".into(),
                    ..Default::default()
                }),
            ))
            .unwrap();

        assert_eq!(engine.get_entities_by_domain(Domain::Geospatial).len(), 1);
        assert_eq!(engine.get_entities_by_domain(Domain::Network).len(), 1);
        assert!(engine.get_entities_by_domain(Domain::Cyber).is_empty());
    }

    #[test]
    fn registration_publishes_events() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let engine = CorrelationEngine::new("test", 1_000.0, bus);
        engine.register_entity(located("a", 0.0, 0.0)).unwrap();
        engine.register_entity(located("b", 0.0, 0.001)).unwrap();

        let kinds: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.event_type())
            .collect();
        assert_eq!(
            kinds,
            vec!["entity_registered", "entity_registered", "correlation_found"]
        );
    }

    #[test]
    fn confidence_is_capped() {
        assert_eq!(correlation_confidence(1), 0.6);
        assert_eq!(correlation_confidence(20), 1.0);
    }
}
