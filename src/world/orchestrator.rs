//! WorldOrchestrator: routes entities into worlds and links them across worlds

use super::config::{validate_worlds, WorldConfig};
use super::cross::{
    cross_world_confidence, natural_identity_match, CrossWorldCorrelation, CrossWorldLog,
    CrossWorldRetention, CROSS_WORLD_RULE,
};
use super::state::{WorldPerformance, WorldState, WorldStats};
use crate::correlation::{CorrelationEngine, CorrelationOutcome};
use crate::entity::{EntityPatch, FusedEntity};
use crate::error::{FusionError, FusionResult};
use crate::events::{EventBus, FusionEvent};
use crate::ontology::OntologyLearner;
use crate::schedule::BackgroundTask;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

/// One configured world: its policy, its registry and its counters
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    engine: CorrelationEngine,
    /// Serializes the capacity check with the insert
    admission: Mutex<()>,
    stats: WorldStats,
}

impl World {
    fn new(config: WorldConfig, events: EventBus) -> Self {
        let engine = CorrelationEngine::new(config.id.clone(), config.correlation_radius_m, events);
        Self {
            config,
            engine,
            admission: Mutex::new(()),
            stats: WorldStats::default(),
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn engine(&self) -> &CorrelationEngine {
        &self.engine
    }

    pub fn entity_count(&self) -> usize {
        self.engine.entity_count()
    }

    fn state(&self) -> WorldState {
        let count = self.engine.entity_count();
        WorldState {
            world_id: self.config.id.clone(),
            name: self.config.name.clone(),
            fusion_enabled: self.config.fusion_enabled,
            active_domains: self.config.active_domains.clone(),
            entity_count: count,
            max_entities: self.config.max_entities,
            update_interval_ms: self.config.update_interval_ms,
            utilization: count as f64 / self.config.max_entities as f64,
            performance: self.stats.performance(),
        }
    }
}

/// The outcome of admitting an entity into a world
#[derive(Debug, Clone, Default)]
pub struct Admission {
    /// Intra-world matches
    pub correlation: CorrelationOutcome,
    /// Cross-world links created by this admission
    pub cross_world: Vec<CrossWorldCorrelation>,
}

/// Owns the fixed set of worlds configured at startup.
///
/// Worlds are never created or removed at runtime. Cross-world correlation
/// runs synchronously inside `add_entity_to_world`, so a caller sees links
/// as soon as registration returns.
#[derive(Debug)]
pub struct WorldOrchestrator {
    worlds: BTreeMap<String, World>,
    active: RwLock<String>,
    cross_world: Mutex<CrossWorldLog>,
    learner: Option<Arc<OntologyLearner>>,
    events: EventBus,
}

impl WorldOrchestrator {
    /// Build an orchestrator over `worlds`; `active` must name one of them.
    pub fn new(
        worlds: Vec<WorldConfig>,
        active: &str,
        retention: CrossWorldRetention,
        events: EventBus,
    ) -> FusionResult<Self> {
        validate_worlds(&worlds)?;
        if !worlds.iter().any(|w| w.id == active) {
            return Err(FusionError::Config(format!(
                "active world {} is not configured",
                active
            )));
        }

        let worlds: BTreeMap<_, _> = worlds
            .into_iter()
            .map(|config| {
                tracing::info!(
                    world = %config.id,
                    max_entities = config.max_entities,
                    radius_m = config.correlation_radius_m,
                    fusion = config.fusion_enabled,
                    "world configured"
                );
                (config.id.clone(), World::new(config, events.clone()))
            })
            .collect();

        Ok(Self {
            worlds,
            active: RwLock::new(active.to_string()),
            cross_world: Mutex::new(CrossWorldLog::new(retention)),
            learner: None,
            events,
        })
    }

    /// The four standard worlds with "production" active
    pub fn standard(events: EventBus) -> FusionResult<Self> {
        Self::new(
            WorldConfig::standard_worlds(),
            "production",
            CrossWorldRetention::default(),
            events,
        )
    }

    /// Queue every admitted entity on `learner`
    pub fn with_learner(mut self, learner: Arc<OntologyLearner>) -> Self {
        self.learner = Some(learner);
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn world(&self, world_id: &str) -> FusionResult<&World> {
        self.worlds
            .get(world_id)
            .ok_or_else(|| FusionError::UnknownWorld(world_id.to_string()))
    }

    pub fn world_ids(&self) -> Vec<String> {
        self.worlds.keys().cloned().collect()
    }

    pub fn active_world(&self) -> String {
        self.active.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Change the world targeted by unscoped operations
    pub fn switch_active_world(&self, world_id: &str) -> FusionResult<()> {
        self.world(world_id)?;
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        tracing::info!(from = active.as_str(), to = world_id, "active world switched");
        *active = world_id.to_string();
        Ok(())
    }

    /// Admit an entity into the active world
    pub fn add_entity(&self, entity: FusedEntity) -> FusionResult<Admission> {
        let world_id = self.active_world();
        self.add_entity_to_world(&world_id, entity)
    }

    /// Admit an entity into `world_id`.
    ///
    /// Rejects (never queues or evicts) when the world is full. On success
    /// the entity is correlated within the world, then across worlds if
    /// this world fuses, then queued for learning.
    pub fn add_entity_to_world(&self, world_id: &str, entity: FusedEntity) -> FusionResult<Admission> {
        let world = self.world(world_id)?;
        entity.validate()?;
        if !world.config.accepts(&entity) {
            return Err(FusionError::InvalidEntity {
                global_id: entity.global_id,
                reason: format!("no representation in a domain active in world {}", world_id),
            });
        }

        let global_id = entity.global_id.clone();
        let correlation = {
            let _admission = world.admission.lock().unwrap_or_else(PoisonError::into_inner);
            if world.engine.entity_count() >= world.config.max_entities {
                world.stats.record_rejection();
                tracing::warn!(
                    world = world_id,
                    global_id = %global_id,
                    max_entities = world.config.max_entities,
                    "world at capacity, registration rejected"
                );
                self.events.publish(FusionEvent::CapacityExceeded {
                    world: world_id.to_string(),
                    global_id,
                    max_entities: world.config.max_entities,
                });
                return Err(FusionError::CapacityExceeded {
                    world: world_id.to_string(),
                    max_entities: world.config.max_entities,
                });
            }
            world.engine.register_entity(entity)?
        };
        world.stats.record_registration(correlation.matches.len());

        let cross_world = if world.config.fusion_enabled {
            self.perform_cross_world_correlation(world_id, &global_id)?
        } else {
            Vec::new()
        };

        if let (Some(learner), Some(snapshot)) = (&self.learner, world.engine.entity(&global_id)) {
            learner.learn_from_entity(snapshot);
        }

        Ok(Admission {
            correlation,
            cross_world,
        })
    }

    /// Patch an entity in `world_id` and re-run cross-world correlation.
    ///
    /// Unknown entities are a silent no-op (`Ok(false)`).
    pub fn update_entity_in_world(
        &self,
        world_id: &str,
        global_id: &str,
        patch: EntityPatch,
    ) -> FusionResult<bool> {
        let world = self.world(world_id)?;
        if !world.engine.update_entity(global_id, patch)? {
            return Ok(false);
        }
        world.stats.record_update();
        if world.config.fusion_enabled {
            self.perform_cross_world_correlation(world_id, global_id)?;
        }
        Ok(true)
    }

    /// Link `global_id` in `source_world_id` to same-object entities in every
    /// other fusion-enabled world.
    ///
    /// Candidates share at least one domain with the source entity and are
    /// matched on natural identifiers. One record is written per target
    /// world with at least one match.
    pub fn perform_cross_world_correlation(
        &self,
        source_world_id: &str,
        global_id: &str,
    ) -> FusionResult<Vec<CrossWorldCorrelation>> {
        let source_world = self.world(source_world_id)?;
        if !source_world.config.fusion_enabled {
            return Ok(Vec::new());
        }
        let Some(entity) = source_world.engine.entity(global_id) else {
            return Ok(Vec::new());
        };

        let mut created = Vec::new();
        for (target_id, target) in &self.worlds {
            if target_id == source_world_id || !target.config.fusion_enabled {
                continue;
            }

            let matched = matching_entities(&entity, target);
            if matched.is_empty() {
                continue;
            }

            let confidence = cross_world_confidence(entity.representations.len(), matched.len());
            let mut entity_ids = Vec::with_capacity(matched.len() + 1);
            entity_ids.push(entity.global_id.clone());
            entity_ids.extend(matched.iter().cloned());

            let record = CrossWorldCorrelation {
                source_world: source_world_id.to_string(),
                target_world: target_id.clone(),
                entity_ids,
                confidence,
                timestamp: Utc::now(),
            };

            source_world
                .engine
                .record_external_correlation(&entity.global_id, confidence, CROSS_WORLD_RULE);
            for id in &matched {
                target
                    .engine
                    .record_external_correlation(id, confidence, CROSS_WORLD_RULE);
            }
            source_world.stats.record_cross_world_match();
            target.stats.record_cross_world_match();

            tracing::info!(
                source_world = source_world_id,
                target_world = %target_id,
                global_id = %entity.global_id,
                matches = matched.len(),
                confidence,
                "cross-world correlation"
            );

            self.cross_world
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .record(record.clone());
            self.events.publish(FusionEvent::CrossWorldCorrelated(record.clone()));
            created.push(record);
        }

        Ok(created)
    }

    /// Snapshot of the cross-world correlation log
    pub fn cross_world_correlations(&self) -> Vec<CrossWorldCorrelation> {
        self.cross_world
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .records()
            .to_vec()
    }

    pub fn get_world_state(&self, world_id: &str) -> FusionResult<WorldState> {
        Ok(self.world(world_id)?.state())
    }

    pub fn get_all_world_states(&self) -> Vec<WorldState> {
        self.worlds.values().map(World::state).collect()
    }

    /// Convert counter deltas since the last snapshot into rates, per world id
    pub fn take_performance_snapshot(&self) -> Vec<(String, WorldPerformance)> {
        self.worlds
            .iter()
            .map(|(id, w)| (id.clone(), w.stats.sample()))
            .collect()
    }

    /// Run `take_performance_snapshot` every `interval` until stopped
    pub fn spawn_snapshot_task(self: Arc<Self>, interval: Duration) -> BackgroundTask {
        BackgroundTask::spawn("world-snapshot", interval, move || {
            let orchestrator = Arc::clone(&self);
            async move {
                for (world_id, perf) in orchestrator.take_performance_snapshot() {
                    tracing::debug!(
                        world = %world_id,
                        registrations_per_sec = perf.registrations_per_sec,
                        correlations_per_sec = perf.correlations_per_sec,
                        "world performance sampled"
                    );
                }
            }
        })
    }
}

/// Ids of entities in `target` sharing a domain and a natural identifier with `entity`
fn matching_entities(entity: &FusedEntity, target: &World) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    for domain in entity.domains() {
        for candidate in target.engine.get_entities_by_domain(domain) {
            if !seen.insert(candidate.global_id.clone()) {
                continue;
            }
            if natural_identity_match(entity, &candidate) {
                matched.push(candidate.global_id);
            }
        }
    }
    matched
}
