//! Runtime configuration loaded from YAML
//!
//! Every section has defaults, so an empty document yields the four
//! standard worlds with production active.

use crate::adapter::MaritimeConfig;
use crate::error::{FusionError, FusionResult};
use crate::events::EventBus;
use crate::ontology::{LearnerConfig, OntologyLearner};
use crate::schedule::BackgroundTask;
use crate::storage::SnapshotStore;
use crate::world::{validate_worlds, CrossWorldRetention, WorldConfig, WorldOrchestrator};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub snapshot_interval_ms: u64,
    pub retention: CrossWorldRetention,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            snapshot_interval_ms: 5_000,
            retention: CrossWorldRetention::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_millis(self.snapshot_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub worlds: Vec<WorldConfig>,
    pub active_world: String,
    pub learner: LearnerConfig,
    pub orchestrator: OrchestratorConfig,
    pub maritime: MaritimeConfig,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            worlds: WorldConfig::standard_worlds(),
            active_world: "production".to_string(),
            learner: LearnerConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            maritime: MaritimeConfig::default(),
        }
    }
}

impl FusionConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> FusionResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> FusionResult<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loading configuration");
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> FusionResult<()> {
        validate_worlds(&self.worlds)?;
        if !self.worlds.iter().any(|w| w.id == self.active_world) {
            return Err(FusionError::Config(format!(
                "active world {} is not configured",
                self.active_world
            )));
        }
        if self.learner.drain_interval_ms == 0
            || self.learner.export_interval_ms == 0
            || self.orchestrator.snapshot_interval_ms == 0
        {
            return Err(FusionError::Config("intervals must be positive".into()));
        }
        let m = &self.maritime;
        if !(m.collision_radius_nm > 0.0 && m.route_deviation_nm > 0.0) || m.history_limit == 0 {
            return Err(FusionError::Config(
                "maritime thresholds and history limit must be positive".into(),
            ));
        }
        Ok(())
    }

    /// A learner configured from the `learner` section
    pub fn learner(&self, events: EventBus) -> OntologyLearner {
        OntologyLearner::new(self.learner.clone(), events)
    }

    /// An orchestrator over the configured worlds, queuing admissions on `learner`
    pub fn orchestrator(
        &self,
        events: EventBus,
        learner: Arc<OntologyLearner>,
    ) -> FusionResult<WorldOrchestrator> {
        Ok(WorldOrchestrator::new(
            self.worlds.clone(),
            &self.active_world,
            self.orchestrator.retention,
            events,
        )?
        .with_learner(learner))
    }

    /// Start the learner drain, the world snapshot and, given a store, the
    /// periodic ontology export, each on its configured interval.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_background(
        &self,
        learner: Arc<OntologyLearner>,
        orchestrator: Arc<WorldOrchestrator>,
        store: Option<Arc<dyn SnapshotStore>>,
    ) -> Vec<BackgroundTask> {
        let mut tasks = vec![
            Arc::clone(&learner).spawn(self.learner.drain_interval()),
            orchestrator.spawn_snapshot_task(self.orchestrator.snapshot_interval()),
        ];
        if let Some(store) = store {
            tasks.push(learner.spawn_exporter(store, self.learner.export_interval()));
        }
        tracing::info!(
            tasks = ?tasks.iter().map(BackgroundTask::name).collect::<Vec<_>>(),
            "background tasks started"
        );
        tasks
    }
}
