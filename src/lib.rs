//! Fusegraph: Multi-Domain Entity Fusion Engine
//!
//! Fuses observations from space, geospatial, maritime, network and cyber
//! sources into one entity model, detects when observations in different
//! domains or different worlds describe the same object, and learns a
//! shared ontology from the stream of fused entities.
//!
//! # Core Concepts
//!
//! - **Fused entities**: one global id, at most one payload per domain
//! - **Worlds**: capacity-bounded correlation contexts with their own policy
//! - **Ontology**: concepts, relationships and patterns reinforced by evidence
//!
//! # Example
//!
//! ```
//! use fusegraph::{EventBus, WorldOrchestrator};
//!
//! let orchestrator = WorldOrchestrator::standard(EventBus::default()).unwrap();
//! assert_eq!(orchestrator.active_world(), "production");
//! ```

pub mod adapter;
pub mod config;
pub mod correlation;
pub mod entity;
mod error;
pub mod events;
pub mod ontology;
pub mod schedule;
pub mod storage;
pub mod world;

pub use adapter::{Alert, AlertKind, DomainAdapter, MaritimeAdapter, MaritimeConfig, Severity};
pub use config::{FusionConfig, OrchestratorConfig};
pub use correlation::{CorrelationEngine, CorrelationOutcome, CorrelationRule};
pub use entity::{
    Coordinates, Domain, DomainRepresentation, EntityPatch, FusedEntity, GeometryMode,
};
pub use error::{FusionError, FusionResult};
pub use events::{EventBus, FusionEvent};
pub use ontology::{LearnerConfig, OntologyExport, OntologyLearner, OntologyMetrics};
pub use schedule::{BackgroundTask, StopHandle};
pub use storage::{OpenStore, SnapshotStore, SqliteSnapshotStore, StorageError, StorageResult};
pub use world::{
    CrossWorldCorrelation, CrossWorldRetention, WorldConfig, WorldOrchestrator, WorldState,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
