//! Fusion events and the broadcast bus that carries them
//!
//! One event per observable state change. Subscribers are enumerated at the
//! call sites of `EventBus::subscribe`; there is no runtime listener registry.

use crate::adapter::Alert;
use crate::world::CrossWorldCorrelation;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 1024;

/// An event published when fused state changes
#[derive(Debug, Clone, PartialEq)]
pub enum FusionEvent {
    /// An entity was admitted into a world
    EntityRegistered { world: String, global_id: String },
    /// An existing entity was patched
    EntityUpdated { world: String, global_id: String },
    /// Intra-world correlation matched one or more entities
    CorrelationFound {
        world: String,
        global_id: String,
        correlated_ids: Vec<String>,
        rules: Vec<String>,
    },
    /// The same object was detected in another world
    CrossWorldCorrelated(CrossWorldCorrelation),
    /// A registration was rejected because the world is full
    CapacityExceeded {
        world: String,
        global_id: String,
        max_entities: usize,
    },
    /// The learner added structure to the ontology
    OntologyExpanded {
        source_entity: String,
        nodes_created: usize,
        relationships_created: usize,
        patterns_created: usize,
    },
    /// A domain adapter raised an alert
    AlertRaised(Alert),
}

impl FusionEvent {
    /// Stable name for filtering and logging
    pub fn event_type(&self) -> &'static str {
        match self {
            FusionEvent::EntityRegistered { .. } => "entity_registered",
            FusionEvent::EntityUpdated { .. } => "entity_updated",
            FusionEvent::CorrelationFound { .. } => "correlation_found",
            FusionEvent::CrossWorldCorrelated(_) => "cross_world_correlated",
            FusionEvent::CapacityExceeded { .. } => "capacity_exceeded",
            FusionEvent::OntologyExpanded { .. } => "ontology_expanded",
            FusionEvent::AlertRaised(_) => "alert_raised",
        }
    }
}

/// Broadcast bus for fusion events.
///
/// Publishing is best effort: with no subscribers the event is dropped,
/// and slow subscribers observe `Lagged` rather than blocking publishers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<FusionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: FusionEvent) {
        // No receivers is the normal case for library use
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FusionEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
