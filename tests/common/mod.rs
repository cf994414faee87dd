//! Common test utilities for fusion integration tests
//!
//! Entity builders for each domain and small orchestrator setups.

#![allow(dead_code)]

use fusegraph::entity::{GeospatialData, MaritimeData, NetworkData, OrbitalElements, SpaceData};
use fusegraph::{
    Coordinates, CrossWorldRetention, DomainRepresentation, EventBus, FusedEntity,
    LearnerConfig, OntologyLearner, WorldConfig, WorldOrchestrator,
};
use std::sync::Arc;

/// A vessel with maritime and geospatial payloads at (lat, lon)
pub fn vessel(id: &str, lat: f64, lon: f64, speed_knots: f64) -> FusedEntity {
    FusedEntity::with_id(id, "vessel")
        .with_representation(DomainRepresentation::Maritime(MaritimeData {
            mmsi: Some(format!("mmsi-{}", id)),
            vessel_type: Some("tanker".into()),
            speed_knots,
            ..Default::default()
        }))
        .with_representation(DomainRepresentation::Geospatial(GeospatialData::at(
            Coordinates::new(lat, lon),
        )))
        .with_ontology_path(["maritime", "vessel", "tanker"])
}

/// A satellite with only a space payload
pub fn satellite(id: &str, norad_id: u32) -> FusedEntity {
    FusedEntity::with_id(id, "satellite").with_representation(DomainRepresentation::Space(
        SpaceData {
            norad_id: Some(norad_id),
            constellation: None,
            orbital_elements: Some(OrbitalElements::new(6_921.0, 0.0001, 53.0)),
        },
    ))
}

/// A network node linked to `connections`
pub fn network_node(id: &str, node_id: &str, connections: &[&str]) -> FusedEntity {
    FusedEntity::with_id(id, "network_node").with_representation(DomainRepresentation::Network(
        NetworkData {
            node_id: node_id.to_string(),
            connections: connections.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        },
    ))
}

/// Two fusion-enabled worlds, "alpha" active
pub fn two_fusing_worlds(events: EventBus) -> WorldOrchestrator {
    WorldOrchestrator::new(
        vec![
            WorldConfig::new("alpha", 100, 5_000.0),
            WorldConfig::new("beta", 100, 5_000.0),
        ],
        "alpha",
        CrossWorldRetention::LatestPerPair,
        events,
    )
    .unwrap()
}

/// A single world holding at most `max_entities`
pub fn bounded_world(max_entities: usize) -> WorldOrchestrator {
    WorldOrchestrator::new(
        vec![WorldConfig::new("bounded", max_entities, 5_000.0)],
        "bounded",
        CrossWorldRetention::default(),
        EventBus::default(),
    )
    .unwrap()
}

pub fn learner() -> Arc<OntologyLearner> {
    Arc::new(OntologyLearner::new(LearnerConfig::default(), EventBus::default()))
}
