//! Ontology exports persisted to an on-disk SQLite store

mod common;

use common::{learner, satellite, vessel};
use fusegraph::entity::NetworkData;
use fusegraph::ontology::foundation;
use fusegraph::{DomainRepresentation, FusionConfig, OntologyExport, OpenStore, SnapshotStore, SqliteSnapshotStore};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn exports_survive_reopening_the_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("exports.db");

    let learner = learner();
    learner.learn_from_entity(vessel("v1", 0.0, 0.0, 10.0));
    learner.learn_from_entity(satellite("s1", 25544));
    learner.drain();
    let export = learner.export();

    {
        let store = SqliteSnapshotStore::open(&path).unwrap();
        store.save_export(&export).unwrap();
    }

    let reopened = SqliteSnapshotStore::open(&path).unwrap();
    assert_eq!(reopened.export_count().unwrap(), 1);
    let loaded = reopened.latest_export().unwrap().unwrap();
    let ids = |e: &OntologyExport| e.nodes.iter().map(|n| n.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&loaded), ids(&export));
    assert_eq!(loaded.patterns.len(), export.patterns.len());
    assert_eq!(loaded.metrics.node_count, export.metrics.node_count);
    assert_eq!(loaded.metrics.processed, 2);
}

#[test]
fn export_document_carries_learned_structure() {
    let learner = learner();
    learner.learn_from_entity(
        vessel("v1", 0.0, 0.0, 10.0).with_representation(DomainRepresentation::Network(
            NetworkData {
                node_id: "modem-1".into(),
                ..Default::default()
            },
        )),
    );
    learner.drain();

    let json = learner.export_json().unwrap();
    let parsed = OntologyExport::from_json(&json).unwrap();

    assert!(parsed
        .relationships
        .iter()
        .any(|r| r.source == foundation::NETWORK_NODE
            && r.target == foundation::VESSEL
            && r.relationship_type == "transmits_via"));
    assert!(parsed.patterns.iter().any(|p| p.id == "vessel_type:tanker"));
    assert_eq!(parsed.metrics.processed, 1);
}

#[test]
fn configured_runtime_feeds_the_store() {
    let config = FusionConfig::default();
    let events = fusegraph::EventBus::default();
    let learner = Arc::new(config.learner(events.clone()));
    let orchestrator = config.orchestrator(events, Arc::clone(&learner)).unwrap();

    orchestrator.add_entity(vessel("v1", 0.0, 0.0, 10.0)).unwrap();
    orchestrator.add_entity(vessel("v2", 0.0005, 0.0, 10.0)).unwrap();
    assert_eq!(learner.drain(), 2);

    let store = SqliteSnapshotStore::open_in_memory().unwrap();
    store.save_export(&learner.export()).unwrap();
    let latest = store.latest_export().unwrap().unwrap();
    assert!(latest.metrics.domain_coverage.contains_key("maritime"));
}
