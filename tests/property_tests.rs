//! # Property-Based Tests
//!
//! Invariants of correlation, admission and reinforcement over generated
//! entities.

mod common;

use fusegraph::correlation::correlate_pair;
use fusegraph::entity::{GeospatialData, MaritimeData, NetworkData, OrbitalElements, SpaceData};
use fusegraph::ontology::{NodeKind, OntologyNode, OntologyRelationship};
use fusegraph::{Coordinates, DomainRepresentation, EntityPatch, FusedEntity, FusionError};
use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

// =============================================================================
// STRATEGIES
// =============================================================================

const PORTS: [&str; 4] = ["rotterdam", "singapore", "shanghai", "houston"];
const NODES: [&str; 4] = ["gw-1", "gw-2", "relay-1", "relay-2"];

fn coordinates() -> impl Strategy<Value = Coordinates> {
    (-1.0f64..1.0, -1.0f64..1.0).prop_map(|(lat, lon)| Coordinates::new(lat, lon))
}

fn space() -> impl Strategy<Value = DomainRepresentation> {
    (6_500.0f64..6_700.0, 0.0f64..20.0).prop_map(|(axis, incl)| {
        DomainRepresentation::Space(SpaceData {
            orbital_elements: Some(OrbitalElements::new(axis, 0.001, incl)),
            ..Default::default()
        })
    })
}

fn geospatial() -> impl Strategy<Value = DomainRepresentation> {
    coordinates().prop_map(|c| DomainRepresentation::Geospatial(GeospatialData::at(c)))
}

fn maritime() -> impl Strategy<Value = DomainRepresentation> {
    (
        proptest::sample::subsequence(PORTS.to_vec(), 0..=2),
        vec(coordinates(), 0..3),
    )
        .prop_map(|(ports, route)| {
            DomainRepresentation::Maritime(MaritimeData {
                ports: ports.into_iter().map(String::from).collect(),
                route,
                ..Default::default()
            })
        })
}

fn network() -> impl Strategy<Value = DomainRepresentation> {
    (
        proptest::sample::select(NODES.to_vec()),
        proptest::sample::subsequence(NODES.to_vec(), 0..=2),
    )
        .prop_map(|(id, connections)| {
            DomainRepresentation::Network(NetworkData {
                node_id: id.to_string(),
                connections: connections.into_iter().map(String::from).collect(),
                ..Default::default()
            })
        })
}

fn entity(id: &'static str) -> impl Strategy<Value = FusedEntity> {
    (
        option::of(space()),
        option::of(geospatial()),
        option::of(maritime()),
        option::of(network()),
    )
        .prop_filter("at least one representation", |(s, g, m, n)| {
            s.is_some() || g.is_some() || m.is_some() || n.is_some()
        })
        .prop_map(move |(s, g, m, n)| {
            [s, g, m, n]
                .into_iter()
                .flatten()
                .fold(FusedEntity::with_id(id, "generated"), |e, rep| e.with_representation(rep))
        })
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// A correlated with B under some rule implies B correlated with A under the same rule.
    #[test]
    fn correlation_is_symmetric(
        a in entity("a"),
        b in entity("b"),
        radius_m in 100.0f64..200_000.0,
    ) {
        prop_assert_eq!(correlate_pair(&a, &b, radius_m), correlate_pair(&b, &a, radius_m));
    }

    /// Entity count never exceeds capacity, including on the rejected attempt.
    #[test]
    fn world_never_exceeds_capacity(
        max_entities in 1usize..8,
        attempts in 1usize..20,
    ) {
        let orchestrator = common::bounded_world(max_entities);
        for i in 0..attempts {
            let before = orchestrator.world("bounded").unwrap().entity_count();
            let result = orchestrator.add_entity(common::vessel(&format!("v{}", i), 0.0, i as f64 * 0.5, 5.0));
            let after = orchestrator.world("bounded").unwrap().entity_count();

            prop_assert!(after <= max_entities);
            if result.is_err() {
                prop_assert_eq!(before, after);
            }
        }
        prop_assert_eq!(
            orchestrator.world("bounded").unwrap().entity_count(),
            attempts.min(max_entities)
        );
    }

    /// Reinforcement never lowers node confidence and stops at 1.0.
    #[test]
    fn node_reinforcement_is_monotonic(steps in vec(0.0f64..0.3, 1..60)) {
        let mut node = OntologyNode::new("concept:x", "x", NodeKind::Concept, "general");
        for step in steps {
            let before = node.confidence;
            node.reinforce(step);
            prop_assert!(node.confidence >= before);
            prop_assert!(node.confidence <= 1.0);
            if before < 1.0 && step > 1e-9 {
                prop_assert!(node.confidence > before);
            }
        }
    }

    /// Relationship strength and confidence only rise under reinforcement.
    #[test]
    fn relationship_reinforcement_is_monotonic(rounds in 1usize..40) {
        let mut rel = OntologyRelationship::new("a", "b", "navigates_at");
        for i in 0..rounds {
            let (strength, confidence) = (rel.strength, rel.confidence);
            rel.reinforce(format!("e{}", i), 10);
            prop_assert!(rel.strength >= strength && rel.strength <= 1.0);
            prop_assert!(rel.confidence >= confidence && rel.confidence <= 1.0);
        }
        prop_assert!(rel.evidence.len() <= 10);
    }

    /// Registering the same id twice fails and leaves the first entity untouched.
    #[test]
    fn re_registration_is_rejected_without_mutation(
        first in entity("dup"),
        second in entity("dup"),
    ) {
        let orchestrator = common::bounded_world(10);
        orchestrator.add_entity(first).unwrap();
        let stored = orchestrator.world("bounded").unwrap().engine().entity("dup").unwrap();

        let err = orchestrator.add_entity(second).unwrap_err();
        prop_assert!(matches!(err, FusionError::DuplicateEntity { .. }), "unexpected error");

        let after = orchestrator.world("bounded").unwrap().engine().entity("dup").unwrap();
        prop_assert_eq!(stored, after);
        prop_assert_eq!(orchestrator.world("bounded").unwrap().entity_count(), 1);
    }

    /// Patches without the invalidate flag never lower correlation confidence.
    #[test]
    fn patches_never_lower_confidence(confidence in 0.0f64..=1.0, lat in -1.0f64..1.0) {
        let mut entity = common::vessel("v", 0.0, 0.0, 5.0);
        entity.record_correlation(confidence, "geospatial.radius");
        entity.apply(EntityPatch::new().with_representation(DomainRepresentation::Geospatial(
            GeospatialData::at(Coordinates::new(lat, 0.0)),
        )));
        prop_assert_eq!(entity.correlation_confidence, confidence);
    }
}
