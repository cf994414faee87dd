//! Domain proximity rules deciding whether two entities are the same object
//!
//! Rules are evaluated in a fixed order and the first match wins. They are
//! never combined numerically, so every decision names exactly one rule.

use crate::entity::geo::haversine_m;
use crate::entity::FusedEntity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum semi-major axis difference for orbital proximity
pub const MAX_SEMI_MAJOR_AXIS_DELTA_KM: f64 = 50.0;

/// Maximum inclination difference for orbital proximity
pub const MAX_INCLINATION_DELTA_DEG: f64 = 5.0;

/// The rule that matched a pair of entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationRule {
    /// Similar semi-major axis and inclination
    OrbitalProximity,
    /// Coordinates within the world's correlation radius
    GeospatialRadius,
    /// Vessels share a port of call
    SharedPort,
    /// Some pair of route waypoints within the correlation radius
    RouteProximity,
    /// One node lists the other among its connections
    NetworkLink,
}

impl CorrelationRule {
    /// Identifier recorded in an entity's fusion rule trail
    pub fn id(&self) -> &'static str {
        match self {
            CorrelationRule::OrbitalProximity => "space.orbital_proximity",
            CorrelationRule::GeospatialRadius => "geospatial.radius",
            CorrelationRule::SharedPort => "maritime.shared_port",
            CorrelationRule::RouteProximity => "maritime.route_proximity",
            CorrelationRule::NetworkLink => "network.link",
        }
    }
}

impl fmt::Display for CorrelationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Decide whether `a` and `b` are correlated within `radius_m` metres.
///
/// Symmetric in `a` and `b`. Entities sharing no domain never correlate.
pub fn correlate_pair(a: &FusedEntity, b: &FusedEntity, radius_m: f64) -> Option<CorrelationRule> {
    if let (Some(sa), Some(sb)) = (a.space(), b.space()) {
        if let (Some(ea), Some(eb)) = (&sa.orbital_elements, &sb.orbital_elements) {
            let d_axis = (ea.semi_major_axis_km - eb.semi_major_axis_km).abs();
            let d_incl = (ea.inclination_deg - eb.inclination_deg).abs();
            if d_axis < MAX_SEMI_MAJOR_AXIS_DELTA_KM && d_incl < MAX_INCLINATION_DELTA_DEG {
                return Some(CorrelationRule::OrbitalProximity);
            }
        }
    }

    if let (Some(ga), Some(gb)) = (a.geospatial(), b.geospatial()) {
        if haversine_m(&ga.coordinates, &gb.coordinates) < radius_m {
            return Some(CorrelationRule::GeospatialRadius);
        }
    }

    if let (Some(ma), Some(mb)) = (a.maritime(), b.maritime()) {
        if ma.ports.iter().any(|p| mb.ports.contains(p)) {
            return Some(CorrelationRule::SharedPort);
        }
        let near = ma
            .route
            .iter()
            .any(|wa| mb.route.iter().any(|wb| haversine_m(wa, wb) < radius_m));
        if near {
            return Some(CorrelationRule::RouteProximity);
        }
    }

    if let (Some(na), Some(nb)) = (a.network(), b.network()) {
        if na.connections.contains(&nb.node_id) || nb.connections.contains(&na.node_id) {
            return Some(CorrelationRule::NetworkLink);
        }
    }

    None
}
