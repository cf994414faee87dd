//! Domain representations carried by a fused entity
//!
//! Each operational domain contributes at most one structured payload to an
//! entity. The payloads form a closed sum type so that correlation and
//! learning match on them exhaustively.

use super::geo::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operational domain an observation originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Space,
    Geospatial,
    Maritime,
    Network,
    Cyber,
}

impl Domain {
    /// Every domain, in canonical order
    pub const ALL: [Domain; 5] = [
        Domain::Space,
        Domain::Geospatial,
        Domain::Maritime,
        Domain::Network,
        Domain::Cyber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Space => "space",
            Domain::Geospatial => "geospatial",
            Domain::Maritime => "maritime",
            Domain::Network => "network",
            Domain::Cyber => "cyber",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classical orbital elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    /// Semi-major axis in kilometres
    pub semi_major_axis_km: f64,
    pub eccentricity: f64,
    /// Inclination in degrees
    pub inclination_deg: f64,
    #[serde(default)]
    pub raan_deg: f64,
    #[serde(default)]
    pub arg_perigee_deg: f64,
    #[serde(default)]
    pub mean_anomaly_deg: f64,
}

impl OrbitalElements {
    pub fn new(semi_major_axis_km: f64, eccentricity: f64, inclination_deg: f64) -> Self {
        Self {
            semi_major_axis_km,
            eccentricity,
            inclination_deg,
            raan_deg: 0.0,
            arg_perigee_deg: 0.0,
            mean_anomaly_deg: 0.0,
        }
    }
}

/// Space domain payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceData {
    #[serde(default)]
    pub norad_id: Option<u32>,
    #[serde(default)]
    pub constellation: Option<String>,
    #[serde(default)]
    pub orbital_elements: Option<OrbitalElements>,
}

/// Geospatial domain payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeospatialData {
    pub coordinates: Coordinates,
    #[serde(default)]
    pub altitude_m: Option<f64>,
    #[serde(default)]
    pub terrain: Option<String>,
    #[serde(default)]
    pub climate: Option<String>,
}

impl GeospatialData {
    pub fn at(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            altitude_m: None,
            terrain: None,
            climate: None,
        }
    }
}

/// Maritime domain payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaritimeData {
    #[serde(default)]
    pub imo: Option<String>,
    #[serde(default)]
    pub mmsi: Option<String>,
    #[serde(default)]
    pub vessel_name: Option<String>,
    #[serde(default)]
    pub vessel_type: Option<String>,
    /// Speed over ground in knots
    #[serde(default)]
    pub speed_knots: f64,
    /// Heading in degrees true
    #[serde(default)]
    pub heading_deg: f64,
    /// Ports of call
    #[serde(default)]
    pub ports: Vec<String>,
    /// Recorded route waypoints, oldest first
    #[serde(default)]
    pub route: Vec<Coordinates>,
}

/// Operational status of a network node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Online,
    Degraded,
    Offline,
}

/// Network domain payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkData {
    pub node_id: String,
    /// Node ids this node links to
    #[serde(default)]
    pub connections: Vec<String>,
    #[serde(default)]
    pub bandwidth_mbps: f64,
    #[serde(default)]
    pub latency_ms: f64,
    #[serde(default)]
    pub status: NodeStatus,
}

/// Cyber domain payload (digital twin)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CyberData {
    pub digital_twin_id: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub predictions: Vec<String>,
}

/// A structured payload from exactly one domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "lowercase")]
pub enum DomainRepresentation {
    Space(SpaceData),
    Geospatial(GeospatialData),
    Maritime(MaritimeData),
    Network(NetworkData),
    Cyber(CyberData),
}

impl DomainRepresentation {
    /// The domain this payload belongs to
    pub fn domain(&self) -> Domain {
        match self {
            DomainRepresentation::Space(_) => Domain::Space,
            DomainRepresentation::Geospatial(_) => Domain::Geospatial,
            DomainRepresentation::Maritime(_) => Domain::Maritime,
            DomainRepresentation::Network(_) => Domain::Network,
            DomainRepresentation::Cyber(_) => Domain::Cyber,
        }
    }

    /// Check numeric fields for values that cannot be reasoned about.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            DomainRepresentation::Space(data) => {
                if let Some(el) = &data.orbital_elements {
                    if !el.semi_major_axis_km.is_finite() || el.semi_major_axis_km <= 0.0 {
                        return Err("semi-major axis must be positive".into());
                    }
                    if !el.inclination_deg.is_finite() {
                        return Err("inclination must be finite".into());
                    }
                }
                Ok(())
            }
            DomainRepresentation::Geospatial(data) => data.coordinates.validate(),
            DomainRepresentation::Maritime(data) => {
                if !data.speed_knots.is_finite() || !data.heading_deg.is_finite() {
                    return Err("speed and heading must be finite".into());
                }
                data.route.iter().try_for_each(Coordinates::validate)
            }
            DomainRepresentation::Network(data) => {
                if data.node_id.trim().is_empty() {
                    return Err("network node id must not be empty".into());
                }
                Ok(())
            }
            DomainRepresentation::Cyber(data) => {
                if !(0.0..=1.0).contains(&data.confidence) {
                    return Err(format!(
                        "digital twin confidence {} outside [0, 1]",
                        data.confidence
                    ));
                }
                Ok(())
            }
        }
    }
}
