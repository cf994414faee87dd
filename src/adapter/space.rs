//! SpaceAdapter: satellites and orbital conjunction alerts

use super::alert::{Alert, AlertKind, AlertLog, Severity};
use super::traits::DomainAdapter;
use crate::entity::{
    Coordinates, Domain, DomainRepresentation, FusedEntity, GeospatialData, OrbitalElements,
    SpaceData,
};
use crate::error::{FusionError, FusionResult};
use crate::events::{EventBus, FusionEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semi-major axis separation below which two orbits are in conjunction
pub const CONJUNCTION_AXIS_KM: f64 = 1.0;
/// Inclination separation below which two orbits are in conjunction
pub const CONJUNCTION_INCLINATION_DEG: f64 = 0.5;

/// Raw satellite observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteDescriptor {
    #[serde(default)]
    pub norad_id: Option<u32>,
    pub name: String,
    #[serde(default)]
    pub constellation: Option<String>,
    pub orbital_elements: OrbitalElements,
    /// Sub-satellite point
    pub ground_track: Coordinates,
    #[serde(default)]
    pub altitude_m: Option<f64>,
}

#[derive(Debug)]
pub struct SpaceAdapter {
    satellites: BTreeMap<String, FusedEntity>,
    alerts: AlertLog,
    events: EventBus,
}

impl SpaceAdapter {
    pub fn new(alert_window_secs: u64, events: EventBus) -> Self {
        Self {
            satellites: BTreeMap::new(),
            alerts: AlertLog::with_window_secs(alert_window_secs),
            events,
        }
    }

    /// Normalize a satellite into a space + geospatial entity
    pub fn add_satellite(&mut self, descriptor: SatelliteDescriptor) -> FusionResult<FusedEntity> {
        let mut path = vec!["space".to_string(), "satellite".to_string()];
        if let Some(c) = &descriptor.constellation {
            path.push(c.to_lowercase());
        }

        let space = SpaceData {
            norad_id: descriptor.norad_id,
            constellation: descriptor.constellation,
            orbital_elements: Some(descriptor.orbital_elements),
        };
        let geo = GeospatialData {
            altitude_m: descriptor.altitude_m,
            ..GeospatialData::at(descriptor.ground_track)
        };
        let entity = FusedEntity::new("satellite")
            .with_representation(DomainRepresentation::Space(space))
            .with_representation(DomainRepresentation::Geospatial(geo))
            .with_ontology_path(path);
        entity.validate()?;

        tracing::debug!(global_id = %entity.global_id, name = %descriptor.name, "satellite added");
        self.satellites.insert(entity.global_id.clone(), entity.clone());
        Ok(entity)
    }

    /// Replace a satellite's orbital elements and check for conjunctions
    pub fn update_orbit(&mut self, satellite_id: &str, elements: OrbitalElements) -> FusionResult<Vec<Alert>> {
        let entity = self
            .satellites
            .get_mut(satellite_id)
            .ok_or_else(|| FusionError::UnknownEntity(satellite_id.to_string()))?;
        let representation = DomainRepresentation::Space(SpaceData {
            orbital_elements: Some(elements.clone()),
            ..entity.space().cloned().unwrap_or_default()
        });
        representation
            .validate()
            .map_err(|reason| FusionError::InvalidEntity {
                global_id: satellite_id.to_string(),
                reason,
            })?;
        entity.set_representation(representation);
        entity.touch();

        let mut conjunctions: Vec<String> = self
            .satellites
            .iter()
            .filter(|(id, _)| id.as_str() != satellite_id)
            .filter(|(_, other)| {
                other
                    .space()
                    .and_then(|s| s.orbital_elements.as_ref())
                    .is_some_and(|o| in_conjunction(&elements, o))
            })
            .map(|(id, _)| id.clone())
            .collect();
        if conjunctions.is_empty() {
            return Ok(Vec::new());
        }
        conjunctions.insert(0, satellite_id.to_string());

        let alert = Alert::new(
            Domain::Space,
            AlertKind::OrbitalConjunction,
            Severity::High,
            conjunctions,
            format!(
                "orbit within {} km and {} deg of another tracked satellite",
                CONJUNCTION_AXIS_KM, CONJUNCTION_INCLINATION_DEG
            ),
        );
        tracing::info!(satellite = satellite_id, "orbital conjunction");
        self.alerts.append(alert.clone());
        self.events.publish(FusionEvent::AlertRaised(alert.clone()));
        Ok(vec![alert])
    }

    pub fn satellite(&self, satellite_id: &str) -> Option<&FusedEntity> {
        self.satellites.get(satellite_id)
    }

    pub fn active_alerts_at(&self, now: DateTime<Utc>) -> Vec<Alert> {
        self.alerts.active_at(now)
    }
}

fn in_conjunction(a: &OrbitalElements, b: &OrbitalElements) -> bool {
    (a.semi_major_axis_km - b.semi_major_axis_km).abs() < CONJUNCTION_AXIS_KM
        && (a.inclination_deg - b.inclination_deg).abs() < CONJUNCTION_INCLINATION_DEG
}

impl DomainAdapter for SpaceAdapter {
    fn id(&self) -> &str {
        "space"
    }

    fn domain(&self) -> Domain {
        Domain::Space
    }

    fn alerts(&self) -> Vec<Alert> {
        self.alerts.active()
    }
}
