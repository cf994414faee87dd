//! MaritimeAdapter: vessels, movement history and navigation alerts
//!
//! Each position update runs three checks against the adapter's own state:
//! proximity to other vessels, entry into restricted territorial zones, and
//! deviation from every known shipping route.

use super::alert::{Alert, AlertKind, AlertLog, Severity};
use super::traits::DomainAdapter;
use crate::entity::geo::{distance_to_segment_nm, haversine_nm, point_in_polygon};
use crate::entity::{
    Coordinates, Domain, DomainRepresentation, FusedEntity, GeometryMode, GeospatialData,
    MaritimeData,
};
use crate::error::{FusionError, FusionResult};
use crate::events::{EventBus, FusionEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Vessel count at which a collision risk escalates to high severity
const CROWDED_VESSEL_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaritimeConfig {
    pub collision_radius_nm: f64,
    pub route_deviation_nm: f64,
    /// Movement records kept per vessel
    pub history_limit: usize,
    pub alert_window_secs: u64,
    pub geometry: GeometryMode,
}

impl Default for MaritimeConfig {
    fn default() -> Self {
        Self {
            collision_radius_nm: 0.5,
            route_deviation_nm: 10.0,
            history_limit: 100,
            alert_window_secs: 3_600,
            geometry: GeometryMode::Planar,
        }
    }
}

/// Raw vessel observation as supplied by an AIS-style producer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselDescriptor {
    #[serde(default)]
    pub imo: Option<String>,
    #[serde(default)]
    pub mmsi: Option<String>,
    pub name: String,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub vessel_type: Option<String>,
    #[serde(default)]
    pub speed_knots: f64,
    #[serde(default)]
    pub heading_deg: f64,
}

/// One position fix in a vessel's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub coordinates: Coordinates,
    pub speed_knots: f64,
    pub heading_deg: f64,
    pub timestamp: DateTime<Utc>,
}

impl MovementRecord {
    pub fn new(coordinates: Coordinates, speed_knots: f64, heading_deg: f64) -> Self {
        Self {
            coordinates,
            speed_knots,
            heading_deg,
            timestamp: Utc::now(),
        }
    }
}

/// A polygonal zone; only zones with restrictions raise alerts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritorialZone {
    pub id: String,
    pub name: String,
    pub polygon: Vec<Coordinates>,
    #[serde(default)]
    pub restrictions: Vec<String>,
}

/// A shipping lane as an ordered polyline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingRoute {
    pub id: String,
    pub name: String,
    pub waypoints: Vec<Coordinates>,
}

impl ShippingRoute {
    /// Shortest distance from `p` to any segment of the route
    fn distance_nm(&self, p: &Coordinates, mode: GeometryMode) -> Option<f64> {
        match self.waypoints.as_slice() {
            [] => None,
            [only] => Some(distance_to_segment_nm(p, only, only, mode)),
            points => points
                .windows(2)
                .map(|seg| distance_to_segment_nm(p, &seg[0], &seg[1], mode))
                .reduce(f64::min),
        }
    }
}

#[derive(Debug)]
pub struct MaritimeAdapter {
    config: MaritimeConfig,
    vessels: HashMap<String, FusedEntity>,
    history: HashMap<String, VecDeque<MovementRecord>>,
    zones: Vec<TerritorialZone>,
    routes: Vec<ShippingRoute>,
    alerts: AlertLog,
    events: EventBus,
}

impl MaritimeAdapter {
    pub fn new(config: MaritimeConfig, events: EventBus) -> Self {
        let alerts = AlertLog::with_window_secs(config.alert_window_secs);
        Self {
            config,
            vessels: HashMap::new(),
            history: HashMap::new(),
            zones: Vec::new(),
            routes: Vec::new(),
            alerts,
            events,
        }
    }

    /// Normalize a vessel into a maritime + geospatial entity and start its
    /// movement history.
    pub fn add_vessel(&mut self, descriptor: VesselDescriptor) -> FusionResult<FusedEntity> {
        let VesselDescriptor {
            imo,
            mmsi,
            name,
            coordinates,
            vessel_type,
            speed_knots,
            heading_deg,
        } = descriptor;

        let mut path = vec!["maritime".to_string(), "vessel".to_string()];
        if let Some(t) = &vessel_type {
            path.push(t.to_lowercase());
        }

        let geo = GeospatialData {
            terrain: Some("ocean".to_string()),
            ..GeospatialData::at(coordinates)
        };
        let maritime = MaritimeData {
            imo,
            mmsi,
            vessel_name: Some(name),
            vessel_type,
            speed_knots,
            heading_deg,
            route: vec![coordinates],
            ..Default::default()
        };
        let entity = FusedEntity::new("vessel")
            .with_representation(DomainRepresentation::Maritime(maritime))
            .with_representation(DomainRepresentation::Geospatial(geo))
            .with_ontology_path(path);
        entity.validate()?;

        let mut history = VecDeque::new();
        history.push_back(MovementRecord::new(coordinates, speed_knots, heading_deg));
        self.history.insert(entity.global_id.clone(), history);
        self.vessels.insert(entity.global_id.clone(), entity.clone());

        tracing::debug!(global_id = %entity.global_id, "vessel added");
        Ok(entity)
    }

    /// Record a new position fix and run the navigation checks.
    ///
    /// Returns the alerts raised by this update.
    pub fn update_vessel_position(
        &mut self,
        vessel_id: &str,
        movement: MovementRecord,
    ) -> FusionResult<Vec<Alert>> {
        movement
            .coordinates
            .validate()
            .map_err(|reason| FusionError::InvalidEntity {
                global_id: vessel_id.to_string(),
                reason,
            })?;

        let entity = self
            .vessels
            .get_mut(vessel_id)
            .ok_or_else(|| FusionError::UnknownEntity(vessel_id.to_string()))?;
        if let Some(DomainRepresentation::Maritime(m)) = entity.representation_mut(Domain::Maritime) {
            m.speed_knots = movement.speed_knots;
            m.heading_deg = movement.heading_deg;
            m.route.push(movement.coordinates);
            if m.route.len() > self.config.history_limit {
                let excess = m.route.len() - self.config.history_limit;
                m.route.drain(..excess);
            }
        }
        if let Some(DomainRepresentation::Geospatial(g)) = entity.representation_mut(Domain::Geospatial) {
            g.coordinates = movement.coordinates;
        }
        entity.touch();

        let position = movement.coordinates;
        let history = self.history.entry(vessel_id.to_string()).or_default();
        history.push_back(movement);
        while history.len() > self.config.history_limit {
            history.pop_front();
        }

        let mut raised = Vec::new();
        raised.extend(self.check_collision_risk(vessel_id, &position));
        raised.extend(self.check_restricted_zones(vessel_id, &position));
        raised.extend(self.check_route_deviation(vessel_id, &position));

        for alert in &raised {
            tracing::info!(
                vessel = vessel_id,
                kind = ?alert.kind,
                severity = ?alert.severity,
                "maritime alert raised"
            );
            self.alerts.append(alert.clone());
            self.events.publish(FusionEvent::AlertRaised(alert.clone()));
        }
        Ok(raised)
    }

    fn last_position(&self, vessel_id: &str) -> Option<Coordinates> {
        self.history
            .get(vessel_id)
            .and_then(|h| h.back())
            .map(|m| m.coordinates)
    }

    fn check_collision_risk(&self, vessel_id: &str, position: &Coordinates) -> Option<Alert> {
        let mut nearby: Vec<&str> = self
            .history
            .keys()
            .filter(|id| id.as_str() != vessel_id)
            .filter(|id| {
                self.last_position(id)
                    .is_some_and(|p| haversine_nm(position, &p) <= self.config.collision_radius_nm)
            })
            .map(String::as_str)
            .collect();
        if nearby.is_empty() {
            return None;
        }
        nearby.sort_unstable();

        let involved = nearby.len() + 1;
        let severity = if involved >= CROWDED_VESSEL_COUNT {
            Severity::High
        } else {
            Severity::Medium
        };
        let mut entity_ids = vec![vessel_id.to_string()];
        entity_ids.extend(nearby.into_iter().map(str::to_string));

        Some(
            Alert::new(
                Domain::Maritime,
                AlertKind::CollisionRisk,
                severity,
                entity_ids,
                format!(
                    "{} vessels within {} nm of each other",
                    involved, self.config.collision_radius_nm
                ),
            )
            .at(*position),
        )
    }

    fn check_restricted_zones(&self, vessel_id: &str, position: &Coordinates) -> Vec<Alert> {
        self.zones
            .iter()
            .filter(|z| !z.restrictions.is_empty() && point_in_polygon(position, &z.polygon))
            .map(|z| {
                Alert::new(
                    Domain::Maritime,
                    AlertKind::RestrictedArea,
                    Severity::High,
                    vec![vessel_id.to_string()],
                    format!("entered {} ({})", z.name, z.restrictions.join(", ")),
                )
                .at(*position)
            })
            .collect()
    }

    fn check_route_deviation(&self, vessel_id: &str, position: &Coordinates) -> Option<Alert> {
        let nearest = self
            .routes
            .iter()
            .filter_map(|r| r.distance_nm(position, self.config.geometry))
            .reduce(f64::min)?;
        if nearest <= self.config.route_deviation_nm {
            return None;
        }

        Some(
            Alert::new(
                Domain::Maritime,
                AlertKind::SecurityThreat,
                Severity::Low,
                vec![vessel_id.to_string()],
                format!("{:.1} nm from the nearest shipping route", nearest),
            )
            .at(*position),
        )
    }

    pub fn add_zone(&mut self, zone: TerritorialZone) {
        self.zones.push(zone);
    }

    pub fn add_route(&mut self, route: ShippingRoute) {
        self.routes.push(route);
    }

    pub fn vessel(&self, vessel_id: &str) -> Option<&FusedEntity> {
        self.vessels.get(vessel_id)
    }

    pub fn vessel_count(&self) -> usize {
        self.vessels.len()
    }

    /// Movement history, oldest first
    pub fn history(&self, vessel_id: &str) -> Option<Vec<MovementRecord>> {
        self.history.get(vessel_id).map(|h| h.iter().cloned().collect())
    }

    pub fn get_active_alerts(&self) -> Vec<Alert> {
        self.alerts.active()
    }

    pub fn active_alerts_at(&self, now: DateTime<Utc>) -> Vec<Alert> {
        self.alerts.active_at(now)
    }

    pub fn config(&self) -> &MaritimeConfig {
        &self.config
    }
}

impl DomainAdapter for MaritimeAdapter {
    fn id(&self) -> &str {
        "maritime"
    }

    fn domain(&self) -> Domain {
        Domain::Maritime
    }

    fn alerts(&self) -> Vec<Alert> {
        self.get_active_alerts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> MaritimeAdapter {
        MaritimeAdapter::new(MaritimeConfig::default(), EventBus::default())
    }

    fn vessel(name: &str, lat: f64, lon: f64) -> VesselDescriptor {
        VesselDescriptor {
            imo: Some(format!("IMO-{}", name)),
            mmsi: None,
            name: name.to_string(),
            coordinates: Coordinates::new(lat, lon),
            vessel_type: Some("Tanker".into()),
            speed_knots: 10.0,
            heading_deg: 90.0,
        }
    }

    fn fix(lat: f64, lon: f64) -> MovementRecord {
        MovementRecord::new(Coordinates::new(lat, lon), 11.0, 90.0)
    }

    #[test]
    fn add_vessel_builds_maritime_and_ocean_geospatial() {
        let mut adapter = adapter();
        let entity = adapter.add_vessel(vessel("a", 1.0, 2.0)).unwrap();

        assert!(entity.has_domain(Domain::Maritime));
        assert_eq!(entity.geospatial().unwrap().terrain.as_deref(), Some("ocean"));
        assert_eq!(entity.ontology_path, vec!["maritime", "vessel", "tanker"]);
        assert_eq!(adapter.history(&entity.global_id).unwrap().len(), 1);
    }

    #[test]
    fn unknown_vessel_update_is_an_error() {
        let mut adapter = adapter();
        let err = adapter.update_vessel_position("nope", fix(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, FusionError::UnknownEntity(_)));
    }

    #[test]
    fn history_is_bounded() {
        let mut adapter = MaritimeAdapter::new(
            MaritimeConfig {
                history_limit: 3,
                ..Default::default()
            },
            EventBus::default(),
        );
        let id = adapter.add_vessel(vessel("a", 0.0, 0.0)).unwrap().global_id;
        for i in 1..=5 {
            adapter.update_vessel_position(&id, fix(0.0, i as f64)).unwrap();
        }

        let history = adapter.history(&id).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].coordinates.lon, 3.0);
        assert_eq!(adapter.vessel(&id).unwrap().maritime().unwrap().route.len(), 3);
    }

    #[test]
    fn collision_risk_escalates_with_crowding() {
        let mut adapter = adapter();
        let a = adapter.add_vessel(vessel("a", 0.0, 0.0)).unwrap().global_id;
        let b = adapter.add_vessel(vessel("b", 0.001, 0.0)).unwrap().global_id;

        let alerts = adapter.update_vessel_position(&a, fix(0.0, 0.0)).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::CollisionRisk);
        assert_eq!(alerts[0].severity, Severity::Medium);
        assert!(alerts[0].involves(&b));

        adapter.add_vessel(vessel("c", 0.0, 0.001)).unwrap();
        let alerts = adapter.update_vessel_position(&a, fix(0.0, 0.0)).unwrap();
        assert_eq!(alerts[0].severity, Severity::High);
        assert_eq!(alerts[0].entity_ids.len(), 3);
    }

    #[test]
    fn distant_vessels_raise_nothing() {
        let mut adapter = adapter();
        let a = adapter.add_vessel(vessel("a", 0.0, 0.0)).unwrap().global_id;
        adapter.add_vessel(vessel("b", 1.0, 1.0)).unwrap();

        assert!(adapter.update_vessel_position(&a, fix(0.0, 0.0)).unwrap().is_empty());
    }

    #[test]
    fn restricted_zone_entry() {
        let mut adapter = adapter();
        let square = vec![
            Coordinates::new(-1.0, -1.0),
            Coordinates::new(-1.0, 1.0),
            Coordinates::new(1.0, 1.0),
            Coordinates::new(1.0, -1.0),
        ];
        adapter.add_zone(TerritorialZone {
            id: "open".into(),
            name: "Open Water".into(),
            polygon: square.clone(),
            restrictions: vec![],
        });
        adapter.add_zone(TerritorialZone {
            id: "mil".into(),
            name: "Firing Range".into(),
            polygon: square,
            restrictions: vec!["military".into()],
        });
        let id = adapter.add_vessel(vessel("a", 5.0, 5.0)).unwrap().global_id;

        let alerts = adapter.update_vessel_position(&id, fix(0.5, 0.5)).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::RestrictedArea);
    }

    #[test]
    fn route_deviation_uses_nearest_route() {
        let mut adapter = adapter();
        adapter.add_route(ShippingRoute {
            id: "equator".into(),
            name: "Equatorial Lane".into(),
            waypoints: vec![Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 10.0)],
        });
        let id = adapter.add_vessel(vessel("a", 0.0, 0.0)).unwrap().global_id;

        // 0.1 degree off the lane is 6 nm
        assert!(adapter.update_vessel_position(&id, fix(0.1, 5.0)).unwrap().is_empty());

        // 0.5 degree off is 30 nm
        let alerts = adapter.update_vessel_position(&id, fix(0.5, 5.0)).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::SecurityThreat);
        assert_eq!(alerts[0].severity, Severity::Low);
    }

    #[test]
    fn no_routes_means_no_deviation() {
        let mut adapter = adapter();
        let id = adapter.add_vessel(vessel("a", 0.0, 0.0)).unwrap().global_id;
        assert!(adapter.update_vessel_position(&id, fix(40.0, 40.0)).unwrap().is_empty());
    }

    #[test]
    fn active_alerts_expire_after_window() {
        let mut adapter = adapter();
        let a = adapter.add_vessel(vessel("a", 0.0, 0.0)).unwrap().global_id;
        adapter.add_vessel(vessel("b", 0.001, 0.0)).unwrap();
        adapter.update_vessel_position(&a, fix(0.0, 0.0)).unwrap();

        assert_eq!(adapter.get_active_alerts().len(), 1);
        let later = Utc::now() + chrono::Duration::hours(2);
        assert!(adapter.active_alerts_at(later).is_empty());
        assert_eq!(adapter.alerts().len(), 1);
    }
}
