//! Geographic helpers: great-circle distance, segment distance, polygon tests

use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Metres in one international nautical mile
pub const METERS_PER_NM: f64 = 1_852.0;

/// Nautical miles per degree of arc on the planar approximation
const NM_PER_DEGREE: f64 = 60.0;

/// A WGS84 latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(format!("latitude {} out of range", self.lat));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(format!("longitude {} out of range", self.lon));
        }
        Ok(())
    }
}

/// How route and zone geometry is evaluated.
///
/// `Planar` treats longitude/latitude as a flat plane (60 nm per degree).
/// It is inaccurate near the poles and across the antimeridian.
/// `Spherical` uses great-circle cross-track distance for route checks.
/// Polygon containment is planar in both modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryMode {
    #[default]
    Planar,
    Spherical,
}

/// Great-circle distance in metres (haversine)
pub fn haversine_m(a: &Coordinates, b: &Coordinates) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Great-circle distance in nautical miles
pub fn haversine_nm(a: &Coordinates, b: &Coordinates) -> f64 {
    haversine_m(a, b) / METERS_PER_NM
}

/// Distance in nautical miles from `p` to the segment `a`–`b`
pub fn distance_to_segment_nm(
    p: &Coordinates,
    a: &Coordinates,
    b: &Coordinates,
    mode: GeometryMode,
) -> f64 {
    match mode {
        GeometryMode::Planar => planar_distance_to_segment(p, a, b) * NM_PER_DEGREE,
        GeometryMode::Spherical => spherical_distance_to_segment_m(p, a, b) / METERS_PER_NM,
    }
}

/// Perpendicular distance in degrees, clamped to the segment ends
fn planar_distance_to_segment(p: &Coordinates, a: &Coordinates, b: &Coordinates) -> f64 {
    let (dx, dy) = (b.lon - a.lon, b.lat - a.lat);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((p.lon - a.lon).powi(2) + (p.lat - a.lat).powi(2)).sqrt();
    }

    let t = (((p.lon - a.lon) * dx + (p.lat - a.lat) * dy) / len_sq).clamp(0.0, 1.0);
    let (px, py) = (a.lon + t * dx, a.lat + t * dy);
    ((p.lon - px).powi(2) + (p.lat - py).powi(2)).sqrt()
}

fn initial_bearing(from: &Coordinates, to: &Coordinates) -> f64 {
    let (lat1, lat2) = (from.lat.to_radians(), to.lat.to_radians());
    let dlon = (to.lon - from.lon).to_radians();
    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    y.atan2(x)
}

/// Cross-track distance in metres, falling back to endpoint distance when the
/// perpendicular foot lies outside the segment
fn spherical_distance_to_segment_m(p: &Coordinates, a: &Coordinates, b: &Coordinates) -> f64 {
    let d_ap = haversine_m(a, p);
    let d_ab = haversine_m(a, b);
    if d_ab == 0.0 {
        return d_ap;
    }

    let delta_ap = d_ap / EARTH_RADIUS_M;
    let theta = initial_bearing(a, p) - initial_bearing(a, b);
    if theta.cos() < 0.0 {
        return d_ap;
    }

    let xt = (delta_ap.sin() * theta.sin()).clamp(-1.0, 1.0).asin();
    let along = (delta_ap.cos() / xt.cos()).clamp(-1.0, 1.0).acos() * EARTH_RADIUS_M;
    if along > d_ab {
        return haversine_m(b, p);
    }
    (xt * EARTH_RADIUS_M).abs()
}

/// Ray-casting point-in-polygon test over lon/lat treated as planar
pub fn point_in_polygon(p: &Coordinates, polygon: &[Coordinates]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (&polygon[i], &polygon[j]);
        if (pi.lat > p.lat) != (pj.lat > p.lat)
            && p.lon < (pj.lon - pi.lon) * (p.lat - pi.lat) / (pj.lat - pi.lat) + pi.lon
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
