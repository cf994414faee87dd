//! Shared entity model: fused entities and their domain payloads

mod domain;
mod fused;
pub mod geo;

pub use domain::{
    CyberData, Domain, DomainRepresentation, GeospatialData, MaritimeData, NetworkData,
    NodeStatus, OrbitalElements, SpaceData,
};
pub use fused::{EntityPatch, FusedEntity};
pub use geo::{Coordinates, GeometryMode};
