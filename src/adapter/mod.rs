//! Domain adapters: normalize raw observations into fused entities and
//! raise domain alerts
//!
//! Adapters own their domain-specific derived state (movement history,
//! tracked orbits, link health). Registration into a world is left to the
//! caller, which hands the returned `FusedEntity` to the orchestrator.

mod alert;
mod maritime;
mod network;
mod space;
mod traits;

pub use alert::{Alert, AlertKind, AlertLog, Severity};
pub use maritime::{
    MaritimeAdapter, MaritimeConfig, MovementRecord, ShippingRoute, TerritorialZone,
    VesselDescriptor,
};
pub use network::{LinkMetrics, NetworkAdapter, NodeDescriptor, MAX_HEALTHY_LATENCY_MS};
pub use space::{
    SatelliteDescriptor, SpaceAdapter, CONJUNCTION_AXIS_KM, CONJUNCTION_INCLINATION_DEG,
};
pub use traits::DomainAdapter;
