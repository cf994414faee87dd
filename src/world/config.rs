//! World configuration and the four standard worlds

use crate::entity::{Domain, FusedEntity};
use crate::error::{FusionError, FusionResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Policy for one independently configured world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Stable identifier, e.g. "production"
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Domains this world accepts
    pub active_domains: Vec<Domain>,
    /// Registration beyond this count is rejected
    pub max_entities: usize,
    /// Proximity radius in metres for geospatial and route rules
    pub correlation_radius_m: f64,
    /// Update cadence in milliseconds
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
    /// Whether entities here take part in cross-world correlation
    #[serde(default)]
    pub fusion_enabled: bool,
}

fn default_update_interval_ms() -> u64 {
    1_000
}

impl WorldConfig {
    pub fn new(id: impl Into<String>, max_entities: usize, correlation_radius_m: f64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            active_domains: Domain::ALL.to_vec(),
            max_entities,
            correlation_radius_m,
            update_interval_ms: default_update_interval_ms(),
            fusion_enabled: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_domains(mut self, domains: impl IntoIterator<Item = Domain>) -> Self {
        self.active_domains = domains.into_iter().collect();
        self
    }

    pub fn with_fusion(mut self, enabled: bool) -> Self {
        self.fusion_enabled = enabled;
        self
    }

    pub fn with_update_interval_ms(mut self, interval: u64) -> Self {
        self.update_interval_ms = interval;
        self
    }

    /// High-capacity, always fusing
    pub fn production() -> Self {
        Self::new("production", 100_000, 5_000.0)
            .with_name("Production")
            .with_update_interval_ms(1_000)
    }

    /// Reduced domain set
    pub fn staging() -> Self {
        Self::new("staging", 10_000, 5_000.0)
            .with_name("Staging")
            .with_domains([Domain::Space, Domain::Geospatial, Domain::Maritime])
            .with_update_interval_ms(2_000)
    }

    /// Isolated experimentation; never takes part in cross-world correlation
    pub fn sandbox() -> Self {
        Self::new("sandbox", 1_000, 10_000.0)
            .with_name("Sandbox")
            .with_fusion(false)
            .with_update_interval_ms(5_000)
    }

    /// Small radius, high capacity, tuned for correlation sensitivity
    pub fn fusion_lab() -> Self {
        Self::new("fusion_lab", 500_000, 100.0)
            .with_name("Fusion Lab")
            .with_update_interval_ms(100)
    }

    /// The fixed set of worlds configured at startup
    pub fn standard_worlds() -> Vec<WorldConfig> {
        vec![
            Self::production(),
            Self::staging(),
            Self::sandbox(),
            Self::fusion_lab(),
        ]
    }

    pub fn accepts_domain(&self, domain: Domain) -> bool {
        self.active_domains.contains(&domain)
    }

    /// True if the entity carries at least one domain this world accepts
    pub fn accepts(&self, entity: &FusedEntity) -> bool {
        entity.domains().any(|d| self.accepts_domain(d))
    }

    pub fn validate(&self) -> FusionResult<()> {
        if self.id.trim().is_empty() {
            return Err(FusionError::Config("world id must not be empty".into()));
        }
        if self.max_entities == 0 {
            return Err(FusionError::Config(format!(
                "world {} must allow at least one entity",
                self.id
            )));
        }
        if !self.correlation_radius_m.is_finite() || self.correlation_radius_m <= 0.0 {
            return Err(FusionError::Config(format!(
                "world {} correlation radius must be positive",
                self.id
            )));
        }
        if self.active_domains.is_empty() {
            return Err(FusionError::Config(format!(
                "world {} has no active domains",
                self.id
            )));
        }
        Ok(())
    }
}

/// Validate a world set: each world individually, ids unique
pub fn validate_worlds(worlds: &[WorldConfig]) -> FusionResult<()> {
    if worlds.is_empty() {
        return Err(FusionError::Config("at least one world is required".into()));
    }
    let mut seen = HashSet::new();
    for world in worlds {
        world.validate()?;
        if !seen.insert(world.id.as_str()) {
            return Err(FusionError::Config(format!("duplicate world id {}", world.id)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_worlds_have_distinct_policies() {
        let worlds = WorldConfig::standard_worlds();
        validate_worlds(&worlds).unwrap();

        let sandbox = worlds.iter().find(|w| w.id == "sandbox").unwrap();
        assert!(!sandbox.fusion_enabled);

        let staging = worlds.iter().find(|w| w.id == "staging").unwrap();
        assert!(!staging.accepts_domain(Domain::Network));

        let lab = worlds.iter().find(|w| w.id == "fusion_lab").unwrap();
        let prod = worlds.iter().find(|w| w.id == "production").unwrap();
        assert!(lab.correlation_radius_m < prod.correlation_radius_m);
        assert!(lab.max_entities > prod.max_entities);
    }

    #[test]
    fn duplicate_world_ids_rejected() {
        let worlds = vec![WorldConfig::production(), WorldConfig::production()];
        assert!(matches!(validate_worlds(&worlds), Err(FusionError::Config(_))));
    }

    #[test]
    fn zero_capacity_rejected() {
        let world = WorldConfig::new("tiny", 0, 10.0);
        assert!(world.validate().is_err());
    }
}
