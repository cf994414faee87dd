//! FusedEntity: the canonical multi-domain record for one real-world object

use super::domain::{
    CyberData, Domain, DomainRepresentation, GeospatialData, MaritimeData, NetworkData, SpaceData,
};
use crate::error::{FusionError, FusionResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One real-world object observed through one or more domains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedEntity {
    /// Unique within a world, never reused
    pub global_id: String,
    /// Free-form classification tag (e.g. "vessel", "satellite")
    pub entity_type: String,
    /// At most one payload per domain, kept in domain order
    pub representations: Vec<DomainRepresentation>,
    /// Certainty in [0, 1] that correlated observations are this object
    #[serde(default)]
    pub correlation_confidence: f64,
    #[serde(default = "Utc::now")]
    pub last_update_time: DateTime<Utc>,
    /// Concept lineage, general to specific
    #[serde(default)]
    pub ontology_path: Vec<String>,
    /// Rule ids that contributed to the current correlation state
    #[serde(default)]
    pub fusion_rules: Vec<String>,
}

impl FusedEntity {
    /// Create an entity with a fresh global id
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self::with_id(format!("entity:{}", Uuid::new_v4()), entity_type)
    }

    /// Create an entity with a caller-assigned global id
    pub fn with_id(global_id: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            global_id: global_id.into(),
            entity_type: entity_type.into(),
            representations: Vec::new(),
            correlation_confidence: 0.0,
            last_update_time: Utc::now(),
            ontology_path: Vec::new(),
            fusion_rules: Vec::new(),
        }
    }

    pub fn with_representation(mut self, representation: DomainRepresentation) -> Self {
        self.set_representation(representation);
        self
    }

    pub fn with_ontology_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ontology_path = path.into_iter().map(Into::into).collect();
        self
    }

    /// Insert or replace the payload for the representation's domain
    pub fn set_representation(&mut self, representation: DomainRepresentation) {
        let domain = representation.domain();
        match self.representations.iter().position(|r| r.domain() >= domain) {
            Some(idx) if self.representations[idx].domain() == domain => {
                self.representations[idx] = representation;
            }
            Some(idx) => self.representations.insert(idx, representation),
            None => self.representations.push(representation),
        }
    }

    pub fn representation(&self, domain: Domain) -> Option<&DomainRepresentation> {
        self.representations.iter().find(|r| r.domain() == domain)
    }

    pub fn representation_mut(&mut self, domain: Domain) -> Option<&mut DomainRepresentation> {
        self.representations.iter_mut().find(|r| r.domain() == domain)
    }

    pub fn has_domain(&self, domain: Domain) -> bool {
        self.representation(domain).is_some()
    }

    /// Domains this entity carries a payload for
    pub fn domains(&self) -> impl Iterator<Item = Domain> + '_ {
        self.representations.iter().map(DomainRepresentation::domain)
    }

    /// True if both entities carry a payload for at least one common domain
    pub fn shares_domain_with(&self, other: &FusedEntity) -> bool {
        self.domains().any(|d| other.has_domain(d))
    }

    /// The first domain present, used to attribute learned concepts
    pub fn primary_domain(&self) -> Option<Domain> {
        self.representations.first().map(DomainRepresentation::domain)
    }

    pub fn space(&self) -> Option<&SpaceData> {
        match self.representation(Domain::Space)? {
            DomainRepresentation::Space(data) => Some(data),
            _ => None,
        }
    }

    pub fn geospatial(&self) -> Option<&GeospatialData> {
        match self.representation(Domain::Geospatial)? {
            DomainRepresentation::Geospatial(data) => Some(data),
            _ => None,
        }
    }

    pub fn maritime(&self) -> Option<&MaritimeData> {
        match self.representation(Domain::Maritime)? {
            DomainRepresentation::Maritime(data) => Some(data),
            _ => None,
        }
    }

    pub fn network(&self) -> Option<&NetworkData> {
        match self.representation(Domain::Network)? {
            DomainRepresentation::Network(data) => Some(data),
            _ => None,
        }
    }

    pub fn cyber(&self) -> Option<&CyberData> {
        match self.representation(Domain::Cyber)? {
            DomainRepresentation::Cyber(data) => Some(data),
            _ => None,
        }
    }

    /// Reject entities that cannot take part in fusion
    pub fn validate(&self) -> FusionResult<()> {
        let invalid = |reason: String| FusionError::InvalidEntity {
            global_id: self.global_id.clone(),
            reason,
        };

        if self.global_id.trim().is_empty() {
            return Err(invalid("global id must not be empty".into()));
        }
        if self.representations.is_empty() {
            return Err(invalid("entity has no domain representation".into()));
        }
        if !(0.0..=1.0).contains(&self.correlation_confidence) {
            return Err(invalid(format!(
                "correlation confidence {} outside [0, 1]",
                self.correlation_confidence
            )));
        }
        for (i, rep) in self.representations.iter().enumerate() {
            if self.representations[..i].iter().any(|r| r.domain() == rep.domain()) {
                return Err(invalid(format!("duplicate {} representation", rep.domain())));
            }
            rep.validate().map_err(invalid)?;
        }
        Ok(())
    }

    /// Raise confidence to at least `confidence` and record the rule.
    ///
    /// Confidence never falls here; only an invalidating patch lowers it.
    pub fn record_correlation(&mut self, confidence: f64, rule: &str) {
        self.correlation_confidence = self.correlation_confidence.max(confidence.clamp(0.0, 1.0));
        if !self.fusion_rules.iter().any(|r| r == rule) {
            self.fusion_rules.push(rule.to_string());
        }
        self.touch();
    }

    /// Merge a partial update into this entity
    pub fn apply(&mut self, patch: EntityPatch) {
        if let Some(entity_type) = patch.entity_type {
            self.entity_type = entity_type;
        }
        for rep in patch.representations {
            self.set_representation(rep);
        }
        if let Some(path) = patch.ontology_path {
            self.ontology_path = path;
        }
        if patch.invalidate {
            self.correlation_confidence = 0.0;
            self.fusion_rules.clear();
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_update_time = Utc::now();
    }
}

/// Partial update applied by `update_entity`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityPatch {
    #[serde(default)]
    pub entity_type: Option<String>,
    /// Merged by domain: replaces an existing payload of the same domain
    #[serde(default)]
    pub representations: Vec<DomainRepresentation>,
    #[serde(default)]
    pub ontology_path: Option<Vec<String>>,
    /// Reset correlation confidence and rules before re-correlating
    #[serde(default)]
    pub invalidate: bool,
}

impl EntityPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_representation(mut self, representation: DomainRepresentation) -> Self {
        self.representations.push(representation);
        self
    }

    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    pub fn invalidating(mut self) -> Self {
        self.invalidate = true;
        self
    }

    /// Validate the payloads this patch would install
    pub fn validate(&self, global_id: &str) -> FusionResult<()> {
        for rep in &self.representations {
            rep.validate().map_err(|reason| FusionError::InvalidEntity {
                global_id: global_id.to_string(),
                reason,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Coordinates, NetworkData};

    fn geo(lat: f64, lon: f64) -> DomainRepresentation {
        DomainRepresentation::Geospatial(GeospatialData::at(Coordinates::new(lat, lon)))
    }

    #[test]
    fn representations_stay_in_domain_order() {
        let entity = FusedEntity::new("vessel")
            .with_representation(DomainRepresentation::Maritime(MaritimeData::default()))
            .with_representation(geo(1.0, 2.0))
            .with_representation(DomainRepresentation::Space(SpaceData::default()));

        let domains: Vec<_> = entity.domains().collect();
        assert_eq!(domains, vec![Domain::Space, Domain::Geospatial, Domain::Maritime]);
    }

    #[test]
    fn set_representation_replaces_same_domain() {
        let mut entity = FusedEntity::new("buoy").with_representation(geo(1.0, 2.0));
        entity.set_representation(geo(3.0, 4.0));

        assert_eq!(entity.representations.len(), 1);
        assert_eq!(entity.geospatial().unwrap().coordinates.lat, 3.0);
    }

    #[test]
    fn entity_without_representation_is_invalid() {
        let entity = FusedEntity::new("ghost");
        assert!(matches!(entity.validate(), Err(FusionError::InvalidEntity { .. })));
    }

    #[test]
    fn record_correlation_never_lowers_confidence() {
        let mut entity = FusedEntity::new("buoy").with_representation(geo(0.0, 0.0));
        entity.record_correlation(0.8, "geospatial.radius");
        entity.record_correlation(0.6, "geospatial.radius");

        assert_eq!(entity.correlation_confidence, 0.8);
        assert_eq!(entity.fusion_rules, vec!["geospatial.radius".to_string()]);
    }

    #[test]
    fn invalidating_patch_resets_confidence() {
        let mut entity = FusedEntity::new("router").with_representation(
            DomainRepresentation::Network(NetworkData {
                node_id: "r1".into(),
                ..Default::default()
            }),
        );
        entity.record_correlation(0.9, "network.link");
        entity.apply(EntityPatch::new().invalidating());

        assert_eq!(entity.correlation_confidence, 0.0);
        assert!(entity.fusion_rules.is_empty());
    }
}
