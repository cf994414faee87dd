//! Cross-world correlation records and their retention

use crate::entity::FusedEntity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Rule id recorded when a natural identifier matches across worlds
pub const CROSS_WORLD_RULE: &str = "cross_world.natural_id";

const BASE_CONFIDENCE: f64 = 0.5;
const PER_REPRESENTATION: f64 = 0.1;
const PER_MATCH: f64 = 0.05;
const MAX_MATCH_CONTRIBUTION: f64 = 0.3;

/// A link asserting that entities in two worlds are the same object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossWorldCorrelation {
    pub source_world: String,
    pub target_world: String,
    /// Source entity first, then the matched target entities
    pub entity_ids: Vec<String>,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

/// One endpoint of a link: (world, entity)
type Endpoint<'a> = (&'a str, &'a str);

impl CrossWorldCorrelation {
    pub fn source_entity(&self) -> Option<&str> {
        self.entity_ids.first().map(String::as_str)
    }

    /// Every entity pair this record links, each ordered so that the
    /// same two entities yield the same key whichever side correlated.
    fn linked_pairs(&self) -> impl Iterator<Item = (Endpoint<'_>, Endpoint<'_>)> {
        let source = self
            .source_entity()
            .map(|id| (self.source_world.as_str(), id));
        self.entity_ids.iter().skip(1).filter_map(move |target| {
            let source = source?;
            let target = (self.target_world.as_str(), target.as_str());
            Some(if source <= target { (source, target) } else { (target, source) })
        })
    }

    fn same_source(&self, other: &CrossWorldCorrelation) -> bool {
        self.source_world == other.source_world
            && self.target_world == other.target_world
            && self.source_entity() == other.source_entity()
    }
}

/// How repeated correlations of the same pair are retained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossWorldRetention {
    /// One record per linked entity pair, whichever side correlated; newest wins
    #[default]
    LatestPerPair,
    /// Every correlation appends a record
    AppendOnly,
}

/// Confidence of a cross-world match.
///
/// 0.5 base, +0.1 per representation on the source entity, +0.05 per match
/// (contribution capped at 0.3), capped at 1.0 overall.
pub fn cross_world_confidence(representations: usize, matches: usize) -> f64 {
    let from_reps = PER_REPRESENTATION * representations as f64;
    let from_matches = (PER_MATCH * matches as f64).min(MAX_MATCH_CONTRIBUTION);
    (BASE_CONFIDENCE + from_reps + from_matches).min(1.0)
}

/// True if both entities share a domain-specific natural identifier:
/// NORAD id or constellation (space), IMO or MMSI (maritime), node id (network).
pub fn natural_identity_match(a: &FusedEntity, b: &FusedEntity) -> bool {
    if let (Some(sa), Some(sb)) = (a.space(), b.space()) {
        if same_some(&sa.norad_id, &sb.norad_id) || same_some(&sa.constellation, &sb.constellation) {
            return true;
        }
    }
    if let (Some(ma), Some(mb)) = (a.maritime(), b.maritime()) {
        if same_some(&ma.imo, &mb.imo) || same_some(&ma.mmsi, &mb.mmsi) {
            return true;
        }
    }
    if let (Some(na), Some(nb)) = (a.network(), b.network()) {
        if na.node_id == nb.node_id {
            return true;
        }
    }
    false
}

fn same_some<T: PartialEq>(a: &Option<T>, b: &Option<T>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x == y)
}

/// Log of cross-world correlations under a retention policy
#[derive(Debug, Clone, Default)]
pub struct CrossWorldLog {
    retention: CrossWorldRetention,
    records: Vec<CrossWorldCorrelation>,
}

impl CrossWorldLog {
    pub fn new(retention: CrossWorldRetention) -> Self {
        Self {
            retention,
            records: Vec::new(),
        }
    }

    pub fn retention(&self) -> CrossWorldRetention {
        self.retention
    }

    /// Append `record`. Under `LatestPerPair` it supersedes earlier records
    /// from the same source entity and any record linking the same two
    /// entities, in either direction.
    pub fn record(&mut self, record: CrossWorldCorrelation) {
        if self.retention == CrossWorldRetention::LatestPerPair {
            let pairs: HashSet<_> = record.linked_pairs().collect();
            self.records
                .retain(|r| !r.same_source(&record) && !r.linked_pairs().any(|p| pairs.contains(&p)));
        }
        self.records.push(record);
    }

    pub fn records(&self) -> &[CrossWorldCorrelation] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{DomainRepresentation, MaritimeData, SpaceData};

    fn record(source_entity: &str, confidence: f64) -> CrossWorldCorrelation {
        link("a", source_entity, "b", "other", confidence)
    }

    fn link(
        source_world: &str,
        source: &str,
        target_world: &str,
        target: &str,
        confidence: f64,
    ) -> CrossWorldCorrelation {
        CrossWorldCorrelation {
            source_world: source_world.into(),
            target_world: target_world.into(),
            entity_ids: vec![source.into(), target.into()],
            confidence,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn confidence_formula() {
        assert!((cross_world_confidence(1, 1) - 0.65).abs() < 1e-9);
        assert!((cross_world_confidence(2, 10) - 1.0).abs() < 1e-9);
        // match contribution alone caps at 0.3
        assert!((cross_world_confidence(0, 100) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn latest_per_pair_replaces() {
        let mut log = CrossWorldLog::new(CrossWorldRetention::LatestPerPair);
        log.record(record("x", 0.6));
        log.record(record("x", 0.7));
        log.record(record("y", 0.6));

        assert_eq!(log.len(), 2);
        let x = log.records().iter().find(|r| r.source_entity() == Some("x")).unwrap();
        assert_eq!(x.confidence, 0.7);
    }

    #[test]
    fn reverse_direction_replaces_the_same_pair() {
        let mut log = CrossWorldLog::new(CrossWorldRetention::LatestPerPair);
        log.record(link("b", "sat-b", "a", "sat-a", 0.6));
        log.record(link("a", "sat-a", "b", "sat-b", 0.7));

        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].source_world, "a");
        assert_eq!(log.records()[0].confidence, 0.7);
    }

    #[test]
    fn same_id_in_other_worlds_is_a_different_pair() {
        let mut log = CrossWorldLog::new(CrossWorldRetention::LatestPerPair);
        log.record(link("a", "x", "b", "y", 0.6));
        log.record(link("c", "x", "b", "y", 0.6));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn append_only_keeps_everything() {
        let mut log = CrossWorldLog::new(CrossWorldRetention::AppendOnly);
        log.record(record("x", 0.6));
        log.record(record("x", 0.7));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn norad_id_is_a_natural_identity() {
        let sat = |norad| {
            FusedEntity::new("satellite").with_representation(DomainRepresentation::Space(
                SpaceData {
                    norad_id: Some(norad),
                    ..Default::default()
                },
            ))
        };
        assert!(natural_identity_match(&sat(25544), &sat(25544)));
        assert!(!natural_identity_match(&sat(25544), &sat(43013)));
    }

    #[test]
    fn missing_identifiers_never_match() {
        let vessel = || {
            FusedEntity::new("vessel")
                .with_representation(DomainRepresentation::Maritime(MaritimeData::default()))
        };
        assert!(!natural_identity_match(&vessel(), &vessel()));
    }
}
