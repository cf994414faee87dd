//! Read-only world snapshots and the counters behind them

use crate::entity::Domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Measured activity of one world
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPerformance {
    pub registrations_total: u64,
    pub updates_total: u64,
    /// Intra-world matches found
    pub correlations_total: u64,
    pub cross_world_matches_total: u64,
    /// Registrations rejected for capacity
    pub rejected_total: u64,
    /// Rates over the last snapshot interval
    pub registrations_per_sec: f64,
    pub correlations_per_sec: f64,
    /// When the rates were last sampled
    pub sampled_at: Option<DateTime<Utc>>,
}

/// Observability snapshot of one world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub world_id: String,
    pub name: String,
    pub fusion_enabled: bool,
    pub active_domains: Vec<Domain>,
    pub entity_count: usize,
    pub max_entities: usize,
    /// Configured update cadence in milliseconds
    pub update_interval_ms: u64,
    /// entity_count / max_entities
    pub utilization: f64,
    pub performance: WorldPerformance,
}

#[derive(Debug)]
struct Sample {
    at: Instant,
    registrations: u64,
    correlations: u64,
    registrations_per_sec: f64,
    correlations_per_sec: f64,
    sampled_at: Option<DateTime<Utc>>,
}

/// Lock-free counters plus the last rate sample
#[derive(Debug)]
pub(crate) struct WorldStats {
    registrations: AtomicU64,
    updates: AtomicU64,
    correlations: AtomicU64,
    cross_world_matches: AtomicU64,
    rejected: AtomicU64,
    sample: Mutex<Sample>,
}

impl Default for WorldStats {
    fn default() -> Self {
        Self {
            registrations: AtomicU64::new(0),
            updates: AtomicU64::new(0),
            correlations: AtomicU64::new(0),
            cross_world_matches: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            sample: Mutex::new(Sample {
                at: Instant::now(),
                registrations: 0,
                correlations: 0,
                registrations_per_sec: 0.0,
                correlations_per_sec: 0.0,
                sampled_at: None,
            }),
        }
    }
}

impl WorldStats {
    pub(crate) fn record_registration(&self, matches: usize) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
        self.correlations.fetch_add(matches as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cross_world_match(&self) {
        self.cross_world_matches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejection(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Current totals with the most recent rates
    pub(crate) fn performance(&self) -> WorldPerformance {
        let sample = self.sample.lock().unwrap_or_else(PoisonError::into_inner);
        WorldPerformance {
            registrations_total: self.registrations.load(Ordering::Relaxed),
            updates_total: self.updates.load(Ordering::Relaxed),
            correlations_total: self.correlations.load(Ordering::Relaxed),
            cross_world_matches_total: self.cross_world_matches.load(Ordering::Relaxed),
            rejected_total: self.rejected.load(Ordering::Relaxed),
            registrations_per_sec: sample.registrations_per_sec,
            correlations_per_sec: sample.correlations_per_sec,
            sampled_at: sample.sampled_at,
        }
    }

    /// Recompute rates from the deltas since the previous sample
    pub(crate) fn sample(&self) -> WorldPerformance {
        {
            let mut sample = self.sample.lock().unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            let elapsed = now.duration_since(sample.at).as_secs_f64();
            let registrations = self.registrations.load(Ordering::Relaxed);
            let correlations = self.correlations.load(Ordering::Relaxed);

            if elapsed > 0.0 {
                sample.registrations_per_sec =
                    registrations.saturating_sub(sample.registrations) as f64 / elapsed;
                sample.correlations_per_sec =
                    correlations.saturating_sub(sample.correlations) as f64 / elapsed;
            }
            sample.at = now;
            sample.registrations = registrations;
            sample.correlations = correlations;
            sample.sampled_at = Some(Utc::now());
        }
        self.performance()
    }
}
