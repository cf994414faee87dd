//! Alerts raised by domain adapters and the windowed log that holds them

use crate::entity::{Coordinates, Domain};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What an alert is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    CollisionRisk,
    RestrictedArea,
    SecurityThreat,
    OrbitalConjunction,
    LinkDegraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub domain: Domain,
    pub kind: AlertKind,
    pub severity: Severity,
    /// The entity that triggered the check first, then any others involved
    pub entity_ids: Vec<String>,
    pub message: String,
    pub location: Option<Coordinates>,
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(
        domain: Domain,
        kind: AlertKind,
        severity: Severity,
        entity_ids: Vec<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("alert:{}", Uuid::new_v4()),
            domain,
            kind,
            severity,
            entity_ids,
            message: message.into(),
            location: None,
            raised_at: Utc::now(),
        }
    }

    pub fn at(mut self, location: Coordinates) -> Self {
        self.location = Some(location);
        self
    }

    pub fn raised_at(mut self, at: DateTime<Utc>) -> Self {
        self.raised_at = at;
        self
    }

    pub fn involves(&self, entity_id: &str) -> bool {
        self.entity_ids.iter().any(|id| id == entity_id)
    }
}

/// Alert list with a recency window for "active" queries.
///
/// Alerts older than one window before the newest alert are dropped on append.
#[derive(Debug, Clone)]
pub struct AlertLog {
    window: Duration,
    alerts: Vec<Alert>,
}

impl AlertLog {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            alerts: Vec::new(),
        }
    }

    pub fn with_window_secs(secs: u64) -> Self {
        Self::new(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1_000)))
    }

    pub fn append(&mut self, alert: Alert) {
        let newest = self
            .alerts
            .iter()
            .map(|a| a.raised_at)
            .chain(std::iter::once(alert.raised_at))
            .max()
            .unwrap_or(alert.raised_at);
        let cutoff = newest - self.window;
        self.alerts.push(alert);
        self.alerts.retain(|a| a.raised_at >= cutoff);
    }

    /// Alerts raised within the window ending at `now`
    pub fn active_at(&self, now: DateTime<Utc>) -> Vec<Alert> {
        let since = now - self.window;
        self.alerts
            .iter()
            .filter(|a| a.raised_at >= since && a.raised_at <= now)
            .cloned()
            .collect()
    }

    pub fn active(&self) -> Vec<Alert> {
        self.active_at(Utc::now())
    }

    /// Retained alerts in append order
    pub fn all(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
