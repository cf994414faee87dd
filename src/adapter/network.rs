//! NetworkAdapter: network nodes and link health alerts

use super::alert::{Alert, AlertKind, AlertLog, Severity};
use super::traits::DomainAdapter;
use crate::entity::{Domain, DomainRepresentation, FusedEntity, NetworkData, NodeStatus};
use crate::error::{FusionError, FusionResult};
use crate::events::{EventBus, FusionEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latency above which a link counts as degraded
pub const MAX_HEALTHY_LATENCY_MS: f64 = 250.0;

/// Raw network node observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub node_id: String,
    #[serde(default)]
    pub connections: Vec<String>,
    #[serde(default)]
    pub bandwidth_mbps: f64,
    #[serde(default)]
    pub latency_ms: f64,
    #[serde(default)]
    pub status: NodeStatus,
}

/// Fresh link measurements for one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkMetrics {
    pub latency_ms: f64,
    pub bandwidth_mbps: f64,
    pub status: NodeStatus,
}

#[derive(Debug)]
pub struct NetworkAdapter {
    nodes: BTreeMap<String, FusedEntity>,
    alerts: AlertLog,
    events: EventBus,
}

impl NetworkAdapter {
    pub fn new(alert_window_secs: u64, events: EventBus) -> Self {
        Self {
            nodes: BTreeMap::new(),
            alerts: AlertLog::with_window_secs(alert_window_secs),
            events,
        }
    }

    pub fn add_node(&mut self, descriptor: NodeDescriptor) -> FusionResult<FusedEntity> {
        let entity = FusedEntity::new("network_node")
            .with_representation(DomainRepresentation::Network(NetworkData {
                node_id: descriptor.node_id,
                connections: descriptor.connections,
                bandwidth_mbps: descriptor.bandwidth_mbps,
                latency_ms: descriptor.latency_ms,
                status: descriptor.status,
            }))
            .with_ontology_path(["network", "node"]);
        entity.validate()?;

        self.nodes.insert(entity.global_id.clone(), entity.clone());
        Ok(entity)
    }

    /// Record link measurements; raises `LinkDegraded` on high latency or a
    /// node that is not online.
    pub fn update_link_metrics(&mut self, global_id: &str, metrics: LinkMetrics) -> FusionResult<Option<Alert>> {
        let entity = self
            .nodes
            .get_mut(global_id)
            .ok_or_else(|| FusionError::UnknownEntity(global_id.to_string()))?;
        let node_id = match entity.representation_mut(Domain::Network) {
            Some(DomainRepresentation::Network(n)) => {
                n.latency_ms = metrics.latency_ms;
                n.bandwidth_mbps = metrics.bandwidth_mbps;
                n.status = metrics.status;
                n.node_id.clone()
            }
            _ => return Err(FusionError::UnknownEntity(global_id.to_string())),
        };
        entity.touch();

        let degraded = metrics.latency_ms > MAX_HEALTHY_LATENCY_MS || metrics.status != NodeStatus::Online;
        if !degraded {
            return Ok(None);
        }

        let severity = if metrics.status == NodeStatus::Offline {
            Severity::High
        } else {
            Severity::Medium
        };
        let alert = Alert::new(
            Domain::Network,
            AlertKind::LinkDegraded,
            severity,
            vec![global_id.to_string()],
            format!(
                "node {} {:?} at {:.0} ms latency",
                node_id, metrics.status, metrics.latency_ms
            ),
        );
        self.alerts.append(alert.clone());
        self.events.publish(FusionEvent::AlertRaised(alert.clone()));
        Ok(Some(alert))
    }

    pub fn node(&self, global_id: &str) -> Option<&FusedEntity> {
        self.nodes.get(global_id)
    }
}

impl DomainAdapter for NetworkAdapter {
    fn id(&self) -> &str {
        "network"
    }

    fn domain(&self) -> Domain {
        Domain::Network
    }

    fn alerts(&self) -> Vec<Alert> {
        self.alerts.active()
    }
}
