//! Node registry and offline sweeper

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Liveness status of a reporting node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Online,
    Offline,
}

/// Known edge node (camera / junction controller)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: String,
    /// Human-readable area name (e.g. "Lucknow")
    pub area: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub last_seen: DateTime<Utc>,
    pub status: NodeStatus,
}

/// Sweeper timing configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// How often to sweep (seconds)
    pub interval_secs: u64,
    /// Mark offline when not seen for this long (seconds)
    pub offline_after_secs: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            offline_after_secs: 120,
        }
    }
}

/// In-memory heartbeat registry, shareable behind an `Arc`
pub struct NodeRegistry {
    nodes: Mutex<HashMap<String, NodeInfo>>,
    offline_after: Duration,
}

impl NodeRegistry {
    pub fn new(offline_after_secs: u64) -> Self {
        Self {
            nodes: Mutex::new(HashMap::new()),
            offline_after: Duration::seconds(offline_after_secs as i64),
        }
    }

    /// Record a heartbeat, upserting the node's metadata.
    ///
    /// Fields left `None` keep any previously reported value.
    pub fn register(
        &self,
        id: &str,
        area: Option<String>,
        lat: Option<f64>,
        lon: Option<f64>,
    ) {
        let now = Utc::now();
        let mut nodes = match self.nodes.lock() {
            Ok(n) => n,
            Err(poisoned) => poisoned.into_inner(),
        };

        let entry = nodes.entry(id.to_string()).or_insert_with(|| {
            info!(node = id, "New node registered");
            NodeInfo {
                id: id.to_string(),
                area: None,
                lat: None,
                lon: None,
                last_seen: now,
                status: NodeStatus::Online,
            }
        });

        if area.is_some() {
            entry.area = area;
        }
        if lat.is_some() {
            entry.lat = lat;
        }
        if lon.is_some() {
            entry.lon = lon;
        }
        entry.last_seen = now;
        entry.status = NodeStatus::Online;
        debug!(node = id, "Heartbeat recorded");
    }

    /// Snapshot of all known nodes
    pub fn list(&self) -> Vec<NodeInfo> {
        match self.nodes.lock() {
            Ok(nodes) => nodes.values().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().values().cloned().collect(),
        }
    }

    /// Mark quiet nodes offline; returns how many changed
    pub fn sweep_offline(&self) -> usize {
        self.sweep_offline_at(Utc::now())
    }

    fn sweep_offline_at(&self, now: DateTime<Utc>) -> usize {
        let mut nodes = match self.nodes.lock() {
            Ok(n) => n,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut changed = 0;
        for info in nodes.values_mut() {
            if info.status == NodeStatus::Online && now - info.last_seen > self.offline_after {
                warn!(node = %info.id, "Node went offline");
                info.status = NodeStatus::Offline;
                changed += 1;
            }
        }
        changed
    }

    /// Run the offline sweep periodically in a background task
    pub fn spawn_sweeper(
        registry: Arc<Self>,
        config: SweeperConfig,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let interval = std::time::Duration::from_secs(config.interval_secs);
            loop {
                tokio::time::sleep(interval).await;
                let changed = registry.sweep_offline();
                if changed > 0 {
                    debug!(changed, "Heartbeat sweep marked nodes offline");
                }
            }
        })
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new(SweeperConfig::default().offline_after_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_list() {
        let registry = NodeRegistry::new(120);
        registry.register("cam-1", Some("Lucknow".to_string()), Some(26.85), Some(80.95));

        let nodes = registry.list();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "cam-1");
        assert_eq!(nodes[0].status, NodeStatus::Online);
        assert_eq!(nodes[0].area.as_deref(), Some("Lucknow"));
    }

    #[test]
    fn test_heartbeat_preserves_metadata() {
        let registry = NodeRegistry::new(120);
        registry.register("cam-1", Some("Lucknow".to_string()), Some(26.85), None);
        // Later heartbeat without metadata keeps what was reported
        registry.register("cam-1", None, None, None);

        let nodes = registry.list();
        assert_eq!(nodes[0].area.as_deref(), Some("Lucknow"));
        assert_eq!(nodes[0].lat, Some(26.85));
    }

    #[test]
    fn test_sweep_marks_quiet_nodes_offline() {
        let registry = NodeRegistry::new(120);
        registry.register("cam-1", None, None, None);

        // Fresh node survives the sweep
        assert_eq!(registry.sweep_offline(), 0);
        assert_eq!(registry.list()[0].status, NodeStatus::Online);

        // Well past the threshold it goes offline
        let later = Utc::now() + Duration::seconds(300);
        assert_eq!(registry.sweep_offline_at(later), 1);
        assert_eq!(registry.list()[0].status, NodeStatus::Offline);

        // Sweeping again changes nothing
        assert_eq!(registry.sweep_offline_at(later), 0);
    }

    #[test]
    fn test_heartbeat_revives_offline_node() {
        let registry = NodeRegistry::new(120);
        registry.register("cam-1", None, None, None);
        registry.sweep_offline_at(Utc::now() + Duration::seconds(300));
        assert_eq!(registry.list()[0].status, NodeStatus::Offline);

        registry.register("cam-1", None, None, None);
        assert_eq!(registry.list()[0].status, NodeStatus::Online);
    }
}
