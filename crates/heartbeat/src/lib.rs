//! Edge-Node Heartbeat Tracking
//!
//! Remote cameras and edge nodes report heartbeats; the registry keeps
//! last-seen timestamps and location info in memory and a background task
//! sweeps nodes to offline when they go quiet.

mod registry;

pub use registry::{NodeInfo, NodeRegistry, NodeStatus, SweeperConfig};
