//! Traffic Analytics Facade
//!
//! Wires the per-frame components together behind one handle:
//! detections flow into the violation detector, the rolling traffic-state
//! window, and the priority tracker; emitted violations land in the
//! citation store. Each resource is guarded by its own lock and no lock is
//! held across components.

mod config;
mod engine;

pub use crate::config::{ConfigError, EngineConfig};
pub use crate::engine::{DashboardStats, FrameSummary, TrafficAnalytics};
