//! Violation Detection
//!
//! Stateless per-frame rule checks against configured zones and thresholds:
//! - Lane termination: vehicle center inside the restricted zone
//! - Accident overlap: vehicle box pairs overlapping above an IoU threshold
//! - No-helmet: rider without helmet (only when a helmet-capable model feeds us)
//!
//! The detector emits [`ViolationEvent`]s; id assignment and storage belong
//! to the citation store.

mod detector;

pub use detector::{DetectorConfig, ViolationDetector, ViolationEvent};
