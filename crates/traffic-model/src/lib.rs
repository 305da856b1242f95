//! Shared Traffic Data Model
//!
//! Data types exchanged between the detection boundary and the analytics
//! components:
//! - Normalized bounding boxes and restricted zones (IoU, center containment)
//! - Object classes and per-frame detections
//! - Per-frame traffic counts
//! - Violation vocabulary (kind + reference geometry)

mod bbox;
mod detection;
mod violation;

pub use bbox::{BoundingBox, Zone};
pub use detection::{Detection, Frame, ObjectClass, TrafficCounts};
pub use violation::{ViolationGeometry, ViolationKind};
