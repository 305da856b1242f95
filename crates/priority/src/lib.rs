//! Emergency Vehicle Priority Tracking
//!
//! Derives an ambulance-priority flag from per-frame detections, with a
//! manual override that pins the flag until cleared. Automatic detection is
//! frame-local (no smoothing), so the flag can flicker between frames;
//! callers needing stability must debounce.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use traffic_model::{Detection, ObjectClass};

/// Priority tracker configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriorityConfig {
    /// Class treated as the emergency-vehicle proxy (bus on stock models,
    /// a dedicated ambulance class on custom ones)
    pub emergency_class: ObjectClass,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            emergency_class: ObjectClass::Bus,
        }
    }
}

/// Ambulance priority state: automatic detection plus manual override
#[derive(Debug)]
pub struct PriorityTracker {
    config: PriorityConfig,
    detected: bool,
    manual_override: Option<bool>,
}

impl PriorityTracker {
    pub fn new(config: PriorityConfig) -> Self {
        Self {
            config,
            detected: false,
            manual_override: None,
        }
    }

    /// Update the automatic flag from one frame's detections.
    ///
    /// Ignored while a manual override is active.
    pub fn record_frame(&mut self, detections: &[Detection]) {
        if self.manual_override.is_some() {
            return;
        }
        let present = detections
            .iter()
            .any(|d| d.class == self.config.emergency_class);
        if present != self.detected {
            debug!(present, "Emergency vehicle presence changed");
        }
        self.detected = present;
    }

    /// Pin the priority flag to `enabled` until cleared
    pub fn set_override(&mut self, enabled: bool) {
        info!(enabled, "Manual priority override set");
        self.manual_override = Some(enabled);
    }

    /// Drop the override; automatic detection resumes from the next frame
    pub fn clear_override(&mut self) {
        info!("Manual priority override cleared");
        self.manual_override = None;
    }

    pub fn get_priority(&self) -> bool {
        self.manual_override.unwrap_or(self.detected)
    }

    pub fn is_override_active(&self) -> bool {
        self.manual_override.is_some()
    }
}

impl Default for PriorityTracker {
    fn default() -> Self {
        Self::new(PriorityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use traffic_model::BoundingBox;

    fn det(class: ObjectClass) -> Detection {
        Detection {
            class,
            confidence: 0.9,
            bbox: BoundingBox::new(0.1, 0.1, 0.3, 0.3),
        }
    }

    #[test]
    fn test_bus_sets_automatic_priority() {
        let mut tracker = PriorityTracker::default();
        tracker.record_frame(&[det(ObjectClass::Car), det(ObjectClass::Bus)]);
        assert!(tracker.get_priority());

        tracker.record_frame(&[det(ObjectClass::Car)]);
        assert!(!tracker.get_priority());
    }

    #[test]
    fn test_override_pins_flag_across_frames() {
        let mut tracker = PriorityTracker::default();
        tracker.set_override(true);
        assert!(tracker.is_override_active());

        tracker.record_frame(&[det(ObjectClass::Car)]);
        assert!(tracker.get_priority());
    }

    #[test]
    fn test_override_false_suppresses_detection() {
        let mut tracker = PriorityTracker::default();
        tracker.record_frame(&[det(ObjectClass::Bus)]);
        assert!(tracker.get_priority());

        tracker.set_override(false);
        assert!(!tracker.get_priority());
    }

    #[test]
    fn test_clear_override_resumes_automatic() {
        let mut tracker = PriorityTracker::default();
        tracker.set_override(true);
        tracker.clear_override();
        assert!(!tracker.is_override_active());

        tracker.record_frame(&[det(ObjectClass::Car)]);
        assert!(!tracker.get_priority());

        tracker.record_frame(&[det(ObjectClass::Bus)]);
        assert!(tracker.get_priority());
    }

    #[test]
    fn test_configured_emergency_class() {
        let mut tracker = PriorityTracker::new(PriorityConfig {
            emergency_class: ObjectClass::Truck,
        });
        tracker.record_frame(&[det(ObjectClass::Bus)]);
        assert!(!tracker.get_priority());

        tracker.record_frame(&[det(ObjectClass::Truck)]);
        assert!(tracker.get_priority());
    }
}
