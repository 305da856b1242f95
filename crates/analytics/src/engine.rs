//! Frame processing and dashboard aggregation

use crate::{ConfigError, EngineConfig};
use chrono::{Duration, Utc};
use citation_store::{CitationStore, StoreError};
use priority::{PriorityConfig, PriorityTracker};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};
use traffic_model::{Frame, ObjectClass, TrafficCounts};
use traffic_state::{CountSample, TrafficClassifier, TrafficLevel};
use violation_engine::{DetectorConfig, ViolationDetector};

/// Outcome of processing one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameSummary {
    pub counts: TrafficCounts,
    /// Ids of violations appended for this frame, in emission order
    pub violation_ids: Vec<u64>,
    pub accident_detected: bool,
    pub ambulance_priority: bool,
}

/// Aggregated state for the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub level: TrafficLevel,
    pub message: String,
    pub suggestion: String,
    /// Per-frame vehicle counts in the window, oldest first
    pub recent_totals: Vec<u32>,
    /// Last frame's by-class counts
    pub by_class: HashMap<ObjectClass, u32>,
    /// True iff an open accident violation exists in the recent window
    pub accident_alert: bool,
    pub ambulance_priority: bool,
    pub priority_override: bool,
    pub violation_count: usize,
    pub citation_count: usize,
}

/// One engine instance per monitored junction/stream group.
///
/// Constructor-injected everywhere it is needed; no ambient singletons.
/// Safe to share behind an `Arc`: every mutable resource carries its own
/// lock and `process_frame` never holds two component locks at once.
pub struct TrafficAnalytics {
    detector: ViolationDetector,
    classifier: Mutex<TrafficClassifier>,
    last_counts: Mutex<TrafficCounts>,
    priority: Mutex<PriorityTracker>,
    store: Arc<CitationStore>,
    accident_alert_window: Duration,
}

impl TrafficAnalytics {
    /// Build the engine from validated configuration
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let store = Arc::new(CitationStore::new(config.rate_table.clone())?);
        let classifier =
            TrafficClassifier::new(config.window_capacity, config.state_thresholds)?;
        let detector = ViolationDetector::new(DetectorConfig {
            lane_zone: config.lane_zone,
            overlap_threshold: config.overlap_threshold,
            helmet_enabled: config.helmet_enabled,
        });
        let priority = PriorityTracker::new(PriorityConfig {
            emergency_class: config.emergency_class,
        });

        info!("Traffic analytics engine initialized");
        Ok(Self {
            detector,
            classifier: Mutex::new(classifier),
            last_counts: Mutex::new(TrafficCounts::default()),
            priority: Mutex::new(priority),
            store,
            accident_alert_window: Duration::seconds(config.accident_alert_secs as i64),
        })
    }

    fn lock<'a, T>(mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
        match mutex.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Feed one frame of detections through every component.
    ///
    /// Violations are appended to the store in emission order; counts go
    /// into the rolling window; the priority tracker sees the raw
    /// detections.
    pub fn process_frame(&self, frame: &Frame) -> Result<FrameSummary, StoreError> {
        let events = self.detector.scan(frame);
        let accident_detected = events
            .iter()
            .any(|e| e.kind == traffic_model::ViolationKind::AccidentOverlap);
        let violation_ids = self.store.append_events(events)?;

        let counts = TrafficCounts::from_detections(&frame.detections);
        {
            let mut classifier = Self::lock(&self.classifier);
            classifier.record_frame(CountSample::new(
                counts.vehicles(),
                counts.pedestrians(),
                frame.timestamp,
            ));
        }
        *Self::lock(&self.last_counts) = counts.clone();

        let ambulance_priority = {
            let mut priority = Self::lock(&self.priority);
            priority.record_frame(&frame.detections);
            priority.get_priority()
        };

        debug!(
            detections = frame.detections.len(),
            violations = violation_ids.len(),
            accident_detected,
            "Processed frame"
        );

        Ok(FrameSummary {
            counts,
            violation_ids,
            accident_detected,
            ambulance_priority,
        })
    }

    /// Aggregate current state for the dashboard
    pub fn current_stats(&self) -> DashboardStats {
        let (state, recent_totals) = {
            let classifier = Self::lock(&self.classifier);
            (classifier.current_state(), classifier.recent_vehicle_totals())
        };
        let by_class = Self::lock(&self.last_counts).by_class.clone();
        let (ambulance_priority, priority_override) = {
            let priority = Self::lock(&self.priority);
            (priority.get_priority(), priority.is_override_active())
        };

        let cutoff = Utc::now() - self.accident_alert_window;
        DashboardStats {
            level: state.level,
            message: state.message,
            suggestion: state.suggestion,
            recent_totals,
            by_class,
            accident_alert: self.store.has_open_accident_since(cutoff),
            ambulance_priority,
            priority_override,
            violation_count: self.store.violation_count(),
            citation_count: self.store.citation_count(),
        }
    }

    /// Pin the ambulance priority flag
    pub fn set_priority_override(&self, enabled: bool) {
        Self::lock(&self.priority).set_override(enabled);
    }

    /// Resume automatic priority detection
    pub fn clear_priority_override(&self) {
        Self::lock(&self.priority).clear_override();
    }

    /// Violation and citation records live here
    pub fn store(&self) -> &Arc<CitationStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use traffic_model::{BoundingBox, Detection, ViolationKind};

    fn det(class: ObjectClass, bbox: BoundingBox) -> Detection {
        Detection {
            class,
            confidence: 0.9,
            bbox,
        }
    }

    fn engine() -> TrafficAnalytics {
        TrafficAnalytics::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_frame_flows_into_all_components() {
        let engine = engine();
        let frame = Frame::new(
            vec![
                // Car in the default top-strip zone
                det(ObjectClass::Car, BoundingBox::new(0.4, 0.1, 0.6, 0.2)),
                det(ObjectClass::Person, BoundingBox::new(0.7, 0.5, 0.8, 0.7)),
                det(ObjectClass::Bus, BoundingBox::new(0.1, 0.6, 0.3, 0.9)),
            ],
            1280,
            720,
        );

        let summary = engine.process_frame(&frame).unwrap();
        assert_eq!(summary.counts.vehicles(), 2);
        assert_eq!(summary.counts.pedestrians(), 1);
        assert_eq!(summary.violation_ids.len(), 1);
        assert!(summary.ambulance_priority, "bus should raise priority");
        assert!(!summary.accident_detected);

        let stats = engine.current_stats();
        assert_eq!(stats.violation_count, 1);
        assert_eq!(stats.recent_totals, vec![2]);
        assert_eq!(stats.by_class[&ObjectClass::Person], 1);
        assert!(stats.ambulance_priority);
    }

    #[test]
    fn test_accident_raises_alert_in_stats() {
        let engine = engine();
        let a = BoundingBox::new(0.1, 0.4, 0.5, 0.8);
        let b = BoundingBox::new(0.1, 0.5, 0.5, 0.9);
        let frame = Frame::new(
            vec![det(ObjectClass::Car, a), det(ObjectClass::Truck, b)],
            1280,
            720,
        );

        let summary = engine.process_frame(&frame).unwrap();
        assert!(summary.accident_detected);
        assert!(engine.current_stats().accident_alert);

        let violations = engine.store().list_violations(None).unwrap();
        assert_eq!(violations[0].kind, ViolationKind::AccidentOverlap);
    }

    #[test]
    fn test_priority_override_survives_frames() {
        let engine = engine();
        engine.set_priority_override(true);

        let frame = Frame::new(vec![], 1280, 720);
        let summary = engine.process_frame(&frame).unwrap();
        assert!(summary.ambulance_priority);

        let stats = engine.current_stats();
        assert!(stats.ambulance_priority);
        assert!(stats.priority_override);

        engine.clear_priority_override();
        let summary = engine.process_frame(&frame).unwrap();
        assert!(!summary.ambulance_priority);
    }

    #[test]
    fn test_stats_before_any_frame() {
        let engine = engine();
        let stats = engine.current_stats();
        assert_eq!(stats.level, TrafficLevel::Low);
        assert!(stats.recent_totals.is_empty());
        assert!(!stats.accident_alert);
        assert_eq!(stats.violation_count, 0);
    }

    #[test]
    fn test_citation_through_engine_store() {
        let engine = engine();
        let frame = Frame::new(
            vec![det(ObjectClass::Car, BoundingBox::new(0.4, 0.1, 0.6, 0.2))],
            1280,
            720,
        );
        let summary = engine.process_frame(&frame).unwrap();
        let violation_id = summary.violation_ids[0];

        let citation = engine.store().issue_citation(violation_id).unwrap();
        assert_eq!(citation.amount, 500);
        assert_eq!(engine.current_stats().citation_count, 1);
    }
}
