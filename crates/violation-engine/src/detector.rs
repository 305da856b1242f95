//! Per-frame violation rule evaluation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use traffic_model::{
    Detection, Frame, ObjectClass, ViolationGeometry, ViolationKind, Zone,
};

/// Detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Lane-termination / no-entry zone
    pub lane_zone: Zone,
    /// IoU above which two vehicle boxes count as a possible collision
    pub overlap_threshold: f32,
    /// Whether a helmet-capable detection source is configured
    pub helmet_enabled: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            lane_zone: Zone::default(),
            overlap_threshold: 0.3,
            helmet_enabled: false,
        }
    }
}

/// A rule infraction found in one frame, not yet assigned an id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationEvent {
    pub kind: ViolationKind,
    pub geometry: ViolationGeometry,
    /// Offending object class (`None` for pair geometry)
    pub vehicle_class: Option<ObjectClass>,
    pub confidence: f32,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

/// Stateless per-frame violation detector
pub struct ViolationDetector {
    config: DetectorConfig,
}

impl ViolationDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Evaluate all rules against one frame.
    ///
    /// Malformed detections (box outside [0,1] or min >= max) are skipped
    /// individually; the rest of the frame is still evaluated. Repeated
    /// intrusions across consecutive frames are not deduplicated here.
    pub fn scan(&self, frame: &Frame) -> Vec<ViolationEvent> {
        let valid: Vec<&Detection> = frame
            .detections
            .iter()
            .filter(|det| {
                let ok = det.bbox.is_normalized();
                if !ok {
                    debug!(class = det.class.label(), "Skipping malformed detection box");
                }
                ok
            })
            .collect();

        let mut events = Vec::new();
        self.check_lane_termination(&valid, frame.timestamp, &mut events);
        self.check_accident_overlap(&valid, frame.timestamp, &mut events);
        if self.config.helmet_enabled {
            self.check_helmet(&valid, frame.timestamp, &mut events);
        }
        events
    }

    /// Lane rule: one event per vehicle whose center lies in the zone
    fn check_lane_termination(
        &self,
        detections: &[&Detection],
        timestamp: DateTime<Utc>,
        events: &mut Vec<ViolationEvent>,
    ) {
        for det in detections {
            if !det.class.is_vehicle() {
                continue;
            }
            if self.config.lane_zone.contains_center(&det.bbox) {
                events.push(ViolationEvent {
                    kind: ViolationKind::LaneTermination,
                    geometry: ViolationGeometry::Single { bbox: det.bbox },
                    vehicle_class: Some(det.class),
                    confidence: det.confidence,
                    details: "Vehicle in lane termination / no-entry zone".to_string(),
                    timestamp,
                });
            }
        }
    }

    /// Accident heuristic: one event per unordered vehicle pair overlapping
    /// above the threshold. A proxy for collision, not a true detector;
    /// occlusion false positives are expected.
    fn check_accident_overlap(
        &self,
        detections: &[&Detection],
        timestamp: DateTime<Utc>,
        events: &mut Vec<ViolationEvent>,
    ) {
        let vehicles: Vec<&&Detection> =
            detections.iter().filter(|d| d.class.is_vehicle()).collect();

        for i in 0..vehicles.len() {
            for j in (i + 1)..vehicles.len() {
                let a = vehicles[i];
                let b = vehicles[j];
                let iou = a.bbox.iou(&b.bbox);
                if iou > self.config.overlap_threshold {
                    debug!(iou, "Vehicle overlap above accident threshold");
                    events.push(ViolationEvent {
                        kind: ViolationKind::AccidentOverlap,
                        geometry: ViolationGeometry::Pair {
                            first: a.bbox,
                            second: b.bbox,
                        },
                        vehicle_class: None,
                        confidence: a.confidence.min(b.confidence),
                        details: "Possible accident: vehicles in collision overlap"
                            .to_string(),
                        timestamp,
                    });
                }
            }
        }
    }

    /// Helmet rule: one event per no-helmet detection
    fn check_helmet(
        &self,
        detections: &[&Detection],
        timestamp: DateTime<Utc>,
        events: &mut Vec<ViolationEvent>,
    ) {
        for det in detections {
            if det.class == ObjectClass::NoHelmet {
                events.push(ViolationEvent {
                    kind: ViolationKind::NoHelmet,
                    geometry: ViolationGeometry::Single { bbox: det.bbox },
                    vehicle_class: Some(det.class),
                    confidence: det.confidence,
                    details: "Rider without helmet detected".to_string(),
                    timestamp,
                });
            }
        }
    }
}
