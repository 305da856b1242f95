//! Congestion level classification and suggestions

use crate::window::{CountSample, CountWindow};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Congestion level derived from the rolling window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficLevel {
    #[default]
    Low,
    Medium,
    High,
    Congested,
}

impl TrafficLevel {
    /// Signal-timing suggestion, keyed purely by level
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Low => "Normal signal timing is fine.",
            Self::Medium => "Consider slightly longer green for main flow.",
            Self::High => "Extend green phase; monitor pedestrian crossings.",
            Self::Congested => {
                "Maximize green for dominant direction; consider overflow lanes."
            }
        }
    }
}

/// Ascending mean-vehicle-count cutoffs between levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StateThresholds {
    /// Below this: low
    pub t1: f64,
    /// Below this: medium
    pub t2: f64,
    /// Below this: high; at or above: congested
    pub t3: f64,
}

impl Default for StateThresholds {
    fn default() -> Self {
        Self {
            t1: 5.0,
            t2: 15.0,
            t3: 30.0,
        }
    }
}

/// Invalid threshold configuration
#[derive(Debug, Clone, Error)]
#[error("state thresholds must be positive and strictly ascending: {t1}, {t2}, {t3}")]
pub struct ThresholdError {
    pub t1: f64,
    pub t2: f64,
    pub t3: f64,
}

impl StateThresholds {
    pub fn validate(&self) -> Result<(), ThresholdError> {
        if self.t1 > 0.0 && self.t1 < self.t2 && self.t2 < self.t3 {
            Ok(())
        } else {
            Err(ThresholdError {
                t1: self.t1,
                t2: self.t2,
                t3: self.t3,
            })
        }
    }

    fn level_for(&self, mean_vehicles: f64) -> TrafficLevel {
        if mean_vehicles < self.t1 {
            TrafficLevel::Low
        } else if mean_vehicles < self.t2 {
            TrafficLevel::Medium
        } else if mean_vehicles < self.t3 {
            TrafficLevel::High
        } else {
            TrafficLevel::Congested
        }
    }
}

/// Snapshot of the derived traffic state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficState {
    pub level: TrafficLevel,
    pub message: String,
    pub suggestion: String,
}

/// Rolling-window congestion classifier.
///
/// `current_state` is a pure function of the retained window contents.
pub struct TrafficClassifier {
    window: CountWindow,
    thresholds: StateThresholds,
}

impl TrafficClassifier {
    pub fn new(capacity: usize, thresholds: StateThresholds) -> Result<Self, ThresholdError> {
        thresholds.validate()?;
        Ok(Self {
            window: CountWindow::new(capacity),
            thresholds,
        })
    }

    /// Record one frame's counts, evicting the oldest sample if at capacity
    pub fn record_frame(&mut self, sample: CountSample) {
        self.window.push(sample);
        debug!(
            vehicles = sample.vehicles,
            pedestrians = sample.pedestrians,
            window = self.window.len(),
            "Recorded frame counts"
        );
    }

    /// Derive the smoothed traffic state.
    ///
    /// An empty window yields the default low level, never an error.
    pub fn current_state(&self) -> TrafficState {
        if self.window.is_empty() {
            return TrafficState {
                level: TrafficLevel::Low,
                message: "No data yet".to_string(),
                suggestion: TrafficLevel::Low.suggestion().to_string(),
            };
        }

        let mean = self.window.mean_vehicles();
        let level = self.thresholds.level_for(mean);
        let descriptor = match level {
            TrafficLevel::Low => "Light traffic",
            TrafficLevel::Medium => "Moderate traffic",
            TrafficLevel::High => "Heavy traffic",
            TrafficLevel::Congested => "Congested",
        };

        TrafficState {
            level,
            message: format!("{} (~{} vehicles)", descriptor, mean.round() as u64),
            suggestion: level.suggestion().to_string(),
        }
    }

    /// Per-frame vehicle counts in the window, oldest first
    pub fn recent_vehicle_totals(&self) -> Vec<u32> {
        self.window.vehicle_totals()
    }

    /// Most recently recorded sample
    pub fn latest_sample(&self) -> Option<CountSample> {
        self.window.latest().copied()
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }
}

impl Default for TrafficClassifier {
    fn default() -> Self {
        Self {
            window: CountWindow::default(),
            thresholds: StateThresholds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn classifier() -> TrafficClassifier {
        TrafficClassifier::new(20, StateThresholds::default()).unwrap()
    }

    fn record(c: &mut TrafficClassifier, vehicles: u32, frames: usize) {
        for _ in 0..frames {
            c.record_frame(CountSample::new(vehicles, 0, Utc::now()));
        }
    }

    #[test]
    fn test_empty_window_is_low_and_stable() {
        let c = classifier();
        let first = c.current_state();
        let second = c.current_state();
        assert_eq!(first.level, TrafficLevel::Low);
        assert_eq!(second.level, TrafficLevel::Low);
        assert_eq!(first.suggestion, second.suggestion);
    }

    #[test]
    fn test_levels_follow_mean_thresholds() {
        let cases = [
            (2, TrafficLevel::Low),
            (8, TrafficLevel::Medium),
            (20, TrafficLevel::High),
            (40, TrafficLevel::Congested),
        ];
        for (vehicles, expected) in cases {
            let mut c = classifier();
            record(&mut c, vehicles, 5);
            assert_eq!(c.current_state().level, expected, "vehicles={vehicles}");
        }
    }

    #[test]
    fn test_threshold_boundary_is_next_level() {
        let mut c = classifier();
        record(&mut c, 5, 4);
        // mean == t1 exactly: medium, not low
        assert_eq!(c.current_state().level, TrafficLevel::Medium);
    }

    #[test]
    fn test_classification_uses_mean_not_latest() {
        let mut c = classifier();
        record(&mut c, 0, 19);
        // One congested-looking frame cannot flip the level on its own
        record(&mut c, 40, 1);
        assert_eq!(c.current_state().level, TrafficLevel::Low);
    }

    #[test]
    fn test_overflow_uses_only_retained_frames() {
        let mut c = TrafficClassifier::new(5, StateThresholds::default()).unwrap();
        record(&mut c, 40, 10);
        record(&mut c, 1, 5);
        // The congested frames are all evicted
        assert_eq!(c.current_state().level, TrafficLevel::Low);
        assert_eq!(c.recent_vehicle_totals(), vec![1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_suggestion_is_level_keyed() {
        let mut a = classifier();
        let mut b = classifier();
        record(&mut a, 35, 3);
        record(&mut b, 100, 7);
        let sa = a.current_state();
        let sb = b.current_state();
        assert_eq!(sa.level, TrafficLevel::Congested);
        assert_eq!(sa.suggestion, sb.suggestion);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let bad = StateThresholds {
            t1: 10.0,
            t2: 5.0,
            t3: 30.0,
        };
        assert!(bad.validate().is_err());
        assert!(TrafficClassifier::new(20, bad).is_err());
    }
}
