//! Traffic State Classification
//!
//! Keeps a bounded rolling window of per-frame counts and derives a smoothed
//! congestion level plus a signal-timing suggestion from the mean vehicle
//! count, so one noisy frame cannot flip the dashboard state.

mod classifier;
mod window;

pub use classifier::{
    StateThresholds, ThresholdError, TrafficClassifier, TrafficLevel, TrafficState,
};
pub use window::{CountSample, CountWindow};
