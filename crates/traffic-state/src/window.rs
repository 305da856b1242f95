//! Bounded rolling window of per-frame counts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default window capacity (frames)
pub const DEFAULT_CAPACITY: usize = 20;

/// Aggregate counts for one frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CountSample {
    pub vehicles: u32,
    pub pedestrians: u32,
    pub timestamp: DateTime<Utc>,
}

impl CountSample {
    pub fn new(vehicles: u32, pedestrians: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            vehicles,
            pedestrians,
            timestamp,
        }
    }
}

/// Fixed-capacity ring of recent count samples, oldest evicted on overflow
#[derive(Debug)]
pub struct CountWindow {
    samples: VecDeque<CountSample>,
    capacity: usize,
}

impl CountWindow {
    /// Create a window holding at most `capacity` samples (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a sample, evicting the oldest when full
    pub fn push(&mut self, sample: CountSample) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mean vehicle count over the retained samples (0 when empty)
    pub fn mean_vehicles(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.samples.iter().map(|s| s.vehicles as u64).sum();
        sum as f64 / self.samples.len() as f64
    }

    /// Per-frame vehicle counts, oldest first (for dashboard charts)
    pub fn vehicle_totals(&self) -> Vec<u32> {
        self.samples.iter().map(|s| s.vehicles).collect()
    }

    /// Most recently recorded sample
    pub fn latest(&self) -> Option<&CountSample> {
        self.samples.back()
    }
}

impl Default for CountWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
