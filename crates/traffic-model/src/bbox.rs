//! Normalized bounding boxes and restricted zones

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in normalized [0,1] x [0,1] frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BoundingBox {
    /// Create a box from corner coordinates
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Check that coordinates are within [0,1] and min < max on both axes
    pub fn is_normalized(&self) -> bool {
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        in_unit(self.x_min)
            && in_unit(self.y_min)
            && in_unit(self.x_max)
            && in_unit(self.y_max)
            && self.x_min < self.x_max
            && self.y_min < self.y_max
    }

    /// Centroid of the box
    pub fn center(&self) -> (f32, f32) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Box area (0 for inverted or degenerate boxes)
    pub fn area(&self) -> f32 {
        (self.x_max - self.x_min).max(0.0) * (self.y_max - self.y_min).max(0.0)
    }

    /// Intersection-over-union with another box.
    ///
    /// Returns 0 for disjoint boxes and for degenerate zero-area inputs.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x1 = self.x_min.max(other.x_min);
        let y1 = self.y_min.max(other.y_min);
        let x2 = self.x_max.min(other.x_max);
        let y2 = self.y_max.min(other.y_max);

        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let inter = (x2 - x1) * (y2 - y1);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            return 0.0;
        }
        inter / union
    }
}

/// Restricted rectangular zone in the same normalized coordinate space
/// (e.g. a lane-termination / no-entry strip)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl Zone {
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Check that the zone is a valid rectangle inside the unit square
    pub fn is_valid(&self) -> bool {
        BoundingBox::new(self.x_min, self.y_min, self.x_max, self.y_max).is_normalized()
    }

    /// True iff the box's centroid lies within the zone (inclusive bounds).
    ///
    /// Intrusion is judged by the center, so a box only clipping the zone
    /// edge does not count.
    pub fn contains_center(&self, bbox: &BoundingBox) -> bool {
        let (cx, cy) = bbox.center();
        cx >= self.x_min && cx <= self.x_max && cy >= self.y_min && cy <= self.y_max
    }
}

impl Default for Zone {
    /// Top strip covering the full width, 25% height
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, 0.25)
    }
}
