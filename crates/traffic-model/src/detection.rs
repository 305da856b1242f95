//! Object classes, detections, and per-frame counts

use crate::BoundingBox;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Object class produced by the external vision model.
///
/// Closed enum: labels outside this set are rejected at the boundary via
/// [`ObjectClass::from_label`] rather than carried as opaque strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectClass {
    Car,
    Truck,
    Bus,
    Motorcycle,
    Bicycle,
    Person,
    /// Rider with a helmet (helmet-capable model only)
    HelmetOn,
    /// Rider without a helmet (helmet-capable model only)
    NoHelmet,
}

impl ObjectClass {
    /// Vehicle subtypes subject to zone and overlap rules
    pub fn is_vehicle(&self) -> bool {
        matches!(
            self,
            Self::Car | Self::Truck | Self::Bus | Self::Motorcycle | Self::Bicycle
        )
    }

    /// Parse a model label; unknown labels are `None` so callers can skip
    /// them explicitly
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "car" => Some(Self::Car),
            "truck" => Some(Self::Truck),
            "bus" => Some(Self::Bus),
            "motorcycle" => Some(Self::Motorcycle),
            "bicycle" => Some(Self::Bicycle),
            "person" => Some(Self::Person),
            "helmet" | "with_helmet" => Some(Self::HelmetOn),
            "no_helmet" | "without_helmet" => Some(Self::NoHelmet),
            _ => None,
        }
    }

    /// Stable label for display and serialization
    pub fn label(&self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Truck => "truck",
            Self::Bus => "bus",
            Self::Motorcycle => "motorcycle",
            Self::Bicycle => "bicycle",
            Self::Person => "person",
            Self::HelmetOn => "helmet_on",
            Self::NoHelmet => "no_helmet",
        }
    }
}

/// One classified, localized object found in a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class: ObjectClass,
    /// Model confidence in [0,1]
    pub confidence: f32,
    /// Normalized bounding box
    pub bbox: BoundingBox,
}

/// One processed frame: ordered detections plus frame dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub detections: Vec<Detection>,
    /// Pixel width, for denormalization where needed
    pub width: u32,
    /// Pixel height
    pub height: u32,
    pub timestamp: DateTime<Utc>,
}

impl Frame {
    pub fn new(detections: Vec<Detection>, width: u32, height: u32) -> Self {
        Self {
            detections,
            width,
            height,
            timestamp: Utc::now(),
        }
    }
}

/// Per-class and aggregate counts for one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrafficCounts {
    pub by_class: HashMap<ObjectClass, u32>,
}

impl TrafficCounts {
    /// Tally detections by class
    pub fn from_detections(detections: &[Detection]) -> Self {
        let mut by_class = HashMap::new();
        for det in detections {
            *by_class.entry(det.class).or_insert(0) += 1;
        }
        Self { by_class }
    }

    /// Total vehicle-class objects
    pub fn vehicles(&self) -> u32 {
        self.by_class
            .iter()
            .filter(|(class, _)| class.is_vehicle())
            .map(|(_, n)| n)
            .sum()
    }

    /// Total pedestrians
    pub fn pedestrians(&self) -> u32 {
        self.by_class.get(&ObjectClass::Person).copied().unwrap_or(0)
    }

    /// All counted objects
    pub fn total(&self) -> u32 {
        self.by_class.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(class: ObjectClass) -> Detection {
        Detection {
            class,
            confidence: 0.9,
            bbox: BoundingBox::new(0.1, 0.1, 0.2, 0.2),
        }
    }

    #[test]
    fn test_counts_from_detections() {
        let counts = TrafficCounts::from_detections(&[
            det(ObjectClass::Car),
            det(ObjectClass::Car),
            det(ObjectClass::Bus),
            det(ObjectClass::Person),
        ]);

        assert_eq!(counts.by_class[&ObjectClass::Car], 2);
        assert_eq!(counts.vehicles(), 3);
        assert_eq!(counts.pedestrians(), 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_empty_counts() {
        let counts = TrafficCounts::from_detections(&[]);
        assert_eq!(counts.vehicles(), 0);
        assert_eq!(counts.pedestrians(), 0);
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_from_label_known_and_unknown() {
        assert_eq!(ObjectClass::from_label("car"), Some(ObjectClass::Car));
        assert_eq!(
            ObjectClass::from_label("without_helmet"),
            Some(ObjectClass::NoHelmet)
        );
        assert_eq!(ObjectClass::from_label("airplane"), None);
    }

    #[test]
    fn test_vehicle_classification() {
        assert!(ObjectClass::Motorcycle.is_vehicle());
        assert!(!ObjectClass::Person.is_vehicle());
        assert!(!ObjectClass::NoHelmet.is_vehicle());
    }
}
