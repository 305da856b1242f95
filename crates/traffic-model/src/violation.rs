//! Violation vocabulary shared by the detector and the citation store

use crate::BoundingBox;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule infraction category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Vehicle center inside the lane-termination / no-entry zone
    LaneTermination,
    /// Two vehicle boxes overlapping above the collision threshold
    AccidentOverlap,
    /// Rider detected without a helmet
    NoHelmet,
}

impl ViolationKind {
    /// All built-in kinds; the rate table must cover every one of these
    pub const ALL: [ViolationKind; 3] = [
        ViolationKind::LaneTermination,
        ViolationKind::AccidentOverlap,
        ViolationKind::NoHelmet,
    ];
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LaneTermination => "lane_termination",
            Self::AccidentOverlap => "accident_overlap",
            Self::NoHelmet => "no_helmet",
        };
        f.write_str(s)
    }
}

/// Offending geometry attached to a violation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ViolationGeometry {
    /// A single offending box
    Single { bbox: BoundingBox },
    /// An overlapping pair (accident heuristic)
    Pair {
        first: BoundingBox,
        second: BoundingBox,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(ViolationKind::LaneTermination.to_string(), "lane_termination");
        assert_eq!(ViolationKind::AccidentOverlap.to_string(), "accident_overlap");
        assert_eq!(ViolationKind::NoHelmet.to_string(), "no_helmet");
    }

    #[test]
    fn test_all_covers_every_kind() {
        assert_eq!(ViolationKind::ALL.len(), 3);
    }
}
