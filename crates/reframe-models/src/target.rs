//! Detection candidates and fused per-frame targets.

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// Subject category of a detection.
///
/// The selection priority Face > Body > Salient is a fixed total order,
/// not a configurable preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Face detection
    Face,
    /// Body/person detection
    Body,
    /// Generic salient region
    Salient,
}

impl Category {
    /// Selection rank; lower wins.
    pub fn priority(&self) -> u8 {
        match self {
            Category::Face => 0,
            Category::Body => 1,
            Category::Salient => 2,
        }
    }
}

/// One raw detector output for one frame, normalized to a common shape.
///
/// Immutable once produced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Candidate {
    /// Source frame index
    pub frame_index: usize,
    /// Bounding box in source-frame pixels
    pub bbox: BoundingBox,
    /// Detection confidence in [0, 1]
    pub confidence: f64,
    /// Subject category
    pub category: Category,
    /// Detector-native track id, when the detector provides one
    pub track_id: Option<u32>,
}

impl Candidate {
    /// Create a new candidate.
    pub fn new(
        frame_index: usize,
        bbox: BoundingBox,
        confidence: f64,
        category: Category,
        track_id: Option<u32>,
    ) -> Self {
        Self {
            frame_index,
            bbox,
            confidence,
            category,
            track_id,
        }
    }
}

/// The single subject chosen for one frame after priority and quality
/// filtering. Frames with no eligible candidate carry an explicit `None`
/// decision instead of a `FusedTarget`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FusedTarget {
    /// Source frame index
    pub frame_index: usize,
    /// Chosen bounding box
    pub bbox: BoundingBox,
    /// Subject category of the chosen candidate
    pub category: Category,
    /// Confidence after the frame quality gate
    pub confidence: f64,
    /// Identity lock this target matched, if any
    pub lock_id: Option<u64>,
}

impl FusedTarget {
    /// Focus center for camera planning.
    ///
    /// Body targets are framed on the head-and-shoulders region rather
    /// than the geometric box center; `body_head_bias` is the vertical
    /// offset from the box top as a fraction of box height.
    pub fn focus_center(&self, body_head_bias: f64) -> (f64, f64) {
        match self.category {
            Category::Body => (self.bbox.cx(), self.bbox.y + self.bbox.height * body_head_bias),
            _ => (self.bbox.cx(), self.bbox.cy()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_priority_order() {
        assert!(Category::Face.priority() < Category::Body.priority());
        assert!(Category::Body.priority() < Category::Salient.priority());
    }

    #[test]
    fn test_body_focus_center_is_biased_up() {
        let target = FusedTarget {
            frame_index: 0,
            bbox: BoundingBox::new(100.0, 100.0, 100.0, 200.0),
            category: Category::Body,
            confidence: 0.9,
            lock_id: None,
        };

        let (cx, cy) = target.focus_center(0.3);
        assert_eq!(cx, 150.0);
        assert_eq!(cy, 160.0); // 100 + 200 * 0.3, above box center (200)
    }

    #[test]
    fn test_face_focus_center_is_box_center() {
        let target = FusedTarget {
            frame_index: 0,
            bbox: BoundingBox::new(0.0, 0.0, 100.0, 100.0),
            category: Category::Face,
            confidence: 0.9,
            lock_id: None,
        };

        assert_eq!(target.focus_center(0.3), (50.0, 50.0));
    }

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&Category::Salient).unwrap();
        assert_eq!(json, "\"salient\"");
    }
}
