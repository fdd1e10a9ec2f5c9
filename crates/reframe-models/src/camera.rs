//! Virtual camera state and the final crop rectangle.

use serde::{Deserialize, Serialize};

/// Virtual camera state for one frame.
///
/// Forms an ordered, gap-free sequence over the video. Each entry is
/// derived from the previous entry plus planner output; the offline
/// smoothing pass may revise the whole sequence before it is finalized,
/// but entries are never mutated after that.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraState {
    /// Source frame index
    pub frame_index: usize,
    /// Camera center x in source pixels
    pub cx: f64,
    /// Camera center y in source pixels
    pub cy: f64,
    /// Zoom scale (1.0 = widest crop that fits the frame)
    pub zoom: f64,
    /// Horizontal velocity in pixels per frame
    pub vx: f64,
    /// Vertical velocity in pixels per frame
    pub vy: f64,
}

impl CameraState {
    /// Create a new camera state at rest.
    pub fn new(frame_index: usize, cx: f64, cy: f64, zoom: f64) -> Self {
        Self {
            frame_index,
            cx,
            cy,
            zoom,
            vx: 0.0,
            vy: 0.0,
        }
    }
}

/// The final per-frame output region handed to the rendering collaborator.
///
/// Always has the configured output aspect ratio exactly and lies entirely
/// within source frame bounds. Derived from [`CameraState`], never
/// persisted independently of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    /// Source frame index
    pub frame_index: usize,
    /// Left edge x-coordinate
    pub x: u32,
    /// Top edge y-coordinate
    pub y: u32,
    /// Crop width
    pub width: u32,
    /// Crop height
    pub height: u32,
}

impl CropRect {
    /// Create a new crop rectangle.
    pub fn new(frame_index: usize, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            frame_index,
            x,
            y,
            width,
            height,
        }
    }
}
