//! Geometry primitives shared across the pipeline.

use serde::{Deserialize, Serialize};

/// Bounding box in source-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge x-coordinate
    pub x: f64,
    /// Top edge y-coordinate
    pub y: f64,
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Center x-coordinate.
    #[inline]
    pub fn cx(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Center y-coordinate.
    #[inline]
    pub fn cy(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Right edge x-coordinate.
    #[inline]
    pub fn x2(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate.
    #[inline]
    pub fn y2(&self) -> f64 {
        self.y + self.height
    }

    /// Box area in pixels.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Euclidean distance between box centers.
    pub fn center_distance(&self, other: &BoundingBox) -> f64 {
        let dx = self.cx() - other.cx();
        let dy = self.cy() - other.cy();
        (dx * dx + dy * dy).sqrt()
    }

    /// Compute Intersection over Union with another box.
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.x2().min(other.x2());
        let y2 = self.y2().min(other.y2());

        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let intersection = (x2 - x1) * (y2 - y1);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Whether a point lies inside the box.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x2() && py >= self.y && py <= self.y2()
    }
}

/// Source frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// Create a new frame size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Frame area in pixels.
    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }
}

/// Target aspect ratio for the output crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AspectRatio {
    /// Width component
    pub width: u32,
    /// Height component
    pub height: u32,
}

impl AspectRatio {
    /// Create a new aspect ratio.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns width/height as float.
    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Portrait 9:16 (TikTok, Instagram Reels)
    pub const PORTRAIT: AspectRatio = AspectRatio { width: 9, height: 16 };

    /// Square 1:1 (Instagram)
    pub const SQUARE: AspectRatio = AspectRatio { width: 1, height: 1 };

    /// Landscape 16:9 (YouTube)
    pub const LANDSCAPE: AspectRatio = AspectRatio { width: 16, height: 9 };
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::PORTRAIT
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}
