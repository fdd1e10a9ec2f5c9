//! Shared data models for the auto-reframe pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Detection candidates and per-frame fused targets
//! - Virtual camera state and crop rectangles
//! - Geometry primitives (bounding boxes, aspect ratios)

pub mod camera;
pub mod geometry;
pub mod target;

// Re-export common types
pub use camera::{CameraState, CropRect};
pub use geometry::{AspectRatio, BoundingBox, FrameSize};
pub use target::{Candidate, Category, FusedTarget};
