#![deny(unreachable_patterns)]
//! Decision and motion-planning core for automatic vertical reframing.
//!
//! This crate provides:
//! - Detector output normalization with frame-order validation
//! - Per-frame target selection (Face > Body > Salient, lock-aware)
//! - An identity lock state machine with dropout tolerance
//! - Look-ahead motion planning with dead-zone hysteresis
//! - Monotone easing profiles and per-frame camera smoothing
//! - Exact-aspect crop composition
//!
//! The [`pipeline::ReframePipeline`] ties the stages together as two
//! strictly ordered passes over the clip.

pub mod composer;
pub mod config;
pub mod easing;
pub mod error;
pub mod lock;
pub mod normalizer;
pub mod pipeline;
pub mod planner;
pub mod selector;

pub use composer::CropComposer;
pub use config::ReframeConfig;
pub use easing::{CameraSmoother, EasingType};
pub use error::{ReframeError, ReframeResult};
pub use lock::{LockSnapshot, LockStatus, LockTracker};
pub use normalizer::{normalize, DetectorOutput, FrameCandidates, FrameObservations};
pub use pipeline::{CancelToken, FrameDiagnostics, ReframeOutput, ReframePipeline};
pub use planner::MotionPlanner;
pub use selector::TargetSelector;

// Shared model types, re-exported so pipeline callers need one import.
pub use reframe_models::{
    AspectRatio, BoundingBox, CameraState, Candidate, Category, CropRect, FrameSize, FusedTarget,
};
