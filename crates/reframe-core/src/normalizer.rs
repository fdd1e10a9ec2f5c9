//! Detection normalization boundary.
//!
//! Detectors produce heterogeneous outputs (different geometries,
//! confidence semantics). This module converts them into one common
//! per-frame [`Candidate`] representation: a tagged variant over category,
//! not a shared base type hierarchy.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReframeError, ReframeResult};
use reframe_models::{BoundingBox, Candidate, Category};

/// One raw detector output, tagged by category.
///
/// Face and body detectors may carry a detector-native track id; the
/// saliency detector never does.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectorOutput {
    Face {
        bbox: BoundingBox,
        confidence: f64,
        track_id: Option<u32>,
    },
    Body {
        bbox: BoundingBox,
        confidence: f64,
        track_id: Option<u32>,
    },
    Salient {
        bbox: BoundingBox,
        confidence: f64,
    },
}

/// Everything the detector ensemble reports for one frame.
///
/// Detectors may omit detections for a frame but must not skip frame
/// indices. Sharpness is a frame-level scalar computed externally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameObservations {
    /// Source frame index
    pub frame_index: usize,
    /// Raw detector outputs for this frame (possibly empty)
    pub outputs: Vec<DetectorOutput>,
    /// Frame-level sharpness scalar for the quality gate
    pub sharpness: f64,
}

impl FrameObservations {
    /// Create observations for one frame.
    pub fn new(frame_index: usize, outputs: Vec<DetectorOutput>, sharpness: f64) -> Self {
        Self {
            frame_index,
            outputs,
            sharpness,
        }
    }

    /// A frame with no detections at all.
    pub fn empty(frame_index: usize, sharpness: f64) -> Self {
        Self::new(frame_index, Vec::new(), sharpness)
    }
}

/// Candidates for one frame after normalization.
#[derive(Debug, Clone)]
pub struct FrameCandidates {
    pub frame_index: usize,
    pub candidates: Vec<Candidate>,
    pub sharpness: f64,
}

/// Validate frame ordering and normalize detector outputs to candidates.
///
/// Frame indices must be contiguous and ascending from the first observed
/// index; anything else is a defect in the detector collaborator and is
/// rejected rather than silently reordered. The per-frame mapping is
/// stateless and runs in parallel; results come back in frame order.
pub fn normalize(observations: &[FrameObservations]) -> ReframeResult<Vec<FrameCandidates>> {
    if observations.is_empty() {
        return Err(ReframeError::EmptyInput);
    }

    let first = observations[0].frame_index;
    for (offset, obs) in observations.iter().enumerate() {
        let expected = first + offset;
        if obs.frame_index != expected {
            return Err(ReframeError::NonMonotonicInput {
                expected,
                got: obs.frame_index,
            });
        }
    }

    let frames: Vec<FrameCandidates> = observations
        .par_iter()
        .map(normalize_frame)
        .collect();

    debug!(
        frames = frames.len(),
        candidates = frames.iter().map(|f| f.candidates.len()).sum::<usize>(),
        "normalized detector observations"
    );

    Ok(frames)
}

fn normalize_frame(obs: &FrameObservations) -> FrameCandidates {
    let candidates = obs
        .outputs
        .iter()
        .map(|output| match *output {
            DetectorOutput::Face {
                bbox,
                confidence,
                track_id,
            } => Candidate::new(obs.frame_index, bbox, clamp_confidence(confidence), Category::Face, track_id),
            DetectorOutput::Body {
                bbox,
                confidence,
                track_id,
            } => Candidate::new(obs.frame_index, bbox, clamp_confidence(confidence), Category::Body, track_id),
            DetectorOutput::Salient { bbox, confidence } => {
                Candidate::new(obs.frame_index, bbox, clamp_confidence(confidence), Category::Salient, None)
            }
        })
        .collect();

    FrameCandidates {
        frame_index: obs.frame_index,
        candidates,
        sharpness: obs.sharpness,
    }
}

// Detector confidence semantics differ; the common representation is [0, 1].
fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
