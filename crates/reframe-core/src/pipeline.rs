//! Two-pass reframing pipeline.
//!
//! Pass one walks the clip in order, fusing detections into per-frame
//! target decisions and feeding the identity lock. Pass two plans the
//! desired trajectory (which reads future decisions through the
//! look-ahead window, so pass one must be complete), smooths it, and
//! composes the final crop rectangles. The passes never interleave.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::composer::CropComposer;
use crate::config::ReframeConfig;
use crate::easing::CameraSmoother;
use crate::error::{ReframeError, ReframeResult};
use crate::lock::{LockSnapshot, LockTracker};
use crate::normalizer::{self, FrameObservations};
use crate::planner::MotionPlanner;
use crate::selector::TargetSelector;
use reframe_models::{AspectRatio, CameraState, CropRect, FrameSize, FusedTarget};

/// Cooperative cancellation handle.
///
/// Checked between frames; a cancelled run returns an error and discards
/// all partial output.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn check(&self) -> ReframeResult<()> {
        if self.is_cancelled() {
            Err(ReframeError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Everything the pipeline decided about one frame, for tuning and
/// debugging. Serializes to JSON next to the crop plan.
#[derive(Debug, Clone, Serialize)]
pub struct FrameDiagnostics {
    pub frame_index: usize,
    pub target: Option<FusedTarget>,
    pub lock: Option<LockSnapshot>,
    pub desired: CameraState,
    pub actual: CameraState,
}

/// Final crop plan for a clip.
#[derive(Debug, Clone, Serialize)]
pub struct ReframeOutput {
    /// One crop per input frame, in frame order
    pub crops: Vec<CropRect>,
    /// Output aspect ratio the crops honor
    pub aspect: AspectRatio,
    /// Source frame dimensions
    pub frame: FrameSize,
    /// Per-frame decision trace, when requested
    pub diagnostics: Option<Vec<FrameDiagnostics>>,
}

/// The reframing pipeline for one source video.
pub struct ReframePipeline {
    config: ReframeConfig,
    frame: FrameSize,
}

impl ReframePipeline {
    /// Create a pipeline, validating the configuration and frame size.
    pub fn new(config: ReframeConfig, frame: FrameSize) -> ReframeResult<Self> {
        config.validate()?;
        if frame.width == 0 || frame.height == 0 {
            return Err(ReframeError::InvalidFrameSize {
                width: frame.width,
                height: frame.height,
            });
        }
        Ok(Self { config, frame })
    }

    /// Plan crops for a clip.
    pub fn run(
        &self,
        observations: &[FrameObservations],
        cancel: &CancelToken,
    ) -> ReframeResult<ReframeOutput> {
        self.execute(observations, cancel, false)
    }

    /// Plan crops and keep the per-frame decision trace.
    pub fn run_with_diagnostics(
        &self,
        observations: &[FrameObservations],
        cancel: &CancelToken,
    ) -> ReframeResult<ReframeOutput> {
        self.execute(observations, cancel, true)
    }

    fn execute(
        &self,
        observations: &[FrameObservations],
        cancel: &CancelToken,
        with_diagnostics: bool,
    ) -> ReframeResult<ReframeOutput> {
        let frames = normalizer::normalize(observations)?;
        let start_index = frames[0].frame_index;

        info!(
            frames = frames.len(),
            width = self.frame.width,
            height = self.frame.height,
            aspect = %self.config.aspect,
            "reframe pipeline started"
        );

        // Pass one: sequential target decisions and lock bookkeeping.
        let selector = TargetSelector::new(self.config.clone(), self.frame);
        let mut lock = LockTracker::new(self.config.clone(), self.frame);
        let mut targets: Vec<Option<FusedTarget>> = Vec::with_capacity(frames.len());
        let mut locks: Vec<Option<LockSnapshot>> = Vec::with_capacity(frames.len());
        let mut prev_center: Option<(f64, f64)> = None;

        for frame in &frames {
            cancel.check()?;
            let target = selector.select(frame, &lock, prev_center);
            lock.observe(frame.frame_index, target.as_ref());
            if let Some(t) = &target {
                prev_center = Some(t.focus_center(self.config.body_head_bias));
            }
            locks.push(lock.snapshot());
            targets.push(target);
        }
        info!(
            targeted = targets.iter().filter(|t| t.is_some()).count(),
            "target selection pass complete"
        );

        // Pass two: plan, smooth, compose.
        let planner = MotionPlanner::new(self.config.clone(), self.frame);
        let desired = planner.plan(start_index, &targets);

        let composer = CropComposer::new(self.config.clone(), self.frame)?;
        let mut smoother = CameraSmoother::new(self.config.clone(), self.frame, &desired[0]);
        let mut actual = desired[0];

        let mut crops = Vec::with_capacity(desired.len());
        let mut diagnostics = with_diagnostics.then(|| Vec::with_capacity(desired.len()));

        for (i, want) in desired.iter().enumerate() {
            cancel.check()?;
            actual = smoother.advance(&actual, want);
            crops.push(composer.compose(&actual));

            if let Some(diag) = diagnostics.as_mut() {
                diag.push(FrameDiagnostics {
                    frame_index: want.frame_index,
                    target: targets[i],
                    lock: locks[i],
                    desired: *want,
                    actual,
                });
            }
        }

        info!(crops = crops.len(), "reframe pipeline complete");
        Ok(ReframeOutput {
            crops,
            aspect: self.config.aspect,
            frame: self.frame,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::DetectorOutput;
    use reframe_models::BoundingBox;

    const FRAME: FrameSize = FrameSize {
        width: 1920,
        height: 1080,
    };

    fn face_frames(count: usize, cx: f64) -> Vec<FrameObservations> {
        (0..count)
            .map(|i| {
                FrameObservations::new(
                    i,
                    vec![DetectorOutput::Face {
                        bbox: BoundingBox::new(cx - 100.0, 440.0, 200.0, 200.0),
                        confidence: 0.9,
                        track_id: Some(1),
                    }],
                    100.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_one_crop_per_frame() {
        let pipeline = ReframePipeline::new(ReframeConfig::default(), FRAME).unwrap();
        let output = pipeline.run(&face_frames(90, 960.0), &CancelToken::new()).unwrap();

        assert_eq!(output.crops.len(), 90);
        assert!(output.diagnostics.is_none());
        for (i, crop) in output.crops.iter().enumerate() {
            assert_eq!(crop.frame_index, i);
            assert!(crop.x + crop.width <= FRAME.width);
            assert!(crop.y + crop.height <= FRAME.height);
        }
    }

    #[test]
    fn test_diagnostics_aligned_with_crops() {
        let pipeline = ReframePipeline::new(ReframeConfig::default(), FRAME).unwrap();
        let output = pipeline
            .run_with_diagnostics(&face_frames(60, 700.0), &CancelToken::new())
            .unwrap();

        let diagnostics = output.diagnostics.unwrap();
        assert_eq!(diagnostics.len(), output.crops.len());
        for (diag, crop) in diagnostics.iter().zip(&output.crops) {
            assert_eq!(diag.frame_index, crop.frame_index);
            assert!(diag.target.is_some());
        }
        // Decision trace must serialize for offline inspection.
        serde_json::to_string(&diagnostics[0]).unwrap();
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        let mut config = ReframeConfig::default();
        config.smooth_factor = 0.0;
        assert!(ReframePipeline::new(config, FRAME).is_err());
    }

    #[test]
    fn test_zero_frame_size_rejected() {
        assert!(ReframePipeline::new(ReframeConfig::default(), FrameSize::new(1920, 0)).is_err());
    }

    #[test]
    fn test_cancellation_discards_output() {
        let pipeline = ReframePipeline::new(ReframeConfig::default(), FRAME).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        match pipeline.run(&face_frames(30, 960.0), &cancel) {
            Err(ReframeError::Cancelled) => {}
            other => panic!("expected Cancelled, got {:?}", other.map(|o| o.crops.len())),
        }
    }

    #[test]
    fn test_empty_clip_rejected() {
        let pipeline = ReframePipeline::new(ReframeConfig::default(), FRAME).unwrap();
        assert!(matches!(
            pipeline.run(&[], &CancelToken::new()),
            Err(ReframeError::EmptyInput)
        ));
    }
}
