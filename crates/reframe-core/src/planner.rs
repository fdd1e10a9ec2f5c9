//! Desired-camera planning: look-ahead anticipation and dead-zone
//! hysteresis.
//!
//! The planner turns the per-frame target decisions into a desired
//! camera trajectory. It is the second pass of the pipeline: it reads
//! future target decisions through a look-ahead window, so the first
//! pass must have finished for the whole clip before planning starts.
//! Output here is the camera the clip *wants*; the smoothing engine
//! decides how fast the actual camera gets there.

use tracing::debug;

use crate::config::ReframeConfig;
use reframe_models::{CameraState, FrameSize, FusedTarget};

/// Plans the desired camera trajectory over a whole clip.
pub struct MotionPlanner {
    config: ReframeConfig,
    frame: FrameSize,
}

impl MotionPlanner {
    pub fn new(config: ReframeConfig, frame: FrameSize) -> Self {
        Self { config, frame }
    }

    /// Produce one desired camera state per frame.
    ///
    /// `targets` holds the fused decision for every frame in order,
    /// `None` where no target was eligible; `start_index` is the source
    /// index of the first entry.
    pub fn plan(&self, start_index: usize, targets: &[Option<FusedTarget>]) -> Vec<CameraState> {
        let (dz_x, dz_y) = self.config.dead_zone_pixels(self.frame);
        let fallback = (
            self.frame.width as f64 / 2.0,
            self.frame.height as f64 / 2.0,
        );

        let mut desired = Vec::with_capacity(targets.len());
        let mut last_center = fallback;
        let mut anchor: Option<(f64, f64)> = None;
        let mut zoom = self.config.min_zoom;

        for (i, target) in targets.iter().enumerate() {
            // Gaps hold the last planned center instead of snapping back
            // to the frame middle.
            let immediate = match target {
                Some(t) => t.focus_center(self.config.body_head_bias),
                None => last_center,
            };
            last_center = immediate;

            let raw = match self.window_centroid(targets, i) {
                Some(ahead) if self.config.anticipation > 0.0 => {
                    let a = self.config.anticipation;
                    (
                        immediate.0 * (1.0 - a) + ahead.0 * a,
                        immediate.1 * (1.0 - a) + ahead.1 * a,
                    )
                }
                _ => immediate,
            };

            // Per-axis dead zone: the anchor moves only when the raw
            // desired center escapes it, so detection jitter inside the
            // band produces a perfectly still camera.
            let (ax, ay) = match anchor {
                None => raw,
                Some((ax, ay)) => (
                    if (raw.0 - ax).abs() > dz_x { raw.0 } else { ax },
                    if (raw.1 - ay).abs() > dz_y { raw.1 } else { ay },
                ),
            };
            anchor = Some((ax, ay));

            if let Some(t) = target {
                zoom = self.desired_zoom(t);
            }

            desired.push(CameraState::new(start_index + i, ax, ay, zoom));
        }

        debug!(
            frames = desired.len(),
            look_ahead = self.config.look_ahead_frames,
            "planned desired trajectory"
        );
        desired
    }

    /// Decay-weighted centroid of upcoming focus centers, starting at the
    /// current frame. `None` when the whole window is empty.
    fn window_centroid(
        &self,
        targets: &[Option<FusedTarget>],
        start: usize,
    ) -> Option<(f64, f64)> {
        if self.config.look_ahead_frames == 0 {
            return None;
        }
        let end = (start + self.config.look_ahead_frames + 1).min(targets.len());

        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut sum_w = 0.0;
        let mut weight = 1.0;
        for target in &targets[start..end] {
            if let Some(t) = target {
                let (cx, cy) = t.focus_center(self.config.body_head_bias);
                sum_x += cx * weight;
                sum_y += cy * weight;
                sum_w += weight;
            }
            weight *= self.config.look_ahead_decay;
        }

        (sum_w > 0.0).then(|| (sum_x / sum_w, sum_y / sum_w))
    }

    /// Zoom that frames the target box with the configured margin.
    fn desired_zoom(&self, target: &FusedTarget) -> f64 {
        let wanted = target.bbox.height * (1.0 + 2.0 * self.config.zoom_margin);
        if wanted <= 0.0 {
            return self.config.min_zoom;
        }
        (self.frame.height as f64 / wanted).clamp(self.config.min_zoom, self.config.max_zoom)
    }
}
