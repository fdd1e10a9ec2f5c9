//! Easing profiles and the per-frame camera smoothing engine.
//!
//! Every profile satisfies f(0) = 0, f(1) = 1 and is monotonic on [0, 1],
//! so the camera never overshoots or reverses within a single easing
//! segment. The engine is a pure per-frame state transition:
//! `new state = f(previous state, desired state)`.

use serde::{Deserialize, Serialize};

use crate::config::ReframeConfig;
use reframe_models::{CameraState, FrameSize};

/// Interpolation profile shaping camera acceleration/deceleration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Constant speed
    Linear,
    /// Accelerating (quadratic)
    EaseIn,
    /// Decelerating (quadratic)
    EaseOut,
    /// Accelerate then decelerate (quadratic)
    EaseInOut,
    /// Gentle accelerate/decelerate (sinusoidal)
    SineInOut,
    /// Slow start, sharp late acceleration (exponential)
    Exponential,
    /// Settling arcs. Monotone rendition: the classic bounce reverses
    /// direction, which would overshoot; this one decelerates into each
    /// arc boundary without ever moving backward.
    Bounce,
}

// Bounce arc boundaries: (progress, weight) knots of three shrinking arcs.
const BOUNCE_KNOTS: [(f64, f64); 4] = [(0.0, 0.0), (0.55, 0.70), (0.80, 0.92), (1.0, 1.0)];

impl EasingType {
    /// Map normalized progress to an interpolation weight in [0, 1].
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::Linear => t,
            EasingType::EaseIn => t * t,
            EasingType::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            EasingType::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
            EasingType::SineInOut => 0.5 * (1.0 - (std::f64::consts::PI * t).cos()),
            EasingType::Exponential => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else {
                    // Normalized 2^(10t-10) so the endpoints are exact.
                    let floor = (-10.0f64).exp2();
                    ((10.0 * t - 10.0).exp2() - floor) / (1.0 - floor)
                }
            }
            EasingType::Bounce => {
                for window in BOUNCE_KNOTS.windows(2) {
                    let (t0, v0) = window[0];
                    let (t1, v1) = window[1];
                    if t <= t1 {
                        let s = (t - t0) / (t1 - t0);
                        // Quadratic ease-out within each arc
                        return v0 + (v1 - v0) * (1.0 - (1.0 - s) * (1.0 - s));
                    }
                }
                1.0
            }
        }
    }
}

// Gain floor keeps ease-in shapes from stalling at segment start, where
// profile(0) = 0. Effective gain stays within (0, smooth_factor].
const GAIN_FLOOR: f64 = 0.25;

/// One axis of easing state: the segment the camera is currently easing
/// along. A new segment begins whenever the desired value moves.
#[derive(Debug, Clone, Copy)]
struct AxisSegment {
    start: f64,
    target: f64,
}

impl AxisSegment {
    fn new(value: f64) -> Self {
        Self {
            start: value,
            target: value,
        }
    }

    /// Advance one frame toward `desired`, returning (new value, step).
    fn advance(&mut self, current: f64, desired: f64, profile: EasingType, smooth_factor: f64, max_step: f64) -> (f64, f64) {
        if (desired - self.target).abs() > f64::EPSILON {
            // Dead-zone target moved: start a new easing segment here.
            self.start = current;
            self.target = desired;
        }

        let remaining = self.target - current;
        let span = (self.target - self.start).abs();
        let progress = if span > f64::EPSILON {
            (1.0 - remaining.abs() / span).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let weight = profile.apply(progress);
        let gain = smooth_factor * (GAIN_FLOOR + (1.0 - GAIN_FLOOR) * weight);
        let mut step = remaining * gain;

        // Velocity clamp: bounded even when the desired position jumps.
        if step.abs() > max_step {
            step = max_step.copysign(step);
        }
        // Never step past the target.
        if step.abs() > remaining.abs() {
            step = remaining;
        }

        (current + step, step)
    }
}

/// Per-frame camera smoothing engine.
///
/// Integrates the desired position into the actual camera position over
/// time. Zoom follows the same mechanism independently of position.
pub struct CameraSmoother {
    config: ReframeConfig,
    frame: FrameSize,
    x: AxisSegment,
    y: AxisSegment,
    zoom: AxisSegment,
}

impl CameraSmoother {
    /// Create a smoothing engine starting at the given camera state.
    pub fn new(config: ReframeConfig, frame: FrameSize, initial: &CameraState) -> Self {
        Self {
            config,
            frame,
            x: AxisSegment::new(initial.cx),
            y: AxisSegment::new(initial.cy),
            zoom: AxisSegment::new(initial.zoom),
        }
    }

    /// Advance one frame: previous actual state + desired state -> new state.
    pub fn advance(&mut self, prev: &CameraState, desired: &CameraState) -> CameraState {
        let profile = self.config.easing_type;
        let alpha = self.config.smooth_factor;
        let (max_step_x, max_step_y) = self.config.max_step_pixels(self.frame);

        let (cx, vx) = self.x.advance(prev.cx, desired.cx, profile, alpha, max_step_x);
        let (cy, vy) = self.y.advance(prev.cy, desired.cy, profile, alpha, max_step_y);

        // Zoom has no pixel velocity bound; the gain alone keeps it smooth.
        let (zoom, _) = self
            .zoom
            .advance(prev.zoom, desired.zoom, profile, alpha, f64::INFINITY);

        CameraState {
            frame_index: desired.frame_index,
            cx,
            cy,
            zoom: zoom.clamp(self.config.min_zoom, self.config.max_zoom),
            vx,
            vy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PROFILES: [EasingType; 7] = [
        EasingType::Linear,
        EasingType::EaseIn,
        EasingType::EaseOut,
        EasingType::EaseInOut,
        EasingType::SineInOut,
        EasingType::Exponential,
        EasingType::Bounce,
    ];

    #[test]
    fn test_profiles_hit_endpoints() {
        for profile in ALL_PROFILES {
            assert!(
                profile.apply(0.0).abs() < 1e-12,
                "{:?} must start at 0",
                profile
            );
            assert!(
                (profile.apply(1.0) - 1.0).abs() < 1e-12,
                "{:?} must end at 1",
                profile
            );
        }
    }

    #[test]
    fn test_profiles_are_monotonic() {
        for profile in ALL_PROFILES {
            let mut prev = 0.0;
            for i in 0..=1000 {
                let t = i as f64 / 1000.0;
                let v = profile.apply(t);
                assert!(
                    v >= prev - 1e-12,
                    "{:?} reversed at t={}: {} < {}",
                    profile,
                    t,
                    v,
                    prev
                );
                prev = v;
            }
        }
    }

    #[test]
    fn test_smoother_converges_without_overshoot() {
        let frame = FrameSize::new(1920, 1080);
        for profile in ALL_PROFILES {
            let mut config = ReframeConfig::default();
            config.easing_type = profile;

            let mut state = CameraState::new(0, 400.0, 540.0, 1.0);
            let mut smoother = CameraSmoother::new(config, frame, &state);

            let mut prev_cx = state.cx;
            for i in 1..400 {
                let desired = CameraState::new(i, 1200.0, 540.0, 1.0);
                state = smoother.advance(&state, &desired);

                assert!(
                    state.cx >= prev_cx - 1e-9,
                    "{:?} reversed at frame {}",
                    profile,
                    i
                );
                assert!(state.cx <= 1200.0 + 1e-9, "{:?} overshot", profile);
                prev_cx = state.cx;
            }

            assert!(
                (state.cx - 1200.0).abs() < 2.0,
                "{:?} did not converge: {}",
                profile,
                state.cx
            );
        }
    }

    #[test]
    fn test_velocity_clamp_on_jump() {
        let frame = FrameSize::new(1920, 1080);
        let config = ReframeConfig::default();
        let (max_step_x, _) = config.max_step_pixels(frame);

        let mut state = CameraState::new(0, 100.0, 540.0, 1.0);
        let mut smoother = CameraSmoother::new(config, frame, &state);

        // Desired position jumps far away (e.g. after lock re-acquisition)
        let desired = CameraState::new(1, 1800.0, 540.0, 1.0);
        state = smoother.advance(&state, &desired);

        assert!(state.vx.abs() <= max_step_x + 1e-9);
        assert!((state.cx - 100.0).abs() <= max_step_x + 1e-9);
    }

    #[test]
    fn test_zoom_follows_independently() {
        let frame = FrameSize::new(1920, 1080);
        let config = ReframeConfig::default();

        let mut state = CameraState::new(0, 960.0, 540.0, 1.0);
        let mut smoother = CameraSmoother::new(config, frame, &state);

        for i in 1..200 {
            let desired = CameraState::new(i, 960.0, 540.0, 2.0);
            state = smoother.advance(&state, &desired);
            assert!(state.zoom <= 2.0 + 1e-9);
        }
        assert!((state.zoom - 2.0).abs() < 0.05);
        assert_eq!(state.cx, 960.0);
    }

    #[test]
    fn test_easing_type_serde_names() {
        let json = serde_json::to_string(&EasingType::SineInOut).unwrap();
        assert_eq!(json, "\"sine_in_out\"");
        let back: EasingType = serde_json::from_str("\"ease_in_out\"").unwrap();
        assert_eq!(back, EasingType::EaseInOut);
    }
}
