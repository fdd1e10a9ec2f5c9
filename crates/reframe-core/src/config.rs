//! Configuration for the reframing core.
//!
//! Centralizes all tunable parameters, avoiding magic numbers scattered
//! throughout the code. Out-of-range values are rejected at load time by
//! [`ReframeConfig::validate`], never silently clamped; unknown options in a
//! JSON config are ignored.

use serde::{Deserialize, Serialize};

use crate::easing::EasingType;
use crate::error::{ReframeError, ReframeResult};
use reframe_models::{AspectRatio, FrameSize};

/// Configuration for the reframing core.
///
/// All parameters have sensible defaults but can be tuned per content type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReframeConfig {
    // === Easing / Smoothing ===
    /// Interpolation profile shaping camera acceleration and deceleration.
    /// Default: ease_out
    pub easing_type: EasingType,

    /// Fraction of the remaining distance closed per frame, in (0, 1).
    /// Lower is smoother and slower.
    /// Default: 0.1
    pub smooth_factor: f64,

    /// Maximum camera speed per axis, as a multiple of
    /// `smooth_factor * frame_dimension` pixels per frame.
    /// Default: 0.25
    pub max_velocity_factor: f64,

    // === Motion Planning ===
    /// Fraction of the frame dimension the desired center may drift before
    /// the camera reacts.
    /// Default: 0.05
    pub dead_zone_percent: f64,

    /// Width of the anticipatory look-ahead window, in frames.
    /// Zero degenerates to following the immediate target only.
    /// Default: 60
    pub look_ahead_frames: usize,

    /// Blend weight of the upcoming-window centroid against the immediate
    /// target, in [0, 1]. Zero disables anticipation.
    /// Default: 0.35
    pub anticipation: f64,

    /// Per-frame weight decay inside the look-ahead window, in (0, 1].
    /// Nearer future frames influence the desired center more.
    /// Default: 0.92
    pub look_ahead_decay: f64,

    // === Quality Gate ===
    /// Per-frame sharpness threshold. Frames below it are not rejected
    /// outright; their fused confidence is scaled by
    /// `low_sharpness_penalty`.
    /// Default: 0.0 (gate disabled)
    pub min_sharpness: f64,

    /// Confidence multiplier applied on low-sharpness frames, in (0, 1].
    /// Default: 0.5
    pub low_sharpness_penalty: f64,

    /// Salient candidates whose centroid falls within this border fraction
    /// of any edge are discarded, in [0, 0.5).
    /// Default: 0.15
    pub ignore_border_percent: f64,

    // === Identity Lock ===
    /// Consecutive stable same-category frames required to acquire a lock.
    /// Default: 15
    pub min_lock_run: u32,

    /// IoU threshold for matching a candidate to the lock's last known box.
    /// Default: 0.3
    pub match_iou: f64,

    /// Centroid-proximity match radius as a fraction of frame width,
    /// in (0, 1].
    /// Default: 0.10
    pub match_radius_frac: f64,

    /// Misses after which a LOST lock enters REACQUIRING (radius expands).
    /// Default: 8
    pub reacquire_after_misses: u32,

    /// Search radius multiplier while REACQUIRING, >= 1.
    /// Default: 2.0
    pub reacquire_radius_scale: f64,

    /// Hard miss timeout after which the lock is discarded. Independent of
    /// `look_ahead_frames`. Must exceed `reacquire_after_misses`.
    /// Default: 45
    pub unlock_after_misses: u32,

    // === Framing ===
    /// Output aspect ratio.
    /// Default: 9:16 portrait
    pub aspect: AspectRatio,

    /// Vertical focus offset for body targets, as a fraction of box height
    /// from the top (head-and-shoulders framing).
    /// Default: 0.3
    pub body_head_bias: f64,

    /// Margin around the target box when deriving the desired zoom, as a
    /// fraction of box height.
    /// Default: 0.2
    pub zoom_margin: f64,

    /// Minimum zoom scale.
    /// Default: 1.0
    pub min_zoom: f64,

    /// Maximum zoom scale relative to source.
    /// Default: 3.0
    pub max_zoom: f64,
}

impl Default for ReframeConfig {
    fn default() -> Self {
        Self {
            // Easing / smoothing
            easing_type: EasingType::EaseOut,
            smooth_factor: 0.1,
            max_velocity_factor: 0.25,

            // Motion planning
            dead_zone_percent: 0.05,
            look_ahead_frames: 60,
            anticipation: 0.35,
            look_ahead_decay: 0.92,

            // Quality gate
            min_sharpness: 0.0,
            low_sharpness_penalty: 0.5,
            ignore_border_percent: 0.15,

            // Identity lock
            min_lock_run: 15,
            match_iou: 0.3,
            match_radius_frac: 0.10,
            reacquire_after_misses: 8,
            reacquire_radius_scale: 2.0,
            unlock_after_misses: 45,

            // Framing
            aspect: AspectRatio::PORTRAIT,
            body_head_bias: 0.3,
            zoom_margin: 0.2,
            min_zoom: 1.0,
            max_zoom: 3.0,
        }
    }
}

impl ReframeConfig {
    /// Configuration optimized for podcast/interview content.
    /// Slower, more stable camera with a wider dead zone.
    pub fn podcast() -> Self {
        Self {
            smooth_factor: 0.08,
            dead_zone_percent: 0.07,
            look_ahead_frames: 90,
            min_lock_run: 20,
            unlock_after_misses: 60,
            ..Default::default()
        }
    }

    /// Configuration optimized for dynamic content (vlogs, action).
    /// More responsive camera with a tighter dead zone.
    pub fn dynamic() -> Self {
        Self {
            easing_type: EasingType::SineInOut,
            smooth_factor: 0.18,
            dead_zone_percent: 0.03,
            look_ahead_frames: 30,
            min_lock_run: 8,
            reacquire_after_misses: 5,
            unlock_after_misses: 30,
            ..Default::default()
        }
    }

    /// Load from a JSON document, rejecting out-of-range values.
    ///
    /// Unknown options are ignored; missing options take their defaults.
    pub fn from_json(json: &str) -> ReframeResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all option ranges, failing fast with a descriptive message.
    pub fn validate(&self) -> ReframeResult<()> {
        if !(self.smooth_factor > 0.0 && self.smooth_factor < 1.0) {
            return Err(ReframeError::invalid_config(format!(
                "smooth_factor must be in (0, 1), got {}",
                self.smooth_factor
            )));
        }
        if !(0.0..1.0).contains(&self.dead_zone_percent) {
            return Err(ReframeError::invalid_config(format!(
                "dead_zone_percent must be in [0, 1), got {}",
                self.dead_zone_percent
            )));
        }
        if !(0.0..0.5).contains(&self.ignore_border_percent) {
            return Err(ReframeError::invalid_config(format!(
                "ignore_border_percent must be in [0, 0.5), got {}",
                self.ignore_border_percent
            )));
        }
        if !(self.low_sharpness_penalty > 0.0 && self.low_sharpness_penalty <= 1.0) {
            return Err(ReframeError::invalid_config(format!(
                "low_sharpness_penalty must be in (0, 1], got {}",
                self.low_sharpness_penalty
            )));
        }
        if self.min_sharpness < 0.0 {
            return Err(ReframeError::invalid_config(format!(
                "min_sharpness must be >= 0, got {}",
                self.min_sharpness
            )));
        }
        if !(0.0..=1.0).contains(&self.anticipation) {
            return Err(ReframeError::invalid_config(format!(
                "anticipation must be in [0, 1], got {}",
                self.anticipation
            )));
        }
        if !(self.look_ahead_decay > 0.0 && self.look_ahead_decay <= 1.0) {
            return Err(ReframeError::invalid_config(format!(
                "look_ahead_decay must be in (0, 1], got {}",
                self.look_ahead_decay
            )));
        }
        if self.max_velocity_factor <= 0.0 {
            return Err(ReframeError::invalid_config(format!(
                "max_velocity_factor must be > 0, got {}",
                self.max_velocity_factor
            )));
        }
        if self.min_lock_run == 0 {
            return Err(ReframeError::invalid_config(
                "min_lock_run must be >= 1".to_string(),
            ));
        }
        if !(self.match_iou > 0.0 && self.match_iou < 1.0) {
            return Err(ReframeError::invalid_config(format!(
                "match_iou must be in (0, 1), got {}",
                self.match_iou
            )));
        }
        if !(self.match_radius_frac > 0.0 && self.match_radius_frac <= 1.0) {
            return Err(ReframeError::invalid_config(format!(
                "match_radius_frac must be in (0, 1], got {}",
                self.match_radius_frac
            )));
        }
        if self.reacquire_radius_scale < 1.0 {
            return Err(ReframeError::invalid_config(format!(
                "reacquire_radius_scale must be >= 1, got {}",
                self.reacquire_radius_scale
            )));
        }
        if self.unlock_after_misses <= self.reacquire_after_misses {
            return Err(ReframeError::invalid_config(format!(
                "unlock_after_misses ({}) must exceed reacquire_after_misses ({})",
                self.unlock_after_misses, self.reacquire_after_misses
            )));
        }
        if !(0.0..=1.0).contains(&self.body_head_bias) {
            return Err(ReframeError::invalid_config(format!(
                "body_head_bias must be in [0, 1], got {}",
                self.body_head_bias
            )));
        }
        if self.zoom_margin < 0.0 {
            return Err(ReframeError::invalid_config(format!(
                "zoom_margin must be >= 0, got {}",
                self.zoom_margin
            )));
        }
        if !(self.min_zoom >= 1.0 && self.max_zoom >= self.min_zoom) {
            return Err(ReframeError::invalid_config(format!(
                "zoom range [{}, {}] is invalid (need 1 <= min <= max)",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.aspect.width == 0 || self.aspect.height == 0 {
            return Err(ReframeError::invalid_config(format!(
                "aspect ratio {} has a zero component",
                self.aspect
            )));
        }
        Ok(())
    }

    /// Dead zone in pixels for the given frame dimensions.
    pub fn dead_zone_pixels(&self, frame: FrameSize) -> (f64, f64) {
        (
            frame.width as f64 * self.dead_zone_percent,
            frame.height as f64 * self.dead_zone_percent,
        )
    }

    /// Maximum camera step per frame, per axis, in pixels.
    pub fn max_step_pixels(&self, frame: FrameSize) -> (f64, f64) {
        let scale = self.smooth_factor * self.max_velocity_factor;
        (frame.width as f64 * scale, frame.height as f64 * scale)
    }

    /// Lock match radius in pixels, expanded while reacquiring.
    pub fn match_radius_pixels(&self, frame: FrameSize, reacquiring: bool) -> f64 {
        let base = frame.width as f64 * self.match_radius_frac;
        if reacquiring {
            base * self.reacquire_radius_scale
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ReframeConfig::default().validate().is_ok());
        assert!(ReframeConfig::podcast().validate().is_ok());
        assert!(ReframeConfig::dynamic().validate().is_ok());
    }

    #[test]
    fn test_smooth_factor_range_rejected() {
        let mut config = ReframeConfig::default();
        config.smooth_factor = 1.0;
        assert!(config.validate().is_err());

        config.smooth_factor = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unlock_must_exceed_reacquire() {
        let mut config = ReframeConfig::default();
        config.unlock_after_misses = config.reacquire_after_misses;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_ignores_unknown_options() {
        let config = ReframeConfig::from_json(
            r#"{"smooth_factor": 0.2, "some_future_option": true}"#,
        )
        .unwrap();
        assert_eq!(config.smooth_factor, 0.2);
        assert_eq!(config.look_ahead_frames, 60); // default preserved
    }

    #[test]
    fn test_from_json_rejects_out_of_range() {
        let err = ReframeConfig::from_json(r#"{"smooth_factor": 1.5}"#).unwrap_err();
        assert!(err.to_string().contains("smooth_factor"));
    }

    #[test]
    fn test_dead_zone_pixels() {
        let config = ReframeConfig::default();
        let (dx, dy) = config.dead_zone_pixels(FrameSize::new(1920, 1080));
        assert_eq!(dx, 96.0);
        assert_eq!(dy, 54.0);
    }

    #[test]
    fn test_match_radius_expands_while_reacquiring() {
        let config = ReframeConfig::default();
        let frame = FrameSize::new(1920, 1080);
        let base = config.match_radius_pixels(frame, false);
        let expanded = config.match_radius_pixels(frame, true);
        assert!(expanded > base);
        assert_eq!(expanded, base * config.reacquire_radius_scale);
    }
}
