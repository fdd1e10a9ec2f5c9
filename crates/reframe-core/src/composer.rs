//! Crop composition: smoothed camera states to integer crop rectangles.
//!
//! The crop always has the exact configured aspect ratio. Rounding to
//! even pixels first would drift the ratio, so the crop is sized in
//! whole aspect units instead: width is `unit * aspect.width`, height is
//! `unit * aspect.height`, and only the placement is rounded.

use crate::config::ReframeConfig;
use crate::error::{ReframeError, ReframeResult};
use reframe_models::{CameraState, CropRect, FrameSize};

/// Converts camera states into source-frame crop rectangles.
pub struct CropComposer {
    config: ReframeConfig,
    frame: FrameSize,
}

impl CropComposer {
    pub fn new(config: ReframeConfig, frame: FrameSize) -> ReframeResult<Self> {
        // At least one whole aspect unit must fit, or no exact-ratio
        // crop exists for this frame. Also rejects zero dimensions.
        if frame.width < config.aspect.width || frame.height < config.aspect.height {
            return Err(ReframeError::InvalidFrameSize {
                width: frame.width,
                height: frame.height,
            });
        }
        Ok(Self { config, frame })
    }

    /// Compose one crop for one camera state.
    ///
    /// Deterministic: the same state always yields the same rectangle.
    pub fn compose(&self, state: &CameraState) -> CropRect {
        let aspect_w = self.config.aspect.width as f64;
        let aspect_h = self.config.aspect.height as f64;

        // Zoom scales the visible height; the unit size then caps it to
        // what actually fits inside the source frame on both axes.
        let wanted_h = self.frame.height as f64 / state.zoom.max(1.0);
        let unit = (wanted_h / aspect_h)
            .floor()
            .min((self.frame.width as f64 / aspect_w).floor())
            .min((self.frame.height as f64 / aspect_h).floor())
            .max(1.0) as u32;

        let width = unit * self.config.aspect.width;
        let height = unit * self.config.aspect.height;

        let max_x = (self.frame.width - width) as f64;
        let max_y = (self.frame.height - height) as f64;
        let x = (state.cx - width as f64 / 2.0).round().clamp(0.0, max_x) as u32;
        let y = (state.cy - height as f64 / 2.0).round().clamp(0.0, max_y) as u32;

        CropRect {
            frame_index: state.frame_index,
            x,
            y,
            width,
            height,
        }
    }

    /// Compose the whole trajectory.
    pub fn compose_all(&self, states: &[CameraState]) -> Vec<CropRect> {
        states.iter().map(|s| self.compose(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reframe_models::AspectRatio;

    const FRAME: FrameSize = FrameSize {
        width: 1920,
        height: 1080,
    };

    fn composer() -> CropComposer {
        CropComposer::new(ReframeConfig::default(), FRAME).unwrap()
    }

    #[test]
    fn test_rejects_zero_frame() {
        assert!(CropComposer::new(ReframeConfig::default(), FrameSize::new(0, 1080)).is_err());
    }

    #[test]
    fn test_rejects_frame_smaller_than_one_aspect_unit() {
        // 8 px wide cannot hold a single 9:16 unit.
        assert!(CropComposer::new(ReframeConfig::default(), FrameSize::new(8, 1080)).is_err());
        assert!(CropComposer::new(ReframeConfig::default(), FrameSize::new(1920, 15)).is_err());
    }

    #[test]
    fn test_minimal_frame_composes_without_clipping() {
        let composer =
            CropComposer::new(ReframeConfig::default(), FrameSize::new(9, 16)).unwrap();
        for zoom in [1.0, 3.0] {
            let crop = composer.compose(&CameraState::new(0, 4.5, 8.0, zoom));
            assert_eq!((crop.x, crop.y), (0, 0));
            assert_eq!((crop.width, crop.height), (9, 16));
        }
    }

    #[test]
    fn test_aspect_ratio_is_exact() {
        let composer = composer();
        for zoom in [1.0, 1.3, 2.0, 2.7, 3.0] {
            let crop = composer.compose(&CameraState::new(0, 960.0, 540.0, zoom));
            assert_eq!(crop.width % 9, 0);
            assert_eq!(crop.height % 16, 0);
            assert_eq!(crop.width / 9, crop.height / 16);
        }
    }

    #[test]
    fn test_full_height_at_unit_zoom() {
        let crop = composer().compose(&CameraState::new(0, 960.0, 540.0, 1.0));
        // 1080 / 16 = 67 units: 603x1072 is the tallest exact 9:16 crop.
        assert_eq!(crop.width, 603);
        assert_eq!(crop.height, 1072);
    }

    #[test]
    fn test_centered_on_camera() {
        let crop = composer().compose(&CameraState::new(0, 960.0, 540.0, 1.0));
        let cx = crop.x as f64 + crop.width as f64 / 2.0;
        assert!((cx - 960.0).abs() <= 1.0);
    }

    #[test]
    fn test_clamped_inside_frame() {
        let composer = composer();
        for cx in [-500.0, 0.0, 10.0, 1900.0, 3000.0] {
            let crop = composer.compose(&CameraState::new(0, cx, 540.0, 1.0));
            assert!(crop.x + crop.width <= FRAME.width);
            assert!(crop.y + crop.height <= FRAME.height);
        }
    }

    #[test]
    fn test_zoom_shrinks_crop() {
        let composer = composer();
        let wide = composer.compose(&CameraState::new(0, 960.0, 540.0, 1.0));
        let tight = composer.compose(&CameraState::new(0, 960.0, 540.0, 2.0));
        assert!(tight.height < wide.height);
        assert!(tight.width < wide.width);
    }

    #[test]
    fn test_square_aspect() {
        let mut config = ReframeConfig::default();
        config.aspect = AspectRatio::SQUARE;
        let composer = CropComposer::new(config, FRAME).unwrap();

        let crop = composer.compose(&CameraState::new(0, 960.0, 540.0, 1.0));
        assert_eq!(crop.width, crop.height);
        assert_eq!(crop.height, 1080);
    }

    #[test]
    fn test_deterministic() {
        let composer = composer();
        let state = CameraState::new(7, 812.3, 451.9, 1.73);
        assert_eq!(composer.compose(&state), composer.compose(&state));
    }
}
