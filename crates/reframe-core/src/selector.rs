//! Per-frame target selection.
//!
//! Fuses one frame's normalized candidates into at most one target. The
//! category order Face > Body > Salient is absolute: a low-confidence
//! face still beats a high-confidence salient region. Within the winning
//! category, candidates that match the active identity lock beat higher
//! scores, so a committed subject is never dropped for a louder one of
//! the same kind. A face overlapping a body lock inherits that lock
//! instead of fighting it.

use tracing::trace;

use crate::config::ReframeConfig;
use crate::lock::LockTracker;
use crate::normalizer::FrameCandidates;
use reframe_models::{Candidate, Category, FrameSize, FusedTarget};

// Scores within this distance are a tie and fall through to the
// proximity tie-break, keeping selection deterministic across platforms.
const SCORE_EPSILON: f64 = 1e-9;

/// Selects one target per frame from normalized candidates.
pub struct TargetSelector {
    config: ReframeConfig,
    frame: FrameSize,
}

impl TargetSelector {
    pub fn new(config: ReframeConfig, frame: FrameSize) -> Self {
        Self { config, frame }
    }

    /// Decide this frame's target.
    ///
    /// `prev_center` is the previous frame's focus center, used only to
    /// break score ties in favor of the nearer candidate.
    pub fn select(
        &self,
        frame: &FrameCandidates,
        lock: &LockTracker,
        prev_center: Option<(f64, f64)>,
    ) -> Option<FusedTarget> {
        let eligible: Vec<&Candidate> = frame
            .candidates
            .iter()
            .filter(|c| self.is_eligible(c))
            .collect();
        if eligible.is_empty() {
            return None;
        }

        let penalty = if frame.sharpness < self.config.min_sharpness {
            self.config.low_sharpness_penalty
        } else {
            1.0
        };

        // Category partition comes first: any face present narrows the
        // frame to faces before the lock is consulted.
        let top_priority = eligible.iter().map(|c| c.category.priority()).min()?;
        let in_category: Vec<&Candidate> = eligible
            .into_iter()
            .filter(|c| c.category.priority() == top_priority)
            .collect();

        // Within the winning category, lock matches beat score.
        let lock_matches = in_category
            .iter()
            .copied()
            .filter(|c| lock.matches(&c.bbox, c.category));

        let (chosen, lock_id) = match self.pick(lock_matches, penalty, prev_center) {
            Some(best) => (best, lock.snapshot().map(|s| s.lock_id)),
            None => (
                self.pick(in_category.iter().copied(), penalty, prev_center)?,
                None,
            ),
        };

        trace!(
            frame_index = frame.frame_index,
            category = ?chosen.category,
            locked = lock_id.is_some(),
            "target selected"
        );

        Some(FusedTarget {
            frame_index: frame.frame_index,
            bbox: chosen.bbox,
            category: chosen.category,
            confidence: chosen.confidence * penalty,
            lock_id,
        })
    }

    fn is_eligible(&self, candidate: &Candidate) -> bool {
        if candidate.bbox.width <= 0.0 || candidate.bbox.height <= 0.0 {
            return false;
        }
        if candidate.confidence <= 0.0 {
            return false;
        }
        // Edge-hugging salient regions are usually letterbox bars, logos
        // or burned-in captions rather than subjects.
        if candidate.category == Category::Salient {
            let margin_x = self.frame.width as f64 * self.config.ignore_border_percent;
            let margin_y = self.frame.height as f64 * self.config.ignore_border_percent;
            let (cx, cy) = (candidate.bbox.cx(), candidate.bbox.cy());
            if cx < margin_x
                || cx > self.frame.width as f64 - margin_x
                || cy < margin_y
                || cy > self.frame.height as f64 - margin_y
            {
                return false;
            }
        }
        true
    }

    /// Best candidate by confidence-times-area score; near-ties go to the
    /// candidate closest to the previous focus center.
    fn pick<'a>(
        &self,
        candidates: impl Iterator<Item = &'a Candidate>,
        penalty: f64,
        prev_center: Option<(f64, f64)>,
    ) -> Option<&'a Candidate> {
        let (anchor_x, anchor_y) = prev_center.unwrap_or((
            self.frame.width as f64 / 2.0,
            self.frame.height as f64 / 2.0,
        ));
        let frame_area = self.frame.area() as f64;

        let mut best: Option<(&Candidate, f64, f64)> = None;
        for candidate in candidates {
            let score = candidate.confidence * penalty * (candidate.bbox.area() / frame_area);
            let dx = candidate.bbox.cx() - anchor_x;
            let dy = candidate.bbox.cy() - anchor_y;
            let dist = (dx * dx + dy * dy).sqrt();

            let better = match best {
                None => true,
                Some((_, best_score, best_dist)) => {
                    if (score - best_score).abs() <= SCORE_EPSILON {
                        dist < best_dist
                    } else {
                        score > best_score
                    }
                }
            };
            if better {
                best = Some((candidate, score, dist));
            }
        }
        best.map(|(c, _, _)| c)
    }
}
