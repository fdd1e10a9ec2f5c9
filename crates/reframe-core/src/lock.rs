//! Identity lock state machine.
//!
//! Once the camera has committed to a subject, it should not flick to a
//! different one because of a few noisy frames. The tracker acquires a
//! lock after a stable run of frames on the same subject, tolerates
//! short detection dropouts, widens its search radius when the subject
//! has been missing for a while, and only gives the lock up after a hard
//! miss timeout.

use serde::Serialize;
use tracing::debug;

use crate::config::ReframeConfig;
use reframe_models::{BoundingBox, Category, FrameSize, FusedTarget};

/// Lock life cycle.
///
/// `Lost` and `Reacquiring` both mean "subject currently missing"; the
/// difference is how wide the tracker is willing to search for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockStatus {
    /// No committed subject
    Unlocked,
    /// Subject seen on the most recent frame
    Locked,
    /// Subject missing for a few frames; normal match radius
    Lost,
    /// Subject missing longer; match radius expanded
    Reacquiring,
}

#[derive(Debug, Clone, Copy)]
struct LockState {
    lock_id: u64,
    bbox: BoundingBox,
    category: Category,
    last_seen: usize,
    consecutive_misses: u32,
    status: LockStatus,
}

/// Acquisition run: consecutive frames on one stable subject.
#[derive(Debug, Clone, Copy)]
struct PendingLock {
    bbox: BoundingBox,
    category: Category,
    run: u32,
}

/// Read-only view of the current lock, for the target selector and for
/// per-frame diagnostics.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LockSnapshot {
    pub lock_id: u64,
    pub bbox: BoundingBox,
    pub category: Category,
    pub last_seen: usize,
    pub consecutive_misses: u32,
    pub status: LockStatus,
}

/// Tracks the identity lock across the whole clip.
///
/// `observe` is called once per frame, in order, with the frame's fused
/// target decision. The tracker never selects targets itself; it only
/// remembers which subject the clip is committed to.
pub struct LockTracker {
    config: ReframeConfig,
    frame: FrameSize,
    state: Option<LockState>,
    pending: Option<PendingLock>,
    next_lock_id: u64,
}

impl LockTracker {
    pub fn new(config: ReframeConfig, frame: FrameSize) -> Self {
        Self {
            config,
            frame,
            state: None,
            pending: None,
            next_lock_id: 1,
        }
    }

    /// Current lock view, if any subject is committed.
    pub fn snapshot(&self) -> Option<LockSnapshot> {
        self.state.map(|s| LockSnapshot {
            lock_id: s.lock_id,
            bbox: s.bbox,
            category: s.category,
            last_seen: s.last_seen,
            consecutive_misses: s.consecutive_misses,
            status: s.status,
        })
    }

    pub fn status(&self) -> LockStatus {
        self.state.map_or(LockStatus::Unlocked, |s| s.status)
    }

    /// Whether a candidate box could belong to the locked subject.
    ///
    /// A box matches on box overlap or on centroid proximity; the
    /// proximity radius widens while the lock is reacquiring. Cross
    /// category matches are accepted only as a body-to-face upgrade on
    /// an overlapping box, never the other way around and never while
    /// the subject is missing.
    pub fn matches(&self, bbox: &BoundingBox, category: Category) -> bool {
        let Some(state) = &self.state else {
            return false;
        };

        let same_category = category == state.category;
        let upgrade = state.category == Category::Body
            && category == Category::Face
            && state.status == LockStatus::Locked
            && state.bbox.iou(bbox) > 0.0;
        if !same_category && !upgrade {
            return false;
        }

        if state.bbox.iou(bbox) >= self.config.match_iou {
            return true;
        }

        let reacquiring = state.status == LockStatus::Reacquiring;
        let radius = self.config.match_radius_pixels(self.frame, reacquiring);
        state.bbox.center_distance(bbox) <= radius
    }

    /// Feed this frame's fused target decision into the state machine.
    pub fn observe(&mut self, frame_index: usize, target: Option<&FusedTarget>) {
        match target {
            Some(t) if self.state.is_some() && self.matches(&t.bbox, t.category) => {
                self.refresh(frame_index, t);
            }
            Some(t) if self.state.is_none() => {
                self.advance_pending(frame_index, t);
            }
            _ => {
                self.miss(frame_index);
            }
        }
    }

    fn refresh(&mut self, frame_index: usize, target: &FusedTarget) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.status != LockStatus::Locked {
            debug!(
                lock_id = state.lock_id,
                frame_index,
                misses = state.consecutive_misses,
                "lock re-established"
            );
        }
        state.bbox = target.bbox;
        // Body-to-face upgrade keeps the same lock identity.
        if target.category.priority() < state.category.priority() {
            state.category = target.category;
        }
        state.last_seen = frame_index;
        state.consecutive_misses = 0;
        state.status = LockStatus::Locked;
        self.pending = None;
    }

    fn advance_pending(&mut self, frame_index: usize, target: &FusedTarget) {
        // Salient regions are too unstable to commit an identity to.
        if target.category == Category::Salient {
            self.pending = None;
            return;
        }

        // Stability gate: the run continues only while frame-to-frame
        // movement stays inside the per-axis dead zone.
        let (dz_x, dz_y) = self.config.dead_zone_pixels(self.frame);
        let continues = self.pending.is_some_and(|p| {
            p.category == target.category
                && (p.bbox.cx() - target.bbox.cx()).abs() <= dz_x
                && (p.bbox.cy() - target.bbox.cy()).abs() <= dz_y
        });

        let run = match self.pending {
            Some(p) if continues => p.run + 1,
            _ => 1,
        };
        self.pending = Some(PendingLock {
            bbox: target.bbox,
            category: target.category,
            run,
        });

        if run >= self.config.min_lock_run {
            let lock_id = self.next_lock_id;
            self.next_lock_id += 1;
            self.state = Some(LockState {
                lock_id,
                bbox: target.bbox,
                category: target.category,
                last_seen: frame_index,
                consecutive_misses: 0,
                status: LockStatus::Locked,
            });
            self.pending = None;
            debug!(
                lock_id,
                frame_index,
                category = ?target.category,
                "lock acquired"
            );
        }
    }

    fn miss(&mut self, frame_index: usize) {
        self.pending = None;
        let Some(state) = self.state.as_mut() else {
            return;
        };

        state.consecutive_misses += 1;
        if state.consecutive_misses >= self.config.unlock_after_misses {
            debug!(
                lock_id = state.lock_id,
                frame_index,
                misses = state.consecutive_misses,
                "lock abandoned after miss timeout"
            );
            self.state = None;
        } else if state.consecutive_misses >= self.config.reacquire_after_misses {
            state.status = LockStatus::Reacquiring;
        } else {
            state.status = LockStatus::Lost;
        }
    }
}
