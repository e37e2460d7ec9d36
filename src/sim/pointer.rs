//! Pointer tracking
//!
//! Pointer samples arrive between frames from the input layer. Besides the
//! live position this keeps a short trail for drawing, a rolling one-second
//! history for the camping halo, the previous sample for the speed refund, and
//! the anchor for the exact-stillness check.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Timestamped pointer sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub pos: Vec2,
    /// ms
    pub at: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointerState {
    /// Canvas-space position (last known, even while inactive)
    pub position: Vec2,
    /// Pointer is over the canvas
    pub active: bool,
    /// Recent positions, oldest first
    pub trail: VecDeque<Vec2>,
    /// Samples from roughly the last second
    history: VecDeque<Sample>,
    /// Previous raw sample, kept across leave events
    last_sample: Option<Sample>,
    /// Rounded position seen at the last frame that did not count as still
    still_anchor: Option<Vec2>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer sample and return the penalty refund (seconds) earned
    /// by moving faster than the speed threshold since the previous sample.
    pub fn moved(&mut self, pos: Vec2, now: f64) -> f64 {
        let refund = match self.last_sample {
            Some(prev) => speed_refund(pos - prev.pos, (now - prev.at) / 1000.0),
            None => 0.0,
        };
        self.last_sample = Some(Sample { pos, at: now });

        self.position = pos;
        self.active = true;

        self.trail.push_back(pos);
        while self.trail.len() > POINTER_TRAIL_LENGTH {
            self.trail.pop_front();
        }

        self.history.push_back(Sample { pos, at: now });
        let cutoff = now - CAMP_TIME_WINDOW_MS;
        while self.history.len() > 2 && self.history.front().is_some_and(|s| s.at < cutoff) {
            self.history.pop_front();
        }

        refund
    }

    /// Pointer left the canvas
    pub fn left(&mut self) {
        self.active = false;
        self.trail.clear();
        self.history.clear();
    }

    /// Live position, `None` while inactive
    pub fn live(&self) -> Option<Vec2> {
        self.active.then_some(self.position)
    }

    /// Per-frame exact-stillness check.
    ///
    /// True when the pointer is active and its rounded position equals the
    /// rounded position it had the last time this returned false. Jitter that
    /// never crosses a pixel boundary counts as still.
    pub fn still_this_frame(&mut self) -> bool {
        if !self.active {
            self.still_anchor = None;
            return false;
        }
        let rounded = self.position.round();
        if self.still_anchor == Some(rounded) {
            true
        } else {
            self.still_anchor = Some(rounded);
            false
        }
    }

    /// Largest extent of the pointer history window (px)
    pub fn recent_travel(&self) -> f32 {
        let Some(first) = self.history.front() else {
            return 0.0;
        };
        let (min, max) = self
            .history
            .iter()
            .fold((first.pos, first.pos), |(lo, hi), s| (lo.min(s.pos), hi.max(s.pos)));
        (max - min).length()
    }

    /// Pointer has barely moved over the last second
    pub fn is_camping(&self) -> bool {
        self.active && self.history.len() >= 2 && self.recent_travel() < CAMP_MIN_DIST
    }

    /// Drop everything except the last raw sample
    pub fn reset(&mut self) {
        self.active = false;
        self.trail.clear();
        self.history.clear();
        self.still_anchor = None;
    }
}

/// Refund for one pointer movement: `((speed - 800) / 800)^1.5 * 0.2 * dt`
/// above the threshold, zero otherwise or when `dt` is not positive
pub fn speed_refund(delta: Vec2, dt_secs: f64) -> f64 {
    if dt_secs <= 0.0 {
        return 0.0;
    }
    let speed = delta.length() as f64 / dt_secs;
    let threshold = SPEED_THRESHOLD as f64;
    if speed <= threshold {
        return 0.0;
    }
    ((speed - threshold) / threshold).powf(1.5) * REWARD_FACTOR * dt_secs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_earns_nothing() {
        let mut p = PointerState::new();
        assert_eq!(p.moved(Vec2::new(900.0, 900.0), 1.0), 0.0);
        assert!(p.active);
        assert_eq!(p.live(), Some(Vec2::new(900.0, 900.0)));
    }

    #[test]
    fn test_speed_refund() {
        // 1600 px/s for 0.1s: ((1600-800)/800)^1.5 * 0.2 * 0.1
        let r = speed_refund(Vec2::new(160.0, 0.0), 0.1);
        assert!((r - 0.02).abs() < 1e-9);
        assert_eq!(speed_refund(Vec2::new(10.0, 0.0), 0.1), 0.0);
        assert_eq!(speed_refund(Vec2::new(10.0, 0.0), 0.0), 0.0);
    }

    #[test]
    fn test_trail_bounded() {
        let mut p = PointerState::new();
        for i in 0..100 {
            p.moved(Vec2::new(i as f32, 0.0), i as f64 * 16.0);
        }
        assert_eq!(p.trail.len(), POINTER_TRAIL_LENGTH);
        assert_eq!(p.trail.back(), Some(&Vec2::new(99.0, 0.0)));
    }

    #[test]
    fn test_leave_clears_trail_and_history() {
        let mut p = PointerState::new();
        p.moved(Vec2::ONE, 0.0);
        p.moved(Vec2::ONE * 2.0, 16.0);
        p.left();
        assert!(!p.active);
        assert!(p.trail.is_empty());
        assert_eq!(p.recent_travel(), 0.0);
        assert_eq!(p.live(), None);
    }

    #[test]
    fn test_stillness_compares_rounded_position() {
        let mut p = PointerState::new();
        p.moved(Vec2::new(10.0, 10.0), 0.0);
        assert!(!p.still_this_frame());
        assert!(p.still_this_frame());
        // Sub-pixel jitter inside the same rounded pixel is still
        p.moved(Vec2::new(10.2, 10.4), 16.0);
        assert!(p.still_this_frame());
        p.moved(Vec2::new(9.8, 9.6), 32.0);
        assert!(p.still_this_frame());
        // Crossing a pixel boundary resets the anchor
        p.moved(Vec2::new(10.0, 10.6), 48.0);
        assert!(!p.still_this_frame());
        assert!(p.still_this_frame());
    }

    #[test]
    fn test_inactive_is_never_still() {
        let mut p = PointerState::new();
        p.moved(Vec2::new(10.0, 10.0), 0.0);
        p.still_this_frame();
        p.left();
        assert!(!p.still_this_frame());
    }

    #[test]
    fn test_camping_window() {
        let mut p = PointerState::new();
        for i in 0..60 {
            p.moved(Vec2::new(100.0 + (i % 3) as f32, 100.0), i as f64 * 16.0);
        }
        assert!(p.is_camping());

        for i in 60..120 {
            p.moved(Vec2::new(100.0 + i as f32 * 5.0, 100.0), i as f64 * 16.0);
        }
        assert!(!p.is_camping());
        assert!(p.recent_travel() > CAMP_MIN_DIST);
    }

    #[test]
    fn test_history_prunes_old_samples() {
        let mut p = PointerState::new();
        p.moved(Vec2::new(0.0, 0.0), 0.0);
        p.moved(Vec2::new(500.0, 0.0), 100.0);
        // Both old samples fall out once newer ones arrive past the window
        p.moved(Vec2::new(600.0, 0.0), 2000.0);
        p.moved(Vec2::new(601.0, 0.0), 2010.0);
        p.moved(Vec2::new(602.0, 0.0), 2020.0);
        assert!((p.recent_travel() - 2.0).abs() < 1e-4);
    }
}
