//! Art Dodge - a generative-art avoidance game
//!
//! Core modules:
//! - `sim`: Frame simulation (entity pools, pointer field, hit-testing, difficulty)
//! - `renderer`: Draw-list construction and the Canvas 2D backend
//! - `platform`: Browser wiring (input, frame loop, HUD, JS API)
//! - `settings`: User preferences

pub mod audio;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Difficulty level-up cadence (ms)
    pub const DIFFICULTY_INTERVAL_MS: f64 = 5000.0;
    /// Canvas shrinks by this fraction per level
    pub const CANVAS_SHRINK_PER_LEVEL: f32 = 0.02;
    /// Canvas never shrinks below this fraction of the viewport
    pub const MIN_CANVAS_SCALE: f32 = 0.2;
    /// Exponential smoothing factor toward the target canvas scale
    pub const CANVAS_SCALE_SMOOTHING: f32 = 0.08;

    /// Hard population maxima
    pub const MAX_PROCESSES: u32 = 20;
    pub const MAX_IMAGES: u32 = 10;
    pub const MAX_WORDS: u32 = 10;
    pub const MAX_POLYGONS: u32 = 10;
    pub const MAX_LINES: u32 = 8;

    /// Spawn intervals (ms)
    pub const IMAGE_INTERVAL_MS: f64 = 3000.0;
    pub const WORD_INTERVAL_MS: f64 = 2200.0;
    pub const POLYGON_INTERVAL_MS: f64 = 6000.0;
    pub const LINE_INTERVAL_MS: f64 = 4000.0;

    /// Maximum points kept in a process trail
    pub const PROCESS_TRAIL_LENGTH: usize = 50;
    /// Base size shared by every curve pattern
    pub const PATTERN_SIZE: f32 = 30.0;
    /// Per-frame advance of a process's internal time, times its speed
    pub const PROCESS_TIME_STEP: f32 = 0.35;

    /// A traveling line is drawn from its head back along velocity * this
    pub const LINE_TAIL_FACTOR: f32 = 50.0;
    /// Pointer-to-stroke distance that counts as a touch (px)
    pub const TOUCH_RADIUS: f32 = 8.0;

    /// Inertia lasts this long after the last pointer interaction (ms)
    pub const INERTIA_WINDOW_MS: f64 = 1000.0;
    /// Per-frame damping of velocity and rotation velocity
    pub const INERTIA_DAMPING: f32 = 0.95;
    /// Impulse scale applied on interaction, times reaction strength
    pub const PUSH_STRENGTH: f32 = 0.15;
    /// Random spin kick on interaction, times reaction strength
    pub const SPIN_KICK: f32 = 0.02;

    /// Fading starts at this fraction of an image/word lifetime
    pub const FADE_START_FRACTION: f64 = 0.7;

    /// Pointer speed (px/s) above which penalty time is refunded
    pub const SPEED_THRESHOLD: f32 = 800.0;
    /// Scale of the speed refund
    pub const REWARD_FACTOR: f64 = 0.2;
    /// Pointer trail length used for rendering
    pub const POINTER_TRAIL_LENGTH: usize = 20;
    /// Rolling pointer history window (ms)
    pub const CAMP_TIME_WINDOW_MS: f64 = 1000.0;
    /// Travel below this within the window reads as camping (px)
    pub const CAMP_MIN_DIST: f32 = 10.0;

    /// Bomb cooldown (ms)
    pub const BOMB_COOLDOWN_MS: f64 = 30000.0;

    /// Heartbeat interval at level 0 (ms)
    pub const BASE_HEARTBEAT_MS: f64 = 1000.0;
    /// Heartbeat speeds up by this much per level (ms)
    pub const HEARTBEAT_STEP_MS: f64 = 50.0;
    /// Fastest heartbeat (ms)
    pub const MIN_HEARTBEAT_MS: f64 = 200.0;
}

/// Rotate a vector by `angle` radians (counter-clockwise in math space,
/// clockwise on a y-down canvas)
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(Vec2::new(1.0, 0.0), FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotate_inverse() {
        let v = Vec2::new(3.0, -7.5);
        let back = rotate(rotate(v, 1.234), -1.234);
        assert!((back - v).length() < 1e-4);
    }
}
