//! Parametric curve patterns traced by processes
//!
//! Each pattern maps a process's internal time `t` to a canvas point. All but
//! two are pure in `t` and the process's origin, direction and rotation;
//! `RandomWalk` and `Chaos` advance an accumulator carried on the process
//! itself (`MotionState`).

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::PATTERN_SIZE;
use crate::polar_to_cartesian;

/// Curve families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    Spiral,
    Wave,
    Triangle,
    Lissajous,
    Rose,
    Epicycloid,
    Polygon,
    Zigzag,
    Lemniscate,
    Hypotrochoid,
    Superellipse,
    RandomWalk,
    Star,
    Heart,
    Butterfly,
    Figure8,
    SineCircle,
    Sawtooth,
    SquareWave,
    PerlinLike,
    DoubleSpiral,
    BouncingWave,
    Flower,
    Chaos,
    Pulse,
}

/// Per-process accumulator for the stateful patterns
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum MotionState {
    #[default]
    None,
    /// Absolute position of the walker
    RandomWalk(Vec2),
    /// Offset from the origin
    Chaos(Vec2),
}

/// The inputs a pattern reads from its process
#[derive(Debug, Clone, Copy)]
pub struct Trace {
    pub origin: Vec2,
    /// Sign pair, each component ±1
    pub direction: Vec2,
    pub rotation: f32,
}

impl Pattern {
    pub const ALL: [Pattern; 25] = [
        Pattern::Spiral,
        Pattern::Wave,
        Pattern::Triangle,
        Pattern::Lissajous,
        Pattern::Rose,
        Pattern::Epicycloid,
        Pattern::Polygon,
        Pattern::Zigzag,
        Pattern::Lemniscate,
        Pattern::Hypotrochoid,
        Pattern::Superellipse,
        Pattern::RandomWalk,
        Pattern::Star,
        Pattern::Heart,
        Pattern::Butterfly,
        Pattern::Figure8,
        Pattern::SineCircle,
        Pattern::Sawtooth,
        Pattern::SquareWave,
        Pattern::PerlinLike,
        Pattern::DoubleSpiral,
        Pattern::BouncingWave,
        Pattern::Flower,
        Pattern::Chaos,
        Pattern::Pulse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::Spiral => "spiral",
            Pattern::Wave => "wave",
            Pattern::Triangle => "triangle",
            Pattern::Lissajous => "lissajous",
            Pattern::Rose => "rose",
            Pattern::Epicycloid => "epicycloid",
            Pattern::Polygon => "polygon",
            Pattern::Zigzag => "zigzag",
            Pattern::Lemniscate => "lemniscate",
            Pattern::Hypotrochoid => "hypotrochoid",
            Pattern::Superellipse => "superellipse",
            Pattern::RandomWalk => "randomwalk",
            Pattern::Star => "star",
            Pattern::Heart => "heart",
            Pattern::Butterfly => "butterfly",
            Pattern::Figure8 => "figure8",
            Pattern::SineCircle => "sinecircle",
            Pattern::Sawtooth => "sawtooth",
            Pattern::SquareWave => "squarewave",
            Pattern::PerlinLike => "perlinlike",
            Pattern::DoubleSpiral => "doublespiral",
            Pattern::BouncingWave => "bouncingwave",
            Pattern::Flower => "flower",
            Pattern::Chaos => "chaos",
            Pattern::Pulse => "pulse",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
    }

    /// Fresh accumulator for this pattern
    pub fn initial_motion(&self) -> MotionState {
        // The random walk seeds itself at the origin on first evaluation
        match self {
            Pattern::Chaos => MotionState::Chaos(Vec2::ZERO),
            _ => MotionState::None,
        }
    }

    /// Evaluate the pattern at time `t`.
    ///
    /// `canvas_width` bounds the horizontally scrolling waves. `motion` is the
    /// owning process's accumulator; only `RandomWalk` and `Chaos` touch it.
    pub fn evaluate<R: Rng>(
        &self,
        trace: &Trace,
        t: f32,
        canvas_width: f32,
        motion: &mut MotionState,
        rng: &mut R,
    ) -> Vec2 {
        let s = PATTERN_SIZE;
        let Trace {
            origin: o,
            direction: d,
            rotation: rot,
        } = *trace;

        match self {
            Pattern::Spiral => {
                let radius = s * (t / 50.0);
                let angle = t / 10.0 + rot;
                o + d * radius * Vec2::new(angle.cos(), angle.sin())
            }
            Pattern::Wave => Vec2::new(
                wrap(o.x + d.x * t, canvas_width),
                o.y + d.y * (t / 20.0 + rot).sin() * s * 5.0,
            ),
            Pattern::Triangle => {
                let angle = t / 20.0 + rot;
                o + d * Vec2::new(angle.cos(), angle.sin()) * s * 10.0
            }
            Pattern::Lissajous => Vec2::new(
                o.x + (t / 30.0 + rot).sin() * s * 10.0,
                o.y + (t / 20.0 + PI / 2.0 + rot).sin() * s * 10.0,
            ),
            Pattern::Rose => {
                let k = 5.0;
                let r = s * 5.0 * (k * t / 100.0).cos();
                let angle = t / 20.0 + rot;
                o + polar_to_cartesian(r, angle)
            }
            Pattern::Epicycloid => {
                let (big_r, r, dd) = (s * 3.0, s, s * 2.0);
                let angle = t / 30.0 + rot;
                let k = (big_r + r) / r;
                Vec2::new(
                    o.x + (big_r + r) * angle.cos() - dd * (k * angle).cos(),
                    o.y + (big_r + r) * angle.sin() - dd * (k * angle).sin(),
                )
            }
            Pattern::Polygon => {
                let sides = 6.0;
                let angle = (t / 30.0) % TAU + rot;
                let radius = s * 10.0;
                let vertex = (angle * sides / TAU).floor() * TAU / sides;
                o + polar_to_cartesian(radius, vertex)
            }
            Pattern::Zigzag => {
                let period = 40.0;
                let side = if t % period < period / 2.0 { 1.0 } else { -1.0 };
                Vec2::new(
                    o.x + side * s * 10.0 * rot.cos(),
                    o.y + (t % (s * 10.0)) * rot.sin(),
                )
            }
            Pattern::Lemniscate => {
                let a = s * 8.0;
                let angle = t / 30.0 + rot;
                let (sin, cos) = angle.sin_cos();
                let denom = 1.0 + sin * sin;
                Vec2::new(o.x + a * cos / denom, o.y + a * cos * sin / denom)
            }
            Pattern::Hypotrochoid => {
                let (big_r, r, dd) = (s * 4.0, s * 2.0, s * 2.0);
                let angle = t / 30.0 + rot;
                let k = (big_r - r) / r;
                Vec2::new(
                    o.x + (big_r - r) * angle.cos() + dd * (k * angle).cos(),
                    o.y + (big_r - r) * angle.sin() - dd * (k * angle).sin(),
                )
            }
            Pattern::Superellipse => {
                let n = 2.5;
                let a = s * 10.0;
                let angle = t / 30.0 + rot;
                let (sin, cos) = angle.sin_cos();
                Vec2::new(
                    o.x + sign(cos) * cos.abs().powf(2.0 / n) * a,
                    o.y + sign(sin) * sin.abs().powf(2.0 / n) * a,
                )
            }
            Pattern::RandomWalk => {
                let mut pos = match *motion {
                    MotionState::RandomWalk(p) => p,
                    _ => o,
                };
                pos.x += (rng.random::<f32>() - 0.5) * s * rot.cos();
                pos.y += (rng.random::<f32>() - 0.5) * s * rot.sin();
                *motion = MotionState::RandomWalk(pos);
                pos
            }
            Pattern::Star => {
                let spikes = 5.0;
                let (outer, inner) = (s * 10.0, s * 5.0);
                let angle = t / 20.0 + rot;
                let idx = ((angle % TAU) * spikes / TAU).floor() as i64;
                let r = if idx % 2 == 0 { outer } else { inner };
                o + polar_to_cartesian(r, angle)
            }
            Pattern::Heart => {
                let angle = t / 30.0 + rot;
                let r = s * 8.0;
                Vec2::new(
                    o.x + r * 16.0 * angle.sin().powi(3),
                    o.y - r * (13.0 * angle.cos()
                        - 5.0 * (2.0 * angle).cos()
                        - 2.0 * (3.0 * angle).cos()
                        - (4.0 * angle).cos()),
                )
            }
            Pattern::Butterfly => {
                let angle = t / 30.0 + rot;
                let r = angle.cos().exp() - 2.0 * (4.0 * angle).cos() - (angle / 12.0).sin().powi(5);
                o + Vec2::new(angle.sin(), angle.cos()) * s * 20.0 * r
            }
            Pattern::Figure8 => {
                let a = s * 10.0;
                let angle = t / 30.0 + rot;
                Vec2::new(o.x + a * angle.sin(), o.y + a * angle.sin() * angle.cos())
            }
            Pattern::SineCircle => {
                let r = s * 10.0 + (t / 10.0 + rot).sin() * s * 5.0;
                let angle = t / 30.0 + rot;
                o + polar_to_cartesian(r, angle)
            }
            Pattern::Sawtooth => {
                let period = 100.0;
                let phase = (t % period) / period;
                o + Vec2::new(rot.cos(), rot.sin()) * phase * s * 20.0
            }
            Pattern::SquareWave => {
                let period = 80.0;
                let high = ((t / period).floor() as i64) % 2 == 0;
                let amp = if high { s * 10.0 } else { -s * 10.0 };
                Vec2::new(
                    o.x + amp * rot.cos(),
                    o.y + ((t % period) / period) * s * 20.0 * rot.sin(),
                )
            }
            Pattern::PerlinLike => {
                let mut p = o;
                for i in 1..5 {
                    let i = i as f32;
                    p.x += (t / (10.0 * i) + rot).sin() * s * 2.0;
                    p.y += (t / (15.0 * i) + rot).cos() * s * 2.0;
                }
                p
            }
            Pattern::DoubleSpiral => {
                let radius = s * (t / 50.0);
                let angle = t / 10.0 + rot;
                let offset = (t / 20.0).sin() * s * 2.0;
                Vec2::new(
                    o.x + d.x * (radius + offset) * angle.cos(),
                    o.y + d.y * (radius - offset) * angle.sin(),
                )
            }
            Pattern::BouncingWave => {
                let bounce = (t / 30.0).sin().abs() * s * 5.0;
                Vec2::new(
                    wrap(o.x + d.x * t, canvas_width),
                    o.y + d.y * (t / 20.0 + rot).sin() * s * 5.0 + bounce,
                )
            }
            Pattern::Flower => {
                let petals = 8.0;
                let r = s * 5.0 * (1.0 + (petals * t / 50.0).sin() * 0.5);
                let angle = t / 20.0 + rot;
                o + polar_to_cartesian(r, angle)
            }
            Pattern::Chaos => {
                let mut acc = match *motion {
                    MotionState::Chaos(acc) => acc,
                    _ => Vec2::ZERO,
                };
                acc.x += (t / 10.0).sin() * s * 0.5;
                acc.y += (t / 15.0).cos() * s * 0.5;
                *motion = MotionState::Chaos(acc);
                o + acc
            }
            Pattern::Pulse => {
                let pulse = (t / 20.0).sin() * s * 3.0;
                let angle = t / 30.0 + rot;
                o + polar_to_cartesian(s * 5.0 + pulse, angle)
            }
        }
    }
}

/// Floating remainder by the canvas width, sign follows the dividend
#[inline]
fn wrap(x: f32, width: f32) -> f32 {
    if width > 0.0 { x % width } else { x }
}

/// `Math.sign` semantics: zero stays zero
#[inline]
fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn trace() -> Trace {
        Trace {
            origin: Vec2::new(400.0, 300.0),
            direction: Vec2::new(1.0, -1.0),
            rotation: 0.7,
        }
    }

    #[test]
    fn test_spiral_starts_at_origin() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut motion = MotionState::None;
        let p = Pattern::Spiral.evaluate(&trace(), 0.0, 800.0, &mut motion, &mut rng);
        assert_eq!(p, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_wave_wraps_by_canvas_width() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut motion = MotionState::None;
        let p = Pattern::Wave.evaluate(&trace(), 500.0, 800.0, &mut motion, &mut rng);
        assert!((p.x - 100.0).abs() < 1e-3);
        // Zero width: no wrap instead of NaN
        let q = Pattern::Wave.evaluate(&trace(), 500.0, 0.0, &mut motion, &mut rng);
        assert!((q.x - 900.0).abs() < 1e-3);
    }

    #[test]
    fn test_polygon_snaps_to_hexagon_vertices() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut motion = MotionState::None;
        let tr = Trace {
            rotation: 0.0,
            ..trace()
        };
        for t in [0.0, 5.0, 20.0] {
            let p = Pattern::Polygon.evaluate(&tr, t, 800.0, &mut motion, &mut rng);
            // Still inside the first sixth of the turn: vertex at angle 0
            assert!((p - Vec2::new(700.0, 300.0)).length() < 1e-3);
        }
    }

    #[test]
    fn test_random_walk_accumulates_on_the_process() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut motion = Pattern::RandomWalk.initial_motion();
        let tr = trace();
        let first = Pattern::RandomWalk.evaluate(&tr, 0.0, 800.0, &mut motion, &mut rng);
        assert_eq!(motion, MotionState::RandomWalk(first));
        // Each step moves at most half a pattern size per axis
        let d = first - tr.origin;
        assert!(d.x.abs() <= PATTERN_SIZE * 0.5 && d.y.abs() <= PATTERN_SIZE * 0.5);
        let second = Pattern::RandomWalk.evaluate(&tr, 0.35, 800.0, &mut motion, &mut rng);
        assert_eq!(motion, MotionState::RandomWalk(second));
    }

    #[test]
    fn test_chaos_accumulates_relative_to_origin() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut motion = Pattern::Chaos.initial_motion();
        let tr = trace();
        let p = Pattern::Chaos.evaluate(&tr, 0.0, 800.0, &mut motion, &mut rng);
        // sin(0)=0, cos(0)=1: one step of +15 in y
        assert!((p - (tr.origin + Vec2::new(0.0, 15.0))).length() < 1e-4);
        let p2 = Pattern::Chaos.evaluate(&tr, 0.0, 800.0, &mut motion, &mut rng);
        assert!((p2 - (tr.origin + Vec2::new(0.0, 30.0))).length() < 1e-4);
    }

    #[test]
    fn test_names_round_trip() {
        for p in Pattern::ALL {
            assert_eq!(Pattern::from_name(p.as_str()), Some(p));
        }
        assert_eq!(Pattern::from_name("doubleSpiral"), Some(Pattern::DoubleSpiral));
        assert_eq!(Pattern::from_name("nope"), None);
    }

    proptest! {
        #[test]
        fn prop_every_pattern_is_finite(
            idx in 0usize..Pattern::ALL.len(),
            t in 0.0f32..=10000.0,
            ox in 0.0f32..2000.0,
            oy in 0.0f32..2000.0,
            rot in 0.0f32..6.2832,
            width in 1.0f32..3000.0,
        ) {
            let pattern = Pattern::ALL[idx];
            let tr = Trace { origin: Vec2::new(ox, oy), direction: Vec2::new(-1.0, 1.0), rotation: rot };
            let mut rng = Pcg32::seed_from_u64(t.to_bits() as u64);
            let mut motion = pattern.initial_motion();
            for step in 0..3 {
                let p = pattern.evaluate(&tr, t + step as f32, width, &mut motion, &mut rng);
                prop_assert!(p.is_finite(), "{:?} at t={} -> {:?}", pattern, t, p);
            }
        }
    }
}
