//! Shape masks for floating images
//!
//! Every mask is flattened into a single closed outline in the image's local
//! frame (origin at the top-left corner, `width` x `height` box). The same
//! outline clips the image when drawing and answers hit-tests, using the
//! non-zero fill rule a canvas path uses.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::winding_contains;

/// Segments used to flatten one full circle
const CIRCLE_SEGMENTS: usize = 48;
/// Segments used to flatten one cubic bezier
const BEZIER_SEGMENTS: usize = 16;

/// Mask shapes an image can be clipped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeMask {
    Circle,
    Heart,
    Star,
    Hexagon,
    Cloud,
    Diamond,
    Infinity,
    Gear,
    Spiral,
}

impl ShapeMask {
    pub const ALL: [ShapeMask; 9] = [
        ShapeMask::Circle,
        ShapeMask::Heart,
        ShapeMask::Star,
        ShapeMask::Hexagon,
        ShapeMask::Cloud,
        ShapeMask::Diamond,
        ShapeMask::Infinity,
        ShapeMask::Gear,
        ShapeMask::Spiral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeMask::Circle => "circle",
            ShapeMask::Heart => "heart",
            ShapeMask::Star => "star",
            ShapeMask::Hexagon => "hexagon",
            ShapeMask::Cloud => "cloud",
            ShapeMask::Diamond => "diamond",
            ShapeMask::Infinity => "infinity",
            ShapeMask::Gear => "gear",
            ShapeMask::Spiral => "spiral",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.as_str().eq_ignore_ascii_case(name))
    }

    /// Flattened outline inside a `width` x `height` box
    pub fn outline(&self, width: f32, height: f32) -> Vec<Vec2> {
        let c = Vec2::new(width / 2.0, height / 2.0);
        let size = width.min(height) / 2.0;
        let mut path = PathBuilder::default();

        match self {
            ShapeMask::Circle => path.circle(c, size),
            ShapeMask::Heart => {
                path.move_to(Vec2::new(c.x, c.y + size / 2.0));
                path.cubic_to(
                    Vec2::new(c.x, c.y + size),
                    Vec2::new(c.x - size, c.y + size),
                    Vec2::new(c.x - size, c.y),
                );
                path.cubic_to(
                    Vec2::new(c.x - size, c.y - size / 2.0),
                    Vec2::new(c.x, c.y - size),
                    Vec2::new(c.x, c.y - size / 2.0),
                );
                path.cubic_to(
                    Vec2::new(c.x, c.y - size),
                    Vec2::new(c.x + size, c.y - size / 2.0),
                    Vec2::new(c.x + size, c.y),
                );
                path.cubic_to(
                    Vec2::new(c.x + size, c.y + size),
                    Vec2::new(c.x, c.y + size),
                    Vec2::new(c.x, c.y + size / 2.0),
                );
            }
            ShapeMask::Star => path.alternating_ring(c, 5, size, size * 0.4),
            ShapeMask::Hexagon => {
                for i in 0..6 {
                    let angle = PI * i as f32 / 3.0;
                    path.line_to(c + Vec2::new(angle.cos(), angle.sin()) * size);
                }
            }
            ShapeMask::Cloud => {
                // Four full circles in one path; consecutive arcs are joined by lines
                let r = size / 2.0;
                path.circle(Vec2::new(c.x - r, c.y), r);
                path.circle(Vec2::new(c.x + r, c.y), r);
                path.circle(Vec2::new(c.x, c.y - r), r);
                path.circle(Vec2::new(c.x, c.y + r), r);
            }
            ShapeMask::Diamond => {
                path.move_to(Vec2::new(c.x, c.y - size));
                path.line_to(Vec2::new(c.x + size, c.y));
                path.line_to(Vec2::new(c.x, c.y + size));
                path.line_to(Vec2::new(c.x - size, c.y));
            }
            ShapeMask::Infinity => {
                path.move_to(Vec2::new(c.x - size, c.y));
                path.cubic_to(
                    Vec2::new(c.x - size, c.y - size),
                    Vec2::new(c.x, c.y - size),
                    c,
                );
                path.cubic_to(
                    Vec2::new(c.x, c.y + size),
                    Vec2::new(c.x + size, c.y + size),
                    Vec2::new(c.x + size, c.y),
                );
                path.cubic_to(
                    Vec2::new(c.x + size, c.y - size),
                    Vec2::new(c.x, c.y - size),
                    c,
                );
                path.cubic_to(
                    Vec2::new(c.x, c.y + size),
                    Vec2::new(c.x - size, c.y + size),
                    Vec2::new(c.x - size, c.y),
                );
            }
            ShapeMask::Gear => path.alternating_ring(c, 12, size, size * 0.7),
            ShapeMask::Spiral => {
                let turns = 3;
                let total_deg = turns * 360;
                for deg in (0..=total_deg).step_by(5) {
                    let angle = (deg as f32).to_radians();
                    let radius = size * deg as f32 / total_deg as f32;
                    path.line_to(c + Vec2::new(angle.cos(), angle.sin()) * radius);
                }
            }
        }

        path.points
    }

    /// Test a point given in the image's local frame
    pub fn contains(&self, local: Vec2, width: f32, height: f32) -> bool {
        if width <= 0.0 || height <= 0.0 {
            return false;
        }
        winding_contains(local, &self.outline(width, height))
    }
}

/// Minimal flattening path builder (one subpath, implicitly closed)
#[derive(Default)]
struct PathBuilder {
    points: Vec<Vec2>,
}

impl PathBuilder {
    fn move_to(&mut self, p: Vec2) {
        self.points.push(p);
    }

    fn line_to(&mut self, p: Vec2) {
        self.points.push(p);
    }

    fn current(&self) -> Vec2 {
        self.points.last().copied().unwrap_or(Vec2::ZERO)
    }

    fn cubic_to(&mut self, c1: Vec2, c2: Vec2, end: Vec2) {
        let start = self.current();
        for i in 1..=BEZIER_SEGMENTS {
            let t = i as f32 / BEZIER_SEGMENTS as f32;
            let mt = 1.0 - t;
            let p = start * (mt * mt * mt)
                + c1 * (3.0 * mt * mt * t)
                + c2 * (3.0 * mt * t * t)
                + end * (t * t * t);
            self.points.push(p);
        }
    }

    /// Full clockwise (canvas) circle starting at angle 0
    fn circle(&mut self, center: Vec2, radius: f32) {
        for i in 0..=CIRCLE_SEGMENTS {
            let angle = TAU * i as f32 / CIRCLE_SEGMENTS as f32;
            self.points
                .push(center + Vec2::new(angle.cos(), angle.sin()) * radius);
        }
    }

    /// Star-like ring alternating between two radii
    fn alternating_ring(&mut self, center: Vec2, spikes: usize, outer: f32, inner: f32) {
        for i in 0..spikes * 2 {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = PI * i as f32 / spikes as f32;
            self.points
                .push(center + Vec2::new(angle.cos(), angle.sin()) * radius);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_shape_contains_its_solid_region() {
        // Points just off-centre sit inside every mask's filled area
        let point = Vec2::new(200.0 * 0.5 + 30.0, 200.0 * 0.5 + 2.0);
        for shape in ShapeMask::ALL {
            if matches!(shape, ShapeMask::Infinity) {
                continue;
            }
            assert!(shape.contains(point, 200.0, 200.0), "{:?}", shape);
        }
    }

    #[test]
    fn test_infinity_lobes() {
        let s = ShapeMask::Infinity;
        // Left lobe centre and right lobe centre
        assert!(s.contains(Vec2::new(60.0, 100.0 - 20.0), 200.0, 200.0));
        assert!(s.contains(Vec2::new(140.0, 100.0 + 20.0), 200.0, 200.0));
    }

    #[test]
    fn test_corners_are_outside() {
        for shape in ShapeMask::ALL {
            assert!(!shape.contains(Vec2::new(1.0, 1.0), 200.0, 200.0), "{:?}", shape);
            assert!(!shape.contains(Vec2::new(199.0, 199.0), 200.0, 200.0), "{:?}", shape);
        }
    }

    #[test]
    fn test_circle_uses_shorter_side() {
        let s = ShapeMask::Circle;
        // 300x100 box: radius 50 around (150, 50)
        assert!(s.contains(Vec2::new(190.0, 50.0), 300.0, 100.0));
        assert!(!s.contains(Vec2::new(210.0, 50.0), 300.0, 100.0));
    }

    #[test]
    fn test_star_inner_notch_is_outside() {
        // Between two spikes at radius 0.6*size, outside the inner radius 0.4
        let size = 100.0;
        let c = Vec2::new(100.0, 100.0);
        let angle = PI / 5.0;
        let p = c + Vec2::new(angle.cos(), angle.sin()) * size * 0.6;
        assert!(!ShapeMask::Star.contains(p, 200.0, 200.0));
    }

    #[test]
    fn test_zero_size_never_hits() {
        assert!(!ShapeMask::Circle.contains(Vec2::ZERO, 0.0, 100.0));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(ShapeMask::from_name("Gear"), Some(ShapeMask::Gear));
        assert_eq!(ShapeMask::from_name("blob"), None);
    }
}
