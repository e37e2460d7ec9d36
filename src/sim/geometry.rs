//! Geometry primitives for hit-testing
//!
//! Pure functions over `Vec2`. Degenerate input (zero-length segments,
//! polygons with fewer than three vertices) never divides by zero and reads
//! as "no hit".

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Added to the edge denominator of the ray-casting test so horizontal edges
/// never divide by zero
pub const RAY_EPSILON: f32 = 0.00001;

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Inclusive containment on all four edges
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

/// Ray-casting point-in-polygon (odd number of edge crossings = inside)
pub fn point_in_polygon(p: Vec2, vertices: &[Vec2]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = vertices[i];
        let vj = vertices[j];
        if (vi.y > p.y) != (vj.y > p.y) {
            let x_cross = (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y + RAY_EPSILON) + vi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Non-zero winding containment, the default fill rule of a canvas path.
///
/// Used for shape masks whose outlines self-overlap (cloud, spiral, infinity).
pub fn winding_contains(p: Vec2, outline: &[Vec2]) -> bool {
    let n = outline.len();
    if n < 3 {
        return false;
    }
    let mut winding = 0i32;
    for i in 0..n {
        let a = outline[i];
        let b = outline[(i + 1) % n];
        // Sign of the cross product tells which side of a->b the point is on
        let side = (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y);
        if a.y <= p.y {
            if b.y > p.y && side > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && side < 0.0 {
            winding -= 1;
        }
    }
    winding != 0
}

/// Closest point to `p` on the segment `a`-`b` (clamped projection).
///
/// A zero-length segment collapses to `a`.
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return a;
    }
    let t = (p - a).dot(ab) / len_sq;
    if t < 0.0 {
        a
    } else if t > 1.0 {
        b
    } else {
        a + ab * t
    }
}

/// Distance from `p` to the segment `a`-`b`
#[inline]
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    (p - closest_point_on_segment(p, a, b)).length()
}

/// True if `p` lies within `dist` of the segment `a`-`b` (inclusive)
#[inline]
pub fn point_near_segment(p: Vec2, a: Vec2, b: Vec2, dist: f32) -> bool {
    (p - closest_point_on_segment(p, a, b)).length_squared() <= dist * dist
}

/// Arithmetic mean of the vertices, `None` for an empty slice
pub fn centroid(vertices: &[Vec2]) -> Option<Vec2> {
    if vertices.is_empty() {
        return None;
    }
    let sum: Vec2 = vertices.iter().copied().sum();
    Some(sum / vertices.len() as f32)
}
