//! Pointer hit-testing across every pool
//!
//! The order is fixed (images, polygons, words, lines, processes, hotspot)
//! and the first hit wins.

use glam::Vec2;

use super::entity::{FilledPolygon, FloatingImage, FloatingWord, PatternProcess, TravelingLine};
use super::geometry::{Rect, point_in_polygon, point_near_segment};
use super::state::Pools;
use crate::consts::TOUCH_RADIUS;
use crate::rotate;

/// Text width provider. The browser measures with the canvas; tests and the
/// headless runner use `ApproxMetrics`.
pub trait TextMeasure {
    /// Advance width of `text` drawn with the CSS `font`
    fn text_width(&self, text: &str, font: &str, font_size: f32) -> f32;
}

/// Fixed-advance estimate: 0.6 em per character
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMetrics;

impl TextMeasure for ApproxMetrics {
    fn text_width(&self, text: &str, _font: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.6
    }
}

/// What the pointer touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Image(u32),
    Polygon(u32),
    Word(u32),
    Line(u32),
    Process(u32),
    Hotspot,
}

pub fn image_hit(image: &FloatingImage, p: Vec2) -> bool {
    image.ready && image.contains(p)
}

/// Pointer rotated into the polygon's frame about its centroid, tested
/// against the unrotated outline
pub fn polygon_hit(polygon: &FilledPolygon, p: Vec2) -> bool {
    let Some(c) = super::geometry::centroid(&polygon.vertices) else {
        return false;
    };
    let local = c + rotate(p - c, -polygon.body.rotation);
    point_in_polygon(local, &polygon.vertices)
}

/// Box from `-0.7h` to `0.3h` around the baseline, `0..width` along it
pub fn word_hit(word: &FloatingWord, p: Vec2, metrics: &dyn TextMeasure) -> bool {
    let width = word
        .width
        .unwrap_or_else(|| metrics.text_width(&word.text, &word.font(), word.font_size));
    let h = word.font_size;
    let local = rotate(p - word.pos, -word.body.rotation);
    Rect::new(0.0, -h * 0.7, width, h).contains(local)
}

pub fn line_hit(line: &TravelingLine, p: Vec2) -> bool {
    point_near_segment(p, line.head, line.tail(), TOUCH_RADIUS)
}

pub fn process_hit(process: &PatternProcess, p: Vec2) -> bool {
    process
        .segments()
        .any(|(a, b)| point_near_segment(p, a, b, TOUCH_RADIUS))
}

/// First entity under the pointer, in dispatch order
pub fn first_hit(
    p: Vec2,
    pools: &Pools,
    hotspot: Option<Rect>,
    metrics: &dyn TextMeasure,
) -> Option<HitTarget> {
    if let Some(img) = pools.images.iter().find(|i| image_hit(i, p)) {
        return Some(HitTarget::Image(img.id));
    }
    if let Some(poly) = pools.polygons.iter().find(|poly| polygon_hit(poly, p)) {
        return Some(HitTarget::Polygon(poly.id));
    }
    if let Some(word) = pools.words.iter().find(|w| word_hit(w, p, metrics)) {
        return Some(HitTarget::Word(word.id));
    }
    if let Some(line) = pools.lines.iter().find(|l| line_hit(l, p)) {
        return Some(HitTarget::Line(line.id));
    }
    if let Some(process) = pools.processes.iter().find(|pr| process_hit(pr, p)) {
        return Some(HitTarget::Process(process.id));
    }
    match hotspot {
        Some(rect) if rect.contains(p) => Some(HitTarget::Hotspot),
        _ => None,
    }
}

pub fn is_touching(p: Vec2, pools: &Pools, hotspot: Option<Rect>, metrics: &dyn TextMeasure) -> bool {
    first_hit(p, pools, hotspot, metrics).is_some()
}
