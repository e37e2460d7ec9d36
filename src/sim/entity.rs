//! Entity types populating the canvas
//!
//! Five pools: pattern processes (curve tracers), floating images, floating
//! words, filled polygons and traveling lines. Images, words and polygons carry
//! a `Body` for pointer-driven inertia.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pattern::{MotionState, Pattern, Trace};
use super::shape::ShapeMask;
use crate::consts::*;
use crate::rotate;

/// HSL colour, rendered as a CSS `hsl()` string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl Hsl {
    pub const fn new(hue: u16, saturation: u8, lightness: u8) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    pub fn css(&self) -> String {
        format!("hsl({}, {}%, {}%)", self.hue, self.saturation, self.lightness)
    }
}

/// How an entity responds to the pointer field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionMode {
    Attract,
    Repel,
    /// Sideways, perpendicular to the pointer offset
    Orbit,
}

/// Pointer-field parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub mode: ReactionMode,
    pub strength: f32,
    pub radius: f32,
}

impl Reaction {
    pub const fn new(mode: ReactionMode, strength: f32, radius: f32) -> Self {
        Self {
            mode,
            strength,
            radius,
        }
    }
}

/// Inertial state kicked by pointer contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub velocity: Vec2,
    pub rotation: f32,
    pub rotation_velocity: f32,
    /// Timestamp (ms) of the last pointer interaction
    pub last_interaction: Option<f64>,
    /// Per-entity multiplier on field displacement and impulses
    pub reaction_strength: f32,
}

impl Body {
    pub fn new(reaction_strength: f32, rotation: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            rotation,
            rotation_velocity: 0.0,
            last_interaction: None,
            reaction_strength,
        }
    }

    /// Per-frame inertia: while the last interaction is recent, damp velocity
    /// and spin, advance rotation, and return the residual displacement
    pub fn coast(&mut self, now: f64) -> Vec2 {
        match self.last_interaction {
            Some(at) if now - at < INERTIA_WINDOW_MS => {
                self.velocity *= INERTIA_DAMPING;
                self.rotation_velocity *= INERTIA_DAMPING;
                self.rotation += self.rotation_velocity;
                self.velocity
            }
            _ => Vec2::ZERO,
        }
    }
}

/// Opacity for short-lived entities: 1 until 70% of the lifetime, then a
/// linear ramp to 0
pub fn lifetime_opacity(age: f64, lifetime: f64) -> f32 {
    let fade_from = lifetime * FADE_START_FRACTION;
    if age <= fade_from || lifetime <= 0.0 {
        return 1.0;
    }
    let remaining = 1.0 - (age - fade_from) / (lifetime * (1.0 - FADE_START_FRACTION));
    remaining.clamp(0.0, 1.0) as f32
}

/// A long-lived curve tracer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternProcess {
    pub id: u32,
    pub pattern: Pattern,
    pub origin: Vec2,
    /// Sign pair, each component ±1; flipped when the tracer hits an edge
    pub direction: Vec2,
    pub rotation: f32,
    /// Internal pattern time
    pub time: f32,
    /// Recent points, oldest first
    pub trail: VecDeque<Vec2>,
    pub speed: f32,
    pub line_width: f32,
    /// Base opacity
    pub alpha: f32,
    pub created: f64,
    pub lifetime: f64,
    pub fade_duration: f64,
    /// Set once when the lifetime runs out
    pub fade_start: Option<f64>,
    pub reaction: Reaction,
    #[serde(default)]
    pub motion: MotionState,
    /// Fixed pattern-switch period (ms)
    pub switch_period: f64,
    pub next_switch_at: f64,
}

/// Where a process is in its fade-out
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fade {
    /// Still visible at this opacity
    Visible(f32),
    /// Fade complete: replace the process
    Done,
}

impl PatternProcess {
    pub fn trace(&self) -> Trace {
        Trace {
            origin: self.origin,
            direction: self.direction,
            rotation: self.rotation,
        }
    }

    /// Append a point, dropping the oldest beyond the trail cap
    pub fn record(&mut self, point: Vec2) {
        self.trail.push_back(point);
        while self.trail.len() > PROCESS_TRAIL_LENGTH {
            self.trail.pop_front();
        }
    }

    /// Start fading once the lifetime has elapsed, and report the opacity
    pub fn update_fade(&mut self, now: f64) -> Fade {
        if self.fade_start.is_none() && now - self.created > self.lifetime {
            self.fade_start = Some(now);
        }
        match self.fade_start {
            None => Fade::Visible(self.alpha),
            Some(start) => {
                let progress = if self.fade_duration > 0.0 {
                    (now - start) / self.fade_duration
                } else {
                    1.0
                };
                if progress >= 1.0 {
                    Fade::Done
                } else {
                    Fade::Visible(self.alpha * (1.0 - progress as f32))
                }
            }
        }
    }

    pub fn is_fading(&self) -> bool {
        self.fade_start.is_some()
    }

    /// Consecutive trail segments
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.trail.iter().zip(self.trail.iter().skip(1)).map(|(a, b)| (*a, *b))
    }
}

/// CSS filter applied to an image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ImageFilter {
    None,
    /// Percent
    Sepia(f32),
    /// Percent
    Invert(f32),
    /// Percent
    Grayscale(f32),
    /// Pixels
    Blur(f32),
    /// Percent
    Saturate(f32),
    /// Degrees
    HueRotate(f32),
    /// Percent
    Contrast(f32),
}

impl ImageFilter {
    /// CSS filter string, `None` when unfiltered
    pub fn css(&self) -> Option<String> {
        match self {
            ImageFilter::None => None,
            ImageFilter::Sepia(v) => Some(format!("sepia({v}%)")),
            ImageFilter::Invert(v) => Some(format!("invert({v}%)")),
            ImageFilter::Grayscale(v) => Some(format!("grayscale({v}%)")),
            ImageFilter::Blur(v) => Some(format!("blur({v}px)")),
            ImageFilter::Saturate(v) => Some(format!("saturate({v}%)")),
            ImageFilter::HueRotate(v) => Some(format!("hue-rotate({v}deg)")),
            ImageFilter::Contrast(v) => Some(format!("contrast({v}%)")),
        }
    }
}

/// External image reference, resolved by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    pub seed: u32,
    pub width: u32,
    pub height: u32,
}

impl ImageSource {
    pub fn url(&self) -> String {
        format!(
            "https://picsum.photos/seed/{}/{}/{}",
            self.seed, self.width, self.height
        )
    }
}

/// A drifting, shape-masked picture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingImage {
    pub id: u32,
    /// Top-left corner (before rotation)
    pub pos: Vec2,
    pub size: Vec2,
    pub shape: ShapeMask,
    pub filter: ImageFilter,
    pub source: ImageSource,
    /// Set by the platform once the picture has loaded
    pub ready: bool,
    pub created: f64,
    pub lifetime: f64,
    pub body: Body,
}

impl FloatingImage {
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn opacity(&self, now: f64) -> f32 {
        lifetime_opacity(now - self.created, self.lifetime)
    }

    pub fn expired(&self, now: f64) -> bool {
        now - self.created > self.lifetime
    }

    /// Map a canvas point into the unrotated image box (origin top-left)
    pub fn to_local(&self, p: Vec2) -> Vec2 {
        rotate(p - self.center(), -self.body.rotation) + self.size / 2.0
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.shape.contains(self.to_local(p), self.size.x, self.size.y)
    }
}

/// CSS font weights used for words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontWeight {
    Normal,
    Bold,
    Bolder,
    Lighter,
    W400,
    W600,
    W800,
}

impl FontWeight {
    pub const ALL: [FontWeight; 7] = [
        FontWeight::Normal,
        FontWeight::Bold,
        FontWeight::Bolder,
        FontWeight::Lighter,
        FontWeight::W400,
        FontWeight::W600,
        FontWeight::W800,
    ];

    pub fn css(&self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
            FontWeight::Bolder => "bolder",
            FontWeight::Lighter => "lighter",
            FontWeight::W400 => "400",
            FontWeight::W600 => "600",
            FontWeight::W800 => "800",
        }
    }
}

/// A drifting word
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingWord {
    pub id: u32,
    /// Already case-transformed
    pub text: String,
    pub font_size: f32,
    pub weight: FontWeight,
    /// Left end of the baseline
    pub pos: Vec2,
    pub created: f64,
    pub lifetime: f64,
    /// Assigned on first update
    pub color: Option<Hsl>,
    /// Measured advance width, cached on first hit-test
    #[serde(skip)]
    pub width: Option<f32>,
    pub body: Body,
}

impl FloatingWord {
    /// CSS font shorthand
    pub fn font(&self) -> String {
        format!("{} {}px Arial", self.weight.css(), self.font_size)
    }

    pub fn opacity(&self, now: f64) -> f32 {
        lifetime_opacity(now - self.created, self.lifetime)
    }

    pub fn expired(&self, now: f64) -> bool {
        now - self.created > self.lifetime
    }
}

/// A long-lived filled polygon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilledPolygon {
    pub id: u32,
    /// Unrotated vertices in canvas space
    pub vertices: Vec<Vec2>,
    pub color: Hsl,
    pub created: f64,
    pub lifetime: f64,
    pub body: Body,
}

impl FilledPolygon {
    pub fn expired(&self, now: f64) -> bool {
        now - self.created >= self.lifetime
    }

    /// Vertices rotated about the centroid, in canvas space
    pub fn world_vertices(&self) -> Vec<Vec2> {
        let Some(c) = super::geometry::centroid(&self.vertices) else {
            return Vec::new();
        };
        self.vertices
            .iter()
            .map(|&v| c + rotate(v - c, self.body.rotation))
            .collect()
    }

    pub fn translate(&mut self, delta: Vec2) {
        for v in &mut self.vertices {
            *v += delta;
        }
    }
}

/// A segment sweeping across the canvas, reflecting at the edges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelingLine {
    pub id: u32,
    pub head: Vec2,
    /// Pixels per frame
    pub velocity: Vec2,
    pub color: Hsl,
}

impl TravelingLine {
    pub fn tail(&self) -> Vec2 {
        self.head - self.velocity * LINE_TAIL_FACTOR
    }

    /// Step once and flip any velocity component whose axis left the canvas
    pub fn advance(&mut self, bounds: Vec2) {
        self.head += self.velocity;
        if self.head.x < 0.0 || self.head.x > bounds.x {
            self.velocity.x = -self.velocity.x;
        }
        if self.head.y < 0.0 || self.head.y > bounds.y {
            self.velocity.y = -self.velocity.y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_opacity_ramp() {
        assert_eq!(lifetime_opacity(0.0, 1000.0), 1.0);
        assert_eq!(lifetime_opacity(700.0, 1000.0), 1.0);
        assert!((lifetime_opacity(850.0, 1000.0) - 0.5).abs() < 1e-6);
        assert_eq!(lifetime_opacity(1000.0, 1000.0), 0.0);
        assert_eq!(lifetime_opacity(2000.0, 1000.0), 0.0);
    }

    #[test]
    fn test_body_coast_decays_exponentially() {
        let mut body = Body::new(0.2, 0.0);
        body.velocity = Vec2::new(10.0, 0.0);
        body.rotation_velocity = 0.01;
        body.last_interaction = Some(0.0);

        let d1 = body.coast(16.0);
        assert!((d1.x - 9.5).abs() < 1e-5);
        let d2 = body.coast(32.0);
        assert!((d2.x - 9.025).abs() < 1e-4);
        assert!((body.rotation - (0.0095 + 0.009025)).abs() < 1e-6);

        // Outside the window the body stops drifting
        let d3 = body.coast(1000.0);
        assert_eq!(d3, Vec2::ZERO);
    }

    #[test]
    fn test_body_without_interaction_stays_put() {
        let mut body = Body::new(0.2, 0.3);
        assert_eq!(body.coast(5.0), Vec2::ZERO);
        assert_eq!(body.rotation, 0.3);
    }

    #[test]
    fn test_line_reflects_at_edges() {
        let mut line = TravelingLine {
            id: 1,
            head: Vec2::new(99.0, 50.0),
            velocity: Vec2::new(3.0, -1.0),
            color: Hsl::new(10, 80, 60),
        };
        line.advance(Vec2::new(100.0, 100.0));
        assert_eq!(line.head, Vec2::new(102.0, 49.0));
        assert_eq!(line.velocity, Vec2::new(-3.0, -1.0));
        assert_eq!(line.tail(), Vec2::new(102.0 + 150.0, 49.0 + 50.0));
    }

    #[test]
    fn test_filter_css() {
        assert_eq!(ImageFilter::None.css(), None);
        assert_eq!(ImageFilter::Blur(1.5).css().as_deref(), Some("blur(1.5px)"));
        assert_eq!(
            ImageFilter::HueRotate(90.0).css().as_deref(),
            Some("hue-rotate(90deg)")
        );
    }

    #[test]
    fn test_polygon_world_vertices_rotate_about_centroid() {
        let mut poly = FilledPolygon {
            id: 1,
            vertices: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(2.0, 0.0),
                Vec2::new(2.0, 2.0),
                Vec2::new(0.0, 2.0),
            ],
            color: Hsl::new(0, 70, 50),
            created: 0.0,
            lifetime: 1.0,
            body: Body::new(0.1, std::f32::consts::FRAC_PI_2),
        };
        let w = poly.world_vertices();
        assert!((w[0] - Vec2::new(2.0, 0.0)).length() < 1e-5);
        poly.translate(Vec2::new(1.0, 1.0));
        assert_eq!(poly.vertices[0], Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_image_to_local_undoes_rotation() {
        let image = FloatingImage {
            id: 1,
            pos: Vec2::new(100.0, 100.0),
            size: Vec2::new(200.0, 100.0),
            shape: ShapeMask::Diamond,
            filter: ImageFilter::None,
            source: ImageSource {
                seed: 1,
                width: 200,
                height: 100,
            },
            ready: true,
            created: 0.0,
            lifetime: 1000.0,
            body: Body::new(0.1, std::f32::consts::FRAC_PI_2),
        };
        // Centre maps to the middle of the box regardless of rotation
        assert!((image.to_local(image.center()) - Vec2::new(100.0, 50.0)).length() < 1e-4);
        // A point 40px below the centre lies 40px along local +x after a quarter turn
        let local = image.to_local(image.center() + Vec2::new(0.0, 40.0));
        assert!((local - Vec2::new(140.0, 50.0)).length() < 1e-4);
        assert!(image.contains(image.center() + Vec2::new(0.0, 40.0)));
    }
}
