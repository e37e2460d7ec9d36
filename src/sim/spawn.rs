//! Randomised entity factories
//!
//! Factories never fail: every parameter is drawn from a fixed range with the
//! state's RNG, and a degenerate canvas (narrower than the entity) pins
//! positions to the top-left instead of producing negative ranges.

use std::collections::VecDeque;
use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;

use super::entity::{
    Body, FilledPolygon, FloatingImage, FloatingWord, FontWeight, Hsl, ImageFilter, ImageSource,
    PatternProcess, Reaction, ReactionMode, TravelingLine,
};
use super::pattern::Pattern;
use super::shape::ShapeMask;
use crate::consts::PROCESS_TRAIL_LENGTH;

/// Word pool for floating words (repeats are intentional weighting)
pub const WORDS: [&str; 100] = [
    "apple", "brave", "candle", "dance", "eagle", "forest", "glide", "honest", "island", "jungle",
    "kite", "lemon", "mirror", "night", "ocean", "paint", "quiet", "river", "sunset", "tree",
    "umbrella", "valley", "whisper", "xenon", "yellow", "zebra", "anchor", "breeze", "crystal",
    "drift", "ember", "feather", "grape", "harvest", "ignite", "jewel", "kingdom", "lantern",
    "meadow", "nest", "opal", "pulse", "quest", "ripple", "saddle", "tunnel", "unity", "violet",
    "wander", "yearn", "cosmic", "nebula", "quantum", "stellar", "galaxy", "phoenix", "dragon",
    "unicorn", "mystic", "ethereal", "aurora", "zenith", "celestial", "lunar", "solar", "cosmic",
    "stellar", "nebula", "quantum", "galaxy", "serenity", "tranquility", "harmony", "balance",
    "peace", "calm", "zen", "meditation", "mindful", "spirit", "cascade", "whirlpool", "vortex",
    "spiral", "swirl", "flow", "stream", "current", "wave", "tide", "crystal", "gem", "diamond",
    "ruby", "sapphire", "emerald", "pearl", "opal", "jade", "onyx",
];

/// Uniform draw in `[lo, hi)`
fn between<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    lo + rng.random::<f32>() * (hi - lo)
}

fn between_ms<R: Rng>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    lo + rng.random::<f64>() * (hi - lo)
}

fn pick<R: Rng, T: Copy>(rng: &mut R, items: &[T]) -> T {
    items[rng.random_range(0..items.len())]
}

fn sign<R: Rng>(rng: &mut R) -> f32 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}

fn random_hue<R: Rng>(rng: &mut R) -> u16 {
    rng.random_range(0..360)
}

/// Uniform point inside the canvas
fn anywhere<R: Rng>(rng: &mut R, bounds: Vec2) -> Vec2 {
    Vec2::new(rng.random::<f32>() * bounds.x, rng.random::<f32>() * bounds.y)
}

fn random_reaction<R: Rng>(rng: &mut R) -> Reaction {
    let mode = if rng.random::<f32>() < 0.33 {
        ReactionMode::Attract
    } else if rng.random_bool(0.5) {
        ReactionMode::Repel
    } else {
        ReactionMode::Orbit
    };
    Reaction::new(mode, between(rng, 0.8, 1.0), between(rng, 200.0, 500.0))
}

/// Per-entity reaction multiplier shared by images, words and polygons
fn reaction_strength<R: Rng>(rng: &mut R) -> f32 {
    between(rng, 0.05, 0.3)
}

/// A fresh curve tracer
pub fn create_process<R: Rng>(rng: &mut R, id: u32, now: f64, bounds: Vec2) -> PatternProcess {
    let pattern = pick(rng, &Pattern::ALL);
    let switch_period = between_ms(rng, 5000.0, 10000.0);
    PatternProcess {
        id,
        pattern,
        origin: anywhere(rng, bounds),
        direction: Vec2::new(sign(rng), sign(rng)),
        rotation: rng.random::<f32>() * TAU,
        time: 0.0,
        trail: VecDeque::with_capacity(PROCESS_TRAIL_LENGTH + 1),
        speed: between(rng, 0.2, 1.2),
        line_width: between(rng, 1.0, 8.0),
        alpha: between(rng, 0.2, 1.0),
        created: now,
        lifetime: between_ms(rng, 2000.0, 60000.0),
        fade_duration: between_ms(rng, 1500.0, 3500.0),
        fade_start: None,
        reaction: random_reaction(rng),
        motion: pattern.initial_motion(),
        switch_period,
        next_switch_at: now + switch_period,
    }
}

/// Re-randomise a process in place. The trail buffer is cleared, not
/// replaced, and the reaction descriptor and switch period are kept.
pub fn switch_pattern<R: Rng>(rng: &mut R, process: &mut PatternProcess, now: f64, bounds: Vec2) {
    process.pattern = pick(rng, &Pattern::ALL);
    process.origin = anywhere(rng, bounds);
    process.direction = Vec2::new(sign(rng), sign(rng));
    process.rotation = rng.random::<f32>() * TAU;
    process.time = 0.0;
    process.trail.clear();
    process.speed = between(rng, 0.5, 3.5);
    process.line_width = between(rng, 1.0, 8.0);
    process.alpha = between(rng, 0.2, 1.0);
    process.created = now;
    process.lifetime = between_ms(rng, 2000.0, 60000.0);
    process.fade_start = None;
    process.fade_duration = between_ms(rng, 1500.0, 3500.0);
    process.motion = process.pattern.initial_motion();
    process.next_switch_at = now + process.switch_period;
}

fn random_filter<R: Rng>(rng: &mut R) -> ImageFilter {
    match rng.random_range(0..8) {
        0 => ImageFilter::None,
        1 => ImageFilter::Sepia(between(rng, 0.0, 100.0)),
        2 => ImageFilter::Invert(between(rng, 0.0, 100.0)),
        3 => ImageFilter::Grayscale(between(rng, 0.0, 100.0)),
        4 => ImageFilter::Blur(between(rng, 0.0, 3.0)),
        5 => ImageFilter::Saturate(between(rng, 0.0, 200.0)),
        6 => ImageFilter::HueRotate(between(rng, 0.0, 360.0)),
        _ => ImageFilter::Contrast(between(rng, 0.0, 200.0)),
    }
}

/// A shape-masked picture somewhere inside the canvas
pub fn create_image<R: Rng>(rng: &mut R, id: u32, now: f64, bounds: Vec2) -> FloatingImage {
    let size = Vec2::new(between(rng, 100.0, 400.0), between(rng, 100.0, 400.0));
    let shape = pick(rng, &ShapeMask::ALL);
    let filter = random_filter(rng);
    let source = ImageSource {
        seed: rng.random_range(0..1_000_000_000),
        width: size.x as u32,
        height: size.y as u32,
    };
    let room = (bounds - size).max(Vec2::ZERO);
    FloatingImage {
        id,
        pos: Vec2::new(rng.random::<f32>() * room.x, rng.random::<f32>() * room.y),
        size,
        shape,
        filter,
        source,
        ready: false,
        created: now,
        lifetime: between_ms(rng, 5000.0, 15000.0),
        body: Body::new(reaction_strength(rng), 0.0),
    }
}

pub fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// A word from `WORDS`, randomly cased, sized and tilted
pub fn create_word<R: Rng>(rng: &mut R, id: u32, now: f64, bounds: Vec2) -> FloatingWord {
    let raw = pick(rng, &WORDS);
    let font_size = between(rng, 20.0, 80.0);
    let weight = pick(rng, &FontWeight::ALL);
    let text = match rng.random_range(0..3) {
        0 => raw.to_uppercase(),
        1 => raw.to_lowercase(),
        _ => capitalise(raw),
    };
    let rotation = (rng.random::<f32>() - 0.5) * PI;
    let approx_width = font_size * raw.len() as f32 * 0.6;
    let x = rng.random::<f32>() * (bounds.x - approx_width).max(0.0);
    let y = font_size + rng.random::<f32>() * (bounds.y - font_size).max(0.0);
    FloatingWord {
        id,
        text,
        font_size,
        weight,
        pos: Vec2::new(x, y),
        created: now,
        lifetime: between_ms(rng, 2000.0, 10000.0),
        color: None,
        width: None,
        body: Body::new(reaction_strength(rng), rotation),
    }
}

/// A 3 to 5 sided regular polygon kept 100px away from the canvas border
pub fn create_polygon<R: Rng>(rng: &mut R, id: u32, now: f64, bounds: Vec2) -> FilledPolygon {
    let sides = rng.random_range(3..=5);
    let center = Vec2::new(
        100.0 + rng.random::<f32>() * (bounds.x - 200.0).max(0.0),
        100.0 + rng.random::<f32>() * (bounds.y - 200.0).max(0.0),
    );
    let radius = between(rng, 120.0, 300.0);
    let offset = rng.random::<f32>() * TAU;
    let vertices = (0..sides)
        .map(|i| {
            let angle = offset + i as f32 * TAU / sides as f32;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect();
    FilledPolygon {
        id,
        vertices,
        color: Hsl::new(random_hue(rng), 70, 50),
        created: now,
        lifetime: between_ms(rng, 30000.0, 60000.0),
        body: Body::new(reaction_strength(rng), 0.0),
    }
}

/// A line entering from a random edge
pub fn create_line<R: Rng>(rng: &mut R, id: u32, bounds: Vec2) -> TravelingLine {
    let speed = between(rng, 2.0, 5.0);
    let lateral = (rng.random::<f32>() - 0.5) * speed;
    let along_x = rng.random::<f32>() * bounds.x;
    let along_y = rng.random::<f32>() * bounds.y;
    let (head, velocity) = match rng.random_range(0..4) {
        0 => (Vec2::new(along_x, 0.0), Vec2::new(lateral, speed)),
        1 => (Vec2::new(along_x, bounds.y), Vec2::new(lateral, -speed)),
        2 => (Vec2::new(0.0, along_y), Vec2::new(speed, lateral)),
        _ => (Vec2::new(bounds.x, along_y), Vec2::new(-speed, lateral)),
    };
    TravelingLine {
        id,
        head,
        velocity,
        color: Hsl::new(random_hue(rng), 80, 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const BOUNDS: Vec2 = Vec2::new(1280.0, 720.0);

    #[test]
    fn test_process_ranges() {
        let mut rng = Pcg32::seed_from_u64(7);
        for id in 0..200 {
            let p = create_process(&mut rng, id, 1000.0, BOUNDS);
            assert!((0.2..1.2).contains(&p.speed));
            assert!((1.0..8.0).contains(&p.line_width));
            assert!((0.2..1.0).contains(&p.alpha));
            assert!((2000.0..60000.0).contains(&p.lifetime));
            assert!((1500.0..3500.0).contains(&p.fade_duration));
            assert!((200.0..500.0).contains(&p.reaction.radius));
            assert!((5000.0..10000.0).contains(&p.switch_period));
            assert_eq!(p.next_switch_at, 1000.0 + p.switch_period);
            assert_eq!(p.direction.x.abs(), 1.0);
            assert_eq!(p.direction.y.abs(), 1.0);
            assert!(p.trail.is_empty());
        }
    }

    #[test]
    fn test_switch_pattern_clears_trail_and_keeps_identity() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut p = create_process(&mut rng, 42, 0.0, BOUNDS);
        p.time = 99.0;
        p.fade_start = Some(10.0);
        for i in 0..10 {
            p.record(Vec2::splat(i as f32));
        }
        let reaction = p.reaction;
        let period = p.switch_period;

        switch_pattern(&mut rng, &mut p, 6000.0, BOUNDS);
        assert_eq!(p.id, 42);
        assert!(p.trail.is_empty());
        assert!(p.trail.capacity() >= 10);
        assert_eq!(p.time, 0.0);
        assert_eq!(p.fade_start, None);
        assert_eq!(p.created, 6000.0);
        assert_eq!(p.reaction, reaction);
        assert_eq!(p.next_switch_at, 6000.0 + period);
        assert!((0.5..3.5).contains(&p.speed));
        assert_eq!(p.motion, p.pattern.initial_motion());
    }

    #[test]
    fn test_image_fits_canvas() {
        let mut rng = Pcg32::seed_from_u64(11);
        for id in 0..200 {
            let img = create_image(&mut rng, id, 0.0, BOUNDS);
            assert!((100.0..400.0).contains(&img.size.x));
            assert!((100.0..400.0).contains(&img.size.y));
            assert!(img.pos.x >= 0.0 && img.pos.x + img.size.x <= BOUNDS.x);
            assert!(img.pos.y >= 0.0 && img.pos.y + img.size.y <= BOUNDS.y);
            assert!((5000.0..15000.0).contains(&img.lifetime));
            assert!((0.05..0.3).contains(&img.body.reaction_strength));
            assert!(!img.ready);
            assert!(img.source.url().starts_with("https://picsum.photos/seed/"));
        }
    }

    #[test]
    fn test_image_on_tiny_canvas_pins_to_origin() {
        let mut rng = Pcg32::seed_from_u64(1);
        let img = create_image(&mut rng, 1, 0.0, Vec2::new(50.0, 50.0));
        assert_eq!(img.pos, Vec2::ZERO);
    }

    #[test]
    fn test_word_ranges() {
        let mut rng = Pcg32::seed_from_u64(5);
        for id in 0..200 {
            let w = create_word(&mut rng, id, 0.0, BOUNDS);
            assert!((20.0..80.0).contains(&w.font_size));
            assert!((2000.0..10000.0).contains(&w.lifetime));
            assert!(w.body.rotation >= -PI / 2.0 && w.body.rotation < PI / 2.0);
            assert!(w.pos.y >= w.font_size);
            assert!(w.color.is_none());
            let lower = w.text.to_lowercase();
            assert!(WORDS.contains(&lower.as_str()));
        }
    }

    #[test]
    fn test_capitalise() {
        assert_eq!(capitalise("nebula"), "Nebula");
        assert_eq!(capitalise("ZEN"), "Zen");
        assert_eq!(capitalise(""), "");
    }

    #[test]
    fn test_polygon_shape() {
        let mut rng = Pcg32::seed_from_u64(9);
        for id in 0..100 {
            let poly = create_polygon(&mut rng, id, 0.0, BOUNDS);
            assert!((3..=5).contains(&poly.vertices.len()));
            assert!((30000.0..60000.0).contains(&poly.lifetime));
            let c = crate::sim::geometry::centroid(&poly.vertices).unwrap();
            assert!(c.x >= 99.0 && c.x <= BOUNDS.x - 99.0);
            for v in &poly.vertices {
                let r = (*v - c).length();
                assert!((119.0..301.0).contains(&r));
            }
        }
    }

    #[test]
    fn test_line_starts_on_edge_heading_inward() {
        let mut rng = Pcg32::seed_from_u64(13);
        for id in 0..100 {
            let line = create_line(&mut rng, id, BOUNDS);
            let on_edge = line.head.x == 0.0
                || line.head.x == BOUNDS.x
                || line.head.y == 0.0
                || line.head.y == BOUNDS.y;
            assert!(on_edge);
            let next = line.head + line.velocity;
            assert!(next.x >= -2.5 && next.x <= BOUNDS.x + 2.5);
            assert!(next.y >= -2.5 && next.y <= BOUNDS.y + 2.5);
            let speed = line.velocity.x.abs().max(line.velocity.y.abs());
            assert!((2.0..5.0).contains(&speed));
        }
    }
}
