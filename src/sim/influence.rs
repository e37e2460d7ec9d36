//! Pointer-influence field
//!
//! Entities inside a field radius are pushed toward, away from, or around the
//! pointer with quadratic falloff. Entities carrying a `Body` additionally get
//! an inertial kick whenever they are touched by the field at a new instant.

use glam::Vec2;
use rand::Rng;

use super::entity::{Body, Reaction, ReactionMode};
use crate::consts::{PUSH_STRENGTH, SPIN_KICK};

/// Field around the pointer as felt by images (applied to the top-left corner)
pub const IMAGE_FIELD: Reaction = Reaction::new(ReactionMode::Repel, 0.7, 160.0);
/// Field felt by words (applied to the baseline anchor)
pub const WORD_FIELD: Reaction = Reaction::new(ReactionMode::Repel, 0.8, 180.0);
/// Field felt by polygons (applied to the centroid)
pub const POLYGON_FIELD: Reaction = Reaction::new(ReactionMode::Repel, 1.0, 220.0);

/// Result of applying the field to a body-carrying entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Influence {
    pub position: Vec2,
    /// The body received a fresh impulse this call
    pub kicked: bool,
}

/// Field displacement for a point, scaled by `multiplier`.
///
/// Returns `position` unchanged when the pointer is inactive or farther than
/// the field radius.
pub fn apply_field(position: Vec2, pointer: Option<Vec2>, field: &Reaction, multiplier: f32) -> Vec2 {
    let Some(pointer) = pointer else {
        return position;
    };
    let d = pointer - position;
    let distance = d.length();
    if distance > field.radius || field.radius <= 0.0 {
        return position;
    }
    let falloff = 1.0 - distance / field.radius;
    let scale = falloff * falloff * field.strength * multiplier;
    match field.mode {
        ReactionMode::Attract => position + d * scale,
        ReactionMode::Repel => position - d * scale,
        ReactionMode::Orbit => position + d.perp() * scale,
    }
}

/// Field displacement plus inertial impulse for an entity with a `Body`.
///
/// The impulse fires whenever the body's last interaction timestamp differs
/// from `now`: velocity points away from the pointer, spin is a small random
/// value, both scaled by the body's reaction strength.
pub fn apply_influence<R: Rng>(
    position: Vec2,
    pointer: Option<Vec2>,
    field: &Reaction,
    body: &mut Body,
    now: f64,
    rng: &mut R,
) -> Influence {
    let moved = apply_field(position, pointer, field, body.reaction_strength);
    let contact = pointer.filter(|p| field.radius > 0.0 && (*p - position).length() <= field.radius);

    let kicked = match contact {
        Some(pointer) if body.last_interaction != Some(now) => {
            let push = PUSH_STRENGTH * body.reaction_strength;
            body.velocity = (position - pointer) * push;
            body.rotation_velocity =
                (rng.random::<f32>() - 0.5) * SPIN_KICK * body.reaction_strength;
            body.last_interaction = Some(now);
            true
        }
        _ => false,
    };

    Influence {
        position: moved,
        kicked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn repel() -> Reaction {
        Reaction::new(ReactionMode::Repel, 0.8, 100.0)
    }

    #[test]
    fn test_far_pointer_is_identity() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut body = Body::new(0.2, 0.0);
        let pos = Vec2::new(10.0, 10.0);
        let out = apply_influence(pos, Some(Vec2::new(500.0, 500.0)), &repel(), &mut body, 16.0, &mut rng);
        assert_eq!(out.position, pos);
        assert!(!out.kicked);
        assert_eq!(body.velocity, Vec2::ZERO);
        assert_eq!(body.last_interaction, None);
    }

    #[test]
    fn test_inactive_pointer_is_identity() {
        let pos = Vec2::new(10.0, 10.0);
        assert_eq!(apply_field(pos, None, &repel(), 1.0), pos);
    }

    #[test]
    fn test_repel_quadratic_falloff() {
        // Pointer 50px to the right at radius 100: falloff 0.25, times strength 0.8
        let pos = Vec2::ZERO;
        let out = apply_field(pos, Some(Vec2::new(50.0, 0.0)), &repel(), 1.0);
        assert!((out.x - (-50.0 * 0.25 * 0.8)).abs() < 1e-5);
        assert_eq!(out.y, 0.0);
    }

    #[test]
    fn test_attract_and_orbit_directions() {
        let pointer = Some(Vec2::new(0.0, 40.0));
        let attract = Reaction::new(ReactionMode::Attract, 1.0, 100.0);
        let orbit = Reaction::new(ReactionMode::Orbit, 1.0, 100.0);
        let a = apply_field(Vec2::ZERO, pointer, &attract, 1.0);
        assert!(a.y > 0.0 && a.x == 0.0);
        let o = apply_field(Vec2::ZERO, pointer, &orbit, 1.0);
        // Perpendicular to the offset, same magnitude as attract
        assert!(o.y.abs() < 1e-6);
        assert!((o.length() - a.length()).abs() < 1e-5);
    }

    #[test]
    fn test_kick_once_per_instant() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut body = Body::new(0.2, 0.0);
        let pos = Vec2::new(100.0, 100.0);
        let pointer = Some(Vec2::new(120.0, 100.0));

        let first = apply_influence(pos, pointer, &repel(), &mut body, 50.0, &mut rng);
        assert!(first.kicked);
        assert!((body.velocity.x - (-20.0 * PUSH_STRENGTH * 0.2)).abs() < 1e-6);
        assert!(body.rotation_velocity.abs() <= 0.5 * SPIN_KICK * 0.2);
        assert_eq!(body.last_interaction, Some(50.0));

        let again = apply_influence(pos, pointer, &repel(), &mut body, 50.0, &mut rng);
        assert!(!again.kicked);

        let later = apply_influence(pos, pointer, &repel(), &mut body, 66.0, &mut rng);
        assert!(later.kicked);
    }

    #[test]
    fn test_displacement_scales_with_reaction_strength() {
        let mut rng = Pcg32::seed_from_u64(3);
        let pointer = Some(Vec2::new(30.0, 0.0));
        let mut weak = Body::new(0.1, 0.0);
        let mut strong = Body::new(0.3, 0.0);
        let w = apply_influence(Vec2::ZERO, pointer, &repel(), &mut weak, 1.0, &mut rng);
        let s = apply_influence(Vec2::ZERO, pointer, &repel(), &mut strong, 1.0, &mut rng);
        assert!((s.position.x / w.position.x - 3.0).abs() < 1e-4);
    }
}
