//! Scene construction
//!
//! Turns a `GameState` into an ordered list of plain drawing commands. Nothing
//! here touches the browser, so the whole frame layout is unit-testable; the
//! Canvas 2D backend just replays the list.

use glam::Vec2;

use crate::sim::entity::{FloatingImage, Hsl, PatternProcess};
use crate::sim::GameState;

/// Stroke width for traveling lines
pub const LINE_STROKE: f32 = 3.0;
/// Opacity of filled polygons
pub const POLYGON_ALPHA: f32 = 0.7;
/// Process gradient runs this far along both axes from the origin
pub const PROCESS_GRADIENT_SPAN: f32 = 200.0;
/// Pointer trail stroke width
pub const POINTER_TRAIL_WIDTH: f32 = 3.0;
/// Pointer dot and glow radii
pub const POINTER_DOT_RADIUS: f32 = 5.0;
pub const POINTER_GLOW_RADIUS: f32 = 8.0;
/// Warning ring drawn around a camping pointer
pub const CAMP_HALO_RADIUS: f32 = 24.0;

/// Fill or stroke style
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(String),
    /// Linear gradient between two canvas points with `(offset, css colour)` stops
    Linear {
        from: Vec2,
        to: Vec2,
        stops: Vec<(f32, String)>,
    },
}

/// One drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Wipe the whole canvas
    Clear { size: Vec2 },
    /// Loaded picture clipped to `outline` (local, origin at the top-left of
    /// the unrotated box), rotated about the box centre
    Image {
        id: u32,
        pos: Vec2,
        size: Vec2,
        rotation: f32,
        outline: Vec<Vec2>,
        filter: Option<String>,
        alpha: f32,
    },
    /// Filled text anchored at the baseline-left corner
    Text {
        text: String,
        font: String,
        pos: Vec2,
        rotation: f32,
        color: String,
        alpha: f32,
    },
    /// Closed filled polygon in canvas space
    Polygon {
        points: Vec<Vec2>,
        color: String,
        alpha: f32,
    },
    /// Independent stroked segments sharing one style
    Segments {
        segments: Vec<(Vec2, Vec2)>,
        paint: Paint,
        width: f32,
        alpha: f32,
    },
    /// Connected stroked path with round caps and joins
    Polyline {
        points: Vec<Vec2>,
        paint: Paint,
        width: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        paint: Paint,
        /// Stroke width, `None` to fill
        stroke: Option<f32>,
    },
}

/// Renderer options that come from user settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOptions {
    pub pointer_trail: bool,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self { pointer_trail: true }
    }
}

/// Gradient stroke for the `index`th process: hue drifts with the curve
/// parameter and is offset by 60 degrees per slot
pub fn process_paint(process: &PatternProcess, index: usize) -> Paint {
    let hue = (process.time * 0.2 + index as f32 * 60.0).rem_euclid(360.0);
    let end = (hue + 120.0).rem_euclid(360.0);
    Paint::Linear {
        from: process.origin,
        to: process.origin + Vec2::splat(PROCESS_GRADIENT_SPAN),
        stops: vec![
            (0.0, format!("hsl({hue}, 90%, 60%)")),
            (1.0, format!("hsl({end}, 90%, 60%)")),
        ],
    }
}

fn image_cmd(image: &FloatingImage, now: f64) -> DrawCmd {
    DrawCmd::Image {
        id: image.id,
        pos: image.pos,
        size: image.size,
        rotation: image.body.rotation,
        outline: image.shape.outline(image.size.x, image.size.y),
        filter: image.filter.css(),
        alpha: image.opacity(now),
    }
}

fn pointer_cmds(state: &GameState, out: &mut Vec<DrawCmd>) {
    let pointer = &state.pointer;
    if !pointer.active || pointer.trail.len() < 2 {
        return;
    }
    let points: Vec<Vec2> = pointer.trail.iter().copied().collect();
    let (first, last) = (points[0], points[points.len() - 1]);
    out.push(DrawCmd::Polyline {
        points,
        paint: Paint::Linear {
            from: first,
            to: last,
            stops: vec![
                (0.0, "rgba(255, 255, 255, 0.1)".to_string()),
                (1.0, "rgba(255, 255, 255, 0.8)".to_string()),
            ],
        },
        width: POINTER_TRAIL_WIDTH,
    });
    out.push(DrawCmd::Circle {
        center: pointer.position,
        radius: POINTER_DOT_RADIUS,
        paint: Paint::Solid("rgba(255, 255, 255, 0.8)".to_string()),
        stroke: None,
    });
    out.push(DrawCmd::Circle {
        center: pointer.position,
        radius: POINTER_GLOW_RADIUS,
        paint: Paint::Solid("rgba(255, 255, 255, 0.3)".to_string()),
        stroke: None,
    });
    if pointer.is_camping() {
        out.push(DrawCmd::Circle {
            center: pointer.position,
            radius: CAMP_HALO_RADIUS,
            paint: Paint::Solid("rgba(244, 67, 54, 0.6)".to_string()),
            stroke: Some(2.0),
        });
    }
}

/// Build the frame's draw list, back to front
pub fn build_scene(state: &GameState, now: f64, options: SceneOptions) -> Vec<DrawCmd> {
    let pools = &state.pools;
    let mut out = Vec::with_capacity(
        8 + pools.polygons.len()
            + pools.lines.len()
            + pools.words.len()
            + pools.images.len()
            + pools.processes.len(),
    );
    out.push(DrawCmd::Clear { size: state.canvas });

    if options.pointer_trail {
        pointer_cmds(state, &mut out);
    }

    for polygon in &pools.polygons {
        let points = polygon.world_vertices();
        if points.len() < 3 {
            continue;
        }
        out.push(DrawCmd::Polygon {
            points,
            color: polygon.color.css(),
            alpha: POLYGON_ALPHA,
        });
    }

    for line in &pools.lines {
        out.push(DrawCmd::Segments {
            segments: vec![(line.head, line.tail())],
            paint: Paint::Solid(line.color.css()),
            width: LINE_STROKE,
            alpha: 1.0,
        });
    }

    for word in &pools.words {
        // Colour is assigned on the word's first simulated frame
        let color = word.color.unwrap_or(Hsl::new(0, 80, 60));
        out.push(DrawCmd::Text {
            text: word.text.clone(),
            font: word.font(),
            pos: word.pos,
            rotation: word.body.rotation,
            color: color.css(),
            alpha: word.opacity(now),
        });
    }

    out.extend(pools.images.iter().filter(|i| i.ready).map(|i| image_cmd(i, now)));

    for (index, process) in pools.processes.iter().enumerate() {
        if process.trail.len() < 2 {
            continue;
        }
        let alpha = match process.fade_start {
            Some(start) if process.fade_duration > 0.0 => {
                let progress = ((now - start) / process.fade_duration).clamp(0.0, 1.0);
                process.alpha * (1.0 - progress as f32)
            }
            Some(_) => 0.0,
            None => process.alpha,
        };
        out.push(DrawCmd::Segments {
            segments: process.segments().collect(),
            paint: process_paint(process, index),
            width: process.line_width,
            alpha,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::round::Mode;
    use crate::sim::spawn;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    fn running_state() -> GameState {
        let mut state = GameState::new(11);
        state.start_round(Mode::Easy.config(), 0.0, VIEWPORT);
        state
    }

    #[test]
    fn test_scene_starts_with_clear() {
        let state = running_state();
        let scene = build_scene(&state, 0.0, SceneOptions::default());
        assert_eq!(scene[0], DrawCmd::Clear { size: VIEWPORT });
    }

    #[test]
    fn test_unloaded_images_are_skipped() {
        let mut state = running_state();
        let id = state.next_entity_id();
        let image = spawn::create_image(&mut state.rng, id, 0.0, VIEWPORT);
        state.pools.images.push(image);

        let count = |s: &GameState| {
            build_scene(s, 0.0, SceneOptions::default())
                .iter()
                .filter(|c| matches!(c, DrawCmd::Image { .. }))
                .count()
        };
        assert_eq!(count(&state), 0);
        state.set_image_ready(id, true);
        assert_eq!(count(&state), 1);
    }

    #[test]
    fn test_process_needs_two_points() {
        let mut state = running_state();
        let segments = |s: &GameState| {
            build_scene(s, 0.0, SceneOptions::default())
                .iter()
                .filter(|c| matches!(c, DrawCmd::Segments { .. }))
                .count()
        };
        assert_eq!(segments(&state), 0);
        let process = &mut state.pools.processes[0];
        process.record(Vec2::new(1.0, 1.0));
        process.record(Vec2::new(2.0, 2.0));
        assert_eq!(segments(&state), 1);
    }

    #[test]
    fn test_process_gradient_hue() {
        let mut state = running_state();
        let process = &mut state.pools.processes[0];
        process.time = 1000.0;
        match process_paint(process, 2) {
            Paint::Linear { from, to, stops } => {
                assert_eq!(to - from, Vec2::splat(200.0));
                // (1000 * 0.2 + 120) % 360 = 320, end = 440 % 360 = 80
                assert_eq!(stops[0].1, "hsl(320, 90%, 60%)");
                assert_eq!(stops[1].1, "hsl(80, 90%, 60%)");
            }
            other => panic!("expected gradient, got {other:?}"),
        }
    }

    #[test]
    fn test_fading_process_alpha() {
        let mut state = running_state();
        let process = &mut state.pools.processes[0];
        process.record(Vec2::ZERO);
        process.record(Vec2::ONE);
        process.alpha = 0.8;
        process.fade_duration = 2000.0;
        process.fade_start = Some(1000.0);
        let scene = build_scene(&state, 2000.0, SceneOptions::default());
        let alpha = scene
            .iter()
            .find_map(|c| match c {
                DrawCmd::Segments { alpha, width, .. } if *width != LINE_STROKE => Some(*alpha),
                _ => None,
            })
            .unwrap();
        assert!((alpha - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_pointer_trail_toggle_and_halo() {
        let mut state = running_state();
        state.pointer_moved(Vec2::new(100.0, 100.0), 0.0);
        state.pointer_moved(Vec2::new(102.0, 101.0), 16.0);

        let with_trail = build_scene(&state, 16.0, SceneOptions::default());
        assert!(with_trail.iter().any(|c| matches!(c, DrawCmd::Polyline { .. })));
        // Barely moved over the window: halo ring is drawn
        assert!(with_trail
            .iter()
            .any(|c| matches!(c, DrawCmd::Circle { stroke: Some(_), .. })));

        let without = build_scene(&state, 16.0, SceneOptions { pointer_trail: false });
        assert!(!without.iter().any(|c| matches!(c, DrawCmd::Polyline { .. } | DrawCmd::Circle { .. })));
    }

    #[test]
    fn test_polygons_drawn_translucent() {
        let mut state = running_state();
        let id = state.next_entity_id();
        let polygon = spawn::create_polygon(&mut state.rng, id, 0.0, VIEWPORT);
        state.pools.polygons.push(polygon);
        let scene = build_scene(&state, 0.0, SceneOptions::default());
        assert!(scene
            .iter()
            .any(|c| matches!(c, DrawCmd::Polygon { alpha, .. } if *alpha == POLYGON_ALPHA)));
    }
}
