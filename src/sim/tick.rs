//! Per-frame simulation step
//!
//! One call per display refresh while a round is running: ease the canvas
//! size, check the difficulty clock, trim and refill pools, move every entity,
//! hit-test the pointer, then settle the penalty budget.

use glam::Vec2;
use rand::Rng;

use super::entity::{Fade, Hsl};
use super::geometry::{Rect, centroid};
use super::hit::{self, TextMeasure};
use super::influence::{IMAGE_FIELD, POLYGON_FIELD, WORD_FIELD, apply_field, apply_influence};
use super::spawn;
use super::state::{Cue, GameEvent, GameState, canvas_size};
use crate::consts::*;

/// Everything the platform supplies for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    /// Frame timestamp (ms)
    pub now: f64,
    /// Full-scale viewport size (px)
    pub viewport: Vec2,
    /// Bomb button area in canvas coordinates, when shown
    pub hotspot: Option<Rect>,
}

/// Advance the running round by one frame
pub fn tick(state: &mut GameState, input: &FrameInput, metrics: &dyn TextMeasure) {
    if !state.round.is_running() {
        return;
    }
    let now = input.now;

    let scale = state.round.smooth_scale();
    state.canvas = canvas_size(input.viewport, scale);

    if state.round.level_up_due(now) {
        level_up(state, now);
    }

    let caps = state.round.caps;
    state.pools.trim_to(&caps);
    spawn_due(state, now);

    let pointer = state.pointer.live();
    let mut interacted = update_images(state, now, pointer);
    interacted |= update_words(state, now, pointer, metrics);
    interacted |= update_polygons(state, now, pointer);
    update_lines(state);
    update_processes(state, now, pointer);
    if interacted {
        state.push_event(GameEvent::Cue(Cue::Interaction));
    }

    let dt = state.round.frame_dt(now);
    let hotspot = input.hotspot.filter(|_| state.round.bomb_unlocked());
    let touching =
        pointer.is_some_and(|p| hit::is_touching(p, &state.pools, hotspot, metrics));
    if state.round.note_touch(touching) {
        state.push_event(GameEvent::Cue(Cue::Collision));
    }

    // Touching, off-canvas and perfectly still all cost the same, once per frame
    let still = state.pointer.still_this_frame();
    if touching || !state.pointer.active || still {
        state.round.add_penalty(dt);
    }

    if state.round.budget_exhausted() {
        end_round(state, now);
    }
}

fn level_up(state: &mut GameState, now: f64) {
    state.round.level_up(now);
    let level = state.round.level;
    log::info!("Level {} reached, caps {:?}", level, state.round.caps);
    state.fill_processes(now);
    state.push_event(GameEvent::Cue(Cue::LevelUp));
    state.push_event(GameEvent::LevelUp { level });
    state.push_event(GameEvent::Heartbeat {
        interval_ms: state.round.heartbeat_interval_ms(),
    });
}

fn end_round(state: &mut GameState, now: f64) {
    let summary = state.round.finish(now);
    log::info!(
        "Round over: survived {:.1}s, level {}, mode {}",
        summary.survived_seconds,
        summary.level_reached,
        summary.mode_name
    );
    state.push_event(GameEvent::Cue(Cue::GameOver));
    state.push_event(GameEvent::HeartbeatStop);
    state.push_event(GameEvent::RoundEnded(summary));
}

/// Interval spawns. Images and polygons replace the oldest entry at cap;
/// words and lines wait for room.
fn spawn_due(state: &mut GameState, now: f64) {
    let canvas = state.canvas;
    let caps = state.round.caps;

    if now - state.spawn_clock.image > IMAGE_INTERVAL_MS {
        if caps.images > 0 {
            if state.pools.images.len() as u32 >= caps.images {
                state.pools.images.remove(0);
            }
            let id = state.next_entity_id();
            let image = spawn::create_image(&mut state.rng, id, now, canvas);
            log::debug!("Image {} spawned ({:?})", id, image.shape);
            state.push_event(GameEvent::ImageRequested {
                id,
                url: image.source.url(),
            });
            state.pools.images.push(image);
        }
        state.spawn_clock.image = now;
    }

    if now - state.spawn_clock.word > WORD_INTERVAL_MS
        && (state.pools.words.len() as u32) < caps.words
    {
        let id = state.next_entity_id();
        let word = spawn::create_word(&mut state.rng, id, now, canvas);
        log::debug!("Word {} spawned: {}", id, word.text);
        state.pools.words.push(word);
        state.spawn_clock.word = now;
    }

    if now - state.spawn_clock.polygon > POLYGON_INTERVAL_MS {
        if caps.polygons > 0 {
            if state.pools.polygons.len() as u32 >= caps.polygons {
                state.pools.polygons.remove(0);
            }
            let id = state.next_entity_id();
            let polygon = spawn::create_polygon(&mut state.rng, id, now, canvas);
            log::debug!("Polygon {} spawned", id);
            state.pools.polygons.push(polygon);
        }
        state.spawn_clock.polygon = now;
    }

    if now - state.spawn_clock.line > LINE_INTERVAL_MS
        && (state.pools.lines.len() as u32) < caps.lines
    {
        let id = state.next_entity_id();
        let line = spawn::create_line(&mut state.rng, id, canvas);
        state.pools.lines.push(line);
        state.spawn_clock.line = now;
    }
}

/// Returns true if any image was kicked by the pointer
fn update_images(state: &mut GameState, now: f64, pointer: Option<Vec2>) -> bool {
    state.pools.images.retain(|img| !img.expired(now));
    let mut kicked = false;
    for img in state.pools.images.iter_mut().filter(|img| img.ready) {
        let out = apply_influence(img.pos, pointer, &IMAGE_FIELD, &mut img.body, now, &mut state.rng);
        img.pos = out.position + img.body.coast(now);
        kicked |= out.kicked;
    }
    kicked
}

fn update_words(
    state: &mut GameState,
    now: f64,
    pointer: Option<Vec2>,
    metrics: &dyn TextMeasure,
) -> bool {
    state.pools.words.retain(|w| !w.expired(now));
    let mut kicked = false;
    for word in &mut state.pools.words {
        if word.color.is_none() {
            let hue = state.rng.random_range(0..360);
            word.color = Some(Hsl::new(hue, 80, 60));
        }
        if word.width.is_none() {
            word.width = Some(metrics.text_width(&word.text, &word.font(), word.font_size));
        }
        let out = apply_influence(word.pos, pointer, &WORD_FIELD, &mut word.body, now, &mut state.rng);
        word.pos = out.position + word.body.coast(now);
        kicked |= out.kicked;
    }
    kicked
}

fn update_polygons(state: &mut GameState, now: f64, pointer: Option<Vec2>) -> bool {
    state.pools.polygons.retain(|p| !p.expired(now));
    let mut kicked = false;
    for poly in &mut state.pools.polygons {
        let Some(center) = centroid(&poly.vertices) else {
            continue;
        };
        let out = apply_influence(center, pointer, &POLYGON_FIELD, &mut poly.body, now, &mut state.rng);
        let moved = out.position + poly.body.coast(now);
        poly.translate(moved - center);
        kicked |= out.kicked;
    }
    kicked
}

fn update_lines(state: &mut GameState) {
    let bounds = state.canvas;
    for line in &mut state.pools.lines {
        line.advance(bounds);
    }
}

fn update_processes(state: &mut GameState, now: f64, pointer: Option<Vec2>) {
    let canvas = state.canvas;
    let mut finished = Vec::new();

    for (index, process) in state.pools.processes.iter_mut().enumerate() {
        if now >= process.next_switch_at {
            spawn::switch_pattern(&mut state.rng, process, now, canvas);
            log::debug!("Process {} switched to {}", process.id, process.pattern.as_str());
        }

        let pattern = process.pattern;
        let trace = process.trace();
        let raw = pattern.evaluate(&trace, process.time, canvas.x, &mut process.motion, &mut state.rng);
        if !raw.is_finite() {
            log::error!(
                "Pattern {} produced {:?} at t={}",
                pattern.as_str(),
                raw,
                process.time
            );
            process.time += process.speed * PROCESS_TIME_STEP;
            continue;
        }

        let mut pos = apply_field(raw, pointer, &process.reaction, 1.0);
        if pos.x < 0.0 {
            process.direction.x = -process.direction.x;
            pos.x = 0.0;
        }
        if pos.x > canvas.x {
            process.direction.x = -process.direction.x;
            pos.x = canvas.x;
        }
        if pos.y < 0.0 {
            process.direction.y = -process.direction.y;
            pos.y = 0.0;
        }
        if pos.y > canvas.y {
            process.direction.y = -process.direction.y;
            pos.y = canvas.y;
        }
        process.record(pos);

        if process.update_fade(now) == Fade::Done {
            finished.push(index);
            continue;
        }
        process.time += process.speed * PROCESS_TIME_STEP;
    }

    for index in finished {
        let id = state.next_entity_id();
        let fresh = spawn::create_process(&mut state.rng, id, now, canvas);
        log::debug!("Process {} faded out, replaced by {}", state.pools.processes[index].id, id);
        state.pools.processes[index] = fresh;
    }
}
