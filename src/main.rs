//! Art Dodge entry point
//!
//! On the web this installs logging and hands off to the platform layer. The
//! native build has no window; it plays a scripted round headless and logs how
//! long the pointer survived.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&JsValue::from_str(&format!("logger init failed: {e}")));
    }

    log::info!("Art Dodge starting...");
    art_dodge::platform::web::run()?;
    log::info!("Art Dodge running!");
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Art Dodge (native) starting...");
    log::info!("Native mode runs a headless round - serve the wasm build to play");

    let mode_name = std::env::args().nth(1).unwrap_or_else(|| "medium".to_string());
    let Some(mode) = art_dodge::sim::Mode::from_name(&mode_name) else {
        log::error!("Unknown mode '{}', expected easy|medium|hard|hardcore", mode_name);
        std::process::exit(2);
    };
    let seed = std::env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    let summary = headless::play(mode, seed);
    println!(
        "{} round: survived {:.1}s, reached level {}",
        summary.mode_name,
        summary.survived_seconds,
        summary.level_reached + 1
    );
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use art_dodge::sim::{
        ApproxMetrics, FrameInput, GameEvent, GameState, Mode, RoundSummary, tick,
    };
    use glam::Vec2;

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Stop after ten minutes of simulated time even if the pointer is winning
    const MAX_FRAMES: u32 = 60 * 600;

    /// Pointer sweeping a Lissajous curve across the canvas
    fn scripted_pointer(canvas: Vec2, t: f64) -> Vec2 {
        let t = t as f32 / 1000.0;
        let half = canvas / 2.0;
        half + Vec2::new((t * 1.3).sin() * half.x * 0.8, (t * 1.7).cos() * half.y * 0.8)
    }

    pub fn play(mode: Mode, seed: u64) -> RoundSummary {
        let mut state = GameState::new(seed);
        state.start_round(mode.config(), 0.0, VIEWPORT);

        let mut now = 0.0;
        let mut touches = 0u32;
        for _ in 0..MAX_FRAMES {
            now += FRAME_MS;
            let pointer = scripted_pointer(state.canvas, now);
            state.pointer_moved(pointer, now);
            tick(
                &mut state,
                &FrameInput {
                    now,
                    viewport: VIEWPORT,
                    hotspot: None,
                },
                &ApproxMetrics,
            );

            for event in state.drain_events() {
                match event {
                    GameEvent::LevelUp { level } => log::info!("Level {}", level + 1),
                    GameEvent::Cue(art_dodge::sim::Cue::Collision) => touches += 1,
                    GameEvent::ImageRequested { id, .. } => state.set_image_ready(id, true),
                    GameEvent::RoundEnded(summary) => {
                        log::info!("Round over after {} touches", touches);
                        return summary;
                    }
                    _ => {}
                }
            }
        }

        log::info!("Frame limit reached after {} touches", touches);
        state.round.finish(now)
    }
}
