//! Platform layer
//!
//! Browser-facing helpers that do not need the browser: HUD formatting, the
//! touch-budget bar, canvas placement and the evasive bomb button. The DOM
//! wiring itself lives in `web` (wasm32 only).

use glam::Vec2;

use crate::sim::Rect;
use crate::sim::round::RoundSummary;
use crate::sim::spawn::capitalise;

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Pointer closer than this to the bomb button's centre pushes it away (px)
pub const EVADE_RADIUS: f32 = 48.0;
/// Furthest the bomb button slides away (px)
pub const EVADE_DISTANCE: f32 = 28.0;
/// Keep this much window margin when sliding (px)
pub const EVADE_MARGIN: f32 = 2.0;
/// The button snaps back this long after the last push (ms)
pub const EVADE_RESET_MS: f64 = 600.0;
/// Taunts shown while the button dodges
pub const NOPE_TEXTS: [&str; 3] = ["nope", "no", "nooo"];

/// Remaining-budget bar: width in percent plus CSS background
pub fn touch_bar(remaining_fraction: f64) -> (f64, &'static str) {
    let percent = remaining_fraction.clamp(0.0, 1.0) * 100.0;
    let background = if percent > 60.0 {
        "linear-gradient(90deg,#4caf50,#ffeb3b)"
    } else if percent > 30.0 {
        "linear-gradient(90deg,#ffeb3b,#f44336)"
    } else {
        "linear-gradient(90deg,#f44336,#900)"
    };
    (percent, background)
}

/// Seconds with one decimal
pub fn format_seconds(secs: f64) -> String {
    format!("{:.1}", secs.max(0.0))
}

/// 1-based level for display
pub fn display_level(level: u32) -> String {
    (level + 1).to_string()
}

/// Lines of the game-over panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOverText {
    pub survived: String,
    pub level: String,
    pub mode: String,
}

impl GameOverText {
    pub fn from_summary(summary: &RoundSummary) -> Self {
        Self {
            survived: format!(
                "You survived for {} seconds",
                format_seconds(summary.survived_seconds)
            ),
            level: format!("Reached Level {}", display_level(summary.level_reached)),
            mode: capitalise(&summary.mode_name),
        }
    }
}

/// CSS centring a `size` canvas in the viewport
pub fn canvas_style(size: Vec2) -> String {
    format!(
        "position:absolute; left:calc(50% - {}px); top:calc(50% - {}px); width:{}px; height:{}px;",
        size.x / 2.0,
        size.y / 2.0,
        size.x,
        size.y
    )
}

/// Map a client-space point into canvas pixels given the canvas's client rect
pub fn client_to_canvas(client: Vec2, canvas_rect: Rect, canvas: Vec2) -> Vec2 {
    if canvas_rect.w <= 0.0 || canvas_rect.h <= 0.0 {
        return client;
    }
    let scale = canvas / Vec2::new(canvas_rect.w, canvas_rect.h);
    (client - Vec2::new(canvas_rect.x, canvas_rect.y)) * scale
}

/// Bomb button rect in canvas pixels: the client rect scaled by canvas size
/// over viewport size
pub fn hotspot_in_canvas(button: Rect, canvas: Vec2, viewport: Vec2) -> Rect {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return button;
    }
    let scale = canvas / viewport;
    Rect::new(
        button.x * scale.x,
        button.y * scale.y,
        button.w * scale.x,
        button.h * scale.y,
    )
}

/// Offset that slides the bomb button away from a nearby pointer, kept inside
/// the window. `None` when the pointer is not close enough to matter.
pub fn evade_offset(button: Rect, pointer: Vec2, viewport: Vec2) -> Option<Vec2> {
    let center = Vec2::new(button.x + button.w / 2.0, button.y + button.h / 2.0);
    let away = center - pointer;
    let dist = away.length();
    if dist >= EVADE_RADIUS {
        return None;
    }
    let dir = if dist > 0.0 { away / dist } else { Vec2::X };
    let offset = dir * EVADE_DISTANCE * (1.0 - dist / EVADE_RADIUS);

    let min = Vec2::new(EVADE_MARGIN - button.x, EVADE_MARGIN - button.y);
    let max = Vec2::new(
        viewport.x - (button.x + button.w) - EVADE_MARGIN,
        viewport.y - (button.y + button.h) - EVADE_MARGIN,
    );
    Some(Vec2::new(
        offset.x.min(max.x).max(min.x),
        offset.y.min(max.y).max(min.y),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::round::EndReason;

    #[test]
    fn test_touch_bar_colours() {
        assert_eq!(touch_bar(1.0), (100.0, "linear-gradient(90deg,#4caf50,#ffeb3b)"));
        assert_eq!(touch_bar(0.6).1, "linear-gradient(90deg,#ffeb3b,#f44336)");
        assert_eq!(touch_bar(0.45).1, "linear-gradient(90deg,#ffeb3b,#f44336)");
        assert_eq!(touch_bar(0.3).1, "linear-gradient(90deg,#f44336,#900)");
        assert_eq!(touch_bar(-1.0).0, 0.0);
    }

    #[test]
    fn test_game_over_text() {
        let summary = RoundSummary {
            reason: EndReason::Lost,
            survived_seconds: 6.04,
            level_reached: 1,
            mode_name: "hardcore".to_string(),
        };
        let text = GameOverText::from_summary(&summary);
        assert_eq!(text.survived, "You survived for 6.0 seconds");
        assert_eq!(text.level, "Reached Level 2");
        assert_eq!(text.mode, "Hardcore");
    }

    #[test]
    fn test_client_to_canvas_scales_and_offsets() {
        let rect = Rect::new(100.0, 50.0, 400.0, 300.0);
        let p = client_to_canvas(Vec2::new(300.0, 200.0), rect, Vec2::new(800.0, 600.0));
        assert_eq!(p, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_hotspot_scaling() {
        let button = Rect::new(1000.0, 400.0, 20.0, 20.0);
        let h = hotspot_in_canvas(button, Vec2::new(600.0, 400.0), Vec2::new(1200.0, 800.0));
        assert_eq!(h, Rect::new(500.0, 200.0, 10.0, 10.0));
    }

    #[test]
    fn test_evade_pushes_away_and_stays_in_window() {
        let viewport = Vec2::new(1000.0, 800.0);
        let button = Rect::new(500.0, 400.0, 20.0, 20.0);
        // Pointer left of centre pushes right, at most 28px
        let off = evade_offset(button, Vec2::new(500.0, 410.0), viewport).unwrap();
        assert!(off.x > 0.0 && off.x <= EVADE_DISTANCE);
        assert!(off.y.abs() < 1e-5);
        assert!(evade_offset(button, Vec2::new(400.0, 410.0), viewport).is_none());

        // Flush against the right edge: cannot slide further right
        let edge = Rect::new(976.0, 400.0, 20.0, 20.0);
        let off = evade_offset(edge, Vec2::new(980.0, 410.0), viewport).unwrap();
        assert!(off.x <= 2.0);
    }

    #[test]
    fn test_canvas_style_centres() {
        let css = canvas_style(Vec2::new(800.0, 600.0));
        assert!(css.contains("left:calc(50% - 400px)"));
        assert!(css.contains("top:calc(50% - 300px)"));
    }
}
