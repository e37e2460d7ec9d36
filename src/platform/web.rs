//! Browser wiring
//!
//! Owns the one `Game` instance, forwards pointer events into the simulation,
//! runs the `requestAnimationFrame` loop, keeps the HUD and bomb button in sync
//! and exposes the round controls to JavaScript.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, MouseEvent, TouchEvent, Window};

use super::{
    EVADE_RESET_MS, GameOverText, NOPE_TEXTS, canvas_style, client_to_canvas, evade_offset,
    format_seconds, display_level, hotspot_in_canvas, touch_bar,
};
use crate::audio::AudioManager;
use crate::renderer::{CanvasRenderer, SceneOptions, build_scene};
use crate::settings::Settings;
use crate::sim::round::{Mode, ModeConfig, RoundSummary};
use crate::sim::spawn::capitalise;
use crate::sim::{FrameInput, GameEvent, GameState, Rect, tick};

const CANVAS_ID: &str = "artCanvas";
const BOMB_BASE_TRANSFORM: &str = "translateY(-50%)";

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

thread_local! {
    static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

fn viewport() -> Vec2 {
    let Some(w) = web_sys::window() else {
        return Vec2::ZERO;
    };
    let width = w.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = w.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Vec2::new(width as f32, height as f32)
}

fn client_rect(el: &Element) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect::new(r.left() as f32, r.top() as f32, r.width() as f32, r.height() as f32)
}

fn set_style(el: &HtmlElement, property: &str, value: &str) {
    let _ = el.style().set_property(property, value);
}

/// Game instance holding all state
struct Game {
    state: GameState,
    renderer: CanvasRenderer,
    audio: AudioManager,
    settings: Settings,
    bomb_button: HtmlElement,
    /// Last config started, reused by `restart_round`
    last_config: Option<ModeConfig>,
    /// Bomb button snaps back to its base position at this time
    evade_until: Option<f64>,
    last_nope: f64,
}

impl Game {
    fn new(seed: u64, canvas: HtmlCanvasElement, bomb_button: HtmlElement) -> Result<Self, JsValue> {
        let settings = Settings::load();
        let mut audio = AudioManager::new();
        audio.apply_settings(&settings);
        Ok(Self {
            state: GameState::new(seed),
            renderer: CanvasRenderer::new(canvas)?,
            audio,
            settings,
            bomb_button,
            last_config: None,
            evade_until: None,
            last_nope: f64::NEG_INFINITY,
        })
    }

    fn start(&mut self, config: ModeConfig) {
        let now = now();
        self.audio.resume();
        self.renderer.images.clear();
        remove_game_over();
        if let Ok(doc) = document() {
            if let Some(screen) = doc.get_element_by_id("startScreen") {
                let _ = screen.set_attribute("style", "display:none");
            }
        }
        self.hide_bomb();
        self.last_config = Some(config.clone());
        self.state.start_round(config, now, viewport());
        self.handle_events(now);
        self.apply_canvas_size();
    }

    /// Drop the current round and show the start screen (or replay the mode
    /// when the page has none)
    fn abandon(&mut self) {
        self.state.reset_round();
        self.renderer.images.clear();
        self.handle_events(now());
        self.hide_bomb();
        remove_game_over();
        let screen = document().ok().and_then(|d| d.get_element_by_id("startScreen"));
        match (screen, self.last_config.clone()) {
            (Some(screen), _) => {
                let _ = screen.set_attribute("style", "display:flex");
            }
            (None, Some(config)) => self.start(config),
            (None, None) => {}
        }
    }

    fn bomb(&mut self) -> bool {
        let now = now();
        let accepted = self.state.trigger_bomb(now);
        if accepted {
            self.renderer.images.clear();
            self.handle_events(now);
        } else {
            log::debug!(
                "Bomb refused, {:.1}s cooldown left",
                self.state.round.bomb_cooldown_left(now) / 1000.0
            );
        }
        accepted
    }

    fn pointer_moved(&mut self, client: Vec2) {
        let rect = client_rect(&self.renderer.canvas);
        let canvas = Vec2::new(
            self.renderer.canvas.width() as f32,
            self.renderer.canvas.height() as f32,
        );
        let pos = client_to_canvas(client, rect, canvas);
        self.state.pointer_moved(pos, now());
    }

    fn bomb_visible(&self) -> bool {
        self.state.round.bomb_unlocked()
    }

    fn bomb_hotspot(&self) -> Option<Rect> {
        if !self.bomb_visible() {
            return None;
        }
        let button = client_rect(&self.bomb_button);
        Some(hotspot_in_canvas(button, self.state.canvas, viewport()))
    }

    fn hide_bomb(&mut self) {
        set_style(&self.bomb_button, "display", "none");
        self.reset_bomb_position();
    }

    fn reset_bomb_position(&mut self) {
        set_style(&self.bomb_button, "transform", BOMB_BASE_TRANSFORM);
        self.evade_until = None;
    }

    /// Slide the bomb button away from a pointer at `client`
    fn evade(&mut self, client: Vec2) {
        if !self.settings.evasive_bomb || !self.bomb_visible() {
            return;
        }
        let button = client_rect(&self.bomb_button);
        let Some(offset) = evade_offset(button, client, viewport()) else {
            return;
        };
        set_style(
            &self.bomb_button,
            "transform",
            &format!("translate({}px, calc(-50% + {}px))", offset.x, offset.y),
        );
        let now = now();
        self.evade_until = Some(now + EVADE_RESET_MS);

        if now - self.last_nope > EVADE_RESET_MS {
            self.last_nope = now;
            let center = Vec2::new(button.x + button.w / 2.0, button.y + button.h / 2.0);
            let dir = (center - client).normalize_or(Vec2::X);
            let text = NOPE_TEXTS[(now as usize) % NOPE_TEXTS.len()];
            if let Err(e) = spawn_nope(text, center, dir) {
                log::warn!("nope text failed: {:?}", e);
            }
        }
    }

    fn frame(&mut self, now: f64) {
        for (id, ready) in self.renderer.images.take_settled() {
            self.state.set_image_ready(id, ready);
        }

        let input = FrameInput {
            now,
            viewport: viewport(),
            hotspot: self.bomb_hotspot(),
        };
        {
            let metrics = self.renderer.metrics();
            tick(&mut self.state, &input, &metrics);
        }
        self.handle_events(now);

        let pools = &self.state.pools;
        self.renderer
            .images
            .retain_ids(|id| pools.images.iter().any(|i| i.id == id));

        if self.state.round.is_running() {
            self.apply_canvas_size();
            let options = SceneOptions {
                pointer_trail: self.settings.pointer_trail,
            };
            let scene = build_scene(&self.state, now, options);
            if let Err(e) = self.renderer.draw(&scene) {
                log::error!("Draw failed: {:?}", e);
            }
            self.update_hud(now);
        }

        if self.evade_until.is_some_and(|t| now >= t) {
            self.reset_bomb_position();
        }
        self.audio.update(now);
    }

    fn apply_canvas_size(&self) {
        self.renderer.resize(self.state.canvas);
        let _ = self
            .renderer
            .canvas
            .set_attribute("style", &canvas_style(self.state.canvas));
    }

    fn handle_events(&mut self, now: f64) {
        for event in self.state.drain_events() {
            self.audio.handle(&event, now);
            match event {
                GameEvent::RoundStarted { mode } => {
                    log::info!("Round running: {}", mode);
                }
                GameEvent::LevelUp { level } => {
                    log::debug!("HUD level {}", display_level(level));
                    if self.state.round.bomb_unlocked() {
                        set_style(&self.bomb_button, "display", "block");
                    }
                }
                GameEvent::ImageRequested { id, url } => {
                    if let Err(e) = self.renderer.images.request(id, &url) {
                        log::warn!("Image {} request failed: {:?}", id, e);
                        self.state.set_image_ready(id, false);
                    }
                }
                GameEvent::BombAccepted => {
                    set_style(&self.bomb_button, "opacity", "0.5");
                    set_style(&self.bomb_button, "cursor", "not-allowed");
                }
                GameEvent::RoundEnded(summary) => {
                    self.update_hud(now);
                    self.hide_bomb();
                    if let Err(e) = show_game_over(&summary) {
                        log::error!("Game-over panel failed: {:?}", e);
                    }
                    if let Err(e) = dispatch_round_end(&summary) {
                        log::warn!("roundend event failed: {:?}", e);
                    }
                }
                GameEvent::Cue(_) | GameEvent::Heartbeat { .. } | GameEvent::HeartbeatStop => {}
            }
        }
    }

    /// Update HUD elements in DOM
    fn update_hud(&self, now: f64) {
        let Ok(document) = document() else {
            return;
        };
        let round = &self.state.round;

        if let Some(el) = document.get_element_by_id("totalTime") {
            el.set_text_content(Some(&format_seconds(round.elapsed_secs(now))));
        }
        if let Some(el) = document.get_element_by_id("levelDisplay") {
            el.set_text_content(Some(&display_level(round.level)));
        }

        let mode = match document.get_element_by_id("modeDisplay") {
            Some(el) => Some(el),
            None => document.get_element_by_id("game-stats").and_then(|stats| {
                let el = document.create_element("div").ok()?;
                el.set_id("modeDisplay");
                stats.append_child(&el).ok()?;
                Some(el)
            }),
        };
        if let Some(el) = mode {
            el.set_inner_html(&format!("Mode: <b>{}</b>", capitalise(round.mode_name())));
        }

        if let Some(bar) = document
            .get_element_by_id("touchBar")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let (percent, background) = touch_bar(round.remaining_fraction());
            set_style(&bar, "width", &format!("{percent}%"));
            set_style(&bar, "background", background);
        }

        if round.is_running() && round.bomb_ready(now) {
            set_style(&self.bomb_button, "opacity", "1");
            set_style(&self.bomb_button, "cursor", "pointer");
        }
    }
}

fn remove_game_over() {
    if let Some(msg) = document().ok().and_then(|d| d.get_element_by_id("gameOverMsg")) {
        msg.remove();
    }
}

fn show_game_over(summary: &RoundSummary) -> Result<(), JsValue> {
    let document = document()?;
    if document.get_element_by_id("gameOverMsg").is_some() {
        return Ok(());
    }
    let text = GameOverText::from_summary(summary);
    let msg = document.create_element("div")?;
    msg.set_id("gameOverMsg");
    msg.set_inner_html(&format!(
        r#"<div style="margin-bottom:20px;text-align:center;">
            <div style="font-size:1.2em;margin-bottom:12px;">Game Over!</div>
            <div style="font-size:0.8em;color:#aaa;margin-bottom:8px;">{}</div>
            <div style="font-size:0.8em;color:#aaa;">{}</div>
            <div style="font-size:0.8em;color:#19f3ff;margin-top:8px;">Mode: <b>{}</b></div>
        </div>"#,
        text.survived, text.level, text.mode
    ));
    msg.set_attribute(
        "style",
        "position:fixed; left:50%; top:50%; transform:translate(-50%,-50%); background:#222; \
         color:#fff; font-size:2em; padding:32px 48px; border-radius:16px; z-index:1000; \
         box-shadow:0 4px 32px #000a;",
    )?;

    let button = document.create_element("button")?;
    button.set_text_content(Some("Restart"));
    button.set_attribute(
        "style",
        "font-size:1em; padding:12px 32px; margin-top:10px; cursor:pointer; background:#4caf50; \
         color:#fff; border:none; border-radius:8px;",
    )?;
    let closure = Closure::wrap(Box::new(move |_evt: MouseEvent| {
        with_game(|g| g.abandon());
    }) as Box<dyn FnMut(_)>);
    button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();

    msg.append_child(&button)?;
    document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&msg)?;
    Ok(())
}

/// `roundend` CustomEvent on the window, detail = summary JSON
fn dispatch_round_end(summary: &RoundSummary) -> Result<(), JsValue> {
    let json = serde_json::to_string(summary).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let init = web_sys::CustomEventInit::new();
    init.set_detail(&JsValue::from_str(&json));
    let event = web_sys::CustomEvent::new_with_event_init_dict("roundend", &init)?;
    window()?.dispatch_event(&event)?;
    Ok(())
}

/// Floating taunt drifting away from the bomb button
fn spawn_nope(text: &str, at: Vec2, dir: Vec2) -> Result<(), JsValue> {
    let window = window()?;
    let document = document()?;
    let span: HtmlElement = document.create_element("span")?.dyn_into()?;
    span.set_text_content(Some(text));
    span.set_attribute(
        "style",
        &format!(
            "position:fixed; left:{}px; top:{}px; font-size:16px; font-weight:bold; color:#fff; \
             text-shadow:0 2px 8px #000, 0 0 2px #f00; pointer-events:none; \
             transition:transform 0.7s cubic-bezier(.4,1.6,.6,1), opacity 0.7s linear; opacity:1;",
            at.x - 10.0,
            at.y - 10.0
        ),
    )?;
    document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&span)?;

    let drift = dir * 28.0;
    let moving = span.clone();
    let start = Closure::once_into_js(move || {
        set_style(&moving, "transform", &format!("translate({}px, {}px)", drift.x, drift.y));
        set_style(&moving, "opacity", "0");
    });
    window.set_timeout_with_callback_and_timeout_and_arguments_0(start.unchecked_ref(), 10)?;

    let cleanup = Closure::once_into_js(move || span.remove());
    window.set_timeout_with_callback_and_timeout_and_arguments_0(cleanup.unchecked_ref(), 800)?;
    Ok(())
}

fn create_bomb_button(document: &Document) -> Result<HtmlElement, JsValue> {
    let button: HtmlElement = document.create_element("button")?.dyn_into()?;
    button.set_id("bombButton");
    button.set_text_content(Some("\u{1F4A3}"));
    button.set_attribute(
        "style",
        "position:fixed; top:50%; right:24px; width:20px; height:20px; padding:0; font-size:16px; \
         line-height:20px; text-align:center; background:#ff4444; color:#fff; border:none; \
         border-radius:50%; display:none; transition:all 0.3s ease; overflow:hidden; \
         z-index:3000; transform:translateY(-50%);",
    )?;
    document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&button)?;
    Ok(button)
}

fn with_game<R>(f: impl FnOnce(&mut Game) -> R) -> Option<R> {
    let game = GAME.with(|g| g.borrow().clone())?;
    let mut game = game.try_borrow_mut().ok()?;
    Some(f(&mut game))
}

fn setup_input_handlers(canvas: &HtmlCanvasElement, bomb: &HtmlElement) -> Result<(), JsValue> {
    // Mouse move over the canvas
    {
        let closure = Closure::wrap(Box::new(move |evt: MouseEvent| {
            let client = Vec2::new(evt.client_x() as f32, evt.client_y() as f32);
            with_game(|g| g.pointer_moved(client));
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Leaving the canvas counts as inactive
    {
        let closure = Closure::wrap(Box::new(move |_evt: MouseEvent| {
            with_game(|g| g.state.pointer_left());
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Touch drags behave like mouse moves
    for name in ["touchstart", "touchmove"] {
        let closure = Closure::wrap(Box::new(move |evt: TouchEvent| {
            evt.prevent_default();
            if let Some(touch) = evt.touches().get(0) {
                let client = Vec2::new(touch.client_x() as f32, touch.client_y() as f32);
                with_game(|g| g.pointer_moved(client));
            }
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    for name in ["touchend", "touchcancel"] {
        let closure = Closure::wrap(Box::new(move |_evt: TouchEvent| {
            with_game(|g| g.state.pointer_left());
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Bomb button dodges the pointer anywhere in the window
    {
        let closure = Closure::wrap(Box::new(move |evt: MouseEvent| {
            let client = Vec2::new(evt.client_x() as f32, evt.client_y() as f32);
            with_game(|g| g.evade(client));
        }) as Box<dyn FnMut(_)>);
        window()?.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let closure = Closure::wrap(Box::new(move |_evt: MouseEvent| {
            with_game(|g| g.bomb());
        }) as Box<dyn FnMut(_)>);
        bomb.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            with_game(|g| g.reset_bomb_position());
        }) as Box<dyn FnMut(_)>);
        window()?.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

/// Difficulty cards on the start screen carry their mode in `data-mode`
fn setup_mode_cards(document: &Document) -> Result<(), JsValue> {
    let cards = document.query_selector_all("#startScreen .difficulty-card")?;
    for i in 0..cards.length() {
        let Some(card) = cards.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let Some(mode) = card.get_attribute("data-mode") else {
            continue;
        };
        let closure = Closure::wrap(Box::new(move |_evt: MouseEvent| {
            start_round(&mode);
        }) as Box<dyn FnMut(_)>);
        card.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn start_loop(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |time: f64| {
        if let Ok(mut game) = game.try_borrow_mut() {
            game.frame(time);
        }
        if let Some(w) = web_sys::window() {
            if let Some(cb) = f.borrow().as_ref() {
                let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
            }
        }
    }) as Box<dyn FnMut(f64)>));
    let cb = g.borrow();
    let cb = cb
        .as_ref()
        .ok_or_else(|| JsValue::from_str("frame callback missing"))?;
    window()?.request_animation_frame(cb.as_ref().unchecked_ref())?;
    Ok(())
}

/// Build the game, hook up the page and start the frame loop
pub fn run() -> Result<(), JsValue> {
    let document = document()?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| JsValue::from_str("no canvas"))?
        .dyn_into()?;
    let bomb = create_bomb_button(&document)?;

    let seed = js_sys::Date::now() as u64;
    let game = Rc::new(RefCell::new(Game::new(seed, canvas.clone(), bomb.clone())?));
    GAME.with(|g| *g.borrow_mut() = Some(game.clone()));
    log::info!("Game initialized with seed: {}", seed);

    setup_input_handlers(&canvas, &bomb)?;
    setup_mode_cards(&document)?;
    start_loop(game)?;
    Ok(())
}

/// Start a round with one of the built-in modes. Unknown names are ignored.
#[wasm_bindgen]
pub fn start_round(mode: &str) -> bool {
    let Some(mode) = Mode::from_name(mode) else {
        log::warn!("Unknown mode: {}", mode);
        return false;
    };
    with_game(|g| g.start(mode.config())).is_some()
}

/// Start a round from a JSON `ModeConfig`
#[wasm_bindgen]
pub fn start_round_with_config(json: &str) -> bool {
    match ModeConfig::from_json(json) {
        Ok(config) => with_game(|g| g.start(config)).is_some(),
        Err(e) => {
            log::warn!("Rejected mode config: {}", e);
            false
        }
    }
}

/// Abandon the current round and begin again with the same mode
#[wasm_bindgen]
pub fn restart_round() -> bool {
    with_game(|g| {
        let Some(config) = g.last_config.clone() else {
            return false;
        };
        g.state.reset_round();
        g.start(config);
        true
    })
    .unwrap_or(false)
}

/// Clear the board; false while on cooldown or outside a round
#[wasm_bindgen]
pub fn trigger_bomb() -> bool {
    with_game(|g| g.bomb()).unwrap_or(false)
}

/// Persisted mute toggle
#[wasm_bindgen]
pub fn set_muted(muted: bool) {
    with_game(|g| {
        g.settings.muted = muted;
        g.audio.apply_settings(&g.settings);
        g.settings.save();
    });
}

/// Persisted pointer-trail toggle
#[wasm_bindgen]
pub fn set_pointer_trail(enabled: bool) {
    with_game(|g| {
        g.settings.pointer_trail = enabled;
        g.settings.save();
    });
}
