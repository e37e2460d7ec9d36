//! Game state and the events it emits
//!
//! `GameState` owns every pool, the pointer, the round bookkeeping and the
//! RNG. The platform layer feeds it pointer samples and frame timestamps and
//! drains `GameEvent`s for audio, HUD and image loading.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{FilledPolygon, FloatingImage, FloatingWord, PatternProcess, TravelingLine};
use super::pointer::PointerState;
use super::round::{ModeConfig, Populations, RoundState, RoundSummary};
use super::spawn;
use crate::consts::*;

/// All live entities, each pool ordered oldest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pools {
    pub processes: Vec<PatternProcess>,
    pub images: Vec<FloatingImage>,
    pub words: Vec<FloatingWord>,
    pub polygons: Vec<FilledPolygon>,
    pub lines: Vec<TravelingLine>,
}

/// Drop the oldest entries beyond `cap`
fn trim_oldest<T>(pool: &mut Vec<T>, cap: u32) {
    let cap = cap as usize;
    if pool.len() > cap {
        pool.drain(..pool.len() - cap);
    }
}

impl Pools {
    pub fn clear(&mut self) {
        self.processes.clear();
        self.images.clear();
        self.words.clear();
        self.polygons.clear();
        self.lines.clear();
    }

    pub fn counts(&self) -> Populations<u32> {
        Populations {
            processes: self.processes.len() as u32,
            images: self.images.len() as u32,
            words: self.words.len() as u32,
            polygons: self.polygons.len() as u32,
            lines: self.lines.len() as u32,
        }
    }

    /// Oldest-first overflow trim for every pool
    pub fn trim_to(&mut self, caps: &Populations<u32>) {
        trim_oldest(&mut self.processes, caps.processes);
        trim_oldest(&mut self.images, caps.images);
        trim_oldest(&mut self.words, caps.words);
        trim_oldest(&mut self.polygons, caps.polygons);
        trim_oldest(&mut self.lines, caps.lines);
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
            && self.images.is_empty()
            && self.words.is_empty()
            && self.polygons.is_empty()
            && self.lines.is_empty()
    }
}

/// Named sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    Collision,
    Bomb,
    LevelUp,
    GameOver,
    Interaction,
}

impl Cue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Collision => "collision",
            Cue::Bomb => "bomb",
            Cue::LevelUp => "levelUp",
            Cue::GameOver => "gameOver",
            Cue::Interaction => "interaction",
        }
    }
}

/// Side effects requested by the simulation, drained once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Cue(Cue),
    /// (Re)start the heartbeat at this interval
    Heartbeat { interval_ms: f64 },
    HeartbeatStop,
    RoundStarted { mode: String },
    LevelUp { level: u32 },
    /// A new image needs its picture fetched
    ImageRequested { id: u32, url: String },
    BombAccepted,
    RoundEnded(RoundSummary),
}

/// Last spawn time per timed pool (ms)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnClock {
    pub image: f64,
    pub word: f64,
    pub polygon: f64,
    pub line: f64,
}

impl SpawnClock {
    /// Timers that fire on the first frame after `now`
    pub fn primed(now: f64) -> Self {
        Self {
            image: now - IMAGE_INTERVAL_MS,
            word: now - WORD_INTERVAL_MS,
            polygon: now - POLYGON_INTERVAL_MS,
            line: now - LINE_INTERVAL_MS,
        }
    }
}

/// Canvas size for a viewport at the given scale, in whole pixels
pub fn canvas_size(viewport: Vec2, scale: f32) -> Vec2 {
    (viewport * scale).floor().max(Vec2::ZERO)
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub round: RoundState,
    pub pools: Pools,
    pub pointer: PointerState,
    /// Current canvas size (px)
    pub canvas: Vec2,
    pub spawn_clock: SpawnClock,
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            round: RoundState::new(),
            pools: Pools::default(),
            pointer: PointerState::new(),
            canvas: Vec2::ZERO,
            spawn_clock: SpawnClock::default(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Begin a round: empty pools, primed spawn timers, full process pool
    pub fn start_round(&mut self, config: ModeConfig, now: f64, viewport: Vec2) {
        log::info!(
            "Round start: mode={} budget={}s",
            config.name, config.time_budget_secs
        );
        let mode = config.name.clone();
        self.round.start(config, now);
        self.canvas = canvas_size(viewport, self.round.canvas_scale);
        self.pools.clear();
        self.pointer.reset();
        self.spawn_clock = SpawnClock::primed(now);
        self.fill_processes(now);

        self.push_event(GameEvent::RoundStarted { mode });
        self.push_event(GameEvent::Heartbeat {
            interval_ms: self.round.heartbeat_interval_ms(),
        });
    }

    /// Abandon the current round and return to `Idle`
    pub fn reset_round(&mut self) {
        if self.round.is_running() {
            log::info!("Round abandoned at level {}", self.round.level);
        }
        self.round.reset();
        self.pools.clear();
        self.pointer.reset();
        self.push_event(GameEvent::HeartbeatStop);
    }

    /// Top the process pool up to its cap
    pub fn fill_processes(&mut self, now: f64) {
        while (self.pools.processes.len() as u32) < self.round.caps.processes {
            let id = self.next_entity_id();
            let process = spawn::create_process(&mut self.rng, id, now, self.canvas);
            self.pools.processes.push(process);
        }
    }

    /// Clear every pool down to one fresh process, subject to the cooldown.
    pub fn trigger_bomb(&mut self, now: f64) -> bool {
        if !self.round.is_running() || !self.round.bomb_ready(now) {
            return false;
        }
        self.pools.clear();
        let id = self.next_entity_id();
        let process = spawn::create_process(&mut self.rng, id, now, self.canvas);
        self.pools.processes.push(process);
        self.round.last_bomb = Some(now);
        log::info!("Bomb at level {}", self.round.level);
        self.push_event(GameEvent::Cue(Cue::Bomb));
        self.push_event(GameEvent::BombAccepted);
        true
    }

    /// Pointer sample in canvas coordinates
    pub fn pointer_moved(&mut self, pos: Vec2, now: f64) {
        let refund = self.pointer.moved(pos, now);
        if self.round.is_running() {
            self.round.refund(refund);
        }
    }

    pub fn pointer_left(&mut self) {
        self.pointer.left();
    }

    /// Platform callback once an image's picture has loaded (or failed)
    pub fn set_image_ready(&mut self, id: u32, ready: bool) {
        if let Some(image) = self.pools.images.iter_mut().find(|i| i.id == id) {
            image.ready = ready;
        }
    }
}
