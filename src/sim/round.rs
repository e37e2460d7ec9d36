//! Round and difficulty bookkeeping
//!
//! A round runs from mode selection until the accumulated penalty reaches the
//! mode's time budget. Every five seconds the level rises, each population cap
//! grows by one up to its hard maximum, and the canvas target scale shrinks.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// One value per entity pool
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Populations<T> {
    pub processes: T,
    pub images: T,
    pub words: T,
    pub polygons: T,
    pub lines: T,
}

impl<T: Copy> Populations<T> {
    pub const fn uniform(value: T) -> Self {
        Self {
            processes: value,
            images: value,
            words: value,
            polygons: value,
            lines: value,
        }
    }
}

impl Populations<u32> {
    /// Hard caps no level can exceed
    pub const MAXIMA: Populations<u32> = Populations {
        processes: MAX_PROCESSES,
        images: MAX_IMAGES,
        words: MAX_WORDS,
        polygons: MAX_POLYGONS,
        lines: MAX_LINES,
    };

    pub fn clamped(self) -> Self {
        let max = Self::MAXIMA;
        Self {
            processes: self.processes.min(max.processes),
            images: self.images.min(max.images),
            words: self.words.min(max.words),
            polygons: self.polygons.min(max.polygons),
            lines: self.lines.min(max.lines),
        }
    }

    /// Every cap one higher, clamped at the maxima
    pub fn grown(self) -> Self {
        Self {
            processes: self.processes + 1,
            images: self.images + 1,
            words: self.words + 1,
            polygons: self.polygons + 1,
            lines: self.lines + 1,
        }
        .clamped()
    }
}

/// Built-in difficulty modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Easy,
    Medium,
    Hard,
    Hardcore,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Easy, Mode::Medium, Mode::Hard, Mode::Hardcore];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Easy => "easy",
            Mode::Medium => "medium",
            Mode::Hard => "hard",
            Mode::Hardcore => "hardcore",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(name.trim()))
    }

    pub fn config(&self) -> ModeConfig {
        let (budget, initial, growth) = match self {
            Mode::Easy => (30.0, [1, 2, 4, 3, 2], 0.5),
            Mode::Medium => (20.0, [2, 3, 5, 4, 3], 0.8),
            Mode::Hard => (12.0, [3, 4, 6, 5, 4], 1.0),
            Mode::Hardcore => (6.0, [4, 5, 7, 6, 5], 1.5),
        };
        let [processes, images, words, polygons, lines] = initial;
        ModeConfig {
            name: self.as_str().to_string(),
            time_budget_secs: budget,
            initial: Populations {
                processes,
                images,
                words,
                polygons,
                lines,
            },
            growth: Populations::uniform(growth),
        }
    }
}

/// What a mode selector hands to `start_round`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeConfig {
    pub name: String,
    pub time_budget_secs: f64,
    pub initial: Populations<u32>,
    /// Descriptive only; caps grow by exactly one per level
    #[serde(default)]
    pub growth: Populations<f32>,
}

impl ModeConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No mode selected yet
    #[default]
    Idle,
    Running,
    /// Terminal until the next start
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    Lost,
}

/// Emitted once when a round ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    pub reason: EndReason,
    pub survived_seconds: f64,
    pub level_reached: u32,
    pub mode_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    pub phase: RoundPhase,
    pub config: Option<ModeConfig>,
    /// ms
    pub started_at: f64,
    /// Timestamp of the previous frame (ms)
    pub last_frame: f64,
    /// Seconds counted against the player
    pub penalty_secs: f64,
    pub level: u32,
    pub last_level_up: f64,
    pub caps: Populations<u32>,
    /// Current (smoothed) canvas scale relative to the viewport
    pub canvas_scale: f32,
    /// Pointer was touching something last frame
    pub touching: bool,
    /// Last accepted bomb (ms)
    pub last_bomb: Option<f64>,
}

impl Default for RoundState {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundState {
    pub fn new() -> Self {
        Self {
            phase: RoundPhase::Idle,
            config: None,
            started_at: 0.0,
            last_frame: 0.0,
            penalty_secs: 0.0,
            level: 0,
            last_level_up: 0.0,
            caps: Populations::default(),
            canvas_scale: 1.0,
            touching: false,
            last_bomb: None,
        }
    }

    /// Enter `Running` with fresh bookkeeping
    pub fn start(&mut self, config: ModeConfig, now: f64) {
        self.caps = config.initial.clamped();
        self.config = Some(config);
        self.phase = RoundPhase::Running;
        self.started_at = now;
        self.last_frame = now;
        self.penalty_secs = 0.0;
        self.level = 0;
        self.last_level_up = now;
        self.canvas_scale = 1.0;
        self.touching = false;
    }

    /// Back to `Idle`; the bomb cooldown survives
    pub fn reset(&mut self) {
        let last_bomb = self.last_bomb;
        *self = Self::new();
        self.last_bomb = last_bomb;
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    pub fn mode_name(&self) -> &str {
        self.config.as_ref().map_or("", |c| c.name.as_str())
    }

    pub fn time_budget(&self) -> f64 {
        self.config.as_ref().map_or(0.0, |c| c.time_budget_secs)
    }

    pub fn elapsed_secs(&self, now: f64) -> f64 {
        (now - self.started_at) / 1000.0
    }

    /// Seconds since the previous frame; advances the frame clock
    pub fn frame_dt(&mut self, now: f64) -> f64 {
        let dt = (now - self.last_frame) / 1000.0;
        self.last_frame = now;
        dt
    }

    pub fn level_up_due(&self, now: f64) -> bool {
        self.is_running() && now - self.last_level_up >= DIFFICULTY_INTERVAL_MS
    }

    pub fn level_up(&mut self, now: f64) {
        self.level += 1;
        self.last_level_up = now;
        self.caps = self.caps.grown();
    }

    /// `max(1 - level * 0.02, 0.2)`
    pub fn target_scale(&self) -> f32 {
        (1.0 - self.level as f32 * CANVAS_SHRINK_PER_LEVEL).max(MIN_CANVAS_SCALE)
    }

    /// Move the current scale a fixed fraction toward the target
    pub fn smooth_scale(&mut self) -> f32 {
        self.canvas_scale += (self.target_scale() - self.canvas_scale) * CANVAS_SCALE_SMOOTHING;
        self.canvas_scale
    }

    /// Record this frame's touch state; true on the first touching frame
    pub fn note_touch(&mut self, touching: bool) -> bool {
        let started = touching && !self.touching;
        self.touching = touching;
        started
    }

    pub fn add_penalty(&mut self, secs: f64) {
        self.penalty_secs += secs;
    }

    /// Speed refund, floored at zero
    pub fn refund(&mut self, secs: f64) {
        if secs > 0.0 {
            self.penalty_secs = (self.penalty_secs - secs).max(0.0);
        }
    }

    pub fn budget_exhausted(&self) -> bool {
        self.config.is_some() && self.penalty_secs >= self.time_budget()
    }

    /// Fraction of the budget left, for the HUD bar
    pub fn remaining_fraction(&self) -> f64 {
        let budget = self.time_budget();
        if budget <= 0.0 {
            return 0.0;
        }
        (budget - self.penalty_secs).max(0.0) / budget
    }

    /// Move to `GameOver` and describe the round
    pub fn finish(&mut self, now: f64) -> RoundSummary {
        self.phase = RoundPhase::GameOver;
        RoundSummary {
            reason: EndReason::Lost,
            survived_seconds: self.elapsed_secs(now),
            level_reached: self.level,
            mode_name: self.mode_name().to_string(),
        }
    }

    /// `max(200, 1000 - level * 50)` ms
    pub fn heartbeat_interval_ms(&self) -> f64 {
        (BASE_HEARTBEAT_MS - self.level as f64 * HEARTBEAT_STEP_MS).max(MIN_HEARTBEAT_MS)
    }

    /// The bomb (and its hotspot) unlocks at level 1
    pub fn bomb_unlocked(&self) -> bool {
        self.is_running() && self.level >= 1
    }

    pub fn bomb_ready(&self, now: f64) -> bool {
        self.last_bomb
            .is_none_or(|at| now - at >= BOMB_COOLDOWN_MS)
    }

    /// Milliseconds until the bomb is usable again
    pub fn bomb_cooldown_left(&self, now: f64) -> f64 {
        self.last_bomb
            .map_or(0.0, |at| (BOMB_COOLDOWN_MS - (now - at)).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_configs() {
        let easy = Mode::Easy.config();
        assert_eq!(easy.time_budget_secs, 30.0);
        assert_eq!(
            easy.initial,
            Populations {
                processes: 1,
                images: 2,
                words: 4,
                polygons: 3,
                lines: 2
            }
        );
        assert_eq!(Mode::Hardcore.config().time_budget_secs, 6.0);
        assert_eq!(Mode::from_name("HardCore"), Some(Mode::Hardcore));
        assert_eq!(Mode::from_name("nightmare"), None);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "name": "custom",
            "time_budget_secs": 9.5,
            "initial": {"processes": 30, "images": 1, "words": 1, "polygons": 1, "lines": 1}
        }"#;
        let config = ModeConfig::from_json(json).unwrap();
        assert_eq!(config.name, "custom");
        assert_eq!(config.growth, Populations::uniform(0.0));

        let mut round = RoundState::new();
        round.start(config, 0.0);
        assert_eq!(round.caps.processes, MAX_PROCESSES);
        assert!(ModeConfig::from_json("{}").is_err());
    }

    #[test]
    fn test_easy_level_up_after_interval() {
        let mut round = RoundState::new();
        round.start(Mode::Easy.config(), 1000.0);
        assert!(!round.level_up_due(5999.0));
        assert!(round.level_up_due(6000.0));
        round.level_up(6000.0);

        assert_eq!(round.level, 1);
        assert_eq!(
            round.caps,
            Populations {
                processes: 2,
                images: 3,
                words: 5,
                polygons: 4,
                lines: 3
            }
        );
        assert!((round.target_scale() - 0.98).abs() < 1e-6);
    }

    #[test]
    fn test_caps_never_exceed_maxima() {
        let mut round = RoundState::new();
        round.start(Mode::Hardcore.config(), 0.0);
        for i in 1..=100 {
            round.level_up(i as f64 * DIFFICULTY_INTERVAL_MS);
        }
        assert_eq!(round.caps, Populations::MAXIMA);
        assert_eq!(round.target_scale(), MIN_CANVAS_SCALE);
        assert_eq!(round.heartbeat_interval_ms(), MIN_HEARTBEAT_MS);
    }

    #[test]
    fn test_scale_smoothing_converges() {
        let mut round = RoundState::new();
        round.start(Mode::Easy.config(), 0.0);
        round.level = 10;
        let first = round.smooth_scale();
        assert!((first - (1.0 - 0.2 * 0.08)).abs() < 1e-6);
        for _ in 0..500 {
            round.smooth_scale();
        }
        assert!((round.canvas_scale - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_penalty_and_refund() {
        let mut round = RoundState::new();
        round.start(Mode::Hardcore.config(), 0.0);
        round.add_penalty(2.0);
        round.refund(0.5);
        assert!((round.penalty_secs - 1.5).abs() < 1e-12);
        round.refund(10.0);
        assert_eq!(round.penalty_secs, 0.0);
        round.add_penalty(6.0);
        assert!(round.budget_exhausted());
        assert_eq!(round.remaining_fraction(), 0.0);
    }

    #[test]
    fn test_touch_rising_edge() {
        let mut round = RoundState::new();
        assert!(round.note_touch(true));
        assert!(!round.note_touch(true));
        assert!(!round.note_touch(false));
        assert!(round.note_touch(true));
    }

    #[test]
    fn test_finish_summary() {
        let mut round = RoundState::new();
        round.start(Mode::Medium.config(), 500.0);
        round.level_up(5500.0);
        let summary = round.finish(8500.0);
        assert_eq!(round.phase, RoundPhase::GameOver);
        assert_eq!(summary.level_reached, 1);
        assert_eq!(summary.mode_name, "medium");
        assert!((summary.survived_seconds - 8.0).abs() < 1e-9);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"reason\":\"lost\""));
        assert!(json.contains("\"levelReached\":1"));
    }

    #[test]
    fn test_bomb_cooldown() {
        let mut round = RoundState::new();
        round.start(Mode::Easy.config(), 0.0);
        assert!(!round.bomb_unlocked());
        round.level_up(5000.0);
        assert!(round.bomb_unlocked());
        assert!(round.bomb_ready(5000.0));
        round.last_bomb = Some(5000.0);
        assert!(!round.bomb_ready(34999.0));
        assert!((round.bomb_cooldown_left(20000.0) - 15000.0).abs() < 1e-9);
        assert!(round.bomb_ready(35000.0));

        round.reset();
        assert_eq!(round.phase, RoundPhase::Idle);
        assert_eq!(round.last_bomb, Some(5000.0));
    }

    #[test]
    fn test_heartbeat_interval() {
        let mut round = RoundState::new();
        assert_eq!(round.heartbeat_interval_ms(), 1000.0);
        round.level = 4;
        assert_eq!(round.heartbeat_interval_ms(), 800.0);
    }
}
