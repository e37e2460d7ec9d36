//! Audio system using Web Audio API
//!
//! Procedurally generated cues and a level-paced heartbeat - no external files.
//! Scheduling is plain data so it runs (and is tested) off the browser; the
//! oscillator plumbing only exists on wasm32.

use crate::sim::Cue;

/// Minimum gap between two beats (ms)
pub const HEARTBEAT_GUARD_MS: f64 = 100.0;
/// Interaction cues closer together than this are dropped (ms)
pub const INTERACTION_GAP_MS: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

/// Oscillator recipe for one cue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub wave: Waveform,
    /// Frequencies stepped through evenly over the duration (Hz)
    pub frequencies: &'static [f32],
    /// Seconds
    pub duration: f64,
    /// Peak gain before the exponential decay
    pub volume: f32,
}

impl Tone {
    /// `(offset seconds, Hz)` steps
    pub fn steps(&self) -> impl Iterator<Item = (f64, f32)> + '_ {
        let n = self.frequencies.len().max(1) as f64;
        self.frequencies
            .iter()
            .enumerate()
            .map(move |(i, f)| (i as f64 * self.duration / n, *f))
    }
}

pub fn cue_tone(cue: Cue) -> Tone {
    match cue {
        Cue::Collision => Tone {
            wave: Waveform::Sawtooth,
            frequencies: &[200.0],
            duration: 0.1,
            volume: 0.2,
        },
        Cue::Bomb => Tone {
            wave: Waveform::Square,
            frequencies: &[100.0],
            duration: 0.3,
            volume: 0.4,
        },
        Cue::LevelUp => Tone {
            wave: Waveform::Sine,
            frequencies: &[400.0, 600.0, 800.0],
            duration: 0.2,
            volume: 0.3,
        },
        Cue::GameOver => Tone {
            wave: Waveform::Sine,
            frequencies: &[300.0, 200.0, 100.0],
            duration: 0.3,
            volume: 0.4,
        },
        Cue::Interaction => Tone {
            wave: Waveform::Sine,
            frequencies: &[300.0],
            duration: 0.05,
            volume: 0.1,
        },
    }
}

/// Repeating beat driven by frame timestamps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Heartbeat {
    interval_ms: Option<f64>,
    next_at: f64,
    last_beat: Option<f64>,
}

impl Heartbeat {
    /// Restart at a new interval; the first beat lands one interval from now
    pub fn set_interval(&mut self, interval_ms: f64, now: f64) {
        self.interval_ms = Some(interval_ms);
        self.next_at = now + interval_ms;
    }

    pub fn stop(&mut self) {
        self.interval_ms = None;
    }

    pub fn interval(&self) -> Option<f64> {
        self.interval_ms
    }

    /// Whether a beat should sound at `now`
    pub fn poll(&mut self, now: f64) -> bool {
        let Some(interval) = self.interval_ms else {
            return false;
        };
        if now < self.next_at {
            return false;
        }
        // Skip missed beats rather than playing a burst after a stall
        while self.next_at <= now {
            self.next_at += interval.max(1.0);
        }
        if self.last_beat.is_some_and(|t| now - t < HEARTBEAT_GUARD_MS) {
            return false;
        }
        self.last_beat = Some(now);
        true
    }
}

/// Drops interaction cues that arrive faster than they can be heard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CueGate {
    last_interaction: Option<f64>,
}

impl CueGate {
    pub fn admit(&mut self, cue: Cue, now: f64) -> bool {
        if cue != Cue::Interaction {
            return true;
        }
        if self.last_interaction.is_some_and(|t| now - t < INTERACTION_GAP_MS) {
            return false;
        }
        self.last_interaction = Some(now);
        true
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{CueGate, Heartbeat, Waveform, cue_tone};
    use crate::settings::Settings;
    use crate::sim::{Cue, GameEvent};

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
        heartbeat_enabled: bool,
        heartbeat: Heartbeat,
        gate: CueGate,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                sfx_volume: 1.0,
                muted: false,
                heartbeat_enabled: true,
                heartbeat: Heartbeat::default(),
                gate: CueGate::default(),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.set_master_volume(settings.master_volume);
            self.set_sfx_volume(settings.sfx_volume);
            self.set_muted(settings.muted);
            self.heartbeat_enabled = settings.heartbeat;
        }

        /// Set master volume (0.0 - 1.0)
        pub fn set_master_volume(&mut self, vol: f32) {
            self.master_volume = vol.clamp(0.0, 1.0);
        }

        /// Set SFX volume (0.0 - 1.0)
        pub fn set_sfx_volume(&mut self, vol: f32) {
            self.sfx_volume = vol.clamp(0.0, 1.0);
        }

        /// Mute/unmute all audio
        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn effective_volume(&self) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        /// React to the simulation's drained events
        pub fn handle(&mut self, event: &GameEvent, now: f64) {
            match event {
                GameEvent::Cue(cue) => {
                    if self.gate.admit(*cue, now) {
                        self.play(*cue);
                    }
                }
                GameEvent::Heartbeat { interval_ms } => self.heartbeat.set_interval(*interval_ms, now),
                GameEvent::HeartbeatStop => self.heartbeat.stop(),
                _ => {}
            }
        }

        /// Per-frame tick for the heartbeat
        pub fn update(&mut self, now: f64) {
            if self.heartbeat.poll(now) && self.heartbeat_enabled {
                self.play_heartbeat();
            }
        }

        fn context(&self) -> Option<(&AudioContext, f32)> {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return None;
            }
            let ctx = self.ctx.as_ref()?;
            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            Some((ctx, vol))
        }

        /// Play a named cue; failures are swallowed
        pub fn play(&self, cue: Cue) {
            let Some((ctx, vol)) = self.context() else {
                return;
            };
            let tone = cue_tone(cue);
            let Some((osc, gain)) = self.create_osc(ctx, tone.frequencies[0], tone.wave) else {
                log::warn!("Could not build oscillator for {}", cue.as_str());
                return;
            };
            let t = ctx.current_time();

            for (offset, freq) in tone.steps() {
                osc.frequency().set_value_at_time(freq, t + offset).ok();
            }
            gain.gain().set_value_at_time(tone.volume * vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + tone.duration)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + tone.duration).ok();
        }

        /// Low thump sweeping 100 Hz down to 50 Hz
        fn play_heartbeat(&self) {
            let Some((ctx, vol)) = self.context() else {
                return;
            };
            let Some((osc, gain)) = self.create_osc(ctx, 100.0, Waveform::Sine) else {
                return;
            };
            let t = ctx.current_time();

            osc.frequency().set_value_at_time(100.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(50.0, t + 0.1)
                .ok();
            gain.gain().set_value_at_time(0.3 * vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            wave: Waveform,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(match wave {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Square => OscillatorType::Square,
                Waveform::Sawtooth => OscillatorType::Sawtooth,
            });
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }
    }
}
