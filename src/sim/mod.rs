//! Simulation module
//!
//! All gameplay logic lives here. This module stays platform-free:
//! - Timestamps come in from the caller, never read from a clock
//! - Randomness comes from the state's seeded RNG
//! - Pools iterate oldest first
//! - No rendering, audio or DOM dependencies

pub mod entity;
pub mod geometry;
pub mod hit;
pub mod influence;
pub mod pattern;
pub mod pointer;
pub mod round;
pub mod shape;
pub mod spawn;
pub mod state;
pub mod tick;

pub use entity::{
    Body, FilledPolygon, FloatingImage, FloatingWord, FontWeight, Hsl, ImageFilter, PatternProcess,
    Reaction, ReactionMode, TravelingLine,
};
pub use geometry::Rect;
pub use hit::{ApproxMetrics, HitTarget, TextMeasure};
pub use pattern::{MotionState, Pattern};
pub use pointer::PointerState;
pub use round::{Mode, ModeConfig, Populations, RoundPhase, RoundState, RoundSummary};
pub use shape::ShapeMask;
pub use state::{Cue, GameEvent, GameState, Pools};
pub use tick::{FrameInput, tick};
