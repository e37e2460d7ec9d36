//! Rendering module
//!
//! `scene` builds a platform-free draw list from the game state; `canvas`
//! replays it through the browser's Canvas 2D API, keeping loaded pictures in
//! an `images` store.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod images;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub use canvas::{CanvasMetrics, CanvasRenderer, ImageCache};
pub use scene::{DrawCmd, Paint, SceneOptions, build_scene};
