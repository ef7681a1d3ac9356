//! Trellis - a small 2D engine runtime
//!
//! Core modules:
//! - `app`: Frame orchestrator, scene list and the bootstrap `current` handle
//! - `scene`: Game objects, behaviors, scenes and the per-hook `Context`
//! - `coroutine`: Frame-stepped cooperative coroutines
//! - `collision`: AABB colliders and the enter/stay/exit pass
//! - `platform`: Input events and the platform backend trait
//! - `renderer`: Draw-list surface trait and viewports
//! - `settings`: JSON-backed engine settings

pub mod app;
pub mod collision;
pub mod coroutine;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod settings;

pub use app::{App, AppState};
pub use error::{EngineError, Result};
pub use scene::{Behavior, Context, GameObject, ObjectId, Scene, SceneBuilder};
pub use settings::{DynamicResolution, Settings};

/// Engine constants
pub mod consts {
    /// Fixed timestep used by headless drivers (60 Hz)
    pub const FIXED_DT: f32 = 1.0 / 60.0;
    /// Default cap on a frame's delta time, to avoid a spiral after a stall
    pub const DEFAULT_MAX_DELTA: f32 = 0.1;
    /// Default first layer drawn with the UI view
    pub const DEFAULT_UI_LAYER_START: i32 = 1000;
}
