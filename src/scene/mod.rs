//! Scenes, game objects and the world they live in
//!
//! - `object`: the `GameObject` arena and the `Behavior` hook trait
//! - `world`: frame-wide state and the `Context` passed to hooks and routines
//! - `scene`: layered membership plus the attach, coroutine, update and
//!   collision phases of a frame

pub mod object;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod world;

pub use object::{Behavior, GameObject, ObjectId, Objects};
pub use scene::{PassForward, Populate, Scene, SceneBuilder};
pub use world::{Context, FrameTime, Request, World};
