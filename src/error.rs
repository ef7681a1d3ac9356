//! Engine error taxonomy
//!
//! Every variant is a local, synchronous condition reported to the
//! scene-authoring caller. Lookups that simply find nothing return `None`
//! instead of an error.

use thiserror::Error;

use crate::scene::ObjectId;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the app, scene list and scene containers
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no application is running on this thread")]
    NoActiveApplication,

    #[error("no scene is active")]
    NoActiveScene,

    #[error("scene `{current}` is the last scene")]
    NoNextScene { current: String },

    #[error("scene `{0}` not found")]
    SceneNotFound(String),

    #[error("a scene named `{0}` is already registered")]
    DuplicateSceneName(String),

    #[error("object {id} is already attached to scene `{scene}`")]
    AlreadyAttached { id: ObjectId, scene: String },

    #[error("object {0} does not exist")]
    UnknownObject(ObjectId),

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
