//! Engine settings
//!
//! Loaded from JSON (file or string); every field falls back to its default
//! when missing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MAX_DELTA, DEFAULT_UI_LAYER_START};
use crate::error::Result;

/// How two non-static colliders are pushed apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DynamicResolution {
    /// The earlier object moves half of its correction and the later one is
    /// snapped onto the earlier object's pre-correction position.
    #[default]
    Legacy,
    /// Each object moves half of the separating push, in opposite directions.
    Symmetric,
}

impl DynamicResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            DynamicResolution::Legacy => "Legacy",
            DynamicResolution::Symmetric => "Symmetric",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "legacy" => Some(DynamicResolution::Legacy),
            "symmetric" | "sym" => Some(DynamicResolution::Symmetric),
            _ => None,
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Window ===
    /// Window title handed to the platform collaborator
    pub title: String,
    /// Initial window width in pixels
    pub width: u32,
    /// Initial window height in pixels
    pub height: u32,
    /// Logical height of the world view (world width follows the aspect ratio)
    pub world_height: f32,

    // === Frame loop ===
    /// Upper bound on a single frame's delta time, in seconds
    pub max_delta: f32,
    /// Escape key closes the app
    pub escape_quits: bool,

    // === Rendering ===
    /// Layers at or above this value are drawn with the UI view
    pub ui_layer_start: i32,

    // === Collisions ===
    pub dynamic_resolution: DynamicResolution,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "trellis".to_string(),
            width: 1280,
            height: 720,
            world_height: 720.0,

            max_delta: DEFAULT_MAX_DELTA,
            escape_quits: true,

            ui_layer_start: DEFAULT_UI_LAYER_START,

            dynamic_resolution: DynamicResolution::Legacy,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from `path` if given, falling back to defaults on any error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load(path).unwrap_or_else(|e| {
                log::warn!("Using default settings ({})", e);
                Self::default()
            }),
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamp values the frame loop cannot work with
    pub(crate) fn sanitized(mut self) -> Self {
        if !(self.max_delta > 0.0) {
            self.max_delta = DEFAULT_MAX_DELTA;
        }
        if !(self.world_height > 0.0) {
            self.world_height = self.height.max(1) as f32;
        }
        self.width = self.width.max(1);
        self.height = self.height.max(1);
        self
    }
}
