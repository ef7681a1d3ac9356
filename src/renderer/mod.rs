//! Rendering collaborator interface
//!
//! The engine never talks to a graphics API. Each frame it hands the surface
//! the active drawables in ascending layer order, switching between the world
//! view and the UI view as layers cross `Settings::ui_layer_start`.

pub mod headless;

pub use headless::{DrawCall, HeadlessSurface};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::scene::ObjectId;

/// Opaque handle to a drawable owned by the rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawHandle(pub u64);

/// A drawable reference plus its world transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    pub handle: DrawHandle,
    /// Moved together with the owning object
    pub position: Vec2,
}

impl Drawable {
    pub fn new(handle: DrawHandle, position: Vec2) -> Self {
        Self { handle, position }
    }
}

/// Which logical viewport a layer is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    World,
    Ui,
}

/// Center + size of a logical viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub center: Vec2,
    pub size: Vec2,
}

/// World and UI viewports, rescaled independently on window resize
#[derive(Debug, Clone, PartialEq)]
pub struct Viewports {
    pub world: View,
    pub ui: View,
    world_height: f32,
}

impl Viewports {
    pub fn new(width: u32, height: u32, world_height: f32) -> Self {
        let mut viewports = Self {
            world: View {
                center: Vec2::ZERO,
                size: Vec2::ZERO,
            },
            ui: View {
                center: Vec2::ZERO,
                size: Vec2::ZERO,
            },
            world_height,
        };
        viewports.resize(width, height);
        viewports.world.center = viewports.world.size * 0.5;
        viewports
    }

    /// UI maps 1:1 to window pixels; the world keeps its logical height and
    /// widens or narrows with the aspect ratio around its current center.
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;

        self.ui = View {
            center: Vec2::new(width / 2.0, height / 2.0),
            size: Vec2::new(width, height),
        };
        self.world.size = Vec2::new(self.world_height * width / height, self.world_height);
    }

    pub fn get(&self, kind: ViewKind) -> &View {
        match kind {
            ViewKind::World => &self.world,
            ViewKind::Ui => &self.ui,
        }
    }
}

/// Backend that receives the per-frame draw list
pub trait RenderSurface {
    /// Window size changed
    fn resize(&mut self, _width: u32, _height: u32) {}

    fn clear(&mut self);

    /// Subsequent draws use this view until the next call
    fn set_view(&mut self, kind: ViewKind, view: &View);

    fn draw(&mut self, layer: i32, object: ObjectId, drawable: &Drawable);

    fn present(&mut self);
}
