//! Recording surface for tests and the native demo

use glam::Vec2;

use super::{DrawHandle, Drawable, RenderSurface, View, ViewKind};
use crate::scene::ObjectId;

/// One recorded draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub layer: i32,
    pub object: ObjectId,
    pub handle: DrawHandle,
    pub position: Vec2,
    pub view: ViewKind,
}

/// Surface that keeps the draw list of the last presented frame
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    pub size: (u32, u32),
    /// Draws of the frame in progress
    pub draws: Vec<DrawCall>,
    /// Draws of the last presented frame
    pub presented: Vec<DrawCall>,
    pub frames_presented: u64,
    view: ViewKind,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            draws: Vec::new(),
            presented: Vec::new(),
            frames_presented: 0,
            view: ViewKind::World,
        }
    }
}

impl RenderSurface for HeadlessSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn clear(&mut self) {
        self.draws.clear();
    }

    fn set_view(&mut self, kind: ViewKind, _view: &View) {
        self.view = kind;
    }

    fn draw(&mut self, layer: i32, object: ObjectId, drawable: &Drawable) {
        self.draws.push(DrawCall {
            layer,
            object,
            handle: drawable.handle,
            position: drawable.position,
            view: self.view,
        });
    }

    fn present(&mut self) {
        self.presented = std::mem::take(&mut self.draws);
        self.frames_presented += 1;
    }
}
