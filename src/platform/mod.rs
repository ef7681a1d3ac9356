//! Platform abstraction layer
//!
//! Handles the window/input side of the frame loop:
//! - Discrete input events delivered once per tick
//! - Held-key/button state readable by behaviors
//! - The `Platform` trait tying an event source to a render surface

pub mod headless;

pub use headless::HeadlessPlatform;

use std::collections::HashSet;

use glam::Vec2;

use crate::renderer::RenderSurface;

/// Keyboard keys the engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,
    Left,
    Right,
    Up,
    Down,
    Char(char),
    /// Backend-specific key code
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Input and window events reported by the platform
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    KeyPressed(Key),
    KeyReleased(Key),
    MouseMoved { x: f32, y: f32 },
    MouseButtonPressed(MouseButton),
    MouseButtonReleased(MouseButton),
    MouseScrolled { delta: f32 },
    Resized { width: u32, height: u32 },
    Closed,
}

/// Input snapshot accumulated from events
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys_down: HashSet<Key>,
    keys_pressed: HashSet<Key>,
    buttons_down: HashSet<MouseButton>,
    mouse: Vec2,
    scroll: f32,
}

impl InputState {
    /// Forget per-frame edges (presses, scroll) before new events arrive
    pub(crate) fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.scroll = 0.0;
    }

    pub(crate) fn apply(&mut self, event: &Event) {
        match *event {
            Event::KeyPressed(key) => {
                if self.keys_down.insert(key) {
                    self.keys_pressed.insert(key);
                }
            }
            Event::KeyReleased(key) => {
                self.keys_down.remove(&key);
            }
            Event::MouseMoved { x, y } => self.mouse = Vec2::new(x, y),
            Event::MouseButtonPressed(button) => {
                self.buttons_down.insert(button);
            }
            Event::MouseButtonReleased(button) => {
                self.buttons_down.remove(&button);
            }
            Event::MouseScrolled { delta } => self.scroll += delta,
            Event::Resized { .. } | Event::Closed => {}
        }
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Key went down during the current frame (auto-repeat excluded)
    pub fn was_key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse
    }

    pub fn scroll_delta(&self) -> f32 {
        self.scroll
    }
}

/// Window + input backend driven by `App::run`
pub trait Platform {
    /// Events that arrived since the previous call
    fn poll_events(&mut self) -> Vec<Event>;

    fn surface(&mut self) -> &mut dyn RenderSurface;
}
