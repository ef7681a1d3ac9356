//! Scripted, windowless platform

use std::collections::VecDeque;

use super::{Event, Platform};
use crate::renderer::{HeadlessSurface, RenderSurface};

/// Replays queued event batches, one batch per poll, and reports a window
/// close once `max_frames` polls have happened.
#[derive(Debug, Clone)]
pub struct HeadlessPlatform {
    pub surface: HeadlessSurface,
    script: VecDeque<Vec<Event>>,
    max_frames: Option<u64>,
    polls: u64,
}

impl HeadlessPlatform {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: HeadlessSurface::new(width, height),
            script: VecDeque::new(),
            max_frames: None,
            polls: 0,
        }
    }

    /// Close the window after this many frames
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Queue the events delivered on the next unscripted frame
    pub fn push_frame(&mut self, events: Vec<Event>) {
        self.script.push_back(events);
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl Platform for HeadlessPlatform {
    fn poll_events(&mut self) -> Vec<Event> {
        self.polls += 1;
        let mut events = self.script.pop_front().unwrap_or_default();
        if self.max_frames.is_some_and(|max| self.polls >= max) {
            events.push(Event::Closed);
        }
        events
    }

    fn surface(&mut self) -> &mut dyn RenderSurface {
        &mut self.surface
    }
}
