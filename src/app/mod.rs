//! Frame orchestrator
//!
//! `App` owns the world and the ordered scene list and drives one tick at a
//! time:
//! 1. clamp and advance the frame clock
//! 2. attach objects queued since the last tick
//! 3. apply platform events (input state, close, resize)
//! 4. advance coroutines
//! 5. `update` every active object in layer order
//! 6. collision pass
//! 7. render the active drawables
//! 8. apply deferred requests (quit, scene changes)

pub mod current;

use std::time::Instant;

use crate::error::{EngineError, Result};
use crate::platform::{Event, Key, Platform};
use crate::renderer::{RenderSurface, ViewKind, Viewports};
use crate::scene::{PassForward, Populate, Request, Scene, SceneBuilder, World};
use crate::settings::Settings;

use current::{Mailbox, Registration};

/// Lifecycle of the app. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Uninitialized,
    Running,
    Closed,
}

struct SceneEntry {
    scene: Scene,
    populate: Populate,
}

pub struct App {
    settings: Settings,
    state: AppState,
    world: World,
    scenes: Vec<SceneEntry>,
    current: Option<usize>,
    viewports: Viewports,
    last_tick: Option<Instant>,
    mailbox: Mailbox,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let settings = settings.sanitized();
        let viewports = Viewports::new(settings.width, settings.height, settings.world_height);
        Self {
            settings,
            state: AppState::Uninitialized,
            world: World::default(),
            scenes: Vec::new(),
            current: None,
            viewports,
            last_tick: None,
            mailbox: Mailbox::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn viewports(&self) -> &Viewports {
        &self.viewports
    }

    pub fn viewports_mut(&mut self) -> &mut Viewports {
        &mut self.viewports
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        self.current.map(|index| &self.scenes[index].scene)
    }

    pub fn current_scene_mut(&mut self) -> Option<&mut Scene> {
        self.current.map(|index| &mut self.scenes[index].scene)
    }

    /// Registered scene names in load order
    pub fn scene_names(&self) -> impl Iterator<Item = &str> {
        self.scenes.iter().map(|entry| entry.scene.name())
    }

    /// Append a scene to the load order. `populate` builds its objects each
    /// time it is loaded.
    pub fn add_scene<F>(&mut self, name: impl Into<String>, populate: F) -> Result<()>
    where
        F: FnMut(&mut SceneBuilder<'_>) -> Result<()> + 'static,
    {
        let name = name.into();
        if self.scenes.iter().any(|entry| entry.scene.name() == name) {
            return Err(EngineError::DuplicateSceneName(name));
        }
        log::debug!("Registered scene '{}'", name);
        self.scenes.push(SceneEntry {
            scene: Scene::new(name),
            populate: Box::new(populate),
        });
        Ok(())
    }

    /// Load the first scene and start running
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            AppState::Running => return Ok(()),
            AppState::Closed => {
                log::warn!("start() called on a closed app");
                return Ok(());
            }
            AppState::Uninitialized => {}
        }
        if self.scenes.is_empty() {
            return Err(EngineError::NoActiveScene);
        }

        self.state = AppState::Running;
        self.last_tick = None;
        self.switch_to(0)?;
        self.publish();
        log::info!("{} running", self.settings.title);
        Ok(())
    }

    pub fn quit(&mut self) {
        if self.state != AppState::Closed {
            log::info!("Closing {}", self.settings.title);
        }
        self.state = AppState::Closed;
        self.publish();
    }

    pub fn load_next(&mut self) -> Result<()> {
        let current = self.current.ok_or(EngineError::NoActiveScene)?;
        let next = current + 1;
        if next >= self.scenes.len() {
            return Err(EngineError::NoNextScene {
                current: self.scenes[current].scene.name().to_string(),
            });
        }
        self.switch_to(next)
    }

    pub fn load_by_name(&mut self, name: &str) -> Result<()> {
        let index = self
            .scenes
            .iter()
            .position(|entry| entry.scene.name() == name)
            .ok_or_else(|| EngineError::SceneNotFound(name.to_string()))?;
        if self.current.is_none() {
            return Err(EngineError::NoActiveScene);
        }
        self.switch_to(index)
    }

    /// Unload and re-populate the current scene; persistent objects survive
    pub fn reload(&mut self) -> Result<()> {
        let current = self.current.ok_or(EngineError::NoActiveScene)?;
        self.switch_to(current)
    }

    fn switch_to(&mut self, index: usize) -> Result<()> {
        let pass = match self.current {
            Some(current) => self.scenes[current].scene.unload(&mut self.world),
            None => PassForward::default(),
        };

        self.current = Some(index);
        let SceneEntry { scene, populate } = &mut self.scenes[index];
        log::info!("Loading scene '{}'", scene.name());
        scene.init(&mut self.world, pass, &mut **populate)
    }

    /// Tick with wall-clock delta time since the previous tick
    pub fn tick(&mut self, events: Vec<Event>, surface: &mut dyn RenderSurface) -> AppState {
        let now = Instant::now();
        let dt = self
            .last_tick
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_tick = Some(now);
        self.frame(dt, events, surface)
    }

    /// Tick with an explicit delta time
    pub fn frame(&mut self, dt: f32, events: Vec<Event>, surface: &mut dyn RenderSurface) -> AppState {
        if self.state != AppState::Running {
            return self.state;
        }
        let Some(index) = self.current else {
            return self.state;
        };

        self.world.time.advance(dt.max(0.0).min(self.settings.max_delta));
        self.publish();

        self.scenes[index].scene.drain_attach_queue(&mut self.world);

        self.world.input.begin_frame();
        for event in &events {
            self.world.input.apply(event);
            match *event {
                Event::Closed => self.state = AppState::Closed,
                Event::KeyPressed(Key::Escape) if self.settings.escape_quits => self.state = AppState::Closed,
                Event::Resized { width, height } => {
                    self.viewports.resize(width, height);
                    surface.resize(width, height);
                }
                _ => {}
            }
        }
        if self.state == AppState::Closed {
            log::info!("Window closed");
            self.publish();
            return self.state;
        }

        let scene = &mut self.scenes[index].scene;
        scene.run_coroutines(&mut self.world);
        scene.update_objects(&mut self.world);
        scene.resolve_collisions(&mut self.world, self.settings.dynamic_resolution);
        render(scene, &self.world, &self.viewports, self.settings.ui_layer_start, surface);

        self.apply_requests();
        self.publish();
        self.state
    }

    /// Drive the app with `platform` until it closes
    pub fn run<P: Platform>(&mut self, platform: &mut P) -> Result<()> {
        if self.state == AppState::Uninitialized {
            self.start()?;
        }
        let _current = self.make_current();
        platform.surface().resize(self.settings.width, self.settings.height);

        while self.state == AppState::Running {
            let events = platform.poll_events();
            self.tick(events, platform.surface());
        }

        log::info!("Stopped after {} frame(s)", self.world.time.frame);
        Ok(())
    }

    /// Register this app as the thread's current instance for the `current`
    /// handle functions
    pub fn make_current(&self) -> Registration {
        current::register(self.mailbox.clone())
    }

    fn apply_requests(&mut self) {
        let mut requests = std::mem::take(&mut self.world.requests);
        requests.append(&mut self.mailbox.borrow_mut().requests);

        for request in requests {
            if self.state == AppState::Closed {
                break;
            }
            let result = match &request {
                Request::Quit => {
                    self.quit();
                    Ok(())
                }
                Request::LoadNext => self.load_next(),
                Request::LoadScene(name) => self.load_by_name(name),
                Request::Reload => self.reload(),
            };
            if let Err(e) = result {
                log::error!("{:?} failed: {}", request, e);
            }
        }
    }

    fn publish(&self) {
        let mut mailbox = self.mailbox.borrow_mut();
        mailbox.time = self.world.time;
        mailbox.running = self.state == AppState::Running;
    }
}

/// Hand active drawables to the surface in layer order, switching to the UI
/// view at `ui_layer_start`
fn render(
    scene: &Scene,
    world: &World,
    viewports: &Viewports,
    ui_layer_start: i32,
    surface: &mut dyn RenderSurface,
) {
    surface.clear();
    let mut view = None;
    for (layer, id) in scene.iter() {
        let Some(object) = world.objects.get(id).filter(|object| object.is_active()) else {
            continue;
        };
        let kind = if layer >= ui_layer_start {
            ViewKind::Ui
        } else {
            ViewKind::World
        };
        if view != Some(kind) {
            surface.set_view(kind, viewports.get(kind));
            view = Some(kind);
        }
        for drawable in object.drawables() {
            surface.draw(layer, id, drawable);
        }
    }
    surface.present();
}
