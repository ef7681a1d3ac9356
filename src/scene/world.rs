//! Frame-wide engine state and the context handed to behaviors and routines

use std::collections::VecDeque;

use super::object::{GameObject, ObjectId, Objects};
use super::scene::Scene;
use crate::collision::{Collision, ContactPhase};
use crate::coroutine::{Coroutine, CoroutineHandle};
use crate::error::Result;
use crate::platform::InputState;

/// Frame clock
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick (clamped by `Settings::max_delta`)
    pub delta: f32,
    /// Seconds since the app started running
    pub elapsed: f64,
    /// Ticks run so far
    pub frame: u64,
}

impl FrameTime {
    pub(crate) fn advance(&mut self, delta: f32) {
        self.delta = delta;
        self.elapsed += delta as f64;
        self.frame += 1;
    }
}

/// App-level operations deferred to the end of the current tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Quit,
    LoadNext,
    LoadScene(String),
    Reload,
}

/// Everything a scene operates on that outlives any single scene
#[derive(Default)]
pub struct World {
    pub objects: Objects,
    pub(crate) attach_queue: VecDeque<ObjectId>,
    pub(crate) time: FrameTime,
    pub(crate) input: InputState,
    pub(crate) requests: Vec<Request>,
}

impl World {
    pub fn time(&self) -> FrameTime {
        self.time
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Objects waiting for their first `attach`, in FIFO order
    pub fn pending_attach(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.attach_queue.iter().copied()
    }

    pub fn post(&mut self, request: Request) {
        self.requests.push(request);
    }
}

/// Access handed to a running hook or routine
///
/// `id()` is the object whose hook or coroutine is running.
pub struct Context<'a> {
    id: ObjectId,
    world: &'a mut World,
    scene: &'a mut Scene,
}

impl<'a> Context<'a> {
    pub fn new(id: ObjectId, world: &'a mut World, scene: &'a mut Scene) -> Self {
        Self { id, world, scene }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The running object. `None` once it has been destroyed.
    pub fn object(&self) -> Option<&GameObject> {
        self.world.objects.get(self.id)
    }

    pub fn object_mut(&mut self) -> Option<&mut GameObject> {
        self.world.objects.get_mut(self.id)
    }

    pub fn objects(&self) -> &Objects {
        &self.world.objects
    }

    pub fn objects_mut(&mut self) -> &mut Objects {
        &mut self.world.objects
    }

    pub fn scene(&self) -> &Scene {
        &*self.scene
    }

    pub fn delta_time(&self) -> f32 {
        self.world.time.delta
    }

    pub fn time(&self) -> FrameTime {
        self.world.time
    }

    pub fn input(&self) -> &InputState {
        &self.world.input
    }

    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.scene.find_by_name(&*self.world, name)
    }

    /// Add a new object to the running scene. It attaches on the next frame.
    pub fn spawn(&mut self, layer: i32, object: GameObject) -> Result<ObjectId> {
        self.scene.spawn(self.world, layer, object)
    }

    /// Remove an object (possibly the running one) from the scene
    pub fn destroy(&mut self, id: ObjectId) -> bool {
        self.scene.remove(self.world, id)
    }

    /// Start a coroutine owned by the running object
    pub fn start_coroutine(&mut self, coroutine: impl Into<Coroutine>) -> CoroutineHandle {
        self.scene.coroutines_mut().start(self.id, coroutine.into())
    }

    pub fn start_coroutine_on(&mut self, owner: ObjectId, coroutine: impl Into<Coroutine>) -> CoroutineHandle {
        self.scene.coroutines_mut().start(owner, coroutine.into())
    }

    pub fn stop_coroutine(&mut self, handle: CoroutineHandle) -> bool {
        self.scene.coroutines_mut().stop(self.id, handle)
    }

    pub fn stop_all_coroutines(&mut self) {
        self.scene.coroutines_mut().stop_all(self.id);
    }

    pub fn quit(&mut self) {
        self.world.post(Request::Quit);
    }

    pub fn load_next(&mut self) {
        self.world.post(Request::LoadNext);
    }

    pub fn load_scene(&mut self, name: impl Into<String>) {
        self.world.post(Request::LoadScene(name.into()));
    }

    /// Rebuild the running scene, keeping persistent objects
    pub fn reload(&mut self) {
        self.world.post(Request::Reload);
    }
}

/// Lifecycle hook selector for `dispatch`
#[derive(Debug, Clone, Copy)]
pub(crate) enum Hook {
    Attach,
    Update,
    Collision(ContactPhase, Collision),
    Trigger(ContactPhase, Collision),
}

impl Hook {
    fn name(&self) -> &'static str {
        match self {
            Hook::Attach => "attach",
            Hook::Update => "update",
            Hook::Collision(ContactPhase::Enter, _) => "on_collision_enter",
            Hook::Collision(ContactPhase::Stay, _) => "on_collision_stay",
            Hook::Collision(ContactPhase::Exit, _) => "on_collision_exit",
            Hook::Trigger(ContactPhase::Enter, _) => "on_trigger_enter",
            Hook::Trigger(ContactPhase::Stay, _) => "on_trigger_stay",
            Hook::Trigger(ContactPhase::Exit, _) => "on_trigger_exit",
        }
    }
}

/// Run one hook on `id`'s behavior. Hook errors are logged, never propagated.
pub(crate) fn dispatch(world: &mut World, scene: &mut Scene, id: ObjectId, hook: Hook) {
    let Some(mut behavior) = world.objects.take_behavior(id) else {
        return;
    };

    let result = {
        let mut cx = Context::new(id, world, scene);
        match &hook {
            Hook::Attach => behavior.attach(&mut cx),
            Hook::Update => behavior.update(&mut cx),
            Hook::Collision(ContactPhase::Enter, other) => behavior.on_collision_enter(&mut cx, other),
            Hook::Collision(ContactPhase::Stay, other) => behavior.on_collision_stay(&mut cx, other),
            Hook::Collision(ContactPhase::Exit, other) => behavior.on_collision_exit(&mut cx, other),
            Hook::Trigger(ContactPhase::Enter, other) => behavior.on_trigger_enter(&mut cx, other),
            Hook::Trigger(ContactPhase::Stay, other) => behavior.on_trigger_stay(&mut cx, other),
            Hook::Trigger(ContactPhase::Exit, other) => behavior.on_trigger_exit(&mut cx, other),
        }
    };

    if let Err(e) = result {
        log::error!("{} failed on object {}: {:#}", hook.name(), id, e);
    }

    world.objects.return_behavior(id, behavior);
}
