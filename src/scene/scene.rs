//! Scene container: layered membership, persistence and per-frame phases

use std::collections::{BTreeMap, VecDeque};

use super::object::{Behavior, GameObject, ObjectId, Objects};
use super::world::{Context, Hook, World, dispatch};
use crate::collision;
use crate::coroutine::{Coroutine, CoroutineHandle, CoroutineScheduler, OwnedCoroutines};
use crate::error::{EngineError, Result};
use crate::settings::DynamicResolution;

/// Callback that builds a scene's initial population. Re-run on every load
/// and reload of the scene.
pub type Populate = Box<dyn FnMut(&mut SceneBuilder<'_>) -> Result<()>>;

/// Persistent objects and their coroutines handed from an unloaded scene to
/// the next one
#[derive(Default)]
pub struct PassForward {
    objects: Vec<ObjectId>,
    coroutines: Vec<(ObjectId, OwnedCoroutines)>,
}

impl PassForward {
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Named set of objects grouped by render layer
///
/// Layers iterate in ascending key order and keep insertion order within a
/// layer. Update and draw order both follow that sequence.
pub struct Scene {
    name: String,
    layers: BTreeMap<i32, Vec<ObjectId>>,
    coroutines: CoroutineScheduler,
    persisted: BTreeMap<i64, ObjectId>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layers: BTreeMap::new(),
            coroutines: CoroutineScheduler::new(),
            persisted: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an object already in the arena to `layer`.
    ///
    /// A persistent object whose persist id is already tracked by this scene
    /// is not added again: the newcomer is discarded without running any hook
    /// and the tracked instance's id is returned. `attach` is deferred to the
    /// next frame boundary.
    pub fn add(&mut self, world: &mut World, layer: i32, id: ObjectId) -> Result<ObjectId> {
        let object = world.objects.get(id).ok_or(EngineError::UnknownObject(id))?;

        if let Some(persist_id) = object.persist_id() {
            match self.persisted.get(&persist_id).copied() {
                Some(existing) if world.objects.contains(existing) => {
                    if existing != id {
                        log::debug!(
                            "Persistent object {} already present as {}, discarding duplicate",
                            persist_id,
                            existing
                        );
                        world.objects.discard(id);
                    }
                    return Ok(existing);
                }
                _ => {
                    self.persisted.insert(persist_id, id);
                }
            }
        }

        if self.contains(id) {
            return Err(EngineError::AlreadyAttached {
                id,
                scene: self.name.clone(),
            });
        }

        self.insert(world, layer, id);
        if world.objects.get(id).is_some_and(|object| !object.is_attached()) {
            world.attach_queue.push_back(id);
        }
        Ok(id)
    }

    /// Move `object` into the arena and add it to `layer`
    pub fn spawn(&mut self, world: &mut World, layer: i32, object: GameObject) -> Result<ObjectId> {
        let id = world.objects.insert(object);
        self.add(world, layer, id)
    }

    /// Remove and destroy an object. Returns false if it is not in this scene.
    ///
    /// `on_destroy` runs once; the object's coroutines are dropped with it.
    pub fn remove(&mut self, world: &mut World, id: ObjectId) -> bool {
        let Some(layer) = self.layer_of(id) else {
            return false;
        };
        if let Some(members) = self.layers.get_mut(&layer) {
            members.retain(|member| *member != id);
            if members.is_empty() {
                self.layers.remove(&layer);
            }
        }
        self.persisted.retain(|_, tracked| *tracked != id);
        self.coroutines.remove_owner(id);
        world.objects.destroy(id);
        true
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.layer_of(id).is_some()
    }

    pub fn layer_of(&self, id: ObjectId) -> Option<i32> {
        self.layers
            .iter()
            .find(|(_, members)| members.contains(&id))
            .map(|(layer, _)| *layer)
    }

    pub fn objects_in_layer(&self, layer: i32) -> &[ObjectId] {
        self.layers.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(layer, id)` pairs in update and draw order
    pub fn iter(&self) -> impl Iterator<Item = (i32, ObjectId)> + '_ {
        self.layers
            .iter()
            .flat_map(|(layer, members)| members.iter().map(move |id| (*layer, *id)))
    }

    /// Snapshot of member ids in update and draw order
    pub fn ids(&self) -> Vec<ObjectId> {
        self.iter().map(|(_, id)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn coroutines(&self) -> &CoroutineScheduler {
        &self.coroutines
    }

    pub fn coroutines_mut(&mut self) -> &mut CoroutineScheduler {
        &mut self.coroutines
    }

    pub fn find_by_name(&self, world: &World, name: &str) -> Option<ObjectId> {
        self.iter()
            .map(|(_, id)| id)
            .find(|id| world.objects.get(*id).and_then(GameObject::name) == Some(name))
    }

    /// First member whose behavior is a `T`, in update order
    pub fn find_by_behavior<T: Behavior>(&self, world: &World) -> Option<ObjectId> {
        self.iter()
            .map(|(_, id)| id)
            .find(|id| world.objects.behavior::<T>(*id).is_some())
    }

    /// Tear the scene down.
    ///
    /// Persistent objects are handed back with their coroutines, untouched;
    /// every other member is destroyed.
    pub fn unload(&mut self, world: &mut World) -> PassForward {
        let mut pass = PassForward::default();
        for id in self.ids() {
            let persistent = world
                .objects
                .get(id)
                .is_some_and(GameObject::is_persistent);
            if persistent {
                pass.objects.push(id);
                if let Some(coroutines) = self.coroutines.take_owner(id) {
                    pass.coroutines.push((id, coroutines));
                }
            } else {
                world.objects.destroy(id);
            }
        }

        log::debug!(
            "Unloaded scene '{}', passing {} persistent object(s) forward",
            self.name,
            pass.len()
        );
        self.layers.clear();
        self.persisted.clear();
        self.coroutines.clear();
        pass
    }

    /// Bring the scene up: re-seat persistent objects in their layers, then
    /// run `populate`.
    ///
    /// Passed-forward objects are already attached and are not queued again.
    /// Of two passed-forward objects sharing a persist id the first is kept
    /// and the other destroyed.
    pub fn init(
        &mut self,
        world: &mut World,
        pass: PassForward,
        populate: &mut dyn FnMut(&mut SceneBuilder<'_>) -> Result<()>,
    ) -> Result<()> {
        let PassForward {
            objects,
            mut coroutines,
        } = pass;

        for id in objects {
            let Some(object) = world.objects.get(id) else {
                continue;
            };
            let layer = object.layer();
            if let Some(persist_id) = object.persist_id() {
                if self.persisted.contains_key(&persist_id) {
                    log::warn!("Duplicate persistent object {} ({}), destroying it", persist_id, id);
                    world.objects.destroy(id);
                    continue;
                }
                self.persisted.insert(persist_id, id);
            }
            self.insert(world, layer, id);

            if let Some(index) = coroutines.iter().position(|(owner, _)| *owner == id) {
                let (_, owned) = coroutines.swap_remove(index);
                self.coroutines.restore_owner(id, owned);
            }
        }

        let mut builder = SceneBuilder { scene: self, world };
        populate(&mut builder)?;

        log::info!("Scene '{}' ready with {} object(s)", self.name, self.len());
        Ok(())
    }

    /// Run `attach` on queued objects, oldest first.
    ///
    /// Objects queued during the drain wait for the next one. Inactive
    /// objects keep their place in the queue; destroyed ones are dropped.
    pub fn drain_attach_queue(&mut self, world: &mut World) {
        let pending = world.attach_queue.len();
        let mut deferred = VecDeque::new();

        for _ in 0..pending {
            let Some(id) = world.attach_queue.pop_front() else {
                break;
            };
            let Some(object) = world.objects.get_mut(id) else {
                continue;
            };
            if object.is_attached() {
                continue;
            }
            if !object.is_active() {
                deferred.push_back(id);
                continue;
            }
            object.mark_attached();
            log::debug!("Attaching object {} ({:?})", id, object.name());
            dispatch(world, self, id, Hook::Attach);
        }

        while let Some(id) = deferred.pop_back() {
            world.attach_queue.push_front(id);
        }
    }

    /// One scheduler pass over every owner's coroutines.
    ///
    /// The pass works from a snapshot taken up front: coroutines started
    /// during it first run on the next pass, and ones stopped during it are
    /// skipped.
    pub fn run_coroutines(&mut self, world: &mut World) {
        let plan: Vec<(ObjectId, Vec<CoroutineHandle>)> = self
            .coroutines
            .owners()
            .into_iter()
            .map(|owner| (owner, self.coroutines.handles(owner)))
            .collect();

        for (owner, handles) in plan {
            for handle in handles {
                if !world.objects.contains(owner) {
                    self.coroutines.remove_owner(owner);
                    break;
                }
                let Some(mut coroutine) = self.coroutines.checkout(owner, handle) else {
                    continue;
                };
                let running = {
                    let mut cx = Context::new(owner, world, self);
                    coroutine.advance(&mut cx)
                };
                self.coroutines.checkin(owner, handle, coroutine, running);
            }
        }

        self.coroutines.sweep();
    }

    /// `update` on every active, attached member in layer order
    pub fn update_objects(&mut self, world: &mut World) {
        for id in self.ids() {
            let ready = world
                .objects
                .get(id)
                .is_some_and(|object| object.is_active() && object.is_attached());
            if ready {
                dispatch(world, self, id, Hook::Update);
            }
        }
    }

    pub fn resolve_collisions(&mut self, world: &mut World, resolution: DynamicResolution) {
        collision::resolve(world, self, resolution);
    }

    fn insert(&mut self, world: &mut World, layer: i32, id: ObjectId) {
        if let Some(object) = world.objects.get_mut(id) {
            object.set_layer(layer);
        }
        self.layers.entry(layer).or_default().push(id);
    }
}

/// Capability handed to a scene's populate callback
pub struct SceneBuilder<'a> {
    scene: &'a mut Scene,
    world: &'a mut World,
}

impl SceneBuilder<'_> {
    pub fn scene_name(&self) -> &str {
        self.scene.name()
    }

    pub fn add(&mut self, layer: i32, object: GameObject) -> Result<ObjectId> {
        self.scene.spawn(self.world, layer, object)
    }

    pub fn add_existing(&mut self, layer: i32, id: ObjectId) -> Result<ObjectId> {
        self.scene.add(self.world, layer, id)
    }

    pub fn start_coroutine(&mut self, owner: ObjectId, coroutine: impl Into<Coroutine>) -> CoroutineHandle {
        self.scene.coroutines_mut().start(owner, coroutine.into())
    }

    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.scene.find_by_name(self.world, name)
    }

    pub fn objects(&self) -> &Objects {
        &self.world.objects
    }

    pub fn objects_mut(&mut self) -> &mut Objects {
        &mut self.world.objects
    }
}
