//! Game objects, their behaviors and the generational arena that owns them
//!
//! Every cross-object reference (collider contacts, coroutine owners, scene
//! layers) is an `ObjectId`. Removing an object bumps its slot generation, so
//! stale ids resolve to `None` instead of dangling.

use std::any::Any;
use std::fmt;

use glam::Vec2;

use super::world::Context;
use crate::collision::{Collider, Collision};
use crate::renderer::Drawable;

/// Generational handle to a game object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Lifecycle hooks supplied by user code
///
/// Every hook defaults to a no-op. Errors returned from a hook are logged and
/// isolated to that object; the rest of the frame still runs.
#[allow(unused_variables)]
pub trait Behavior: Any {
    /// Called once, on the first frame boundary after the object was added
    /// to a scene while active.
    fn attach(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called every frame while the object is active and attached.
    fn update(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_collision_enter(&mut self, cx: &mut Context<'_>, other: &Collision) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_collision_stay(&mut self, cx: &mut Context<'_>, other: &Collision) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_collision_exit(&mut self, cx: &mut Context<'_>, other: &Collision) -> anyhow::Result<()> {
        Ok(())
    }

    /// `other` is the trigger collider this object's collider entered.
    fn on_trigger_enter(&mut self, cx: &mut Context<'_>, other: &Collision) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_trigger_stay(&mut self, cx: &mut Context<'_>, other: &Collision) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_trigger_exit(&mut self, cx: &mut Context<'_>, other: &Collision) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called exactly once when the object is destroyed.
    fn on_destroy(&mut self, object: &mut GameObject) {}
}

/// A scene entity: transform, optional collider, drawables and a behavior
pub struct GameObject {
    name: Option<String>,
    active: bool,
    persist_id: Option<i64>,
    position: Vec2,
    collider: Option<Collider>,
    drawables: Vec<Drawable>,
    layer: i32,
    attached: bool,
    behavior: Option<Box<dyn Behavior>>,
    /// Behavior is out of its slot while one of its hooks runs
    checked_out: bool,
    /// Destroyed while checked out; finalized when the hook returns
    doomed: bool,
}

impl Default for GameObject {
    fn default() -> Self {
        Self::new()
    }
}

impl GameObject {
    pub fn new() -> Self {
        Self {
            name: None,
            active: true,
            persist_id: None,
            position: Vec2::ZERO,
            collider: None,
            drawables: Vec::new(),
            layer: 0,
            attached: false,
            behavior: None,
            checked_out: false,
            doomed: false,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        let mut object = Self::new();
        object.name = Some(name.into());
        object
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.set_position(position);
        self
    }

    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = Some(collider);
        self
    }

    pub fn with_drawable(mut self, drawable: Drawable) -> Self {
        self.drawables.push(drawable);
        self
    }

    pub fn with_behavior(mut self, behavior: impl Behavior) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Keep this instance alive across scene transitions under `persist_id`
    pub fn persistent(mut self, persist_id: i64) -> Self {
        self.persist_id = Some(persist_id);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn persist_id(&self) -> Option<i64> {
        self.persist_id
    }

    pub fn is_persistent(&self) -> bool {
        self.persist_id.is_some()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the object; collider bounds and drawables follow by the same delta
    pub fn set_position(&mut self, position: Vec2) {
        let delta = position - self.position;
        self.translate(delta);
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
        if let Some(collider) = self.collider.as_mut() {
            collider.translate(delta);
        }
        for drawable in &mut self.drawables {
            drawable.position += delta;
        }
    }

    pub fn collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }

    pub fn collider_mut(&mut self) -> Option<&mut Collider> {
        self.collider.as_mut()
    }

    pub fn set_collider(&mut self, collider: Collider) {
        self.collider = Some(collider);
    }

    pub fn take_collider(&mut self) -> Option<Collider> {
        self.collider.take()
    }

    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    pub fn add_drawable(&mut self, drawable: Drawable) {
        self.drawables.push(drawable);
    }

    /// Render layer of the scene the object was added to
    pub fn layer(&self) -> i32 {
        self.layer
    }

    pub(crate) fn set_layer(&mut self, layer: i32) {
        self.layer = layer;
    }

    /// `attach` has run (or was skipped because the object has no behavior)
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub(crate) fn mark_attached(&mut self) {
        self.attached = true;
    }

    pub fn has_behavior(&self) -> bool {
        self.behavior.is_some() || self.checked_out
    }
}

impl fmt::Debug for GameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameObject")
            .field("name", &self.name)
            .field("active", &self.active)
            .field("persist_id", &self.persist_id)
            .field("position", &self.position)
            .field("collider", &self.collider)
            .field("drawables", &self.drawables.len())
            .field("layer", &self.layer)
            .field("attached", &self.attached)
            .field("has_behavior", &self.has_behavior())
            .finish()
    }
}

struct Slot {
    generation: u32,
    object: Option<GameObject>,
}

/// Arena owning every live game object
#[derive(Default)]
pub struct Objects {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl Objects {
    pub fn insert(&mut self, object: GameObject) -> ObjectId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.object = Some(object);
            return ObjectId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            object: Some(object),
        });
        ObjectId {
            index,
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slot lookup that also sees objects awaiting finalization
    fn slot_object(&self, id: ObjectId) -> Option<&GameObject> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.object.as_ref())
    }

    fn slot_object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.object.as_mut())
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.slot_object(id).filter(|object| !object.doomed)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.slot_object_mut(id).filter(|object| !object.doomed)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &GameObject)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let object = slot.object.as_ref().filter(|object| !object.doomed)?;
            Some((
                ObjectId {
                    index: index as u32,
                    generation: slot.generation,
                },
                object,
            ))
        })
    }

    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.iter()
            .find(|(_, object)| object.name() == Some(name))
            .map(|(id, _)| id)
    }

    /// Typed access to an object's behavior. `None` while one of its own
    /// hooks is running.
    pub fn behavior<T: Behavior>(&self, id: ObjectId) -> Option<&T> {
        let behavior: &dyn Any = self.get(id)?.behavior.as_deref()?;
        behavior.downcast_ref::<T>()
    }

    pub fn behavior_mut<T: Behavior>(&mut self, id: ObjectId) -> Option<&mut T> {
        let behavior: &mut dyn Any = self.get_mut(id)?.behavior.as_deref_mut()?;
        behavior.downcast_mut::<T>()
    }

    pub(crate) fn take_behavior(&mut self, id: ObjectId) -> Option<Box<dyn Behavior>> {
        let object = self.get_mut(id)?;
        let behavior = object.behavior.take()?;
        object.checked_out = true;
        Some(behavior)
    }

    /// Put a behavior back after its hook ran, finishing a destruction that
    /// was requested meanwhile.
    pub(crate) fn return_behavior(&mut self, id: ObjectId, mut behavior: Box<dyn Behavior>) {
        let Some(object) = self.slot_object_mut(id) else {
            return;
        };
        object.checked_out = false;
        if object.doomed {
            behavior.on_destroy(object);
            self.release(id);
        } else {
            object.behavior = Some(behavior);
        }
    }

    /// Run `on_destroy` and free the slot. Returns false if `id` is not live.
    pub(crate) fn destroy(&mut self, id: ObjectId) -> bool {
        let Some(object) = self.get_mut(id) else {
            return false;
        };
        if object.checked_out {
            object.doomed = true;
            return true;
        }

        if let Some(mut object) = self.release(id) {
            if let Some(mut behavior) = object.behavior.take() {
                behavior.on_destroy(&mut object);
            }
            log::debug!("Destroyed object {} ({:?})", id, object.name());
        }
        true
    }

    /// Free the slot without running any hook
    pub(crate) fn discard(&mut self, id: ObjectId) -> Option<GameObject> {
        if self.get(id)?.checked_out {
            return None;
        }
        self.release(id)
    }

    fn release(&mut self, id: ObjectId) -> Option<GameObject> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let object = slot.object.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(object)
    }
}
