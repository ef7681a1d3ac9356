//! Axis-aligned box collider owned by a game object

use std::collections::HashSet;

use glam::Vec2;

use super::rect::Rect;
use crate::scene::ObjectId;

/// Box collider with static/trigger/active flags and its current contacts
#[derive(Debug, Clone)]
pub struct Collider {
    /// World-space bounds, moved in lockstep with the owning object
    pub bounds: Rect,
    /// Static colliders are never pushed by positional correction
    pub is_static: bool,
    /// Triggers report overlap without correction or collision callbacks
    pub is_trigger: bool,
    is_active: bool,
    contacts: HashSet<ObjectId>,
}

impl Collider {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            is_static: false,
            is_trigger: false,
            is_active: true,
            contacts: HashSet::new(),
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Deactivating drops every contact at once; no exit callbacks fire for
    /// them.
    pub fn set_active(&mut self, active: bool) {
        if self.is_active && !active {
            self.contacts.clear();
        }
        self.is_active = active;
    }

    /// Whether `other` is currently recorded as touching this collider
    pub fn is_touching(&self, other: ObjectId) -> bool {
        self.contacts.contains(&other)
    }

    pub fn contacts(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.contacts.iter().copied()
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    pub(crate) fn add_contact(&mut self, other: ObjectId) {
        self.contacts.insert(other);
    }

    pub(crate) fn remove_contact(&mut self, other: ObjectId) {
        self.contacts.remove(&other);
    }

    pub(crate) fn retain_contacts(&mut self, keep: impl FnMut(&ObjectId) -> bool) {
        self.contacts.retain(keep);
    }

    pub(crate) fn translate(&mut self, delta: Vec2) {
        self.bounds.position += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{GameObject, Objects};

    #[test]
    fn test_deactivate_clears_contacts() {
        let mut objects = Objects::default();
        let other = objects.insert(GameObject::new());

        let mut collider = Collider::new(Rect::new(0.0, 0.0, 4.0, 4.0));
        collider.add_contact(other);
        assert!(collider.is_touching(other));

        collider.set_active(false);
        assert!(!collider.is_active());
        assert_eq!(collider.contact_count(), 0);

        // Reactivating does not bring contacts back
        collider.set_active(true);
        assert!(!collider.is_touching(other));
    }
}
