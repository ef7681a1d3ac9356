//! Pairwise discrete collision pass
//!
//! Every unordered pair of active colliders in the scene is tested once per
//! frame (O(n²), no broad phase). A pair moves through
//! `none -> enter -> stay* -> exit -> none`; the contact sets on both
//! colliders record whether the pair is currently touching.

use glam::Vec2;

use super::rect::{Rect, reposition_from_collision};
use crate::scene::world::{Hook, dispatch};
use crate::scene::{ObjectId, Scene, World};
use crate::settings::DynamicResolution;

/// Snapshot of the other collider passed to collision and trigger hooks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub other: ObjectId,
    pub bounds: Rect,
    pub is_static: bool,
    pub is_trigger: bool,
}

/// Where a pair is in its contact episode this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Enter,
    Stay,
    Exit,
}

/// Run one collision pass over the scene's active colliders
pub fn resolve(world: &mut World, scene: &mut Scene, resolution: DynamicResolution) {
    let ids: Vec<ObjectId> = scene
        .ids()
        .into_iter()
        .filter(|&id| snapshot(world, id).is_some())
        .collect();

    prune_contacts(world, &ids);

    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            resolve_pair(world, scene, ids[i], ids[j], resolution);
        }
    }
}

fn resolve_pair(world: &mut World, scene: &mut Scene, a: ObjectId, b: ObjectId, resolution: DynamicResolution) {
    // Earlier callbacks may have moved, disabled or destroyed either side
    let (Some(first), Some(second)) = (snapshot(world, a), snapshot(world, b)) else {
        return;
    };

    // Two triggers never interact, whatever their recorded state
    if first.is_trigger && second.is_trigger {
        return;
    }

    let overlapping = first.bounds.intersects(&second.bounds);
    let touching = is_touching(world, a, b);
    let phase = match (overlapping, touching) {
        (true, false) => ContactPhase::Enter,
        (true, true) => ContactPhase::Stay,
        (false, true) => ContactPhase::Exit,
        (false, false) => return,
    };

    match phase {
        ContactPhase::Enter => link(world, a, b),
        ContactPhase::Exit => unlink(world, a, b),
        ContactPhase::Stay => {}
    }

    if first.is_trigger || second.is_trigger {
        // Only the solid side hears about the trigger
        let (receiver, trigger) = if first.is_trigger {
            (second, first)
        } else {
            (first, second)
        };
        dispatch(world, scene, receiver.other, Hook::Trigger(phase, trigger));
        return;
    }

    if phase != ContactPhase::Exit {
        correct(world, &first, &second, resolution);
    }

    // Hooks see the post-correction bounds
    let first = snapshot(world, a).unwrap_or(first);
    let second = snapshot(world, b).unwrap_or(second);
    dispatch(world, scene, a, Hook::Collision(phase, second));
    dispatch(world, scene, b, Hook::Collision(phase, first));
}

/// Push overlapping solid colliders apart
fn correct(world: &mut World, a: &Collision, b: &Collision, resolution: DynamicResolution) {
    match (a.is_static, b.is_static) {
        (true, true) => {}
        (true, false) => {
            let fix = reposition_from_collision(&a.bounds, &b.bounds);
            move_bounds_to(world, b.other, fix.position);
        }
        (false, true) => {
            let fix = reposition_from_collision(&b.bounds, &a.bounds);
            move_bounds_to(world, a.other, fix.position);
        }
        (false, false) => {
            let original = a.bounds.position;
            let fix = reposition_from_collision(&b.bounds, &a.bounds);
            let push = fix.position - original;
            match resolution {
                DynamicResolution::Legacy => {
                    move_bounds_to(world, a.other, original + push * 0.5);
                    move_bounds_to(world, b.other, original);
                }
                DynamicResolution::Symmetric => {
                    move_bounds_to(world, a.other, original + push * 0.5);
                    move_bounds_to(world, b.other, b.bounds.position - push * 0.5);
                }
            }
        }
    }
}

/// Translate an object so its collider bounds land at `position`
fn move_bounds_to(world: &mut World, id: ObjectId, position: Vec2) {
    let Some(object) = world.objects.get_mut(id) else {
        return;
    };
    let Some(current) = object.collider().map(|collider| collider.bounds.position) else {
        return;
    };
    object.translate(position - current);
}

/// Active collider of an active object, as seen by the other side of a pair
fn snapshot(world: &World, id: ObjectId) -> Option<Collision> {
    let object = world.objects.get(id).filter(|object| object.is_active())?;
    let collider = object.collider().filter(|collider| collider.is_active())?;
    Some(Collision {
        other: id,
        bounds: collider.bounds,
        is_static: collider.is_static,
        is_trigger: collider.is_trigger,
    })
}

fn is_touching(world: &World, a: ObjectId, b: ObjectId) -> bool {
    let recorded = |from: ObjectId, to: ObjectId| {
        world
            .objects
            .get(from)
            .and_then(|object| object.collider())
            .is_some_and(|collider| collider.is_touching(to))
    };
    recorded(a, b) && recorded(b, a)
}

fn link(world: &mut World, a: ObjectId, b: ObjectId) {
    for (from, to) in [(a, b), (b, a)] {
        if let Some(collider) = world.objects.get_mut(from).and_then(|object| object.collider_mut()) {
            collider.add_contact(to);
        }
    }
}

fn unlink(world: &mut World, a: ObjectId, b: ObjectId) {
    for (from, to) in [(a, b), (b, a)] {
        if let Some(collider) = world.objects.get_mut(from).and_then(|object| object.collider_mut()) {
            collider.remove_contact(to);
        }
    }
}

/// Silently drop contacts whose partner is gone or no longer collidable
fn prune_contacts(world: &mut World, ids: &[ObjectId]) {
    for &id in ids {
        if let Some(collider) = world.objects.get_mut(id).and_then(|object| object.collider_mut()) {
            collider.retain_contacts(|other| ids.contains(other));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Collider;
    use crate::scene::{Behavior, Context, GameObject};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(String, &'static str)>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
    }

    impl Recorder {
        fn push(&self, event: &'static str) {
            self.log.borrow_mut().push((self.name.to_string(), event));
        }
    }

    impl Behavior for Recorder {
        fn on_collision_enter(&mut self, _cx: &mut Context<'_>, _other: &Collision) -> anyhow::Result<()> {
            self.push("collision_enter");
            Ok(())
        }

        fn on_collision_stay(&mut self, _cx: &mut Context<'_>, _other: &Collision) -> anyhow::Result<()> {
            self.push("collision_stay");
            Ok(())
        }

        fn on_collision_exit(&mut self, _cx: &mut Context<'_>, _other: &Collision) -> anyhow::Result<()> {
            self.push("collision_exit");
            Ok(())
        }

        fn on_trigger_enter(&mut self, _cx: &mut Context<'_>, _other: &Collision) -> anyhow::Result<()> {
            self.push("trigger_enter");
            Ok(())
        }

        fn on_trigger_stay(&mut self, _cx: &mut Context<'_>, _other: &Collision) -> anyhow::Result<()> {
            self.push("trigger_stay");
            Ok(())
        }

        fn on_trigger_exit(&mut self, _cx: &mut Context<'_>, _other: &Collision) -> anyhow::Result<()> {
            self.push("trigger_exit");
            Ok(())
        }
    }

    fn body(name: &'static str, log: &Log, collider: Collider) -> GameObject {
        GameObject::named(name)
            .with_position(collider.bounds.position)
            .with_collider(collider)
            .with_behavior(Recorder {
                name,
                log: log.clone(),
            })
    }

    fn drain(log: &Log) -> Vec<(String, &'static str)> {
        std::mem::take(&mut *log.borrow_mut())
    }

    fn ev(name: &str, event: &'static str) -> (String, &'static str) {
        (name.to_string(), event)
    }

    #[test]
    fn test_enter_stay_exit_episode() {
        let log = Log::default();
        let mut world = World::default();
        let mut scene = Scene::new("episode");
        let a = Collider::new(Rect::new(0.0, 0.0, 10.0, 10.0)).with_static(true);
        let b = Collider::new(Rect::new(20.0, 0.0, 10.0, 10.0)).with_static(true);
        scene.spawn(&mut world, 0, body("a", &log, a)).unwrap();
        let b = scene.spawn(&mut world, 0, body("b", &log, b)).unwrap();

        // B slides left through A: 20 -> 12 -> 5 -> -2 -> -15
        let mut frames = Vec::new();
        for x in [20.0, 12.0, 5.0, -2.0, -15.0] {
            world.objects.get_mut(b).unwrap().set_position(Vec2::new(x, 0.0));
            resolve(&mut world, &mut scene, DynamicResolution::Legacy);
            frames.push(drain(&log));
        }

        assert!(frames[0].is_empty());
        assert!(frames[1].is_empty());
        assert_eq!(frames[2], vec![ev("a", "collision_enter"), ev("b", "collision_enter")]);
        assert_eq!(frames[3], vec![ev("a", "collision_stay"), ev("b", "collision_stay")]);
        assert_eq!(frames[4], vec![ev("a", "collision_exit"), ev("b", "collision_exit")]);
    }

    #[test]
    fn test_static_pushes_moving_flush() {
        let log = Log::default();
        let mut world = World::default();
        let mut scene = Scene::new("push");
        let wall = Collider::new(Rect::new(0.0, 0.0, 10.0, 10.0)).with_static(true);
        let crate_box = Collider::new(Rect::new(8.0, 0.0, 10.0, 10.0));
        scene.spawn(&mut world, 0, body("wall", &log, wall)).unwrap();
        let moving = scene.spawn(&mut world, 0, body("crate", &log, crate_box)).unwrap();

        resolve(&mut world, &mut scene, DynamicResolution::Legacy);

        let object = world.objects.get(moving).unwrap();
        assert!((object.collider().unwrap().bounds.position.x - 10.0).abs() < 1e-5);
        assert!((object.position().x - 10.0).abs() < 1e-5);
        assert_eq!(drain(&log), vec![ev("wall", "collision_enter"), ev("crate", "collision_enter")]);

        // Flush is not overlapping: the episode ends next frame
        resolve(&mut world, &mut scene, DynamicResolution::Legacy);
        assert_eq!(drain(&log), vec![ev("wall", "collision_exit"), ev("crate", "collision_exit")]);
    }

    #[test]
    fn test_legacy_dynamic_split() {
        let log = Log::default();
        let mut world = World::default();
        let mut scene = Scene::new("legacy");
        let a = scene
            .spawn(&mut world, 0, body("a", &log, Collider::new(Rect::new(0.0, 0.0, 10.0, 10.0))))
            .unwrap();
        let b = scene
            .spawn(&mut world, 0, body("b", &log, Collider::new(Rect::new(6.0, 0.0, 10.0, 10.0))))
            .unwrap();

        resolve(&mut world, &mut scene, DynamicResolution::Legacy);

        // A's correction against B is 4 to the left; A moves half, B snaps to A's old spot
        let a_pos = world.objects.get(a).unwrap().collider().unwrap().bounds.position;
        let b_pos = world.objects.get(b).unwrap().collider().unwrap().bounds.position;
        assert!((a_pos.x + 2.0).abs() < 1e-5);
        assert!(b_pos.x.abs() < 1e-5);
    }

    #[test]
    fn test_symmetric_dynamic_split() {
        let log = Log::default();
        let mut world = World::default();
        let mut scene = Scene::new("symmetric");
        let a = scene
            .spawn(&mut world, 0, body("a", &log, Collider::new(Rect::new(0.0, 0.0, 10.0, 10.0))))
            .unwrap();
        let b = scene
            .spawn(&mut world, 0, body("b", &log, Collider::new(Rect::new(6.0, 0.0, 10.0, 10.0))))
            .unwrap();

        resolve(&mut world, &mut scene, DynamicResolution::Symmetric);

        let a_pos = world.objects.get(a).unwrap().collider().unwrap().bounds.position;
        let b_pos = world.objects.get(b).unwrap().collider().unwrap().bounds.position;
        assert!((a_pos.x + 2.0).abs() < 1e-5);
        assert!((b_pos.x - 8.0).abs() < 1e-5);
        assert!(!Rect::new(a_pos.x, 0.0, 10.0, 10.0).intersects(&Rect::new(b_pos.x, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_single_trigger_notifies_solid_side_only() {
        let log = Log::default();
        let mut world = World::default();
        let mut scene = Scene::new("trigger");
        let zone = Collider::new(Rect::new(0.0, 0.0, 50.0, 50.0)).with_trigger(true);
        let player = Collider::new(Rect::new(10.0, 10.0, 5.0, 5.0));
        scene.spawn(&mut world, 0, body("zone", &log, zone)).unwrap();
        let player = scene.spawn(&mut world, 0, body("player", &log, player)).unwrap();

        resolve(&mut world, &mut scene, DynamicResolution::Legacy);
        assert_eq!(drain(&log), vec![ev("player", "trigger_enter")]);
        // Triggers never push
        assert_eq!(world.objects.get(player).unwrap().position(), Vec2::new(10.0, 10.0));

        resolve(&mut world, &mut scene, DynamicResolution::Legacy);
        assert_eq!(drain(&log), vec![ev("player", "trigger_stay")]);

        world.objects.get_mut(player).unwrap().set_position(Vec2::new(100.0, 100.0));
        resolve(&mut world, &mut scene, DynamicResolution::Legacy);
        assert_eq!(drain(&log), vec![ev("player", "trigger_exit")]);
    }

    #[test]
    fn test_two_triggers_never_fire() {
        let log = Log::default();
        let mut world = World::default();
        let mut scene = Scene::new("triggers");
        let a = Collider::new(Rect::new(0.0, 0.0, 10.0, 10.0)).with_trigger(true);
        let b = Collider::new(Rect::new(5.0, 5.0, 10.0, 10.0)).with_trigger(true);
        let a = scene.spawn(&mut world, 0, body("a", &log, a)).unwrap();
        scene.spawn(&mut world, 0, body("b", &log, b)).unwrap();

        for _ in 0..5 {
            resolve(&mut world, &mut scene, DynamicResolution::Legacy);
        }
        assert!(drain(&log).is_empty());
        assert_eq!(world.objects.get(a).unwrap().collider().unwrap().contact_count(), 0);
    }

    #[test]
    fn test_two_triggers_keep_recorded_contact() {
        let log = Log::default();
        let mut world = World::default();
        let mut scene = Scene::new("triggers");
        let zone = Collider::new(Rect::new(0.0, 0.0, 50.0, 50.0)).with_trigger(true);
        let player = Collider::new(Rect::new(10.0, 10.0, 5.0, 5.0));
        let zone = scene.spawn(&mut world, 0, body("zone", &log, zone)).unwrap();
        let player = scene.spawn(&mut world, 0, body("player", &log, player)).unwrap();

        resolve(&mut world, &mut scene, DynamicResolution::Legacy);
        assert_eq!(drain(&log), vec![ev("player", "trigger_enter")]);

        // Turned into a trigger while touching, then moved clear of the zone
        world.objects.get_mut(player).unwrap().collider_mut().unwrap().is_trigger = true;
        world.objects.get_mut(player).unwrap().set_position(Vec2::new(100.0, 100.0));
        resolve(&mut world, &mut scene, DynamicResolution::Legacy);

        assert!(drain(&log).is_empty());
        assert!(is_touching(&world, zone, player));
        assert!(is_touching(&world, player, zone));
    }

    #[test]
    fn test_removed_collider_drops_contact_silently() {
        let log = Log::default();
        let mut world = World::default();
        let mut scene = Scene::new("remove");
        let a = Collider::new(Rect::new(0.0, 0.0, 10.0, 10.0)).with_static(true);
        let b = Collider::new(Rect::new(5.0, 0.0, 10.0, 10.0)).with_static(true);
        let a = scene.spawn(&mut world, 0, body("a", &log, a)).unwrap();
        let b = scene.spawn(&mut world, 0, body("b", &log, b)).unwrap();

        resolve(&mut world, &mut scene, DynamicResolution::Legacy);
        assert_eq!(drain(&log).len(), 2);

        let taken = world.objects.get_mut(b).unwrap().take_collider().unwrap();
        assert!(taken.is_touching(a));
        assert!(world.objects.get(b).unwrap().collider().is_none());

        resolve(&mut world, &mut scene, DynamicResolution::Legacy);
        assert!(drain(&log).is_empty());
        assert_eq!(world.objects.get(a).unwrap().collider().unwrap().contact_count(), 0);
    }

    #[test]
    fn test_deactivated_collider_drops_contact_silently() {
        let log = Log::default();
        let mut world = World::default();
        let mut scene = Scene::new("deactivate");
        let a = Collider::new(Rect::new(0.0, 0.0, 10.0, 10.0)).with_static(true);
        let b = Collider::new(Rect::new(5.0, 0.0, 10.0, 10.0)).with_static(true);
        let a = scene.spawn(&mut world, 0, body("a", &log, a)).unwrap();
        let b = scene.spawn(&mut world, 0, body("b", &log, b)).unwrap();

        resolve(&mut world, &mut scene, DynamicResolution::Legacy);
        assert_eq!(drain(&log).len(), 2);

        world.objects.get_mut(b).unwrap().collider_mut().unwrap().set_active(false);
        resolve(&mut world, &mut scene, DynamicResolution::Legacy);
        assert!(drain(&log).is_empty());
        assert_eq!(world.objects.get(a).unwrap().collider().unwrap().contact_count(), 0);

        // Reactivated while still overlapping: a fresh episode starts
        world.objects.get_mut(b).unwrap().collider_mut().unwrap().set_active(true);
        resolve(&mut world, &mut scene, DynamicResolution::Legacy);
        assert_eq!(drain(&log), vec![ev("a", "collision_enter"), ev("b", "collision_enter")]);
    }

    struct Failing;

    impl Behavior for Failing {
        fn on_collision_enter(&mut self, _cx: &mut Context<'_>, _other: &Collision) -> anyhow::Result<()> {
            anyhow::bail!("boom")
        }
    }

    #[test]
    fn test_failing_hook_does_not_stop_the_pass() {
        let log = Log::default();
        let mut world = World::default();
        let mut scene = Scene::new("isolation");
        let bad = GameObject::named("bad")
            .with_collider(Collider::new(Rect::new(0.0, 0.0, 10.0, 10.0)).with_static(true))
            .with_behavior(Failing);
        scene.spawn(&mut world, 0, bad).unwrap();
        let good = Collider::new(Rect::new(5.0, 0.0, 10.0, 10.0)).with_static(true);
        scene.spawn(&mut world, 0, body("good", &log, good)).unwrap();

        resolve(&mut world, &mut scene, DynamicResolution::Legacy);
        assert_eq!(drain(&log), vec![ev("good", "collision_enter")]);
    }

    struct DestroyOnEnter;

    impl Behavior for DestroyOnEnter {
        fn on_trigger_enter(&mut self, cx: &mut Context<'_>, other: &Collision) -> anyhow::Result<()> {
            cx.destroy(other.other);
            Ok(())
        }
    }

    #[test]
    fn test_destroying_partner_mid_pass() {
        let log = Log::default();
        let mut world = World::default();
        let mut scene = Scene::new("pickup");
        let collector = GameObject::named("collector")
            .with_collider(Collider::new(Rect::new(0.0, 0.0, 10.0, 10.0)))
            .with_behavior(DestroyOnEnter);
        let collector = scene.spawn(&mut world, 0, collector).unwrap();
        let coin = Collider::new(Rect::new(2.0, 2.0, 2.0, 2.0)).with_trigger(true);
        let coin = scene.spawn(&mut world, 0, body("coin", &log, coin)).unwrap();
        let other = Collider::new(Rect::new(3.0, 3.0, 2.0, 2.0)).with_trigger(true);
        scene.spawn(&mut world, 0, body("other", &log, other)).unwrap();

        resolve(&mut world, &mut scene, DynamicResolution::Legacy);
        assert!(!world.objects.contains(coin));
        assert!(!scene.contains(coin));

        // Stale contact is pruned without an exit
        resolve(&mut world, &mut scene, DynamicResolution::Legacy);
        let collider = world.objects.get(collector).unwrap().collider().unwrap();
        assert!(!collider.is_touching(coin));
        assert!(drain(&log).is_empty());
    }
}
