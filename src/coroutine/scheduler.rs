//! Per-owner coroutine bookkeeping
//!
//! The scheduler stores coroutines by owning object. The per-frame pass lives
//! in `Scene::run_coroutines`, which checks each coroutine out, advances it
//! with a `Context` bound to its owner and checks it back in. Coroutines that
//! are stopped while checked out are simply dropped at check-in.

use std::sync::atomic::{AtomicU64, Ordering};

use super::routine::Coroutine;
use crate::scene::ObjectId;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Identifies one started coroutine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoroutineHandle(u64);

struct Scheduled {
    handle: CoroutineHandle,
    /// `None` while checked out for advancing
    coroutine: Option<Coroutine>,
    finished: bool,
}

/// An owner's coroutines, detached from one scheduler to move to another
pub struct OwnedCoroutines(Vec<Scheduled>);

impl OwnedCoroutines {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Cooperative scheduler: owners in first-scheduled order, each with its
/// coroutines in start order
#[derive(Default)]
pub struct CoroutineScheduler {
    owners: Vec<(ObjectId, Vec<Scheduled>)>,
}

impl CoroutineScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a coroutine under `owner`. It first advances on the next pass.
    pub fn start(&mut self, owner: ObjectId, coroutine: Coroutine) -> CoroutineHandle {
        let handle = CoroutineHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed));
        let scheduled = Scheduled {
            handle,
            coroutine: Some(coroutine),
            finished: false,
        };
        match self.list_mut(owner) {
            Some(list) => list.push(scheduled),
            None => self.owners.push((owner, vec![scheduled])),
        }
        handle
    }

    /// Forget a coroutine. Nothing runs on the routine itself.
    pub fn stop(&mut self, owner: ObjectId, handle: CoroutineHandle) -> bool {
        let Some(list) = self.list_mut(owner) else {
            return false;
        };
        let before = list.len();
        list.retain(|scheduled| scheduled.handle != handle);
        list.len() != before
    }

    pub fn stop_all(&mut self, owner: ObjectId) {
        if let Some(list) = self.list_mut(owner) {
            list.clear();
        }
    }

    /// Deregister an owner entirely
    pub fn remove_owner(&mut self, owner: ObjectId) -> bool {
        let before = self.owners.len();
        self.owners.retain(|(id, _)| *id != owner);
        self.owners.len() != before
    }

    pub fn is_running(&self, owner: ObjectId, handle: CoroutineHandle) -> bool {
        self.list(owner).is_some_and(|list| {
            list.iter()
                .any(|scheduled| scheduled.handle == handle && !scheduled.finished)
        })
    }

    /// Live coroutines registered under `owner`
    pub fn count(&self, owner: ObjectId) -> usize {
        self.list(owner)
            .map(|list| list.iter().filter(|scheduled| !scheduled.finished).count())
            .unwrap_or(0)
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Snapshot of registered owners
    pub fn owners(&self) -> Vec<ObjectId> {
        self.owners.iter().map(|(id, _)| *id).collect()
    }

    /// Snapshot of `owner`'s coroutine handles
    pub fn handles(&self, owner: ObjectId) -> Vec<CoroutineHandle> {
        self.list(owner)
            .map(|list| list.iter().map(|scheduled| scheduled.handle).collect())
            .unwrap_or_default()
    }

    pub(crate) fn checkout(&mut self, owner: ObjectId, handle: CoroutineHandle) -> Option<Coroutine> {
        self.list_mut(owner)?
            .iter_mut()
            .find(|scheduled| scheduled.handle == handle && !scheduled.finished)?
            .coroutine
            .take()
    }

    /// Return a coroutine after advancing it. A coroutine stopped meanwhile is
    /// dropped; a finished one is left for `sweep`.
    pub(crate) fn checkin(&mut self, owner: ObjectId, handle: CoroutineHandle, coroutine: Coroutine, running: bool) {
        let Some(scheduled) = self
            .list_mut(owner)
            .and_then(|list| list.iter_mut().find(|scheduled| scheduled.handle == handle))
        else {
            return;
        };
        if running {
            scheduled.coroutine = Some(coroutine);
        } else {
            scheduled.finished = true;
        }
    }

    /// Drop finished coroutines and owners left with none
    pub(crate) fn sweep(&mut self) {
        for (_, list) in &mut self.owners {
            list.retain(|scheduled| !scheduled.finished);
        }
        self.owners.retain(|(_, list)| !list.is_empty());
    }

    pub(crate) fn take_owner(&mut self, owner: ObjectId) -> Option<OwnedCoroutines> {
        let index = self.owners.iter().position(|(id, _)| *id == owner)?;
        let (_, list) = self.owners.remove(index);
        Some(OwnedCoroutines(list))
    }

    pub(crate) fn restore_owner(&mut self, owner: ObjectId, coroutines: OwnedCoroutines) {
        if coroutines.is_empty() {
            return;
        }
        match self.list_mut(owner) {
            Some(list) => list.extend(coroutines.0),
            None => self.owners.push((owner, coroutines.0)),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.owners.clear();
    }

    fn list(&self, owner: ObjectId) -> Option<&Vec<Scheduled>> {
        self.owners
            .iter()
            .find(|(id, _)| *id == owner)
            .map(|(_, list)| list)
    }

    fn list_mut(&mut self, owner: ObjectId) -> Option<&mut Vec<Scheduled>> {
        self.owners
            .iter_mut()
            .find(|(id, _)| *id == owner)
            .map(|(_, list)| list)
    }
}
