//! Resumable routines and the coroutine wrapper the scheduler advances

use std::fmt;

use super::wait::{Suspend, Wait};
use crate::scene::Context;

/// Outcome of resuming a routine once
#[derive(Debug)]
pub enum Step {
    /// Pause until the condition is satisfied
    Yield(Wait),
    /// Routine finished
    Done,
}

impl Step {
    pub fn next_frame() -> Self {
        Step::Yield(Wait::NextFrame)
    }
}

/// A computation resumed once per scheduler pass
pub trait Routine: 'static {
    fn resume(&mut self, cx: &mut Context<'_>) -> Step;
}

struct FnRoutine<F>(F);

impl<F> Routine for FnRoutine<F>
where
    F: FnMut(&mut Context<'_>) -> Step + 'static,
{
    fn resume(&mut self, cx: &mut Context<'_>) -> Step {
        (self.0)(cx)
    }
}

struct WaitSequence<I>(I);

impl<I> Routine for WaitSequence<I>
where
    I: Iterator<Item = Wait> + 'static,
{
    fn resume(&mut self, _cx: &mut Context<'_>) -> Step {
        match self.0.next() {
            Some(wait) => Step::Yield(wait),
            None => Step::Done,
        }
    }
}

enum Stage {
    Run(Box<dyn FnMut(&mut Context<'_>)>),
    Wait(Option<Wait>),
}

/// Scripted list of actions and waits
///
/// ```
/// use trellis::coroutine::{Sequence, Wait};
///
/// let blink = Sequence::new()
///     .then(|cx| {
///         if let Some(object) = cx.object_mut() {
///             object.set_active(false);
///         }
///     })
///     .wait(Wait::seconds(0.25))
///     .then(|cx| {
///         if let Some(object) = cx.object_mut() {
///             object.set_active(true);
///         }
///     });
/// # let _ = blink;
/// ```
#[derive(Default)]
pub struct Sequence {
    stages: Vec<Stage>,
    cursor: usize,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, action: impl FnMut(&mut Context<'_>) + 'static) -> Self {
        self.stages.push(Stage::Run(Box::new(action)));
        self
    }

    pub fn wait(mut self, wait: Wait) -> Self {
        self.stages.push(Stage::Wait(Some(wait)));
        self
    }
}

impl Routine for Sequence {
    /// Runs actions up to the next wait and yields it
    fn resume(&mut self, cx: &mut Context<'_>) -> Step {
        while let Some(stage) = self.stages.get_mut(self.cursor) {
            self.cursor += 1;
            match stage {
                Stage::Run(action) => action(cx),
                Stage::Wait(wait) => {
                    if let Some(wait) = wait.take() {
                        return Step::Yield(wait);
                    }
                }
            }
        }
        Step::Done
    }
}

/// A routine plus the condition it is currently suspended on
pub struct Coroutine {
    routine: Box<dyn Routine>,
    current: Option<Wait>,
    complete: bool,
}

impl Coroutine {
    pub fn new(routine: impl Routine) -> Self {
        Self {
            routine: Box::new(routine),
            current: None,
            complete: false,
        }
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(&mut Context<'_>) -> Step + 'static,
    {
        Self::new(FnRoutine(f))
    }

    /// Yields each condition in turn, then completes
    pub fn from_waits<I>(waits: I) -> Self
    where
        I: IntoIterator<Item = Wait>,
        I::IntoIter: 'static,
    {
        Self::new(WaitSequence(waits.into_iter()))
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Condition the coroutine is suspended on, if any
    pub fn current(&self) -> Option<&Wait> {
        self.current.as_ref()
    }

    /// Advance by one scheduler pass.
    ///
    /// Returns false once the routine is exhausted and on every call after.
    /// While the current condition still holds, returns true without
    /// resuming the routine.
    pub fn advance(&mut self, cx: &mut Context<'_>) -> bool {
        if self.complete {
            return false;
        }

        if let Some(wait) = self.current.as_mut() {
            if wait.should_wait(cx.delta_time()) {
                return true;
            }
        }

        match self.routine.resume(cx) {
            Step::Yield(wait) => {
                self.current = Some(wait);
                true
            }
            Step::Done => {
                self.current = None;
                self.complete = true;
                false
            }
        }
    }
}

impl From<Sequence> for Coroutine {
    fn from(sequence: Sequence) -> Self {
        Coroutine::new(sequence)
    }
}

impl fmt::Debug for Coroutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coroutine")
            .field("current", &self.current)
            .field("complete", &self.complete)
            .finish()
    }
}
