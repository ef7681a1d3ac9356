//! Suspension conditions a coroutine can yield

use std::fmt;

/// Capability to keep a coroutine suspended
///
/// Polled once per scheduler pass with that frame's delta time; returning
/// false resumes the coroutine on the same pass.
pub trait Suspend {
    fn should_wait(&mut self, dt: f32) -> bool;
}

/// Built-in suspension conditions
pub enum Wait {
    /// Resume on the next pass
    NextFrame,
    /// Resume on the `n`-th pass after yielding
    Frames { remaining: u32 },
    /// Resume once `duration` seconds of frame time have accumulated
    Seconds { duration: f32, elapsed: f32 },
    /// Never resume; only an explicit stop ends the coroutine
    Forever,
    Custom(Box<dyn Suspend>),
}

impl Wait {
    pub fn frames(n: u32) -> Self {
        Wait::Frames { remaining: n }
    }

    pub fn seconds(duration: f32) -> Self {
        Wait::Seconds {
            duration,
            elapsed: 0.0,
        }
    }

    /// Resume once `done` returns true
    pub fn until(done: impl FnMut() -> bool + 'static) -> Self {
        Wait::Custom(Box::new(Until(done)))
    }

    pub fn custom(condition: impl Suspend + 'static) -> Self {
        Wait::Custom(Box::new(condition))
    }
}

impl Suspend for Wait {
    fn should_wait(&mut self, dt: f32) -> bool {
        match self {
            Wait::NextFrame => false,
            Wait::Frames { remaining } => {
                *remaining = remaining.saturating_sub(1);
                *remaining > 0
            }
            Wait::Seconds { duration, elapsed } => {
                *elapsed += dt;
                *elapsed < *duration
            }
            Wait::Forever => true,
            Wait::Custom(condition) => condition.should_wait(dt),
        }
    }
}

impl fmt::Debug for Wait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wait::NextFrame => write!(f, "NextFrame"),
            Wait::Frames { remaining } => write!(f, "Frames({})", remaining),
            Wait::Seconds { duration, elapsed } => write!(f, "Seconds({}/{})", elapsed, duration),
            Wait::Forever => write!(f, "Forever"),
            Wait::Custom(_) => write!(f, "Custom"),
        }
    }
}

struct Until<F>(F);

impl<F: FnMut() -> bool> Suspend for Until<F> {
    fn should_wait(&mut self, _dt: f32) -> bool {
        !(self.0)()
    }
}
