//! Cooperative coroutines
//!
//! Single-threaded and frame-stepped:
//! - A coroutine only runs when the scheduler pass advances it
//! - Suspension is explicit, through the `Wait` it yields
//! - Stopping a coroutine just forgets it; its routine gets no notification

pub mod routine;
pub mod scheduler;
pub mod wait;

pub use routine::{Coroutine, Routine, Sequence, Step};
pub use scheduler::{CoroutineHandle, CoroutineScheduler, OwnedCoroutines};
pub use wait::{Suspend, Wait};
