//! Bootstrap handle to the running app
//!
//! `App::run` registers its mailbox here for the calling thread, so code that
//! has no `Context` at hand can still request a quit or a scene change, or
//! read the frame clock. Requests are applied at the end of the current tick,
//! exactly like the ones posted through `Context`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{EngineError, Result};
use crate::scene::{FrameTime, Request};

#[derive(Debug, Default)]
pub(crate) struct MailboxState {
    pub(crate) requests: Vec<Request>,
    pub(crate) time: FrameTime,
    pub(crate) running: bool,
}

pub(crate) type Mailbox = Rc<RefCell<MailboxState>>;

thread_local! {
    static CURRENT: RefCell<Option<Mailbox>> = const { RefCell::new(None) };
}

/// Keeps an app registered as current until dropped; the previously
/// registered app (if any) becomes current again.
#[must_use = "the app stops being current when the registration is dropped"]
pub struct Registration {
    previous: Option<Mailbox>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}

pub(crate) fn register(mailbox: Mailbox) -> Registration {
    let previous = CURRENT.with(|current| current.borrow_mut().replace(mailbox));
    Registration { previous }
}

fn with_mailbox<R>(f: impl FnOnce(&mut MailboxState) -> R) -> Result<R> {
    CURRENT.with(|current| {
        let current = current.borrow();
        let mailbox = current.as_ref().ok_or(EngineError::NoActiveApplication)?;
        let mut state = mailbox.borrow_mut();
        Ok(f(&mut state))
    })
}

/// Close the app at the end of this tick
pub fn quit() -> Result<()> {
    with_mailbox(|mailbox| mailbox.requests.push(Request::Quit))
}

pub fn load_next() -> Result<()> {
    with_mailbox(|mailbox| mailbox.requests.push(Request::LoadNext))
}

pub fn load_scene(name: impl Into<String>) -> Result<()> {
    let request = Request::LoadScene(name.into());
    with_mailbox(|mailbox| mailbox.requests.push(request))
}

pub fn reload() -> Result<()> {
    with_mailbox(|mailbox| mailbox.requests.push(Request::Reload))
}

/// Delta time of the frame in progress (or the last one)
pub fn delta_time() -> Result<f32> {
    with_mailbox(|mailbox| mailbox.time.delta)
}

pub fn elapsed() -> Result<f64> {
    with_mailbox(|mailbox| mailbox.time.elapsed)
}

pub fn frame_count() -> Result<u64> {
    with_mailbox(|mailbox| mailbox.time.frame)
}

/// A registered app exists and is in the running state
pub fn is_running() -> bool {
    with_mailbox(|mailbox| mailbox.running).unwrap_or(false)
}
