//! User-facing notifications.
//!
//! The ingest manager talks to a [`NotificationSink`] when something the
//! user must see happens — today that is exactly one thing, the stream
//! going away.  The TUI implementation is a time-boxed toast queue shared
//! with the renderer; tests substitute a recording sink.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// The one message the user ever gets about the stream: it is gone.
/// Clean close and transport failure are deliberately not distinguished.
pub const DISCONNECT_MESSAGE: &str = "Argh! The client has disconnected";

/// How long a toast stays on screen.
const TOAST_TTL: Duration = Duration::from_secs(5);

/// Somewhere a user-visible message can be raised.
pub trait NotificationSink {
    fn notify(&mut self, message: &str);
}

/// One on-screen notification.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    raised_at: Instant,
}

impl Toast {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            raised_at: Instant::now(),
        }
    }

    pub fn expired(&self) -> bool {
        self.raised_at.elapsed() > TOAST_TTL
    }
}

/// Shared queue of active toasts.
///
/// Everything runs on the main loop thread, so a plain `Rc<RefCell<..>>`
/// is all the sharing machinery needed: the ingest manager pushes, the
/// renderer drains expired entries and draws the rest.
#[derive(Debug, Clone, Default)]
pub struct Toasts {
    inner: Rc<RefCell<Vec<Toast>>>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: &str) {
        self.inner.borrow_mut().push(Toast::new(message));
    }

    /// Drop expired toasts and return the ones still active.
    pub fn active(&self) -> Vec<Toast> {
        let mut q = self.inner.borrow_mut();
        q.retain(|t| !t.expired());
        q.clone()
    }
}

impl NotificationSink for Toasts {
    fn notify(&mut self, message: &str) {
        self.push(message);
    }
}
