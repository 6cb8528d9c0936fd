//! Stream subscription lifecycle and ingestion.
//!
//! A reader runs on a dedicated thread, forwarding events from the open
//! stream to the UI thread over an [`mpsc`] channel — every handler runs on
//! the main loop, strictly in arrival order.  [`IngestManager`] owns the
//! whole lifecycle: exactly one subscription per mount, exactly one
//! disconnect notification per subscription, and nothing mutates the
//! collection once the stream has ended.
//!
//! ## For contributors
//!
//! The manager is a three-state machine:
//!
//! ```text
//! Idle ──mount()──► Subscribed ──terminal event──► Ended
//!                    │       ▲
//!                    └───────┘  batches / statuses
//! ```
//!
//! `Ended` is terminal.  Late events from the transport (which should not
//! happen, but channels buffer) are dropped there, and `unmount()` never
//! re-fires the notification.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use crate::accum::Accumulator;
use crate::notify::{NotificationSink, DISCONNECT_MESSAGE};
use crate::source::{Article, StreamEvent, StreamSource, StreamStatus};

// ---------------------------------------------------------------------------
// Subscription — one live streaming call
// ---------------------------------------------------------------------------

/// Handle to one open streaming call: the reader thread's channel plus a
/// cancellation flag.
///
/// The reader forwards `Batch` and `Status` events as the source yields
/// them and appends exactly one `End` when the source iterator stops (or
/// when `open()` fails outright).  Once the flag is raised nothing further
/// is sent, and a dropped receiver stops the thread on its next send.
struct Subscription {
    rx: Receiver<StreamEvent>,
    cancel: Arc<AtomicBool>,
}

impl Subscription {
    fn open(source: Box<dyn StreamSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);

        thread::spawn(move || {
            match source.open() {
                Ok(events) => {
                    for ev in events {
                        if flag.load(Ordering::Relaxed) {
                            return;
                        }
                        if tx.send(ev).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(StreamEvent::Status(StreamStatus {
                        code: 0,
                        detail: format!("{}: {e}", source.name()),
                    }));
                }
            }
            if !flag.load(Ordering::Relaxed) {
                let _ = tx.send(StreamEvent::End);
            }
        });

        Self { rx, cancel }
    }

    fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// IngestManager — the state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Idle,
    Subscribed,
    Ended,
}

/// Owns the subscription handle and the accumulated collection, and drives
/// the notification sink on termination.
///
/// The renderer never touches this directly; it reads the `Arc` snapshots
/// handed out by [`snapshot()`](IngestManager::snapshot).
pub struct IngestManager {
    state: StreamState,
    subscription: Option<Subscription>,
    accum: Accumulator,
    sink: Box<dyn NotificationSink>,
    last_status: Option<StreamStatus>,
    pending_status: Option<StreamStatus>,
}

impl IngestManager {
    pub fn new(sink: Box<dyn NotificationSink>) -> Self {
        Self {
            state: StreamState::Idle,
            subscription: None,
            accum: Accumulator::new(),
            sink,
            last_status: None,
            pending_status: None,
        }
    }

    /// Open the one subscription this manager will ever hold.
    ///
    /// Returns `true` if a subscription was opened.  Calling this again
    /// while one is (or was) open is a no-op returning `false` — mounting
    /// is a one-shot side effect, not a per-redraw action.
    pub fn mount(&mut self, source: Box<dyn StreamSource>) -> bool {
        if self.state != StreamState::Idle {
            return false;
        }
        self.subscription = Some(Subscription::open(source));
        self.state = StreamState::Subscribed;
        true
    }

    /// Drain every event currently queued, without blocking.
    ///
    /// Called once per tick from the main loop.  Returns `true` if the
    /// collection snapshot changed, so the caller knows to refresh the view.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        loop {
            let ev = match &self.subscription {
                Some(sub) => match sub.rx.try_recv() {
                    Ok(ev) => ev,
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                },
                None => break,
            };
            changed |= self.handle_event(ev);
        }
        changed
    }

    /// Dispatch one stream event.  Returns `true` if the collection grew.
    fn handle_event(&mut self, ev: StreamEvent) -> bool {
        // Ended is terminal: anything the transport still delivers is dropped.
        if self.state != StreamState::Subscribed {
            return false;
        }
        match ev {
            StreamEvent::Batch(batch) => self.on_batch(batch),
            StreamEvent::Status(status) => {
                self.on_status(status);
                false
            }
            StreamEvent::End => {
                self.on_end();
                false
            }
        }
    }

    /// Append a batch in arrival order.  Empty batches change nothing.
    fn on_batch(&mut self, batch: Vec<Article>) -> bool {
        let grew = !batch.is_empty();
        self.accum.append(batch);
        grew
    }

    /// Record a transport status.  Observational only: the collection and
    /// the termination state are untouched.
    fn on_status(&mut self, status: StreamStatus) {
        self.pending_status = Some(status.clone());
        self.last_status = Some(status);
    }

    /// The terminal event: close out the subscription and raise the one
    /// disconnect notification.
    fn on_end(&mut self) {
        self.state = StreamState::Ended;
        self.subscription = None;
        self.sink.notify(DISCONNECT_MESSAGE);
    }

    /// Tear down.  Cancels a still-open subscription and releases its
    /// transport; never raises the disconnect notification itself.
    /// Safe to call after the stream has ended, and safe to call twice.
    pub fn unmount(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.cancel();
        }
        if self.state == StreamState::Subscribed {
            self.state = StreamState::Ended;
        }
    }

    /// Current collection snapshot; cheap, and stable once handed out.
    pub fn snapshot(&self) -> Arc<Vec<Article>> {
        self.accum.snapshot()
    }

    pub fn item_count(&self) -> usize {
        self.accum.len()
    }

    pub fn is_ended(&self) -> bool {
        self.state == StreamState::Ended
    }

    /// Most recently observed transport status.
    pub fn last_status(&self) -> Option<&StreamStatus> {
        self.last_status.as_ref()
    }

    /// Status observed since the last call, if any.  Consume-once, so the
    /// status line is only rewritten when something new arrived.
    pub fn take_status_update(&mut self) -> Option<StreamStatus> {
        self.pending_status.take()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use anyhow::Result;

    /// Sink that records every message it is handed.
    struct RecordingSink(Rc<RefCell<Vec<String>>>);

    impl NotificationSink for RecordingSink {
        fn notify(&mut self, message: &str) {
            self.0.borrow_mut().push(message.to_string());
        }
    }

    fn recording_manager() -> (IngestManager, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mgr = IngestManager::new(Box::new(RecordingSink(Rc::clone(&log))));
        (mgr, log)
    }

    /// In-memory source that replays a fixed event script.
    struct ScriptedSource {
        events: Vec<StreamEvent>,
        opened: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn new(events: Vec<StreamEvent>) -> Self {
            Self {
                events,
                opened: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl StreamSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        fn open(&self) -> Result<Box<dyn Iterator<Item = StreamEvent> + Send>> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(self.events.clone().into_iter()))
        }
    }

    fn art(id: u64) -> Article {
        Article {
            id,
            title: format!("article {id}"),
            body: String::new(),
            published: None,
        }
    }

    fn pump_until_ended(mgr: &mut IngestManager) {
        for _ in 0..500 {
            mgr.pump();
            if mgr.is_ended() {
                return;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("stream did not end in time");
    }

    // -- event dispatch (deterministic, no threads) --------------------------

    #[test]
    fn batches_concatenate_in_arrival_order() {
        let (mut mgr, _log) = recording_manager();
        mgr.state = StreamState::Subscribed;

        mgr.handle_event(StreamEvent::Batch(vec![art(1), art(2)]));
        mgr.handle_event(StreamEvent::Batch(vec![]));
        mgr.handle_event(StreamEvent::Batch(vec![art(3)]));

        let ids: Vec<u64> = mgr.snapshot().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn status_is_recorded_without_touching_the_collection() {
        let (mut mgr, log) = recording_manager();
        mgr.state = StreamState::Subscribed;
        mgr.handle_event(StreamEvent::Batch(vec![art(1)]));

        mgr.handle_event(StreamEvent::Status(StreamStatus {
            code: 200,
            detail: "ok".into(),
        }));

        assert_eq!(mgr.item_count(), 1);
        assert_eq!(mgr.last_status().unwrap().code, 200);
        assert!(!mgr.is_ended());
        assert!(log.borrow().is_empty(), "status must not notify the user");
    }

    #[test]
    fn status_updates_are_consumed_once() {
        let (mut mgr, _log) = recording_manager();
        mgr.state = StreamState::Subscribed;
        mgr.handle_event(StreamEvent::Status(StreamStatus {
            code: 200,
            detail: "ok".into(),
        }));

        assert!(mgr.take_status_update().is_some());
        assert!(mgr.take_status_update().is_none());
        assert!(mgr.last_status().is_some(), "last observed status is kept");
    }

    #[test]
    fn end_notifies_exactly_once_even_if_repeated() {
        let (mut mgr, log) = recording_manager();
        mgr.state = StreamState::Subscribed;

        mgr.handle_event(StreamEvent::End);
        mgr.handle_event(StreamEvent::End);
        mgr.handle_event(StreamEvent::End);

        assert!(mgr.is_ended());
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0], DISCONNECT_MESSAGE);
    }

    #[test]
    fn batches_after_end_are_dropped() {
        let (mut mgr, _log) = recording_manager();
        mgr.state = StreamState::Subscribed;

        mgr.handle_event(StreamEvent::Batch(vec![art(1)]));
        mgr.handle_event(StreamEvent::End);
        mgr.handle_event(StreamEvent::Batch(vec![art(2)]));

        assert_eq!(mgr.item_count(), 1);
    }

    #[test]
    fn late_snapshot_matches_early_snapshot_prefix() {
        let (mut mgr, _log) = recording_manager();
        mgr.state = StreamState::Subscribed;

        mgr.handle_event(StreamEvent::Batch(vec![art(1)]));
        let early = mgr.snapshot();
        mgr.handle_event(StreamEvent::Batch(vec![art(2)]));

        assert_eq!(early.len(), 1, "handed-out snapshots never grow");
        assert_eq!(mgr.snapshot().len(), 2);
    }

    // -- mount / unmount lifecycle -------------------------------------------

    #[test]
    fn mount_opens_at_most_one_subscription() {
        let (mut mgr, _log) = recording_manager();
        let first = ScriptedSource::new(vec![]);
        let second = ScriptedSource::new(vec![]);
        let second_opened = Arc::clone(&second.opened);

        assert!(mgr.mount(Box::new(first)));
        assert!(!mgr.mount(Box::new(second)), "re-mount must be a no-op");
        assert_eq!(second_opened.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unmount_is_idempotent_and_never_notifies() {
        let (mut mgr, log) = recording_manager();
        mgr.mount(Box::new(ScriptedSource::new(vec![])));

        mgr.unmount();
        mgr.unmount();

        assert!(mgr.is_ended());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn unmount_after_end_does_not_notify_again() {
        let (mut mgr, log) = recording_manager();
        mgr.state = StreamState::Subscribed;
        mgr.handle_event(StreamEvent::End);

        mgr.unmount();

        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn pump_before_mount_is_a_noop() {
        let (mut mgr, log) = recording_manager();
        assert!(!mgr.pump());
        assert_eq!(mgr.item_count(), 0);
        assert!(log.borrow().is_empty());
    }

    // -- end-to-end through the reader thread --------------------------------

    #[test]
    fn scripted_stream_accumulates_then_notifies_once() {
        let (mut mgr, log) = recording_manager();
        mgr.mount(Box::new(ScriptedSource::new(vec![
            StreamEvent::Batch(vec![art(1), art(2)]),
            StreamEvent::Batch(vec![art(3)]),
        ])));

        pump_until_ended(&mut mgr);

        let ids: Vec<u64> = mgr.snapshot().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0], DISCONNECT_MESSAGE);
    }

    #[test]
    fn empty_stream_still_notifies_once() {
        let (mut mgr, log) = recording_manager();
        mgr.mount(Box::new(ScriptedSource::new(vec![])));

        pump_until_ended(&mut mgr);

        assert!(mgr.snapshot().is_empty());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn failed_open_surfaces_status_then_ends() {
        struct BrokenSource;
        impl StreamSource for BrokenSource {
            fn name(&self) -> &str {
                "broken"
            }
            fn open(&self) -> Result<Box<dyn Iterator<Item = StreamEvent> + Send>> {
                anyhow::bail!("connection refused")
            }
        }

        let (mut mgr, log) = recording_manager();
        mgr.mount(Box::new(BrokenSource));

        pump_until_ended(&mut mgr);

        assert!(mgr.snapshot().is_empty());
        assert!(mgr.last_status().unwrap().detail.contains("connection refused"));
        assert_eq!(log.borrow().len(), 1);
    }
}
