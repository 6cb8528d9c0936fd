//! Remote stream source abstraction layer.
//!
//! This module defines the [`StreamSource`] trait, the [`StreamEvent`]s a
//! source emits, and the common [`Article`] type.  Concrete transports live
//! in sub-modules (currently NDJSON-over-HTTP only).
//!
//! ## For contributors — adding a new transport
//!
//! 1. Create a new file in this directory (e.g. `websocket.rs`).
//! 2. Define a struct (e.g. `WsSource`) and implement [`StreamSource`] for it.
//! 3. Add `mod websocket;` below and re-export your struct in the `pub use`
//!    block.
//! 4. Construct an instance in `main.rs` and hand it to the ingest manager.
//!
//! The subscription machinery, accumulation, and UI are all transport-agnostic.

mod article;
mod http;

// Re-export the public API of this module so callers can write
// `use crate::source::{Article, StreamEvent, StreamSource, HttpSource};`
pub use article::{Article, ListResponse};
pub use http::HttpSource;

use anyhow::Result;

/// Transport status observation, e.g. the HTTP response code at connect
/// time or a note about a skipped malformed frame.
///
/// Purely informational: status events never alter the accumulated
/// collection and never terminate the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStatus {
    /// Transport-level code (HTTP status for the HTTP source).
    pub code: u16,
    /// Human-readable detail for the status line.
    pub detail: String,
}

impl std::fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.detail)
    }
}

/// One event on an open subscription.
///
/// Sources only ever produce `Batch` and `Status`; the terminal `End` is
/// appended exactly once by the subscription layer when the source's event
/// iterator is exhausted (normally or because the transport failed).
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// One batch of articles, in server emission order.
    Batch(Vec<Article>),
    /// An observational transport status.
    Status(StreamStatus),
    /// The stream has terminated.  Normal close and transport error are
    /// deliberately indistinguishable here.
    End,
}

/// Trait that every remote stream transport must implement.
///
/// [`open()`](StreamSource::open) is called once per subscription on a
/// background reader thread, so implementations must be [`Send`].  The
/// returned iterator blocks between events; it must yield only `Batch` and
/// `Status` and simply stop when the stream is over.
pub trait StreamSource: Send {
    /// Human-readable label shown in the status bar.
    fn name(&self) -> &str;

    /// Open the single server-streaming call and return its event sequence.
    ///
    /// An `Err` here means the call could not be established at all; the
    /// subscription layer turns that into a status plus the terminal event.
    fn open(&self) -> Result<Box<dyn Iterator<Item = StreamEvent> + Send>>;
}
