//! Append-only article accumulation.
//!
//! The accumulator holds everything received over one subscription, in
//! arrival order.  Each append produces a fresh snapshot behind an [`Arc`];
//! snapshots already handed to the renderer are never touched again, so the
//! read path needs no synchronisation at all.

use std::sync::Arc;

use crate::source::Article;

/// The accumulated collection for one subscription's lifetime.
///
/// Invariants: insertion order equals arrival order, nothing is ever
/// reordered, deduplicated, or removed.  The collection at any point equals
/// the concatenation of every batch appended so far.
#[derive(Debug, Default)]
pub struct Accumulator {
    snapshot: Arc<Vec<Article>>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one batch and return the new snapshot.
    ///
    /// Infallible.  An empty batch changes nothing and returns the current
    /// snapshot unchanged.
    pub fn append(&mut self, batch: Vec<Article>) -> Arc<Vec<Article>> {
        if !batch.is_empty() {
            let mut next = Vec::with_capacity(self.snapshot.len() + batch.len());
            next.extend_from_slice(&self.snapshot);
            next.extend(batch);
            self.snapshot = Arc::new(next);
        }
        Arc::clone(&self.snapshot)
    }

    /// The current snapshot, cheap to clone and safe to hold across appends.
    pub fn snapshot(&self) -> Arc<Vec<Article>> {
        Arc::clone(&self.snapshot)
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }
}
