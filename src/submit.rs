//! Article submission.
//!
//! Independent of the ingestion state machine: posting a new article is a
//! one-shot write against the service.  The POST runs on a short-lived
//! background thread so the UI never blocks on the network; the outcome
//! comes back over an [`mpsc`] channel and lands in the status line.

use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::{ensure, Result};
use serde::Serialize;

/// A new article as composed in the TUI form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArticleDraft {
    pub title: String,
    pub body: String,
}

impl ArticleDraft {
    /// Minimal sanity check before hitting the network.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.title.trim().is_empty(), "title must not be empty");
        ensure!(!self.body.trim().is_empty(), "body must not be empty");
        Ok(())
    }
}

/// Outcome of one submission attempt.
pub enum SubmitMsg {
    /// The service accepted the article with this title.
    Accepted(String),
    /// The submission failed with this error description.
    Failed(String),
}

fn submit_url(endpoint: &str) -> String {
    format!("{}/articles", endpoint.trim_end_matches('/'))
}

fn post_draft(endpoint: &str, draft: &ArticleDraft) -> Result<()> {
    draft.validate()?;
    reqwest::blocking::Client::new()
        .post(submit_url(endpoint))
        .json(draft)
        .send()?
        .error_for_status()?;
    Ok(())
}

/// Send a draft to the service in the background.
///
/// Returns a receiver that will see exactly one [`SubmitMsg`].  If the main
/// loop has moved on and dropped the receiver, the result is silently
/// discarded.
pub fn spawn(endpoint: String, draft: ArticleDraft) -> Receiver<SubmitMsg> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let msg = match post_draft(&endpoint, &draft) {
            Ok(()) => SubmitMsg::Accepted(draft.title.clone()),
            Err(e) => SubmitMsg::Failed(format!("submit failed: {e}")),
        };
        let _ = tx.send(msg);
    });

    rx
}
