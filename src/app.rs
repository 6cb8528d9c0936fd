//! Application state.
//!
//! `App` owns everything the renderer reads: the current collection
//! snapshot, scroll position, status line, and the compose form.  It never
//! talks to the network itself — stream events arrive via the ingest
//! manager in `main`, and submissions run through [`crate::submit`].

use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

use ratatui::widgets::ListState;

use crate::source::Article;
use crate::submit::{self, ArticleDraft, SubmitMsg};

/// Which compose field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Body,
}

/// What the keyboard is currently driving.
pub enum Mode {
    /// Scrolling the article list.
    Browse,
    /// Editing the submission form.
    Compose { draft: ArticleDraft, focus: Field },
}

pub struct App {
    /// Read-only snapshot of the accumulated collection.  Replaced wholesale
    /// whenever the ingest manager reports a change; never mutated here.
    pub items: Arc<Vec<Article>>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status line message.
    pub status: String,
    /// Current input mode.
    pub mode: Mode,
    /// Base URL of the article service, used by the submission path.
    pub endpoint: String,
    /// Outcome channel of an in-flight submission, if any.
    pending_submit: Option<Receiver<SubmitMsg>>,
}

impl App {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            items: Arc::new(Vec::new()),
            list_state: ListState::default(),
            quit: false,
            status: "Connecting…".into(),
            mode: Mode::Browse,
            endpoint: endpoint.into(),
            pending_submit: None,
        }
    }

    /// Swap in a new collection snapshot from the ingest manager.
    pub fn set_items(&mut self, snapshot: Arc<Vec<Article>>) {
        self.items = snapshot;
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.items.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.items.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.items.is_empty() {
            self.list_state.select(Some(self.items.len() - 1));
        }
    }

    // -- compose / submit ----------------------------------------------------

    pub fn open_compose(&mut self) {
        self.mode = Mode::Compose {
            draft: ArticleDraft::default(),
            focus: Field::Title,
        };
    }

    pub fn cancel_compose(&mut self) {
        self.mode = Mode::Browse;
    }

    /// Validate the draft and hand it to the background submitter.
    ///
    /// An invalid draft keeps the form open with the reason in the status
    /// line; a valid one returns the app to browse mode while the POST runs.
    pub fn submit_compose(&mut self) {
        let Mode::Compose { draft, .. } = &self.mode else {
            return;
        };
        if let Err(e) = draft.validate() {
            self.status = format!("Cannot submit: {e}");
            return;
        }
        let draft = draft.clone();
        self.status = format!("Submitting \"{}\"…", draft.title);
        self.pending_submit = Some(submit::spawn(self.endpoint.clone(), draft));
        self.mode = Mode::Browse;
    }

    /// Check on an in-flight submission, updating the status line when the
    /// outcome arrives.  Called once per tick.
    pub fn poll_submission(&mut self) {
        let Some(rx) = self.pending_submit.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(SubmitMsg::Accepted(title)) => {
                self.status = format!("Submitted \"{title}\"");
            }
            Ok(SubmitMsg::Failed(reason)) => {
                self.status = reason;
            }
            // Still in flight; keep waiting.
            Err(TryRecvError::Empty) => {
                self.pending_submit = Some(rx);
            }
            Err(TryRecvError::Disconnected) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(id: u64, title: &str) -> Article {
        Article {
            id,
            title: title.to_string(),
            body: String::new(),
            published: None,
        }
    }

    fn app_with_items(n: u64) -> App {
        let mut app = App::new("http://localhost:8080");
        let items: Vec<Article> = (1..=n).map(|i| art(i, &format!("a{i}"))).collect();
        app.set_items(Arc::new(items));
        app
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_app_starts_empty_in_browse_mode() {
        let app = App::new("http://localhost:8080");
        assert!(app.items.is_empty());
        assert!(!app.quit);
        assert!(app.list_state.selected().is_none());
        assert!(matches!(app.mode, Mode::Browse));
    }

    // -- snapshots -----------------------------------------------------------

    #[test]
    fn set_items_replaces_the_snapshot() {
        let mut app = app_with_items(2);
        assert_eq!(app.items.len(), 2);
        app.set_items(Arc::new(vec![art(1, "a"), art(2, "b"), art(3, "c")]));
        assert_eq!(app.items.len(), 3);
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn select_next_on_empty_is_noop() {
        let mut app = App::new("http://localhost:8080");
        app.select_next();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_previous_on_empty_is_noop() {
        let mut app = App::new("http://localhost:8080");
        app.select_previous();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_next_starts_at_zero_then_advances() {
        let mut app = app_with_items(3);

        app.select_next();
        assert_eq!(app.list_state.selected(), Some(0));

        app.select_next();
        assert_eq!(app.list_state.selected(), Some(1));
    }

    #[test]
    fn select_next_clamps_at_last_item() {
        let mut app = app_with_items(3);
        app.select_last();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn select_previous_clamps_at_zero() {
        let mut app = app_with_items(3);
        app.select_first();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn select_first_and_last_jump() {
        let mut app = app_with_items(3);
        app.select_last();
        assert_eq!(app.list_state.selected(), Some(2));
        app.select_first();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    // -- compose -------------------------------------------------------------

    #[test]
    fn open_compose_starts_with_empty_draft_focused_on_title() {
        let mut app = App::new("http://localhost:8080");
        app.open_compose();
        match &app.mode {
            Mode::Compose { draft, focus } => {
                assert!(draft.title.is_empty());
                assert!(draft.body.is_empty());
                assert_eq!(*focus, Field::Title);
            }
            Mode::Browse => panic!("expected compose mode"),
        }
    }

    #[test]
    fn cancel_compose_returns_to_browse() {
        let mut app = App::new("http://localhost:8080");
        app.open_compose();
        app.cancel_compose();
        assert!(matches!(app.mode, Mode::Browse));
    }

    #[test]
    fn submitting_an_invalid_draft_keeps_the_form_open() {
        let mut app = App::new("http://localhost:8080");
        app.open_compose();
        app.submit_compose();
        assert!(matches!(app.mode, Mode::Compose { .. }));
        assert!(app.status.contains("Cannot submit"));
    }
}
