//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] mutations.  Browse mode drives the
//! list; compose mode edits the submission draft.
//!
//! ## For contributors
//!
//! To add a new browse keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in [`handle_browse_key`] that calls it.
//! 3. Update the help text in [`crate::ui::draw_status_bar`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::{App, Field, Mode};

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match &app.mode {
        Mode::Browse => handle_browse_key(app, key),
        Mode::Compose { .. } => handle_compose_key(app, key),
    }
}

fn handle_browse_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('n') => app.open_compose(),
        _ => {}
    }
}

fn handle_compose_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_compose(),
        KeyCode::Enter => app.submit_compose(),
        KeyCode::Tab => {
            if let Mode::Compose { focus, .. } = &mut app.mode {
                *focus = match focus {
                    Field::Title => Field::Body,
                    Field::Body => Field::Title,
                };
            }
        }
        KeyCode::Backspace => {
            if let Mode::Compose { draft, focus } = &mut app.mode {
                let field = match focus {
                    Field::Title => &mut draft.title,
                    Field::Body => &mut draft.body,
                };
                field.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Mode::Compose { draft, focus } = &mut app.mode {
                let field = match focus {
                    Field::Title => &mut draft.title,
                    Field::Body => &mut draft.body,
                };
                field.push(c);
            }
        }
        _ => {}
    }
}
