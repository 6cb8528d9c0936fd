//! livefeed-articles — a live-updating article reader for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ StreamEvent ┌───────────┐ snapshot ┌──────────┐ draw() ┌────────┐
//! │ source/   │ ──────────► │ ingest.rs │ ───────► │  app.rs  │ ─────► │ ui.rs  │
//! │ (thread)  │  (channel)  │ (manager) │          │ (state)  │        │(render)│
//! └───────────┘             └───────────┘          └──────────┘        └────────┘
//!                                 │ notify()            ▲
//!                                 ▼                     │ handle_key_event()
//!                           ┌───────────┐          ┌──────────┐
//!                           │ notify.rs │          │ input.rs │
//!                           └───────────┘          └──────────┘
//! ```
//!
//! * **`source/`** — the `StreamSource` trait and concrete transports
//!   (currently NDJSON-over-HTTP only).
//! * **`ingest`** — owns the one subscription per run: a reader thread
//!   forwards stream events, the manager accumulates batches and raises the
//!   single disconnect notification.
//! * **`accum`** — the append-only, arrival-ordered collection.
//! * **`notify`** — the notification sink and its toast implementation.
//! * **`submit`** — posts a composed article back to the service.
//! * **`app`** — owns all application state (snapshot, scroll, form).
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations.
//! * **`main`** — wires everything together: resolve the endpoint, set up
//!   the terminal, and run the event loop.

mod accum;
mod app;
mod ingest;
mod input;
mod notify;
mod source;
mod submit;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use app::App;
use ingest::IngestManager;
use notify::Toasts;
use source::HttpSource;

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.  This prevents the common TUI bug where a panic leaves the
/// terminal in a broken state.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.  Without this, a panic inside the event loop would leave
/// raw mode enabled and the alternate screen active.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// First CLI argument, then `ARTICLES_ENDPOINT`, then a local default.
fn resolve_endpoint() -> String {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ARTICLES_ENDPOINT").ok())
        .unwrap_or_else(|| "http://localhost:8080".into())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    install_panic_hook();

    let endpoint = resolve_endpoint();

    // -- open the one subscription for this run ------------------------------
    // Mounting happens exactly once, before the loop: redraws must never
    // open another streaming call.
    let toasts = Toasts::new();
    let mut manager = IngestManager::new(Box::new(toasts.clone()));
    manager.mount(Box::new(HttpSource::new(&endpoint, "articles")));

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(&endpoint);

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Drain any stream events and refresh the snapshot.
    //   2. Check on an in-flight submission.
    //   3. Render the UI.
    //   4. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        // 1. Stream events
        if manager.pump() {
            app.set_items(manager.snapshot());
            app.status = format!("Received {} items", manager.item_count());
        }
        if let Some(status) = manager.take_status_update() {
            app.status = status.to_string();
        }

        // 2. Submission outcome
        app.poll_submission();

        // 3. Render
        guard.terminal.draw(|f| ui::draw(&mut app, &toasts, f))?;

        // 4. Handle input
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    // Release the stream before `guard` restores the terminal.
    manager.unmount();
    Ok(())
}
