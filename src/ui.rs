//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  This makes it easy to change the
//! visual layout without touching the ingestion logic.
//!
//! ## For contributors
//!
//! * The layout is a two-row split: the scrollable article list on top and
//!   a one-line status bar at the bottom.
//! * The compose form and toasts are drawn over the list as overlays.
//! * Colours and styles are defined inline — feel free to extract them into
//!   constants or a theme struct if the palette grows.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, Field, Mode};
use crate::notify::Toasts;

/// Draw the complete UI for one frame.
///
/// Called once per tick from the main loop.  Delegates to helper functions
/// for each screen region and overlay.
pub fn draw(app: &mut App, toasts: &Toasts, frame: &mut Frame) {
    let [main_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_article_list(app, frame, main_area);
    draw_status_bar(app, frame, status_area);

    if let Mode::Compose { .. } = app.mode {
        draw_compose_form(app, frame, main_area);
    }
    draw_toasts(toasts, frame, main_area);
}

/// Render the scrollable article list, in arrival order.
fn draw_article_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_items: Vec<ListItem> = app
        .items
        .iter()
        .map(|item| {
            let date_str = item
                .published
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "no date".into());

            let line = Line::from(vec![
                Span::styled(
                    format!("{:>5} ", item.id),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(&item.title, Style::default().fg(Color::White)),
                Span::raw("  "),
                Span::styled(date_str, Style::default().fg(Color::Cyan)),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(list_items)
        .block(
            Block::default()
                .title(" Articles ")
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} items", app.items.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  n: new article"),
    ]));
    frame.render_widget(status, area);
}

/// Render the submission form as a centered popup over the list.
fn draw_compose_form(app: &App, frame: &mut Frame, area: Rect) {
    let Mode::Compose { draft, focus } = &app.mode else {
        return;
    };

    let popup = centered_rect(area, 60, 9);
    frame.render_widget(Clear, popup);

    let focused = Style::default().fg(Color::Yellow);
    let blurred = Style::default().fg(Color::DarkGray);

    let form = Paragraph::new(vec![
        Line::from(Span::styled(
            "Title",
            if *focus == Field::Title { focused } else { blurred },
        )),
        Line::from(Span::raw(format!(" {}", draft.title))),
        Line::from(""),
        Line::from(Span::styled(
            "Body",
            if *focus == Field::Body { focused } else { blurred },
        )),
        Line::from(Span::raw(format!(" {}", draft.body))),
        Line::from(""),
        Line::from(Span::styled(
            "Tab: switch field  Enter: submit  Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(
        Block::default()
            .title(" New article ")
            .borders(Borders::ALL),
    );

    frame.render_widget(form, popup);
}

/// Render active toasts in the top-right corner of the list area.
fn draw_toasts(toasts: &Toasts, frame: &mut Frame, area: Rect) {
    for (i, toast) in toasts.active().iter().enumerate() {
        let width = (toast.message.len() as u16 + 4).min(area.width);
        let rect = Rect {
            x: area.right().saturating_sub(width + 1),
            y: area.y + 1 + i as u16 * 3,
            width,
            height: 3,
        };
        if rect.bottom() > area.bottom() {
            break;
        }
        frame.render_widget(Clear, rect);
        let body = Paragraph::new(Line::from(Span::styled(
            toast.message.clone(),
            Style::default().fg(Color::Red),
        )))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(body, rect);
    }
}

/// A `width` x `height` rectangle centered inside `area`, clamped to fit.
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
