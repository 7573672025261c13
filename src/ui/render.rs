//! Render functions for the TUI.
//!
//! This module handles all rendering logic: the scrolling feed with its
//! end-of-feed footer, the full-screen error view and the overlays.
//! Rendering also records the feed geometry on the `App` so navigation and
//! the scroll sentinel see exactly what was drawn.

use crate::app::{App, CardSpan, FeedLayout};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{help, post, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 8;

/// Loading spinner animation frames.
pub(super) const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main render dispatch function.
///
/// Handles terminal size validation before rendering.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // EDGE-001: Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    // EDGE-001: Minimum terminal size check for usable UI
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        // Nothing of the feed is on screen.
        app.layout = FeedLayout::default();
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    if app.feed.error_message().is_some() {
        render_error(f, app, chunks[0]);
    } else {
        render_feed(f, app, chunks[0]);
    }
    status::render(f, app, chunks[1]);

    // Render help overlay on top of any view when active
    if app.show_help {
        help::render(f, app);
    }
}

/// Render the scrolling feed: post cards followed by the sentinel footer.
fn render_feed(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Feed ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width < 1 || inner.height < 1 {
        app.layout = FeedLayout::default();
        return;
    }

    let width = inner.width as usize;
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut cards = Vec::with_capacity(app.feed.visible().len());

    for (i, p) in app.feed.visible().iter().enumerate() {
        let card = post::card_lines(p, width, i == app.selected);
        cards.push(CardSpan {
            top: lines.len(),
            height: card.len(),
        });
        lines.extend(card);
        lines.push(Line::default());
    }
    let content_rows = lines.len();

    let footer = footer_line(app);
    lines.push(footer);

    app.layout = FeedLayout {
        cards,
        content_rows,
        footer_rows: 1,
        viewport_rows: inner.height as usize,
    };
    app.clamp_view();

    // P-10/I-3: Clamp before cast to prevent u16 overflow
    let scroll = app.scroll.min(u16::MAX as usize) as u16;
    f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

/// The row directly below the last card. It is the sentinel region.
fn footer_line(app: &App) -> Line<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    if app.feed.is_loading() {
        let frame = SPINNER[app.spinner_frame % SPINNER.len()];
        Line::from(vec![
            Span::styled(frame, Style::default().fg(Color::Cyan)),
            Span::styled(" Loading posts...", dim),
        ])
        .alignment(Alignment::Center)
    } else if app.feed.has_more() {
        Line::default()
    } else if app.feed.visible().is_empty() {
        Line::styled("No posts", dim).alignment(Alignment::Center)
    } else {
        Line::styled("No more posts to load", dim).alignment(Alignment::Center)
    }
}

/// Render the full-screen error view with its retry hint.
fn render_error(f: &mut Frame, app: &mut App, area: Rect) {
    // The feed is not on screen; keep the sentinel out of range.
    app.layout = FeedLayout::default();

    let message = app.feed.error_message().unwrap_or_default().to_string();
    let top_pad = area.height.saturating_sub(5) / 2;

    let mut lines: Vec<Line> = (0..top_pad).map(|_| Line::default()).collect();
    lines.push(Line::styled(
        message,
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ));
    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled("[r]", Style::default().fg(Color::Cyan)),
        Span::raw(" Retry"),
    ]));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error "),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
