//! Post card widget.
//!
//! A card is a block of owned lines so the feed pane can measure it before
//! scrolling. Every card starts with a two-column gutter that carries the
//! selection marker.

use crate::feed::Post;
use crate::util::{strip_control_chars, truncate_to_width, wrap_to_width};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

const GUTTER: usize = 2;

fn gutter(selected: bool) -> Span<'static> {
    if selected {
        Span::styled("▌ ", Style::default().fg(Color::Cyan))
    } else {
        Span::raw("  ")
    }
}

/// Build the lines for one post card, `width` columns wide including the gutter.
pub fn card_lines(post: &Post, width: usize, selected: bool) -> Vec<Line<'static>> {
    let inner = width.saturating_sub(GUTTER).max(1);
    let mut lines = Vec::new();

    // Header: author, handle, timestamp, earnings
    let author = strip_control_chars(&post.author);
    let mut meta = format!(" {}", strip_control_chars(&post.handle));
    if !post.timestamp.is_empty() {
        meta.push_str(" · ");
        meta.push_str(&strip_control_chars(&post.timestamp));
    }
    let author = truncate_to_width(&author, inner).into_owned();
    let meta_room = inner.saturating_sub(crate::util::display_width(&author));
    let mut header = vec![
        gutter(selected),
        Span::styled(author, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            truncate_to_width(&meta, meta_room).into_owned(),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(earnings) = &post.earnings {
        header.push(Span::styled(
            format!("  +{}", strip_control_chars(earnings)),
            Style::default().fg(Color::Green),
        ));
    }
    lines.push(Line::from(header));

    // Body
    for text in wrap_to_width(&strip_control_chars(&post.content), inner) {
        lines.push(Line::from(vec![gutter(selected), Span::raw(text)]));
    }

    // Media
    let media_style = Style::default().fg(Color::Blue);
    if post.image.is_some() {
        lines.push(Line::from(vec![
            gutter(selected),
            Span::styled("[image]", media_style),
        ]));
    }
    if let Some(gallery) = post.gallery.as_ref().filter(|g| !g.is_empty()) {
        let tiles = (1..=gallery.len())
            .map(|i| format!("[{}]", i))
            .collect::<Vec<_>>()
            .join(" ");
        for text in wrap_to_width(&tiles, inner) {
            lines.push(Line::from(vec![
                gutter(selected),
                Span::styled(text, media_style),
            ]));
        }
    }

    // Achievement badge
    if let Some(achievement) = &post.achievement {
        let badge = Style::default().fg(Color::Yellow);
        let title = format!("★ {}", strip_control_chars(&achievement.title));
        lines.push(Line::from(vec![
            gutter(selected),
            Span::styled(
                truncate_to_width(&title, inner).into_owned(),
                badge.add_modifier(Modifier::BOLD),
            ),
        ]));
        for text in wrap_to_width(
            &strip_control_chars(&achievement.description),
            inner.saturating_sub(2).max(1),
        ) {
            lines.push(Line::from(vec![
                gutter(selected),
                Span::styled(format!("  {}", text), badge),
            ]));
        }
    }

    lines.push(action_row(post, selected));
    lines
}

fn action_row(post: &Post, selected: bool) -> Line<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    let (heart, heart_style) = if post.is_liked {
        ("♥", Style::default().fg(Color::Red))
    } else {
        ("♡", dim)
    };
    let (mark, mark_style) = if post.is_bookmarked {
        ("■ saved", Style::default().fg(Color::Cyan))
    } else {
        ("□ save", dim)
    };

    Line::from(vec![
        gutter(selected),
        Span::styled(format!("↩ {}", post.comments), dim),
        Span::raw("   "),
        Span::styled(format!("⟳ {}", post.reposts), dim),
        Span::raw("   "),
        Span::styled(format!("{} {}", heart, post.likes), heart_style),
        Span::raw("   "),
        Span::styled(mark, mark_style),
    ])
}
