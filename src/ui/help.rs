//! Help overlay listing the active keybindings.
//!
//! Keys bound to the same action are folded onto one line, so `j, Down`
//! reads as a single entry. The section for the screen currently on display
//! is listed first and marked; user overrides from config show up as bound.

use crate::app::App;
use crate::keybindings::{Context, KeybindingRegistry};
use crate::util::display_width;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// One line of the overlay: every key bound to an action, and what it does.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    keys: String,
    action: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    context: Context,
    entries: Vec<Entry>,
}

fn section_title(context: Context) -> &'static str {
    match context {
        Context::Global => "Anywhere",
        Context::Feed => "Reading the feed",
        Context::Error => "After a failed load",
    }
}

/// Fold the registry into sections, `active` first, then the rest in a
/// fixed order. Contexts with no bindings are left out.
fn sections(registry: &KeybindingRegistry, active: Context) -> Vec<Section> {
    let bindings = registry.all_bindings();
    let mut order = vec![active];
    order.extend(
        [Context::Global, Context::Feed, Context::Error]
            .into_iter()
            .filter(|c| *c != active),
    );

    order
        .into_iter()
        .filter_map(|context| {
            let mut entries: Vec<Entry> = Vec::new();
            for (_, key, action) in bindings.iter().filter(|(c, _, _)| *c == context) {
                match entries.iter_mut().find(|e| e.action == *action) {
                    Some(entry) => {
                        entry.keys.push_str(", ");
                        entry.keys.push_str(key);
                    }
                    None => entries.push(Entry {
                        keys: key.clone(),
                        action: *action,
                    }),
                }
            }
            (!entries.is_empty()).then_some(Section { context, entries })
        })
        .collect()
}

fn overlay_lines(sections: &[Section], active: Context) -> Vec<Line<'static>> {
    let key_width = sections
        .iter()
        .flat_map(|s| s.entries.iter())
        .map(|e| display_width(&e.keys))
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    for section in sections {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        let mut heading = vec![Span::styled(
            section_title(section.context),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];
        if section.context == active && section.context != Context::Global {
            heading.push(Span::styled(
                "  (this screen)",
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(heading));

        for entry in &section.entries {
            let pad = key_width.saturating_sub(display_width(&entry.keys));
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {}{}", entry.keys, " ".repeat(pad)),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw("   "),
                Span::raw(entry.action),
            ]));
        }
    }
    lines
}

/// Draw the overlay centered over whatever is on screen.
pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(70, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    let active = if app.feed.error_message().is_some() {
        Context::Error
    } else {
        Context::Feed
    };
    let lines = overlay_lines(&sections(&app.keybindings, active), active);

    let inner_rows = overlay.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(inner_rows);
    let scroll = app.help_scroll_offset.min(max_scroll);
    let title = if max_scroll > 0 {
        " Keys (j/k scroll, ? close) "
    } else {
        " Keys (? close) "
    };

    f.render_widget(Clear, overlay);
    f.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(title),
            )
            .scroll((scroll.min(u16::MAX as usize) as u16, 0)),
        overlay,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let scale = |len: u16, pct: u16| (u32::from(len) * u32::from(pct) / 100) as u16;
    let width = scale(area.width, percent_x);
    let height = scale(area.height, percent_y);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_keys_for_one_action_share_a_line() {
        let registry = KeybindingRegistry::new();
        let feed = sections(&registry, Context::Feed)
            .into_iter()
            .find(|s| s.context == Context::Feed)
            .unwrap();
        let next = feed
            .entries
            .iter()
            .find(|e| e.action == "Next post")
            .unwrap();
        assert_eq!(next.keys, "j, Down");
        assert_eq!(
            feed.entries.iter().filter(|e| e.action == "Next post").count(),
            1
        );
    }

    #[test]
    fn test_active_context_listed_first() {
        let registry = KeybindingRegistry::new();
        let order: Vec<Context> = sections(&registry, Context::Error)
            .iter()
            .map(|s| s.context)
            .collect();
        assert_eq!(order, vec![Context::Error, Context::Global, Context::Feed]);

        let order: Vec<Context> = sections(&registry, Context::Feed)
            .iter()
            .map(|s| s.context)
            .collect();
        assert_eq!(order, vec![Context::Feed, Context::Global, Context::Error]);
    }

    #[test]
    fn test_override_shows_in_overlay() {
        let mut registry = KeybindingRegistry::new();
        let overrides = HashMap::from([("like".to_string(), "f".to_string())]);
        assert!(registry.apply_overrides(&overrides).is_empty());

        let text: Vec<String> = overlay_lines(&sections(&registry, Context::Feed), Context::Feed)
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(text
            .iter()
            .any(|l| l.trim_start().starts_with("f ") && l.contains("Like")));
        assert!(text[0].contains("(this screen)"));
    }

    #[test]
    fn test_centered_rect() {
        let r = centered_rect(70, 80, Rect::new(0, 0, 100, 50));
        assert_eq!(r, Rect::new(15, 5, 70, 40));
    }

    #[test]
    fn test_centered_rect_wide_terminal() {
        let r = centered_rect(70, 80, Rect::new(0, 0, 1000, 50));
        assert_eq!(r.width, 700);
    }
}
