use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // EDGE-001: Guard against zero-width/height areas
    if area.width < 1 || area.height < 1 {
        return;
    }

    // Use Cow to avoid allocations for static strings and borrowed status messages
    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_str())
    } else if app.feed.error_message().is_some() {
        Cow::Borrowed("[r]etry [?]help [q]uit")
    } else {
        Cow::Owned(format!(
            "Page {} | {} posts | {} buffered | [j/k]move [l]ike [b]ookmark [?]help [q]uit",
            app.feed.current_page(),
            app.feed.visible().len(),
            app.feed.buffered(),
        ))
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);

    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}
