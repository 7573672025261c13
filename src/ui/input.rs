//! Input handling for the TUI.
//!
//! This module processes keyboard input and dispatches to the appropriate
//! handler based on what is on screen.

use crate::app::App;
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Main input dispatch function.
///
/// The help overlay captures all keys while visible. Otherwise keys resolve
/// in the error context when the feed shows its error screen, and in the
/// feed context when it does not.
pub(super) fn handle_input(app: &mut App, code: KeyCode, mut modifiers: KeyModifiers) -> Action {
    if app.show_help {
        return handle_help_input(app, code);
    }

    // Shifted characters arrive as the uppercase char; the modifier is redundant.
    if matches!(code, KeyCode::Char(_)) {
        modifiers.remove(KeyModifiers::SHIFT);
    }

    let context = if app.feed.error_message().is_some() {
        KbContext::Error
    } else {
        KbContext::Feed
    };
    let Some(action) = app.keybindings.action_for_key(code, modifiers, context) else {
        return Action::Continue;
    };

    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        KbAction::NavDown => app.nav_down(),
        KbAction::NavUp => app.nav_up(),
        KbAction::PageDown => app.page_down(),
        KbAction::PageUp => app.page_up(),
        KbAction::Top => app.jump_top(),
        KbAction::Bottom => app.jump_bottom(),
        KbAction::Like => {
            if let Some(id) = app.selected_post_id() {
                app.feed.like(&id);
            }
        }
        KbAction::Bookmark => {
            if let Some(id) = app.selected_post_id() {
                if app.feed.bookmark(&id) {
                    let saved = app
                        .feed
                        .visible()
                        .get(app.selected)
                        .is_some_and(|p| p.is_bookmarked);
                    app.set_status(if saved {
                        "Bookmarked"
                    } else {
                        "Bookmark removed"
                    });
                }
            }
        }
        KbAction::Retry => {
            app.feed.retry();
            app.reset_view();
            app.set_status("Retrying...");
        }
    }
    app.needs_redraw = true;
    Action::Continue
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{
        FeedController, FeedEvent, FeedSettings, SequentialIds, StaticSource, ViewportSentinel,
    };
    use crate::keybindings::KeybindingRegistry;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    async fn loaded_app() -> (App, mpsc::Receiver<FeedEvent>) {
        let (tx, mut rx) = mpsc::channel(16);
        let feed = FeedController::new(
            FeedSettings {
                page_size: 4,
                initial_delay: Duration::ZERO,
            },
            Arc::new(StaticSource::new(crate::sample::sample_posts())),
            Arc::new(SequentialIds::default()),
            ViewportSentinel::default(),
            tx,
        );
        let mut app = App::new(feed, KeybindingRegistry::new());
        app.feed.mount();
        while app.feed.visible().is_empty() {
            let event = rx.recv().await.unwrap();
            app.feed.handle_event(event);
        }
        (app, rx)
    }

    fn press(app: &mut App, c: char) -> Action {
        handle_input(app, KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_quit() {
        let (mut app, _rx) = loaded_app().await;
        assert!(matches!(press(&mut app, 'q'), Action::Quit));
    }

    #[tokio::test]
    async fn test_like_toggles_selected_post() {
        let (mut app, _rx) = loaded_app().await;
        app.selected = 1;
        let before = app.feed.visible()[1].likes;
        press(&mut app, 'l');
        assert!(app.feed.visible()[1].is_liked);
        assert_eq!(app.feed.visible()[1].likes, before + 1);
        assert!(!app.feed.visible()[0].is_liked);
    }

    #[tokio::test]
    async fn test_bookmark_sets_status() {
        let (mut app, _rx) = loaded_app().await;
        press(&mut app, 'b');
        assert!(app.feed.visible()[0].is_bookmarked);
        assert_eq!(
            app.status_message.as_ref().map(|(m, _)| m.as_str()),
            Some("Bookmarked")
        );
    }

    #[tokio::test]
    async fn test_shifted_g_jumps_to_bottom() {
        let (mut app, _rx) = loaded_app().await;
        handle_input(&mut app, KeyCode::Char('G'), KeyModifiers::SHIFT);
        assert_eq!(app.selected, 3);
    }

    #[tokio::test]
    async fn test_retry_key_only_active_on_error_screen() {
        let (mut app, _rx) = loaded_app().await;
        let page = app.feed.current_page();
        press(&mut app, 'r');
        assert_eq!(app.feed.current_page(), page);
        assert_eq!(app.feed.visible().len(), 4);
    }

    #[tokio::test]
    async fn test_help_overlay_captures_keys() {
        let (mut app, _rx) = loaded_app().await;
        handle_input(&mut app, KeyCode::Char('?'), KeyModifiers::SHIFT);
        assert!(app.show_help);

        // 'q' closes the overlay instead of quitting.
        assert!(matches!(press(&mut app, 'q'), Action::Continue));
        assert!(!app.show_help);
    }
}
