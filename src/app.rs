use crate::feed::{FeedController, PostId, Viewport, ViewportSentinel};
use crate::keybindings::KeybindingRegistry;
use std::time::Duration;
use tokio::time::Instant;

/// Logical units per terminal row when reporting geometry to the sentinel.
///
/// Sentinel margins are expressed in logical pixels; a row is treated as 16 of them.
pub const ROW_UNITS: u32 = 16;

/// How long a status message stays in the status bar.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Row span of one rendered post card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardSpan {
    pub top: usize,
    pub height: usize,
}

/// Geometry of the last rendered feed frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedLayout {
    pub cards: Vec<CardSpan>,
    /// Rows taken by cards (and their separators).
    pub content_rows: usize,
    /// Rows of the footer below the cards, where the sentinel lives.
    pub footer_rows: usize,
    /// Rows available to the feed pane.
    pub viewport_rows: usize,
}

impl FeedLayout {
    pub fn total_rows(&self) -> usize {
        self.content_rows + self.footer_rows
    }

    pub fn max_scroll(&self) -> usize {
        self.total_rows().saturating_sub(self.viewport_rows)
    }
}

/// UI-side application state wrapped around the feed controller.
pub struct App {
    pub feed: FeedController<ViewportSentinel>,
    pub keybindings: KeybindingRegistry,
    /// Index of the selected post in the visible list.
    pub selected: usize,
    /// First visible row of the feed pane.
    pub scroll: usize,
    pub layout: FeedLayout,
    pub show_help: bool,
    pub help_scroll_offset: usize,
    pub needs_redraw: bool,
    pub spinner_frame: usize,
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(feed: FeedController<ViewportSentinel>, keybindings: KeybindingRegistry) -> Self {
        Self {
            feed,
            keybindings,
            selected: 0,
            scroll: 0,
            layout: FeedLayout::default(),
            show_help: false,
            help_scroll_offset: 0,
            needs_redraw: true,
            spinner_frame: 0,
            status_message: None,
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Drop an expired status message. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        match &self.status_message {
            Some((_, at)) if at.elapsed() >= STATUS_TTL => {
                self.status_message = None;
                true
            }
            _ => false,
        }
    }

    pub fn selected_post_id(&self) -> Option<PostId> {
        self.feed.visible().get(self.selected).map(|p| p.id.clone())
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub fn nav_down(&mut self) {
        let count = self.feed.visible().len();
        if self.selected + 1 < count {
            self.selected += 1;
            self.scroll_to_selected();
        } else {
            // At the last post: keep scrolling so the footer (and sentinel) come into view.
            self.scroll_by(1);
        }
    }

    pub fn nav_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_to_selected();
        } else {
            self.scroll = 0;
        }
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.half_page() as isize);
        self.select_first_in_view();
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-(self.half_page() as isize));
        self.select_first_in_view();
    }

    pub fn jump_top(&mut self) {
        self.selected = 0;
        self.scroll = 0;
    }

    pub fn jump_bottom(&mut self) {
        self.selected = self.feed.visible().len().saturating_sub(1);
        self.scroll = self.layout.max_scroll();
    }

    /// Forget selection and scroll, e.g. after the feed was reset.
    pub fn reset_view(&mut self) {
        self.selected = 0;
        self.scroll = 0;
    }

    fn half_page(&self) -> usize {
        (self.layout.viewport_rows / 2).max(1)
    }

    fn scroll_by(&mut self, delta: isize) {
        let max = self.layout.max_scroll();
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    fn scroll_to_selected(&mut self) {
        let Some(card) = self.layout.cards.get(self.selected).copied() else {
            return;
        };
        let rows = self.layout.viewport_rows.max(1);
        if card.top < self.scroll {
            self.scroll = card.top;
        } else if card.top + card.height > self.scroll + rows {
            self.scroll = (card.top + card.height).saturating_sub(rows).min(card.top);
        }
    }

    fn select_first_in_view(&mut self) {
        if let Some(idx) = self
            .layout
            .cards
            .iter()
            .position(|c| c.top + c.height > self.scroll)
        {
            self.selected = idx;
        }
    }

    /// Keep selection and scroll inside the current layout.
    pub fn clamp_view(&mut self) {
        let count = self.feed.visible().len();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
        self.scroll = self.scroll.min(self.layout.max_scroll());
    }

    /// Sentinel geometry for the last rendered frame.
    pub fn viewport(&self) -> Viewport {
        let units = |rows: usize| u32::try_from(rows).unwrap_or(u32::MAX).saturating_mul(ROW_UNITS);
        Viewport {
            scroll_offset: units(self.scroll),
            height: units(self.layout.viewport_rows),
            content_height: units(self.layout.content_rows),
            sentinel_height: units(self.layout.footer_rows),
        }
    }

    /// Report the current geometry to the feed's scroll sentinel.
    ///
    /// Frames without a feed pane (error screen, undersized terminal) are not reported.
    pub fn observe_viewport(&mut self) {
        if self.layout.viewport_rows == 0 {
            return;
        }
        let viewport = self.viewport();
        self.feed.sentinel_mut().observe(viewport);
    }
}
