//! Feed controller: owns pagination state and sequences loader, promoter and sentinel.
//!
//! # Lifecycle
//!
//! ```text
//! mount ─► Buffering ─► (buffer ready?) ─► Promoting ─► Idle ─► (sentinel) ─► Buffering ...
//!                                             │
//!                                             └─► Error ─► retry ─► Buffering
//! ```
//!
//! All mutation happens in `&mut self` methods called from the UI task.
//! Background work (buffer loads, the initial-load delay) runs in spawned
//! tasks that report back as [`FeedEvent`]s, each tagged with the session
//! generation that spawned it. `retry` bumps the generation, so anything still
//! in flight from the previous session is ignored when it lands.
//!
//! Sentinel notifications additionally carry the subscription they were
//! raised under. Every gating flag change re-subscribes, so a notification
//! raised while loading is dropped even if loading has finished by the time
//! it is handled.

use super::buffer::{BufferLoader, LoadedPage};
use super::ids::IdGenerator;
use super::promoter::PagePromoter;
use super::sentinel::EndSentinel;
use super::source::ItemSource;
use super::types::{FeedError, Post, PostId, PROMOTION_ERROR_MESSAGE};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default number of posts per page.
pub const DEFAULT_PAGE_SIZE: usize = 4;

/// Default artificial delay before the first page is shown.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(800);

/// Pagination tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    pub page_size: usize,
    pub initial_delay: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

/// Events delivered to [`FeedController::handle_event`].
#[derive(Debug)]
pub enum FeedEvent {
    /// A buffer load finished (successfully or not).
    BufferLoaded {
        generation: u64,
        page: u32,
        result: Result<LoadedPage, FeedError>,
    },
    /// The first-page delay timer fired.
    InitialDelayElapsed { generation: u64 },
    /// The scroll sentinel started intersecting the viewport.
    ApproachingEnd { generation: u64, subscription: u64 },
}

/// Controller state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing in flight.
    Idle,
    /// A buffer load is outstanding.
    Buffering,
    /// A promotion is running (possibly waiting on the initial delay).
    Promoting,
    /// A promotion failed; only `retry` leaves this state.
    Error,
}

/// Snapshot-able pagination state.
#[derive(Debug, Clone)]
pub struct PaginationState {
    pub current_page: u32,
    pub visible: Vec<Post>,
    pub buffer: VecDeque<Post>,
    pub has_more: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl PaginationState {
    fn initial() -> Self {
        Self {
            current_page: 1,
            visible: Vec::new(),
            buffer: VecDeque::new(),
            has_more: true,
            is_loading: true,
            error: None,
        }
    }
}

pub struct FeedController<S: EndSentinel> {
    settings: FeedSettings,
    source: Arc<dyn ItemSource>,
    loader: BufferLoader,
    promoter: PagePromoter,
    sentinel: S,
    event_tx: mpsc::Sender<FeedEvent>,
    state: PaginationState,
    phase: Phase,
    /// Session counter; bumped on every reset.
    generation: u64,
    /// Sentinel subscription counter; bumped on every re-subscribe.
    subscription: u64,
    /// Pending first-page delay timer.
    delay_handle: Option<JoinHandle<()>>,
    /// The loader has seen the end of the source this session.
    source_drained: bool,
    /// Page whose load failed and should be retried on the next sentinel trigger.
    failed_page: Option<u32>,
    mounted: bool,
    disposed: bool,
}

impl<S: EndSentinel> FeedController<S> {
    pub fn new(
        settings: FeedSettings,
        source: Arc<dyn ItemSource>,
        ids: Arc<dyn IdGenerator>,
        sentinel: S,
        event_tx: mpsc::Sender<FeedEvent>,
    ) -> Self {
        let page_size = settings.page_size.max(1);
        Self {
            settings: FeedSettings {
                page_size,
                ..settings
            },
            loader: BufferLoader::new(Arc::clone(&source), ids, page_size),
            promoter: PagePromoter::new(page_size),
            source,
            sentinel,
            event_tx,
            state: PaginationState::initial(),
            phase: Phase::Idle,
            generation: 0,
            subscription: 0,
            delay_handle: None,
            source_drained: false,
            failed_page: None,
            mounted: false,
            disposed: false,
        }
    }

    // ------------------------------------------------------------------------
    // View-facing accessors
    // ------------------------------------------------------------------------

    pub fn visible(&self) -> &[Post] {
        &self.state.visible
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn is_buffering(&self) -> bool {
        self.loader.is_buffering()
    }

    pub fn has_more(&self) -> bool {
        self.state.has_more
    }

    pub fn error_message(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn current_page(&self) -> u32 {
        self.state.current_page
    }

    pub fn buffered(&self) -> usize {
        self.state.buffer.len()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> FeedSettings {
        self.settings
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// The feed reached its end and has something on screen.
    pub fn is_exhausted(&self) -> bool {
        !self.state.has_more && !self.state.visible.is_empty()
    }

    /// Background work is outstanding and an event will eventually arrive.
    pub fn has_pending_work(&self) -> bool {
        self.loader.is_buffering() || self.delay_handle.is_some()
    }

    /// Registration point for the view's sentinel geometry.
    pub fn sentinel_mut(&mut self) -> &mut S {
        &mut self.sentinel
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Seed page 1 and subscribe to the sentinel. Only the first call has any effect.
    pub fn mount(&mut self) {
        if self.mounted || self.disposed {
            tracing::warn!("Feed controller already mounted or disposed, ignoring mount");
            return;
        }
        self.mounted = true;
        tracing::info!(
            page_size = self.settings.page_size,
            delay_ms = self.settings.initial_delay.as_millis() as u64,
            "Mounting feed"
        );
        self.subscribe_sentinel();
        self.load_buffer();
    }

    /// Cancel the delay timer, abort any load and release the sentinel. Idempotent.
    pub fn dispose(&mut self) {
        if let Some(handle) = self.delay_handle.take() {
            handle.abort();
        }
        self.loader.abort();
        self.sentinel.dispose();
        if !self.disposed {
            tracing::debug!(generation = self.generation, "Feed controller disposed");
        }
        self.disposed = true;
    }

    /// Reset to a fresh session and reseed page 1.
    pub fn retry(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(handle) = self.delay_handle.take() {
            handle.abort();
        }
        self.loader.abort();
        self.generation = self.generation.wrapping_add(1);
        self.state = PaginationState::initial();
        self.phase = Phase::Idle;
        self.source_drained = false;
        self.failed_page = None;
        tracing::info!(generation = self.generation, "Feed reset by retry");

        self.subscribe_sentinel();
        self.load_buffer();
    }

    // ------------------------------------------------------------------------
    // Engagement
    // ------------------------------------------------------------------------

    /// Toggle the liked flag of the visible post `id`. Returns `false` if absent.
    pub fn like(&mut self, id: &PostId) -> bool {
        match self.state.visible.iter_mut().find(|p| &p.id == id) {
            Some(post) => {
                post.toggle_like();
                tracing::debug!(post = %id, liked = post.is_liked, likes = post.likes, "Toggled like");
                true
            }
            None => false,
        }
    }

    /// Toggle the bookmarked flag of the visible post `id`. Returns `false` if absent.
    pub fn bookmark(&mut self, id: &PostId) -> bool {
        match self.state.visible.iter_mut().find(|p| &p.id == id) {
            Some(post) => {
                post.toggle_bookmark();
                tracing::debug!(post = %id, bookmarked = post.is_bookmarked, "Toggled bookmark");
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------------
    // Event handling
    // ------------------------------------------------------------------------

    pub fn handle_event(&mut self, event: FeedEvent) {
        if self.disposed {
            return;
        }
        match event {
            FeedEvent::BufferLoaded {
                generation,
                page,
                result,
            } => {
                if generation != self.generation {
                    tracing::debug!(page, generation, "Dropping buffer load from stale session");
                    return;
                }
                self.loader.finish();
                self.handle_buffer_loaded(page, result);
            }
            FeedEvent::InitialDelayElapsed { generation } => {
                if generation != self.generation {
                    return;
                }
                self.delay_handle = None;
                self.finish_promotion();
            }
            FeedEvent::ApproachingEnd {
                generation,
                subscription,
            } => {
                if generation != self.generation || subscription != self.subscription {
                    tracing::trace!(subscription, "Dropping sentinel trigger from old subscription");
                    return;
                }
                self.handle_approaching_end();
            }
        }
    }

    fn handle_buffer_loaded(&mut self, page: u32, result: Result<LoadedPage, FeedError>) {
        let loaded = match result {
            Ok(loaded) => loaded,
            Err(e) => {
                // Soft failure: buffer untouched, next sentinel trigger retries this page.
                tracing::error!(page, error = %e, "Error loading buffer");
                self.failed_page = Some(page);
                self.phase = Phase::Idle;
                if self.state.visible.is_empty() && self.state.is_loading {
                    self.set_flags(self.state.has_more, false);
                }
                return;
            }
        };

        self.failed_page = None;
        if loaded.reached_end {
            self.source_drained = true;
        }
        tracing::debug!(
            page,
            count = loaded.posts.len(),
            reached_end = loaded.reached_end,
            "Buffered posts"
        );
        self.state.buffer.extend(loaded.posts);
        self.phase = Phase::Idle;

        if self
            .promoter
            .is_ready(self.state.buffer.len(), self.source_drained)
        {
            self.start_promotion();
        } else if self.source_drained && self.state.buffer.is_empty() {
            // Nothing left to show, e.g. an empty source.
            tracing::info!(visible = self.state.visible.len(), "Source exhausted");
            self.set_flags(false, false);
        }
    }

    fn handle_approaching_end(&mut self) {
        let gated = !self.state.has_more
            || self.state.is_loading
            || self.loader.is_buffering()
            || self.phase == Phase::Error;
        if gated {
            tracing::trace!(
                has_more = self.state.has_more,
                loading = self.state.is_loading,
                buffering = self.loader.is_buffering(),
                "Sentinel trigger ignored"
            );
            return;
        }

        if let Some(page) = self.failed_page {
            tracing::debug!(page, "Retrying failed buffer load");
        } else {
            self.state.current_page += 1;
            tracing::debug!(page = self.state.current_page, "Advancing to next page");
        }
        self.load_buffer();
    }

    // ------------------------------------------------------------------------
    // Loader / promoter orchestration
    // ------------------------------------------------------------------------

    fn load_buffer(&mut self) {
        if self
            .loader
            .spawn_load(self.state.current_page, self.generation, &self.event_tx)
        {
            self.phase = Phase::Buffering;
        }
    }

    fn start_promotion(&mut self) {
        if self.phase == Phase::Promoting {
            tracing::debug!("Promotion already in flight, dropping trigger");
            return;
        }
        if let Some(handle) = self.delay_handle.take() {
            handle.abort();
        }

        self.phase = Phase::Promoting;
        self.state.error = None;
        self.set_flags(self.state.has_more, true);

        if self.state.current_page == 1 && !self.settings.initial_delay.is_zero() {
            let delay = self.settings.initial_delay;
            let generation = self.generation;
            let tx = self.event_tx.clone();
            self.delay_handle = Some(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Err(e) = tx.send(FeedEvent::InitialDelayElapsed { generation }).await {
                    tracing::warn!(error = %e, "Failed to deliver initial delay (receiver dropped)");
                }
            }));
        } else {
            self.finish_promotion();
        }
    }

    fn finish_promotion(&mut self) {
        if self.phase != Phase::Promoting {
            return;
        }
        let page = self.state.current_page;
        let result = self.promoter.promote(
            page,
            &*self.source,
            &mut self.state.buffer,
            &mut self.state.visible,
        );

        match result {
            Ok(promotion) => {
                tracing::info!(
                    page,
                    promoted = promotion.promoted,
                    visible = self.state.visible.len(),
                    has_more = promotion.has_more,
                    "Promoted page"
                );
                self.phase = Phase::Idle;
                self.set_flags(promotion.has_more, false);
            }
            Err(e) => {
                tracing::error!(page, error = %e, "Error loading posts");
                self.state.error = Some(PROMOTION_ERROR_MESSAGE.to_string());
                self.phase = Phase::Error;
                self.set_flags(self.state.has_more, false);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Sentinel subscription
    // ------------------------------------------------------------------------

    /// Update the gating flags, re-subscribing the sentinel when either changes.
    fn set_flags(&mut self, has_more: bool, is_loading: bool) {
        let changed = self.state.has_more != has_more || self.state.is_loading != is_loading;
        self.state.has_more = has_more;
        self.state.is_loading = is_loading;
        if changed && self.mounted && !self.disposed {
            self.subscribe_sentinel();
        }
    }

    fn subscribe_sentinel(&mut self) {
        self.subscription = self.subscription.wrapping_add(1);
        let tx = self.event_tx.clone();
        let generation = self.generation;
        let subscription = self.subscription;
        self.sentinel.on_approaching_end(Box::new(move || {
            let event = FeedEvent::ApproachingEnd {
                generation,
                subscription,
            };
            if let Err(e) = tx.try_send(event) {
                tracing::debug!(error = %e, "Dropped sentinel notification");
            }
        }));
    }
}

impl<S: EndSentinel> Drop for FeedController<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
