//! Feed pagination core.
//!
//! Turns a finite [`ItemSource`] into an incrementally revealed, infinitely
//! scrolling list:
//!
//! - [`buffer`] - single-flight loader that slices the next page into the read-ahead buffer
//! - [`promoter`] - moves one page at a time from the buffer head to the visible list
//! - [`sentinel`] - viewport-proximity detection that asks for the next page
//! - [`controller`] - the state machine tying the three together
//!
//! # Example
//!
//! ```ignore
//! let (tx, mut rx) = tokio::sync::mpsc::channel(32);
//! let mut feed = FeedController::new(
//!     FeedSettings::default(),
//!     Arc::new(StaticSource::new(sample_posts())),
//!     Arc::new(UuidGenerator),
//!     ViewportSentinel::default(),
//!     tx,
//! );
//! feed.mount();
//! while let Some(event) = rx.recv().await {
//!     feed.handle_event(event);
//! }
//! ```

pub mod buffer;
pub mod controller;
pub mod ids;
pub mod promoter;
pub mod sentinel;
pub mod source;
mod types;

pub use buffer::{load_page, page_range, BufferLoader, LoadedPage};
pub use controller::{
    FeedController, FeedEvent, FeedSettings, PaginationState, Phase, DEFAULT_INITIAL_DELAY,
    DEFAULT_PAGE_SIZE,
};
pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
pub use promoter::{PagePromoter, Promotion};
pub use sentinel::{EndSentinel, SentinelCallback, SentinelOptions, Viewport, ViewportSentinel};
pub use source::{ItemSource, StaticSource, MAX_REPEATED_POSTS};
pub use types::{Achievement, FeedError, Post, PostId, SourceError, PROMOTION_ERROR_MESSAGE};

#[cfg(test)]
pub(crate) use types::test_post;
