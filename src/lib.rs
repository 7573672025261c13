//! tidefeed: an incrementally paginated social feed for the terminal.
//!
//! The pagination core lives in [`feed`] and has no terminal dependencies;
//! [`ui`] renders it with ratatui and drives it from a tokio event loop.

pub mod app;
pub mod config;
pub mod feed;
pub mod keybindings;
pub mod sample;
pub mod ui;
pub mod util;
