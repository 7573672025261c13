//! Terminal User Interface module.
//!
//! This module provides the TUI for the feed, including:
//! - Main event loop (`run`)
//! - Input handling for the feed, the error screen and the help overlay
//! - Rendering of post cards, the end-of-feed footer and the status bar
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `render` - View rendering dispatch and feed layout
//! - `post` - Post card widget
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay

mod help;
mod input;
mod loop_runner;
mod post;
mod render;
mod status;

// Re-export the public API
pub use loop_runner::{run, Action};
pub use post::card_lines;
