//! Utility functions for common operations.
//!
//! - **Text processing**: Unicode-aware width, truncation, wrapping and
//!   control-character stripping for terminal rendering
//! - **Tasks**: panic capture for spawned background work

mod task;
mod text;

pub use task::catch_task_panic;
pub use text::{display_width, strip_control_chars, truncate_to_width, wrap_to_width};
