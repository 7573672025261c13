use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Message shown in place of the feed when a page promotion fails.
pub const PROMOTION_ERROR_MESSAGE: &str = "Failed to load posts. Please try again.";

/// Errors raised by an [`ItemSource`](super::ItemSource).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The backing collection could not be read.
    #[error("Post source unavailable: {0}")]
    Unavailable(String),

    /// A slice was requested with `start > end`.
    #[error("Invalid post range {start}..{end}")]
    InvalidRange { start: usize, end: usize },
}

/// Errors raised while buffering or promoting pages.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The page index multiplied by the page size does not fit in `usize`.
    #[error("Page {page} is out of range for page size {page_size}")]
    PageOutOfRange { page: u32, page_size: usize },

    /// A promotion was attempted without enough buffered posts.
    #[error("Buffer holds {available} posts, promotion needs {needed}")]
    InsufficientBuffer { available: usize, needed: usize },

    /// The background buffer load panicked.
    #[error("Buffer load task panicked: {0}")]
    TaskPanicked(String),
}

// ============================================================================
// Post Identifier
// ============================================================================

/// Session-unique post identifier.
///
/// Assigned by the buffer loader every time a record is pulled from the source,
/// so the same underlying record loaded twice gets two different ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Post Record
// ============================================================================

/// Badge attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub title: String,
    pub description: String,
}

/// A single post in the feed.
///
/// Field names serialize in camelCase so datasets exported from web clients
/// load unchanged. Everything except the identity/author/content fields is
/// optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(default)]
    pub id: PostId,
    pub author: String,
    pub handle: String,
    #[serde(default)]
    pub avatar: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievement: Option<Achievement>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub reposts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earnings: Option<String>,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub is_bookmarked: bool,
}

impl Post {
    /// Flip the liked flag and move the like counter with it.
    pub fn toggle_like(&mut self) {
        if self.is_liked {
            self.likes = self.likes.saturating_sub(1);
        } else {
            self.likes = self.likes.saturating_add(1);
        }
        self.is_liked = !self.is_liked;
    }

    pub fn toggle_bookmark(&mut self) {
        self.is_bookmarked = !self.is_bookmarked;
    }

    /// Copy of this post carrying a fresh identifier.
    pub fn with_id(&self, id: PostId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}

#[cfg(test)]
pub(crate) fn test_post(author: &str) -> Post {
    Post {
        id: PostId::default(),
        author: author.to_string(),
        handle: format!("@{}", author.to_lowercase()),
        avatar: String::new(),
        content: format!("Post by {author}"),
        timestamp: "1h ago".to_string(),
        image: None,
        gallery: None,
        achievement: None,
        likes: 10,
        comments: 2,
        reposts: 1,
        earnings: None,
        is_liked: false,
        is_bookmarked: false,
    }
}
