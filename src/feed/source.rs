//! Item sources: finite, ordered, read-only post collections.

use super::types::{Post, SourceError};
use std::ops::Range;
use std::sync::Arc;

/// A finite, ordered sequence of posts the feed pages through.
///
/// Implementations must be cheap to share across tasks; the buffer loader
/// slices the source from a background task.
pub trait ItemSource: Send + Sync {
    /// Total number of posts in the source.
    fn total(&self) -> Result<usize, SourceError>;

    /// Posts in `range`, clamped to the end of the source.
    ///
    /// Returns fewer posts than the range spans (possibly none) when the range
    /// runs past the end.
    fn slice(&self, range: Range<usize>) -> Result<Vec<Post>, SourceError>;
}

/// Largest number of posts [`StaticSource::repeated`] will build.
pub const MAX_REPEATED_POSTS: usize = 1_000_000;

/// In-memory source backed by a shared slice.
#[derive(Debug, Clone)]
pub struct StaticSource {
    posts: Arc<[Post]>,
}

impl StaticSource {
    pub fn new(posts: impl Into<Arc<[Post]>>) -> Self {
        Self {
            posts: posts.into(),
        }
    }

    /// Repeat `posts` `times` times back to back.
    ///
    /// Returns `None` when the result would exceed [`MAX_REPEATED_POSTS`].
    pub fn repeated(posts: &[Post], times: usize) -> Option<Self> {
        let total = posts
            .len()
            .checked_mul(times)
            .filter(|&n| n <= MAX_REPEATED_POSTS)?;
        let all: Vec<Post> = posts.iter().cycle().take(total).cloned().collect();
        Some(Self::new(all))
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl ItemSource for StaticSource {
    fn total(&self) -> Result<usize, SourceError> {
        Ok(self.posts.len())
    }

    fn slice(&self, range: Range<usize>) -> Result<Vec<Post>, SourceError> {
        if range.start > range.end {
            return Err(SourceError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }
        let len = self.posts.len();
        let start = range.start.min(len);
        let end = range.end.min(len);
        Ok(self.posts[start..end].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::test_post;

    fn source(n: usize) -> StaticSource {
        StaticSource::new(
            (0..n)
                .map(|i| test_post(&format!("Author{i}")))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_slice_within_bounds() {
        let src = source(10);
        let posts = src.slice(2..5).unwrap();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].author, "Author2");
        assert_eq!(posts[2].author, "Author4");
    }

    #[test]
    fn test_slice_clamps_past_end() {
        let src = source(5);
        assert_eq!(src.slice(4..8).unwrap().len(), 1);
        assert!(src.slice(8..12).unwrap().is_empty());
    }

    #[test]
    fn test_inverted_range_is_error() {
        let src = source(5);
        #[allow(clippy::reversed_empty_ranges)]
        let result = src.slice(3..1);
        assert!(matches!(
            result,
            Err(SourceError::InvalidRange { start: 3, end: 1 })
        ));
    }

    #[test]
    fn test_repeated_cycles_posts() {
        let src = StaticSource::repeated(&[test_post("A"), test_post("B")], 3).unwrap();
        assert_eq!(src.total().unwrap(), 6);
        let authors: Vec<_> = src
            .slice(0..6)
            .unwrap()
            .into_iter()
            .map(|p| p.author)
            .collect();
        assert_eq!(authors, ["A", "B", "A", "B", "A", "B"]);
    }

    #[test]
    fn test_repeated_rejects_oversized_result() {
        let posts = [test_post("A"), test_post("B")];
        assert!(StaticSource::repeated(&posts, usize::MAX).is_none());
        assert!(StaticSource::repeated(&posts, MAX_REPEATED_POSTS).is_none());
        // Nothing to repeat never overflows.
        assert!(StaticSource::repeated(&[], usize::MAX).unwrap().is_empty());
    }

    #[test]
    fn test_empty_source() {
        let src = StaticSource::new(Vec::<Post>::new());
        assert!(src.is_empty());
        assert_eq!(src.total().unwrap(), 0);
        assert!(src.slice(0..4).unwrap().is_empty());
    }
}
