//! Page promoter: moves one page of posts from the buffer head to the visible list.

use super::source::ItemSource;
use super::types::{FeedError, Post};
use std::collections::VecDeque;

/// Outcome of a successful promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    /// Number of posts moved to the visible list.
    pub promoted: usize,
    /// Whether the source holds posts past the promoted page.
    pub has_more: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct PagePromoter {
    page_size: usize,
}

impl PagePromoter {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Whether the buffer can feed a promotion.
    ///
    /// A full page is required unless the loader has already reached the end
    /// of the source, in which case whatever tail is buffered is promotable.
    pub fn is_ready(&self, buffered: usize, source_drained: bool) -> bool {
        buffered >= self.page_size || (source_drained && buffered > 0)
    }

    /// Promote the head of `buffer` as page `page`.
    ///
    /// The source total is read before anything moves, so a failing source
    /// leaves both lists untouched. Never moves more than one page and never
    /// runs on an empty buffer.
    pub fn promote(
        &self,
        page: u32,
        source: &dyn ItemSource,
        buffer: &mut VecDeque<Post>,
        visible: &mut Vec<Post>,
    ) -> Result<Promotion, FeedError> {
        let total = source.total()?;

        let remaining = total.saturating_sub(visible.len());
        let needed = self.page_size.min(remaining).max(1);
        if buffer.len() < needed {
            return Err(FeedError::InsufficientBuffer {
                available: buffer.len(),
                needed,
            });
        }

        let take = self.page_size.min(buffer.len());
        visible.extend(buffer.drain(..take));

        let loaded = (page as usize)
            .checked_mul(self.page_size)
            .ok_or(FeedError::PageOutOfRange {
                page,
                page_size: self.page_size,
            })?;

        Ok(Promotion {
            promoted: take,
            has_more: loaded < total,
        })
    }
}
