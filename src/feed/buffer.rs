//! Buffer loader: pulls page-sized slices from the source into the read-ahead buffer.
//!
//! A load slices `[(page - 1) * P, page * P)` out of the [`ItemSource`], stamps
//! every post with a fresh id from the injected [`IdGenerator`], and reports the
//! result to the controller as a [`FeedEvent::BufferLoaded`]. At most one load
//! runs at a time; triggers that arrive while one is in flight are dropped.

use super::controller::FeedEvent;
use super::ids::IdGenerator;
use super::source::ItemSource;
use super::types::{FeedError, Post};
use crate::util::catch_task_panic;
use std::ops::Range;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Posts sliced for one page, ready to append to the buffer.
#[derive(Debug)]
pub struct LoadedPage {
    pub page: u32,
    pub posts: Vec<Post>,
    /// True when the slice came back short, i.e. the source has nothing past it.
    pub reached_end: bool,
}

/// Half-open source range covered by `page` (1-based).
pub fn page_range(page: u32, page_size: usize) -> Result<Range<usize>, FeedError> {
    let out_of_range = || FeedError::PageOutOfRange { page, page_size };
    let index = usize::try_from(page.checked_sub(1).ok_or_else(out_of_range)?)
        .map_err(|_| out_of_range())?;
    let start = index.checked_mul(page_size).ok_or_else(out_of_range)?;
    let end = start.checked_add(page_size).ok_or_else(out_of_range)?;
    Ok(start..end)
}

/// Slice one page from `source` and assign fresh ids.
///
/// Either the whole page is returned or an error; callers never see a partially
/// stamped page.
pub fn load_page(
    source: &dyn ItemSource,
    ids: &dyn IdGenerator,
    page: u32,
    page_size: usize,
) -> Result<LoadedPage, FeedError> {
    let range = page_range(page, page_size)?;
    let posts: Vec<Post> = source
        .slice(range)?
        .iter()
        .map(|post| post.with_id(ids.next_id()))
        .collect();
    let reached_end = posts.len() < page_size;
    Ok(LoadedPage {
        page,
        posts,
        reached_end,
    })
}

/// Single-flight buffer loader.
pub struct BufferLoader {
    source: Arc<dyn ItemSource>,
    ids: Arc<dyn IdGenerator>,
    page_size: usize,
    in_flight: Option<JoinHandle<()>>,
}

impl BufferLoader {
    pub fn new(source: Arc<dyn ItemSource>, ids: Arc<dyn IdGenerator>, page_size: usize) -> Self {
        Self {
            source,
            ids,
            page_size,
            in_flight: None,
        }
    }

    /// True while a spawned load has not reported back yet.
    pub fn is_buffering(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Spawn a load for `page`, tagged with the caller's session `generation`.
    ///
    /// Returns `false` without doing anything when a load is already in flight.
    pub fn spawn_load(
        &mut self,
        page: u32,
        generation: u64,
        event_tx: &mpsc::Sender<FeedEvent>,
    ) -> bool {
        if self.in_flight.is_some() {
            tracing::debug!(page, "Buffer load already in flight, dropping trigger");
            return false;
        }

        let source = Arc::clone(&self.source);
        let ids = Arc::clone(&self.ids);
        let page_size = self.page_size;
        let tx = event_tx.clone();

        tracing::debug!(page, page_size, generation, "Spawning buffer load");

        self.in_flight = Some(tokio::spawn(async move {
            let result =
                match catch_task_panic(async { load_page(&*source, &*ids, page, page_size) })
                    .await
                {
                    Ok(result) => result,
                    Err(panic_msg) => Err(FeedError::TaskPanicked(panic_msg)),
                };

            let event = FeedEvent::BufferLoaded {
                generation,
                page,
                result,
            };
            if let Err(e) = tx.send(event).await {
                tracing::warn!(page, error = %e, "Failed to deliver buffer load (receiver dropped)");
            }
        }));
        true
    }

    /// Mark the in-flight load as delivered.
    pub fn finish(&mut self) {
        self.in_flight = None;
    }

    /// Abort any in-flight load. Safe to call repeatedly.
    pub fn abort(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
            tracing::debug!("Aborted in-flight buffer load");
        }
    }
}

impl Drop for BufferLoader {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::ids::SequentialIds;
    use crate::feed::source::StaticSource;
    use crate::feed::types::{test_post, SourceError};
    use std::collections::HashSet;

    fn source(n: usize) -> Arc<StaticSource> {
        Arc::new(StaticSource::new(
            (0..n)
                .map(|i| test_post(&format!("Author{i}")))
                .collect::<Vec<_>>(),
        ))
    }

    struct PanickingSource;

    impl ItemSource for PanickingSource {
        fn total(&self) -> Result<usize, SourceError> {
            Ok(4)
        }

        fn slice(&self, _range: Range<usize>) -> Result<Vec<Post>, SourceError> {
            panic!("corrupt record");
        }
    }

    #[test]
    fn test_page_range() {
        assert_eq!(page_range(1, 4).unwrap(), 0..4);
        assert_eq!(page_range(3, 4).unwrap(), 8..12);
        assert!(matches!(
            page_range(0, 4),
            Err(FeedError::PageOutOfRange { page: 0, .. })
        ));
    }

    #[test]
    fn test_load_page_assigns_fresh_ids() {
        let src = source(6);
        let ids = SequentialIds::new("t");
        let first = load_page(&*src, &ids, 1, 4).unwrap();
        let again = load_page(&*src, &ids, 1, 4).unwrap();

        assert_eq!(first.posts.len(), 4);
        assert!(!first.reached_end);
        let all: HashSet<_> = first
            .posts
            .iter()
            .chain(again.posts.iter())
            .map(|p| p.id.clone())
            .collect();
        assert_eq!(all.len(), 8, "reloading the same records must not reuse ids");
        assert_eq!(first.posts[0].author, again.posts[0].author);
    }

    #[test]
    fn test_load_page_short_tail() {
        let src = source(6);
        let ids = SequentialIds::default();
        let page = load_page(&*src, &ids, 2, 4).unwrap();
        assert_eq!(page.posts.len(), 2);
        assert!(page.reached_end);
        assert_eq!(page.posts[0].author, "Author4");
    }

    #[test]
    fn test_load_page_exact_multiple_does_not_report_end() {
        let src = source(8);
        let ids = SequentialIds::default();
        let page = load_page(&*src, &ids, 2, 4).unwrap();
        assert_eq!(page.posts.len(), 4);
        assert!(!page.reached_end);
    }

    #[tokio::test]
    async fn test_second_trigger_while_buffering_is_dropped() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut loader = BufferLoader::new(source(8), Arc::new(SequentialIds::default()), 4);

        assert!(loader.spawn_load(1, 0, &tx));
        assert!(loader.is_buffering());
        assert!(!loader.spawn_load(2, 0, &tx));

        let Some(FeedEvent::BufferLoaded { page, result, .. }) = rx.recv().await else {
            panic!("expected a buffer load event");
        };
        assert_eq!(page, 1);
        assert_eq!(result.unwrap().posts.len(), 4);
        loader.finish();
        assert!(!loader.is_buffering());

        // Only one load ran.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_panicking_source_reports_error() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut loader =
            BufferLoader::new(Arc::new(PanickingSource), Arc::new(SequentialIds::default()), 4);

        loader.spawn_load(1, 7, &tx);
        let Some(FeedEvent::BufferLoaded {
            generation, result, ..
        }) = rx.recv().await
        else {
            panic!("expected a buffer load event");
        };
        assert_eq!(generation, 7);
        match result {
            Err(FeedError::TaskPanicked(msg)) => assert_eq!(msg, "corrupt record"),
            other => panic!("expected TaskPanicked, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_abort_clears_guard() {
        let (tx, _rx) = mpsc::channel(8);
        let mut loader = BufferLoader::new(source(4), Arc::new(SequentialIds::default()), 4);
        loader.spawn_load(1, 0, &tx);
        loader.abort();
        assert!(!loader.is_buffering());
        loader.abort();
        assert!(loader.spawn_load(1, 1, &tx));
    }
}
