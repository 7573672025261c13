//! Scroll sentinel: detects when the bottom of the feed approaches the viewport.
//!
//! The feed controller only depends on the [`EndSentinel`] capability; the view
//! layer supplies an implementation backed by whatever geometry it has. For the
//! terminal UI that is [`ViewportSentinel`], which is fed a [`Viewport`] after
//! every frame and mimics an intersection observer: it fires its callback when
//! the sentinel region transitions into the (margin-expanded) viewport.

/// Callback invoked when the sentinel starts intersecting.
pub type SentinelCallback = Box<dyn FnMut() + Send>;

/// Capability the feed controller uses to learn that the user neared the end.
pub trait EndSentinel: Send {
    /// Replace the current subscription with `callback`.
    ///
    /// Re-subscribing resets edge detection: a sentinel that is still in
    /// view fires again for the new subscriber once fresh geometry arrives.
    fn on_approaching_end(&mut self, callback: SentinelCallback);

    /// Drop the subscription. Idempotent.
    fn dispose(&mut self);
}

/// Observer tuning, in the same logical units as [`Viewport`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentinelOptions {
    /// Distance before the viewport edge at which the sentinel already counts as visible.
    pub root_margin: u32,
    /// Fraction of the sentinel that must be inside the expanded viewport.
    pub threshold: f32,
}

impl Default for SentinelOptions {
    fn default() -> Self {
        Self {
            root_margin: 100,
            threshold: 0.1,
        }
    }
}

/// Geometry of a vertically scrolling surface whose sentinel sits right below
/// the content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub scroll_offset: u32,
    pub height: u32,
    pub content_height: u32,
    pub sentinel_height: u32,
}

impl Viewport {
    /// Fraction of the sentinel inside the viewport grown by `margin` on both edges.
    pub fn sentinel_ratio(&self, margin: u32) -> f32 {
        let root_top = i64::from(self.scroll_offset) - i64::from(margin);
        let root_bottom =
            i64::from(self.scroll_offset) + i64::from(self.height) + i64::from(margin);
        let top = i64::from(self.content_height);
        let bottom = top + i64::from(self.sentinel_height);

        if self.sentinel_height == 0 {
            // Zero-area targets count as fully visible while touching the root.
            return if top >= root_top && top <= root_bottom {
                1.0
            } else {
                0.0
            };
        }

        let overlap = (bottom.min(root_bottom) - top.max(root_top)).max(0);
        overlap as f32 / self.sentinel_height as f32
    }
}

/// [`EndSentinel`] driven by explicit viewport observations.
pub struct ViewportSentinel {
    options: SentinelOptions,
    callback: Option<SentinelCallback>,
    last_viewport: Option<Viewport>,
    intersecting: bool,
}

impl ViewportSentinel {
    pub fn new(options: SentinelOptions) -> Self {
        Self {
            options,
            callback: None,
            last_viewport: None,
            intersecting: false,
        }
    }

    pub fn options(&self) -> SentinelOptions {
        self.options
    }

    pub fn is_subscribed(&self) -> bool {
        self.callback.is_some()
    }

    /// Whether the last observed viewport had the sentinel in range.
    pub fn is_intersecting(&self) -> bool {
        self.intersecting
    }

    /// Record new geometry. Returns `true` if the callback fired.
    pub fn observe(&mut self, viewport: Viewport) -> bool {
        self.last_viewport = Some(viewport);
        self.evaluate()
    }

    fn check(&self, viewport: &Viewport) -> bool {
        let ratio = viewport.sentinel_ratio(self.options.root_margin);
        ratio > 0.0 && ratio >= self.options.threshold
    }

    fn evaluate(&mut self) -> bool {
        let Some(viewport) = self.last_viewport else {
            return false;
        };
        let now = self.check(&viewport);
        let entered = now && !self.intersecting;
        self.intersecting = now;

        match self.callback.as_mut() {
            Some(callback) if entered => {
                tracing::trace!(?viewport, "Sentinel entered viewport");
                callback();
                true
            }
            _ => false,
        }
    }
}

impl Default for ViewportSentinel {
    fn default() -> Self {
        Self::new(SentinelOptions::default())
    }
}

impl EndSentinel for ViewportSentinel {
    fn on_approaching_end(&mut self, callback: SentinelCallback) {
        // Geometry seen so far predates the state change that caused the
        // re-subscription; wait for the next frame before evaluating.
        self.callback = Some(callback);
        self.last_viewport = None;
        self.intersecting = false;
    }

    fn dispose(&mut self) {
        if self.callback.take().is_some() {
            tracing::debug!("Sentinel subscription released");
        }
        self.intersecting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_callback() -> (SentinelCallback, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let callback: SentinelCallback = Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (callback, hits)
    }

    fn viewport(scroll_offset: u32) -> Viewport {
        Viewport {
            scroll_offset,
            height: 400,
            content_height: 1000,
            sentinel_height: 20,
        }
    }

    #[test]
    fn test_ratio_far_above() {
        // Viewport [0, 400) + 100 margin reaches 500, sentinel sits at 1000.
        assert_eq!(viewport(0).sentinel_ratio(100), 0.0);
    }

    #[test]
    fn test_margin_triggers_early() {
        // Bottom edge at 905 + 100 margin = 1005: 5 of 20 rows visible.
        let ratio = viewport(505).sentinel_ratio(100);
        assert!((ratio - 0.25).abs() < f32::EPSILON);
        // Without the margin the sentinel is still out of view.
        assert_eq!(viewport(505).sentinel_ratio(0), 0.0);
    }

    #[test]
    fn test_ratio_fully_visible() {
        assert_eq!(viewport(700).sentinel_ratio(100), 1.0);
    }

    #[test]
    fn test_zero_height_sentinel_touching() {
        let vp = Viewport {
            scroll_offset: 0,
            height: 10,
            content_height: 10,
            sentinel_height: 0,
        };
        assert_eq!(vp.sentinel_ratio(0), 1.0);
        let far = Viewport {
            content_height: 50,
            ..vp
        };
        assert_eq!(far.sentinel_ratio(0), 0.0);
    }

    #[test]
    fn test_threshold_gates_small_overlap() {
        let mut sentinel = ViewportSentinel::default();
        let (callback, hits) = counting_callback();
        sentinel.on_approaching_end(callback);

        // 1 of 20 units visible: 5% < 10% threshold.
        assert!(!sentinel.observe(viewport(501)));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        // 2 of 20 units visible: exactly the threshold.
        assert!(sentinel.observe(viewport(502)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fires_once_per_crossing() {
        let mut sentinel = ViewportSentinel::default();
        let (callback, hits) = counting_callback();
        sentinel.on_approaching_end(callback);

        sentinel.observe(viewport(600));
        sentinel.observe(viewport(650));
        sentinel.observe(viewport(700));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        sentinel.observe(viewport(0));
        assert!(!sentinel.is_intersecting());
        sentinel.observe(viewport(700));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_resubscribe_fires_when_already_in_view() {
        let mut sentinel = ViewportSentinel::default();
        let (first, first_hits) = counting_callback();
        sentinel.on_approaching_end(first);
        sentinel.observe(viewport(700));
        assert_eq!(first_hits.load(Ordering::SeqCst), 1);

        let (second, second_hits) = counting_callback();
        sentinel.on_approaching_end(second);
        assert_eq!(second_hits.load(Ordering::SeqCst), 0);

        // Next frame still has the sentinel in range.
        assert!(sentinel.observe(viewport(700)));
        assert_eq!(second_hits.load(Ordering::SeqCst), 1);
        assert_eq!(first_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resubscribe_ignores_stale_geometry() {
        let mut sentinel = ViewportSentinel::default();
        let (first, _) = counting_callback();
        sentinel.on_approaching_end(first);
        sentinel.observe(viewport(700));

        let (second, hits) = counting_callback();
        sentinel.on_approaching_end(second);
        // New content pushed the sentinel out of range.
        let grown = Viewport {
            content_height: 2000,
            ..viewport(700)
        };
        assert!(!sentinel.observe(grown));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dispose_is_idempotent_and_silences() {
        let mut sentinel = ViewportSentinel::default();
        let (callback, hits) = counting_callback();
        sentinel.on_approaching_end(callback);
        sentinel.dispose();
        sentinel.dispose();
        assert!(!sentinel.is_subscribed());

        assert!(!sentinel.observe(viewport(700)));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
