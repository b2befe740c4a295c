//! Infinite scroll controller.
//!
//! A two-state machine over an [`ImageSource`]:
//!
//! ```text
//!   Idle --(mount | near end)--> Fetching --(done, ok or err)--> Idle
//! ```
//!
//! Proximity signals that arrive while `Fetching` are dropped, so a burst
//! of scroll events costs exactly one request. A failed round leaves the
//! list untouched; the next proximity signal is the retry.

use std::sync::{Arc, Mutex, MutexGuard};
use wallflow_core::Image;
use wallflow_feed::ImageSource;

/// Fraction of a viewport from the end of content that counts as "near".
pub const DEFAULT_END_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching,
}

/// What a trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page arrived; this many images were appended.
    Appended(usize),
    /// The fetch failed; the list is unchanged.
    Failed,
    /// No fetch was started: one was already in flight, or the viewport
    /// was not near the end.
    Skipped,
    /// The fetch finished after a [`ScrollController::reset`] and its
    /// result was dropped.
    Discarded,
}

/// Scroll geometry, in any consistent unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top.
    pub offset: f64,
    /// Height of the visible area.
    pub viewport: f64,
    /// Total height of the rendered content.
    pub content: f64,
}

impl ScrollMetrics {
    pub fn new(offset: f64, viewport: f64, content: f64) -> Self {
        Self {
            offset,
            viewport,
            content,
        }
    }

    /// Content left below the visible area.
    pub fn remaining(&self) -> f64 {
        (self.content - self.offset - self.viewport).max(0.0)
    }

    /// Whether the end of content is within `threshold` viewports.
    pub fn is_near_end(&self, threshold: f64) -> bool {
        self.remaining() <= self.viewport * threshold
    }
}

#[derive(Debug)]
struct State {
    phase: Phase,
    images: Vec<Image>,
    page: u32,
    tag: Option<String>,
    generation: u64,
}

/// Pages an image source into a growing list.
pub struct ScrollController {
    source: Arc<dyn ImageSource>,
    threshold: f64,
    state: Mutex<State>,
}

/// Returns the controller to `Idle` when a fetch ends, including when the
/// fetch future is dropped half way.
struct InFlight<'a> {
    state: &'a Mutex<State>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.phase = Phase::Idle;
    }
}

impl ScrollController {
    /// Browse the default feed.
    pub fn feed(source: Arc<dyn ImageSource>) -> Self {
        Self::new(source, None)
    }

    /// Page through search results for `tag`.
    pub fn search(source: Arc<dyn ImageSource>, tag: impl Into<String>) -> Self {
        Self::new(source, Some(tag.into()))
    }

    fn new(source: Arc<dyn ImageSource>, tag: Option<String>) -> Self {
        Self {
            source,
            threshold: DEFAULT_END_THRESHOLD,
            state: Mutex::new(State {
                phase: Phase::Idle,
                images: Vec::new(),
                page: 0,
                tag,
                generation: 0,
            }),
        }
    }

    /// Override how close to the end a scroll must get to trigger a fetch.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Initial load when the gallery first appears.
    pub async fn on_mount(&self) -> FetchOutcome {
        self.load_next().await
    }

    /// The last rendered item came into view.
    pub async fn on_proximity(&self) -> FetchOutcome {
        self.load_next().await
    }

    /// A scroll event; fetches only when near the end of content.
    pub async fn on_scroll(&self, metrics: ScrollMetrics) -> FetchOutcome {
        if !metrics.is_near_end(self.threshold) {
            return FetchOutcome::Skipped;
        }
        self.load_next().await
    }

    /// Drop all images and start over, optionally with a new search tag.
    ///
    /// A fetch already in flight keeps the controller busy until it ends,
    /// and its result is discarded.
    pub fn reset(&self, tag: Option<String>) {
        let mut state = self.lock();
        state.images.clear();
        state.page = 0;
        state.tag = tag;
        state.generation += 1;
    }

    async fn load_next(&self) -> FetchOutcome {
        let (generation, tag) = {
            let mut state = self.lock();
            if state.phase == Phase::Fetching {
                tracing::trace!("Fetch already in flight; ignoring signal");
                return FetchOutcome::Skipped;
            }
            state.phase = Phase::Fetching;
            (state.generation, state.tag.clone())
        };
        let _in_flight = InFlight { state: &self.state };

        let result = self.source.fetch_page(tag.as_deref()).await;

        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!("Dropping page fetched before reset");
            return FetchOutcome::Discarded;
        }
        match result {
            Ok(images) => {
                let count = images.len();
                state.images.extend(images);
                state.page += 1;
                tracing::debug!(page = state.page, count, total = state.images.len(), "Appended page");
                FetchOutcome::Appended(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Image fetch failed; waiting for next scroll");
                FetchOutcome::Failed
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Pages successfully loaded so far.
    pub fn page(&self) -> u32 {
        self.lock().page
    }

    pub fn tag(&self) -> Option<String> {
        self.lock().tag.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the rendered list.
    pub fn images(&self) -> Vec<Image> {
        self.lock().images.clone()
    }
}
