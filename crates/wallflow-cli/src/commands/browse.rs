//! `wallflow browse` and `wallflow search`.
//!
//! Both drive a [`ScrollController`] for a number of pages, then lay the
//! collected images out with [`Masonry`] and print the grid. Browsing uses
//! the configured default tag and fluid columns; searching uses the given
//! tag and the two/three column breakpoint layout.

use crate::render::render_grid;
use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use wallflow_core::LayoutConfig;
use wallflow_feed::{ImageSource, RandomSource};
use wallflow_gallery::{ColumnStrategy, FetchOutcome, Masonry, ScrollController};

/// Options shared by `browse` and `search`.
#[derive(Debug, Clone)]
pub struct GalleryOptions {
    /// `None` browses the default feed.
    pub tag: Option<String>,
    /// Pages to load before rendering; at least one.
    pub pages: u32,
    /// Container width in pixels.
    pub width: u32,
    pub strategy: ColumnStrategy,
    /// Print the grid as JSON instead of text.
    pub json: bool,
}

/// Load pages and print the laid-out grid. Returns the number of images.
pub async fn run(
    source: Arc<dyn ImageSource>,
    layout: LayoutConfig,
    rng: &RandomSource,
    options: &GalleryOptions,
    out: &mut impl Write,
) -> Result<usize> {
    let controller = match &options.tag {
        Some(tag) => ScrollController::search(source, tag.clone()),
        None => ScrollController::feed(source),
    };

    load_pages(&controller, options.pages).await;

    let images = controller.images();
    if images.is_empty() {
        tracing::warn!("No images loaded");
    }

    let masonry = Masonry::new(layout);
    let grid = rng.with(|rng| masonry.layout_for_width(&images, options.width, options.strategy, rng));

    if options.json {
        serde_json::to_writer_pretty(&mut *out, &grid)?;
        writeln!(out)?;
    } else {
        render_grid(out, &grid)?;
    }

    Ok(images.len())
}

/// Mount, then signal proximity until `pages` rounds have run. A failed
/// round ends the session early, the way a user would stop scrolling.
async fn load_pages(controller: &ScrollController, pages: u32) {
    for round in 0..pages.max(1) {
        let outcome = if round == 0 {
            controller.on_mount().await
        } else {
            controller.on_proximity().await
        };

        match outcome {
            FetchOutcome::Appended(count) => {
                tracing::info!(page = controller.page(), count, "Loaded page");
            }
            FetchOutcome::Failed => {
                tracing::warn!(page = round + 1, "Stopping after failed fetch");
                break;
            }
            FetchOutcome::Skipped | FetchOutcome::Discarded => {}
        }
    }
}
