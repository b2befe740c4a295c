//! Greedy shortest-column masonry layout.

use rand::Rng;
use serde::Serialize;
use wallflow_core::{Image, LayoutConfig};

/// How the column count is derived from the available width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnStrategy {
    /// As many `column_width + gap` slots as fit, at least one.
    Fluid,
    /// Two columns below the breakpoint, three at or above it.
    Breakpoint,
}

/// An image placed in a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedImage {
    pub image: Image,
    /// Column index, 0-based from the left.
    pub column: usize,
    /// Distance from the top of the column, gaps included.
    pub top: u32,
    /// Display height drawn for this card.
    pub height: u32,
}

/// Masonry layout engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Masonry {
    config: LayoutConfig,
}

impl Masonry {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Column count for a container `width` pixels wide.
    pub fn column_count(&self, width: u32, strategy: ColumnStrategy) -> usize {
        match strategy {
            ColumnStrategy::Fluid => {
                let slot = self.config.column_width.saturating_add(self.config.gap).max(1);
                ((width / slot) as usize).max(1)
            }
            ColumnStrategy::Breakpoint => {
                if width < self.config.breakpoint {
                    2
                } else {
                    3
                }
            }
        }
    }

    /// Distribute `images` over `columns` columns, in input order.
    ///
    /// Each image lands in the first column of least accumulated height and
    /// gets a height drawn uniformly from `[min_height, max_height)`; the
    /// column then grows by that height plus the gap. Heights are redrawn on
    /// every call, so a relayout (e.g. on resize) reshuffles the grid.
    /// A column count of zero is treated as one. Column heights saturate at
    /// `u32::MAX`.
    pub fn layout<R: Rng + ?Sized>(
        &self,
        images: &[Image],
        columns: usize,
        rng: &mut R,
    ) -> Vec<Vec<PositionedImage>> {
        let columns = columns.max(1);
        let mut heights = vec![0u32; columns];
        let mut grid: Vec<Vec<PositionedImage>> = vec![Vec::new(); columns];

        for image in images {
            let column = shortest(&heights);
            let height = rng.random_range(self.config.min_height..self.config.max_height);
            grid[column].push(PositionedImage {
                image: image.clone(),
                column,
                top: heights[column],
                height,
            });
            heights[column] = heights[column]
                .saturating_add(height)
                .saturating_add(self.config.gap);
        }

        grid
    }

    /// Lay out for a container width in one step.
    pub fn layout_for_width<R: Rng + ?Sized>(
        &self,
        images: &[Image],
        width: u32,
        strategy: ColumnStrategy,
        rng: &mut R,
    ) -> Vec<Vec<PositionedImage>> {
        self.layout(images, self.column_count(width, strategy), rng)
    }
}

/// Index of the first minimum.
fn shortest(heights: &[u32]) -> usize {
    let mut best = 0;
    for (i, h) in heights.iter().enumerate() {
        if *h < heights[best] {
            best = i;
        }
    }
    best
}
