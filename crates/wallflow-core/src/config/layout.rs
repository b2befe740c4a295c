//! Masonry layout configuration.

use super::ConfigError;
use serde::{Deserialize, Serialize};

/// Geometry of the masonry grid, in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Target column width used to derive the column count.
    #[serde(default = "default_column_width")]
    pub column_width: u32,

    /// Gap between columns and between stacked cards.
    #[serde(default = "default_gap")]
    pub gap: u32,

    /// Smallest display height drawn for a card (inclusive).
    #[serde(default = "default_min_height")]
    pub min_height: u32,

    /// Largest display height drawn for a card (exclusive).
    #[serde(default = "default_max_height")]
    pub max_height: u32,

    /// Width below which the breakpoint layout uses two columns instead of three.
    #[serde(default = "default_breakpoint")]
    pub breakpoint: u32,
}

fn default_column_width() -> u32 {
    300
}

fn default_gap() -> u32 {
    16
}

fn default_min_height() -> u32 {
    200
}

fn default_max_height() -> u32 {
    350
}

fn default_breakpoint() -> u32 {
    768
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_width: default_column_width(),
            gap: default_gap(),
            min_height: default_min_height(),
            max_height: default_max_height(),
            breakpoint: default_breakpoint(),
        }
    }
}

impl LayoutConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.min_height >= self.max_height {
            return Err(ConfigError::Config(format!(
                "layout.min_height ({}) must be below layout.max_height ({})",
                self.min_height, self.max_height
            )));
        }
        if self.column_width == 0 {
            return Err(ConfigError::Config(
                "layout.column_width must be greater than zero".to_string(),
            ));
        }
        if self.column_width.checked_add(self.gap).is_none() {
            return Err(ConfigError::Config(format!(
                "layout.column_width ({}) plus layout.gap ({}) is out of range",
                self.column_width, self.gap
            )));
        }
        Ok(())
    }
}
