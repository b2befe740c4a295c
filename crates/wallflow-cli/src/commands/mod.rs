//! CLI command implementations for the wallflow terminal gallery.

pub mod browse;
pub mod download;
