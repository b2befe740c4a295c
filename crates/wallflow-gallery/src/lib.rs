//! # wallflow-gallery
//!
//! The two pieces between the feed and the screen:
//!
//! - [`ScrollController`]: pages through an [`wallflow_feed::ImageSource`]
//!   as the viewport nears the end of the list, with at most one fetch in
//!   flight.
//! - [`Masonry`]: places images into columns, always filling the currently
//!   shortest one.

pub mod masonry;
pub mod scroll;

pub use masonry::{ColumnStrategy, Masonry, PositionedImage};
pub use scroll::{DEFAULT_END_THRESHOLD, FetchOutcome, Phase, ScrollController, ScrollMetrics};
