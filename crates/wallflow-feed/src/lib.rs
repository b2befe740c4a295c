//! # wallflow-feed
//!
//! Client for the upstream image search API.
//!
//! The gallery depends on the [`ImageSource`] trait; [`WaifuClient`] is the
//! HTTP implementation. Each fetched record is normalized into a
//! [`wallflow_core::Image`], with its presentation flags drawn from an
//! injectable [`RandomSource`].
//!
//! Any [`FeedError`] means "no new images this round". Callers log it and
//! carry on; nothing here is fatal.

pub mod client;
pub mod error;
pub mod random;
pub mod source;

pub use client::WaifuClient;
pub use error::FeedError;
pub use random::RandomSource;
pub use source::{FlagOdds, ImageSource, RawImage, SearchResponse, normalize};
