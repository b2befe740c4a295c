//! # wallflow-core
//!
//! Data model and configuration shared by every Wallflow crate.
//!
//! - [`User`] and [`Favorite`] are the persisted records owned by the store.
//! - [`Image`] is the transient, per-fetch shape produced by the feed client
//!   and consumed by the masonry layout.
//! - [`WallflowConfig`] is the TOML-backed configuration tree.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;

pub use config::{
    AuthConfig, ConfigError, FeedConfig, LayoutConfig, ServerConfig, StoreBackend, StoreConfig,
    WallflowConfig,
};

/// Opaque identity of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a stored favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteId(pub u64);

impl fmt::Display for FavoriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user. The password field holds a PHC hash string and is
/// never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Input for [`User`] creation. `password` must already be hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

/// A user-owned pointer to an external image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: FavoriteId,
    pub user_id: UserId,
    pub image_url: String,
    pub title: String,
}

/// Payload for adding a favorite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFavorite {
    pub image_url: String,
    pub title: String,
}

impl NewFavorite {
    pub fn new(image_url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            title: title.into(),
        }
    }
}

/// An image as presented in the gallery.
///
/// Built fresh on every fetch. `is_premium` and `is_coins` are presentation
/// flags drawn at random per fetch and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub is_coins: bool,
}

impl From<&Favorite> for Image {
    fn from(favorite: &Favorite) -> Self {
        Self {
            id: favorite.id.to_string(),
            url: favorite.image_url.clone(),
            title: favorite.title.clone(),
            is_premium: false,
            is_coins: false,
        }
    }
}
