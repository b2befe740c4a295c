//! The image source seam and upstream record normalization.

use crate::error::FeedError;
use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use wallflow_core::{FeedConfig, Image};

/// Something that yields pages of gallery images.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Fetch one page. `None` browses the default feed, `Some(tag)` searches.
    async fn fetch_page(&self, tag: Option<&str>) -> Result<Vec<Image>, FeedError>;
}

/// Top-level upstream response. A body without `images` is an empty page.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub images: Option<Vec<RawImage>>,
}

impl SearchResponse {
    pub fn into_images(self) -> Vec<RawImage> {
        self.images.unwrap_or_default()
    }
}

/// One upstream record: `{image_id, url, tags: [{name}]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawImage {
    pub image_id: RawId,
    pub url: String,
    #[serde(default)]
    pub tags: Option<Vec<RawTag>>,
}

/// Upstream ids arrive as numbers or strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTag {
    #[serde(default)]
    pub name: Option<String>,
}

/// Bernoulli odds for the presentation flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlagOdds {
    pub premium: f64,
    pub coins: f64,
}

impl Default for FlagOdds {
    fn default() -> Self {
        Self {
            premium: 0.2,
            coins: 0.15,
        }
    }
}

impl From<&FeedConfig> for FlagOdds {
    fn from(config: &FeedConfig) -> Self {
        Self {
            premium: config.premium_probability,
            coins: config.coins_probability,
        }
    }
}

/// Turn an upstream record into a gallery image.
///
/// The title is the first tag's name, or `fallback_title` when there is no
/// usable tag. Premium and coins are independent draws, premium first.
pub fn normalize<R: Rng + ?Sized>(
    raw: RawImage,
    odds: FlagOdds,
    fallback_title: &str,
    rng: &mut R,
) -> Image {
    let title = raw
        .tags
        .and_then(|tags| tags.into_iter().next())
        .and_then(|tag| tag.name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback_title.to_string());

    let is_premium = rng.random_bool(odds.premium);
    let is_coins = rng.random_bool(odds.coins);

    Image {
        id: raw.image_id.into_string(),
        url: raw.url,
        title,
        is_premium,
        is_coins,
    }
}
