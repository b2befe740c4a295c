//! Upstream image API configuration.

use super::ConfigError;
use serde::{Deserialize, Serialize};

/// Settings for the image feed client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the image search API (no trailing slash).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Tag requested when browsing without a search term.
    #[serde(default = "default_tag")]
    pub default_tag: String,

    /// Tags always excluded from results.
    #[serde(default = "default_exclude_tags")]
    pub exclude_tags: Vec<String>,

    /// Images per page when browsing the feed.
    #[serde(default = "default_feed_page_size")]
    pub feed_page_size: u32,

    /// Images per page when searching by tag.
    #[serde(default = "default_search_page_size")]
    pub search_page_size: u32,

    /// Request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_premium_probability")]
    pub premium_probability: f64,

    #[serde(default = "default_coins_probability")]
    pub coins_probability: f64,

    /// Title used when an upstream record carries no tags.
    #[serde(default = "default_fallback_title")]
    pub fallback_title: String,
}

fn default_base_url() -> String {
    "https://api.waifu.im".to_string()
}

fn default_tag() -> String {
    "waifu".to_string()
}

fn default_exclude_tags() -> Vec<String> {
    vec!["nsfw".to_string()]
}

fn default_feed_page_size() -> u32 {
    10
}

fn default_search_page_size() -> u32 {
    20
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_premium_probability() -> f64 {
    0.2
}

fn default_coins_probability() -> f64 {
    0.15
}

fn default_fallback_title() -> String {
    "Beautiful Wallpaper".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_tag: default_tag(),
            exclude_tags: default_exclude_tags(),
            feed_page_size: default_feed_page_size(),
            search_page_size: default_search_page_size(),
            timeout_secs: default_timeout_secs(),
            premium_probability: default_premium_probability(),
            coins_probability: default_coins_probability(),
            fallback_title: default_fallback_title(),
        }
    }
}

impl FeedConfig {
    /// Page size for a feed (`None`) or search (`Some(tag)`) request.
    pub fn page_size(&self, tag: Option<&str>) -> u32 {
        if tag.is_some() {
            self.search_page_size
        } else {
            self.feed_page_size
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (name, p) in [
            ("feed.premium_probability", self.premium_probability),
            ("feed.coins_probability", self.coins_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Config(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        if self.feed_page_size == 0 || self.search_page_size == 0 {
            return Err(ConfigError::Config(
                "feed page sizes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
