//! `wallflow download`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use wallflow_core::Image;
use wallflow_feed::WaifuClient;

/// Save `url` into `dir` as `wallpaper-{id}.jpg`. Without an explicit id the
/// last path segment of the URL, minus its extension, is used.
pub async fn run(client: &WaifuClient, url: &str, id: Option<&str>, dir: &Path) -> Result<PathBuf> {
    let id = match id {
        Some(id) => id.to_string(),
        None => id_from_url(url).with_context(|| format!("cannot derive an image id from {url}"))?,
    };

    let image = Image {
        id,
        url: url.to_string(),
        title: String::new(),
        is_premium: false,
        is_coins: false,
    };

    client
        .download_image(&image, dir)
        .await
        .with_context(|| format!("failed to download {url}"))
}

fn id_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let last = path.trim_end_matches('/').rsplit('/').next()?;
    let stem = last.split('.').next()?;
    if stem.is_empty() || stem.contains(':') {
        None
    } else {
        Some(stem.to_string())
    }
}
