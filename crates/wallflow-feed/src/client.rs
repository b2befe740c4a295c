//! HTTP client for the waifu.im search API.

use crate::error::FeedError;
use crate::random::RandomSource;
use crate::source::{FlagOdds, ImageSource, SearchResponse, normalize};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wallflow_core::{FeedConfig, Image};

/// Image source backed by `GET {base_url}/search/`.
#[derive(Debug, Clone)]
pub struct WaifuClient {
    http: reqwest::Client,
    config: FeedConfig,
    rng: RandomSource,
}

impl WaifuClient {
    /// Build a client with an OS-seeded random source.
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        Self::with_rng(config, RandomSource::from_entropy())
    }

    /// Build a client that draws presentation flags from `rng`.
    pub fn with_rng(config: FeedConfig, rng: RandomSource) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("wallflow/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config, rng })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    fn search_url(&self) -> String {
        format!("{}/search/", self.config.base_url.trim_end_matches('/'))
    }

    /// Query pairs for one page. `ts` busts intermediary caches so every
    /// scroll round gets a fresh random selection.
    fn query(&self, tag: Option<&str>) -> Vec<(&'static str, String)> {
        let included = tag.unwrap_or(self.config.default_tag.as_str()).to_string();
        let mut query = vec![
            ("included_tags", included),
            ("many", "true".to_string()),
            ("amount", self.config.page_size(tag).to_string()),
        ];
        for excluded in &self.config.exclude_tags {
            query.push(("exclude_tags", excluded.clone()));
        }
        query.push(("ts", chrono::Utc::now().timestamp_millis().to_string()));
        query
    }

    /// Download `image` into `dir` as `wallpaper-{id}.jpg`.
    pub async fn download_image(&self, image: &Image, dir: &Path) -> Result<PathBuf, FeedError> {
        let response = self.http.get(&image.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: image.url.clone(),
            });
        }
        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(download_file_name(&image.id));
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "Downloaded wallpaper");
        Ok(path)
    }
}

/// `wallpaper-{id}.jpg`, with anything outside `[A-Za-z0-9_-]` in the id
/// replaced so upstream ids cannot escape the target directory.
pub fn download_file_name(id: &str) -> String {
    let safe: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("wallpaper-{safe}.jpg")
}

#[async_trait]
impl ImageSource for WaifuClient {
    async fn fetch_page(&self, tag: Option<&str>) -> Result<Vec<Image>, FeedError> {
        let url = self.search_url();
        let response = self.http.get(&url).query(&self.query(tag)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        let parsed: SearchResponse = serde_json::from_slice(&body)?;

        let odds = FlagOdds::from(&self.config);
        let fallback = self.config.fallback_title.as_str();
        let images: Vec<Image> = self.rng.with(|rng| {
            parsed
                .into_images()
                .into_iter()
                .map(|raw| normalize(raw, odds, fallback, &mut *rng))
                .collect()
        });

        tracing::debug!(tag = ?tag, count = images.len(), "Fetched image page");
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<Vec<(String, String)>>>>;

    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn search(
        State(seen): State<Seen>,
        Query(params): Query<Vec<(String, String)>>,
    ) -> Json<Value> {
        seen.lock().unwrap().push(params);
        Json(json!({
            "images": [
                {"image_id": 101, "url": "https://cdn/101.jpg", "tags": [{"name": "waifu"}]},
                {"image_id": 102, "url": "https://cdn/102.jpg"}
            ]
        }))
    }

    fn client_for(base_url: String) -> WaifuClient {
        let config = FeedConfig {
            base_url,
            ..Default::default()
        };
        WaifuClient::with_rng(config, RandomSource::seeded(3)).unwrap()
    }

    fn values<'a>(params: &'a [(String, String)], key: &str) -> Vec<&'a str> {
        params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[tokio::test]
    async fn test_feed_page_request_and_mapping() {
        let seen: Seen = Arc::default();
        let router = Router::new()
            .route("/search/", get(search))
            .with_state(seen.clone());
        let client = client_for(spawn_upstream(router).await);

        let images = client.fetch_page(None).await.unwrap();

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].id, "101");
        assert_eq!(images[0].title, "waifu");
        assert_eq!(images[1].title, "Beautiful Wallpaper");

        let requests = seen.lock().unwrap();
        let params = &requests[0];
        assert_eq!(values(params, "included_tags"), vec!["waifu"]);
        assert_eq!(values(params, "amount"), vec!["10"]);
        assert_eq!(values(params, "many"), vec!["true"]);
        assert_eq!(values(params, "exclude_tags"), vec!["nsfw"]);
        assert_eq!(values(params, "ts").len(), 1);
    }

    #[tokio::test]
    async fn test_search_uses_tag_and_larger_page() {
        let seen: Seen = Arc::default();
        let router = Router::new()
            .route("/search/", get(search))
            .with_state(seen.clone());
        let client = client_for(spawn_upstream(router).await);

        client.fetch_page(Some("maid")).await.unwrap();

        let requests = seen.lock().unwrap();
        assert_eq!(values(&requests[0], "included_tags"), vec!["maid"]);
        assert_eq!(values(&requests[0], "amount"), vec!["20"]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let router = Router::new().route(
            "/search/",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let client = client_for(spawn_upstream(router).await);

        let err = client.fetch_page(None).await.unwrap_err();
        assert!(matches!(err, FeedError::Status { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_garbage_body_is_decode_error() {
        let router = Router::new().route("/search/", get(|| async { "<html>oops</html>" }));
        let client = client_for(spawn_upstream(router).await);

        let err = client.fetch_page(None).await.unwrap_err();
        assert!(matches!(err, FeedError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_request_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{addr}"));
        let err = client.fetch_page(None).await.unwrap_err();
        assert!(matches!(err, FeedError::Request(_)));
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let router = Router::new().route("/img/7.jpg", get(|| async { "JPEGDATA" }));
        let base = spawn_upstream(router).await;
        let client = client_for(base.clone());
        let dir = tempfile::tempdir().unwrap();

        let image = Image {
            id: "7".to_string(),
            url: format!("{base}/img/7.jpg"),
            title: "t".to_string(),
            is_premium: false,
            is_coins: false,
        };
        let path = client.download_image(&image, dir.path()).await.unwrap();

        assert_eq!(path, dir.path().join("wallpaper-7.jpg"));
        assert_eq!(std::fs::read(&path).unwrap(), b"JPEGDATA");
    }

    #[test]
    fn test_download_file_name_is_sanitized() {
        assert_eq!(download_file_name("abc-1_2"), "wallpaper-abc-1_2.jpg");
        assert_eq!(download_file_name("../etc/passwd"), "wallpaper-___etc_passwd.jpg");
    }
}
