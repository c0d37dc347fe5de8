//! The subtitle catalogue client contract (§1 "out of scope", §9: "duck
//! typed client shims... narrow interfaces"). A concrete REST client is
//! provided so the downloader is exercisable end-to-end against
//! `wiremock`; the wire format of any real catalogue is not specified
//! and is not this module's concern. Rate limiting is grounded in the
//! teacher's `TmdbClient` `RateLimiter` gate
//! (`infrastructure/external/tmdb/client.rs`).

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::shared::error::CatalogueError;

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogueResult {
    pub id: String,
    pub language: String,
    pub download_ref: String,
}

#[async_trait]
pub trait CatalogueClient: Send + Sync {
    async fn search_by_fingerprint(
        &self,
        fingerprint: &str,
        file_size: u64,
        language: &str,
    ) -> Result<Vec<CatalogueResult>, CatalogueError>;

    async fn search_by_metadata(
        &self,
        catalogue_id: Option<&str>,
        title: &str,
        language: &str,
    ) -> Result<Vec<CatalogueResult>, CatalogueError>;

    /// Search with no language restriction, the last-resort fallback of
    /// §4.4 step 5b.
    async fn search_any_language(
        &self,
        fingerprint: Option<&str>,
        title: &str,
    ) -> Result<Vec<CatalogueResult>, CatalogueError>;

    async fn download(&self, result: &CatalogueResult, destination: &Path) -> Result<(), CatalogueError>;
}

struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    async fn acquire(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}

pub struct HttpCatalogueClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
}

impl HttpCatalogueClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            http: reqwest::Client::new(),
            rate_limiter: Arc::new(RateLimiter::new(Duration::from_millis(250))),
        }
    }

    async fn get_results(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<CatalogueResult>, CatalogueError> {
        self.rate_limiter.acquire().await;
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .header("Api-Key", &self.api_key)
            .send()
            .await?;

        match response.status() {
            status if status.as_u16() == 429 => Err(CatalogueError::RateLimit),
            status if status.as_u16() == 401 || status.as_u16() == 403 => {
                Err(CatalogueError::Authentication(format!("catalogue returned {status}")))
            }
            status if !status.is_success() => Err(CatalogueError::Api(format!("catalogue returned {status}"))),
            _ => {
                let results: Vec<CatalogueResult> = response.json().await?;
                Ok(results)
            }
        }
    }
}

#[async_trait]
impl CatalogueClient for HttpCatalogueClient {
    async fn search_by_fingerprint(
        &self,
        fingerprint: &str,
        file_size: u64,
        language: &str,
    ) -> Result<Vec<CatalogueResult>, CatalogueError> {
        let size = file_size.to_string();
        self.get_results(
            "/search",
            &[("moviehash", fingerprint), ("moviebytesize", &size), ("language", language)],
        )
        .await
    }

    async fn search_by_metadata(
        &self,
        catalogue_id: Option<&str>,
        title: &str,
        language: &str,
    ) -> Result<Vec<CatalogueResult>, CatalogueError> {
        let mut query = vec![("query", title), ("language", language)];
        if let Some(id) = catalogue_id {
            query.push(("imdbid", id));
        }
        self.get_results("/search", &query).await
    }

    async fn search_any_language(
        &self,
        fingerprint: Option<&str>,
        title: &str,
    ) -> Result<Vec<CatalogueResult>, CatalogueError> {
        let mut query = vec![("query", title)];
        if let Some(fp) = fingerprint {
            query.push(("moviehash", fp));
        }
        self.get_results("/search", &query).await
    }

    async fn download(&self, result: &CatalogueResult, destination: &Path) -> Result<(), CatalogueError> {
        self.rate_limiter.acquire().await;
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| CatalogueError::Api(e.to_string()))?;
        }
        let response = self
            .http
            .get(format!("{}/download/{}", self.base_url, result.download_ref))
            .header("Api-Key", &self.api_key)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(CatalogueError::Api(format!("download returned {}", response.status())));
        }
        let bytes = response.bytes().await?;
        tokio::fs::write(destination, &bytes)
            .await
            .map_err(|e| CatalogueError::Api(e.to_string()))?;
        Ok(())
    }
}
