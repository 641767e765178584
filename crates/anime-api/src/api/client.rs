//! Anime API client with a fixed timeout and catalog response caching.

use super::types::*;
use crate::cache::{CacheManager, CacheStats};
use crate::episode;
use crate::error::{ProviderError, ProviderResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::config::AnimeApiConfig;
use shared::Episode;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Source of episode data for the watch page
pub trait EpisodeProvider {
    /// Fetch one episode, including its source matrix
    fn episode(&mut self, id: &str) -> impl Future<Output = ProviderResult<Episode>> + Send;
}

/// Upstream anime API client
pub struct AnimeApiClient {
    /// HTTP client
    client: reqwest::Client,
    /// Base URL for the anime API
    base_url: String,
    /// Per-request timeout
    timeout: Duration,
    /// Catalog response cache
    cache: CacheManager,
}

impl AnimeApiClient {
    /// Create a new client
    pub fn new(
        base_url: String,
        timeout: Duration,
        user_agent: &str,
        cache: CacheManager,
    ) -> ProviderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(ProviderError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            cache,
        })
    }

    /// Create a client from the `[anime_api]` configuration section
    pub fn from_config(config: &AnimeApiConfig) -> ProviderResult<Self> {
        let cache = CacheManager::new(config.cache_ttl(), config.cache.enabled);

        Self::new(
            config.base_url.clone(),
            config.request_timeout(),
            &config.user_agent,
            cache,
        )
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Catalog cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Make a single GET request. No retries: failures go back to the caller.
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ProviderResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, query = ?query, "Making API request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            warn!(
                url = %url,
                status = %status,
                error = %error_text.chars().take(200).collect::<String>(),
                "Request failed"
            );

            return Err(ProviderError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        match serde_json::from_str::<T>(&body) {
            Ok(data) => {
                debug!(url = %url, "Request successful");
                Ok(data)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to parse response");
                Err(ProviderError::Decode {
                    url,
                    message: e.to_string(),
                })
            }
        }
    }

    fn transport_error(&self, url: &str, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            warn!(url = %url, timeout_ms = self.timeout.as_millis(), "Request timed out");
            ProviderError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            warn!(url = %url, error = %e, "Request error");
            ProviderError::Network(e)
        }
    }

    /// GET through the catalog cache
    async fn get_cached(&mut self, path: &str, query: &[(&str, String)]) -> ProviderResult<Value> {
        let key = cache_key(path, query);

        if let Some(value) = self.cache.get(&key) {
            return Ok(value);
        }

        let value: Value = self.get(path, query).await?;
        let purged = self.cache.purge_expired();
        if purged > 0 {
            debug!(purged = purged, "Dropped expired cache entries");
        }
        self.cache.set(&key, &value);
        Ok(value)
    }

    /// Fetch one episode with its sources (never cached)
    pub async fn get_episode(&self, id: &str) -> ProviderResult<Episode> {
        let id = episode::validate_id(id)?;
        info!(episode = id, "Fetching episode sources");

        let response: EpisodeResponse = self
            .get("/api/nonton", &[("url", id.to_string())])
            .await?;

        Ok(episode::reshape(id, response))
    }

    /// Home page listing
    pub async fn home(&mut self) -> ProviderResult<Value> {
        info!("Fetching home listing");
        self.get_cached("/api/home", &[]).await
    }

    /// Ongoing anime, paginated
    pub async fn ongoing(&mut self, page: u32) -> ProviderResult<Value> {
        let page = validate_page(page)?;
        info!(page = page, "Fetching ongoing anime");
        self.get_cached("/api/ongoing-anime", &[("page", page.to_string())])
            .await
    }

    /// Anime details and episode list
    pub async fn anime(&mut self, slug: &str) -> ProviderResult<Value> {
        let slug = episode::validate_id(slug.trim_matches('/'))?;
        info!(slug = slug, "Fetching anime details");
        self.get_cached(&format!("/api/anime/{}", slug), &[]).await
    }

    /// All genres
    pub async fn genres(&mut self) -> ProviderResult<Value> {
        info!("Fetching genres");
        self.get_cached("/api/genres", &[]).await
    }

    /// Anime of one genre, paginated
    pub async fn genre(&mut self, slug: &str, page: u32) -> ProviderResult<Value> {
        let slug = episode::validate_id(slug)?;
        let page = validate_page(page)?;
        info!(slug = slug, page = page, "Fetching genre listing");
        self.get_cached(&format!("/api/genres/{}", slug), &[("page", page.to_string())])
            .await
    }

    /// Weekly release schedule
    pub async fn schedule(&mut self) -> ProviderResult<Value> {
        info!("Fetching release schedule");
        self.get_cached("/api/jadwal-rilis", &[]).await
    }

    /// Seasonal listing
    pub async fn season(&mut self, query: &SeasonQuery) -> ProviderResult<Value> {
        let params = season_params(query)?;
        info!(query = ?query, "Fetching season listing");
        self.get_cached("/api/season", &params).await
    }

    /// Title search (never cached)
    pub async fn search(&self, query: &str) -> ProviderResult<Value> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ProviderError::InvalidQuery {
                message: "search query is empty".to_string(),
            });
        }

        info!(query = query, "Searching anime");
        self.get("/api/search", &[("q", query.to_string())]).await
    }
}

impl EpisodeProvider for AnimeApiClient {
    fn episode(&mut self, id: &str) -> impl Future<Output = ProviderResult<Episode>> + Send {
        self.get_episode(id)
    }
}

/// Cache key: path plus query in request order
fn cache_key(path: &str, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }

    let query = query
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}

fn validate_page(page: u32) -> ProviderResult<u32> {
    if page == 0 {
        return Err(ProviderError::InvalidQuery {
            message: "page numbers start at 1".to_string(),
        });
    }
    Ok(page)
}

fn season_params(query: &SeasonQuery) -> ProviderResult<Vec<(&'static str, String)>> {
    match query {
        SeasonQuery::Current => Ok(Vec::new()),
        SeasonQuery::List => Ok(vec![("list", "true".to_string())]),
        SeasonQuery::Specific { year, season } => {
            let season = season.trim().to_ascii_lowercase();
            if season.is_empty() || !season.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ProviderError::InvalidQuery {
                    message: format!("invalid season name: {:?}", season),
                });
            }
            Ok(vec![("year", year.to_string()), ("season", season)])
        }
    }
}
