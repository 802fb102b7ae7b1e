//! HTTP client for the ranking API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use super::{FetchError, HistoryPage, HistorySource};
use crate::config::ApiConfig;
use crate::models::{HistoryResponse, PlayerId, PlayerProfile};

/// Ranking API client.
pub struct ApiClient {
    client: Client,
    endpoint: Url,
}

impl ApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", config.endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(config.endpoint.clone()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("puddle-sets/0.1.0")),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// Endpoint URL with extra path segments appended.
    fn url(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.endpoint.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn player_url(&self, id: PlayerId) -> Result<Url, FetchError> {
        self.url(&["player", &id.to_string()])
    }

    pub fn history_url(
        &self,
        id: PlayerId,
        char_short: &str,
        page: HistoryPage,
    ) -> Result<Url, FetchError> {
        let (count, offset) = page.request_params();
        let mut url = self.url(&["player", &id.to_string(), char_short, "history"])?;
        url.query_pairs_mut()
            .append_pair("count", &count.to_string())
            .append_pair("offset", &offset.to_string());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        debug!("GET {}", url);

        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(FetchError::RateLimited {
                host: url.host_str().unwrap_or("unknown").to_string(),
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        // Decode from text so 64-bit ids go straight to integers.
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl HistorySource for ApiClient {
    async fn player(&self, id: PlayerId) -> Result<PlayerProfile, FetchError> {
        let url = self.player_url(id)?;
        info!("Fetching player {}", id);
        self.get_json(&url).await
    }

    async fn history(
        &self,
        id: PlayerId,
        char_short: &str,
        page: HistoryPage,
    ) -> Result<HistoryResponse, FetchError> {
        let url = self.history_url(id, char_short, page)?;
        info!("Fetching history for {} ({}) at offset {}", id, char_short, page.offset);
        self.get_json(&url).await
    }

    fn name(&self) -> &str {
        self.endpoint.host_str().unwrap_or("api")
    }
}
