use futures::StreamExt;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::rate_limit::RateLimiter;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RESPONSE_SIZE: usize = 1024 * 1024; // 1MB; API responses are small JSON lists

/// Mutating calls are paced to one per second with a burst of five, matching
/// what a self-hosted reader tolerates without tripping its own limits.
const REQUESTS_PER_SECOND: f64 = 1.0;
const BURST: u32 = 5;

/// Errors from the feed-reader API client.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the 30-second timeout
    #[error("Request timed out")]
    Timeout,
    /// HTTP response with an unexpected status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body was not the expected JSON shape
    #[error("Malformed API response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Response body exceeded the size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// No category with the given title exists on the server
    #[error("Category {0} not found")]
    CategoryNotFound(String),
}

/// A category as returned by `GET /v1/categories`.
#[derive(Debug, Deserialize)]
struct Category {
    id: i64,
    title: String,
}

/// Subset of the feed object the reader returns; only the ID is needed.
#[derive(Debug, Deserialize)]
struct Feed {
    id: i64,
}

#[derive(Debug, Serialize)]
struct SubscribeRequest<'a> {
    feed_url: &'a str,
    category_id: i64,
}

/// Client for a Miniflux-compatible feed-reader API.
///
/// Owns its HTTP connection pool, API key, and rate limiter. All requests
/// authenticate with the `X-Auth-Token` header and carry a 30-second
/// timeout; subscribe and delete additionally pass through the rate limiter.
#[derive(Debug)]
pub struct ReaderClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    limiter: RateLimiter,
}

impl ReaderClient {
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            limiter: RateLimiter::new(REQUESTS_PER_SECOND, BURST),
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("X-Auth-Token", self.api_key.expose_secret())
            .header("Content-Type", "application/json")
    }

    /// Resolves a category name to its ID, matching the title
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// [`ReaderError::CategoryNotFound`] if no category carries the title;
    /// network, timeout, status, and decode errors otherwise.
    pub async fn category_id(&self, name: &str) -> Result<i64, ReaderError> {
        let response = send(self.request(Method::GET, "/v1/categories")).await?;
        if response.status() != StatusCode::OK {
            return Err(ReaderError::HttpStatus(response.status().as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        let categories: Vec<Category> = serde_json::from_slice(&bytes)?;

        let wanted = name.to_lowercase();
        for category in &categories {
            if category.title.to_lowercase() == wanted {
                tracing::debug!(category = %name, id = category.id, "resolved reader category");
                return Ok(category.id);
            }
        }

        Err(ReaderError::CategoryNotFound(name.to_string()))
    }

    /// Lists the IDs of the feeds currently in a category.
    pub async fn category_feeds(&self, category_id: i64) -> Result<Vec<i64>, ReaderError> {
        let path = format!("/v1/categories/{category_id}/feeds");
        let response = send(self.request(Method::GET, &path)).await?;
        if response.status() != StatusCode::OK {
            tracing::debug!(
                status = response.status().as_u16(),
                category_id,
                "unexpected status fetching category feeds"
            );
            return Err(ReaderError::HttpStatus(response.status().as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        let feeds: Vec<Feed> = serde_json::from_slice(&bytes)?;
        let feed_ids: Vec<i64> = feeds.into_iter().map(|f| f.id).collect();

        tracing::info!(category_id, feeds = feed_ids.len(), "listed category feeds");
        Ok(feed_ids)
    }

    /// Subscribes to a feed, optionally within a category (`0` = none).
    ///
    /// Rate-limited; any status >= 400 is a failure.
    pub async fn subscribe(&self, feed_url: &str, category_id: i64) -> Result<(), ReaderError> {
        self.limiter.acquire().await;

        let body = serde_json::to_string(&SubscribeRequest {
            feed_url,
            category_id,
        })?;
        let response = send(self.request(Method::POST, "/v1/feeds").body(body)).await?;

        if response.status().as_u16() >= 400 {
            tracing::debug!(
                status = response.status().as_u16(),
                feed = %feed_url,
                "subscribe request rejected"
            );
            return Err(ReaderError::HttpStatus(response.status().as_u16()));
        }

        tracing::info!(feed = %feed_url, "subscribed to feed");
        Ok(())
    }

    /// Deletes a feed by ID. The server answers 204 No Content on success.
    ///
    /// Rate-limited.
    pub async fn delete_feed(&self, feed_id: i64) -> Result<(), ReaderError> {
        self.limiter.acquire().await;

        let path = format!("/v1/feeds/{feed_id}");
        let response = send(self.request(Method::DELETE, &path)).await?;
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            tracing::info!(feed_id, "deleted feed");
            return Ok(());
        }
        if status.as_u16() >= 400 {
            tracing::debug!(status = status.as_u16(), feed_id, "delete request rejected");
            return Err(ReaderError::HttpStatus(status.as_u16()));
        }

        Ok(())
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, ReaderError> {
    tokio::time::timeout(REQUEST_TIMEOUT, request.send())
        .await
        .map_err(|_| ReaderError::Timeout)?
        .map_err(ReaderError::Network)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ReaderError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ReaderError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ReaderError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ReaderError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
