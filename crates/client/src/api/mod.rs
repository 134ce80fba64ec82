//! Storefront REST API client.
//!
//! One shared `reqwest` client behind an `Arc`, with an explicit request
//! timeout so a dead backend fails a store instead of pinning it `Loading`.
//! Low-churn catalog reads (categories) are cached with `moka` (5-minute
//! TTL). Response envelopes are treated as an external contract: fields the
//! client depends on are validated present during conversion, never
//! defaulted silently.

mod carts;
mod categories;
mod contacts;
mod orders;
mod products;
mod users;
pub(crate) mod wire;

pub use orders::PlacedOrder;
pub use products::{PageRequest, ProductPage};
pub use users::AvatarUpload;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use phutung_core::Category;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};

use wire::Envelope;

const CATEGORY_CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Client for the storefront REST API.
///
/// Cheap to clone; all clones share the connection pool and caches.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    category_cache: Cache<String, Arc<Vec<Category>>>,
}

impl ApiClient {
    /// Create a new API client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let category_cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(CATEGORY_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.clone(),
                category_cache,
            }),
        })
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(crate) fn category_cache(&self) -> &Cache<String, Arc<Vec<Category>>> {
        &self.inner.category_cache
    }

    /// Resolve a relative path against the configured base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Decode a response body as `T`, mapping HTTP failures to [`ApiError`].
    ///
    /// The body is read as text first so parse failures can be logged with
    /// a snippet of what the server actually sent.
    pub(crate) async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        resource: &'static str,
    ) -> Result<T> {
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!(
                "{resource}: {}",
                server_message(&text).unwrap_or_else(|| "not found".to_string())
            )));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                resource,
                body = %snippet(&text),
                "API returned non-success status"
            );
            return Err(ApiError::Api(
                server_message(&text).unwrap_or_else(|| format!("HTTP {status}")),
            ));
        }

        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    resource,
                    body = %snippet(&text),
                    "Failed to parse API response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    /// Check a mutation response for success, tolerating both envelope and
    /// bare-status replies.
    pub(crate) async fn check_mutation(
        response: reqwest::Response,
        resource: &'static str,
    ) -> Result<()> {
        let envelope: Envelope<serde_json::Value> = Self::decode(response, resource).await?;
        envelope.check(resource)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Extract the `message` field from an error body, if there is one.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(String::from)
}

/// First 500 characters of a body, for log lines.
fn snippet(body: &str) -> String {
    body.chars().take(500).collect()
}
