//! Response cache in front of the TravelTime client.
//!
//! Entries are keyed by a fingerprint of everything that determines the
//! answer: method, URL, the content headers, the credentials and the body.
//! Only successful responses are stored, so an error is always retried
//! against the service.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;

use crate::api::client::{API_KEY_HEADER, APP_ID_HEADER};
use crate::api::{ApiClient, PreparedRequest, RequestError};

/// Request fingerprint.
type Fingerprint = [u8; 32];

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(86_400),
            max_capacity: 1000,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_capacity(mut self, n: u64) -> Self {
        self.max_capacity = n;
        self
    }
}

/// Hash the parts of a request that decide its response.
///
/// `User-Agent` is deliberately left out; it varies by build, not by query.
pub fn fingerprint(request: &PreparedRequest) -> Fingerprint {
    let header = |name: &str| {
        request
            .headers
            .get(name)
            .map(|v| v.as_bytes())
            .unwrap_or_default()
    };

    let mut hasher = blake3::Hasher::new();
    for component in [
        request.method.as_str().as_bytes(),
        request.url.as_str().as_bytes(),
        header(CONTENT_TYPE.as_str()),
        header(ACCEPT.as_str()),
        header(APP_ID_HEADER),
        header(API_KEY_HEADER),
        request.body.as_bytes(),
    ] {
        hasher.update(&(component.len() as u64).to_le_bytes());
        hasher.update(component);
    }
    *hasher.finalize().as_bytes()
}

/// A response as seen through the cache.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub body: Arc<str>,
    /// True when no network request was made
    pub from_cache: bool,
}

/// TravelTime client with caching.
///
/// Wraps an `ApiClient` and caches successful responses for the
/// configured TTL.
pub struct CachedApiClient {
    client: ApiClient,
    cache: MokaCache<Fingerprint, Arc<str>>,
}

impl CachedApiClient {
    /// Create a new cached client.
    pub fn new(client: ApiClient, config: &CacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { client, cache }
    }

    /// Send a request, answering from the cache when an identical one
    /// succeeded within the TTL.
    pub async fn request(
        &self,
        request: &PreparedRequest,
        verify_tls: bool,
    ) -> Result<CachedResponse, RequestError> {
        let key = fingerprint(request);

        if let Some(body) = self.cache.get(&key).await {
            debug!(url = %request.url, "response served from cache");
            return Ok(CachedResponse {
                status: StatusCode::OK,
                body,
                from_cache: true,
            });
        }

        let response = self.client.send(request, verify_tls).await?;
        let body: Arc<str> = Arc::from(response.body);

        if response.status.is_success() {
            self.cache.insert(key, body.clone()).await;
        }

        Ok(CachedResponse {
            status: response.status,
            body,
            from_cache: false,
        })
    }

    /// Access the underlying client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Get cache statistics.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
