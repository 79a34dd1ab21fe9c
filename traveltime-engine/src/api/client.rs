//! TravelTime HTTP client.
//!
//! Builds authenticated POST requests and sends them. Nothing here retries,
//! caches or counts; those concerns sit in the layers above.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use tracing::debug;

use crate::credentials::Credentials;

use super::error::{RequestError, classify_transport};

/// Production endpoint root. Endpoint paths are joined onto it.
pub const DEFAULT_BASE_URL: &str = "https://api.traveltimeapp.com/v4/";

pub(crate) const APP_ID_HEADER: &str = "x-application-id";
pub(crate) const API_KEY_HEADER: &str = "x-api-key";

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint root, used unless the settings carry a custom endpoint
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sent as `User-Agent`; not part of the cache fingerprint
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("traveltime-engine/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// A fully built request, ready to send or fingerprint.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: String,
}

impl PreparedRequest {
    /// Headers with the credential values replaced, for logging.
    pub fn redacted_headers(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|(name, value)| {
                let shown = if name == APP_ID_HEADER || name == API_KEY_HEADER {
                    "*hidden*".to_string()
                } else {
                    value.to_str().unwrap_or("<binary>").to_string()
                };
                (name.to_string(), shown)
            })
            .collect()
    }
}

/// Status and body of a response, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// TravelTime API client.
///
/// Holds two `reqwest` clients so that certificate verification can be
/// switched per request from the settings without rebuilding anything.
#[derive(Debug, Clone)]
pub struct ApiClient {
    verified: reqwest::Client,
    unverified: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let verified = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(timeout)
            .build()?;

        let unverified = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            verified,
            unverified,
            base_url: config.base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a JSON POST request with the credential headers attached.
    pub fn prepare(
        &self,
        url: Url,
        accept: &'static str,
        credentials: &Credentials,
        body: String,
    ) -> PreparedRequest {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        headers.insert(
            HeaderName::from_static(APP_ID_HEADER),
            credentials.app_id().clone(),
        );
        headers.insert(
            HeaderName::from_static(API_KEY_HEADER),
            credentials.api_key().clone(),
        );

        PreparedRequest {
            method: Method::POST,
            url,
            headers,
            body,
        }
    }

    /// Send a prepared request and read the whole body.
    pub async fn send(
        &self,
        request: &PreparedRequest,
        verify_tls: bool,
    ) -> Result<RawResponse, RequestError> {
        let http = if verify_tls {
            &self.verified
        } else {
            &self.unverified
        };

        debug!(url = %request.url, bytes = request.body.len(), "sending request");

        let response = http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .body(request.body.clone())
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport)?;

        debug!(status = status.as_u16(), bytes = body.len(), "received response");

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("my-app", "my-key").unwrap()
    }

    #[test]
    fn default_config_targets_production() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.traveltimeapp.com/v4/");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("traveltime-engine/"));
    }

    #[test]
    fn prepare_sets_json_and_credential_headers() {
        let client = ApiClient::new(ClientConfig::default()).unwrap();
        let url = Url::parse("https://example.test/v4/time-map").unwrap();
        let request = client.prepare(url, "application/vnd.wkt+json", &creds(), "{}".into());

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers[ACCEPT], "application/vnd.wkt+json");
        assert_eq!(request.headers[APP_ID_HEADER], "my-app");
        assert_eq!(request.headers[API_KEY_HEADER], "my-key");
    }

    #[test]
    fn redacted_headers_hide_credentials() {
        let client = ApiClient::new(ClientConfig::default()).unwrap();
        let url = Url::parse("https://example.test/v4/time-filter").unwrap();
        let request = client.prepare(url, "application/json", &creds(), "{}".into());

        let headers = request.redacted_headers();
        let rendered = format!("{headers:?}");
        assert!(!rendered.contains("my-app"));
        assert!(!rendered.contains("my-key"));
        assert!(
            headers
                .iter()
                .any(|(k, v)| k == "x-api-key" && v == "*hidden*")
        );
        assert!(
            headers
                .iter()
                .any(|(k, v)| k == "accept" && v == "application/json")
        );
    }
}
