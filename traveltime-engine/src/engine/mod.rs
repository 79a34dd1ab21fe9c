//! Request orchestration.
//!
//! The [`Engine`] runs an [`Endpoint`] request end to end: it slices the
//! searches into batches, waits on the usage guard, sends each batch
//! through the response cache, and correlates the merged results. Batches
//! run strictly one after another; a failure in any of them fails the
//! whole run and nothing from earlier batches is returned.

mod batch;
mod config;
mod correlate;
mod endpoint;
mod error;
mod guard;
mod payload;

use std::num::NonZeroUsize;
use std::sync::Arc;

use reqwest::Url;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ResultsResponse, decode_response};
use crate::cache::CachedApiClient;
use crate::credentials::CredentialSource;
use crate::settings::{Settings, SettingsStore};

pub use batch::{Batch, batches, slice_count};
pub use config::{DEFAULT_BATCH_SIZE, EngineConfig, GuardConfig};
pub use correlate::{
    CorrelatedResults, Isochrone, ReachedLocation, ResultCorrelator, UnreachableLocation,
};
pub use endpoint::{Endpoint, TimeFilterOutput, TimeFilterRequest, TimeMapOutput, TimeMapRequest};
pub use error::{EngineError, FailureKind};
pub use guard::{Quota, RateLimitGuard, evaluate};
pub use payload::{
    INTERSECTION_ID, UNION_ID, aggregation, time_filter_payload, time_map_payload, wire_search,
};

/// The request-orchestration engine.
pub struct Engine {
    client: CachedApiClient,
    settings: Arc<dyn SettingsStore>,
    credentials: Arc<dyn CredentialSource>,
    batch_size: NonZeroUsize,
    guard: RateLimitGuard,
}

impl Engine {
    /// Create an engine with its own HTTP client and response cache.
    pub fn new(
        config: EngineConfig,
        settings: Arc<dyn SettingsStore>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let batch_size = NonZeroUsize::new(config.batch_size).ok_or_else(|| {
            EngineError::InvalidConfig {
                message: "batch size must be at least 1".to_string(),
            }
        })?;

        let client = ApiClient::new(config.client)?;

        Ok(Self {
            client: CachedApiClient::new(client, &config.cache),
            settings,
            credentials,
            batch_size,
            guard: RateLimitGuard::new(config.guard),
        })
    }

    /// The settings store this engine reads and counts into.
    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    /// The cached client, for cache statistics and invalidation.
    pub fn cache(&self) -> &CachedApiClient {
        &self.client
    }

    /// Compute isochrones.
    pub async fn time_map(&self, request: &TimeMapRequest) -> Result<TimeMapOutput, EngineError> {
        self.run(request, &CancellationToken::new()).await
    }

    /// Filter locations by reachability.
    pub async fn time_filter(
        &self,
        request: &TimeFilterRequest,
    ) -> Result<TimeFilterOutput, EngineError> {
        self.run(request, &CancellationToken::new()).await
    }

    /// Run any endpoint request, checking `cancel` before each batch and
    /// while waiting on the usage guard.
    pub async fn run<E: Endpoint>(
        &self,
        endpoint: &E,
        cancel: &CancellationToken,
    ) -> Result<E::Output, EngineError> {
        let credentials = self
            .credentials
            .credentials()
            .ok_or(EngineError::MissingCredentials)?;

        let searches = endpoint.searches();
        let count = slice_count(
            searches.departures.len(),
            searches.arrivals.len(),
            self.batch_size,
        );
        if count > 1 {
            info!(
                batches = count,
                batch_size = self.batch_size.get(),
                departures = searches.departures.len(),
                arrivals = searches.arrivals.len(),
                "request split into several batches"
            );
        }

        let mut results = Vec::new();
        for batch in batches(&searches.departures, &searches.arrivals, self.batch_size) {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            self.guard
                .wait_for_quota(self.settings.as_ref(), cancel)
                .await?;
            let settings = self.settings.get()?;

            let url = self.endpoint_url(&settings, E::PATH)?;
            let body = serde_json::to_string(&endpoint.build_payload(&batch)).map_err(|e| {
                EngineError::InvalidConfig {
                    message: format!("could not encode request: {e}"),
                }
            })?;
            let request = self
                .client
                .client()
                .prepare(url, E::ACCEPT, &credentials, body);

            if settings.disable_https {
                warn!("TLS certificate verification is disabled");
            }
            if settings.log_calls {
                info!(
                    url = %request.url,
                    headers = ?request.redacted_headers(),
                    params = ?request.url.query(),
                    data = %request.body,
                    "calling API"
                );
            }

            let response = self.client.request(&request, !settings.disable_https).await?;

            if settings.log_calls {
                info!(
                    status = response.status.as_u16(),
                    reason = response.status.canonical_reason().unwrap_or(""),
                    text = %response.body,
                    "API response"
                );
            }

            let decoded: ResultsResponse = decode_response(response.status, &response.body)?;

            if response.from_cache {
                info!(batch = batch.index, "served from cache; usage counter unchanged");
            } else {
                let used = self.settings.increment_count()?;
                debug!(batch = batch.index, count = used, "usage counter incremented");
            }

            results.extend(decoded.results);
        }

        let correlator = ResultCorrelator::new(searches, endpoint.locations());
        Ok(E::shape_output(correlator.correlate(results)?))
    }

    fn endpoint_url(&self, settings: &Settings, path: &str) -> Result<Url, EngineError> {
        let base = settings
            .endpoint_override()
            .unwrap_or_else(|| self.client.client().base_url());

        let base = if base.ends_with('/') {
            Url::parse(base)
        } else {
            Url::parse(&format!("{base}/"))
        }
        .map_err(|e| EngineError::InvalidConfig {
            message: format!("invalid endpoint {base:?}: {e}"),
        })?;

        base.join(path).map_err(|e| EngineError::InvalidConfig {
            message: format!("invalid endpoint path {path:?}: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Credentials;
    use crate::domain::{Coords, SearchDefinition, Searches, Transportation, TransportationType, TravelTime};
    use crate::settings::MemorySettings;
    use chrono::{TimeZone, Utc};

    fn engine(credentials: Option<Credentials>) -> Engine {
        Engine::new(
            EngineConfig::default(),
            Arc::new(MemorySettings::default()),
            Arc::new(credentials),
        )
        .unwrap()
    }

    fn search(id: &str) -> SearchDefinition {
        SearchDefinition::new(
            id,
            Coords::new(51.5, -0.1).unwrap(),
            Transportation::new(TransportationType::Walking),
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
            TravelTime::from_secs(600).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let result = Engine::new(
            EngineConfig::default().with_batch_size(0),
            Arc::new(MemorySettings::default()),
            Arc::new(Credentials::new("a", "b")),
        );
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn endpoint_url_joins_path() {
        let engine = engine(Credentials::new("a", "b"));
        let url = engine
            .endpoint_url(&Settings::default(), "time-map")
            .unwrap();
        assert_eq!(url.as_str(), "https://api.traveltimeapp.com/v4/time-map");
    }

    #[test]
    fn custom_endpoint_without_trailing_slash() {
        let engine = engine(Credentials::new("a", "b"));
        let settings = Settings {
            custom_endpoint: Some("http://localhost:8080/v4".into()),
            ..Settings::default()
        };
        let url = engine.endpoint_url(&settings, "time-filter").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v4/time-filter");
    }

    #[test]
    fn invalid_custom_endpoint() {
        let engine = engine(Credentials::new("a", "b"));
        let settings = Settings {
            custom_endpoint: Some("not a url".into()),
            ..Settings::default()
        };
        assert!(matches!(
            engine.endpoint_url(&settings, "time-map"),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[tokio::test]
    async fn missing_credentials_fail_first() {
        let engine = engine(None);
        let request = TimeMapRequest::new(Searches::new(vec![search("a")], vec![]));
        let err = engine.time_map(&request).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::MissingCredentials);
    }

    #[tokio::test]
    async fn empty_request_sends_nothing() {
        let engine = engine(Credentials::new("a", "b"));
        let output = engine
            .time_map(&TimeMapRequest::new(Searches::default()))
            .await
            .unwrap();
        assert_eq!(output, TimeMapOutput::default());
        assert_eq!(engine.settings().get().unwrap().current_count, 0);
    }

    #[tokio::test]
    async fn cancelled_before_first_batch() {
        let engine = engine(Credentials::new("a", "b"));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let request = TimeMapRequest::new(Searches::new(vec![search("a")], vec![]));
        let err = engine.run(&request, &cancel).await.unwrap_err();
        assert!(matches!(err, EngineError::Cancelled));
    }
}
