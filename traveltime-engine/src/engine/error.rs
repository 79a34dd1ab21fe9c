//! Engine error types.

use crate::api::RequestError;
use crate::domain::DomainError;
use crate::settings::SettingsError;

/// The fixed set of ways a run can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    MissingCredentials,
    UsageLimitExceeded,
    ApiError,
    TransportError,
    TlsError,
    DecodeError,
    Settings,
    InvalidInput,
    Cancelled,
    Defect,
}

/// Errors that abort a run. No partial results accompany any of them.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No application id or API key is configured
    #[error(
        "no API credentials: set TRAVELTIME_APP_ID and TRAVELTIME_API_KEY \
         (free keys are available from https://traveltime.com)"
    )]
    MissingCredentials,

    /// The usage guard stayed over its threshold for every attempt
    #[error(
        "usage limit of {limit} requests reached and still in place after {attempts} checks; \
         raise the warning limit, reset the counter or disable the warning"
    )]
    UsageLimitExceeded { limit: u64, attempts: u32 },

    /// A request failed
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The settings store could not be read or written
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// An input value was rejected
    #[error("invalid input: {0}")]
    Domain(#[from] DomainError),

    /// The run was cancelled between batches
    #[error("cancelled")]
    Cancelled,

    /// The service returned a result for an id that was never sent
    #[error("result references unknown {kind} id {id:?}")]
    UnmatchedResultId { kind: &'static str, id: String },

    /// Engine or endpoint configuration is unusable
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl EngineError {
    /// Which failure kind this error reports as.
    pub fn kind(&self) -> FailureKind {
        match self {
            EngineError::MissingCredentials => FailureKind::MissingCredentials,
            EngineError::UsageLimitExceeded { .. } => FailureKind::UsageLimitExceeded,
            EngineError::Request(RequestError::Api(_)) => FailureKind::ApiError,
            EngineError::Request(RequestError::Transport(_)) => FailureKind::TransportError,
            EngineError::Request(RequestError::Tls(_)) => FailureKind::TlsError,
            EngineError::Request(RequestError::Decode { .. }) => FailureKind::DecodeError,
            EngineError::Settings(_) => FailureKind::Settings,
            EngineError::Domain(_) | EngineError::InvalidConfig { .. } => FailureKind::InvalidInput,
            EngineError::Cancelled => FailureKind::Cancelled,
            EngineError::UnmatchedResultId { .. } => FailureKind::Defect,
        }
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(e: reqwest::Error) -> Self {
        EngineError::InvalidConfig {
            message: format!("could not build HTTP client: {e}"),
        }
    }
}
