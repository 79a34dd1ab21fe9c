//! Request failure classification.
//!
//! Every failed request ends up as exactly one [`RequestError`] variant.
//! Network-layer details are logged here and kept as the error source;
//! the user-facing messages stay generic.

use std::error::Error as StdError;
use std::fmt;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use super::types::ApiErrorBody;

/// Errors from a single request to the TravelTime API.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The service answered with an error status and a structured body
    #[error("{0}")]
    Api(ApiFailure),

    /// Connection refused, timeout, DNS failure, ...
    #[error("could not connect to the API (see log for details)")]
    Transport(#[source] reqwest::Error),

    /// Certificate verification failed
    #[error(
        "could not connect to the API because of a TLS certificate error; \
         verification can be disabled in the settings (see log for details)"
    )]
    Tls(#[source] reqwest::Error),

    /// The body was not the JSON we expected
    #[error("could not decode response: {message}")]
    Decode {
        message: String,
        body: Option<String>,
    },
}

/// An HTTP error status paired with the service's error body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFailure {
    pub status: u16,
    pub body: ApiErrorBody,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "received error from the API (HTTP {})", self.status)?;
        writeln!(f, "error code: {}", self.body.error_code)?;
        writeln!(f, "description: {}", self.body.description)?;
        write!(f, "see: {}", self.body.documentation_link)?;
        if !self.body.additional_info.is_empty() {
            write!(f, "\nadditional info:")?;
            for (key, value) in &self.body.additional_info {
                match value {
                    Value::String(s) => write!(f, "\n\t{key}:\t{s}")?,
                    other => write!(f, "\n\t{key}:\t{other}")?,
                }
            }
        }
        Ok(())
    }
}

/// Classify a `reqwest` failure as TLS or generic transport.
///
/// `reqwest` does not expose certificate errors as a kind, so the causes
/// are inspected for the TLS backend's messages. The top-level error is
/// skipped because its message carries the request URL.
pub fn classify_transport(err: reqwest::Error) -> RequestError {
    if !err.is_timeout() && causes_mention_tls(err.source()) {
        error!(error = %err, source = ?err.source(), "TLS failure talking to the API");
        RequestError::Tls(err)
    } else {
        error!(error = %err, source = ?err.source(), "transport failure talking to the API");
        RequestError::Transport(err)
    }
}

fn causes_mention_tls(first: Option<&(dyn StdError + 'static)>) -> bool {
    let mut current = first;
    while let Some(e) = current {
        let message = e.to_string().to_lowercase();
        if message.contains("certificate") || message.contains("tls") || message.contains("ssl") {
            return true;
        }
        current = e.source();
    }
    false
}

/// Decode a response body, mapping error statuses to [`RequestError::Api`].
///
/// The body is parsed before the status is looked at: an error status
/// whose body is not JSON is a decode failure, not an API error.
pub fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> Result<T, RequestError> {
    let value: Value = serde_json::from_str(body).map_err(|e| decode_error(&e, body))?;

    if !status.is_success() {
        let error_body: ApiErrorBody =
            serde_json::from_value(value).map_err(|e| decode_error(&e, body))?;
        let failure = ApiFailure {
            status: status.as_u16(),
            body: error_body,
        };
        error!(status = failure.status, code = %failure.body.error_code, "API returned an error");
        return Err(RequestError::Api(failure));
    }

    serde_json::from_value(value).map_err(|e| decode_error(&e, body))
}

fn decode_error(err: &serde_json::Error, body: &str) -> RequestError {
    debug!(error = %err, "could not decode API response");
    RequestError::Decode {
        message: err.to_string(),
        body: Some(body.chars().take(500).collect()),
    }
}
