//! TravelTime HTTP API client.
//!
//! This module provides the wire types for the isochrone (`time-map`) and
//! location-filtering (`time-filter`) endpoints, the HTTP client that sends
//! authenticated requests, and the classifier that turns every failed
//! request into one of a fixed set of failure kinds.
//!
//! Key characteristics of the service:
//! - Every call is billable, so identical requests are served from the
//!   response cache (see [`crate::cache`]).
//! - Error responses carry a structured JSON body with an error code,
//!   a description and a documentation link.

pub(crate) mod client;
mod error;
mod types;

pub use client::{ApiClient, ClientConfig, DEFAULT_BASE_URL, PreparedRequest, RawResponse};
pub use error::{ApiFailure, RequestError, classify_transport, decode_response};
pub use types::{
    AggregationDescriptor, ApiErrorBody, ApiResult, ErrorCode, LocationResult, LocationsResult,
    RequestPayload, ResultsResponse, SearchRange, ShapeResult, WireLocation, WireSearch,
};
