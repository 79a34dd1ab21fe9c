//! TravelTime API request and response DTOs.
//!
//! Request types serialize to the exact JSON the endpoints expect; the
//! optional fields are skipped rather than sent as `null` because the two
//! endpoints reference locations differently (embedded coordinates versus
//! location ids).

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Coords, Transportation, TravelTime};

/// Body of a `time-map` or `time-filter` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<WireLocation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_searches: Option<Vec<WireSearch>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_searches: Option<Vec<WireSearch>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unions: Option<Vec<AggregationDescriptor>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub intersections: Option<Vec<AggregationDescriptor>>,
}

/// A location entry of a `time-filter` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireLocation {
    pub id: String,
    pub coords: Coords,
}

/// One departure or arrival search as sent on the wire.
///
/// `time-map` searches embed `coords`; `time-filter` searches instead
/// reference their own location by id and list the counterpart ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireSearch {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub coords: Option<Coords>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_location_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_location_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_location_ids: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_location_ids: Option<Vec<String>>,

    pub transportation: Transportation,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<DateTime<Utc>>,

    pub travel_time: TravelTime,

    pub properties: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<SearchRange>,
}

/// Departure/arrival time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchRange {
    pub enabled: bool,
    pub width: u32,
}

/// A union or intersection over several searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationDescriptor {
    pub id: String,
    pub search_ids: Vec<String>,
}

/// Successful response of either endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultsResponse {
    pub results: Vec<ApiResult>,
}

/// One entry of the `results` array.
///
/// The endpoints share the array but not the entry shape, so entries are
/// told apart structurally: a `shape` means an isochrone, `locations`
/// means a filter result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ApiResult {
    Shape(ShapeResult),
    Locations(LocationsResult),
}

impl ApiResult {
    /// Id of the search (or aggregation) this result answers.
    pub fn search_id(&self) -> &str {
        match self {
            ApiResult::Shape(r) => &r.search_id,
            ApiResult::Locations(r) => &r.search_id,
        }
    }
}

/// An isochrone: the shape as WKT (we always ask for `vnd.wkt+json`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShapeResult {
    pub search_id: String,
    pub shape: String,
    #[serde(default)]
    pub properties: Value,
}

/// Filter result: reached locations and the ids that were not reached.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationsResult {
    pub search_id: String,
    pub locations: Vec<LocationResult>,
    #[serde(default)]
    pub unreachable: Vec<String>,
}

/// A reached location with its requested properties.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationResult {
    pub id: String,
    #[serde(default)]
    pub properties: Value,
}

/// Structured body of an error response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiErrorBody {
    pub error_code: ErrorCode,
    pub description: String,
    #[serde(default)]
    pub documentation_link: String,
    #[serde(default)]
    pub additional_info: BTreeMap<String, Value>,
}

/// The service documents numeric codes; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Number(i64),
    Text(String),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Number(n) => write!(f, "{n}"),
            ErrorCode::Text(s) => f.write_str(s),
        }
    }
}
