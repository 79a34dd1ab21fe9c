//! Search definitions and the locations they are evaluated against.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::coords::Coords;
use super::error::DomainError;
use super::transportation::Transportation;

/// Which end of the journey a search fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSide {
    /// Journeys leave the search point at the given time.
    Departure,
    /// Journeys reach the search point by the given time.
    Arrival,
}

impl SearchSide {
    /// Lowercase name, as used in payload keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSide::Departure => "departure",
            SearchSide::Arrival => "arrival",
        }
    }

    /// Id given to the search built from the record at `index` when the
    /// caller supplies none.
    pub fn default_id(&self, index: u64) -> String {
        format!("{}_searches_{index}", self.as_str())
    }
}

impl fmt::Display for SearchSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A travel-time budget in seconds, bounded by the service maximum of
/// four hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TravelTime(u32);

impl TravelTime {
    /// Longest budget the service accepts.
    pub const MAX_SECS: u32 = 4 * 60 * 60;

    /// Create a budget from seconds.
    pub fn from_secs(secs: u32) -> Result<Self, DomainError> {
        if secs > Self::MAX_SECS {
            return Err(DomainError::TravelTimeTooLong {
                secs,
                max: Self::MAX_SECS,
            });
        }
        Ok(Self(secs))
    }

    /// Create a budget from whole minutes.
    pub fn from_minutes(minutes: u32) -> Result<Self, DomainError> {
        Self::from_secs(minutes.saturating_mul(60))
    }

    /// The budget in seconds.
    pub fn as_secs(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for TravelTime {
    type Error = DomainError;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        Self::from_secs(secs)
    }
}

impl From<TravelTime> for u32 {
    fn from(t: TravelTime) -> Self {
        t.0
    }
}

/// One travel-time query anchor: a point plus transportation and time.
///
/// Built once from an input record and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDefinition {
    id: String,
    coords: Coords,
    transportation: Transportation,
    time: DateTime<Utc>,
    travel_time: TravelTime,
    properties: Vec<String>,
    range_width: Option<u32>,
}

impl SearchDefinition {
    /// Create a search definition. The id must be non-empty.
    pub fn new(
        id: impl Into<String>,
        coords: Coords,
        transportation: Transportation,
        time: DateTime<Utc>,
        travel_time: TravelTime,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::EmptyId);
        }
        Ok(Self {
            id,
            coords,
            transportation,
            time,
            travel_time,
            properties: Vec::new(),
            range_width: None,
        })
    }

    /// Request extra result properties (passed through untouched).
    pub fn with_properties(mut self, properties: Vec<String>) -> Self {
        self.properties = properties;
        self
    }

    /// Search over a departure/arrival window of `width` seconds.
    pub fn with_range_width(mut self, width: u32) -> Self {
        self.range_width = Some(width);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub fn transportation(&self) -> &Transportation {
        &self.transportation
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn travel_time(&self) -> TravelTime {
        self.travel_time
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    pub fn range_width(&self) -> Option<u32> {
        self.range_width
    }
}

/// A point referenced by id from location-filtering searches.
///
/// `attributes` carries the originating record's fields so that results
/// can be re-joined onto it; they are never sent to the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRecord {
    id: String,
    coords: Coords,
    attributes: Map<String, Value>,
}

impl LocationRecord {
    /// Create a location. The id must be non-empty.
    pub fn new(id: impl Into<String>, coords: Coords) -> Result<Self, DomainError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::EmptyId);
        }
        Ok(Self {
            id,
            coords,
            attributes: Map::new(),
        })
    }

    /// Attach the source record's attributes.
    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

/// The departure-side and arrival-side searches of one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Searches {
    pub departures: Vec<SearchDefinition>,
    pub arrivals: Vec<SearchDefinition>,
}

impl Searches {
    pub fn new(departures: Vec<SearchDefinition>, arrivals: Vec<SearchDefinition>) -> Self {
        Self {
            departures,
            arrivals,
        }
    }

    /// Searches on a single side.
    pub fn one_side(side: SearchSide, searches: Vec<SearchDefinition>) -> Self {
        match side {
            SearchSide::Departure => Self::new(searches, Vec::new()),
            SearchSide::Arrival => Self::new(Vec::new(), searches),
        }
    }

    /// The searches on `side`.
    pub fn side(&self, side: SearchSide) -> &[SearchDefinition] {
        match side {
            SearchSide::Departure => &self.departures,
            SearchSide::Arrival => &self.arrivals,
        }
    }

    /// True if neither side has a search.
    pub fn is_empty(&self) -> bool {
        self.departures.is_empty() && self.arrivals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransportationType;

    fn time() -> DateTime<Utc> {
        "2024-03-15T08:00:00Z".parse().unwrap()
    }

    fn coords() -> Coords {
        Coords::new(51.5, -0.12).unwrap()
    }

    #[test]
    fn default_ids() {
        assert_eq!(SearchSide::Departure.default_id(3), "departure_searches_3");
        assert_eq!(SearchSide::Arrival.default_id(0), "arrival_searches_0");
    }

    #[test]
    fn travel_time_bounds() {
        assert_eq!(TravelTime::from_secs(0).unwrap().as_secs(), 0);
        assert_eq!(TravelTime::from_secs(14400).unwrap().as_secs(), 14400);
        assert!(TravelTime::from_secs(14401).is_err());
        assert_eq!(TravelTime::from_minutes(15).unwrap().as_secs(), 900);
        assert!(TravelTime::from_minutes(241).is_err());
        assert!(TravelTime::from_minutes(u32::MAX).is_err());
    }

    #[test]
    fn travel_time_deserialization_validates() {
        let ok: TravelTime = serde_json::from_str("900").unwrap();
        assert_eq!(ok.as_secs(), 900);
        assert!(serde_json::from_str::<TravelTime>("99999").is_err());
    }

    #[test]
    fn search_rejects_empty_id() {
        let result = SearchDefinition::new(
            "",
            coords(),
            Transportation::new(TransportationType::Walking),
            time(),
            TravelTime::from_secs(900).unwrap(),
        );
        assert_eq!(result, Err(DomainError::EmptyId));
    }

    #[test]
    fn search_builder() {
        let search = SearchDefinition::new(
            "a",
            coords(),
            Transportation::new(TransportationType::Cycling),
            time(),
            TravelTime::from_secs(600).unwrap(),
        )
        .unwrap()
        .with_properties(vec!["is_only_walking".into()])
        .with_range_width(3600);

        assert_eq!(search.id(), "a");
        assert_eq!(search.properties(), ["is_only_walking".to_string()]);
        assert_eq!(search.range_width(), Some(3600));
        assert_eq!(search.travel_time().as_secs(), 600);
    }

    #[test]
    fn location_rejects_empty_id() {
        assert!(LocationRecord::new("", coords()).is_err());
    }

    #[test]
    fn searches_by_side() {
        let search = SearchDefinition::new(
            "a",
            coords(),
            Transportation::new(TransportationType::Walking),
            time(),
            TravelTime::from_secs(900).unwrap(),
        )
        .unwrap();

        let searches = Searches::one_side(SearchSide::Arrival, vec![search]);
        assert!(searches.side(SearchSide::Departure).is_empty());
        assert_eq!(searches.side(SearchSide::Arrival).len(), 1);
        assert!(!searches.is_empty());
        assert!(Searches::default().is_empty());
    }
}
