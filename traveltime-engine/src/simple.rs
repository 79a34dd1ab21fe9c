//! Simplified entry points.
//!
//! One transportation type, one time and one travel-time budget in minutes
//! for every point. Each simplified request is expanded into a full
//! [`TimeMapRequest`] or [`TimeFilterRequest`] and run on the same
//! [`Engine`], and only the output category that matters is kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    DomainError, LocationRecord, SearchDefinition, SearchSide, Searches, Transportation,
    TransportationType, TravelTime,
};
use crate::engine::{
    Engine, EngineError, Isochrone, ReachedLocation, TimeFilterRequest, TimeMapRequest,
};

/// Longest budget the simplified entry points accept.
pub const MAX_MINUTES: u32 = 240;

/// Which isochrones a simplified time-map returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Aggregation {
    /// One isochrone per point
    #[default]
    Normal,
    /// A single union of all isochrones
    Union,
    /// A single intersection of all isochrones
    Intersection,
}

impl Aggregation {
    /// The `(union, intersection)` flags of the full request.
    pub fn flags(self) -> (bool, bool) {
        match self {
            Aggregation::Normal => (false, false),
            Aggregation::Union => (true, false),
            Aggregation::Intersection => (false, true),
        }
    }
}

/// The parameters shared by both simplified requests.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleSearch {
    pub side: SearchSide,
    /// Search points; each becomes one search with the point's id
    pub points: Vec<LocationRecord>,
    pub transportation: TransportationType,
    pub time: DateTime<Utc>,
    pub travel_time_mins: u32,
}

impl SimpleSearch {
    /// Expand to full search definitions.
    ///
    /// The budget is used both as the travel time and as the walking time
    /// allowance, so walking legs are never the limiting factor.
    pub fn searches(&self) -> Result<Searches, DomainError> {
        if self.travel_time_mins > MAX_MINUTES {
            return Err(DomainError::TravelTimeTooLong {
                secs: self.travel_time_mins.saturating_mul(60),
                max: MAX_MINUTES * 60,
            });
        }
        let travel_time = TravelTime::from_minutes(self.travel_time_mins)?;
        let transportation =
            Transportation::new(self.transportation).with_walking_time(travel_time.as_secs());

        let searches = self
            .points
            .iter()
            .map(|point| {
                SearchDefinition::new(
                    point.id(),
                    point.coords(),
                    transportation.clone(),
                    self.time,
                    travel_time,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Searches::one_side(self.side, searches))
    }
}

/// Isochrones for a set of points, optionally aggregated.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleTimeMap {
    pub search: SimpleSearch,
    pub aggregation: Aggregation,
}

impl SimpleTimeMap {
    pub fn to_request(&self) -> Result<TimeMapRequest, DomainError> {
        let (union, intersection) = self.aggregation.flags();
        Ok(TimeMapRequest::new(self.search.searches()?)
            .with_union(union)
            .with_intersection(intersection))
    }
}

/// Locations reachable from (or to) a set of points.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleTimeFilter {
    pub search: SimpleSearch,
    pub locations: Vec<LocationRecord>,
}

impl SimpleTimeFilter {
    pub fn to_request(&self) -> Result<TimeFilterRequest, DomainError> {
        Ok(TimeFilterRequest::new(
            self.search.searches()?,
            self.locations.clone(),
        ))
    }
}

impl Engine {
    /// Run a simplified time-map and return the selected category.
    pub async fn time_map_simple(
        &self,
        request: &SimpleTimeMap,
    ) -> Result<Vec<Isochrone>, EngineError> {
        let output = self.time_map(&request.to_request()?).await?;
        Ok(match request.aggregation {
            Aggregation::Normal => output.searches,
            Aggregation::Union => output.unions,
            Aggregation::Intersection => output.intersections,
        })
    }

    /// Run a simplified time-filter and return the reached locations.
    pub async fn time_filter_simple(
        &self,
        request: &SimpleTimeFilter,
    ) -> Result<Vec<ReachedLocation>, EngineError> {
        let output = self.time_filter(&request.to_request()?).await?;
        Ok(output.reached)
    }
}
