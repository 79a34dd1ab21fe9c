//! Result correlation.
//!
//! The service answers with one flat list of results per request. The
//! correlator joins that list, merged across batches, back onto what was
//! sent: isochrones are routed by search id, filter results are joined to
//! their location records by location id.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{ApiResult, LocationsResult, ShapeResult};
use crate::domain::{LocationRecord, Searches};

use super::error::EngineError;
use super::payload::{INTERSECTION_ID, UNION_ID};

/// One isochrone as returned by the service, shape in WKT.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Isochrone {
    pub search_id: String,
    pub shape: String,
    pub properties: Value,
}

/// A location reached within the travel-time budget of a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReachedLocation {
    pub location: LocationRecord,
    pub search_id: String,
    pub properties: Value,
}

/// A location that a search did not reach.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnreachableLocation {
    pub location: LocationRecord,
    pub search_id: String,
}

/// Results sorted into their output categories, in service order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorrelatedResults {
    pub searches: Vec<Isochrone>,
    pub unions: Vec<Isochrone>,
    pub intersections: Vec<Isochrone>,
    pub reached: Vec<ReachedLocation>,
    pub unreachable: Vec<UnreachableLocation>,
}

/// Joins results back onto the searches and locations of one run.
#[derive(Debug)]
pub struct ResultCorrelator<'a> {
    search_ids: HashSet<&'a str>,
    locations: HashMap<&'a str, &'a LocationRecord>,
}

impl<'a> ResultCorrelator<'a> {
    /// Index the searches and locations that were sent.
    ///
    /// If two locations share an id, the first one is used.
    pub fn new(searches: &'a Searches, locations: &'a [LocationRecord]) -> Self {
        let mut search_ids = HashSet::new();
        for search in searches.departures.iter().chain(&searches.arrivals) {
            if !search_ids.insert(search.id()) {
                warn!(id = search.id(), "duplicate search id");
            }
        }

        let mut index = HashMap::with_capacity(locations.len());
        for location in locations {
            if index.contains_key(location.id()) {
                warn!(id = location.id(), "duplicate location id; keeping the first");
                continue;
            }
            index.insert(location.id(), location);
        }

        Self {
            search_ids,
            locations: index,
        }
    }

    /// Route every result to its category.
    ///
    /// A result naming a search or location that was never sent is a
    /// defect in the service response and fails the whole run.
    pub fn correlate(&self, results: Vec<ApiResult>) -> Result<CorrelatedResults, EngineError> {
        let mut out = CorrelatedResults::default();
        for result in results {
            match result {
                ApiResult::Shape(shape) => self.route_shape(shape, &mut out)?,
                ApiResult::Locations(locations) => self.join_locations(locations, &mut out)?,
            }
        }
        debug!(
            searches = out.searches.len(),
            unions = out.unions.len(),
            intersections = out.intersections.len(),
            reached = out.reached.len(),
            unreachable = out.unreachable.len(),
            "correlated results"
        );
        Ok(out)
    }

    fn route_shape(
        &self,
        shape: ShapeResult,
        out: &mut CorrelatedResults,
    ) -> Result<(), EngineError> {
        let id = shape.search_id.as_str();
        let category = if id == UNION_ID {
            &mut out.unions
        } else if id == INTERSECTION_ID {
            &mut out.intersections
        } else if self.search_ids.contains(id) {
            &mut out.searches
        } else {
            return Err(EngineError::UnmatchedResultId {
                kind: "search",
                id: shape.search_id,
            });
        };
        category.push(Isochrone {
            search_id: shape.search_id,
            shape: shape.shape,
            properties: shape.properties,
        });
        Ok(())
    }

    fn join_locations(
        &self,
        result: LocationsResult,
        out: &mut CorrelatedResults,
    ) -> Result<(), EngineError> {
        if !self.search_ids.contains(result.search_id.as_str()) {
            return Err(EngineError::UnmatchedResultId {
                kind: "search",
                id: result.search_id,
            });
        }

        for reached in result.locations {
            let location = self.location(&reached.id)?;
            out.reached.push(ReachedLocation {
                location: location.clone(),
                search_id: result.search_id.clone(),
                properties: reached.properties,
            });
        }

        for id in result.unreachable {
            let location = self.location(&id)?;
            out.unreachable.push(UnreachableLocation {
                location: location.clone(),
                search_id: result.search_id.clone(),
            });
        }
        Ok(())
    }

    fn location(&self, id: &str) -> Result<&'a LocationRecord, EngineError> {
        self.locations
            .get(id)
            .copied()
            .ok_or_else(|| EngineError::UnmatchedResultId {
                kind: "location",
                id: id.to_string(),
            })
    }
}
