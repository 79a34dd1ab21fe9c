//! The two endpoint variants the engine can drive.
//!
//! An [`Endpoint`] says where its requests go, how one batch becomes a
//! request body, and which result categories make up its output. The
//! engine supplies everything else.

use serde::Serialize;

use crate::api::RequestPayload;
use crate::domain::{LocationRecord, SearchDefinition, Searches};

use super::batch::Batch;
use super::correlate::{CorrelatedResults, Isochrone, ReachedLocation, UnreachableLocation};
use super::payload::{time_filter_payload, time_map_payload};

/// An endpoint of the travel-time service.
pub trait Endpoint {
    /// What a run against this endpoint produces.
    type Output;

    /// Path relative to the API root.
    const PATH: &'static str;

    /// `Accept` header value.
    const ACCEPT: &'static str;

    fn searches(&self) -> &Searches;

    /// Locations that searches refer to by id. Empty for endpoints that
    /// embed coordinates.
    fn locations(&self) -> &[LocationRecord] {
        &[]
    }

    fn build_payload(&self, batch: &Batch<'_, SearchDefinition>) -> RequestPayload;

    fn shape_output(results: CorrelatedResults) -> Self::Output;
}

/// Isochrones, optionally with their union and intersection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeMapRequest {
    pub searches: Searches,
    pub union: bool,
    pub intersection: bool,
}

impl TimeMapRequest {
    pub fn new(searches: Searches) -> Self {
        Self {
            searches,
            union: false,
            intersection: false,
        }
    }

    pub fn with_union(mut self, union: bool) -> Self {
        self.union = union;
        self
    }

    pub fn with_intersection(mut self, intersection: bool) -> Self {
        self.intersection = intersection;
        self
    }
}

/// Output of a time-map run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeMapOutput {
    pub searches: Vec<Isochrone>,
    pub unions: Vec<Isochrone>,
    pub intersections: Vec<Isochrone>,
}

impl Endpoint for TimeMapRequest {
    type Output = TimeMapOutput;

    const PATH: &'static str = "time-map";
    const ACCEPT: &'static str = "application/vnd.wkt+json";

    fn searches(&self) -> &Searches {
        &self.searches
    }

    fn build_payload(&self, batch: &Batch<'_, SearchDefinition>) -> RequestPayload {
        time_map_payload(batch, self.union, self.intersection)
    }

    fn shape_output(results: CorrelatedResults) -> TimeMapOutput {
        TimeMapOutput {
            searches: results.searches,
            unions: results.unions,
            intersections: results.intersections,
        }
    }
}

/// Which of a set of locations each search reaches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeFilterRequest {
    pub searches: Searches,
    pub locations: Vec<LocationRecord>,
}

impl TimeFilterRequest {
    pub fn new(searches: Searches, locations: Vec<LocationRecord>) -> Self {
        Self {
            searches,
            locations,
        }
    }
}

/// Output of a time-filter run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeFilterOutput {
    pub reached: Vec<ReachedLocation>,
    pub unreachable: Vec<UnreachableLocation>,
}

impl Endpoint for TimeFilterRequest {
    type Output = TimeFilterOutput;

    const PATH: &'static str = "time-filter";
    const ACCEPT: &'static str = "application/json";

    fn searches(&self) -> &Searches {
        &self.searches
    }

    fn locations(&self) -> &[LocationRecord] {
        &self.locations
    }

    fn build_payload(&self, batch: &Batch<'_, SearchDefinition>) -> RequestPayload {
        time_filter_payload(batch, &self.locations)
    }

    fn shape_output(results: CorrelatedResults) -> TimeFilterOutput {
        TimeFilterOutput {
            reached: results.reached,
            unreachable: results.unreachable,
        }
    }
}
