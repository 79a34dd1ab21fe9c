//! JSON job files for the command-line runner.
//!
//! A job names an endpoint and carries the input records plus the
//! templates that turn them into searches and locations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::domain::{SearchDefinition, SearchSide, Searches, TransportationType};
use crate::engine::{
    Engine, EngineError, Isochrone, ReachedLocation, TimeFilterOutput, TimeFilterRequest,
    TimeMapOutput, TimeMapRequest,
};
use crate::input::{InputRecord, LocationTemplate, SearchTemplate};
use crate::simple::{Aggregation, SimpleSearch, SimpleTimeFilter, SimpleTimeMap};

/// Search records and templates for both sides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchInput {
    #[serde(default)]
    pub departures: Vec<InputRecord>,
    #[serde(default)]
    pub departure_template: Option<SearchTemplate>,
    #[serde(default)]
    pub arrivals: Vec<InputRecord>,
    #[serde(default)]
    pub arrival_template: Option<SearchTemplate>,
}

impl SearchInput {
    fn side(
        side: SearchSide,
        records: &[InputRecord],
        template: Option<&SearchTemplate>,
    ) -> Result<Vec<SearchDefinition>, EngineError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let template = template.ok_or_else(|| EngineError::InvalidConfig {
            message: format!("{side} records given without a {side}_template"),
        })?;
        Ok(template.build_all(side, records)?)
    }

    pub fn searches(&self) -> Result<Searches, EngineError> {
        Ok(Searches::new(
            Self::side(
                SearchSide::Departure,
                &self.departures,
                self.departure_template.as_ref(),
            )?,
            Self::side(
                SearchSide::Arrival,
                &self.arrivals,
                self.arrival_template.as_ref(),
            )?,
        ))
    }
}

/// Points and parameters of a simplified job.
#[derive(Debug, Clone, Deserialize)]
pub struct SimpleInput {
    pub side: SearchSide,
    pub points: Vec<InputRecord>,
    /// Names the points; defaults to `<side>_searches_<index>`
    #[serde(default)]
    pub point_template: LocationTemplate,
    pub transportation: TransportationType,
    pub time: DateTime<Utc>,
    pub travel_time_mins: u32,
}

impl SimpleInput {
    fn search(&self) -> Result<SimpleSearch, EngineError> {
        Ok(SimpleSearch {
            side: self.side,
            points: self
                .point_template
                .build_all_with_default(&self.points, |index| self.side.default_id(index))?,
            transportation: self.transportation,
            time: self.time,
            travel_time_mins: self.travel_time_mins,
        })
    }
}

/// A unit of work for the runner.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "endpoint", rename_all = "snake_case")]
pub enum Job {
    TimeMap {
        #[serde(flatten)]
        input: SearchInput,
        #[serde(default)]
        union: bool,
        #[serde(default)]
        intersection: bool,
    },
    TimeFilter {
        #[serde(flatten)]
        input: SearchInput,
        locations: Vec<InputRecord>,
        #[serde(default)]
        location_template: LocationTemplate,
    },
    TimeMapSimple {
        #[serde(flatten)]
        input: SimpleInput,
        #[serde(default)]
        aggregation: Aggregation,
    },
    TimeFilterSimple {
        #[serde(flatten)]
        input: SimpleInput,
        locations: Vec<InputRecord>,
        #[serde(default)]
        location_template: LocationTemplate,
    },
}

/// What a job produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobOutput {
    TimeMap(TimeMapOutput),
    TimeFilter(TimeFilterOutput),
    Isochrones(Vec<Isochrone>),
    Reached(Vec<ReachedLocation>),
}

impl Job {
    /// Parse a job from JSON text.
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        serde_json::from_str(text).map_err(|e| EngineError::InvalidConfig {
            message: format!("invalid job: {e}"),
        })
    }

    /// Run the job to completion.
    pub async fn run(
        &self,
        engine: &Engine,
        cancel: &CancellationToken,
    ) -> Result<JobOutput, EngineError> {
        match self {
            Job::TimeMap {
                input,
                union,
                intersection,
            } => {
                let request = TimeMapRequest::new(input.searches()?)
                    .with_union(*union)
                    .with_intersection(*intersection);
                Ok(JobOutput::TimeMap(engine.run(&request, cancel).await?))
            }
            Job::TimeFilter {
                input,
                locations,
                location_template,
            } => {
                let request = TimeFilterRequest::new(
                    input.searches()?,
                    location_template.build_all(locations)?,
                );
                Ok(JobOutput::TimeFilter(engine.run(&request, cancel).await?))
            }
            Job::TimeMapSimple { input, aggregation } => {
                let request = SimpleTimeMap {
                    search: input.search()?,
                    aggregation: *aggregation,
                };
                Ok(JobOutput::Isochrones(engine.time_map_simple(&request).await?))
            }
            Job::TimeFilterSimple {
                input,
                locations,
                location_template,
            } => {
                let request = SimpleTimeFilter {
                    search: input.search()?,
                    locations: location_template.build_all(locations)?,
                };
                Ok(JobOutput::Reached(engine.time_filter_simple(&request).await?))
            }
        }
    }
}
