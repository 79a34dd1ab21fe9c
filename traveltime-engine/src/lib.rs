//! Travel-time request orchestration.
//!
//! Turns bulk collections of spatial records into batched, cached and
//! usage-guarded requests against the TravelTime isochrone and filter
//! endpoints, and joins the results back onto the records they came from.

pub mod api;
pub mod cache;
pub mod credentials;
pub mod domain;
pub mod engine;
pub mod input;
pub mod job;
pub mod settings;
pub mod simple;
