//! Domain types for travel-time queries.
//!
//! These are the values a caller hands to the engine: search anchors,
//! the locations a filter search is evaluated against, and the
//! transportation profile attached to each search. All types enforce
//! their invariants at construction time.

mod coords;
mod error;
mod search;
mod transportation;

pub use coords::Coords;
pub use error::DomainError;
pub use search::{LocationRecord, SearchDefinition, SearchSide, Searches, TravelTime};
pub use transportation::{Transportation, TransportationType};
