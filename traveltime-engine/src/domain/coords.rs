//! WGS84 coordinates.

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// A point in WGS84 degrees.
///
/// Reprojection happens before values reach the engine, so a `Coords`
/// is always in the service's reference system.
///
/// # Examples
///
/// ```
/// use traveltime_engine::domain::Coords;
///
/// let london = Coords::new(51.5072, -0.1276).unwrap();
/// assert_eq!(london.lat, 51.5072);
///
/// assert!(Coords::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoords")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Deserialize)]
struct RawCoords {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawCoords> for Coords {
    type Error = DomainError;

    fn try_from(raw: RawCoords) -> Result<Self, Self::Error> {
        Coords::new(raw.lat, raw.lng)
    }
}

impl Coords {
    /// Create coordinates, rejecting values outside the valid degree ranges.
    pub fn new(lat: f64, lng: f64) -> Result<Self, DomainError> {
        let lat_ok = (-90.0..=90.0).contains(&lat);
        let lng_ok = (-180.0..=180.0).contains(&lng);
        if !lat_ok || !lng_ok {
            return Err(DomainError::CoordsOutOfRange { lat, lng });
        }
        Ok(Self { lat, lng })
    }
}
