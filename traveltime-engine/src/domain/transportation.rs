//! Transportation profiles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Transportation modes understood by the travel-time service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportationType {
    #[serde(rename = "cycling")]
    Cycling,
    #[serde(rename = "driving")]
    Driving,
    #[serde(rename = "driving+train")]
    DrivingTrain,
    #[serde(rename = "public_transport")]
    PublicTransport,
    #[serde(rename = "walking")]
    Walking,
    #[serde(rename = "coach")]
    Coach,
    #[serde(rename = "bus")]
    Bus,
    #[serde(rename = "train")]
    Train,
    #[serde(rename = "ferry")]
    Ferry,
    #[serde(rename = "driving+ferry")]
    DrivingFerry,
    #[serde(rename = "cycling+ferry")]
    CyclingFerry,
}

impl TransportationType {
    /// Every mode, in the order the service documents them.
    pub const ALL: [TransportationType; 11] = [
        Self::Cycling,
        Self::Driving,
        Self::DrivingTrain,
        Self::PublicTransport,
        Self::Walking,
        Self::Coach,
        Self::Bus,
        Self::Train,
        Self::Ferry,
        Self::DrivingFerry,
        Self::CyclingFerry,
    ];

    /// Wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cycling => "cycling",
            Self::Driving => "driving",
            Self::DrivingTrain => "driving+train",
            Self::PublicTransport => "public_transport",
            Self::Walking => "walking",
            Self::Coach => "coach",
            Self::Bus => "bus",
            Self::Train => "train",
            Self::Ferry => "ferry",
            Self::DrivingFerry => "driving+ferry",
            Self::CyclingFerry => "cycling+ferry",
        }
    }
}

impl FromStr for TransportationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::UnknownTransportation(s.to_string()))
    }
}

impl fmt::Display for TransportationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transportation profile: the mode plus its delay parameters, in seconds.
///
/// The delays only matter for the modes that use them (public transport
/// change delay, park-and-ride parking time, ...) but the service accepts
/// them for every mode, so they are always sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transportation {
    #[serde(rename = "type")]
    pub kind: TransportationType,
    pub pt_change_delay: u32,
    pub walking_time: u32,
    pub driving_time_to_station: u32,
    pub parking_time: u32,
    pub boarding_time: u32,
}

impl Transportation {
    /// Create a profile with the service's default delays.
    pub fn new(kind: TransportationType) -> Self {
        Self {
            kind,
            pt_change_delay: 0,
            walking_time: 900,
            driving_time_to_station: 1800,
            parking_time: 300,
            boarding_time: 0,
        }
    }

    /// Set the maximum walking time.
    pub fn with_walking_time(mut self, secs: u32) -> Self {
        self.walking_time = secs;
        self
    }

    /// Set the public transport change delay.
    pub fn with_pt_change_delay(mut self, secs: u32) -> Self {
        self.pt_change_delay = secs;
        self
    }

    /// Set the driving time to the station.
    pub fn with_driving_time_to_station(mut self, secs: u32) -> Self {
        self.driving_time_to_station = secs;
        self
    }

    /// Set the parking time.
    pub fn with_parking_time(mut self, secs: u32) -> Self {
        self.parking_time = secs;
        self
    }

    /// Set the boarding time.
    pub fn with_boarding_time(mut self, secs: u32) -> Self {
        self.boarding_time = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_mode() {
        for mode in TransportationType::ALL {
            assert_eq!(mode.as_str().parse::<TransportationType>(), Ok(mode));
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(
            "teleport".parse::<TransportationType>(),
            Err(DomainError::UnknownTransportation("teleport".into()))
        );
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&TransportationType::DrivingTrain).unwrap();
        assert_eq!(json, "\"driving+train\"");
    }

    #[test]
    fn default_delays() {
        let t = Transportation::new(TransportationType::PublicTransport);
        assert_eq!(t.pt_change_delay, 0);
        assert_eq!(t.walking_time, 900);
        assert_eq!(t.driving_time_to_station, 1800);
        assert_eq!(t.parking_time, 300);
        assert_eq!(t.boarding_time, 0);
    }

    #[test]
    fn serializes_type_field() {
        let t = Transportation::new(TransportationType::Walking).with_walking_time(600);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["type"], "walking");
        assert_eq!(json["walking_time"], 600);
        assert_eq!(json["parking_time"], 300);
    }
}
