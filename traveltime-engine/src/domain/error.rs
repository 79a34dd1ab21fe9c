//! Domain error types.
//!
//! These errors represent validation failures when building search
//! definitions and locations. They are distinct from API/IO errors.

/// Domain-level errors for validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Identifiers must be non-empty
    #[error("identifier must not be empty")]
    EmptyId,

    /// Latitude outside [-90, 90] or longitude outside [-180, 180]
    #[error("coordinates out of range: lat {lat}, lng {lng}")]
    CoordsOutOfRange { lat: f64, lng: f64 },

    /// Travel time above the service maximum
    #[error("travel time {secs}s exceeds the maximum of {max}s")]
    TravelTimeTooLong { secs: u32, max: u32 },

    /// Transportation type not known to the service
    #[error("unknown transportation type: {0}")]
    UnknownTransportation(String),

    /// A template names an attribute the record does not have
    #[error("record {record} has no attribute {name:?}")]
    MissingAttribute { name: String, record: u64 },

    /// A template value has the wrong type for its field
    #[error("invalid value for {field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::EmptyId;
        assert_eq!(err.to_string(), "identifier must not be empty");

        let err = DomainError::TravelTimeTooLong {
            secs: 20000,
            max: 14400,
        };
        assert_eq!(
            err.to_string(),
            "travel time 20000s exceeds the maximum of 14400s"
        );

        let err = DomainError::UnknownTransportation("hovercraft".into());
        assert_eq!(err.to_string(), "unknown transportation type: hovercraft");

        let err = DomainError::MissingAttribute {
            name: "speed".into(),
            record: 3,
        };
        assert_eq!(err.to_string(), "record 3 has no attribute \"speed\"");
    }
}
