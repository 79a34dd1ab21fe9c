//! Building searches and locations from input records.
//!
//! An input record is one feature of the caller's layer: its index, its
//! point and its attribute table. Templates say, field by field, whether a
//! value is the same for every record or read from a named attribute.
//! Each target field kind has its own extraction function, so a template
//! either resolves to a valid [`SearchDefinition`] or fails with the field
//! that was wrong.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::{
    Coords, DomainError, LocationRecord, SearchDefinition, SearchSide, Transportation,
    TransportationType, TravelTime,
};

/// Travel time used when a template does not set one.
pub const DEFAULT_TRAVEL_TIME_SECS: u32 = 900;

/// One feature of an input layer, already in WGS84.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InputRecord {
    /// Feature index, used to derive default ids
    pub index: u64,
    pub coords: Coords,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// Where a template field gets its value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldValue {
    /// The same value for every record
    Literal(Value),
    /// The value of the named attribute of each record
    Attribute(String),
}

impl FieldValue {
    /// The raw value for `record`. `None` when it resolves to null.
    fn resolve<'a>(&'a self, record: &'a InputRecord) -> Result<Option<&'a Value>, DomainError> {
        let value = match self {
            FieldValue::Literal(value) => value,
            FieldValue::Attribute(name) => {
                record
                    .attributes
                    .get(name)
                    .ok_or_else(|| DomainError::MissingAttribute {
                        name: name.clone(),
                        record: record.index,
                    })?
            }
        };
        Ok((!value.is_null()).then_some(value))
    }
}

fn invalid(field: &str, message: impl Into<String>) -> DomainError {
    DomainError::InvalidField {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Resolve a field that must be present.
fn required<'a>(
    field: &str,
    value: &'a FieldValue,
    record: &'a InputRecord,
) -> Result<&'a Value, DomainError> {
    value
        .resolve(record)?
        .ok_or_else(|| invalid(field, "value is null"))
}

/// Resolve a field that may be absent from the template or null.
fn optional<'a>(
    value: Option<&'a FieldValue>,
    record: &'a InputRecord,
) -> Result<Option<&'a Value>, DomainError> {
    match value {
        Some(value) => value.resolve(record),
        None => Ok(None),
    }
}

/// Strings as-is, numbers and booleans in their JSON text form.
pub fn extract_text(field: &str, value: &Value) -> Result<String, DomainError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(invalid(field, format!("expected text, got {other}"))),
    }
}

/// Whole non-negative seconds. Fractions are rounded; numeric strings are
/// accepted.
pub fn extract_seconds(field: &str, value: &Value) -> Result<u32, DomainError> {
    let secs = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| invalid(field, format!("expected a number of seconds, got {value}")))?;

    if !secs.is_finite() || secs < 0.0 || secs > f64::from(u32::MAX) {
        return Err(invalid(field, format!("{secs} is not a valid number of seconds")));
    }
    Ok(secs.round() as u32)
}

/// An RFC 3339 timestamp, converted to UTC.
pub fn extract_timestamp(field: &str, value: &Value) -> Result<DateTime<Utc>, DomainError> {
    let text = value
        .as_str()
        .ok_or_else(|| invalid(field, format!("expected an ISO-8601 timestamp, got {value}")))?;
    DateTime::parse_from_rfc3339(text.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| invalid(field, format!("{text:?}: {e}")))
}

/// A transportation type by its service name.
pub fn extract_transportation(
    field: &str,
    value: &Value,
) -> Result<TransportationType, DomainError> {
    let text = value
        .as_str()
        .ok_or_else(|| invalid(field, format!("expected a transportation type, got {value}")))?;
    text.trim().parse()
}

/// A list of property names: a JSON array of strings, or one
/// comma-separated string.
pub fn extract_properties(field: &str, value: &Value) -> Result<Vec<String>, DomainError> {
    match value {
        Value::Array(items) => items.iter().map(|v| extract_text(field, v)).collect(),
        Value::String(s) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()),
        other => Err(invalid(field, format!("expected a property list, got {other}"))),
    }
}

/// How to build a search from each record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchTemplate {
    /// Defaults to `<side>_searches_<index>`
    #[serde(default)]
    pub id: Option<FieldValue>,
    pub transportation_type: FieldValue,
    #[serde(default)]
    pub pt_change_delay: Option<FieldValue>,
    #[serde(default)]
    pub walking_time: Option<FieldValue>,
    #[serde(default)]
    pub driving_time_to_station: Option<FieldValue>,
    #[serde(default)]
    pub parking_time: Option<FieldValue>,
    #[serde(default)]
    pub boarding_time: Option<FieldValue>,
    /// Departure or arrival time, depending on the side
    pub time: FieldValue,
    /// Seconds; defaults to 900
    #[serde(default)]
    pub travel_time: Option<FieldValue>,
    #[serde(default)]
    pub properties: Option<FieldValue>,
    #[serde(default)]
    pub range_width: Option<FieldValue>,
}

impl SearchTemplate {
    /// A template with literal values and every optional field unset.
    pub fn literal(kind: TransportationType, time: DateTime<Utc>) -> Self {
        Self {
            id: None,
            transportation_type: FieldValue::Literal(Value::String(kind.as_str().to_string())),
            pt_change_delay: None,
            walking_time: None,
            driving_time_to_station: None,
            parking_time: None,
            boarding_time: None,
            time: FieldValue::Literal(Value::String(time.to_rfc3339())),
            travel_time: None,
            properties: None,
            range_width: None,
        }
    }

    /// Build the search for one record.
    pub fn build(
        &self,
        side: SearchSide,
        record: &InputRecord,
    ) -> Result<SearchDefinition, DomainError> {
        let id = match optional(self.id.as_ref(), record)? {
            Some(value) => extract_text("id", value)?,
            None => side.default_id(record.index),
        };

        let kind = extract_transportation(
            "transportation_type",
            required("transportation_type", &self.transportation_type, record)?,
        )?;
        let mut transportation = Transportation::new(kind);
        let delays: [(&str, &Option<FieldValue>, fn(Transportation, u32) -> Transportation); 5] = [
            (
                "pt_change_delay",
                &self.pt_change_delay,
                Transportation::with_pt_change_delay,
            ),
            ("walking_time", &self.walking_time, Transportation::with_walking_time),
            (
                "driving_time_to_station",
                &self.driving_time_to_station,
                Transportation::with_driving_time_to_station,
            ),
            ("parking_time", &self.parking_time, Transportation::with_parking_time),
            ("boarding_time", &self.boarding_time, Transportation::with_boarding_time),
        ];
        for (field, value, set) in delays {
            if let Some(value) = optional(value.as_ref(), record)? {
                transportation = set(transportation, extract_seconds(field, value)?);
            }
        }

        let time = extract_timestamp("time", required("time", &self.time, record)?)?;

        let travel_time = match optional(self.travel_time.as_ref(), record)? {
            Some(value) => TravelTime::from_secs(extract_seconds("travel_time", value)?)?,
            None => TravelTime::from_secs(DEFAULT_TRAVEL_TIME_SECS)?,
        };

        let mut search = SearchDefinition::new(id, record.coords, transportation, time, travel_time)?;

        if let Some(value) = optional(self.properties.as_ref(), record)? {
            search = search.with_properties(extract_properties("properties", value)?);
        }
        if let Some(value) = optional(self.range_width.as_ref(), record)? {
            search = search.with_range_width(extract_seconds("range_width", value)?);
        }
        Ok(search)
    }

    /// Build one search per record, in record order.
    pub fn build_all(
        &self,
        side: SearchSide,
        records: &[InputRecord],
    ) -> Result<Vec<SearchDefinition>, DomainError> {
        records.iter().map(|r| self.build(side, r)).collect()
    }
}

/// How to build a location from each record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LocationTemplate {
    /// Defaults to `locations_<index>`
    #[serde(default)]
    pub id: Option<FieldValue>,
}

impl LocationTemplate {
    /// Build the location for one record, carrying its attributes along.
    pub fn build(&self, record: &InputRecord) -> Result<LocationRecord, DomainError> {
        self.build_with_default(record, |index| format!("locations_{index}"))
    }

    pub fn build_all(&self, records: &[InputRecord]) -> Result<Vec<LocationRecord>, DomainError> {
        records.iter().map(|r| self.build(r)).collect()
    }

    /// Like [`LocationTemplate::build`], but records without an id are
    /// named by `default_id` from their index.
    pub fn build_with_default(
        &self,
        record: &InputRecord,
        default_id: impl Fn(u64) -> String,
    ) -> Result<LocationRecord, DomainError> {
        let id = match optional(self.id.as_ref(), record)? {
            Some(value) => extract_text("id", value)?,
            None => default_id(record.index),
        };
        Ok(LocationRecord::new(id, record.coords)?.with_attributes(record.attributes.clone()))
    }

    pub fn build_all_with_default(
        &self,
        records: &[InputRecord],
        default_id: impl Fn(u64) -> String,
    ) -> Result<Vec<LocationRecord>, DomainError> {
        records
            .iter()
            .map(|r| self.build_with_default(r, &default_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(index: u64, attributes: Value) -> InputRecord {
        InputRecord {
            index,
            coords: Coords::new(51.5, -0.1).unwrap(),
            attributes: attributes.as_object().cloned().unwrap_or_default(),
        }
    }

    fn template() -> SearchTemplate {
        serde_json::from_value(json!({
            "transportation_type": {"literal": "public_transport"},
            "time": {"attribute": "leave_at"},
            "travel_time": {"attribute": "budget"},
        }))
        .unwrap()
    }

    #[test]
    fn literal_and_attribute_fields() {
        let r = record(4, json!({"leave_at": "2024-03-15T09:00:00+01:00", "budget": 1200}));
        let search = template().build(SearchSide::Departure, &r).unwrap();

        assert_eq!(search.id(), "departure_searches_4");
        assert_eq!(search.transportation().kind, TransportationType::PublicTransport);
        assert_eq!(search.time().to_rfc3339(), "2024-03-15T08:00:00+00:00");
        assert_eq!(search.travel_time().as_secs(), 1200);
        assert_eq!(search.transportation().walking_time, 900);
    }

    #[test]
    fn missing_attribute_names_record() {
        let r = record(7, json!({"budget": 600}));
        let err = template().build(SearchSide::Arrival, &r).unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingAttribute {
                name: "leave_at".into(),
                record: 7
            }
        );
    }

    #[test]
    fn null_travel_time_takes_default() {
        let r = record(0, json!({"leave_at": "2024-03-15T09:00:00Z", "budget": null}));
        let search = template().build(SearchSide::Arrival, &r).unwrap();
        assert_eq!(search.travel_time().as_secs(), 900);
        assert_eq!(search.id(), "arrival_searches_0");
    }

    #[test]
    fn delays_range_and_properties() {
        let mut t = template();
        t.id = Some(FieldValue::Attribute("name".into()));
        t.walking_time = Some(FieldValue::Literal(json!("300")));
        t.parking_time = Some(FieldValue::Literal(json!(59.6)));
        t.range_width = Some(FieldValue::Literal(json!(1800)));
        t.properties = Some(FieldValue::Literal(json!("travel_time, distance")));

        let r = record(
            1,
            json!({"name": "home", "leave_at": "2024-03-15T09:00:00Z", "budget": 600}),
        );
        let search = t.build(SearchSide::Departure, &r).unwrap();

        assert_eq!(search.id(), "home");
        assert_eq!(search.transportation().walking_time, 300);
        assert_eq!(search.transportation().parking_time, 60);
        assert_eq!(search.range_width(), Some(1800));
        assert_eq!(search.properties(), ["travel_time", "distance"]);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(extract_seconds("x", &json!(-1)).is_err());
        assert!(extract_seconds("x", &json!("soon")).is_err());
        assert!(extract_timestamp("x", &json!("yesterday")).is_err());
        assert!(matches!(
            extract_transportation("x", &json!("hovercraft")),
            Err(DomainError::UnknownTransportation(_))
        ));
        assert!(extract_text("x", &json!({"a": 1})).is_err());
    }

    #[test]
    fn travel_time_over_limit_rejected() {
        let r = record(0, json!({"leave_at": "2024-03-15T09:00:00Z", "budget": 20000}));
        assert!(matches!(
            template().build(SearchSide::Departure, &r),
            Err(DomainError::TravelTimeTooLong { .. })
        ));
    }

    #[test]
    fn location_template_defaults_and_attributes() {
        let r = record(3, json!({"name": "school"}));
        let location = LocationTemplate::default().build(&r).unwrap();
        assert_eq!(location.id(), "locations_3");
        assert_eq!(location.attributes()["name"], "school");

        let named = LocationTemplate {
            id: Some(FieldValue::Attribute("name".into())),
        };
        assert_eq!(named.build(&r).unwrap().id(), "school");
    }

    #[test]
    fn location_template_custom_default() {
        let r = record(0, json!({"name": "home"}));
        let point = LocationTemplate::default()
            .build_with_default(&r, |index| SearchSide::Arrival.default_id(index))
            .unwrap();
        assert_eq!(point.id(), "arrival_searches_0");
        assert_eq!(point.attributes()["name"], "home");
    }

    #[test]
    fn literal_template() {
        let time = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
        let t = SearchTemplate::literal(TransportationType::Walking, time);
        let search = t.build(SearchSide::Arrival, &record(2, json!({}))).unwrap();
        assert_eq!(search.time(), time);
        assert_eq!(search.transportation().kind, TransportationType::Walking);
    }
}
