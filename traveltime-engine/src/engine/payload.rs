//! Request body construction.
//!
//! Pure functions from a batch to a [`RequestPayload`]. A side with no
//! searches in the batch is left out of the body entirely.

use crate::api::{AggregationDescriptor, RequestPayload, SearchRange, WireLocation, WireSearch};
use crate::domain::{LocationRecord, SearchDefinition, SearchSide};

use super::batch::Batch;

/// Search id the service uses for the union of all isochrones.
pub const UNION_ID: &str = "union_all";
/// Search id the service uses for the intersection of all isochrones.
pub const INTERSECTION_ID: &str = "intersection_all";

/// The wire form of one search, with embedded coordinates.
pub fn wire_search(side: SearchSide, search: &SearchDefinition) -> WireSearch {
    let (departure_time, arrival_time) = match side {
        SearchSide::Departure => (Some(search.time()), None),
        SearchSide::Arrival => (None, Some(search.time())),
    };

    WireSearch {
        id: search.id().to_string(),
        coords: Some(search.coords()),
        departure_location_id: None,
        arrival_location_id: None,
        departure_location_ids: None,
        arrival_location_ids: None,
        transportation: search.transportation().clone(),
        departure_time,
        arrival_time,
        travel_time: search.travel_time(),
        properties: search.properties().to_vec(),
        range: search.range_width().map(|width| SearchRange {
            enabled: true,
            width,
        }),
    }
}

fn side_searches(side: SearchSide, searches: &[SearchDefinition]) -> Option<Vec<WireSearch>> {
    if searches.is_empty() {
        return None;
    }
    Some(searches.iter().map(|s| wire_search(side, s)).collect())
}

/// An aggregation over every search of the batch, departures first.
pub fn aggregation(id: &str, batch: &Batch<'_, SearchDefinition>) -> AggregationDescriptor {
    let search_ids = batch
        .departures
        .iter()
        .chain(batch.arrivals)
        .map(|s| s.id().to_string())
        .collect();

    AggregationDescriptor {
        id: id.to_string(),
        search_ids,
    }
}

/// Body for the isochrone endpoint.
pub fn time_map_payload(
    batch: &Batch<'_, SearchDefinition>,
    union: bool,
    intersection: bool,
) -> RequestPayload {
    RequestPayload {
        locations: None,
        departure_searches: side_searches(SearchSide::Departure, batch.departures),
        arrival_searches: side_searches(SearchSide::Arrival, batch.arrivals),
        unions: union.then(|| vec![aggregation(UNION_ID, batch)]),
        intersections: intersection.then(|| vec![aggregation(INTERSECTION_ID, batch)]),
    }
}

/// Body for the filtering endpoint.
///
/// Every batch carries all `locations`. Each search's own point becomes an
/// extra location named after the search, and the search then refers to
/// it by id, with the original location ids as its counterparts.
pub fn time_filter_payload(
    batch: &Batch<'_, SearchDefinition>,
    locations: &[LocationRecord],
) -> RequestPayload {
    let location_ids: Vec<String> = locations.iter().map(|l| l.id().to_string()).collect();

    let mut wire_locations: Vec<WireLocation> = locations
        .iter()
        .map(|l| WireLocation {
            id: l.id().to_string(),
            coords: l.coords(),
        })
        .collect();

    let mut remix = |side: SearchSide, searches: &[SearchDefinition]| {
        if searches.is_empty() {
            return None;
        }
        let wire = searches
            .iter()
            .map(|search| {
                wire_locations.push(WireLocation {
                    id: search.id().to_string(),
                    coords: search.coords(),
                });

                let mut wire = wire_search(side, search);
                wire.coords = None;
                match side {
                    SearchSide::Departure => {
                        wire.departure_location_id = Some(search.id().to_string());
                        wire.arrival_location_ids = Some(location_ids.clone());
                    }
                    SearchSide::Arrival => {
                        wire.arrival_location_id = Some(search.id().to_string());
                        wire.departure_location_ids = Some(location_ids.clone());
                    }
                }
                wire
            })
            .collect();
        Some(wire)
    };

    let departure_searches = remix(SearchSide::Departure, batch.departures);
    let arrival_searches = remix(SearchSide::Arrival, batch.arrivals);

    RequestPayload {
        locations: Some(wire_locations),
        departure_searches,
        arrival_searches,
        unions: None,
        intersections: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coords, Transportation, TransportationType, TravelTime};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn search(id: &str) -> SearchDefinition {
        SearchDefinition::new(
            id,
            Coords::new(51.5, -0.1).unwrap(),
            Transportation::new(TransportationType::PublicTransport),
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
            TravelTime::from_secs(900).unwrap(),
        )
        .unwrap()
    }

    fn location(id: &str) -> LocationRecord {
        LocationRecord::new(id, Coords::new(51.6, -0.2).unwrap()).unwrap()
    }

    fn batch<'a>(
        departures: &'a [SearchDefinition],
        arrivals: &'a [SearchDefinition],
    ) -> Batch<'a, SearchDefinition> {
        Batch {
            index: 0,
            departures,
            arrivals,
        }
    }

    #[test]
    fn union_over_two_searches() {
        let departures = vec![search("a"), search("b")];
        let payload = time_map_payload(&batch(&departures, &[]), true, false);

        let unions = payload.unions.unwrap();
        assert_eq!(unions.len(), 1);
        assert_eq!(unions[0].id, "union_all");
        assert_eq!(unions[0].search_ids, vec!["a", "b"]);
        assert!(payload.intersections.is_none());
    }

    #[test]
    fn aggregation_lists_departures_then_arrivals() {
        let departures = vec![search("d1")];
        let arrivals = vec![search("a1"), search("a2")];
        let payload = time_map_payload(&batch(&departures, &arrivals), true, true);

        assert_eq!(
            payload.intersections.unwrap()[0].search_ids,
            vec!["d1", "a1", "a2"]
        );
        assert_eq!(payload.unions.unwrap()[0].search_ids, vec!["d1", "a1", "a2"]);
    }

    #[test]
    fn time_map_wire_shape() {
        let departures = vec![search("a").with_range_width(600)];
        let arrivals = vec![search("b").with_properties(vec!["is_only_walking".into()])];
        let payload = time_map_payload(&batch(&departures, &arrivals), false, false);
        let body = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            body["departure_searches"][0],
            json!({
                "id": "a",
                "coords": {"lat": 51.5, "lng": -0.1},
                "transportation": {
                    "type": "public_transport",
                    "pt_change_delay": 0,
                    "walking_time": 900,
                    "driving_time_to_station": 1800,
                    "parking_time": 300,
                    "boarding_time": 0
                },
                "departure_time": "2024-03-15T09:00:00Z",
                "travel_time": 900,
                "properties": [],
                "range": {"enabled": true, "width": 600}
            })
        );
        assert_eq!(body["arrival_searches"][0]["arrival_time"], "2024-03-15T09:00:00Z");
        assert!(body["arrival_searches"][0].get("departure_time").is_none());
        assert_eq!(body["arrival_searches"][0]["properties"], json!(["is_only_walking"]));
        assert!(body.get("unions").is_none());
        assert!(body.get("locations").is_none());
    }

    #[test]
    fn empty_side_is_omitted() {
        let arrivals = vec![search("b")];
        let body = serde_json::to_value(time_map_payload(&batch(&[], &arrivals), false, false))
            .unwrap();
        assert!(body.get("departure_searches").is_none());
        assert_eq!(body["arrival_searches"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn time_filter_remix() {
        let departures = vec![search("s1")];
        let arrivals = vec![search("s2")];
        let locations = vec![location("l1"), location("l2")];
        let payload = time_filter_payload(&batch(&departures, &arrivals), &locations);

        let ids: Vec<_> = payload
            .locations
            .as_ref()
            .unwrap()
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(ids, vec!["l1", "l2", "s1", "s2"]);

        let dep = &payload.departure_searches.as_ref().unwrap()[0];
        assert_eq!(dep.coords, None);
        assert_eq!(dep.departure_location_id.as_deref(), Some("s1"));
        assert_eq!(dep.arrival_location_ids, Some(vec!["l1".into(), "l2".into()]));
        assert_eq!(dep.arrival_location_id, None);

        let arr = &payload.arrival_searches.as_ref().unwrap()[0];
        assert_eq!(arr.arrival_location_id.as_deref(), Some("s2"));
        assert_eq!(arr.departure_location_ids, Some(vec!["l1".into(), "l2".into()]));

        let body = serde_json::to_value(&payload).unwrap();
        assert!(body["departure_searches"][0].get("coords").is_none());
    }
}
