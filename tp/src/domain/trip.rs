//! Trip domain type
//!
//! The persisted trip record as returned by the trip service, and the
//! request body sent to create or update one.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Server-assigned trip identifier
///
/// Opaque to the client. The trip service may send it as a JSON string or
/// a number; both are kept as their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TripId(String);

impl TripId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TripId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TripId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl<'de> Deserialize<'de> for TripId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Ok(Self(s)),
            RawId::Number(n) => Ok(Self(n.to_string())),
        }
    }
}

/// A trip persisted by the trip service
///
/// Read-only on the client side: it is only ever replaced by a fresh fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,

    /// Owner; not every service echoes it back
    #[serde(default, rename = "user_id", alias = "userId")]
    pub user_id: Option<String>,

    pub city: String,

    #[serde(rename = "start_date", alias = "startDate")]
    pub start_date: String,

    #[serde(rename = "end_date", alias = "endDate")]
    pub end_date: String,

    /// Missing or null on the wire means no places
    #[serde(default, deserialize_with = "null_as_empty")]
    pub places: Vec<String>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Request body for creating or updating a trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPayload {
    pub user_id: String,
    pub city: String,
    pub start_date: String,
    pub end_date: String,
    pub places: Vec<String>,
}

impl TripPayload {
    /// Materialize the trip this payload would produce under `id`
    pub fn into_trip(self, id: TripId) -> Trip {
        debug!(%id, city = %self.city, "TripPayload::into_trip: called");
        Trip {
            id,
            user_id: Some(self.user_id),
            city: self.city,
            start_date: self.start_date,
            end_date: self.end_date,
            places: self.places,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trip_deserializes_snake_case_dates() {
        let json = r#"{"id":"t1","city":"Paris","start_date":"2024-05-01","end_date":"2024-05-05","places":["Louvre"]}"#;
        let trip: Trip = serde_json::from_str(json).unwrap();
        assert_eq!(trip.id, TripId::new("t1"));
        assert_eq!(trip.start_date, "2024-05-01");
        assert_eq!(trip.end_date, "2024-05-05");
        assert_eq!(trip.places, vec!["Louvre".to_string()]);
    }

    #[test]
    fn test_trip_accepts_camel_case_dates_and_numeric_id() {
        let json = r#"{"id":42,"city":"Rome","startDate":"2024-06-01","endDate":"2024-06-03"}"#;
        let trip: Trip = serde_json::from_str(json).unwrap();
        assert_eq!(trip.id.as_str(), "42");
        assert_eq!(trip.start_date, "2024-06-01");
        assert!(trip.places.is_empty());
    }

    #[test]
    fn test_trip_null_places_is_empty() {
        let json = r#"{"id":"x","city":"Oslo","start_date":"","end_date":"","places":null}"#;
        let trip: Trip = serde_json::from_str(json).unwrap();
        assert!(trip.places.is_empty());
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let payload = TripPayload {
            user_id: "u1".to_string(),
            city: "Paris".to_string(),
            start_date: "2024-05-01".to_string(),
            end_date: "2024-05-05".to_string(),
            places: vec!["Louvre".to_string()],
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["startDate"], "2024-05-01");
        assert_eq!(value["endDate"], "2024-05-05");
        assert_eq!(value["places"][0], "Louvre");
    }
}
