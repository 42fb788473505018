//! TripDraft domain type
//!
//! The trip currently being composed in the form, plus whether submitting it
//! creates a new trip or updates an existing one.

use tracing::debug;

use super::{PlaceSelectionSet, Trip, TripId, TripPayload};

/// Whether the draft creates a new trip or edits a persisted one
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DraftMode {
    /// Submitting creates a new trip
    #[default]
    Create,
    /// Submitting updates the trip with this id
    Editing(TripId),
}

impl DraftMode {
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }

    pub fn editing_id(&self) -> Option<&TripId> {
        match self {
            Self::Create => None,
            Self::Editing(id) => Some(id),
        }
    }
}

impl std::fmt::Display for DraftMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Editing(id) => write!(f, "editing {}", id),
        }
    }
}

/// The mutable trip record being composed
///
/// Empty strings mean "unset". Date ordering is not checked here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripDraft {
    /// Fixed for the whole session
    user_id: String,
    pub city: String,
    pub start_date: String,
    pub end_date: String,
    /// Text typed into the place search box
    pub place_query: String,
    pub places: PlaceSelectionSet,
    pub mode: DraftMode,
}

impl TripDraft {
    /// Fresh draft in `Create` mode with every field empty
    pub fn new(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        debug!(%user_id, "TripDraft::new: called");
        Self {
            user_id,
            city: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            place_query: String::new(),
            places: PlaceSelectionSet::new(),
            mode: DraftMode::Create,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Overwrite the draft with a persisted trip and switch to `Editing`
    pub fn load_trip(&mut self, trip: &Trip) {
        debug!(trip_id = %trip.id, previous = %self.mode, "TripDraft::load_trip: called");
        self.city = trip.city.clone();
        self.start_date = trip.start_date.clone();
        self.end_date = trip.end_date.clone();
        self.place_query.clear();
        self.places = trip.places.iter().cloned().collect();
        self.mode = DraftMode::Editing(trip.id.clone());
    }

    /// Back to the initial `Create` state; the user id is kept
    pub fn reset(&mut self) {
        debug!(mode = %self.mode, "TripDraft::reset: called");
        self.city.clear();
        self.start_date.clear();
        self.end_date.clear();
        self.place_query.clear();
        self.places.clear();
        self.mode = DraftMode::Create;
    }

    /// Names of required fields that are still empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.city.is_empty() {
            missing.push("city");
        }
        if self.start_date.is_empty() {
            missing.push("start date");
        }
        if self.end_date.is_empty() {
            missing.push("end date");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Request body for the trip service
    pub fn payload(&self) -> TripPayload {
        TripPayload {
            user_id: self.user_id.clone(),
            city: self.city.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            places: self.places.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris_trip() -> Trip {
        Trip {
            id: TripId::new("t-1"),
            user_id: None,
            city: "Paris".to_string(),
            start_date: "2024-05-01".to_string(),
            end_date: "2024-05-05".to_string(),
            places: vec!["Louvre".to_string(), "Orsay".to_string()],
        }
    }

    #[test]
    fn test_new_draft_is_empty_create() {
        let draft = TripDraft::new("u1");
        assert_eq!(draft.mode, DraftMode::Create);
        assert!(draft.city.is_empty());
        assert!(draft.places.is_empty());
        assert_eq!(draft.user_id(), "u1");
    }

    #[test]
    fn test_load_trip_enters_editing() {
        let mut draft = TripDraft::new("u1");
        draft.place_query = "Ga".to_string();
        draft.places.add("Colosseum");

        draft.load_trip(&paris_trip());

        assert_eq!(draft.mode, DraftMode::Editing(TripId::new("t-1")));
        assert_eq!(draft.city, "Paris");
        assert_eq!(draft.start_date, "2024-05-01");
        assert_eq!(draft.end_date, "2024-05-05");
        assert!(draft.place_query.is_empty());
        assert_eq!(draft.places.as_slice(), ["Louvre", "Orsay"]);
    }

    #[test]
    fn test_reset_keeps_user_id() {
        let mut draft = TripDraft::new("u1");
        draft.load_trip(&paris_trip());
        draft.reset();
        assert_eq!(draft, TripDraft::new("u1"));
    }

    #[test]
    fn test_missing_fields() {
        let mut draft = TripDraft::new("u1");
        assert_eq!(draft.missing_fields(), vec!["city", "start date", "end date"]);
        draft.city = "Paris".to_string();
        draft.end_date = "2024-05-05".to_string();
        assert_eq!(draft.missing_fields(), vec!["start date"]);
        draft.start_date = "2024-05-01".to_string();
        assert!(draft.is_complete());
    }

    #[test]
    fn test_whitespace_city_counts_as_filled() {
        let mut draft = TripDraft::new("u1");
        draft.city = " ".to_string();
        draft.start_date = "2024-05-01".to_string();
        draft.end_date = "2024-05-05".to_string();
        assert!(draft.missing_fields().is_empty());
        assert!(draft.is_complete());
    }

    #[test]
    fn test_end_before_start_is_accepted() {
        let mut draft = TripDraft::new("u1");
        draft.city = "Paris".to_string();
        draft.start_date = "2024-05-05".to_string();
        draft.end_date = "2024-05-01".to_string();
        assert!(draft.is_complete());
    }

    #[test]
    fn test_payload_carries_selection() {
        let mut draft = TripDraft::new("u1");
        draft.load_trip(&paris_trip());
        let payload = draft.payload();
        assert_eq!(payload.user_id, "u1");
        assert_eq!(payload.places, vec!["Louvre".to_string(), "Orsay".to_string()]);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(DraftMode::Create.to_string(), "create");
        assert_eq!(DraftMode::Editing(TripId::new("7")).to_string(), "editing 7");
    }
}
