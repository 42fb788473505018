//! TripFormController
//!
//! Turns user intents into draft mutations and collaborator calls. Each
//! operation either applies its whole local change or leaves local state
//! exactly as it was; collaborator failures are logged here and returned
//! as a [`FormError`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{FormError, FormResult};
use crate::config::SuggestionsConfig;
use crate::domain::{DraftMode, Trip, TripCollection, TripDraft, TripId};
use crate::services::{CityCatalog, ServiceError, Services, TripStore};
use crate::suggest::{PlaceSuggestionEngine, SuggestionQuery, SuggestionResult};

/// Read-only copy of everything the form displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    pub draft: TripDraft,
    pub suggestions: Vec<String>,
    pub trips: Vec<Trip>,
    pub city_options: Vec<String>,
    pub trips_fetched: bool,
}

/// Owns the draft, the suggestion list and the cached trips for one session
pub struct TripFormController {
    draft: TripDraft,
    suggestions: PlaceSuggestionEngine,
    collection: TripCollection,
    city_options: Vec<String>,
    cities: Arc<dyn CityCatalog>,
    trips: Arc<dyn TripStore>,
}

impl TripFormController {
    pub fn new(user_id: impl Into<String>, services: &Services, suggestions: &SuggestionsConfig) -> Self {
        let user_id = user_id.into();
        debug!(%user_id, "TripFormController::new: called");
        Self {
            draft: TripDraft::new(user_id),
            suggestions: PlaceSuggestionEngine::new(services.places.clone(), suggestions),
            collection: TripCollection::new(),
            city_options: Vec::new(),
            cities: services.cities.clone(),
            trips: services.trips.clone(),
        }
    }

    pub fn draft(&self) -> &TripDraft {
        &self.draft
    }

    pub fn suggestions(&self) -> &[String] {
        self.suggestions.suggestions()
    }

    pub fn collection(&self) -> &TripCollection {
        &self.collection
    }

    pub fn city_options(&self) -> &[String] {
        &self.city_options
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            draft: self.draft.clone(),
            suggestions: self.suggestions().to_vec(),
            trips: self.collection.trips().to_vec(),
            city_options: self.city_options.clone(),
            trips_fetched: self.collection.is_fetched(),
        }
    }

    // === Field edits ===

    pub fn set_city(&mut self, city: impl Into<String>) {
        self.draft.city = city.into();
        debug!(city = %self.draft.city, "set_city: called");
    }

    pub fn set_start_date(&mut self, date: impl Into<String>) {
        self.draft.start_date = date.into();
        debug!(start_date = %self.draft.start_date, "set_start_date: called");
    }

    pub fn set_end_date(&mut self, date: impl Into<String>) {
        self.draft.end_date = date.into();
        debug!(end_date = %self.draft.end_date, "set_end_date: called");
    }

    // === Place search ===

    /// Record the typed text and issue a lookup for it
    ///
    /// The returned query may be run anywhere; its result must come back
    /// through [`apply_suggestions`](Self::apply_suggestions).
    pub fn begin_place_query(&mut self, text: impl Into<String>) -> Option<SuggestionQuery> {
        self.draft.place_query = text.into();
        debug!(place_query = %self.draft.place_query, "begin_place_query: called");
        let city = self.draft.city.clone();
        self.suggestions.begin(&city, &self.draft.place_query)
    }

    /// Apply a lookup result; stale results are dropped
    pub fn apply_suggestions(&mut self, result: SuggestionResult) -> FormResult<bool> {
        debug!(generation = result.generation, "apply_suggestions: called");
        self.suggestions.apply(result).map_err(FormError::SuggestionUnavailable)
    }

    /// Update the query text and refresh suggestions for it
    pub async fn set_place_query(&mut self, text: impl Into<String>) -> FormResult<()> {
        match self.begin_place_query(text) {
            Some(query) => {
                let result = query.run().await;
                self.apply_suggestions(result).map(|_| ())
            }
            None => Ok(()),
        }
    }

    /// Add a place to the selection and close the search box
    pub fn pick_suggestion(&mut self, place: impl Into<String>) {
        let place = place.into();
        debug!(%place, "pick_suggestion: called");
        self.draft.places.add(place);
        self.draft.place_query.clear();
        self.suggestions.clear();
    }

    pub fn remove_place(&mut self, place: &str) -> bool {
        debug!(%place, "remove_place: called");
        self.draft.places.remove(place)
    }

    // === Mode transitions ===

    /// Load a persisted trip into the draft for editing
    pub fn request_edit(&mut self, trip: &Trip) {
        info!(trip_id = %trip.id, city = %trip.city, "Editing trip");
        self.draft.load_trip(trip);
        self.suggestions.clear();
    }

    /// Create or update a trip from the draft
    ///
    /// On success the draft goes back to an empty `Create` state and the
    /// trip list is re-fetched. On failure nothing local changes.
    pub async fn submit(&mut self) -> FormResult<()> {
        debug!(mode = %self.draft.mode, "submit: called");
        let missing = self.draft.missing_fields();
        if !missing.is_empty() {
            debug!(?missing, "submit: draft incomplete, not sending");
            return Err(FormError::IncompleteDraft(missing));
        }

        let payload = self.draft.payload();
        let (action, result) = match &self.draft.mode {
            DraftMode::Create => ("create", self.trips.create_trip(&payload).await),
            DraftMode::Editing(id) => ("update", self.trips.update_trip(id, &payload).await),
        };

        if let Err(e) = result {
            warn!(action, error = %e, "Trip submission failed");
            return Err(FormError::MutationFailed { action, source: e });
        }

        info!(action, city = %payload.city, places = payload.places.len(), "Trip submitted");
        self.draft.reset();
        self.suggestions.clear();

        if let Err(e) = self.refresh_collection().await {
            debug!(error = %e, "submit: saved but refresh failed");
        }
        Ok(())
    }

    /// Delete a persisted trip, then re-fetch the list
    pub async fn request_delete(&mut self, id: &TripId) -> FormResult<()> {
        debug!(%id, "request_delete: called");
        if let Err(e) = self.trips.delete_trip(id).await {
            warn!(%id, error = %e, "Trip delete failed");
            return Err(FormError::MutationFailed {
                action: "delete",
                source: e,
            });
        }
        info!(%id, "Trip deleted");

        if let Err(e) = self.refresh_collection().await {
            debug!(error = %e, "request_delete: deleted but refresh failed");
        }
        Ok(())
    }

    // === Remote caches ===

    /// Replace the trip list with a fresh fetch; keeps the old list on failure
    pub async fn refresh_collection(&mut self) -> FormResult<()> {
        debug!("refresh_collection: called");
        let result = self.trips.list_trips(self.draft.user_id()).await;
        self.apply_trip_list(result)
    }

    /// Fetch the city catalog; an unreachable catalog leaves no options
    pub async fn load_city_options(&mut self) -> FormResult<()> {
        debug!("load_city_options: called");
        let result = self.cities.list_cities().await;
        self.apply_city_options(result)
    }

    /// Load the city catalog and the trip list concurrently
    ///
    /// Returns every failure; the form is usable regardless.
    pub async fn startup(&mut self) -> Vec<FormError> {
        debug!("startup: called");
        let (cities, trips) = futures::join!(self.cities.list_cities(), self.trips.list_trips(self.draft.user_id()));

        [self.apply_city_options(cities), self.apply_trip_list(trips)]
            .into_iter()
            .filter_map(Result::err)
            .collect()
    }

    fn apply_trip_list(&mut self, result: Result<Vec<Trip>, ServiceError>) -> FormResult<()> {
        match result {
            Ok(trips) => {
                info!(count = trips.len(), "Trip list refreshed");
                self.collection.replace(trips);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, kept = self.collection.len(), "Trip list fetch failed");
                Err(FormError::CollectionFetchFailed(e))
            }
        }
    }

    fn apply_city_options(&mut self, result: Result<Vec<String>, ServiceError>) -> FormResult<()> {
        match result {
            Ok(cities) => {
                info!(count = cities.len(), "City catalog loaded");
                self.city_options = cities;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "City catalog fetch failed");
                Err(FormError::CatalogUnavailable(e))
            }
        }
    }
}
