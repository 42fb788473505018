//! TripCollection - cached copy of the user's persisted trips

use tracing::debug;

use super::{Trip, TripId};

/// The user's trips as last fetched from the trip service
///
/// Only ever replaced wholesale; never patched entry by entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripCollection {
    trips: Vec<Trip>,
    fetched: bool,
}

impl TripCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection with a fresh fetch
    pub fn replace(&mut self, trips: Vec<Trip>) {
        debug!(old = self.trips.len(), new = trips.len(), "TripCollection::replace: called");
        self.trips = trips;
        self.fetched = true;
    }

    /// True once at least one fetch has succeeded
    pub fn is_fetched(&self) -> bool {
        self.fetched
    }

    pub fn get(&self, id: &TripId) -> Option<&Trip> {
        self.trips.iter().find(|t| &t.id == id)
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}
