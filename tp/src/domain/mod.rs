//! Domain types for TripPlanner
//!
//! Core domain types: Trip (persisted, owned by the trip service),
//! TripDraft (the record being composed), PlaceSelectionSet and
//! TripCollection (wholesale cache of the user's trips).

mod collection;
mod draft;
mod selection;
mod trip;

pub use collection::TripCollection;
pub use draft::{DraftMode, TripDraft};
pub use selection::PlaceSelectionSet;
pub use trip::{Trip, TripId, TripPayload};
