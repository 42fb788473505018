//! TripPlanner - trip planning form over three remote services
//!
//! The user picks a city, a date range and a set of places, then creates,
//! edits or deletes trips kept by a remote trip service. This crate holds
//! the draft state machine that keeps the form consistent across user
//! actions and asynchronous round-trips.
//!
//! # Core Concepts
//!
//! - **Explicit draft**: one [`TripDraft`] owned by the controller, in either
//!   `Create` or `Editing(id)` mode
//! - **Wholesale refresh**: the trip list is re-fetched after every mutation,
//!   never patched locally
//! - **Last query wins**: place lookups carry a generation number and stale
//!   results are dropped
//! - **Failures are local no-ops**: a failed call is logged and leaves the
//!   draft exactly as it was
//!
//! # Modules
//!
//! - [`domain`] - Trip, draft, selection set and trip collection types
//! - [`services`] - Collaborator traits and their HTTP implementation
//! - [`suggest`] - Place suggestion engine
//! - [`form`] - Form controller and its actor handle
//! - [`repl`] - Interactive front end
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod form;
pub mod repl;
pub mod services;
pub mod suggest;

// Re-export commonly used types
pub use config::{Config, ServicesConfig, SuggestionsConfig};
pub use domain::{DraftMode, PlaceSelectionSet, Trip, TripCollection, TripDraft, TripId, TripPayload};
pub use form::{FormError, FormEvent, FormHandle, FormResult, FormSnapshot, TripFormController};
pub use services::{CityCatalog, HttpServices, PlaceSearch, ServiceError, Services, TripStore, create_services};
pub use suggest::{LookupOutcome, PlaceSuggestionEngine, SuggestionQuery, SuggestionResult};
