//! Place suggestions for the search box
//!
//! Gating (city set, minimum query length), debouncing and
//! last-issued-wins application of lookup results.

mod engine;

pub use engine::{LookupOutcome, PlaceSuggestionEngine, SuggestionQuery, SuggestionResult};
