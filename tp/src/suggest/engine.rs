//! PlaceSuggestionEngine
//!
//! Every lookup is stamped with a generation number when it is issued.
//! Only a result whose generation is still the latest may replace the
//! visible suggestion list; anything older is dropped on arrival.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::SuggestionsConfig;
use crate::services::{PlaceSearch, ServiceError};

/// What a lookup produced
#[derive(Debug)]
pub enum LookupOutcome {
    Found(Vec<String>),
    Failed(ServiceError),
    /// A newer query was issued during the debounce window; nothing was sent
    Superseded,
}

/// Result of running a [`SuggestionQuery`], to be handed back to the engine
#[derive(Debug)]
pub struct SuggestionResult {
    pub generation: u64,
    pub outcome: LookupOutcome,
}

/// A lookup that has been issued but not yet sent
///
/// Owns everything it needs, so it can run on a separate task while the
/// engine keeps accepting newer queries.
pub struct SuggestionQuery {
    generation: u64,
    city: String,
    text: String,
    search: Arc<dyn PlaceSearch>,
    latest: Arc<AtomicU64>,
    debounce: Duration,
}

impl std::fmt::Debug for SuggestionQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionQuery")
            .field("generation", &self.generation)
            .field("city", &self.city)
            .field("text", &self.text)
            .finish()
    }
}

impl SuggestionQuery {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Wait out the debounce window, then ask the place service
    pub async fn run(self) -> SuggestionResult {
        debug!(generation = self.generation, city = %self.city, text = %self.text, "SuggestionQuery::run: called");
        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
            if self.latest.load(Ordering::SeqCst) != self.generation {
                debug!(generation = self.generation, "SuggestionQuery::run: superseded during debounce");
                return SuggestionResult {
                    generation: self.generation,
                    outcome: LookupOutcome::Superseded,
                };
            }
        }

        let outcome = match self.search.search(&self.city, &self.text).await {
            Ok(places) => {
                debug!(generation = self.generation, count = places.len(), "SuggestionQuery::run: found");
                LookupOutcome::Found(places)
            }
            Err(e) => {
                debug!(generation = self.generation, error = %e, "SuggestionQuery::run: lookup failed");
                LookupOutcome::Failed(e)
            }
        };

        SuggestionResult {
            generation: self.generation,
            outcome,
        }
    }
}

/// Owns the visible suggestion list and decides which results may touch it
pub struct PlaceSuggestionEngine {
    search: Arc<dyn PlaceSearch>,
    min_query_len: usize,
    debounce: Duration,
    latest: Arc<AtomicU64>,
    suggestions: Vec<String>,
}

impl PlaceSuggestionEngine {
    pub fn new(search: Arc<dyn PlaceSearch>, config: &SuggestionsConfig) -> Self {
        debug!(?config, "PlaceSuggestionEngine::new: called");
        Self {
            search,
            min_query_len: config.min_query_len,
            debounce: config.debounce(),
            latest: Arc::new(AtomicU64::new(0)),
            suggestions: Vec::new(),
        }
    }

    /// Whether `city`/`text` are worth a remote lookup
    pub fn qualifies(&self, city: &str, text: &str) -> bool {
        !city.trim().is_empty() && text.chars().count() >= self.min_query_len
    }

    /// Issue a new query, superseding every earlier one
    ///
    /// Returns None when the input does not qualify; the visible list is
    /// cleared right away and no request will be made.
    pub fn begin(&mut self, city: &str, text: &str) -> Option<SuggestionQuery> {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, %city, %text, "PlaceSuggestionEngine::begin: called");

        if !self.qualifies(city, text) {
            debug!(generation, "PlaceSuggestionEngine::begin: query does not qualify");
            self.suggestions.clear();
            return None;
        }

        Some(SuggestionQuery {
            generation,
            city: city.to_string(),
            text: text.to_string(),
            search: self.search.clone(),
            latest: self.latest.clone(),
            debounce: self.debounce,
        })
    }

    /// Apply a finished lookup if it is still the latest one
    ///
    /// Ok(true) when the list was replaced, Ok(false) when the result was
    /// stale and dropped. A failed latest lookup empties the list and the
    /// error is returned for the caller to report.
    pub fn apply(&mut self, result: SuggestionResult) -> Result<bool, ServiceError> {
        let latest = self.latest.load(Ordering::SeqCst);
        if result.generation != latest {
            debug!(generation = result.generation, latest, "PlaceSuggestionEngine::apply: stale result dropped");
            return Ok(false);
        }

        match result.outcome {
            LookupOutcome::Found(places) => {
                debug!(generation = result.generation, count = places.len(), "PlaceSuggestionEngine::apply: applied");
                self.suggestions = places;
                Ok(true)
            }
            LookupOutcome::Failed(e) => {
                warn!(generation = result.generation, error = %e, "Place suggestion lookup failed");
                self.suggestions.clear();
                Err(e)
            }
            LookupOutcome::Superseded => Ok(false),
        }
    }

    /// Issue, run and apply a query in one go
    pub async fn query(&mut self, city: &str, text: &str) -> Result<&[String], ServiceError> {
        if let Some(query) = self.begin(city, text) {
            let result = query.run().await;
            self.apply(result)?;
        }
        Ok(&self.suggestions)
    }

    /// Empty the list and invalidate every in-flight lookup
    pub fn clear(&mut self) {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "PlaceSuggestionEngine::clear: called");
        self.suggestions.clear();
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}
