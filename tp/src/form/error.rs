//! Typed outcomes for form operations
//!
//! Every variant is produced after local state has already been put back
//! into (or left in) a consistent state, so callers may ignore it.

use thiserror::Error;

use crate::services::ServiceError;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("City catalog unavailable: {0}")]
    CatalogUnavailable(#[source] ServiceError),

    #[error("Place suggestions unavailable: {0}")]
    SuggestionUnavailable(#[source] ServiceError),

    #[error("Trip {action} failed: {source}")]
    MutationFailed {
        action: &'static str,
        #[source]
        source: ServiceError,
    },

    #[error("Could not fetch trips: {0}")]
    CollectionFetchFailed(#[source] ServiceError),

    #[error("Draft is missing: {}", .0.join(", "))]
    IncompleteDraft(Vec<&'static str>),

    #[error("A submission is already in progress")]
    SubmitInFlight,

    #[error("Form is no longer running")]
    Closed,
}

impl FormError {
    /// Short stable label for logs and status lines
    pub fn kind(&self) -> &'static str {
        match self {
            FormError::CatalogUnavailable(_) => "catalog-unavailable",
            FormError::SuggestionUnavailable(_) => "suggestion-unavailable",
            FormError::MutationFailed { .. } => "mutation-failed",
            FormError::CollectionFetchFailed(_) => "collection-fetch-failed",
            FormError::IncompleteDraft(_) => "incomplete-draft",
            FormError::SubmitInFlight => "submit-in-flight",
            FormError::Closed => "closed",
        }
    }
}

/// Response from form operations
pub type FormResult<T> = Result<T, FormError>;
