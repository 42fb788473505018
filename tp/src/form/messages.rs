//! Form actor messages
//!
//! Commands and events for the actor pattern.

use tokio::sync::oneshot;

use super::{FormError, FormResult, FormSnapshot};
use crate::domain::{Trip, TripId};

/// Commands sent to the form actor
#[derive(Debug)]
pub enum FormCommand {
    // Field edits
    SetCity {
        city: String,
        reply: oneshot::Sender<()>,
    },
    SetStartDate {
        date: String,
        reply: oneshot::Sender<()>,
    },
    SetEndDate {
        date: String,
        reply: oneshot::Sender<()>,
    },

    // Place search and selection
    SetPlaceQuery {
        text: String,
        /// Generation of the lookup issued, None if the text did not qualify
        reply: oneshot::Sender<Option<u64>>,
    },
    PickSuggestion {
        place: String,
        reply: oneshot::Sender<()>,
    },
    RemovePlace {
        place: String,
        reply: oneshot::Sender<bool>,
    },

    // Trip operations
    Submit {
        reply: oneshot::Sender<FormResult<()>>,
    },
    RequestEdit {
        trip: Box<Trip>,
        reply: oneshot::Sender<()>,
    },
    RequestDelete {
        id: TripId,
        reply: oneshot::Sender<FormResult<()>>,
    },

    // Remote caches
    Refresh {
        reply: oneshot::Sender<FormResult<()>>,
    },
    LoadCities {
        reply: oneshot::Sender<FormResult<()>>,
    },
    Startup {
        reply: oneshot::Sender<Vec<FormError>>,
    },

    Snapshot {
        reply: oneshot::Sender<FormSnapshot>,
    },

    // Shutdown
    Shutdown,
}

/// Broadcast when a place lookup finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// The visible suggestion list was replaced
    SuggestionsApplied { generation: u64, suggestions: Vec<String> },
    /// The latest lookup failed; the list is now empty
    SuggestionsFailed { generation: u64, error: String },
    /// A superseded lookup finished and was ignored
    SuggestionsDropped { generation: u64 },
}

impl FormEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::SuggestionsApplied { generation, .. }
            | Self::SuggestionsFailed { generation, .. }
            | Self::SuggestionsDropped { generation } => *generation,
        }
    }
}
