//! Collaborator services for TripPlanner
//!
//! City catalog, place search and trip storage, each behind its own trait so
//! the form logic can run against HTTP services or in-memory fakes.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod http;

pub use client::{CityCatalog, PlaceSearch, TripStore};
pub use error::ServiceError;
pub use http::HttpServices;

use crate::config::ServicesConfig;

/// The three collaborators, as used by the form controller
#[derive(Clone)]
pub struct Services {
    pub cities: Arc<dyn CityCatalog>,
    pub places: Arc<dyn PlaceSearch>,
    pub trips: Arc<dyn TripStore>,
}

impl Services {
    /// Use one backend for all three collaborators
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: CityCatalog + PlaceSearch + TripStore + 'static,
    {
        Self {
            cities: backend.clone(),
            places: backend.clone(),
            trips: backend,
        }
    }
}

/// Create HTTP-backed services from config
pub fn create_services(config: &ServicesConfig) -> Result<Services, ServiceError> {
    debug!(
        cities = %config.cities_url,
        places = %config.places_url,
        trips = %config.trips_url,
        "create_services: called"
    );
    Ok(Services::from_backend(Arc::new(HttpServices::from_config(config)?)))
}
