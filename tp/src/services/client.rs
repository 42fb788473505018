//! Collaborator trait definitions
//!
//! The three backend services the form talks to. Each call is a single
//! request/response; none of them keep client-side state.

use async_trait::async_trait;

use super::ServiceError;
use crate::domain::{Trip, TripId, TripPayload};

/// City catalog (`GET /cities`)
#[async_trait]
pub trait CityCatalog: Send + Sync {
    /// Every city the user may plan a trip to
    async fn list_cities(&self) -> Result<Vec<String>, ServiceError>;
}

/// Place search (`GET /places?city=..&query=..`)
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Place names in `city` matching the partial name `query`
    async fn search(&self, city: &str, query: &str) -> Result<Vec<String>, ServiceError>;
}

/// Trip storage (`/trips`)
#[async_trait]
pub trait TripStore: Send + Sync {
    /// All trips owned by `user_id`
    async fn list_trips(&self, user_id: &str) -> Result<Vec<Trip>, ServiceError>;

    /// Create a trip; the id is assigned by the service
    async fn create_trip(&self, payload: &TripPayload) -> Result<(), ServiceError>;

    /// Replace the trip `id` with `payload`
    async fn update_trip(&self, id: &TripId, payload: &TripPayload) -> Result<(), ServiceError>;

    async fn delete_trip(&self, id: &TripId) -> Result<(), ServiceError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::oneshot;
    use tracing::debug;

    fn unavailable() -> ServiceError {
        ServiceError::ApiError {
            status: 503,
            message: "mock: service unavailable".to_string(),
        }
    }

    /// In-memory stand-in for all three collaborators
    ///
    /// Failure switches make the next calls of a kind fail with a 503.
    /// Gates hold a place search for a given query text until released,
    /// so tests can control the order in which responses resolve.
    #[derive(Default)]
    pub struct MockBackend {
        pub cities: Mutex<Vec<String>>,
        places: Mutex<HashMap<(String, String), Vec<String>>>,
        gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
        trips: Mutex<Vec<Trip>>,
        next_id: AtomicUsize,

        pub fail_cities: AtomicBool,
        pub fail_places: AtomicBool,
        pub fail_list: AtomicBool,
        pub fail_mutations: AtomicBool,

        pub city_calls: AtomicUsize,
        pub search_calls: AtomicUsize,
        pub list_calls: AtomicUsize,
        pub mutation_calls: AtomicUsize,
    }

    impl MockBackend {
        pub fn new() -> Self {
            debug!("MockBackend::new: called");
            Self::default()
        }

        pub fn with_cities(self, cities: &[&str]) -> Self {
            *self.cities.lock().unwrap() = cities.iter().map(|c| c.to_string()).collect();
            self
        }

        pub fn with_places(self, city: &str, query: &str, places: &[&str]) -> Self {
            self.places.lock().unwrap().insert(
                (city.to_string(), query.to_string()),
                places.iter().map(|p| p.to_string()).collect(),
            );
            self
        }

        pub fn with_trip(self, trip: Trip) -> Self {
            self.trips.lock().unwrap().push(trip);
            self
        }

        /// Hold searches for `query` until the returned sender fires
        pub fn gate(&self, query: &str) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(query.to_string(), rx);
            tx
        }

        pub fn set_fail_mutations(&self, fail: bool) {
            self.fail_mutations.store(fail, Ordering::SeqCst);
        }

        pub fn set_fail_list(&self, fail: bool) {
            self.fail_list.store(fail, Ordering::SeqCst);
        }

        pub fn stored_trips(&self) -> Vec<Trip> {
            self.trips.lock().unwrap().clone()
        }

        pub fn search_count(&self) -> usize {
            self.search_calls.load(Ordering::SeqCst)
        }

        pub fn mutation_count(&self) -> usize {
            self.mutation_calls.load(Ordering::SeqCst)
        }

        pub fn list_count(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CityCatalog for MockBackend {
        async fn list_cities(&self) -> Result<Vec<String>, ServiceError> {
            debug!("MockBackend::list_cities: called");
            self.city_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_cities.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            Ok(self.cities.lock().unwrap().clone())
        }
    }

    #[async_trait]
    impl PlaceSearch for MockBackend {
        async fn search(&self, city: &str, query: &str) -> Result<Vec<String>, ServiceError> {
            debug!(%city, %query, "MockBackend::search: called");
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gates.lock().unwrap().remove(query);
            if let Some(gate) = gate {
                debug!(%query, "MockBackend::search: waiting on gate");
                let _ = gate.await;
            }
            if self.fail_places.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            Ok(self
                .places
                .lock()
                .unwrap()
                .get(&(city.to_string(), query.to_string()))
                .cloned()
                .unwrap_or_default())
        }
    }

    #[async_trait]
    impl TripStore for MockBackend {
        async fn list_trips(&self, user_id: &str) -> Result<Vec<Trip>, ServiceError> {
            debug!(%user_id, "MockBackend::list_trips: called");
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            Ok(self
                .trips
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.user_id.as_deref().is_none_or(|owner| owner == user_id))
                .cloned()
                .collect())
        }

        async fn create_trip(&self, payload: &TripPayload) -> Result<(), ServiceError> {
            debug!(city = %payload.city, "MockBackend::create_trip: called");
            self.mutation_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let trip = payload.clone().into_trip(TripId::new(format!("trip-{}", id)));
            self.trips.lock().unwrap().push(trip);
            Ok(())
        }

        async fn update_trip(&self, id: &TripId, payload: &TripPayload) -> Result<(), ServiceError> {
            debug!(%id, "MockBackend::update_trip: called");
            self.mutation_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            let mut trips = self.trips.lock().unwrap();
            match trips.iter_mut().find(|t| &t.id == id) {
                Some(trip) => {
                    *trip = payload.clone().into_trip(id.clone());
                    Ok(())
                }
                None => Err(ServiceError::ApiError {
                    status: 404,
                    message: format!("trip {} not found", id),
                }),
            }
        }

        async fn delete_trip(&self, id: &TripId) -> Result<(), ServiceError> {
            debug!(%id, "MockBackend::delete_trip: called");
            self.mutation_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            let mut trips = self.trips.lock().unwrap();
            let before = trips.len();
            trips.retain(|t| &t.id != id);
            if trips.len() == before {
                return Err(ServiceError::ApiError {
                    status: 404,
                    message: format!("trip {} not found", id),
                });
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn payload(city: &str) -> TripPayload {
            TripPayload {
                user_id: "u1".to_string(),
                city: city.to_string(),
                start_date: "2024-05-01".to_string(),
                end_date: "2024-05-05".to_string(),
                places: vec![],
            }
        }

        #[tokio::test]
        async fn test_mock_store_assigns_ids() {
            let backend = MockBackend::new();
            backend.create_trip(&payload("Paris")).await.unwrap();
            backend.create_trip(&payload("Rome")).await.unwrap();

            let trips = backend.list_trips("u1").await.unwrap();
            assert_eq!(trips.len(), 2);
            assert_eq!(trips[0].id.as_str(), "trip-1");
            assert_eq!(trips[1].id.as_str(), "trip-2");
        }

        #[tokio::test]
        async fn test_mock_fail_switch() {
            let backend = MockBackend::new();
            backend.set_fail_mutations(true);
            assert!(backend.create_trip(&payload("Paris")).await.is_err());
            assert!(backend.stored_trips().is_empty());
            assert_eq!(backend.mutation_count(), 1);
        }

        #[tokio::test]
        async fn test_mock_delete_unknown_is_404() {
            let backend = MockBackend::new();
            let err = backend.delete_trip(&TripId::new("nope")).await.unwrap_err();
            assert_eq!(err.status(), Some(404));
        }
    }
}
