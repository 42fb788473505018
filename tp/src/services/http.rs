//! HTTP implementation of the collaborator traits
//!
//! One reqwest client shared by the city catalog, place search and trip
//! storage endpoints. Idempotent requests are retried on transient errors;
//! creating a trip is never retried so a lost response cannot duplicate it.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CityCatalog, PlaceSearch, ServiceError, TripStore};
use crate::config::ServicesConfig;
use crate::domain::{Trip, TripId, TripPayload};

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 200;

/// Longest single wait between retries
const MAX_BACKOFF_MS: u64 = 10_000;

/// Exponential backoff before retry `attempt` (1-based), capped
fn backoff_ms(attempt: u32) -> u64 {
    let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    INITIAL_BACKOFF_MS.saturating_mul(factor).min(MAX_BACKOFF_MS)
}

/// reqwest-backed client for all three collaborators
pub struct HttpServices {
    http: Client,
    cities_url: Url,
    places_url: Url,
    trips_url: Url,
    timeout: Duration,
    max_retries: u32,
}

impl HttpServices {
    /// Create a new client from configuration
    pub fn from_config(config: &ServicesConfig) -> Result<Self, ServiceError> {
        debug!(?config, "from_config: called");
        let timeout = config.timeout();
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tripplanner/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ServiceError::Network)?;

        Ok(Self {
            http,
            cities_url: parse_base(&config.cities_url)?,
            places_url: parse_base(&config.places_url)?,
            trips_url: parse_base(&config.trips_url)?,
            timeout,
            max_retries: config.max_retries,
        })
    }

    /// Send a request, retrying transient failures up to `retries` times
    async fn send(&self, op: &str, retries: u32, build: impl Fn() -> RequestBuilder) -> Result<Response, ServiceError> {
        debug!(%op, retries, "send: called");
        let mut last_error = None;
        for attempt in 0..=retries {
            if attempt > 0 {
                let backoff = backoff_ms(attempt);
                warn!(%op, attempt, backoff_ms = backoff, "send: retrying after transient error");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let result = match build().send().await {
                Ok(response) => check_status(response).await,
                Err(e) if e.is_timeout() => Err(ServiceError::Timeout(self.timeout)),
                Err(e) => Err(ServiceError::Network(e)),
            };

            match result {
                Ok(response) => {
                    debug!(%op, attempt, "send: success");
                    return Ok(response);
                }
                Err(e) if e.is_retryable() => {
                    debug!(%op, attempt, error = %e, "send: retryable error");
                    last_error = Some(e);
                }
                Err(e) => {
                    debug!(%op, error = %e, "send: permanent error");
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ServiceError::InvalidResponse("Max retries exceeded".to_string())))
    }
}

#[async_trait]
impl CityCatalog for HttpServices {
    async fn list_cities(&self) -> Result<Vec<String>, ServiceError> {
        debug!("list_cities: called");
        let url = endpoint(&self.cities_url, &["cities"])?;
        let response = self
            .send("list_cities", self.max_retries, || self.http.get(url.clone()))
            .await?;
        read_json("list_cities", response).await
    }
}

#[async_trait]
impl PlaceSearch for HttpServices {
    async fn search(&self, city: &str, query: &str) -> Result<Vec<String>, ServiceError> {
        debug!(%city, %query, "search: called");
        let url = endpoint(&self.places_url, &["places"])?;
        // Suggestions go stale quickly; a retry would rarely be applied
        let response = self
            .send("search", 0, || {
                self.http.get(url.clone()).query(&[("city", city), ("query", query)])
            })
            .await?;
        read_json("search", response).await
    }
}

#[async_trait]
impl TripStore for HttpServices {
    async fn list_trips(&self, user_id: &str) -> Result<Vec<Trip>, ServiceError> {
        debug!(%user_id, "list_trips: called");
        let url = endpoint(&self.trips_url, &["trips", user_id])?;
        let response = self
            .send("list_trips", self.max_retries, || self.http.get(url.clone()))
            .await?;
        read_json("list_trips", response).await
    }

    async fn create_trip(&self, payload: &TripPayload) -> Result<(), ServiceError> {
        debug!(city = %payload.city, places = payload.places.len(), "create_trip: called");
        let url = endpoint(&self.trips_url, &["trips"])?;
        self.send("create_trip", 0, || self.http.post(url.clone()).json(payload))
            .await?;
        Ok(())
    }

    async fn update_trip(&self, id: &TripId, payload: &TripPayload) -> Result<(), ServiceError> {
        debug!(%id, city = %payload.city, "update_trip: called");
        let url = endpoint(&self.trips_url, &["trips", id.as_str()])?;
        self.send("update_trip", self.max_retries, || self.http.put(url.clone()).json(payload))
            .await?;
        Ok(())
    }

    async fn delete_trip(&self, id: &TripId) -> Result<(), ServiceError> {
        debug!(%id, "delete_trip: called");
        let url = endpoint(&self.trips_url, &["trips", id.as_str()])?;
        self.send("delete_trip", self.max_retries, || self.http.delete(url.clone()))
            .await?;
        Ok(())
    }
}

/// Turn a non-2xx response into an `ApiError` carrying the body text
async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), "check_status: API error");
    Err(ServiceError::ApiError {
        status: status.as_u16(),
        message,
    })
}

/// Read a success body and decode it; a malformed body is not retried
async fn read_json<T: DeserializeOwned>(op: &str, response: Response) -> Result<T, ServiceError> {
    let body = response.text().await.map_err(ServiceError::Network)?;
    decode_body(op, &body)
}

fn decode_body<T: DeserializeOwned>(op: &str, body: &str) -> Result<T, ServiceError> {
    serde_json::from_str(body).map_err(|e| {
        warn!(%op, error = %e, "Response body did not decode");
        ServiceError::Json(e)
    })
}

fn parse_base(base: &str) -> Result<Url, ServiceError> {
    let url = Url::parse(base).map_err(|e| ServiceError::InvalidUrl(format!("{}: {}", base, e)))?;
    if url.cannot_be_a_base() {
        return Err(ServiceError::InvalidUrl(format!("{}: cannot be a base URL", base)));
    }
    Ok(url)
}

/// Append path segments to a base URL, escaping each one
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ServiceError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ServiceError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
