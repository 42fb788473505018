//! FormHandle - actor that owns the TripFormController
//!
//! All intents go through one channel and are applied one at a time, so the
//! draft is never touched from two places at once. Place lookups run on
//! their own tasks and report back through a second channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info};

use super::messages::{FormCommand, FormEvent};
use super::{FormError, FormResult, FormSnapshot, TripFormController};
use crate::domain::{Trip, TripId};
use crate::suggest::{LookupOutcome, SuggestionResult};

/// Handle to send intents to the form actor
#[derive(Clone)]
pub struct FormHandle {
    tx: mpsc::Sender<FormCommand>,
    /// Broadcast sender for suggestion updates
    event_tx: broadcast::Sender<FormEvent>,
    /// Set while a submit is on its way to the actor or being processed
    submit_pending: Arc<AtomicBool>,
}

/// Clears the pending flag however the submit call ends
struct PendingGuard(Arc<AtomicBool>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl FormHandle {
    /// Spawn the actor task around `controller`
    pub fn spawn(controller: TripFormController) -> Self {
        debug!("FormHandle::spawn: called");
        let (tx, rx) = mpsc::channel(64);
        let (event_tx, _) = broadcast::channel(64);

        tokio::spawn(actor_loop(controller, rx, event_tx.clone()));
        info!("Form actor spawned");

        Self {
            tx,
            event_tx,
            submit_pending: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribe to suggestion updates
    pub fn subscribe_events(&self) -> broadcast::Receiver<FormEvent> {
        self.event_tx.subscribe()
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> FormCommand) -> FormResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send(build(reply_tx)).await.map_err(|_| FormError::Closed)?;
        reply_rx.await.map_err(|_| FormError::Closed)
    }

    pub async fn set_city(&self, city: impl Into<String>) -> FormResult<()> {
        let city = city.into();
        debug!(%city, "set_city: called");
        self.request(|reply| FormCommand::SetCity { city, reply }).await
    }

    pub async fn set_start_date(&self, date: impl Into<String>) -> FormResult<()> {
        let date = date.into();
        debug!(%date, "set_start_date: called");
        self.request(|reply| FormCommand::SetStartDate { date, reply }).await
    }

    pub async fn set_end_date(&self, date: impl Into<String>) -> FormResult<()> {
        let date = date.into();
        debug!(%date, "set_end_date: called");
        self.request(|reply| FormCommand::SetEndDate { date, reply }).await
    }

    /// Update the search text; the lookup runs in the background
    ///
    /// Returns the generation of the issued lookup so callers can match the
    /// [`FormEvent`] that reports it.
    pub async fn set_place_query(&self, text: impl Into<String>) -> FormResult<Option<u64>> {
        let text = text.into();
        debug!(%text, "set_place_query: called");
        self.request(|reply| FormCommand::SetPlaceQuery { text, reply }).await
    }

    pub async fn pick_suggestion(&self, place: impl Into<String>) -> FormResult<()> {
        let place = place.into();
        debug!(%place, "pick_suggestion: called");
        self.request(|reply| FormCommand::PickSuggestion { place, reply }).await
    }

    pub async fn remove_place(&self, place: impl Into<String>) -> FormResult<bool> {
        let place = place.into();
        debug!(%place, "remove_place: called");
        self.request(|reply| FormCommand::RemovePlace { place, reply }).await
    }

    /// Submit the draft; refused while another submit is pending
    pub async fn submit(&self) -> FormResult<()> {
        debug!("submit: called");
        if self.submit_pending.swap(true, Ordering::SeqCst) {
            debug!("submit: already pending, refusing");
            return Err(FormError::SubmitInFlight);
        }
        let _guard = PendingGuard(self.submit_pending.clone());
        self.request(|reply| FormCommand::Submit { reply }).await?
    }

    pub fn is_submitting(&self) -> bool {
        self.submit_pending.load(Ordering::SeqCst)
    }

    pub async fn request_edit(&self, trip: Trip) -> FormResult<()> {
        debug!(trip_id = %trip.id, "request_edit: called");
        self.request(|reply| FormCommand::RequestEdit {
            trip: Box::new(trip),
            reply,
        })
        .await
    }

    pub async fn request_delete(&self, id: TripId) -> FormResult<()> {
        debug!(%id, "request_delete: called");
        self.request(|reply| FormCommand::RequestDelete { id, reply }).await?
    }

    pub async fn refresh_collection(&self) -> FormResult<()> {
        debug!("refresh_collection: called");
        self.request(|reply| FormCommand::Refresh { reply }).await?
    }

    pub async fn load_city_options(&self) -> FormResult<()> {
        debug!("load_city_options: called");
        self.request(|reply| FormCommand::LoadCities { reply }).await?
    }

    pub async fn startup(&self) -> FormResult<Vec<FormError>> {
        debug!("startup: called");
        self.request(|reply| FormCommand::Startup { reply }).await
    }

    pub async fn snapshot(&self) -> FormResult<FormSnapshot> {
        self.request(|reply| FormCommand::Snapshot { reply }).await
    }

    pub async fn shutdown(&self) {
        debug!("shutdown: called");
        let _ = self.tx.send(FormCommand::Shutdown).await;
    }
}

/// The actor loop that processes commands
async fn actor_loop(
    mut controller: TripFormController,
    mut rx: mpsc::Receiver<FormCommand>,
    event_tx: broadcast::Sender<FormEvent>,
) {
    info!("Form actor started");
    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<SuggestionResult>();

    loop {
        tokio::select! {
            cmd = rx.recv() => {
                let Some(cmd) = cmd else {
                    debug!("actor_loop: all handles dropped");
                    break;
                };
                if !handle_command(&mut controller, cmd, &result_tx).await {
                    break;
                }
            }
            Some(result) = result_rx.recv() => {
                apply_lookup(&mut controller, result, &event_tx);
            }
        }
    }

    info!("Form actor stopped");
}

/// Returns false when the actor should stop
async fn handle_command(
    controller: &mut TripFormController,
    cmd: FormCommand,
    result_tx: &mpsc::UnboundedSender<SuggestionResult>,
) -> bool {
    match cmd {
        FormCommand::SetCity { city, reply } => {
            controller.set_city(city);
            let _ = reply.send(());
        }
        FormCommand::SetStartDate { date, reply } => {
            controller.set_start_date(date);
            let _ = reply.send(());
        }
        FormCommand::SetEndDate { date, reply } => {
            controller.set_end_date(date);
            let _ = reply.send(());
        }
        FormCommand::SetPlaceQuery { text, reply } => {
            let generation = match controller.begin_place_query(text) {
                Some(query) => {
                    let generation = query.generation();
                    let result_tx = result_tx.clone();
                    tokio::spawn(async move {
                        let _ = result_tx.send(query.run().await);
                    });
                    Some(generation)
                }
                None => None,
            };
            let _ = reply.send(generation);
        }
        FormCommand::PickSuggestion { place, reply } => {
            controller.pick_suggestion(place);
            let _ = reply.send(());
        }
        FormCommand::RemovePlace { place, reply } => {
            let _ = reply.send(controller.remove_place(&place));
        }
        FormCommand::Submit { reply } => {
            let _ = reply.send(controller.submit().await);
        }
        FormCommand::RequestEdit { trip, reply } => {
            controller.request_edit(&trip);
            let _ = reply.send(());
        }
        FormCommand::RequestDelete { id, reply } => {
            let _ = reply.send(controller.request_delete(&id).await);
        }
        FormCommand::Refresh { reply } => {
            let _ = reply.send(controller.refresh_collection().await);
        }
        FormCommand::LoadCities { reply } => {
            let _ = reply.send(controller.load_city_options().await);
        }
        FormCommand::Startup { reply } => {
            let _ = reply.send(controller.startup().await);
        }
        FormCommand::Snapshot { reply } => {
            let _ = reply.send(controller.snapshot());
        }
        FormCommand::Shutdown => {
            info!("Form actor shutting down");
            return false;
        }
    }
    true
}

fn apply_lookup(controller: &mut TripFormController, result: SuggestionResult, event_tx: &broadcast::Sender<FormEvent>) {
    let generation = result.generation;
    let superseded = matches!(result.outcome, LookupOutcome::Superseded);
    let event = match controller.apply_suggestions(result) {
        Ok(true) => FormEvent::SuggestionsApplied {
            generation,
            suggestions: controller.suggestions().to_vec(),
        },
        Ok(false) => {
            debug!(generation, superseded, "apply_lookup: dropped");
            FormEvent::SuggestionsDropped { generation }
        }
        Err(e) => FormEvent::SuggestionsFailed {
            generation,
            error: e.to_string(),
        },
    };
    // No subscribers is fine
    let _ = event_tx.send(event);
}
