//! Interactive REPL for TripPlanner
//!
//! A line-oriented front end for the trip form: each command is one user
//! intent (edit a field, search, pick, submit, edit or delete a trip).

mod intent;
mod session;

pub use intent::{Intent, parse_intent};
pub use session::ReplSession;

use eyre::{Context, Result};

use crate::config::Config;
use crate::form::{FormHandle, TripFormController};
use crate::services::create_services;

/// Run the interactive REPL
///
/// This is the main entry point for `tp repl`.
pub async fn run_interactive(config: &Config) -> Result<()> {
    let services = create_services(&config.services).context("Failed to create service clients")?;
    let controller = TripFormController::new(config.user_id.to_string(), &services, &config.suggestions);
    let form = FormHandle::spawn(controller);

    // Leave room for the debounce window on top of the request itself
    let lookup_wait = config.services.timeout() + config.suggestions.debounce();

    let mut session = ReplSession::new(form, lookup_wait, config.suggestions.min_query_len);
    session.run().await
}
