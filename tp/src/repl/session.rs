//! REPL session management

use std::time::Duration;

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::broadcast;
use tracing::debug;

use super::intent::{Intent, parse_intent};
use crate::domain::{Trip, TripId};
use crate::form::{FormError, FormEvent, FormHandle, FormSnapshot};

/// Interactive trip planning session
pub struct ReplSession {
    form: FormHandle,
    events: broadcast::Receiver<FormEvent>,
    /// How long to wait for a place lookup before giving up on showing it
    lookup_wait: Duration,
    min_query_len: usize,
}

enum Flow {
    Continue,
    Quit,
}

impl ReplSession {
    pub fn new(form: FormHandle, lookup_wait: Duration, min_query_len: usize) -> Self {
        let events = form.subscribe_events();
        Self {
            form,
            events,
            lookup_wait,
            min_query_len,
        }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        for err in self.form.startup().await? {
            print_form_error(&err);
        }

        // Create readline editor for proper line editing
        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let prompt = self.prompt().await?;
            match rl.readline(&prompt) {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    let intent = match parse_intent(input) {
                        Ok(intent) => intent,
                        Err(msg) => {
                            println!("{} {}", "?".yellow(), msg);
                            continue;
                        }
                    };

                    match self.dispatch(intent).await {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Quit) => break,
                        Err(e) => print_form_error(&e),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - just show new prompt
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D - exit
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        self.form.shutdown().await;
        println!("Goodbye!");
        Ok(())
    }

    async fn prompt(&self) -> Result<String> {
        let snapshot = self.form.snapshot().await?;
        let mode = match snapshot.draft.mode.editing_id() {
            Some(id) => format!("edit {}", id).yellow(),
            None => "new".bright_green(),
        };
        Ok(format!("[{}] {} ", mode, ">".bright_green()))
    }

    async fn dispatch(&mut self, intent: Intent) -> Result<Flow, FormError> {
        debug!(?intent, "dispatch: called");
        match intent {
            Intent::City(city) => {
                let snapshot = self.form.snapshot().await?;
                match resolve_city(&city, &snapshot.city_options) {
                    Ok(city) => self.form.set_city(city).await?,
                    Err(msg) => println!("{} {}", "?".yellow(), msg),
                }
            }
            Intent::StartDate(date) => self.form.set_start_date(date).await?,
            Intent::EndDate(date) => self.form.set_end_date(date).await?,
            Intent::Search(text) => self.search(text).await?,
            Intent::Pick(arg) => {
                let snapshot = self.form.snapshot().await?;
                let place = resolve_pick(&arg, &snapshot.suggestions);
                self.form.pick_suggestion(place).await?;
                self.show_draft().await?;
            }
            Intent::Remove(place) => {
                if !self.form.remove_place(place.as_str()).await? {
                    println!("{}", format!("'{}' is not selected", place).dimmed());
                }
            }
            Intent::Submit => {
                self.form.submit().await?;
                println!("{}", "Trip saved.".bright_green());
                self.show_trips().await?;
            }
            Intent::Edit(id) => {
                let snapshot = self.form.snapshot().await?;
                match find_trip(&snapshot.trips, &id) {
                    Some(trip) => {
                        self.form.request_edit(trip.clone()).await?;
                        self.show_draft().await?;
                    }
                    None => println!("{} No trip with id {}", "?".yellow(), id),
                }
            }
            Intent::Delete(id) => {
                self.form.request_delete(TripId::new(id)).await?;
                println!("{}", "Trip deleted.".bright_green());
                self.show_trips().await?;
            }
            Intent::Trips => self.show_trips().await?,
            Intent::Cities => {
                let snapshot = self.form.snapshot().await?;
                if snapshot.city_options.is_empty() {
                    println!("{}", "No cities available.".dimmed());
                }
                for city in &snapshot.city_options {
                    println!("  {}", city);
                }
            }
            Intent::Show => self.show_draft().await?,
            Intent::Refresh => {
                let (trips, cities) = tokio::join!(self.form.refresh_collection(), self.form.load_city_options());
                trips?;
                cities?;
                self.show_trips().await?;
            }
            Intent::Help => print_help(),
            Intent::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Update the query and wait briefly for its suggestions
    async fn search(&mut self, text: String) -> Result<(), FormError> {
        let Some(generation) = self.form.set_place_query(text).await? else {
            println!("{}", short_query_hint(self.min_query_len).dimmed());
            return Ok(());
        };

        let deadline = tokio::time::Instant::now() + self.lookup_wait;
        loop {
            match tokio::time::timeout_at(deadline, self.events.recv()).await {
                Ok(Ok(event)) if event.generation() < generation => continue,
                Ok(Ok(FormEvent::SuggestionsApplied { suggestions, .. })) => {
                    print!("{}", render_suggestions(&suggestions));
                    return Ok(());
                }
                Ok(Ok(FormEvent::SuggestionsFailed { error, .. })) => {
                    debug!(%error, "search: lookup failed");
                    println!("{}", "No suggestions (place search unavailable).".dimmed());
                    return Ok(());
                }
                Ok(Ok(FormEvent::SuggestionsDropped { .. })) => return Ok(()),
                Ok(Err(broadcast::error::RecvError::Lagged(_))) => continue,
                Ok(Err(broadcast::error::RecvError::Closed)) => return Err(FormError::Closed),
                Err(_) => {
                    println!("{}", "Still searching...".dimmed());
                    return Ok(());
                }
            }
        }
    }

    async fn show_draft(&self) -> Result<(), FormError> {
        let snapshot = self.form.snapshot().await?;
        print!("{}", render_draft(&snapshot));
        Ok(())
    }

    async fn show_trips(&self) -> Result<(), FormError> {
        let snapshot = self.form.snapshot().await?;
        print!("{}", render_trips(&snapshot.trips));
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Trip Planner".bright_cyan().bold());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }
}

fn print_form_error(err: &FormError) {
    match err {
        FormError::IncompleteDraft(_) | FormError::SubmitInFlight => println!("{} {}", "!".yellow(), err),
        _ => println!("{} {}", "!".red(), err.to_string().dimmed()),
    }
}

fn print_help() {
    println!();
    println!("{}", "Draft:".bright_cyan());
    println!("  {:22} Set the city", "city <name>".yellow());
    println!("  {:22} Set the start date", "start <YYYY-MM-DD>".yellow());
    println!("  {:22} Set the end date", "end <YYYY-MM-DD>".yellow());
    println!("  {:22} Search places in the city", "search <text>".yellow());
    println!("  {:22} Add a place (name or suggestion number)", "pick <place|n>".yellow());
    println!("  {:22} Remove a selected place", "remove <place>".yellow());
    println!("  {:22} Show the draft", "show".yellow());
    println!("  {:22} Create or update the trip", "submit".yellow());
    println!();
    println!("{}", "Trips:".bright_cyan());
    println!("  {:22} List your trips", "trips".yellow());
    println!("  {:22} Load a trip into the draft", "edit <trip-id>".yellow());
    println!("  {:22} Delete a trip", "delete <trip-id>".yellow());
    println!("  {:22} List available cities", "cities".yellow());
    println!("  {:22} Re-fetch trips and cities", "refresh".yellow());
    println!("  {:22} Exit", "/quit".yellow());
    println!();
}

/// Match against the catalog case-insensitively; free text when it is empty
fn resolve_city(input: &str, options: &[String]) -> Result<String, String> {
    if input.is_empty() || options.is_empty() {
        return Ok(input.to_string());
    }
    options
        .iter()
        .find(|c| c.eq_ignore_ascii_case(input) || c.to_lowercase() == input.to_lowercase())
        .cloned()
        .ok_or_else(|| format!("Unknown city '{}'. Try 'cities'.", input))
}

/// A number picks from the visible suggestions (1-based), anything else is a name
fn resolve_pick(arg: &str, suggestions: &[String]) -> String {
    arg.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| suggestions.get(i))
        .cloned()
        .unwrap_or_else(|| arg.to_string())
}

fn find_trip<'a>(trips: &'a [Trip], id: &str) -> Option<&'a Trip> {
    trips.iter().find(|t| t.id.as_str() == id)
}

fn render_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        return format!("{}\n", "No matching places.".dimmed());
    }
    suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| format!("  {:>2}. {}\n", i + 1, s))
        .collect()
}

fn render_draft(snapshot: &FormSnapshot) -> String {
    let draft = &snapshot.draft;
    let or_unset = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };

    let mut out = String::new();
    out.push_str(&format!("{:>8}: {}\n", "mode", draft.mode));
    out.push_str(&format!("{:>8}: {}\n", "city", or_unset(&draft.city)));
    out.push_str(&format!(
        "{:>8}: {} → {}\n",
        "dates",
        or_unset(&draft.start_date),
        or_unset(&draft.end_date)
    ));
    if !draft.place_query.is_empty() {
        out.push_str(&format!("{:>8}: {}\n", "search", draft.place_query));
    }
    let places = draft.places.iter().collect::<Vec<_>>().join(", ");
    out.push_str(&format!("{:>8}: {}\n", "places", or_unset(&places)));
    out
}

fn short_query_hint(min_query_len: usize) -> String {
    let unit = if min_query_len == 1 { "character" } else { "characters" };
    format!("Pick a city and type at least {} {} to search.", min_query_len, unit)
}

fn render_trips(trips: &[Trip]) -> String {
    if trips.is_empty() {
        return format!("{}\n", "No trips planned yet.".dimmed());
    }
    trips
        .iter()
        .map(|t| {
            let places = if t.places.is_empty() {
                String::new()
            } else {
                format!(" [{}]", t.places.join(", "))
            };
            format!("  {} {} {} → {}{}\n", t.id, t.city.bold(), t.start_date, t.end_date, places)
        })
        .collect()
}
