//! TripPlanner - trip planning form
//!
//! CLI entry point: interactive form by default, plus one-shot listing
//! commands.

use std::fs;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use tripplanner::cli::{Cli, Command, get_log_path};
use tripplanner::config::Config;
use tripplanner::form::TripFormController;
use tripplanner::repl;
use tripplanner::services::create_services;

fn parse_level(level_str: Option<&str>) -> tracing::Level {
    match level_str.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = parse_level(cli_log_level.or(config_log_level));

    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // A read-only home should not stop the form from working
    if let Err(e) = setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    info!(user_id = %config.user_id, "TripPlanner loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Trips) => cmd_trips(&config).await,
        Some(Command::Cities) => cmd_cities(&config).await,
        Some(Command::Config) => cmd_config(&config),
        Some(Command::Repl) | None => repl::run_interactive(&config).await,
    }
}

fn controller(config: &Config) -> Result<TripFormController> {
    let services = create_services(&config.services).context("Failed to create service clients")?;
    Ok(TripFormController::new(
        config.user_id.to_string(),
        &services,
        &config.suggestions,
    ))
}

async fn cmd_trips(config: &Config) -> Result<()> {
    debug!("cmd_trips: called");
    let mut form = controller(config)?;
    form.refresh_collection().await.context("Failed to fetch trips")?;

    let trips = form.collection().trips();
    if trips.is_empty() {
        println!("{}", "No trips planned yet.".dimmed());
    }
    for trip in trips {
        println!(
            "{:<12} {:<16} {} → {}  {}",
            trip.id.to_string().dimmed(),
            trip.city.bold(),
            trip.start_date,
            trip.end_date,
            trip.places.join(", ")
        );
    }
    Ok(())
}

async fn cmd_cities(config: &Config) -> Result<()> {
    debug!("cmd_cities: called");
    let mut form = controller(config)?;
    form.load_city_options().await.context("Failed to fetch cities")?;

    for city in form.city_options() {
        println!("{}", city);
    }
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
    print!("{}", yaml);
    Ok(())
}
