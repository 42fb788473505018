//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// TripPlanner - plan trips against the city, place and trip services
#[derive(Parser)]
#[command(
    name = "tp",
    about = "Plan trips: pick a city, dates and places, then save them",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive trip form (default)
    Repl,

    /// List your trips
    Trips,

    /// List the cities you can plan trips to
    Cities,

    /// Print the effective configuration
    Config,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripplanner")
        .join("logs")
        .join("tripplanner.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tp", "trips", "--log-level", "debug", "-c", "x.yml"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Trips)));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.config, Some(PathBuf::from("x.yml")));
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["tp"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_log_path_ends_with_file_name() {
        assert!(get_log_path().ends_with("tripplanner/logs/tripplanner.log"));
    }
}
