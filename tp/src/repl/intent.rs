//! REPL command parsing
//!
//! Turns one input line into an [`Intent`]. Date format checks live here,
//! in the input layer; the form itself accepts any text.

use chrono::NaiveDate;

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    City(String),
    StartDate(String),
    EndDate(String),
    Search(String),
    Pick(String),
    Remove(String),
    Submit,
    Edit(String),
    Delete(String),
    Trips,
    Cities,
    Show,
    Refresh,
    Help,
    Quit,
}

/// Parse an input line; Err carries a message for the user
pub fn parse_intent(line: &str) -> Result<Intent, String> {
    let line = line.trim();
    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };

    let intent = match cmd.trim_start_matches('/').to_lowercase().as_str() {
        "city" => Intent::City(arg.to_string()),
        "start" => Intent::StartDate(parse_date(arg)?),
        "end" => Intent::EndDate(parse_date(arg)?),
        "search" | "s" => Intent::Search(arg.to_string()),
        "pick" | "p" => Intent::Pick(required(arg, "pick <place|number>")?),
        "remove" | "rm" => Intent::Remove(required(arg, "remove <place>")?),
        "submit" | "save" => Intent::Submit,
        "edit" => Intent::Edit(required(arg, "edit <trip-id>")?),
        "delete" | "del" => Intent::Delete(required(arg, "delete <trip-id>")?),
        "trips" | "ls" => Intent::Trips,
        "cities" => Intent::Cities,
        "show" => Intent::Show,
        "refresh" => Intent::Refresh,
        "help" | "h" | "?" => Intent::Help,
        "quit" | "q" | "exit" => Intent::Quit,
        "" => return Err("Empty command".to_string()),
        other => return Err(format!("Unknown command: {}", other)),
    };
    Ok(intent)
}

fn required(arg: &str, usage: &str) -> Result<String, String> {
    if arg.is_empty() {
        return Err(format!("Usage: {}", usage));
    }
    Ok(arg.to_string())
}

/// Accept `YYYY-MM-DD` or an empty argument (clears the field)
fn parse_date(arg: &str) -> Result<String, String> {
    if arg.is_empty() {
        return Ok(String::new());
    }
    NaiveDate::parse_from_str(arg, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", arg))
}
