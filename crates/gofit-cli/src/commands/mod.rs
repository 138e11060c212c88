//! Command handlers

pub mod activity;
pub mod config;
pub mod exercise;
pub mod profile;
pub mod schedule;
pub mod status;
pub mod workout;

use std::io::{self, IsTerminal, Write};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use gofit_core::models::Record;
use gofit_core::WorkoutData;

/// Resolve a full id or unique id prefix to a record id
pub fn resolve_id<T: Record>(items: &[T], id: &str, kind: &str) -> Result<String> {
    if let Some(exact) = items.iter().find(|item| item.id() == id) {
        return Ok(exact.id().to_string());
    }

    let matches = WorkoutData::find_by_prefix(items, id);
    match matches.len() {
        0 => bail!("No {} found matching: {}", kind, id),
        1 => Ok(matches[0].id().to_string()),
        _ => {
            eprintln!("Multiple {}s match '{}':", kind, id);
            for item in &matches {
                eprintln!("  {}", item.id());
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// Parse a `YYYY-MM-DD` date argument
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}'. Use YYYY-MM-DD.", value))
}

/// Parse a value that may be cleared with an empty string or "none"
pub fn clearable(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

/// Ask a yes/no question; non-interactive stdin answers no
pub fn confirm(prompt: &str) -> Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gofit_core::Workout;

    fn workout(id: &str) -> Workout {
        Workout {
            id: id.to_string(),
            ..Workout::new("Test", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        }
    }

    #[test]
    fn test_resolve_id() {
        let workouts = vec![workout("1710000000001"), workout("1710000000002"), workout("17")];

        assert_eq!(
            resolve_id(&workouts, "1710000000002", "workout").unwrap(),
            "1710000000002"
        );
        // Exact match wins over prefix ambiguity
        assert_eq!(resolve_id(&workouts, "17", "workout").unwrap(), "17");
        assert!(resolve_id(&workouts, "171", "workout").is_err());
        assert!(resolve_id(&workouts, "9", "workout").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert!(parse_date("15/03/2024").is_err());
    }

    #[test]
    fn test_clearable() {
        assert_eq!(clearable("none"), None);
        assert_eq!(clearable(""), None);
        assert_eq!(clearable("tempo"), Some("tempo".to_string()));
    }
}
