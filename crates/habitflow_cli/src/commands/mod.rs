//! Subcommand handlers and shared output helpers.

pub mod completion;
pub mod habit;
pub mod stats;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::error::Error;

pub type CommandResult = Result<(), Box<dyn Error>>;

/// Falls back to the local calendar date when `date` is omitted.
pub fn date_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
