//! Completion ledger commands.

use super::{date_or_today, print_json, CommandResult};
use chrono::NaiveDate;
use habitflow_core::{CompletionLedger, SqliteCompletionRepository, SqliteHabitRepository};
use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

pub type SqliteLedger<'conn> =
    CompletionLedger<SqliteHabitRepository<'conn>, SqliteCompletionRepository<'conn>>;

pub fn open_ledger(conn: &Connection) -> Result<SqliteLedger<'_>, Box<dyn std::error::Error>> {
    Ok(CompletionLedger::new(
        SqliteHabitRepository::try_new(conn)?,
        SqliteCompletionRepository::try_new(conn)?,
    ))
}

pub fn mark(conn: &Connection, habit_id: Uuid, date: Option<NaiveDate>) -> CommandResult {
    let completion = open_ledger(conn)?.mark_completed(habit_id, date_or_today(date))?;
    print_json(&completion)
}

pub fn unmark(conn: &Connection, habit_id: Uuid, date: Option<NaiveDate>) -> CommandResult {
    let date = date_or_today(date);
    open_ledger(conn)?.unmark_completed(habit_id, date)?;
    print_json(&json!({ "habitId": habit_id, "date": date, "unmarked": true }))
}

/// Full history, or the inclusive `(from, to)` window when given.
pub fn list(conn: &Connection, habit_id: Uuid, range: Option<(NaiveDate, NaiveDate)>) -> CommandResult {
    let ledger = open_ledger(conn)?;
    let completions = match range {
        Some((from, to)) => ledger.list_completions_between(habit_id, from, to)?,
        None => ledger.list_completions(habit_id)?,
    };
    print_json(&completions)
}
