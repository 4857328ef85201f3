//! Streak statistics command.

use super::completion::open_ledger;
use super::{date_or_today, print_json, CommandResult};
use chrono::NaiveDate;
use habitflow_core::{HabitStats, StatsService};
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsReport {
    habit_id: Uuid,
    today: NaiveDate,
    #[serde(flatten)]
    stats: HabitStats,
}

pub fn run(conn: &Connection, habit_id: Uuid, today: Option<NaiveDate>) -> CommandResult {
    let today = date_or_today(today);
    let stats = StatsService::new(open_ledger(conn)?).get_stats(habit_id, today)?;
    print_json(&StatsReport {
        habit_id,
        today,
        stats,
    })
}
