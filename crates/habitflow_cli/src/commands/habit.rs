//! Habit catalogue commands.

use super::{date_or_today, print_json, CommandResult};
use chrono::{NaiveDate, NaiveTime};
use clap::Subcommand;
use habitflow_core::{Category, HabitPatch, HabitService, NewHabit, SqliteHabitRepository};
use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

#[derive(Subcommand, Debug)]
pub enum HabitAction {
    /// Create a habit
    Add {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        title: String,
        /// daily, weekly or custom
        #[arg(long)]
        frequency: String,
        /// Comma-separated weekdays, Sunday = 0
        #[arg(long, value_delimiter = ',')]
        days: Vec<u8>,
        /// Category (default: personal)
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Reminder time, HH:MM
        #[arg(long, value_parser = parse_reminder)]
        reminder: Option<NaiveTime>,
        #[arg(long)]
        target_count: Option<u32>,
    },
    /// Change selected fields of a habit
    Edit {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        frequency: Option<String>,
        #[arg(long, value_delimiter = ',')]
        days: Option<Vec<u8>>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_reminder)]
        reminder: Option<NaiveTime>,
        #[arg(long)]
        target_count: Option<u32>,
    },
    /// Show one habit
    Show { id: Uuid },
    /// List habits of an owner
    List {
        #[arg(long)]
        owner: String,
        /// Only active habits
        #[arg(long)]
        active: bool,
        #[arg(long)]
        category: Option<String>,
    },
    /// Active habits due on a date (default: today)
    Due {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Flip the active flag
    Toggle { id: Uuid },
    /// Delete a habit and its completions
    Delete { id: Uuid },
}

pub fn run(conn: &Connection, action: HabitAction) -> CommandResult {
    let service = HabitService::new(SqliteHabitRepository::try_new(conn)?);

    match action {
        HabitAction::Add {
            owner,
            title,
            frequency,
            days,
            category,
            description,
            reminder,
            target_count,
        } => {
            let request = NewHabit {
                title,
                description,
                frequency,
                target_days: days,
                category,
                reminder_time: reminder,
                target_count,
            };
            let habit = service.create_habit(&owner, &request)?;
            print_json(&habit)?;
        }
        HabitAction::Edit {
            id,
            title,
            frequency,
            days,
            category,
            description,
            reminder,
            target_count,
        } => {
            let patch = HabitPatch {
                title,
                description,
                frequency,
                target_days: days,
                category,
                reminder_time: reminder,
                target_count,
            };
            let habit = service.update_habit(id, &patch)?;
            print_json(&habit)?;
        }
        HabitAction::Show { id } => {
            print_json(&service.get_habit(id)?)?;
        }
        HabitAction::List {
            owner,
            active,
            category,
        } => {
            let mut habits = match category {
                Some(value) => {
                    let category: Category = value.parse()?;
                    service.list_habits_by_category(&owner, category)?
                }
                None => service.list_habits(&owner)?,
            };
            if active {
                habits.retain(|habit| habit.is_active);
            }
            print_json(&habits)?;
        }
        HabitAction::Due { owner, date } => {
            let date = date_or_today(date);
            print_json(&service.habits_due_on(&owner, date)?)?;
        }
        HabitAction::Toggle { id } => {
            print_json(&service.toggle_active(id)?)?;
        }
        HabitAction::Delete { id } => {
            service.delete_habit(id)?;
            print_json(&json!({ "deleted": id }))?;
        }
    }
    Ok(())
}

fn parse_reminder(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| format!("expected HH:MM, got `{value}`"))
}
