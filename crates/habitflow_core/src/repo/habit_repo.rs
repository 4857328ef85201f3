//! Habit repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over `habits` and `habit_target_days`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Habit::validate()` before SQL mutations.
//! - A habit row and its target-day rows are written in one transaction.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::habit::{Category, Frequency, Habit, HabitId, HabitValidationError};
use chrono::{DateTime, NaiveDate, NaiveTime};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const HABIT_SELECT_SQL: &str = "SELECT
    uuid,
    owner_id,
    title,
    description,
    frequency,
    category,
    reminder_time,
    target_count,
    is_active,
    created_at
FROM habits";

const REMINDER_TIME_FORMAT: &str = "%H:%M:%S";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for habit and completion persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(HabitValidationError),
    Db(DbError),
    HabitNotFound(HabitId),
    CompletionNotFound { habit_id: HabitId, date: NaiveDate },
    /// The store already holds a completion for this key.
    DuplicateCompletion { habit_id: HabitId, date: NaiveDate },
    /// Connection was not opened through `open_db`/`open_db_in_memory`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::CompletionNotFound { habit_id, date } => {
                write!(f, "no completion for habit {habit_id} on {date}")
            }
            Self::DuplicateCompletion { habit_id, date } => {
                write!(f, "habit {habit_id} already completed on {date}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted habit data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HabitValidationError> for RepoError {
    fn from(value: HabitValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Filter options for listing habits. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitListQuery {
    pub owner_id: Option<String>,
    pub is_active: Option<bool>,
    pub category: Option<Category>,
}

impl HabitListQuery {
    pub fn for_owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            ..Self::default()
        }
    }
}

/// Repository interface for habit CRUD operations.
pub trait HabitRepository {
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId>;
    /// Replaces every mutable field, including the target-day set.
    fn update_habit(&self, habit: &Habit) -> RepoResult<()>;
    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>>;
    /// Lists habits ordered by creation time, then id.
    fn list_habits(&self, query: &HabitListQuery) -> RepoResult<Vec<Habit>>;
    /// Hard-deletes a habit; its completions cascade.
    fn delete_habit(&self, id: HabitId) -> RepoResult<()>;
}

/// SQLite-backed habit repository.
#[derive(Clone, Copy)]
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId> {
        habit.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO habits (
                uuid,
                owner_id,
                title,
                description,
                frequency,
                category,
                reminder_time,
                target_count,
                is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                habit.id.to_string(),
                habit.owner_id.as_str(),
                habit.title.as_str(),
                habit.description.as_deref(),
                habit.frequency.as_str(),
                habit.category.as_str(),
                habit.reminder_time.map(reminder_time_to_db),
                habit.target_count.map(i64::from),
                bool_to_int(habit.is_active),
            ],
        )?;
        write_target_days(&tx, habit.id, &habit.target_days)?;
        tx.commit()?;

        Ok(habit.id)
    }

    fn update_habit(&self, habit: &Habit) -> RepoResult<()> {
        habit.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE habits
             SET
                owner_id = ?1,
                title = ?2,
                description = ?3,
                frequency = ?4,
                category = ?5,
                reminder_time = ?6,
                target_count = ?7,
                is_active = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?9;",
            params![
                habit.owner_id.as_str(),
                habit.title.as_str(),
                habit.description.as_deref(),
                habit.frequency.as_str(),
                habit.category.as_str(),
                habit.reminder_time.map(reminder_time_to_db),
                habit.target_count.map(i64::from),
                bool_to_int(habit.is_active),
                habit.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::HabitNotFound(habit.id));
        }

        tx.execute(
            "DELETE FROM habit_target_days WHERE habit_uuid = ?1;",
            [habit.id.to_string()],
        )?;
        write_target_days(&tx, habit.id, &habit.target_days)?;
        tx.commit()?;

        Ok(())
    }

    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HABIT_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_habit_row(self.conn, row)?));
        }

        Ok(None)
    }

    fn list_habits(&self, query: &HabitListQuery) -> RepoResult<Vec<Habit>> {
        let mut sql = format!("{HABIT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner_id) = query.owner_id.as_ref() {
            sql.push_str(" AND owner_id = ?");
            bind_values.push(Value::Text(owner_id.clone()));
        }

        if let Some(is_active) = query.is_active {
            sql.push_str(" AND is_active = ?");
            bind_values.push(Value::Integer(bool_to_int(is_active)));
        }

        if let Some(category) = query.category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.as_str().to_string()));
        }

        sql.push_str(" ORDER BY created_at ASC, uuid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut habits = Vec::new();

        while let Some(row) = rows.next()? {
            habits.push(parse_habit_row(self.conn, row)?);
        }

        Ok(habits)
    }

    fn delete_habit(&self, id: HabitId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM habits WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::HabitNotFound(id));
        }

        Ok(())
    }
}

fn write_target_days(conn: &Connection, habit_id: HabitId, days: &BTreeSet<u8>) -> RepoResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO habit_target_days (habit_uuid, day_of_week) VALUES (?1, ?2);",
    )?;
    for day in days {
        stmt.execute(params![habit_id.to_string(), i64::from(*day)])?;
    }
    Ok(())
}

fn load_target_days(conn: &Connection, habit_uuid: &str) -> RepoResult<BTreeSet<u8>> {
    let mut stmt = conn.prepare(
        "SELECT day_of_week
         FROM habit_target_days
         WHERE habit_uuid = ?1
         ORDER BY day_of_week ASC;",
    )?;
    let mut rows = stmt.query([habit_uuid])?;
    let mut days = BTreeSet::new();
    while let Some(row) = rows.next()? {
        let raw: i64 = row.get(0)?;
        let day = u8::try_from(raw).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid day_of_week `{raw}` in habit_target_days.day_of_week"
            ))
        })?;
        days.insert(day);
    }
    Ok(days)
}

fn parse_habit_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Habit> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "habits.uuid")?;

    let frequency_text: String = row.get("frequency")?;
    let frequency = parse_frequency(&frequency_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid frequency `{frequency_text}` in habits.frequency"
        ))
    })?;

    let category_text: String = row.get("category")?;
    let category = parse_category(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in habits.category"
        ))
    })?;

    let reminder_time = match row.get::<_, Option<String>>("reminder_time")? {
        Some(value) => Some(
            NaiveTime::parse_from_str(&value, REMINDER_TIME_FORMAT).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid reminder time `{value}` in habits.reminder_time"
                ))
            })?,
        ),
        None => None,
    };

    let target_count = match row.get::<_, Option<i64>>("target_count")? {
        Some(value) => Some(u32::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid target count `{value}` in habits.target_count"
            ))
        })?),
        None => None,
    };

    let is_active = match row.get::<_, i64>("is_active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_active value `{other}` in habits.is_active"
            )));
        }
    };

    let created_at_ms: i64 = row.get("created_at")?;
    let created_at = DateTime::from_timestamp_millis(created_at_ms).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{created_at_ms}` in habits.created_at"
        ))
    })?;

    let habit = Habit {
        id,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        frequency,
        target_days: load_target_days(conn, &uuid_text)?,
        category,
        reminder_time,
        target_count,
        is_active,
        created_at: Some(created_at),
    };
    habit.validate()?;
    Ok(habit)
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

// Stored values are the lowercase canonical names; boundary parsing is
// lenient, storage parsing is not.
fn parse_frequency(value: &str) -> Option<Frequency> {
    match value {
        "daily" => Some(Frequency::Daily),
        "weekly" => Some(Frequency::Weekly),
        "custom" => Some(Frequency::Custom),
        _ => None,
    }
}

fn parse_category(value: &str) -> Option<Category> {
    match value {
        "personal" => Some(Category::Personal),
        "health" => Some(Category::Health),
        "learning" => Some(Category::Learning),
        "work" => Some(Category::Work),
        "social" => Some(Category::Social),
        "other" => Some(Category::Other),
        _ => None,
    }
}

fn reminder_time_to_db(time: NaiveTime) -> String {
    time.format(REMINDER_TIME_FORMAT).to_string()
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
