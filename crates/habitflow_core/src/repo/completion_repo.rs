//! Completion store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist and query completion records keyed by `(habit, date)`.
//! - Translate storage constraint failures into semantic repository errors.
//!
//! # Invariants
//! - `insert_completion` is atomic with respect to key uniqueness: when two
//!   callers race on the same `(habit_id, completion_date)`, exactly one insert
//!   succeeds and the other returns `RepoError::DuplicateCompletion`. The SQLite
//!   implementation relies on the `UNIQUE (habit_uuid, completion_date)` index,
//!   never on a prior existence check.
//! - List results carry no ordering guarantee in the contract; callers that
//!   need chronological order sort.

use crate::db::{constraint_violation, ConstraintViolation};
use crate::model::completion::Completion;
use crate::model::habit::HabitId;
use crate::repo::habit_repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use chrono::{Datelike, NaiveDate};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const COMPLETION_SELECT_SQL: &str = "SELECT
    uuid,
    habit_uuid,
    completion_date
FROM habit_completions";

/// Storage primitives consumed by the completion ledger.
pub trait CompletionRepository {
    /// Inserts one completion.
    ///
    /// # Errors
    /// - `DuplicateCompletion` when the key already exists, decided atomically
    ///   by the store.
    /// - `HabitNotFound` when the referenced habit does not exist.
    fn insert_completion(&self, completion: &Completion) -> RepoResult<()>;
    /// Deletes the completion for `(habit_id, date)`; `CompletionNotFound` if absent.
    fn delete_completion(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<()>;
    fn completion_exists(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<bool>;
    fn find_completion(&self, habit_id: HabitId, date: NaiveDate)
        -> RepoResult<Option<Completion>>;
    fn list_completions(&self, habit_id: HabitId) -> RepoResult<Vec<Completion>>;
    /// Completions with `start <= completion_date <= end`.
    fn list_completions_between(
        &self,
        habit_id: HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<Completion>>;
    /// Completions of any listed habit with `start <= completion_date <= end`.
    fn list_completions_for_habits_between(
        &self,
        habit_ids: &[HabitId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<Completion>>;
}

/// SQLite-backed completion store.
#[derive(Clone, Copy)]
pub struct SqliteCompletionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCompletionRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CompletionRepository for SqliteCompletionRepository<'_> {
    fn insert_completion(&self, completion: &Completion) -> RepoResult<()> {
        let result = self.conn.execute(
            "INSERT INTO habit_completions (uuid, habit_uuid, completion_date)
             VALUES (?1, ?2, ?3);",
            params![
                completion.id.to_string(),
                completion.habit_id.to_string(),
                date_to_db(completion.completion_date),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(err) => match constraint_violation(&err) {
                Some(ConstraintViolation::Unique) => {
                    debug!(
                        "event=completion_insert module=repo status=duplicate habit_id={} date={}",
                        completion.habit_id, completion.completion_date
                    );
                    Err(RepoError::DuplicateCompletion {
                        habit_id: completion.habit_id,
                        date: completion.completion_date,
                    })
                }
                Some(ConstraintViolation::ForeignKey) => {
                    Err(RepoError::HabitNotFound(completion.habit_id))
                }
                _ => Err(err.into()),
            },
        }
    }

    fn delete_completion(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM habit_completions
             WHERE habit_uuid = ?1
               AND completion_date = ?2;",
            params![habit_id.to_string(), date_to_db(date)],
        )?;

        if changed == 0 {
            return Err(RepoError::CompletionNotFound { habit_id, date });
        }

        Ok(())
    }

    fn completion_exists(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM habit_completions
                WHERE habit_uuid = ?1
                  AND completion_date = ?2
            );",
            params![habit_id.to_string(), date_to_db(date)],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn find_completion(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
    ) -> RepoResult<Option<Completion>> {
        let completion = self
            .conn
            .query_row(
                &format!(
                    "{COMPLETION_SELECT_SQL}
                     WHERE habit_uuid = ?1
                       AND completion_date = ?2;"
                ),
                params![habit_id.to_string(), date_to_db(date)],
                |row| RawCompletion::from_row(row),
            )
            .optional()?;

        completion.map(RawCompletion::parse).transpose()
    }

    fn list_completions(&self, habit_id: HabitId) -> RepoResult<Vec<Completion>> {
        self.query_completions(
            &format!(
                "{COMPLETION_SELECT_SQL}
                 WHERE habit_uuid = ?
                 ORDER BY completion_date ASC"
            ),
            vec![Value::Text(habit_id.to_string())],
        )
    }

    fn list_completions_between(
        &self,
        habit_id: HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<Completion>> {
        self.list_completions_for_habits_between(&[habit_id], start, end)
    }

    fn list_completions_for_habits_between(
        &self,
        habit_ids: &[HabitId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<Completion>> {
        if habit_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; habit_ids.len()].join(", ");
        let mut bind_values: Vec<Value> = habit_ids
            .iter()
            .map(|id| Value::Text(id.to_string()))
            .collect();
        bind_values.push(Value::Integer(date_to_db(start)));
        bind_values.push(Value::Integer(date_to_db(end)));

        self.query_completions(
            &format!(
                "{COMPLETION_SELECT_SQL}
                 WHERE habit_uuid IN ({placeholders})
                   AND completion_date BETWEEN ? AND ?
                 ORDER BY completion_date ASC, habit_uuid ASC"
            ),
            bind_values,
        )
    }
}

impl SqliteCompletionRepository<'_> {
    fn query_completions(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Completion>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut completions = Vec::new();
        while let Some(row) = rows.next()? {
            completions.push(RawCompletion::from_row(row)?.parse()?);
        }
        Ok(completions)
    }
}

/// Column values read before domain parsing, so parsing errors stay
/// `InvalidData` instead of being folded into SQLite errors.
struct RawCompletion {
    uuid: String,
    habit_uuid: String,
    completion_date: i64,
}

impl RawCompletion {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uuid: row.get("uuid")?,
            habit_uuid: row.get("habit_uuid")?,
            completion_date: row.get("completion_date")?,
        })
    }

    fn parse(self) -> RepoResult<Completion> {
        Ok(Completion {
            id: parse_uuid(&self.uuid, "habit_completions.uuid")?,
            habit_id: parse_uuid(&self.habit_uuid, "habit_completions.habit_uuid")?,
            completion_date: parse_date(self.completion_date)?,
        })
    }
}

/// Day number with 0001-01-01 = 1; orders like the calendar for every year.
fn date_to_db(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

fn parse_date(value: i64) -> RepoResult<NaiveDate> {
    i32::try_from(value)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid day number `{value}` in habit_completions.completion_date"
            ))
        })
}
