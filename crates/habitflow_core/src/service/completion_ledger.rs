//! Completion ledger use-case service.
//!
//! # Responsibility
//! - Mark and unmark habit completions per calendar date.
//! - Serve chronologically ordered completion history to callers and to the
//!   streak calculator.
//!
//! # Invariants
//! - At most one completion per `(habit_id, date)`. The ledger checks before
//!   writing; the store's unique index settles concurrent writers, and a lost
//!   race is reported as `Conflict` like any other duplicate.
//! - The habit is resolved first, so a missing habit is always `HabitNotFound`.
//! - Each mark/unmark is one logical write.

use crate::error::{EngineError, EngineResult};
use crate::model::completion::Completion;
use crate::model::habit::{Habit, HabitId};
use crate::repo::completion_repo::CompletionRepository;
use crate::repo::habit_repo::HabitRepository;
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::BTreeSet;

/// Ledger over one habit store and one completion store.
pub struct CompletionLedger<H: HabitRepository, C: CompletionRepository> {
    habits: H,
    completions: C,
}

impl<H: HabitRepository, C: CompletionRepository> CompletionLedger<H, C> {
    pub fn new(habits: H, completions: C) -> Self {
        Self {
            habits,
            completions,
        }
    }

    /// Loads a habit or fails with `HabitNotFound`.
    pub fn resolve_habit(&self, habit_id: HabitId) -> EngineResult<Habit> {
        self.habits
            .get_habit(habit_id)?
            .ok_or(EngineError::HabitNotFound(habit_id))
    }

    /// Records that `habit_id` was performed on `date`.
    ///
    /// # Errors
    /// - `HabitNotFound` when the habit does not exist.
    /// - `Conflict` when a completion already exists for that date.
    pub fn mark_completed(&self, habit_id: HabitId, date: NaiveDate) -> EngineResult<Completion> {
        self.resolve_habit(habit_id)?;

        if self.completions.completion_exists(habit_id, date)? {
            warn!(
                "event=completion_mark module=ledger status=conflict habit_id={habit_id} date={date}"
            );
            return Err(EngineError::Conflict { habit_id, date });
        }

        let completion = Completion::new(habit_id, date);
        if let Err(err) = self.completions.insert_completion(&completion) {
            let err = EngineError::from(err);
            if err.is_conflict() {
                warn!(
                    "event=completion_mark module=ledger status=conflict habit_id={habit_id} date={date} race=true"
                );
            }
            return Err(err);
        }

        info!("event=completion_mark module=ledger status=ok habit_id={habit_id} date={date}");
        Ok(completion)
    }

    /// Removes the completion of `habit_id` on `date`.
    ///
    /// # Errors
    /// - `HabitNotFound` when the habit does not exist.
    /// - `CompletionNotFound` when nothing was recorded for that date.
    pub fn unmark_completed(&self, habit_id: HabitId, date: NaiveDate) -> EngineResult<()> {
        self.resolve_habit(habit_id)?;
        self.completions.delete_completion(habit_id, date)?;
        info!("event=completion_unmark module=ledger status=ok habit_id={habit_id} date={date}");
        Ok(())
    }

    pub fn is_completed_on(&self, habit_id: HabitId, date: NaiveDate) -> EngineResult<bool> {
        self.resolve_habit(habit_id)?;
        Ok(self.completions.completion_exists(habit_id, date)?)
    }

    /// Full history of one habit, oldest first.
    pub fn list_completions(&self, habit_id: HabitId) -> EngineResult<Vec<Completion>> {
        self.resolve_habit(habit_id)?;
        let mut completions = self.completions.list_completions(habit_id)?;
        completions.sort_by_key(|completion| completion.completion_date);
        Ok(completions)
    }

    /// History of one habit within `start..=end`, oldest first.
    ///
    /// # Errors
    /// - `InvalidArgument` when `start > end`.
    pub fn list_completions_between(
        &self,
        habit_id: HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<Completion>> {
        ensure_range(start, end)?;
        self.resolve_habit(habit_id)?;
        let mut completions = self
            .completions
            .list_completions_between(habit_id, start, end)?;
        completions.sort_by_key(|completion| completion.completion_date);
        Ok(completions)
    }

    /// Completions of several habits within `start..=end`, ordered by date
    /// then habit id. Unknown habit ids contribute nothing.
    pub fn list_completions_for_habits_between(
        &self,
        habit_ids: &[HabitId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<Completion>> {
        ensure_range(start, end)?;
        let mut completions = self
            .completions
            .list_completions_for_habits_between(habit_ids, start, end)?;
        completions.sort_by_key(|completion| (completion.completion_date, completion.habit_id));
        Ok(completions)
    }

    /// Completion dates of an already resolved habit, optionally limited to
    /// an inclusive `(start, end)` window.
    pub(crate) fn completion_dates(
        &self,
        habit: &Habit,
        window: Option<(NaiveDate, NaiveDate)>,
    ) -> EngineResult<BTreeSet<NaiveDate>> {
        let completions = match window {
            Some((start, end)) => self
                .completions
                .list_completions_between(habit.id, start, end)?,
            None => self.completions.list_completions(habit.id)?,
        };
        Ok(completions
            .into_iter()
            .map(|completion| completion.completion_date)
            .collect())
    }
}

fn ensure_range(start: NaiveDate, end: NaiveDate) -> EngineResult<()> {
    if start > end {
        return Err(EngineError::InvalidArgument(format!(
            "range start {start} is after end {end}"
        )));
    }
    Ok(())
}
