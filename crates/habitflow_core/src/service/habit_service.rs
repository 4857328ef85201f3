//! Habit catalogue use-case service.
//!
//! # Responsibility
//! - Parse boundary input (frequency/category strings) into the closed model.
//! - Provide create, edit, toggle, delete and list entry points.
//! - Answer "which active habits are due for this owner on this date".
//!
//! # Invariants
//! - Unknown frequency/category strings are `InvalidArgument`, never coerced.
//! - Every persisted habit passed `Habit::validate()`.

use crate::engine::schedule::is_due;
use crate::error::{EngineError, EngineResult};
use crate::model::habit::{Category, Frequency, Habit, HabitId};
use crate::repo::habit_repo::{HabitListQuery, HabitRepository};
use chrono::{NaiveDate, NaiveTime};
use log::info;

/// Request model for creating a habit from boundary input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewHabit {
    pub title: String,
    pub description: Option<String>,
    /// `daily|weekly|custom`, case-insensitive.
    pub frequency: String,
    /// Weekday indices, Sunday = 0.
    pub target_days: Vec<u8>,
    /// Defaults to `personal` when absent.
    pub category: Option<String>,
    pub reminder_time: Option<NaiveTime>,
    pub target_count: Option<u32>,
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<String>,
    pub target_days: Option<Vec<u8>>,
    pub category: Option<String>,
    pub reminder_time: Option<NaiveTime>,
    pub target_count: Option<u32>,
}

/// Use-case service wrapper for habit CRUD operations.
pub struct HabitService<R: HabitRepository> {
    repo: R,
}

impl<R: HabitRepository> HabitService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an active habit owned by `owner_id` and returns it as stored.
    pub fn create_habit(&self, owner_id: &str, request: &NewHabit) -> EngineResult<Habit> {
        let frequency: Frequency = request.frequency.parse()?;
        let mut habit = Habit::new(owner_id, request.title.trim(), frequency)
            .with_target_days(request.target_days.iter().copied());
        habit.description = request.description.clone();
        habit.category = match request.category.as_deref() {
            Some(value) => value.parse()?,
            None => Category::default(),
        };
        habit.reminder_time = request.reminder_time;
        habit.target_count = request.target_count;

        let id = self.repo.create_habit(&habit)?;
        let habit = self.get_habit(id)?;
        info!(
            "event=habit_create module=service status=ok habit_id={} frequency={}",
            habit.id, habit.frequency
        );
        Ok(habit)
    }

    /// Gets one habit by id.
    pub fn get_habit(&self, id: HabitId) -> EngineResult<Habit> {
        self.repo
            .get_habit(id)?
            .ok_or(EngineError::HabitNotFound(id))
    }

    /// Applies a partial update and returns the stored result.
    ///
    /// The merged habit must still validate; a frequency switch to
    /// `weekly`/`custom` without target days is rejected.
    pub fn update_habit(&self, id: HabitId, patch: &HabitPatch) -> EngineResult<Habit> {
        let mut habit = self.get_habit(id)?;

        if let Some(title) = patch.title.as_deref() {
            habit.title = title.trim().to_string();
        }
        if let Some(description) = patch.description.as_ref() {
            habit.description = Some(description.clone());
        }
        if let Some(frequency) = patch.frequency.as_deref() {
            habit.frequency = frequency.parse()?;
        }
        if let Some(days) = patch.target_days.as_ref() {
            habit.target_days = days.iter().copied().collect();
        }
        if let Some(category) = patch.category.as_deref() {
            habit.category = category.parse()?;
        }
        if patch.reminder_time.is_some() {
            habit.reminder_time = patch.reminder_time;
        }
        if patch.target_count.is_some() {
            habit.target_count = patch.target_count;
        }

        self.repo.update_habit(&habit)?;
        Ok(habit)
    }

    /// Flips the active flag and returns the updated habit.
    pub fn toggle_active(&self, id: HabitId) -> EngineResult<Habit> {
        let mut habit = self.get_habit(id)?;
        habit.toggle_active();
        self.repo.update_habit(&habit)?;
        Ok(habit)
    }

    /// Deletes a habit together with its completion history.
    pub fn delete_habit(&self, id: HabitId) -> EngineResult<()> {
        self.repo.delete_habit(id)?;
        info!("event=habit_delete module=service status=ok habit_id={id}");
        Ok(())
    }

    /// Lists every habit of one owner, active or not.
    pub fn list_habits(&self, owner_id: &str) -> EngineResult<Vec<Habit>> {
        Ok(self.repo.list_habits(&HabitListQuery::for_owner(owner_id))?)
    }

    pub fn list_active_habits(&self, owner_id: &str) -> EngineResult<Vec<Habit>> {
        let query = HabitListQuery {
            is_active: Some(true),
            ..HabitListQuery::for_owner(owner_id)
        };
        Ok(self.repo.list_habits(&query)?)
    }

    pub fn list_habits_by_category(
        &self,
        owner_id: &str,
        category: Category,
    ) -> EngineResult<Vec<Habit>> {
        let query = HabitListQuery {
            category: Some(category),
            ..HabitListQuery::for_owner(owner_id)
        };
        Ok(self.repo.list_habits(&query)?)
    }

    /// Active habits of `owner_id` that are due on `date`.
    pub fn habits_due_on(&self, owner_id: &str, date: NaiveDate) -> EngineResult<Vec<Habit>> {
        let mut habits = self.list_active_habits(owner_id)?;
        habits.retain(|habit| is_due(habit, date));
        Ok(habits)
    }
}
