//! Completion domain model.
//!
//! # Invariants
//! - At most one completion exists per `(habit_id, completion_date)`.
//! - Completions are created and destroyed, never updated in place.

use crate::model::habit::HabitId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable row identity of one completion record.
pub type CompletionId = Uuid;

/// Record that a habit was performed on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub id: CompletionId,
    /// Back reference to the owning habit.
    pub habit_id: HabitId,
    /// Naive calendar date, serialized as `YYYY-MM-DD`.
    pub completion_date: NaiveDate,
}

impl Completion {
    /// Creates a completion with a generated row id.
    pub fn new(habit_id: HabitId, completion_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            habit_id,
            completion_date,
        }
    }
}
