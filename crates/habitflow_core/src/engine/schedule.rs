//! Schedule evaluator.
//!
//! # Invariants
//! - Weekday convention is fixed: Sunday = 0 .. Saturday = 6.
//! - Evaluation ignores `Habit::is_active`; callers filter inactive habits.

use crate::model::habit::{Frequency, Habit};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

/// Returns the weekday index of `date` with Sunday = 0.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Returns whether `habit` is due on `date`.
pub fn is_due(habit: &Habit, date: NaiveDate) -> bool {
    is_due_on(habit.frequency, &habit.target_days, date)
}

/// Recurrence rule without a full habit record.
///
/// An empty target set for a weekday-driven frequency is never due.
pub fn is_due_on(frequency: Frequency, target_days: &BTreeSet<u8>, date: NaiveDate) -> bool {
    match frequency {
        Frequency::Daily => true,
        Frequency::Weekly | Frequency::Custom => target_days.contains(&weekday_index(date)),
    }
}
