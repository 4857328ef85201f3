//! Streak calculator.
//!
//! # Responsibility
//! - Walk the completion history backward from a reference date (current streak).
//! - Scan sorted completion dates for calendar-consecutive runs (longest streak).
//!
//! # Invariants
//! - The current-streak walk never examines dates older than
//!   `today - LOOKBACK_DAYS`.
//! - Longest streak counts consecutive calendar days, not consecutive
//!   scheduled occurrences.

use crate::engine::schedule::is_due;
use crate::model::habit::Habit;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum distance, in days, the current-streak walk looks back from `today`.
pub const LOOKBACK_DAYS: u64 = 365;

/// Streak figures returned by stats queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Oldest date the current-streak walk may examine.
pub fn lookback_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(LOOKBACK_DAYS))
        .unwrap_or(NaiveDate::MIN)
}

/// Counts consecutive due-and-completed days ending at `today`.
///
/// Days on which the habit is not due are skipped without breaking the run.
/// The first due day without a completion ends the walk.
pub fn current_streak(habit: &Habit, completed: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let oldest = lookback_start(today);
    let mut streak = 0;
    let mut check = today;

    loop {
        if is_due(habit, check) {
            if !completed.contains(&check) {
                break;
            }
            streak += 1;
        }

        match check.pred_opt() {
            Some(previous) if previous >= oldest => check = previous,
            _ => break,
        }
    }

    streak
}

/// Longest run of calendar-consecutive completion dates.
///
/// Input order does not matter; duplicate dates count once.
pub fn longest_streak(dates: impl IntoIterator<Item = NaiveDate>) -> u32 {
    let mut sorted: Vec<NaiveDate> = dates.into_iter().collect();
    if sorted.is_empty() {
        return 0;
    }
    sorted.sort_unstable();
    sorted.dedup();

    let mut current = 1;
    let mut max = 1;
    for pair in sorted.windows(2) {
        if pair[0].succ_opt() == Some(pair[1]) {
            current += 1;
            max = max.max(current);
        } else {
            current = 1;
        }
    }

    max
}

/// Computes both streak figures from one history snapshot.
pub fn compute_stats(habit: &Habit, completed: &BTreeSet<NaiveDate>, today: NaiveDate) -> HabitStats {
    HabitStats {
        current_streak: current_streak(habit, completed, today),
        longest_streak: longest_streak(completed.iter().copied()),
    }
}

#[cfg(test)]
mod tests {
    use super::{compute_stats, current_streak, longest_streak, lookback_start, HabitStats};
    use crate::model::habit::{Frequency, Habit};
    use chrono::{Days, NaiveDate};
    use std::collections::BTreeSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily() -> Habit {
        Habit::new("u", "Meditate", Frequency::Daily)
    }

    fn days(range: impl IntoIterator<Item = u32>) -> BTreeSet<NaiveDate> {
        range.into_iter().map(|d| date(2024, 1, d)).collect()
    }

    #[test]
    fn current_streak_breaks_on_missed_today() {
        let completed = days(1..=5);
        assert_eq!(current_streak(&daily(), &completed, date(2024, 1, 6)), 0);
        assert_eq!(current_streak(&daily(), &completed, date(2024, 1, 5)), 5);
    }

    #[test]
    fn current_streak_skips_days_that_are_not_due() {
        // Mon/Wed/Fri; 2024-01-01 is a Monday.
        let habit = Habit::new("u", "Gym", Frequency::Weekly).with_target_days([1, 3, 5]);
        let completed = days([1, 3, 5, 8, 10]);

        // Thursday 01-11 is not due, so the run ending on Wednesday counts.
        assert_eq!(current_streak(&habit, &completed, date(2024, 1, 11)), 5);
        // Friday 01-12 is due and missing.
        assert_eq!(current_streak(&habit, &completed, date(2024, 1, 12)), 0);
    }

    #[test]
    fn current_streak_ignores_completions_on_non_due_days() {
        let habit = Habit::new("u", "Swim", Frequency::Custom).with_target_days([1]);
        let completed = days([1, 2, 3]);
        // Only Monday 01-01 is due between 01-01 and 01-03.
        assert_eq!(current_streak(&habit, &completed, date(2024, 1, 3)), 1);
    }

    #[test]
    fn current_streak_is_bounded_by_lookback() {
        let today = date(2024, 12, 31);
        let completed: BTreeSet<NaiveDate> = (0..400)
            .map(|offset| today.checked_sub_days(Days::new(offset)).unwrap())
            .collect();
        // `today` itself plus 365 earlier days.
        assert_eq!(current_streak(&daily(), &completed, today), 366);
        assert_eq!(lookback_start(today), date(2024, 1, 1));
    }

    #[test]
    fn current_streak_terminates_for_habit_that_is_never_due() {
        let habit = Habit::new("u", "Ghost", Frequency::Weekly);
        assert_eq!(current_streak(&habit, &BTreeSet::new(), date(2024, 6, 1)), 0);
    }

    #[test]
    fn longest_streak_resets_on_gap() {
        assert_eq!(longest_streak(days([1, 2, 4, 5])), 2);
        assert_eq!(longest_streak(days([5, 1, 4, 2, 3])), 5);
        assert_eq!(longest_streak(days([9])), 1);
        assert_eq!(longest_streak(Vec::new()), 0);
    }

    #[test]
    fn longest_streak_spans_month_boundary() {
        let dates = vec![date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)];
        assert_eq!(longest_streak(dates), 3);
    }

    #[test]
    fn longest_streak_counts_calendar_days_for_weekly_habits() {
        let mondays = days([1, 8, 15, 22]);
        assert_eq!(longest_streak(mondays.iter().copied()), 1);

        let habit = Habit::new("u", "Review", Frequency::Weekly).with_target_days([1]);
        assert_eq!(current_streak(&habit, &mondays, date(2024, 1, 23)), 4);
    }

    #[test]
    fn empty_history_yields_zero_stats() {
        assert_eq!(
            compute_stats(&daily(), &BTreeSet::new(), date(2024, 1, 6)),
            HabitStats::default()
        );
    }
}
