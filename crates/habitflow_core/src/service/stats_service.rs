//! Habit statistics use-case service.
//!
//! # Responsibility
//! - Resolve a habit, snapshot its completion history through the ledger and
//!   run the streak calculator on it.
//!
//! # Invariants
//! - Statistics are computed fresh per call; nothing is cached.
//! - `today` is always supplied by the caller.

use crate::engine::streak::{self, lookback_start, HabitStats};
use crate::error::EngineResult;
use crate::model::habit::HabitId;
use crate::repo::completion_repo::CompletionRepository;
use crate::repo::habit_repo::HabitRepository;
use crate::service::completion_ledger::CompletionLedger;
use chrono::NaiveDate;
use log::debug;

/// Streak statistics over a completion ledger.
pub struct StatsService<H: HabitRepository, C: CompletionRepository> {
    ledger: CompletionLedger<H, C>,
}

impl<H: HabitRepository, C: CompletionRepository> StatsService<H, C> {
    pub fn new(ledger: CompletionLedger<H, C>) -> Self {
        Self { ledger }
    }

    /// Underlying ledger, for callers that also mark/unmark.
    pub fn ledger(&self) -> &CompletionLedger<H, C> {
        &self.ledger
    }

    /// Current and longest streak of one habit as of `today`.
    pub fn get_stats(&self, habit_id: HabitId, today: NaiveDate) -> EngineResult<HabitStats> {
        let habit = self.ledger.resolve_habit(habit_id)?;
        let history = self.ledger.completion_dates(&habit, None)?;
        let stats = streak::compute_stats(&habit, &history, today);
        debug!(
            "event=stats_compute module=stats status=ok habit_id={habit_id} today={today} completions={} current={} longest={}",
            history.len(),
            stats.current_streak,
            stats.longest_streak
        );
        Ok(stats)
    }

    /// Current streak only; reads just the lookback window.
    pub fn current_streak(&self, habit_id: HabitId, today: NaiveDate) -> EngineResult<u32> {
        let habit = self.ledger.resolve_habit(habit_id)?;
        let window = self
            .ledger
            .completion_dates(&habit, Some((lookback_start(today), today)))?;
        Ok(streak::current_streak(&habit, &window, today))
    }

    pub fn longest_streak(&self, habit_id: HabitId) -> EngineResult<u32> {
        let habit = self.ledger.resolve_habit(habit_id)?;
        let history = self.ledger.completion_dates(&habit, None)?;
        Ok(streak::longest_streak(history))
    }
}
