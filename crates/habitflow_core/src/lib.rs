//! Core domain logic for HabitFlow.
//! This crate is the single source of truth for habit scheduling, completion
//! and streak invariants.

pub mod db;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use engine::schedule::{is_due, is_due_on, weekday_index};
pub use engine::streak::{current_streak, longest_streak, HabitStats, LOOKBACK_DAYS};
pub use error::{EngineError, EngineResult};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::completion::{Completion, CompletionId};
pub use model::habit::{Category, Frequency, Habit, HabitId, HabitValidationError};
pub use repo::completion_repo::{CompletionRepository, SqliteCompletionRepository};
pub use repo::habit_repo::{
    HabitListQuery, HabitRepository, RepoError, RepoResult, SqliteHabitRepository,
};
pub use service::completion_ledger::CompletionLedger;
pub use service::habit_service::{HabitPatch, HabitService, NewHabit};
pub use service::stats_service::StatsService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
