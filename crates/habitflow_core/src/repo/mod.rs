//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for habits and completions.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Habit writes enforce `Habit::validate()` before persistence.
//! - Completion uniqueness is decided by the store, not by callers.
//! - Repository APIs return semantic errors (`HabitNotFound`,
//!   `CompletionNotFound`, `DuplicateCompletion`) in addition to DB transport
//!   errors.

pub mod completion_repo;
pub mod habit_repo;
