//! Domain model for habits and their completion history.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Parse boundary strings (frequency, category) into closed variants once.
//!
//! # Invariants
//! - Every habit is identified by a stable `HabitId`.
//! - A completion refers to its habit by id only; it never owns the habit.
//! - Weekday indices use one convention everywhere: Sunday = 0 .. Saturday = 6.

pub mod completion;
pub mod habit;
