//! Scheduling and streak engine.
//!
//! # Responsibility
//! - Decide whether a habit is due on a calendar date.
//! - Derive current/longest streaks from a completion history snapshot.
//!
//! # Invariants
//! - Pure functions only: no storage access, no ambient clock.
//! - Callers pass `today` explicitly.

pub mod schedule;
pub mod streak;
