//! Engine-level error taxonomy surfaced to callers.
//!
//! # Invariants
//! - Every failure maps to one of: not found, conflict, invalid argument, or
//!   storage failure.
//! - Nothing is retried inside the engine; errors return immediately.

use crate::model::habit::{HabitId, HabitValidationError};
use crate::repo::habit_repo::RepoError;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by habit, ledger and stats services.
#[derive(Debug)]
pub enum EngineError {
    HabitNotFound(HabitId),
    CompletionNotFound { habit_id: HabitId, date: NaiveDate },
    /// The habit is already marked completed on `date`. Expected user-level
    /// condition, not a system fault.
    Conflict { habit_id: HabitId, date: NaiveDate },
    /// Malformed recurrence configuration, habit field, or query range.
    InvalidArgument(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::HabitNotFound(_) | Self::CompletionNotFound { .. }
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::CompletionNotFound { habit_id, date } => {
                write!(f, "no completion record for habit {habit_id} on {date}")
            }
            Self::Conflict { habit_id, date } => {
                write!(f, "habit {habit_id} is already marked completed on {date}")
            }
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HabitValidationError> for EngineError {
    fn from(value: HabitValidationError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

impl From<RepoError> for EngineError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::HabitNotFound(id) => Self::HabitNotFound(id),
            RepoError::CompletionNotFound { habit_id, date } => {
                Self::CompletionNotFound { habit_id, date }
            }
            RepoError::DuplicateCompletion { habit_id, date } => Self::Conflict { habit_id, date },
            RepoError::Validation(err) => err.into(),
            other => Self::Repo(other),
        }
    }
}
