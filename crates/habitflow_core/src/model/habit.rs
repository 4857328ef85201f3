//! Habit domain model.
//!
//! # Responsibility
//! - Define the canonical habit record and its recurrence configuration.
//! - Parse free-form frequency/category strings into closed variants.
//! - Validate field-level invariants before persistence.
//!
//! # Invariants
//! - `id` is stable and never nil.
//! - `target_days` holds weekday indices in `0..=6` (Sunday = 0).
//! - `Weekly`/`Custom` habits carry at least one target day.
//! - The scheduling engine reads habits but never mutates them.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for every habit.
pub type HabitId = Uuid;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
/// Highest valid weekday index (Saturday).
pub const WEEKDAY_INDEX_MAX: u8 = 6;

/// Recurrence cadence of a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Due every calendar day.
    Daily,
    /// Due on the weekdays listed in `target_days`.
    Weekly,
    /// Same rule as `Weekly`; kept distinct because users pick it explicitly.
    Custom,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Custom => "custom",
        }
    }

    /// Returns whether this cadence is driven by `target_days`.
    pub fn uses_target_days(self) -> bool {
        !matches!(self, Self::Daily)
    }
}

impl FromStr for Frequency {
    type Err = HabitValidationError;

    /// Parses `daily|weekly|custom`, case-insensitive, surrounding whitespace ignored.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "custom" => Ok(Self::Custom),
            _ => Err(HabitValidationError::UnknownFrequency(value.to_string())),
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping label for habits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Personal,
    Health,
    Learning,
    Work,
    Social,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Health => "health",
            Self::Learning => "learning",
            Self::Work => "work",
            Self::Social => "social",
            Self::Other => "other",
        }
    }
}

impl FromStr for Category {
    type Err = HabitValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "personal" => Ok(Self::Personal),
            "health" => Ok(Self::Health),
            "learning" => Ok(Self::Learning),
            "work" => Ok(Self::Work),
            "social" => Ok(Self::Social),
            "other" => Ok(Self::Other),
            _ => Err(HabitValidationError::UnknownCategory(value.to_string())),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level validation failures for habit records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitValidationError {
    NilId,
    BlankOwner,
    BlankTitle,
    TitleTooLong { max: usize, actual: usize },
    DescriptionTooLong { max: usize, actual: usize },
    /// Non-daily frequency without any target weekday.
    MissingTargetDays(Frequency),
    WeekdayOutOfRange(u8),
    ZeroTargetCount,
    UnknownFrequency(String),
    UnknownCategory(String),
}

impl Display for HabitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "habit id must not be nil"),
            Self::BlankOwner => write!(f, "habit owner must not be blank"),
            Self::BlankTitle => write!(f, "habit title must not be blank"),
            Self::TitleTooLong { max, actual } => {
                write!(f, "habit title has {actual} characters; at most {max} allowed")
            }
            Self::DescriptionTooLong { max, actual } => write!(
                f,
                "habit description has {actual} characters; at most {max} allowed"
            ),
            Self::MissingTargetDays(frequency) => {
                write!(f, "{frequency} habits require at least one target day")
            }
            Self::WeekdayOutOfRange(day) => {
                write!(f, "weekday index {day} is out of range 0..=6 (Sunday = 0)")
            }
            Self::ZeroTargetCount => write!(f, "target count must be at least 1"),
            Self::UnknownFrequency(value) => {
                write!(f, "unknown frequency `{value}`; expected daily|weekly|custom")
            }
            Self::UnknownCategory(value) => write!(
                f,
                "unknown category `{value}`; expected personal|health|learning|work|social|other"
            ),
        }
    }
}

impl Error for HabitValidationError {}

/// Canonical habit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    /// Opaque reference to the owning user.
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    /// Weekday indices, Sunday = 0. Ignored for `Frequency::Daily`.
    pub target_days: BTreeSet<u8>,
    pub category: Category,
    /// Stored for display only; nothing delivers reminders.
    pub reminder_time: Option<NaiveTime>,
    pub target_count: Option<u32>,
    pub is_active: bool,
    /// Set by the store; `None` until the habit has been persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Habit {
    /// Creates an active habit with a generated id and no target days.
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            title: title.into(),
            description: None,
            frequency,
            target_days: BTreeSet::new(),
            category: Category::default(),
            reminder_time: None,
            target_count: None,
            is_active: true,
            created_at: None,
        }
    }

    /// Builder-style helper for weekday-driven habits.
    pub fn with_target_days(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.target_days = days.into_iter().collect();
        self
    }

    /// Flips the soft-disable flag and returns the new state.
    pub fn toggle_active(&mut self) -> bool {
        self.is_active = !self.is_active;
        self.is_active
    }

    /// Checks every field-level invariant.
    ///
    /// # Errors
    /// - Returns the first violated invariant, in field declaration order.
    pub fn validate(&self) -> Result<(), HabitValidationError> {
        if self.id.is_nil() {
            return Err(HabitValidationError::NilId);
        }
        if self.owner_id.trim().is_empty() {
            return Err(HabitValidationError::BlankOwner);
        }
        if self.title.trim().is_empty() {
            return Err(HabitValidationError::BlankTitle);
        }
        let title_chars = self.title.chars().count();
        if title_chars > TITLE_MAX_CHARS {
            return Err(HabitValidationError::TitleTooLong {
                max: TITLE_MAX_CHARS,
                actual: title_chars,
            });
        }
        if let Some(description) = self.description.as_deref() {
            let description_chars = description.chars().count();
            if description_chars > DESCRIPTION_MAX_CHARS {
                return Err(HabitValidationError::DescriptionTooLong {
                    max: DESCRIPTION_MAX_CHARS,
                    actual: description_chars,
                });
            }
        }
        validate_target_days(self.frequency, &self.target_days)?;
        if self.target_count == Some(0) {
            return Err(HabitValidationError::ZeroTargetCount);
        }
        Ok(())
    }
}

/// Validates a recurrence configuration on its own.
///
/// Daily habits accept any (ignored) target set as long as indices are in range.
pub fn validate_target_days(
    frequency: Frequency,
    target_days: &BTreeSet<u8>,
) -> Result<(), HabitValidationError> {
    if let Some(day) = target_days.iter().find(|day| **day > WEEKDAY_INDEX_MAX) {
        return Err(HabitValidationError::WeekdayOutOfRange(*day));
    }
    if frequency.uses_target_days() && target_days.is_empty() {
        return Err(HabitValidationError::MissingTargetDays(frequency));
    }
    Ok(())
}
