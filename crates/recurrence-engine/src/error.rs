//! Error types for recurrence-engine operations.
//!
//! Only the strict entry points (`try_expand`, `RecurrenceInput::parse`,
//! `RecurrenceSpec::validate`) return these. The fail-soft entry points map
//! every variant to an empty result.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("no weekdays selected")]
    EmptyWeekdays,

    #[error("start date is after end date")]
    InvertedDateRange,

    #[error("start time is not before end time")]
    InvertedTimeWindow,

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid weekday index: {0} (expected 0..=6, Monday first)")]
    InvalidWeekday(u8),
}

pub type Result<T> = std::result::Result<T, RecurrenceError>;
