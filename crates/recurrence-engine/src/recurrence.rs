//! Recurrence patterns and the occurrences they expand into.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RecurrenceError, Result};
use crate::weekday::WeekdaySet;

/// How often the selected weekdays repeat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    #[default]
    Weekly,
    Biweekly,
}

impl Cadence {
    /// Days between two occurrences on the same weekday.
    pub fn step_days(self) -> u64 {
        match self {
            Cadence::Weekly => 7,
            Cadence::Biweekly => 14,
        }
    }
}

/// A parsed recurrence pattern.
///
/// Both date bounds are inclusive. The time window is applied unchanged to
/// every generated date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecurrenceSpec {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub weekdays: WeekdaySet,
    #[serde(default)]
    pub cadence: Cadence,
}

impl RecurrenceSpec {
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        weekdays: WeekdaySet,
        cadence: Cadence,
    ) -> Self {
        Self {
            start_date,
            end_date,
            start_time,
            end_time,
            weekdays,
            cadence,
        }
    }

    /// Check the structural preconditions for a non-empty expansion.
    ///
    /// A recurrence that passes may still expand to nothing, e.g. when the whole
    /// range lies in the past.
    ///
    /// # Errors
    /// - [`RecurrenceError::EmptyWeekdays`] when no weekday is selected.
    /// - [`RecurrenceError::InvertedDateRange`] when `start_date > end_date`.
    /// - [`RecurrenceError::InvertedTimeWindow`] when `start_time >= end_time`.
    pub fn validate(&self) -> Result<()> {
        if self.weekdays.is_empty() {
            return Err(RecurrenceError::EmptyWeekdays);
        }
        if self.start_date > self.end_date {
            return Err(RecurrenceError::InvertedDateRange);
        }
        if self.start_time >= self.end_time {
            return Err(RecurrenceError::InvertedTimeWindow);
        }
        Ok(())
    }
}

/// The unparsed pattern as typed into a form or sent over JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceInput {
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub weekdays: Vec<u8>,
    #[serde(default)]
    pub cadence: Cadence,
}

impl RecurrenceInput {
    /// Parse the raw fields into a [`RecurrenceSpec`].
    ///
    /// Dates are accepted as `YYYY-MM-DD` or day-first `D.M.YYYY`; times as
    /// `HH:MM` or `HH:MM:SS`. Parsing does not validate ordering, see
    /// [`RecurrenceSpec::validate`].
    ///
    /// # Errors
    /// Returns `InvalidDate`, `InvalidTime` or `InvalidWeekday` for the first
    /// field that does not parse.
    pub fn parse(&self) -> Result<RecurrenceSpec> {
        Ok(RecurrenceSpec {
            start_date: parse_date(&self.start_date)?,
            end_date: parse_date(&self.end_date)?,
            start_time: parse_time(&self.start_time)?,
            end_time: parse_time(&self.end_time)?,
            weekdays: WeekdaySet::from_indices(self.weekdays.iter().copied())?,
            cadence: self.cadence,
        })
    }
}

/// Parse a calendar date in ISO or day-first dotted form.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d.%m.%Y"))
        .map_err(|e| RecurrenceError::InvalidDate(format!("'{}': {}", s, e)))
}

/// Parse a time of day with or without seconds.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| RecurrenceError::InvalidTime(format!("'{}': {}", s, e)))
}

/// One concrete booking slot produced by expansion.
///
/// Ordering is by date first, then by the time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl Occurrence {
    pub fn new(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            date,
            start_time,
            end_time,
        }
    }

    /// The occurrence's start on the shared UTC timeline.
    pub fn start(&self) -> DateTime<Utc> {
        self.date.and_time(self.start_time).and_utc()
    }

    /// The occurrence's end on the shared UTC timeline.
    pub fn end(&self) -> DateTime<Utc> {
        self.date.and_time(self.end_time).and_utc()
    }
}
