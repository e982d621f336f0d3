//! The engine's contract with the outside world.
//!
//! A [`BusySource`] supplies a read-only snapshot of busy intervals for a
//! window; a [`SubmissionReport`] is how an external batch-create call hands
//! back the occurrences it refused. The engine never persists or retries.

use std::convert::Infallible;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collider::BusyInterval;
use crate::recurrence::Occurrence;

/// Supplier of existing bookings.
///
/// Implementations should fetch fresh data on every call: a stale snapshot
/// silently under-reports collisions.
pub trait BusySource {
    type Error;

    /// Busy intervals whose raw `[start, end)` touches `[window_start, window_end)`.
    fn busy_intervals(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, Self::Error>;
}

impl BusySource for [BusyInterval] {
    type Error = Infallible;

    fn busy_intervals(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, Infallible> {
        Ok(self
            .iter()
            .filter(|b| b.start < window_end && b.end > window_start)
            .cloned()
            .collect())
    }
}

impl BusySource for Vec<BusyInterval> {
    type Error = Infallible;

    fn busy_intervals(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, Infallible> {
        self.as_slice().busy_intervals(window_start, window_end)
    }
}

/// Outcome of handing the effective set to an external batch-create call.
///
/// Partial failure (e.g. a conflicting booking created in the meantime) shows
/// up as a non-empty `rejected` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub accepted: Vec<Occurrence>,
    pub rejected: Vec<Occurrence>,
}

impl SubmissionReport {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}
