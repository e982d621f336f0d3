//! Recurrence expansion -- turns a weekly/biweekly pattern into concrete occurrences.
//!
//! Expansion works from an anchor week: the first seven days of the effective
//! range are scanned for selected weekdays, and each hit is then repeated every
//! 7 or 14 days until the inclusive end date. Because anchors are seven
//! distinct weekdays and steps are whole weeks, no two sequences share a date.
//!
//! `today` is always passed in. Occurrences before it are never produced, even
//! when `start_date` lies in the past.

use chrono::{Days, NaiveDate};
use tracing::{debug, trace};

use crate::error::Result;
use crate::recurrence::{Occurrence, RecurrenceInput, RecurrenceSpec};
use crate::weekday::weekday_index;

/// Expand a recurrence into occurrences sorted by date.
///
/// This is the fail-soft entry point: an invalid recurrence (no weekdays,
/// inverted date range, empty time window) expands to an empty list, exactly
/// like a valid one with no matching days. Use [`try_expand`] to tell the two
/// apart.
pub fn expand(spec: &RecurrenceSpec, today: NaiveDate) -> Vec<Occurrence> {
    try_expand(spec, today).unwrap_or_else(|e| {
        debug!(reason = %e, "recurrence rejected, expanding to nothing");
        Vec::new()
    })
}

/// Expand a recurrence, reporting why an invalid recurrence produced nothing.
///
/// `Ok(vec![])` means the recurrence is well-formed but no selected weekday
/// falls inside `[max(today, start_date), end_date]`.
///
/// # Errors
/// Returns the first precondition [`RecurrenceSpec::validate`] rejects.
pub fn try_expand(spec: &RecurrenceSpec, today: NaiveDate) -> Result<Vec<Occurrence>> {
    spec.validate()?;

    let lower = today.max(spec.start_date);
    let upper = spec.end_date;
    if lower > upper {
        trace!(%lower, %upper, "range lies entirely before today");
        return Ok(Vec::new());
    }

    let anchors = anchor_days(spec, lower, upper);
    let step = Days::new(spec.cadence.step_days());

    let mut occurrences: Vec<Occurrence> = anchors
        .iter()
        .flat_map(move |&anchor| {
            std::iter::successors(Some(anchor), move |day: &NaiveDate| {
                day.checked_add_days(step)
            })
            .take_while(move |day| *day <= upper)
        })
        .map(|date| Occurrence::new(date, spec.start_time, spec.end_time))
        .collect();

    occurrences.sort_by_key(|o| o.date);

    trace!(
        anchors = anchors.len(),
        occurrences = occurrences.len(),
        cadence = ?spec.cadence,
        "recurrence expanded"
    );
    Ok(occurrences)
}

/// Selected days within the first week of the effective range.
fn anchor_days(spec: &RecurrenceSpec, lower: NaiveDate, upper: NaiveDate) -> Vec<NaiveDate> {
    (0..7u64)
        .map_while(|offset| lower.checked_add_days(Days::new(offset)))
        .take_while(|day| *day <= upper)
        .filter(|day| spec.weekdays.contains_index(weekday_index(*day)))
        .collect()
}

/// Parse raw input and expand it, fail-soft.
///
/// Unparseable dates, times or weekday indices expand to nothing, the same as
/// any other invalid recurrence.
pub fn expand_input(input: &RecurrenceInput, today: NaiveDate) -> Vec<Occurrence> {
    try_expand_input(input, today).unwrap_or_else(|e| {
        debug!(reason = %e, "recurrence input rejected, expanding to nothing");
        Vec::new()
    })
}

/// Parse raw input and expand it, reporting parse and validation errors.
///
/// # Errors
/// Any error from [`RecurrenceInput::parse`] or [`try_expand`].
pub fn try_expand_input(input: &RecurrenceInput, today: NaiveDate) -> Result<Vec<Occurrence>> {
    let spec = input.parse()?;
    try_expand(&spec, today)
}
