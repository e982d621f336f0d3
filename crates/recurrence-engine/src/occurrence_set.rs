//! Build the final set of occurrences to submit.
//!
//! Expanded occurrences are annotated with whether they collide with existing
//! bookings. The operator may additionally remove occurrences by hand. Manual
//! removal and automatic overlap exclusion are independent flags; only an
//! occurrence with neither reaches the effective set.
//!
//! The removal set belongs to the caller. Functions here never mutate it;
//! [`toggle_removed`] returns a new set, which keeps undo/redo trivial.

use std::collections::BTreeSet;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::collider::{collides, Buffers, BusyInterval, Candidate, OccurrenceKind};
use crate::expander::expand;
use crate::recurrence::{Occurrence, RecurrenceSpec};
use crate::source::BusySource;

/// Occurrences the operator has excluded by hand.
pub type RemovalSet = BTreeSet<Occurrence>;

/// An occurrence together with its collision flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotatedOccurrence {
    #[serde(flatten)]
    pub occurrence: Occurrence,
    pub is_overlapping: bool,
}

/// Where an occurrence stands from the operator's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OccurrenceState {
    pub manually_removed: bool,
    pub auto_excluded: bool,
}

impl OccurrenceState {
    pub fn is_kept(self) -> bool {
        !self.manually_removed && !self.auto_excluded
    }
}

/// Counts shown next to a preview list.
///
/// An occurrence both removed and overlapping counts in both columns, so
/// `kept + removed + overlapping` can exceed `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OccurrenceSummary {
    pub total: usize,
    pub kept: usize,
    pub removed: usize,
    pub overlapping: usize,
}

/// Flag each occurrence that collides with `busy` when booked as `kind` with
/// `buffers`.
pub fn annotate(
    occurrences: &[Occurrence],
    busy: &[BusyInterval],
    kind: OccurrenceKind,
    buffers: Buffers,
) -> Vec<AnnotatedOccurrence> {
    occurrences
        .iter()
        .map(|occurrence| AnnotatedOccurrence {
            occurrence: *occurrence,
            is_overlapping: collides(&Candidate::from_occurrence(occurrence, kind, buffers), busy),
        })
        .collect()
}

/// Occurrences that are neither overlapping nor removed, in input order.
pub fn effective_set(annotated: &[AnnotatedOccurrence], removed: &RemovalSet) -> Vec<Occurrence> {
    annotated
        .iter()
        .filter(|a| state_of(a, removed).is_kept())
        .map(|a| a.occurrence)
        .collect()
}

/// Remove `occurrence` if it is absent from `removed`, restore it otherwise.
pub fn toggle_removed(removed: &RemovalSet, occurrence: Occurrence) -> RemovalSet {
    let mut next = removed.clone();
    if !next.remove(&occurrence) {
        next.insert(occurrence);
    }
    next
}

pub fn state_of(annotated: &AnnotatedOccurrence, removed: &RemovalSet) -> OccurrenceState {
    OccurrenceState {
        manually_removed: removed.contains(&annotated.occurrence),
        auto_excluded: annotated.is_overlapping,
    }
}

pub fn summarize(annotated: &[AnnotatedOccurrence], removed: &RemovalSet) -> OccurrenceSummary {
    annotated
        .iter()
        .map(|a| state_of(a, removed))
        .fold(
            OccurrenceSummary {
                total: annotated.len(),
                ..OccurrenceSummary::default()
            },
            |mut summary, state| {
                summary.kept += usize::from(state.is_kept());
                summary.removed += usize::from(state.manually_removed);
                summary.overlapping += usize::from(state.auto_excluded);
                summary
            },
        )
}

/// The window a busy snapshot must cover for `occurrences` booked with
/// `buffers`.
///
/// Spans whole days from the day before the first occurrence to the day after
/// the last, so buffers shorter than a day on neighbouring bookings are seen.
/// The candidate's own buffers widen it further on each side; pass them already
/// reduced with [`Buffers::for_kind`]. Saturates at the ends of the timeline.
/// `None` for an empty list.
pub fn busy_window(
    occurrences: &[Occurrence],
    buffers: Buffers,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = occurrences.iter().map(|o| o.date).min()?;
    let last = occurrences.iter().map(|o| o.date).max()?;

    let start = first
        .checked_sub_days(Days::new(1))
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
        .and_utc()
        .checked_sub_signed(buffers.before)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let end = last
        .checked_add_days(Days::new(2))
        .map(|day| day.and_time(NaiveTime::MIN).and_utc())
        .and_then(|end| end.checked_add_signed(buffers.after))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    Some((start, end))
}

/// Expand `spec` and annotate it against a fresh snapshot from `source`.
///
/// The source is only queried when expansion produced something. The queried
/// window is widened by the candidate buffers, see [`busy_window`].
///
/// # Errors
/// Propagates the source's error unchanged.
pub fn preview<S>(
    spec: &RecurrenceSpec,
    today: NaiveDate,
    source: &S,
    kind: OccurrenceKind,
    buffers: Buffers,
) -> Result<Vec<AnnotatedOccurrence>, S::Error>
where
    S: BusySource + ?Sized,
{
    let occurrences = expand(spec, today);
    let window = busy_window(&occurrences, buffers.for_kind(kind));
    let Some((window_start, window_end)) = window else {
        return Ok(Vec::new());
    };

    let busy = source.busy_intervals(window_start, window_end)?;
    let annotated = annotate(&occurrences, &busy, kind, buffers);
    trace!(
        occurrences = annotated.len(),
        busy = busy.len(),
        overlapping = annotated.iter().filter(|a| a.is_overlapping).count(),
        "preview annotated"
    );
    Ok(annotated)
}
