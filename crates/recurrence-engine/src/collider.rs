//! Detect collisions between a candidate booking and existing busy intervals.
//!
//! Every interval carries asymmetric buffers that widen it before overlap
//! testing. Blocked time is exempt: its buffers count as zero, both when it is
//! the busy interval and when it is the candidate. Overlap is half-open, so a
//! candidate that ends exactly where a busy interval's effective start lies is
//! NOT a collision.
//!
//! All instants share one timeline. Callers must supply candidates and busy
//! intervals in the same calendar convention; nothing here converts zones.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::recurrence::Occurrence;

/// Booking kind, deciding whether buffers apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceKind {
    /// A regular customer booking.
    #[default]
    Normal,
    /// Booked by staff for internal use.
    Staff,
    /// Booked by staff on a customer's behalf.
    Behalf,
    /// Closed or blocked time. Never padded by buffers.
    Blocked,
}

impl OccurrenceKind {
    pub fn is_buffer_exempt(self) -> bool {
        matches!(self, OccurrenceKind::Blocked)
    }
}

/// Padding applied before the start and after the end of an interval.
///
/// Buffers are whole minutes, serialized under `buffer_before` /
/// `buffer_after`. [`Buffers::new`] truncates anything finer; a value with a
/// sub-minute part set directly on the fields fails to serialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Buffers {
    #[serde(
        rename = "buffer_before",
        with = "minutes",
        default = "Duration::zero"
    )]
    pub before: Duration,
    #[serde(
        rename = "buffer_after",
        with = "minutes",
        default = "Duration::zero"
    )]
    pub after: Duration,
}

impl Buffers {
    pub const NONE: Buffers = Buffers {
        before: Duration::zero(),
        after: Duration::zero(),
    };

    /// Build buffers, truncating each side toward zero to whole minutes.
    pub fn new(before: Duration, after: Duration) -> Self {
        Self {
            before: whole_minutes(before),
            after: whole_minutes(after),
        }
    }

    pub fn minutes(before: i64, after: i64) -> Self {
        Self::new(Duration::minutes(before), Duration::minutes(after))
    }

    /// The buffers that actually apply to an interval of `kind`.
    pub fn for_kind(self, kind: OccurrenceKind) -> Buffers {
        if kind.is_buffer_exempt() {
            Buffers::NONE
        } else {
            self
        }
    }
}

fn whole_minutes(value: Duration) -> Duration {
    Duration::try_minutes(value.num_minutes()).unwrap_or(value)
}

impl Default for Buffers {
    fn default() -> Self {
        Buffers::NONE
    }
}

/// An existing booking, or anything else occupying the resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(flatten)]
    pub buffers: Buffers,
    #[serde(default)]
    pub kind: OccurrenceKind,
}

impl BusyInterval {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        buffers: Buffers,
        kind: OccurrenceKind,
    ) -> Self {
        Self {
            start,
            end,
            buffers,
            kind,
        }
    }

    pub fn effective(&self) -> EffectiveInterval {
        effective_interval(self.start, self.end, self.buffers, self.kind)
    }
}

/// An interval being considered for booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub buffers: Buffers,
    pub kind: OccurrenceKind,
}

impl Candidate {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        buffers: Buffers,
        kind: OccurrenceKind,
    ) -> Self {
        Self {
            start,
            end,
            buffers,
            kind,
        }
    }

    /// Place an occurrence on the timeline by combining its date with its times.
    pub fn from_occurrence(
        occurrence: &Occurrence,
        kind: OccurrenceKind,
        buffers: Buffers,
    ) -> Self {
        Self::new(occurrence.start(), occurrence.end(), buffers, kind)
    }

    pub fn effective(&self) -> EffectiveInterval {
        effective_interval(self.start, self.end, self.buffers, self.kind)
    }
}

/// Interval bounds after buffer padding. Derived per test, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl EffectiveInterval {
    /// Half-open overlap: `a.start < b.end && b.start < a.end`.
    pub fn overlaps(&self, other: &EffectiveInterval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Pad `[start, end)` by the buffers that apply to `kind`.
///
/// Padding saturates at the ends of the representable timeline.
pub fn effective_interval(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    buffers: Buffers,
    kind: OccurrenceKind,
) -> EffectiveInterval {
    let buffers = buffers.for_kind(kind);
    EffectiveInterval {
        start: start
            .checked_sub_signed(buffers.before)
            .unwrap_or(DateTime::<Utc>::MIN_UTC),
        end: end
            .checked_add_signed(buffers.after)
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
    }
}

/// Whether the candidate overlaps any busy interval once buffers are applied.
///
/// Stops at the first hit. An empty busy list never collides.
pub fn collides(candidate: &Candidate, busy: &[BusyInterval]) -> bool {
    let effective = candidate.effective();
    busy.iter().any(|b| effective.overlaps(&b.effective()))
}

/// A busy interval hit by a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    pub busy: BusyInterval,
    /// Overlap of the two effective intervals, in whole minutes.
    pub overlap_minutes: i64,
}

/// Every busy interval the candidate collides with, in input order.
///
/// The overlap duration is `min(a.end, b.end) - max(a.start, b.start)` over
/// the effective (buffered) intervals.
pub fn find_collisions(candidate: &Candidate, busy: &[BusyInterval]) -> Vec<Collision> {
    let effective = candidate.effective();

    busy.iter()
        .filter_map(|b| {
            let other = b.effective();
            if !effective.overlaps(&other) {
                return None;
            }
            let overlap_start = effective.start.max(other.start);
            let overlap_end = effective.end.min(other.end);
            Some(Collision {
                busy: b.clone(),
                overlap_minutes: (overlap_end - overlap_start).num_minutes(),
            })
        })
        .collect()
}

mod minutes {
    use chrono::Duration;
    use serde::{de, ser, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let minutes = value.num_minutes();
        if Duration::try_minutes(minutes) != Some(*value) {
            return Err(ser::Error::custom(format!(
                "buffer of {} is not a whole number of minutes",
                value
            )));
        }
        serializer.serialize_i64(minutes)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let minutes = i64::deserialize(deserializer)?;
        Duration::try_minutes(minutes).ok_or_else(|| {
            de::Error::custom(format!("buffer of {} minutes is out of range", minutes))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn blocked_kind_drops_buffers() {
        let b = Buffers::minutes(30, 45);
        assert_eq!(b.for_kind(OccurrenceKind::Blocked), Buffers::NONE);
        assert_eq!(b.for_kind(OccurrenceKind::Staff), b);
    }

    #[test]
    fn padding_saturates_instead_of_panicking() {
        let e = effective_interval(
            DateTime::<Utc>::MIN_UTC,
            DateTime::<Utc>::MAX_UTC,
            Buffers::minutes(60, 60),
            OccurrenceKind::Normal,
        );
        assert_eq!(e.start, DateTime::<Utc>::MIN_UTC);
        assert_eq!(e.end, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn busy_interval_json_uses_minutes() {
        let busy = BusyInterval::new(
            Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap(),
            Buffers::minutes(15, 0),
            OccurrenceKind::Normal,
        );
        let json = serde_json::to_value(&busy).unwrap();
        assert_eq!(json["buffer_before"], 15);
        assert_eq!(json["buffer_after"], 0);
        assert_eq!(json["kind"], "normal");

        let back: BusyInterval = serde_json::from_value(json).unwrap();
        assert_eq!(back, busy);
    }

    #[test]
    fn new_truncates_to_whole_minutes() {
        let b = Buffers::new(Duration::seconds(90), Duration::seconds(-30));
        assert_eq!(b, Buffers::minutes(1, 0));

        let json = serde_json::to_value(b).unwrap();
        let back: Buffers = serde_json::from_value(json).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn sub_minute_buffers_do_not_serialize() {
        let b = Buffers {
            before: Duration::seconds(90),
            after: Duration::zero(),
        };
        assert!(serde_json::to_value(b).is_err());
    }

    #[test]
    fn missing_buffers_and_kind_default() {
        let busy: BusyInterval = serde_json::from_str(
            r#"{"start":"2026-03-02T11:00:00Z","end":"2026-03-02T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(busy.buffers, Buffers::NONE);
        assert_eq!(busy.kind, OccurrenceKind::Normal);
    }
}
