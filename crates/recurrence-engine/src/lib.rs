//! # recurrence-engine
//!
//! Recurrence expansion and collision detection for venue bookings.
//!
//! An administrator describes a repeating booking as a date range, a
//! time-of-day window, a set of weekdays and a weekly or biweekly cadence. The
//! engine expands that into concrete occurrences, flags the ones that collide
//! with existing bookings (including their buffer times), and computes the set
//! that should actually be submitted once manual removals are applied.
//!
//! Everything here is pure and synchronous. "Today" is always a parameter and
//! busy intervals are always a caller-supplied snapshot.
//!
//! ## Modules
//!
//! - [`recurrence`] — recurrence specs, raw input parsing, occurrences
//! - [`weekday`] — epoch-based weekday arithmetic, Monday-first weekday sets
//! - [`expander`] — recurrence → sorted list of occurrences
//! - [`collider`] — buffered half-open overlap against busy intervals
//! - [`occurrence_set`] — annotation, manual removal, the effective set
//! - [`clock`] — injectable source of today's date
//! - [`source`] — busy-interval supplier and submission report contracts
//! - [`error`] — Error types

pub mod clock;
pub mod collider;
pub mod error;
pub mod expander;
pub mod occurrence_set;
pub mod recurrence;
pub mod source;
pub mod weekday;

pub use clock::{Clock, FixedClock, SystemClock};
pub use collider::{
    collides, effective_interval, find_collisions, Buffers, BusyInterval, Candidate, Collision,
    EffectiveInterval, OccurrenceKind,
};
pub use error::RecurrenceError;
pub use expander::{expand, expand_input, try_expand, try_expand_input};
pub use occurrence_set::{
    annotate, effective_set, preview, state_of, summarize, toggle_removed, AnnotatedOccurrence,
    OccurrenceState, OccurrenceSummary, RemovalSet,
};
pub use recurrence::{Cadence, Occurrence, RecurrenceInput, RecurrenceSpec};
pub use source::{BusySource, SubmissionReport};
pub use weekday::WeekdaySet;
