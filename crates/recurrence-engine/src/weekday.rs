//! Weekday arithmetic on absolute day counts.
//!
//! Two numbering conventions meet here. The epoch formula produces a
//! Sunday-first index (0 = Sunday .. 6 = Saturday) because day 0 of the Unix
//! epoch, 1970-01-01, was a Thursday (index 4). Recurrence weekdays are
//! Monday-first (0 = Monday .. 6 = Sunday), matching how the booking UI lays
//! out its weekday picker.

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{RecurrenceError, Result};

/// Milliseconds in one UTC day.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Sunday-first index of 1970-01-01.
const EPOCH_SUNDAY_FIRST: i64 = 4;

/// Sunday-first weekday index of the UTC day containing `epoch_millis`.
///
/// Uses floor division, so instants before the epoch land on the right day.
pub fn sunday_first_from_millis(epoch_millis: i64) -> u8 {
    let day = epoch_millis.div_euclid(MILLIS_PER_DAY);
    (day + EPOCH_SUNDAY_FIRST).rem_euclid(7) as u8
}

/// Convert a Sunday-first index (0 = Sunday) to Monday-first (0 = Monday).
pub fn sunday_first_to_monday_first(index: u8) -> u8 {
    (index % 7 + 6) % 7
}

/// Convert a Monday-first index (0 = Monday) to Sunday-first (0 = Sunday).
pub fn monday_first_to_sunday_first(index: u8) -> u8 {
    (index % 7 + 1) % 7
}

/// Milliseconds since the epoch at UTC midnight of `date`.
pub fn midnight_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Monday-first weekday index of a calendar date.
pub fn weekday_index(date: NaiveDate) -> u8 {
    sunday_first_to_monday_first(sunday_first_from_millis(midnight_millis(date)))
}

/// Monday-first index of a chrono [`Weekday`].
pub fn index_of(weekday: Weekday) -> u8 {
    weekday.num_days_from_monday() as u8
}

/// A set of weekdays, Monday-first, stored as a 7-bit mask.
///
/// Serializes as the sorted list of its indices, e.g. `[0, 2]` for Monday and
/// Wednesday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    /// Build a set from Monday-first indices.
    ///
    /// # Errors
    /// Returns [`RecurrenceError::InvalidWeekday`] for any index above 6.
    pub fn from_indices<I>(indices: I) -> Result<Self>
    where
        I: IntoIterator<Item = u8>,
    {
        let mut mask = 0u8;
        for index in indices {
            if index > 6 {
                return Err(RecurrenceError::InvalidWeekday(index));
            }
            mask |= 1 << index;
        }
        Ok(WeekdaySet(mask))
    }

    pub fn insert(&mut self, weekday: Weekday) {
        self.0 |= 1 << index_of(weekday);
    }

    pub fn contains(self, weekday: Weekday) -> bool {
        self.contains_index(index_of(weekday))
    }

    /// Membership test on a Monday-first index. Out-of-range indices are
    /// never members.
    pub fn contains_index(self, index: u8) -> bool {
        index <= 6 && self.0 & (1 << index) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Monday-first indices in ascending order.
    pub fn indices(self) -> impl Iterator<Item = u8> {
        (0u8..7).filter(move |&i| self.contains_index(i))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for weekday in iter {
            set.insert(weekday);
        }
        set
    }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
    type Error = RecurrenceError;

    fn try_from(indices: Vec<u8>) -> Result<Self> {
        WeekdaySet::from_indices(indices)
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(set: WeekdaySet) -> Self {
        set.indices().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_day_zero_is_thursday() {
        assert_eq!(sunday_first_from_millis(0), 4);
        assert_eq!(sunday_first_from_millis(MILLIS_PER_DAY - 1), 4);
        assert_eq!(sunday_first_from_millis(MILLIS_PER_DAY), 5);
    }

    #[test]
    fn last_millisecond_before_epoch_is_wednesday() {
        assert_eq!(sunday_first_from_millis(-1), 3);
        assert_eq!(sunday_first_from_millis(-MILLIS_PER_DAY), 3);
        assert_eq!(sunday_first_from_millis(-MILLIS_PER_DAY - 1), 2);
    }

    #[test]
    fn conversions_are_inverse() {
        for i in 0..7 {
            assert_eq!(monday_first_to_sunday_first(sunday_first_to_monday_first(i)), i);
            assert_eq!(sunday_first_to_monday_first(monday_first_to_sunday_first(i)), i);
        }
    }

    #[test]
    fn set_rejects_index_seven() {
        assert_eq!(
            WeekdaySet::from_indices([0, 7]),
            Err(RecurrenceError::InvalidWeekday(7))
        );
    }

    #[test]
    fn set_serializes_as_sorted_indices() {
        let set: WeekdaySet = [Weekday::Sun, Weekday::Mon, Weekday::Wed].into_iter().collect();
        let indices: Vec<u8> = set.into();
        assert_eq!(indices, vec![0, 2, 6]);
        assert_eq!(set.len(), 3);
        assert!(!set.contains(Weekday::Tue));
        assert!(!set.contains_index(9));
    }
}
