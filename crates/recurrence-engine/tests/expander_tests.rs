//! Tests for recurrence expansion.
//!
//! Calendar reference: 2026-03-02 is a Monday. Week 1 runs Mon 2026-03-02 to
//! Sun 2026-03-08, week 2 Mon 2026-03-09 to Sun 2026-03-15.

use chrono::{NaiveDate, NaiveTime, Weekday};
use recurrence_engine::{
    expand, expand_input, try_expand, try_expand_input, Cadence, RecurrenceError,
    RecurrenceInput, RecurrenceSpec, WeekdaySet,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn time(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).unwrap()
}

fn weekdays(days: &[Weekday]) -> WeekdaySet {
    days.iter().copied().collect()
}

/// Helper to build a 10:00-11:00 spec over an inclusive date range.
fn spec(start: NaiveDate, end: NaiveDate, days: &[Weekday], cadence: Cadence) -> RecurrenceSpec {
    RecurrenceSpec::new(start, end, time(10, 0), time(11, 0), weekdays(days), cadence)
}

fn dates(spec: &RecurrenceSpec, today: NaiveDate) -> Vec<NaiveDate> {
    expand(spec, today).into_iter().map(|o| o.date).collect()
}

/// A "today" safely before every range used below.
fn before_all() -> NaiveDate {
    date(2026, 3, 1)
}

// ---------------------------------------------------------------------------
// Two-week windows
// ---------------------------------------------------------------------------

#[test]
fn one_weekday_weekly_over_monday_to_monday() {
    let s = spec(date(2026, 3, 2), date(2026, 3, 9), &[Weekday::Mon], Cadence::Weekly);

    assert_eq!(dates(&s, before_all()), vec![date(2026, 3, 2), date(2026, 3, 9)]);
}

#[test]
fn one_weekday_weekly_over_two_full_weeks() {
    let s = spec(date(2026, 3, 2), date(2026, 3, 15), &[Weekday::Mon], Cadence::Weekly);

    assert_eq!(dates(&s, before_all()).len(), 2);
}

#[test]
fn two_weekdays_weekly_over_two_full_weeks() {
    let s = spec(
        date(2026, 3, 2),
        date(2026, 3, 15),
        &[Weekday::Mon, Weekday::Wed],
        Cadence::Weekly,
    );

    assert_eq!(
        dates(&s, before_all()),
        vec![
            date(2026, 3, 2),
            date(2026, 3, 4),
            date(2026, 3, 9),
            date(2026, 3, 11),
        ]
    );
}

#[test]
fn two_weekdays_weekly_ending_on_second_monday() {
    // Wednesday of week 2 is past the inclusive end date.
    let s = spec(
        date(2026, 3, 2),
        date(2026, 3, 9),
        &[Weekday::Mon, Weekday::Wed],
        Cadence::Weekly,
    );

    assert_eq!(
        dates(&s, before_all()),
        vec![date(2026, 3, 2), date(2026, 3, 4), date(2026, 3, 9)]
    );
}

// ---------------------------------------------------------------------------
// Cadence
// ---------------------------------------------------------------------------

#[test]
fn biweekly_halves_weekly_over_four_weeks() {
    let start = date(2026, 3, 2);
    let end = date(2026, 3, 29);

    let weekly = dates(&spec(start, end, &[Weekday::Mon], Cadence::Weekly), before_all());
    let biweekly = dates(&spec(start, end, &[Weekday::Mon], Cadence::Biweekly), before_all());

    assert_eq!(weekly.len(), 4);
    assert_eq!(biweekly.len(), 2);
    assert_eq!(biweekly, vec![date(2026, 3, 2), date(2026, 3, 16)]);
}

#[test]
fn biweekly_halves_weekly_with_two_weekdays() {
    let start = date(2026, 3, 2);
    let end = date(2026, 3, 29);
    let days = [Weekday::Tue, Weekday::Sat];

    let weekly = expand(&spec(start, end, &days, Cadence::Weekly), before_all());
    let biweekly = expand(&spec(start, end, &days, Cadence::Biweekly), before_all());

    assert_eq!(weekly.len(), 8);
    assert_eq!(biweekly.len() * 2, weekly.len());
}

#[test]
fn biweekly_single_week_yields_only_anchor_week() {
    let all = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    let s = spec(date(2026, 3, 2), date(2026, 3, 8), &all, Cadence::Biweekly);

    let result = dates(&s, before_all());
    assert_eq!(result.len(), 7);
    assert!(result.iter().all(|d| *d <= date(2026, 3, 8)));
}

#[test]
fn biweekly_counts_from_range_start_not_calendar_week() {
    // Range starts on a Thursday: the first Monday anchor is 03-09.
    let s = spec(date(2026, 3, 5), date(2026, 4, 5), &[Weekday::Mon], Cadence::Biweekly);

    assert_eq!(dates(&s, before_all()), vec![date(2026, 3, 9), date(2026, 3, 23)]);
}

// ---------------------------------------------------------------------------
// Degenerate ranges
// ---------------------------------------------------------------------------

#[test]
fn single_day_range_matching_weekday() {
    let s = spec(date(2026, 3, 4), date(2026, 3, 4), &[Weekday::Wed], Cadence::Weekly);

    assert_eq!(dates(&s, before_all()), vec![date(2026, 3, 4)]);
}

#[test]
fn single_day_range_other_weekday() {
    let s = spec(date(2026, 3, 4), date(2026, 3, 4), &[Weekday::Mon], Cadence::Weekly);

    assert!(expand(&s, before_all()).is_empty());
}

#[test]
fn weekday_outside_range_yields_nothing() {
    // Mon 03-02 .. Wed 03-04 contains no Friday.
    let s = spec(date(2026, 3, 2), date(2026, 3, 4), &[Weekday::Fri], Cadence::Weekly);

    assert!(expand(&s, before_all()).is_empty());
    assert_eq!(try_expand(&s, before_all()), Ok(vec![]));
}

#[test]
fn empty_weekdays_yields_nothing() {
    let s = spec(date(2026, 3, 2), date(2026, 3, 29), &[], Cadence::Weekly);

    assert!(expand(&s, before_all()).is_empty());
    assert_eq!(try_expand(&s, before_all()), Err(RecurrenceError::EmptyWeekdays));
}

#[test]
fn inverted_date_range_yields_nothing() {
    let s = spec(date(2026, 3, 9), date(2026, 3, 2), &[Weekday::Mon], Cadence::Weekly);

    assert!(expand(&s, before_all()).is_empty());
    assert_eq!(
        try_expand(&s, before_all()),
        Err(RecurrenceError::InvertedDateRange)
    );
}

#[test]
fn empty_time_window_yields_nothing() {
    let mut s = spec(date(2026, 3, 2), date(2026, 3, 9), &[Weekday::Mon], Cadence::Weekly);
    s.end_time = s.start_time;

    assert!(expand(&s, before_all()).is_empty());
    assert_eq!(
        try_expand(&s, before_all()),
        Err(RecurrenceError::InvertedTimeWindow)
    );
}

// ---------------------------------------------------------------------------
// Today clamp
// ---------------------------------------------------------------------------

#[test]
fn occurrences_before_today_are_never_generated() {
    let s = spec(date(2026, 2, 2), date(2026, 3, 15), &[Weekday::Mon], Cadence::Weekly);

    // Tuesday 03-03: Monday 03-02 is already past.
    assert_eq!(dates(&s, date(2026, 3, 3)), vec![date(2026, 3, 9)]);
}

#[test]
fn today_itself_is_included() {
    let s = spec(date(2026, 2, 2), date(2026, 3, 15), &[Weekday::Mon], Cadence::Weekly);

    assert_eq!(
        dates(&s, date(2026, 3, 2)),
        vec![date(2026, 3, 2), date(2026, 3, 9)]
    );
}

#[test]
fn range_entirely_in_the_past_is_valid_but_empty() {
    let s = spec(date(2026, 3, 2), date(2026, 3, 15), &[Weekday::Mon], Cadence::Weekly);

    assert_eq!(try_expand(&s, date(2026, 4, 1)), Ok(vec![]));
}

// ---------------------------------------------------------------------------
// Output shape
// ---------------------------------------------------------------------------

#[test]
fn occurrences_carry_the_spec_time_window() {
    let mut s = spec(date(2026, 3, 2), date(2026, 3, 15), &[Weekday::Fri], Cadence::Weekly);
    s.start_time = time(17, 30);
    s.end_time = time(19, 0);

    let result = expand(&s, before_all());
    assert_eq!(result.len(), 2);
    for o in &result {
        assert_eq!(o.start_time, time(17, 30));
        assert_eq!(o.end_time, time(19, 0));
    }
}

#[test_log::test]
fn expansion_is_idempotent() {
    let s = spec(
        date(2026, 3, 2),
        date(2026, 6, 30),
        &[Weekday::Mon, Weekday::Thu, Weekday::Sun],
        Cadence::Biweekly,
    );

    assert_eq!(expand(&s, before_all()), expand(&s, before_all()));
}

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

fn input(start: &str, end: &str, weekdays: Vec<u8>) -> RecurrenceInput {
    RecurrenceInput {
        start_date: start.to_string(),
        end_date: end.to_string(),
        start_time: "10:00".to_string(),
        end_time: "11:00".to_string(),
        weekdays,
        cadence: Cadence::Weekly,
    }
}

#[test]
fn input_with_dotted_dates_expands() {
    let result = expand_input(&input("2.3.2026", "15.3.2026", vec![0, 2]), before_all());

    assert_eq!(result.len(), 4);
    assert_eq!(result[0].date, date(2026, 3, 2));
    assert_eq!(result[0].start_time, time(10, 0));
}

#[test]
fn malformed_date_is_swallowed() {
    let bad = input("31.02.2026", "15.3.2026", vec![0]);

    assert!(expand_input(&bad, before_all()).is_empty());
    assert!(matches!(
        try_expand_input(&bad, before_all()),
        Err(RecurrenceError::InvalidDate(_))
    ));
}

#[test]
fn out_of_range_weekday_index_is_swallowed() {
    let bad = input("2026-03-02", "2026-03-15", vec![0, 7]);

    assert!(expand_input(&bad, before_all()).is_empty());
    assert_eq!(
        try_expand_input(&bad, before_all()),
        Err(RecurrenceError::InvalidWeekday(7))
    );
}

#[test]
fn input_deserializes_with_default_cadence() {
    let raw: RecurrenceInput = serde_json::from_str(
        r#"{"start_date":"2026-03-02","end_date":"2026-03-29",
            "start_time":"10:00","end_time":"11:00","weekdays":[0]}"#,
    )
    .unwrap();

    assert_eq!(raw.cadence, Cadence::Weekly);
    assert_eq!(expand_input(&raw, before_all()).len(), 4);
}
