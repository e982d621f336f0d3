//! WASM bindings for recurrence-engine.
//!
//! Exposes recurrence expansion, collision detection and the occurrence-set
//! operations to the booking UI via `wasm-bindgen`. All complex types cross
//! the boundary as JSON strings.
//!
//! Malformed JSON is reported as an error. A well-formed but invalid
//! recurrence (bad date literal, no weekdays, inverted range) is not: it
//! expands to `[]`, which is what the UI checks for.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p recurrence-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/recurrence-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/recurrence_engine_wasm.wasm
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use recurrence_engine::recurrence::parse_date;
use recurrence_engine::{
    AnnotatedOccurrence, Buffers, BusyInterval, Candidate, Occurrence, OccurrenceKind,
    RecurrenceInput, RemovalSet,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// Candidate interval as sent from JavaScript.
#[derive(Deserialize)]
struct CandidateInput {
    start: String,
    end: String,
    #[serde(flatten)]
    buffers: Buffers,
    #[serde(default)]
    kind: OccurrenceKind,
}

#[derive(Serialize)]
struct CollisionDto {
    start: String,
    end: String,
    overlap_minutes: i64,
}

// ---------------------------------------------------------------------------
// Helpers, kept free of `JsValue` so they run under native tests
// ---------------------------------------------------------------------------

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Accepts both RFC 3339 (with offset, e.g. "2026-03-02T10:00:00+00:00") and
/// naive local time (e.g. "2026-03-02T10:00:00"), which is taken as UTC.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn parse_json<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn parse_kind(kind: &str) -> Result<OccurrenceKind, String> {
    serde_json::from_value(serde_json::Value::String(kind.to_ascii_lowercase()))
        .map_err(|_| format!("Unknown occurrence kind: '{}'", kind))
}

fn parse_candidate(json: &str) -> Result<Candidate, String> {
    let input: CandidateInput = parse_json(json, "candidate")?;
    Ok(Candidate::new(
        parse_datetime(&input.start)?,
        parse_datetime(&input.end)?,
        input.buffers,
        input.kind,
    ))
}

fn expand_json(input_json: &str, today: &str) -> Result<String, String> {
    let input: RecurrenceInput = parse_json(input_json, "recurrence")?;
    let today: NaiveDate = parse_date(today).map_err(|e| e.to_string())?;
    to_json(&recurrence_engine::expand_input(&input, today))
}

fn validate_json(input_json: &str) -> Result<Option<String>, String> {
    let input: RecurrenceInput = parse_json(input_json, "recurrence")?;
    Ok(input
        .parse()
        .and_then(|spec| spec.validate())
        .err()
        .map(|e| e.to_string()))
}

fn collides_json(candidate_json: &str, busy_json: &str) -> Result<bool, String> {
    let candidate = parse_candidate(candidate_json)?;
    let busy: Vec<BusyInterval> = parse_json(busy_json, "busy intervals")?;
    Ok(recurrence_engine::collides(&candidate, &busy))
}

fn collisions_json(candidate_json: &str, busy_json: &str) -> Result<String, String> {
    let candidate = parse_candidate(candidate_json)?;
    let busy: Vec<BusyInterval> = parse_json(busy_json, "busy intervals")?;
    let dtos: Vec<CollisionDto> = recurrence_engine::find_collisions(&candidate, &busy)
        .iter()
        .map(|c| CollisionDto {
            start: c.busy.start.to_rfc3339(),
            end: c.busy.end.to_rfc3339(),
            overlap_minutes: c.overlap_minutes,
        })
        .collect();
    to_json(&dtos)
}

fn annotate_json(
    occurrences_json: &str,
    busy_json: &str,
    kind: &str,
    buffer_before_minutes: i32,
    buffer_after_minutes: i32,
) -> Result<String, String> {
    let occurrences: Vec<Occurrence> = parse_json(occurrences_json, "occurrences")?;
    let busy: Vec<BusyInterval> = parse_json(busy_json, "busy intervals")?;
    let kind = parse_kind(kind)?;
    let buffers = Buffers::minutes(buffer_before_minutes.into(), buffer_after_minutes.into());
    to_json(&recurrence_engine::annotate(&occurrences, &busy, kind, buffers))
}

fn effective_set_json(annotated_json: &str, removed_json: &str) -> Result<String, String> {
    let annotated: Vec<AnnotatedOccurrence> = parse_json(annotated_json, "annotated occurrences")?;
    let removed: RemovalSet = parse_json(removed_json, "removed occurrences")?;
    to_json(&recurrence_engine::effective_set(&annotated, &removed))
}

fn toggle_removed_json(removed_json: &str, occurrence_json: &str) -> Result<String, String> {
    let removed: RemovalSet = parse_json(removed_json, "removed occurrences")?;
    let occurrence: Occurrence = parse_json(occurrence_json, "occurrence")?;
    to_json(&recurrence_engine::toggle_removed(&removed, occurrence))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

fn js_err(message: String) -> JsValue {
    JsValue::from_str(&message)
}

/// Expand a recurrence into occurrences.
///
/// `input_json` is a `RecurrenceInput` object (`start_date`, `end_date`,
/// `start_time`, `end_time`, `weekdays` Monday-first, `cadence`). `today` is a
/// date string. Returns a JSON array of `{date, start_time, end_time}`; an
/// invalid recurrence yields `[]`.
#[wasm_bindgen(js_name = "expandRecurrence")]
pub fn expand_recurrence(input_json: &str, today: &str) -> Result<String, JsValue> {
    expand_json(input_json, today).map_err(js_err)
}

/// Explain why a recurrence would expand to nothing, or `undefined` when it is
/// structurally valid.
#[wasm_bindgen(js_name = "validateRecurrence")]
pub fn validate_recurrence(input_json: &str) -> Result<Option<String>, JsValue> {
    validate_json(input_json).map_err(js_err)
}

/// Whether a candidate `{start, end, buffer_before, buffer_after, kind}`
/// collides with any busy interval in `busy_json`.
#[wasm_bindgen(js_name = "collides")]
pub fn collides(candidate_json: &str, busy_json: &str) -> Result<bool, JsValue> {
    collides_json(candidate_json, busy_json).map_err(js_err)
}

/// Every busy interval a candidate collides with, as `{start, end, overlap_minutes}`.
#[wasm_bindgen(js_name = "findCollisions")]
pub fn find_collisions(candidate_json: &str, busy_json: &str) -> Result<String, JsValue> {
    collisions_json(candidate_json, busy_json).map_err(js_err)
}

/// Flag each occurrence that collides with the busy intervals when booked as
/// `kind` with the given buffers.
#[wasm_bindgen(js_name = "annotateOccurrences")]
pub fn annotate_occurrences(
    occurrences_json: &str,
    busy_json: &str,
    kind: &str,
    buffer_before_minutes: i32,
    buffer_after_minutes: i32,
) -> Result<String, JsValue> {
    annotate_json(
        occurrences_json,
        busy_json,
        kind,
        buffer_before_minutes,
        buffer_after_minutes,
    )
    .map_err(js_err)
}

/// Occurrences that are neither overlapping nor manually removed.
#[wasm_bindgen(js_name = "effectiveSet")]
pub fn effective_set(annotated_json: &str, removed_json: &str) -> Result<String, JsValue> {
    effective_set_json(annotated_json, removed_json).map_err(js_err)
}

/// Return a new removal set with `occurrence_json` added or restored.
#[wasm_bindgen(js_name = "toggleRemoved")]
pub fn toggle_removed(removed_json: &str, occurrence_json: &str) -> Result<String, JsValue> {
    toggle_removed_json(removed_json, occurrence_json).map_err(js_err)
}
