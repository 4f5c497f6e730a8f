//! Data conversion utilities for track parsing and export
//!
//! Vendor files carry timestamps as text and velocities in a north/east/down
//! frame. These helpers turn them into the canonical units the detection
//! core works in, and format detection results for CSV output.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::types::{FlightPhase, FlightPoint};

/// Seconds from `from` to `to`; negative if `to` is earlier
pub fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        // Spans too long for microsecond precision
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}

/// Parse a GNSS timestamp such as `2019-04-20T17:42:05.40Z`
///
/// FlySight writes RFC 3339 with a `Z` suffix; a missing zone is read as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parse a float field, rejecting NaN and infinities
pub fn parse_finite(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// GNSS receivers report velocity down; the core wants it up
pub fn down_to_up(velocity_down: f64) -> f64 {
    -velocity_down
}

/// Event index and altitude as CSV cells, empty when not yet detected
pub fn format_point(point: Option<FlightPoint>) -> (String, String) {
    match point {
        Some(point) => (point.index.to_string(), format!("{:.3}", point.altitude)),
        None => (String::new(), String::new()),
    }
}

/// Phase name for CSV output
pub fn format_phase(phase: FlightPhase) -> &'static str {
    phase.as_str()
}
