//! Export filtering heuristics
//!
//! A FlySight records from power-on, so a card is full of tracks that never
//! left the ground: walks to the plane, tests in the hangar, rides that came
//! down with the aircraft. These are skipped unless export is forced.

use crate::types::FlightSummary;

/// Fewer samples than this is not a track worth looking at
pub const MIN_SAMPLES: usize = 10;

/// Seconds; nothing shorter holds a climb and a jump
pub const MIN_DURATION_SECONDS: f64 = 30.0;

/// Determines if a track should be skipped for export
///
/// # Arguments
/// * `summary` - Detection result for the track
/// * `force_export` - If true, never skips
///
/// # Returns
/// Tuple of (should_skip, reason_description)
pub fn should_skip_export(summary: &FlightSummary, force_export: bool) -> (bool, String) {
    if force_export {
        return (false, String::new());
    }

    if summary.samples < MIN_SAMPLES {
        return (
            true,
            format!("too few samples ({} < {})", summary.samples, MIN_SAMPLES),
        );
    }

    let duration = summary.duration_seconds();
    if duration < MIN_DURATION_SECONDS {
        return (
            true,
            format!("too short ({duration:.1}s < {MIN_DURATION_SECONDS:.1}s)"),
        );
    }

    if !summary.is_valid() {
        return (
            true,
            format!(
                "no freefall detected (last phase: {})",
                summary.final_phase
            ),
        );
    }

    (false, String::new())
}
