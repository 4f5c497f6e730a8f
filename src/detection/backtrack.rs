//! Backtracking from a confirmed trend to its onset
//!
//! A phase is only confirmed after enough samples show the trend, by which
//! time the transition itself is already a few samples in the past. The
//! backtrack window still holds those samples; the onset is the first sample
//! after which the speed moves in the confirmed direction.

use crate::detection::VerticalSpeedSample;
use crate::types::FlightPoint;
use crate::window::BoundedBuffer;

/// Onset of a rising (`is_rising`) or falling vertical speed trend
///
/// Scans adjacent pairs oldest first and returns the earlier sample of the
/// first pair that moves in the requested direction. With no such pair the
/// oldest sample is returned; an empty window yields `None`.
pub fn find_inflection(
    samples: &BoundedBuffer<VerticalSpeedSample>,
    is_rising: bool,
) -> Option<FlightPoint> {
    let oldest = samples.oldest()?;

    samples
        .iter()
        .zip(samples.iter().skip(1))
        .find(|(prev, curr)| {
            if is_rising {
                curr.speed > prev.speed
            } else {
                curr.speed < prev.speed
            }
        })
        .map(|(prev, _)| prev.to_point())
        .or_else(|| Some(oldest.to_point()))
}
