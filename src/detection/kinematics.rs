//! Per-sample kinematics with median smoothing
//!
//! Smoothed vertical speed is the median of the smoothing window plus the
//! current raw value; the median shrugs off isolated spikes that slipped
//! through despiking. Vertical acceleration is the change in smoothed speed
//! between consecutive samples and is not divided by the elapsed time.

use crate::types::InputRow;
use crate::window::BoundedBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kinematics {
    pub vertical_speed: f64,
    pub north_speed: f64,
    pub east_speed: f64,
    pub smoothed_vertical_speed: f64,
    /// Smoothed speed delta from the previous sample (m/s per sample)
    pub smoothed_vertical_acceleration: f64,
    pub horizontal_speed: f64,
    pub total_speed: f64,
}

impl Kinematics {
    /// Kinematics of a first sample, with no history to smooth against
    pub fn create<S>(point: &InputRow<S>) -> Self {
        let velocity = point.velocity;
        Self {
            vertical_speed: velocity.vertical,
            north_speed: velocity.north,
            east_speed: velocity.east,
            smoothed_vertical_speed: velocity.vertical,
            smoothed_vertical_acceleration: 0.0,
            horizontal_speed: velocity.horizontal(),
            total_speed: velocity.magnitude(),
        }
    }

    /// Kinematics of `point` given the previous sample's values and the
    /// smoothing window as it stood before this sample
    pub fn compute<S>(
        point: &InputRow<S>,
        previous: &Kinematics,
        smoothing: &BoundedBuffer<f64>,
    ) -> Self {
        Self::smooth(Self::create(point), previous, smoothing)
    }

    /// Smooth already-derived raw kinematics against the smoothing window
    ///
    /// Used when the raw values did not come straight from a row, e.g. after
    /// the despike stage interpolated them.
    pub fn smooth(
        raw: Kinematics,
        previous: &Kinematics,
        smoothing: &BoundedBuffer<f64>,
    ) -> Self {
        let smoothed = if smoothing.is_empty() {
            raw.vertical_speed
        } else {
            median(smoothing.iter().copied().chain(std::iter::once(raw.vertical_speed)))
                .unwrap_or(raw.vertical_speed)
        };

        Self {
            smoothed_vertical_speed: smoothed,
            smoothed_vertical_acceleration: smoothed - previous.smoothed_vertical_speed,
            ..raw
        }
    }

    /// Componentwise linear interpolation towards `other`
    pub fn interpolate(&self, other: &Kinematics, t: f64) -> Kinematics {
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        Kinematics {
            vertical_speed: lerp(self.vertical_speed, other.vertical_speed),
            north_speed: lerp(self.north_speed, other.north_speed),
            east_speed: lerp(self.east_speed, other.east_speed),
            smoothed_vertical_speed: lerp(
                self.smoothed_vertical_speed,
                other.smoothed_vertical_speed,
            ),
            smoothed_vertical_acceleration: lerp(
                self.smoothed_vertical_acceleration,
                other.smoothed_vertical_acceleration,
            ),
            horizontal_speed: lerp(self.horizontal_speed, other.horizontal_speed),
            total_speed: lerp(self.total_speed, other.total_speed),
        }
    }
}

/// Median of `values`; an even count averages the two middle values
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sorted: Vec<f64> = values.into_iter().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}
