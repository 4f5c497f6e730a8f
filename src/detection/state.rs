//! Stream state threaded through the detection pipeline
//!
//! One [`StreamState`] exists per track. Each step consumes the previous
//! state and returns the next one, so there is never more than one owner.

use tracing::trace;

use crate::config::DetectionConfig;
use crate::detection::phases::run_detectors;
use crate::detection::{Kinematics, PeakDetector, PeakSignal};
use crate::types::{DetectedEvents, FlightPhase, FlightPoint, InputRow, OutputRow};
use crate::window::BoundedBuffer;

/// Smoothed vertical speed at a sample, kept for backtracking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalSpeedSample {
    pub index: usize,
    pub speed: f64,
    pub altitude: f64,
}

impl VerticalSpeedSample {
    pub fn to_point(&self) -> FlightPoint {
        FlightPoint {
            index: self.index,
            altitude: self.altitude,
        }
    }
}

/// The three rolling windows the detectors read
#[derive(Debug, Clone, PartialEq)]
pub struct Windows {
    /// Raw vertical speeds for the median smoother
    pub smoothing: BoundedBuffer<f64>,
    /// Smoothed vertical speeds for landing stability
    pub landing: BoundedBuffer<f64>,
    pub backtrack: BoundedBuffer<VerticalSpeedSample>,
}

impl Windows {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            smoothing: BoundedBuffer::new(config.smoothing_window_size),
            landing: BoundedBuffer::new(config.landing_window_size),
            backtrack: BoundedBuffer::new(config.backtrack_window_size),
        }
    }

    /// Record sample `index` in all three windows
    pub fn update(&mut self, index: usize, altitude: f64, kinematics: &Kinematics) {
        self.smoothing.push(kinematics.vertical_speed);
        self.landing.push(kinematics.smoothed_vertical_speed);
        self.backtrack.push(VerticalSpeedSample {
            index,
            speed: kinematics.smoothed_vertical_speed,
            altitude,
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamState<S> {
    pub input_point: InputRow<S>,
    pub sample_index: usize,
    pub kinematics: Kinematics,
    pub windows: Windows,
    /// Shock detector over smoothed vertical acceleration
    pub shock: PeakDetector,
    pub shock_signal: PeakSignal,
    pub detected_phase: FlightPhase,
    pub detected_events: DetectedEvents,
}

impl<S> StreamState<S> {
    /// State after the first sample of a track
    ///
    /// # Panics
    /// Panics if a window size or the peak lag in `config` is zero; run
    /// [`DetectionConfig::validate`] first.
    pub fn start(first: InputRow<S>, config: &DetectionConfig) -> Self {
        let kinematics = Kinematics::create(&first);
        Self::start_with(first, kinematics, config)
    }

    /// Like [`start`](Self::start) with the row's raw kinematics supplied
    pub fn start_with(
        first: InputRow<S>,
        kinematics: Kinematics,
        config: &DetectionConfig,
    ) -> Self {
        let mut windows = Windows::new(config);
        windows.update(0, first.altitude, &kinematics);
        let mut shock = PeakDetector::new(config.peak);
        let shock_signal = shock.classify(kinematics.smoothed_vertical_acceleration);

        let state = Self {
            input_point: first,
            sample_index: 0,
            kinematics,
            windows,
            shock,
            shock_signal,
            detected_phase: FlightPhase::BeforeTakeoff,
            detected_events: DetectedEvents::default(),
        };
        run_detectors(state, config)
    }

    /// Consume this state and fold in the next sample
    pub fn step(self, point: InputRow<S>, config: &DetectionConfig) -> Self {
        let raw = Kinematics::create(&point);
        self.step_with(point, raw, config)
    }

    /// Like [`step`](Self::step) with the row's raw kinematics supplied
    ///
    /// The despike stage hands over interpolated kinematics for corrected
    /// rows; they are smoothed here instead of being derived from the row.
    pub fn step_with(
        self,
        point: InputRow<S>,
        raw: Kinematics,
        config: &DetectionConfig,
    ) -> Self {
        let StreamState {
            sample_index,
            kinematics: previous,
            mut windows,
            mut shock,
            detected_phase,
            detected_events,
            ..
        } = self;

        let sample_index = sample_index + 1;
        let kinematics = Kinematics::smooth(raw, &previous, &windows.smoothing);
        windows.update(sample_index, point.altitude, &kinematics);
        let shock_signal = shock.classify(kinematics.smoothed_vertical_acceleration);
        if shock_signal != PeakSignal::Stable {
            trace!(
                sample_index,
                acceleration = kinematics.smoothed_vertical_acceleration,
                ?shock_signal,
                "vertical acceleration shock"
            );
        }

        let state = Self {
            input_point: point,
            sample_index,
            kinematics,
            windows,
            shock,
            shock_signal,
            detected_phase,
            detected_events,
        };
        run_detectors(state, config)
    }

    pub fn is_valid(&self) -> bool {
        self.detected_events.freefall.is_some()
    }
}

impl<S: Clone> StreamState<S> {
    /// Annotated row for the current sample
    pub fn output_row(&self) -> OutputRow<S> {
        OutputRow::new(
            self.detected_phase,
            &self.detected_events,
            self.input_point.source.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoVector;
    use chrono::{DateTime, TimeDelta, Utc};

    fn row(i: i64, vertical: f64) -> InputRow<i64> {
        InputRow::new(
            DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(200 * i),
            500.0,
            GeoVector::new(0.0, 0.0, vertical),
            i,
        )
    }

    #[test]
    fn test_start_initialises_from_first_sample() {
        let config = DetectionConfig::default();
        let state = StreamState::start(row(0, 0.0), &config);
        assert_eq!(state.sample_index, 0);
        assert_eq!(state.windows.smoothing.len(), 1);
        assert_eq!(state.windows.landing.len(), 1);
        assert_eq!(state.windows.backtrack.len(), 1);
        assert_eq!(state.detected_phase, FlightPhase::BeforeTakeoff);
        assert_eq!(state.detected_events.last_point, 0);
        assert_eq!(state.output_row().source, 0);
    }

    #[test]
    fn test_step_advances_index_and_windows() {
        let config = DetectionConfig {
            smoothing_window_size: 3,
            ..DetectionConfig::default()
        };
        let mut state = StreamState::start(row(0, 0.0), &config);
        for i in 1..6 {
            state = state.step(row(i, 0.1 * i as f64), &config);
        }
        assert_eq!(state.sample_index, 5);
        assert_eq!(state.windows.smoothing.len(), 3);
        assert_eq!(state.windows.backtrack.newest().unwrap().index, 5);
        assert_eq!(state.detected_events.last_point, 5);
        assert_eq!(state.output_row().source, 5);
    }

    #[test]
    fn test_acceleration_is_per_sample_delta() {
        let config = DetectionConfig {
            smoothing_window_size: 1,
            ..DetectionConfig::default()
        };
        let state = StreamState::start(row(0, -4.0), &config);
        // Median of {-4, -10} is -7
        let state = state.step(row(1, -10.0), &config);
        assert_eq!(state.kinematics.smoothed_vertical_speed, -7.0);
        assert_eq!(state.kinematics.smoothed_vertical_acceleration, -3.0);
    }

    #[test]
    fn test_step_with_uses_supplied_kinematics() {
        let config = DetectionConfig::default();
        let state = StreamState::start(row(0, 0.0), &config);
        let point = row(1, 0.0);
        let raw = Kinematics {
            horizontal_speed: 30.0,
            ..Kinematics::create(&point)
        };
        let state = state.step_with(point, raw, &config);
        assert_eq!(state.kinematics.horizontal_speed, 30.0);
        // The row alone is stationary; only the supplied ground speed reads as takeoff
        assert_eq!(state.detected_phase, FlightPhase::Takeoff);
    }
}
