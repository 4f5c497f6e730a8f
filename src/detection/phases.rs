//! Per-phase detectors and the merge that runs them
//!
//! Every detector has the same shape: it looks at the stream state and the
//! current row and answers with the phase the flight is in afterwards, plus
//! the onset point when it has just confirmed its own phase. Detectors run
//! in flight order and each one sees what the previous ones decided in the
//! same step, so a single sample may advance more than one phase.

use tracing::debug;

use crate::config::DetectionConfig;
use crate::detection::backtrack::find_inflection;
use crate::detection::{PeakSignal, StreamState};
use crate::types::{FlightPhase, FlightPoint, InputRow};

/// A single phase detector
pub type Detector<S> =
    fn(&StreamState<S>, &InputRow<S>, &DetectionConfig) -> (FlightPhase, Option<FlightPoint>);

/// Detectors in the order they run
pub fn detectors<S>() -> [(FlightPhase, Detector<S>); 4] {
    [
        (FlightPhase::Takeoff, detect_takeoff::<S> as Detector<S>),
        (FlightPhase::Freefall, detect_freefall::<S> as Detector<S>),
        (FlightPhase::Canopy, detect_canopy::<S> as Detector<S>),
        (FlightPhase::Landing, detect_landing::<S> as Detector<S>),
    ]
}

/// Run all detectors over `state` and merge their results.
///
/// An event slot is only filled while empty; `last_point` and `is_valid` are
/// refreshed once all detectors have run.
pub fn run_detectors<S>(mut state: StreamState<S>, config: &DetectionConfig) -> StreamState<S> {
    for (event, detector) in detectors::<S>() {
        let (phase, point) = detector(&state, &state.input_point, config);
        state.detected_phase = phase;

        if let Some(point) = point {
            if state.detected_events.record(event, point) {
                debug!(
                    phase = %event,
                    sample_index = state.sample_index,
                    index = point.index,
                    altitude = point.altitude,
                    "phase confirmed"
                );
            }
        }
    }
    state.detected_events.finish(state.sample_index);
    state
}

/// Climbing or moving at aircraft speed
pub fn detect_takeoff<S>(
    state: &StreamState<S>,
    point: &InputRow<S>,
    config: &DetectionConfig,
) -> (FlightPhase, Option<FlightPoint>) {
    if state.detected_phase != FlightPhase::BeforeTakeoff {
        return (state.detected_phase, None);
    }

    let kinematics = &state.kinematics;
    if kinematics.smoothed_vertical_speed > config.takeoff_vertical_speed
        || kinematics.horizontal_speed > config.takeoff_horizontal_speed
    {
        let onset = onset_or_current(state, point, true);
        (FlightPhase::Takeoff, Some(onset))
    } else {
        (state.detected_phase, None)
    }
}

/// Sustained descent faster than any aircraft approach
pub fn detect_freefall<S>(
    state: &StreamState<S>,
    point: &InputRow<S>,
    config: &DetectionConfig,
) -> (FlightPhase, Option<FlightPoint>) {
    if !matches!(
        state.detected_phase,
        FlightPhase::BeforeTakeoff | FlightPhase::Takeoff
    ) {
        return (state.detected_phase, None);
    }

    if state.kinematics.smoothed_vertical_speed < -config.freefall_vertical_speed {
        let onset = onset_or_current(state, point, false);
        (FlightPhase::Freefall, Some(onset))
    } else {
        (state.detected_phase, None)
    }
}

/// Deceleration after freefall: slow enough for a canopy, or an opening shock
pub fn detect_canopy<S>(
    state: &StreamState<S>,
    point: &InputRow<S>,
    config: &DetectionConfig,
) -> (FlightPhase, Option<FlightPoint>) {
    if state.detected_phase != FlightPhase::Freefall {
        return (state.detected_phase, None);
    }

    let kinematics = &state.kinematics;
    let decelerating = kinematics.smoothed_vertical_acceleration > 0.0;
    let slow = kinematics.smoothed_vertical_speed > -config.canopy_vertical_speed;
    let shock = state.shock_signal == PeakSignal::PositivePeak;

    if decelerating && (slow || shock) {
        let onset = onset_or_current(state, point, true);
        (FlightPhase::Canopy, Some(onset))
    } else {
        (state.detected_phase, None)
    }
}

/// A full landing window of near-zero vertical speed while standing still
pub fn detect_landing<S>(
    state: &StreamState<S>,
    point: &InputRow<S>,
    config: &DetectionConfig,
) -> (FlightPhase, Option<FlightPoint>) {
    if state.detected_phase != FlightPhase::Canopy {
        return (state.detected_phase, None);
    }

    let landing = &state.windows.landing;
    let settled = landing.is_full()
        && landing
            .iter()
            .all(|speed| speed.abs() < config.landing_vertical_speed);
    if !settled || state.kinematics.horizontal_speed >= config.landing_horizontal_speed {
        return (state.detected_phase, None);
    }

    let backtrack = &state.windows.backtrack;
    let onset = backtrack
        .newest_n(config.landing_window_size)
        .next()
        .or_else(|| backtrack.oldest())
        .map(|sample| sample.to_point())
        .unwrap_or_else(|| current_point(state, point));
    (FlightPhase::Landing, Some(onset))
}

fn onset_or_current<S>(state: &StreamState<S>, point: &InputRow<S>, is_rising: bool) -> FlightPoint {
    find_inflection(&state.windows.backtrack, is_rising).unwrap_or_else(|| current_point(state, point))
}

fn current_point<S>(state: &StreamState<S>, point: &InputRow<S>) -> FlightPoint {
    FlightPoint {
        index: state.sample_index,
        altitude: point.altitude,
    }
}
