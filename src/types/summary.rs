use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::conversion::elapsed_seconds;
use crate::types::{DetectedEvents, FlightPhase, OutputRow};

/// Per-track result of a detection run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlightSummary {
    pub name: String,
    pub format: String,
    pub samples: usize,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub final_phase: FlightPhase,
    pub events: DetectedEvents,
    /// Samples rewritten by the despike stage
    pub despiked_samples: usize,
    /// Time between exit and deployment
    pub freefall_seconds: Option<f64>,
}

impl FlightSummary {
    /// Build a summary from the sample times of a track and its last annotated row
    pub fn from_track<S>(
        name: impl Into<String>,
        format: impl Into<String>,
        times: &[DateTime<Utc>],
        last: Option<&OutputRow<S>>,
        despiked_samples: usize,
    ) -> Self {
        let events = last.map(OutputRow::events).unwrap_or_default();
        let time_at = |index: usize| times.get(index).copied();
        let freefall_seconds = match (events.freefall, events.canopy) {
            (Some(exit), Some(deploy)) => match (time_at(exit.index), time_at(deploy.index)) {
                (Some(from), Some(to)) => Some(elapsed_seconds(from, to)),
                _ => None,
            },
            _ => None,
        };

        Self {
            name: name.into(),
            format: format.into(),
            samples: times.len(),
            start_time: times.first().copied(),
            end_time: times.last().copied(),
            final_phase: last.map(|row| row.phase).unwrap_or_default(),
            events,
            despiked_samples,
            freefall_seconds,
        }
    }

    /// Track duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => elapsed_seconds(start, end),
            _ => 0.0,
        }
    }

    /// A track is a jump when freefall was detected
    pub fn is_valid(&self) -> bool {
        self.events.freefall.is_some()
    }

    pub fn exit_altitude(&self) -> Option<f64> {
        self.events.freefall.map(|point| point.altitude)
    }

    pub fn deployment_altitude(&self) -> Option<f64> {
        self.events.canopy.map(|point| point.altitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FlightPoint;
    use chrono::TimeDelta;

    fn times(count: usize) -> Vec<DateTime<Utc>> {
        let start = DateTime::<Utc>::UNIX_EPOCH;
        (0..count)
            .map(|i| start + TimeDelta::milliseconds(200 * i as i64))
            .collect()
    }

    #[test]
    fn test_summary_without_rows() {
        let summary = FlightSummary::from_track::<()>("empty", "flysight", &[], None, 0);
        assert_eq!(summary.samples, 0);
        assert_eq!(summary.duration_seconds(), 0.0);
        assert_eq!(summary.final_phase, FlightPhase::BeforeTakeoff);
        assert!(!summary.is_valid());
    }

    #[test]
    fn test_summary_freefall_time() {
        let mut events = DetectedEvents::default();
        events.record(
            FlightPhase::Freefall,
            FlightPoint {
                index: 10,
                altitude: 4000.0,
            },
        );
        events.record(
            FlightPhase::Canopy,
            FlightPoint {
                index: 260,
                altitude: 1500.0,
            },
        );
        events.finish(299);
        let last = OutputRow::new(FlightPhase::Canopy, &events, ());

        let summary = FlightSummary::from_track("jump", "flysight", &times(300), Some(&last), 2);
        assert!(summary.is_valid());
        assert_eq!(summary.freefall_seconds, Some(50.0));
        assert_eq!(summary.exit_altitude(), Some(4000.0));
        assert_eq!(summary.deployment_altitude(), Some(1500.0));
        assert!((summary.duration_seconds() - 59.8).abs() < 1e-9);
        assert_eq!(summary.despiked_samples, 2);
    }
}
