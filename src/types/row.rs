use chrono::{DateTime, Utc};
use std::ops::{Add, Div, Mul, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::{DetectedEvents, FlightPhase, FlightPoint};

/// Velocity vector in metres per second, `vertical` positive upward
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoVector {
    pub north: f64,
    pub east: f64,
    pub vertical: f64,
}

impl GeoVector {
    pub fn new(north: f64, east: f64, vertical: f64) -> Self {
        Self {
            north,
            east,
            vertical,
        }
    }

    /// Euclidean norm of all three components
    pub fn magnitude(&self) -> f64 {
        (self.north * self.north + self.east * self.east + self.vertical * self.vertical).sqrt()
    }

    /// Ground speed: norm of the north/east components only
    pub fn horizontal(&self) -> f64 {
        self.north.hypot(self.east)
    }

    /// Linear interpolation towards `other`, `t` in [0, 1]
    pub fn lerp(&self, other: &GeoVector, t: f64) -> GeoVector {
        *self + (*other - *self) * t
    }
}

impl Add for GeoVector {
    type Output = GeoVector;

    fn add(self, rhs: GeoVector) -> GeoVector {
        GeoVector::new(
            self.north + rhs.north,
            self.east + rhs.east,
            self.vertical + rhs.vertical,
        )
    }
}

impl Sub for GeoVector {
    type Output = GeoVector;

    fn sub(self, rhs: GeoVector) -> GeoVector {
        GeoVector::new(
            self.north - rhs.north,
            self.east - rhs.east,
            self.vertical - rhs.vertical,
        )
    }
}

impl Mul<f64> for GeoVector {
    type Output = GeoVector;

    fn mul(self, rhs: f64) -> GeoVector {
        GeoVector::new(self.north * rhs, self.east * rhs, self.vertical * rhs)
    }
}

impl Div<f64> for GeoVector {
    type Output = GeoVector;

    fn div(self, rhs: f64) -> GeoVector {
        GeoVector::new(self.north / rhs, self.east / rhs, self.vertical / rhs)
    }
}

/// One canonical telemetry sample
///
/// `source` is whatever the format adapter wants back when the row is
/// written out again; the detection core never looks at it.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRow<S> {
    pub time: DateTime<Utc>,
    /// Altitude above mean sea level in metres
    pub altitude: f64,
    pub velocity: GeoVector,
    pub source: S,
}

impl<S> InputRow<S> {
    pub fn new(time: DateTime<Utc>, altitude: f64, velocity: GeoVector, source: S) -> Self {
        Self {
            time,
            altitude,
            velocity,
            source,
        }
    }

    pub fn vertical_speed(&self) -> f64 {
        self.velocity.vertical
    }
}

/// Annotated output row, one per input row
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow<S> {
    pub phase: FlightPhase,
    pub takeoff: Option<FlightPoint>,
    pub freefall: Option<FlightPoint>,
    pub canopy: Option<FlightPoint>,
    pub landing: Option<FlightPoint>,
    pub last_point: usize,
    pub source: S,
}

impl<S> OutputRow<S> {
    pub fn new(phase: FlightPhase, events: &DetectedEvents, source: S) -> Self {
        Self {
            phase,
            takeoff: events.takeoff,
            freefall: events.freefall,
            canopy: events.canopy,
            landing: events.landing,
            last_point: events.last_point,
            source,
        }
    }

    /// A track counts as a jump once freefall has been confirmed
    pub fn is_valid(&self) -> bool {
        self.freefall.is_some()
    }

    pub fn events(&self) -> DetectedEvents {
        DetectedEvents {
            takeoff: self.takeoff,
            freefall: self.freefall,
            canopy: self.canopy,
            landing: self.landing,
            last_point: self.last_point,
            is_valid: self.is_valid(),
        }
    }
}
