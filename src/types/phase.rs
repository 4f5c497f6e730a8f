use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stage of a skydive, in flight order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FlightPhase {
    #[default]
    BeforeTakeoff,
    Takeoff,
    Freefall,
    Canopy,
    Landing,
}

impl FlightPhase {
    pub const ALL: [FlightPhase; 5] = [
        FlightPhase::BeforeTakeoff,
        FlightPhase::Takeoff,
        FlightPhase::Freefall,
        FlightPhase::Canopy,
        FlightPhase::Landing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightPhase::BeforeTakeoff => "before_takeoff",
            FlightPhase::Takeoff => "takeoff",
            FlightPhase::Freefall => "freefall",
            FlightPhase::Canopy => "canopy",
            FlightPhase::Landing => "landing",
        }
    }
}

impl fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlightPhase::ALL
            .into_iter()
            .find(|phase| phase.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown flight phase '{s}'"))
    }
}

/// Where an event happened: sample index and altitude at that sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlightPoint {
    pub index: usize,
    pub altitude: f64,
}

/// Phase transitions confirmed so far
///
/// Each slot is written at most once; the first confirmation wins.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectedEvents {
    pub takeoff: Option<FlightPoint>,
    pub freefall: Option<FlightPoint>,
    pub canopy: Option<FlightPoint>,
    pub landing: Option<FlightPoint>,
    pub last_point: usize,
    pub is_valid: bool,
}

impl DetectedEvents {
    fn slot_mut(&mut self, phase: FlightPhase) -> Option<&mut Option<FlightPoint>> {
        match phase {
            FlightPhase::BeforeTakeoff => None,
            FlightPhase::Takeoff => Some(&mut self.takeoff),
            FlightPhase::Freefall => Some(&mut self.freefall),
            FlightPhase::Canopy => Some(&mut self.canopy),
            FlightPhase::Landing => Some(&mut self.landing),
        }
    }

    /// Event point recorded for `phase`, if any
    pub fn get(&self, phase: FlightPhase) -> Option<FlightPoint> {
        match phase {
            FlightPhase::BeforeTakeoff => None,
            FlightPhase::Takeoff => self.takeoff,
            FlightPhase::Freefall => self.freefall,
            FlightPhase::Canopy => self.canopy,
            FlightPhase::Landing => self.landing,
        }
    }

    /// Fill the slot for `phase` if it is still empty.
    ///
    /// Returns true when the point was stored.
    pub fn record(&mut self, phase: FlightPhase, point: FlightPoint) -> bool {
        match self.slot_mut(phase) {
            Some(slot) if slot.is_none() => {
                *slot = Some(point);
                self.is_valid = self.freefall.is_some();
                true
            }
            _ => false,
        }
    }

    /// Close a processing step at `sample_index`
    pub fn finish(&mut self, sample_index: usize) {
        self.is_valid = self.freefall.is_some();
        self.last_point = sample_index;
    }

    /// Number of filled event slots
    pub fn count(&self) -> usize {
        [self.takeoff, self.freefall, self.canopy, self.landing]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }
}
