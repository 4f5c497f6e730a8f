//! Detection configuration
//!
//! Every window size and threshold the detection core uses lives in
//! [`DetectionConfig`]. With the `config` feature the values can also be
//! loaded from a TOML file and `SKYDIVE_`-prefixed environment variables on
//! top of the defaults.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::detection::PeakConfig;
use crate::error::{Error, Result};

/// Smallest despike window that still has two anchors around a focus
pub const MIN_PREPROCESS_WINDOW_SIZE: usize = 2;

/// Prefix for configuration environment variables
#[cfg(feature = "config")]
pub const ENV_PREFIX: &str = "SKYDIVE_";

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectionConfig {
    /// Raw vertical speeds feeding the median smoother
    pub smoothing_window_size: usize,
    /// Smoothed vertical speeds that must all be near zero to confirm landing
    pub landing_window_size: usize,
    /// Recent samples kept for backtracking to an event's true onset
    pub backtrack_window_size: usize,
    /// Despike window; values below 2 are raised to 2
    pub preprocess_window_size: usize,
    /// Vertical speed deviation (m/s) from the interpolated value that marks a spike
    pub acceleration_clip_threshold: f64,
    /// Shock detector applied to smoothed vertical acceleration
    pub peak: PeakConfig,
    /// Climb rate (m/s) that confirms takeoff
    pub takeoff_vertical_speed: f64,
    /// Ground speed (m/s) that confirms takeoff
    pub takeoff_horizontal_speed: f64,
    /// Descent rate (m/s) that confirms freefall
    pub freefall_vertical_speed: f64,
    /// Descent rate (m/s) under which a decelerating jumper is under canopy
    pub canopy_vertical_speed: f64,
    /// Largest vertical speed magnitude (m/s) still counted as standing on the ground
    pub landing_vertical_speed: f64,
    /// Largest ground speed (m/s) still counted as standing on the ground
    pub landing_horizontal_speed: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            smoothing_window_size: 5,
            landing_window_size: 10,
            backtrack_window_size: 10,
            preprocess_window_size: 5,
            acceleration_clip_threshold: 10.0,
            peak: PeakConfig::default(),
            takeoff_vertical_speed: 1.5,
            takeoff_horizontal_speed: 25.0,
            freefall_vertical_speed: 10.0,
            canopy_vertical_speed: 15.0,
            landing_vertical_speed: 1.0,
            landing_horizontal_speed: 3.0,
        }
    }
}

impl DetectionConfig {
    /// Despike window size after clamping
    pub fn preprocess_window(&self) -> usize {
        self.preprocess_window_size.max(MIN_PREPROCESS_WINDOW_SIZE)
    }

    /// Check that every window can be built and every threshold is usable
    pub fn validate(&self) -> Result<()> {
        for (name, size) in [
            ("smoothing_window_size", self.smoothing_window_size),
            ("landing_window_size", self.landing_window_size),
            ("backtrack_window_size", self.backtrack_window_size),
        ] {
            if size == 0 {
                return Err(Error::invalid_config(format!(
                    "{name} must be at least 1"
                )));
            }
        }

        for (name, value) in [
            ("acceleration_clip_threshold", self.acceleration_clip_threshold),
            ("takeoff_vertical_speed", self.takeoff_vertical_speed),
            ("takeoff_horizontal_speed", self.takeoff_horizontal_speed),
            ("freefall_vertical_speed", self.freefall_vertical_speed),
            ("canopy_vertical_speed", self.canopy_vertical_speed),
            ("landing_vertical_speed", self.landing_vertical_speed),
            ("landing_horizontal_speed", self.landing_horizontal_speed),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid_config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.canopy_vertical_speed <= self.freefall_vertical_speed {
            return Err(Error::invalid_config(format!(
                "canopy_vertical_speed ({}) must be greater than freefall_vertical_speed ({})",
                self.canopy_vertical_speed, self.freefall_vertical_speed
            )));
        }

        self.peak.validate()
    }

    /// Load defaults, then an optional TOML file, then `SKYDIVE_*` variables
    ///
    /// Nested keys use a double underscore, e.g. `SKYDIVE_PEAK__LAG=20`.
    #[cfg(feature = "config")]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(DetectionConfig::default()));
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(Error::invalid_config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: DetectionConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }
}
