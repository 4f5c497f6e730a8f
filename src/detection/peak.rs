//! Causal z-score peak classifier
//!
//! Each value is compared against the mean and standard deviation of the
//! previous `lag` values. A value further than `threshold` standard
//! deviations from the mean is a peak; peaks enter the baseline damped by
//! `influence` so a single extreme sample cannot drag the baseline with it.
//! Memory is O(lag) for any input length.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::window::BoundedBuffer;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PeakConfig {
    /// Baseline window size
    pub lag: usize,
    /// Standard deviations from the mean that make a peak
    pub threshold: f64,
    /// Weight of a peak value when it enters the baseline, in [0, 1]
    pub influence: f64,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            lag: 30,
            threshold: 5.0,
            influence: 0.5,
        }
    }
}

impl PeakConfig {
    pub fn validate(&self) -> Result<()> {
        if self.lag == 0 {
            return Err(Error::invalid_config("peak lag must be at least 1"));
        }
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(Error::invalid_config(format!(
                "peak threshold must be positive, got {}",
                self.threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.influence) {
            return Err(Error::invalid_config(format!(
                "peak influence must be within [0, 1], got {}",
                self.influence
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PeakSignal {
    #[default]
    Stable,
    PositivePeak,
    NegativePeak,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeakDetector {
    config: PeakConfig,
    baseline: BoundedBuffer<f64>,
    seen: usize,
    mean: f64,
    std_dev: f64,
}

impl PeakDetector {
    /// # Panics
    /// Panics if `config.lag` is zero.
    pub fn new(config: PeakConfig) -> Self {
        assert!(config.lag >= 1, "peak detector lag must be at least 1");
        Self {
            config,
            baseline: BoundedBuffer::new(config.lag),
            seen: 0,
            mean: 0.0,
            std_dev: 0.0,
        }
    }

    pub fn config(&self) -> PeakConfig {
        self.config
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Classify the next value of the sequence
    pub fn classify(&mut self, value: f64) -> PeakSignal {
        let signal = if self.seen < self.config.lag {
            self.baseline.push(value);
            PeakSignal::Stable
        } else if self.exceeds(value) {
            let previous = self.baseline.newest().copied().unwrap_or(value);
            let damped =
                self.config.influence * value + (1.0 - self.config.influence) * previous;
            self.baseline.push(damped);
            if value > self.mean {
                PeakSignal::PositivePeak
            } else {
                PeakSignal::NegativePeak
            }
        } else {
            self.baseline.push(value);
            PeakSignal::Stable
        };

        self.seen += 1;
        self.update_stats();
        signal
    }

    fn exceeds(&self, value: f64) -> bool {
        let deviation = (value - self.mean).abs();
        if self.std_dev == 0.0 {
            // Flat baseline: anything off the mean is a peak
            value != self.mean
        } else {
            deviation > self.config.threshold * self.std_dev
        }
    }

    fn update_stats(&mut self) {
        let count = self.baseline.len() as f64;
        let mut sum = 0.0;
        for value in self.baseline.iter() {
            sum += value;
        }
        let mean = sum / count;

        let mut squares = 0.0;
        for value in self.baseline.iter() {
            squares += (value - mean) * (value - mean);
        }
        self.mean = mean;
        self.std_dev = (squares / count).sqrt();
    }
}

/// Lazy `(value, signal)` adapter over a numeric iterator
#[derive(Debug, Clone)]
pub struct PeakDetection<I> {
    values: I,
    detector: PeakDetector,
}

impl<I> Iterator for PeakDetection<I>
where
    I: Iterator<Item = f64>,
{
    type Item = (f64, PeakSignal);

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.values.next()?;
        Some((value, self.detector.classify(value)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}

pub trait PeakDetectionExt: Iterator<Item = f64> + Sized {
    /// Classify every value with a fresh detector
    fn detect_peaks(self, config: PeakConfig) -> PeakDetection<Self> {
        PeakDetection {
            values: self,
            detector: PeakDetector::new(config),
        }
    }
}

impl<I> PeakDetectionExt for I where I: Iterator<Item = f64> {}
