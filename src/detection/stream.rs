//! Pull-based phase detection over a row iterator

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::DetectionConfig;
use crate::detection::despike::{despike, DespikeEntry};
use crate::detection::{Kinematics, StreamState};
use crate::types::{DetectedEvents, InputRow, OutputRow};
use crate::window::FocusWindow;

/// Iterator adapter yielding one [`OutputRow`] per input row.
///
/// Rows first pass through the preprocess window, where spikes are
/// corrected, and are folded into the stream state as they leave it. Once
/// the input is exhausted the rows still held in the window are drained, so
/// the output always has the same length and order as the input.
///
/// # Panics
/// Construction panics if `config` holds a zero window size or peak lag.
/// Call [`DetectionConfig::validate`] on untrusted configuration.
pub struct PhaseStream<I, S> {
    input: I,
    config: DetectionConfig,
    preprocess: Option<FocusWindow<DespikeEntry<S>>>,
    drained: VecDeque<DespikeEntry<S>>,
    state: Option<StreamState<S>>,
    last_time: Option<DateTime<Utc>>,
    corrections: usize,
    exhausted: bool,
}

impl<I, S> PhaseStream<I, S>
where
    I: Iterator<Item = InputRow<S>>,
    S: Clone,
{
    pub fn new<T>(rows: T, config: DetectionConfig) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            input: rows.into_iter(),
            preprocess: Some(FocusWindow::new(config.preprocess_window())),
            config,
            drained: VecDeque::new(),
            state: None,
            last_time: None,
            corrections: 0,
            exhausted: false,
        }
    }

    /// Number of samples replaced by the despike stage so far
    pub fn corrections(&self) -> usize {
        self.corrections
    }

    /// State after the most recently emitted row
    pub fn state(&self) -> Option<&StreamState<S>> {
        self.state.as_ref()
    }

    pub fn detected_events(&self) -> DetectedEvents {
        self.state
            .as_ref()
            .map(|state| state.detected_events)
            .unwrap_or_default()
    }

    fn check_order(&mut self, row: &InputRow<S>) {
        if let Some(previous) = self.last_time {
            if row.time < previous {
                warn!(
                    previous = %previous,
                    current = %row.time,
                    "timestamp went backwards"
                );
            }
        }
        self.last_time = Some(row.time);
    }

    /// Push a raw row into the preprocess window, returning the entry it evicts
    fn preprocess(&mut self, row: InputRow<S>) -> Option<DespikeEntry<S>> {
        let window = self
            .preprocess
            .take()
            .unwrap_or_else(|| FocusWindow::new(self.config.preprocess_window()));
        let kinematics = Kinematics::create(&row);
        let (evicted, mut window) = window.push((row, Some(kinematics)));

        if let Some(filled) = window.as_filled_mut() {
            if despike(filled, self.config.acceleration_clip_threshold) {
                self.corrections += 1;
            }
        }
        self.preprocess = Some(window);
        evicted
    }

    /// Fold an entry leaving the preprocess window into the stream state
    fn emit(&mut self, (row, kinematics): DespikeEntry<S>) -> OutputRow<S> {
        let raw = kinematics.unwrap_or_else(|| Kinematics::create(&row));
        let state = match self.state.take() {
            Some(state) => state.step_with(row, raw, &self.config),
            None => StreamState::start_with(row, raw, &self.config),
        };
        let output = state.output_row();
        self.state = Some(state);
        output
    }
}

impl<I, S> Iterator for PhaseStream<I, S>
where
    I: Iterator<Item = InputRow<S>>,
    S: Clone,
{
    type Item = OutputRow<S>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.drained.pop_front() {
                return Some(self.emit(entry));
            }
            if self.exhausted {
                return None;
            }

            match self.input.next() {
                Some(row) => {
                    self.check_order(&row);
                    if let Some(ready) = self.preprocess(row) {
                        return Some(self.emit(ready));
                    }
                }
                None => {
                    self.exhausted = true;
                    if let Some(window) = self.preprocess.take() {
                        self.drained.extend(window.into_items());
                    }
                    debug!(
                        corrections = self.corrections,
                        remaining = self.drained.len(),
                        "input exhausted, draining preprocess window"
                    );
                }
            }
        }
    }
}

/// Annotate a whole track in one go
pub fn detect_phases<T, S>(rows: T, config: &DetectionConfig) -> Vec<OutputRow<S>>
where
    T: IntoIterator<Item = InputRow<S>>,
    S: Clone,
{
    PhaseStream::new(rows, *config).collect()
}
