//! Skydive Phases Library
//!
//! Streaming detection of the four phase transitions of a skydive (takeoff,
//! freefall, canopy deployment and landing) in GNSS tracks. The detection
//! core works on canonical rows, one sample at a time, with memory bounded
//! by its window sizes. Format adapters and exporters for FlySight track
//! files sit around it.
//!
//! # Features
//!
//! - **`csv`** (default): FlySight track reading and CSV export
//! - **`cli`** (default): Build the command-line interface binary
//! - **`json`**: Export flight summaries as JSON
//! - **`serde`**: Enable serialization/deserialization of types
//! - **`config`**: Load [`DetectionConfig`] from TOML files and the environment
//!
//! # Quick Start
//!
//! Annotate a track file and export it:
//! ```rust,no_run
//! use skydive_phases::{export_track, read_track, DetectionConfig, ExportOptions, TrackFormat};
//! use std::path::Path;
//!
//! let path = Path::new("14-02-33.CSV");
//! let track = read_track(path, TrackFormat::Auto).unwrap();
//! let annotated = track.annotate("14-02-33", &DetectionConfig::default());
//! println!("Exit at {:?}", annotated.summary.events.freefall);
//!
//! let export_options = ExportOptions {
//!     csv: true,
//!     ..ExportOptions::default()
//! };
//! let report = export_track(&annotated, path, &export_options).unwrap();
//! if let Some(path) = report.csv_path {
//!     println!("Exported to: {}", path.display());
//! }
//! ```
//!
//! Run the detector over rows from any source:
//! ```rust
//! use chrono::{DateTime, TimeDelta, Utc};
//! use skydive_phases::{DetectionConfig, GeoVector, InputRow, PhaseStream};
//!
//! let rows = (0..50).map(|i| {
//!     let time = DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(200 * i);
//!     InputRow::new(time, 100.0, GeoVector::new(0.0, 0.0, 0.0), i)
//! });
//! let mut stream = PhaseStream::new(rows, DetectionConfig::default());
//! assert_eq!(stream.by_ref().count(), 50);
//! assert!(!stream.detected_events().is_valid);
//! ```
//!
//! # Public API
//!
//! ## Detection
//! - [`PhaseStream`] - Iterator yielding one annotated row per input row
//! - [`detect_phases`] - Annotate a whole track in one go
//! - [`StreamState`] - Per-track state; [`StreamState::step`] folds in one sample
//! - [`PeakDetector`] - Causal z-score peak classifier
//! - [`find_inflection`] - Backtrack from a confirmed trend to its onset
//! - [`despike`] - Rolling outlier correction
//!
//! ## Windows
//! - [`BoundedBuffer`] - Fixed-capacity FIFO
//! - [`FocusWindow`] - Fixed-capacity window with an edit cursor
//!
//! ## Data Types
//! - [`InputRow`] / [`OutputRow`] - Canonical samples in and annotated rows out
//! - [`FlightPhase`], [`FlightPoint`], [`DetectedEvents`]
//! - [`FlightSummary`] - Per-track result used by filters and JSON export
//!
//! ## Formats and Export
//! - [`read_track`] - Load a FlySight 1 or FlySight 2 track file
//! - [`export_track`] - Filter, then write CSV and JSON outputs
//! - [`compute_export_paths`] - Helper for consistent path computation
//! - [`should_skip_export`] - Skip tracks that never left the ground

pub mod config;
pub mod conversion;
pub mod detection;
pub mod error;
pub mod export;
pub mod filters;
#[cfg(feature = "csv")]
pub mod format;
#[cfg(feature = "cli")]
pub mod logging;
pub mod types;
pub mod window;

// Re-export everything from modules for convenience
#[allow(ambiguous_glob_reexports)]
pub use config::*;
#[allow(ambiguous_glob_reexports)]
pub use conversion::*;
#[allow(ambiguous_glob_reexports)]
pub use detection::*;
#[allow(ambiguous_glob_reexports)]
pub use error::*;
#[allow(ambiguous_glob_reexports)]
pub use export::*;
#[allow(ambiguous_glob_reexports)]
pub use filters::*;
#[cfg(feature = "csv")]
#[allow(ambiguous_glob_reexports)]
pub use format::*;
#[allow(ambiguous_glob_reexports)]
pub use types::*;
#[allow(ambiguous_glob_reexports)]
pub use window::*;

#[cfg(feature = "cli")]
pub use logging::{init_logging, Verbosity};
