//! Streaming flight phase detection
//!
//! The pipeline, per sample: despike in the preprocess window, derive
//! kinematics, update the rolling windows and the shock detector, then run
//! the phase detectors. See [`PhaseStream`] for the iterator that drives it.

pub mod backtrack;
pub mod despike;
pub mod kinematics;
pub mod peak;
pub mod phases;
pub mod state;
pub mod stream;

pub use backtrack::find_inflection;
pub use despike::{despike, DespikeEntry};
pub use kinematics::{median, Kinematics};
pub use peak::{PeakConfig, PeakDetection, PeakDetectionExt, PeakDetector, PeakSignal};
pub use phases::{detect_canopy, detect_freefall, detect_landing, detect_takeoff, run_detectors, Detector};
pub use state::{StreamState, VerticalSpeedSample, Windows};
pub use stream::{detect_phases, PhaseStream};
