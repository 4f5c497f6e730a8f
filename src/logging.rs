//! Logging setup for the command-line tool
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to whoever embeds it. The CLI calls [`init_logging`] once.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the CLI reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Info and above
    #[default]
    Normal,
    /// Debug and above, includes every phase confirmation
    Verbose,
    /// Everything, including per-sample shock classifications
    Trace,
}

impl Verbosity {
    #[must_use]
    pub fn to_level(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Map the `--debug` count and `--quiet`; quiet wins when both are given
    pub fn from_flags(debug: u8, quiet: bool) -> Self {
        match (debug, quiet) {
            (_, true) => Self::Quiet,
            (0, false) => Self::Normal,
            (1, false) => Self::Verbose,
            (_, false) => Self::Trace,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `verbosity`.
///
/// Log lines go to stderr so stdout stays readable for the processing
/// summary. Calling this twice is harmless; the second call is ignored.
pub fn init_logging(verbosity: Verbosity) {
    let default_filter = format!("skydive_phases={}", verbosity.to_level());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_file(false)
            .with_line_number(false),
    );

    let _ = subscriber.try_init();
}
