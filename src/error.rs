use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for track parsing, configuration and export
#[derive(Debug, Error)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV reader/writer errors
    #[cfg(feature = "csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Parse errors with line context
    #[error("Parse error on line {line}: {message}")]
    Parse { line: u64, message: String },
    /// Invalid or missing header
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    /// Track file that matches no known vendor layout
    #[error("Unsupported track format: {0}")]
    UnsupportedFormat(String),
    /// Detection or export settings out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Configuration source could not be loaded
    #[cfg(feature = "config")]
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),
    /// JSON serialization errors
    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Export format error
    #[error("Export error for {path}: {message}")]
    Export { path: PathBuf, message: String },
}

#[cfg(feature = "config")]
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::ConfigLoad(Box::new(err))
    }
}

impl Error {
    pub fn parse(line: u64, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig(message.into())
    }

    /// True when the error came from malformed input data rather than the environment
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::Parse { .. } | Error::InvalidHeader(_) | Error::UnsupportedFormat(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = Error::parse(12, "velD is not a number");
        assert_eq!(
            err.to_string(),
            "Parse error on line 12: velD is not a number"
        );
        assert!(err.is_input_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_invalid_config_display() {
        let err = Error::invalid_config("lag must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: lag must be at least 1"
        );
    }

    #[test]
    fn test_export_error_display() {
        let err = Error::Export {
            path: PathBuf::from("/tmp/out.phases.csv"),
            message: "no rows".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/out.phases.csv"));
        assert!(msg.contains("no rows"));
    }
}
