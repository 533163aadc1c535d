//! Error taxonomy for the collector.

use std::io;
use std::path::PathBuf;

/// Reporter errors.
///
/// Only [`ReporterError::Serialization`] is fatal to a run; every other kind is
/// logged and the run carries on to its final tally.
#[derive(Debug, thiserror::Error)]
pub enum ReporterError {
    /// Parent directory of the results file could not be created.
    #[error("failed to create results directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The run summary could not be converted to JSON text.
    #[error("failed to convert test results to JSON: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The results file could not be written.
    #[error("failed to write test results to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A reporter option was malformed or unknown.
    #[error("invalid reporter option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    /// An options file could not be read or parsed.
    #[error("failed to load reporter options from {}: {message}", path.display())]
    OptionsFile { path: PathBuf, message: String },

    /// A results file could not be read back.
    #[error("invalid results file {}: {message}", path.display())]
    InvalidResults { path: PathBuf, message: String },

    /// One line of an event stream was not a valid lifecycle event.
    #[error("malformed event on line {line}: {message}")]
    EventParse { line: usize, message: String },

    /// Reading the event stream failed.
    #[error("event stream read failed: {0}")]
    Io(#[from] io::Error),

    /// The current working directory is unavailable.
    #[error("cannot determine working directory: {0}")]
    WorkingDir(#[source] io::Error),
}

impl ReporterError {
    /// Whether the run must abort with a non-zero exit code.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }

    /// Exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Serialization(_) => 1,

            // Usage / configuration
            Self::InvalidOption { .. } => 2,
            Self::OptionsFile { .. } => 2,
            Self::WorkingDir(_) => 2,
            Self::InvalidResults { .. } => 2,

            // Recoverable during a run
            Self::DirectoryCreation { .. } => 0,
            Self::Write { .. } => 0,
            Self::EventParse { .. } => 0,
            Self::Io(_) => 0,
        }
    }
}

/// Result type for reporter operations.
pub type ReporterResult<T> = Result<T, ReporterError>;
