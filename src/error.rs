use std::fmt;
use std::io;

/// Unified error type for sessions, experiments and the monitor.
#[derive(Debug)]
pub enum Error {
    /// IO error from open, write, fsync or cleanup. Never retried.
    Io(io::Error),
    /// Options rejected before any trial runs.
    Config(String),
    /// Crash offsets could not be drawn (empty range, bad distribution).
    Sampling(String),
    /// A monitor actor thread panicked instead of returning.
    Monitor(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {e}"),
            Error::Config(msg) => write!(f, "Invalid configuration: {msg}"),
            Error::Sampling(msg) => write!(f, "Sampling error: {msg}"),
            Error::Monitor(msg) => write!(f, "Monitor error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
