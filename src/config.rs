use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::FlushFrequency;

/// Default write length: 1 MiB.
pub const DEFAULT_TOTAL_LENGTH: u64 = 1024 * 1024;

/// Default flush frequencies, as fractions of the total write.
pub const DEFAULT_FLUSH_FREQUENCIES: [f64; 5] = [0.01, 0.05, 0.10, 0.15, 0.20];

/// Experiment parameters.
///
/// Validated as a whole by [`Options::validate`] before any trial touches the
/// filesystem; a bad value never surfaces halfway through a run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Bytes written per session.
    pub total_length: u64,
    /// Raw fractions in (0, 1]; validated into [`FlushFrequency`].
    pub flush_frequencies: Vec<f64>,
    /// Sessions (or crash-simulation iterations) per frequency.
    pub repetitions: usize,
    /// Crash offsets drawn per distribution in the loss-model experiment.
    pub crash_samples: usize,
    /// Fixed RNG seed. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Directory holding trial files.
    pub work_dir: PathBuf,
    pub monitor: MonitorOptions,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            total_length: DEFAULT_TOTAL_LENGTH,
            flush_frequencies: DEFAULT_FLUSH_FREQUENCIES.to_vec(),
            repetitions: 100,
            crash_samples: 10,
            seed: None,
            work_dir: PathBuf::from("."),
            monitor: MonitorOptions::default(),
        }
    }
}

impl Options {
    /// Check every field, returning the validated frequencies.
    pub fn validate(&self) -> Result<Vec<FlushFrequency>> {
        if self.total_length == 0 {
            return Err(Error::Config("total_length must be > 0".into()));
        }
        if self.flush_frequencies.is_empty() {
            return Err(Error::Config("at least one flush frequency is required".into()));
        }
        if self.repetitions == 0 {
            return Err(Error::Config("repetitions must be > 0".into()));
        }
        self.monitor.validate()?;

        let frequencies = self
            .flush_frequencies
            .iter()
            .map(|&f| FlushFrequency::new(f))
            .collect::<Result<Vec<_>>>()?;

        // Results are keyed by frequency, so a repeat would overwrite its twin
        let mut sorted = frequencies.clone();
        sorted.sort();
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(Error::Config(format!(
                "flush frequency {} listed more than once",
                pair[0].get()
            )));
        }
        Ok(frequencies)
    }
}

/// Parameters of the concurrent writer/syncer monitor.
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// File both actors share.
    pub path: PathBuf,
    /// Alphanumeric bytes per appended line (newline not included).
    pub payload_len: usize,
    pub writer_period: Duration,
    pub syncer_period: Duration,
    /// How long `run_for` keeps the actors alive.
    pub lifetime: Duration,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        MonitorOptions {
            path: PathBuf::from("monitor_data.txt"),
            payload_len: 1_000_000,
            writer_period: Duration::from_secs(5),
            syncer_period: Duration::from_secs(10),
            lifetime: Duration::from_secs(30),
        }
    }
}

impl MonitorOptions {
    pub fn validate(&self) -> Result<()> {
        if self.writer_period.is_zero() || self.syncer_period.is_zero() {
            return Err(Error::Config("monitor periods must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let freqs = Options::default().validate().unwrap();
        assert_eq!(freqs.len(), 5);
        assert_eq!(freqs[0].get(), 0.01);
    }
}
