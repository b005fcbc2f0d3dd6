use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::session::FlushInterval;

/// Fraction of the total write length between two flushes.
///
/// Always finite and in (0, 1]. 0.10 means "fsync after every 10% of the
/// file". Ordered with `total_cmp` so it can key a `BTreeMap`.
#[derive(Debug, Clone, Copy)]
pub struct FlushFrequency(f64);

impl FlushFrequency {
    /// Validate a raw fraction.
    pub fn new(fraction: f64) -> Result<Self> {
        if !fraction.is_finite() || fraction <= 0.0 || fraction > 1.0 {
            return Err(Error::Config(format!(
                "flush frequency must be in (0, 1], got {fraction}"
            )));
        }
        Ok(FlushFrequency(fraction))
    }

    /// The raw fraction.
    pub fn get(self) -> f64 {
        self.0
    }

    /// The fraction as a percentage, e.g. 10.0 for 0.10.
    pub fn as_percent(self) -> f64 {
        self.0 * 100.0
    }
}

impl PartialEq for FlushFrequency {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FlushFrequency {}

impl PartialOrd for FlushFrequency {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FlushFrequency {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for FlushFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.as_percent())
    }
}

/// Parameters of one end-to-end write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteTrialConfig {
    pub total_length: u64,
    pub flush_frequency: FlushFrequency,
}

impl WriteTrialConfig {
    pub fn new(total_length: u64, flush_frequency: FlushFrequency) -> Result<Self> {
        if total_length == 0 {
            return Err(Error::Config("total_length must be > 0".into()));
        }
        Ok(WriteTrialConfig {
            total_length,
            flush_frequency,
        })
    }

    /// Bytes between two flushes for this trial.
    pub fn flush_interval(&self) -> Result<FlushInterval> {
        FlushInterval::new(self.total_length, self.flush_frequency)
    }
}

/// Timing of a single fsync inside a write session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushMeasurement {
    /// Wall-clock time spent inside the durability call only.
    pub duration: Duration,
    /// Bytes guaranteed durable once this flush returned.
    pub durable_offset: u64,
}

/// Everything one write session observed.
#[derive(Debug, Clone)]
pub struct WriteSessionResult {
    /// One entry per flush boundary, in write order.
    pub flush_measurements: Vec<FlushMeasurement>,
    /// Open → last flush, inclusive.
    pub total_duration: Duration,
    /// Length of every chunk handed to the file, in write order.
    pub chunk_lengths: Vec<u64>,
    pub bytes_written: u64,
    /// CRC32 of every payload byte written, in order.
    pub checksum: u32,
}

impl WriteSessionResult {
    /// Sum of all fsync durations in this session.
    pub fn total_flush_duration(&self) -> Duration {
        self.flush_measurements.iter().map(|m| m.duration).sum()
    }
}

/// Byte offset at which a simulated crash happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CrashSample {
    pub offset: u64,
}

/// Bytes lost by a crash at a given offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrashLossResult {
    /// Most recent flush boundary at or before the crash.
    pub last_flush_boundary: u64,
    /// Always in `[0, flush_interval)`.
    pub data_loss_bytes: u64,
}
