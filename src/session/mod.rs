pub mod writer;

pub use writer::WriteSession;

use crate::error::{Error, Result};
use crate::types::FlushFrequency;

/// Controls how many bytes are written between two fsyncs.
///
/// Trade-off: durability vs throughput.
///   - small interval: many fsyncs, each waits for the disk, little lost on crash
///   - large interval: few fsyncs, up to `interval - 1` bytes lost on crash
///
/// Derived as `floor(total_length * frequency)`, floored at 1 byte so a tiny
/// frequency can never produce a zero-length interval (and an endless loop).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushInterval(u64);

impl FlushInterval {
    /// Interval for a write of `total_length` bytes flushed every `frequency`.
    pub fn new(total_length: u64, frequency: FlushFrequency) -> Result<Self> {
        if total_length == 0 {
            return Err(Error::Config("total_length must be > 0".into()));
        }
        let raw = (total_length as f64 * frequency.get()).floor() as u64;
        Ok(FlushInterval(raw.clamp(1, total_length)))
    }

    /// Interval of exactly `bytes`. Zero is rejected.
    pub fn from_bytes(bytes: u64) -> Result<Self> {
        if bytes == 0 {
            return Err(Error::Config("flush interval must be >= 1 byte".into()));
        }
        Ok(FlushInterval(bytes))
    }

    pub fn bytes(self) -> u64 {
        self.0
    }

    /// Number of chunks (and therefore fsyncs) needed for `total_length`.
    /// The short tail counts as a chunk of its own.
    pub fn chunk_count(self, total_length: u64) -> u64 {
        total_length.div_ceil(self.0)
    }

    /// Whether `offset` lands exactly on a flush boundary.
    pub fn is_boundary(self, offset: u64) -> bool {
        offset % self.0 == 0
    }

    /// Most recent flush boundary at or before `offset`.
    pub fn last_boundary(self, offset: u64) -> u64 {
        (offset / self.0) * self.0
    }
}
