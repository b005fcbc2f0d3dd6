//! Closed-form data loss of an append-only, flush-synchronous write.
//!
//! Every byte written after the last completed fsync is lost on crash; every
//! byte before it is durable. A crash at `offset` therefore loses
//! `offset - last_boundary(offset)` bytes, which is always below the interval.

use crate::error::Result;
use crate::session::FlushInterval;
use crate::types::{CrashLossResult, CrashSample, FlushFrequency};

/// Loss for a crash at `offset` when flushing every `interval` bytes.
pub fn data_loss(interval: FlushInterval, offset: u64) -> CrashLossResult {
    let last_flush_boundary = interval.last_boundary(offset);
    CrashLossResult {
        last_flush_boundary,
        data_loss_bytes: offset - last_flush_boundary,
    }
}

/// Loss for a crash at `crash_offset` into a write of `total_length` bytes
/// flushed every `flush_frequency`.
pub fn loss(total_length: u64, flush_frequency: FlushFrequency, crash_offset: u64) -> Result<u64> {
    let interval = FlushInterval::new(total_length, flush_frequency)?;
    Ok(data_loss(interval, crash_offset).data_loss_bytes)
}

/// Mean loss in bytes over a batch of crashes. `None` for an empty batch.
pub fn mean_loss(interval: FlushInterval, samples: &[CrashSample]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let total: u128 = samples
        .iter()
        .map(|s| data_loss(interval, s.offset).data_loss_bytes as u128)
        .sum();
    Some(total as f64 / samples.len() as f64)
}
