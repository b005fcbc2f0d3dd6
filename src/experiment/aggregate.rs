use std::collections::BTreeMap;
use std::time::Duration;

use crate::session::FlushInterval;
use crate::types::{CrashLossResult, FlushFrequency, WriteSessionResult};

/// Per-frequency means folded from every trial at that frequency.
///
/// Means are `None` when the experiment produced no input for them (the
/// loss-model experiment never times a session, for instance).
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyStats {
    pub flush_frequency: FlushFrequency,
    pub flush_interval: FlushInterval,
    /// Write sessions run.
    pub sessions: usize,
    /// Fsyncs observed across all sessions.
    pub flush_count: usize,
    /// Crash offsets evaluated.
    pub crash_samples: usize,
    /// Mean duration of a single fsync.
    pub mean_flush_duration: Option<Duration>,
    /// Mean open → last flush duration of a session.
    pub mean_total_duration: Option<Duration>,
    /// Mean time a session spent inside fsync, summed over its flushes.
    pub mean_flush_time_per_session: Option<Duration>,
    pub mean_data_loss_bytes: Option<f64>,
}

/// Incrementally folds trial results for one frequency.
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    frequency: FlushFrequency,
    interval: FlushInterval,
    sessions: usize,
    flush_count: usize,
    flush_sum: Duration,
    total_sum: Duration,
    losses: usize,
    loss_sum: u128,
}

impl StatsAccumulator {
    pub fn new(frequency: FlushFrequency, interval: FlushInterval) -> Self {
        StatsAccumulator {
            frequency,
            interval,
            sessions: 0,
            flush_count: 0,
            flush_sum: Duration::ZERO,
            total_sum: Duration::ZERO,
            losses: 0,
            loss_sum: 0,
        }
    }

    pub fn record_session(&mut self, result: &WriteSessionResult) {
        self.sessions += 1;
        self.flush_count += result.flush_measurements.len();
        self.flush_sum += result.total_flush_duration();
        self.total_sum += result.total_duration;
    }

    pub fn record_loss(&mut self, loss: CrashLossResult) {
        self.losses += 1;
        self.loss_sum += loss.data_loss_bytes as u128;
    }

    pub fn finish(self) -> FrequencyStats {
        FrequencyStats {
            flush_frequency: self.frequency,
            flush_interval: self.interval,
            sessions: self.sessions,
            flush_count: self.flush_count,
            crash_samples: self.losses,
            mean_flush_duration: mean(self.flush_sum, self.flush_count),
            mean_total_duration: mean(self.total_sum, self.sessions),
            mean_flush_time_per_session: mean(self.flush_sum, self.sessions),
            mean_data_loss_bytes: (self.losses > 0)
                .then(|| self.loss_sum as f64 / self.losses as f64),
        }
    }
}

fn mean(sum: Duration, count: usize) -> Option<Duration> {
    (count > 0).then(|| sum.div_f64(count as f64))
}

/// Results of one experiment, keyed by flush frequency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentAggregate {
    entries: BTreeMap<FlushFrequency, FrequencyStats>,
}

impl ExperimentAggregate {
    pub fn new() -> Self {
        ExperimentAggregate::default()
    }

    /// Insert stats, replacing any earlier entry for the same frequency.
    pub fn insert(&mut self, stats: FrequencyStats) {
        self.entries.insert(stats.flush_frequency, stats);
    }

    pub fn get(&self, frequency: FlushFrequency) -> Option<&FrequencyStats> {
        self.entries.get(&frequency)
    }

    /// Stats in ascending frequency order.
    pub fn iter(&self) -> impl Iterator<Item = &FrequencyStats> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
