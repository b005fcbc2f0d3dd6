//! # fsync-bench
//!
//! Measures what periodic `fsync` costs and what it buys.
//!
//! ## Core idea
//! Writing a file sequentially and forcing it to disk every N bytes trades
//! throughput for durability. Small N means many slow fsyncs; large N means
//! a crash loses up to N - 1 bytes. This crate times real fsyncs across a
//! range of N and models the loss of crashes drawn from several
//! distributions, so both sides of the trade-off can be put in one table.
//!
//! ## Layout
//! - [`session`]: one timed write with periodic fsync
//! - [`crash`]: crash-offset sampling and the closed-form loss model
//! - [`experiment`]: repetitions across frequencies, folded into means
//! - [`monitor`]: a writer thread and a syncer thread sharing one file

pub mod config;
pub mod crash;
pub mod error;
pub mod experiment;
pub mod monitor;
pub mod payload;
pub mod report;
pub mod session;
pub mod types;

// Public re-exports for the top-level API
pub use config::{MonitorOptions, Options};
pub use crash::{CrashDistribution, CrashSampler};
pub use error::{Error, Result};
pub use experiment::{ExperimentAggregate, ExperimentRunner, FrequencyStats};
pub use monitor::{DurabilityMonitor, MonitorReport};
pub use payload::{PayloadGenerator, PayloadKind};
pub use session::{FlushInterval, WriteSession};
pub use types::{
    CrashLossResult, CrashSample, FlushFrequency, FlushMeasurement, WriteSessionResult,
    WriteTrialConfig,
};
