//! Concurrent writer/syncer monitor.
//!
//! Two OS threads share one file:
//!
//! ```text
//!   Writer ─writer_period─► lock(file) ─ append line ─ unlock
//!   Syncer ─syncer_period─► lock(file) ─ sync_all    ─ unlock ─► EventSink
//! ```
//!
//! The file lock is held for an entire append or fsync, never part of one,
//! so operations are totally ordered by lock acquisition. Neither actor is
//! guaranteed fairness; under heavy load one may starve the other.
//!
//! Shutdown is graceful only: the controller raises the [`StopSignal`] and
//! joins both threads.

pub mod actor;
pub mod sink;

pub use actor::{
    Clock, PeriodicActor, StopSignal, SyncerActor, SystemClock, WriterActor, drive,
};
pub use sink::{ActorKind, CriticalSection, EventKind, EventSink};

use std::fs::{File, OpenOptions};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::MonitorOptions;
use crate::error::{Error, Result};
use crate::payload::{PayloadGenerator, PayloadKind};

/// Configures and launches the two monitor actors.
pub struct DurabilityMonitor {
    options: MonitorOptions,
    clock: Arc<dyn Clock>,
    seed: Option<u64>,
}

impl DurabilityMonitor {
    pub fn new(options: MonitorOptions) -> Result<Self> {
        options.validate()?;
        Ok(DurabilityMonitor {
            options,
            clock: Arc::new(SystemClock),
            seed: None,
        })
    }

    /// Replace the wall clock, e.g. with one that compresses time in tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Seed the writer's payload generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Open the shared file and spawn both actors.
    pub fn start(&self) -> Result<MonitorHandle> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.options.path)?;
        let file: Arc<Mutex<File>> = Arc::new(Mutex::new(file));
        let sink = Arc::new(EventSink::new());
        let stop = StopSignal::new();

        let payload = match self.seed {
            Some(seed) => PayloadGenerator::seeded(PayloadKind::Alphanumeric, seed),
            None => PayloadGenerator::from_entropy(PayloadKind::Alphanumeric),
        };
        let writer = WriterActor::new(
            Arc::clone(&file),
            payload,
            self.options.payload_len,
            Arc::clone(&sink),
        );
        let syncer = SyncerActor::new(file, Arc::clone(&sink));

        let writer = spawn_actor(
            "fsync-writer",
            writer,
            self.options.writer_period,
            &stop,
            &self.clock,
        )?;
        let syncer = match spawn_actor(
            "fsync-syncer",
            syncer,
            self.options.syncer_period,
            &stop,
            &self.clock,
        ) {
            Ok(handle) => handle,
            Err(e) => {
                stop.stop();
                let _ = writer.join();
                return Err(e);
            }
        };

        info!(path = %self.options.path.display(), "monitor started");
        Ok(MonitorHandle {
            stop,
            writer,
            syncer,
            sink,
        })
    }

    /// Start, keep the actors alive for the configured lifetime, then shut down.
    pub fn run(&self) -> Result<MonitorReport> {
        let handle = self.start()?;
        // Returns early if a failing actor raised the stop signal
        self.clock.sleep(self.options.lifetime, &handle.stop);
        handle.shutdown()
    }
}

fn spawn_actor<A: PeriodicActor + 'static>(
    name: &str,
    actor: A,
    period: Duration,
    stop: &StopSignal,
    clock: &Arc<dyn Clock>,
) -> Result<JoinHandle<Result<u64>>> {
    let stop = stop.clone();
    let clock = Arc::clone(clock);
    let handle = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || drive(actor, period, &stop, clock.as_ref()))?;
    Ok(handle)
}

/// A running monitor. Dropping it without [`shutdown`](Self::shutdown)
/// leaves the actors running until something raises the stop signal.
pub struct MonitorHandle {
    stop: StopSignal,
    writer: JoinHandle<Result<u64>>,
    syncer: JoinHandle<Result<u64>>,
    sink: Arc<EventSink>,
}

impl MonitorHandle {
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn sink(&self) -> &EventSink {
        &self.sink
    }

    /// Raise the stop signal and wait for both actors to exit.
    ///
    /// Both threads are always joined before any actor error is returned.
    pub fn shutdown(self) -> Result<MonitorReport> {
        self.stop.stop();
        let writer = join_actor(self.writer, "writer");
        let syncer = join_actor(self.syncer, "syncer");
        let writer_steps = writer?;
        let syncer_steps = syncer?;

        let report = MonitorReport {
            writer_steps,
            syncer_steps,
            bytes_written: self.sink.values(EventKind::Write).iter().sum::<f64>() as u64,
            writes: self.sink.count(EventKind::Write),
            flush_durations: self
                .sink
                .values(EventKind::Flush)
                .into_iter()
                .map(Duration::from_secs_f64)
                .collect(),
            critical_sections: self.sink.sections(),
        };
        info!(
            writes = report.writes,
            flushes = report.flush_durations.len(),
            "all monitor actors have completed"
        );
        Ok(report)
    }
}

fn join_actor(handle: JoinHandle<Result<u64>>, name: &str) -> Result<u64> {
    handle.join().map_err(|_| {
        warn!(actor = name, "monitor actor panicked");
        Error::Monitor(format!("{name} actor panicked"))
    })?
}

/// What the monitor observed over its lifetime.
#[derive(Debug, Clone)]
pub struct MonitorReport {
    pub writer_steps: u64,
    pub syncer_steps: u64,
    pub writes: usize,
    pub bytes_written: u64,
    pub flush_durations: Vec<Duration>,
    pub critical_sections: Vec<CriticalSection>,
}

impl MonitorReport {
    pub fn mean_flush_duration(&self) -> Option<Duration> {
        if self.flush_durations.is_empty() {
            return None;
        }
        let total: Duration = self.flush_durations.iter().sum();
        Some(total.div_f64(self.flush_durations.len() as f64))
    }

    /// First pair of critical sections from different actors that overlap.
    pub fn find_overlap(&self) -> Option<(CriticalSection, CriticalSection)> {
        let sections = &self.critical_sections;
        for (i, a) in sections.iter().enumerate() {
            for b in &sections[i + 1..] {
                if a.actor != b.actor && a.overlaps(b) {
                    return Some((*a, *b));
                }
            }
        }
        None
    }
}
