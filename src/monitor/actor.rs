use std::fs::File;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use rand::RngCore;
use tracing::{error, info};

use crate::error::Result;
use crate::monitor::sink::{ActorKind, CriticalSection, EventKind, EventSink};
use crate::payload::PayloadGenerator;

/// Cooperative cancellation shared by the controller and both actors.
///
/// Raised exactly once; actors observe it at the top of each iteration, so an
/// in-flight write or fsync always completes first.
#[derive(Clone)]
pub struct StopSignal {
    inner: Arc<StopInner>,
}

struct StopInner {
    running: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        StopSignal {
            inner: Arc::new(StopInner {
                running: AtomicBool::new(true),
                lock: Mutex::new(()),
                wake: Condvar::new(),
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Clear the running flag and wake every sleeper.
    pub fn stop(&self) {
        self.inner.running.store(false, Ordering::SeqCst);
        let _guard = self.inner.lock.lock();
        self.inner.wake.notify_all();
    }

    /// Block for up to `timeout`, returning early once stopped.
    /// Returns whether the signal is still running.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if !self.is_running() {
            return false;
        }
        // A deadline past the end of `Instant` means wait for the stop alone
        let deadline = Instant::now().checked_add(timeout);
        let mut guard = self.inner.lock.lock();
        while self.is_running() {
            match deadline {
                Some(deadline) => {
                    if self.inner.wake.wait_until(&mut guard, deadline).timed_out() {
                        break;
                    }
                }
                None => self.inner.wake.wait(&mut guard),
            }
        }
        self.is_running()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        StopSignal::new()
    }
}

/// Timing policy between actor iterations.
pub trait Clock: Send + Sync {
    /// Pause for `period`. May return early once `stop` is raised.
    fn sleep(&self, period: Duration, stop: &StopSignal);
}

/// Real wall-clock sleeping that wakes immediately on stop.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, period: Duration, stop: &StopSignal) {
        stop.wait_timeout(period);
    }
}

/// One unit of periodic work. Timing lives in [`drive`], not here, so a step
/// can be exercised directly.
pub trait PeriodicActor: Send {
    fn kind(&self) -> ActorKind;

    fn step(&mut self) -> Result<()>;
}

/// Run `actor` once per `period` until `stop` is raised.
///
/// A failing step raises `stop` so the sibling actor winds down too, and the
/// error is returned. On success, returns the number of steps taken.
pub fn drive<A: PeriodicActor>(
    mut actor: A,
    period: Duration,
    stop: &StopSignal,
    clock: &dyn Clock,
) -> Result<u64> {
    let mut steps = 0;
    while stop.is_running() {
        if let Err(e) = actor.step() {
            error!(actor = ?actor.kind(), error = %e, "monitor actor failed, stopping");
            stop.stop();
            return Err(e);
        }
        steps += 1;
        clock.sleep(period, stop);
    }
    Ok(steps)
}

/// Appends one fresh payload line per step.
pub struct WriterActor<R> {
    file: Arc<Mutex<File>>,
    payload: PayloadGenerator<R>,
    payload_len: usize,
    sink: Arc<EventSink>,
}

impl<R: RngCore> WriterActor<R> {
    pub fn new(
        file: Arc<Mutex<File>>,
        payload: PayloadGenerator<R>,
        payload_len: usize,
        sink: Arc<EventSink>,
    ) -> Self {
        WriterActor {
            file,
            payload,
            payload_len,
            sink,
        }
    }
}

impl<R: RngCore + Send> PeriodicActor for WriterActor<R> {
    fn kind(&self) -> ActorKind {
        ActorKind::Writer
    }

    fn step(&mut self) -> Result<()> {
        let line = self.payload.line(self.payload_len);

        let section = {
            let mut file = self.file.lock();
            let entered = Instant::now();
            file.write_all(&line)?;
            CriticalSection {
                actor: ActorKind::Writer,
                entered,
                exited: Instant::now(),
            }
        };

        self.sink.record(EventKind::Write, line.len() as f64, section);
        Ok(())
    }
}

/// Forces the shared file to disk once per step and reports how long it took.
pub struct SyncerActor {
    file: Arc<Mutex<File>>,
    sink: Arc<EventSink>,
}

impl SyncerActor {
    pub fn new(file: Arc<Mutex<File>>, sink: Arc<EventSink>) -> Self {
        SyncerActor { file, sink }
    }
}

impl PeriodicActor for SyncerActor {
    fn kind(&self) -> ActorKind {
        ActorKind::Syncer
    }

    fn step(&mut self) -> Result<()> {
        let section = {
            let file = self.file.lock();
            let entered = Instant::now();
            file.sync_all()?;
            CriticalSection {
                actor: ActorKind::Syncer,
                entered,
                exited: Instant::now(),
            }
        };

        let duration = section.exited - section.entered;
        info!("fsync() duration: {:.5} seconds", duration.as_secs_f64());
        self.sink
            .record(EventKind::Flush, duration.as_secs_f64(), section);
        Ok(())
    }
}
