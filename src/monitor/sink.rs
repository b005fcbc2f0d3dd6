use std::collections::BTreeMap;
use std::time::Instant;

use parking_lot::Mutex;

/// What an actor reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// Value: bytes appended.
    Write,
    /// Value: fsync duration in seconds.
    Flush,
}

/// Which actor held the file lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    Writer,
    Syncer,
}

/// Enter/exit stamps of one stretch of time spent holding the file lock.
#[derive(Debug, Clone, Copy)]
pub struct CriticalSection {
    pub actor: ActorKind,
    pub entered: Instant,
    pub exited: Instant,
}

impl CriticalSection {
    /// Whether the two sections share any instant.
    pub fn overlaps(&self, other: &CriticalSection) -> bool {
        self.entered < other.exited && other.entered < self.exited
    }
}

#[derive(Default)]
struct SinkState {
    events: BTreeMap<EventKind, Vec<f64>>,
    sections: Vec<CriticalSection>,
}

/// Where actors report measurements.
///
/// Guarded by its own lock, never the file lock: an actor records only after
/// it has released the file.
#[derive(Default)]
pub struct EventSink {
    state: Mutex<SinkState>,
}

impl EventSink {
    pub fn new() -> Self {
        EventSink::default()
    }

    pub fn record(&self, kind: EventKind, value: f64, section: CriticalSection) {
        let mut state = self.state.lock();
        state.events.entry(kind).or_default().push(value);
        state.sections.push(section);
    }

    /// Values recorded for `kind`, in record order.
    pub fn values(&self, kind: EventKind) -> Vec<f64> {
        self.state
            .lock()
            .events
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.state.lock().events.get(&kind).map_or(0, Vec::len)
    }

    pub fn sections(&self) -> Vec<CriticalSection> {
        self.state.lock().sections.clone()
    }
}
