use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Which bytes a payload is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// ASCII letters and digits. Used by the latency sessions and the monitor.
    Alphanumeric,
    /// Arbitrary bytes. Used by the crash simulation.
    Raw,
}

/// Produces fixed-length pseudo-random write payloads.
///
/// Every call is an independent draw from the wrapped RNG, so two generators
/// seeded identically produce identical payload streams.
pub struct PayloadGenerator<R = StdRng> {
    rng: R,
    kind: PayloadKind,
}

impl PayloadGenerator<StdRng> {
    /// Generator with a fixed seed, for reproducible runs.
    pub fn seeded(kind: PayloadKind, seed: u64) -> Self {
        PayloadGenerator::new(kind, StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from OS entropy.
    pub fn from_entropy(kind: PayloadKind) -> Self {
        PayloadGenerator::new(kind, StdRng::from_entropy())
    }
}

impl<R: RngCore> PayloadGenerator<R> {
    pub fn new(kind: PayloadKind, rng: R) -> Self {
        PayloadGenerator { rng, kind }
    }

    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    /// Exactly `length` fresh bytes. Zero yields an empty vector.
    pub fn generate(&mut self, length: usize) -> Vec<u8> {
        match self.kind {
            PayloadKind::Alphanumeric => (&mut self.rng)
                .sample_iter(Alphanumeric)
                .take(length)
                .collect(),
            PayloadKind::Raw => {
                let mut buf = vec![0u8; length];
                self.rng.fill_bytes(&mut buf);
                buf
            }
        }
    }

    /// `length` alphanumeric bytes terminated by a newline, regardless of kind.
    ///
    /// This is the record format the monitor's writer appends.
    pub fn line(&mut self, length: usize) -> Vec<u8> {
        let mut line: Vec<u8> = (&mut self.rng)
            .sample_iter(Alphanumeric)
            .take(length)
            .collect();
        line.push(b'\n');
        line
    }
}
