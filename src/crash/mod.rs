pub mod loss;
pub mod sampler;

pub use loss::{data_loss, loss, mean_loss};
pub use sampler::CrashSampler;

use std::fmt;

/// Shape of the crash-time distribution over `[0, total_length)`.
///
/// The expected data loss depends on where crashes land relative to flush
/// boundaries, so each shape is compared against the same flush intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashDistribution {
    /// Uniform draws, reported in ascending order.
    UniformSorted,
    /// Uniform unit draws scaled by the total length, unordered.
    PureRandom,
    /// Normal around the midpoint with std dev of half the length, clamped
    /// into range. Piles probability mass onto both ends.
    ClippedNormal,
}

impl CrashDistribution {
    pub const ALL: [CrashDistribution; 3] = [
        CrashDistribution::PureRandom,
        CrashDistribution::UniformSorted,
        CrashDistribution::ClippedNormal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CrashDistribution::UniformSorted => "uniform",
            CrashDistribution::PureRandom => "random",
            CrashDistribution::ClippedNormal => "normal",
        }
    }
}

impl fmt::Display for CrashDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
