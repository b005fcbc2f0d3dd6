use rand::distributions::{Distribution, Standard};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::Normal;

use crate::crash::CrashDistribution;
use crate::error::{Error, Result};
use crate::types::CrashSample;

/// Draws simulated crash offsets from a chosen distribution.
///
/// Every offset lies in `[0, total_length)`. The RNG is injected so a fixed
/// seed reproduces the same crash times across runs.
pub struct CrashSampler<R = StdRng> {
    rng: R,
}

impl CrashSampler<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        CrashSampler::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        CrashSampler::new(StdRng::from_entropy())
    }
}

impl<R: RngCore> CrashSampler<R> {
    pub fn new(rng: R) -> Self {
        CrashSampler { rng }
    }

    /// Draw `count` crash offsets. A count of zero yields an empty vector.
    pub fn sample(
        &mut self,
        total_length: u64,
        kind: CrashDistribution,
        count: usize,
    ) -> Result<Vec<CrashSample>> {
        if total_length == 0 {
            return Err(Error::Sampling(
                "cannot sample crash offsets from an empty range".into(),
            ));
        }

        let mut samples = match kind {
            CrashDistribution::UniformSorted => (0..count)
                .map(|_| self.uniform(total_length))
                .collect::<Vec<_>>(),
            CrashDistribution::PureRandom => (0..count)
                .map(|_| self.scaled_unit(total_length))
                .collect(),
            CrashDistribution::ClippedNormal => {
                let half = total_length as f64 / 2.0;
                let normal = Normal::new(half, half)
                    .map_err(|e| Error::Sampling(format!("normal distribution: {e}")))?;
                (0..count)
                    .map(|_| clamp_offset(normal.sample(&mut self.rng), total_length))
                    .collect()
            }
        };

        if kind == CrashDistribution::UniformSorted {
            samples.sort_unstable();
        }
        Ok(samples)
    }

    /// Draw a single crash offset.
    pub fn sample_one(
        &mut self,
        total_length: u64,
        kind: CrashDistribution,
    ) -> Result<CrashSample> {
        let mut samples = self.sample(total_length, kind, 1)?;
        samples
            .pop()
            .ok_or_else(|| Error::Sampling("no crash offset drawn".into()))
    }

    fn uniform(&mut self, total_length: u64) -> CrashSample {
        CrashSample {
            offset: self.rng.gen_range(0..total_length),
        }
    }

    fn scaled_unit(&mut self, total_length: u64) -> CrashSample {
        let unit: f64 = Standard.sample(&mut self.rng);
        clamp_offset(unit * total_length as f64, total_length)
    }
}

/// Floor a real-valued draw and clamp it into `[0, total_length)`.
fn clamp_offset(value: f64, total_length: u64) -> CrashSample {
    let max = (total_length - 1) as f64;
    CrashSample {
        offset: value.floor().clamp(0.0, max) as u64,
    }
}
