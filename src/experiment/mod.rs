pub mod aggregate;

pub use aggregate::{ExperimentAggregate, FrequencyStats, StatsAccumulator};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::info;

use crate::config::Options;
use crate::crash::{self, CrashDistribution, CrashSampler};
use crate::error::Result;
use crate::payload::{PayloadGenerator, PayloadKind};
use crate::session::{FlushInterval, WriteSession};
use crate::types::FlushFrequency;

/// Repeats write sessions and crash-loss trials across every configured
/// flush frequency and folds them into an [`ExperimentAggregate`].
///
/// Error policy is fail-fast: the first failing trial aborts the whole
/// experiment and its error is returned. No aggregate is ever averaged over
/// fewer trials than configured.
///
/// Payload and crash RNGs are derived from one master RNG, so a fixed
/// `Options::seed` reproduces every byte written and every crash offset.
pub struct ExperimentRunner {
    options: Options,
    frequencies: Vec<FlushFrequency>,
    rng: StdRng,
}

impl ExperimentRunner {
    /// Validate `options` up front. Nothing is written until an experiment runs.
    pub fn new(options: Options) -> Result<Self> {
        let frequencies = options.validate()?;
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(ExperimentRunner {
            options,
            frequencies,
            rng,
        })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn frequencies(&self) -> &[FlushFrequency] {
        &self.frequencies
    }

    /// Trial file used by the latency experiment at `frequency`.
    pub fn trial_path(&self, frequency: FlushFrequency) -> PathBuf {
        self.options
            .work_dir
            .join(format!("fsync_trial_{:.1}.dat", frequency.as_percent()))
    }

    /// Trial file used by the crash simulation.
    pub fn crash_sim_path(&self) -> PathBuf {
        self.options.work_dir.join("crash_sim.dat")
    }

    /// Fsync latency experiment.
    ///
    /// For every frequency, run `repetitions` full write sessions, each
    /// against a freshly removed trial file so flush counts stay comparable.
    pub fn run_latency(&mut self) -> Result<ExperimentAggregate> {
        let total_length = self.options.total_length;
        let mut payload = self.payload(PayloadKind::Alphanumeric);
        let mut aggregate = ExperimentAggregate::new();

        for frequency in self.frequencies.clone() {
            let interval = FlushInterval::new(total_length, frequency)?;
            let path = self.trial_path(frequency);
            let mut acc = StatsAccumulator::new(frequency, interval);

            for _ in 0..self.options.repetitions {
                remove_trial_file(&path)?;
                let result = WriteSession::open(&path, total_length, interval)?.run(&mut payload)?;
                acc.record_session(&result);
            }
            remove_trial_file(&path)?;

            let stats = acc.finish();
            info!(
                frequency = frequency.get(),
                interval = interval.bytes(),
                flushes = stats.flush_count,
                mean_flush_us = stats.mean_flush_duration.map_or(0, |d| d.as_micros() as u64),
                mean_total_ms = stats.mean_total_duration.map_or(0, |d| d.as_millis() as u64),
                "latency experiment finished frequency"
            );
            aggregate.insert(stats);
        }

        Ok(aggregate)
    }

    /// Closed-form loss experiment. No file I/O.
    ///
    /// One batch of `crash_samples` offsets is drawn and reused for every
    /// frequency, so all frequencies are judged against the same crashes.
    pub fn run_loss_model(&mut self, kind: CrashDistribution) -> Result<ExperimentAggregate> {
        let total_length = self.options.total_length;
        let count = self.options.crash_samples;
        let samples = self.sampler().sample(total_length, kind, count)?;
        let mut aggregate = ExperimentAggregate::new();

        for &frequency in &self.frequencies {
            let interval = FlushInterval::new(total_length, frequency)?;
            let mut acc = StatsAccumulator::new(frequency, interval);
            for sample in &samples {
                acc.record_loss(crash::data_loss(interval, sample.offset));
            }
            aggregate.insert(acc.finish());
        }

        info!(
            distribution = kind.name(),
            samples = samples.len(),
            "loss model evaluated"
        );
        Ok(aggregate)
    }

    /// Loss model for every distribution, in [`CrashDistribution::ALL`] order.
    pub fn run_loss_model_all(&mut self) -> Result<Vec<(CrashDistribution, ExperimentAggregate)>> {
        CrashDistribution::ALL
            .into_iter()
            .map(|kind| -> Result<_> { Ok((kind, self.run_loss_model(kind)?)) })
            .collect()
    }

    /// Real write followed by one simulated crash per iteration.
    ///
    /// Each iteration writes the whole file, then draws one crash offset after
    /// the fact and applies the loss model with the same interval. The file is
    /// never truncated; the loss is computed, not observed.
    pub fn run_crash_simulation(&mut self) -> Result<ExperimentAggregate> {
        let total_length = self.options.total_length;
        let path = self.crash_sim_path();
        let mut payload = self.payload(PayloadKind::Raw);
        let mut sampler = self.sampler();
        let mut aggregate = ExperimentAggregate::new();

        for &frequency in &self.frequencies {
            let interval = FlushInterval::new(total_length, frequency)?;
            let mut acc = StatsAccumulator::new(frequency, interval);

            for _ in 0..self.options.repetitions {
                remove_trial_file(&path)?;
                let result = WriteSession::open(&path, total_length, interval)?.run(&mut payload)?;
                acc.record_session(&result);

                let crash = sampler.sample_one(total_length, CrashDistribution::UniformSorted)?;
                acc.record_loss(crash::data_loss(interval, crash.offset));
                remove_trial_file(&path)?;
            }

            let stats = acc.finish();
            info!(
                frequency = frequency.get(),
                interval = interval.bytes(),
                mean_loss_bytes = stats.mean_data_loss_bytes.unwrap_or(0.0),
                "crash simulation finished frequency"
            );
            aggregate.insert(stats);
        }

        Ok(aggregate)
    }

    fn payload(&mut self, kind: PayloadKind) -> PayloadGenerator {
        PayloadGenerator::seeded(kind, self.rng.next_u64())
    }

    fn sampler(&mut self) -> CrashSampler {
        CrashSampler::seeded(self.rng.next_u64())
    }
}

/// Remove a leftover trial file. A file that is already gone is success.
pub fn remove_trial_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
