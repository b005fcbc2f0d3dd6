use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::error;

use fsync_bench::config::{DEFAULT_FLUSH_FREQUENCIES, DEFAULT_TOTAL_LENGTH};
use fsync_bench::{
    CrashDistribution, DurabilityMonitor, ExperimentRunner, MonitorOptions, Options, Result, report,
};

/// Measure fsync latency and crash data loss across flush frequencies.
#[derive(Parser, Debug)]
#[command(name = "fsync-bench", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Time real fsyncs while writing the file at each flush frequency.
    Latency(ExperimentArgs),
    /// Closed-form expected loss for sampled crash offsets (no file I/O).
    Loss {
        #[command(flatten)]
        common: ExperimentArgs,
        /// Crash-time distribution. All three when omitted.
        #[arg(long, value_enum)]
        distribution: Option<DistributionArg>,
    },
    /// Write the file, then apply one simulated crash per iteration.
    CrashSim(ExperimentArgs),
    /// Run a writer thread and a syncer thread against one shared file.
    Monitor(MonitorArgs),
}

#[derive(Args, Debug)]
struct ExperimentArgs {
    /// Bytes written per session.
    #[arg(long, default_value_t = DEFAULT_TOTAL_LENGTH)]
    total_length: u64,

    /// Flush frequencies as fractions of the total write, comma separated.
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_FLUSH_FREQUENCIES)]
    frequencies: Vec<f64>,

    /// Sessions (or crash-simulation iterations) per frequency.
    #[arg(long, default_value_t = 100)]
    repetitions: usize,

    /// Crash offsets drawn per distribution.
    #[arg(long, default_value_t = 10)]
    crash_samples: usize,

    /// RNG seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for trial files.
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,
}

impl ExperimentArgs {
    fn into_options(self) -> Options {
        Options {
            total_length: self.total_length,
            flush_frequencies: self.frequencies,
            repetitions: self.repetitions,
            crash_samples: self.crash_samples,
            seed: self.seed,
            work_dir: self.work_dir,
            monitor: MonitorOptions::default(),
        }
    }
}

#[derive(Args, Debug)]
struct MonitorArgs {
    /// File both actors share.
    #[arg(long, default_value = "monitor_data.txt")]
    path: PathBuf,

    /// Bytes per appended line.
    #[arg(long, default_value_t = 1_000_000)]
    payload_len: usize,

    #[arg(long, default_value_t = 5)]
    writer_period_secs: u64,

    #[arg(long, default_value_t = 10)]
    syncer_period_secs: u64,

    /// How long to keep both actors running.
    #[arg(long, default_value_t = 30)]
    lifetime_secs: u64,

    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DistributionArg {
    Uniform,
    Random,
    Normal,
}

impl From<DistributionArg> for CrashDistribution {
    fn from(arg: DistributionArg) -> Self {
        match arg {
            DistributionArg::Uniform => CrashDistribution::UniformSorted,
            DistributionArg::Random => CrashDistribution::PureRandom,
            DistributionArg::Normal => CrashDistribution::ClippedNormal,
        }
    }
}

fn run(cli: Cli) -> Result<String> {
    match cli.command {
        Command::Latency(args) => {
            let aggregate = ExperimentRunner::new(args.into_options())?.run_latency()?;
            Ok(report::render_latency(&aggregate))
        }
        Command::Loss {
            common,
            distribution,
        } => {
            let mut runner = ExperimentRunner::new(common.into_options())?;
            match distribution {
                Some(kind) => {
                    let kind = CrashDistribution::from(kind);
                    let aggregate = runner.run_loss_model(kind)?;
                    Ok(report::render_loss(&format!("{kind} distribution"), &aggregate))
                }
                None => Ok(report::render_distributions(&runner.run_loss_model_all()?)),
            }
        }
        Command::CrashSim(args) => {
            let aggregate = ExperimentRunner::new(args.into_options())?.run_crash_simulation()?;
            Ok(report::render_loss("crash simulation", &aggregate))
        }
        Command::Monitor(args) => {
            let options = MonitorOptions {
                path: args.path,
                payload_len: args.payload_len,
                writer_period: Duration::from_secs(args.writer_period_secs),
                syncer_period: Duration::from_secs(args.syncer_period_secs),
                lifetime: Duration::from_secs(args.lifetime_secs),
            };
            let mut monitor = DurabilityMonitor::new(options)?;
            if let Some(seed) = args.seed {
                monitor = monitor.with_seed(seed);
            }
            Ok(report::render_monitor(&monitor.run()?))
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}
