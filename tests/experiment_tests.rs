// Experiment runner tests
// Tests for repeating trials across frequencies and folding them into means.

use std::fs;
use std::path::Path;

use fsync_bench::experiment::remove_trial_file;
use fsync_bench::{CrashDistribution, Error, ExperimentRunner, FlushFrequency, Options};

fn small_options(work_dir: &Path) -> Options {
    Options {
        total_length: 1000,
        flush_frequencies: vec![0.10, 0.25, 0.5],
        repetitions: 3,
        crash_samples: 200,
        seed: Some(7),
        work_dir: work_dir.to_path_buf(),
        ..Options::default()
    }
}

fn freq(f: f64) -> FlushFrequency {
    FlushFrequency::new(f).unwrap()
}

// =============================================================================
// Test 1: Latency experiment counts every flush of every repetition
// =============================================================================
#[test]
fn latency_counts_flushes_per_frequency() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = ExperimentRunner::new(small_options(dir.path())).unwrap();

    let aggregate = runner.run_latency().unwrap();
    assert_eq!(aggregate.len(), 3);

    let expected = [(0.10, 10), (0.25, 4), (0.5, 2)];
    for (f, flushes_per_session) in expected {
        let stats = aggregate.get(freq(f)).unwrap();
        assert_eq!(stats.sessions, 3);
        assert_eq!(stats.flush_count, 3 * flushes_per_session);
        assert!(stats.mean_flush_duration.is_some());
        assert!(stats.mean_total_duration.unwrap() >= stats.mean_flush_time_per_session.unwrap());
        assert_eq!(stats.mean_data_loss_bytes, None);
    }
}

// =============================================================================
// Test 2: Latency experiment leaves no trial files behind
// =============================================================================
#[test]
fn latency_cleans_up_trial_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = ExperimentRunner::new(small_options(dir.path())).unwrap();

    // A stale file from an earlier run is removed before the first trial
    let stale = runner.trial_path(freq(0.10));
    assert_eq!(stale.file_name().unwrap(), "fsync_trial_10.0.dat");
    fs::write(&stale, vec![b'x'; 5000]).unwrap();

    let aggregate = runner.run_latency().unwrap();
    let stats = aggregate.get(freq(0.10)).unwrap();
    assert_eq!(stats.sessions, 3);
    assert_eq!(stats.flush_count, 30);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

// =============================================================================
// Test 3: Loss model is deterministic under a seed and needs no files
// =============================================================================
#[test]
fn loss_model_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let a = ExperimentRunner::new(small_options(dir.path()))
        .unwrap()
        .run_loss_model(CrashDistribution::PureRandom)
        .unwrap();
    let b = ExperimentRunner::new(small_options(dir.path()))
        .unwrap()
        .run_loss_model(CrashDistribution::PureRandom)
        .unwrap();

    assert_eq!(a, b);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

    for stats in a.iter() {
        assert_eq!(stats.crash_samples, 200);
        assert_eq!(stats.sessions, 0);
        let mean = stats.mean_data_loss_bytes.unwrap();
        assert!(mean >= 0.0 && mean < stats.flush_interval.bytes() as f64);
    }
}

// =============================================================================
// Test 4: All distributions, same frequencies
// =============================================================================
#[test]
fn loss_model_all_distributions() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = ExperimentRunner::new(small_options(dir.path())).unwrap();

    let results = runner.run_loss_model_all().unwrap();
    let kinds: Vec<_> = results.iter().map(|(k, _)| *k).collect();
    assert_eq!(kinds, CrashDistribution::ALL.to_vec());
    for (_, aggregate) in &results {
        assert_eq!(aggregate.len(), 3);
    }
}

// =============================================================================
// Test 5: Crash simulation writes, then computes one loss per iteration
// =============================================================================
#[test]
fn crash_simulation_one_loss_per_iteration() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = ExperimentRunner::new(small_options(dir.path())).unwrap();

    let aggregate = runner.run_crash_simulation().unwrap();
    for stats in aggregate.iter() {
        assert_eq!(stats.sessions, 3);
        assert_eq!(stats.crash_samples, 3);
        let mean = stats.mean_data_loss_bytes.unwrap();
        assert!(mean < stats.flush_interval.bytes() as f64);
    }
    assert!(!runner.crash_sim_path().exists());
}

// =============================================================================
// Test 6: Bad options are rejected before any trial runs
// =============================================================================
#[test]
fn invalid_options_rejected_up_front() {
    let dir = tempfile::tempdir().unwrap();

    let cases: Vec<Box<dyn Fn(&mut Options)>> = vec![
        Box::new(|o: &mut Options| o.total_length = 0),
        Box::new(|o: &mut Options| o.flush_frequencies.clear()),
        Box::new(|o: &mut Options| o.flush_frequencies = vec![0.1, 0.0]),
        Box::new(|o: &mut Options| o.flush_frequencies = vec![1.5]),
        Box::new(|o: &mut Options| o.flush_frequencies = vec![0.1, 0.25, 0.1]),
        Box::new(|o: &mut Options| o.repetitions = 0),
        Box::new(|o: &mut Options| o.monitor.syncer_period = std::time::Duration::ZERO),
    ];

    for mutate in cases {
        let mut options = small_options(dir.path());
        mutate(&mut options);
        assert!(matches!(ExperimentRunner::new(options), Err(Error::Config(_))));
    }
}

// =============================================================================
// Test 7: An unusable work directory fails the experiment
// =============================================================================
#[test]
fn io_failure_aborts_experiment() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = small_options(dir.path());
    options.work_dir = dir.path().join("missing");

    let mut runner = ExperimentRunner::new(options).unwrap();
    assert!(matches!(runner.run_latency(), Err(Error::Io(_))));
}

// =============================================================================
// Test 8: Removing a file that is already gone is not an error
// =============================================================================
#[test]
fn cleanup_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trial.dat");

    remove_trial_file(&path).unwrap();
    fs::write(&path, b"data").unwrap();
    remove_trial_file(&path).unwrap();
    assert!(!path.exists());
    remove_trial_file(&path).unwrap();
}

// =============================================================================
// Test 9: Cleanup surfaces errors other than a missing file
// =============================================================================
#[test]
fn cleanup_fails_on_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("not_a_file");
    fs::create_dir(&nested).unwrap();

    assert!(matches!(remove_trial_file(&nested), Err(Error::Io(_))));
    assert!(nested.is_dir());
}

// =============================================================================
// Test 10: Runner keeps the validated frequencies in configured order
// =============================================================================
#[test]
fn runner_exposes_validated_options() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ExperimentRunner::new(small_options(dir.path())).unwrap();

    assert_eq!(runner.frequencies(), &[freq(0.10), freq(0.25), freq(0.5)]);
    assert_eq!(runner.options().repetitions, 3);
    assert_eq!(runner.options().work_dir, dir.path());
}
