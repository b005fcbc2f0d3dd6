// Crash sampler tests
// Tests for drawing crash offsets from each distribution.

use fsync_bench::crash::mean_loss;
use fsync_bench::{CrashDistribution, CrashSampler, Error, FlushFrequency, FlushInterval};

const TOTAL: u64 = 1_048_576;

// =============================================================================
// Test 1: Every distribution stays inside [0, total_length)
// =============================================================================
#[test]
fn all_draws_in_range() {
    let mut sampler = CrashSampler::seeded(1);
    for kind in CrashDistribution::ALL {
        let samples = sampler.sample(TOTAL, kind, 5_000).unwrap();
        assert_eq!(samples.len(), 5_000, "{kind} should yield every draw");
        assert!(samples.iter().all(|s| s.offset < TOTAL), "{kind} out of range");
    }
}

// =============================================================================
// Test 2: Uniform draws come back sorted
// =============================================================================
#[test]
fn uniform_is_sorted() {
    let mut sampler = CrashSampler::seeded(2);
    let samples = sampler
        .sample(TOTAL, CrashDistribution::UniformSorted, 1_000)
        .unwrap();
    assert!(samples.windows(2).all(|w| w[0].offset <= w[1].offset));
}

// =============================================================================
// Test 3: Zero count yields nothing, empty range is an error
// =============================================================================
#[test]
fn zero_count_and_empty_range() {
    let mut sampler = CrashSampler::seeded(3);
    for kind in CrashDistribution::ALL {
        assert!(sampler.sample(TOTAL, kind, 0).unwrap().is_empty());
        assert!(matches!(sampler.sample(0, kind, 3), Err(Error::Sampling(_))));
    }
}

// =============================================================================
// Test 4: One-byte range always crashes at offset 0
// =============================================================================
#[test]
fn single_byte_range() {
    let mut sampler = CrashSampler::seeded(4);
    for kind in CrashDistribution::ALL {
        let samples = sampler.sample(1, kind, 100).unwrap();
        assert!(samples.iter().all(|s| s.offset == 0));
    }
}

// =============================================================================
// Test 5: Clipped normal piles mass onto both ends
// =============================================================================
#[test]
fn clipped_normal_hits_both_ends() {
    let mut sampler = CrashSampler::seeded(5);
    let samples = sampler
        .sample(TOTAL, CrashDistribution::ClippedNormal, 10_000)
        .unwrap();
    let at_start = samples.iter().filter(|s| s.offset == 0).count();
    let at_end = samples.iter().filter(|s| s.offset == TOTAL - 1).count();
    // About 16% of a normal lies beyond one std dev on each side
    assert!(at_start > 1_000, "only {at_start} clipped to 0");
    assert!(at_end > 1_000, "only {at_end} clipped to the end");
}

// =============================================================================
// Test 6: Same seed, same crashes
// =============================================================================
#[test]
fn seeded_sampling_is_reproducible() {
    for kind in CrashDistribution::ALL {
        let a = CrashSampler::seeded(99).sample(TOTAL, kind, 50).unwrap();
        let b = CrashSampler::seeded(99).sample(TOTAL, kind, 50).unwrap();
        assert_eq!(a, b);
    }
}

// =============================================================================
// Test 7: Larger intervals never lose less on average
// =============================================================================
#[test]
fn expected_loss_grows_with_interval() {
    let frequencies = [0.01, 0.05, 0.10, 0.20];
    let mut sampler = CrashSampler::seeded(0xF5_1C);

    for kind in CrashDistribution::ALL {
        let samples = sampler.sample(TOTAL, kind, 20_000).unwrap();
        let losses: Vec<f64> = frequencies
            .iter()
            .map(|&f| {
                let interval = FlushInterval::new(TOTAL, FlushFrequency::new(f).unwrap()).unwrap();
                mean_loss(interval, &samples).unwrap()
            })
            .collect();

        for pair in losses.windows(2) {
            assert!(
                pair[0] <= pair[1],
                "{kind}: loss should not shrink as the interval grows: {losses:?}"
            );
        }
    }
}

// =============================================================================
// Test 8: sample_one draws a single in-range offset
// =============================================================================
#[test]
fn sample_one_in_range() {
    let mut sampler = CrashSampler::seeded(8);
    for _ in 0..100 {
        let s = sampler
            .sample_one(1000, CrashDistribution::UniformSorted)
            .unwrap();
        assert!(s.offset < 1000);
    }
}
