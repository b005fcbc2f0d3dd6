// Crash loss model tests
// Tests for the closed-form data loss of a crash between flushes.

use fsync_bench::crash::{data_loss, loss, mean_loss};
use fsync_bench::{CrashSample, FlushFrequency, FlushInterval};
use proptest::prelude::*;

fn freq(f: f64) -> FlushFrequency {
    FlushFrequency::new(f).unwrap()
}

// =============================================================================
// Test 1: Crash at 250 with 100-byte interval loses 50 bytes
// =============================================================================
#[test]
fn crash_mid_interval() {
    let interval = FlushInterval::new(1000, freq(0.10)).unwrap();
    let result = data_loss(interval, 250);
    assert_eq!(result.last_flush_boundary, 200);
    assert_eq!(result.data_loss_bytes, 50);
    assert_eq!(loss(1000, freq(0.10), 250).unwrap(), 50);
}

// =============================================================================
// Test 2: Crash on the last byte loses 99 bytes
// =============================================================================
#[test]
fn crash_at_last_byte() {
    let interval = FlushInterval::new(1000, freq(0.10)).unwrap();
    let result = data_loss(interval, 999);
    assert_eq!(result.last_flush_boundary, 900);
    assert_eq!(result.data_loss_bytes, 99);
}

// =============================================================================
// Test 3: Crash before the first flush loses everything written so far
// =============================================================================
#[test]
fn crash_before_first_flush() {
    assert_eq!(loss(1000, freq(0.10), 42).unwrap(), 42);
    assert_eq!(loss(1000, freq(1.0), 999).unwrap(), 999);
}

// =============================================================================
// Test 4: Same inputs, same output
// =============================================================================
#[test]
fn loss_is_idempotent() {
    let a = loss(1_048_576, freq(0.05), 777_777).unwrap();
    let b = loss(1_048_576, freq(0.05), 777_777).unwrap();
    assert_eq!(a, b);
}

// =============================================================================
// Test 5: Mean over a batch
// =============================================================================
#[test]
fn mean_over_batch() {
    let interval = FlushInterval::from_bytes(100).unwrap();
    let samples = [
        CrashSample { offset: 250 },
        CrashSample { offset: 999 },
        CrashSample { offset: 300 },
        CrashSample { offset: 10 },
    ];
    // 50 + 99 + 0 + 10
    assert_eq!(mean_loss(interval, &samples), Some(39.75));
}

proptest! {
    // 0 <= loss < interval for every offset in range
    #[test]
    fn loss_is_below_interval(
        total in 1u64..5_000_000,
        f in 0.000_1f64..=1.0,
        pos in 0.0f64..1.0,
    ) {
        let interval = FlushInterval::new(total, freq(f)).unwrap();
        let offset = ((total as f64 * pos) as u64).min(total - 1);
        let result = data_loss(interval, offset);
        prop_assert!(result.data_loss_bytes < interval.bytes());
        prop_assert_eq!(result.last_flush_boundary + result.data_loss_bytes, offset);
        prop_assert!(interval.is_boundary(result.last_flush_boundary));
    }
}
