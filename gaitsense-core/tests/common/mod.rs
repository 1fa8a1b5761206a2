//! Common test utilities for signal-core integration tests
//!
//! Deterministic generators for gait-like inertial signals. Every random
//! source is a seeded `StdRng`, so a failing case reproduces exactly.

#![allow(dead_code)]

pub mod generators;

/// Sample rate used throughout the integration tests (Hz)
pub const RATE_HZ: f64 = 50.0;

/// Sample period in milliseconds
pub const PERIOD_MS: u64 = 20;

/// Assert two floats agree within `tol`
#[track_caller]
pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected} ± {tol}, got {actual}"
    );
}
