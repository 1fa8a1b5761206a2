//! Synthetic motion streams for sensor-driven tests

use core::f64::consts::PI;

use gaitsense_core::{LocationSample, MotionSample};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub const RATE_HZ: f64 = 50.0;
pub const PERIOD_MS: u64 = 20;

/// Vertical bounce with a second harmonic, lateral sway and seeded noise
pub fn motion_stream(
    frequency: f64,
    bounce: f64,
    harmonic: f64,
    count: usize,
    seed: u64,
) -> Vec<MotionSample> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let phase = 2.0 * PI * frequency * i as f64 / RATE_HZ;
            let mut noise = || rng.gen_range(-0.02..=0.02);
            let accel = [
                0.05 * phase.sin() + noise(),
                0.05 * phase.cos() + noise(),
                bounce * phase.sin() + harmonic * (2.0 * phase).sin() + noise(),
            ];
            let rate = [0.0, 0.0, 0.1 * (phase + 0.5).sin()];
            MotionSample::new(i as u64 * PERIOD_MS, accel, rate).with_gravity([0.0, 0.0, -1.0])
        })
        .collect()
}

/// One fix per second at a constant speed
pub fn location_stream(speed: f64, accuracy: f64, count: usize) -> Vec<LocationSample> {
    (0..count)
        .map(|i| LocationSample::new(i as u64 * 1000, speed, accuracy, speed))
        .collect()
}
