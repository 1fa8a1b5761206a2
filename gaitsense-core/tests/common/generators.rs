//! Synthetic gait signal generators
//!
//! A gait is modelled as a vertical bounce at the stride frequency plus a
//! second harmonic, with lateral and forward sway at the stride frequency
//! and broadband sensor noise on every axis.

use core::f64::consts::PI;

use gaitsense_core::MotionSample;
use nalgebra::UnitQuaternion;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{PERIOD_MS, RATE_HZ};

/// Shape of a synthetic gait
#[derive(Debug, Clone, Copy)]
pub struct GaitSignal {
    /// Stride frequency (Hz)
    pub frequency: f64,
    /// Vertical amplitude at the fundamental (g)
    pub bounce: f64,
    /// Vertical amplitude at twice the fundamental (g)
    pub harmonic: f64,
    /// Lateral/forward sway amplitude (g)
    pub sway: f64,
    /// Uniform noise half-width on every axis (g)
    pub noise: f64,
}

impl GaitSignal {
    pub fn walk() -> Self {
        Self {
            frequency: 1.6,
            bounce: 0.25,
            harmonic: 0.18,
            sway: 0.08,
            noise: 0.02,
        }
    }

    pub fn trot() -> Self {
        Self {
            frequency: 2.6,
            bounce: 0.45,
            harmonic: 0.35,
            sway: 0.15,
            noise: 0.03,
        }
    }

    pub fn standing() -> Self {
        Self {
            frequency: 0.0,
            bounce: 0.0,
            harmonic: 0.0,
            sway: 0.0,
            noise: 0.01,
        }
    }

    /// Body-frame acceleration at sample index `i`
    pub fn acceleration(&self, i: usize, rng: &mut StdRng) -> [f64; 3] {
        let t = i as f64 / RATE_HZ;
        let phase = 2.0 * PI * self.frequency * t;
        let mut noise = || rng.gen_range(-1.0..=1.0) * self.noise;

        [
            self.sway * phase.sin() + noise(),
            self.sway * (phase + PI / 2.0).sin() + noise(),
            self.bounce * phase.sin() + self.harmonic * (2.0 * phase).sin() + noise(),
        ]
    }

    /// Yaw rate at sample index `i` (rad/s), locked to the stride
    pub fn yaw_rate(&self, i: usize) -> f64 {
        let t = i as f64 / RATE_HZ;
        0.3 * self.sway * (2.0 * PI * self.frequency * t + 0.4).sin()
    }

    /// `count` motion samples starting at sample index `start`
    pub fn samples(
        &self,
        start: usize,
        count: usize,
        attitude: UnitQuaternion<f64>,
        seed: u64,
    ) -> Vec<MotionSample> {
        let mut rng = StdRng::seed_from_u64(seed);
        (start..start + count)
            .map(|i| {
                MotionSample::new(
                    i as u64 * PERIOD_MS,
                    self.acceleration(i, &mut rng),
                    [0.0, 0.0, self.yaw_rate(i)],
                )
                .with_attitude(attitude)
                .with_gravity([0.0, 0.0, -1.0])
            })
            .collect()
    }
}

/// Pure sine of `len` samples
pub fn sine(frequency: f64, amplitude: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| amplitude * (2.0 * PI * frequency * i as f64 / RATE_HZ).sin())
        .collect()
}

/// Seeded uniform noise of `len` samples in `[-amplitude, amplitude]`
pub fn noise(amplitude: f64, len: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(-amplitude..=amplitude)).collect()
}
