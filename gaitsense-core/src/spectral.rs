//! Spectral Features of a Rolling Signal Window
//!
//! ## Overview
//!
//! Locomotion is periodic. The vertical acceleration of a walking, trotting or
//! cantering animal is dominated by one fundamental (the bounce frequency) and
//! a handful of harmonics whose relative strength differs per gait. This
//! module turns a fixed-size window of a scalar signal into:
//!
//! | Feature            | Meaning                                            |
//! |--------------------|----------------------------------------------------|
//! | dominant frequency | strongest non-DC bin, in Hz                        |
//! | power at f0        | power of that bin                                  |
//! | h2 / h3 ratio      | power at 2·f0 / 3·f0 relative to f0                |
//! | spectral entropy   | normalized Shannon entropy of the power spectrum   |
//!
//! ## Processing Steps
//!
//! ```text
//! samples ─→ last N ─→ remove mean ─→ Hann window ─→ FFT ─→ |X[k]|²/N, k < N/2
//!                                                              │
//!                                  ┌───────────────┬───────────┴───────┐
//!                              argmax k≥1      P[2k]/P[k]      -Σ p·ln p / ln M
//! ```
//!
//! ## Edge Cases
//!
//! Fewer than `window_size` samples, or a window with no power left after
//! mean removal, yields [`SpectralResult::ZERO`]. Neither is an error.

use std::ops::RangeInclusive;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::constants::signal::{
    DEFAULT_SAMPLE_RATE_HZ, DEFAULT_WINDOW_SIZE, MAX_OVERLAP_FRACTION, MIN_SPECTRAL_POWER,
};
use crate::errors::{check_sample_rate, check_window_size, GaitResult};

/// Features derived from one analysis window
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpectralResult {
    /// Frequency of the strongest non-DC bin (Hz)
    pub dominant_frequency: f64,
    /// Power of the dominant bin
    pub power_at_f0: f64,
    /// Power at twice the dominant bin relative to the dominant bin
    pub h2_ratio: f64,
    /// Power at three times the dominant bin relative to the dominant bin
    pub h3_ratio: f64,
    /// Normalized Shannon entropy of the power spectrum, in [0, 1]
    pub spectral_entropy: f64,
    /// Sum of power over all non-DC bins
    pub total_power: f64,
}

impl SpectralResult {
    /// Result for a window with no usable signal
    pub const ZERO: Self = Self {
        dominant_frequency: 0.0,
        power_at_f0: 0.0,
        h2_ratio: 0.0,
        h3_ratio: 0.0,
        spectral_entropy: 0.0,
        total_power: 0.0,
    };

    pub fn is_silent(&self) -> bool {
        self.total_power <= 0.0
    }
}

/// A single spectral peak
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeak {
    pub frequency: f64,
    pub power: f64,
}

/// Fixed-size FFT analyzer over a rolling window
///
/// Owns its FFT plan and scratch buffers, so repeated calls allocate nothing.
#[derive(Clone)]
pub struct SpectralWindowAnalyzer {
    window_size: usize,
    sample_rate: f64,
    fft: Arc<dyn Fft<f64>>,
    taper: Vec<f64>,
    scratch: Vec<Complex<f64>>,
    /// Power of bins 0..window_size/2 from the last processed window
    power: Vec<f64>,
}

impl core::fmt::Debug for SpectralWindowAnalyzer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpectralWindowAnalyzer")
            .field("window_size", &self.window_size)
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

impl Default for SpectralWindowAnalyzer {
    fn default() -> Self {
        Self::build(DEFAULT_WINDOW_SIZE, DEFAULT_SAMPLE_RATE_HZ)
    }
}

impl SpectralWindowAnalyzer {
    /// Create an analyzer; `window_size` must be a power of two
    pub fn new(window_size: usize, sample_rate: f64) -> GaitResult<Self> {
        check_window_size(window_size)?;
        check_sample_rate(sample_rate)?;
        Ok(Self::build(window_size, sample_rate))
    }

    fn build(window_size: usize, sample_rate: f64) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(window_size);

        Self {
            window_size,
            sample_rate,
            fft,
            taper: hann_window(window_size),
            scratch: vec![Complex::new(0.0, 0.0); window_size],
            power: vec![0.0; window_size / 2],
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Width of one FFT bin (Hz)
    pub fn frequency_resolution(&self) -> f64 {
        self.sample_rate / self.window_size as f64
    }

    /// Power spectrum of the last processed window (bins 0..window_size/2)
    pub fn spectrum(&self) -> &[f64] {
        &self.power
    }

    /// Analyze the most recent `window_size` samples
    ///
    /// Shorter input returns [`SpectralResult::ZERO`] and clears the stored
    /// spectrum.
    pub fn process_window(&mut self, samples: &[f64]) -> SpectralResult {
        if samples.len() < self.window_size {
            self.power.iter_mut().for_each(|p| *p = 0.0);
            return SpectralResult::ZERO;
        }

        let window = &samples[samples.len() - self.window_size..];
        let finite = |x: f64| if x.is_finite() { x } else { 0.0 };
        let mean = window.iter().map(|&x| finite(x)).sum::<f64>() / self.window_size as f64;

        for ((slot, &x), &w) in self.scratch.iter_mut().zip(window).zip(&self.taper) {
            *slot = Complex::new((finite(x) - mean) * w, 0.0);
        }

        self.fft.process(&mut self.scratch);

        let scale = self.window_size as f64;
        for (p, bin) in self.power.iter_mut().zip(&self.scratch) {
            *p = bin.norm_sqr() / scale;
        }

        self.summarize()
    }

    /// Analyze successive windows advanced by `window_size × (1 - overlap)`
    ///
    /// `overlap` is a fraction, clamped to `[0, 0.95]`. Only windows that fit
    /// entirely inside `samples` are processed.
    pub fn process_with_overlap(&mut self, samples: &[f64], overlap: f64) -> Vec<SpectralResult> {
        let overlap = if overlap.is_finite() {
            overlap.clamp(0.0, MAX_OVERLAP_FRACTION)
        } else {
            0.0
        };
        let hop = ((self.window_size as f64 * (1.0 - overlap)).round() as usize).max(1);

        let mut results = Vec::new();
        let mut start = 0;
        while start + self.window_size <= samples.len() {
            results.push(self.process_window(&samples[start..start + self.window_size]));
            start += hop;
        }
        results
    }

    /// Strongest bin whose center frequency lies in `range`
    ///
    /// Searches the spectrum of the last processed window; DC is never a
    /// candidate.
    pub fn find_dominant_frequency(&self, range: RangeInclusive<f64>) -> Option<SpectralPeak> {
        let resolution = self.frequency_resolution();

        self.power
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, &power)| (k as f64 * resolution, power))
            .filter(|(freq, power)| range.contains(freq) && *power > MIN_SPECTRAL_POWER)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(frequency, power)| SpectralPeak { frequency, power })
    }

    fn summarize(&mut self) -> SpectralResult {
        let bins = self.power.len();
        let total_power: f64 = self.power.iter().skip(1).sum();

        if bins < 2 || !(total_power > MIN_SPECTRAL_POWER) {
            self.power.iter_mut().for_each(|p| *p = 0.0);
            return SpectralResult::ZERO;
        }

        let (dominant_bin, power_at_f0) = self
            .power
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, &p)| (k, p))
            .unwrap_or((0, 0.0));

        let harmonic_ratio = |multiple: usize| {
            let bin = dominant_bin * multiple;
            if bin < bins && power_at_f0 > 0.0 {
                self.power[bin] / power_at_f0
            } else {
                0.0
            }
        };

        // Entropy over the non-DC bins, normalized by its maximum ln(M)
        let entropy = if bins > 2 {
            let h: f64 = self
                .power
                .iter()
                .skip(1)
                .map(|&p| p / total_power)
                .filter(|&p| p > 0.0)
                .map(|p| -p * p.ln())
                .sum();
            (h / ((bins - 1) as f64).ln()).clamp(0.0, 1.0)
        } else {
            0.0
        };

        SpectralResult {
            dominant_frequency: dominant_bin as f64 * self.frequency_resolution(),
            power_at_f0,
            h2_ratio: harmonic_ratio(2),
            h3_ratio: harmonic_ratio(3),
            spectral_entropy: entropy,
            total_power,
        }
    }
}

/// Periodic Hann window
pub(crate) fn hann_window(size: usize) -> Vec<f64> {
    let n = size as f64;
    (0..size)
        .map(|i| 0.5 - 0.5 * (2.0 * core::f64::consts::PI * i as f64 / n).cos())
        .collect()
}
