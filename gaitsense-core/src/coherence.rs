//! Magnitude-Squared Coherence Between Two Channels
//!
//! Two body axes that move in lockstep (lateral and forward sway at a trot,
//! vertical bounce and yaw at a canter) share phase-stable energy at the
//! stride frequency. Coherence measures that coupling independently of the
//! phase offset between the channels:
//!
//! ```text
//!             |⟨X₁(f)·X₂*(f)⟩|²
//! C(f) = ─────────────────────────     ⟨·⟩ = mean over Welch segments
//!         ⟨|X₁(f)|²⟩ · ⟨|X₂(f)|²⟩
//! ```
//!
//! With a single segment the estimate is identically 1, so it is only
//! informative when several overlapping segments are averaged.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::constants::signal::{
    DEFAULT_COHERENCE_OVERLAP, DEFAULT_COHERENCE_SEGMENT, DEFAULT_SAMPLE_RATE_HZ,
    MIN_SPECTRAL_POWER,
};
use crate::errors::{check_sample_rate, GaitError, GaitResult};
use crate::spectral::hann_window;

/// Welch-method coherence estimator
#[derive(Clone)]
pub struct CrossChannelCoherenceEstimator {
    segment_length: usize,
    overlap: usize,
    sample_rate: f64,
    fft: Arc<dyn Fft<f64>>,
    taper: Vec<f64>,
    first: Vec<Complex<f64>>,
    second: Vec<Complex<f64>>,
}

impl core::fmt::Debug for CrossChannelCoherenceEstimator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CrossChannelCoherenceEstimator")
            .field("segment_length", &self.segment_length)
            .field("overlap", &self.overlap)
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

impl Default for CrossChannelCoherenceEstimator {
    fn default() -> Self {
        Self::build(
            DEFAULT_COHERENCE_SEGMENT,
            DEFAULT_COHERENCE_OVERLAP,
            DEFAULT_SAMPLE_RATE_HZ,
        )
    }
}

impl CrossChannelCoherenceEstimator {
    /// Create an estimator; `overlap` is in samples and must be smaller than
    /// `segment_length`
    pub fn new(segment_length: usize, overlap: usize, sample_rate: f64) -> GaitResult<Self> {
        if segment_length < 4 || overlap >= segment_length {
            return Err(GaitError::InvalidSegment {
                length: segment_length,
                overlap,
            });
        }
        check_sample_rate(sample_rate)?;
        Ok(Self::build(segment_length, overlap, sample_rate))
    }

    fn build(segment_length: usize, overlap: usize, sample_rate: f64) -> Self {
        Self {
            segment_length,
            overlap,
            sample_rate,
            fft: FftPlanner::new().plan_fft_forward(segment_length),
            taper: hann_window(segment_length),
            first: vec![Complex::new(0.0, 0.0); segment_length],
            second: vec![Complex::new(0.0, 0.0); segment_length],
        }
    }

    pub fn segment_length(&self) -> usize {
        self.segment_length
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Samples between the starts of consecutive segments
    pub fn hop(&self) -> usize {
        self.segment_length - self.overlap
    }

    /// Number of full segments that fit in `len` samples
    pub fn segment_count(&self, len: usize) -> usize {
        if len < self.segment_length {
            0
        } else {
            (len - self.segment_length) / self.hop() + 1
        }
    }

    /// Coherence of two signals at `frequency`, in `[0, 1]`
    ///
    /// The signals are truncated to the shorter of the two. Returns 0.0 when
    /// either is shorter than one segment, when the frequency is not finite,
    /// or when either channel carries no power at that bin.
    pub fn coherence(&mut self, signal1: &[f64], signal2: &[f64], frequency: f64) -> f64 {
        let len = signal1.len().min(signal2.len());
        let segments = self.segment_count(len);
        if segments == 0 || !frequency.is_finite() || frequency < 0.0 {
            return 0.0;
        }

        let resolution = self.sample_rate / self.segment_length as f64;
        let bin = ((frequency / resolution).round() as usize).min(self.segment_length / 2);

        let mut cross = Complex::new(0.0, 0.0);
        let mut auto1 = 0.0;
        let mut auto2 = 0.0;

        for segment in 0..segments {
            let start = segment * self.hop();
            let range = start..start + self.segment_length;

            load_segment(&mut self.first, &signal1[range.clone()], &self.taper);
            load_segment(&mut self.second, &signal2[range], &self.taper);
            self.fft.process(&mut self.first);
            self.fft.process(&mut self.second);

            let x1 = self.first[bin];
            let x2 = self.second[bin];
            cross += x1 * x2.conj();
            auto1 += x1.norm_sqr();
            auto2 += x2.norm_sqr();
        }

        if auto1 <= MIN_SPECTRAL_POWER || auto2 <= MIN_SPECTRAL_POWER {
            return 0.0;
        }

        let value = cross.norm_sqr() / (auto1 * auto2);
        if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Mean-removed, tapered copy of one segment
fn load_segment(dest: &mut [Complex<f64>], source: &[f64], taper: &[f64]) {
    let finite = |x: f64| if x.is_finite() { x } else { 0.0 };
    let mean = source.iter().map(|&x| finite(x)).sum::<f64>() / source.len() as f64;

    for ((slot, &x), &w) in dest.iter_mut().zip(source).zip(taper) {
        *slot = Complex::new((finite(x) - mean) * w, 0.0);
    }
}
