//! Per-Window Gait Feature Vector
//!
//! One [`GaitFeatureVector`] is produced per analysis window, either by the
//! [`FeatureExtractor`] from aligned sensor channels or directly by a caller
//! that already has features (replay, simulation, tests).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coherence::CrossChannelCoherenceEstimator;
use crate::constants::signal::{BOUNCE_BAND_MAX_HZ, BOUNCE_BAND_MIN_HZ};
use crate::errors::{GaitError, GaitResult};
use crate::spectral::{SpectralResult, SpectralWindowAnalyzer};

/// Fixed-shape feature record consumed by the gait model
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GaitFeatureVector {
    /// Dominant vertical frequency (Hz)
    pub stride_frequency: f64,
    pub h2_ratio: f64,
    pub h3_ratio: f64,
    /// Normalized spectral entropy, [0, 1]
    pub spectral_entropy: f64,
    /// Lateral/forward coherence at the stride frequency, [0, 1]
    pub xy_coherence: f64,
    /// Vertical/yaw coherence at the stride frequency, [0, 1]
    pub z_yaw_coherence: f64,
    /// Vertical acceleration RMS (g)
    pub normalized_vertical_rms: f64,
    /// Yaw rate RMS (rad/s)
    pub yaw_rate_rms: f64,
    /// GPS ground speed (m/s)
    pub gps_speed: f64,
    /// GPS horizontal accuracy (m); zero means no fix
    pub gps_accuracy: f64,
    pub watch_arm_symmetry: f64,
    pub watch_yaw_energy: f64,
}

impl GaitFeatureVector {
    /// The "no signal" vector
    pub const ZERO: Self = Self {
        stride_frequency: 0.0,
        h2_ratio: 0.0,
        h3_ratio: 0.0,
        spectral_entropy: 0.0,
        xy_coherence: 0.0,
        z_yaw_coherence: 0.0,
        normalized_vertical_rms: 0.0,
        yaw_rate_rms: 0.0,
        gps_speed: 0.0,
        gps_accuracy: 0.0,
        watch_arm_symmetry: 0.0,
        watch_yaw_energy: 0.0,
    };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Whether the vector carries a usable GPS fix
    pub fn has_gps_fix(&self) -> bool {
        self.gps_accuracy > 0.0
    }

    /// Copy with every field finite and inside its valid domain
    ///
    /// Non-finite values become zero, magnitudes are clamped at zero, and
    /// entropy/coherence are clamped to `[0, 1]`. An invalid GPS speed drops
    /// the fix entirely.
    pub fn sanitized(&self) -> Self {
        let non_negative = |x: f64| if x.is_finite() { x.max(0.0) } else { 0.0 };
        let unit = |x: f64| non_negative(x).min(1.0);
        let finite = |x: f64| if x.is_finite() { x } else { 0.0 };

        let gps_valid = self.gps_speed.is_finite()
            && self.gps_speed >= 0.0
            && self.gps_accuracy.is_finite()
            && self.gps_accuracy > 0.0;

        Self {
            stride_frequency: non_negative(self.stride_frequency),
            h2_ratio: non_negative(self.h2_ratio),
            h3_ratio: non_negative(self.h3_ratio),
            spectral_entropy: unit(self.spectral_entropy),
            xy_coherence: unit(self.xy_coherence),
            z_yaw_coherence: unit(self.z_yaw_coherence),
            normalized_vertical_rms: non_negative(self.normalized_vertical_rms),
            yaw_rate_rms: non_negative(self.yaw_rate_rms),
            gps_speed: if gps_valid { self.gps_speed } else { 0.0 },
            gps_accuracy: if gps_valid { self.gps_accuracy } else { 0.0 },
            watch_arm_symmetry: finite(self.watch_arm_symmetry),
            watch_yaw_energy: non_negative(self.watch_yaw_energy),
        }
    }
}

/// Aligned channel windows of equal length, oldest sample first
#[derive(Debug, Clone, Copy)]
pub struct ChannelWindows<'a> {
    pub lateral: &'a [f64],
    pub forward: &'a [f64],
    pub vertical: &'a [f64],
    pub yaw: &'a [f64],
}

/// Non-inertial inputs folded into each feature vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AuxiliaryInputs {
    pub gps_speed: f64,
    pub gps_accuracy: f64,
    pub watch_arm_symmetry: f64,
    pub watch_yaw_energy: f64,
}

/// Result of analyzing one window of channels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowAnalysis {
    pub features: GaitFeatureVector,
    pub spectrum: SpectralResult,
    /// Strongest vertical frequency in the bounce band, if any
    pub bounce_frequency: Option<f64>,
}

/// Builds feature vectors from aligned channel windows
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    spectral: SpectralWindowAnalyzer,
    coherence: CrossChannelCoherenceEstimator,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            spectral: SpectralWindowAnalyzer::default(),
            coherence: CrossChannelCoherenceEstimator::default(),
        }
    }
}

impl FeatureExtractor {
    pub fn new(
        spectral: SpectralWindowAnalyzer,
        coherence: CrossChannelCoherenceEstimator,
    ) -> GaitResult<Self> {
        if coherence.segment_length() > spectral.window_size() {
            return Err(GaitError::CapacityExceeded {
                requested: coherence.segment_length(),
                capacity: spectral.window_size(),
            });
        }
        Ok(Self {
            spectral,
            coherence,
        })
    }

    pub fn window_size(&self) -> usize {
        self.spectral.window_size()
    }

    pub fn spectral(&self) -> &SpectralWindowAnalyzer {
        &self.spectral
    }

    /// Analyze the most recent window of every channel
    pub fn extract(&mut self, channels: &ChannelWindows<'_>, aux: &AuxiliaryInputs) -> WindowAnalysis {
        let n = self.spectral.window_size();
        let tail = |values: &[f64]| values.len().saturating_sub(n);

        let spectrum = self.spectral.process_window(channels.vertical);
        let bounce_frequency = self
            .spectral
            .find_dominant_frequency(BOUNCE_BAND_MIN_HZ..=BOUNCE_BAND_MAX_HZ)
            .map(|peak| peak.frequency);

        let stride = spectrum.dominant_frequency;
        let (xy, z_yaw) = if spectrum.is_silent() {
            (0.0, 0.0)
        } else {
            (
                self.coherence.coherence(
                    &channels.lateral[tail(channels.lateral)..],
                    &channels.forward[tail(channels.forward)..],
                    stride,
                ),
                self.coherence.coherence(
                    &channels.vertical[tail(channels.vertical)..],
                    &channels.yaw[tail(channels.yaw)..],
                    stride,
                ),
            )
        };

        let features = GaitFeatureVector {
            stride_frequency: stride,
            h2_ratio: spectrum.h2_ratio,
            h3_ratio: spectrum.h3_ratio,
            spectral_entropy: spectrum.spectral_entropy,
            xy_coherence: xy,
            z_yaw_coherence: z_yaw,
            normalized_vertical_rms: rms_about_mean(&channels.vertical[tail(channels.vertical)..]),
            yaw_rate_rms: rms(&channels.yaw[tail(channels.yaw)..]),
            gps_speed: aux.gps_speed,
            gps_accuracy: aux.gps_accuracy,
            watch_arm_symmetry: aux.watch_arm_symmetry,
            watch_yaw_energy: aux.watch_yaw_energy,
        }
        .sanitized();

        WindowAnalysis {
            features,
            spectrum,
            bounce_frequency,
        }
    }
}

/// Root mean square; 0.0 for an empty slice
pub fn rms(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().filter(|x| x.is_finite()).map(|x| x * x).sum();
    (sum_sq / values.len() as f64).sqrt()
}

/// Root mean square after removing the mean
pub fn rms_about_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let finite = |x: f64| if x.is_finite() { x } else { 0.0 };
    let mean = values.iter().map(|&x| finite(x)).sum::<f64>() / values.len() as f64;
    let var = values
        .iter()
        .map(|&x| (finite(x) - mean).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    var.sqrt()
}
