//! Gaussian Emissions Keyed by (Gait, Feature)
//!
//! Each gait describes what it "looks like" as a set of independent Gaussian
//! densities over window features. The densities live in one table indexed by
//! `(gait, feature)`, so reconfiguring the model for a breed is a pure
//! rewrite of that table.
//!
//! ## Scoring
//!
//! ```text
//! log L(gait | x) = Σ  weight(g, f) · log N(x_f; μ(g, f), σ²(g, f))
//!                  f ∈ features with an entry for g
//! ```
//!
//! A missing entry contributes nothing, so adding a feature for one gait
//! never penalizes the others.

use gaitsense_core::GaitFeatureVector;

use crate::gait::{Gait, GAIT_COUNT};

const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// Univariate Gaussian density
///
/// A variance of zero degenerates to a point mass: probability 1.0 exactly
/// at the mean and 0.0 everywhere else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianEmission {
    mean: f64,
    variance: f64,
}

impl GaussianEmission {
    /// Negative or non-finite variance is treated as zero
    pub fn new(mean: f64, variance: f64) -> Self {
        let variance = if variance.is_finite() && variance > 0.0 {
            variance
        } else {
            0.0
        };
        Self { mean, variance }
    }

    pub fn from_std_dev(mean: f64, std_dev: f64) -> Self {
        Self::new(mean, std_dev * std_dev)
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn is_point_mass(&self) -> bool {
        self.variance == 0.0
    }

    /// Density at `x`
    pub fn probability(&self, x: f64) -> f64 {
        if self.is_point_mass() {
            return if x == self.mean { 1.0 } else { 0.0 };
        }
        let d = x - self.mean;
        let norm = libm::sqrt(2.0 * core::f64::consts::PI * self.variance);
        libm::exp(-0.5 * d * d / self.variance) / norm
    }

    /// Natural log of [`probability`](Self::probability); `-inf` where it is zero
    pub fn log_probability(&self, x: f64) -> f64 {
        if self.is_point_mass() {
            return if x == self.mean { 0.0 } else { f64::NEG_INFINITY };
        }
        let d = x - self.mean;
        -0.5 * (LN_2PI + libm::log(self.variance) + d * d / self.variance)
    }
}

/// Window features a gait emission can be defined over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    StrideFrequency,
    H2Ratio,
    H3Ratio,
    SpectralEntropy,
    XyCoherence,
    ZYawCoherence,
    VerticalRms,
    YawRateRms,
}

/// Number of [`Feature`] variants
pub const FEATURE_COUNT: usize = 8;

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::StrideFrequency,
        Feature::H2Ratio,
        Feature::H3Ratio,
        Feature::SpectralEntropy,
        Feature::XyCoherence,
        Feature::ZYawCoherence,
        Feature::VerticalRms,
        Feature::YawRateRms,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Read this feature from a vector
    pub fn value(self, features: &GaitFeatureVector) -> f64 {
        match self {
            Feature::StrideFrequency => features.stride_frequency,
            Feature::H2Ratio => features.h2_ratio,
            Feature::H3Ratio => features.h3_ratio,
            Feature::SpectralEntropy => features.spectral_entropy,
            Feature::XyCoherence => features.xy_coherence,
            Feature::ZYawCoherence => features.z_yaw_coherence,
            Feature::VerticalRms => features.normalized_vertical_rms,
            Feature::YawRateRms => features.yaw_rate_rms,
        }
    }
}

/// Emission plus its weight in the joint log-likelihood
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedEmission {
    pub emission: GaussianEmission,
    pub weight: f64,
}

/// Emission lookup keyed by `(gait, feature)`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmissionTable {
    entries: [[Option<WeightedEmission>; FEATURE_COUNT]; GAIT_COUNT],
}

impl EmissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, gait: Gait, feature: Feature, emission: GaussianEmission, weight: f64) {
        self.entries[gait.index()][feature.index()] = Some(WeightedEmission { emission, weight });
    }

    pub fn remove(&mut self, gait: Gait, feature: Feature) {
        self.entries[gait.index()][feature.index()] = None;
    }

    pub fn get(&self, gait: Gait, feature: Feature) -> Option<&WeightedEmission> {
        self.entries[gait.index()][feature.index()].as_ref()
    }

    /// Weighted joint log-likelihood of `features` under `gait`
    ///
    /// 0.0 when the gait has no entries at all.
    pub fn log_likelihood(&self, gait: Gait, features: &GaitFeatureVector) -> f64 {
        Feature::ALL
            .iter()
            .filter_map(|&feature| {
                self.get(gait, feature).map(|entry| {
                    entry.weight * entry.emission.log_probability(feature.value(features))
                })
            })
            .sum()
    }
}

/// Secondary emissions shared by every breed: (H2 ratio, XY coherence) as
/// (mean, variance) per gait
pub(crate) fn secondary_emissions(gait: Gait) -> [(Feature, GaussianEmission); 2] {
    let (h2, xy) = match gait {
        Gait::Stationary => ((0.2, 0.09), (0.1, 0.04)),
        Gait::Walk => ((0.5, 0.06), (0.35, 0.04)),
        Gait::Trot => ((0.7, 0.06), (0.6, 0.04)),
        Gait::Canter => ((0.4, 0.06), (0.5, 0.04)),
        Gait::Gallop => ((0.3, 0.06), (0.45, 0.04)),
    };
    [
        (Feature::H2Ratio, GaussianEmission::new(h2.0, h2.1)),
        (Feature::XyCoherence, GaussianEmission::new(xy.0, xy.1)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn standard_normal_values() {
        let g = GaussianEmission::new(0.0, 1.0);
        assert!((g.probability(0.0) - 0.398_942_280_4).abs() < 1e-9);
        assert!((g.log_probability(1.0) - (-1.418_938_533_2)).abs() < 1e-9);
        assert!((g.probability(1.0).ln() - g.log_probability(1.0)).abs() < 1e-12);
    }

    #[test]
    fn zero_variance_is_point_mass() {
        let g = GaussianEmission::new(2.0, 0.0);
        assert_eq!(g.probability(2.0), 1.0);
        assert_eq!(g.probability(2.0001), 0.0);
        assert_eq!(g.log_probability(2.0), 0.0);
        assert_eq!(g.log_probability(-5.0), f64::NEG_INFINITY);

        assert!(GaussianEmission::new(1.0, -3.0).is_point_mass());
        assert!(GaussianEmission::new(1.0, f64::NAN).is_point_mass());
    }

    #[test]
    fn extreme_inputs_stay_finite() {
        let g = GaussianEmission::new(1.6, 0.09);
        assert_eq!(g.probability(1e300), 0.0);
        assert!(!g.log_probability(1e100).is_nan());
        assert!(g.log_probability(1e100) < g.log_probability(1.6));
    }

    #[test]
    fn table_skips_missing_entries() {
        let mut table = EmissionTable::new();
        let features = GaitFeatureVector {
            stride_frequency: 1.6,
            h2_ratio: 0.5,
            ..GaitFeatureVector::ZERO
        };

        assert_eq!(table.log_likelihood(Gait::Walk, &features), 0.0);

        let stride = GaussianEmission::new(1.6, 0.09);
        table.set(Gait::Walk, Feature::StrideFrequency, stride, 1.0);
        let only_stride = table.log_likelihood(Gait::Walk, &features);
        assert!((only_stride - stride.log_probability(1.6)).abs() < 1e-12);

        let h2 = GaussianEmission::new(0.5, 0.06);
        table.set(Gait::Walk, Feature::H2Ratio, h2, 0.5);
        let both = table.log_likelihood(Gait::Walk, &features);
        assert!((both - only_stride - 0.5 * h2.log_probability(0.5)).abs() < 1e-12);

        table.remove(Gait::Walk, Feature::H2Ratio);
        assert!(table.get(Gait::Walk, Feature::H2Ratio).is_none());
        assert_eq!(table.log_likelihood(Gait::Trot, &features), 0.0);
    }

    #[test]
    fn feature_lookup_reads_matching_field() {
        let features = GaitFeatureVector {
            z_yaw_coherence: 0.42,
            yaw_rate_rms: 1.5,
            ..GaitFeatureVector::ZERO
        };
        assert_eq!(Feature::ZYawCoherence.value(&features), 0.42);
        assert_eq!(Feature::YawRateRms.value(&features), 1.5);
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
        }
    }

    proptest! {
        #[test]
        fn density_peaks_at_mean_and_decreases(
            mean in -10.0f64..10.0,
            variance in 0.01f64..10.0,
            d1 in 0.0f64..4.0,
            d2 in 0.0f64..4.0,
            below in any::<bool>(),
        ) {
            let g = GaussianEmission::new(mean, variance);
            let sigma = variance.sqrt();
            let (near, far) = if d1 < d2 { (d1, d2) } else { (d2, d1) };
            prop_assume!(far - near > 1e-3);

            let sign = if below { -1.0 } else { 1.0 };
            let at = |d: f64| g.log_probability(mean + sign * d * sigma);

            prop_assert!(g.probability(mean) >= g.probability(mean + sign * near * sigma));
            prop_assert!(at(near) > at(far));
        }
    }
}
