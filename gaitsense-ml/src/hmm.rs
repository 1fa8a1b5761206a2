//! Five-State Gait Filter
//!
//! ## Overview
//!
//! A forward-only hidden Markov model over [`Gait`]. Each update folds one
//! window's features into the posterior:
//!
//! ```text
//! prior ──T──→ predicted ──× L(gait | features)──→ normalize ──→ posterior
//!              (adjacent      (spectral emissions
//!               states only)   × GPS consistency)
//! ```
//!
//! ## Bounded Evidence
//!
//! Spectral likelihoods are taken relative to the best state and floored at
//! [`MIN_RELATIVE_LIKELIHOOD`]. The same floor applies again after the GPS
//! factor. One window can therefore move the odds between two states by at
//! most 4:1, which together with the self-transition probability sets how
//! many consecutive agreeing windows a gait change needs.
//!
//! ## GPS Consistency
//!
//! For a fix with accuracy `a` (m), `0 < a < 50`:
//!
//! ```text
//! w      = clamp((50 - a) / 45, 0, 1)
//! mass_g = Φ((hi_g - v) / σ) - Φ((lo_g - v) / σ),   σ = 0.2 m/s
//! factor = (1 - w) + w · max(mass_g, 1e-4)
//! ```
//!
//! A 3 m fix reporting 0 m/s all but rules out walking; a 45 m fix barely
//! perturbs the spectral result.

use gaitsense_core::constants::gait::{
    DEFAULT_SELF_TRANSITION, GPS_FULL_CONFIDENCE_ACCURACY_M, GPS_MAX_USEFUL_ACCURACY_M,
    GPS_SPEED_SIGMA_MS, MIN_RELATIVE_LIKELIHOOD, MIN_SPEED_CONSISTENCY, SECONDARY_FEATURE_WEIGHT,
};
use gaitsense_core::{GaitError, GaitFeatureVector, GaitResult};

use crate::emission::{secondary_emissions, EmissionTable, Feature};
use crate::gait::{Gait, TransitionMatrix, GAIT_COUNT};
use crate::profile::{Breed, FrequencyBand, LearnedGaitParameters};

/// Posterior that puts all mass on `gait`
fn certain(gait: Gait) -> [f64; GAIT_COUNT] {
    let mut p = [0.0; GAIT_COUNT];
    p[gait.index()] = 1.0;
    p
}

/// Hidden Markov model over the five gaits
#[derive(Debug, Clone)]
pub struct GaitHiddenMarkovModel {
    breed: Breed,
    age_adjustment: f64,
    /// Breed and age bands before any learned shift
    base_bands: [FrequencyBand; GAIT_COUNT],
    bands: [FrequencyBand; GAIT_COUNT],
    emissions: EmissionTable,
    transitions: TransitionMatrix,
    posterior: [f64; GAIT_COUNT],
    updates: u64,
}

impl Default for GaitHiddenMarkovModel {
    fn default() -> Self {
        Self::new()
    }
}

impl GaitHiddenMarkovModel {
    /// Generic-breed model, certain of [`Gait::Stationary`]
    pub fn new() -> Self {
        let bands = Breed::Generic.bands(1.0);
        let mut model = Self {
            breed: Breed::Generic,
            age_adjustment: 1.0,
            base_bands: bands,
            bands,
            emissions: EmissionTable::new(),
            transitions: TransitionMatrix::new(DEFAULT_SELF_TRANSITION),
            posterior: certain(Gait::Stationary),
            updates: 0,
        };
        model.rebuild_emissions();
        model
    }

    /// Rebuild the emission table for a breed and age, and set stickiness
    ///
    /// Discards any learned shift; apply learned parameters again afterwards.
    /// The posterior is left untouched.
    pub fn configure(
        &mut self,
        breed: Breed,
        age_adjustment: f64,
        self_transition: f64,
    ) -> GaitResult<()> {
        if !(self_transition > 0.0 && self_transition < 1.0) {
            return Err(GaitError::parameter("self_transition", "must be in (0, 1)"));
        }
        if !(age_adjustment.is_finite() && age_adjustment > 0.0) {
            return Err(GaitError::parameter("age_adjustment", "must be positive"));
        }

        self.breed = breed;
        self.age_adjustment = age_adjustment;
        self.base_bands = breed.bands(age_adjustment);
        self.bands = self.base_bands;
        self.transitions = TransitionMatrix::new(self_transition);
        self.rebuild_emissions();
        Ok(())
    }

    /// Blend learned frequency centers into the configured bands
    ///
    /// Returns `false` (and changes nothing) when the record has fewer than
    /// three rides behind it. Replaces any previously applied record.
    pub fn apply_learned_parameters(&mut self, learned: &LearnedGaitParameters) -> bool {
        if !learned.is_trusted() {
            return false;
        }

        let weight = learned.blend_weight();
        for gait in Gait::ALL {
            let base = self.base_bands[gait.index()];
            self.bands[gait.index()] = match learned.center(gait) {
                Some(center) => base.shifted(weight * (center - base.center)),
                None => base,
            };
        }
        self.rebuild_emissions();
        true
    }

    fn rebuild_emissions(&mut self) {
        let mut table = EmissionTable::new();
        for gait in Gait::ALL {
            table.set(gait, Feature::StrideFrequency, self.bands[gait.index()].emission(), 1.0);
            for (feature, emission) in secondary_emissions(gait) {
                table.set(gait, feature, emission, SECONDARY_FEATURE_WEIGHT);
            }
        }
        self.emissions = table;
    }

    /// Fold one feature vector into the posterior and return the arg-max
    pub fn update(&mut self, features: &GaitFeatureVector) -> Gait {
        let features = features.sanitized();
        let likelihood = self.likelihoods(&features);
        let predicted = self.transitions.propagate(&self.posterior);

        let mut joint = [0.0; GAIT_COUNT];
        for ((slot, &p), &l) in joint.iter_mut().zip(&predicted).zip(&likelihood) {
            *slot = p * l;
        }

        let total: f64 = joint.iter().sum();
        self.posterior = if total.is_finite() && total > 0.0 {
            joint.map(|j| j / total)
        } else {
            normalized(predicted)
        };
        self.updates += 1;
        self.current_state()
    }

    /// Per-state evidence for `features`, relative to the best state
    ///
    /// Every entry lies in `[0.25, 1]` and at least one equals 1.
    pub fn likelihoods(&self, features: &GaitFeatureVector) -> [f64; GAIT_COUNT] {
        let log_l = Gait::ALL.map(|gait| self.emissions.log_likelihood(gait, features));
        let best = log_l.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let spectral = if best.is_finite() {
            log_l.map(|l| {
                let relative = libm::exp(l - best);
                if relative.is_finite() {
                    relative.max(MIN_RELATIVE_LIKELIHOOD)
                } else {
                    MIN_RELATIVE_LIKELIHOOD
                }
            })
        } else {
            [1.0; GAIT_COUNT]
        };

        let Some(gps) = gps_consistency(features) else {
            return spectral;
        };

        let mut combined = [0.0; GAIT_COUNT];
        for ((slot, &s), &g) in combined.iter_mut().zip(&spectral).zip(&gps) {
            *slot = s * g;
        }
        let top = combined.iter().copied().fold(0.0, f64::max);
        if top > 0.0 {
            combined.map(|c| (c / top).max(MIN_RELATIVE_LIKELIHOOD))
        } else {
            spectral
        }
    }

    pub fn current_state(&self) -> Gait {
        let mut best = Gait::Stationary;
        for gait in Gait::ALL {
            if self.posterior[gait.index()] > self.posterior[best.index()] {
                best = gait;
            }
        }
        best
    }

    pub fn probability(&self, gait: Gait) -> f64 {
        self.posterior[gait.index()]
    }

    /// Posterior mass of the arg-max state
    pub fn confidence(&self) -> f64 {
        self.probability(self.current_state())
    }

    pub fn posterior(&self) -> [f64; GAIT_COUNT] {
        self.posterior
    }

    /// Back to certainty on [`Gait::Stationary`]; configuration is kept
    pub fn reset(&mut self) {
        self.reset_to(Gait::Stationary);
    }

    /// Certainty on `gait`, used when another source has confirmed it
    pub fn reset_to(&mut self, gait: Gait) {
        self.posterior = certain(gait);
        self.updates = 0;
    }

    pub fn update_count(&self) -> u64 {
        self.updates
    }

    pub fn breed(&self) -> Breed {
        self.breed
    }

    pub fn age_adjustment(&self) -> f64 {
        self.age_adjustment
    }

    pub fn self_transition(&self) -> f64 {
        self.transitions.self_transition()
    }

    pub fn transitions(&self) -> &TransitionMatrix {
        &self.transitions
    }

    /// Stride-frequency band currently in use for `gait`
    pub fn band(&self, gait: Gait) -> FrequencyBand {
        self.bands[gait.index()]
    }

    pub fn emissions(&self) -> &EmissionTable {
        &self.emissions
    }
}

fn normalized(p: [f64; GAIT_COUNT]) -> [f64; GAIT_COUNT] {
    let total: f64 = p.iter().sum();
    if total.is_finite() && total > 0.0 {
        p.map(|x| x / total)
    } else {
        certain(Gait::Stationary)
    }
}

/// Standard normal CDF
fn phi(z: f64) -> f64 {
    0.5 * (1.0 + libm::erf(z / core::f64::consts::SQRT_2))
}

/// Per-state speed consistency factor, or `None` when the fix is unusable
fn gps_consistency(features: &GaitFeatureVector) -> Option<[f64; GAIT_COUNT]> {
    let accuracy = features.gps_accuracy;
    if !(accuracy > 0.0 && accuracy < GPS_MAX_USEFUL_ACCURACY_M) {
        return None;
    }

    let weight = ((GPS_MAX_USEFUL_ACCURACY_M - accuracy)
        / (GPS_MAX_USEFUL_ACCURACY_M - GPS_FULL_CONFIDENCE_ACCURACY_M))
        .clamp(0.0, 1.0);
    let speed = features.gps_speed;

    Some(Gait::ALL.map(|gait| {
        let (lo, hi) = gait.speed_band();
        let mass = phi((hi - speed) / GPS_SPEED_SIGMA_MS) - phi((lo - speed) / GPS_SPEED_SIGMA_MS);
        (1.0 - weight) + weight * mass.max(MIN_SPEED_CONSISTENCY)
    }))
}
