//! Subject Configuration: Breed, Age and Learned Shifts
//!
//! Stride frequency scales with body size. Ponies take short, quick strides
//! and draft horses long, slow ones, so a single set of frequency bands
//! misclassifies both ends. Each breed carries its own per-gait band; age
//! widens the bands; a learned record from past rides nudges the centers
//! toward what this particular animal actually does.
//!
//! ## Band Model
//!
//! ```text
//!        min          center          max
//!         ├──────────────┼──────────────┤
//!                        μ          σ = (max - min) / 4
//! ```
//!
//! The band spans ±2σ of the stride-frequency emission.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use gaitsense_core::constants::gait::{
    DEFAULT_SELF_TRANSITION, LEARNED_FULL_RIDES, LEARNED_MAX_BLEND, LEARNED_MIN_RIDES,
};

use crate::emission::GaussianEmission;
use crate::gait::{Gait, GAIT_COUNT};

/// Expected stride-frequency range of one gait (Hz)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrequencyBand {
    pub center: f64,
    pub min: f64,
    pub max: f64,
}

impl FrequencyBand {
    pub const fn new(center: f64, min: f64, max: f64) -> Self {
        Self { center, min, max }
    }

    /// Stretch both edges away from the center by `factor`
    ///
    /// The lower edge never drops below 0 Hz.
    pub fn widened(&self, factor: f64) -> Self {
        Self {
            center: self.center,
            min: (self.center - (self.center - self.min) * factor).max(0.0),
            max: self.center + (self.max - self.center) * factor,
        }
    }

    /// Move the whole band by `delta` Hz
    pub fn shifted(&self, delta: f64) -> Self {
        Self {
            center: self.center + delta,
            min: (self.min + delta).max(0.0),
            max: self.max + delta,
        }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, frequency: f64) -> bool {
        (self.min..=self.max).contains(&frequency)
    }

    /// Stride-frequency emission for this band
    pub fn emission(&self) -> GaussianEmission {
        GaussianEmission::from_std_dev(self.center, self.width() / 4.0)
    }
}

/// Breed families with distinct stride-frequency bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Breed {
    #[default]
    Generic,
    Pony,
    Arabian,
    Thoroughbred,
    Warmblood,
    Draft,
}

const STATIONARY_BAND: FrequencyBand = FrequencyBand::new(0.25, 0.0, 0.8);

impl Breed {
    pub const ALL: [Breed; 6] = [
        Breed::Generic,
        Breed::Pony,
        Breed::Arabian,
        Breed::Thoroughbred,
        Breed::Warmblood,
        Breed::Draft,
    ];

    /// Frequency band of `gait` for this breed, before age widening
    pub fn band(self, gait: Gait) -> FrequencyBand {
        // (walk, trot, canter, gallop) as (center, min, max)
        let [walk, trot, canter, gallop] = match self {
            Breed::Generic => [(1.6, 1.0, 2.2), (2.6, 2.0, 3.2), (2.0, 1.5, 2.5), (2.4, 1.8, 3.0)],
            Breed::Pony => [(1.9, 1.3, 2.5), (3.0, 2.4, 3.6), (2.4, 1.9, 2.9), (2.8, 2.2, 3.4)],
            Breed::Arabian => [(1.7, 1.1, 2.3), (2.7, 2.1, 3.3), (2.1, 1.6, 2.6), (2.5, 1.9, 3.1)],
            Breed::Thoroughbred => [(1.5, 1.0, 2.0), (2.5, 2.0, 3.0), (1.9, 1.5, 2.3), (2.3, 1.8, 2.8)],
            Breed::Warmblood => [(1.4, 0.9, 1.9), (2.3, 1.8, 2.8), (1.8, 1.4, 2.2), (2.2, 1.7, 2.7)],
            Breed::Draft => [(1.3, 0.8, 1.8), (2.1, 1.6, 2.6), (1.7, 1.3, 2.1), (2.0, 1.5, 2.5)],
        };
        let band = |(c, lo, hi): (f64, f64, f64)| FrequencyBand::new(c, lo, hi);

        match gait {
            Gait::Stationary => STATIONARY_BAND,
            Gait::Walk => band(walk),
            Gait::Trot => band(trot),
            Gait::Canter => band(canter),
            Gait::Gallop => band(gallop),
        }
    }

    /// Every gait's band, widened by `age_adjustment`
    pub fn bands(self, age_adjustment: f64) -> [FrequencyBand; GAIT_COUNT] {
        Gait::ALL.map(|gait| self.band(gait).widened(age_adjustment))
    }
}

/// Band widening factor for an animal's age
///
/// Young (< 4 years) and old (> 18 years) animals move less consistently.
pub fn age_adjustment(age_years: f64) -> f64 {
    if !age_years.is_finite() {
        1.0
    } else if age_years < 4.0 {
        1.15
    } else if age_years > 18.0 {
        1.10
    } else {
        1.0
    }
}

/// Per-animal stride-frequency centers learned from past rides
///
/// Owned by the caller; the model only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LearnedGaitParameters {
    /// Learned center per gait (Hz), indexed by [`Gait::index`]
    pub frequency_centers: [Option<f64>; GAIT_COUNT],
    /// Rides the centers were learned from
    pub ride_count: u32,
}

impl LearnedGaitParameters {
    pub fn new(ride_count: u32) -> Self {
        Self {
            frequency_centers: [None; GAIT_COUNT],
            ride_count,
        }
    }

    pub fn with_center(mut self, gait: Gait, frequency: f64) -> Self {
        self.frequency_centers[gait.index()] = Some(frequency);
        self
    }

    pub fn center(&self, gait: Gait) -> Option<f64> {
        self.frequency_centers[gait.index()].filter(|f| f.is_finite() && *f > 0.0)
    }

    /// Enough history to trust the learned centers
    pub fn is_trusted(&self) -> bool {
        self.ride_count >= LEARNED_MIN_RIDES
    }

    /// Weight given to the learned centers, 0 until trusted, saturating at
    /// [`LEARNED_MAX_BLEND`]
    pub fn blend_weight(&self) -> f64 {
        if !self.is_trusted() {
            return 0.0;
        }
        let rides = self.ride_count.min(LEARNED_FULL_RIDES) as f64;
        LEARNED_MAX_BLEND * rides / LEARNED_FULL_RIDES as f64
    }
}

/// Everything the model needs to know about the tracked animal
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SubjectProfile {
    pub breed: Breed,
    pub age_years: Option<f64>,
    /// Per-update probability of staying in the current gait
    pub self_transition: f64,
    pub learned: Option<LearnedGaitParameters>,
}

impl Default for SubjectProfile {
    fn default() -> Self {
        Self {
            breed: Breed::Generic,
            age_years: None,
            self_transition: DEFAULT_SELF_TRANSITION,
            learned: None,
        }
    }
}

impl SubjectProfile {
    pub fn with_breed(mut self, breed: Breed) -> Self {
        self.breed = breed;
        self
    }

    pub fn with_age(mut self, years: f64) -> Self {
        self.age_years = Some(years);
        self
    }

    pub fn with_self_transition(mut self, probability: f64) -> Self {
        self.self_transition = probability;
        self
    }

    pub fn with_learned(mut self, learned: LearnedGaitParameters) -> Self {
        self.learned = Some(learned);
        self
    }

    pub fn age_adjustment(&self) -> f64 {
        self.age_years.map_or(1.0, age_adjustment)
    }
}
