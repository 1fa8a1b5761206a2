//! Gait Inference for GaitSense
//!
//! ## Overview
//!
//! This crate turns per-window feature vectors from `gaitsense-core` into a
//! stable, user-facing gait estimate. Two concerns pull in opposite
//! directions: a rider wants the display to follow a real transition within
//! a couple of seconds, but must never see it flicker between walk and trot
//! on an ambiguous window.
//!
//! ## Why a Hidden Markov Model?
//!
//! 1. **Memory**: the posterior carries evidence across windows, so one noisy
//!    window cannot undo ten clean ones
//! 2. **Physics**: the transition matrix forbids skipping a gait (no stationary
//!    to trot in one step)
//! 3. **Fusion**: GPS speed enters as a likelihood factor weighted by fix
//!    accuracy instead of a hard override
//! 4. **Cheap**: five states, one matrix-vector product per window
//!
//! ## Module Layout
//!
//! ```text
//! gait      ─ Gait enum, adjacency, speed bands, transition matrix
//! emission  ─ Gaussian emissions keyed by (gait, feature)
//! profile   ─ breed bands, age widening, learned centers, SubjectProfile
//! hmm       ─ GaitHiddenMarkovModel
//! analyzer  ─ GaitAnalyzer session orchestration and confirmation
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use gaitsense_ml::{GaitAnalyzer, Gait, SubjectProfile, Breed};
//! use gaitsense_core::GaitFeatureVector;
//!
//! let mut analyzer = GaitAnalyzer::new();
//! analyzer.set_change_handler(|change| {
//!     println!("{} -> {}", change.previous, change.current);
//! });
//! analyzer.start_analyzing(&SubjectProfile::default().with_breed(Breed::Arabian));
//!
//! let walk = GaitFeatureVector {
//!     stride_frequency: 1.7,
//!     h2_ratio: 0.5,
//!     xy_coherence: 0.35,
//!     ..GaitFeatureVector::ZERO
//! };
//! for _ in 0..10 {
//!     analyzer.inject_synthetic_features(&walk);
//! }
//! assert_eq!(analyzer.current_gait(), Gait::Walk);
//! ```

#![deny(unsafe_code)]

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
}

#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
}

pub mod analyzer;
pub mod emission;
pub mod gait;
pub mod hmm;
pub mod profile;

pub use analyzer::{
    AnalyzerConfig, CalibrationDriftHandler, ChangeSource, GaitAnalyzer, GaitChange,
    GaitChangeHandler, LeadDirection, LeadReading,
};
pub use emission::{EmissionTable, Feature, GaussianEmission};
pub use gait::{Gait, TransitionMatrix, GAIT_COUNT};
pub use hmm::GaitHiddenMarkovModel;
pub use profile::{age_adjustment, Breed, FrequencyBand, LearnedGaitParameters, SubjectProfile};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
