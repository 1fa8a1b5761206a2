//! Constants for GaitSense
//!
//! Centralized numeric defaults used across the pipeline. Every value carries
//! its unit in the name and a short note on where it comes from.
//!
//! ## Organization
//!
//! - **Signal**: sample rates, window geometry, spectral guards
//! - **Motion**: frame alignment, drift tracking, bounce diagnostic
//! - **Gait**: speed bands, GPS weighting, HMM and confirmation thresholds
//!
//! ## Usage Guidelines
//!
//! 1. Use these constants instead of magic numbers
//! 2. Config structs take their `Default` values from here
//! 3. Group related constants together

/// Sample rates, window sizes and spectral guards.
pub mod signal;

/// Reference-frame alignment and drift tracking.
pub mod motion;

/// Gait speed bands, GPS evidence weighting and classifier thresholds.
pub mod gait;

pub use signal::{
    DEFAULT_SAMPLE_RATE_HZ, DEFAULT_WINDOW_SIZE, DEFAULT_HOP_SIZE,
    DEFAULT_COHERENCE_SEGMENT, DEFAULT_COHERENCE_OVERLAP, MAX_WINDOW_CAPACITY,
};

pub use motion::{
    DRIFT_CHECK_INTERVAL_SAMPLES, DRIFT_THRESHOLD_DEGREES, RECALIBRATION_COOLDOWN_SAMPLES,
};

pub use gait::{
    WALK_MIN_SPEED_MS, TROT_MIN_SPEED_MS, CANTER_MIN_SPEED_MS, GALLOP_MIN_SPEED_MS,
    DEFAULT_SELF_TRANSITION, CONFIDENCE_THRESHOLD, CONFIRMATION_COUNT,
};
