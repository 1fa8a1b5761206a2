//! Motion Frame Alignment Constants
//!
//! Parameters for the gravity-direction drift tracker and the bounce
//! amplitude diagnostic.

/// Smoothing factor of the gravity-direction moving average.
///
/// At 50 Hz an alpha of 0.01 gives a time constant of ~2 s, slow enough to
/// ignore stride-level oscillation.
pub const DRIFT_EMA_ALPHA: f64 = 0.01;

/// Samples between drift checks.
pub const DRIFT_CHECK_INTERVAL_SAMPLES: u64 = 100;

/// Angle between tracked and calibrated down beyond which the frame is
/// considered drifted (degrees).
pub const DRIFT_THRESHOLD_DEGREES: f64 = 15.0;

/// Consecutive drifted checks required before recalibrating.
///
/// 3 checks at 100 samples = 6 s of sustained deviation at 50 Hz.
pub const DRIFT_SUSTAINED_CHECKS: u32 = 3;

/// Minimum samples between automatic recalibrations.
///
/// 3000 samples = 60 s at 50 Hz.
pub const RECALIBRATION_COOLDOWN_SAMPLES: u64 = 3000;

/// Gravity vectors shorter than this are treated as unavailable (g).
pub const MIN_GRAVITY_NORM_G: f64 = 0.1;

/// Capacity of the vertical-acceleration ring used for bounce amplitude.
pub const BOUNCE_BUFFER_CAPACITY: usize = 64;

/// Samples required before a bounce amplitude is reported.
pub const MIN_BOUNCE_SAMPLES: usize = 20;
