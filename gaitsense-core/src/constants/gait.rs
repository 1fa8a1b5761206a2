//! Gait Classification Constants
//!
//! Speed bands, GPS evidence weighting, and the thresholds used by the hidden
//! Markov model and the analyzer's confirmation logic.

// ===== SPEED BANDS =====
//
// Lower edge of each band; a speed exactly on an edge belongs to the faster
// gait.

/// Below this speed the animal is stationary (m/s).
pub const WALK_MIN_SPEED_MS: f64 = 0.5;

/// Walk / trot boundary (m/s).
pub const TROT_MIN_SPEED_MS: f64 = 2.2;

/// Trot / canter boundary (m/s).
pub const CANTER_MIN_SPEED_MS: f64 = 4.5;

/// Canter / gallop boundary (m/s).
pub const GALLOP_MIN_SPEED_MS: f64 = 7.0;

// ===== GPS EVIDENCE =====

/// Fixes with horizontal accuracy at or above this carry no weight (m).
pub const GPS_MAX_USEFUL_ACCURACY_M: f64 = 50.0;

/// Fixes at or below this accuracy carry full weight (m).
pub const GPS_FULL_CONFIDENCE_ACCURACY_M: f64 = 5.0;

/// Standard deviation of GPS-reported speed (m/s).
pub const GPS_SPEED_SIGMA_MS: f64 = 0.2;

/// Floor on a state's speed-consistency factor.
pub const MIN_SPEED_CONSISTENCY: f64 = 1e-4;

// ===== HIDDEN MARKOV MODEL =====

/// Default probability of staying in the current gait per update.
pub const DEFAULT_SELF_TRANSITION: f64 = 0.85;

/// Floor on a state's likelihood relative to the best state, per update.
///
/// Bounds how far one window can move the odds (4:1) so a single
/// contradictory window cannot flip an established gait.
pub const MIN_RELATIVE_LIKELIHOOD: f64 = 0.25;

/// Log-likelihood weight of secondary spectral features.
pub const SECONDARY_FEATURE_WEIGHT: f64 = 0.5;

/// Rides needed before learned parameters are trusted.
pub const LEARNED_MIN_RIDES: u32 = 3;

/// Rides at which the learned blend weight saturates.
pub const LEARNED_FULL_RIDES: u32 = 20;

/// Maximum blend weight given to a learned frequency center.
pub const LEARNED_MAX_BLEND: f64 = 0.5;

// ===== ANALYZER =====

/// Posterior probability required to report a gait change.
pub const CONFIDENCE_THRESHOLD: f64 = 0.65;

/// Consecutive agreeing speed-only candidates needed to change gait.
pub const CONFIRMATION_COUNT: u32 = 3;

/// Location fixes in the rolling speed average.
pub const SPEED_AVERAGE_LEN: usize = 5;

/// Confidence reported for a gait confirmed from speed alone.
pub const SPEED_FALLBACK_CONFIDENCE: f64 = 0.5;

/// Capacity of the speed history; bounds the configurable average length.
pub const MAX_SPEED_AVERAGE_LEN: usize = 16;
