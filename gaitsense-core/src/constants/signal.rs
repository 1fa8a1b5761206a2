//! Signal Processing Defaults
//!
//! Window geometry for the spectral and coherence stages. Sized for a
//! ~50 Hz inertial stream and locomotion fundamentals between 0.2 and 4 Hz.

/// Nominal motion sample rate (Hz).
///
/// Phone and watch motion managers deliver device motion at 50 Hz when asked
/// for "game" rate updates.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 50.0;

/// FFT window length (samples).
///
/// 128 samples at 50 Hz = 2.56 s, enough for four or more cycles of the
/// slowest walk and a frequency resolution of ~0.39 Hz.
pub const DEFAULT_WINDOW_SIZE: usize = 128;

/// Samples between consecutive analysis windows.
///
/// 50 samples = one classification per second at the nominal rate.
pub const DEFAULT_HOP_SIZE: usize = 50;

/// Welch segment length for coherence (samples).
pub const DEFAULT_COHERENCE_SEGMENT: usize = 64;

/// Overlap between Welch segments (samples, 50% of the segment).
pub const DEFAULT_COHERENCE_OVERLAP: usize = 32;

/// Capacity of the per-channel analysis window buffer (samples).
///
/// Upper bound on any configured FFT window.
pub const MAX_WINDOW_CAPACITY: usize = 256;

/// Largest overlap fraction accepted by overlapped spectral processing.
///
/// Keeps the hop at a minimum of 5% of the window.
pub const MAX_OVERLAP_FRACTION: f64 = 0.95;

/// Spectral power below which a window is treated as silent.
pub const MIN_SPECTRAL_POWER: f64 = 1e-12;

/// Lower edge of the band searched for the bounce frequency (Hz).
pub const BOUNCE_BAND_MIN_HZ: f64 = 0.5;

/// Upper edge of the band searched for the bounce frequency (Hz).
pub const BOUNCE_BAND_MAX_HZ: f64 = 5.0;
