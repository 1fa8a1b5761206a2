//! Signal core for GaitSense
//!
//! Turns raw inertial samples into per-window gait features.
//! Runs synchronously on the sensor delivery thread.
//!
//! Key constraints:
//! - Fixed-size windows, no allocation per sample
//! - One FFT and two coherence estimates per analysis window
//! - Never fails while streaming; bad input degrades to a zero result
//!
//! ```no_run
//! use gaitsense_core::{RotationFrameAligner, SpectralWindowAnalyzer, MotionSample};
//!
//! let mut aligner = RotationFrameAligner::new();
//! let mut spectral = SpectralWindowAnalyzer::default();
//!
//! let first = MotionSample::new(0, [0.0, 0.0, 0.1], [0.0; 3]);
//! aligner.calibrate(&first);
//!
//! let vertical: Vec<f64> = (0..128)
//!     .map(|i| aligner.transform(&MotionSample::new(i * 20, [0.0, 0.0, 0.1], [0.0; 3])).vertical)
//!     .collect();
//! let result = spectral.process_window(&vertical);
//! println!("stride at {:.2} Hz", result.dominant_frequency);
//! ```

#![deny(unsafe_code)]

// Logging compiles away without the `log` feature
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

pub mod buffer;
pub mod coherence;
pub mod constants;
pub mod errors;
pub mod features;
pub mod frame;
pub mod spectral;
pub mod types;

// Public API
pub use buffer::CircularBuffer;
pub use coherence::CrossChannelCoherenceEstimator;
pub use errors::{GaitError, GaitResult};
pub use features::{AuxiliaryInputs, ChannelWindows, FeatureExtractor, GaitFeatureVector, WindowAnalysis};
pub use frame::{AlignerConfig, CalibrationDrift, FrameUpdate, RotationFrameAligner};
pub use spectral::{SpectralPeak, SpectralResult, SpectralWindowAnalyzer};
pub use types::{AlignedSample, EulerAngles, LocationSample, MotionSample, Timestamp};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
