//! Error Types for Pipeline Configuration
//!
//! ## Design Philosophy
//!
//! The gait pipeline never fails while streaming. Short windows, silent
//! channels, zero-variance emissions and GPS dropouts all resolve to a defined
//! neutral value inside the component that sees them. The only place an error
//! can surface is when a component is *built* with parameters that cannot
//! describe a valid analysis:
//!
//! 1. **Small Size**: Each variant carries at most a couple of numbers, so the
//!    enum stays `Copy` and cheap to return from constructors.
//!
//! 2. **No Heap Allocation**: Messages are `&'static str` only.
//!
//! 3. **Actionable Information**: Each variant names the offending parameter and
//!    the value that was rejected.
//!
//! ## Error Categories
//!
//! ### Window Geometry
//! - `InvalidWindowSize`: FFT window is not a power of two (or is too small)
//! - `InvalidSegment`: Welch segment/overlap pair cannot advance
//! - `CapacityExceeded`: Requested window does not fit the sample buffer
//!
//! ### Numeric Parameters
//! - `InvalidSampleRate`: Sample rate is zero, negative or not finite
//! - `InvalidParameter`: Any other out-of-domain configuration value
//!
//! ## Handling Strategy
//!
//! ```rust
//! use gaitsense_core::{GaitError, spectral::SpectralWindowAnalyzer};
//!
//! match SpectralWindowAnalyzer::new(100, 50.0) {
//!     Ok(_) => unreachable!("100 is not a power of two"),
//!     Err(GaitError::InvalidWindowSize { size }) => assert_eq!(size, 100),
//!     Err(other) => panic!("unexpected error: {other}"),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for configuration operations
pub type GaitResult<T> = Result<T, GaitError>;

/// Configuration errors - kept small and `Copy`
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GaitError {
    /// FFT window length must be a power of two and at least 4 samples
    #[error("Window size {size} must be a power of two >= 4")]
    InvalidWindowSize {
        /// Rejected window length in samples
        size: usize,
    },

    /// Sample rate must be a positive, finite frequency
    #[error("Sample rate {rate} Hz must be positive and finite")]
    InvalidSampleRate {
        /// Rejected sample rate in Hz
        rate: f64,
    },

    /// Welch segmentation cannot make progress with this segment/overlap pair
    #[error("Segment length {length} with overlap {overlap} cannot advance")]
    InvalidSegment {
        /// Segment length in samples
        length: usize,
        /// Overlap between consecutive segments in samples
        overlap: usize,
    },

    /// A requested window is larger than the fixed buffer backing it
    #[error("Requested {requested} samples, buffer holds {capacity}")]
    CapacityExceeded {
        /// Samples the caller asked for
        requested: usize,
        /// Compile-time capacity of the backing buffer
        capacity: usize,
    },

    /// A numeric parameter is outside its valid domain
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name as it appears in the config struct
        name: &'static str,
        /// Why the value was rejected
        reason: &'static str,
    },
}

impl GaitError {
    /// Shorthand for [`GaitError::InvalidParameter`]
    pub const fn parameter(name: &'static str, reason: &'static str) -> Self {
        Self::InvalidParameter { name, reason }
    }
}

/// Check that a sample rate is usable
pub(crate) fn check_sample_rate(rate: f64) -> GaitResult<()> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(GaitError::InvalidSampleRate { rate })
    }
}

/// Check that an FFT length is a power of two of useful size
pub(crate) fn check_window_size(size: usize) -> GaitResult<()> {
    if size >= 4 && size.is_power_of_two() {
        Ok(())
    } else {
        Err(GaitError::InvalidWindowSize { size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_size_rules() {
        assert!(check_window_size(128).is_ok());
        assert!(check_window_size(4).is_ok());
        assert_eq!(check_window_size(2), Err(GaitError::InvalidWindowSize { size: 2 }));
        assert_eq!(check_window_size(96), Err(GaitError::InvalidWindowSize { size: 96 }));
    }

    #[test]
    fn sample_rate_rules() {
        assert!(check_sample_rate(50.0).is_ok());
        assert!(check_sample_rate(0.0).is_err());
        assert!(check_sample_rate(f64::NAN).is_err());
        assert!(check_sample_rate(f64::INFINITY).is_err());
    }

    #[test]
    fn errors_stay_small() {
        assert!(core::mem::size_of::<GaitError>() <= 40);
    }
}
