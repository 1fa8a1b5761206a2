//! Reference-Frame Alignment with Drift Re-Acquisition
//!
//! ## Overview
//!
//! A phone in a pocket or a watch on a wrist reports motion in its own body
//! frame, which bears no fixed relation to the animal. The aligner stores the
//! inverse of the attitude observed at calibration time and rotates every
//! later sample by
//!
//! ```text
//! R = q_ref⁻¹ ⊗ q_sample
//! aligned = R · v_body
//! ```
//!
//! so that motion is expressed in the frame the device had when the session
//! started: x = lateral, y = forward, z = vertical (and pitch/roll/yaw for
//! rotation rate). Rotation is norm preserving; the pipeline relies on that to
//! keep amplitude features comparable across sessions.
//!
//! ## Drift Tracking
//!
//! Attitude estimates drift, and devices shift on the body. The aligner keeps
//! a slow exponential moving average of the gravity direction seen through
//! the current alignment:
//!
//! ```text
//! every sample:            ema = normalize((1-α)·ema + α·(R·g))
//! every check interval:    θ = ∠(ema, calibrated_down)
//! θ > threshold for N checks AND cooldown elapsed
//!     → q_ref⁻¹ ← rotation(ema → calibrated_down) ⊗ q_ref⁻¹
//! ```
//!
//! Recalibration is silent. It bumps `recalibration_count`, raises
//! `calibration_drift_detected` and returns a [`CalibrationDrift`] event from
//! [`RotationFrameAligner::process`].
//!
//! ## Example
//!
//! ```rust
//! use gaitsense_core::frame::RotationFrameAligner;
//! use gaitsense_core::types::MotionSample;
//!
//! let aligner = RotationFrameAligner::new();
//! let sample = MotionSample::new(0, [0.1, 0.2, 0.3], [0.0, 0.0, 0.5]);
//! let aligned = aligner.transform(&sample);
//!
//! assert_eq!(aligned.lateral, 0.1);
//! assert_eq!(aligned.yaw_rate, 0.5);
//! ```

use core::f64::consts::PI;

use nalgebra::{UnitQuaternion, Vector3};

use crate::constants::motion::{
    DRIFT_CHECK_INTERVAL_SAMPLES, DRIFT_EMA_ALPHA, DRIFT_SUSTAINED_CHECKS,
    DRIFT_THRESHOLD_DEGREES, MIN_GRAVITY_NORM_G, RECALIBRATION_COOLDOWN_SAMPLES,
};
use crate::errors::{GaitError, GaitResult};
use crate::types::{AlignedSample, MotionSample, Timestamp};

/// Drift tracker tuning
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignerConfig {
    /// Moving-average weight of each new gravity observation, in (0, 1]
    pub ema_alpha: f64,
    /// Samples between drift checks
    pub check_interval: u64,
    /// Deviation that counts as drift (degrees)
    pub drift_threshold_degrees: f64,
    /// Consecutive drifted checks before recalibrating
    pub sustained_checks: u32,
    /// Minimum samples between automatic recalibrations
    pub cooldown_samples: u64,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            ema_alpha: DRIFT_EMA_ALPHA,
            check_interval: DRIFT_CHECK_INTERVAL_SAMPLES,
            drift_threshold_degrees: DRIFT_THRESHOLD_DEGREES,
            sustained_checks: DRIFT_SUSTAINED_CHECKS,
            cooldown_samples: RECALIBRATION_COOLDOWN_SAMPLES,
        }
    }
}

impl AlignerConfig {
    pub fn with_cooldown(mut self, samples: u64) -> Self {
        self.cooldown_samples = samples;
        self
    }

    pub fn with_threshold_degrees(mut self, degrees: f64) -> Self {
        self.drift_threshold_degrees = degrees;
        self
    }

    /// Reject values the tracker cannot run with
    pub fn validate(&self) -> GaitResult<()> {
        if !(self.ema_alpha > 0.0 && self.ema_alpha <= 1.0) {
            return Err(GaitError::parameter("ema_alpha", "must be in (0, 1]"));
        }
        if self.check_interval == 0 {
            return Err(GaitError::parameter("check_interval", "must be non-zero"));
        }
        if !(self.drift_threshold_degrees > 0.0 && self.drift_threshold_degrees < 180.0) {
            return Err(GaitError::parameter(
                "drift_threshold_degrees",
                "must be in (0, 180)",
            ));
        }
        if self.sustained_checks == 0 {
            return Err(GaitError::parameter("sustained_checks", "must be non-zero"));
        }
        Ok(())
    }
}

/// Emitted when the aligner recalibrates itself
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationDrift {
    pub timestamp: Timestamp,
    /// Angle between tracked and calibrated down at recalibration
    pub deviation_degrees: f64,
    /// Recalibrations since the last explicit calibration reset
    pub recalibration_count: u32,
}

/// Result of feeding one sample through [`RotationFrameAligner::process`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUpdate {
    pub sample: AlignedSample,
    pub drift: Option<CalibrationDrift>,
}

/// Rotates body-frame motion into a calibrated lateral/forward/vertical frame
#[derive(Debug, Clone)]
pub struct RotationFrameAligner {
    config: AlignerConfig,
    reference_inverse: UnitQuaternion<f64>,
    calibrated: bool,
    /// Gravity direction in the aligned frame at calibration time
    calibrated_down: Vector3<f64>,
    gravity_ema: Vector3<f64>,
    samples_seen: u64,
    last_recalibration: Option<u64>,
    drifted_checks: u32,
    recalibration_count: u32,
    drift_detected: bool,
}

impl Default for RotationFrameAligner {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationFrameAligner {
    /// Uncalibrated aligner with default drift tuning
    pub fn new() -> Self {
        Self::build(AlignerConfig::default())
    }

    /// Aligner with custom drift tuning
    pub fn with_config(config: AlignerConfig) -> GaitResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: AlignerConfig) -> Self {
        Self {
            config,
            reference_inverse: UnitQuaternion::identity(),
            calibrated: false,
            calibrated_down: default_down(),
            gravity_ema: default_down(),
            samples_seen: 0,
            last_recalibration: None,
            drifted_checks: 0,
            recalibration_count: 0,
            drift_detected: false,
        }
    }

    /// Store the inverse of this sample's attitude as the alignment reference
    pub fn calibrate(&mut self, sample: &MotionSample) {
        self.reference_inverse = sample.attitude.inverse();
        self.calibrated = true;

        let down = gravity_direction(&sample.gravity)
            .map(|g| self.rotation_for(sample) * g)
            .unwrap_or_else(default_down);
        self.calibrated_down = down;
        self.gravity_ema = down;
        self.drifted_checks = 0;

        log_info!(
            "frame calibrated at t={}ms, down=({:.3}, {:.3}, {:.3})",
            sample.timestamp,
            down.x,
            down.y,
            down.z
        );
    }

    /// Forget the calibration, drift state and recalibration history
    pub fn reset_calibration(&mut self) {
        log_debug!("frame calibration reset after {} recalibrations", self.recalibration_count);
        *self = Self::build(self.config);
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    pub fn recalibration_count(&self) -> u32 {
        self.recalibration_count
    }

    pub fn calibration_drift_detected(&self) -> bool {
        self.drift_detected
    }

    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    /// Current angle between the tracked and calibrated gravity (degrees)
    pub fn drift_angle_degrees(&self) -> f64 {
        self.gravity_ema.angle(&self.calibrated_down).to_degrees()
    }

    /// Rotate a sample into the aligned frame
    ///
    /// Pure: does not touch drift state. Identity attitude with no
    /// calibration maps x/y/z straight to lateral/forward/vertical.
    pub fn transform(&self, sample: &MotionSample) -> AlignedSample {
        let rotation = self.rotation_for(sample);
        let accel = rotation * sample.acceleration;
        let rate = rotation * sample.rotation_rate;

        AlignedSample {
            timestamp: sample.timestamp,
            lateral: accel.x,
            forward: accel.y,
            vertical: accel.z,
            pitch_rate: rate.x,
            roll_rate: rate.y,
            yaw_rate: rate.z,
        }
    }

    /// Rotate a sample and advance drift tracking
    pub fn process(&mut self, sample: &MotionSample) -> FrameUpdate {
        let aligned = self.transform(sample);
        let drift = if self.calibrated {
            self.track_drift(sample)
        } else {
            None
        };

        FrameUpdate {
            sample: aligned,
            drift,
        }
    }

    fn rotation_for(&self, sample: &MotionSample) -> UnitQuaternion<f64> {
        self.reference_inverse * sample.attitude
    }

    fn track_drift(&mut self, sample: &MotionSample) -> Option<CalibrationDrift> {
        let gravity = gravity_direction(&sample.gravity)?;
        let observed = self.rotation_for(sample) * gravity;

        let alpha = self.config.ema_alpha;
        let blended = self.gravity_ema * (1.0 - alpha) + observed * alpha;
        if blended.norm() > f64::EPSILON {
            self.gravity_ema = blended.normalize();
        }

        self.samples_seen += 1;
        if self.samples_seen % self.config.check_interval != 0 {
            return None;
        }

        let deviation = self.drift_angle_degrees();
        if deviation > self.config.drift_threshold_degrees {
            self.drifted_checks += 1;
        } else {
            self.drifted_checks = 0;
        }

        let cooled_down = self
            .last_recalibration
            .map_or(true, |at| self.samples_seen.saturating_sub(at) >= self.config.cooldown_samples);

        if self.drifted_checks >= self.config.sustained_checks && cooled_down {
            Some(self.recalibrate(sample.timestamp, deviation))
        } else {
            None
        }
    }

    fn recalibrate(&mut self, timestamp: Timestamp, deviation_degrees: f64) -> CalibrationDrift {
        let correction = match UnitQuaternion::rotation_between(&self.gravity_ema, &self.calibrated_down) {
            Some(rotation) => rotation,
            None => {
                // Antiparallel: no unique shortest rotation, any half turn works
                log_warn!("gravity flipped relative to calibration, using half-turn correction");
                UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI)
            }
        };

        self.reference_inverse = correction * self.reference_inverse;
        self.gravity_ema = self.calibrated_down;
        self.drifted_checks = 0;
        self.last_recalibration = Some(self.samples_seen);
        self.recalibration_count += 1;
        self.drift_detected = true;

        log_info!(
            "frame drift {:.1}° at t={}ms, recalibration #{}",
            deviation_degrees,
            timestamp,
            self.recalibration_count
        );

        CalibrationDrift {
            timestamp,
            deviation_degrees,
            recalibration_count: self.recalibration_count,
        }
    }
}

fn default_down() -> Vector3<f64> {
    Vector3::new(0.0, 0.0, -1.0)
}

fn gravity_direction(gravity: &Vector3<f64>) -> Option<Vector3<f64>> {
    let norm = gravity.norm();
    if norm.is_finite() && norm >= MIN_GRAVITY_NORM_G {
        Some(gravity / norm)
    } else {
        None
    }
}
