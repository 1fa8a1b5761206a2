//! Sample Types Delivered by the Sensor and Location Collaborators
//!
//! Motion samples arrive at ~50 Hz in the device (body) frame. Location
//! samples arrive at ≥1 Hz. Both are plain `Copy` values; the pipeline never
//! holds references into caller memory.
//!
//! ## Units
//!
//! | Field            | Unit                         |
//! |------------------|------------------------------|
//! | acceleration     | g, gravity removed           |
//! | gravity          | g, body-frame unit direction |
//! | rotation_rate    | rad/s                        |
//! | speed            | m/s                          |
//! | accuracy         | m (smaller = better)         |
//! | timestamp        | ms                           |

use nalgebra::{UnitQuaternion, Vector3};

/// Timestamp in milliseconds (monotonic session clock)
pub type Timestamp = u64;

/// Attitude reported as angles instead of a quaternion (radians)
///
/// Pitch turns about the lateral (x) axis, roll about the forward (y) axis
/// and yaw about the vertical (z) axis, applied in that order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
}

impl EulerAngles {
    pub fn new(pitch: f64, roll: f64, yaw: f64) -> Self {
        Self { pitch, roll, yaw }
    }

    /// Equivalent attitude quaternion; non-finite angles count as zero
    pub fn to_attitude(&self) -> UnitQuaternion<f64> {
        let finite = |x: f64| if x.is_finite() { x } else { 0.0 };
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), finite(self.yaw))
            * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), finite(self.roll))
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), finite(self.pitch))
    }
}

/// Raw body-frame motion sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub timestamp: Timestamp,
    /// User acceleration with gravity removed
    pub acceleration: Vector3<f64>,
    pub rotation_rate: Vector3<f64>,
    /// Device attitude relative to the motion manager's reference frame
    pub attitude: UnitQuaternion<f64>,
    /// Gravity direction in the body frame; zero when not reported
    pub gravity: Vector3<f64>,
}

impl MotionSample {
    /// Sample with identity attitude and no gravity reference
    pub fn new(timestamp: Timestamp, acceleration: [f64; 3], rotation_rate: [f64; 3]) -> Self {
        Self {
            timestamp,
            acceleration: Vector3::from(acceleration),
            rotation_rate: Vector3::from(rotation_rate),
            attitude: UnitQuaternion::identity(),
            gravity: Vector3::zeros(),
        }
    }

    /// Set the device attitude
    pub fn with_attitude(mut self, attitude: UnitQuaternion<f64>) -> Self {
        self.attitude = attitude;
        self
    }

    /// Set the body-frame gravity direction
    pub fn with_gravity(mut self, gravity: [f64; 3]) -> Self {
        self.gravity = Vector3::from(gravity);
        self
    }

    /// Set the device attitude from reported pitch/roll/yaw
    ///
    /// For sources that deliver angles but no quaternion.
    pub fn with_euler(mut self, euler: EulerAngles) -> Self {
        self.attitude = euler.to_attitude();
        self
    }
}

/// Motion sample rotated into the calibrated lateral/forward/vertical frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AlignedSample {
    pub timestamp: Timestamp,
    pub lateral: f64,
    pub forward: f64,
    pub vertical: f64,
    pub pitch_rate: f64,
    pub roll_rate: f64,
    pub yaw_rate: f64,
}

impl AlignedSample {
    /// Aligned acceleration as a vector (lateral, forward, vertical)
    pub fn acceleration(&self) -> Vector3<f64> {
        Vector3::new(self.lateral, self.forward, self.vertical)
    }

    /// Aligned rotation rate as a vector (pitch, roll, yaw)
    pub fn rotation_rate(&self) -> Vector3<f64> {
        Vector3::new(self.pitch_rate, self.roll_rate, self.yaw_rate)
    }
}

/// Location fix from the positioning collaborator
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocationSample {
    pub timestamp: Timestamp,
    /// Ground speed; negative when the receiver has no valid speed
    pub speed: f64,
    /// Horizontal accuracy radius; non-positive when unknown
    pub horizontal_accuracy: f64,
    /// Distance travelled since the previous fix (m)
    pub distance: f64,
}

impl LocationSample {
    pub fn new(timestamp: Timestamp, speed: f64, horizontal_accuracy: f64, distance: f64) -> Self {
        Self {
            timestamp,
            speed,
            horizontal_accuracy,
            distance,
        }
    }

    /// A fix whose speed can be used at all
    pub fn has_valid_speed(&self) -> bool {
        self.speed.is_finite() && self.speed >= 0.0
    }

    /// A fix whose accuracy radius is known
    pub fn has_valid_accuracy(&self) -> bool {
        self.horizontal_accuracy.is_finite() && self.horizontal_accuracy > 0.0
    }
}
