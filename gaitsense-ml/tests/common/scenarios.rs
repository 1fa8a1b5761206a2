//! Canonical feature vectors, one per gait
//!
//! Each vector sits on the center of its gait's generic-breed emission and
//! carries a 10 m GPS fix at a speed typical of that gait.

use gaitsense_core::GaitFeatureVector;
use gaitsense_ml::Gait;

fn vector(stride: f64, h2: f64, xy: f64, speed: f64) -> GaitFeatureVector {
    GaitFeatureVector {
        stride_frequency: stride,
        h2_ratio: h2,
        xy_coherence: xy,
        gps_speed: speed,
        gps_accuracy: 10.0,
        ..GaitFeatureVector::ZERO
    }
}

pub fn stationary() -> GaitFeatureVector {
    GaitFeatureVector {
        normalized_vertical_rms: 0.025,
        ..vector(0.25, 0.2, 0.1, 0.0)
    }
}

pub fn walk() -> GaitFeatureVector {
    vector(1.6, 0.5, 0.35, 1.5)
}

pub fn trot() -> GaitFeatureVector {
    vector(2.6, 0.7, 0.6, 3.2)
}

pub fn canter() -> GaitFeatureVector {
    vector(2.0, 0.4, 0.5, 5.5)
}

pub fn gallop() -> GaitFeatureVector {
    vector(2.4, 0.3, 0.45, 9.0)
}

pub fn canonical(gait: Gait) -> GaitFeatureVector {
    match gait {
        Gait::Stationary => stationary(),
        Gait::Walk => walk(),
        Gait::Trot => trot(),
        Gait::Canter => canter(),
        Gait::Gallop => gallop(),
    }
}

/// Same spectra with the GPS fix removed
pub fn without_gps(features: GaitFeatureVector) -> GaitFeatureVector {
    GaitFeatureVector {
        gps_speed: 0.0,
        gps_accuracy: 0.0,
        ..features
    }
}
