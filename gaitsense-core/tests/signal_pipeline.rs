//! Integration tests for the signal core
//!
//! Runs synthetic gait signals through frame alignment, spectral analysis and
//! coherence the same way a live session does, and checks the features a
//! downstream classifier relies on.

mod common;

use core::f64::consts::FRAC_PI_2;

use gaitsense_core::{
    AlignedSample, AuxiliaryInputs, ChannelWindows, EulerAngles, FeatureExtractor, MotionSample,
    RotationFrameAligner, SpectralWindowAnalyzer,
};
use nalgebra::{UnitQuaternion, Vector3};

use common::generators::{noise, sine, GaitSignal};
use common::{assert_close, RATE_HZ};

fn align(samples: &[MotionSample]) -> Vec<AlignedSample> {
    let mut aligner = RotationFrameAligner::new();
    aligner.calibrate(&samples[0]);
    samples.iter().map(|s| aligner.process(s).sample).collect()
}

fn channels(aligned: &[AlignedSample]) -> [Vec<f64>; 4] {
    [
        aligned.iter().map(|s| s.lateral).collect(),
        aligned.iter().map(|s| s.forward).collect(),
        aligned.iter().map(|s| s.vertical).collect(),
        aligned.iter().map(|s| s.yaw_rate).collect(),
    ]
}

fn extract(signal: GaitSignal, seed: u64) -> gaitsense_core::WindowAnalysis {
    let mount = UnitQuaternion::from_euler_angles(0.3, -0.2, 1.1);
    let aligned = align(&signal.samples(0, 128, mount, seed));
    let [lateral, forward, vertical, yaw] = channels(&aligned);

    FeatureExtractor::default().extract(
        &ChannelWindows {
            lateral: &lateral,
            forward: &forward,
            vertical: &vertical,
            yaw: &yaw,
        },
        &AuxiliaryInputs::default(),
    )
}

#[test]
fn calibrated_mount_is_transparent() {
    let mount = UnitQuaternion::from_euler_angles(0.4, 0.1, -0.7);
    let samples = GaitSignal::walk().samples(0, 50, mount, 1);
    let aligned = align(&samples);

    for (raw, out) in samples.iter().zip(&aligned) {
        assert!((out.acceleration() - raw.acceleration).norm() < 1e-12);
        assert!((out.rotation_rate() - raw.rotation_rate).norm() < 1e-12);
    }
}

#[test]
fn rotation_after_calibration_is_applied() {
    let mut aligner = RotationFrameAligner::new();
    aligner.calibrate(&MotionSample::new(0, [0.0; 3], [0.0; 3]));

    let turned = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
    let sample = MotionSample::new(20, [1.0, 0.0, 0.5], [0.2, 0.0, 0.0]).with_attitude(turned);
    let out = aligner.transform(&sample);

    assert_close(out.lateral, 0.0, 1e-12);
    assert_close(out.forward, 1.0, 1e-12);
    assert_close(out.vertical, 0.5, 1e-12);
    assert_close(out.roll_rate, 0.2, 1e-12);
    assert_close(out.acceleration().norm(), sample.acceleration.norm(), 1e-12);
}

#[test]
fn reported_angles_align_like_a_quaternion() {
    let mut aligner = RotationFrameAligner::new();
    aligner.calibrate(&MotionSample::new(0, [0.0; 3], [0.0; 3]));

    let turned = MotionSample::new(20, [1.0, 0.0, 0.5], [0.2, 0.0, 0.0])
        .with_euler(EulerAngles::new(0.0, 0.0, FRAC_PI_2));
    let out = aligner.transform(&turned);

    assert_close(out.lateral, 0.0, 1e-12);
    assert_close(out.forward, 1.0, 1e-12);
    assert_close(out.vertical, 0.5, 1e-12);
    assert_close(out.roll_rate, 0.2, 1e-12);
}

#[test]
fn walk_window_features() {
    let analysis = extract(GaitSignal::walk(), 3);
    let f = analysis.features;

    assert_close(f.stride_frequency, 1.6, RATE_HZ / 128.0);
    assert!(f.h2_ratio > 0.2 && f.h2_ratio < 1.0, "h2 {}", f.h2_ratio);
    assert!(f.spectral_entropy < 0.6, "entropy {}", f.spectral_entropy);
    assert!(f.xy_coherence > 0.5, "xy {}", f.xy_coherence);
    assert!(f.normalized_vertical_rms > 0.15);
    assert!(f.yaw_rate_rms > 0.0);
    assert_close(analysis.bounce_frequency.unwrap(), f.stride_frequency, 1e-12);
}

#[test]
fn trot_strides_faster_than_walk() {
    let walk = extract(GaitSignal::walk(), 4).features;
    let trot = extract(GaitSignal::trot(), 4).features;

    assert_close(trot.stride_frequency, 2.6, RATE_HZ / 128.0);
    assert!(trot.stride_frequency > walk.stride_frequency);
    assert!(trot.normalized_vertical_rms > walk.normalized_vertical_rms);
}

#[test]
fn standing_window_is_broadband() {
    let standing = extract(GaitSignal::standing(), 5).features;
    let walk = extract(GaitSignal::walk(), 5).features;

    assert!(standing.spectral_entropy > 0.7, "entropy {}", standing.spectral_entropy);
    assert!(standing.spectral_entropy > walk.spectral_entropy);
    assert!(standing.normalized_vertical_rms < 0.02);
}

#[test]
fn overlapping_windows_follow_a_transition() {
    let mut signal = sine(1.6, 0.3, 256);
    signal.extend(sine(2.6, 0.3, 256));

    let mut analyzer = SpectralWindowAnalyzer::default();
    let results = analyzer.process_with_overlap(&signal, 0.5);

    assert_eq!(results.len(), 7);
    assert!(results[0].dominant_frequency < 2.0);
    assert!(results[6].dominant_frequency > 2.3);
}

#[test]
fn noisy_channels_do_not_break_coherence() {
    let lateral = noise(0.5, 128, 8);
    let forward = noise(0.5, 128, 9);
    let vertical = sine(2.0, 0.3, 128);
    let yaw = vec![0.0; 128];

    let analysis = FeatureExtractor::default().extract(
        &ChannelWindows {
            lateral: &lateral,
            forward: &forward,
            vertical: &vertical,
            yaw: &yaw,
        },
        &AuxiliaryInputs::default(),
    );

    let f = analysis.features;
    assert!((0.0..=1.0).contains(&f.xy_coherence));
    assert_eq!(f.z_yaw_coherence, 0.0);
    assert_eq!(f.yaw_rate_rms, 0.0);
}
