//! End-to-end tests from raw samples to reported gait

mod common;

use gaitsense_core::LocationSample;
use gaitsense_ml::{ChangeSource, Gait, GaitAnalyzer, SubjectProfile};

use common::analyzing;
use common::generators::{location_stream, motion_stream};

#[test]
fn walking_stream_is_detected_from_sensors() {
    let (mut analyzer, log) = analyzing(&SubjectProfile::default());

    analyzer.process_location(&LocationSample::new(0, 1.4, 8.0, 0.0));
    for sample in motion_stream(1.6, 0.25, 0.18, 500, 11) {
        analyzer.process_motion(&sample);
    }

    assert_eq!(analyzer.current_gait(), Gait::Walk);
    let changes = log.changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].source, ChangeSource::Spectral);
    assert!(changes[0].timestamp > 0);

    assert!((analyzer.stride_frequency() - 1.6).abs() < 0.2);
    assert!((analyzer.detected_bounce_frequency() - 1.6).abs() < 0.2);
    let amplitude = analyzer.bounce_amplitude();
    assert!((0.15..0.3).contains(&amplitude), "amplitude {amplitude}");

    let features = analyzer.last_features().unwrap();
    assert_eq!(features.gps_speed, 1.4);
    assert!(features.h2_ratio > 0.1);
}

#[test]
fn speed_fallback_runs_without_motion() {
    let (mut analyzer, log) = analyzing(&SubjectProfile::default());

    for fix in location_stream(3.2, 5.0, 5) {
        analyzer.process_location(&fix);
    }

    assert_eq!(log.pairs(), vec![(Gait::Stationary, Gait::Trot)]);
    assert_eq!(log.changes()[0].source, ChangeSource::SpeedFallback);
    assert_eq!(analyzer.model().current_state(), Gait::Trot);
    assert!((analyzer.total_distance() - 16.0).abs() < 1e-9);
}

#[test]
fn motion_windows_take_over_from_speed() {
    let (mut analyzer, log) = analyzing(&SubjectProfile::default());
    let fixes = location_stream(1.4, 8.0, 4);
    let motion = motion_stream(1.6, 0.25, 0.18, 350, 12);

    // Once windows flow, every fix follows at least one analysis
    let (warmup, rest) = motion.split_at(150);
    for sample in warmup {
        analyzer.process_motion(sample);
    }
    for (chunk, fix) in rest.chunks(50).zip(&fixes) {
        for sample in chunk {
            analyzer.process_motion(sample);
        }
        analyzer.process_location(fix);
    }

    assert!(log.len() <= 1);
    assert!(log
        .changes()
        .iter()
        .all(|c| c.source == ChangeSource::Spectral));
}

#[test]
fn idle_analyzer_ignores_samples() {
    let mut analyzer = GaitAnalyzer::new();
    let log = common::ChangeLog::attach(&mut analyzer);

    for sample in motion_stream(1.6, 0.25, 0.18, 300, 13) {
        assert!(analyzer.process_motion(&sample).is_none());
    }
    for fix in location_stream(3.2, 5.0, 5) {
        assert!(analyzer.process_location(&fix).is_none());
    }

    assert_eq!(log.len(), 0);
    assert_eq!(analyzer.bounce_amplitude(), 0.0);
    assert_eq!(analyzer.current_gait(), Gait::Stationary);
}

#[test]
fn stop_keeps_the_last_gait_until_reset() {
    let (mut analyzer, _) = analyzing(&SubjectProfile::default());
    for fix in location_stream(1.5, 5.0, 3) {
        analyzer.process_location(&fix);
    }
    assert_eq!(analyzer.current_gait(), Gait::Walk);

    analyzer.stop_analyzing();
    assert!(!analyzer.is_analyzing());
    assert_eq!(analyzer.current_gait(), Gait::Walk);

    analyzer.reset();
    assert_eq!(analyzer.current_gait(), Gait::Stationary);
    assert_eq!(analyzer.total_distance(), 0.0);
}
