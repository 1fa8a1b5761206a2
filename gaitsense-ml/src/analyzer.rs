//! Session-Level Gait Analyzer
//!
//! ## Overview
//!
//! `GaitAnalyzer` owns one tracking session. It aligns motion samples,
//! slices them into overlapping windows, turns each window into a
//! [`GaitFeatureVector`], runs the hidden Markov model, and decides when the
//! reported gait actually changes.
//!
//! ```text
//! MotionSample ─→ aligner ─→ window ring ──(every hop)──→ features ─┐
//!                     │                                             ├─→ HMM ─→ confirm ─→ GaitChange
//!                     └─→ bounce ring ─→ amplitude                  │
//! LocationSample ─→ GPS snapshot ───────────────────────────────────┘
//!            └────→ speed average ─→ speed-only candidate (no spectra)
//! ```
//!
//! ## Confirmation Rules
//!
//! | Source          | Changes `current_gait` when                               |
//! |-----------------|-----------------------------------------------------------|
//! | Spectral (HMM)  | arg-max differs and its posterior exceeds the threshold   |
//! | Speed fallback  | same speed band seen N consecutive fixes, no spectra since |
//!
//! Spectral evidence always wins: a location fix that arrives after any
//! window update only feeds GPS evidence into the next window.
//!
//! ## Lifecycle
//!
//! ```text
//!        start_analyzing            stop_analyzing / reset
//!  idle ─────────────────→ analyzing ──────────────────────→ idle
//! ```
//!
//! Every streaming entry point is a silent no-op while idle.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use gaitsense_core::constants::gait::{
    CONFIDENCE_THRESHOLD, CONFIRMATION_COUNT, MAX_SPEED_AVERAGE_LEN, SPEED_AVERAGE_LEN,
    SPEED_FALLBACK_CONFIDENCE,
};
use gaitsense_core::constants::motion::{BOUNCE_BUFFER_CAPACITY, MIN_BOUNCE_SAMPLES};
use gaitsense_core::constants::signal::{
    DEFAULT_COHERENCE_OVERLAP, DEFAULT_COHERENCE_SEGMENT, DEFAULT_HOP_SIZE,
    DEFAULT_SAMPLE_RATE_HZ, DEFAULT_WINDOW_SIZE, MAX_WINDOW_CAPACITY,
};
use gaitsense_core::{
    AlignedSample, AlignerConfig, AuxiliaryInputs, CalibrationDrift, ChannelWindows,
    CircularBuffer, CrossChannelCoherenceEstimator, FeatureExtractor, GaitError, GaitFeatureVector, GaitResult,
    LocationSample, MotionSample, RotationFrameAligner, SpectralWindowAnalyzer, Timestamp,
};

use crate::gait::{Gait, GAIT_COUNT};
use crate::hmm::GaitHiddenMarkovModel;
use crate::profile::SubjectProfile;

/// Analyzer tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerConfig {
    pub sample_rate: f64,
    /// Samples per spectral window (power of two)
    pub window_size: usize,
    /// Samples between successive windows
    pub hop_size: usize,
    pub coherence_segment: usize,
    pub coherence_overlap: usize,
    /// Posterior required before a spectral gait change is reported
    pub confidence_threshold: f64,
    /// Consecutive agreeing fixes before a speed-only change
    pub confirmation_count: u32,
    /// Fixes in the rolling speed average
    pub speed_average_len: usize,
    /// Vertical samples needed before bounce amplitude is reported
    pub min_bounce_samples: usize,
    pub aligner: AlignerConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE_HZ,
            window_size: DEFAULT_WINDOW_SIZE,
            hop_size: DEFAULT_HOP_SIZE,
            coherence_segment: DEFAULT_COHERENCE_SEGMENT,
            coherence_overlap: DEFAULT_COHERENCE_OVERLAP,
            confidence_threshold: CONFIDENCE_THRESHOLD,
            confirmation_count: CONFIRMATION_COUNT,
            speed_average_len: SPEED_AVERAGE_LEN,
            min_bounce_samples: MIN_BOUNCE_SAMPLES,
            aligner: AlignerConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    pub fn with_window(mut self, window_size: usize, hop_size: usize) -> Self {
        self.window_size = window_size;
        self.hop_size = hop_size;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_confirmation_count(mut self, count: u32) -> Self {
        self.confirmation_count = count;
        self
    }

    pub fn with_speed_average_len(mut self, len: usize) -> Self {
        self.speed_average_len = len;
        self
    }

    pub fn with_aligner(mut self, aligner: AlignerConfig) -> Self {
        self.aligner = aligner;
        self
    }

    /// Reject values the analyzer cannot run with
    pub fn validate(&self) -> GaitResult<()> {
        if self.window_size > MAX_WINDOW_CAPACITY {
            return Err(GaitError::CapacityExceeded {
                requested: self.window_size,
                capacity: MAX_WINDOW_CAPACITY,
            });
        }
        if self.hop_size == 0 || self.hop_size > self.window_size {
            return Err(GaitError::parameter("hop_size", "must be in 1..=window_size"));
        }
        if !(self.confidence_threshold > 0.0 && self.confidence_threshold < 1.0) {
            return Err(GaitError::parameter("confidence_threshold", "must be in (0, 1)"));
        }
        if self.confirmation_count == 0 {
            return Err(GaitError::parameter("confirmation_count", "must be non-zero"));
        }
        if self.speed_average_len == 0 || self.speed_average_len > MAX_SPEED_AVERAGE_LEN {
            return Err(GaitError::CapacityExceeded {
                requested: self.speed_average_len,
                capacity: MAX_SPEED_AVERAGE_LEN,
            });
        }
        if self.min_bounce_samples == 0 || self.min_bounce_samples > BOUNCE_BUFFER_CAPACITY {
            return Err(GaitError::CapacityExceeded {
                requested: self.min_bounce_samples,
                capacity: BOUNCE_BUFFER_CAPACITY,
            });
        }
        self.aligner.validate()
    }
}

/// What triggered a gait change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChangeSource {
    /// The hidden Markov model crossed the confidence threshold
    Spectral,
    /// Consecutive GPS fixes agreed while no spectral evidence arrived
    SpeedFallback,
}

/// A confirmed change of the reported gait
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaitChange {
    pub previous: Gait,
    pub current: Gait,
    pub confidence: f64,
    pub source: ChangeSource,
    pub timestamp: Timestamp,
}

/// Canter lead leg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LeadDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadReading {
    pub direction: LeadDirection,
    pub confidence: f64,
}

/// Change notification hook
pub type GaitChangeHandler = Box<dyn FnMut(&GaitChange) + Send>;

/// Callback for automatic frame recalibrations
pub type CalibrationDriftHandler = Box<dyn FnMut(&CalibrationDrift) + Send>;

/// Contiguous copies of the newest window, reused between analyses
#[derive(Debug, Default)]
struct ChannelScratch {
    lateral: Vec<f64>,
    forward: Vec<f64>,
    vertical: Vec<f64>,
    yaw: Vec<f64>,
}

impl ChannelScratch {
    fn with_capacity(n: usize) -> Self {
        Self {
            lateral: Vec::with_capacity(n),
            forward: Vec::with_capacity(n),
            vertical: Vec::with_capacity(n),
            yaw: Vec::with_capacity(n),
        }
    }

    fn fill<'a>(&mut self, samples: impl Iterator<Item = &'a AlignedSample>) {
        self.lateral.clear();
        self.forward.clear();
        self.vertical.clear();
        self.yaw.clear();
        for s in samples {
            self.lateral.push(s.lateral);
            self.forward.push(s.forward);
            self.vertical.push(s.vertical);
            self.yaw.push(s.yaw_rate);
        }
    }

    fn windows(&self) -> ChannelWindows<'_> {
        ChannelWindows {
            lateral: &self.lateral,
            forward: &self.forward,
            vertical: &self.vertical,
            yaw: &self.yaw,
        }
    }
}

/// Streams motion and location samples into confirmed gait changes
pub struct GaitAnalyzer {
    config: AnalyzerConfig,
    aligner: RotationFrameAligner,
    extractor: FeatureExtractor,
    hmm: GaitHiddenMarkovModel,
    analyzing: bool,

    current_gait: Gait,
    gait_confidence: f64,

    window: CircularBuffer<AlignedSample, MAX_WINDOW_CAPACITY>,
    scratch: ChannelScratch,
    samples_since_analysis: usize,

    bounce: CircularBuffer<f64, BOUNCE_BUFFER_CAPACITY>,
    bounce_amplitude: f64,
    detected_bounce_frequency: f64,
    stride_frequency: f64,

    speeds: CircularBuffer<f64, MAX_SPEED_AVERAGE_LEN>,
    /// Latest GPS fix and watch summary folded into each window
    aux: AuxiliaryInputs,
    total_distance: f64,
    pending: Option<Gait>,
    pending_count: u32,
    /// Window updates since the last location fix
    features_since_location: u32,

    lead: Option<LeadReading>,
    rhythm_score: f64,
    last_features: Option<GaitFeatureVector>,
    last_timestamp: Timestamp,
    on_change: Option<GaitChangeHandler>,
    on_drift: Option<CalibrationDriftHandler>,
}

impl fmt::Debug for GaitAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GaitAnalyzer")
            .field("analyzing", &self.analyzing)
            .field("current_gait", &self.current_gait)
            .field("gait_confidence", &self.gait_confidence)
            .field("stride_frequency", &self.stride_frequency)
            .field("has_handler", &self.on_change.is_some())
            .field("has_drift_handler", &self.on_drift.is_some())
            .finish()
    }
}

impl Default for GaitAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl GaitAnalyzer {
    /// Idle analyzer with default tuning
    pub fn new() -> Self {
        let config = AnalyzerConfig::default();
        let extractor = FeatureExtractor::default();
        Self::build(config, RotationFrameAligner::new(), extractor)
    }

    /// Idle analyzer with custom tuning
    pub fn with_config(config: AnalyzerConfig) -> GaitResult<Self> {
        config.validate()?;
        let spectral = SpectralWindowAnalyzer::new(config.window_size, config.sample_rate)?;
        let coherence = CrossChannelCoherenceEstimator::new(
            config.coherence_segment,
            config.coherence_overlap,
            config.sample_rate,
        )?;
        let extractor = FeatureExtractor::new(spectral, coherence)?;
        let aligner = RotationFrameAligner::with_config(config.aligner)?;
        Ok(Self::build(config, aligner, extractor))
    }

    fn build(config: AnalyzerConfig, aligner: RotationFrameAligner, extractor: FeatureExtractor) -> Self {
        Self {
            scratch: ChannelScratch::with_capacity(config.window_size),
            config,
            aligner,
            extractor,
            hmm: GaitHiddenMarkovModel::new(),
            analyzing: false,
            current_gait: Gait::Stationary,
            gait_confidence: 0.0,
            window: CircularBuffer::new(),
            samples_since_analysis: 0,
            bounce: CircularBuffer::new(),
            bounce_amplitude: 0.0,
            detected_bounce_frequency: 0.0,
            stride_frequency: 0.0,
            speeds: CircularBuffer::new(),
            aux: AuxiliaryInputs::default(),
            total_distance: 0.0,
            pending: None,
            pending_count: 0,
            features_since_location: 0,
            lead: None,
            rhythm_score: 0.0,
            last_features: None,
            last_timestamp: 0,
            on_change: None,
            on_drift: None,
        }
    }

    /// Register the gait change callback, replacing any previous one
    pub fn set_change_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&GaitChange) + Send + 'static,
    {
        self.on_change = Some(Box::new(handler));
    }

    pub fn clear_change_handler(&mut self) {
        self.on_change = None;
    }

    /// Register a callback for frame recalibrations, replacing any previous one
    ///
    /// Fires from `process_motion` whenever the aligner corrects for drift.
    /// The same event is also readable through `recalibration_count` and
    /// `calibration_drift_detected`.
    pub fn set_drift_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&CalibrationDrift) + Send + 'static,
    {
        self.on_drift = Some(Box::new(handler));
    }

    pub fn clear_drift_handler(&mut self) {
        self.on_drift = None;
    }

    /// Begin a session for the given subject
    ///
    /// No-op when already analyzing. Otherwise clears all session state and
    /// configures the model from `profile`; an invalid profile falls back to
    /// the generic model.
    pub fn start_analyzing(&mut self, profile: &SubjectProfile) {
        if self.analyzing {
            log_debug!("start_analyzing ignored, session already running");
            return;
        }

        self.clear_session();
        self.hmm = GaitHiddenMarkovModel::new();
        if let Err(err) =
            self.hmm
                .configure(profile.breed, profile.age_adjustment(), profile.self_transition)
        {
            log_warn!("subject profile rejected ({}), using generic model", err);
            self.hmm = GaitHiddenMarkovModel::new();
        }
        if let Some(learned) = &profile.learned {
            if !self.hmm.apply_learned_parameters(learned) {
                log_debug!("learned parameters skipped, only {} rides", learned.ride_count);
            }
        }

        self.analyzing = true;
        log_debug!("gait analysis started for {:?}", profile.breed);
    }

    /// End the session; the last reported gait stays readable
    pub fn stop_analyzing(&mut self) {
        if self.analyzing {
            log_debug!("gait analysis stopped in {}", self.current_gait);
        }
        self.analyzing = false;
        self.clear_buffers();
    }

    /// Stop and forget everything, including the reported gait
    pub fn reset(&mut self) {
        self.analyzing = false;
        self.clear_session();
        self.hmm.reset();
    }

    fn clear_buffers(&mut self) {
        self.window.clear();
        self.samples_since_analysis = 0;
        self.bounce.clear();
        self.speeds.clear();
        self.pending = None;
        self.pending_count = 0;
        self.features_since_location = 0;
    }

    fn clear_session(&mut self) {
        self.clear_buffers();
        self.aligner.reset_calibration();
        self.current_gait = Gait::Stationary;
        self.gait_confidence = 0.0;
        self.bounce_amplitude = 0.0;
        self.detected_bounce_frequency = 0.0;
        self.stride_frequency = 0.0;
        self.aux = AuxiliaryInputs::default();
        self.total_distance = 0.0;
        self.lead = None;
        self.rhythm_score = 0.0;
        self.last_features = None;
        self.last_timestamp = 0;
    }

    /// Fold in one location fix
    ///
    /// Updates the GPS evidence for the next window. While no window update
    /// has happened since the previous fix, also runs the speed-only
    /// confirmation path.
    pub fn process_location(&mut self, fix: &LocationSample) -> Option<GaitChange> {
        if !self.analyzing {
            return None;
        }
        if !fix.has_valid_speed() {
            log_debug!("ignoring location fix without valid speed at t={}ms", fix.timestamp);
            return None;
        }

        self.last_timestamp = fix.timestamp;
        if fix.distance.is_finite() && fix.distance > 0.0 {
            self.total_distance += fix.distance;
        }
        self.speeds.push(fix.speed);
        self.aux.gps_speed = fix.speed;
        self.aux.gps_accuracy = if fix.has_valid_accuracy() {
            fix.horizontal_accuracy
        } else {
            0.0
        };

        let spectral_active = self.features_since_location > 0;
        self.features_since_location = 0;
        if spectral_active {
            self.pending = None;
            self.pending_count = 0;
            return None;
        }

        let candidate = Gait::from_speed(self.average_speed());
        self.confirm_speed_candidate(candidate, fix.timestamp)
    }

    fn confirm_speed_candidate(&mut self, candidate: Gait, timestamp: Timestamp) -> Option<GaitChange> {
        if candidate == self.current_gait {
            self.pending = None;
            self.pending_count = 0;
            return None;
        }

        if self.pending == Some(candidate) {
            self.pending_count += 1;
        } else {
            self.pending = Some(candidate);
            self.pending_count = 1;
        }

        if self.pending_count < self.config.confirmation_count {
            return None;
        }

        self.pending = None;
        self.pending_count = 0;
        self.hmm.reset_to(candidate);
        Some(self.change_to(
            candidate,
            SPEED_FALLBACK_CONFIDENCE,
            ChangeSource::SpeedFallback,
            timestamp,
        ))
    }

    /// Fold in one motion sample
    ///
    /// The first sample of a session calibrates the frame. Every `hop_size`
    /// samples, once a full window is buffered, a feature vector is
    /// extracted and run through the model.
    pub fn process_motion(&mut self, sample: &MotionSample) -> Option<GaitChange> {
        if !self.analyzing {
            return None;
        }
        if !self.aligner.is_calibrated() {
            self.aligner.calibrate(sample);
        }

        let update = self.aligner.process(sample);
        let aligned = update.sample;
        self.last_timestamp = sample.timestamp;

        if let Some(drift) = update.drift {
            log_debug!("forwarding recalibration #{}", drift.recalibration_count);
            if let Some(handler) = self.on_drift.as_mut() {
                handler(&drift);
            }
        }

        // Non-finite readings are dropouts for the bounce diagnostic
        if aligned.vertical.is_finite() {
            self.bounce.push(aligned.vertical);
        }
        if self.bounce.len() >= self.config.min_bounce_samples {
            let sum_sq: f64 = self.bounce.iter().map(|v| v * v).sum();
            let amplitude = (sum_sq / self.bounce.len() as f64).sqrt();
            if amplitude.is_finite() {
                self.bounce_amplitude = amplitude;
            }
        }

        self.window.push(aligned);
        self.samples_since_analysis += 1;
        if self.window.len() < self.config.window_size
            || self.samples_since_analysis < self.config.hop_size
        {
            return None;
        }
        self.samples_since_analysis = 0;

        self.scratch.fill(self.window.recent(self.config.window_size));
        let analysis = self.extractor.extract(&self.scratch.windows(), &self.aux);
        self.detected_bounce_frequency = analysis.bounce_frequency.unwrap_or(0.0);

        self.apply_features(&analysis.features, sample.timestamp)
    }

    /// Run a complete feature vector through the model
    pub fn inject_synthetic_features(&mut self, features: &GaitFeatureVector) -> Option<GaitChange> {
        if !self.analyzing {
            return None;
        }
        let timestamp = self.last_timestamp;
        self.apply_features(features, timestamp)
    }

    fn apply_features(&mut self, features: &GaitFeatureVector, timestamp: Timestamp) -> Option<GaitChange> {
        let features = features.sanitized();
        self.hmm.update(&features);
        self.features_since_location = self.features_since_location.saturating_add(1);
        self.stride_frequency = features.stride_frequency;
        self.last_features = Some(features);
        self.pending = None;
        self.pending_count = 0;

        let state = self.hmm.current_state();
        let probability = self.hmm.probability(state);

        if state != self.current_gait && probability > self.config.confidence_threshold {
            Some(self.change_to(state, probability, ChangeSource::Spectral, timestamp))
        } else {
            self.gait_confidence = self.hmm.probability(self.current_gait);
            None
        }
    }

    fn change_to(
        &mut self,
        gait: Gait,
        confidence: f64,
        source: ChangeSource,
        timestamp: Timestamp,
    ) -> GaitChange {
        let change = GaitChange {
            previous: self.current_gait,
            current: gait,
            confidence,
            source,
            timestamp,
        };
        self.current_gait = gait;
        self.gait_confidence = confidence;

        log_info!(
            "gait {} -> {} ({:.2}, {:?}) at t={}ms",
            change.previous,
            change.current,
            confidence,
            source,
            timestamp
        );

        if let Some(handler) = self.on_change.as_mut() {
            handler(&change);
        }
        change
    }

    /// Record the detected canter lead; no effect on gait state
    pub fn update_lead(&mut self, direction: LeadDirection, confidence: f64) {
        if self.analyzing && confidence.is_finite() {
            self.lead = Some(LeadReading {
                direction,
                confidence: confidence.clamp(0.0, 1.0),
            });
        }
    }

    /// Record the rhythm regularity score; no effect on gait state
    pub fn update_rhythm(&mut self, score: f64) {
        if self.analyzing && score.is_finite() {
            self.rhythm_score = score;
        }
    }

    /// Store wrist-sensor summaries for subsequent windows
    pub fn update_watch_summary(&mut self, arm_symmetry: f64, yaw_energy: f64) {
        if !self.analyzing {
            return;
        }
        if arm_symmetry.is_finite() {
            self.aux.watch_arm_symmetry = arm_symmetry;
        }
        if yaw_energy.is_finite() {
            self.aux.watch_yaw_energy = yaw_energy;
        }
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn current_gait(&self) -> Gait {
        self.current_gait
    }

    pub fn gait_confidence(&self) -> f64 {
        self.gait_confidence
    }

    /// Dominant vertical frequency in the bounce band of the latest window
    pub fn detected_bounce_frequency(&self) -> f64 {
        self.detected_bounce_frequency
    }

    /// RMS of recent vertical acceleration (g)
    pub fn bounce_amplitude(&self) -> f64 {
        self.bounce_amplitude
    }

    pub fn stride_frequency(&self) -> f64 {
        self.stride_frequency
    }

    /// Mean of the most recent valid speeds; 0.0 before the first fix
    pub fn average_speed(&self) -> f64 {
        let recent = self.speeds.recent(self.config.speed_average_len);
        let n = recent.len();
        if n == 0 {
            return 0.0;
        }
        recent.sum::<f64>() / n as f64
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn lead(&self) -> Option<LeadReading> {
        self.lead
    }

    pub fn rhythm_score(&self) -> f64 {
        self.rhythm_score
    }

    pub fn recalibration_count(&self) -> u32 {
        self.aligner.recalibration_count()
    }

    pub fn calibration_drift_detected(&self) -> bool {
        self.aligner.calibration_drift_detected()
    }

    pub fn last_features(&self) -> Option<&GaitFeatureVector> {
        self.last_features.as_ref()
    }

    pub fn posterior(&self) -> [f64; GAIT_COUNT] {
        self.hmm.posterior()
    }

    pub fn model(&self) -> &GaitHiddenMarkovModel {
        &self.hmm
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }
}
