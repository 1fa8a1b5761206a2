//! Common utilities for gait inference integration tests
//!
//! - Canonical per-gait feature vectors
//! - Synthetic motion streams with seeded noise
//! - A recording change handler

#![allow(dead_code)]

pub mod generators;
pub mod scenarios;

use std::sync::{Arc, Mutex};

use gaitsense_ml::{Gait, GaitAnalyzer, GaitChange, SubjectProfile};

/// Changes seen by a handler, shared with the test body
#[derive(Clone, Default)]
pub struct ChangeLog(Arc<Mutex<Vec<GaitChange>>>);

impl ChangeLog {
    /// Install a recording handler on `analyzer`
    pub fn attach(analyzer: &mut GaitAnalyzer) -> Self {
        let log = Self::default();
        let sink = log.clone();
        analyzer.set_change_handler(move |change| sink.0.lock().unwrap().push(*change));
        log
    }

    pub fn changes(&self) -> Vec<GaitChange> {
        self.0.lock().unwrap().clone()
    }

    pub fn pairs(&self) -> Vec<(Gait, Gait)> {
        self.changes().iter().map(|c| (c.previous, c.current)).collect()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// A started analyzer with a recording handler
pub fn analyzing(profile: &SubjectProfile) -> (GaitAnalyzer, ChangeLog) {
    let mut analyzer = GaitAnalyzer::new();
    let log = ChangeLog::attach(&mut analyzer);
    analyzer.start_analyzing(profile);
    (analyzer, log)
}
