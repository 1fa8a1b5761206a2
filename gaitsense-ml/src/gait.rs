//! Gait States and Their Adjacency
//!
//! The five locomotion states are ordered by speed. The order is also the
//! physical adjacency: an animal moves from walk to canter through trot, never
//! directly. The transition graph makes that explicit as a neighbor list per
//! state instead of relying on index arithmetic, so canter/gallop adjacency
//! can be reasoned about from one table.

use core::fmt;

use gaitsense_core::constants::gait::{
    CANTER_MIN_SPEED_MS, GALLOP_MIN_SPEED_MS, TROT_MIN_SPEED_MS, WALK_MIN_SPEED_MS,
};
use heapless::Vec as HVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of gait states
pub const GAIT_COUNT: usize = 5;

/// Locomotion state, ordered from slowest to fastest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Gait {
    #[default]
    Stationary,
    Walk,
    Trot,
    Canter,
    Gallop,
}

impl Gait {
    /// All states in adjacency order
    pub const ALL: [Gait; GAIT_COUNT] = [
        Gait::Stationary,
        Gait::Walk,
        Gait::Trot,
        Gait::Canter,
        Gait::Gallop,
    ];

    /// Position in [`Gait::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Gait::Stationary => "stationary",
            Gait::Walk => "walk",
            Gait::Trot => "trot",
            Gait::Canter => "canter",
            Gait::Gallop => "gallop",
        }
    }

    /// States reachable in one step besides staying put
    pub fn neighbors(self) -> HVec<Gait, 2> {
        let mut out = HVec::new();
        let i = self.index();
        // Capacity 2 always fits: at most one slower and one faster neighbor
        if let Some(slower) = i.checked_sub(1).and_then(Self::from_index) {
            let _ = out.push(slower);
        }
        if let Some(faster) = Self::from_index(i + 1) {
            let _ = out.push(faster);
        }
        out
    }

    pub fn is_adjacent(self, other: Gait) -> bool {
        self.index().abs_diff(other.index()) == 1
    }

    /// Expected ground speed range (m/s), lower bound inclusive
    pub fn speed_band(self) -> (f64, f64) {
        match self {
            Gait::Stationary => (f64::NEG_INFINITY, WALK_MIN_SPEED_MS),
            Gait::Walk => (WALK_MIN_SPEED_MS, TROT_MIN_SPEED_MS),
            Gait::Trot => (TROT_MIN_SPEED_MS, CANTER_MIN_SPEED_MS),
            Gait::Canter => (CANTER_MIN_SPEED_MS, GALLOP_MIN_SPEED_MS),
            Gait::Gallop => (GALLOP_MIN_SPEED_MS, f64::INFINITY),
        }
    }

    /// Speed-only classification; a speed on a boundary belongs to the faster gait
    pub fn from_speed(speed: f64) -> Gait {
        if speed >= GALLOP_MIN_SPEED_MS {
            Gait::Gallop
        } else if speed >= CANTER_MIN_SPEED_MS {
            Gait::Canter
        } else if speed >= TROT_MIN_SPEED_MS {
            Gait::Trot
        } else if speed >= WALK_MIN_SPEED_MS {
            Gait::Walk
        } else {
            Gait::Stationary
        }
    }
}

impl fmt::Display for Gait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Row-stochastic transition matrix restricted to adjacent states
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionMatrix {
    rows: [[f64; GAIT_COUNT]; GAIT_COUNT],
    self_transition: f64,
}

impl TransitionMatrix {
    /// Stay with `self_transition`, split the rest evenly across neighbors
    ///
    /// `self_transition` must already be validated to lie in (0, 1).
    pub fn new(self_transition: f64) -> Self {
        let mut rows = [[0.0; GAIT_COUNT]; GAIT_COUNT];

        for from in Gait::ALL {
            let neighbors = from.neighbors();
            rows[from.index()][from.index()] = self_transition;
            let share = (1.0 - self_transition) / neighbors.len() as f64;
            for to in neighbors.iter() {
                rows[from.index()][to.index()] = share;
            }
        }

        Self {
            rows,
            self_transition,
        }
    }

    pub fn self_transition(&self) -> f64 {
        self.self_transition
    }

    /// P(next = `to` | current = `from`)
    pub fn probability(&self, from: Gait, to: Gait) -> f64 {
        self.rows[from.index()][to.index()]
    }

    /// One-step prediction of a state distribution
    pub fn propagate(&self, prior: &[f64; GAIT_COUNT]) -> [f64; GAIT_COUNT] {
        let mut out = [0.0; GAIT_COUNT];
        for (from, &mass) in prior.iter().enumerate() {
            for (to, slot) in out.iter_mut().enumerate() {
                *slot += mass * self.rows[from][to];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_and_indices() {
        for (i, gait) in Gait::ALL.iter().enumerate() {
            assert_eq!(gait.index(), i);
            assert_eq!(Gait::from_index(i), Some(*gait));
        }
        assert!(Gait::Walk < Gait::Gallop);
        assert_eq!(Gait::from_index(5), None);
        assert_eq!(Gait::Canter.to_string(), "canter");
    }

    #[test]
    fn neighbors_are_adjacent_only() {
        assert_eq!(Gait::Stationary.neighbors().as_slice(), &[Gait::Walk]);
        assert_eq!(Gait::Trot.neighbors().as_slice(), &[Gait::Walk, Gait::Canter]);
        assert_eq!(Gait::Gallop.neighbors().as_slice(), &[Gait::Canter]);
        assert!(!Gait::Stationary.is_adjacent(Gait::Trot));
        assert!(Gait::Canter.is_adjacent(Gait::Gallop));
    }

    #[test]
    fn speed_bands_favor_faster_gait_on_boundary() {
        assert_eq!(Gait::from_speed(0.0), Gait::Stationary);
        assert_eq!(Gait::from_speed(0.49), Gait::Stationary);
        assert_eq!(Gait::from_speed(0.5), Gait::Walk);
        assert_eq!(Gait::from_speed(2.2), Gait::Trot);
        assert_eq!(Gait::from_speed(4.5), Gait::Canter);
        assert_eq!(Gait::from_speed(6.99), Gait::Canter);
        assert_eq!(Gait::from_speed(7.0), Gait::Gallop);

        for gait in Gait::ALL {
            let (lo, _) = gait.speed_band();
            if lo.is_finite() {
                assert_eq!(Gait::from_speed(lo), gait);
            }
        }
    }

    #[test]
    fn transition_rows_are_stochastic() {
        let matrix = TransitionMatrix::new(0.85);
        for from in Gait::ALL {
            let row: f64 = Gait::ALL.iter().map(|&to| matrix.probability(from, to)).sum();
            assert!((row - 1.0).abs() < 1e-12);
            assert_eq!(matrix.probability(from, from), 0.85);
        }
        assert_eq!(matrix.probability(Gait::Stationary, Gait::Trot), 0.0);
        assert_eq!(matrix.probability(Gait::Walk, Gait::Canter), 0.0);
        assert!((matrix.probability(Gait::Walk, Gait::Trot) - 0.075).abs() < 1e-12);
        assert!((matrix.probability(Gait::Stationary, Gait::Walk) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn propagation_keeps_mass() {
        let matrix = TransitionMatrix::new(0.9);
        let next = matrix.propagate(&[1.0, 0.0, 0.0, 0.0, 0.0]);
        assert!((next[0] - 0.9).abs() < 1e-12);
        assert!((next[1] - 0.1).abs() < 1e-12);
        assert_eq!(next[2], 0.0);
        assert!((next.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }
}
