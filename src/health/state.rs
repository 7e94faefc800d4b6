//! Backend health state machine.
//!
//! # States
//! - Up: backend is eligible for selection
//! - Down: backend is skipped by every primary strategy
//!
//! # State Transitions
//! ```text
//! Down → Up:   consecutive successes reach `rise`
//! Up → Down:   consecutive failures reach `fall`
//! ```
//!
//! A contrary observation resets the opposite counter without flipping the
//! state. Counters saturate at their threshold. A fresh tracker starts Down.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Up,
    Down,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Up => f.write_str("up"),
            HealthState::Down => f.write_str("down"),
        }
    }
}

/// Consecutive-outcome counters with rise/fall hysteresis.
///
/// Fields are independent atomics; readers may see the flag and the counters
/// from slightly different instants.
#[derive(Debug)]
pub struct HealthTracker {
    up: AtomicBool,
    successes: AtomicU32,
    failures: AtomicU32,
    rise: u32,
    fall: u32,
}

impl HealthTracker {
    pub fn new(rise: u32, fall: u32) -> Self {
        Self {
            up: AtomicBool::new(false),
            successes: AtomicU32::new(0),
            failures: AtomicU32::new(0),
            rise: rise.max(1),
            fall: fall.max(1),
        }
    }

    pub fn is_up(&self) -> bool {
        self.up.load(Ordering::Relaxed)
    }

    pub fn state(&self) -> HealthState {
        if self.is_up() {
            HealthState::Up
        } else {
            HealthState::Down
        }
    }

    pub fn successes(&self) -> u32 {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Record a successful probe. Returns the new state if it flipped.
    pub fn record_success(&self) -> Option<HealthState> {
        self.failures.store(0, Ordering::Relaxed);
        let successes = bump(&self.successes, self.rise);
        if successes == self.rise && !self.up.swap(true, Ordering::Relaxed) {
            return Some(HealthState::Up);
        }
        None
    }

    /// Record a failed probe. Returns the new state if it flipped.
    pub fn record_failure(&self) -> Option<HealthState> {
        self.successes.store(0, Ordering::Relaxed);
        let failures = bump(&self.failures, self.fall);
        if failures == self.fall && self.up.swap(false, Ordering::Relaxed) {
            return Some(HealthState::Down);
        }
        None
    }

    #[cfg(test)]
    pub(crate) fn set_up(&self, up: bool) {
        self.up.store(up, Ordering::Relaxed);
    }
}

/// Increment `counter`, saturating at `cap`, and return the new value.
fn bump(counter: &AtomicU32, cap: u32) -> u32 {
    let prev = match counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
        Some(n.saturating_add(1).min(cap))
    }) {
        Ok(prev) | Err(prev) => prev,
    };
    prev.saturating_add(1).min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_down() {
        let t = HealthTracker::new(1, 1);
        assert_eq!(t.state(), HealthState::Down);
        assert_eq!(t.successes(), 0);
        assert_eq!(t.failures(), 0);
    }

    #[test]
    fn test_default_thresholds_flip_on_every_observation() {
        let t = HealthTracker::new(1, 1);
        assert_eq!(t.record_success(), Some(HealthState::Up));
        assert_eq!(t.record_failure(), Some(HealthState::Down));
        assert_eq!(t.record_success(), Some(HealthState::Up));
        assert_eq!(t.record_success(), None);
        assert!(t.is_up());
    }

    #[test]
    fn test_rise_and_fall_hysteresis() {
        let t = HealthTracker::new(3, 2);
        for _ in 0..3 {
            t.record_success();
        }
        assert!(t.is_up());

        assert_eq!(t.record_failure(), None);
        assert!(t.is_up());
        assert_eq!(t.failures(), 1);

        assert_eq!(t.record_failure(), Some(HealthState::Down));
        assert!(!t.is_up());

        // a single success resets failures but does not flip
        assert_eq!(t.record_success(), None);
        assert_eq!(t.failures(), 0);
        assert_eq!(t.successes(), 1);
        assert!(!t.is_up());

        assert_eq!(t.record_success(), None);
        assert_eq!(t.record_success(), Some(HealthState::Up));
    }

    #[test]
    fn test_three_failures_needed_when_fall_is_three() {
        let t = HealthTracker::new(3, 3);
        t.set_up(true);

        t.record_failure();
        t.record_failure();
        assert!(t.is_up());
        assert_eq!(t.record_failure(), Some(HealthState::Down));

        t.record_success();
        assert_eq!(t.failures(), 0);
        assert!(!t.is_up());
        t.record_success();
        assert!(!t.is_up());
        t.record_success();
        assert!(t.is_up());
    }

    #[test]
    fn test_counters_are_capped_and_exclusive() {
        let t = HealthTracker::new(2, 4);
        for _ in 0..10 {
            t.record_success();
        }
        assert_eq!(t.successes(), 2);
        assert_eq!(t.failures(), 0);

        for _ in 0..10 {
            t.record_failure();
        }
        assert_eq!(t.failures(), 4);
        assert_eq!(t.successes(), 0);
    }

    #[test]
    fn test_zero_thresholds_treated_as_one() {
        let t = HealthTracker::new(0, 0);
        assert_eq!(t.record_success(), Some(HealthState::Up));
        assert_eq!(t.record_failure(), Some(HealthState::Down));
    }
}
