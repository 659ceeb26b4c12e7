//! Load-derived health classification.
//!
//! Health is a pure function of a node's current request count and its
//! capability ceiling, re-derived on every request-count write. Repeated
//! classification with the same inputs yields the same state, and any state
//! can move to any other in one step.

use serde::{Deserialize, Serialize};

/// Health bucket of a node
///
/// Buckets, with `load% = requests / max_throughput * 100`:
///
/// ```text
/// Idle        requests == 0
/// Normal      0% < load% < 80%
/// Overloaded  80% <= load% < 100%
/// Failed      load% >= 100%
/// ```
///
/// A zero capability ceiling counts as 100% load, so a node with
/// `max_throughput == 0` is failed under any load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthState {
    Idle,
    Normal,
    Overloaded,
    Failed,
}

impl HealthState {
    /// Classify a request count against a capability ceiling
    pub fn classify(requests: u64, max_throughput: u64) -> HealthState {
        let load = load_percentage(requests, max_throughput);
        if load >= 100.0 {
            HealthState::Failed
        } else if requests == 0 {
            HealthState::Idle
        } else if load < 80.0 {
            HealthState::Normal
        } else {
            HealthState::Overloaded
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, HealthState::Failed)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, HealthState::Idle)
    }
}

impl Default for HealthState {
    fn default() -> Self {
        HealthState::Idle
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthState::Idle => write!(f, "IDLE"),
            HealthState::Normal => write!(f, "NORMAL"),
            HealthState::Overloaded => write!(f, "OVERLOADED"),
            HealthState::Failed => write!(f, "FAILED"),
        }
    }
}

fn load_percentage(requests: u64, max_throughput: u64) -> f64 {
    if max_throughput == 0 {
        return 100.0;
    }
    (requests as f64 / max_throughput as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_follow_the_thresholds() {
        assert_eq!(HealthState::classify(0, 1000), HealthState::Idle);
        assert_eq!(HealthState::classify(1, 1000), HealthState::Normal);
        assert_eq!(HealthState::classify(799, 1000), HealthState::Normal);
        assert_eq!(HealthState::classify(800, 1000), HealthState::Overloaded);
        assert_eq!(HealthState::classify(999, 1000), HealthState::Overloaded);
        assert_eq!(HealthState::classify(1000, 1000), HealthState::Failed);
        assert_eq!(HealthState::classify(5000, 1000), HealthState::Failed);
    }

    #[test]
    fn zero_capacity_is_always_failed() {
        assert_eq!(HealthState::classify(0, 0), HealthState::Failed);
        assert_eq!(HealthState::classify(1, 0), HealthState::Failed);
    }

    #[test]
    fn classification_is_idempotent() {
        for requests in [0, 1, 500, 800, 999, 1000, 10_000] {
            let first = HealthState::classify(requests, 1000);
            let second = HealthState::classify(requests, 1000);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn state_round_trips_under_load_changes() {
        // 0 -> 500 -> 850 -> 1000 -> 850 against a 1000 ceiling
        assert_eq!(HealthState::classify(0, 1000), HealthState::Idle);
        assert_eq!(HealthState::classify(500, 1000), HealthState::Normal);
        assert_eq!(HealthState::classify(850, 1000), HealthState::Overloaded);
        assert_eq!(HealthState::classify(1000, 1000), HealthState::Failed);
        assert_eq!(HealthState::classify(850, 1000), HealthState::Overloaded);
    }
}
