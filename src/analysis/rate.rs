//! Rate gating for analysis throttling.
//!
//! The gate accepts at most one timestamp per interval. It works on
//! monotonic milliseconds carried by the frames themselves, never on
//! wall-clock time, so clock adjustments cannot skew the cadence.

/// Accepts at most one event per fixed time window.
///
/// State is a single "last accepted" timestamp, initialized to never:
/// the first timestamp offered is always accepted, whatever its value.
/// The gate is owned by the analysis context; it has no internal
/// synchronization and callers needing shared access wrap it in a
/// mutex.
#[derive(Debug, Clone)]
pub struct RateGate {
    /// Minimum spacing between accepted timestamps.
    interval_ms: u64,
    /// Time of the last accepted sample, `None` until the first.
    last_accepted_ms: Option<u64>,
}

impl RateGate {
    /// Creates a gate with the given minimum spacing.
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_accepted_ms: None,
        }
    }

    /// Offers a timestamp to the gate.
    ///
    /// Returns `true` and records `now_ms` iff at least the interval
    /// has elapsed since the last accepted timestamp, or nothing has
    /// been accepted yet.
    pub fn admit(&mut self, now_ms: u64) -> bool {
        let accept = match self.last_accepted_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        };

        if accept {
            self.last_accepted_ms = Some(now_ms);
        }
        accept
    }

    /// Returns the last accepted timestamp, if any.
    #[inline]
    pub fn last_accepted(&self) -> Option<u64> {
        self.last_accepted_ms
    }

    /// Returns the configured interval.
    #[inline]
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Forgets the last accepted timestamp, re-opening the gate.
    pub fn reset(&mut self) {
        self.last_accepted_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_one_second_cadence() {
        let mut gate = RateGate::new(1000);

        assert!(gate.admit(0));
        assert!(!gate.admit(500));
        assert!(!gate.admit(999));
        assert!(gate.admit(1000));
        assert!(!gate.admit(1001));
    }

    #[test]
    fn test_first_timestamp_always_accepted() {
        let mut gate = RateGate::new(1000);
        assert!(gate.admit(5_000_000_000));
        assert_eq!(gate.last_accepted(), Some(5_000_000_000));
    }

    #[test]
    fn test_rejected_timestamp_not_recorded() {
        let mut gate = RateGate::new(1000);
        gate.admit(100);
        gate.admit(600); // rejected

        assert_eq!(gate.last_accepted(), Some(100));
        // 1100 is a full interval after 100, not after 600.
        assert!(gate.admit(1100));
    }

    #[test]
    fn test_reset_reopens_gate() {
        let mut gate = RateGate::new(1000);
        gate.admit(100);
        assert!(!gate.admit(101));

        gate.reset();
        assert!(gate.admit(101));
    }

    proptest! {
        // For any non-decreasing timestamp sequence, acceptances are
        // bounded by floor(span / interval) + 1.
        #[test]
        fn acceptance_count_bounded(
            deltas in proptest::collection::vec(0u64..400, 1..64),
            interval_ms in 1u64..500,
        ) {
            let mut gate = RateGate::new(interval_ms);

            let mut now = 0u64;
            let mut timestamps = Vec::with_capacity(deltas.len());
            for d in &deltas {
                now += d;
                timestamps.push(now);
            }

            let accepted = timestamps.iter().filter(|&&t| gate.admit(t)).count() as u64;
            let span = timestamps[timestamps.len() - 1] - timestamps[0];

            prop_assert!(accepted <= span / interval_ms + 1);
            prop_assert!(accepted >= 1);
        }
    }
}
