//! Tracks the send time of each outstanding segment, keyed by the
//! `ack_no` that will cumulatively acknowledge it.

use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Debug, Default)]
pub struct RttTracker {
    records: BTreeMap<u32, Instant>,
}

impl RttTracker {
    pub fn new() -> Self {
        RttTracker::default()
    }

    pub fn record(&mut self, ack_endpoint: u32, at: Instant) {
        self.records.insert(ack_endpoint, at);
    }

    pub fn contains(&self, ack_endpoint: u32) -> bool {
        self.records.contains_key(&ack_endpoint)
    }

    /// Deletes every entry strictly below `ack_endpoint` (segments a
    /// cumulative ACK jumped over) plus `ack_endpoint` itself, returning
    /// how many older entries were skipped and the send time recorded
    /// under `ack_endpoint`. Caller must have checked `contains` first.
    pub fn pop(&mut self, ack_endpoint: u32) -> (usize, Instant) {
        let stale: Vec<u32> = self
            .records
            .range(..ack_endpoint)
            .map(|(&k, _)| k)
            .collect();
        let skip_count = stale.len();
        for key in stale {
            self.records.remove(&key);
        }
        let send_time = self
            .records
            .remove(&ack_endpoint)
            .expect("pop called without checking contains");
        (skip_count, send_time)
    }

    /// Invalidates a single pending sample on retransmission (Karn's
    /// rule), leaving unrelated older samples untouched. No-op if absent.
    pub fn remove(&mut self, ack_endpoint: u32) {
        self.records.remove(&ack_endpoint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_skips_and_removes_older_entries() {
        let mut tracker = RttTracker::new();
        let t0 = Instant::now();
        tracker.record(5, t0);
        tracker.record(6, t0);
        tracker.record(7, t0);
        tracker.record(8, t0);
        tracker.record(9, t0);

        let (skip, _) = tracker.pop(5);
        assert_eq!(skip, 0);
        assert!(!tracker.contains(5));

        let (skip, _) = tracker.pop(7);
        assert_eq!(skip, 1); // 6 was skipped
        assert!(!tracker.contains(6));
        assert!(!tracker.contains(7));

        assert!(tracker.contains(8));
        assert!(tracker.contains(9));
    }

    #[test]
    fn remove_leaves_older_samples_untouched() {
        let mut tracker = RttTracker::new();
        let t0 = Instant::now();
        tracker.record(5, t0);
        tracker.record(10, t0);

        tracker.remove(10);
        assert!(!tracker.contains(10));
        assert!(tracker.contains(5));

        // removing something absent is a harmless no-op
        tracker.remove(999);
    }
}
