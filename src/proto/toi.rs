//! Jacobson/Karels-style smoothed RTT and timeout interval, capped by a
//! fixed threshold so persistent loss can't grow the timer unboundedly.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TOICalculator {
    est_rtt: f64,
    dev_rtt: f64,
    threshold: f64,
}

impl Default for TOICalculator {
    fn default() -> Self {
        TOICalculator {
            est_rtt: 1.0,
            dev_rtt: 0.0,
            threshold: 10.0,
        }
    }
}

impl TOICalculator {
    pub fn new(threshold: f64) -> Self {
        TOICalculator {
            threshold,
            ..Default::default()
        }
    }

    /// Current retransmission timer value, in seconds.
    pub fn toi(&self) -> f64 {
        (self.est_rtt + 4.0 * self.dev_rtt).min(self.threshold)
    }

    /// Feed a fresh RTT sample, in seconds. `est_rtt` is updated first, so
    /// the deviation term uses the freshly-updated estimate, not the one
    /// from before this sample.
    pub fn update(&mut self, sample_rtt: f64) {
        self.est_rtt = 0.875 * self.est_rtt + 0.125 * sample_rtt;
        self.dev_rtt = 0.75 * self.dev_rtt + 0.25 * (sample_rtt - self.est_rtt).abs();
    }

    /// Exponential backoff on timeout. A no-op once `toi()` has already
    /// saturated at `threshold`.
    pub fn backoff(&mut self, factor: f64) {
        if self.est_rtt + 4.0 * self.dev_rtt <= self.threshold {
            self.est_rtt *= factor;
            self.dev_rtt *= factor;
        }
    }
}
