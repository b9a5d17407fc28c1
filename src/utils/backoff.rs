use std::time::Duration;

/// Linear backoff driven by a consecutive-failure counter.
///
/// The n-th consecutive failure sleeps `n × unit`, optionally capped.
/// Any success resets the counter so the next failure starts at one unit.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    unit: Duration,
    max: Option<Duration>,
    failures: u32,
}

impl LinearBackoff {
    pub fn new(
        unit: Duration,
        max: Option<Duration>,
    ) -> Self {
        Self { unit, max, failures: 0 }
    }

    /// Records one more failure and returns how long to sleep before retrying
    pub fn next_delay(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        let delay = self.unit.saturating_mul(self.failures);
        match self.max {
            Some(max) => delay.min(max),
            None => delay,
        }
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// Consecutive failures since the last reset
    pub fn failures(&self) -> u32 {
        self.failures
    }
}
